//! Closed upstream enumerations.
//!
//! Each enum owns a two-way table: the user-facing name accepted on the command line and in
//! server query strings, and the wire value sent upstream. Unknown names are rejected when the
//! argument is parsed, before any request is built.

// self
use crate::_prelude::*;

macro_rules! upstream_enum {
	(
		$(#[$meta:meta])*
		$name:ident {
			$($(#[$vmeta:meta])* $variant:ident => ($user:literal, $wire:literal)),+ $(,)?
		}
	) => {
		$(#[$meta])*
		#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
		#[serde(try_from = "String")]
		pub enum $name {
			$($(#[$vmeta])* $variant),+
		}
		impl $name {
			/// Every variant, in declaration order.
			pub const ALL: &'static [Self] = &[$(Self::$variant),+];

			/// Name accepted from users.
			pub const fn name(self) -> &'static str {
				match self {
					$(Self::$variant => $user),+
				}
			}

			/// Value sent upstream.
			pub const fn as_str(self) -> &'static str {
				match self {
					$(Self::$variant => $wire),+
				}
			}

			/// Looks up a variant by its upstream wire value.
			pub fn from_wire(value: &str) -> Option<Self> {
				Self::ALL.iter().copied().find(|variant| variant.as_str() == value)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
				f.write_str(self.name())
			}
		}
		impl FromStr for $name {
			type Err = Error;

			fn from_str(s: &str) -> Result<Self> {
				Self::ALL
					.iter()
					.copied()
					.find(|variant| variant.name().eq_ignore_ascii_case(s))
					.ok_or_else(|| {
						let expected =
							Self::ALL.iter().map(|variant| variant.name()).collect::<Vec<_>>();

						Error::invalid_argument(format!(
							"`{s}` is not a valid {}; expected one of {}",
							stringify!($name),
							expected.join(", ")
						))
					})
			}
		}
		impl TryFrom<String> for $name {
			type Error = Error;

			fn try_from(value: String) -> Result<Self> {
				value.parse()
			}
		}
	};
}

upstream_enum! {
	/// Listing sort direction.
	SortOrder {
		/// Oldest or smallest first.
		Ascending => ("ascending", "ASC"),
		/// Newest or largest first.
		Descending => ("descending", "DESC"),
	}
}

upstream_enum! {
	/// Market session a portfolio or order listing refers to.
	MarketSession {
		/// Regular trading hours.
		Regular => ("regular", "REGULAR"),
		/// Extended trading hours.
		Extended => ("extended", "EXTENDED"),
	}
}

upstream_enum! {
	/// Column set returned for portfolio positions.
	PortfolioView {
		/// Performance columns.
		Performance => ("performance", "PERFORMANCE"),
		/// Fundamental columns.
		Fundamental => ("fundamental", "FUNDAMENTAL"),
		/// Options watch columns.
		OptionsWatch => ("optionsWatch", "OPTIONSWATCH"),
		/// Quick view.
		Quick => ("quick", "QUICK"),
		/// Every column.
		Complete => ("complete", "COMPLETE"),
	}
}

upstream_enum! {
	/// Column a portfolio listing is sorted by.
	///
	/// Wire values are the upstream's own spellings, including `BI` for the bid and
	/// `INSTRINIC_VALUE` for the intrinsic value.
	#[allow(missing_docs)]
	PortfolioSortBy {
		Symbol => ("symbol", "SYMBOL"),
		TypeName => ("typeName", "TYPE_NAME"),
		ExchangeName => ("exchangeName", "EXCHANGE_NAME"),
		Currency => ("currency", "CURRENCY"),
		Quantity => ("quantity", "QUANTITY"),
		LongOrShort => ("longOrShort", "LONG_OR_SHORT"),
		DateAcquired => ("dateAcquired", "DATE_ACQUIRED"),
		PricePaid => ("pricePaid", "PRICEPAID"),
		TotalGain => ("totalGain", "TOTAL_GAIN"),
		TotalGainPct => ("totalGainPct", "TOTAL_GAIN_PCT"),
		MarketValue => ("marketValue", "MARKET_VALUE"),
		Bid => ("bid", "BI"),
		Ask => ("ask", "ASK"),
		PriceChange => ("priceChange", "PRICE_CHANGE"),
		PriceChangePct => ("priceChangePct", "PRICE_CHANGE_PCT"),
		Volume => ("volume", "VOLUME"),
		Week52High => ("week52High", "WEEK_52_HIGH"),
		Week52Low => ("week52Low", "WEEK_52_LOW"),
		Eps => ("eps", "EPS"),
		PeRatio => ("peRatio", "PE_RATIO"),
		OptionType => ("optionType", "OPTION_TYPE"),
		StrikePrice => ("strikePrice", "STRIKE_PRICE"),
		Premium => ("premium", "PREMIUM"),
		Expiration => ("expiration", "EXPIRATION"),
		DaysGain => ("daysGain", "DAYS_GAIN"),
		Commission => ("commission", "COMMISSION"),
		MarketCap => ("marketCap", "MARKETCAP"),
		PrevClose => ("prevClose", "PREV_CLOSE"),
		Open => ("open", "OPEN"),
		DaysRange => ("daysRange", "DAYS_RANGE"),
		TotalCost => ("totalCost", "TOTAL_COST"),
		DaysGainPct => ("daysGainPct", "DAYS_GAIN_PCT"),
		PctOfPortfolio => ("pctOfPortfolio", "PCT_OF_PORTFOLIO"),
		LastTradeTime => ("lastTradeTime", "LAST_TRADE_TIME"),
		BaseSymbolPrice => ("baseSymbolPrice", "BASE_SYMBOL_PRICE"),
		Week52Range => ("week52Range", "WEEK_52_RANGE"),
		LastTrade => ("lastTrade", "LAST_TRADE"),
		SymbolDesc => ("symbolDesc", "SYMBOL_DESC"),
		BidSize => ("bidSize", "BID_SIZE"),
		AskSize => ("askSize", "ASK_SIZE"),
		OtherFees => ("otherFees", "OTHER_FEES"),
		HeldAs => ("heldAs", "HELD_AS"),
		OptionMultiplier => ("optionMultiplier", "OPTION_MULTIPLIER"),
		Deliverables => ("deliverables", "DELIVERABLES"),
		CostPerShare => ("costPerShare", "COST_PERSHARE"),
		Dividend => ("dividend", "DIVIDEND"),
		DivYield => ("divYield", "DIV_YIELD"),
		DivPayDate => ("divPayDate", "DIV_PAY_DATE"),
		EstEarn => ("estEarn", "EST_EARN"),
		ExDivDate => ("exDivDate", "EX_DIV_DATE"),
		TenDayAvgVol => ("tenDayAvgVol", "TEN_DAY_AVG_VOL"),
		Beta => ("beta", "BETA"),
		BidAskSpread => ("bidAskSpread", "BID_ASK_SPREAD"),
		Marginable => ("marginable", "MARGINABLE"),
		Delta52wkHi => ("delta52wkHi", "DELTA_52WK_HI"),
		Delta52WkLow => ("delta52WkLow", "DELTA_52WK_LOW"),
		Perf1Mon => ("perf1Mon", "PERF_1MON"),
		AnnualDiv => ("annualDiv", "ANNUAL_DIV"),
		Perf12Mon => ("perf12Mon", "PERF_12MON"),
		Perf3Mon => ("perf3Mon", "PERF_3MON"),
		Perf6Mon => ("perf6Mon", "PERF_6MON"),
		PreDayVol => ("preDayVol", "PRE_DAY_VOL"),
		Sv1MonAvg => ("sv1MonAvg", "SV_1MON_AVG"),
		Sv10DayAvg => ("sv10DayAvg", "SV_10DAY_AVG"),
		Sv20DayAvg => ("sv20DayAvg", "SV_20DAY_AVG"),
		Sv2MonAvg => ("sv2MonAvg", "SV_2MON_AVG"),
		Sv3MonAvg => ("sv3MonAvg", "SV_3MON_AVG"),
		Sv4MonAvg => ("sv4MonAvg", "SV_4MON_AVG"),
		Sv6MonAvg => ("sv6MonAvg", "SV_6MON_AVG"),
		Delta => ("delta", "DELTA"),
		Gamma => ("gamma", "GAMMA"),
		IvPct => ("ivPct", "IV_PCT"),
		Theta => ("theta", "THETA"),
		Vega => ("vega", "VEGA"),
		AdjNonadjFlag => ("adjNonadjFlag", "ADJ_NONADJ_FLAG"),
		DaysExpiration => ("daysExpiration", "DAYS_EXPIRATION"),
		OpenInterest => ("openInterest", "OPEN_INTEREST"),
		IntrinsicValue => ("intrinsicValue", "INSTRINIC_VALUE"),
		Rho => ("rho", "RHO"),
		TypeCode => ("typeCode", "TYPE_CODE"),
		DisplaySymbol => ("displaySymbol", "DISPLAY_SYMBOL"),
		AfterHoursPctChange => ("afterHoursPctChange", "AFTER_HOURS_PCTCHANGE"),
		PreMarketPctChange => ("preMarketPctChange", "PRE_MARKET_PCTCHANGE"),
		ExpandCollapseFlag => ("expandCollapseFlag", "EXPAND_COLLAPSE_FLAG"),
	}
}

upstream_enum! {
	/// Security type filter for order listings.
	OrderSecurityType {
		/// Equities.
		Equity => ("equity", "EQ"),
		/// Options.
		Option => ("option", "OPTN"),
		/// Mutual funds.
		MutualFund => ("mutualFund", "MF"),
		/// Money market funds.
		MoneyMarketFund => ("moneyMarketFund", "MMF"),
	}
}

upstream_enum! {
	/// Transaction type filter for order listings.
	OrderTransactionType {
		/// Extended-hours orders.
		ExtendedHours => ("extendedHours", "ATNM"),
		/// Buys.
		Buy => ("buy", "BUY"),
		/// Sales.
		Sell => ("sell", "SELL"),
		/// Short sales.
		Short => ("short", "SELL_SHORT"),
		/// Buys to cover a short.
		BuyToCover => ("buyToCover", "BUY_TO_COVER"),
		/// Mutual fund exchanges.
		MutualFundExchange => ("mutualFundExchange", "MF_EXCHANGE"),
	}
}

upstream_enum! {
	/// Order status filter.
	OrderStatus {
		/// Open orders.
		Open => ("open", "OPEN"),
		/// Executed orders.
		Executed => ("executed", "EXECUTED"),
		/// Canceled orders.
		Canceled => ("canceled", "CANCELLED"),
		/// Orders with individual fills.
		IndividualFills => ("individualFills", "INDIVIDUAL_FILLS"),
		/// Orders with a pending cancel request.
		CancelRequested => ("cancelRequested", "CANCEL_REQUESTED"),
		/// Expired orders.
		Expired => ("expired", "EXPIRED"),
		/// Rejected orders.
		Rejected => ("rejected", "REJECTED"),
	}
}

upstream_enum! {
	/// Amount of detail returned per quote.
	QuoteDetail {
		/// Every field.
		All => ("all", "ALL"),
		/// Fundamentals.
		Fundamental => ("fundamental", "FUNDAMENTAL"),
		/// Intraday trading.
		Intraday => ("intraday", "INTRADAY"),
		/// Option-specific fields.
		Options => ("options", "OPTIONS"),
		/// 52-week range.
		Week52 => ("week52", "WEEK_52"),
		/// Mutual fund fields.
		MutualFund => ("mutualFund", "MF_DETAIL"),
	}
}

upstream_enum! {
	/// Alert category filter.
	AlertCategory {
		/// Stock alerts.
		Stock => ("stock", "STOCK"),
		/// Account alerts.
		Account => ("account", "ACCOUNT"),
	}
}

upstream_enum! {
	/// Alert status filter.
	AlertStatus {
		/// Read alerts.
		Read => ("read", "READ"),
		/// Unread alerts.
		Unread => ("unread", "UNREAD"),
		/// Deleted alerts.
		Deleted => ("deleted", "DELETED"),
	}
}

upstream_enum! {
	/// Option category filter for option chains.
	OptionCategory {
		/// Standard contracts only.
		Standard => ("standard", "STANDARD"),
		/// Every contract.
		All => ("all", "ALL"),
		/// Mini contracts only.
		Mini => ("mini", "MINI"),
	}
}

upstream_enum! {
	/// Side of an option chain.
	OptionChainType {
		/// Calls only.
		Call => ("call", "CALL"),
		/// Puts only.
		Put => ("put", "PUT"),
		/// Calls and puts.
		CallPut => ("callPut", "CALLPUT"),
	}
}

upstream_enum! {
	/// Price type of an option chain.
	OptionPriceType {
		/// Extended-hours prices.
		ExtendedHours => ("extendedHours", "ATNM"),
		/// Every price type.
		All => ("all", "ALL"),
	}
}

upstream_enum! {
	/// Expiry cycle filter for option expiration dates.
	OptionExpiryType {
		/// No particular cycle.
		Unspecified => ("unspecified", "UNSPECIFIED"),
		/// Daily expirations.
		Daily => ("daily", "DAILY"),
		/// Weekly expirations.
		Weekly => ("weekly", "WEEKLY"),
		/// Monthly expirations.
		Monthly => ("monthly", "MONTHLY"),
		/// Quarterly expirations.
		Quarterly => ("quarterly", "QUARTERLY"),
		/// VIX expirations.
		Vix => ("vix", "VIX"),
		/// Every cycle.
		All => ("all", "ALL"),
		/// Month-end expirations.
		MonthEnd => ("monthEnd", "MONTHEND"),
	}
}
