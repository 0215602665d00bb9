//! Thin adapters over the E*TRADE REST endpoints.
//!
//! Every adapter takes the [`AuthorizedClient`] explicitly, issues one request per upstream
//! page, normalizes key casing, and reshapes the payload into a small JSON object that both the
//! CLI renderer and the HTTP server emit unchanged.

pub mod enums;

mod json;

pub use enums::*;
pub use json::normalize_keys;

// crates.io
use serde_json::{Map, Value};
use time::{Date, macros::format_description};
// self
use crate::{
	_prelude::*,
	api::json::{cursor_at, decode, items_at, keyed, text_at},
	client::AuthorizedClient,
	paging::{Page, PageSize, collect_pages},
};

/// Maximum number of symbols in one quote request.
pub const QUOTE_SYMBOLS_MAX: usize = 50;
/// Maximum number of symbols in one order filter.
pub const ORDER_SYMBOLS_MAX: usize = 25;

/// Calendar date in the upstream's `MMDDYYYY` form.
///
/// Dates are forwarded exactly as given; no time-zone conversion takes place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct MarketDate(Date);
impl MarketDate {
	/// Wraps a calendar date.
	pub fn new(date: Date) -> Self {
		Self(date)
	}

	/// Underlying calendar date.
	pub fn date(self) -> Date {
		self.0
	}

	/// `MMDDYYYY` rendering sent upstream.
	pub fn to_wire(self) -> String {
		format!("{:02}{:02}{:04}", u8::from(self.0.month()), self.0.day(), self.0.year())
	}
}
impl FromStr for MarketDate {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		Date::parse(s.trim(), format_description!("[month][day][year]"))
			.map(Self)
			.map_err(|e| Error::invalid_argument(format!("`{s}` is not a MMDDYYYY date ({e})")))
	}
}
impl TryFrom<String> for MarketDate {
	type Error = Error;

	fn try_from(value: String) -> Result<Self> {
		value.parse()
	}
}
impl Display for MarketDate {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.write_str(&self.to_wire())
	}
}

/// Filters for [`list_transactions`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransactionQuery {
	/// First day to include.
	pub start_date: Option<MarketDate>,
	/// Last day to include.
	pub end_date: Option<MarketDate>,
	/// Sort direction.
	pub sort_order: Option<SortOrder>,
	/// Items per upstream page.
	pub count: Option<u32>,
}

/// Options for [`view_portfolio`].
///
/// Defaults to the quick view with totals.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PortfolioQuery {
	/// Column set.
	pub view: PortfolioView,
	/// Column to sort by.
	pub sort_by: Option<PortfolioSortBy>,
	/// Session the quotes refer to.
	pub market_session: Option<MarketSession>,
	/// Sort direction.
	pub sort_order: Option<SortOrder>,
	/// Whether to request portfolio totals.
	pub totals_required: bool,
	/// Whether to fetch the lots of every position.
	pub with_lots: bool,
	/// Items per upstream page.
	pub count: Option<u32>,
}
impl Default for PortfolioQuery {
	fn default() -> Self {
		Self {
			view: PortfolioView::Quick,
			sort_by: None,
			market_session: None,
			sort_order: None,
			totals_required: true,
			with_lots: false,
			count: None,
		}
	}
}

/// Filters for [`list_orders`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderQuery {
	/// Status filter.
	pub status: Option<OrderStatus>,
	/// First day to include.
	pub from_date: Option<MarketDate>,
	/// Last day to include.
	pub to_date: Option<MarketDate>,
	/// Comma-separated symbol filter.
	pub symbol: Option<String>,
	/// Security type filter.
	pub security_type: Option<OrderSecurityType>,
	/// Transaction type filter.
	pub transaction_type: Option<OrderTransactionType>,
	/// Session filter.
	pub market_session: Option<MarketSession>,
	/// Items per upstream page.
	pub count: Option<u32>,
}

/// Filters for [`option_chains`].
///
/// Weekly options are left out and adjusted options skipped unless asked otherwise.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptionChainQuery {
	/// Underlying symbol.
	pub symbol: String,
	/// Expiration year.
	pub expiry_year: Option<u16>,
	/// Expiration month, `1..=12`.
	pub expiry_month: Option<u8>,
	/// Expiration day, `1..=31`.
	pub expiry_day: Option<u8>,
	/// Strike price the chain is centered on.
	pub strike_price_near: Option<f64>,
	/// Number of strikes around the center.
	pub no_of_strikes: Option<u32>,
	/// Include weekly options.
	pub include_weekly: bool,
	/// Skip adjusted options.
	pub skip_adjusted: bool,
	/// Contract size filter.
	pub option_category: Option<OptionCategory>,
	/// Side of the chain.
	pub chain_type: Option<OptionChainType>,
	/// Price type.
	pub price_type: Option<OptionPriceType>,
}
impl Default for OptionChainQuery {
	fn default() -> Self {
		Self {
			symbol: String::new(),
			expiry_year: None,
			expiry_month: None,
			expiry_day: None,
			strike_price_near: None,
			no_of_strikes: None,
			include_weekly: false,
			skip_adjusted: true,
			option_category: None,
			chain_type: None,
			price_type: None,
		}
	}
}

/// Filters for [`list_alerts`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlertQuery {
	/// Category filter.
	pub category: Option<AlertCategory>,
	/// Status filter.
	pub status: Option<AlertStatus>,
	/// Sort direction.
	pub direction: Option<SortOrder>,
	/// Subject search string.
	pub search: Option<String>,
	/// Maximum number of alerts.
	pub count: Option<u32>,
}

/// Lists the customer's accounts: `{"accounts": [...]}`.
pub async fn list_accounts(client: &AuthorizedClient) -> Result<Value> {
	let body = decode(&client.get("/v1/accounts/list", &[]).await?)?;

	Ok(keyed("accounts", items_at(&body, "/accountListResponse/accounts/account")))
}

/// Resolves `account_id` to the `accountIdKey` that every account path is built from.
///
/// Both the numeric account id and the key itself are accepted; one listing request is made
/// either way.
pub async fn account_id_key(client: &AuthorizedClient, account_id: &str) -> Result<String> {
	let account_id = account_id.trim();

	if account_id.is_empty() {
		return Err(Error::invalid_argument("account id must not be empty"));
	}

	let body = decode(&client.get("/v1/accounts/list", &[]).await?)?;

	items_at(&body, "/accountListResponse/accounts/account")
		.iter()
		.find(|account| {
			["/accountId", "/accountIdKey"]
				.iter()
				.any(|pointer| text_at(account, pointer).as_deref() == Some(account_id))
		})
		.and_then(|account| text_at(account, "/accountIdKey"))
		.ok_or_else(|| Error::invalid_argument(format!("account with id `{account_id}` not found")))
}

/// Brokerage balance of one account: `{"balance": {...}}`.
pub async fn account_balance(
	client: &AuthorizedClient,
	account_id_key: &str,
	real_time_nav: bool,
) -> Result<Value> {
	let path = format!("/v1/accounts/{}/balance", segment(account_id_key)?);
	let query = [("instType", "BROKERAGE".to_owned()), ("realTimeNAV", real_time_nav.to_string())];
	let body = decode(&client.get(&path, &query).await?)?;

	Ok(keyed("balance", body.pointer("/balanceResponse").cloned().unwrap_or(Value::Null)))
}

/// Every portfolio position of one account: `{"positions": [...], "totals": {...}}`.
///
/// Pages are requested by `pageNumber` until the upstream stops returning `nextPageNo`. With
/// [`PortfolioQuery::with_lots`] each position gains a `lots` list, fetched one position at a
/// time.
pub async fn view_portfolio(
	client: &AuthorizedClient,
	account_id_key: &str,
	query: &PortfolioQuery,
) -> Result<Value> {
	let account_id_key = segment(account_id_key)?;
	let path = format!("/v1/accounts/{account_id_key}/portfolio");
	let count = PageSize::new(query.count, PageSize::PORTFOLIO_CAP);
	let mut base = vec![
		("count", count.to_string()),
		("view", query.view.as_str().to_owned()),
		("totalsRequired", query.totals_required.to_string()),
	];

	if let Some(sort_by) = query.sort_by {
		base.push(("sortBy", sort_by.as_str().to_owned()));
	}
	if let Some(session) = query.market_session {
		base.push(("marketSession", session.as_str().to_owned()));
	}
	if let Some(order) = query.sort_order {
		base.push(("sortOrder", order.as_str().to_owned()));
	}

	let totals = Mutex::new(None);
	let (path, totals_ref) = (path.as_str(), &totals);
	let positions = collect_pages(move |page_number| {
		let mut params = base.clone();

		if let Some(page_number) = page_number {
			params.push(("pageNumber", page_number));
		}

		async move {
			let body = decode(&client.get(path, &params).await?)?;

			if let Some(value) = body.pointer("/portfolioResponse/totals") {
				*totals_ref.lock() = Some(value.clone());
			}

			Ok(Page::new(
				items_at(&body, "/portfolioResponse/accountPortfolio/0/position"),
				cursor_at(&body, "/portfolioResponse/accountPortfolio/0/nextPageNo"),
			))
		}
	})
	.await?;
	let positions = if query.with_lots {
		attach_lots(client, &account_id_key, positions).await?
	} else {
		positions
	};
	let mut result = Map::new();

	result.insert("positions".to_owned(), Value::Array(positions));

	if let Some(totals) = totals.into_inner() {
		result.insert("totals".to_owned(), totals);
	}

	Ok(Value::Object(result))
}

/// Every transaction of one account in the requested window: `{"transactions": [...]}`.
pub async fn list_transactions(
	client: &AuthorizedClient,
	account_id_key: &str,
	query: &TransactionQuery,
) -> Result<Value> {
	let path = format!("/v1/accounts/{}/transactions", segment(account_id_key)?);
	let count = PageSize::new(query.count, PageSize::TRANSACTIONS_CAP);
	let mut base = vec![("count", count.to_string())];

	if let Some(date) = query.start_date {
		base.push(("startDate", date.to_wire()));
	}
	if let Some(date) = query.end_date {
		base.push(("endDate", date.to_wire()));
	}
	if let Some(order) = query.sort_order {
		base.push(("sortOrder", order.as_str().to_owned()));
	}

	let transactions = collect_marker_pages(
		client,
		&path,
		&base,
		"/transactionListResponse/transaction",
		"/transactionListResponse/marker",
	)
	.await?;

	Ok(keyed("transactions", transactions))
}

/// One transaction with its brokerage detail: `{"transaction": {...}}`.
pub async fn transaction_details(
	client: &AuthorizedClient,
	account_id_key: &str,
	transaction_id: &str,
) -> Result<Value> {
	let path = format!(
		"/v1/accounts/{}/transactions/{}",
		segment(account_id_key)?,
		segment(transaction_id)?
	);
	let body = decode(&client.get(&path, &[]).await?)?;
	let details = body.pointer("/transactionDetailsResponse").cloned().unwrap_or(Value::Null);

	Ok(keyed("transaction", details))
}

/// Every order of one account matching the filters: `{"orders": [...]}`.
pub async fn list_orders(
	client: &AuthorizedClient,
	account_id_key: &str,
	query: &OrderQuery,
) -> Result<Value> {
	let path = format!("/v1/accounts/{}/orders", segment(account_id_key)?);
	let count = PageSize::new(query.count, PageSize::ORDERS_CAP);
	let mut base = vec![("count", count.to_string())];

	if let Some(status) = query.status {
		base.push(("status", status.as_str().to_owned()));
	}
	if let Some(date) = query.from_date {
		base.push(("fromDate", date.to_wire()));
	}
	if let Some(date) = query.to_date {
		base.push(("toDate", date.to_wire()));
	}
	if let Some(symbols) = query.symbol.as_deref() {
		let symbols = split_symbols(symbols);

		if symbols.len() > ORDER_SYMBOLS_MAX {
			return Err(Error::invalid_argument(format!(
				"{} symbols requested, which exceeds the maximum of {ORDER_SYMBOLS_MAX}",
				symbols.len()
			)));
		}
		if !symbols.is_empty() {
			base.push(("symbol", symbols.join(",")));
		}
	}
	if let Some(security_type) = query.security_type {
		base.push(("securityType", security_type.as_str().to_owned()));
	}
	if let Some(transaction_type) = query.transaction_type {
		base.push(("transactionType", transaction_type.as_str().to_owned()));
	}
	if let Some(session) = query.market_session {
		base.push(("marketSession", session.as_str().to_owned()));
	}

	let orders =
		collect_marker_pages(client, &path, &base, "/ordersResponse/order", "/ordersResponse/marker")
			.await?;

	Ok(keyed("orders", orders))
}

/// Alerts matching the filters: `{"alerts": [...]}`.
pub async fn list_alerts(client: &AuthorizedClient, query: &AlertQuery) -> Result<Value> {
	let count = PageSize::new(query.count, PageSize::ALERTS_CAP);
	let mut params = vec![("count", count.to_string())];

	if let Some(category) = query.category {
		params.push(("category", category.as_str().to_owned()));
	}
	if let Some(status) = query.status {
		params.push(("status", status.as_str().to_owned()));
	}
	if let Some(direction) = query.direction {
		params.push(("direction", direction.as_str().to_owned()));
	}
	if let Some(search) = query.search.as_deref().filter(|search| !search.is_empty()) {
		params.push(("search", search.to_owned()));
	}

	let body = decode(&client.get("/v1/user/alerts", &params).await?)?;

	Ok(keyed("alerts", items_at(&body, "/alertsResponse/alert")))
}

/// One alert with its message text: `{"alert": {...}}`.
pub async fn alert_details(client: &AuthorizedClient, alert_id: &str) -> Result<Value> {
	let path = format!("/v1/user/alerts/{}", segment(alert_id)?);
	let body = decode(&client.get(&path, &[]).await?)?;

	Ok(keyed("alert", body.pointer("/alertDetailsResponse").cloned().unwrap_or(Value::Null)))
}

/// Deletes alerts by id: `{"result": {...}}`.
pub async fn delete_alerts(client: &AuthorizedClient, alert_ids: &[String]) -> Result<Value> {
	if alert_ids.is_empty() {
		return Err(Error::invalid_argument("at least one alert id is required"));
	}

	let ids = alert_ids.iter().map(|id| segment(id)).collect::<Result<Vec<_>>>()?;
	let path = format!("/v1/user/alerts/{}", ids.join(","));
	let body = decode(&client.delete(&path, &[]).await?)?;

	Ok(keyed("result", body.pointer("/deleteAlertsResponse").cloned().unwrap_or(Value::Null)))
}

/// Quotes for up to [`QUOTE_SYMBOLS_MAX`] symbols: `{"quotes": [...]}`.
pub async fn get_quotes(
	client: &AuthorizedClient,
	symbols: &[String],
	detail: Option<QuoteDetail>,
) -> Result<Value> {
	let symbols = symbols.iter().flat_map(|symbols| split_symbols(symbols)).collect::<Vec<_>>();

	if symbols.is_empty() {
		return Err(Error::invalid_argument("at least one symbol is required"));
	}
	if symbols.len() > QUOTE_SYMBOLS_MAX {
		return Err(Error::invalid_argument(format!(
			"{} symbols requested, which exceeds the maximum of {QUOTE_SYMBOLS_MAX}",
			symbols.len()
		)));
	}

	let encoded = symbols.iter().map(|symbol| segment(symbol)).collect::<Result<Vec<_>>>()?;
	let path = format!("/v1/market/quote/{}", encoded.join(","));
	let mut params = vec![
		("requireEarningsDate", "true".to_owned()),
		("overrideSymbolCount", "true".to_owned()),
		("skipMiniOptionsCheck", "false".to_owned()),
	];

	if let Some(detail) = detail {
		params.push(("detailFlag", detail.as_str().to_owned()));
	}

	let body = decode(&client.get(&path, &params).await?)?;

	Ok(keyed("quotes", items_at(&body, "/quoteResponse/quoteData")))
}

/// Securities whose name or symbol matches `search`: `{"results": [...]}`.
pub async fn lookup(client: &AuthorizedClient, search: &str) -> Result<Value> {
	let path = format!("/v1/market/lookup/{}", segment(search)?);
	let body = decode(&client.get(&path, &[]).await?)?;

	Ok(keyed("results", items_at(&body, "/lookupResponse/data")))
}

/// Option chain of one underlying.
///
/// Returns `{"timeStamp", "quoteType", "nearPrice", "selected", "optionChainPairs"}`; fields
/// the upstream leaves out are left out here too, except the pair list, which is always present.
pub async fn option_chains(client: &AuthorizedClient, query: &OptionChainQuery) -> Result<Value> {
	let symbol = query.symbol.trim();

	if symbol.is_empty() {
		return Err(Error::invalid_argument("a symbol is required"));
	}
	if query.expiry_month.is_some_and(|month| !(1..=12).contains(&month)) {
		return Err(Error::invalid_argument("expiry month must be between 1 and 12"));
	}
	if query.expiry_day.is_some_and(|day| !(1..=31).contains(&day)) {
		return Err(Error::invalid_argument("expiry day must be between 1 and 31"));
	}

	let mut params = vec![
		("symbol", symbol.to_uppercase()),
		("includeWeekly", query.include_weekly.to_string()),
		("skipAdjusted", query.skip_adjusted.to_string()),
	];

	if let Some(year) = query.expiry_year {
		params.push(("expiryYear", year.to_string()));
	}
	if let Some(month) = query.expiry_month {
		params.push(("expiryMonth", month.to_string()));
	}
	if let Some(day) = query.expiry_day {
		params.push(("expiryDay", day.to_string()));
	}
	if let Some(strike) = query.strike_price_near {
		params.push(("strikePriceNear", strike.to_string()));
	}
	if let Some(strikes) = query.no_of_strikes {
		params.push(("noOfStrikes", strikes.to_string()));
	}
	if let Some(category) = query.option_category {
		params.push(("optionCategory", category.as_str().to_owned()));
	}
	if let Some(chain_type) = query.chain_type {
		params.push(("chainType", chain_type.as_str().to_owned()));
	}
	if let Some(price_type) = query.price_type {
		params.push(("priceType", price_type.as_str().to_owned()));
	}

	let body = decode(&client.get("/v1/market/optionchains", &params).await?)?;
	let mut result = Map::new();

	for (key, pointer) in [
		("timeStamp", "/optionChainResponse/timeStamp"),
		("quoteType", "/optionChainResponse/quoteType"),
		("nearPrice", "/optionChainResponse/nearPrice"),
		("selected", "/optionChainResponse/selectedED"),
	] {
		if let Some(value) = body.pointer(pointer).filter(|value| !value.is_null()) {
			result.insert(key.to_owned(), value.clone());
		}
	}

	result.insert(
		"optionChainPairs".to_owned(),
		Value::Array(items_at(&body, "/optionChainResponse/optionPair")),
	);

	Ok(Value::Object(result))
}

/// Expiration dates of the options on `symbol`: `{"optionExpireDates": [...]}`.
pub async fn option_expire_dates(
	client: &AuthorizedClient,
	symbol: &str,
	expiry_type: Option<OptionExpiryType>,
) -> Result<Value> {
	let symbol = symbol.trim();

	if symbol.is_empty() {
		return Err(Error::invalid_argument("a symbol is required"));
	}

	let mut params = vec![("symbol", symbol.to_uppercase())];

	if let Some(expiry_type) = expiry_type {
		params.push(("expiryType", expiry_type.as_str().to_owned()));
	}

	let body = decode(&client.get("/v1/market/optionexpiredate", &params).await?)?;

	Ok(keyed("optionExpireDates", items_at(&body, "/optionExpireDateResponse/expirationDate")))
}

async fn attach_lots(
	client: &AuthorizedClient,
	account_id_key: &str,
	positions: Vec<Value>,
) -> Result<Vec<Value>> {
	let mut with_lots = Vec::with_capacity(positions.len());

	for mut position in positions {
		let position_id = text_at(&position, "/positionId").ok_or_else(|| Error::Upstream {
			status: None,
			message: "portfolio position has no positionId".into(),
		})?;
		let path = format!("/v1/accounts/{account_id_key}/portfolio/{}", segment(&position_id)?);
		let body = decode(&client.get(&path, &[]).await?)?;
		let lots = items_at(&body, "/positionLotsResponse/positionLot");

		if let Value::Object(fields) = &mut position {
			fields.insert("lots".to_owned(), Value::Array(lots));
		}

		with_lots.push(position);
	}

	Ok(with_lots)
}

async fn collect_marker_pages(
	client: &AuthorizedClient,
	path: &str,
	base: &[(&str, String)],
	items: &str,
	marker: &str,
) -> Result<Vec<Value>> {
	collect_pages(move |cursor| {
		let mut params = base.to_vec();

		if let Some(cursor) = cursor {
			params.push(("marker", cursor));
		}

		async move {
			let body = decode(&client.get(path, &params).await?)?;

			Ok(Page::new(items_at(&body, items), cursor_at(&body, marker)))
		}
	})
	.await
}

fn split_symbols(raw: &str) -> Vec<String> {
	raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_uppercase).collect()
}

fn segment(raw: &str) -> Result<String> {
	let raw = raw.trim();

	if raw.is_empty() {
		return Err(Error::invalid_argument("path parameter must not be empty"));
	}

	Ok(urlencoding::encode(raw).into_owned())
}
