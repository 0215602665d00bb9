//! Command tree of the `etrade` binary.

pub mod render;

pub use render::*;

// std
use std::{io::Write, net::SocketAddr, path::PathBuf, time::Duration as StdDuration};
// crates.io
use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;
// self
use crate::{
	_prelude::*,
	api::{
		self, AlertCategory, AlertQuery, AlertStatus, MarketDate, MarketSession, OptionCategory,
		OptionChainQuery, OptionChainType, OptionExpiryType, OptionPriceType, OrderQuery,
		OrderSecurityType, OrderStatus, OrderTransactionType, PortfolioQuery, PortfolioSortBy,
		PortfolioView, QuoteDetail, SortOrder, TransactionQuery,
	},
	client::AuthorizedClient,
	config::{ConfigFolder, ConfigurationStore},
	endpoint::EndpointConfig,
	flows::{LineVerifier, SessionManager},
	http::{Deadline, ReqwestHttpClient},
	server::{self, ServerConfig},
	store::{CredentialStore, FileCredentialStore},
};

/// Command-line front end for the E*TRADE REST API.
#[derive(Debug, Parser)]
#[command(name = "etrade", version, about)]
pub struct Cli {
	/// Customer to act for, as named in the configuration file.
	#[arg(long = "customerId", global = true, env = "ETRADE_CUSTOMER_ID")]
	pub customer_id: Option<String>,
	/// Log debug output to stderr.
	#[arg(long, global = true)]
	pub debug: bool,
	/// Output encoding.
	#[arg(long, global = true, value_enum, default_value_t)]
	pub format: OutputFormat,
	/// Folder holding `.etradecfg` and the `.etrade` credential cache; defaults to home.
	#[arg(long, global = true, env = "ETRADE_CONFIG_DIR")]
	pub config_dir: Option<PathBuf>,
	/// Overall upstream timeout in seconds; unlimited when omitted.
	#[arg(long, global = true, value_name = "SECONDS")]
	pub timeout: Option<u64>,
	/// Production API base URL.
	#[arg(long, global = true, env = "ETRADE_PRODUCTION_API_BASE", hide = true)]
	pub production_api_base: Option<String>,
	/// Sandbox API base URL.
	#[arg(long, global = true, env = "ETRADE_SANDBOX_API_BASE", hide = true)]
	pub sandbox_api_base: Option<String>,
	/// Authorization page URL.
	#[arg(long, global = true, env = "ETRADE_AUTHORIZE_URL", hide = true)]
	pub authorize_url: Option<String>,
	#[command(subcommand)]
	#[allow(missing_docs)]
	pub command: Command,
}
impl Cli {
	fn folder(&self) -> Result<ConfigFolder> {
		Ok(ConfigFolder::resolve(self.config_dir.clone())?)
	}

	fn deadline(&self) -> Deadline {
		Deadline::maybe_after(self.timeout.map(StdDuration::from_secs))
	}

	fn customer_id(&self) -> Result<&str> {
		self.customer_id
			.as_deref()
			.filter(|id| !id.trim().is_empty())
			.ok_or_else(|| Error::invalid_argument("--customerId is required for this command"))
	}

	fn session_manager(&self) -> Result<SessionManager> {
		let folder = self.folder()?;
		let config = ConfigurationStore::load(folder.config_file())?;
		let store: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::new(folder));
		let endpoints = EndpointConfig::with_overrides(
			self.production_api_base.as_deref(),
			self.sandbox_api_base.as_deref(),
			self.authorize_url.as_deref(),
		)?;

		Ok(SessionManager::new(config, store, endpoints, ReqwestHttpClient::new()?))
	}

	async fn client(&self, manager: &SessionManager) -> Result<AuthorizedClient> {
		manager.obtain_client(self.customer_id()?, &LineVerifier::stdio(), self.deadline()).await
	}
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
	/// Log in or clear cached credentials.
	Auth {
		#[command(subcommand)]
		#[allow(missing_docs)]
		command: AuthCommand,
	},
	/// Manage the configuration file.
	Cfg {
		#[command(subcommand)]
		#[allow(missing_docs)]
		command: CfgCommand,
	},
	/// Account information.
	Accounts {
		#[command(subcommand)]
		#[allow(missing_docs)]
		command: AccountsCommand,
	},
	/// Orders.
	Orders {
		#[command(subcommand)]
		#[allow(missing_docs)]
		command: OrdersCommand,
	},
	/// Alerts.
	Alerts {
		#[command(subcommand)]
		#[allow(missing_docs)]
		command: AlertsCommand,
	},
	/// Market data.
	Market {
		#[command(subcommand)]
		#[allow(missing_docs)]
		command: MarketCommand,
	},
	/// Serve the same operations over HTTP.
	Server(ServerArgs),
}

/// `auth` subcommands.
#[derive(Debug, Subcommand)]
pub enum AuthCommand {
	/// Renew the cached token or authorize interactively.
	Login,
	/// Remove cached credentials.
	Clear {
		/// Clear every configured customer instead of `--customerId`.
		#[arg(long)]
		all: bool,
	},
}

/// `cfg` subcommands.
#[derive(Debug, Subcommand)]
pub enum CfgCommand {
	/// Write a configuration template.
	Create {
		/// Overwrite an existing configuration file.
		#[arg(long)]
		force: bool,
	},
	/// List configured customers.
	List,
}

/// `accounts` subcommands.
#[derive(Debug, Subcommand)]
pub enum AccountsCommand {
	/// List accounts.
	List,
	/// Show an account balance.
	Balance {
		/// Account id or account id key.
		account_id: String,
		/// Request real-time net asset value.
		#[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
		real_time: bool,
	},
	/// Show portfolio positions.
	Portfolio {
		/// Account id or account id key.
		account_id: String,
		/// Column set.
		#[arg(long, default_value_t = PortfolioView::Quick)]
		view: PortfolioView,
		/// Column to sort by.
		#[arg(long)]
		sort_by: Option<PortfolioSortBy>,
		/// Market session.
		#[arg(long)]
		market_session: Option<MarketSession>,
		/// Sort direction.
		#[arg(long)]
		sort_order: Option<SortOrder>,
		/// Include portfolio totals.
		#[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
		totals: bool,
		/// Fetch the lots of every position.
		#[arg(long)]
		with_lots: bool,
		/// Positions per upstream request.
		#[arg(long)]
		page_size: Option<u32>,
	},
	/// List transactions.
	Transactions {
		/// Account id or account id key.
		account_id: String,
		/// First day (MMDDYYYY).
		#[arg(long)]
		start_date: Option<MarketDate>,
		/// Last day (MMDDYYYY).
		#[arg(long)]
		end_date: Option<MarketDate>,
		/// Sort direction.
		#[arg(long)]
		sort_order: Option<SortOrder>,
		/// Transactions per upstream request.
		#[arg(long)]
		page_size: Option<u32>,
	},
	/// Show one transaction.
	TransactionDetails {
		/// Account id or account id key.
		account_id: String,
		/// Transaction id.
		transaction_id: String,
	},
}

/// `orders` subcommands.
#[derive(Debug, Subcommand)]
pub enum OrdersCommand {
	/// List orders.
	List {
		/// Account id or account id key.
		account_id: String,
		/// Status filter.
		#[arg(long)]
		status: Option<OrderStatus>,
		/// First day (MMDDYYYY).
		#[arg(long)]
		from_date: Option<MarketDate>,
		/// Last day (MMDDYYYY).
		#[arg(long)]
		to_date: Option<MarketDate>,
		/// Comma-separated symbol filter.
		#[arg(long)]
		symbol: Option<String>,
		/// Security type filter.
		#[arg(long)]
		security_type: Option<OrderSecurityType>,
		/// Transaction type filter.
		#[arg(long)]
		transaction_type: Option<OrderTransactionType>,
		/// Market session.
		#[arg(long)]
		market_session: Option<MarketSession>,
		/// Orders per upstream request.
		#[arg(long)]
		page_size: Option<u32>,
	},
}

/// `alerts` subcommands.
#[derive(Debug, Subcommand)]
pub enum AlertsCommand {
	/// List alerts.
	List {
		/// Category filter.
		#[arg(long)]
		category: Option<AlertCategory>,
		/// Status filter.
		#[arg(long)]
		status: Option<AlertStatus>,
		/// Sort direction.
		#[arg(long)]
		direction: Option<SortOrder>,
		/// Subject search string.
		#[arg(long)]
		search: Option<String>,
		/// Maximum number of alerts.
		#[arg(long)]
		count: Option<u32>,
	},
	/// Show one alert.
	Details {
		/// Alert id.
		alert_id: String,
	},
	/// Delete alerts.
	Delete {
		/// Alert ids.
		#[arg(required = true)]
		alert_ids: Vec<String>,
	},
}

/// `market` subcommands.
#[derive(Debug, Subcommand)]
pub enum MarketCommand {
	/// Quote up to 50 symbols.
	Quote {
		/// Symbols.
		#[arg(required = true)]
		symbols: Vec<String>,
		/// Detail level.
		#[arg(long)]
		detail: Option<QuoteDetail>,
	},
	/// Look up securities by name.
	Lookup {
		/// Search string.
		search: String,
	},
	/// Show the option chain of an underlying.
	#[command(name = "optionchains")]
	OptionChains {
		/// Underlying symbol.
		symbol: String,
		/// Expiration year.
		#[arg(long)]
		expiry_year: Option<u16>,
		/// Expiration month.
		#[arg(long)]
		expiry_month: Option<u8>,
		/// Expiration day.
		#[arg(long)]
		expiry_day: Option<u8>,
		/// Center the chain on this strike price.
		#[arg(long)]
		strike_price_near: Option<f64>,
		/// Number of strikes.
		#[arg(long)]
		strikes: Option<u32>,
		/// Include weekly options.
		#[arg(long)]
		include_weekly: bool,
		/// Skip adjusted options.
		#[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
		skip_adjusted: bool,
		/// Option category.
		#[arg(long)]
		category: Option<OptionCategory>,
		/// Chain side.
		#[arg(long)]
		chain_type: Option<OptionChainType>,
		/// Price type.
		#[arg(long)]
		price_type: Option<OptionPriceType>,
	},
	/// List option expiration dates of an underlying.
	#[command(name = "optionexpire")]
	OptionExpire {
		/// Underlying symbol.
		symbol: String,
		/// Expiry cycle.
		#[arg(long)]
		expiry_type: Option<OptionExpiryType>,
	},
}

/// `server` options.
#[derive(Debug, Args)]
pub struct ServerArgs {
	/// Listen address.
	#[arg(long, default_value = server::DEFAULT_ADDR)]
	pub addr: SocketAddr,
	/// Per-request upstream deadline in seconds.
	#[arg(long, default_value_t = 60, value_name = "SECONDS")]
	pub request_timeout: u64,
	/// How long a started login waits for its verification code, in seconds.
	#[arg(long, default_value_t = 600, value_name = "SECONDS")]
	pub verify_timeout: u64,
}

/// Installs the stderr log subscriber; `RUST_LOG` wins over `--debug`.
pub fn init_tracing(debug: bool) {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));

	let installed =
		tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();

	if installed.is_err() {
		tracing::debug!("A log subscriber was already installed.");
	}
}

/// Runs one command, rendering its result to `out`.
pub async fn run(cli: &Cli, out: &mut dyn Write) -> Result<()> {
	let value = match &cli.command {
		Command::Cfg { command } => run_cfg(cli, command)?,
		Command::Server(args) => {
			let config = ServerConfig {
				request_timeout: Some(StdDuration::from_secs(args.request_timeout)),
				verify_timeout: StdDuration::from_secs(args.verify_timeout),
			};

			server::serve(args.addr, cli.session_manager()?, config).await?;

			return Ok(());
		},
		Command::Auth { command } => {
			let manager = cli.session_manager()?;

			match command {
				AuthCommand::Login => {
					cli.client(&manager).await?;

					return Ok(());
				},
				AuthCommand::Clear { all: true } => manager.release_all().await?,
				AuthCommand::Clear { all: false } =>
					manager.release_client(cli.customer_id()?).await?,
			}

			return Ok(());
		},
		Command::Accounts { command } => {
			let manager = cli.session_manager()?;

			run_accounts(&cli.client(&manager).await?, command).await?
		},
		Command::Orders { command } => {
			let manager = cli.session_manager()?;

			run_orders(&cli.client(&manager).await?, command).await?
		},
		Command::Alerts { command } => {
			let manager = cli.session_manager()?;

			run_alerts(&cli.client(&manager).await?, command).await?
		},
		Command::Market { command } => {
			let manager = cli.session_manager()?;

			run_market(&cli.client(&manager).await?, command).await?
		},
	};

	render(&value, cli.format, out)
}

fn run_cfg(cli: &Cli, command: &CfgCommand) -> Result<Value> {
	let path = cli.folder()?.config_file();

	match command {
		CfgCommand::Create { force } => {
			ConfigurationStore::template()?.save(&path, *force)?;

			tracing::info!(path = %path.display(), "Configuration template written.");

			Ok(json!({ "status": "success", "path": path.display().to_string() }))
		},
		CfgCommand::List => {
			let config = ConfigurationStore::load(&path)?;

			Ok(json!({ "customers": config.list() }))
		},
	}
}

async fn run_accounts(client: &AuthorizedClient, command: &AccountsCommand) -> Result<Value> {
	match command {
		AccountsCommand::List => api::list_accounts(client).await,
		AccountsCommand::Balance { account_id, real_time } => {
			let account_id_key = api::account_id_key(client, account_id).await?;

			api::account_balance(client, &account_id_key, *real_time).await
		},
		AccountsCommand::Portfolio {
			account_id,
			view,
			sort_by,
			market_session,
			sort_order,
			totals,
			with_lots,
			page_size,
		} => {
			let account_id_key = api::account_id_key(client, account_id).await?;
			let query = PortfolioQuery {
				view: *view,
				sort_by: *sort_by,
				market_session: *market_session,
				sort_order: *sort_order,
				totals_required: *totals,
				with_lots: *with_lots,
				count: *page_size,
			};

			api::view_portfolio(client, &account_id_key, &query).await
		},
		AccountsCommand::Transactions {
			account_id,
			start_date,
			end_date,
			sort_order,
			page_size,
		} => {
			let account_id_key = api::account_id_key(client, account_id).await?;
			let query = TransactionQuery {
				start_date: *start_date,
				end_date: *end_date,
				sort_order: *sort_order,
				count: *page_size,
			};

			api::list_transactions(client, &account_id_key, &query).await
		},
		AccountsCommand::TransactionDetails { account_id, transaction_id } => {
			let account_id_key = api::account_id_key(client, account_id).await?;

			api::transaction_details(client, &account_id_key, transaction_id).await
		},
	}
}

async fn run_orders(client: &AuthorizedClient, command: &OrdersCommand) -> Result<Value> {
	match command {
		OrdersCommand::List {
			account_id,
			status,
			from_date,
			to_date,
			symbol,
			security_type,
			transaction_type,
			market_session,
			page_size,
		} => {
			let account_id_key = api::account_id_key(client, account_id).await?;
			let query = OrderQuery {
				status: *status,
				from_date: *from_date,
				to_date: *to_date,
				symbol: symbol.clone(),
				security_type: *security_type,
				transaction_type: *transaction_type,
				market_session: *market_session,
				count: *page_size,
			};

			api::list_orders(client, &account_id_key, &query).await
		},
	}
}

async fn run_alerts(client: &AuthorizedClient, command: &AlertsCommand) -> Result<Value> {
	match command {
		AlertsCommand::List { category, status, direction, search, count } => {
			let query = AlertQuery {
				category: *category,
				status: *status,
				direction: *direction,
				search: search.clone(),
				count: *count,
			};

			api::list_alerts(client, &query).await
		},
		AlertsCommand::Details { alert_id } => api::alert_details(client, alert_id).await,
		AlertsCommand::Delete { alert_ids } => api::delete_alerts(client, alert_ids).await,
	}
}

async fn run_market(client: &AuthorizedClient, command: &MarketCommand) -> Result<Value> {
	match command {
		MarketCommand::Quote { symbols, detail } => api::get_quotes(client, symbols, *detail).await,
		MarketCommand::Lookup { search } => api::lookup(client, search).await,
		MarketCommand::OptionChains {
			symbol,
			expiry_year,
			expiry_month,
			expiry_day,
			strike_price_near,
			strikes,
			include_weekly,
			skip_adjusted,
			category,
			chain_type,
			price_type,
		} => {
			let query = OptionChainQuery {
				symbol: symbol.clone(),
				expiry_year: *expiry_year,
				expiry_month: *expiry_month,
				expiry_day: *expiry_day,
				strike_price_near: *strike_price_near,
				no_of_strikes: *strikes,
				include_weekly: *include_weekly,
				skip_adjusted: *skip_adjusted,
				option_category: *category,
				chain_type: *chain_type,
				price_type: *price_type,
			};

			api::option_chains(client, &query).await
		},
		MarketCommand::OptionExpire { symbol, expiry_type } =>
			api::option_expire_dates(client, symbol, *expiry_type).await,
	}
}
