#![cfg(feature = "test")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use etrade_cli::{
	_preludet::*,
	api::{
		self, OptionChainQuery, OptionChainType, OptionExpiryType, OrderQuery, OrderSecurityType,
		OrderTransactionType, PortfolioQuery, PortfolioSortBy, QuoteDetail, SortOrder,
		TransactionQuery,
	},
	auth::{ConsumerKey, TokenPair},
	client::AuthorizedClient,
	oauth::OAuthSession,
};

fn client_for(server: &MockServer) -> AuthorizedClient {
	let session = OAuthSession::new(
		test_http_client(),
		&mock_endpoints(&server.base_url()),
		false,
		ConsumerKey::new(TEST_CONSUMER_KEY).expect("Consumer key fixture should be valid."),
		TEST_CONSUMER_SECRET.into(),
	);

	session.authorized_client(TokenPair::new("T", "S"))
}

#[tokio::test]
async fn transactions_follow_the_marker_until_it_disappears() {
	let server = MockServer::start_async().await;
	let first = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/sandbox/v1/accounts/k1/transactions")
				.query_param("count", "50")
				.query_param("sortOrder", "DESC")
				.query_param_missing("marker");
			then.status(200).json_body(json!({
				"TransactionListResponse": {
					"Transaction": [{ "transactionId": 1 }, { "transactionId": 2 }],
					"marker": "m1"
				}
			}));
		})
		.await;
	let second = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/sandbox/v1/accounts/k1/transactions")
				.query_param("marker", "m1");
			then.status(200).json_body(json!({
				"TransactionListResponse": { "Transaction": { "transactionId": 3 } }
			}));
		})
		.await;
	let query = TransactionQuery { sort_order: Some(SortOrder::Descending), ..Default::default() };
	let value = api::list_transactions(&client_for(&server), "k1", &query)
		.await
		.expect("Transactions should be collected.");

	first.assert_calls_async(1).await;
	second.assert_calls_async(1).await;

	assert_eq!(
		value,
		json!({
			"transactions": [{ "transactionId": 1 }, { "transactionId": 2 }, { "transactionId": 3 }]
		})
	);
}

#[tokio::test]
async fn a_failing_page_fails_the_whole_listing() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/sandbox/v1/accounts/k1/orders").query_param_missing("marker");
			then.status(200).json_body(json!({
				"OrdersResponse": { "Order": [{ "orderId": 1 }], "marker": "m1" }
			}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/sandbox/v1/accounts/k1/orders").query_param("marker", "m1");
			then.status(500).body("boom");
		})
		.await;

	let err = api::list_orders(&client_for(&server), "k1", &OrderQuery::default())
		.await
		.expect_err("A failed page should fail the listing.");

	assert!(matches!(err, Error::Upstream { status: Some(500), .. }));
}

#[tokio::test]
async fn portfolio_pages_by_number_and_keeps_totals() {
	let server = MockServer::start_async().await;
	let first = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/sandbox/v1/accounts/k1/portfolio")
				.query_param("totalsRequired", "true")
				.query_param_missing("pageNumber");
			then.status(200).json_body(json!({
				"PortfolioResponse": {
					"Totals": { "TotalMarketValue": 10 },
					"AccountPortfolio": [{ "Position": [{ "symbolDescription": "A" }], "nextPageNo": 2 }]
				}
			}));
		})
		.await;
	let second = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/sandbox/v1/accounts/k1/portfolio")
				.query_param("pageNumber", "2");
			then.status(200).json_body(json!({
				"PortfolioResponse": {
					"AccountPortfolio": [{ "Position": [{ "symbolDescription": "B" }] }]
				}
			}));
		})
		.await;
	let query = PortfolioQuery { totals_required: true, ..Default::default() };
	let value = api::view_portfolio(&client_for(&server), "k1", &query)
		.await
		.expect("Portfolio should be collected.");

	first.assert_calls_async(1).await;
	second.assert_calls_async(1).await;

	assert_eq!(
		value,
		json!({
			"positions": [{ "symbolDescription": "A" }, { "symbolDescription": "B" }],
			"totals": { "totalMarketValue": 10 }
		})
	);
}

#[tokio::test]
async fn quotes_send_the_fixed_flags() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/sandbox/v1/market/quote/AAPL,MSFT")
				.query_param("requireEarningsDate", "true")
				.query_param("overrideSymbolCount", "true")
				.query_param("skipMiniOptionsCheck", "false")
				.query_param("detailFlag", "WEEK_52");
			then.status(200).json_body(json!({
				"QuoteResponse": { "QuoteData": [{ "Product": { "symbol": "AAPL" } }] }
			}));
		})
		.await;
	let value = api::get_quotes(
		&client_for(&server),
		&["aapl, msft".to_owned()],
		Some(QuoteDetail::Week52),
	)
	.await
	.expect("Quotes should be fetched.");

	mock.assert_async().await;

	assert_eq!(value, json!({ "quotes": [{ "product": { "symbol": "AAPL" } }] }));
}

#[tokio::test]
async fn error_envelopes_in_ok_bodies_are_upstream_errors() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/sandbox/v1/market/lookup/zzz");
			then.status(200).json_body(json!({ "Error": { "code": 10033, "message": "No match." } }));
		})
		.await;

	let err = api::lookup(&client_for(&server), "zzz").await.expect_err("Envelope should fail.");

	assert!(matches!(err, Error::Upstream { status: Some(200), .. }));
}

#[tokio::test]
async fn too_many_symbols_never_reach_the_upstream() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET);
			then.status(200).body("{}");
		})
		.await;
	let symbols = (0..51).map(|i| format!("S{i}")).collect::<Vec<_>>();
	let err = api::get_quotes(&client_for(&server), &symbols, None)
		.await
		.expect_err("51 symbols should be rejected.");

	assert!(matches!(err, Error::InvalidArgument { .. }));

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn account_ids_resolve_to_their_keys() {
	let server = MockServer::start_async().await;
	let list = server
		.mock_async(|when, then| {
			when.method(GET).path("/sandbox/v1/accounts/list");
			then.status(200).json_body(json!({
				"AccountListResponse": {
					"Accounts": {
						"Account": [
							{ "accountId": 8000, "accountIdKey": "k0" },
							{ "accountId": "8001", "accountIdKey": "k1" }
						]
					}
				}
			}));
		})
		.await;
	let client = client_for(&server);

	assert_eq!(api::account_id_key(&client, "8000").await.expect("Numeric id resolves."), "k0");
	assert_eq!(api::account_id_key(&client, " 8001 ").await.expect("Id resolves."), "k1");
	assert_eq!(api::account_id_key(&client, "k1").await.expect("Keys resolve as-is."), "k1");

	let err =
		api::account_id_key(&client, "9999").await.expect_err("Unknown accounts should fail.");

	assert!(matches!(err, Error::InvalidArgument { .. }));
	assert!(err.to_string().contains("9999"));

	list.assert_calls_async(4).await;
}

#[tokio::test]
async fn portfolio_defaults_and_lots_are_sent_upstream() {
	let server = MockServer::start_async().await;
	let portfolio = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/sandbox/v1/accounts/k1/portfolio")
				.query_param("view", "QUICK")
				.query_param("totalsRequired", "true")
				.query_param("sortBy", "DAYS_GAIN");
			then.status(200).json_body(json!({
				"PortfolioResponse": {
					"AccountPortfolio": [{
						"Position": [{ "positionId": 11 }, { "positionId": "12" }]
					}]
				}
			}));
		})
		.await;
	let lots_11 = server
		.mock_async(|when, then| {
			when.method(GET).path("/sandbox/v1/accounts/k1/portfolio/11");
			then.status(200).json_body(json!({
				"PositionLotsResponse": { "PositionLot": [{ "LotId": 1 }, { "LotId": 2 }] }
			}));
		})
		.await;
	let lots_12 = server
		.mock_async(|when, then| {
			when.method(GET).path("/sandbox/v1/accounts/k1/portfolio/12");
			then.status(200).json_body(json!({
				"PositionLotsResponse": { "PositionLot": { "LotId": 3 } }
			}));
		})
		.await;
	let query = PortfolioQuery {
		sort_by: Some(PortfolioSortBy::DaysGain),
		with_lots: true,
		..Default::default()
	};
	let value = api::view_portfolio(&client_for(&server), "k1", &query)
		.await
		.expect("Portfolio should be collected.");

	portfolio.assert_calls_async(1).await;
	lots_11.assert_calls_async(1).await;
	lots_12.assert_calls_async(1).await;

	assert_eq!(
		value,
		json!({
			"positions": [
				{ "positionId": 11, "lots": [{ "lotId": 1 }, { "lotId": 2 }] },
				{ "positionId": "12", "lots": [{ "lotId": 3 }] }
			]
		})
	);
}

#[tokio::test]
async fn a_failed_lots_request_fails_the_portfolio() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/sandbox/v1/accounts/k1/portfolio");
			then.status(200).json_body(json!({
				"PortfolioResponse": {
					"AccountPortfolio": [{ "Position": [{ "positionId": 11 }] }]
				}
			}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/sandbox/v1/accounts/k1/portfolio/11");
			then.status(500).body("boom");
		})
		.await;

	let query = PortfolioQuery { with_lots: true, ..Default::default() };
	let err = api::view_portfolio(&client_for(&server), "k1", &query)
		.await
		.expect_err("A failed lots request should fail the portfolio.");

	assert!(matches!(err, Error::Upstream { status: Some(500), .. }));
}

#[tokio::test]
async fn transaction_details_unwrap_the_response() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/sandbox/v1/accounts/k1/transactions/t1");
			then.status(200).json_body(json!({
				"TransactionDetailsResponse": {
					"transactionId": 7,
					"Brokerage": { "Product": { "symbol": "AAPL" } }
				}
			}));
		})
		.await;
	let value = api::transaction_details(&client_for(&server), "k1", "t1")
		.await
		.expect("Details should be fetched.");

	mock.assert_async().await;

	assert_eq!(
		value,
		json!({
			"transaction": { "transactionId": 7, "brokerage": { "product": { "symbol": "AAPL" } } }
		})
	);
}

#[tokio::test]
async fn order_filters_include_security_and_transaction_types() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/sandbox/v1/accounts/k1/orders")
				.query_param("securityType", "OPTN")
				.query_param("transactionType", "SELL_SHORT");
			then.status(200)
				.json_body(json!({ "OrdersResponse": { "Order": [{ "orderId": 1 }] } }));
		})
		.await;
	let query = OrderQuery {
		security_type: Some(OrderSecurityType::Option),
		transaction_type: Some(OrderTransactionType::Short),
		..Default::default()
	};
	let value = api::list_orders(&client_for(&server), "k1", &query)
		.await
		.expect("Orders should be listed.");

	mock.assert_async().await;

	assert_eq!(value, json!({ "orders": [{ "orderId": 1 }] }));
}

#[tokio::test]
async fn option_chains_are_reshaped() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/sandbox/v1/market/optionchains")
				.query_param("symbol", "AAPL")
				.query_param("expiryYear", "2027")
				.query_param("expiryMonth", "3")
				.query_param("noOfStrikes", "2")
				.query_param("includeWeekly", "false")
				.query_param("skipAdjusted", "true")
				.query_param("chainType", "CALLPUT")
				.query_param_missing("expiryDay")
				.query_param_missing("optionCategory");
			then.status(200).json_body(json!({
				"OptionChainResponse": {
					"timeStamp": 1700000000,
					"quoteType": "DELAYED",
					"nearPrice": 190.5,
					"SelectedED": { "month": 3, "year": 2027, "day": 19 },
					"OptionPair": [
						{ "Call": { "strikePrice": 190 }, "Put": { "strikePrice": 190 } }
					]
				}
			}));
		})
		.await;
	let query = OptionChainQuery {
		symbol: " aapl ".into(),
		expiry_year: Some(2027),
		expiry_month: Some(3),
		no_of_strikes: Some(2),
		chain_type: Some(OptionChainType::CallPut),
		..Default::default()
	};
	let value = api::option_chains(&client_for(&server), &query)
		.await
		.expect("Option chains should be fetched.");

	mock.assert_async().await;

	assert_eq!(
		value,
		json!({
			"timeStamp": 1700000000,
			"quoteType": "DELAYED",
			"nearPrice": 190.5,
			"selected": { "month": 3, "year": 2027, "day": 19 },
			"optionChainPairs": [{ "call": { "strikePrice": 190 }, "put": { "strikePrice": 190 } }]
		})
	);
}

#[tokio::test]
async fn option_queries_are_validated_before_any_request() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET);
			then.status(200).body("{}");
		})
		.await;
	let client = client_for(&server);

	for query in [
		OptionChainQuery::default(),
		OptionChainQuery { symbol: "AAPL".into(), expiry_month: Some(13), ..Default::default() },
		OptionChainQuery { symbol: "AAPL".into(), expiry_day: Some(0), ..Default::default() },
	] {
		let err = api::option_chains(&client, &query).await.expect_err("Query should be refused.");

		assert!(matches!(err, Error::InvalidArgument { .. }));
	}

	assert!(matches!(
		api::option_expire_dates(&client, "  ", None).await,
		Err(Error::InvalidArgument { .. })
	));

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn option_expire_dates_are_listed() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/sandbox/v1/market/optionexpiredate")
				.query_param("symbol", "GOOG")
				.query_param("expiryType", "MONTHEND");
			then.status(200).json_body(json!({
				"OptionExpireDateResponse": {
					"ExpirationDate": [
						{ "year": 2027, "month": 1, "day": 29, "expiryType": "MONTHEND" }
					]
				}
			}));
		})
		.await;
	let value =
		api::option_expire_dates(&client_for(&server), "goog", Some(OptionExpiryType::MonthEnd))
			.await
			.expect("Expiration dates should be listed.");

	mock.assert_async().await;

	assert_eq!(
		value,
		json!({
			"optionExpireDates": [{ "year": 2027, "month": 1, "day": 29, "expiryType": "MONTHEND" }]
		})
	);
}
