//! Gate.io v4 spot API client
//!
//! A blocking HTTP client covering the endpoints the ladder tool needs.
//! Requests are sent exactly once; failures are reported to the caller
//! as [`GatewayError`].
//!
//! # Example
//!
//! ```no_run
//! use gate_ladder::exchange::Exchange;
//! use gate_ladder::gateio::{Credentials, GateClient};
//!
//! let client = GateClient::new(Credentials::new("api_key", "api_secret"))?;
//! let ticker = client.ticker("ALPH_USDT")?;
//! println!("ALPH/USDT: {}", ticker.last);
//! # Ok::<(), gate_ladder::error::GatewayError>(())
//! ```

use reqwest::blocking::Client;
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::auth::Credentials;
use super::types::*;
use crate::error::{GatewayError, GatewayResult};
use crate::exchange::{Exchange, OPEN_ORDERS_PAGE_SIZE};
use crate::types::{
    AccountDetail, Balance, BatchOrderResult, ListOrdersQuery, OrderRecord, OrderRequest,
    OrderStatus, Ticker, TriggeredOrderRequest,
};

/// Base URL for the live Gate.io API
pub const API_BASE_URL: &str = "https://api.gateio.ws";

/// Base URL for the Gate.io testnet
pub const TESTNET_BASE_URL: &str = "https://fx-api-testnet.gateio.ws";

/// Path prefix of every v4 endpoint; part of the signed path
pub const API_PREFIX: &str = "/api/v4";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme and host the requests are sent to
    pub base_url: String,
    /// Request timeout duration
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: API_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at the testnet
    pub fn testnet() -> Self {
        Self::default().with_base_url(TESTNET_BASE_URL)
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Gate.io spot API client
pub struct GateClient {
    credentials: Credentials,
    http_client: Client,
    base_url: String,
}

impl GateClient {
    /// Create a client against the live API
    pub fn new(credentials: Credentials) -> GatewayResult<Self> {
        Self::with_config(credentials, ClientConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(credentials: Credentials, config: ClientConfig) -> GatewayResult<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            credentials,
            http_client,
            base_url: config.base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one request. Signed requests carry the `KEY`, `Timestamp` and
    /// `SIGN` headers computed over the exact path, query and body sent.
    fn send<R>(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<String>,
        signed: bool,
    ) -> GatewayResult<R>
    where
        R: DeserializeOwned,
    {
        let path = format!("{}{}", API_PREFIX, endpoint);
        let query_string = encode_query(query)?;
        let mut url = format!("{}{}", self.base_url, path);
        if !query_string.is_empty() {
            url.push('?');
            url.push_str(&query_string);
        }
        let body = body.unwrap_or_default();

        debug!("{} {}", method, url);

        let mut request = self
            .http_client
            .request(method.clone(), &url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json");

        if signed {
            let timestamp = chrono::Utc::now().timestamp();
            let signature =
                self.credentials
                    .sign(method.as_str(), &path, &query_string, &body, timestamp);
            request = request
                .header("KEY", self.credentials.api_key())
                .header("Timestamp", timestamp.to_string())
                .header("SIGN", signature);
        }

        if !body.is_empty() {
            request = request.body(body);
        }

        let response = request.send()?;
        let status = response.status().as_u16();
        let text = response.text()?;

        debug!("{} {} -> {}", method, endpoint, status);
        decode_response(status, &text)
    }

    fn signed_get<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> GatewayResult<R> {
        self.send(Method::GET, endpoint, query, None, true)
    }

    fn signed_post<T, R>(&self, endpoint: &str, body: &T) -> GatewayResult<R>
    where
        T: serde::Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let json_body = serde_json::to_string(body)?;
        self.send(Method::POST, endpoint, &[], Some(json_body), true)
    }
}

impl Exchange for GateClient {
    fn create_order(&self, order: &OrderRequest) -> GatewayResult<OrderRecord> {
        let body = NewOrder::from(order);
        let created: GateOrder = self.signed_post("/spot/orders", &body)?;
        Ok(created.into())
    }

    fn create_batch_orders(&self, orders: &[OrderRequest]) -> GatewayResult<Vec<BatchOrderResult>> {
        let body: Vec<NewOrder> = orders.iter().map(NewOrder::from).collect();
        let entries: Vec<BatchOrderEntry> = self.signed_post("/spot/batch_orders", &body)?;
        Ok(entries.into_iter().map(Into::into).collect())
    }

    fn create_triggered_order(&self, order: &TriggeredOrderRequest) -> GatewayResult<String> {
        let body = SpotPriceTriggeredOrder::from(order);
        let created: TriggeredOrderId = self.signed_post("/spot/price_orders", &body)?;
        Ok(created.id)
    }

    fn list_orders(
        &self,
        pair: &str,
        status: OrderStatus,
        query: &ListOrdersQuery,
    ) -> GatewayResult<Vec<OrderRecord>> {
        let mut params = vec![
            ("currency_pair", pair.to_string()),
            ("status", status.as_str().to_string()),
        ];
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(side) = query.side {
            params.push(("side", side.as_str().to_string()));
        }
        if let Some(from) = query.from {
            params.push(("from", from.to_string()));
        }
        if let Some(to) = query.to {
            params.push(("to", to.to_string()));
        }

        let orders: Vec<GateOrder> = self.signed_get("/spot/orders", &params)?;
        Ok(orders.into_iter().map(Into::into).collect())
    }

    fn list_open_orders(&self, pair: &str) -> GatewayResult<Vec<OrderRecord>> {
        let mut records = Vec::new();
        let mut page = 1u32;

        loop {
            let params = [
                ("page", page.to_string()),
                ("limit", OPEN_ORDERS_PAGE_SIZE.to_string()),
            ];
            let groups: Vec<OpenOrdersGroup> = self.signed_get("/spot/open_orders", &params)?;
            let group_count = groups.len();

            records.extend(
                groups
                    .into_iter()
                    .filter(|g| g.currency_pair == pair)
                    .flat_map(|g| g.orders)
                    .map(OrderRecord::from),
            );

            if group_count < OPEN_ORDERS_PAGE_SIZE as usize {
                break;
            }
            page += 1;
        }

        Ok(records)
    }

    fn list_balances(&self) -> GatewayResult<Vec<Balance>> {
        let accounts: Vec<SpotAccount> = self.signed_get("/spot/accounts", &[])?;
        Ok(accounts.into_iter().map(Into::into).collect())
    }

    fn ticker(&self, pair: &str) -> GatewayResult<Ticker> {
        let params = [("currency_pair", pair.to_string())];
        let tickers: Vec<GateTicker> =
            self.send(Method::GET, "/spot/tickers", &params, None, false)?;

        tickers
            .into_iter()
            .find(|t| t.currency_pair == pair)
            .map(Into::into)
            .ok_or_else(|| GatewayError::generic(format!("ticker not found for {}", pair)))
    }

    fn account_detail(&self) -> GatewayResult<AccountDetail> {
        let detail: GateAccountDetail = self.signed_get("/account/detail", &[])?;
        Ok(detail.into())
    }
}

/// Form-encode query parameters in the order given. The same string is
/// signed and sent, so the order must not change between the two.
pub fn encode_query(params: &[(&str, String)]) -> GatewayResult<String> {
    serde_urlencoded::to_string(params)
        .map_err(|e| GatewayError::generic(format!("failed to encode query: {}", e)))
}

/// Turn a status code and body into a result. Non-2xx statuses with a
/// `{label, message}` body become [`GatewayError::Api`].
pub fn decode_response<R: DeserializeOwned>(status: u16, text: &str) -> GatewayResult<R> {
    if (200..300).contains(&status) {
        return serde_json::from_str(text).map_err(|e| {
            GatewayError::generic(format!("failed to parse response ({}): {}", e, text))
        });
    }

    match serde_json::from_str::<ApiErrorBody>(text) {
        Ok(body) if !body.label.is_empty() => Err(GatewayError::api(body.label, body.message)),
        _ => Err(GatewayError::generic(format!("http status {}: {}", status, text))),
    }
}
