//! Request and response bodies of the Gate.io v4 spot API
//!
//! Decimal values travel as strings. A few integer fields are sent as
//! numbers by some endpoints and as strings by others, so they are decoded
//! leniently.

use serde::{Deserialize, Serialize};

use crate::types::{
    AccountDetail, Balance, BatchOrderResult, OrderRecord, OrderRequest, Side, Ticker,
    TimeInForce, TriggerRule, TriggeredOrderRequest,
};

/// Body of `POST /spot/orders` and one entry of `POST /spot/batch_orders`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewOrder {
    pub text: String,
    pub currency_pair: String,
    #[serde(rename = "type")]
    pub order_type: &'static str,
    pub account: &'static str,
    pub side: Side,
    pub amount: String,
    pub price: String,
    pub time_in_force: TimeInForce,
}

impl From<&OrderRequest> for NewOrder {
    fn from(order: &OrderRequest) -> Self {
        Self {
            text: order.text.clone(),
            currency_pair: order.currency_pair.clone(),
            order_type: "limit",
            account: "spot",
            side: order.side,
            amount: order.amount.clone(),
            price: order.price.clone(),
            time_in_force: order.time_in_force,
        }
    }
}

/// Spot order as returned by the order endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GateOrder {
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, deserialize_with = "deserialize_millis")]
    pub create_time_ms: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub currency_pair: String,
    #[serde(default)]
    pub side: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub filled_total: String,
    #[serde(default)]
    pub avg_deal_price: String,
}

impl From<GateOrder> for OrderRecord {
    fn from(order: GateOrder) -> Self {
        Self {
            id: order.id,
            text: order.text,
            currency_pair: order.currency_pair,
            side: order.side,
            status: order.status,
            price: order.price,
            amount: order.amount,
            filled_total: order.filled_total,
            avg_deal_price: order.avg_deal_price,
            create_time_ms: order.create_time_ms,
        }
    }
}

/// One entry of the `POST /spot/batch_orders` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchOrderEntry {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub succeeded: bool,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub fill_price: String,
    #[serde(default)]
    pub filled_total: String,
}

impl From<BatchOrderEntry> for BatchOrderResult {
    fn from(entry: BatchOrderEntry) -> Self {
        Self {
            text: entry.text,
            succeeded: entry.succeeded,
            status: entry.status,
            price: entry.price,
            amount: entry.amount,
            fill_price: entry.fill_price,
            filled_total: entry.filled_total,
            label: entry.label,
            message: entry.message,
        }
    }
}

/// Trigger section of a price-triggered order
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpotPriceTrigger {
    pub price: String,
    pub rule: TriggerRule,
    pub expiration: i64,
}

/// Order placed when the trigger fires
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpotPricePutOrder {
    #[serde(rename = "type")]
    pub order_type: &'static str,
    pub side: Side,
    pub price: String,
    pub amount: String,
    pub account: &'static str,
    pub time_in_force: TimeInForce,
}

/// Body of `POST /spot/price_orders`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpotPriceTriggeredOrder {
    pub trigger: SpotPriceTrigger,
    pub put: SpotPricePutOrder,
    pub market: String,
}

impl From<&TriggeredOrderRequest> for SpotPriceTriggeredOrder {
    fn from(order: &TriggeredOrderRequest) -> Self {
        Self {
            trigger: SpotPriceTrigger {
                price: order.trigger_price.clone(),
                rule: order.trigger_rule,
                expiration: order.expiration_secs,
            },
            put: SpotPricePutOrder {
                order_type: "limit",
                side: order.put.side,
                price: order.put.price.clone(),
                amount: order.put.amount.clone(),
                account: "normal",
                time_in_force: order.put.time_in_force,
            },
            market: order.market.clone(),
        }
    }
}

/// Response of `POST /spot/price_orders`
#[derive(Debug, Clone, Deserialize)]
pub struct TriggeredOrderId {
    #[serde(deserialize_with = "deserialize_string_or_number")]
    pub id: String,
}

/// One pair group of `GET /spot/open_orders`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenOrdersGroup {
    #[serde(default)]
    pub currency_pair: String,
    #[serde(default)]
    pub orders: Vec<GateOrder>,
}

/// Entry of `GET /spot/accounts`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotAccount {
    pub currency: String,
    #[serde(default)]
    pub available: String,
    #[serde(default)]
    pub locked: String,
}

impl From<SpotAccount> for Balance {
    fn from(account: SpotAccount) -> Self {
        Self {
            currency: account.currency,
            available: account.available,
            locked: account.locked,
        }
    }
}

/// Entry of `GET /spot/tickers`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GateTicker {
    pub currency_pair: String,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub last: String,
}

impl From<GateTicker> for Ticker {
    fn from(ticker: GateTicker) -> Self {
        Self {
            currency_pair: ticker.currency_pair,
            last: ticker.last,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountKey {
    #[serde(default)]
    pub mode: Option<i64>,
}

/// Response of `GET /account/detail`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GateAccountDetail {
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub ip_whitelist: Vec<String>,
    #[serde(default)]
    pub currency_pairs: Vec<String>,
    #[serde(default)]
    pub key: Option<AccountKey>,
    #[serde(default)]
    pub tier: Option<i64>,
}

impl From<GateAccountDetail> for AccountDetail {
    fn from(detail: GateAccountDetail) -> Self {
        Self {
            user_id: detail.user_id,
            tier: detail.tier,
            key_mode: detail.key.and_then(|k| k.mode),
            ip_whitelist: detail.ip_whitelist,
            currency_pairs: detail.currency_pairs,
        }
    }
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub message: String,
}

fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct StringOrNumber;

    impl<'de> Visitor<'de> for StringOrNumber {
        type Value = String;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or a number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(StringOrNumber)
}

fn deserialize_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = deserialize_string_or_number(deserializer)?;
    if raw.is_empty() {
        return Ok(0);
    }
    // millisecond stamps may come as "1700000000123.456"
    raw.split('.')
        .next()
        .unwrap_or_default()
        .parse::<i64>()
        .map_err(serde::de::Error::custom)
}
