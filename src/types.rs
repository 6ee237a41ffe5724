//! Core data types shared by the ladder generator, the exchange gateway
//! and the reports

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{parse_field, FieldParseError};

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            other => Err(format!("unknown side '{}', expected buy or sell", other)),
        }
    }
}

/// Time-in-force policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good till cancelled
    #[default]
    #[serde(rename = "gtc")]
    GoodTillCancel,
    /// Immediate or cancel
    #[serde(rename = "ioc")]
    ImmediateOrCancel,
}

impl TimeInForce {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::GoodTillCancel => "gtc",
            TimeInForce::ImmediateOrCancel => "ioc",
        }
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeInForce {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gtc" => Ok(TimeInForce::GoodTillCancel),
            "ioc" => Ok(TimeInForce::ImmediateOrCancel),
            other => Err(format!("unknown time in force '{}', expected gtc or ioc", other)),
        }
    }
}

/// Condition that arms a price-triggered order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerRule {
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<=")]
    LessOrEqual,
}

impl TriggerRule {
    /// Buys trigger when price rises to the level, sells when it falls.
    pub fn for_side(side: Side) -> Self {
        match side {
            Side::Buy => TriggerRule::GreaterOrEqual,
            Side::Sell => TriggerRule::LessOrEqual,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerRule::GreaterOrEqual => ">=",
            TriggerRule::LessOrEqual => "<=",
        }
    }
}

impl fmt::Display for TriggerRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spot currency pair in exchange notation, e.g. `ALPH_USDT`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pair {
    base: String,
    quote: String,
}

impl Pair {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into().to_uppercase(),
            quote: quote.into().to_uppercase(),
        }
    }

    /// Asset being bought or sold
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Currency prices are expressed in
    pub fn quote(&self) -> &str {
        &self.quote
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.base, self.quote)
    }
}

impl FromStr for Pair {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('_') {
            Some((base, quote)) if !base.is_empty() && !quote.is_empty() => {
                Ok(Pair::new(base, quote))
            }
            _ => Err(format!(
                "invalid pair '{}', expected BASE_QUOTE (e.g. ALPH_USDT)",
                s
            )),
        }
    }
}

/// Plain limit order to submit
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    /// Client tag, `t-` prefixed
    pub text: String,
    pub currency_pair: String,
    pub side: Side,
    pub price: String,
    pub amount: String,
    pub time_in_force: TimeInForce,
}

/// Limit order placed once a trigger fires
#[derive(Debug, Clone, PartialEq)]
pub struct PutOrder {
    pub side: Side,
    pub price: String,
    pub amount: String,
    pub time_in_force: TimeInForce,
}

/// Stop-limit style order: `put` is placed when the market crosses
/// `trigger_price` according to `trigger_rule`.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggeredOrderRequest {
    pub market: String,
    pub put: PutOrder,
    pub trigger_price: String,
    pub trigger_rule: TriggerRule,
    pub expiration_secs: i64,
}

/// Order status filter for order listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Open,
    Finished,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::Finished => "finished",
        }
    }
}

/// Options for listing orders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOrdersQuery {
    pub limit: Option<u32>,
    pub side: Option<Side>,
    /// Unix seconds, inclusive
    pub from: Option<i64>,
    /// Unix seconds, inclusive
    pub to: Option<i64>,
}

/// Order as reported by the exchange. Decimal fields are kept as the raw
/// strings and parsed where they are used.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderRecord {
    pub id: String,
    pub text: String,
    pub currency_pair: String,
    pub side: String,
    pub status: String,
    pub price: String,
    pub amount: String,
    pub filled_total: String,
    pub avg_deal_price: String,
    pub create_time_ms: i64,
}

impl OrderRecord {
    pub fn side(&self) -> Option<Side> {
        self.side.parse().ok()
    }

    pub fn price_f64(&self) -> Result<f64, FieldParseError> {
        parse_field("price", &self.price)
    }

    pub fn amount_f64(&self) -> Result<f64, FieldParseError> {
        parse_field("amount", &self.amount)
    }

    /// Filled value in quote currency. An empty field means nothing filled.
    pub fn filled_total_f64(&self) -> Result<f64, FieldParseError> {
        if self.filled_total.trim().is_empty() {
            return Ok(0.0);
        }
        parse_field("filled_total", &self.filled_total)
    }
}

/// Outcome of one order inside a batch submission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOrderResult {
    pub text: String,
    pub succeeded: bool,
    pub status: String,
    pub price: String,
    pub amount: String,
    pub fill_price: String,
    pub filled_total: String,
    pub label: String,
    pub message: String,
}

impl BatchOrderResult {
    pub fn is_filled(&self) -> bool {
        self.status == "closed" || self.status == "filled"
    }
}

/// Account balance for one currency
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Balance {
    pub currency: String,
    pub available: String,
    pub locked: String,
}

impl Balance {
    /// Available minus locked, the amount usable for new orders
    pub fn free(&self) -> Result<f64, FieldParseError> {
        let available = parse_field("available balance", &self.available)?;
        let locked = if self.locked.trim().is_empty() {
            0.0
        } else {
            parse_field("locked balance", &self.locked)?
        };
        Ok(available - locked)
    }
}

/// Last trade information for a pair
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ticker {
    pub currency_pair: String,
    pub last: String,
}

impl Ticker {
    pub fn last_price(&self) -> Result<f64, FieldParseError> {
        parse_field("last price", &self.last)
    }
}

/// Account details, read to confirm the API key works
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountDetail {
    pub user_id: i64,
    pub tier: Option<i64>,
    pub key_mode: Option<i64>,
    pub ip_whitelist: Vec<String>,
    pub currency_pairs: Vec<String>,
}

impl fmt::Display for AccountDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user id: {}", self.user_id)?;
        if let Some(tier) = self.tier {
            write!(f, ", tier: {}", tier)?;
        }
        if let Some(mode) = self.key_mode {
            write!(f, ", key mode: {}", mode)?;
        }
        if !self.ip_whitelist.is_empty() {
            write!(f, ", ip whitelist: {}", self.ip_whitelist.join(","))?;
        }
        if !self.currency_pairs.is_empty() {
            write!(f, ", pairs: {}", self.currency_pairs.join(","))?;
        }
        Ok(())
    }
}
