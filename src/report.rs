//! Operator-facing reports
//!
//! Reports are computed from exchange records first and rendered through
//! `Display`, so the figures can be checked without capturing stdout.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::config::{Denomination, OrderStyle};
use crate::error::{parse_field, FieldParseError};
use crate::ladder::{Ladder, TRIGGER_EXPIRATION_SECS};
use crate::math::median;
use crate::types::{ListOrdersQuery, OrderRecord, Pair, Side};

/// Largest page requested when listing by time window
pub const WINDOW_QUERY_LIMIT: u32 = 1000;

const SECS_PER_DAY: i64 = 86_400;

/// One open order as shown in the report
#[derive(Debug, Clone, PartialEq)]
pub struct OpenOrderLine {
    /// Price exactly as the exchange reported it
    pub price: String,
    pub amount: f64,
    pub notional: f64,
    pub filled_total: f64,
    /// Filled value as a percentage of the order's notional
    pub filled_pct: f64,
}

/// Open orders of one side with their totals
#[derive(Debug, Clone, PartialEq)]
pub struct OpenOrdersSide {
    pub side: Side,
    pub orders: Vec<OpenOrderLine>,
    pub base_total: f64,
    pub quote_total: f64,
}

impl OpenOrdersSide {
    fn new(side: Side) -> Self {
        Self {
            side,
            orders: Vec::new(),
            base_total: 0.0,
            quote_total: 0.0,
        }
    }

    fn push(&mut self, record: &OrderRecord) -> Result<(), FieldParseError> {
        let amount = record.amount_f64()?;
        let price = record.price_f64()?;
        let filled_total = record.filled_total_f64()?;
        let notional = price * amount;
        let filled_pct = if notional > 0.0 {
            filled_total / notional * 100.0
        } else {
            0.0
        };

        self.base_total += amount;
        self.quote_total += notional;
        self.orders.push(OpenOrderLine {
            price: record.price.clone(),
            amount,
            notional,
            filled_total,
            filled_pct,
        });
        Ok(())
    }
}

/// Open orders on a pair, split by side
#[derive(Debug, Clone, PartialEq)]
pub struct OpenOrdersReport {
    pub pair: Pair,
    pub buy: OpenOrdersSide,
    pub sell: OpenOrdersSide,
}

impl OpenOrdersReport {
    /// Any record with an unparsable amount, price or filled total fails
    /// the whole report.
    pub fn from_records(pair: &Pair, records: &[OrderRecord]) -> Result<Self, FieldParseError> {
        let mut buy = OpenOrdersSide::new(Side::Buy);
        let mut sell = OpenOrdersSide::new(Side::Sell);

        for record in records {
            match record.side() {
                Some(Side::Buy) => buy.push(record)?,
                Some(Side::Sell) => sell.push(record)?,
                None => {}
            }
        }

        Ok(Self {
            pair: pair.clone(),
            buy,
            sell,
        })
    }

    fn write_side(&self, f: &mut fmt::Formatter<'_>, side: &OpenOrdersSide) -> fmt::Result {
        let base = self.pair.base();
        let quote = self.pair.quote();

        match side.side {
            Side::Buy => writeln!(f, "Buy open orders")?,
            Side::Sell => writeln!(f, "Sell open orders")?,
        }
        for order in &side.orders {
            writeln!(
                f,
                "Price: {} {quote}, Volume: {:.3} {base} | {:.3} {quote}, Filled Total: {:.3} {quote} ({:.2} %)",
                order.price, order.amount, order.notional, order.filled_total, order.filled_pct
            )?;
        }
        let (base_sign, quote_sign) = signs(side.side);
        writeln!(
            f,
            "Total: {base_sign}{:.3} {base} | {quote_sign}{:.3} {quote}",
            side.base_total, side.quote_total
        )
    }
}

impl fmt::Display for OpenOrdersReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_side(f, &self.buy)?;
        self.write_side(f, &self.sell)
    }
}

/// Order that actually traded
#[derive(Debug, Clone, PartialEq)]
pub struct FilledOrder {
    pub side: Side,
    /// Average deal price as the exchange reported it
    pub avg_deal_price: String,
    pub avg_price: f64,
    /// Filled value in quote currency
    pub filled_total: f64,
    /// Base amount of the order
    pub amount: f64,
    pub created_at: Option<DateTime<Utc>>,
}

impl FilledOrder {
    /// `None` unless the record is on `side` and meaningfully filled: it has
    /// an average deal price and a positive filled total.
    pub fn from_record(record: &OrderRecord, side: Side) -> Result<Option<Self>, FieldParseError> {
        if record.side() != Some(side) || record.avg_deal_price.trim().is_empty() {
            return Ok(None);
        }
        let filled_total = record.filled_total_f64()?;
        if filled_total <= 0.0 {
            return Ok(None);
        }

        Ok(Some(Self {
            side,
            avg_deal_price: record.avg_deal_price.clone(),
            avg_price: parse_field("avg_deal_price", &record.avg_deal_price)?,
            filled_total,
            amount: record.amount_f64()?,
            created_at: DateTime::from_timestamp_millis(record.create_time_ms),
        }))
    }
}

/// Filled orders of one side with average, median and totals
#[derive(Debug, Clone, PartialEq)]
pub struct FilledOrdersReport {
    pub pair: Pair,
    pub side: Side,
    /// Orders returned by the listing, filled or not
    pub listed: usize,
    pub orders: Vec<FilledOrder>,
}

impl FilledOrdersReport {
    pub fn from_records(
        pair: &Pair,
        side: Side,
        records: &[OrderRecord],
    ) -> Result<Self, FieldParseError> {
        let mut orders = Vec::new();
        for record in records {
            if let Some(order) = FilledOrder::from_record(record, side)? {
                orders.push(order);
            }
        }

        Ok(Self {
            pair: pair.clone(),
            side,
            listed: records.len(),
            orders,
        })
    }

    /// Mean of the per-order average prices; 0 with nothing filled
    pub fn average_price(&self) -> f64 {
        if self.orders.is_empty() {
            return 0.0;
        }
        self.orders.iter().map(|o| o.avg_price).sum::<f64>() / self.orders.len() as f64
    }

    pub fn median_price(&self) -> f64 {
        let prices: Vec<f64> = self.orders.iter().map(|o| o.avg_price).collect();
        median(&prices)
    }

    pub fn base_total(&self) -> f64 {
        self.orders.iter().map(|o| o.amount).sum()
    }

    pub fn quote_total(&self) -> f64 {
        self.orders.iter().map(|o| o.filled_total).sum()
    }
}

impl fmt::Display for FilledOrdersReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = self.pair.base();
        let quote = self.pair.quote();

        writeln!(f, "List {} {} orders", self.listed, self.side)?;
        for order in &self.orders {
            let created = order
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "unknown".to_string());
            writeln!(
                f,
                "avg filled price: {} {quote}, {:.4} {quote}, Volume: {:.4} {base} (created at: {})",
                order.avg_deal_price, order.filled_total, order.amount, created
            )?;
        }

        if self.listed > 0 {
            let (base_sign, quote_sign) = signs(self.side);
            writeln!(
                f,
                "Avg paid price: {:.4} {quote}, median: {:.4} {quote}, Total: {base_sign}{:.4} {base}, Total: {quote_sign}{:.4} {quote}",
                self.average_price(),
                self.median_price(),
                self.base_total(),
                self.quote_total()
            )?;
        }
        Ok(())
    }
}

/// Query for the filled-order listing. A day window replaces the limit
/// query and drops the side filter.
pub fn filled_orders_query(limit: u32, last_days: u32, side: Side, now: i64) -> ListOrdersQuery {
    if last_days > 0 {
        return ListOrdersQuery {
            limit: Some(WINDOW_QUERY_LIMIT),
            side: None,
            from: Some(now - i64::from(last_days) * SECS_PER_DAY),
            to: Some(now),
        };
    }
    if limit > 0 {
        return ListOrdersQuery {
            limit: Some(limit),
            side: Some(side),
            ..Default::default()
        };
    }
    ListOrdersQuery::default()
}

/// Ladder rendered for operator review
pub struct LadderReview<'a>(pub &'a Ladder);

impl fmt::Display for LadderReview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ladder = self.0;
        let request = &ladder.request;
        let base = request.pair.base();
        let quote = request.pair.quote();
        let currency = request.amount_currency();

        match request.style {
            OrderStyle::Plain => writeln!(f, "Using limit orders")?,
            OrderStyle::Triggered => writeln!(f, "Using Stop-limit orders")?,
        }

        write!(
            f,
            "{} {:.5} {currency} between {:.5} and {:.5}, amount per order: {:.4} {currency}",
            request.side,
            request.total_amount,
            request.price_min,
            request.price_max,
            ladder.amount_per_level
        )?;
        if request.style == OrderStyle::Triggered {
            write!(f, ", duration: {} day", TRIGGER_EXPIRATION_SECS / SECS_PER_DAY)?;
        }
        writeln!(f)?;

        for level in &ladder.levels {
            write!(f, "price: {:.5} {quote}", level.price)?;
            if let Some(trigger) = level.trigger_price {
                write!(f, ", Stop price: {:.4} {quote}", trigger)?;
            }
            let left = match request.denomination {
                Denomination::Quote => format!("{:.2} {quote}", level.remaining),
                Denomination::Base => format!("{:.2} {base}", level.remaining),
            };
            writeln!(
                f,
                ", amount: {:.4} {base}, total: {:.4} {quote}, amount left: {}",
                level.amount, level.notional, left
            )?;
        }

        writeln!(
            f,
            "Total amount in order: {:.5} {currency} ({} orders)",
            ladder.total_committed,
            ladder.levels.len()
        )
    }
}

/// Signs of the base and quote totals: buying adds base and spends quote
fn signs(side: Side) -> (&'static str, &'static str) {
    match side {
        Side::Buy => ("+", "-"),
        Side::Sell => ("-", "+"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ladder::{generate_ladder, LadderRequest};
    use crate::types::TimeInForce;
    use approx::assert_relative_eq;

    fn pair() -> Pair {
        Pair::new("ALPH", "USDT")
    }

    fn record(side: &str, price: &str, amount: &str, filled: &str, avg: &str) -> OrderRecord {
        OrderRecord {
            id: "1".to_string(),
            currency_pair: "ALPH_USDT".to_string(),
            side: side.to_string(),
            price: price.to_string(),
            amount: amount.to_string(),
            filled_total: filled.to_string(),
            avg_deal_price: avg.to_string(),
            create_time_ms: 1_700_000_000_000,
            ..Default::default()
        }
    }

    #[test]
    fn test_open_orders_totals() {
        let records = vec![
            record("buy", "1.0", "10", "2.5", ""),
            record("buy", "0.5", "4", "0", ""),
            record("sell", "2.0", "3", "", ""),
        ];
        let report = OpenOrdersReport::from_records(&pair(), &records).unwrap();

        assert_eq!(report.buy.orders.len(), 2);
        assert_relative_eq!(report.buy.base_total, 14.0);
        assert_relative_eq!(report.buy.quote_total, 12.0);
        assert_relative_eq!(report.buy.orders[0].filled_pct, 25.0);
        assert_eq!(report.sell.orders.len(), 1);
        assert_relative_eq!(report.sell.quote_total, 6.0);

        let text = report.to_string();
        assert!(text.contains("Total: +14.000 ALPH | -12.000 USDT"));
        assert!(text.contains("Total: -3.000 ALPH | +6.000 USDT"));
        assert!(text.contains("Price: 1.0 USDT, Volume: 10.000 ALPH | 10.000 USDT"));
    }

    #[test]
    fn test_open_orders_unparsable_field_fails() {
        let records = vec![record("buy", "abc", "10", "0", "")];
        let err = OpenOrdersReport::from_records(&pair(), &records).unwrap_err();
        assert_eq!(err.field, "price");
        assert_eq!(err.value, "abc");
    }

    #[test]
    fn test_filled_orders_statistics() {
        let records = vec![
            record("buy", "1.0", "10", "10", "1.0"),
            record("buy", "1.2", "5", "6", "1.2"),
            record("buy", "1.1", "5", "5.5", "1.1"),
            // not meaningfully filled
            record("buy", "1.3", "5", "0", "1.3"),
            record("buy", "1.3", "5", "6.5", ""),
            // other side
            record("sell", "2.0", "5", "10", "2.0"),
        ];
        let report = FilledOrdersReport::from_records(&pair(), Side::Buy, &records).unwrap();

        assert_eq!(report.listed, 6);
        assert_eq!(report.orders.len(), 3);
        assert_relative_eq!(report.average_price(), 1.1, epsilon = 1e-12);
        assert_relative_eq!(report.median_price(), 1.1);
        assert_relative_eq!(report.base_total(), 20.0);
        assert_relative_eq!(report.quote_total(), 21.5);

        let text = report.to_string();
        assert!(text.starts_with("List 6 buy orders"));
        assert!(text.contains("Total: +20.0000 ALPH, Total: -21.5000 USDT"));
        assert!(text.contains("created at: 2023-11-14 22:13:20 UTC"));
    }

    #[test]
    fn test_filled_orders_sell_signs() {
        let records = vec![record("sell", "2.0", "5", "10", "2.0")];
        let report = FilledOrdersReport::from_records(&pair(), Side::Sell, &records).unwrap();
        assert!(report
            .to_string()
            .contains("Total: -5.0000 ALPH, Total: +10.0000 USDT"));
    }

    #[test]
    fn test_filled_orders_nothing_filled() {
        let records = vec![record("buy", "1.0", "10", "0", "")];
        let report = FilledOrdersReport::from_records(&pair(), Side::Buy, &records).unwrap();
        assert!(report.orders.is_empty());
        assert_eq!(report.average_price(), 0.0);
        assert!(report.to_string().contains("Avg paid price: 0.0000 USDT"));
    }

    #[test]
    fn test_filled_orders_empty_listing_has_no_summary() {
        let report = FilledOrdersReport::from_records(&pair(), Side::Sell, &[]).unwrap();
        let text = report.to_string();
        assert_eq!(text, "List 0 sell orders\n");
    }

    #[test]
    fn test_filled_orders_query() {
        let q = filled_orders_query(10, 0, Side::Buy, 1_000_000);
        assert_eq!(q.limit, Some(10));
        assert_eq!(q.side, Some(Side::Buy));
        assert_eq!(q.from, None);

        let q = filled_orders_query(10, 2, Side::Sell, 1_000_000);
        assert_eq!(q.limit, Some(WINDOW_QUERY_LIMIT));
        assert_eq!(q.side, None);
        assert_eq!(q.from, Some(1_000_000 - 2 * 86_400));
        assert_eq!(q.to, Some(1_000_000));

        assert_eq!(filled_orders_query(0, 0, Side::Buy, 0), ListOrdersQuery::default());
    }

    #[test]
    fn test_ladder_review() {
        let request = LadderRequest {
            pair: pair(),
            side: Side::Buy,
            price_min: 1.0,
            price_max: 1.1,
            total_amount: 100.0,
            step: 0.005,
            denomination: Denomination::Quote,
            style: OrderStyle::Triggered,
            time_in_force: TimeInForce::GoodTillCancel,
        };
        let ladder = generate_ladder(&request).unwrap();
        let text = LadderReview(&ladder).to_string();

        assert!(text.starts_with("Using Stop-limit orders\n"));
        assert!(text.contains(
            "buy 100.00000 USDT between 1.00000 and 1.10000, amount per order: 5.0000 USDT, duration: 1 day"
        ));
        assert!(text.contains("price: 1.00000 USDT, Stop price: 0.9990 USDT"));
        assert!(text.contains("(19 orders)"));
    }
}
