//! Run orchestration
//!
//! One run verifies the credentials, then either prints a report or walks
//! through the placement steps: ticker check, open-order check, balance
//! check, ladder review and submission. Operator answers come from an
//! [`Operator`], the exchange is any [`Exchange`].

use tracing::{debug, info, warn};

use crate::config::{Action, LadderConfig, OrderStyle, PlaceOrders};
use crate::error::{GatewayError, LadderError};
use crate::exchange::{Exchange, MAX_BATCH_SIZE};
use crate::ladder::{generate_ladder, LadderOrders, LadderRequest};
use crate::prompt::{confirm, immediate_fill_question, FillChoice, Operator};
use crate::report::{filled_orders_query, FilledOrdersReport, LadderReview, OpenOrdersReport};
use crate::types::{OrderRecord, OrderRequest, OrderStatus, Pair, Side, TriggeredOrderRequest};

/// How a run ended without error
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Report printed or orders submitted
    Completed(Option<DispatchSummary>),
    /// The operator declined a prompt
    Aborted,
}

/// What the submission step achieved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Exchange calls made
    pub calls: usize,
    /// Orders the exchange accepted
    pub accepted: usize,
    /// Orders rejected inside an otherwise successful batch
    pub rejected: usize,
    /// Accepted orders that filled on submission
    pub filled: usize,
    /// Calls that failed as a whole
    pub failed_calls: usize,
}

/// Execute one run of the tool
pub fn run(
    config: &LadderConfig,
    exchange: &dyn Exchange,
    operator: &mut dyn Operator,
) -> Result<RunOutcome, LadderError> {
    let detail = exchange
        .account_detail()
        .map_err(|e| LadderError::gateway("account detail", e))?;
    info!("Connected to account {}", detail.user_id);
    println!("Account: {}", detail);

    match &config.action {
        Action::ListFilled { limit, last_days } => {
            let now = chrono::Utc::now().timestamp();
            for side in [Side::Buy, Side::Sell] {
                let query = filled_orders_query(*limit, *last_days, side, now);
                let records = exchange
                    .list_orders(&config.pair.to_string(), OrderStatus::Finished, &query)
                    .unwrap_or_else(|e| {
                        report_failure("list orders", &e);
                        Vec::new()
                    });
                let report = FilledOrdersReport::from_records(&config.pair, side, &records)?;
                println!("{}", report);
            }
            Ok(RunOutcome::Completed(None))
        }
        Action::ListOpen => {
            let records = open_orders(exchange, &config.pair);
            let report = OpenOrdersReport::from_records(&config.pair, &records)?;
            println!("{}", report);
            Ok(RunOutcome::Completed(None))
        }
        Action::Place(place) => place_ladder(&config.pair, place, exchange, operator),
    }
}

fn place_ladder(
    pair: &Pair,
    place: &PlaceOrders,
    exchange: &dyn Exchange,
    operator: &mut dyn Operator,
) -> Result<RunOutcome, LadderError> {
    let mut style = if place.use_stop_limit {
        OrderStyle::Triggered
    } else {
        OrderStyle::Plain
    };

    match exchange.ticker(&pair.to_string()) {
        Ok(ticker) => {
            let last_price = ticker.last_price()?;
            debug!("Last price of {}: {}", pair, last_price);

            if !place.use_stop_limit && fills_immediately(place.side, place.price_min, last_price) {
                let question = immediate_fill_question(
                    last_price,
                    place.side.as_str(),
                    place.price_min,
                    pair.quote(),
                );
                match FillChoice::parse(&operator.ask(&question)?) {
                    FillChoice::Continue => style = OrderStyle::Plain,
                    FillChoice::StopLimit => style = OrderStyle::Triggered,
                    FillChoice::Cancel => return Ok(aborted("immediate fill warning")),
                }
            }
        }
        Err(e) => warn!("Skipping immediate fill check, ticker unavailable: {}", e),
    }

    if !open_orders(exchange, pair).is_empty()
        && !confirm(operator, "Some orders are already open\nDo you want to continue?")?
    {
        return Ok(aborted("open orders"));
    }

    check_balance(exchange, place.balance_currency(pair), place.amount)?;

    let request = LadderRequest::from_placement(pair, place, style);
    let ladder = generate_ladder(&request)?;
    info!(
        "Generated {} of {} levels for {} {}",
        ladder.levels.len(),
        ladder.requested_levels,
        request.side,
        pair
    );

    println!("Here are the orders you gonna create");
    print!("{}", LadderReview(&ladder));

    if !confirm(operator, "\nDo you want to continue?")? {
        return Ok(aborted("final confirmation"));
    }

    let summary = match &ladder.orders {
        LadderOrders::Plain(orders) => dispatch_orders(exchange, pair, orders),
        LadderOrders::Triggered(orders) => dispatch_triggered_orders(exchange, orders),
    };
    info!(
        "Dispatch finished: {} calls, {} accepted, {} rejected, {} filled, {} failed calls",
        summary.calls, summary.accepted, summary.rejected, summary.filled, summary.failed_calls
    );
    Ok(RunOutcome::Completed(Some(summary)))
}

/// Whether the first level would trade against the current price
pub fn fills_immediately(side: Side, price_min: f64, last_price: f64) -> bool {
    match side {
        Side::Buy => price_min >= last_price,
        Side::Sell => price_min <= last_price,
    }
}

/// Fails unless `currency` has at least `needed` free
pub fn check_balance(
    exchange: &dyn Exchange,
    currency: &str,
    needed: f64,
) -> Result<f64, LadderError> {
    let balances = exchange
        .list_balances()
        .map_err(|e| LadderError::gateway("list balances", e))?;

    let available = match balances.iter().find(|b| b.currency.eq_ignore_ascii_case(currency)) {
        Some(balance) => balance.free()?,
        None => 0.0,
    };
    debug!("Free {} balance: {}", currency, available);

    if available < needed {
        return Err(LadderError::InsufficientBalance {
            currency: currency.to_string(),
            available,
            needed,
        });
    }
    Ok(available)
}

/// Submit plain orders in batches, in order. A failed batch is reported
/// and the following batches are still sent.
pub fn dispatch_orders(
    exchange: &dyn Exchange,
    pair: &Pair,
    orders: &[OrderRequest],
) -> DispatchSummary {
    let mut summary = DispatchSummary::default();
    let mut sent = 0;

    for chunk in orders.chunks(MAX_BATCH_SIZE) {
        summary.calls += 1;
        sent += chunk.len();

        if let [order] = chunk {
            match exchange.create_order(order) {
                Ok(record) => {
                    summary.accepted += 1;
                    note_single_fill(&record, pair, &mut summary);
                }
                Err(e) => {
                    summary.failed_calls += 1;
                    report_failure("create order", &e);
                }
            }
        } else {
            match exchange.create_batch_orders(chunk) {
                Ok(results) => {
                    for result in results {
                        if !result.succeeded {
                            summary.rejected += 1;
                            warn!(
                                "Order {} rejected: {}: {}",
                                result.text, result.label, result.message
                            );
                            continue;
                        }
                        summary.accepted += 1;
                        if result.is_filled() {
                            summary.filled += 1;
                            println!(
                                "Order get filled: price: {} {}, amount: {} {}, total: {} {}",
                                result.fill_price,
                                pair.quote(),
                                result.amount,
                                pair.base(),
                                result.filled_total,
                                pair.quote()
                            );
                        }
                    }
                }
                Err(e) => {
                    summary.failed_calls += 1;
                    report_failure("create batch orders", &e);
                }
            }
        }

        println!("{}/{} orders sent", sent, orders.len());
    }

    summary
}

/// Submit triggered orders one at a time
pub fn dispatch_triggered_orders(
    exchange: &dyn Exchange,
    orders: &[TriggeredOrderRequest],
) -> DispatchSummary {
    let mut summary = DispatchSummary::default();

    for order in orders {
        summary.calls += 1;
        match exchange.create_triggered_order(order) {
            Ok(id) => {
                summary.accepted += 1;
                println!(
                    "Triggered order {} set: {} {} at {} when price {} {}",
                    id,
                    order.put.side,
                    order.put.amount,
                    order.put.price,
                    order.trigger_rule,
                    order.trigger_price
                );
            }
            Err(e) => {
                summary.failed_calls += 1;
                report_failure("create triggered order", &e);
            }
        }
    }

    summary
}

fn note_single_fill(record: &OrderRecord, pair: &Pair, summary: &mut DispatchSummary) {
    if record.status == "closed" {
        summary.filled += 1;
        println!(
            "Order get filled: price: {} {}, amount: {} {}, total: {} {}",
            record.avg_deal_price,
            pair.quote(),
            record.amount,
            pair.base(),
            record.filled_total,
            pair.quote()
        );
    }
}

/// Open orders on `pair`; a failed listing counts as none
fn open_orders(exchange: &dyn Exchange, pair: &Pair) -> Vec<OrderRecord> {
    exchange
        .list_open_orders(&pair.to_string())
        .unwrap_or_else(|e| {
            report_failure("list open orders", &e);
            Vec::new()
        })
}

fn report_failure(operation: &str, err: &GatewayError) {
    warn!("{} failed: {}", operation, err);
}

fn aborted(at: &str) -> RunOutcome {
    info!("Aborted by operator at {}", at);
    RunOutcome::Aborted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_immediately() {
        assert!(fills_immediately(Side::Buy, 1.2, 1.1));
        assert!(fills_immediately(Side::Buy, 1.1, 1.1));
        assert!(!fills_immediately(Side::Buy, 1.0, 1.1));
        assert!(fills_immediately(Side::Sell, 1.0, 1.1));
        assert!(fills_immediately(Side::Sell, 1.1, 1.1));
        assert!(!fills_immediately(Side::Sell, 1.2, 1.1));
    }
}
