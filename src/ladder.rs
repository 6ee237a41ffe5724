//! Ladder (grid) order generation
//!
//! Splits a price range into levels `step` apart and sizes one order per
//! level. The total amount is given either in quote currency, in which case
//! each level gets the same quote budget and the base amount shrinks as the
//! price rises, or in base currency, in which case every level gets the
//! same base amount.
//!
//! The running budget is decremented by each level's amount valued at the
//! *next* level's price (quote mode) or by the flat per-level amount (base
//! mode), and generation stops as soon as the remaining budget can no
//! longer cover a full level. With a budget that divides evenly this emits
//! one level fewer than the range holds.

use rand::Rng;

use crate::config::{Denomination, OrderStyle, PlaceOrders};
use crate::error::LadderError;
use crate::math::{format_decimal, round_to};
use crate::types::{
    OrderRequest, Pair, PutOrder, Side, TimeInForce, TriggerRule, TriggeredOrderRequest,
};

/// Smallest order value accepted by the exchange, in quote currency
pub const MIN_NOTIONAL: f64 = 1.0;

/// Prices keep four decimals
pub const PRICE_RESOLUTION: f64 = 10_000.0;

/// Triggered put-order amounts keep three decimals
pub const TRIGGERED_AMOUNT_RESOLUTION: f64 = 1_000.0;

/// Distance between a level's limit price and its trigger price
pub const TRIGGER_OFFSET: f64 = 0.001;

/// Triggered orders expire after one day
pub const TRIGGER_EXPIRATION_SECS: i64 = 86_400;

/// Random characters after the `t-` prefix of a client tag
pub const CLIENT_TAG_LEN: usize = 10;

const CLIENT_TAG_CHARSET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_-.";

/// Everything needed to build a ladder
#[derive(Debug, Clone, PartialEq)]
pub struct LadderRequest {
    pub pair: Pair,
    pub side: Side,
    pub price_min: f64,
    pub price_max: f64,
    pub total_amount: f64,
    pub step: f64,
    pub denomination: Denomination,
    pub style: OrderStyle,
    pub time_in_force: TimeInForce,
}

impl LadderRequest {
    pub fn from_placement(pair: &Pair, place: &PlaceOrders, style: OrderStyle) -> Self {
        Self {
            pair: pair.clone(),
            side: place.side,
            price_min: place.price_min,
            price_max: place.price_max,
            total_amount: place.amount,
            step: place.steps,
            denomination: place.denomination,
            style,
            time_in_force: place.time_in_force,
        }
    }

    /// Number of levels the range holds (at least one)
    pub fn level_count(&self) -> usize {
        level_count(self.price_min, self.price_max, self.step)
    }

    /// Currency `total_amount` is expressed in
    pub fn amount_currency(&self) -> &str {
        match self.denomination {
            Denomination::Quote => self.pair.quote(),
            Denomination::Base => self.pair.base(),
        }
    }
}

/// One rung of the ladder
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    /// Limit price, rounded
    pub price: f64,
    /// Base-asset amount
    pub amount: f64,
    /// Value of the level in quote currency
    pub notional: f64,
    /// Budget left before this level was emitted
    pub remaining: f64,
    /// Trigger price for triggered orders, rounded
    pub trigger_price: Option<f64>,
}

/// Orders produced for a ladder
#[derive(Debug, Clone, PartialEq)]
pub enum LadderOrders {
    Plain(Vec<OrderRequest>),
    Triggered(Vec<TriggeredOrderRequest>),
}

impl LadderOrders {
    pub fn len(&self) -> usize {
        match self {
            LadderOrders::Plain(orders) => orders.len(),
            LadderOrders::Triggered(orders) => orders.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Generated ladder together with the figures shown for review
#[derive(Debug, Clone, PartialEq)]
pub struct Ladder {
    pub request: LadderRequest,
    /// Levels the range holds before early termination
    pub requested_levels: usize,
    /// Per-level budget, in the request's denomination
    pub amount_per_level: f64,
    /// Sum of what the emitted levels commit, in the request's denomination
    pub total_committed: f64,
    pub levels: Vec<Level>,
    pub orders: LadderOrders,
}

/// `round(|max - min| / step)`, never less than one
pub fn level_count(price_min: f64, price_max: f64, step: f64) -> usize {
    let levels = ((price_max - price_min).abs() / step).round();
    if levels.is_finite() && levels >= 1.0 {
        levels as usize
    } else {
        1
    }
}

/// Client tag: `t-` followed by random characters
pub fn generate_client_tag() -> String {
    let mut rng = rand::thread_rng();
    let tag: String = (0..CLIENT_TAG_LEN)
        .map(|_| CLIENT_TAG_CHARSET[rng.gen_range(0..CLIENT_TAG_CHARSET.len())] as char)
        .collect();
    format!("t-{}", tag)
}

/// Build the ladder for `request`.
///
/// Fails with [`LadderError::NotionalTooSmall`] when a level would be worth
/// less than [`MIN_NOTIONAL`] of quote currency.
pub fn generate_ladder(request: &LadderRequest) -> Result<Ladder, LadderError> {
    let requested_levels = request.level_count();
    let amount_per_level = request.total_amount / requested_levels as f64;

    let per_level_value = match request.denomination {
        Denomination::Quote => amount_per_level,
        Denomination::Base => amount_per_level * request.price_min,
    };
    if per_level_value < MIN_NOTIONAL {
        return Err(LadderError::NotionalTooSmall {
            per_level: amount_per_level,
            minimum: MIN_NOTIONAL,
            currency: request.pair.quote().to_string(),
        });
    }

    let mut levels = Vec::with_capacity(requested_levels);
    let mut remaining = request.total_amount;
    let mut total_committed = 0.0;

    for i in 0..requested_levels {
        let price = request.price_min + i as f64 * request.step;

        let amount = match (request.denomination, request.style) {
            (Denomination::Quote, OrderStyle::Plain) => amount_per_level / price,
            (Denomination::Quote, OrderStyle::Triggered) => {
                round_to(amount_per_level / price, TRIGGERED_AMOUNT_RESOLUTION)
            }
            (Denomination::Base, OrderStyle::Plain) => amount_per_level,
            (Denomination::Base, OrderStyle::Triggered) => {
                round_to(amount_per_level, TRIGGERED_AMOUNT_RESOLUTION)
            }
        };

        if remaining - amount_per_level <= 0.0 {
            break;
        }

        let trigger_price = match request.style {
            OrderStyle::Plain => None,
            OrderStyle::Triggered => Some(round_to(price - TRIGGER_OFFSET, PRICE_RESOLUTION)),
        };

        levels.push(Level {
            price: round_to(price, PRICE_RESOLUTION),
            amount,
            notional: amount * price,
            remaining,
            trigger_price,
        });

        let spent = match request.denomination {
            Denomination::Quote => amount * (price + request.step),
            Denomination::Base => amount,
        };
        remaining -= spent;
        total_committed += spent;
    }

    let orders = match request.style {
        OrderStyle::Plain => LadderOrders::Plain(
            levels
                .iter()
                .map(|level| plain_order(request, level))
                .collect(),
        ),
        OrderStyle::Triggered => LadderOrders::Triggered(
            levels
                .iter()
                .map(|level| triggered_order(request, level))
                .collect(),
        ),
    };

    Ok(Ladder {
        request: request.clone(),
        requested_levels,
        amount_per_level,
        total_committed,
        levels,
        orders,
    })
}

fn plain_order(request: &LadderRequest, level: &Level) -> OrderRequest {
    OrderRequest {
        text: generate_client_tag(),
        currency_pair: request.pair.to_string(),
        side: request.side,
        price: format_decimal(level.price),
        amount: format_decimal(level.amount),
        time_in_force: request.time_in_force,
    }
}

fn triggered_order(request: &LadderRequest, level: &Level) -> TriggeredOrderRequest {
    let trigger_price = level
        .trigger_price
        .unwrap_or_else(|| round_to(level.price - TRIGGER_OFFSET, PRICE_RESOLUTION));

    TriggeredOrderRequest {
        market: request.pair.to_string(),
        put: PutOrder {
            side: request.side,
            price: format_decimal(level.price),
            amount: format_decimal(level.amount),
            time_in_force: TimeInForce::ImmediateOrCancel,
        },
        trigger_price: format_decimal(trigger_price),
        trigger_rule: TriggerRule::for_side(request.side),
        expiration_secs: TRIGGER_EXPIRATION_SECS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn request(denomination: Denomination, style: OrderStyle, total: f64) -> LadderRequest {
        LadderRequest {
            pair: Pair::new("ALPH", "USDT"),
            side: Side::Buy,
            price_min: 1.0,
            price_max: 1.1,
            total_amount: total,
            step: 0.005,
            denomination,
            style,
            time_in_force: TimeInForce::GoodTillCancel,
        }
    }

    fn plain(ladder: &Ladder) -> &[OrderRequest] {
        match &ladder.orders {
            LadderOrders::Plain(orders) => orders.as_slice(),
            LadderOrders::Triggered(_) => panic!("expected plain orders"),
        }
    }

    fn triggered(ladder: &Ladder) -> &[TriggeredOrderRequest] {
        match &ladder.orders {
            LadderOrders::Triggered(orders) => orders.as_slice(),
            LadderOrders::Plain(_) => panic!("expected triggered orders"),
        }
    }

    #[test]
    fn test_level_count() {
        assert_eq!(level_count(1.0, 1.1, 0.005), 20);
        assert_eq!(level_count(1.0, 1.13, 0.005), 26);
        assert_eq!(level_count(1.0, 1.5, 0.1), 5);
        // narrower than one step still yields one level
        assert_eq!(level_count(1.0, 1.001, 0.005), 1);
    }

    #[test]
    fn test_quote_ladder_reference_scenario() {
        let ladder = generate_ladder(&request(Denomination::Quote, OrderStyle::Plain, 100.0)).unwrap();

        assert_eq!(ladder.requested_levels, 20);
        assert_relative_eq!(ladder.amount_per_level, 5.0);
        assert_eq!(ladder.levels.len(), 19);

        let first = &ladder.levels[0];
        assert_relative_eq!(first.price, 1.0);
        assert_relative_eq!(first.amount, 5.0);
        assert_relative_eq!(first.remaining, 100.0);

        let orders = plain(&ladder);
        assert_eq!(orders.len(), 19);
        assert_eq!(orders[0].price, "1");
        assert_eq!(orders[0].amount, "5");
        assert_eq!(orders[1].price, "1.005");
        assert_eq!(orders[18].price, "1.09");
    }

    #[test]
    fn test_quote_amount_is_budget_over_price() {
        let ladder = generate_ladder(&request(Denomination::Quote, OrderStyle::Plain, 100.0)).unwrap();
        for (i, level) in ladder.levels.iter().enumerate() {
            let raw_price = 1.0 + i as f64 * 0.005;
            assert_relative_eq!(level.amount, 5.0 / raw_price, epsilon = 1e-12);
            assert_abs_diff_eq!(level.notional, 5.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_quote_budget_drift_is_priced_at_next_level() {
        let ladder = generate_ladder(&request(Denomination::Quote, OrderStyle::Plain, 100.0)).unwrap();
        // 5 / 1.0 units re-valued at 1.005
        assert_relative_eq!(ladder.levels[1].remaining, 100.0 - 5.0 * 1.005, epsilon = 1e-9);
        assert!(ladder.total_committed > 95.0);
        assert!(ladder.total_committed < 100.0);
    }

    #[test]
    fn test_quote_prices_are_rounded() {
        let ladder = generate_ladder(&request(Denomination::Quote, OrderStyle::Plain, 100.0)).unwrap();
        for order in plain(&ladder) {
            let decimals = order.price.split('.').nth(1).map_or(0, str::len);
            assert!(decimals <= 4, "price {} has too many decimals", order.price);
        }
    }

    #[test]
    fn test_base_ladder_constant_amount() {
        let ladder = generate_ladder(&request(Denomination::Base, OrderStyle::Plain, 100.0)).unwrap();

        assert_relative_eq!(ladder.amount_per_level, 5.0);
        // flat decrement: 100 - 19 * 5 leaves exactly one level's worth
        assert_eq!(ladder.levels.len(), 19);
        for level in &ladder.levels {
            assert_eq!(level.amount, 5.0);
        }
        for order in plain(&ladder) {
            assert_eq!(order.amount, "5");
        }
        assert_relative_eq!(ladder.total_committed, 95.0);
    }

    #[test]
    fn test_quote_minimum_notional() {
        // 15 USDT over 20 levels is 0.75 per level
        let err = generate_ladder(&request(Denomination::Quote, OrderStyle::Plain, 15.0)).unwrap_err();
        match err {
            LadderError::NotionalTooSmall {
                per_level, minimum, ..
            } => {
                assert_relative_eq!(per_level, 0.75);
                assert_eq!(minimum, MIN_NOTIONAL);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_base_minimum_notional_uses_start_price() {
        let mut req = request(Denomination::Base, OrderStyle::Plain, 10.0);
        req.price_min = 0.1;
        req.price_max = 0.2;
        // 0.5 ALPH per level at 0.1 USDT is 0.05 USDT
        assert!(matches!(
            generate_ladder(&req),
            Err(LadderError::NotionalTooSmall { .. })
        ));

        let mut req = request(Denomination::Base, OrderStyle::Plain, 20.0);
        req.price_min = 1.0;
        // exactly 1 USDT per level is accepted
        assert!(generate_ladder(&req).is_ok());
    }

    #[test]
    fn test_triggered_buy_orders() {
        let ladder =
            generate_ladder(&request(Denomination::Quote, OrderStyle::Triggered, 100.0)).unwrap();
        let orders = triggered(&ladder);
        assert_eq!(orders.len(), 19);

        let first = &orders[0];
        assert_eq!(first.market, "ALPH_USDT");
        assert_eq!(first.trigger_rule, TriggerRule::GreaterOrEqual);
        assert_eq!(first.trigger_price, "0.999");
        assert_eq!(first.expiration_secs, TRIGGER_EXPIRATION_SECS);
        assert_eq!(first.put.price, "1");
        assert_eq!(first.put.amount, "5");
        assert_eq!(first.put.time_in_force, TimeInForce::ImmediateOrCancel);

        // 5 / 1.005 = 4.975124... rounded to three decimals
        assert_eq!(orders[1].put.amount, "4.975");
        assert_eq!(orders[1].trigger_price, "1.004");
    }

    #[test]
    fn test_triggered_sell_offset_is_still_subtracted() {
        let mut req = request(Denomination::Quote, OrderStyle::Triggered, 100.0);
        req.side = Side::Sell;
        req.time_in_force = TimeInForce::GoodTillCancel;

        let ladder = generate_ladder(&req).unwrap();
        for (order, level) in triggered(&ladder).iter().zip(&ladder.levels) {
            assert_eq!(order.trigger_rule, TriggerRule::LessOrEqual);
            assert_eq!(order.put.side, Side::Sell);
            assert_eq!(order.put.time_in_force, TimeInForce::ImmediateOrCancel);
            let expected = round_to(level.price - TRIGGER_OFFSET, PRICE_RESOLUTION);
            assert_eq!(order.trigger_price, format_decimal(expected));
        }
    }

    #[test]
    fn test_triggered_base_ladder() {
        let ladder =
            generate_ladder(&request(Denomination::Base, OrderStyle::Triggered, 100.0)).unwrap();
        let orders = triggered(&ladder);
        assert_eq!(orders.len(), 19);
        assert!(orders.iter().all(|o| o.put.amount == "5"));
    }

    #[test]
    fn test_plain_orders_keep_requested_time_in_force() {
        let mut req = request(Denomination::Quote, OrderStyle::Plain, 100.0);
        req.time_in_force = TimeInForce::ImmediateOrCancel;
        let ladder = generate_ladder(&req).unwrap();
        assert!(plain(&ladder)
            .iter()
            .all(|o| o.time_in_force == TimeInForce::ImmediateOrCancel && o.side == Side::Buy));
    }

    #[test]
    fn test_client_tag_format() {
        let tag = generate_client_tag();
        assert!(tag.starts_with("t-"));
        assert_eq!(tag.len(), 2 + CLIENT_TAG_LEN);
        assert!(tag[2..]
            .bytes()
            .all(|b| CLIENT_TAG_CHARSET.contains(&b)));
    }

    #[test]
    fn test_plain_orders_carry_tags() {
        let ladder = generate_ladder(&request(Denomination::Quote, OrderStyle::Plain, 100.0)).unwrap();
        assert!(plain(&ladder).iter().all(|o| o.text.starts_with("t-")));
    }

    #[test]
    fn test_single_level_range() {
        let mut req = request(Denomination::Quote, OrderStyle::Plain, 10.0);
        req.price_max = 1.001;
        let ladder = generate_ladder(&req).unwrap();
        assert_eq!(ladder.requested_levels, 1);
        // the whole budget is one level, which the budget check stops at once
        assert!(ladder.levels.is_empty());
        assert!(ladder.orders.is_empty());
    }
}
