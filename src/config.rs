//! Configuration management
//!
//! Command-line arguments are parsed once by clap and validated into an
//! immutable [`LadderConfig`] that is handed to the workflow. Validation
//! collects every problem so the operator sees them all at once.

use clap::Args;
use std::path::PathBuf;

use crate::error::LadderError;
use crate::types::{Pair, Side, TimeInForce};

/// Default distance between two ladder levels, in quote currency
pub const DEFAULT_STEPS: f64 = 0.005;

/// Default number of past orders to list
pub const DEFAULT_LIST_LIMIT: u32 = 10;

/// Default trading pair
pub const DEFAULT_PAIR: &str = "ALPH_USDT";

/// Raw command-line arguments
#[derive(Args, Debug, Clone)]
pub struct LadderArgs {
    /// Minimum (starting) price of the ladder
    #[arg(long, default_value_t = 0.0)]
    pub min: f64,

    /// Maximum price of the ladder (exclusive)
    #[arg(long, default_value_t = 0.0)]
    pub max: f64,

    /// buy or sell
    #[arg(long)]
    pub side: Option<String>,

    /// Total amount in quote currency (e.g. USDT)
    #[arg(long, alias = "amountUsdt", default_value_t = 0.0)]
    pub amount_quote: f64,

    /// Total amount in base currency (e.g. ALPH)
    #[arg(long, alias = "amountAlph", default_value_t = 0.0)]
    pub amount_base: f64,

    /// Step between two ladder prices
    #[arg(long, default_value_t = DEFAULT_STEPS)]
    pub steps: f64,

    /// Time in force: good till cancel (gtc) or immediate or cancel (ioc)
    #[arg(long, default_value = "gtc")]
    pub timeinforce: String,

    /// Use stop-limit (price-triggered) orders instead of limit orders
    #[arg(long)]
    pub sl: bool,

    /// List open orders and exit
    #[arg(long)]
    pub listopen: bool,

    /// List past filled orders and exit
    #[arg(long)]
    pub list: bool,

    /// Number of past orders to check
    #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
    pub limit: u32,

    /// Only list orders from the last N days
    #[arg(long, default_value_t = 0)]
    pub lastdays: u32,

    /// Currency pair to trade
    #[arg(long, default_value = DEFAULT_PAIR)]
    pub pair: String,

    /// File holding GATEIO_KEY and GATEIO_SECRET
    #[arg(long, default_value = ".env")]
    pub env_file: PathBuf,

    /// Use the Gate.io testnet
    #[arg(long)]
    pub testnet: bool,
}

impl Default for LadderArgs {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 0.0,
            side: None,
            amount_quote: 0.0,
            amount_base: 0.0,
            steps: DEFAULT_STEPS,
            timeinforce: "gtc".to_string(),
            sl: false,
            listopen: false,
            list: false,
            limit: DEFAULT_LIST_LIMIT,
            lastdays: 0,
            pair: DEFAULT_PAIR.to_string(),
            env_file: PathBuf::from(".env"),
            testnet: false,
        }
    }
}

/// Currency the total amount is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denomination {
    Quote,
    Base,
}

/// Kind of orders the ladder is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStyle {
    Plain,
    Triggered,
}

/// Parameters of a ladder placement
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceOrders {
    pub side: Side,
    pub price_min: f64,
    pub price_max: f64,
    pub amount: f64,
    pub denomination: Denomination,
    pub steps: f64,
    pub time_in_force: TimeInForce,
    pub use_stop_limit: bool,
}

impl PlaceOrders {
    /// Currency the balance check runs against
    pub fn balance_currency<'a>(&self, pair: &'a Pair) -> &'a str {
        match self.denomination {
            Denomination::Quote => pair.quote(),
            Denomination::Base => pair.base(),
        }
    }
}

/// What the run does
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Report filled orders on both sides
    ListFilled { limit: u32, last_days: u32 },
    /// Report open orders
    ListOpen,
    /// Build and submit a ladder
    Place(PlaceOrders),
}

/// Validated run configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LadderConfig {
    pub pair: Pair,
    pub action: Action,
    pub env_file: PathBuf,
    pub testnet: bool,
}

impl LadderConfig {
    /// Validate raw arguments. Listing modes skip the ladder checks.
    pub fn from_args(args: LadderArgs) -> Result<Self, LadderError> {
        let mut problems = Vec::new();

        let pair = match args.pair.parse::<Pair>() {
            Ok(pair) => Some(pair),
            Err(e) => {
                problems.push(e);
                None
            }
        };

        let action = if args.list {
            Some(Action::ListFilled {
                limit: args.limit,
                last_days: args.lastdays,
            })
        } else if args.listopen {
            Some(Action::ListOpen)
        } else {
            validate_placement(&args, &mut problems).map(Action::Place)
        };

        match (pair, action) {
            (Some(pair), Some(action)) if problems.is_empty() => Ok(LadderConfig {
                pair,
                action,
                env_file: args.env_file,
                testnet: args.testnet,
            }),
            _ => Err(LadderError::InvalidArguments(problems)),
        }
    }
}

/// Finite and strictly positive. NaN fails every comparison, so the
/// check is written to reject it.
fn is_positive(value: f64) -> bool {
    value > 0.0 && value.is_finite()
}

fn check_price(name: &str, value: f64, problems: &mut Vec<String>) {
    if value == 0.0 {
        problems.push(format!("{} argument is mandatory", name));
    } else if !is_positive(value) {
        problems.push(format!("{} must be a positive finite price", name));
    }
}

fn validate_placement(args: &LadderArgs, problems: &mut Vec<String>) -> Option<PlaceOrders> {
    let before = problems.len();

    check_price("min", args.min, problems);
    check_price("max", args.max, problems);
    if !(args.min < args.max) {
        problems.push("min cannot be higher than max".to_string());
    }
    if !is_positive(args.steps) {
        problems.push("steps must be strictly positive".to_string());
    }
    if !args.amount_quote.is_finite() || !args.amount_base.is_finite() {
        problems.push("amount must be a finite number".to_string());
    }

    let denomination = match (is_positive(args.amount_quote), is_positive(args.amount_base)) {
        (false, false) => {
            problems.push("amount is mandatory".to_string());
            None
        }
        (true, true) => {
            problems.push("cannot mix amount, select only one".to_string());
            None
        }
        (true, false) => Some((Denomination::Quote, args.amount_quote)),
        (false, true) => Some((Denomination::Base, args.amount_base)),
    };

    let side = match args.side.as_deref() {
        None | Some("") => {
            problems.push("side is mandatory (buy or sell)".to_string());
            None
        }
        Some(raw) => match raw.parse::<Side>() {
            Ok(side) => Some(side),
            Err(e) => {
                problems.push(e);
                None
            }
        },
    };

    let time_in_force = match args.timeinforce.parse::<TimeInForce>() {
        Ok(tif) => Some(tif),
        Err(_) => {
            problems.push("time in force accepted values: gtc or ioc".to_string());
            None
        }
    };

    if problems.len() != before {
        return None;
    }

    let (denomination, amount) = denomination?;
    Some(PlaceOrders {
        side: side?,
        price_min: args.min,
        price_max: args.max,
        amount,
        denomination,
        steps: args.steps,
        time_in_force: time_in_force?,
        use_stop_limit: args.sl,
    })
}
