//! Exchange capability interface
//!
//! The workflow only talks to the exchange through [`Exchange`], so the
//! ladder logic stays independent of Gate.io and can be driven by a stub in
//! tests. Every call is blocking.

use crate::error::GatewayResult;
use crate::types::{
    AccountDetail, Balance, BatchOrderResult, ListOrdersQuery, OrderRecord, OrderRequest,
    OrderStatus, Ticker, TriggeredOrderRequest,
};

/// Largest batch accepted by a batch order call
pub const MAX_BATCH_SIZE: usize = 10;

/// Page size used when listing open orders
pub const OPEN_ORDERS_PAGE_SIZE: u32 = 100;

pub trait Exchange {
    /// Place one limit order
    fn create_order(&self, order: &OrderRequest) -> GatewayResult<OrderRecord>;

    /// Place up to [`MAX_BATCH_SIZE`] limit orders in one call
    fn create_batch_orders(&self, orders: &[OrderRequest]) -> GatewayResult<Vec<BatchOrderResult>>;

    /// Place a price-triggered order, returning its id
    fn create_triggered_order(&self, order: &TriggeredOrderRequest) -> GatewayResult<String>;

    /// List orders of a pair by status
    fn list_orders(
        &self,
        pair: &str,
        status: OrderStatus,
        query: &ListOrdersQuery,
    ) -> GatewayResult<Vec<OrderRecord>>;

    /// All open orders on a pair
    fn list_open_orders(&self, pair: &str) -> GatewayResult<Vec<OrderRecord>>;

    /// Spot balances
    fn list_balances(&self) -> GatewayResult<Vec<Balance>>;

    /// Latest ticker of a pair
    fn ticker(&self, pair: &str) -> GatewayResult<Ticker>;

    /// Account details; used to check the credentials work
    fn account_detail(&self) -> GatewayResult<AccountDetail>;
}
