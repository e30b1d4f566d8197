use serde::{Deserialize, Serialize};

use coupon_core::{DomainError, DomainResult, OrderId, PreOrderId};

/// Order snapshot handed to the coupon layer by the host.
///
/// The host owns and persists orders; the coupon layer only returns adjusted
/// copies. Amounts are in the smallest currency unit and signed, because an
/// over-discounted order is exactly the state reconciliation has to detect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Present only once checkout has completed.
    pub order_id: Option<OrderId>,
    pub pre_order_id: PreOrderId,
    pub subtotal: i64,
    /// Handling charge (e.g. payment fee).
    pub charge: i64,
    pub delivery_fee_total: i64,
    pub discount: i64,
    pub total: i64,
    pub payment_total: i64,
}

impl Order {
    /// Build a snapshot whose `total`/`payment_total` already satisfy the total
    /// identity for the given components.
    pub fn new(
        pre_order_id: PreOrderId,
        subtotal: i64,
        charge: i64,
        delivery_fee_total: i64,
        discount: i64,
    ) -> DomainResult<Self> {
        let mut order = Self {
            order_id: None,
            pre_order_id,
            subtotal,
            charge,
            delivery_fee_total,
            discount,
            total: 0,
            payment_total: 0,
        };
        order.total = order.expected_total()?;
        order.payment_total = order.total;
        Ok(order)
    }

    pub fn with_order_id(mut self, order_id: OrderId) -> Self {
        self.order_id = Some(order_id);
        self
    }

    /// Sum of everything charged before any discount.
    pub fn raw_total(&self) -> DomainResult<i64> {
        self.subtotal
            .checked_add(self.charge)
            .and_then(|sum| sum.checked_add(self.delivery_fee_total))
            .ok_or_else(|| amount_overflow(&self.pre_order_id))
    }

    /// `subtotal + charge + delivery_fee_total - discount`.
    pub fn expected_total(&self) -> DomainResult<i64> {
        self.raw_total()?
            .checked_sub(self.discount)
            .ok_or_else(|| amount_overflow(&self.pre_order_id))
    }

    /// Whether `total` matches the total identity.
    pub fn is_total_consistent(&self) -> bool {
        self.expected_total().is_ok_and(|total| total == self.total)
    }
}

pub(crate) fn amount_overflow(pre_order_id: &PreOrderId) -> DomainError {
    DomainError::validation(format!("order {pre_order_id}: amounts out of range"))
}

/// Shipping argument of a delivery-change event; carries the order it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipping {
    pub order: Order,
}

impl Shipping {
    pub fn new(order: Order) -> Self {
        Self { order }
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn into_order(self) -> Order {
        self.order
    }
}
