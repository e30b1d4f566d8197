//! Typed results of reconciliation: what happened, and what the customer
//! should be told about it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use coupon_core::{DomainError, OrderId};

use crate::coupon::CouponCode;
use crate::order::Order;

/// What a reconciliation step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// Nothing to do (no coupon, or totals already fine).
    NoOp,
    /// The coupon discount was folded into the displayed totals.
    DiscountApplied,
    /// The coupon was removed because the order total went negative.
    DiscountRolledBack,
    /// The coupon order had already been finalized; nothing was changed.
    FinalizeSkipped,
    /// The coupon order was finalized and the coupon's counter decremented.
    Finalized,
}

/// Non-fatal message surfaced to the customer after a reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponNotice {
    /// The coupon no longer applies: it would make the total negative.
    NegativeTotal,
    /// The coupon was already used and cannot be applied again.
    AlreadyUsed,
}

impl CouponNotice {
    /// Translation key understood by the host's message catalogue.
    pub fn message_key(&self) -> &'static str {
        match self {
            CouponNotice::NegativeTotal => "front.plugin.coupon.shopping.use.minus",
            CouponNotice::AlreadyUsed => "front.plugin.coupon.shopping.sameuser",
        }
    }
}

/// Adjusted order snapshot plus what was done to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub order: Order,
    pub outcome: ReconcileOutcome,
    pub notice: Option<CouponNotice>,
}

impl Reconciled {
    pub fn unchanged(order: Order) -> Self {
        Self {
            order,
            outcome: ReconcileOutcome::NoOp,
            notice: None,
        }
    }

    pub fn rolled_back(&self) -> bool {
        self.outcome == ReconcileOutcome::DiscountRolledBack
    }
}

/// Coupon was already consumed; the current request must stop.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CouponUsageError {
    #[error("coupon {coupon_code} was already used by another customer")]
    ClaimedByOtherCustomer { coupon_code: CouponCode },

    #[error("coupon {coupon_code} was already used by this customer")]
    AlreadyUsedByCustomer { coupon_code: CouponCode },

    #[error("coupon {coupon_code} was already used for order {order_id}")]
    AlreadyUsedForOrder {
        coupon_code: CouponCode,
        order_id: OrderId,
    },

    /// The usage history could not be read; not a conflict.
    #[error("coupon usage lookup failed: {0}")]
    Lookup(#[from] DomainError),
}

impl CouponUsageError {
    pub fn is_conflict(&self) -> bool {
        !matches!(self, CouponUsageError::Lookup(_))
    }

    pub fn notice(&self) -> Option<CouponNotice> {
        self.is_conflict().then_some(CouponNotice::AlreadyUsed)
    }
}
