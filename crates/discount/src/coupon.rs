use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coupon_core::{
    CouponId, CustomerId, DomainError, DomainResult, Entity, OrderId, PreOrderId, ValueObject,
};

/// Code a customer types in to claim a coupon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CouponCode(String);

impl CouponCode {
    pub fn new(code: impl Into<String>) -> DomainResult<Self> {
        let code = code.into().trim().to_string();
        if code.is_empty() {
            return Err(DomainError::validation("coupon code must not be empty"));
        }
        if code.chars().any(char::is_whitespace) {
            return Err(DomainError::validation(
                "coupon code must not contain whitespace",
            ));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for CouponCode {}

impl core::fmt::Display for CouponCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who entered a coupon: a logged-in member, or a guest identified by the
/// e-mail address of their non-member session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Customer {
    Member { customer_id: CustomerId },
    Guest { email: String },
}

impl Customer {
    pub fn member(customer_id: CustomerId) -> Self {
        Self::Member { customer_id }
    }

    /// Guest e-mails compare case-insensitively.
    pub fn guest(email: impl AsRef<str>) -> Self {
        Self::Guest {
            email: email.as_ref().trim().to_lowercase(),
        }
    }

    pub fn is_member(&self) -> bool {
        matches!(self, Self::Member { .. })
    }
}

impl ValueObject for Customer {}

/// Coupon definition with its remaining issue count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    coupon_id: CouponId,
    coupon_code: CouponCode,
    remaining_uses: i64,
    active: bool,
}

impl Coupon {
    pub fn new(coupon_id: CouponId, coupon_code: CouponCode, remaining_uses: i64) -> Self {
        Self {
            coupon_id,
            coupon_code,
            remaining_uses,
            active: true,
        }
    }

    pub fn coupon_id(&self) -> CouponId {
        self.coupon_id
    }

    pub fn coupon_code(&self) -> &CouponCode {
        &self.coupon_code
    }

    pub fn remaining_uses(&self) -> i64 {
        self.remaining_uses
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Take one use off the counter. Going below zero is tolerated: the order
    /// has already been placed by the time this runs.
    pub fn consume_one(&mut self) {
        self.remaining_uses = self.remaining_uses.saturating_sub(1);
    }
}

impl Entity for Coupon {
    type Id = CouponId;

    fn id(&self) -> &Self::Id {
        &self.coupon_id
    }
}

/// Association between one coupon application and one (pre-)order.
///
/// Keyed by pre-order id: at most one exists per in-progress order.
/// `order_date` doubles as the finalized marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponOrder {
    coupon_id: CouponId,
    coupon_code: CouponCode,
    order_id: Option<OrderId>,
    pre_order_id: PreOrderId,
    customer: Customer,
    discount: i64,
    order_date: Option<DateTime<Utc>>,
    update_date: DateTime<Utc>,
    used: bool,
}

impl CouponOrder {
    /// Record a coupon entered for an in-progress order.
    ///
    /// Rejects negative discounts.
    pub fn new(
        coupon: &Coupon,
        pre_order_id: PreOrderId,
        customer: Customer,
        discount: i64,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if discount < 0 {
            return Err(DomainError::validation("coupon discount must not be negative"));
        }

        Ok(Self {
            coupon_id: coupon.coupon_id(),
            coupon_code: coupon.coupon_code().clone(),
            order_id: None,
            pre_order_id,
            customer,
            discount,
            order_date: None,
            update_date: occurred_at,
            used: false,
        })
    }

    pub fn coupon_id(&self) -> CouponId {
        self.coupon_id
    }

    pub fn coupon_code(&self) -> &CouponCode {
        &self.coupon_code
    }

    pub fn order_id(&self) -> Option<OrderId> {
        self.order_id
    }

    pub fn pre_order_id(&self) -> &PreOrderId {
        &self.pre_order_id
    }

    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    pub fn discount(&self) -> i64 {
        self.discount
    }

    pub fn order_date(&self) -> Option<DateTime<Utc>> {
        self.order_date
    }

    pub fn update_date(&self) -> DateTime<Utc> {
        self.update_date
    }

    pub fn is_used(&self) -> bool {
        self.used
    }

    pub fn is_finalized(&self) -> bool {
        self.order_date.is_some()
    }

    /// Link the record to the order id assigned at checkout.
    pub fn attach_order(&mut self, order_id: OrderId, occurred_at: DateTime<Utc>) {
        self.order_id = Some(order_id);
        self.update_date = occurred_at;
    }

    /// Stamp the completion dates and flag the coupon as consumed.
    pub fn finalize(&mut self, occurred_at: DateTime<Utc>) {
        self.order_date = Some(occurred_at);
        self.update_date = occurred_at;
        self.used = true;
    }
}

impl Entity for CouponOrder {
    type Id = PreOrderId;

    fn id(&self) -> &Self::Id {
        &self.pre_order_id
    }
}
