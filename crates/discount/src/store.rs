//! Persistence contracts the host provides.
//!
//! Lookups return `Ok(None)` for absence; `Err` is reserved for the store itself
//! failing. Implementations must keep at most one `CouponOrder` per pre-order id.

use std::sync::Arc;

use coupon_core::{CouponId, DomainResult, OrderId, PreOrderId};

use crate::coupon::{Coupon, CouponCode, CouponOrder};
use crate::order::Order;

pub trait CouponOrderStore: Send + Sync {
    fn find_by_pre_order_id(&self, pre_order_id: &PreOrderId) -> DomainResult<Option<CouponOrder>>;

    fn find_by_order_id(&self, order_id: OrderId) -> DomainResult<Option<CouponOrder>>;

    /// All records for `coupon_code` that have been consumed (`used`).
    fn find_used_by_coupon_code(&self, coupon_code: &CouponCode) -> DomainResult<Vec<CouponOrder>>;

    /// Insert or replace the record for its pre-order id.
    fn save(&self, coupon_order: CouponOrder) -> DomainResult<()>;

    /// Delete the record for `pre_order_id`, returning it if one existed.
    fn remove(&self, pre_order_id: &PreOrderId) -> DomainResult<Option<CouponOrder>>;
}

pub trait CouponStore: Send + Sync {
    fn find(&self, coupon_id: CouponId) -> DomainResult<Option<Coupon>>;

    fn find_active_by_code(&self, coupon_code: &CouponCode) -> DomainResult<Option<Coupon>>;

    fn save(&self, coupon: Coupon) -> DomainResult<()>;
}

pub trait OrderStore: Send + Sync {
    fn save(&self, order: Order) -> DomainResult<()>;
}

impl<S> CouponOrderStore for Arc<S>
where
    S: CouponOrderStore + ?Sized,
{
    fn find_by_pre_order_id(&self, pre_order_id: &PreOrderId) -> DomainResult<Option<CouponOrder>> {
        (**self).find_by_pre_order_id(pre_order_id)
    }

    fn find_by_order_id(&self, order_id: OrderId) -> DomainResult<Option<CouponOrder>> {
        (**self).find_by_order_id(order_id)
    }

    fn find_used_by_coupon_code(&self, coupon_code: &CouponCode) -> DomainResult<Vec<CouponOrder>> {
        (**self).find_used_by_coupon_code(coupon_code)
    }

    fn save(&self, coupon_order: CouponOrder) -> DomainResult<()> {
        (**self).save(coupon_order)
    }

    fn remove(&self, pre_order_id: &PreOrderId) -> DomainResult<Option<CouponOrder>> {
        (**self).remove(pre_order_id)
    }
}

impl<S> CouponStore for Arc<S>
where
    S: CouponStore + ?Sized,
{
    fn find(&self, coupon_id: CouponId) -> DomainResult<Option<Coupon>> {
        (**self).find(coupon_id)
    }

    fn find_active_by_code(&self, coupon_code: &CouponCode) -> DomainResult<Option<Coupon>> {
        (**self).find_active_by_code(coupon_code)
    }

    fn save(&self, coupon: Coupon) -> DomainResult<()> {
        (**self).save(coupon)
    }
}

impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    fn save(&self, order: Order) -> DomainResult<()> {
        (**self).save(order)
    }
}
