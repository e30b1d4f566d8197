use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use coupon_core::{CouponId, DomainError, DomainResult, Entity, OrderId, PreOrderId};
use coupon_discount::{
    Coupon, CouponCode, CouponOrder, CouponOrderStore, CouponStore, Order, OrderStore,
};

fn read<T>(lock: &RwLock<T>) -> DomainResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| DomainError::store("lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> DomainResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| DomainError::store("lock poisoned"))
}

/// In-memory coupon order store.
///
/// Keyed by pre-order id, which is what keeps a single record per in-progress
/// order. Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCouponOrderStore {
    records: RwLock<HashMap<PreOrderId, CouponOrder>>,
}

impl InMemoryCouponOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CouponOrderStore for InMemoryCouponOrderStore {
    fn find_by_pre_order_id(&self, pre_order_id: &PreOrderId) -> DomainResult<Option<CouponOrder>> {
        Ok(read(&self.records)?.get(pre_order_id).cloned())
    }

    fn find_by_order_id(&self, order_id: OrderId) -> DomainResult<Option<CouponOrder>> {
        Ok(read(&self.records)?
            .values()
            .find(|r| r.order_id() == Some(order_id))
            .cloned())
    }

    fn find_used_by_coupon_code(&self, coupon_code: &CouponCode) -> DomainResult<Vec<CouponOrder>> {
        Ok(read(&self.records)?
            .values()
            .filter(|r| r.is_used() && r.coupon_code() == coupon_code)
            .cloned()
            .collect())
    }

    fn save(&self, coupon_order: CouponOrder) -> DomainResult<()> {
        let key = coupon_order.id().clone();
        write(&self.records)?.insert(key, coupon_order);
        Ok(())
    }

    fn remove(&self, pre_order_id: &PreOrderId) -> DomainResult<Option<CouponOrder>> {
        Ok(write(&self.records)?.remove(pre_order_id))
    }
}

/// In-memory coupon definitions.
#[derive(Debug, Default)]
pub struct InMemoryCouponStore {
    coupons: RwLock<HashMap<CouponId, Coupon>>,
}

impl InMemoryCouponStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CouponStore for InMemoryCouponStore {
    fn find(&self, coupon_id: CouponId) -> DomainResult<Option<Coupon>> {
        Ok(read(&self.coupons)?.get(&coupon_id).cloned())
    }

    fn find_active_by_code(&self, coupon_code: &CouponCode) -> DomainResult<Option<Coupon>> {
        // Lowest id wins so that duplicate codes resolve the same way every time.
        Ok(read(&self.coupons)?
            .values()
            .filter(|c| c.is_active() && c.coupon_code() == coupon_code)
            .min_by_key(|c| *c.coupon_id().as_uuid())
            .cloned())
    }

    fn save(&self, coupon: Coupon) -> DomainResult<()> {
        write(&self.coupons)?.insert(coupon.coupon_id(), coupon);
        Ok(())
    }
}

/// In-memory order snapshots, keyed by pre-order id.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<PreOrderId, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pre_order_id: &PreOrderId) -> Option<Order> {
        self.orders.read().ok()?.get(pre_order_id).cloned()
    }
}

impl OrderStore for InMemoryOrderStore {
    fn save(&self, order: Order) -> DomainResult<()> {
        tracing::trace!(pre_order_id = %order.pre_order_id, total = order.total, "order saved");
        write(&self.orders)?.insert(order.pre_order_id.clone(), order);
        Ok(())
    }
}
