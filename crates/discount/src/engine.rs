//! Discount reconciliation engine.
//!
//! Keeps order totals consistent with the coupon attached to an order:
//!
//! - fold a coupon discount into the displayed totals for hosts that cannot
//!   show a discount line,
//! - roll a coupon back when shipping/payment changes push the total below zero,
//! - refuse a coupon that has already been consumed,
//! - consume a coupon exactly once when its order completes.
//!
//! The engine returns adjusted `Order` copies. Persisting them is the caller's
//! job; the engine itself only writes coupon records.

use chrono::{DateTime, Utc};

use coupon_core::{DomainResult, PreOrderId};

use crate::coupon::{CouponOrder, Customer};
use crate::order::{amount_overflow, Order};
use crate::outcome::{CouponNotice, CouponUsageError, ReconcileOutcome, Reconciled};
use crate::store::{CouponOrderStore, CouponStore};

pub struct DiscountEngine<O, C> {
    coupon_orders: O,
    coupons: C,
}

impl<O, C> DiscountEngine<O, C>
where
    O: CouponOrderStore,
    C: CouponStore,
{
    pub fn new(coupon_orders: O, coupons: C) -> Self {
        Self {
            coupon_orders,
            coupons,
        }
    }

    pub fn coupon_orders(&self) -> &O {
        &self.coupon_orders
    }

    pub fn coupons(&self) -> &C {
        &self.coupons
    }

    /// Coupon order attached to an in-progress order, if any.
    pub fn coupon_order_for(&self, pre_order_id: &PreOrderId) -> DomainResult<Option<CouponOrder>> {
        self.coupon_orders.find_by_pre_order_id(pre_order_id)
    }

    /// Subtract the coupon discount from the displayed total.
    ///
    /// Pure: the input is not touched and nothing is persisted. `payment_total`
    /// follows `total`. The `discount` field is left alone because hosts that
    /// need this path do not display it. Fails only when the adjusted total
    /// does not fit an `i64`.
    pub fn apply_discount_for_render(
        order: &Order,
        coupon_order: Option<&CouponOrder>,
    ) -> DomainResult<Reconciled> {
        let Some(coupon_order) = coupon_order else {
            return Ok(Reconciled::unchanged(order.clone()));
        };

        let mut adjusted = order.clone();
        adjusted.total = order
            .total
            .checked_sub(coupon_order.discount())
            .ok_or_else(|| amount_overflow(&order.pre_order_id))?;
        adjusted.payment_total = adjusted.total;

        tracing::debug!(
            pre_order_id = %order.pre_order_id,
            coupon_code = %coupon_order.coupon_code(),
            total = adjusted.total,
            "coupon discount folded into displayed total"
        );

        Ok(Reconciled {
            order: adjusted,
            outcome: ReconcileOutcome::DiscountApplied,
            notice: None,
        })
    }

    /// Undo the coupon discount when it would leave the order total negative.
    ///
    /// Assumes `order.discount` already includes the coupon's discount. On
    /// rollback the coupon order is deleted and the returned order satisfies
    /// `total == subtotal + charge + delivery_fee_total - discount`.
    pub fn restore_discount_if_negative(&self, order: &Order) -> DomainResult<Reconciled> {
        let Some(coupon_order) = self.coupon_orders.find_by_pre_order_id(&order.pre_order_id)? else {
            return Ok(Reconciled::unchanged(order.clone()));
        };

        let total_amount = order.expected_total()?;
        if total_amount >= 0 {
            return Ok(Reconciled::unchanged(order.clone()));
        }

        let mut adjusted = order.clone();
        adjusted.discount = order
            .discount
            .checked_sub(coupon_order.discount())
            .ok_or_else(|| amount_overflow(&order.pre_order_id))?;
        adjusted.total = adjusted.expected_total()?;
        adjusted.payment_total = adjusted.total;

        self.coupon_orders.remove(&order.pre_order_id)?;

        tracing::warn!(
            pre_order_id = %order.pre_order_id,
            coupon_code = %coupon_order.coupon_code(),
            total_amount,
            restored_total = adjusted.total,
            "coupon rolled back: order total would be negative"
        );

        Ok(Reconciled {
            order: adjusted,
            outcome: ReconcileOutcome::DiscountRolledBack,
            notice: Some(CouponNotice::NegativeTotal),
        })
    }

    /// Refuse a coupon that has already been consumed.
    ///
    /// Read-only. A conflict is one of:
    /// - this coupon order is already used and belongs to someone else,
    /// - the same customer consumed this coupon on another order,
    /// - the coupon was already consumed for this order id.
    pub fn check_coupon_used_or_not(
        &self,
        coupon_order: &CouponOrder,
        customer: &Customer,
    ) -> Result<(), CouponUsageError> {
        let coupon_code = coupon_order.coupon_code();

        if coupon_order.is_used() && coupon_order.customer() != customer {
            return Err(CouponUsageError::ClaimedByOtherCustomer {
                coupon_code: coupon_code.clone(),
            });
        }

        let used = self.coupon_orders.find_used_by_coupon_code(coupon_code)?;
        for prior in used
            .iter()
            .filter(|prior| prior.pre_order_id() != coupon_order.pre_order_id())
        {
            if prior.customer() == customer {
                return Err(CouponUsageError::AlreadyUsedByCustomer {
                    coupon_code: coupon_code.clone(),
                });
            }
            if let Some(order_id) = coupon_order.order_id() {
                if prior.order_id() == Some(order_id) {
                    return Err(CouponUsageError::AlreadyUsedForOrder {
                        coupon_code: coupon_code.clone(),
                        order_id,
                    });
                }
            }
        }

        Ok(())
    }

    /// Consume the coupon once its order has completed.
    ///
    /// The persisted record is re-read; a present `order_date` means a previous
    /// call already finalized it and nothing is changed.
    pub fn finalize_coupon_use(
        &self,
        coupon_order: &CouponOrder,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<ReconcileOutcome> {
        let Some(mut current) = self
            .coupon_orders
            .find_by_pre_order_id(coupon_order.pre_order_id())?
        else {
            tracing::debug!(
                pre_order_id = %coupon_order.pre_order_id(),
                "no coupon order to finalize"
            );
            return Ok(ReconcileOutcome::NoOp);
        };

        if current.is_finalized() {
            tracing::debug!(
                pre_order_id = %current.pre_order_id(),
                "coupon order already finalized"
            );
            return Ok(ReconcileOutcome::FinalizeSkipped);
        }

        current.finalize(occurred_at);
        let coupon_code = current.coupon_code().clone();
        self.coupon_orders.save(current)?;

        match self.coupons.find_active_by_code(&coupon_code)? {
            Some(mut coupon) => {
                coupon.consume_one();
                tracing::info!(
                    coupon_code = %coupon_code,
                    remaining_uses = coupon.remaining_uses(),
                    "coupon consumed"
                );
                self.coupons.save(coupon)?;
            }
            None => {
                tracing::warn!(
                    coupon_code = %coupon_code,
                    "finalized coupon order has no active coupon; counter left unchanged"
                );
            }
        }

        Ok(ReconcileOutcome::Finalized)
    }
}
