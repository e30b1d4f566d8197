//! Coupon discount domain module.
//!
//! Entities (`Order` snapshot, `CouponOrder`, `Coupon`), the store contracts the
//! host must provide, and the discount reconciliation engine. Deterministic
//! domain logic only: every read and write goes through the injected stores.

pub mod coupon;
pub mod engine;
pub mod order;
pub mod outcome;
pub mod store;

pub use coupon::{Coupon, CouponCode, CouponOrder, Customer};
pub use engine::DiscountEngine;
pub use order::{Order, Shipping};
pub use outcome::{CouponNotice, CouponUsageError, ReconcileOutcome, Reconciled};
pub use store::{CouponOrderStore, CouponStore, OrderStore};
