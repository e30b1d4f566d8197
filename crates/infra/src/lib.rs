//! Infrastructure layer: store implementations for the coupon domain.

pub mod store;


pub use store::{InMemoryCouponOrderStore, InMemoryCouponStore, InMemoryOrderStore};
