//! Coupon persistence boundary.
//!
//! The contracts live in `coupon-discount`; this module provides backends.
//! Hosts plug in their own database-backed implementations.

pub mod in_memory;

pub use in_memory::{InMemoryCouponOrderStore, InMemoryCouponStore, InMemoryOrderStore};
