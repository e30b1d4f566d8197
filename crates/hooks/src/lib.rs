//! Lifecycle hook adapters for the coupon layer.
//!
//! The host's event dispatcher calls these at fixed points of the checkout and
//! admin flows. Each hook pulls what it needs from the injected stores, runs the
//! discount engine and the markup patchers, and hands the result back for the
//! host to emit.

pub mod config;
pub mod error;
pub mod hooks;

pub use config::CouponConfig;
pub use error::HookError;
pub use hooks::{CouponHooks, RestoreTrigger, ShoppingFragments, TemplateRender};
