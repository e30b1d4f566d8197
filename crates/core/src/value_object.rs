//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: two instances with the same attribute
/// values are interchangeable. Coupon codes and customer references are value
/// objects; coupon orders and coupons are entities.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct CouponCode(String);
///
/// impl ValueObject for CouponCode {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
