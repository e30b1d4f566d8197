use thiserror::Error;

use coupon_core::DomainError;
use coupon_discount::{CouponNotice, CouponUsageError};

/// Route the customer is sent back to after a usage conflict.
pub const SHOPPING_ROUTE: &str = "shopping";

#[derive(Debug, Error)]
pub enum HookError {
    /// The coupon was already consumed. The request must stop here and
    /// redirect; no further state may be written.
    #[error("coupon usage conflict, redirecting to '{redirect}'")]
    UsageConflict {
        redirect: &'static str,
        message_key: &'static str,
        #[source]
        source: CouponUsageError,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("failed to build render context: {0}")]
    Context(#[from] serde_json::Error),
}

impl From<CouponUsageError> for HookError {
    fn from(value: CouponUsageError) -> Self {
        match value {
            CouponUsageError::Lookup(err) => HookError::Domain(err),
            conflict => HookError::UsageConflict {
                redirect: SHOPPING_ROUTE,
                message_key: CouponNotice::AlreadyUsed.message_key(),
                source: conflict,
            },
        }
    }
}

impl HookError {
    /// Redirect target when the error must short-circuit the response.
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            HookError::UsageConflict { redirect, .. } => Some(*redirect),
            _ => None,
        }
    }
}
