//! Host platform version and the capabilities derived from it.
//!
//! Version comparison happens once, here. Everything downstream receives a
//! capability flag or a configuration struct instead of a version number.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Semantic `major.minor.patch` version of the host shop platform.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HostVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl HostVersion {
    /// First release that renders a discount line on its own.
    pub const DISPLAY_DISCOUNT_SINCE: HostVersion = HostVersion::new(3, 0, 10);

    /// Last release that uses the legacy admin order-edit layout.
    pub const LEGACY_ADMIN_LAYOUT_UNTIL: HostVersion = HostVersion::new(3, 0, 4);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Whether the host shows the order discount itself. When it does not, the
    /// coupon discount must be folded into the displayed total.
    pub fn supports_display_discount(&self) -> bool {
        *self >= Self::DISPLAY_DISCOUNT_SINCE
    }

    pub fn uses_legacy_admin_layout(&self) -> bool {
        *self <= Self::LEGACY_ADMIN_LAYOUT_UNTIL
    }
}

impl Default for HostVersion {
    fn default() -> Self {
        Self::DISPLAY_DISCOUNT_SINCE
    }
}

impl fmt::Display for HostVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for HostVersion {
    type Err = DomainError;

    /// Accepts `major`, `major.minor` or `major.minor.patch`; missing parts are 0.
    /// A pre-release suffix (`3.0.10-dev`) is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let core = s.trim().split(['-', '+']).next().unwrap_or_default();
        if core.is_empty() {
            return Err(DomainError::validation("host version is empty"));
        }

        let mut parts = [0u32; 3];
        for (idx, raw) in core.split('.').enumerate() {
            if idx >= parts.len() {
                return Err(DomainError::validation(format!(
                    "host version '{s}' has more than three components"
                )));
            }
            parts[idx] = raw.parse().map_err(|_| {
                DomainError::validation(format!("host version '{s}' is not numeric"))
            })?;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}
