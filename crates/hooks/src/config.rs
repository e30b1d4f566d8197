//! Runtime configuration for the coupon hooks.
//!
//! Values come from the environment, falling back to defaults that match the
//! stock storefront templates.

use anyhow::Context;

use coupon_core::HostVersion;
use coupon_markup::anchor::{COUPON_MARKER, FALLBACK_ANCHOR};
use coupon_markup::{AnchorPair, AnchorPatcher, ParseOptions};

pub const ENV_HOST_VERSION: &str = "COUPON_HOST_VERSION";
pub const ENV_TOLERANT_PARSE: &str = "COUPON_TOLERANT_PARSE";
pub const ENV_MARKER_TAG: &str = "COUPON_MARKER_TAG";
pub const ENV_FALLBACK_ANCHOR: &str = "COUPON_FALLBACK_ANCHOR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponConfig {
    pub host_version: HostVersion,
    pub tolerant_parse: bool,
    pub marker_tag: String,
    pub fallback_anchor: String,
}

impl Default for CouponConfig {
    fn default() -> Self {
        Self {
            host_version: HostVersion::default(),
            tolerant_parse: true,
            marker_tag: COUPON_MARKER.to_string(),
            fallback_anchor: FALLBACK_ANCHOR.to_string(),
        }
    }
}

impl CouponConfig {
    /// Read the process environment, warning about and skipping bad values.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the process environment, failing on the first bad value.
    pub fn try_from_env() -> anyhow::Result<Self> {
        Self::try_from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_HOST_VERSION) {
            match raw.parse::<HostVersion>() {
                Ok(version) => config.host_version = version,
                Err(err) => tracing::warn!(
                    value = %raw,
                    "{ENV_HOST_VERSION} is invalid ({err}); using {}",
                    config.host_version
                ),
            }
        }
        if let Some(raw) = lookup(ENV_TOLERANT_PARSE) {
            match parse_bool(&raw) {
                Some(flag) => config.tolerant_parse = flag,
                None => tracing::warn!(value = %raw, "{ENV_TOLERANT_PARSE} is not a boolean; keeping tolerant parsing"),
            }
        }
        config.apply_anchor_overrides(&lookup);
        config
    }

    pub fn try_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_HOST_VERSION) {
            config.host_version = raw
                .parse::<HostVersion>()
                .with_context(|| format!("{ENV_HOST_VERSION}='{raw}'"))?;
        }
        if let Some(raw) = lookup(ENV_TOLERANT_PARSE) {
            config.tolerant_parse = parse_bool(&raw)
                .with_context(|| format!("{ENV_TOLERANT_PARSE}='{raw}' is not a boolean"))?;
        }
        config.apply_anchor_overrides(&lookup);
        Ok(config)
    }

    fn apply_anchor_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        if let Some(marker) = lookup(ENV_MARKER_TAG).filter(|v| !v.is_empty()) {
            self.marker_tag = marker;
        }
        if let Some(fallback) = lookup(ENV_FALLBACK_ANCHOR).filter(|v| !v.is_empty()) {
            self.fallback_anchor = fallback;
        }
    }

    pub fn supports_display_discount(&self) -> bool {
        self.host_version.supports_display_discount()
    }

    pub fn admin_anchors(&self) -> AnchorPair {
        AnchorPair::for_host(&self.host_version)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            tolerant: self.tolerant_parse,
        }
    }

    pub fn anchor_patcher(&self) -> AnchorPatcher {
        AnchorPatcher::new(self.marker_tag.clone(), self.fallback_anchor.clone())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_stock_templates() {
        let config = CouponConfig::from_lookup(lookup(&[]));
        assert_eq!(config, CouponConfig::default());
        assert!(config.tolerant_parse);
        assert!(config.supports_display_discount());
        assert_eq!(config.marker_tag, COUPON_MARKER);
    }

    #[test]
    fn reads_overrides() {
        let config = CouponConfig::from_lookup(lookup(&[
            (ENV_HOST_VERSION, "3.0.4"),
            (ENV_TOLERANT_PARSE, "off"),
            (ENV_MARKER_TAG, "<!-- coupon -->"),
        ]));
        assert_eq!(config.host_version, HostVersion::new(3, 0, 4));
        assert!(!config.tolerant_parse);
        assert_eq!(config.parse_options(), ParseOptions::strict());
        assert_eq!(config.marker_tag, "<!-- coupon -->");
        assert_eq!(config.fallback_anchor, FALLBACK_ANCHOR);
        assert_eq!(config.admin_anchors(), AnchorPair::new("col-md-9", "row hidden-xs hidden-sm"));
        assert!(!config.supports_display_discount());
    }

    #[test]
    fn lenient_lookup_skips_bad_values() {
        let config = CouponConfig::from_lookup(lookup(&[
            (ENV_HOST_VERSION, "three"),
            (ENV_TOLERANT_PARSE, "maybe"),
        ]));
        assert_eq!(config, CouponConfig::default());
    }

    #[test]
    fn strict_lookup_reports_bad_values() {
        let err = CouponConfig::try_from_lookup(lookup(&[(ENV_HOST_VERSION, "three")])).unwrap_err();
        assert!(err.to_string().contains(ENV_HOST_VERSION));

        let err = CouponConfig::try_from_lookup(lookup(&[(ENV_TOLERANT_PARSE, "maybe")])).unwrap_err();
        assert!(err.to_string().contains(ENV_TOLERANT_PARSE));
    }

    #[test]
    fn empty_anchor_overrides_are_ignored() {
        let config = CouponConfig::from_lookup(lookup(&[(ENV_MARKER_TAG, "")]));
        assert_eq!(config.marker_tag, COUPON_MARKER);
    }
}
