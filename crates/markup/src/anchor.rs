//! Anchor-string patching of template source.
//!
//! Templates prepared for the coupon layer carry a marker comment. Older
//! templates do not, so a piece of known structural text serves as a second
//! anchor. Only the first occurrence of an anchor is ever used.

/// Marker comment placed in templates that expect the coupon block.
pub const COUPON_MARKER: &str = "<!--# counpon-plugin-tag #-->";

/// Heading of the contact/free-text area on the stock shopping page.
pub const FALLBACK_ANCHOR: &str = "<h2 class=\"heading02\">お問い合わせ欄</h2>";

/// Opening tag of the order summary total on the stock shopping page.
pub const SUMMARY_ANCHOR: &str = "<div id=\"summary_box__result\" class=\"total_amount\">";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    Marker,
    Fallback,
}

/// Where an insertion would happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorHit {
    pub kind: AnchorKind,
    /// Byte offset of the first occurrence of the anchor.
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorPatcher {
    marker: String,
    fallback: String,
}

impl Default for AnchorPatcher {
    fn default() -> Self {
        Self::new(COUPON_MARKER, FALLBACK_ANCHOR)
    }
}

impl AnchorPatcher {
    pub fn new(marker: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            fallback: fallback.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Marker first, fallback second.
    pub fn locate(&self, source: &str) -> Option<AnchorHit> {
        if let Some(offset) = find_anchor(source, &self.marker) {
            return Some(AnchorHit {
                kind: AnchorKind::Marker,
                offset,
            });
        }
        find_anchor(source, &self.fallback).map(|offset| AnchorHit {
            kind: AnchorKind::Fallback,
            offset,
        })
    }

    /// Insert `fragment` immediately before the first matching anchor.
    ///
    /// The anchor itself is kept, so the source can be patched again later.
    /// When no anchor is present the source comes back unchanged.
    pub fn insert_fragment(&self, source: &str, fragment: &str) -> String {
        let anchors = [
            (AnchorKind::Marker, self.marker.as_str()),
            (AnchorKind::Fallback, self.fallback.as_str()),
        ];
        for (kind, anchor) in anchors {
            if let Some(patched) = insert_before(source, anchor, fragment) {
                tracing::debug!(anchor = ?kind, "inserting coupon fragment");
                return patched;
            }
        }
        tracing::debug!("no coupon anchor in template source; left unchanged");
        source.to_string()
    }
}

/// Insert `fragment` right before the first occurrence of `anchor`.
pub fn insert_before(source: &str, anchor: &str, fragment: &str) -> Option<String> {
    find_anchor(source, anchor).map(|offset| splice(source, offset, fragment))
}

/// Insert `fragment` right after the first occurrence of `anchor`.
pub fn insert_after(source: &str, anchor: &str, fragment: &str) -> Option<String> {
    find_anchor(source, anchor).map(|offset| splice(source, offset + anchor.len(), fragment))
}

// An empty anchor would match at offset 0 of every source.
fn find_anchor(source: &str, anchor: &str) -> Option<usize> {
    if anchor.is_empty() {
        return None;
    }
    source.find(anchor)
}

fn splice(source: &str, at: usize, fragment: &str) -> String {
    let mut out = String::with_capacity(source.len() + fragment.len());
    out.push_str(&source[..at]);
    out.push_str(fragment);
    out.push_str(&source[at..]);
    out
}
