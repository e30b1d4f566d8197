//! DOM-anchor patching of rendered HTML.
//!
//! The admin order-edit page is already rendered when the coupon layer sees it,
//! so the fragment is placed by walking the parsed tree: the first element
//! whose `class` equals the parent anchor receives the fragment, immediately
//! before its child whose `class` equals the sibling anchor.

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use kuchikiki::traits::*;
use kuchikiki::{NodeRef, ParseOpts};

use coupon_core::HostVersion;

use crate::error::MarkupError;

/// How parse errors in the host document are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Suppress parse errors and work on whatever tree the parser recovered.
    pub tolerant: bool,
}

impl ParseOptions {
    pub fn tolerant() -> Self {
        Self { tolerant: true }
    }

    pub fn strict() -> Self {
        Self { tolerant: false }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::tolerant()
    }
}

/// Pair of `class` attribute values locating the insertion point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorPair {
    pub parent: String,
    pub sibling: String,
}

impl AnchorPair {
    pub fn new(parent: impl Into<String>, sibling: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            sibling: sibling.into(),
        }
    }

    /// Layout of the admin order-edit page for the given host release.
    pub fn for_host(version: &HostVersion) -> Self {
        if version.uses_legacy_admin_layout() {
            Self::new("col-md-9", "row hidden-xs hidden-sm")
        } else {
            Self::new("col-md-12", "row btn_area")
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DomPatcher {
    options: ParseOptions,
}

impl DomPatcher {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Insert `fragment` as children of the parent anchor, right before the
    /// sibling anchor, and re-serialize the document.
    ///
    /// Returns `Ok(None)` when either anchor is missing or the sibling is not a
    /// direct child of the parent; the input is then to be used as-is.
    pub fn insert_fragment_before_anchor(
        &self,
        html: &str,
        fragment: &str,
        anchors: &AnchorPair,
    ) -> Result<Option<String>, MarkupError> {
        let document = self.parse_document(html)?;

        let Some(parent) = find_first_by_class(&document, &anchors.parent) else {
            tracing::debug!(class = %anchors.parent, "parent anchor not found");
            return Ok(None);
        };
        let Some(sibling) = find_first_by_class(&document, &anchors.sibling) else {
            tracing::debug!(class = %anchors.sibling, "sibling anchor not found");
            return Ok(None);
        };
        if sibling.parent().as_ref() != Some(&parent) {
            tracing::debug!(
                parent = %anchors.parent,
                sibling = %anchors.sibling,
                "sibling anchor is not a child of the parent anchor"
            );
            return Ok(None);
        }

        let nodes = parse_fragment_in(&parent, fragment);
        if nodes.is_empty() {
            return Ok(None);
        }
        for node in nodes {
            sibling.insert_before(node);
        }

        let mut out = Vec::with_capacity(html.len() + fragment.len());
        document.serialize(&mut out)?;
        Ok(Some(String::from_utf8(out)?))
    }

    fn parse_document(&self, html: &str) -> Result<NodeRef, MarkupError> {
        let errors = Rc::new(RefCell::new(Vec::new()));
        let collector = Rc::clone(&errors);
        let opts = ParseOpts {
            on_parse_error: Some(Box::new(move |err: Cow<'static, str>| {
                collector.borrow_mut().push(err.into_owned());
            })),
            ..ParseOpts::default()
        };

        let document = kuchikiki::parse_html_with_options(opts).one(html);
        let errors = errors.take();
        if errors.is_empty() {
            return Ok(document);
        }
        if self.options.tolerant {
            tracing::debug!(count = errors.len(), "suppressed HTML parse errors");
            Ok(document)
        } else {
            Err(MarkupError::Malformed(errors))
        }
    }
}

/// First element, in document order, whose `class` attribute equals `value`.
pub fn find_first_by_class(root: &NodeRef, value: &str) -> Option<NodeRef> {
    root.descendants().find(|node| {
        node.as_element()
            .is_some_and(|element| element.attributes.borrow().get("class") == Some(value))
    })
}

// Fragments are parsed in the context of the element that receives them, so
// head-only (<style>, <script>) and table-scoped (<tr>, <td>) content keeps its
// structure. The fragment parser roots its output in a synthetic <html>.
fn parse_fragment_in(context: &NodeRef, fragment: &str) -> Vec<NodeRef> {
    let Some(element) = context.as_element() else {
        return Vec::new();
    };
    let parsed = kuchikiki::parse_fragment(element.name.clone(), Vec::new()).one(fragment);
    match parsed.first_child() {
        Some(root) => root.children().collect(),
        None => Vec::new(),
    }
}
