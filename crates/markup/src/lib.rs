//! Markup injection for rendered pages.
//!
//! Two independent strategies, both working on already-produced output:
//!
//! - [`anchor::AnchorPatcher`] splices a fragment into template source next to
//!   a literal anchor string.
//! - [`dom::DomPatcher`] parses rendered HTML and inserts a fragment before an
//!   element located by its `class` attribute.
//!
//! Neither renders templates; fragments arrive as opaque strings.

pub mod anchor;
pub mod dom;
pub mod error;

pub use anchor::{AnchorHit, AnchorKind, AnchorPatcher};
pub use dom::{AnchorPair, DomPatcher, ParseOptions};
pub use error::MarkupError;
