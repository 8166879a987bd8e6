//! Data structures for the link library.

pub mod link;
pub mod validate;

pub use link::VideoLinkRecord;
pub use validate::{SchemeValidator, UrlValidator};
