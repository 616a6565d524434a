//! HTML parsing for Nepal Kanun Patrika pages.
//!
//! [`parse`] turns a decision page into [`patrika_core::case::CaseFields`]
//! using the rules of the page's era; [`listing::parse_listing`] pulls the
//! detail links and pagination out of a search-result page. Both work on
//! plain strings and never touch the network.

pub mod detail;
pub mod error;
pub mod html;
pub mod listing;
pub mod rules;

mod walk;

pub use detail::{ParsedCase, parse};
pub use error::{Error, Result};
pub use listing::{Listing, Pagination, parse_listing};
