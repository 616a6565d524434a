//! Fetching and orchestration for the Patrika scraper.
//!
//! [`job::Scraper`] drives jobs; [`fetch::Fetcher`] owns the network,
//! pacing and the on-disk [`snapshot::SnapshotStore`]. Parsing lives in
//! `patrika-parse` and persistence behind [`patrika_core::store::CaseStore`].

pub mod config;
pub mod error;
pub mod fetch;
pub mod job;
pub mod pacing;
pub mod site;
pub mod snapshot;


pub use error::{Error, Result};
