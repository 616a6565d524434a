//! Core types and trait definitions for the Patrika case-record scraper.
//!
//! This crate is deliberately free of HTTP, HTML and database dependencies.
//! The parser, the store backends and the scraper all depend on it.

pub mod case;
pub mod error;
pub mod layout;
pub mod numerals;
pub mod store;

pub use error::{Error, Result};
