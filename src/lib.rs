//! examshelf: a terminal catalog browser for exam sheets.
//!
//! Loads a JSON catalog from a static host, filters it by free-text search
//! and multi-select tag facets, renders the visible subset as cards, and
//! retrieves sheet and solution assets as named local downloads.

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod facets;
pub mod filter;
pub mod models;
pub mod services;
pub mod ui;

pub use error::{Result, ShelfError};
