//! REST API client for the atomistictools.org structure database
//!
//! Re-exports [`structdb_client`]; see [`Rester`] for the entry point and
//! [`blocking::Rester`] for the synchronous variant.

#![warn(missing_docs)]

pub use structdb_client::*;
