//! Structure database REST client
//!
//! Token-authenticated queries against the atomistictools.org structure
//! database: crystal prototypes, structures, properties, property types,
//! comparison types and calculators.
//!
//! # Example
//!
//! ```rust,no_run
//! use structdb_client::{PropertyQuery, Rester};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let rester = Rester::new("my-access-token")?;
//!
//!     let query = PropertyQuery::new().with_property_type("EOS").with_limit(10);
//!     for property in rester.query_properties(&query).await? {
//!         println!("{}", property);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod blocking;
pub mod composition;
pub mod entries;
pub mod query;
pub mod resource;
pub mod rest;
pub mod rester;
pub mod structure;

#[cfg(test)]
mod test_utils;

pub use composition::CompositionQuery;
pub use entries::{Entry, EntryError, EntryKind, Field};
pub use query::{
    CalculatorQuery, ComparatorQuery, PropertyQuery, PropertyTypeQuery, PrototypeQuery,
};
pub use resource::Resource;
pub use rester::{Rester, ResterConfig, TokenPlacement, DEFAULT_BASE_URL};
pub use structure::{CoordinatesType, Structure};

use rest::RestError;

/// Result type for structure database operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for structure database operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or invalid client configuration (e.g., empty token)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The service rejected the credential
    #[error("Authentication error ({status}): {message}")]
    Authentication {
        /// HTTP status code (401 or 403)
        status: u16,
        /// Error message from the service
        message: String,
    },

    /// Unknown resource or query target
    #[error("Not found ({status}): {message}")]
    NotFound {
        /// HTTP status code
        status: u16,
        /// Error message from the service
        message: String,
    },

    /// Any other server-side or transport failure
    #[error("Service error: {message}")]
    Service {
        /// HTTP status code, absent when no response was received
        status: Option<u16>,
        /// Error description
        message: String,
    },
}

impl Error {
    /// HTTP status attached to the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Configuration(_) => None,
            Error::Authentication { status, .. } | Error::NotFound { status, .. } => Some(*status),
            Error::Service { status, .. } => *status,
        }
    }
}

impl From<RestError> for Error {
    fn from(err: RestError) -> Self {
        if err.is_auth_error() {
            Error::Authentication {
                status: err.status(),
                message: err.message().to_string(),
            }
        } else if err.is_not_found() {
            Error::NotFound {
                status: err.status(),
                message: err.message().to_string(),
            }
        } else {
            Error::Service {
                status: (!err.is_network_error()).then(|| err.status()),
                message: format!("{}: {}", err.error(), err.message()),
            }
        }
    }
}

impl From<EntryError> for Error {
    fn from(err: EntryError) -> Self {
        Error::Service {
            status: None,
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Service {
            status: None,
            message: format!("JSON error: {}", err),
        }
    }
}
