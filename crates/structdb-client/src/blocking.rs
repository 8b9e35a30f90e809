//! Blocking client
//!
//! Same operations as [`crate::Rester`], each blocking the calling thread
//! until the response arrives. Backed by a private current-thread runtime,
//! so it must not be called from inside an async context.
//!
//! ```rust,no_run
//! use structdb_client::blocking::Rester;
//! use structdb_client::CalculatorQuery;
//!
//! let rester = Rester::new("my-access-token")?;
//! for calculator in rester.query_calculators(&CalculatorQuery::new())? {
//!     println!("{}", calculator);
//! }
//! # Ok::<(), structdb_client::Error>(())
//! ```

use crate::entries::{Entry, Field};
use crate::query::{
    CalculatorQuery, CatalogueQuery, ComparatorQuery, PropertyQuery, PropertyTypeQuery,
    PrototypeQuery,
};
use crate::rester::ResterConfig;
use crate::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};

/// Blocking client for the structure database service
#[derive(Debug)]
pub struct Rester {
    inner: crate::Rester,
    runtime: Runtime,
}

impl Rester {
    /// Create a blocking Rester for the public service
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_config(token, ResterConfig::default())
    }

    /// Create a blocking Rester with custom configuration
    pub fn with_config(token: impl Into<String>, config: ResterConfig) -> Result<Self> {
        let inner = crate::Rester::with_config(token, config)?;
        Self::from_async(inner)
    }

    /// Wrap an existing async Rester
    pub fn from_async(inner: crate::Rester) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to start runtime: {}", e)))?;
        Ok(Self { inner, runtime })
    }

    /// The wrapped async client
    pub fn as_async(&self) -> &crate::Rester {
        &self.inner
    }

    /// See [`crate::Rester::query`]
    pub fn query(&self, resource: &str, params: &HashMap<String, String>) -> Result<Value> {
        self.block_on(self.inner.query(resource, params))
    }

    /// See [`crate::Rester::query_entries`]
    pub fn query_entries<Q: CatalogueQuery + ?Sized>(&self, query: &Q) -> Result<Vec<Field>> {
        self.block_on(self.inner.query_entries(query))
    }

    /// See [`crate::Rester::query_comparators`]
    pub fn query_comparators(&self, query: &ComparatorQuery) -> Result<Vec<Arc<Entry>>> {
        self.block_on(self.inner.query_comparators(query))
    }

    /// See [`crate::Rester::query_prototypes`]
    pub fn query_prototypes(&self, query: &PrototypeQuery) -> Result<Vec<Arc<Entry>>> {
        self.block_on(self.inner.query_prototypes(query))
    }

    /// See [`crate::Rester::query_properties`]
    pub fn query_properties(&self, query: &PropertyQuery) -> Result<Vec<Arc<Entry>>> {
        self.block_on(self.inner.query_properties(query))
    }

    /// See [`crate::Rester::query_property_types`]
    pub fn query_property_types(&self, query: &PropertyTypeQuery) -> Result<Vec<Arc<Entry>>> {
        self.block_on(self.inner.query_property_types(query))
    }

    /// See [`crate::Rester::query_calculators`]
    pub fn query_calculators(&self, query: &CalculatorQuery) -> Result<Vec<Arc<Entry>>> {
        self.block_on(self.inner.query_calculators(query))
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
