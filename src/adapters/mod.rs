//! Adapter interfaces for external systems.
//!
//! The engine never fetches media itself. A `Resolver` turns media URIs
//! into asset descriptors; the masters read them during the second
//! resolution phase.

pub mod catalog;

use std::collections::BTreeSet;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::Asset;

// Re-export the catalog adapter
pub use catalog::{AssetCatalog, CatalogResolver};

/// Trait for media asset resolvers
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Human-readable resolver name
    fn name(&self) -> &str;

    /// Resolve a set of media URIs (fragments already removed).
    ///
    /// `required` tells the resolver which set it is working on; the caller
    /// decides whether a failure is fatal.
    async fn resolve(&self, uris: &BTreeSet<String>, required: bool) -> Result<()>;

    /// The descriptor of a resolved URI. A fragment is ignored.
    fn asset(&self, uri: &str) -> Option<Asset>;
}
