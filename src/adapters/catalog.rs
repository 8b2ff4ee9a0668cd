//! Asset catalog resolver.
//!
//! A catalog is a YAML file listing asset descriptors:
//!
//! ```yaml
//! version: 1
//! assets:
//!   - ref: Fuer-Elise_HB
//!     uuid: 3c9a6f83-1d4e-4ea1-bd6b-f2f1a4a0b6e2
//!     title: Für Elise
//!     samples:
//!       - ref: complete
//!       - ref: theme
//!     meta:
//!       composer: Ludwig van Beethoven
//! ```
//!
//! Several catalog files can be merged with a glob pattern.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::RwLock;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use super::Resolver;
use crate::domain::{remove_fragment, Asset};

/// Catalog file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetCatalog {
    /// Catalog format version
    #[serde(default = "default_version")]
    pub version: u32,

    /// All known assets
    #[serde(default)]
    pub assets: Vec<Asset>,
}

fn default_version() -> u32 {
    1
}

impl Default for AssetCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self {
            version: default_version(),
            assets: Vec::new(),
        }
    }

    /// Parse a catalog from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse asset catalog YAML")
    }

    /// Load a catalog file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read asset catalog: {}", path.display()))?;

        Self::from_yaml(&content)
            .with_context(|| format!("Invalid asset catalog: {}", path.display()))
    }

    /// Load and merge every catalog file matching a glob pattern
    pub async fn load_glob(pattern: &str) -> Result<Self> {
        let mut catalog = Self::new();
        let paths = glob::glob(pattern)
            .with_context(|| format!("Invalid catalog pattern '{}'", pattern))?;

        for entry in paths {
            let path = entry.context("Failed to read catalog path")?;
            let part = Self::load(&path).await?;
            debug!(path = %path.display(), count = part.assets.len(), "Loaded catalog file");
            catalog.assets.extend(part.assets);
        }

        Ok(catalog)
    }

    /// Get the number of assets
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Resolver backed by an in-memory asset catalog
pub struct CatalogResolver {
    /// All assets
    assets: Vec<Asset>,

    /// `ref:` and `uuid:` URIs pointing into `assets`
    index: HashMap<String, usize>,

    /// URIs resolved so far
    resolved: RwLock<HashMap<String, usize>>,
}

impl CatalogResolver {
    /// Create a resolver for a catalog
    pub fn new(catalog: AssetCatalog) -> Self {
        Self::from_assets(catalog.assets)
    }

    /// Create a resolver for a list of assets
    pub fn from_assets(assets: Vec<Asset>) -> Self {
        let mut index = HashMap::new();
        for (position, asset) in assets.iter().enumerate() {
            index.insert(asset.ref_uri(), position);
            if let Some(uuid) = asset.uuid_uri() {
                index.insert(uuid, position);
            }
        }

        Self {
            assets,
            index,
            resolved: RwLock::new(HashMap::new()),
        }
    }

    /// Load a catalog file, or several if the path is a glob pattern
    pub async fn load(path: &str) -> Result<Self> {
        let catalog = if path.contains(['*', '?', '[']) {
            AssetCatalog::load_glob(path).await?
        } else {
            AssetCatalog::load(Path::new(path)).await?
        };
        Ok(Self::new(catalog))
    }

    /// Number of URIs resolved so far
    pub fn resolved_count(&self) -> usize {
        self.resolved.read().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Resolver for CatalogResolver {
    fn name(&self) -> &str {
        "catalog"
    }

    async fn resolve(&self, uris: &BTreeSet<String>, required: bool) -> Result<()> {
        let mut missing = Vec::new();
        {
            let mut resolved = self
                .resolved
                .write()
                .map_err(|_| anyhow::anyhow!("Asset catalog lock poisoned"))?;

            for uri in uris {
                let uri = remove_fragment(uri);
                match self.index.get(uri) {
                    Some(&position) => {
                        resolved.insert(uri.to_string(), position);
                    }
                    None => missing.push(uri.to_string()),
                }
            }
        }

        debug!(
            count = uris.len(),
            missing = missing.len(),
            required,
            "Resolved media URIs"
        );

        if !missing.is_empty() {
            bail!(
                "Unable to resolve {} media URI(s): {}",
                missing.len(),
                missing.join(", ")
            );
        }

        Ok(())
    }

    fn asset(&self, uri: &str) -> Option<Asset> {
        let resolved = self.resolved.read().ok()?;
        let position = *resolved.get(remove_fragment(uri))?;
        self.assets.get(position).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> CatalogResolver {
        let mut beethoven = Asset::new("Fuer-Elise", Some("Für Elise"));
        beethoven.uuid = Some("f1e2".to_string());
        CatalogResolver::from_assets(vec![beethoven, Asset::new("Yesterday", None)])
    }

    fn uris(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_resolve_by_ref_and_uuid() {
        let resolver = resolver();
        resolver
            .resolve(&uris(&["ref:Fuer-Elise", "uuid:f1e2"]), true)
            .await
            .unwrap();

        let asset = resolver.asset("ref:Fuer-Elise#complete").unwrap();
        assert_eq!(asset.title.as_deref(), Some("Für Elise"));
        assert!(resolver.asset("uuid:f1e2").is_some());
        assert_eq!(resolver.resolved_count(), 2);
    }

    #[tokio::test]
    async fn test_unresolved_uri_is_not_visible() {
        let resolver = resolver();
        assert!(resolver.asset("ref:Yesterday").is_none());
    }

    #[tokio::test]
    async fn test_missing_uri_fails() {
        let resolver = resolver();
        let err = resolver
            .resolve(&uris(&["ref:Yesterday", "ref:Unknown"]), false)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("ref:Unknown"));
        // The known URI is still resolved.
        assert!(resolver.asset("ref:Yesterday").is_some());
    }

    #[test]
    fn test_catalog_from_yaml() {
        let catalog = AssetCatalog::from_yaml(
            "assets:\n  - ref: A\n    title: Title A\n    samples:\n      - ref: complete\n",
        )
        .unwrap();
        assert_eq!(catalog.version, 1);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.assets[0].samples[0].reference, "complete");
    }

    #[tokio::test]
    async fn test_load_glob() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.yml"), "assets:\n  - ref: A\n").unwrap();
        std::fs::write(dir.path().join("b.yml"), "assets:\n  - ref: B\n").unwrap();

        let pattern = format!("{}/*.yml", dir.path().display());
        let resolver = CatalogResolver::load(&pattern).await.unwrap();
        resolver
            .resolve(&uris(&["ref:A", "ref:B"]), true)
            .await
            .unwrap();
        assert!(resolver.asset("ref:B").is_some());
    }
}
