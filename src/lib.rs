//! lectern - Presentation content resolution engine
//!
//! Parses hierarchical presentation documents (YAML) into a tree of typed
//! slides, each bound to one master slide, and resolves the media they
//! reference in two phases.
//!
//! # Architecture
//!
//! Every key of the input has to be consumed by some schema:
//! - Unknown document, slide and field properties are load-time errors
//! - Every master declares a field schema plus hooks
//! - Media URIs are gathered while parsing and resolved afterwards by an
//!   injected `Resolver`
//!
//! # Modules
//!
//! - `adapters`: Media resolvers (asset catalog)
//! - `core`: Parsing (DataCutter, Slide, SlideCollection, Presentation)
//! - `domain`: Data structures (MediaUri, FuzzyUriList, Asset, StepCollector)
//! - `masters`: The master registry and field normalization
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Print the slide tree
//! lectern parse Praesentation.baldr.yml
//!
//! # Resolve media against an asset catalog
//! lectern resolve Praesentation.baldr.yml --catalog media/*.yml --json
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod masters;

// Re-export main types at crate root for convenience
pub use crate::adapters::{AssetCatalog, CatalogResolver, Resolver};
pub use crate::core::{
    DataCutter, MarkdownConverter, MarkupConverter, ParseOptions, Presentation,
    PresentationMeta, Slide, SlideCollection,
};
pub use crate::domain::{Asset, FuzzyUriList, MediaUri, StepCollector, WrappedUri};
pub use crate::error::{Error, FieldContractError, Result, StructuralError, UriError};
pub use crate::masters::{registry, Master, MasterRegistry, MasterSpec};
