//! Domain types shared by the parser and the masters.
//!
//! - MediaUri: the `scheme:authority#fragment` grammar
//! - FuzzyUriList: loosely specified media references with titles
//! - Asset: descriptors delivered by a resolver
//! - StepCollector: reveal steps of a slide

pub mod asset;
pub mod fuzzy_uri;
pub mod step;
pub mod uri;

// Re-export commonly used types
pub use asset::{Asset, Sample};
pub use fuzzy_uri::{extract_uris_from_fuzzy_specs, FuzzyUriList, WrappedUri};
pub use step::{Step, StepCollector};
pub use uri::{find_media_uris, remove_fragment, MediaUri};
