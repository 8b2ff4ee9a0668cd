//! Core parsing logic.
//!
//! This module contains:
//! - DataCutter: consume-and-verify access to raw records
//! - Markup: Markdown to HTML conversion
//! - Slide: one slide bound to a master
//! - SlideCollection: flat and tree views of all slides
//! - Presentation: meta information, slides and media resolution

pub mod collection;
pub mod data_cutter;
pub mod markup;
pub mod presentation;
pub mod slide;
pub mod text;

// Re-export commonly used types
pub use collection::SlideCollection;
pub use data_cutter::DataCutter;
pub use markup::{MarkdownConverter, MarkupConverter};
pub use presentation::{ParseOptions, Presentation, PresentationMeta};
pub use slide::{Slide, SlideMeta};
