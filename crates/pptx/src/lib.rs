//! PPTX (Office Open XML) package reader for PowerPoint validation.
//!
//! Opens .pptx files, which are ZIP archives containing XML parts, and loads
//! their slides and top-level shapes.

pub mod package;
pub mod parser;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use parser::PptxParser;
