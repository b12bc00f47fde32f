//! Core domain types, keyword matching, and validation checks
//! for PowerPoint post-condition testing.

pub mod error;
pub mod keywords;
pub mod loader;
pub mod types;
pub mod validate;

pub use error::{Error, Result};
pub use keywords::KeywordMatcher;
pub use loader::PresentationLoader;
pub use types::{Presentation, PresentationFormat, Shape, ShapeKind, Slide};
pub use validate::{
    Failure, FailureKind, ValidationRequest, ValidationResult, Validator, MIN_FILE_SIZE,
};
