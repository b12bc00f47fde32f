//! Post-condition checks for a generated presentation file.
//!
//! A [`Validator`] runs a fixed sequence of checks against one file and stops
//! at the first failure:
//!
//! 1. the path is an existing regular file
//! 2. the file is at least [`MIN_FILE_SIZE`] bytes
//! 3. the file opens as a presentation package
//! 4. it has at least the requested number of slides
//! 5. every requested keyword occurs in the slide text (case-insensitive)
//! 6. at least one slide has a shape
//!
//! Step 5 only looks at text-bearing shapes while step 6 counts every shape,
//! so a slide holding just a picture is "not empty" but contributes no text.

use crate::{KeywordMatcher, PresentationLoader};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Files smaller than this cannot be a well-formed package.
pub const MIN_FILE_SIZE: u64 = 1000;

/// Parameters of one validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRequest {
    /// File under test.
    pub path: PathBuf,

    /// Minimum number of slides (default: 1).
    pub min_slides: usize,

    /// Keywords that must occur in slide text. `None` or empty skips the check.
    pub keywords: Option<Vec<String>>,
}

impl ValidationRequest {
    /// Create a request with the default minimum of 1 slide and no keywords.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            min_slides: 1,
            keywords: None,
        }
    }

    /// Require at least `min_slides` slides.
    pub fn with_min_slides(mut self, min_slides: usize) -> Self {
        self.min_slides = min_slides;
        self
    }

    /// Require every keyword to occur in the slide text.
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = Some(keywords.into_iter().map(Into::into).collect());
        self
    }
}

/// Machine-readable reason a validation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    TooSmall,
    InvalidFormat,
    OpenError,
    InsufficientSlides,
    MissingKeywords,
    AllSlidesEmpty,
}

/// The first check that failed. `Display` is the user-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("File too small ({0} bytes), possibly corrupted")]
    TooSmall(u64),

    #[error("File is not a valid PPTX package")]
    InvalidFormat,

    /// Wraps the underlying load error text verbatim.
    #[error("Cannot open PPTX file: {0}")]
    OpenError(String),

    #[error("Not enough slides: expected at least {expected}, found {actual}")]
    InsufficientSlides { expected: usize, actual: usize },

    /// All missing keywords, in request order.
    #[error("Missing expected keywords: {}", .0.join(", "))]
    MissingKeywords(Vec<String>),

    #[error("All slides are empty (no content)")]
    AllSlidesEmpty,
}

impl Failure {
    /// The kind of this failure, without its details.
    pub fn kind(&self) -> FailureKind {
        match self {
            Failure::NotFound(_) => FailureKind::NotFound,
            Failure::TooSmall(_) => FailureKind::TooSmall,
            Failure::InvalidFormat => FailureKind::InvalidFormat,
            Failure::OpenError(_) => FailureKind::OpenError,
            Failure::InsufficientSlides { .. } => FailureKind::InsufficientSlides,
            Failure::MissingKeywords(_) => FailureKind::MissingKeywords,
            Failure::AllSlidesEmpty => FailureKind::AllSlidesEmpty,
        }
    }
}

/// Outcome of a validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True iff every check passed.
    pub valid: bool,

    /// Reason for failure, or a summary of the file on success.
    pub message: String,

    /// Which check failed. `None` on success.
    pub reason: Option<FailureKind>,
}

impl ValidationResult {
    fn success(message: String) -> Self {
        Self {
            valid: true,
            message,
            reason: None,
        }
    }
}

impl From<Failure> for ValidationResult {
    fn from(failure: Failure) -> Self {
        Self {
            valid: false,
            message: failure.to_string(),
            reason: Some(failure.kind()),
        }
    }
}

/// Runs the validation checks, loading packages through `L`.
#[derive(Debug, Clone)]
pub struct Validator<L> {
    loader: L,
}

impl<L: PresentationLoader> Validator<L> {
    /// Create a validator that opens files with the given loader.
    pub fn new(loader: L) -> Self {
        Self { loader }
    }

    /// Validate one file. Never fails: every problem becomes an invalid result.
    pub fn validate(&self, request: &ValidationRequest) -> ValidationResult {
        match self.check(request) {
            Ok(summary) => ValidationResult::success(summary),
            Err(failure) => {
                log::debug!("Validation of {} failed: {}", request.path.display(), failure);
                failure.into()
            }
        }
    }

    fn check(&self, request: &ValidationRequest) -> Result<String, Failure> {
        let path = request.path.as_path();
        let file_size = file_size(path)?;
        log::debug!("{}: {} bytes", path.display(), file_size);

        if file_size < MIN_FILE_SIZE {
            return Err(Failure::TooSmall(file_size));
        }

        let presentation = self.loader.load(path).map_err(|e| {
            if e.is_not_a_package() {
                log::debug!("Not a package: {}", e);
                Failure::InvalidFormat
            } else {
                Failure::OpenError(e.to_string())
            }
        })?;

        let slide_count = presentation.slide_count();
        log::debug!("Loaded {} slides", slide_count);
        if slide_count < request.min_slides {
            return Err(Failure::InsufficientSlides {
                expected: request.min_slides,
                actual: slide_count,
            });
        }

        if let Some(keywords) = request.keywords.as_deref().filter(|k| !k.is_empty()) {
            let matcher = KeywordMatcher::new(&presentation);
            let missing = matcher.missing(keywords);
            if !missing.is_empty() {
                return Err(Failure::MissingKeywords(
                    missing.into_iter().map(String::from).collect(),
                ));
            }
        }

        if presentation.all_slides_empty() {
            return Err(Failure::AllSlidesEmpty);
        }

        Ok(format!(
            "Validation passed: {} slides, file size {:.2} KB",
            slide_count,
            file_size as f64 / 1024.0
        ))
    }
}

/// Size of the regular file at `path`, or `NotFound`.
fn file_size(path: &Path) -> Result<u64, Failure> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(meta.len()),
        _ => Err(Failure::NotFound(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Presentation, Result, Shape, ShapeKind, Slide};
    use std::cell::Cell;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    /// What the fake loader should hand back.
    enum Outcome {
        Slides(Vec<Vec<Shape>>),
        NotAPackage,
        Broken(&'static str),
    }

    struct FakeLoader {
        outcome: Outcome,
        calls: Cell<usize>,
    }

    impl FakeLoader {
        fn new(outcome: Outcome) -> Self {
            Self {
                outcome,
                calls: Cell::new(0),
            }
        }
    }

    impl PresentationLoader for FakeLoader {
        fn load(&self, path: &Path) -> Result<Presentation> {
            self.calls.set(self.calls.get() + 1);
            match &self.outcome {
                Outcome::Slides(slides) => {
                    let mut presentation = Presentation::new(path.display().to_string());
                    for (idx, shapes) in slides.iter().enumerate() {
                        let mut slide = Slide::new(idx + 1);
                        for shape in shapes {
                            slide.add_shape(shape.clone());
                        }
                        presentation.add_slide(slide);
                    }
                    Ok(presentation)
                }
                Outcome::NotAPackage => Err(Error::NotAPackage(path.display().to_string())),
                Outcome::Broken(reason) => Err(Error::MissingPart(reason.to_string())),
            }
        }
    }

    fn file_of_size(size: usize) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&vec![0u8; size]).unwrap();
        file.flush().unwrap();
        file
    }

    fn three_slides() -> Outcome {
        Outcome::Slides(vec![
            vec![Shape::with_text("Quarterly Report")],
            vec![Shape::with_text("Revenue grew"), Shape::new(ShapeKind::Picture)],
            vec![Shape::with_text("Thank you")],
        ])
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.pptx");
        let loader = FakeLoader::new(three_slides());
        let validator = Validator::new(&loader);

        let request = ValidationRequest::new(&path)
            .with_min_slides(5)
            .with_keywords(["anything"]);
        let result = validator.validate(&request);

        assert!(!result.valid);
        assert_eq!(result.reason, Some(FailureKind::NotFound));
        assert!(result.message.contains("missing.pptx"));
        assert_eq!(loader.calls.get(), 0);
    }

    #[test]
    fn test_directory_is_not_found() {
        let dir = TempDir::new().unwrap();
        let validator = Validator::new(FakeLoader::new(three_slides()));

        let result = validator.validate(&ValidationRequest::new(dir.path()));
        assert_eq!(result.reason, Some(FailureKind::NotFound));
    }

    #[test]
    fn test_empty_file_is_too_small() {
        let file = file_of_size(0);
        let loader = FakeLoader::new(three_slides());
        let validator = Validator::new(&loader);

        let result = validator.validate(&ValidationRequest::new(file.path()));
        assert!(!result.valid);
        assert_eq!(result.reason, Some(FailureKind::TooSmall));
        assert_eq!(result.message, "File too small (0 bytes), possibly corrupted");
        assert_eq!(loader.calls.get(), 0);
    }

    #[test]
    fn test_size_boundary() {
        let validator = Validator::new(FakeLoader::new(three_slides()));

        let file = file_of_size(999);
        let result = validator.validate(&ValidationRequest::new(file.path()));
        assert_eq!(result.reason, Some(FailureKind::TooSmall));

        let file = file_of_size(1000);
        let result = validator.validate(&ValidationRequest::new(file.path()));
        assert!(result.valid, "{}", result.message);
    }

    #[test]
    fn test_not_a_package_is_invalid_format() {
        let file = file_of_size(2048);
        let validator = Validator::new(FakeLoader::new(Outcome::NotAPackage));

        let result = validator.validate(&ValidationRequest::new(file.path()));
        assert_eq!(result.reason, Some(FailureKind::InvalidFormat));
        assert_eq!(result.message, "File is not a valid PPTX package");
    }

    #[test]
    fn test_other_load_error_is_open_error_with_text() {
        let file = file_of_size(2048);
        let validator = Validator::new(FakeLoader::new(Outcome::Broken("ppt/presentation.xml")));

        let result = validator.validate(&ValidationRequest::new(file.path()));
        assert_eq!(result.reason, Some(FailureKind::OpenError));
        assert_eq!(
            result.message,
            "Cannot open PPTX file: There is no item named 'ppt/presentation.xml' in the archive"
        );
    }

    #[test]
    fn test_insufficient_slides_names_both_counts() {
        let file = file_of_size(2048);
        let validator = Validator::new(FakeLoader::new(three_slides()));

        let result = validator.validate(&ValidationRequest::new(file.path()).with_min_slides(5));
        assert_eq!(result.reason, Some(FailureKind::InsufficientSlides));
        assert_eq!(
            result.message,
            "Not enough slides: expected at least 5, found 3"
        );
    }

    #[test]
    fn test_success_reports_slides_and_kib() {
        let file = file_of_size(50_000);
        let validator = Validator::new(FakeLoader::new(three_slides()));

        let result = validator.validate(&ValidationRequest::new(file.path()));
        assert!(result.valid);
        assert_eq!(result.reason, None);
        assert_eq!(
            result.message,
            "Validation passed: 3 slides, file size 48.83 KB"
        );
    }

    #[test]
    fn test_keywords_present_case_insensitive() {
        let file = file_of_size(2048);
        let validator = Validator::new(FakeLoader::new(three_slides()));

        let request = ValidationRequest::new(file.path())
            .with_min_slides(3)
            .with_keywords(["quarterly report", "REVENUE", "thank"]);
        let result = validator.validate(&request);
        assert!(result.valid, "{}", result.message);
    }

    #[test]
    fn test_missing_keywords_lists_all() {
        let file = file_of_size(2048);
        let validator = Validator::new(FakeLoader::new(three_slides()));

        let request =
            ValidationRequest::new(file.path()).with_keywords(["Revenue", "Profit", "Forecast"]);
        let result = validator.validate(&request);
        assert_eq!(result.reason, Some(FailureKind::MissingKeywords));
        assert_eq!(result.message, "Missing expected keywords: Profit, Forecast");
    }

    #[test]
    fn test_empty_keyword_list_skips_check() {
        let file = file_of_size(2048);
        let validator = Validator::new(FakeLoader::new(three_slides()));

        let request = ValidationRequest::new(file.path()).with_keywords(Vec::<String>::new());
        assert!(validator.validate(&request).valid);
    }

    #[test]
    fn test_all_slides_empty_without_keywords() {
        let file = file_of_size(2048);
        let validator = Validator::new(FakeLoader::new(Outcome::Slides(vec![vec![], vec![]])));

        let result = validator.validate(&ValidationRequest::new(file.path()));
        assert_eq!(result.reason, Some(FailureKind::AllSlidesEmpty));
        assert_eq!(result.message, "All slides are empty (no content)");
    }

    #[test]
    fn test_keywords_checked_before_emptiness() {
        let file = file_of_size(2048);
        let validator = Validator::new(FakeLoader::new(Outcome::Slides(vec![vec![]])));

        let request = ValidationRequest::new(file.path()).with_keywords(["title"]);
        let result = validator.validate(&request);
        assert_eq!(result.reason, Some(FailureKind::MissingKeywords));
    }

    #[test]
    fn test_textless_shape_counts_as_content() {
        let file = file_of_size(2048);
        let validator = Validator::new(FakeLoader::new(Outcome::Slides(vec![
            vec![],
            vec![Shape::new(ShapeKind::Picture)],
        ])));

        let result = validator.validate(&ValidationRequest::new(file.path()));
        assert!(result.valid, "{}", result.message);
    }

    #[test]
    fn test_zero_slides_with_zero_minimum_is_empty() {
        let file = file_of_size(2048);
        let validator = Validator::new(FakeLoader::new(Outcome::Slides(vec![])));

        let result = validator.validate(&ValidationRequest::new(file.path()).with_min_slides(0));
        assert_eq!(result.reason, Some(FailureKind::AllSlidesEmpty));
    }

    #[test]
    fn test_repeated_validation_is_identical() {
        let file = file_of_size(4096);
        let validator = Validator::new(FakeLoader::new(three_slides()));
        let request = ValidationRequest::new(file.path()).with_keywords(["missing"]);

        let first = validator.validate(&request);
        let second = validator.validate(&request);
        assert_eq!(first, second);
    }
}
