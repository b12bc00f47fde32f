//! Error types for loading a presentation package.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while opening a presentation package.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read the input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The file is not a package container at all.
    #[error("Package not found: {0}")]
    NotAPackage(String),

    /// ZIP archive error inside an otherwise recognised package.
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error in one of the package parts.
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// A part the package requires is absent.
    #[error("There is no item named '{0}' in the archive")]
    MissingPart(String),

    /// The package is valid but its main document is not a presentation.
    #[error("file is not a PowerPoint file, content type is '{content_type}'")]
    NotAPresentation {
        /// Content type of the main document part.
        content_type: String,
    },

    /// A relationship id or target could not be resolved.
    #[error("Broken relationship: {0}")]
    BrokenRelationship(String),
}

impl Error {
    /// Whether the file was not recognised as a package container.
    ///
    /// Everything else is a failure while reading a recognised package.
    pub fn is_not_a_package(&self) -> bool {
        matches!(self, Error::NotAPackage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MissingPart("[Content_Types].xml".to_string());
        assert_eq!(
            err.to_string(),
            "There is no item named '[Content_Types].xml' in the archive"
        );

        let err = Error::NotAPresentation {
            content_type: "application/xml".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "file is not a PowerPoint file, content type is 'application/xml'"
        );
    }

    #[test]
    fn test_not_a_package_classification() {
        assert!(Error::NotAPackage("x.pptx".to_string()).is_not_a_package());
        assert!(!Error::ZipError("bad".to_string()).is_not_a_package());

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::IoError(_)));
        assert!(!err.is_not_a_package());
    }
}
