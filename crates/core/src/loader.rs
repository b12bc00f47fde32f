//! Seam between the validator and a presentation package reader.

use crate::{Presentation, Result};
use std::path::Path;

/// Something that can open a presentation file and expose its slides.
///
/// Implementations must return [`crate::Error::NotAPackage`] when the file is
/// not a package container at all, and any other variant for failures inside
/// a recognised package.
pub trait PresentationLoader {
    /// Load the presentation at `path`.
    fn load(&self, path: &Path) -> Result<Presentation>;
}

impl<L: PresentationLoader + ?Sized> PresentationLoader for &L {
    fn load(&self, path: &Path) -> Result<Presentation> {
        (**self).load(path)
    }
}
