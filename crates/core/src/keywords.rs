//! Case-insensitive keyword search over slide text.
//!
//! Text is folded to NFC and lowercased on both sides so that keywords typed
//! on a command line match text stored with a different Unicode composition.

use crate::Presentation;
use unicode_normalization::UnicodeNormalization;

/// Fold text for comparison: NFC normalization, then lowercase.
fn fold(text: &str) -> String {
    text.nfc().collect::<String>().to_lowercase()
}

/// Searches the aggregated text of a presentation for keywords.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    /// Folded text of every text-bearing shape, each followed by a space.
    haystack: String,
}

impl KeywordMatcher {
    /// Build a matcher over every text-bearing shape of every slide.
    pub fn new(presentation: &Presentation) -> Self {
        let mut all_text = String::new();
        for text in presentation.shape_texts() {
            all_text.push_str(text);
            all_text.push(' ');
        }

        Self {
            haystack: fold(&all_text),
        }
    }

    /// Whether the keyword occurs anywhere in the slide text, ignoring case.
    pub fn contains(&self, keyword: &str) -> bool {
        self.haystack.contains(&fold(keyword))
    }

    /// Keywords that do not occur, in the order given.
    pub fn missing<'a, S: AsRef<str>>(&self, keywords: &'a [S]) -> Vec<&'a str> {
        keywords
            .iter()
            .map(|keyword| keyword.as_ref())
            .filter(|keyword| !self.contains(keyword))
            .collect()
    }
}
