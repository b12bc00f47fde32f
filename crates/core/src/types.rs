//! Domain types for representing a loaded presentation.

/// Represents an entire presentation with its slides and shapes.
#[derive(Debug, Clone)]
pub struct Presentation {
    /// Original filename (without path).
    pub filename: String,

    /// Slides in presentation order.
    pub slides: Vec<Slide>,
}

impl Presentation {
    /// Create a new, empty presentation with the given filename.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            slides: Vec::new(),
        }
    }

    /// Add a slide to the presentation.
    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    /// Number of slides.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Text of every text-bearing shape on every slide, in slide order.
    pub fn shape_texts(&self) -> impl Iterator<Item = &str> {
        self.slides
            .iter()
            .flat_map(|s| s.shapes.iter().filter_map(|shape| shape.text.as_deref()))
    }

    /// Whether every slide has zero shapes. True for a deck with no slides.
    pub fn all_slides_empty(&self) -> bool {
        self.slides.iter().all(|s| s.is_empty())
    }
}

/// Container format detected from leading magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationFormat {
    /// Modern PPTX (Office Open XML).
    Pptx,
    /// Legacy PPT (OLE/CFB binary).
    Ppt,
}

impl PresentationFormat {
    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PPTX is a ZIP file (PK\x03\x04)
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Some(Self::Pptx);
        }

        // PPT is an OLE/CFB file (D0 CF 11 E0 A1 B1 1A E1)
        if bytes.len() >= 8
            && bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])
        {
            return Some(Self::Ppt);
        }

        None
    }
}

/// A single slide.
#[derive(Debug, Clone)]
pub struct Slide {
    /// 1-based slide number.
    pub number: usize,

    /// Top-level shapes of the slide's shape tree, in document order.
    pub shapes: Vec<Shape>,
}

impl Slide {
    /// Create a new slide with the given number.
    pub fn new(number: usize) -> Self {
        Self {
            number,
            shapes: Vec::new(),
        }
    }

    /// Add a shape to this slide.
    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// A slide with no shapes at all.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Kind of a top-level shape-tree element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// `p:sp`: auto shape, text box, or placeholder.
    AutoShape,
    /// `p:grpSp`
    Group,
    /// `p:graphicFrame`: table, chart, or diagram.
    GraphicFrame,
    /// `p:cxnSp`
    Connector,
    /// `p:pic`
    Picture,
    /// `p:contentPart`
    ContentPart,
}

impl ShapeKind {
    /// Map a PresentationML element local name to a shape kind.
    pub fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"sp" => Some(Self::AutoShape),
            b"grpSp" => Some(Self::Group),
            b"graphicFrame" => Some(Self::GraphicFrame),
            b"cxnSp" => Some(Self::Connector),
            b"pic" => Some(Self::Picture),
            b"contentPart" => Some(Self::ContentPart),
            _ => None,
        }
    }

    /// Whether shapes of this kind expose a text body.
    pub fn has_text(self) -> bool {
        matches!(self, Self::AutoShape)
    }
}

/// A visual element on a slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    /// What kind of element this is.
    pub kind: ShapeKind,

    /// Extracted text. `None` for shapes that do not expose text at all;
    /// `Some("")` for text-capable shapes with nothing in them.
    pub text: Option<String>,
}

impl Shape {
    /// Create a shape of the given kind, with empty text if the kind carries text.
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            text: kind.has_text().then(String::new),
        }
    }

    /// Create a text-bearing auto shape.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            kind: ShapeKind::AutoShape,
            text: Some(text.into()),
        }
    }
}
