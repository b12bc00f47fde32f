//! PPTX file parser implementation.

use crate::package::{attr_value, local_name, Package};
use pptcheck_core::{
    Error, Presentation, PresentationLoader, Result, Shape, ShapeKind, Slide,
};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// Content types a presentation's main part may have.
const PRESENTATION_CONTENT_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml",
    "application/vnd.ms-powerpoint.presentation.macroEnabled.main+xml",
];

/// Parser for PPTX (Office Open XML) files.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a PPTX file from a reader.
    ///
    /// Every slide is read and parsed up front, so a malformed slide part
    /// fails the whole open.
    pub fn parse<R: Read + Seek>(&self, reader: R, filename: &str) -> Result<Presentation> {
        let mut package = Package::open(reader, filename)?;

        let main_part = package.main_document()?;
        let content_type = package.content_type(&main_part).unwrap_or_default();
        if !PRESENTATION_CONTENT_TYPES.contains(&content_type) {
            return Err(Error::NotAPresentation {
                content_type: content_type.to_string(),
            });
        }
        log::debug!("Main document part: {}", main_part);

        let slide_order = self.get_slide_order(&mut package, &main_part)?;
        log::debug!("Found {} slide references", slide_order.len());

        let mut presentation = Presentation::new(filename);
        for (idx, slide_path) in slide_order.iter().enumerate() {
            let slide = self.parse_slide(&mut package, slide_path, idx + 1)?;
            presentation.add_slide(slide);
        }

        Ok(presentation)
    }

    /// Get the ordered list of slide part names from `p:sldIdLst`.
    fn get_slide_order<R: Read + Seek>(
        &self,
        package: &mut Package<R>,
        main_part: &str,
    ) -> Result<Vec<String>> {
        let xml = package.read_part(main_part)?;
        let rels = package.relationships(main_part)?;

        let mut reader = Reader::from_str(&xml);
        let mut in_slide_list = false;
        let mut slides = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) if local_name(e.name().as_ref()) == b"sldIdLst" => {
                    in_slide_list = true;
                }
                Ok(Event::End(ref e)) if local_name(e.name().as_ref()) == b"sldIdLst" => {
                    in_slide_list = false;
                }
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if in_slide_list && local_name(e.name().as_ref()) == b"sldId" =>
                {
                    // The r:id attribute; the unprefixed id is the slide id.
                    let rel_id = e
                        .attributes()
                        .flatten()
                        .find(|attr| {
                            attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id"
                        })
                        .map(|attr| attr_value(&attr))
                        .transpose()?
                        .ok_or_else(|| {
                            Error::BrokenRelationship("slide id without r:id".to_string())
                        })?;

                    let rel = rels.get(&rel_id).ok_or_else(|| {
                        Error::BrokenRelationship(format!(
                            "no relationship '{}' in '{}'",
                            rel_id, main_part
                        ))
                    })?;
                    slides.push(rel.target.clone());
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing '{}': {}",
                        main_part, e
                    )));
                }
                _ => {}
            }
        }

        Ok(slides)
    }

    /// Parse a single slide from the package.
    fn parse_slide<R: Read + Seek>(
        &self,
        package: &mut Package<R>,
        slide_path: &str,
        slide_number: usize,
    ) -> Result<Slide> {
        let content = package.read_part(slide_path)?;
        let mut slide = Slide::new(slide_number);

        for shape in extract_shapes_from_xml(&content)
            .map_err(|e| Error::XmlError(format!("Error parsing '{}': {}", slide_path, e)))?
        {
            slide.add_shape(shape);
        }
        log::debug!("Slide {}: {} shapes", slide_number, slide.shapes.len());

        Ok(slide)
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationLoader for PptxParser {
    fn load(&self, path: &Path) -> Result<Presentation> {
        let file = File::open(path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        self.parse(BufReader::new(file), filename)
    }
}

/// A top-level shape being read, with the text collected so far.
struct ShapeInProgress {
    kind: ShapeKind,
    /// Index of the shape element in the element path.
    depth: usize,
    text: String,
    paragraphs: usize,
}

impl ShapeInProgress {
    /// Whether `path` (ancestors of the current element) is inside this shape's text body.
    fn in_text_body(&self, path: &[Vec<u8>]) -> bool {
        self.kind.has_text()
            && path.len() > self.depth + 1
            && path[self.depth + 1] == b"txBody"
    }

    /// Whether `path` ends at an `a:t` of a run or field directly under a paragraph.
    fn in_run_text(&self, path: &[Vec<u8>]) -> bool {
        self.in_text_body(path)
            && path.len() == self.depth + 5
            && path[self.depth + 2] == b"p"
            && matches!(path[self.depth + 3].as_slice(), b"r" | b"fld")
            && path[self.depth + 4] == b"t"
    }

    /// Handle an element opening inside the shape, given its ancestors.
    fn open(&mut self, name: &[u8], path: &[Vec<u8>]) {
        if !self.in_text_body(path) {
            return;
        }
        match name {
            // a:p directly under the text body
            b"p" if path.len() == self.depth + 2 => {
                if self.paragraphs > 0 {
                    self.text.push('\n');
                }
                self.paragraphs += 1;
            }
            // a:br directly under a paragraph
            b"br" if path.len() == self.depth + 3 => self.text.push('\u{b}'),
            _ => {}
        }
    }

    fn finish(self) -> Shape {
        Shape {
            kind: self.kind,
            text: self.kind.has_text().then_some(self.text),
        }
    }
}

/// Whether an element with these ancestors is a direct child of the slide's shape tree.
fn is_shape_tree_child(path: &[Vec<u8>]) -> bool {
    path.len() == 3 && path[1] == b"cSld" && path[2] == b"spTree"
}

/// Extract the top-level shapes of a slide's `p:cSld/p:spTree`.
///
/// Members of group shapes are not top-level shapes; their text is not
/// attributed to the group.
fn extract_shapes_from_xml(xml_content: &str) -> std::result::Result<Vec<Shape>, quick_xml::Error> {
    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml_content);

    // Local names of the currently open elements, root first.
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<ShapeInProgress> = None;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                let name = local_name(e.name().as_ref()).to_vec();
                if is_shape_tree_child(&path) {
                    match ShapeKind::from_local_name(&name) {
                        Some(kind) => {
                            current = Some(ShapeInProgress {
                                kind,
                                depth: path.len(),
                                text: String::new(),
                                paragraphs: 0,
                            });
                        }
                        None => log::debug!(
                            "Skipping shape tree element '{}'",
                            String::from_utf8_lossy(&name)
                        ),
                    }
                } else if let Some(shape) = current.as_mut() {
                    shape.open(&name, &path);
                }
                path.push(name);
            }
            Event::Empty(ref e) => {
                let name = e.name();
                let name = local_name(name.as_ref());
                if is_shape_tree_child(&path) {
                    if let Some(kind) = ShapeKind::from_local_name(name) {
                        shapes.push(Shape::new(kind));
                    }
                } else if let Some(shape) = current.as_mut() {
                    shape.open(name, &path);
                }
            }
            Event::Text(ref e) => {
                if let Some(shape) = current.as_mut() {
                    if shape.in_run_text(&path) {
                        shape.text.push_str(&e.unescape()?);
                    }
                }
            }
            Event::End(_) => {
                path.pop();
                if current.as_ref().is_some_and(|shape| shape.depth == path.len()) {
                    if let Some(shape) = current.take() {
                        shapes.push(shape.finish());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes)
}
