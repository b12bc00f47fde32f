//! Minimal in-memory PPTX packages for tests.
//!
//! Produces just enough of a PresentationML package for the parser: content
//! types, package and presentation relationships, `presentation.xml`, and
//! one part per slide. Masters, layouts, and themes are left out.

use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::result::ZipResult;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Content type of a regular presentation's main part.
pub const PRESENTATION_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";

const SLIDE_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";

const NAMESPACES: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Builder for a PPTX package.
#[derive(Debug, Clone)]
pub struct PptxFixture {
    /// Shape-tree children of each slide.
    slides: Vec<String>,
    main_content_type: String,
    omitted: Vec<String>,
    padding: usize,
}

impl Default for PptxFixture {
    fn default() -> Self {
        Self {
            slides: Vec::new(),
            main_content_type: PRESENTATION_CONTENT_TYPE.to_string(),
            omitted: Vec::new(),
            padding: 0,
        }
    }
}

impl PptxFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a slide holding the given shape XML fragments.
    pub fn slide<I, S>(mut self, shapes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tree = shapes
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        self.slides.push(tree);
        self
    }

    /// Override the content type declared for `ppt/presentation.xml`.
    pub fn main_content_type(mut self, content_type: &str) -> Self {
        self.main_content_type = content_type.to_string();
        self
    }

    /// Leave a part out of the archive.
    pub fn omit_part(mut self, name: &str) -> Self {
        self.omitted.push(name.to_string());
        self
    }

    /// Add an uncompressed thumbnail part of `bytes` zero bytes.
    pub fn padding(mut self, bytes: usize) -> Self {
        self.padding = bytes;
        self
    }

    /// Write the package into a byte vector.
    pub fn build(&self) -> ZipResult<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Stored);

        for (name, content) in self.parts() {
            if self.omitted.iter().any(|omitted| *omitted == name) {
                continue;
            }
            zip.start_file(name, options)?;
            zip.write_all(&content)?;
        }

        Ok(zip.finish()?.into_inner())
    }

    /// Write the package to a file.
    pub fn write_to(&self, path: &Path) -> ZipResult<()> {
        std::fs::write(path, self.build()?)?;
        Ok(())
    }

    fn parts(&self) -> Vec<(String, Vec<u8>)> {
        let mut parts = Vec::new();

        let slide_overrides: String = (1..=self.slides.len())
            .map(|n| {
                format!(
                    r#"<Override PartName="/ppt/slides/slide{n}.xml" ContentType="{SLIDE_CONTENT_TYPE}"/>"#
                )
            })
            .collect();
        parts.push((
            "[Content_Types].xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Default Extension="jpeg" ContentType="image/jpeg"/>
<Override PartName="/ppt/presentation.xml" ContentType="{}"/>
{slide_overrides}
</Types>"#,
                self.main_content_type
            )
            .into_bytes(),
        ));

        parts.push((
            "_rels/.rels".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="{REL_BASE}/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#
            )
            .into_bytes(),
        ));

        let slide_ids: String = (1..=self.slides.len())
            .map(|n| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + n, n + 1))
            .collect();
        parts.push((
            "ppt/presentation.xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation {NAMESPACES}>
<p:sldIdLst>{slide_ids}</p:sldIdLst>
<p:sldSz cx="9144000" cy="6858000"/>
<p:notesSz cx="6858000" cy="9144000"/>
</p:presentation>"#
            )
            .into_bytes(),
        ));

        let slide_rels: String = (1..=self.slides.len())
            .map(|n| {
                format!(
                    r#"<Relationship Id="rId{}" Type="{REL_BASE}/slide" Target="slides/slide{n}.xml"/>"#,
                    n + 1
                )
            })
            .collect();
        parts.push((
            "ppt/_rels/presentation.xml.rels".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
{slide_rels}
</Relationships>"#
            )
            .into_bytes(),
        ));

        for (idx, tree) in self.slides.iter().enumerate() {
            parts.push((
                format!("ppt/slides/slide{}.xml", idx + 1),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld {NAMESPACES}>
<p:cSld>
<p:spTree>
<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
<p:grpSpPr/>
{tree}
</p:spTree>
</p:cSld>
</p:sld>"#
                )
                .into_bytes(),
            ));
        }

        if self.padding > 0 {
            parts.push(("docProps/thumbnail.jpeg".to_string(), vec![0u8; self.padding]));
        }

        parts
    }
}

/// A text box with one paragraph per entry.
pub fn text_box(paragraphs: &[&str]) -> String {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", escape(*p)))
        .collect();
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="TextBox"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/>{body}</p:txBody></p:sp>"#
    )
}

/// A picture, which carries no text.
pub fn picture() -> String {
    r#"<p:pic><p:nvPicPr><p:cNvPr id="3" name="Picture"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill/><p:spPr/></p:pic>"#
        .to_string()
}

/// A group shape wrapping other shapes.
pub fn group(children: &[String]) -> String {
    format!(
        r#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="4" name="Group"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:grpSp>"#,
        children.concat()
    )
}
