//! OPC package access: ZIP parts, content types, and relationships.

use pptcheck_core::{Error, PresentationFormat, Result};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom};
use zip::result::ZipError;
use zip::ZipArchive;

/// Part name of the content types stream.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Relationship type suffix for the main document part.
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";

/// A ZIP-backed Open Packaging Conventions package.
pub struct Package<R> {
    archive: ZipArchive<R>,
    content_types: ContentTypes,
}

impl<R: Read + Seek> Package<R> {
    /// Open a package, failing with `NotAPackage` when the input is not a ZIP archive.
    pub fn open(mut reader: R, filename: &str) -> Result<Self> {
        let mut magic = Vec::with_capacity(8);
        reader.by_ref().take(8).read_to_end(&mut magic)?;
        reader.seek(SeekFrom::Start(0))?;

        let mut archive = ZipArchive::new(reader).map_err(|e| match e {
            ZipError::InvalidArchive(reason) => match PresentationFormat::from_magic(&magic) {
                Some(PresentationFormat::Ppt) => Error::NotAPackage(format!(
                    "'{}' is a legacy PowerPoint 97-2003 file",
                    filename
                )),
                _ => Error::NotAPackage(format!("'{}' is not a ZIP archive: {}", filename, reason)),
            },
            ZipError::Io(e) => Error::IoError(e),
            other => Error::ZipError(format!("Failed to open ZIP: {}", other)),
        })?;

        let content_types = ContentTypes::parse(&read_part(&mut archive, CONTENT_TYPES_PART)?)?;

        Ok(Self {
            archive,
            content_types,
        })
    }

    /// Read a part as text. `name` has no leading slash.
    pub fn read_part(&mut self, name: &str) -> Result<String> {
        read_part(&mut self.archive, name)
    }

    /// Content type of a part, from its override or its extension default.
    pub fn content_type(&self, name: &str) -> Option<&str> {
        self.content_types.for_part(name)
    }

    /// Relationships whose source is `part` (`""` for the package itself).
    ///
    /// A part without a relationships part has no relationships.
    pub fn relationships(&mut self, part: &str) -> Result<Relationships> {
        let rels_name = rels_part_name(part);
        match read_part(&mut self.archive, &rels_name) {
            Ok(xml) => Relationships::parse(&xml, part),
            Err(Error::MissingPart(_)) => {
                log::debug!("No relationships part for '{}'", part);
                Ok(Relationships::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Name of the main document part, from the package-level relationships.
    pub fn main_document(&mut self) -> Result<String> {
        self.relationships("")?
            .first_of_type(OFFICE_DOCUMENT_REL)
            .map(|rel| rel.target.clone())
            .ok_or_else(|| {
                Error::BrokenRelationship("package has no officeDocument relationship".to_string())
            })
    }
}

/// Read a file from the ZIP archive as text.
fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let mut file = archive.by_name(name).map_err(|e| match e {
        ZipError::FileNotFound => Error::MissingPart(name.to_string()),
        other => Error::ZipError(format!("Failed to read '{}': {}", name, other)),
    })?;

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", name, e)))?;

    decode_xml_bytes(&bytes)
        .ok_or_else(|| Error::XmlError(format!("'{}' is not valid UTF-8 or UTF-16", name)))
}

/// Decode XML bytes: UTF-8 (optional BOM) or UTF-16 with a BOM.
fn decode_xml_bytes(bytes: &[u8]) -> Option<String> {
    let utf16 = |be: bool| {
        let units = bytes[2..]
            .chunks_exact(2)
            .map(|pair| {
                if be {
                    u16::from_be_bytes([pair[0], pair[1]])
                } else {
                    u16::from_le_bytes([pair[0], pair[1]])
                }
            });
        char::decode_utf16(units).collect::<std::result::Result<String, _>>().ok()
    };

    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8(rest.to_vec()).ok(),
        [0xFF, 0xFE, ..] => utf16(false),
        [0xFE, 0xFF, ..] => utf16(true),
        _ => String::from_utf8(bytes.to_vec()).ok(),
    }
}

/// Name of the relationships part for `part`: `ppt/x.xml` -> `ppt/_rels/x.xml.rels`.
fn rels_part_name(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the directory of its source part.
///
/// Returns a part name without a leading slash, or `None` if the target
/// climbs above the package root.
pub fn resolve_target(source_part: &str, target: &str) -> Option<String> {
    let mut segments: Vec<&str> = Vec::new();
    let relative = match target.strip_prefix('/') {
        Some(absolute) => absolute,
        None => {
            if let Some((dir, _)) = source_part.rsplit_once('/') {
                segments.extend(dir.split('/').filter(|s| !s.is_empty()));
            }
            target
        }
    };

    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            s => segments.push(s),
        }
    }

    Some(segments.join("/"))
}

/// Extract the local name from a potentially namespaced XML element name.
pub fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Attribute value with entity and character references resolved.
pub fn attr_value(attr: &Attribute) -> Result<String> {
    attr.unescape_value()
        .map(|value| value.into_owned())
        .map_err(|e| Error::XmlError(format!("Bad attribute value: {}", e)))
}

/// Parsed `[Content_Types].xml`.
#[derive(Debug, Default)]
pub struct ContentTypes {
    /// Lowercased extension -> content type.
    defaults: HashMap<String, String>,
    /// Lowercased part name without leading slash -> content type.
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    fn parse(xml: &str) -> Result<Self> {
        let mut types = Self::default();
        let mut reader = Reader::from_str(xml);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let name = e.name();
                    let kind = local_name(name.as_ref());
                    if kind != b"Default" && kind != b"Override" {
                        continue;
                    }

                    let mut key = String::new();
                    let mut content_type = String::new();
                    for attr in e.attributes().flatten() {
                        let value = attr_value(&attr)?;
                        match attr.key.as_ref() {
                            b"Extension" | b"PartName" => key = value,
                            b"ContentType" => content_type = value,
                            _ => {}
                        }
                    }

                    if kind == b"Default" {
                        types.defaults.insert(key.to_lowercase(), content_type);
                    } else {
                        let part = key.trim_start_matches('/').to_lowercase();
                        types.overrides.insert(part, content_type);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing {}: {}",
                        CONTENT_TYPES_PART, e
                    )));
                }
                _ => {}
            }
        }

        Ok(types)
    }

    /// Part names are matched case-insensitively.
    fn for_part(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        if let Some(ct) = self.overrides.get(&name) {
            return Some(ct);
        }
        let (_, ext) = name.rsplit_once('.')?;
        self.defaults.get(ext).map(String::as_str)
    }
}

/// A relationship from one part to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1").
    pub id: String,
    /// Relationship type URI.
    pub rel_type: String,
    /// Resolved part name of the target.
    pub target: String,
}

/// Internal relationships of one source part.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    rels: Vec<Relationship>,
}

impl Relationships {
    fn parse(xml: &str, source_part: &str) -> Result<Self> {
        let mut rels = Vec::new();
        let mut reader = Reader::from_str(xml);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"Relationship" =>
                {
                    let mut rel_type = String::new();
                    let mut target = String::new();
                    let mut id = String::new();
                    let mut external = false;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Type" => {
                                rel_type = attr_value(&attr)?;
                            }
                            b"Target" => {
                                target = attr_value(&attr)?;
                            }
                            b"Id" => {
                                id = attr_value(&attr)?;
                            }
                            b"TargetMode" => {
                                external = attr.value.as_ref() == b"External";
                            }
                            _ => {}
                        }
                    }

                    if external {
                        continue;
                    }

                    let resolved = resolve_target(source_part, &target).ok_or_else(|| {
                        Error::BrokenRelationship(format!(
                            "target '{}' of '{}' escapes the package",
                            target, id
                        ))
                    })?;
                    rels.push(Relationship {
                        id,
                        rel_type,
                        target: resolved,
                    });
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing relationships of '{}': {}",
                        source_part, e
                    )));
                }
                _ => {}
            }
        }

        Ok(Self { rels })
    }

    /// Look up a relationship by its id.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|rel| rel.id == id)
    }

    /// First relationship whose type URI ends with `suffix`.
    pub fn first_of_type(&self, suffix: &str) -> Option<&Relationship> {
        self.rels.iter().find(|rel| rel.rel_type.ends_with(suffix))
    }
}
