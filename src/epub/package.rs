//! Package document parsing (container.xml and the OPF file).

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::book::EpubMetadata;
use crate::epub::archive::Archive;
use crate::error::{Error, Result};

/// Reserved path of the container descriptor.
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Reserved path of the encryption descriptor checked by the DRM gate.
pub const ENCRYPTION_PATH: &str = "META-INF/encryption.xml";

/// Placeholder author when the package document declares none.
pub const UNKNOWN_AUTHOR: &str = "Autore sconosciuto";

/// One manifest entry: a bundled resource keyed by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    /// Percent-decoded path, relative to the package document's directory.
    pub href: String,
    pub media_type: String,
}

/// Parsed package document: metadata, the id -> resource mapping, and the
/// spine (linear reading order of manifest ids, preserved exactly as
/// declared).
pub struct PackageDoc {
    pub metadata: EpubMetadata,
    pub manifest: HashMap<String, ManifestItem>,
    pub spine: Vec<String>,
}

/// Find the package document's full path from the container descriptor.
pub fn locate_package_document(archive: &mut Archive) -> Result<String> {
    let container = archive.read_text(CONTAINER_PATH).map_err(|e| match e {
        Error::NotFound(_) => Error::InvalidEpub("missing META-INF/container.xml".into()),
        other => other,
    })?;

    let mut reader = Reader::from_str(&container);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if local_name(e.name().as_ref()) == b"rootfile" =>
            {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"full-path" {
                        return String::from_utf8(attr.value.to_vec())
                            .map_err(|e| Error::InvalidEpub(e.to_string()));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Err(Error::InvalidEpub(
        "no rootfile reference in container.xml".into(),
    ))
}

/// Parse the package document into metadata, manifest, and spine.
///
/// Metadata elements are matched on their local names so `dc:`-prefixed and
/// unprefixed documents both work. `filename` supplies the title fallback.
pub fn parse_package(content: &str, filename: &str) -> Result<PackageDoc> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut title = String::new();
    let mut author = String::new();
    let mut language = String::new();
    let mut publisher = String::new();
    let mut manifest: HashMap<String, ManifestItem> = HashMap::new();
    let mut spine: Vec<String> = Vec::new();

    let mut in_metadata = false;
    let mut current_element: Option<&'static str> = None;
    let mut buf_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());

                match local {
                    b"metadata" => in_metadata = true,
                    b"title" | b"creator" | b"language" | b"publisher" if in_metadata => {
                        current_element = Some(match local {
                            b"title" => "title",
                            b"creator" => "creator",
                            b"language" => "language",
                            _ => "publisher",
                        });
                        buf_text.clear();
                    }
                    _ => apply_structural_element(&e, &mut manifest, &mut spine)?,
                }
            }
            Ok(Event::Empty(e)) => apply_structural_element(&e, &mut manifest, &mut spine)?,
            Ok(Event::Text(e)) => {
                if current_element.is_some() {
                    buf_text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if current_element.is_some()
                    && let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref()))
                {
                    buf_text.push_str(&resolved);
                }
            }
            Ok(Event::End(e)) => {
                if local_name(e.name().as_ref()) == b"metadata" {
                    in_metadata = false;
                }
                if let Some(elem) = current_element {
                    match elem {
                        "title" => title = buf_text.clone(),
                        // Only the first creator becomes the display author.
                        "creator" if author.is_empty() => author = buf_text.clone(),
                        "language" => language = buf_text.clone(),
                        "publisher" => publisher = buf_text.clone(),
                        _ => {}
                    }
                    current_element = None;
                    buf_text.clear();
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    let metadata = EpubMetadata {
        title: non_empty(&title).unwrap_or_else(|| strip_epub_suffix(filename).to_string()),
        author: non_empty(&author).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        language: non_empty(&language),
        publisher: non_empty(&publisher),
    };

    Ok(PackageDoc {
        metadata,
        manifest,
        spine,
    })
}

/// Handle `<item>` and `<itemref>` elements, which appear either as empty
/// or as start tags depending on the authoring tool.
fn apply_structural_element(
    e: &BytesStart<'_>,
    manifest: &mut HashMap<String, ManifestItem>,
    spine: &mut Vec<String>,
) -> Result<()> {
    match local_name(e.name().as_ref()) {
        b"item" => {
            let mut id = String::new();
            let mut href = String::new();
            let mut media_type = String::new();

            for attr in e.attributes().flatten() {
                let value = || {
                    String::from_utf8(attr.value.to_vec())
                        .map_err(|e| Error::InvalidEpub(e.to_string()))
                };
                match attr.key.as_ref() {
                    b"id" => id = value()?,
                    b"href" => href = value()?,
                    b"media-type" => media_type = value()?,
                    _ => {}
                }
            }

            if !id.is_empty() && !href.is_empty() {
                let href = percent_encoding::percent_decode_str(&href)
                    .decode_utf8()
                    .map(|c| c.into_owned())
                    .unwrap_or(href);
                manifest.insert(id, ManifestItem { href, media_type });
            }
        }
        b"itemref" => {
            for attr in e.attributes().flatten() {
                if attr.key.as_ref() == b"idref" {
                    spine.push(
                        String::from_utf8(attr.value.to_vec())
                            .map_err(|e| Error::InvalidEpub(e.to_string()))?,
                    );
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn strip_epub_suffix(filename: &str) -> &str {
    let lower = filename.to_ascii_lowercase();
    match lower.strip_suffix(".epub") {
        Some(stem) => &filename[..stem.len()],
        None => filename,
    }
}

/// Extract local name from a namespaced XML name (e.g., "dc:title" -> "title").
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

/// Resolve XML entity references, named and numeric.
pub(crate) fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        "nbsp" => return Some("\u{A0}".to_string()),
        _ => {}
    }

    if let Some(hex) = entity.strip_prefix("#x") {
        if let Ok(code) = u32::from_str_radix(hex, 16)
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
    } else if let Some(dec) = entity.strip_prefix('#')
        && let Ok(code) = dec.parse::<u32>()
        && let Some(c) = char::from_u32(code)
    {
        return Some(c.to_string());
    }

    None
}
