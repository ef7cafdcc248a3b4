//! EPUB ingestion pipeline: archive -> package document -> chapters -> text.

mod archive;
pub mod drm;
mod extract;
mod package;

pub use archive::{Archive, decode_bytes};
pub use extract::extract_text;
pub use package::{
    CONTAINER_PATH, ENCRYPTION_PATH, ManifestItem, PackageDoc, UNKNOWN_AUTHOR,
    locate_package_document, parse_package,
};

use tracing::{debug, warn};

use crate::book::{Chapter, ParsedEpub};
use crate::error::{Error, Result};

/// Extracted chapter text must exceed this many characters to be kept;
/// shorter fragments (nav pages, covers) are dropped silently.
pub const MIN_CHAPTER_CHARS: usize = 50;

/// Total extracted text under this many characters fails the ingestion:
/// the archive was not a readable book.
pub const MIN_BOOK_CHARS: usize = 100;

/// Parse an ePub from raw bytes into a [`ParsedEpub`].
///
/// `filename` is only used as the title fallback when the package document
/// declares none. The whole operation is atomic: it either returns a
/// complete result or a single error, never partial chapters.
///
/// # Example
///
/// ```no_run
/// let bytes = std::fs::read("book.epub")?;
/// let book = leggio::parse_epub(bytes, "book.epub")?;
/// println!("{}: {} chapters", book.metadata.title, book.chapters.len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_epub(bytes: Vec<u8>, filename: &str) -> Result<ParsedEpub> {
    let mut archive = Archive::open(bytes)?;

    // DRM gate: checked before any chapter is read.
    if archive.contains(ENCRYPTION_PATH) {
        let descriptor = archive.read_text(ENCRYPTION_PATH)?;
        if drm::is_encrypted(&descriptor) {
            warn!("encryption descriptor matches known DRM markers");
            return Err(Error::DrmProtected);
        }
    }

    let opf_path = locate_package_document(&mut archive)?;
    let opf_dir = package_dir(&opf_path);

    let opf_content = archive.read_text(&opf_path).map_err(|e| match e {
        Error::NotFound(path) => Error::InvalidEpub(format!("missing package document: {path}")),
        other => other,
    })?;
    let package = parse_package(&opf_content, filename)?;

    let (chapters, full_text) = extract_chapters(&mut archive, &package, &opf_dir)?;

    let chars = full_text.chars().count();
    if chars < MIN_BOOK_CHARS {
        return Err(Error::EmptyExtraction { chars });
    }

    Ok(ParsedEpub {
        metadata: package.metadata,
        chapters,
        full_text,
    })
}

/// Walk the spine in declared order, extracting one chapter per readable
/// markup entry. Per-entry lookup failures skip the entry; DRM hits fail
/// the whole operation.
fn extract_chapters(
    archive: &mut Archive,
    package: &PackageDoc,
    opf_dir: &str,
) -> Result<(Vec<Chapter>, String)> {
    let mut chapters = Vec::new();
    let mut full_text = String::new();

    for idref in &package.spine {
        let Some(item) = package.manifest.get(idref) else {
            debug!(%idref, "spine entry references unknown manifest id, skipping");
            continue;
        };
        if !is_markup_media_type(&item.media_type) {
            continue;
        }

        let path = format!("{opf_dir}{}", item.href);
        let content = match read_chapter(archive, &path, &item.href) {
            Ok(content) => content,
            Err(Error::NotFound(path)) => {
                debug!(%path, "manifest file missing from archive, skipping");
                continue;
            }
            Err(e) => return Err(e),
        };

        if drm::looks_encrypted(&content) {
            warn!(%path, "chapter content looks like ciphertext");
            return Err(Error::DrmProtected);
        }

        let text = extract_text(&content);
        if text.chars().count() > MIN_CHAPTER_CHARS {
            if !full_text.is_empty() {
                full_text.push(' ');
            }
            full_text.push_str(&text);
            chapters.push(Chapter {
                title: format!("Capitolo {}", chapters.len() + 1),
                text,
            });
        }
    }

    Ok((chapters, full_text))
}

/// Read a chapter trying the directory-relative path first, then the bare
/// href. Some archives place files at the root while the package document
/// lives in a subdirectory.
fn read_chapter(archive: &mut Archive, path: &str, href: &str) -> Result<String> {
    match archive.read_text(path) {
        Err(Error::NotFound(_)) if href != path => archive.read_text(href),
        other => other,
    }
}

fn is_markup_media_type(media_type: &str) -> bool {
    media_type.contains("html") || media_type.contains("xml")
}

/// Directory of the package document, trailing slash included; hrefs in the
/// manifest are relative to it.
fn package_dir(opf_path: &str) -> String {
    match opf_path.rfind('/') {
        Some(i) => opf_path[..=i].to_string(),
        None => String::new(),
    }
}
