//! In-memory zip access with tolerant path resolution and encoding detection.

use std::io::{Cursor, Read};

use once_cell::sync::Lazy;
use regex::Regex;
use zip::ZipArchive;

use crate::error::{Error, Result};

/// How many leading bytes are sniffed for an encoding declaration.
const ENCODING_SNIFF_LEN: usize = 1000;

/// An opened ePub container. Ephemeral: created from raw bytes, discarded
/// once parsing completes.
pub struct Archive {
    zip: ZipArchive<Cursor<Vec<u8>>>,
    names: Vec<String>,
}

impl Archive {
    /// Open a zip container from raw bytes.
    ///
    /// Fails with [`Error::InvalidArchive`] if the bytes are not a valid zip
    /// structure.
    pub fn open(bytes: Vec<u8>) -> Result<Self> {
        let zip = ZipArchive::new(Cursor::new(bytes))?;
        let names = zip.file_names().map(str::to_owned).collect();
        Ok(Self { zip, names })
    }

    /// Whether an entry exists under exactly this path.
    pub fn contains(&self, path: &str) -> bool {
        self.names.iter().any(|n| n == path)
    }

    /// Read the raw bytes of an entry, tolerating inconsistently authored
    /// paths. Tries, in order: the literal path, the path with a leading
    /// slash stripped, the percent-decoded path, and a case-insensitive
    /// match over all entry names.
    ///
    /// Returns [`Error::NotFound`] if no strategy matches. Spine walkers
    /// treat that as "chapter skipped", not as a fatal failure.
    pub fn read_bytes(&mut self, path: &str) -> Result<Vec<u8>> {
        let name = self
            .resolve_name(path)
            .ok_or_else(|| Error::NotFound(path.to_string()))?;

        let mut file = self.zip.by_name(&name)?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        Ok(contents)
    }

    /// Read an entry and decode it to text via [`decode_bytes`].
    pub fn read_text(&mut self, path: &str) -> Result<String> {
        Ok(decode_bytes(&self.read_bytes(path)?))
    }

    fn resolve_name(&self, path: &str) -> Option<String> {
        if self.contains(path) {
            return Some(path.to_string());
        }

        let unslashed = path.trim_start_matches('/');
        if unslashed != path && self.contains(unslashed) {
            return Some(unslashed.to_string());
        }

        if let Ok(decoded) = percent_encoding::percent_decode_str(path).decode_utf8()
            && decoded != path
            && self.contains(&decoded)
        {
            return Some(decoded.into_owned());
        }

        self.names
            .iter()
            .find(|n| n.eq_ignore_ascii_case(path))
            .cloned()
    }
}

static DECLARED_ENCODING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)encoding=["']([^"']+)["']"#).expect("valid regex"));
static META_CHARSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)charset=["']?([^"'\s;>]+)"#).expect("valid regex"));

/// Decode raw entry bytes to text.
///
/// The first 1000 bytes are provisionally decoded as UTF-8 and scanned for an
/// XML `encoding="..."` declaration or an HTML `charset=` meta value (the
/// meta value wins when both are present). Common aliases are normalized to
/// canonical names and resolved through `encoding_rs`; anything unresolvable
/// falls back to lossy UTF-8. Never fails: undecodable sequences become
/// replacement characters.
pub fn decode_bytes(bytes: &[u8]) -> String {
    let sniff_len = bytes.len().min(ENCODING_SNIFF_LEN);
    let (preview, _, _) = encoding_rs::UTF_8.decode(&bytes[..sniff_len]);

    let mut label = "utf-8".to_string();
    if let Some(caps) = DECLARED_ENCODING.captures(&preview) {
        label = caps[1].to_ascii_lowercase();
    }
    if let Some(caps) = META_CHARSET.captures(&preview) {
        label = caps[1].to_ascii_lowercase();
    }

    let encoding = encoding_rs::Encoding::for_label(normalize_encoding_label(&label).as_bytes())
        .unwrap_or(encoding_rs::UTF_8);
    if encoding != encoding_rs::UTF_8 {
        tracing::debug!(encoding = encoding.name(), "decoding with declared encoding");
    }

    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

/// Normalize the encoding aliases seen in real-world ebooks.
fn normalize_encoding_label(label: &str) -> &str {
    match label {
        "latin1" | "latin-1" | "iso-8859-1" => "iso-8859-1",
        "cp1252" | "windows-1252" => "windows-1252",
        "utf8" | "utf-8" => "utf-8",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn build_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for (name, data) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_open_rejects_garbage() {
        let result = Archive::open(b"definitely not a zip".to_vec());
        assert!(matches!(result, Err(Error::InvalidArchive(_))));
    }

    #[test]
    fn test_path_resolution_fallbacks() {
        let bytes = build_zip(&[("OEBPS/chapter 1.xhtml", b"<p>hello</p>")]);
        let mut archive = Archive::open(bytes).unwrap();

        // Literal
        assert!(archive.read_bytes("OEBPS/chapter 1.xhtml").is_ok());
        // Leading slash stripped
        assert!(archive.read_bytes("/OEBPS/chapter 1.xhtml").is_ok());
        // Percent-decoded
        assert!(archive.read_bytes("OEBPS/chapter%201.xhtml").is_ok());
        // Case-insensitive
        assert!(archive.read_bytes("oebps/CHAPTER 1.xhtml").is_ok());
        // No match
        assert!(matches!(
            archive.read_bytes("OEBPS/chapter 2.xhtml"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_decode_utf8_default() {
        assert_eq!(decode_bytes("ciao però".as_bytes()), "ciao però");
    }

    #[test]
    fn test_decode_declared_latin1() {
        let mut bytes = br#"<?xml version="1.0" encoding="ISO-8859-1"?><p>perch"#.to_vec();
        bytes.push(0xE9); // 'é' in Latin-1
        bytes.extend_from_slice(b"</p>");

        let decoded = decode_bytes(&bytes);
        assert!(decoded.contains("perché"), "got: {decoded}");
        assert!(!decoded.contains('\u{FFFD}'));
    }

    #[test]
    fn test_decode_meta_charset() {
        let mut bytes =
            b"<html><head><meta charset=\"windows-1252\"></head><body>caf".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b"</body></html>");

        assert!(decode_bytes(&bytes).contains("caf\u{E9}"));
    }

    #[test]
    fn test_decode_unknown_label_falls_back_lossy() {
        let mut bytes = br#"<?xml version="1.0" encoding="no-such-encoding"?>"#.to_vec();
        bytes.extend_from_slice(&[0xFF, 0xFE, 0x00]);

        // Must not panic; invalid sequences become replacement characters.
        let decoded = decode_bytes(&bytes);
        assert!(decoded.contains("<?xml"));
    }

    #[test]
    fn test_decode_strips_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"hello");
        assert_eq!(decode_bytes(&bytes), "hello");
    }
}
