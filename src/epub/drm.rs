//! DRM detection for encrypted books.

/// Fraction of control characters above which decoded chapter content is
/// treated as ciphertext rather than markup. Heuristic, tuned against
/// Adobe-encrypted samples; failing the whole ingestion (instead of emitting
/// garbled chapters) is the load-bearing policy, not the exact value.
pub const BINARY_RATIO_THRESHOLD: f64 = 0.05;

/// Markers found in `META-INF/encryption.xml` of DRM-protected books.
const DRM_MARKERS: [&str; 4] = [
    "http://www.w3.org/2001/04/xmlenc#",
    "adobe.com/adept",
    "EncryptedData",
    "EncryptionMethod",
];

/// Whether an encryption descriptor declares known DRM schemes.
pub fn is_encrypted(descriptor: &str) -> bool {
    DRM_MARKERS.iter().any(|marker| descriptor.contains(marker))
}

/// Whether decoded chapter content looks like ciphertext: more than
/// [`BINARY_RATIO_THRESHOLD`] of its characters are non-printable controls.
pub fn looks_encrypted(content: &str) -> bool {
    if content.is_empty() {
        return false;
    }
    let mut total = 0usize;
    let mut control = 0usize;
    for c in content.chars() {
        total += 1;
        if is_control_char(c) {
            control += 1;
        }
    }
    control as f64 > total as f64 * BINARY_RATIO_THRESHOLD
}

// Tab, LF, CR stay printable; everything else below U+0020 does not belong
// in markup.
fn is_control_char(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}')
}
