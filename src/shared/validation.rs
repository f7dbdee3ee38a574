use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Longest filename kept, in bytes
const MAX_FILENAME_BYTES: usize = 255;

/// Name used when nothing usable survives sanitization
const FALLBACK_FILENAME: &str = "file";

lazy_static! {
    /// Characters that are illegal in filenames on common filesystems
    static ref ILLEGAL_CHARS_REGEX: Regex = Regex::new(r#"[/?<>\\:*|"]"#).unwrap();

    /// C0 and C1 control characters
    static ref CONTROL_CHARS_REGEX: Regex = Regex::new(r"[\x00-\x1f\x80-\x9f]").unwrap();

    /// Names made only of dots ("." and "..")
    static ref RESERVED_NAME_REGEX: Regex = Regex::new(r"^\.+$").unwrap();

    /// Windows device names, with or without extension
    /// - Matches: "con", "NUL.txt", "com1", "LPT9.log"
    /// - No match: "console.txt", "prnt.png"
    static ref WINDOWS_RESERVED_REGEX: Regex =
        Regex::new(r"(?i)^(con|prn|aux|nul|com[0-9]|lpt[0-9])(\..*)?$").unwrap();

    /// Trailing dots and spaces, which Windows silently drops
    static ref TRAILING_DOTS_REGEX: Regex = Regex::new(r"[. ]+$").unwrap();
}

/// Make a user-supplied filename safe to embed in a storage key.
///
/// Directory components are discarded, so `../../etc/passwd` becomes `passwd`.
/// The result is never empty and never longer than 255 bytes.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(&['/', '\\'][..]).next().unwrap_or(raw);

    let cleaned = ILLEGAL_CHARS_REGEX.replace_all(base, "");
    let cleaned = CONTROL_CHARS_REGEX.replace_all(&cleaned, "");
    let cleaned = TRAILING_DOTS_REGEX.replace_all(&cleaned, "");
    let cleaned = cleaned.trim();

    if cleaned.is_empty()
        || RESERVED_NAME_REGEX.is_match(cleaned)
        || WINDOWS_RESERVED_REGEX.is_match(cleaned)
    {
        return FALLBACK_FILENAME.to_string();
    }

    truncate_to_bytes(cleaned, MAX_FILENAME_BYTES).to_string()
}

fn truncate_to_bytes(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

/// Validator for required free-text fields; whitespace-only counts as empty
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_ordinary_names() {
        assert_eq!(sanitize_filename("evidence.jpg"), "evidence.jpg");
        assert_eq!(sanitize_filename("street camera 01.mp4"), "street camera 01.mp4");
    }

    #[test]
    fn test_sanitize_strips_path_traversal() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename(r"C:\Users\me\photo.png"), "photo.png");
        assert_eq!(sanitize_filename("uploads/"), "file");
    }

    #[test]
    fn test_sanitize_removes_unsafe_characters() {
        assert_eq!(sanitize_filename("a<b>c:d*e?f|g\"h.txt"), "abcdefgh.txt");
        assert_eq!(sanitize_filename("bad\u{0000}name\u{001f}.pdf"), "badname.pdf");
        assert_eq!(sanitize_filename("report.pdf. . "), "report.pdf");
    }

    #[test]
    fn test_sanitize_rejects_reserved_names() {
        assert_eq!(sanitize_filename(".."), "file");
        assert_eq!(sanitize_filename("CON"), "file");
        assert_eq!(sanitize_filename("lpt1.txt"), "file");
        assert_eq!(sanitize_filename("console.txt"), "console.txt");
        assert_eq!(sanitize_filename(""), "file");
    }

    #[test]
    fn test_sanitize_truncates_on_char_boundary() {
        let long = "é".repeat(200);
        let result = sanitize_filename(&long);
        assert!(result.len() <= MAX_FILENAME_BYTES);
        assert!(result.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("Theft").is_ok());
        assert!(not_blank("").is_err());
        assert!(not_blank("   \t").is_err());
    }
}
