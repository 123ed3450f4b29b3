use lazy_static::lazy_static;
use regex::Regex;

/// Longest sanitized filename kept in a generated blob name
const MAX_SANITIZED_FILENAME_LEN: usize = 100;

lazy_static! {
    /// Characters that may not appear in a stored blob name
    /// - Kept: ASCII letters, digits, '.', '_' and '-'
    /// - Replaced with '_': whitespace, path separators, quotes, non-ASCII, etc.
    pub static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9._-]").unwrap();
}

/// Reduce a client-supplied filename to something safe to embed in a blob name.
///
/// Only the final path component is kept, unsafe characters become `_`, and
/// leading dots are stripped so the result can never be `..` or a dotfile.
pub fn sanitize_filename(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or(original);
    let replaced = UNSAFE_FILENAME_CHARS.replace_all(base, "_");
    let trimmed = replaced.trim_start_matches('.');

    let mut sanitized: String = trimmed.chars().take(MAX_SANITIZED_FILENAME_LEN).collect();
    if sanitized.is_empty() {
        sanitized = "upload".to_string();
    }
    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_safe_names() {
        assert_eq!(sanitize_filename("sales-2024_Q1.xlsx"), "sales-2024_Q1.xlsx");
        assert_eq!(sanitize_filename("data.csv"), "data.csv");
    }

    #[test]
    fn test_sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_filename("my file.xlsx"), "my_file.xlsx");
        assert_eq!(sanitize_filename("ventas año.xlsx"), "ventas_a_o.xlsx");
        assert_eq!(sanitize_filename("a\"b'c.xls"), "a_b_c.xls");
    }

    #[test]
    fn test_sanitize_strips_directories_and_dots() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\book.xlsx"), "book.xlsx");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename(".."), "upload");
        assert_eq!(sanitize_filename(""), "upload");
    }

    #[test]
    fn test_sanitize_truncates_long_names() {
        let long = "x".repeat(300);
        assert_eq!(sanitize_filename(&long).len(), MAX_SANITIZED_FILENAME_LEN);
    }
}
