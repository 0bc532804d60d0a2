//! JSON error diagnostics pointing at the offending catalog line

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// JSON syntax error with source location
#[derive(Debug, Error, Diagnostic)]
#[error("JSON syntax error in {filename}: {message}")]
#[diagnostic(code(rigcheck::json::syntax))]
pub struct JsonSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    filename: String,

    line: usize,

    /// The underlying error message
    message: String,
}

impl JsonSyntaxError {
    /// Create a syntax error from a serde_json error
    pub fn from_serde_error(err: &serde_json::Error, source: &str, filename: &str) -> Self {
        let line = err.line().max(1);
        let column = err.column().max(1);

        let offset = line_col_to_offset(source, line, column).min(source.len());
        let message = err.to_string();
        let help = generate_help(&message);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1).min(source.len().max(1))),
            help,
            filename: filename.to_string(),
            line,
            message,
        }
    }

    /// 1-based line of the error
    pub fn line(&self) -> usize {
        self.line
    }
}

/// Convert a 1-based line and byte column (as serde_json reports them) to a byte offset
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut line_start = 0;
    for (index, current) in source.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            let mut within = column.saturating_sub(1).min(current.len());
            while !current.is_char_boundary(within) {
                within -= 1;
            }
            return line_start + within;
        }
        line_start += current.len();
    }
    source.len()
}

/// Generate helpful suggestions based on error message
fn generate_help(message: &str) -> Option<String> {
    let msg_lower = message.to_lowercase();

    if msg_lower.contains("trailing comma") {
        return Some("JSON does not allow a comma after the last item of a list or object.".to_string());
    }

    if msg_lower.contains("expected `,` or `]`") || msg_lower.contains("expected `,` or `}`") {
        return Some("Add commas between items: [{...}, {...}]".to_string());
    }

    if msg_lower.contains("key must be a string") {
        return Some("Object keys must be double-quoted: {\"model\": \"...\"}".to_string());
    }

    if msg_lower.contains("eof while parsing") {
        return Some("The file ends early - check for an unclosed [ or {.".to_string());
    }

    if msg_lower.contains("expected value") {
        return Some("Strings must use double quotes, and values cannot be empty.".to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_to_offset() {
        let source = "line1\nline2\nline3";
        assert_eq!(line_col_to_offset(source, 1, 1), 0);
        assert_eq!(line_col_to_offset(source, 2, 1), 6);
        assert_eq!(line_col_to_offset(source, 3, 3), 14);
        assert_eq!(line_col_to_offset(source, 9, 1), source.len());
    }

    #[test]
    fn test_line_col_counts_bytes() {
        let source = "{\"a\": 1}\n[{\"model\": \"라이젠 5600\", \"socket\": }]";
        let offset = line_col_to_offset(source, 2, 40);
        assert_eq!(&source[offset..offset + 1], "}");

        // A column inside a multibyte character snaps back to its start
        assert_eq!(line_col_to_offset("가나", 1, 2), 0);
        assert_eq!(line_col_to_offset("가나", 1, 4), 3);
        assert_eq!(line_col_to_offset("가나", 1, 99), "가나".len());
    }

    #[test]
    fn test_from_serde_error_spans_multibyte_line() {
        let source = r#"[{"model": "라이젠 5600", "socket": }]"#;
        let err = serde_json::from_str::<serde_json::Value>(source).unwrap_err();
        let diagnostic = JsonSyntaxError::from_serde_error(&err, source, "cpu.json");
        assert_eq!(diagnostic.span.offset(), source.find('}').unwrap());
        assert_eq!(diagnostic.span.len(), 1);
    }

    #[test]
    fn test_from_serde_error_locates_line() {
        let source = "[\n  {\"model\": \"A\"},\n  {\"model\": \"B\",}\n]";
        let err = serde_json::from_str::<serde_json::Value>(source).unwrap_err();
        let diagnostic = JsonSyntaxError::from_serde_error(&err, source, "cpu.json");
        assert_eq!(diagnostic.line(), 3);
        assert!(diagnostic.to_string().contains("cpu.json"));
    }

    #[test]
    fn test_help_generation() {
        assert!(generate_help("trailing comma at line 3 column 17").is_some());
        assert!(generate_help("EOF while parsing a list at line 4 column 0").is_some());
        assert!(generate_help("key must be a string at line 1 column 3").is_some());
        assert!(generate_help("some random error").is_none());
    }
}
