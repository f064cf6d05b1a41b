//! Comma-separated values codec.
//!
//! Writer and reader for the CSV dialect used by exports: `,` separator,
//! `"` quoting with doubled quotes inside, `\n` or `\r\n` line endings.
//! Quoted fields may span lines. A row that cannot be read is reported on
//! its own and parsing resumes at the next line.

use std::iter::Peekable;
use std::str::Chars;

/// Escape a value for CSV output (wrap in quotes if it contains commas,
/// quotes, or line breaks).
#[must_use]
pub fn escape_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Format one CSV line, including the trailing newline.
#[must_use]
pub fn format_row<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// One parsed CSV record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    /// Line on which the record starts (1-indexed).
    pub line: usize,
    /// Unquoted field values.
    pub fields: Vec<String>,
}

/// A record that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRowError {
    /// Line on which the record starts (1-indexed).
    pub line: usize,
    /// What went wrong.
    pub message: String,
}

/// Parse CSV text into records. Blank lines are skipped.
#[must_use]
pub fn parse_rows(text: &str) -> Vec<Result<CsvRow, CsvRowError>> {
    let mut rows = Vec::new();
    let mut chars = text.chars().peekable();
    let mut line = 1;

    while chars.peek().is_some() {
        let start = line;
        match parse_record(&mut chars, &mut line) {
            Ok(fields) if fields.len() == 1 && fields[0].is_empty() => {}
            Ok(fields) => rows.push(Ok(CsvRow {
                line: start,
                fields,
            })),
            Err(message) => rows.push(Err(CsvRowError {
                line: start,
                message,
            })),
        }
    }

    rows
}

fn parse_record(chars: &mut Peekable<Chars<'_>>, line: &mut usize) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;

    loop {
        match chars.next() {
            None => {
                fields.push(field);
                return Ok(fields);
            }
            Some('\n') => {
                *line += 1;
                fields.push(field);
                return Ok(fields);
            }
            Some('\r') => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                *line += 1;
                fields.push(field);
                return Ok(fields);
            }
            Some(',') => {
                fields.push(std::mem::take(&mut field));
                quoted = false;
            }
            Some('"') if field.is_empty() && !quoted => {
                quoted = true;
                read_quoted(chars, line, &mut field)?;

                if !matches!(chars.peek(), None | Some(',' | '\n' | '\r')) {
                    skip_line(chars, line);
                    return Err("unexpected character after closing quote".to_string());
                }
            }
            Some(c) => field.push(c),
        }
    }
}

/// Read the body of a quoted field up to and including its closing quote.
fn read_quoted(
    chars: &mut Peekable<Chars<'_>>,
    line: &mut usize,
    field: &mut String,
) -> Result<(), String> {
    loop {
        match chars.next() {
            None => return Err("unterminated quoted field".to_string()),
            Some('"') => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    return Ok(());
                }
            }
            Some(c) => {
                if c == '\n' {
                    *line += 1;
                }
                field.push(c);
            }
        }
    }
}

fn skip_line(chars: &mut Peekable<Chars<'_>>, line: &mut usize) {
    for c in chars.by_ref() {
        if c == '\n' {
            *line += 1;
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(text: &str) -> Vec<Vec<String>> {
        parse_rows(text)
            .into_iter()
            .map(|r| r.unwrap().fields)
            .collect()
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_format_row() {
        assert_eq!(format_row(&["1", "Ann", "", "x,y"]), "1,Ann,,\"x,y\"\n");
    }

    #[test]
    fn test_parse_simple() {
        let rows = fields("id,name\n1,Ann\n");
        assert_eq!(rows, vec![vec!["id", "name"], vec!["1", "Ann"]]);
    }

    #[test]
    fn test_parse_crlf_and_blank_lines() {
        let rows = fields("a,b\r\n\r\n1,2\r\n");
        assert_eq!(rows, vec![vec!["a", "b"], vec!["1", "2"]]);
    }

    #[test]
    fn test_parse_quoted_fields() {
        let rows = fields("\"Smith, Jr.\",\"say \"\"hi\"\"\",\"\"\n");
        assert_eq!(rows, vec![vec!["Smith, Jr.", "say \"hi\"", ""]]);
    }

    #[test]
    fn test_parse_multiline_field_tracks_lines() {
        let parsed = parse_rows("h\n\"a\nb\"\nlast\n");
        let rows: Vec<_> = parsed.into_iter().map(Result::unwrap).collect();
        assert_eq!(rows[1].fields, vec!["a\nb"]);
        assert_eq!(rows[1].line, 2);
        assert_eq!(rows[2].line, 4);
    }

    #[test]
    fn test_parse_empty_trailing_field() {
        let rows = fields("1,Ann,Lee,\n");
        assert_eq!(rows, vec![vec!["1", "Ann", "Lee", ""]]);
    }

    #[test]
    fn test_garbage_after_quote_is_row_error() {
        let parsed = parse_rows("\"a\"b,c\nok,row\n");
        assert_eq!(parsed.len(), 2);
        let err = parsed[0].clone().unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(parsed[1].clone().unwrap().fields, vec!["ok", "row"]);
    }

    #[test]
    fn test_unterminated_quote_is_row_error() {
        let parsed = parse_rows("ok\n\"never closed\n");
        assert!(parsed[0].is_ok());
        assert!(parsed[1].is_err());
    }

    #[test]
    fn test_written_rows_parse_back() {
        let text = format_row(&["1", "Ann", "O\"Neil, Jr.", ""]);
        assert_eq!(fields(&text), vec![vec!["1", "Ann", "O\"Neil, Jr.", ""]]);
    }
}
