//! Interactive record collection.
//!
//! Prompts line by line for users and writes them as a JSON array that
//! `userbook import --format json` accepts. Input is validated as it is
//! typed: a blank name or a bad age repeats the prompt.
//!
//! End of input in the middle of a record drops that record and ends the
//! session; everything completed before it is kept.

use std::io::{BufRead, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::error::Result;
use crate::sync::{UserRecord, atomic_write};
use crate::validate::{is_stop_answer, parse_age, require_name};

/// Line-oriented collector over any reader/writer pair.
pub struct Collector<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Collector<R, W> {
    /// Create a collector reading answers from `input` and writing prompts
    /// to `output`.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prompt for users until a stop answer or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading or writing the streams fails.
    pub fn collect(&mut self) -> Result<Vec<UserRecord>> {
        let mut records = Vec::new();

        loop {
            let Some(record) = self.read_record()? else {
                debug!("input ended mid-record");
                break;
            };
            records.push(record);

            match self.prompt("Add another user? [y/N]: ")? {
                Some(answer) if !is_stop_answer(&answer) => {}
                _ => break,
            }
        }

        info!(records = records.len(), "collection finished");
        Ok(records)
    }

    /// Collect users and write them to `path` as a pretty-printed JSON array.
    ///
    /// Returns the number of records written.
    ///
    /// # Errors
    ///
    /// Returns an error if the streams fail or the file cannot be written.
    pub fn collect_to_file(&mut self, path: &Path) -> Result<usize> {
        let records = self.collect()?;
        let mut content = serde_json::to_string_pretty(&records)?;
        content.push('\n');
        atomic_write(path, &content)?;
        info!(path = %path.display(), records = records.len(), "collected users written");
        Ok(records.len())
    }

    /// Read one complete record, or `None` if input ends first.
    fn read_record(&mut self) -> Result<Option<UserRecord>> {
        let Some(name) = self.prompt_name("First name: ", "name")? else {
            return Ok(None);
        };
        let Some(last_name) = self.prompt_name("Last name: ", "last_name")? else {
            return Ok(None);
        };
        let Some(age) = self.prompt_age()? else {
            return Ok(None);
        };

        Ok(Some(UserRecord {
            id: None,
            name,
            last_name,
            age,
            created_at: None,
        }))
    }

    fn prompt_name(&mut self, label: &str, field: &'static str) -> Result<Option<String>> {
        loop {
            let Some(raw) = self.prompt(label)? else {
                return Ok(None);
            };
            match require_name(field, &raw) {
                Ok(name) => return Ok(Some(name)),
                Err(e) => writeln!(self.output, "{e}")?,
            }
        }
    }

    /// Outer `None` is end of input; inner `None` is "no age".
    fn prompt_age(&mut self) -> Result<Option<Option<i64>>> {
        loop {
            let Some(raw) = self.prompt("Age (blank to skip): ")? else {
                return Ok(None);
            };
            match parse_age(&raw) {
                Ok(age) => return Ok(Some(age)),
                Err(e) => writeln!(self.output, "{e}")?,
            }
        }
    }

    /// Write a prompt and read one line, without its line ending.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn collect(input: &str) -> (Vec<UserRecord>, String) {
        let mut output = Vec::new();
        let records = Collector::new(Cursor::new(input), &mut output)
            .collect()
            .unwrap();
        (records, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_collect_single_record() {
        let (records, _) = collect("Alex\nSmith\n29\nn\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Alex");
        assert_eq!(records[0].last_name, "Smith");
        assert_eq!(records[0].age, Some(29));
    }

    #[test]
    fn test_collect_multiple_until_blank_answer() {
        let (records, _) = collect("Alex\nSmith\n\ny\nAnn\nLee\n40\n\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].age, None);
        assert_eq!(records[1].last_name, "Lee");
    }

    #[test]
    fn test_stop_answers_are_case_insensitive() {
        let (records, _) = collect("Alex\nSmith\n1\nSTOP\nAnn\nLee\n2\n");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_bad_input_repeats_prompt() {
        let (records, output) = collect("   \nAlex\n\nSmith\nold\n-3\n29\nq\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].age, Some(29));
        assert_eq!(output.matches("First name: ").count(), 2);
        assert_eq!(output.matches("Last name: ").count(), 2);
        assert_eq!(output.matches("Age (blank to skip): ").count(), 3);
    }

    #[test]
    fn test_eof_mid_record_keeps_completed() {
        let (records, _) = collect("Alex\nSmith\n29\ny\nAnn\n");
        assert_eq!(records.len(), 1);

        let (records, _) = collect("");
        assert!(records.is_empty());
    }

    #[test]
    fn test_collect_to_file_is_importable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("collected.json");
        let mut output = Vec::new();

        let written = Collector::new(Cursor::new("Алексей\nЛогвинов\n29\n"), &mut output)
            .collect_to_file(&path)
            .unwrap();
        assert_eq!(written, 1);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"name\": \"Алексей\""));
        assert!(!text.contains("\"id\""));
        assert!(!text.contains("created_at"));

        let parsed: Vec<UserRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0].age, Some(29));
    }
}
