//! Terminator-preserving line sequences.
//!
//! A [`LineSequence`] is the only data structure the patcher needs: an ordered
//! list of lines where every line keeps its own trailing terminator (`\n`,
//! `\r\n`, or nothing for an unterminated final line). Joining the lines back
//! together reproduces the input byte-for-byte.

use std::fs;
use std::ops::Index;
use std::path::Path;

/// Ordered lines of a text file, 0-based, terminators included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineSequence {
    lines: Vec<String>,
}

impl LineSequence {
    /// Split `text` after every `\n`. A trailing fragment without a newline
    /// becomes the last line. Empty input yields an empty sequence.
    ///
    /// A lone `\r` is line content, not a terminator.
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.split_inclusive('\n').map(str::to_owned).collect(),
        }
    }

    /// Read a UTF-8 file into a line sequence.
    ///
    /// The file handle is dropped before this returns.
    pub fn read(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.lines
    }

    /// Concatenate all lines back into a single string.
    pub fn join(&self) -> String {
        let mut out = String::with_capacity(self.lines.iter().map(String::len).sum());
        for line in &self.lines {
            out.push_str(line);
        }
        out
    }
}

impl From<Vec<String>> for LineSequence {
    fn from(lines: Vec<String>) -> Self {
        Self { lines }
    }
}

impl Index<usize> for LineSequence {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.lines[index]
    }
}

/// Line content with its terminator removed, for display.
pub fn strip_terminator(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_terminators() {
        let seq = LineSequence::parse("a\nb\r\nc");
        assert_eq!(seq.len(), 3);
        assert_eq!(&seq[0], "a\n");
        assert_eq!(&seq[1], "b\r\n");
        assert_eq!(&seq[2], "c");
    }

    #[test]
    fn test_lone_carriage_return_does_not_end_a_line() {
        let seq = LineSequence::parse("a\rb\nc\n");
        assert_eq!(seq.len(), 2);
        assert_eq!(&seq[0], "a\rb\n");
    }

    #[test]
    fn test_join_reproduces_input() {
        let text = "first\r\n\nthird\n\n";
        assert_eq!(LineSequence::parse(text).join(), text);
    }

    #[test]
    fn test_empty_input() {
        let seq = LineSequence::parse("");
        assert!(seq.is_empty());
        assert_eq!(seq.join(), "");
    }

    #[test]
    fn test_trailing_blank_line_is_its_own_line() {
        let seq = LineSequence::parse("x\n\n");
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.get(1), Some("\n"));
    }

    #[test]
    fn test_strip_terminator() {
        assert_eq!(strip_terminator("abc\r\n"), "abc");
        assert_eq!(strip_terminator("abc\n"), "abc");
        assert_eq!(strip_terminator("abc"), "abc");
        assert_eq!(strip_terminator("\r"), "\r");
    }

    #[test]
    fn test_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, "one\ntwo\n").unwrap();
        let seq = LineSequence::read(&path).unwrap();
        assert_eq!(seq.iter().collect::<Vec<_>>(), vec!["one\n", "two\n"]);
    }
}
