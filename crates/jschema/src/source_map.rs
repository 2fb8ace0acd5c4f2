//! Line/column lookup for values of a JSON text
//!
//! `serde_json::Value` carries no positions, so a [`SourceMap`] scans the
//! original text once and records where every value starts, keyed by its
//! JSON pointer. Offsets are converted to 1-based line and column (columns
//! count characters) through a line-break index searched with binary search.

use crate::error::SourceLocation;
use std::collections::HashMap;

/// Index from JSON pointer to the position of the value it names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceMap {
    text: String,
    /// Byte offsets of each newline character in the text
    line_breaks: Vec<usize>,
    /// Byte offset of each value, keyed by RFC 6901 pointer ("" for the root)
    offsets: HashMap<String, usize>,
}

impl SourceMap {
    /// Scan `text` and index every value it contains.
    ///
    /// Malformed text yields the values found before the first syntax error.
    pub fn new(text: &str) -> Self {
        let line_breaks = text
            .char_indices()
            .filter_map(|(idx, ch)| (ch == '\n').then_some(idx))
            .collect();

        let mut scanner = Scanner {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            offsets: HashMap::new(),
        };
        // A syntax error only truncates the index
        let _ = scanner.value(String::new());

        SourceMap {
            text: text.to_string(),
            line_breaks,
            offsets: scanner.offsets,
        }
    }

    /// Position of the value named by `pointer`.
    ///
    /// Accepts both the plain form (`/a/0`) and the fragment form (`#/a/0`).
    pub fn locate(&self, pointer: &str) -> Option<SourceLocation> {
        let pointer = pointer.strip_prefix('#').unwrap_or(pointer);
        let offset = *self.offsets.get(pointer)?;
        self.offset_to_location(offset)
    }

    /// Convert a byte offset to a 1-based line and column
    pub fn offset_to_location(&self, offset: usize) -> Option<SourceLocation> {
        if offset > self.text.len() {
            return None;
        }
        let row = match self.line_breaks.binary_search(&offset) {
            Ok(idx) | Err(idx) => idx,
        };
        let line_start = if row == 0 {
            0
        } else {
            self.line_breaks[row - 1] + 1
        };
        let column = self.text.get(line_start..offset)?.chars().count();
        Some(SourceLocation {
            line: row + 1,
            column: column + 1,
        })
    }

    /// Number of values indexed
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

struct Scanner<'t> {
    text: &'t str,
    bytes: &'t [u8],
    pos: usize,
    offsets: HashMap<String, usize>,
}

impl<'t> Scanner<'t> {
    fn value(&mut self, pointer: String) -> Option<()> {
        self.skip_whitespace();
        let first = self.peek()?;
        self.offsets.insert(pointer.clone(), self.pos);
        match first {
            b'{' => self.object(&pointer),
            b'[' => self.array(&pointer),
            b'"' => self.string().map(|_| ()),
            _ => {
                while let Some(b) = self.peek() {
                    if matches!(b, b',' | b']' | b'}') || b.is_ascii_whitespace() {
                        break;
                    }
                    self.pos += 1;
                }
                Some(())
            }
        }
    }

    fn object(&mut self, pointer: &str) -> Option<()> {
        self.pos += 1;
        self.skip_whitespace();
        if self.peek()? == b'}' {
            self.pos += 1;
            return Some(());
        }
        loop {
            self.skip_whitespace();
            if self.peek()? != b'"' {
                return None;
            }
            let raw = self.string()?;
            let key: String = serde_json::from_str(raw).ok()?;
            self.skip_whitespace();
            if self.peek()? != b':' {
                return None;
            }
            self.pos += 1;
            self.value(format!("{}/{}", pointer, escape(&key)))?;
            self.skip_whitespace();
            match self.peek()? {
                b',' => self.pos += 1,
                b'}' => {
                    self.pos += 1;
                    return Some(());
                }
                _ => return None,
            }
        }
    }

    fn array(&mut self, pointer: &str) -> Option<()> {
        self.pos += 1;
        self.skip_whitespace();
        if self.peek()? == b']' {
            self.pos += 1;
            return Some(());
        }
        let mut index = 0usize;
        loop {
            self.value(format!("{}/{}", pointer, index))?;
            index += 1;
            self.skip_whitespace();
            match self.peek()? {
                b',' => self.pos += 1,
                b']' => {
                    self.pos += 1;
                    return Some(());
                }
                _ => return None,
            }
        }
    }

    /// Skip a string literal, returning its raw text including the quotes
    fn string(&mut self) -> Option<&'t str> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek()? {
                b'\\' => self.pos += 2,
                b'"' => {
                    self.pos += 1;
                    return self.text.get(start..self.pos);
                }
                _ => self.pos += 1,
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }
}

fn escape(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==== Offset conversion tests ====

    #[test]
    fn test_offset_to_location() {
        let map = SourceMap::new("{\n  \"a\": 1\n}");
        assert_eq!(
            map.offset_to_location(0),
            Some(SourceLocation { line: 1, column: 1 })
        );
        assert_eq!(
            map.offset_to_location(4),
            Some(SourceLocation { line: 2, column: 3 })
        );
        assert_eq!(map.offset_to_location(100), None);
    }

    #[test]
    fn test_columns_count_characters() {
        let map = SourceMap::new("{\"é\": \"ü\", \"b\": 2}");
        assert_eq!(map.locate("/b"), Some(SourceLocation { line: 1, column: 17 }));
    }

    // ==== Pointer index tests ====

    #[test]
    fn test_locate_nested_values() {
        let text = r#"{
  "type": "object",
  "properties": {
    "a/b": {"type": "string"},
    "list": [1, {"x": null}]
  }
}"#;
        let map = SourceMap::new(text);
        assert_eq!(map.locate(""), Some(SourceLocation { line: 1, column: 1 }));
        assert_eq!(map.locate("#/type"), Some(SourceLocation { line: 2, column: 11 }));
        assert_eq!(
            map.locate("/properties/a~1b"),
            Some(SourceLocation { line: 4, column: 12 })
        );
        assert_eq!(
            map.locate("/properties/list/1/x"),
            Some(SourceLocation { line: 5, column: 23 })
        );
        assert_eq!(map.locate("/missing"), None);
    }

    #[test]
    fn test_escaped_keys_are_decoded() {
        let map = SourceMap::new(r#"{"a\"b": true, "A": false}"#);
        assert!(map.locate("/a\"b").is_some());
        assert!(map.locate("/A").is_some());
    }

    #[test]
    fn test_malformed_text_gives_partial_map() {
        let map = SourceMap::new(r#"{"a": 1, "b": [1, 2"#);
        assert!(map.locate("/a").is_some());
        assert!(map.locate("/b/1").is_some());
        assert!(!map.is_empty());

        assert!(SourceMap::new("").is_empty());
    }
}
