//! Lexical helpers shared by the rewrite stages.
//!
//! Nothing here parses the language. [`LiteralSpans`] only knows enough about
//! string and comment syntax to keep bracket scanning from being fooled by a
//! `]` inside `'...'` or `// ...`.

use std::ops::Range;

/// Identifier characters (`$` is legal in Dart identifiers).
pub(crate) fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Byte ranges of string and comment literals, sorted and non-overlapping.
#[derive(Debug, Clone, Default)]
pub(crate) struct LiteralSpans {
    spans: Vec<Range<usize>>,
}

impl LiteralSpans {
    pub(crate) fn scan(text: &str) -> Self {
        let bytes = text.as_bytes();
        let n = bytes.len();
        let mut spans = Vec::new();
        let mut i = 0;

        while i < n {
            match bytes[i] {
                b'/' if bytes.get(i + 1) == Some(&b'/') => {
                    let end = bytes[i..]
                        .iter()
                        .position(|&b| b == b'\n')
                        .map_or(n, |p| i + p);
                    spans.push(i..end);
                    i = end;
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    let end = skip_block_comment(bytes, i);
                    spans.push(i..end);
                    i = end;
                }
                quote @ (b'\'' | b'"') => {
                    let raw = i > 0
                        && bytes[i - 1] == b'r'
                        && (i < 2 || !is_ident_byte(bytes[i - 2]));
                    let start = if raw { i - 1 } else { i };
                    let end = skip_string(bytes, i, quote, raw);
                    spans.push(start..end);
                    i = end;
                }
                _ => i += 1,
            }
        }

        Self { spans }
    }

    /// True when `offset` is not inside a string or comment.
    pub(crate) fn is_code(&self, offset: usize) -> bool {
        let idx = self.spans.partition_point(|s| s.end <= offset);
        self.spans
            .get(idx)
            .map_or(true, |span| span.start > offset)
    }

    /// Iterate code bytes of `text[start..end]`, skipping literals.
    pub(crate) fn code_bytes<'a>(&'a self, text: &'a str, start: usize, end: usize) -> CodeBytes<'a> {
        CodeBytes {
            bytes: text.as_bytes(),
            spans: &self.spans,
            next_span: self.spans.partition_point(|s| s.end <= start),
            pos: start,
            end: end.min(text.len()),
        }
    }
}

/// Iterator over `(offset, byte)` pairs outside string and comment literals.
pub(crate) struct CodeBytes<'a> {
    bytes: &'a [u8],
    spans: &'a [Range<usize>],
    next_span: usize,
    pos: usize,
    end: usize,
}

impl Iterator for CodeBytes<'_> {
    type Item = (usize, u8);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.pos >= self.end {
                return None;
            }
            if let Some(span) = self.spans.get(self.next_span) {
                if span.start <= self.pos {
                    self.pos = self.pos.max(span.end);
                    self.next_span += 1;
                    continue;
                }
            }
            let at = self.pos;
            self.pos += 1;
            return Some((at, self.bytes[at]));
        }
    }
}

fn skip_block_comment(bytes: &[u8], start: usize) -> usize {
    // Dart block comments nest.
    let n = bytes.len();
    let mut depth = 1usize;
    let mut j = start + 2;
    while j < n && depth > 0 {
        if bytes[j] == b'/' && bytes.get(j + 1) == Some(&b'*') {
            depth += 1;
            j += 2;
        } else if bytes[j] == b'*' && bytes.get(j + 1) == Some(&b'/') {
            depth -= 1;
            j += 2;
        } else {
            j += 1;
        }
    }
    j.min(n)
}

fn skip_string(bytes: &[u8], start: usize, quote: u8, raw: bool) -> usize {
    let n = bytes.len();
    let triple = bytes.get(start + 1) == Some(&quote) && bytes.get(start + 2) == Some(&quote);

    if triple {
        let mut j = start + 3;
        while j < n {
            if !raw && bytes[j] == b'\\' {
                j += 2;
                continue;
            }
            if bytes[j] == quote
                && bytes.get(j + 1) == Some(&quote)
                && bytes.get(j + 2) == Some(&quote)
            {
                return j + 3;
            }
            j += 1;
        }
        return n;
    }

    let mut j = start + 1;
    while j < n {
        match bytes[j] {
            b'\\' if !raw => j += 2,
            b if b == quote => return j + 1,
            // An unterminated single-line string stops at the line end.
            b'\n' => return j,
            _ => j += 1,
        }
    }
    n
}

/// Find `needle` at or after `from` where it is not glued to identifier
/// characters on either side.
pub(crate) fn find_bounded(text: &str, needle: &str, from: usize) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    let bytes = text.as_bytes();
    let mut cursor = from;
    while cursor <= text.len() {
        let idx = cursor + text.get(cursor..)?.find(needle)?;
        let end = idx + needle.len();
        let left_ok = idx == 0 || !is_ident_byte(bytes[idx - 1]);
        let right_ok = end >= bytes.len() || !is_ident_byte(bytes[end]);
        if left_ok && right_ok {
            return Some(idx);
        }
        cursor = idx + 1;
        while cursor < text.len() && !text.is_char_boundary(cursor) {
            cursor += 1;
        }
    }
    None
}

/// 1-based line number of a byte offset.
pub(crate) fn line_of(text: &str, offset: usize) -> usize {
    text.as_bytes()[..offset.min(text.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

/// Per-kind `open - close` counts for `()`, `[]`, `{}`.
pub(crate) fn delimiter_balance(text: &str) -> [i64; 3] {
    let mut balance = [0i64; 3];
    for b in text.bytes() {
        match b {
            b'(' => balance[0] += 1,
            b')' => balance[0] -= 1,
            b'[' => balance[1] += 1,
            b']' => balance[1] -= 1,
            b'{' => balance[2] += 1,
            b'}' => balance[2] -= 1,
            _ => {}
        }
    }
    balance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal_texts(text: &str) -> Vec<&str> {
        LiteralSpans::scan(text)
            .spans
            .iter()
            .map(|s| &text[s.clone()])
            .collect()
    }

    #[test]
    fn recognizes_strings_and_comments() {
        let text = "a('x]', \"y[\") // ]]\n/* [ /* nested ] */ ( */ b";
        assert_eq!(
            literal_texts(text),
            vec!["'x]'", "\"y[\"", "// ]]", "/* [ /* nested ] */ ( */"]
        );
    }

    #[test]
    fn handles_escapes_raw_and_triple_quotes() {
        let text = r#"'it\'s' r'\' '''a ' b''' x"#;
        assert_eq!(literal_texts(text), vec![r"'it\'s'", r"r'\'", "'''a ' b'''"]);
    }

    #[test]
    fn unterminated_single_line_string_stops_at_newline() {
        let text = "'open [\n]";
        assert_eq!(literal_texts(text), vec!["'open ["]);
        let spans = LiteralSpans::scan(text);
        assert!(spans.is_code(text.len() - 1));
    }

    #[test]
    fn code_bytes_skip_literals() {
        let text = "[ '[' ]";
        let spans = LiteralSpans::scan(text);
        let code: String = spans
            .code_bytes(text, 0, text.len())
            .map(|(_, b)| b as char)
            .collect();
        assert_eq!(code, "[  ]");
    }

    #[test]
    fn find_bounded_respects_identifier_edges() {
        let text = "context.cs.surfaceContainerHighest, context.cs.surface";
        assert_eq!(find_bounded(text, "context.cs.surface", 0), Some(36));
        assert_eq!(find_bounded("mycontext.cs.x", "context.cs", 0), None);
    }

    #[test]
    fn line_numbers_are_one_based() {
        assert_eq!(line_of("a\nb\nc", 0), 1);
        assert_eq!(line_of("a\nb\nc", 4), 3);
    }
}
