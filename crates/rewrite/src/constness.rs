use crate::error::Result;
use crate::profile::EngineConfig;
use crate::scan::{find_bounded, line_of, LiteralSpans};
use crate::types::{RepairStrategy, ReplaceReason, RewriteLog, RewriteWarning};
use regex::Regex;
use std::ops::Range;

/// Removes constant-qualifiers that now cover context-dependent tokens.
///
/// Every strategy deletes only the qualifier keyword and the spaces or tabs
/// after it, except in declaration position (`static const x =`,
/// `const Type x =`) where the keyword becomes `final`. Brackets and their
/// contents are never touched, and a qualifier whose block never closes is
/// never removed.
#[derive(Debug, Clone)]
pub struct ConstnessRepair {
    qualifier: String,
    declaration_keyword: String,
    prefix: String,
    before: usize,
    after: usize,
    word: Regex,
    adjacent: Regex,
    block: Regex,
    declaration: Regex,
}

/// A qualifier applied to a bracketed block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedBlock {
    /// Qualifier keyword plus trailing horizontal whitespace
    pub qualifier: Range<usize>,
    /// Opening through closing bracket; `None` when the block never closes
    pub body: Option<Range<usize>>,
}

impl ConstnessRepair {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let q = regex::escape(&config.qualifier);
        let prefix = regex::escape(&config.context_prefix);
        let ident = r"[A-Za-z_$][\w$]*";

        let word = Regex::new(&format!(r"\b{q}\b"))?;
        let adjacent = Regex::new(&format!(r"\b{q}\s+{prefix}"))?;
        // qualifier [Ctor[.named]] [<TypeArgs>] opener
        let block = Regex::new(&format!(
            r"\b{q}\b\s*(?:{ident}(?:\s*\.\s*{ident})*\s*)?(?:<[^;{{}}()\[\]]*>\s*)?[\[({{]"
        ))?;
        // qualifier [Type[<Args>][?]] name =
        let declaration = Regex::new(&format!(
            r"^{q}\s+(?:{ident}(?:\s*<[^;=(){{}}]*>)?\??\s+)?{ident}\s*=(?:[^=>]|$)"
        ))?;

        Ok(Self {
            qualifier: config.qualifier.clone(),
            declaration_keyword: config.declaration_keyword.clone(),
            prefix: config.context_prefix.clone(),
            before: config.proximity_before,
            after: config.proximity_after,
            word,
            adjacent,
            block,
            declaration,
        })
    }

    /// True when `text` contains a context-dependent token
    pub fn has_dependent(&self, text: &str) -> bool {
        find_bounded(text, &self.prefix, 0).is_some()
    }

    /// Run all strategies: adjacent, proximity, then block
    pub fn apply(&self, text: &str, log: &mut RewriteLog) -> String {
        if !self.has_dependent(text) {
            return text.to_string();
        }
        let text = self.strip_adjacent(text, log);
        let text = self.strip_by_proximity(&text, log);
        self.strip_by_block(&text, log)
    }

    /// `const context.cs.x` is never valid; drop those qualifiers outright.
    pub fn strip_adjacent(&self, text: &str, log: &mut RewriteLog) -> String {
        let spans = LiteralSpans::scan(text);
        let bytes = text.as_bytes();
        let open = self.open_qualifiers(text);
        let removals: Vec<Range<usize>> = self
            .adjacent
            .find_iter(text)
            .filter(|m| spans.is_code(m.start()) && !open.contains(&m.start()))
            .filter(|m| {
                bytes
                    .get(m.end())
                    .map_or(true, |&b| !crate::scan::is_ident_byte(b))
            })
            .map(|m| self.qualifier_range(text, m.start()))
            .collect();
        self.remove(text, &removals, RepairStrategy::Adjacent, log)
    }

    /// Strip the first qualifier in code on every line that has a dependent
    /// token within `[line - before, line + after]`.
    ///
    /// Can drop qualifiers that were still valid. Qualifiers opening a block
    /// that never closes are skipped.
    pub fn strip_by_proximity(&self, text: &str, log: &mut RewriteLog) -> String {
        let spans = LiteralSpans::scan(text);
        let open = self.open_qualifiers(text);
        let lines: Vec<&str> = text.split('\n').collect();
        let dependent: Vec<bool> = lines.iter().map(|l| self.has_dependent(l)).collect();
        let last = lines.len().saturating_sub(1);

        let mut removals = Vec::new();
        let mut line_start = 0;
        for (i, line) in lines.iter().enumerate() {
            let first = self
                .word
                .find_iter(line)
                .find(|m| spans.is_code(line_start + m.start()));
            if let Some(m) = first.filter(|m| !open.contains(&(line_start + m.start()))) {
                let lo = i.saturating_sub(self.before);
                let hi = (i + self.after).min(last);
                if dependent[lo..=hi].iter().any(|&d| d) {
                    removals.push(self.qualifier_range(text, line_start + m.start()));
                }
            }
            line_start += line.len() + 1;
        }

        self.remove(text, &removals, RepairStrategy::Proximity, log)
    }

    /// Strip qualifiers whose bracket block contains a dependent token.
    ///
    /// Unterminated blocks are left alone; see [`Self::unterminated_blocks`].
    pub fn strip_by_block(&self, text: &str, log: &mut RewriteLog) -> String {
        if !self.has_dependent(text) {
            return text.to_string();
        }

        let removals: Vec<Range<usize>> = self
            .qualified_blocks(text)
            .into_iter()
            .filter(|block| {
                block
                    .body
                    .as_ref()
                    .is_some_and(|body| self.has_dependent(&text[body.clone()]))
            })
            .map(|block| block.qualifier)
            .collect();

        self.remove(text, &removals, RepairStrategy::Block, log)
    }

    /// One warning per qualifier whose bracket never closes, whether or not
    /// the text holds any dependent token.
    pub fn unterminated_blocks(&self, text: &str) -> Vec<RewriteWarning> {
        self.open_qualifiers(text)
            .into_iter()
            .map(|offset| RewriteWarning::UnterminatedBlock {
                offset,
                line: line_of(text, offset),
            })
            .collect()
    }

    fn open_qualifiers(&self, text: &str) -> Vec<usize> {
        self.qualified_blocks(text)
            .into_iter()
            .filter(|block| block.body.is_none())
            .map(|block| block.qualifier.start)
            .collect()
    }

    /// Every qualifier that applies to a bracket block, in text order.
    ///
    /// Qualifiers inside strings or comments are ignored, and so are brackets
    /// inside strings or comments while matching.
    pub fn qualified_blocks(&self, text: &str) -> Vec<QualifiedBlock> {
        let spans = LiteralSpans::scan(text);
        let mut blocks = Vec::new();

        for m in self.block.find_iter(text) {
            if !spans.is_code(m.start()) {
                continue;
            }
            let open_at = m.end() - 1;
            let open = text.as_bytes()[open_at];
            let close = match open {
                b'[' => b']',
                b'(' => b')',
                _ => b'}',
            };

            let mut depth = 0usize;
            let mut body = None;
            for (at, b) in spans.code_bytes(text, open_at, text.len()) {
                if b == open {
                    depth += 1;
                } else if b == close {
                    depth -= 1;
                    if depth == 0 {
                        body = Some(open_at..at + 1);
                        break;
                    }
                }
            }

            blocks.push(QualifiedBlock {
                qualifier: self.qualifier_range(text, m.start()),
                body,
            });
        }

        blocks
    }

    /// Qualifier ranges of the closed blocks that contain `offset`
    pub fn enclosing_qualifiers(&self, text: &str, offset: usize) -> Vec<Range<usize>> {
        self.qualified_blocks(text)
            .into_iter()
            .filter(|block| block.body.as_ref().is_some_and(|b| b.contains(&offset)))
            .map(|block| block.qualifier)
            .collect()
    }

    fn qualifier_range(&self, text: &str, start: usize) -> Range<usize> {
        let mut end = start + self.qualifier.len();
        let bytes = text.as_bytes();
        while end < bytes.len() && matches!(bytes[end], b' ' | b'\t') {
            end += 1;
        }
        start..end
    }

    /// Delete sorted, non-overlapping ranges and record one event each.
    ///
    /// A qualifier that starts a declaration is swapped for the declaration
    /// keyword instead, since the declaration needs a keyword to stay one.
    pub(crate) fn remove(
        &self,
        text: &str,
        removals: &[Range<usize>],
        strategy: RepairStrategy,
        log: &mut RewriteLog,
    ) -> String {
        if removals.is_empty() {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for range in removals {
            if range.start < last {
                continue;
            }
            out.push_str(&text[last..range.start]);
            let replacement = if self.declaration.is_match(&text[range.start..]) {
                let spacing = &text[range.start + self.qualifier.len()..range.end];
                format!("{}{spacing}", self.declaration_keyword)
            } else {
                String::new()
            };
            out.push_str(&replacement);
            log.record(
                range.start,
                &text[range.clone()],
                &replacement,
                ReplaceReason::QualifierStripped { strategy },
            );
            last = range.end;
        }
        out.push_str(&text[last..]);

        log::debug!("{strategy:?} repair removed {} qualifier(s)", removals.len());
        out
    }
}
