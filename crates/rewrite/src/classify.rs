//! Context availability for a text position.
//!
//! Two modes:
//!
//! - [`ClassifierMode::Window`] looks for a context marker in the bytes just
//!   before the position. Signatures further back than the window are missed,
//!   and an outer signature can vouch for a nested context-free scope.
//! - [`ClassifierMode::ScopeStack`] walks the text up to the position and
//!   keeps a stack of enclosing constructs. A callable whose parameter list
//!   names a marker makes the context available to everything it encloses;
//!   a type body is a barrier, since members do not capture locals.

use crate::profile::{ClassifierMode, EngineConfig};
use crate::scan::{is_ident_byte, LiteralSpans};
use crate::types::ScopeContext;

/// Keywords whose `(...) {` opens a plain block, not a callable
const CONTROL_KEYWORDS: &[&str] = &["if", "for", "while", "switch", "catch", "synchronized"];

/// Keywords that open a type body
const TYPE_KEYWORDS: &[&str] = &["class", "mixin", "extension", "enum"];

/// Body modifiers allowed between `)` and `{` / `=>`
const BODY_MODIFIERS: &[&str] = &["async", "sync"];

#[derive(Debug, Clone)]
pub struct ContextClassifier {
    mode: ClassifierMode,
    markers: Vec<String>,
    lookback: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    /// Class-like body
    Type,
    /// `(...) { }` body
    Callable { declares_context: bool },
    /// `(...) => expr` body, closed by `;`, `,` or an enclosing closer
    Arrow { declares_context: bool },
    /// Any other bracket pair
    Block,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    kind: FrameKind,
    open: usize,
    /// Closing byte; `0` for arrow bodies
    closer: u8,
}

impl ContextClassifier {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            mode: config.classifier,
            markers: config.context_markers.clone(),
            lookback: config.lookback_window,
        }
    }

    #[must_use]
    pub fn mode(&self) -> ClassifierMode {
        self.mode
    }

    /// Classify the position `offset` of `text`
    pub fn classify(&self, text: &str, offset: usize) -> ScopeContext {
        let offset = floor_char_boundary(text, offset.min(text.len()));
        let available = match self.mode {
            ClassifierMode::Window => self.window_has_marker(text, offset),
            ClassifierMode::ScopeStack => self.stack_has_context(text, offset),
        };
        if available {
            ScopeContext::Available
        } else {
            ScopeContext::Unavailable
        }
    }

    fn window_has_marker(&self, text: &str, offset: usize) -> bool {
        let mut start = offset.saturating_sub(self.lookback);
        while !text.is_char_boundary(start) {
            start += 1;
        }
        let window = &text[start..offset];
        self.markers.iter().any(|m| window.contains(m.as_str()))
    }

    fn declares_context(&self, params: &str) -> bool {
        self.markers.iter().any(|m| params.contains(m.as_str()))
    }

    fn stack_has_context(&self, text: &str, offset: usize) -> bool {
        let prefix = &text[..offset];
        let bytes = prefix.as_bytes();
        let spans = LiteralSpans::scan(prefix);
        let mut stack: Vec<Frame> = Vec::new();
        // Parameter list candidate: (open, close) of the last `(...)` closed.
        let mut last_paren: Option<(usize, usize)> = None;

        for (at, b) in spans.code_bytes(prefix, 0, offset) {
            match b {
                b'(' | b'[' => stack.push(Frame {
                    kind: FrameKind::Block,
                    open: at,
                    closer: if b == b'(' { b')' } else { b']' },
                }),
                b'{' => {
                    let kind = self.brace_kind(prefix, at, last_paren);
                    stack.push(Frame {
                        kind,
                        open: at,
                        closer: b'}',
                    });
                }
                b')' | b']' | b'}' => {
                    pop_arrows(&mut stack);
                    if let Some(pos) = stack.iter().rposition(|f| f.closer == b) {
                        let frame = stack[pos];
                        stack.truncate(pos);
                        if b == b')' {
                            last_paren = Some((frame.open, at));
                        }
                    }
                }
                b'=' if bytes.get(at + 1) == Some(&b'>') => {
                    if let Some((open, close)) = callable_params(prefix, at, last_paren) {
                        stack.push(Frame {
                            kind: FrameKind::Arrow {
                                declares_context: self.declares_context(&prefix[open + 1..close]),
                            },
                            open: at,
                            closer: 0,
                        });
                    }
                }
                b';' | b',' => pop_arrows(&mut stack),
                _ => {}
            }
        }

        for frame in stack.iter().rev() {
            match frame.kind {
                FrameKind::Type => return false,
                FrameKind::Callable {
                    declares_context: true,
                }
                | FrameKind::Arrow {
                    declares_context: true,
                } => return true,
                _ => {}
            }
        }
        false
    }

    fn brace_kind(&self, text: &str, brace: usize, last_paren: Option<(usize, usize)>) -> FrameKind {
        if let Some((open, close)) = callable_params(text, brace, last_paren) {
            let name = identifier_before(text, open);
            if CONTROL_KEYWORDS.contains(&name) {
                return FrameKind::Block;
            }
            return FrameKind::Callable {
                declares_context: self.declares_context(&text[open + 1..close]),
            };
        }

        if header_words(text, brace).any(|w| TYPE_KEYWORDS.contains(&w)) {
            return FrameKind::Type;
        }

        FrameKind::Block
    }
}

fn pop_arrows(stack: &mut Vec<Frame>) {
    while matches!(
        stack.last(),
        Some(Frame {
            kind: FrameKind::Arrow { .. },
            ..
        })
    ) {
        stack.pop();
    }
}

/// Parameter list directly in front of a body opener at `at`, if any.
fn callable_params(text: &str, at: usize, last_paren: Option<(usize, usize)>) -> Option<(usize, usize)> {
    let (open, close) = last_paren?;
    let head = strip_body_modifiers(&text[..at]);
    (head.len() == close + 1 && head.ends_with(')')).then_some((open, close))
}

fn strip_body_modifiers(mut head: &str) -> &str {
    loop {
        head = head.trim_end();
        if let Some(rest) = head.strip_suffix('*') {
            head = rest;
            continue;
        }
        let Some(word) = BODY_MODIFIERS.iter().find(|m| ends_with_word(head, m)) else {
            return head;
        };
        head = &head[..head.len() - word.len()];
    }
}

fn ends_with_word(text: &str, word: &str) -> bool {
    text.ends_with(word)
        && text.as_bytes()[..text.len() - word.len()]
            .last()
            .map_or(true, |&b| !is_ident_byte(b))
}

fn identifier_before(text: &str, at: usize) -> &str {
    let head = text[..at].trim_end();
    let start = head
        .bytes()
        .rposition(|b| !is_ident_byte(b))
        .map_or(0, |p| p + 1);
    &head[start..]
}

/// Words of the declaration header that ends at `brace`
fn header_words(text: &str, brace: usize) -> impl Iterator<Item = &str> {
    let head = &text[..brace];
    let start = head
        .bytes()
        .rposition(|b| matches!(b, b';' | b'{' | b'}'))
        .map_or(0, |p| p + 1);
    head[start..]
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
        .filter(|w| !w.is_empty())
}

fn floor_char_boundary(text: &str, mut offset: usize) -> usize {
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
