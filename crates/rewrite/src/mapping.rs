use crate::error::Result;
use crate::profile::SemanticMapping;
use crate::scan::is_ident_byte;
use crate::types::{Category, ReplaceReason, RewriteLog};
use regex::Regex;

/// Literal -> semantic token substitution.
///
/// Rules come from a table whose literals are pairwise disjoint (checked by
/// [`crate::Profile::validate`]), so the order rules run in never changes the
/// output.
#[derive(Debug, Clone)]
pub struct LiteralMapper {
    rules: Vec<CompiledRule>,
}

#[derive(Debug, Clone)]
enum CompiledRule {
    /// Plain substring; skipped when glued to a preceding identifier
    Exact {
        pattern: String,
        token: String,
        category: Category,
        guard_left: bool,
    },
    /// Literal only as the value of one of a few keys
    KeyScoped {
        pattern: String,
        regex: Regex,
        token: String,
        category: Category,
    },
}

/// Output of [`LiteralMapper::apply`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapResult {
    pub text: String,
    pub replacements: usize,
}

impl LiteralMapper {
    pub fn new(mappings: &[SemanticMapping]) -> Result<Self> {
        let mut rules = Vec::with_capacity(mappings.len());
        for mapping in mappings {
            let rule = if mapping.is_key_scoped() {
                let keys = mapping
                    .keys
                    .iter()
                    .map(|k| regex::escape(k))
                    .collect::<Vec<_>>()
                    .join("|");
                let tail = if mapping.pattern.bytes().last().is_some_and(is_ident_byte) {
                    r"\b"
                } else {
                    ""
                };
                let regex = Regex::new(&format!(
                    r"(\b(?:{keys})\s*:\s*){}{tail}",
                    regex::escape(&mapping.pattern)
                ))?;
                CompiledRule::KeyScoped {
                    pattern: mapping.pattern.clone(),
                    regex,
                    token: mapping.token.clone(),
                    category: mapping.category,
                }
            } else {
                CompiledRule::Exact {
                    pattern: mapping.pattern.clone(),
                    token: mapping.token.clone(),
                    category: mapping.category,
                    guard_left: mapping.pattern.bytes().next().is_some_and(is_ident_byte),
                }
            };
            rules.push(rule);
        }
        Ok(Self { rules })
    }

    /// Number of compiled rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Replace every occurrence of every literal with its token
    pub fn apply(&self, text: &str, log: &mut RewriteLog) -> MapResult {
        let mut current = text.to_string();
        let mut replacements = 0;

        for rule in &self.rules {
            let (next, count) = match rule {
                CompiledRule::Exact {
                    pattern,
                    token,
                    category,
                    guard_left,
                } => replace_exact(&current, pattern, token, *category, *guard_left, log),
                CompiledRule::KeyScoped {
                    pattern,
                    regex,
                    token,
                    category,
                } => replace_key_scoped(&current, pattern, regex, token, *category, log),
            };
            if count > 0 {
                current = next;
                replacements += count;
            }
        }

        MapResult {
            text: current,
            replacements,
        }
    }
}

fn replace_exact(
    text: &str,
    pattern: &str,
    token: &str,
    category: Category,
    guard_left: bool,
    log: &mut RewriteLog,
) -> (String, usize) {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut count = 0;

    for (idx, _) in text.match_indices(pattern) {
        if guard_left && idx > 0 && is_ident_byte(bytes[idx - 1]) {
            continue;
        }
        out.push_str(&text[last..idx]);
        out.push_str(token);
        log.record(idx, pattern, token, ReplaceReason::LiteralMapped { category });
        last = idx + pattern.len();
        count += 1;
    }

    out.push_str(&text[last..]);
    (out, count)
}

fn replace_key_scoped(
    text: &str,
    pattern: &str,
    regex: &Regex,
    token: &str,
    category: Category,
    log: &mut RewriteLog,
) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut count = 0;

    for caps in regex.captures_iter(text) {
        let (Some(whole), Some(lead)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&text[last..lead.end()]);
        out.push_str(token);
        log.record(lead.end(), pattern, token, ReplaceReason::LiteralMapped { category });
        last = whole.end();
        count += 1;
    }

    out.push_str(&text[last..]);
    (out, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mapper() -> LiteralMapper {
        LiteralMapper::new(&[
            SemanticMapping::exact("Color(0xFF1A1A1A)", "context.cs.onSurface", Category::Text),
            SemanticMapping::exact("Color(0xFFEEEEEE)", "context.cs.outline", Category::Border),
            SemanticMapping {
                pattern: "Colors.white".to_string(),
                keys: vec!["color".to_string(), "backgroundColor".to_string()],
                token: "context.cs.surface".to_string(),
                category: Category::Surface,
            },
        ])
        .expect("mapper")
    }

    #[test]
    fn maps_exact_literal() {
        let mut log = RewriteLog::default();
        let out = mapper().apply("Text('a', style: TextStyle(color: Color(0xFF1A1A1A)))", &mut log);
        assert_eq!(
            out.text,
            "Text('a', style: TextStyle(color: context.cs.onSurface))"
        );
        assert_eq!(out.replacements, 1);
        assert_eq!(
            log.events[0].reason,
            ReplaceReason::LiteralMapped {
                category: Category::Text
            }
        );
    }

    #[test]
    fn disjoint_literals_replace_independently() {
        let input = "a: Color(0xFFEEEEEE), b: Color(0xFF1A1A1A), c: Color(0xFFEEEEEE)";
        let forward = mapper().apply(input, &mut RewriteLog::default());

        let reversed = LiteralMapper::new(&[
            SemanticMapping::exact("Color(0xFFEEEEEE)", "context.cs.outline", Category::Border),
            SemanticMapping::exact("Color(0xFF1A1A1A)", "context.cs.onSurface", Category::Text),
        ])
        .expect("mapper")
        .apply(input, &mut RewriteLog::default());

        assert_eq!(forward, reversed);
        assert_eq!(forward.replacements, 3);
        assert_eq!(
            forward.text,
            "a: context.cs.outline, b: context.cs.onSurface, c: context.cs.outline"
        );
    }

    #[test]
    fn key_scoped_rule_only_touches_listed_keys() {
        let input = "Container(color: Colors.white, child: Icon(Icons.add, color: Colors.white70))\n\
                     Text('x', style: TextStyle(foreground: Colors.white))\n\
                     Scaffold(backgroundColor :\n  Colors.white)";
        let out = mapper().apply(input, &mut RewriteLog::default());
        assert_eq!(
            out.text,
            "Container(color: context.cs.surface, child: Icon(Icons.add, color: Colors.white70))\n\
             Text('x', style: TextStyle(foreground: Colors.white))\n\
             Scaffold(backgroundColor :\n  context.cs.surface)"
        );
        assert_eq!(out.replacements, 2);
    }

    #[test]
    fn identifier_glued_literal_is_left_alone() {
        let out = mapper().apply("MyColor(0xFF1A1A1A)", &mut RewriteLog::default());
        assert_eq!(out.text, "MyColor(0xFF1A1A1A)");
        assert_eq!(out.replacements, 0);
    }

    #[test]
    fn absent_patterns_are_noop() {
        let input = "const SizedBox(height: 8)";
        let out = mapper().apply(input, &mut RewriteLog::default());
        assert_eq!(out.text, input);
        assert_eq!(out.replacements, 0);
    }
}
