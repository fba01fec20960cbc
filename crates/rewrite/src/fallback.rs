use crate::classify::ContextClassifier;
use crate::constness::ConstnessRepair;
use crate::profile::FallbackEntry;
use crate::scan::find_bounded;
use crate::types::{RepairStrategy, ReplaceReason, RewriteLog, ScopeContext};

/// Replaces tokens that sit where no context exists with literal substitutes
#[derive(Debug, Clone)]
pub struct FallbackResolver {
    entries: Vec<FallbackEntry>,
}

impl FallbackResolver {
    pub fn new(entries: &[FallbackEntry]) -> Self {
        Self {
            entries: entries.to_vec(),
        }
    }

    pub fn entries(&self) -> &[FallbackEntry] {
        &self.entries
    }

    /// Resolve every unavailable occurrence of every fallback token.
    ///
    /// Passes repeat until one replaces nothing, because a replacement can
    /// shift what a window classifier sees for occurrences already skipped.
    pub fn resolve(
        &self,
        text: &str,
        classifier: &ContextClassifier,
        repair: &ConstnessRepair,
        log: &mut RewriteLog,
    ) -> String {
        let mut text = text.to_string();
        loop {
            let mut replaced = 0;
            for entry in &self.entries {
                replaced += self.resolve_entry(&mut text, entry, classifier, repair, log);
            }
            if replaced == 0 {
                return text;
            }
        }
    }

    fn resolve_entry(
        &self,
        text: &mut String,
        entry: &FallbackEntry,
        classifier: &ContextClassifier,
        repair: &ConstnessRepair,
        log: &mut RewriteLog,
    ) -> usize {
        let mut replaced = 0;
        let mut cursor = 0;

        while let Some(mut idx) = find_bounded(text, &entry.token, cursor) {
            if classifier.classify(text, idx) == ScopeContext::Available {
                cursor = idx + entry.token.len();
                continue;
            }

            if !entry.const_capable {
                let qualifiers = repair.enclosing_qualifiers(text, idx);
                let removed: usize = qualifiers.iter().map(|r| r.len()).sum();
                if removed > 0 {
                    *text = repair.remove(text, &qualifiers, RepairStrategy::FallbackEnclosing, log);
                    idx -= removed;
                }
            }

            text.replace_range(idx..idx + entry.token.len(), &entry.literal);
            log.record(idx, entry.token.as_str(), entry.literal.as_str(), ReplaceReason::Fallback);
            cursor = idx + entry.literal.len();
            replaced += 1;
        }

        if replaced > 0 {
            log::debug!("Fallback `{}` applied {replaced} time(s)", entry.token);
        }
        replaced
    }

    /// Offsets of fallback tokens still classified as unavailable.
    ///
    /// Empty after [`FallbackResolver::resolve`].
    pub fn unresolved(&self, text: &str, classifier: &ContextClassifier) -> Vec<(usize, String)> {
        let mut out = Vec::new();
        for entry in &self.entries {
            let mut cursor = 0;
            while let Some(idx) = find_bounded(text, &entry.token, cursor) {
                if classifier.classify(text, idx) == ScopeContext::Unavailable {
                    out.push((idx, entry.token.clone()));
                }
                cursor = idx + entry.token.len();
            }
        }
        out.sort();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::EngineConfig;
    use pretty_assertions::assert_eq;

    fn parts() -> (ContextClassifier, ConstnessRepair) {
        let config = EngineConfig::default();
        (
            ContextClassifier::new(&config),
            ConstnessRepair::new(&config).expect("repair"),
        )
    }

    fn resolver() -> FallbackResolver {
        FallbackResolver::new(&[
            FallbackEntry::new("context.cs.surface", "const Color(0xffffffff)"),
            FallbackEntry::new("context.cs.outline", "const Color(0xffeeeeee)"),
        ])
    }

    const PAINTER: &str = "class Ring extends CustomPainter {\n  void paint(Canvas c, Size s) {\n    a(context.cs.outline);\n    b(context.cs.outline, context.cs.outline);\n  }\n}\n";

    #[test]
    fn replaces_all_unavailable_occurrences() {
        let (classifier, repair) = parts();
        let r = resolver();
        let mut log = RewriteLog::default();
        let out = r.resolve(PAINTER, &classifier, &repair, &mut log);

        assert_eq!(out.matches("context.cs.outline").count(), 0);
        assert_eq!(out.matches("const Color(0xffeeeeee)").count(), 3);
        assert_eq!(log.events.len(), 3);
        assert!(r.unresolved(&out, &classifier).is_empty());
    }

    #[test]
    fn available_occurrences_stay() {
        let (classifier, repair) = parts();
        let text = "class A extends StatelessWidget {\n  Widget build(BuildContext context) {\n    return X(color: context.cs.surface);\n  }\n  static final y = context.cs.surface;\n}\n";
        let out = resolver().resolve(text, &classifier, &repair, &mut RewriteLog::default());
        assert_eq!(
            out,
            "class A extends StatelessWidget {\n  Widget build(BuildContext context) {\n    return X(color: context.cs.surface);\n  }\n  static final y = const Color(0xffffffff);\n}\n"
        );
    }

    #[test]
    fn longer_token_sharing_a_prefix_is_not_touched() {
        let (classifier, repair) = parts();
        let text = "final a = context.cs.surfaceContainerHighest;";
        let out = resolver().resolve(text, &classifier, &repair, &mut RewriteLog::default());
        assert_eq!(out, text);
    }

    #[test]
    fn non_const_capable_fallback_strips_enclosing_qualifier() {
        let (classifier, repair) = parts();
        let r = FallbackResolver::new(&[FallbackEntry {
            token: "context.cs.primary".to_string(),
            literal: "Palette.primary".to_string(),
            const_capable: false,
        }]);
        let mut log = RewriteLog::default();
        let out = r.resolve("final a = const [1, context.cs.primary];", &classifier, &repair, &mut log);
        assert_eq!(out, "final a = [1, Palette.primary];");
        assert_eq!(
            log.events[0].reason,
            ReplaceReason::QualifierStripped {
                strategy: RepairStrategy::FallbackEnclosing
            }
        );
        assert_eq!(log.events[1].reason, ReplaceReason::Fallback);
    }
}
