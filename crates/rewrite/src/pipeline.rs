use crate::classify::ContextClassifier;
use crate::constness::ConstnessRepair;
use crate::error::Result;
use crate::fallback::FallbackResolver;
use crate::mapping::LiteralMapper;
use crate::normalize::StructuralNormalizer;
use crate::profile::{Profile, DEFAULT_PROFILE};
use crate::types::{ReplacementEvent, RewriteLog, RewriteWarning};

/// Compiled, immutable rewrite pipeline.
///
/// Build once per batch and share by reference; it holds no mutable state.
#[derive(Debug, Clone)]
pub struct RewriteEngine {
    profile: Profile,
    mapper: LiteralMapper,
    classifier: ContextClassifier,
    repair: ConstnessRepair,
    fallback: FallbackResolver,
    normalizer: Option<StructuralNormalizer>,
}

/// Result of rewriting one buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub text: String,
    /// Every replacement of every round, in order
    pub events: Vec<ReplacementEvent>,
    /// Problems present in the final text
    pub warnings: Vec<RewriteWarning>,
    /// Rounds run, including the final one that changed nothing
    pub rounds: usize,
}

impl RewriteOutcome {
    #[must_use]
    pub fn replacements(&self) -> usize {
        self.events.len()
    }
}

impl RewriteEngine {
    /// Validate and compile a profile
    pub fn new(profile: Profile) -> Result<Self> {
        profile.validate()?;

        let mapper = LiteralMapper::new(&profile.mappings)?;
        let classifier = ContextClassifier::new(&profile.engine);
        let repair = ConstnessRepair::new(&profile.engine)?;
        let fallback = FallbackResolver::new(&profile.fallbacks);
        let normalizer = profile
            .normalize
            .as_ref()
            .map(|config| StructuralNormalizer::new(config, &profile.engine.qualifier))
            .transpose()?;

        log::debug!(
            "Compiled profile `{}`: {} mapping rules, {} fallbacks, classifier {:?}",
            profile.name,
            mapper.len(),
            fallback.entries().len(),
            classifier.mode()
        );

        Ok(Self {
            profile,
            mapper,
            classifier,
            repair,
            fallback,
            normalizer,
        })
    }

    /// Engine for the default builtin profile
    pub fn builtin() -> Result<Self> {
        Self::new(Profile::builtin(DEFAULT_PROFILE)?)
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn classifier(&self) -> &ContextClassifier {
        &self.classifier
    }

    /// Rewrite `source`, repeating rounds until the text stops changing.
    ///
    /// The fixpoint makes the whole pipeline idempotent.
    pub fn rewrite(&self, source: &str) -> RewriteOutcome {
        let max_rounds = self.profile.engine.max_rounds;
        let mut current = source.to_string();
        let mut events = Vec::new();

        for round in 1..=max_rounds {
            let mut log = RewriteLog::default();
            let next = self.round(&current, &mut log);
            events.append(&mut log.events);

            if next == current {
                return RewriteOutcome {
                    warnings: self.final_warnings(&current),
                    text: current,
                    events,
                    rounds: round,
                };
            }
            current = next;
        }

        log::warn!("Rewrite did not reach a fixpoint after {max_rounds} rounds");
        let mut warnings = vec![RewriteWarning::NotConverged { rounds: max_rounds }];
        warnings.extend(self.final_warnings(&current));

        RewriteOutcome {
            text: current,
            events,
            warnings,
            rounds: max_rounds,
        }
    }

    fn round(&self, text: &str, log: &mut RewriteLog) -> String {
        let mapped = self.mapper.apply(text, log);
        let repaired = self.repair.apply(&mapped.text, log);
        let resolved = self
            .fallback
            .resolve(&repaired, &self.classifier, &self.repair, log);
        match &self.normalizer {
            Some(normalizer) => normalizer.apply(&resolved, log),
            None => resolved,
        }
    }

    /// Unclosed qualified blocks survive every round untouched, so checking
    /// the final text reports them with offsets into the output.
    fn final_warnings(&self, text: &str) -> Vec<RewriteWarning> {
        let mut warnings = self.repair.unterminated_blocks(text);
        warnings.extend(
            self.fallback
                .unresolved(text, &self.classifier)
                .into_iter()
                .map(|(offset, token)| RewriteWarning::UnresolvedToken { offset, token }),
        );
        warnings
    }
}
