use serde::{Deserialize, Serialize};

/// Role a migrated color plays in the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Primary text
    Text,
    /// Secondary / hint text
    Hint,
    /// Borders and dividers
    Border,
    /// Input and subtle fills
    Fill,
    /// Card and page backgrounds
    Surface,
    /// Brand accents
    Accent,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Text => "text",
            Category::Hint => "hint",
            Category::Border => "border",
            Category::Fill => "fill",
            Category::Surface => "surface",
            Category::Accent => "accent",
        }
    }
}

/// Whether a position can resolve a semantic token at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeContext {
    Available,
    Unavailable,
}

impl ScopeContext {
    #[must_use]
    pub const fn is_available(self) -> bool {
        matches!(self, ScopeContext::Available)
    }
}

/// Which repair strategy removed a constant-qualifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStrategy {
    /// Qualifier written directly in front of a token
    Adjacent,
    /// Token within the line window around the qualifier
    Proximity,
    /// Token inside the bracket block the qualifier applies to
    Block,
    /// Enclosing block received a fallback literal that cannot stay constant
    FallbackEnclosing,
}

/// Structural normalizer rule that fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeRule {
    FlagField,
    ToggleCallback,
    ConstructorCall,
}

/// Why a replacement happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplaceReason {
    LiteralMapped { category: Category },
    QualifierStripped { strategy: RepairStrategy },
    Fallback,
    Normalized { rule: NormalizeRule },
}

/// One text replacement, recorded for reporting and tests only.
///
/// `offset` is relative to the buffer as it was when the stage ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplacementEvent {
    pub offset: usize,
    pub original: String,
    pub replacement: String,
    pub reason: ReplaceReason,
}

/// Non-fatal problems found while rewriting a buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewriteWarning {
    /// A qualifier opens a bracket that is never closed; the block was left untouched
    UnterminatedBlock { offset: usize, line: usize },
    /// The pipeline still changed the text after the last allowed round
    NotConverged { rounds: usize },
    /// A fallback token stayed in a position without context
    UnresolvedToken { offset: usize, token: String },
}

impl std::fmt::Display for RewriteWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RewriteWarning::UnterminatedBlock { line, .. } => {
                write!(f, "line {line}: qualified block has no closing bracket, left unmodified")
            }
            RewriteWarning::NotConverged { rounds } => {
                write!(f, "rewrite did not settle after {rounds} rounds")
            }
            RewriteWarning::UnresolvedToken { offset, token } => {
                write!(f, "offset {offset}: `{token}` has no context and no fallback applied")
            }
        }
    }
}

/// Event sink threaded through the stages of one round
#[derive(Debug, Clone, Default)]
pub struct RewriteLog {
    pub events: Vec<ReplacementEvent>,
}

impl RewriteLog {
    pub(crate) fn record(
        &mut self,
        offset: usize,
        original: impl Into<String>,
        replacement: impl Into<String>,
        reason: ReplaceReason,
    ) {
        self.events.push(ReplacementEvent {
            offset,
            original: original.into(),
            replacement: replacement.into(),
            reason,
        });
    }
}
