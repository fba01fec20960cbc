//! # Themeshift Rewrite
//!
//! Text rewrite engine that migrates hardcoded color literals in widget
//! source to context-dependent theme tokens, and repairs the code the
//! migration breaks.
//!
//! ## Philosophy
//!
//! The engine works on raw text, not on a syntax tree:
//! - Literal tables are exact and disjoint, so mapping is a plain substitution
//! - Constant-qualifiers are removed, never added; an extra removal compiles
//! - Tokens that land where no context exists get a literal substitute
//! - Rounds repeat until the text stops changing, so a second run is a no-op
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     │
//!     ├──> Literal Mapper (literal → token, key-scoped rules)
//!     │
//!     ├──> Constness Repair
//!     │    ├─> Adjacent: `const <token>`
//!     │    ├─> Proximity: qualifier within a line window of a token
//!     │    └─> Block: qualifier whose bracket block holds a token
//!     │
//!     ├──> Fallback Resolver
//!     │    └─> Context Classifier decides available / unavailable
//!     │
//!     └──> Structural Normalizer (flag field, toggle, constructor calls)
//!          │
//!          └─> repeat until unchanged → RewriteOutcome
//! ```
//!
//! ## Example
//!
//! ```rust
//! use themeshift_rewrite::RewriteEngine;
//!
//! let engine = RewriteEngine::builtin().unwrap();
//! let source = r#"
//! Widget build(BuildContext context) {
//!   return const Divider(color: Color(0xFFEEEEEE));
//! }
//! "#;
//!
//! let outcome = engine.rewrite(source);
//! assert!(outcome.text.contains("Divider(color: context.cs.outline)"));
//! assert!(!outcome.text.contains("const Divider"));
//! ```

mod classify;
mod constness;
mod error;
mod fallback;
mod mapping;
mod normalize;
mod pipeline;
mod profile;
mod scan;
mod types;

pub use classify::ContextClassifier;
pub use constness::{ConstnessRepair, QualifiedBlock};
pub use error::{Result, RewriteError};
pub use fallback::FallbackResolver;
pub use mapping::{LiteralMapper, MapResult};
pub use normalize::StructuralNormalizer;
pub use pipeline::{RewriteEngine, RewriteOutcome};
pub use profile::{
    ClassifierMode, EngineConfig, FallbackEntry, NormalizeConfig, Profile, SemanticMapping,
    DEFAULT_PROFILE,
};
pub use types::{
    Category, NormalizeRule, RepairStrategy, ReplaceReason, ReplacementEvent, RewriteLog,
    RewriteWarning, ScopeContext,
};
