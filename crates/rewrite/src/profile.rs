use crate::error::{Result, RewriteError};
use crate::scan::{delimiter_balance, is_ident_byte};
use crate::types::Category;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

const BUILTIN_MATERIAL: &str = include_str!("../profiles/material.toml");

/// Name of the profile used when none is given
pub const DEFAULT_PROFILE: &str = "material";

static MATERIAL: Lazy<std::result::Result<Profile, String>> =
    Lazy::new(|| Profile::from_toml_str(BUILTIN_MATERIAL).map_err(|e| e.to_string()));

/// Complete, read-only rule set for one migration.
///
/// Loaded once, validated, then shared by every file of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub engine: EngineConfig,

    /// Literal -> token table; literals must be pairwise disjoint
    #[serde(default)]
    pub mappings: Vec<SemanticMapping>,

    /// Substitutes for tokens in positions without context
    #[serde(default)]
    pub fallbacks: Vec<FallbackEntry>,

    /// Structural cleanup; absent disables the normalizer
    #[serde(default)]
    pub normalize: Option<NormalizeConfig>,
}

/// Engine knobs shared by all stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Constant-qualifier keyword
    pub qualifier: String,

    /// Keyword that replaces a stripped qualifier in declaration position
    pub declaration_keyword: String,

    /// Prefix that marks a context-dependent token
    pub context_prefix: String,

    /// Parameter types that bring the context into scope
    pub context_markers: Vec<String>,

    /// How context availability is decided
    pub classifier: ClassifierMode,

    /// Backward window in bytes for [`ClassifierMode::Window`]
    pub lookback_window: usize,

    /// Lines before a qualifier inspected by the proximity strategy
    pub proximity_before: usize,

    /// Lines after a qualifier inspected by the proximity strategy
    pub proximity_after: usize,

    /// Upper bound on pipeline rounds before giving up on a fixpoint
    pub max_rounds: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            qualifier: "const".to_string(),
            declaration_keyword: "final".to_string(),
            context_prefix: "context.cs".to_string(),
            context_markers: vec!["BuildContext".to_string()],
            classifier: ClassifierMode::ScopeStack,
            lookback_window: 800,
            proximity_before: 1,
            proximity_after: 8,
            max_rounds: 64,
        }
    }
}

impl EngineConfig {
    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !is_identifier(&self.qualifier) {
            return Err(format!(
                "qualifier must be a single identifier, got `{}`",
                self.qualifier
            ));
        }

        if !is_identifier(&self.declaration_keyword) {
            return Err(format!(
                "declaration_keyword must be a single identifier, got `{}`",
                self.declaration_keyword
            ));
        }

        if self.context_prefix.trim().is_empty() {
            return Err("context_prefix must not be empty".to_string());
        }

        if self.context_markers.is_empty()
            || self.context_markers.iter().any(|m| m.trim().is_empty())
        {
            return Err("context_markers must list at least one non-empty marker".to_string());
        }

        if self.lookback_window == 0 {
            return Err("lookback_window must be > 0".to_string());
        }

        if self.max_rounds == 0 {
            return Err("max_rounds must be > 0".to_string());
        }

        Ok(())
    }
}

/// Strategy for deciding context availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierMode {
    /// Marker anywhere in a fixed backward window.
    /// Misses far-away signatures and matches unrelated outer ones.
    Window,

    /// Stack of enclosing constructs built from delimiters
    ScopeStack,
}

impl Default for ClassifierMode {
    fn default() -> Self {
        Self::ScopeStack
    }
}

/// One row of the literal table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticMapping {
    /// Literal text to replace
    pub pattern: String,

    /// When non-empty, only replace `pattern` when it is the value of one of
    /// these keys (`color: Colors.white`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,

    /// Semantic accessor written in place of the literal
    pub token: String,

    pub category: Category,
}

impl SemanticMapping {
    pub fn exact(pattern: impl Into<String>, token: impl Into<String>, category: Category) -> Self {
        Self {
            pattern: pattern.into(),
            keys: Vec::new(),
            token: token.into(),
            category,
        }
    }

    #[must_use]
    pub fn is_key_scoped(&self) -> bool {
        !self.keys.is_empty()
    }
}

/// Context-free substitute for a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackEntry {
    pub token: String,
    pub literal: String,

    /// Whether `literal` may sit inside a constant-qualified block
    #[serde(default = "default_true")]
    pub const_capable: bool,
}

impl FallbackEntry {
    pub fn new(token: impl Into<String>, literal: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            literal: literal.into(),
            const_capable: true,
        }
    }
}

/// Names used by the structural normalizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Boolean field made obsolete by the theme (`isDarkMode`)
    pub flag_field: String,

    /// Callback that only flips the flag (`_toggleTheme`)
    pub toggle_method: String,

    /// Named argument carrying the callback (`onThemeChanged`)
    pub callback_param: String,

    /// Constructors whose flag/callback arguments are dropped
    #[serde(default)]
    pub constructors: Vec<String>,

    /// Prefix rewritten calls with the qualifier
    #[serde(default = "default_true")]
    pub qualify_rewritten: bool,
}

fn default_true() -> bool {
    true
}

impl Profile {
    /// Parse and validate a TOML profile
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let profile: Profile = toml::from_str(raw)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Load a TOML profile from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let profile = Self::from_toml_str(&raw)?;
        log::debug!(
            "Loaded profile `{}` from {} ({} mappings, {} fallbacks)",
            profile.name,
            path.display(),
            profile.mappings.len(),
            profile.fallbacks.len()
        );
        Ok(profile)
    }

    /// Builtin profile by name
    pub fn builtin(name: &str) -> Result<Self> {
        match name.trim() {
            "material" => MATERIAL
                .as_ref()
                .cloned()
                .map_err(|e| RewriteError::invalid_profile(e.clone())),
            other => Err(RewriteError::UnknownProfile(other.to_string())),
        }
    }

    /// Names accepted by [`Profile::builtin`]
    pub fn builtin_names() -> &'static [&'static str] {
        &["material"]
    }

    /// Check every table invariant the stages rely on
    pub fn validate(&self) -> Result<()> {
        self.engine
            .validate()
            .map_err(RewriteError::invalid_profile)?;

        let prefix = self.engine.context_prefix.as_str();

        for mapping in &self.mappings {
            if mapping.pattern.is_empty() {
                return Err(RewriteError::invalid_profile("mapping pattern must not be empty"));
            }
            if !mapping.token.starts_with(prefix) {
                return Err(RewriteError::invalid_profile(format!(
                    "mapping token `{}` does not start with context prefix `{prefix}`",
                    mapping.token
                )));
            }
            if let Some(key) = mapping.keys.iter().find(|k| !is_identifier(k)) {
                return Err(RewriteError::invalid_profile(format!(
                    "mapping key `{key}` for `{}` is not an identifier",
                    mapping.pattern
                )));
            }
            ensure_balanced("mapping pattern", &mapping.pattern)?;
            ensure_balanced("mapping token", &mapping.token)?;
        }

        for (i, a) in self.mappings.iter().enumerate() {
            for b in &self.mappings[i + 1..] {
                if a.pattern.contains(&b.pattern) || b.pattern.contains(&a.pattern) {
                    return Err(RewriteError::invalid_profile(format!(
                        "mapping patterns `{}` and `{}` overlap",
                        a.pattern, b.pattern
                    )));
                }
            }
        }

        for (i, entry) in self.fallbacks.iter().enumerate() {
            if !entry.token.starts_with(prefix) {
                return Err(RewriteError::invalid_profile(format!(
                    "fallback token `{}` does not start with context prefix `{prefix}`",
                    entry.token
                )));
            }
            if self.fallbacks[..i].iter().any(|e| e.token == entry.token) {
                return Err(RewriteError::invalid_profile(format!(
                    "duplicate fallback for `{}`",
                    entry.token
                )));
            }
            if entry.literal.contains(prefix) {
                return Err(RewriteError::invalid_profile(format!(
                    "fallback literal `{}` contains the context prefix",
                    entry.literal
                )));
            }
            if let Some(mapping) = self
                .mappings
                .iter()
                .find(|m| entry.literal.contains(&m.pattern))
            {
                return Err(RewriteError::invalid_profile(format!(
                    "fallback literal `{}` contains mapped literal `{}`",
                    entry.literal, mapping.pattern
                )));
            }
            ensure_balanced("fallback literal", &entry.literal)?;
        }

        if let Some(normalize) = &self.normalize {
            let names = [
                &normalize.flag_field,
                &normalize.toggle_method,
                &normalize.callback_param,
            ];
            if let Some(bad) = names
                .into_iter()
                .chain(normalize.constructors.iter())
                .find(|name| !is_identifier(name))
            {
                return Err(RewriteError::invalid_profile(format!(
                    "normalize name `{bad}` is not an identifier"
                )));
            }
        }

        Ok(())
    }
}

fn is_identifier(value: &str) -> bool {
    !value.is_empty()
        && !value.as_bytes()[0].is_ascii_digit()
        && value.bytes().all(is_ident_byte)
}

fn ensure_balanced(what: &str, value: &str) -> Result<()> {
    if delimiter_balance(value) != [0; 3] {
        return Err(RewriteError::invalid_profile(format!(
            "{what} `{value}` has unbalanced delimiters"
        )));
    }
    Ok(())
}
