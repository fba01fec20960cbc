use thiserror::Error;

/// Result type for rewrite engine operations
pub type Result<T> = std::result::Result<T, RewriteError>;

/// Errors raised while loading or compiling a migration profile.
///
/// Rewriting itself never fails: malformed input is reported through
/// [`crate::RewriteWarning`] instead.
#[derive(Error, Debug)]
pub enum RewriteError {
    /// Profile text is not valid TOML or does not match the schema
    #[error("Profile parse error: {0}")]
    ProfileParse(#[from] toml::de::Error),

    /// Profile parsed but violates a table invariant
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// No builtin profile with this name
    #[error("Unknown builtin profile: {0}")]
    UnknownProfile(String),

    /// A rule compiled from the profile is not a valid regex
    #[error("Rule compile error: {0}")]
    RuleCompile(#[from] regex::Error),

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl RewriteError {
    /// Create an invalid profile error
    pub fn invalid_profile(msg: impl Into<String>) -> Self {
        Self::InvalidProfile(msg.into())
    }
}
