//! Settings of the resolver itself

/// Prefix of environment variables that feed step parameters
pub const DEFAULT_ENV_PREFIX: &str = "PIPER_";

/// Delimiter of list values given as plain strings (flags, environment)
pub const DEFAULT_LIST_DELIMITER: char = ',';

/// Resolver settings
///
/// # Example
///
/// ```
/// use step_config::ResolverOptions;
///
/// let options = ResolverOptions::default().strict(true).env_prefix("STEP_");
/// assert!(options.strict);
/// assert_eq!(options.env_prefix, "STEP_");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Environment variable `<prefix><name>` feeds parameter `<name>`
    pub env_prefix: String,
    /// Separator used to split delimited list strings
    pub list_delimiter: char,
    /// Report keys in the step and flag layers that match no parameter
    pub strict: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            list_delimiter: DEFAULT_LIST_DELIMITER,
            strict: false,
        }
    }
}

impl ResolverOptions {
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn list_delimiter(mut self, delimiter: char) -> Self {
        self.list_delimiter = delimiter;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
