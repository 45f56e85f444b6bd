//! Parser configuration.

use smol_str::SmolStr;

/// Parameter aliases recognized by default.
pub const DEFAULT_PARAMETER_ALIASES: [&str; 5] = [
    "@lx_myUser_Id",
    "@lx_myOrg_Id",
    "@lx_myUser_Timezone",
    "@lx_myTeam",
    "@lx_myWorkflows",
];

/// Default maximum nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Default maximum number of binary operators enclosing any operand.
pub const DEFAULT_MAX_OPERATOR_DEPTH: usize = 1024;

/// Configuration options for parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// `@name` aliases accepted as literals, each including its `@`.
    ///
    /// Any other alias is a syntax error.
    pub parameter_aliases: Vec<SmolStr>,

    /// Maximum nesting of parentheses, calls, lambdas, `$apply` stages and
    /// `$expand` option lists. Deeper input is rejected with a syntax error.
    pub max_depth: usize,

    /// Maximum number of unfolded `and`/`or`/arithmetic operators above any
    /// operand, counted across enclosing chains. Chains fold into right-deep
    /// trees, so this bounds the height of the resulting AST.
    pub max_operator_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            parameter_aliases: DEFAULT_PARAMETER_ALIASES
                .iter()
                .copied()
                .map(SmolStr::new_static)
                .collect(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_operator_depth: DEFAULT_MAX_OPERATOR_DEPTH,
        }
    }
}

impl ParserConfig {
    /// Replaces the recognized parameter aliases.
    pub fn with_parameter_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.parameter_aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Adds one recognized parameter alias.
    pub fn with_parameter_alias(mut self, alias: impl Into<SmolStr>) -> Self {
        self.parameter_aliases.push(alias.into());
        self
    }

    /// Sets the maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the maximum operator depth.
    pub fn with_max_operator_depth(mut self, max_operator_depth: usize) -> Self {
        self.max_operator_depth = max_operator_depth;
        self
    }

    /// Returns `true` if `alias` (with its `@`) is recognized.
    pub fn is_parameter_alias(&self, alias: &str) -> bool {
        self.parameter_aliases.iter().any(|known| known == alias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_recognizes_fixed_aliases() {
        let config = ParserConfig::default();
        assert_eq!(config.parameter_aliases.len(), 5);
        assert!(config.is_parameter_alias("@lx_myUser_Timezone"));
        assert!(!config.is_parameter_alias("@other"));
        assert!(!config.is_parameter_alias("lx_myTeam"));
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.max_operator_depth, DEFAULT_MAX_OPERATOR_DEPTH);
    }

    #[test]
    fn builders_replace_and_extend() {
        let config = ParserConfig::default()
            .with_parameter_aliases(["@tenant"])
            .with_parameter_alias("@region")
            .with_max_depth(4)
            .with_max_operator_depth(16);
        assert!(config.is_parameter_alias("@tenant"));
        assert!(config.is_parameter_alias("@region"));
        assert!(!config.is_parameter_alias("@lx_myTeam"));
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.max_operator_depth, 16);
    }
}
