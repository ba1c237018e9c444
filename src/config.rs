use crate::consts::{ACTIVITY_SUPERTYPES, FRAGMENT_SUPERTYPES};

/// Null-safety strategy applied to every rewritten call site of one run.
///
/// A class must consistently use one access pattern, so the strategy is a
/// single global switch per migration, never a per-reference choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingStrategy {
    /// Nullable `_binding` backing field plus a non-null `binding` getter
    NotNull,
    /// Single nullable `binding` property accessed through safe calls
    Nullable,
}

impl Default for BindingStrategy {
    fn default() -> Self {
        BindingStrategy::NotNull
    }
}

/// Configuration for one migration run
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Null-safety strategy for the migrated class
    pub strategy: BindingStrategy,
    /// Supertype names classifying a class as a fragment
    pub fragment_supertypes: Vec<String>,
    /// Supertype names classifying a class as an activity
    pub activity_supertypes: Vec<String>,
    /// Correlate `<include>` tags of the root layout with references into
    /// included layouts. Active for activities; the fragment flow keeps the
    /// machinery dormant until a root-layout selection prompt exists.
    pub correlate_includes: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            strategy: BindingStrategy::default(),
            fragment_supertypes: FRAGMENT_SUPERTYPES.iter().map(|s| s.to_string()).collect(),
            activity_supertypes: ACTIVITY_SUPERTYPES.iter().map(|s| s.to_string()).collect(),
            correlate_includes: true,
        }
    }
}

impl MigrationConfig {
    /// Configuration using the nullable single-property strategy
    pub fn nullable() -> Self {
        Self {
            strategy: BindingStrategy::Nullable,
            ..Self::default()
        }
    }
}
