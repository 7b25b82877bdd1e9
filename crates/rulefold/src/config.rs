//! Inliner configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the inlining passes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlinerConfig {
    /// Enable the linear fusion pass
    pub inline_linear: bool,
    /// Permit linear fusion even when the consumed rule has multiple
    /// consumers (duplicates the consumed rule's body)
    pub inline_linear_branch: bool,
    /// Existentially quantify variables a resolvent leaves unbound in its
    /// interpreted tail
    pub fix_unbound_vars: bool,
}

impl Default for InlinerConfig {
    fn default() -> Self {
        InlinerConfig {
            inline_linear: true,
            inline_linear_branch: false,
            fix_unbound_vars: false,
        }
    }
}
