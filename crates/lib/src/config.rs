//! Resolver configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{CONFLICTS_VIEW, DESIGN_PREFIX, RESOLVER_DESIGN};

/// Names the helper design document and view used by database-wide blind resolution.
///
/// The design document persists in the target store between calls and is only
/// rewritten when absent or different from the expected definition.
///
/// ```
/// # use deconflict::ResolverConfig;
/// let config: ResolverConfig = serde_json::from_str(r#"{"design": "cleanup"}"#).unwrap();
/// assert_eq!(config.design_id(), "_design/cleanup");
/// assert_eq!(config.view, "getConflicts");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Design document name, without the `_design/` prefix.
    pub design: String,
    /// View inside the design document that emits each conflicted document's conflicts.
    pub view: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            design: RESOLVER_DESIGN.to_string(),
            view: CONFLICTS_VIEW.to_string(),
        }
    }
}

impl ResolverConfig {
    /// Full id of the design document, e.g. `_design/resolver`.
    pub fn design_id(&self) -> String {
        format!("{DESIGN_PREFIX}{}", self.design)
    }
}
