//! Which binding slots make it into the resolved output.

use serde::{Deserialize, Serialize};

/// Presentation toggles, passed by value into every resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityPolicy {
    /// Emit slots that are bound but not referenced by the shader.
    pub show_disabled: bool,
    /// Emit slots with nothing bound.
    pub show_empty: bool,
}

impl VisibilityPolicy {
    pub const fn new(show_disabled: bool, show_empty: bool) -> Self {
        Self {
            show_disabled,
            show_empty,
        }
    }
}

/// Slot emission rule.
///
/// Used slots are always shown. Otherwise a filled slot needs `show_disabled` and an empty one
/// needs `show_empty`.
pub fn should_show(used: bool, filled: bool, policy: VisibilityPolicy) -> bool {
    if used {
        return true;
    }
    if policy.show_disabled && filled {
        return true;
    }
    policy.show_empty && !filled
}
