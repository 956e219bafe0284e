//! Rule variants.

use serde::{Deserialize, Serialize};

/// Pieces each player starts with.
pub const PIECES_PER_PLAYER: u8 = 9;

/// Optional rule variants. The default reproduces the simplified house rule
/// where mill-protected pieces can never be captured.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// When every remaining piece of the victim sits in a mill, allow
    /// capturing one of them instead of skipping the capture.
    pub capture_from_full_mills: bool,
}

impl RuleSet {
    /// Tournament rules: full-mill deadlock is broken by capturing from a mill.
    pub fn tournament() -> RuleSet {
        RuleSet {
            capture_from_full_mills: true,
        }
    }
}
