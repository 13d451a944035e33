//! Which input profile plays base and which plays overlay.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two input profiles of a merge session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

/// Merge direction of an A/B session.
///
/// "A into B" merges A onto B, so A is the overlay and wins on conflicts.
/// The default merges B into A, letting B win.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeDirection {
    AIntoB,
    #[default]
    BIntoA,
}

impl MergeDirection {
    pub fn from_a_into_b(a_into_b: bool) -> Self {
        if a_into_b {
            MergeDirection::AIntoB
        } else {
            MergeDirection::BIntoA
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            MergeDirection::AIntoB => MergeDirection::BIntoA,
            MergeDirection::BIntoA => MergeDirection::AIntoB,
        }
    }

    /// The side whose records win on an identity collision.
    pub fn overlay(self) -> Side {
        match self {
            MergeDirection::AIntoB => Side::A,
            MergeDirection::BIntoA => Side::B,
        }
    }

    /// The lower-precedence side.
    pub fn base(self) -> Side {
        self.overlay().other()
    }

    /// Order `(a, b)` as `(base, overlay)`.
    pub fn roles<T>(self, a: T, b: T) -> (T, T) {
        match self {
            MergeDirection::AIntoB => (b, a),
            MergeDirection::BIntoA => (a, b),
        }
    }
}

impl fmt::Display for MergeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeDirection::AIntoB => write!(f, "A into B"),
            MergeDirection::BIntoA => write!(f, "B into A"),
        }
    }
}
