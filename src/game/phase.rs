use crate::Invalid;
use serde::Serialize;

/// Lifecycle of a match.
///
/// ```text
/// Waiting ──start──▶ Active ──timer──▶ Finished
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Waiting,
    Active,
    Finished,
}

impl Phase {
    /// Fails unless the match is in `expected`, naming the refused action.
    pub fn require(self, expected: Phase, action: &'static str) -> Result<(), Invalid> {
        match self == expected {
            true => Ok(()),
            false => Err(Invalid::Phase {
                action,
                phase: self,
            }),
        }
    }
    pub fn start(&mut self) -> bool {
        self.advance(Phase::Waiting, Phase::Active)
    }
    pub fn finish(&mut self) -> bool {
        self.advance(Phase::Active, Phase::Finished)
    }
    fn advance(&mut self, from: Phase, to: Phase) -> bool {
        let moved = *self == from;
        if moved {
            *self = to;
        }
        moved
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Phase::Waiting => write!(f, "waiting"),
            Phase::Active => write!(f, "active"),
            Phase::Finished => write!(f, "finished"),
        }
    }
}
