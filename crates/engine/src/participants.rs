//! The two named participants sharing the ledger.
//!
//! The balance and split models are defined over exactly two parties, so
//! the set is an ordered pair. Names come from configuration; the engine
//! never hardcodes them.
use std::fmt;

use crate::EngineError;

/// One of the two participant slots. Slot `A` maps to the first share
/// column, slot `B` to the second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Participant {
    A,
    B,
}

impl Participant {
    #[must_use]
    pub const fn other(self) -> Participant {
        match self {
            Participant::A => Participant::B,
            Participant::B => Participant::A,
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Participant::A => 0,
            Participant::B => 1,
        }
    }
}

/// Ordered pair of participant names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participants {
    names: [String; 2],
}

impl Participants {
    pub fn new(first: &str, second: &str) -> Result<Self, EngineError> {
        let first = first.trim();
        let second = second.trim();
        if first.is_empty() || second.is_empty() {
            return Err(EngineError::Validation(
                "participant names must not be empty".to_string(),
            ));
        }
        if first == second {
            return Err(EngineError::Validation(
                "participant names must differ".to_string(),
            ));
        }
        Ok(Self {
            names: [first.to_string(), second.to_string()],
        })
    }

    #[must_use]
    pub fn name(&self, participant: Participant) -> &str {
        &self.names[participant.index()]
    }

    /// Resolves a stored or typed name to its slot. Unknown names return
    /// `None`; aggregation treats them as unattributed.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Participant> {
        if name == self.names[0] {
            Some(Participant::A)
        } else if name == self.names[1] {
            Some(Participant::B)
        } else {
            None
        }
    }

    /// The `paid_by` label for a settlement row: `"From → To"`.
    #[must_use]
    pub fn settlement_label(&self, from: Participant) -> String {
        format!("{} → {}", self.name(from), self.name(from.other()))
    }
}

impl fmt::Display for Participants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} & {}", self.names[0], self.names[1])
    }
}
