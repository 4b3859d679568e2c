//! The dispute state machine.

use serde::{Deserialize, Serialize};

/// The lifecycle state of a dispute.
///
/// The processor drives most transitions (its notifications can arrive in
/// any order), so the four active states are mutually reachable. The three
/// terminal states accept nothing further — not even a transition to
/// themselves.
///
/// ## Transition Graph
///
/// ```text
/// OPEN ◀──▶ UNDER_REVIEW ◀──▶ WARNING_NEEDS_RESPONSE ◀──▶ NEEDS_RESPONSE
///   │             │                     │                       │
///   └─────────────┴─────────┬───────────┴───────────────────────┘
///                           ▼
///                 WON │ LOST │ CLOSED   (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeStatus {
    /// Freshly reported by the processor. Initial state.
    Open,
    /// The processor is reviewing submitted evidence.
    UnderReview,
    /// Early-warning stage: the processor flagged the charge and expects a
    /// response before it hardens into a formal dispute.
    WarningNeedsResponse,
    /// Formal dispute awaiting the seller's evidence.
    NeedsResponse,
    /// Resolved in the seller's favor. Terminal state.
    Won,
    /// Resolved in the buyer's favor. Terminal state.
    Lost,
    /// Closed without a ruling. Terminal state.
    Closed,
}

impl DisputeStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::UnderReview => "UNDER_REVIEW",
            Self::WarningNeedsResponse => "WARNING_NEEDS_RESPONSE",
            Self::NeedsResponse => "NEEDS_RESPONSE",
            Self::Won => "WON",
            Self::Lost => "LOST",
            Self::Closed => "CLOSED",
        }
    }

    /// Whether this status is terminal (no further transitions allowed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Won | Self::Lost | Self::Closed)
    }

    /// Valid target states from this status.
    pub fn valid_transitions(&self) -> &'static [DisputeStatus] {
        match self {
            Self::Open => &[
                Self::UnderReview,
                Self::WarningNeedsResponse,
                Self::NeedsResponse,
                Self::Won,
                Self::Lost,
                Self::Closed,
            ],
            Self::UnderReview => &[
                Self::Open,
                Self::WarningNeedsResponse,
                Self::NeedsResponse,
                Self::Won,
                Self::Lost,
                Self::Closed,
            ],
            Self::WarningNeedsResponse => &[
                Self::Open,
                Self::UnderReview,
                Self::NeedsResponse,
                Self::Won,
                Self::Lost,
                Self::Closed,
            ],
            Self::NeedsResponse => &[
                Self::Open,
                Self::UnderReview,
                Self::WarningNeedsResponse,
                Self::Won,
                Self::Lost,
                Self::Closed,
            ],
            Self::Won | Self::Lost | Self::Closed => &[],
        }
    }

    /// Whether a transition to `target` is allowed from this status.
    pub fn can_transition_to(&self, target: DisputeStatus) -> bool {
        self.valid_transitions().contains(&target)
    }

    /// Parse a canonical status name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OPEN" => Some(Self::Open),
            "UNDER_REVIEW" => Some(Self::UnderReview),
            "WARNING_NEEDS_RESPONSE" => Some(Self::WarningNeedsResponse),
            "NEEDS_RESPONSE" => Some(Self::NeedsResponse),
            "WON" => Some(Self::Won),
            "LOST" => Some(Self::Lost),
            "CLOSED" => Some(Self::Closed),
            _ => None,
        }
    }
}

impl std::fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTIVE: [DisputeStatus; 4] = [
        DisputeStatus::Open,
        DisputeStatus::UnderReview,
        DisputeStatus::WarningNeedsResponse,
        DisputeStatus::NeedsResponse,
    ];

    const TERMINAL: [DisputeStatus; 3] =
        [DisputeStatus::Won, DisputeStatus::Lost, DisputeStatus::Closed];

    #[test]
    fn active_states_are_mutually_reachable() {
        for from in ACTIVE {
            for to in ACTIVE {
                if from != to {
                    assert!(from.can_transition_to(to), "{from} -> {to} should be valid");
                }
            }
        }
    }

    #[test]
    fn every_active_state_can_terminate() {
        for from in ACTIVE {
            for to in TERMINAL {
                assert!(from.can_transition_to(to), "{from} -> {to} should be valid");
            }
        }
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for from in TERMINAL {
            assert!(from.is_terminal());
            assert!(from.valid_transitions().is_empty());
            // Not even a self-transition.
            assert!(!from.can_transition_to(from));
        }
    }

    #[test]
    fn self_transition_is_invalid() {
        for status in ACTIVE {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn wire_names_are_screaming_snake() {
        assert_eq!(DisputeStatus::WarningNeedsResponse.as_str(), "WARNING_NEEDS_RESPONSE");
        assert_eq!(
            serde_json::to_string(&DisputeStatus::NeedsResponse).unwrap(),
            "\"NEEDS_RESPONSE\""
        );
    }
}
