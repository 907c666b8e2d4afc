use serde::{Deserialize, Serialize};
use tracing::debug;

/// Lifecycle of a single evaluation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationPhase {
    Idle,
    Fetching,
    Computing,
    Done,
    Errored,
}

impl EvaluationPhase {
    pub fn can_transition_to(self, next: EvaluationPhase) -> bool {
        use EvaluationPhase::*;
        matches!(
            (self, next),
            (Idle, Fetching)
                | (Idle, Errored)
                | (Fetching, Computing)
                | (Fetching, Errored)
                | (Computing, Done)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, EvaluationPhase::Done | EvaluationPhase::Errored)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhaseError {
    #[error("evaluation cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        from: EvaluationPhase,
        to: EvaluationPhase,
    },
}

/// Ordered record of the phases one evaluation passed through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTrail {
    phases: Vec<EvaluationPhase>,
}

impl Default for PhaseTrail {
    fn default() -> Self {
        Self {
            phases: vec![EvaluationPhase::Idle],
        }
    }
}

impl PhaseTrail {
    pub fn current(&self) -> EvaluationPhase {
        self.phases
            .last()
            .copied()
            .unwrap_or(EvaluationPhase::Idle)
    }

    pub fn advance(&mut self, next: EvaluationPhase) -> Result<(), PhaseError> {
        let current = self.current();
        if !current.can_transition_to(next) {
            return Err(PhaseError::InvalidTransition {
                from: current,
                to: next,
            });
        }
        debug!(from = ?current, to = ?next, "evaluation phase");
        self.phases.push(next);
        Ok(())
    }

    pub fn phases(&self) -> &[EvaluationPhase] {
        &self.phases
    }

    pub fn into_phases(self) -> Vec<EvaluationPhase> {
        self.phases
    }
}
