//! Exit code logic for the scidb process.
//!
//! Single responsibility: map the terminal batch state to the process exit outcome.

use scidb_core::BatchState;

use crate::ProcessExit;

/// Determines the process exit outcome from the state a batch ended in.
pub(crate) fn determine_exit_outcome(state: BatchState) -> ProcessExit {
    match state {
        BatchState::Aborted => ProcessExit::Aborted,
        BatchState::Idle | BatchState::Running | BatchState::Completed => ProcessExit::Success,
    }
}
