//! Iteration state machine.
//!
//! `Initializing → Iterating → {Converged | MaxIterationsReached} → Done`

use ce_core::{Error, Result, TerminationReason};

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Configuration accepted, no iteration started.
    Initializing,
    /// An iteration is running or the loop may continue.
    Iterating,
    /// The stop predicate held after the minimum number of iterations.
    Converged,
    /// The iteration ceiling was hit.
    MaxIterationsReached,
    /// Results handed over.
    Done,
}

/// Tracks the iteration counter and decides when the loop ends.
#[derive(Debug, Clone)]
pub struct ConvergenceController {
    min_iterations: usize,
    max_iterations: usize,
    iteration: usize,
    state: ControllerState,
    termination: Option<TerminationReason>,
}

impl ConvergenceController {
    /// Controller for `0 < min_iterations <= max_iterations`.
    pub fn new(min_iterations: usize, max_iterations: usize) -> Result<Self> {
        if min_iterations == 0 || min_iterations > max_iterations {
            return Err(Error::Validation(format!(
                "iteration bounds must satisfy 0 < min_iterations ({}) <= max_iterations ({})",
                min_iterations, max_iterations
            )));
        }
        Ok(Self {
            min_iterations,
            max_iterations,
            iteration: 0,
            state: ControllerState::Initializing,
            termination: None,
        })
    }

    /// Current state.
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Number of iterations started so far (the 1-based index of the running one).
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Whether another iteration may start.
    pub fn should_continue(&self) -> bool {
        matches!(self.state, ControllerState::Initializing | ControllerState::Iterating)
    }

    /// Enter a new iteration and return its 1-based index.
    pub fn begin_iteration(&mut self) -> Result<usize> {
        if !self.should_continue() {
            return Err(Error::Computation(format!(
                "cannot start an iteration in state {:?}",
                self.state
            )));
        }
        self.iteration += 1;
        self.state = ControllerState::Iterating;
        Ok(self.iteration)
    }

    /// Close the running iteration given the stop predicate's verdict.
    ///
    /// Convergence wins when both the predicate holds and the ceiling is hit.
    pub fn end_iteration(&mut self, stop: bool) -> ControllerState {
        if self.state != ControllerState::Iterating {
            return self.state;
        }
        if self.iteration >= self.min_iterations && stop {
            self.state = ControllerState::Converged;
            self.termination = Some(TerminationReason::Converged);
        } else if self.iteration >= self.max_iterations {
            self.state = ControllerState::MaxIterationsReached;
            self.termination = Some(TerminationReason::MaxIterationsReached);
        }
        self.state
    }

    /// Move to `Done` and report why the loop ended.
    pub fn finish(&mut self) -> Result<TerminationReason> {
        let reason = self.termination.ok_or_else(|| {
            Error::Computation(format!("iteration loop finished in state {:?}", self.state))
        })?;
        self.state = ControllerState::Done;
        Ok(reason)
    }
}
