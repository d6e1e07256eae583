// core/src/flow/control.rs

//! Signals for controlling pipeline flow and the outcome of a run.

/// Returned by a handler to continue with the next handler or to halt the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  Continue,
  /// Halt immediately. Later handlers and steps do not run.
  Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every step ran or was skipped.
  Completed,
  /// A handler returned [`PipelineControl::Stop`].
  Stopped,
}
