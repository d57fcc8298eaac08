//! Run lifecycle of the server-side analysis

use serde::{Deserialize, Serialize};

/// Shown when the server fails a run without saying why
pub const GENERIC_FAILURE: &str = "Analysis failed";

/// Phase of the current analysis run
///
/// Within a run: `Idle → Analyzing → {Completed | Error}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalysisPhase {
    #[default]
    Idle,
    Analyzing,
    Completed,
    Error,
}

impl AnalysisPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, AnalysisPhase::Completed | AnalysisPhase::Error)
    }

    /// A run may start from `Idle` or a terminal phase
    pub fn can_start(self) -> bool {
        self == AnalysisPhase::Idle || self.is_terminal()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisState {
    pub phase: AnalysisPhase,
    pub status_text: String,
    pub error_message: Option<String>,
    /// Server sub-stage tag carried by `status` messages
    pub stage: Option<String>,
}

impl AnalysisState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The busy flag: a run is in flight
    pub fn is_busy(&self) -> bool {
        self.phase == AnalysisPhase::Analyzing
    }

    /// Enter `Analyzing`. Returns `false` and changes nothing when a run is
    /// already in flight.
    pub fn begin(&mut self) -> bool {
        if !self.phase.can_start() {
            return false;
        }
        self.phase = AnalysisPhase::Analyzing;
        self.status_text = "Starting analysis...".to_string();
        self.error_message = None;
        self.stage = None;
        true
    }

    pub fn set_status(&mut self, text: impl Into<String>, stage: Option<String>) {
        self.status_text = text.into();
        if stage.is_some() {
            self.stage = stage;
        }
    }

    /// Enter `Completed` regardless of the current phase
    pub fn complete(&mut self) {
        self.phase = AnalysisPhase::Completed;
        self.status_text = "Analysis completed".to_string();
        self.error_message = None;
    }

    /// Enter `Error` regardless of the current phase and return the message
    /// that was recorded. Blank messages fall back to [`GENERIC_FAILURE`].
    pub fn fail(&mut self, message: Option<String>) -> &str {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());
        self.phase = AnalysisPhase::Error;
        self.status_text = format!("Error: {message}");
        self.error_message.insert(message).as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_is_guarded() {
        let mut state = AnalysisState::new();
        assert_eq!(state.phase, AnalysisPhase::Idle);
        assert!(state.begin());
        assert!(state.is_busy());

        state.set_status("Agents discussing", Some("agents_discussing".to_string()));
        assert!(!state.begin());
        assert_eq!(state.status_text, "Agents discussing");
        assert_eq!(state.stage.as_deref(), Some("agents_discussing"));
    }

    #[test]
    fn test_restart_from_terminal_phases() {
        let mut state = AnalysisState::new();
        state.begin();
        state.complete();
        assert!(state.phase.is_terminal());
        assert!(state.begin());

        state.fail(Some("boom".to_string()));
        assert!(state.begin());
        assert!(state.error_message.is_none());
        assert!(state.stage.is_none());
    }

    #[test]
    fn test_only_analyzing_blocks_a_start() {
        assert!(AnalysisPhase::Idle.can_start());
        assert!(AnalysisPhase::Completed.can_start());
        assert!(AnalysisPhase::Error.can_start());
        assert!(!AnalysisPhase::Analyzing.can_start());
        assert!(!AnalysisPhase::Analyzing.is_terminal());
    }

    #[test]
    fn test_fail_fallback_message() {
        let mut state = AnalysisState::new();
        state.begin();
        assert_eq!(state.fail(None), GENERIC_FAILURE);
        assert_eq!(state.fail(Some(" ".to_string())), GENERIC_FAILURE);
        assert_eq!(state.fail(Some("HTTP 500".to_string())), "HTTP 500");
        assert_eq!(state.phase, AnalysisPhase::Error);
    }

    #[test]
    fn test_terminal_transitions_are_last_write_wins() {
        let mut state = AnalysisState::new();
        state.begin();
        state.fail(None);
        state.complete();
        assert_eq!(state.phase, AnalysisPhase::Completed);
        assert!(state.error_message.is_none());
    }
}
