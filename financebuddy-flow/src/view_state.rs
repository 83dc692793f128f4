//! The externally observable view state a [`crate::manager::FlowManager`]
//! publishes on every change (spec §4.12, GLOSSARY "view state").

use financebuddy_core::{Session, SessionStep};

use crate::controller::{allowed_actions, FlowAction};

/// A snapshot of a session's flow state, safe to hand to a UI layer.
///
/// Published synchronously to every subscriber on each state change
/// (spec §5: "ordering guarantees... delivered in the order state
/// changes occur, synchronously within the action's task").
#[derive(Debug, Clone)]
pub struct ViewState {
    pub current_step: SessionStep,
    pub progress: u8,
    pub step_description: &'static str,
    pub is_loading: bool,
    pub error: Option<String>,
    pub allowed_actions: Vec<FlowAction>,
    pub session: Option<Session>,
}

impl ViewState {
    /// Build a view state reflecting `session`'s current step.
    #[must_use]
    pub fn for_session(session: Session, is_loading: bool, error: Option<String>) -> Self {
        let step = session.current_step;
        Self {
            current_step: step,
            progress: step.progress(),
            step_description: step_description(step),
            is_loading,
            error,
            allowed_actions: allowed_actions(step),
            session: Some(session),
        }
    }

    /// Build a view state for a session that no longer exists (spec
    /// §4.11: the `clear` action deletes it), resetting to the `input`
    /// step's allowed actions as a fresh-start surface.
    #[must_use]
    pub fn cleared() -> Self {
        Self {
            current_step: SessionStep::Input,
            progress: SessionStep::Input.progress(),
            step_description: step_description(SessionStep::Input),
            is_loading: false,
            error: None,
            allowed_actions: allowed_actions(SessionStep::Input),
            session: None,
        }
    }
}

fn step_description(step: SessionStep) -> &'static str {
    match step {
        SessionStep::Input => "Select a topic to begin",
        SessionStep::Questions => "Answer the generated questions",
        SessionStep::Answers => "Review your revealed answers",
        SessionStep::Explanations => "Read grounded explanations for each question",
        SessionStep::Followup => "Ask follow-up questions about this topic",
    }
}
