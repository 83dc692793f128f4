//! The flow state machine: pure transition logic with no I/O (spec §4.11
//! / C11). [`crate::manager::FlowManager`] is the only caller; this
//! module never touches a session store, generator, or LLM adapter.

use financebuddy_core::SessionStep;
use serde::{Deserialize, Serialize};

use crate::error::FlowError;

/// An action a caller can request against a session's current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowAction {
    GenerateQuestions,
    RevealAnswers,
    ShowExplanations,
    AskFollowup,
    ContinueFollowup,
    Restart,
    Clear,
}

/// Where an action leads: either a normal step transition, or the
/// session ceasing to exist (spec §4.11: `any, clear, (deleted)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The session moves to this step.
    To(SessionStep),
    /// The session is deleted.
    Deleted,
}

/// The result of [`validate_action`]: whether the action is legal from
/// `step`, and (whether legal or not) the full set of actions that are.
/// This is the single source of truth a UI should render its available
/// buttons from (spec §4.11: "the single source of truth for UIs").
#[derive(Debug, Clone)]
pub struct ValidateResult {
    pub valid: bool,
    pub allowed_actions: Vec<FlowAction>,
    pub error: Option<String>,
}

/// The actions legal from `step` (spec §4.11 table, `restart`/`clear`
/// allowed from any step).
#[must_use]
pub fn allowed_actions(step: SessionStep) -> Vec<FlowAction> {
    let mut actions = match step {
        SessionStep::Input => vec![FlowAction::GenerateQuestions],
        SessionStep::Questions => vec![FlowAction::RevealAnswers],
        SessionStep::Answers => vec![FlowAction::ShowExplanations],
        SessionStep::Explanations => vec![FlowAction::AskFollowup],
        SessionStep::Followup => vec![FlowAction::ContinueFollowup],
    };
    actions.push(FlowAction::Restart);
    actions.push(FlowAction::Clear);
    actions
}

/// Check whether `action` is legal from `step`, returning the allowed set
/// either way (spec §4.11: `validateAction(step, action)`).
#[must_use]
pub fn validate_action(step: SessionStep, action: FlowAction) -> ValidateResult {
    let allowed = allowed_actions(step);
    let valid = allowed.contains(&action);
    ValidateResult {
        valid,
        error: (!valid).then(|| format!("{action:?} is not a valid action from step {step:?}")),
        allowed_actions: allowed,
    }
}

/// Apply `action` to `step`, producing the resulting [`Transition`].
///
/// # Errors
///
/// Returns [`FlowError::InvalidTransition`] carrying the allowed-action
/// set if `action` is not legal from `step` (spec §8 invariant 5:
/// `validateAction(step, a).valid <=> a in allowedActions(step)`).
pub fn apply(step: SessionStep, action: FlowAction) -> Result<Transition, FlowError> {
    let result = validate_action(step, action);
    if !result.valid {
        return Err(FlowError::InvalidTransition {
            attempted: action,
            allowed: result.allowed_actions,
        });
    }

    Ok(match action {
        FlowAction::GenerateQuestions => Transition::To(SessionStep::Questions),
        FlowAction::RevealAnswers => Transition::To(SessionStep::Answers),
        FlowAction::ShowExplanations => Transition::To(SessionStep::Explanations),
        FlowAction::AskFollowup | FlowAction::ContinueFollowup => Transition::To(SessionStep::Followup),
        FlowAction::Restart => Transition::To(SessionStep::Input),
        FlowAction::Clear => Transition::Deleted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_step_only_allows_generate_questions_restart_and_clear() {
        let allowed = allowed_actions(SessionStep::Input);
        assert!(allowed.contains(&FlowAction::GenerateQuestions));
        assert!(allowed.contains(&FlowAction::Restart));
        assert!(allowed.contains(&FlowAction::Clear));
        assert!(!allowed.contains(&FlowAction::RevealAnswers));
    }

    #[test]
    fn validate_action_agrees_with_allowed_actions() {
        for step in [
            SessionStep::Input,
            SessionStep::Questions,
            SessionStep::Answers,
            SessionStep::Explanations,
            SessionStep::Followup,
        ] {
            for action in [
                FlowAction::GenerateQuestions,
                FlowAction::RevealAnswers,
                FlowAction::ShowExplanations,
                FlowAction::AskFollowup,
                FlowAction::ContinueFollowup,
                FlowAction::Restart,
                FlowAction::Clear,
            ] {
                let result = validate_action(step, action);
                assert_eq!(result.valid, allowed_actions(step).contains(&action));
            }
        }
    }

    #[test]
    fn invalid_transition_reports_allowed_actions() {
        let err = apply(SessionStep::Input, FlowAction::RevealAnswers).unwrap_err();
        match err {
            FlowError::InvalidTransition { allowed, .. } => {
                assert!(allowed.contains(&FlowAction::GenerateQuestions));
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
    }

    #[test]
    fn restart_and_clear_are_legal_from_every_step() {
        for step in [
            SessionStep::Input,
            SessionStep::Questions,
            SessionStep::Answers,
            SessionStep::Explanations,
            SessionStep::Followup,
        ] {
            assert_eq!(apply(step, FlowAction::Restart).unwrap(), Transition::To(SessionStep::Input));
            assert_eq!(apply(step, FlowAction::Clear).unwrap(), Transition::Deleted);
        }
    }

    #[test]
    fn restart_then_allowed_actions_match_input_state() {
        let transition = apply(SessionStep::Followup, FlowAction::Restart).unwrap();
        let Transition::To(new_step) = transition else {
            panic!("restart must transition, not delete");
        };
        assert_eq!(allowed_actions(new_step), allowed_actions(SessionStep::Input));
    }
}
