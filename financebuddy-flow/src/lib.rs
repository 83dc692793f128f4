//! Session flow state machine and orchestrator (spec §4.11-§4.12 / C11-C12).
//!
//! [`controller`] is a pure, I/O-free state machine; [`manager::FlowManager`]
//! drives it, injecting question/explanation generation and follow-up LLM
//! calls, and publishes [`view_state::ViewState`] snapshots to subscribers.

pub mod controller;
pub mod error;
pub mod manager;
pub mod view_state;

pub use controller::{allowed_actions, apply, validate_action, FlowAction, Transition, ValidateResult};
pub use error::{FlowError, Result};
pub use manager::{FlowManager, SubscriptionId};
pub use view_state::ViewState;
