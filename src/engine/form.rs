//! Contact form state.
//!
//! ```text
//!   idle ──submit──► submitting ──completed──► success
//!    ▲                                            │
//!    └──────────────── reset_requested ───────────┘
//! ```
//!
//! Submission is simulated: entering `submitting` asks for a timer, and the
//! timer's firing stands in for the network round trip. Any request not in
//! the table above is a no-op. In particular a second submit while one is in
//! flight is rejected; the form is committed once `submitting` is entered,
//! and the submit control renders disabled until it leaves that state.
//!
//! Each accepted submit bumps a generation that the completion timer
//! carries. Tearing the form down bumps it once more, so a completion that
//! fires afterwards finds a stale generation and does nothing.
//!
//! The fields and the success panel are two branches of one presence
//! region: the fields exit before the success panel enters, and back again
//! on reset.

use super::presence::{Change, Presence};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormState {
    #[default]
    Idle,
    Submitting,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    Submit,
    Completed,
    ResetRequested,
}

impl FormState {
    /// `None` when `event` is not a valid transition from `self`.
    pub fn next(self, event: FormEvent) -> Option<FormState> {
        match (self, event) {
            (FormState::Idle, FormEvent::Submit) => Some(FormState::Submitting),
            (FormState::Submitting, FormEvent::Completed) => Some(FormState::Success),
            (FormState::Success, FormEvent::ResetRequested) => Some(FormState::Idle),
            _ => None,
        }
    }

    pub fn view(self) -> FormView {
        match self {
            FormState::Success => FormView::Success,
            FormState::Idle | FormState::Submitting => FormView::Fields,
        }
    }
}

/// The two mutually exclusive renderings of the contact panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormView {
    Fields,
    Success,
}

#[derive(Debug, Clone)]
pub struct ContactForm {
    state: FormState,
    generation: u64,
    view: Presence<FormView>,
}

impl Default for ContactForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactForm {
    pub fn new() -> Self {
        Self {
            state: FormState::Idle,
            generation: 0,
            view: Presence::with(FormView::Fields),
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn view(&self) -> &Presence<FormView> {
        &self.view
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_busy(&self) -> bool {
        self.state == FormState::Submitting
    }

    fn transition(&mut self, event: FormEvent) -> bool {
        match self.state.next(event) {
            Some(next) => {
                debug!(from = ?self.state, to = ?next, ?event, "form transition");
                self.state = next;
                true
            }
            None => {
                debug!(state = ?self.state, ?event, "form event ignored");
                false
            }
        }
    }

    /// Accept a submit. Returns the generation the completion timer must
    /// carry, or `None` if the submit was rejected.
    pub fn submit(&mut self) -> Option<u64> {
        if !self.transition(FormEvent::Submit) {
            return None;
        }
        self.generation += 1;
        Some(self.generation)
    }

    /// The simulated round trip for `generation` finished. `None` if it was
    /// stale or the form was not submitting.
    pub fn complete(&mut self, generation: u64) -> Option<Change<FormView>> {
        if generation != self.generation {
            debug!(generation, current = self.generation, "stale completion ignored");
            return None;
        }
        if !self.transition(FormEvent::Completed) {
            return None;
        }
        Some(self.view.request(Some(FormView::Success)))
    }

    pub fn request_reset(&mut self) -> Option<Change<FormView>> {
        if !self.transition(FormEvent::ResetRequested) {
            return None;
        }
        Some(self.view.request(Some(FormView::Fields)))
    }

    pub fn view_stage_ended(&mut self, epoch: u64) -> Change<FormView> {
        self.view.stage_ended(epoch)
    }

    /// Invalidate any completion still in flight.
    pub fn teardown(&mut self) {
        self.generation += 1;
    }
}
