//! The progressive disclosure engine.
//!
//! Everything that moves on the page is owned here: one-shot visibility
//! observers, deferred images, entrance reveals, the mobile menu and the
//! contact form. The engine never touches a DOM. It consumes discrete
//! [`Event`]s and answers with [`Effect`]s for a host to apply: the wasm
//! binding in `web` against a real document, or the headless driver in
//! `simulate` against a geometric model.
//!
//! ```text
//!             ┌──────────────┐   Event    ┌──────────┐
//!  host  ───► │ Page::handle │ ─────────► │ managers │
//!             └──────────────┘            └──────────┘
//!                    │ Vec<Effect>
//!                    ▼
//!  host applies: observe / disconnect / restyle / render / scroll / timers
//! ```
//!
//! Execution is single-threaded and run-to-completion: each event is fully
//! processed before the next one is looked at, so the managers need no
//! locking. Anything that waits (image fetch, simulated submission, stage
//! animations) does so by asking the host for a timer or a callback.
//!
//! | Module | Role |
//! |--------|------|
//! | [`geometry`] | Rectangles, viewport, observation margins |
//! | [`observer`] | One-shot visibility signal per element |
//! | [`lazy_image`] | Deferred image fetch with placeholder crossfade |
//! | [`reveal`] | Hidden → visible entrance poses, stagger |
//! | [`presence`] | Exit-then-enter choreography for swapped subtrees |
//! | [`menu`] | Mobile menu state machine |
//! | [`form`] | Contact form state machine |
//! | [`navigator`] | Anchor navigation with smooth scroll |
//! | [`page`] | Aggregate runtime wiring all of the above |

pub mod form;
pub mod geometry;
pub mod lazy_image;
pub mod menu;
pub mod navigator;
pub mod observer;
pub mod page;
pub mod presence;
pub mod reveal;

pub use form::{ContactForm, FormEvent, FormState, FormView};
pub use geometry::{Margin, Rect, Viewport};
pub use lazy_image::{LazyImage, LazyResource, LoadPhase};
pub use menu::{MenuAction, MenuState, MobileMenu};
pub use observer::{ObservedElement, ObserverCommand, ObserverId, VisibilityObserver};
pub use page::{Blueprint, EngineSettings, Page};
pub use presence::{Change, Presence, Stage};
pub use reveal::{AnimatedElement, Pose, RevealSpec, Timing, Trigger};

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Handle to one element the engine manages.
///
/// Rendered into markup as `data-node="n7"` so a host can find the element
/// again. Ids are allocated deterministically from content order, which lets
/// the build step and the browser runtime agree on them without coordination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix('n').unwrap_or(s).parse().map(NodeId)
    }
}

/// Whether the platform offers viewport intersection tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capability {
    #[default]
    Available,
    /// No intersection primitive: every observed element counts as visible
    /// the moment it is observed.
    Unavailable,
}

/// Anchor lookup in the current document.
pub trait Document {
    /// True if an element with this `id` attribute exists.
    fn has_element(&self, id: &str) -> bool;
}

impl Document for [&str] {
    fn has_element(&self, id: &str) -> bool {
        self.iter().any(|candidate| *candidate == id)
    }
}

impl<const N: usize> Document for [&str; N] {
    fn has_element(&self, id: &str) -> bool {
        self.iter().any(|candidate| *candidate == id)
    }
}

impl Document for BTreeSet<String> {
    fn has_element(&self, id: &str) -> bool {
        self.contains(id)
    }
}

/// A timer the engine asked the host to start.
///
/// The host hands the same value back in [`Event::TimerFired`] when it
/// elapses. Timers are never cancelled; each one carries a token the owning
/// manager checks, so a stale timer is simply ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Simulated network latency of the contact form.
    SubmitCompletion { generation: u64 },
    /// End of an enter or exit stage of the presence region at `node`.
    StageEnd { node: NodeId, epoch: u64 },
}

/// Input to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The platform reported an intersection change for one observer.
    Intersection {
        observer: ObserverId,
        is_intersecting: bool,
    },
    /// The image inside the lazy frame at `node` finished loading.
    ImageLoaded { node: NodeId },
    /// The image inside the lazy frame at `node` failed to load.
    ImageFailed { node: NodeId },
    /// The mobile menu button was clicked.
    MenuToggled,
    /// A navigation link or button targeting an anchor was clicked.
    NavClicked { target: String },
    /// The contact form was submitted.
    FormSubmitted,
    /// "Send another message" on the success panel.
    ResetRequested,
    TimerFired(Timer),
}

/// Instruction for the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Start watching `node` with its own observer instance.
    Observe {
        observer: ObserverId,
        node: NodeId,
        margin: Margin,
    },
    /// Stop watching and drop the observer instance.
    Disconnect { observer: ObserverId },
    /// Replace the inline style of `node`.
    Restyle { node: NodeId, style: String },
    /// Set (`Some`) or remove (`None`) an attribute on `node`.
    SetAttribute {
        node: NodeId,
        name: &'static str,
        value: Option<String>,
    },
    /// Re-render the children of `node` from current state.
    Render { node: NodeId },
    /// Suppress the browser default for the event being handled.
    PreventDefault,
    /// Smoothly scroll the element with this id into view.
    ScrollIntoView { target: String },
    StartTimer { timer: Timer, delay: Duration },
    /// Clear the user-entered values of the form at `node`.
    ResetFields { node: NodeId },
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Observe {
                observer,
                node,
                margin,
            } => write!(f, "observe {node} via {observer} (margin {})", margin.to_css()),
            Effect::Disconnect { observer } => write!(f, "disconnect {observer}"),
            Effect::Restyle { node, style } => write!(f, "restyle {node}: {style}"),
            Effect::SetAttribute {
                node,
                name,
                value: Some(value),
            } => write!(f, "set {node}[{name}={value:?}]"),
            Effect::SetAttribute {
                node,
                name,
                value: None,
            } => write!(f, "remove {node}[{name}]"),
            Effect::Render { node } => write!(f, "render {node}"),
            Effect::PreventDefault => write!(f, "prevent default"),
            Effect::ScrollIntoView { target } => write!(f, "scroll to #{target}"),
            Effect::StartTimer { timer, delay } => {
                write!(f, "start timer {timer:?} ({}ms)", delay.as_millis())
            }
            Effect::ResetFields { node } => write!(f, "reset fields of {node}"),
        }
    }
}
