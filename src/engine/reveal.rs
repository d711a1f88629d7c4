//! Entrance animations.
//!
//! An animated element sits at its hidden pose until triggered, then moves
//! to its resting pose through a CSS transition. The trigger is either the
//! element's own visibility observer or, for above-the-fold content, the
//! mount itself. Once revealed an element stays revealed: scrolling it out
//! and back in does not replay anything.
//!
//! Collections cascade: member `i` starts `i * increment` after the trigger,
//! keyed by its position in the collection, not by the order in which the
//! members happened to become visible.

use super::NodeId;
use super::geometry::Margin;
use super::observer::ObserverId;
use std::time::Duration;

/// Offset, opacity and scale of an element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub opacity: f64,
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Pose {
    pub const RESTING: Pose = Pose {
        opacity: 1.0,
        x: 0.0,
        y: 0.0,
        scale: 1.0,
    };

    /// Transparent, pushed down by `offset` pixels.
    pub const fn below(offset: f64) -> Pose {
        Pose {
            opacity: 0.0,
            x: 0.0,
            y: offset,
            scale: 1.0,
        }
    }

    /// Transparent, shifted horizontally by `offset` pixels (negative = left).
    pub const fn beside(offset: f64) -> Pose {
        Pose {
            opacity: 0.0,
            x: offset,
            y: 0.0,
            scale: 1.0,
        }
    }

    pub fn css(&self) -> String {
        format!(
            "opacity:{};transform:translate({}px,{}px) scale({})",
            self.opacity, self.x, self.y, self.scale
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub duration: Duration,
    pub delay: Duration,
}

impl Timing {
    pub const fn new(duration: Duration, delay: Duration) -> Self {
        Self { duration, delay }
    }

    pub fn transition_css(&self) -> String {
        let d = self.duration.as_millis();
        let delay = self.delay.as_millis();
        format!("transition:opacity {d}ms ease-out {delay}ms,transform {d}ms ease-out {delay}ms")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    /// Reveal as soon as the page mounts.
    Mount,
    /// Reveal when the element comes within `Margin` of the viewport.
    Visible(Margin),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealSpec {
    pub hidden: Pose,
    pub visible: Pose,
    pub timing: Timing,
    pub trigger: Trigger,
}

impl RevealSpec {
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.timing.delay = delay;
        self
    }
}

/// Start offset of member `index` in a collection.
pub fn stagger(index: usize, increment: Duration) -> Duration {
    increment.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX))
}

/// `count` copies of `base` with delays `0, d, 2d, …`.
pub fn staggered(base: RevealSpec, count: usize, increment: Duration) -> Vec<RevealSpec> {
    (0..count)
        .map(|i| base.with_delay(stagger(i, increment)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    Hidden,
    Revealed,
}

#[derive(Debug, Clone)]
pub struct AnimatedElement {
    node: NodeId,
    spec: RevealSpec,
    phase: RevealPhase,
    observer: Option<ObserverId>,
}

impl AnimatedElement {
    pub fn new(node: NodeId, spec: RevealSpec) -> Self {
        Self {
            node,
            spec,
            phase: RevealPhase::Hidden,
            observer: None,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn spec(&self) -> &RevealSpec {
        &self.spec
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn is_in_view(&self) -> bool {
        self.phase == RevealPhase::Revealed
    }

    pub fn observer(&self) -> Option<ObserverId> {
        self.observer
    }

    pub(crate) fn attach(&mut self, observer: ObserverId) {
        self.observer = Some(observer);
    }

    /// Returns true the first time only.
    pub fn reveal(&mut self) -> bool {
        if self.phase == RevealPhase::Revealed {
            return false;
        }
        self.phase = RevealPhase::Revealed;
        true
    }

    pub fn pose(&self) -> Pose {
        match self.phase {
            RevealPhase::Hidden => self.spec.hidden,
            RevealPhase::Revealed => self.spec.visible,
        }
    }

    /// How long after the trigger the transition starts.
    pub fn start_offset(&self) -> Duration {
        self.spec.timing.delay
    }

    /// Inline style for the current phase.
    pub fn style(&self) -> String {
        format!("{};{}", self.pose().css(), self.spec.timing.transition_css())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> RevealSpec {
        RevealSpec {
            hidden: Pose::below(30.0),
            visible: Pose::RESTING,
            timing: Timing::new(Duration::from_millis(500), Duration::ZERO),
            trigger: Trigger::Visible(Margin::ZERO),
        }
    }

    #[test]
    fn pose_css() {
        assert_eq!(
            Pose::below(30.0).css(),
            "opacity:0;transform:translate(0px,30px) scale(1)"
        );
        assert_eq!(
            Pose::beside(-50.0).css(),
            "opacity:0;transform:translate(-50px,0px) scale(1)"
        );
    }

    #[test]
    fn transition_css_carries_delay() {
        let timing = Timing::new(Duration::from_millis(500), Duration::from_millis(200));
        assert_eq!(
            timing.transition_css(),
            "transition:opacity 500ms ease-out 200ms,transform 500ms ease-out 200ms"
        );
    }

    #[test]
    fn hidden_until_revealed() {
        let mut el = AnimatedElement::new(NodeId::new(1), spec());
        assert_eq!(el.pose(), Pose::below(30.0));
        assert!(el.style().starts_with("opacity:0;"));
        assert!(el.reveal());
        assert_eq!(el.pose(), Pose::RESTING);
        assert!(el.style().starts_with("opacity:1;"));
    }

    #[test]
    fn reveal_is_one_shot() {
        let mut el = AnimatedElement::new(NodeId::new(1), spec());
        assert!(el.reveal());
        assert!(!el.reveal());
        assert_eq!(el.phase(), RevealPhase::Revealed);
    }

    #[test]
    fn stagger_is_proportional() {
        let d = Duration::from_millis(100);
        assert_eq!(stagger(0, d), Duration::ZERO);
        assert_eq!(stagger(1, d), Duration::from_millis(100));
        assert_eq!(stagger(5, d), Duration::from_millis(500));
    }

    #[test]
    fn staggered_collection_offsets() {
        let specs = staggered(spec(), 3, Duration::from_millis(100));
        let delays: Vec<u128> = specs.iter().map(|s| s.timing.delay.as_millis()).collect();
        assert_eq!(delays, vec![0, 100, 200]);
    }
}
