//! One-shot visibility observation.
//!
//! Each watched element gets its own observer instance with its own margin.
//! The first intersecting report fires the element's signal and releases
//! the subscription immediately; nothing is ever reported twice for the same
//! mount. Unmounting before that point releases the subscription too, so
//! there is exactly one subscribe/unsubscribe pair per element per mount.
//!
//! When the platform has no intersection primitive the observer fails open:
//! the element is treated as visible the moment it is observed, and no
//! subscription is made at all. Content must never stay hidden because a
//! capability is missing.

use super::geometry::Margin;
use super::{Capability, NodeId};
use std::fmt;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u32);

impl ObserverId {
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "o{}", self.0)
    }
}

/// Subscription bookkeeping the host has to mirror.
#[derive(Debug, Clone, PartialEq)]
pub enum ObserverCommand {
    Subscribe {
        observer: ObserverId,
        node: NodeId,
        margin: Margin,
    },
    Unsubscribe {
        observer: ObserverId,
    },
}

/// One element being watched.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedElement {
    pub node: NodeId,
    pub margin: Margin,
    /// Set the first time the element comes near the viewport. Never cleared.
    pub has_fired: bool,
    subscribed: bool,
}

impl ObservedElement {
    /// True while a platform subscription is held for this element.
    pub fn is_watching(&self) -> bool {
        self.subscribed
    }
}

/// Registry of per-element observers.
#[derive(Debug)]
pub struct VisibilityObserver {
    capability: Capability,
    elements: Vec<ObservedElement>,
    outbox: Vec<ObserverCommand>,
    subscribed: usize,
    released: usize,
}

impl VisibilityObserver {
    pub fn new(capability: Capability) -> Self {
        Self {
            capability,
            elements: Vec::new(),
            outbox: Vec::new(),
            subscribed: 0,
            released: 0,
        }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Start watching `node`. Returns the id of the new observer instance.
    ///
    /// With [`Capability::Unavailable`] the element fires on the spot; check
    /// [`has_fired`](Self::has_fired) right after calling this.
    pub fn observe(&mut self, node: NodeId, margin: Margin) -> ObserverId {
        let id = ObserverId(self.elements.len() as u32);
        match self.capability {
            Capability::Available => {
                self.elements.push(ObservedElement {
                    node,
                    margin,
                    has_fired: false,
                    subscribed: true,
                });
                self.subscribed += 1;
                self.outbox.push(ObserverCommand::Subscribe {
                    observer: id,
                    node,
                    margin,
                });
                trace!(%id, %node, margin = margin.value(), "observing");
            }
            Capability::Unavailable => {
                debug!(%id, %node, "no intersection support, treating as visible");
                self.elements.push(ObservedElement {
                    node,
                    margin,
                    has_fired: true,
                    subscribed: false,
                });
            }
        }
        id
    }

    /// Feed one platform report. Returns true only for the report that fires
    /// the element's signal.
    pub fn notify(&mut self, id: ObserverId, is_intersecting: bool) -> bool {
        let Some(element) = self.elements.get_mut(id.0 as usize) else {
            debug!(%id, "report for unknown observer ignored");
            return false;
        };
        if !element.subscribed {
            trace!(%id, "report after release ignored");
            return false;
        }
        if !is_intersecting {
            return false;
        }
        element.has_fired = true;
        element.subscribed = false;
        self.released += 1;
        self.outbox.push(ObserverCommand::Unsubscribe { observer: id });
        debug!(%id, node = %element.node, "element came into view");
        true
    }

    /// Release the subscription because the element went away. Returns true
    /// if a subscription was actually held.
    pub fn release(&mut self, id: ObserverId) -> bool {
        match self.elements.get_mut(id.0 as usize) {
            Some(element) if element.subscribed => {
                element.subscribed = false;
                self.released += 1;
                self.outbox.push(ObserverCommand::Unsubscribe { observer: id });
                trace!(%id, "released before firing");
                true
            }
            _ => false,
        }
    }

    /// Release every subscription still held. Returns how many were released.
    pub fn release_all(&mut self) -> usize {
        let ids: Vec<ObserverId> = self
            .watching()
            .map(|(id, _)| id)
            .collect();
        ids.into_iter().filter(|id| self.release(*id)).count()
    }

    pub fn has_fired(&self, id: ObserverId) -> bool {
        self.element(id).is_some_and(|e| e.has_fired)
    }

    pub fn element(&self, id: ObserverId) -> Option<&ObservedElement> {
        self.elements.get(id.0 as usize)
    }

    /// Observers still holding a subscription.
    pub fn watching(&self) -> impl Iterator<Item = (ObserverId, &ObservedElement)> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.subscribed)
            .map(|(i, e)| (ObserverId(i as u32), e))
    }

    /// Observers whose element is `node`.
    pub fn for_node(&self, node: NodeId) -> Vec<ObserverId> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.node == node)
            .map(|(i, _)| ObserverId(i as u32))
            .collect()
    }

    pub fn drain_commands(&mut self) -> Vec<ObserverCommand> {
        std::mem::take(&mut self.outbox)
    }

    /// Total subscriptions made and released so far.
    pub fn subscription_counts(&self) -> (usize, usize) {
        (self.subscribed, self.released)
    }
}
