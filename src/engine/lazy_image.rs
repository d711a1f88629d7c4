//! Deferred image loading.
//!
//! A lazy frame renders a decorative placeholder right away and only mounts
//! the real `<img>` once its observer fires, so the request is not even
//! issued before the frame nears the viewport. When the image reports
//! `load`, the frame flips to loaded and the stylesheet crossfades
//! placeholder out and image in.
//!
//! Phases only move forward: `Deferred → InView → Loaded`. A failed load
//! leaves the frame in `InView` with the placeholder showing for good; there
//! is no error state.

use super::NodeId;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One deferred image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LazyResource {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadPhase {
    /// Not near the viewport yet; no request issued.
    Deferred,
    /// `<img>` mounted, waiting for the fetch to complete.
    InView,
    Loaded,
}

#[derive(Debug, Clone)]
pub struct LazyImage {
    node: NodeId,
    resource: LazyResource,
    phase: LoadPhase,
    failed: bool,
}

impl LazyImage {
    pub fn new(node: NodeId, resource: LazyResource) -> Self {
        Self {
            node,
            resource,
            phase: LoadPhase::Deferred,
            failed: false,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn resource(&self) -> &LazyResource {
        &self.resource
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn is_in_view(&self) -> bool {
        self.phase >= LoadPhase::InView
    }

    pub fn is_loaded(&self) -> bool {
        self.phase == LoadPhase::Loaded
    }

    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// The frame's observer fired. Returns true if the `<img>` should be
    /// mounted now.
    pub fn enter_view(&mut self) -> bool {
        if self.phase != LoadPhase::Deferred {
            return false;
        }
        self.phase = LoadPhase::InView;
        debug!(node = %self.node, src = %self.resource.src, "mounting image");
        true
    }

    /// The `<img>` finished loading. Returns true if this completed the
    /// frame.
    pub fn loaded(&mut self) -> bool {
        match self.phase {
            LoadPhase::InView => {
                self.phase = LoadPhase::Loaded;
                self.failed = false;
                true
            }
            LoadPhase::Deferred => {
                debug!(node = %self.node, "load reported before the image was mounted, ignored");
                false
            }
            LoadPhase::Loaded => false,
        }
    }

    /// The `<img>` failed. The placeholder stays.
    pub fn fail(&mut self) {
        if self.phase == LoadPhase::InView {
            self.failed = true;
            warn!(node = %self.node, src = %self.resource.src, "image failed to load, keeping placeholder");
        }
    }
}
