//! Headless driver for the engine.
//!
//! [`Simulator`] plays the part of the browser: it estimates where every
//! engine-addressed element sits on the page, keeps a [`Viewport`], runs a
//! virtual clock with a timer queue, and applies effects to a small model of
//! the document (inline styles, attributes, re-render counts, mounted
//! images). Platform intersection callbacks are synthesised from geometry
//! whenever the viewport moves or a subscription is made, just as a real
//! intersection observer reports the initial state of a newly observed
//! element.
//!
//! Every dispatched event is recorded with the effects it produced, so a run
//! can be printed as a trace or asserted on step by step.

use crate::content::{SECTION_IDS, Site};
use crate::engine::page::Blueprint;
use crate::engine::{
    Capability, Effect, EngineSettings, Event, Margin, NodeId, ObserverId, Page, Rect, Viewport,
};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tracing::{debug, trace};

const HEADER_HEIGHT: f64 = 64.0;
const GUTTER: f64 = 24.0;
const MAX_CONTENT_WIDTH: f64 = 1152.0;
const SECTION_PADDING: f64 = 96.0;
const HEADING_HEIGHT: f64 = 160.0;
const HEADING_GAP: f64 = 64.0;
const GRID_GAP: f64 = 32.0;
const MIN_CARD_WIDTH: f64 = 288.0;
const FEATURE_HEIGHT: f64 = 220.0;
const PROJECT_BODY_HEIGHT: f64 = 220.0;
const CONTACT_PANEL_WIDTH: f64 = 640.0;
const CONTACT_PANEL_HEIGHT: f64 = 560.0;
const FOOTER_HEIGHT: f64 = 200.0;

/// Estimated document-space boxes of every element the engine addresses.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    rects: BTreeMap<NodeId, Rect>,
    anchors: BTreeMap<String, f64>,
    height: f64,
}

impl Layout {
    /// Lay the page out for a viewport of the given size, following the
    /// stylesheet's grid rules closely enough for intersection purposes.
    pub fn estimate(site: &Site, blueprint: &Blueprint, viewport: &Viewport) -> Layout {
        let content_width = (viewport.width - 2.0 * GUTTER).clamp(MIN_CARD_WIDTH, MAX_CONTENT_WIDTH);
        let left = ((viewport.width - content_width) / 2.0).max(0.0);
        let columns = (((content_width + GRID_GAP) / (MIN_CARD_WIDTH + GRID_GAP)).floor() as usize).max(1);
        let card_width = (content_width - GRID_GAP * (columns - 1) as f64) / columns as f64;
        let cell = |top: f64, index: usize, height: f64| {
            let (row, col) = (index / columns, index % columns);
            Rect::new(
                left + col as f64 * (card_width + GRID_GAP),
                top + row as f64 * (height + GRID_GAP),
                card_width,
                height,
            )
        };
        let grid_height = |count: usize, height: f64| {
            let rows = count.div_ceil(columns);
            if rows == 0 {
                0.0
            } else {
                rows as f64 * height + (rows - 1) as f64 * GRID_GAP
            }
        };

        let mut rects = BTreeMap::new();
        let mut anchors = BTreeMap::new();

        rects.insert(blueprint.brand, Rect::new(left, 16.0, 160.0, 32.0));
        rects.insert(blueprint.menu_button, Rect::new(left + content_width - 32.0, 20.0, 32.0, 32.0));
        rects.insert(blueprint.menu_panel, Rect::new(0.0, HEADER_HEIGHT, viewport.width, 0.0));

        // Hero fills the first screen.
        let hero_height = viewport.height.max(600.0);
        anchors.insert("home".to_string(), 0.0);
        let half = content_width / 2.0;
        rects.insert(blueprint.hero_copy, Rect::new(left, HEADER_HEIGHT + 64.0, half, 320.0));
        rects.insert(blueprint.hero_art, Rect::new(left + half, HEADER_HEIGHT + 64.0, half, 360.0));

        let heading = |top: f64| Rect::new(left, top + SECTION_PADDING, content_width, HEADING_HEIGHT);
        let grid_top = |top: f64| top + SECTION_PADDING + HEADING_HEIGHT + HEADING_GAP;

        let about_top = hero_height;
        anchors.insert("about".to_string(), about_top);
        rects.insert(blueprint.about_heading, heading(about_top));
        for (i, id) in blueprint.features.iter().enumerate() {
            rects.insert(*id, cell(grid_top(about_top), i, FEATURE_HEIGHT));
        }
        let about_height = SECTION_PADDING * 2.0
            + HEADING_HEIGHT
            + HEADING_GAP
            + grid_height(blueprint.features.len(), FEATURE_HEIGHT);

        let projects_top = about_top + about_height;
        anchors.insert("projects".to_string(), projects_top);
        rects.insert(blueprint.projects_heading, heading(projects_top));
        let image_height = card_width * 10.0 / 16.0;
        let card_height = image_height + PROJECT_BODY_HEIGHT;
        for (i, nodes) in blueprint.projects.iter().enumerate() {
            let card = cell(grid_top(projects_top), i, card_height);
            rects.insert(nodes.card, card);
            rects.insert(nodes.image, Rect::new(card.x, card.y, card.width, image_height));
        }
        let projects_height = SECTION_PADDING * 2.0
            + HEADING_HEIGHT
            + HEADING_GAP
            + grid_height(site.projects.items.len(), card_height);

        let contact_top = projects_top + projects_height;
        anchors.insert("contact".to_string(), contact_top);
        rects.insert(blueprint.contact_heading, heading(contact_top));
        let panel_width = CONTACT_PANEL_WIDTH.min(content_width);
        let panel = Rect::new(
            left + (content_width - panel_width) / 2.0,
            grid_top(contact_top),
            panel_width,
            CONTACT_PANEL_HEIGHT,
        );
        rects.insert(blueprint.contact_panel, panel);
        rects.insert(blueprint.contact_view, panel);
        rects.insert(blueprint.contact_form, panel);
        rects.insert(blueprint.submit_button, Rect::new(panel.x, panel.bottom() - 80.0, panel.width, 48.0));
        let contact_height = SECTION_PADDING * 2.0 + HEADING_HEIGHT + HEADING_GAP + CONTACT_PANEL_HEIGHT;

        Layout {
            rects,
            anchors,
            height: contact_top + contact_height + FOOTER_HEIGHT,
        }
    }

    pub fn rect(&self, node: NodeId) -> Option<&Rect> {
        self.rects.get(&node)
    }

    /// Document offset of a section anchor.
    pub fn anchor(&self, id: &str) -> Option<f64> {
        self.anchors.get(id).copied()
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

/// The simulated document: whatever the effects wrote to it.
#[derive(Debug, Clone, Default)]
pub struct SimDocument {
    anchors: BTreeSet<String>,
    styles: BTreeMap<NodeId, String>,
    attributes: BTreeMap<(NodeId, &'static str), String>,
    renders: BTreeMap<NodeId, usize>,
    mounted_images: BTreeSet<NodeId>,
    field_resets: usize,
}

impl SimDocument {
    pub fn style(&self, node: NodeId) -> Option<&str> {
        self.styles.get(&node).map(String::as_str)
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|((n, a), _)| *n == node && *a == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn render_count(&self, node: NodeId) -> usize {
        self.renders.get(&node).copied().unwrap_or(0)
    }

    /// True once the `<img>` of the lazy frame at `node` is in the document.
    pub fn has_image(&self, node: NodeId) -> bool {
        self.mounted_images.contains(&node)
    }

    pub fn field_resets(&self) -> usize {
        self.field_resets
    }
}

/// One dispatched event and what it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    pub at: Duration,
    pub action: String,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    due: Duration,
    seq: u64,
    timer: crate::engine::Timer,
}

pub struct Simulator {
    page: Page,
    layout: Layout,
    viewport: Viewport,
    clock: Duration,
    timers: Vec<PendingTimer>,
    next_seq: u64,
    subscriptions: BTreeMap<ObserverId, (NodeId, Margin)>,
    document: SimDocument,
    scrolls: Vec<String>,
    trace: Vec<TraceEntry>,
}

impl Simulator {
    pub fn new(site: &Site, settings: EngineSettings, viewport: Viewport) -> Self {
        let page = Page::new(site, settings);
        let layout = Layout::estimate(site, page.blueprint(), &viewport);
        let document = SimDocument {
            anchors: SECTION_IDS.iter().map(|s| s.to_string()).collect(),
            ..SimDocument::default()
        };
        Self {
            page,
            layout,
            viewport,
            clock: Duration::ZERO,
            timers: Vec::new(),
            next_seq: 0,
            subscriptions: BTreeMap::new(),
            document,
            scrolls: Vec::new(),
            trace: Vec::new(),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn document(&self) -> &SimDocument {
        &self.document
    }

    pub fn now(&self) -> Duration {
        self.clock
    }

    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    /// Anchors scrolled to so far, in order.
    pub fn scrolls(&self) -> &[String] {
        &self.scrolls
    }

    /// Platform subscriptions currently held.
    pub fn live_subscriptions(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn mount(&mut self, capability: Capability) {
        let effects = self.page.mount(capability);
        self.record(format!("mount ({capability:?})"), effects);
        self.deliver_intersections();
    }

    /// Jump the viewport to `scroll_y`, clamped to the document.
    pub fn scroll_to(&mut self, scroll_y: f64) {
        let max = (self.layout.height - self.viewport.height).max(0.0);
        self.viewport.scroll_y = scroll_y.clamp(0.0, max);
        trace!(scroll_y = self.viewport.scroll_y, "viewport moved");
        self.deliver_intersections();
    }

    /// Move the clock forward by `by`, firing every timer that falls due, in
    /// due order.
    pub fn advance(&mut self, by: Duration) {
        let until = self.clock + by;
        while let Some(index) = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(i, _)| i)
        {
            let pending = self.timers.remove(index);
            self.clock = pending.due;
            self.dispatch(
                format!("timer {:?}", pending.timer),
                Event::TimerFired(pending.timer),
            );
        }
        self.clock = until;
    }

    /// Run the clock until no timer is pending.
    pub fn settle(&mut self) {
        while let Some(due) = self.timers.iter().map(|t| t.due).max() {
            self.advance(due.saturating_sub(self.clock));
        }
    }

    pub fn toggle_menu(&mut self) {
        self.dispatch("toggle menu".to_string(), Event::MenuToggled);
    }

    pub fn click_nav(&mut self, target: &str) {
        self.dispatch(
            format!("click nav {target}"),
            Event::NavClicked {
                target: target.to_string(),
            },
        );
    }

    pub fn submit(&mut self) {
        self.dispatch("submit form".to_string(), Event::FormSubmitted);
    }

    pub fn request_reset(&mut self) {
        self.dispatch("send another".to_string(), Event::ResetRequested);
    }

    pub fn load_image(&mut self, node: NodeId) {
        self.dispatch(format!("image {node} loaded"), Event::ImageLoaded { node });
    }

    pub fn fail_image(&mut self, node: NodeId) {
        self.dispatch(format!("image {node} failed"), Event::ImageFailed { node });
    }

    /// Complete the fetch of every image currently mounted but not loaded.
    pub fn load_mounted_images(&mut self) {
        let pending: Vec<NodeId> = self
            .page
            .images()
            .filter(|i| i.is_in_view() && !i.is_loaded() && !i.has_failed())
            .map(|i| i.node())
            .collect();
        for node in pending {
            self.load_image(node);
        }
    }

    /// Detach the page, as on navigation away.
    pub fn teardown(&mut self) {
        let effects = self.page.teardown();
        self.record("teardown".to_string(), effects);
    }

    /// The visitor navigates away. `persisted` keeps the page in the
    /// back/forward cache.
    pub fn hide(&mut self, persisted: bool) {
        let effects = self.page.hide(persisted);
        self.record(format!("pagehide (persisted: {persisted})"), effects);
    }

    /// The visitor comes back to a page restored from the back/forward cache.
    pub fn show(&mut self) {
        let effects = self.page.resume();
        self.record("pageshow (persisted: true)".to_string(), effects);
        self.deliver_intersections();
    }

    /// Scroll from top to bottom in `step` pixel increments, loading mounted
    /// images and letting `dwell` pass at each stop.
    pub fn scroll_through(&mut self, step: f64, dwell: Duration) {
        let step = step.max(1.0);
        let max = (self.layout.height - self.viewport.height).max(0.0);
        let mut y = self.viewport.scroll_y;
        loop {
            self.load_mounted_images();
            self.advance(dwell);
            if y >= max {
                break;
            }
            y = (y + step).min(max);
            self.scroll_to(y);
        }
    }

    fn dispatch(&mut self, action: String, event: Event) {
        let effects = self.page.handle(event, &self.document.anchors);
        let scrolled = self.record(action, effects);
        if scrolled {
            self.deliver_intersections();
        }
    }

    /// Apply effects and log them. Returns true if the viewport moved.
    fn record(&mut self, action: String, effects: Vec<Effect>) -> bool {
        debug!(%action, effects = effects.len(), "dispatched");
        let mut scrolled = false;
        for effect in &effects {
            scrolled |= self.apply(effect);
        }
        self.trace.push(TraceEntry {
            at: self.clock,
            action,
            effects,
        });
        scrolled
    }

    fn apply(&mut self, effect: &Effect) -> bool {
        match effect {
            Effect::Observe {
                observer,
                node,
                margin,
            } => {
                self.subscriptions.insert(*observer, (*node, *margin));
            }
            Effect::Disconnect { observer } => {
                self.subscriptions.remove(observer);
            }
            Effect::Restyle { node, style } => {
                self.document.styles.insert(*node, style.clone());
            }
            Effect::SetAttribute { node, name, value } => match value {
                Some(value) => {
                    self.document.attributes.insert((*node, *name), value.clone());
                }
                None => {
                    self.document.attributes.remove(&(*node, *name));
                }
            },
            Effect::Render { node } => {
                *self.document.renders.entry(*node).or_default() += 1;
                if self.page.image(*node).is_some_and(|i| i.is_in_view()) {
                    self.document.mounted_images.insert(*node);
                }
            }
            Effect::PreventDefault => {}
            Effect::ScrollIntoView { target } => {
                self.scrolls.push(target.clone());
                if let Some(top) = self.layout.anchor(target) {
                    let max = (self.layout.height - self.viewport.height).max(0.0);
                    self.viewport.scroll_y = (top - HEADER_HEIGHT).clamp(0.0, max);
                    return true;
                }
            }
            Effect::StartTimer { timer, delay } => {
                self.timers.push(PendingTimer {
                    due: self.clock + *delay,
                    seq: self.next_seq,
                    timer: *timer,
                });
                self.next_seq += 1;
            }
            Effect::ResetFields { .. } => {
                self.document.field_resets += 1;
            }
        }
        false
    }

    /// Report every live subscription whose element is near the viewport.
    fn deliver_intersections(&mut self) {
        let hits: Vec<ObserverId> = self
            .subscriptions
            .iter()
            .filter(|(_, (node, margin))| {
                self.layout
                    .rect(*node)
                    .is_some_and(|rect| self.viewport.is_near(rect, *margin))
            })
            .map(|(id, _)| *id)
            .collect();
        for observer in hits {
            self.dispatch(
                format!("{observer} intersecting"),
                Event::Intersection {
                    observer,
                    is_intersecting: true,
                },
            );
        }
    }
}
