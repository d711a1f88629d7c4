//! The page runtime: every manager of the page behind one event loop.
//!
//! [`Page`] owns the visibility observer, the reveal and lazy-image
//! registries, the mobile menu and the contact form. A host feeds it one
//! [`Event`] at a time through [`Page::handle`] and applies the returned
//! effects in order before feeding the next.
//!
//! Node ids are laid out by [`Blueprint`] from the content alone, so the
//! static build and the browser runtime, each building its own `Page` from
//! the same content, agree on them.

use super::form::{ContactForm, FormView};
use super::geometry::Margin;
use super::lazy_image::{LazyImage, LazyResource};
use super::menu::{MenuAction, MenuTransition, MobileMenu};
use super::navigator::navigate;
use super::observer::{ObserverCommand, ObserverId, VisibilityObserver};
use super::presence::{Change, Stage};
use super::reveal::{AnimatedElement, Pose, RevealSpec, Timing, Trigger, staggered};
use super::{Capability, Document, Effect, Event, NodeId, Timer};
use crate::content::Site;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

/// Resolved motion and timing parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Observation margin of lazy image frames.
    pub lazy_margin: Margin,
    /// Observation margin of visibility-triggered reveals.
    pub reveal_margin: Margin,
    pub section_offset: f64,
    pub section_duration: Duration,
    pub card_duration: Duration,
    /// Per-member delay increment of card collections.
    pub stagger: Duration,
    pub hero_offset: f64,
    pub hero_duration: Duration,
    pub follow_delay: Duration,
    pub brand_offset: f64,
    pub brand_duration: Duration,
    /// Enter stage of presence regions.
    pub enter: Duration,
    /// Exit stage of presence regions.
    pub exit: Duration,
    pub submit_delay: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        let ms = Duration::from_millis;
        Self {
            lazy_margin: Margin::px(100.0),
            reveal_margin: Margin::ZERO,
            section_offset: 30.0,
            section_duration: ms(600),
            card_duration: ms(500),
            stagger: ms(100),
            hero_offset: 50.0,
            hero_duration: ms(800),
            follow_delay: ms(200),
            brand_offset: 20.0,
            brand_duration: ms(300),
            enter: ms(300),
            exit: ms(200),
            submit_delay: ms(1000),
        }
    }
}

/// Card and image frame of one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectNodes {
    pub card: NodeId,
    pub image: NodeId,
}

/// Node ids of every element the engine touches, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blueprint {
    pub brand: NodeId,
    pub menu_button: NodeId,
    /// Presence region holding the mobile menu panel.
    pub menu_panel: NodeId,
    pub hero_copy: NodeId,
    pub hero_art: NodeId,
    pub about_heading: NodeId,
    pub features: Vec<NodeId>,
    pub projects_heading: NodeId,
    pub projects: Vec<ProjectNodes>,
    pub contact_heading: NodeId,
    pub contact_panel: NodeId,
    /// Presence region swapping the form fields and the success panel.
    pub contact_view: NodeId,
    pub contact_form: NodeId,
    pub submit_button: NodeId,
}

impl Blueprint {
    pub fn new(site: &Site) -> Self {
        let mut next_id = 0;
        let mut next = || {
            let id = NodeId::new(next_id);
            next_id += 1;
            id
        };
        Blueprint {
            brand: next(),
            menu_button: next(),
            menu_panel: next(),
            hero_copy: next(),
            hero_art: next(),
            about_heading: next(),
            features: site.about.features.iter().map(|_| next()).collect(),
            projects_heading: next(),
            projects: site
                .projects
                .items
                .iter()
                .map(|_| ProjectNodes {
                    card: next(),
                    image: next(),
                })
                .collect(),
            contact_heading: next(),
            contact_panel: next(),
            contact_view: next(),
            contact_form: next(),
            submit_button: next(),
        }
    }
}

/// What an observer instance was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Watcher {
    Reveal(NodeId),
    Image(NodeId),
}

pub struct Page {
    settings: EngineSettings,
    blueprint: Blueprint,
    observer: VisibilityObserver,
    watchers: BTreeMap<ObserverId, Watcher>,
    reveals: BTreeMap<NodeId, AnimatedElement>,
    images: BTreeMap<NodeId, LazyImage>,
    menu: MobileMenu,
    form: ContactForm,
    mounted: bool,
    suspended: bool,
}

impl Page {
    pub fn new(site: &Site, settings: EngineSettings) -> Self {
        let blueprint = Blueprint::new(site);
        let s = &settings;

        let section = RevealSpec {
            hidden: Pose::below(s.section_offset),
            visible: Pose::RESTING,
            timing: Timing::new(s.section_duration, Duration::ZERO),
            trigger: Trigger::Visible(s.reveal_margin),
        };
        let card = RevealSpec {
            timing: Timing::new(s.card_duration, Duration::ZERO),
            ..section
        };
        let hero = |offset: f64, delay: Duration| RevealSpec {
            hidden: Pose::beside(offset),
            visible: Pose::RESTING,
            timing: Timing::new(s.hero_duration, delay),
            trigger: Trigger::Mount,
        };

        let mut specs = vec![
            (
                blueprint.brand,
                RevealSpec {
                    hidden: Pose::beside(-s.brand_offset),
                    visible: Pose::RESTING,
                    timing: Timing::new(s.brand_duration, Duration::ZERO),
                    trigger: Trigger::Mount,
                },
            ),
            (blueprint.hero_copy, hero(-s.hero_offset, Duration::ZERO)),
            (blueprint.hero_art, hero(s.hero_offset, s.follow_delay)),
            (blueprint.about_heading, section),
            (blueprint.projects_heading, section),
            (blueprint.contact_heading, section),
            (blueprint.contact_panel, section.with_delay(s.follow_delay)),
        ];
        specs.extend(
            blueprint
                .features
                .iter()
                .copied()
                .zip(staggered(card, blueprint.features.len(), s.stagger)),
        );
        specs.extend(
            blueprint
                .projects
                .iter()
                .map(|p| p.card)
                .zip(staggered(card, blueprint.projects.len(), s.stagger)),
        );
        let reveals = specs
            .into_iter()
            .map(|(node, spec)| (node, AnimatedElement::new(node, spec)))
            .collect();

        let images = blueprint
            .projects
            .iter()
            .zip(&site.projects.items)
            .map(|(nodes, project)| {
                let resource = LazyResource {
                    src: project.image.clone(),
                    alt: project.title.clone(),
                };
                (nodes.image, LazyImage::new(nodes.image, resource))
            })
            .collect();

        Self {
            settings,
            blueprint,
            observer: VisibilityObserver::new(Capability::Available),
            watchers: BTreeMap::new(),
            reveals,
            images,
            menu: MobileMenu::new(),
            form: ContactForm::new(),
            mounted: false,
            suspended: false,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn blueprint(&self) -> &Blueprint {
        &self.blueprint
    }

    pub fn observer(&self) -> &VisibilityObserver {
        &self.observer
    }

    pub fn menu(&self) -> &MobileMenu {
        &self.menu
    }

    pub fn form(&self) -> &ContactForm {
        &self.form
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn reveal(&self, node: NodeId) -> Option<&AnimatedElement> {
        self.reveals.get(&node)
    }

    pub fn reveals(&self) -> impl Iterator<Item = &AnimatedElement> {
        self.reveals.values()
    }

    pub fn image(&self, node: NodeId) -> Option<&LazyImage> {
        self.images.get(&node)
    }

    pub fn images(&self) -> impl Iterator<Item = &LazyImage> {
        self.images.values()
    }

    /// Attach the page: reveal mount-triggered elements and start watching
    /// everything else.
    pub fn mount(&mut self, capability: Capability) -> Vec<Effect> {
        if self.mounted {
            debug!("page already mounted");
            return Vec::new();
        }
        self.mounted = true;
        self.observer = VisibilityObserver::new(capability);
        self.watchers.clear();

        let mut effects = Vec::new();
        for element in self.reveals.values_mut() {
            match element.spec().trigger {
                Trigger::Mount => {
                    if element.reveal() {
                        effects.push(Effect::Restyle {
                            node: element.node(),
                            style: element.style(),
                        });
                    }
                }
                Trigger::Visible(margin) => {
                    let id = self.observer.observe(element.node(), margin);
                    element.attach(id);
                    self.watchers.insert(id, Watcher::Reveal(element.node()));
                }
            }
        }
        for image in self.images.values() {
            let id = self.observer.observe(image.node(), self.settings.lazy_margin);
            self.watchers.insert(id, Watcher::Image(image.node()));
        }
        effects.extend(self.flush_observer());

        // Without an intersection primitive everything has fired already.
        let fired: Vec<Watcher> = self
            .watchers
            .iter()
            .filter(|(id, _)| self.observer.has_fired(**id))
            .map(|(_, watcher)| *watcher)
            .collect();
        for watcher in fired {
            effects.extend(self.fire(watcher));
        }

        info!(
            reveals = self.reveals.len(),
            images = self.images.len(),
            ?capability,
            "page mounted"
        );
        effects
    }

    /// Process one event to completion.
    pub fn handle(&mut self, event: Event, document: &dyn Document) -> Vec<Effect> {
        let mut effects = Vec::new();
        match event {
            Event::Intersection {
                observer,
                is_intersecting,
            } => {
                if self.observer.notify(observer, is_intersecting) {
                    if let Some(watcher) = self.watchers.get(&observer).copied() {
                        effects.extend(self.fire(watcher));
                    }
                }
            }
            Event::ImageLoaded { node } => match self.images.get_mut(&node) {
                Some(image) => {
                    if image.loaded() {
                        effects.push(Effect::SetAttribute {
                            node,
                            name: "data-loaded",
                            value: Some("true".to_string()),
                        });
                    }
                }
                None => debug!(%node, "load event for unknown image"),
            },
            Event::ImageFailed { node } => match self.images.get_mut(&node) {
                Some(image) => image.fail(),
                None => debug!(%node, "error event for unknown image"),
            },
            Event::MenuToggled => {
                let transition = self.menu.dispatch(MenuAction::Toggle);
                effects.extend(self.menu_effects(&transition));
            }
            Event::NavClicked { target } => {
                effects.push(Effect::PreventDefault);
                let navigation = navigate(&target, &mut self.menu, document);
                effects.extend(self.menu_effects(&navigation.menu));
                if let Some(target) = navigation.scroll_to {
                    effects.push(Effect::ScrollIntoView { target });
                }
            }
            Event::FormSubmitted => {
                effects.push(Effect::PreventDefault);
                if let Some(generation) = self.form.submit() {
                    effects.push(Effect::SetAttribute {
                        node: self.blueprint.submit_button,
                        name: "disabled",
                        value: Some(String::new()),
                    });
                    effects.push(Effect::SetAttribute {
                        node: self.blueprint.contact_form,
                        name: "aria-busy",
                        value: Some("true".to_string()),
                    });
                    effects.push(Effect::StartTimer {
                        timer: Timer::SubmitCompletion { generation },
                        delay: self.settings.submit_delay,
                    });
                }
            }
            Event::ResetRequested => {
                if let Some(change) = self.form.request_reset() {
                    let epoch = self.form.view().epoch();
                    effects.extend(self.region_effects(self.blueprint.contact_view, change, epoch));
                }
            }
            Event::TimerFired(Timer::SubmitCompletion { generation }) => {
                if let Some(change) = self.form.complete(generation) {
                    let form = self.blueprint.contact_form;
                    effects.push(Effect::ResetFields { node: form });
                    effects.push(Effect::SetAttribute {
                        node: self.blueprint.submit_button,
                        name: "disabled",
                        value: None,
                    });
                    effects.push(Effect::SetAttribute {
                        node: form,
                        name: "aria-busy",
                        value: None,
                    });
                    let epoch = self.form.view().epoch();
                    effects.extend(self.region_effects(self.blueprint.contact_view, change, epoch));
                }
            }
            Event::TimerFired(Timer::StageEnd { node, epoch }) => {
                if node == self.blueprint.menu_panel {
                    let change = self.menu.panel_stage_ended(epoch);
                    let current = self.menu.panel().epoch();
                    effects.extend(self.region_effects(node, change, current));
                } else if node == self.blueprint.contact_view {
                    let change = self.form.view_stage_ended(epoch);
                    let current = self.form.view().epoch();
                    effects.extend(self.region_effects(node, change, current));
                } else {
                    debug!(%node, "stage end for unknown region");
                }
            }
        }
        effects.extend(self.flush_observer());
        effects
    }

    /// The element at `node` left the document. Releases any subscription
    /// still held for it.
    pub fn unmount(&mut self, node: NodeId) -> Vec<Effect> {
        for id in self.observer.for_node(node) {
            self.observer.release(id);
        }
        self.flush_observer()
    }

    /// Detach the whole page: release every subscription and invalidate any
    /// submission still in flight.
    pub fn teardown(&mut self) -> Vec<Effect> {
        let released = self.observer.release_all();
        self.form.teardown();
        self.mounted = false;
        self.suspended = false;
        debug!(released, "page torn down");
        self.flush_observer()
    }

    /// The page is being hidden. A `persisted` page goes into the
    /// back/forward cache and may come back, so it is only suspended;
    /// anything else is torn down.
    pub fn hide(&mut self, persisted: bool) -> Vec<Effect> {
        if persisted {
            self.suspend()
        } else {
            self.teardown()
        }
    }

    /// Release every subscription but keep all state, including the
    /// generation of a submission in flight.
    pub fn suspend(&mut self) -> Vec<Effect> {
        if !self.mounted || self.suspended {
            return Vec::new();
        }
        self.suspended = true;
        let released = self.observer.release_all();
        debug!(released, "page suspended");
        self.flush_observer()
    }

    /// Undo [`suspend`](Self::suspend): watch again every element that has
    /// not come into view yet.
    pub fn resume(&mut self) -> Vec<Effect> {
        if !self.suspended {
            return Vec::new();
        }
        self.suspended = false;
        for element in self.reveals.values_mut() {
            if element.is_in_view() {
                continue;
            }
            if let Trigger::Visible(margin) = element.spec().trigger {
                let id = self.observer.observe(element.node(), margin);
                element.attach(id);
                self.watchers.insert(id, Watcher::Reveal(element.node()));
            }
        }
        for image in self.images.values().filter(|i| !i.is_in_view()) {
            let id = self.observer.observe(image.node(), self.settings.lazy_margin);
            self.watchers.insert(id, Watcher::Image(image.node()));
        }
        let watching = self.observer.watching().count();
        info!(watching, "page resumed");
        self.flush_observer()
    }

    fn fire(&mut self, watcher: Watcher) -> Vec<Effect> {
        match watcher {
            Watcher::Reveal(node) => {
                let Some(element) = self.reveals.get_mut(&node) else {
                    return Vec::new();
                };
                if !element.reveal() {
                    return Vec::new();
                }
                vec![Effect::Restyle {
                    node,
                    style: element.style(),
                }]
            }
            Watcher::Image(node) => {
                let Some(image) = self.images.get_mut(&node) else {
                    return Vec::new();
                };
                if !image.enter_view() {
                    return Vec::new();
                }
                vec![Effect::Render { node }]
            }
        }
    }

    fn menu_effects(&self, transition: &MenuTransition) -> Vec<Effect> {
        let mut effects = Vec::new();
        if transition.changed() {
            let button = self.blueprint.menu_button;
            effects.push(Effect::SetAttribute {
                node: button,
                name: "aria-expanded",
                value: Some(transition.to.is_open().to_string()),
            });
            effects.push(Effect::SetAttribute {
                node: button,
                name: "aria-label",
                value: Some(transition.to.button_label().to_string()),
            });
            effects.push(Effect::Render { node: button });
        }
        let epoch = self.menu.panel().epoch();
        effects.extend(self.region_effects(self.blueprint.menu_panel, transition.panel.clone(), epoch));
        effects
    }

    fn region_effects<K>(&self, node: NodeId, change: Change<K>, epoch: u64) -> Vec<Effect> {
        let stage = |stage: Option<Stage>| Effect::SetAttribute {
            node,
            name: "data-stage",
            value: stage.map(|s| s.as_str().to_string()),
        };
        let timer = |delay: Duration| Effect::StartTimer {
            timer: Timer::StageEnd { node, epoch },
            delay,
        };
        match change {
            Change::Unchanged => Vec::new(),
            Change::ExitStarted => vec![stage(Some(Stage::Exiting)), timer(self.settings.exit)],
            Change::Mounted(_) => vec![
                Effect::Render { node },
                stage(Some(Stage::Entering)),
                timer(self.settings.enter),
            ],
            Change::Settled => vec![stage(Some(Stage::Present))],
            Change::Emptied => vec![Effect::Render { node }, stage(None)],
        }
    }

    fn flush_observer(&mut self) -> Vec<Effect> {
        self.observer
            .drain_commands()
            .into_iter()
            .map(|command| match command {
                ObserverCommand::Subscribe {
                    observer,
                    node,
                    margin,
                } => Effect::Observe {
                    observer,
                    node,
                    margin,
                },
                ObserverCommand::Unsubscribe { observer } => Effect::Disconnect { observer },
            })
            .collect()
    }

    /// Which branch the contact region currently shows, if any.
    pub fn contact_view(&self) -> Option<FormView> {
        self.form.view().mounted().map(|(view, _)| *view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::form::FormState;
    use crate::engine::menu::MenuState;
    use crate::engine::reveal::RevealPhase;
    use crate::test_helpers::{observer_for, single_timer};

    const DOC: [&str; 4] = ["home", "about", "projects", "contact"];

    fn page() -> Page {
        Page::new(&Site::default(), EngineSettings::default())
    }

    #[test]
    fn blueprint_ids_are_sequential_and_deterministic() {
        let site = Site::default();
        let a = Blueprint::new(&site);
        let b = Blueprint::new(&site);
        assert_eq!(a, b);
        assert_eq!(a.brand, NodeId::new(0));
        assert_eq!(a.features.len(), 3);
        assert_eq!(a.projects.len(), 6);
        assert_eq!(a.projects[0].image.raw(), a.projects[0].card.raw() + 1);
        assert!(a.submit_button > a.contact_form);
    }

    #[test]
    fn everything_hidden_before_mount() {
        let page = page();
        assert!(page.reveals().all(|r| r.phase() == RevealPhase::Hidden));
        assert!(page.images().all(|i| !i.is_in_view()));
    }

    #[test]
    fn mount_reveals_above_the_fold_and_observes_the_rest() {
        let mut page = page();
        let effects = page.mount(Capability::Available);
        let bp = page.blueprint().clone();

        for node in [bp.brand, bp.hero_copy, bp.hero_art] {
            assert!(page.reveal(node).unwrap().is_in_view());
            assert!(effects.contains(&Effect::Restyle {
                node,
                style: page.reveal(node).unwrap().style(),
            }));
        }
        let observes = effects
            .iter()
            .filter(|e| matches!(e, Effect::Observe { .. }))
            .count();
        // 4 section blocks + 3 features + 6 cards + 6 images
        assert_eq!(observes, 19);
        assert!(!page.reveal(bp.about_heading).unwrap().is_in_view());
    }

    #[test]
    fn mount_twice_is_noop() {
        let mut page = page();
        page.mount(Capability::Available);
        assert!(page.mount(Capability::Available).is_empty());
    }

    #[test]
    fn intersection_reveals_once_and_disconnects() {
        let mut page = page();
        let effects = page.mount(Capability::Available);
        let heading = page.blueprint().about_heading;
        let observer = observer_for(&effects, heading);

        let effects = page.handle(
            Event::Intersection {
                observer,
                is_intersecting: true,
            },
            &DOC,
        );
        assert!(matches!(effects[0], Effect::Restyle { node, .. } if node == heading));
        assert!(effects.contains(&Effect::Disconnect { observer }));

        let again = page.handle(
            Event::Intersection {
                observer,
                is_intersecting: true,
            },
            &DOC,
        );
        assert!(again.is_empty());
    }

    #[test]
    fn image_mounts_on_intersection_and_fades_on_load() {
        let mut page = page();
        let effects = page.mount(Capability::Available);
        let frame = page.blueprint().projects[1].image;
        let observer = observer_for(&effects, frame);

        // Load reported before mounting is ignored.
        assert!(page.handle(Event::ImageLoaded { node: frame }, &DOC).is_empty());

        let effects = page.handle(
            Event::Intersection {
                observer,
                is_intersecting: true,
            },
            &DOC,
        );
        assert_eq!(effects[0], Effect::Render { node: frame });
        assert!(page.image(frame).unwrap().is_in_view());

        let effects = page.handle(Event::ImageLoaded { node: frame }, &DOC);
        assert_eq!(
            effects,
            vec![Effect::SetAttribute {
                node: frame,
                name: "data-loaded",
                value: Some("true".into()),
            }]
        );
    }

    #[test]
    fn failed_image_keeps_placeholder() {
        let mut page = page();
        let effects = page.mount(Capability::Available);
        let frame = page.blueprint().projects[0].image;
        let observer = observer_for(&effects, frame);
        page.handle(
            Event::Intersection {
                observer,
                is_intersecting: true,
            },
            &DOC,
        );
        assert!(page.handle(Event::ImageFailed { node: frame }, &DOC).is_empty());
        let image = page.image(frame).unwrap();
        assert!(image.has_failed());
        assert!(!image.is_loaded());
    }

    #[test]
    fn unavailable_capability_reveals_everything_on_mount() {
        let mut page = page();
        let effects = page.mount(Capability::Unavailable);
        assert!(page.reveals().all(|r| r.is_in_view()));
        assert!(page.images().all(|i| i.is_in_view()));
        assert!(!effects.iter().any(|e| matches!(e, Effect::Observe { .. })));
        let renders = effects
            .iter()
            .filter(|e| matches!(e, Effect::Render { .. }))
            .count();
        assert_eq!(renders, 6);
    }

    #[test]
    fn menu_toggle_updates_button_and_mounts_panel() {
        let mut page = page();
        page.mount(Capability::Available);
        let bp = page.blueprint().clone();
        let effects = page.handle(Event::MenuToggled, &DOC);
        assert_eq!(
            effects,
            vec![
                Effect::SetAttribute {
                    node: bp.menu_button,
                    name: "aria-expanded",
                    value: Some("true".into()),
                },
                Effect::SetAttribute {
                    node: bp.menu_button,
                    name: "aria-label",
                    value: Some("Close menu".into()),
                },
                Effect::Render { node: bp.menu_button },
                Effect::Render { node: bp.menu_panel },
                Effect::SetAttribute {
                    node: bp.menu_panel,
                    name: "data-stage",
                    value: Some("entering".into()),
                },
                Effect::StartTimer {
                    timer: Timer::StageEnd {
                        node: bp.menu_panel,
                        epoch: 1,
                    },
                    delay: Duration::from_millis(300),
                },
            ]
        );
        let settled = page.handle(
            Event::TimerFired(Timer::StageEnd {
                node: bp.menu_panel,
                epoch: 1,
            }),
            &DOC,
        );
        assert_eq!(
            settled,
            vec![Effect::SetAttribute {
                node: bp.menu_panel,
                name: "data-stage",
                value: Some("present".into()),
            }]
        );
    }

    #[test]
    fn nav_click_closes_menu_before_scrolling() {
        let mut page = page();
        page.mount(Capability::Available);
        page.handle(Event::MenuToggled, &DOC);
        let effects = page.handle(
            Event::NavClicked {
                target: "#projects".into(),
            },
            &DOC,
        );
        assert_eq!(effects.first(), Some(&Effect::PreventDefault));
        assert_eq!(
            effects.last(),
            Some(&Effect::ScrollIntoView {
                target: "projects".into()
            })
        );
        assert_eq!(page.menu().state(), MenuState::Closed);
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::SetAttribute { name: "data-stage", value: Some(v), .. } if v == "exiting"
        )));
    }

    #[test]
    fn nav_click_to_missing_anchor_does_not_scroll() {
        let mut page = page();
        page.mount(Capability::Available);
        let effects = page.handle(
            Event::NavClicked {
                target: "#pricing".into(),
            },
            &DOC,
        );
        assert_eq!(effects, vec![Effect::PreventDefault]);
    }

    #[test]
    fn duplicate_submit_only_prevents_default() {
        let mut page = page();
        page.mount(Capability::Available);
        let first = page.handle(Event::FormSubmitted, &DOC);
        assert_eq!(
            single_timer(&first),
            (
                Timer::SubmitCompletion { generation: 1 },
                Duration::from_millis(1000)
            )
        );
        let second = page.handle(Event::FormSubmitted, &DOC);
        assert_eq!(second, vec![Effect::PreventDefault]);
        assert_eq!(page.form().state(), FormState::Submitting);
    }

    #[test]
    fn completion_after_teardown_is_ignored() {
        let mut page = page();
        page.mount(Capability::Available);
        page.handle(Event::FormSubmitted, &DOC);
        let effects = page.teardown();
        assert!(effects.iter().all(|e| matches!(e, Effect::Disconnect { .. })));
        assert!(!page.is_mounted());
        let late = page.handle(
            Event::TimerFired(Timer::SubmitCompletion { generation: 1 }),
            &DOC,
        );
        assert!(late.is_empty());
        assert_eq!(page.form().state(), FormState::Submitting);
    }

    #[test]
    fn completion_survives_suspend_and_resume() {
        let mut page = page();
        page.mount(Capability::Available);
        page.handle(Event::FormSubmitted, &DOC);
        let released = page.hide(true);
        assert_eq!(released.len(), 19);
        assert!(released.iter().all(|e| matches!(e, Effect::Disconnect { .. })));
        assert!(page.is_mounted());
        assert!(page.is_suspended());

        page.resume();
        let late = page.handle(
            Event::TimerFired(Timer::SubmitCompletion { generation: 1 }),
            &DOC,
        );
        assert!(late.contains(&Effect::ResetFields {
            node: page.blueprint().contact_form
        }));
        assert_eq!(page.form().state(), FormState::Success);
    }

    #[test]
    fn resume_observes_only_what_is_still_hidden() {
        let mut page = page();
        let effects = page.mount(Capability::Available);
        let bp = page.blueprint().clone();
        let observer = observer_for(&effects, bp.about_heading);
        page.handle(
            Event::Intersection {
                observer,
                is_intersecting: true,
            },
            &DOC,
        );
        page.suspend();

        let effects = page.resume();
        let observes: Vec<NodeId> = effects
            .iter()
            .filter_map(|e| match e {
                Effect::Observe { node, .. } => Some(*node),
                _ => None,
            })
            .collect();
        assert_eq!(observes.len(), 18);
        assert!(!observes.contains(&bp.about_heading));
        assert!(observes.contains(&bp.projects_heading));
        assert!(observes.contains(&bp.projects[2].image));

        let fresh = observer_for(&effects, bp.projects_heading);
        assert_eq!(page.reveal(bp.projects_heading).unwrap().observer(), Some(fresh));
        let shown = page.handle(
            Event::Intersection {
                observer: fresh,
                is_intersecting: true,
            },
            &DOC,
        );
        assert!(matches!(shown[0], Effect::Restyle { node, .. } if node == bp.projects_heading));
    }

    #[test]
    fn reports_to_suspended_observers_are_ignored() {
        let mut page = page();
        let effects = page.mount(Capability::Available);
        let heading = page.blueprint().contact_heading;
        let observer = observer_for(&effects, heading);
        page.suspend();
        page.resume();
        let stale = page.handle(
            Event::Intersection {
                observer,
                is_intersecting: true,
            },
            &DOC,
        );
        assert!(stale.is_empty());
        assert!(!page.reveal(heading).unwrap().is_in_view());
    }

    #[test]
    fn unload_hide_tears_down_for_good() {
        let mut page = page();
        page.mount(Capability::Available);
        page.handle(Event::FormSubmitted, &DOC);
        page.hide(false);
        assert!(!page.is_mounted());
        assert!(page.resume().is_empty());
        let late = page.handle(
            Event::TimerFired(Timer::SubmitCompletion { generation: 1 }),
            &DOC,
        );
        assert!(late.is_empty());
        assert_eq!(page.form().state(), FormState::Submitting);
    }

    #[test]
    fn suspend_and_resume_are_idempotent() {
        let mut page = page();
        assert!(page.suspend().is_empty());
        page.mount(Capability::Available);
        assert!(!page.suspend().is_empty());
        assert!(page.suspend().is_empty());
        assert!(!page.resume().is_empty());
        assert!(page.resume().is_empty());
    }

    #[test]
    fn teardown_releases_every_live_subscription() {
        let mut page = page();
        page.mount(Capability::Available);
        let effects = page.teardown();
        assert_eq!(effects.len(), 19);
        assert_eq!(page.observer().subscription_counts(), (19, 19));
    }

    #[test]
    fn unmount_releases_only_that_node() {
        let mut page = page();
        let effects = page.mount(Capability::Available);
        let card = page.blueprint().projects[3].card;
        let observer = observer_for(&effects, card);
        assert_eq!(page.unmount(card), vec![Effect::Disconnect { observer }]);
        assert!(page.unmount(card).is_empty());
    }

    #[test]
    fn stale_stage_end_is_ignored() {
        let mut page = page();
        page.mount(Capability::Available);
        let panel = page.blueprint().menu_panel;
        page.handle(Event::MenuToggled, &DOC);
        page.handle(Event::MenuToggled, &DOC);
        // The enter timer from the first toggle fires late.
        let effects = page.handle(
            Event::TimerFired(Timer::StageEnd {
                node: panel,
                epoch: 1,
            }),
            &DOC,
        );
        assert!(effects.is_empty());
    }
}
