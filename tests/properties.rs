//! Invariants of the engine's state machines under arbitrary input.

use proptest::prelude::*;
use std::time::Duration;
use vitrine::content::Site;
use vitrine::engine::reveal::{stagger, staggered};
use vitrine::engine::{
    Capability, ContactForm, EngineSettings, FormEvent, FormState, LazyImage, LazyResource,
    Margin, MenuAction, MenuState, MobileMenu, NodeId, Pose, RevealSpec, Timing, Trigger,
    Viewport, VisibilityObserver,
};
use vitrine::simulate::Simulator;

#[derive(Debug, Clone, Copy)]
enum ImageOp {
    EnterView,
    Loaded,
    Fail,
}

fn image_op() -> impl Strategy<Value = ImageOp> {
    prop_oneof![
        Just(ImageOp::EnterView),
        Just(ImageOp::Loaded),
        Just(ImageOp::Fail)
    ]
}

fn menu_action() -> impl Strategy<Value = MenuAction> {
    prop_oneof![Just(MenuAction::Toggle), Just(MenuAction::Navigate)]
}

fn form_event() -> impl Strategy<Value = FormEvent> {
    prop_oneof![
        Just(FormEvent::Submit),
        Just(FormEvent::Completed),
        Just(FormEvent::ResetRequested)
    ]
}

fn card() -> RevealSpec {
    RevealSpec {
        hidden: Pose::below(30.0),
        visible: Pose::RESTING,
        timing: Timing::new(Duration::from_millis(500), Duration::ZERO),
        trigger: Trigger::Visible(Margin::ZERO),
    }
}

proptest! {
    #[test]
    fn visibility_fires_at_most_once(reports in prop::collection::vec(any::<bool>(), 0..40)) {
        let mut observer = VisibilityObserver::new(Capability::Available);
        let id = observer.observe(NodeId::new(1), Margin::ZERO);
        let mut fired = 0;
        let mut seen_true = false;
        for report in reports {
            if observer.notify(id, report) {
                fired += 1;
            }
            if seen_true {
                prop_assert!(observer.has_fired(id));
            }
            seen_true |= observer.has_fired(id);
        }
        prop_assert!(fired <= 1);
        let (made, released) = observer.subscription_counts();
        prop_assert_eq!(made, 1);
        prop_assert_eq!(released, fired);
    }

    #[test]
    fn loaded_implies_in_view(ops in prop::collection::vec(image_op(), 0..30)) {
        let mut image = LazyImage::new(
            NodeId::new(7),
            LazyResource { src: "a.jpg".to_string(), alt: "a".to_string() },
        );
        let mut phase = image.phase();
        for op in ops {
            match op {
                ImageOp::EnterView => { image.enter_view(); }
                ImageOp::Loaded => { image.loaded(); }
                ImageOp::Fail => image.fail(),
            }
            prop_assert!(!image.is_loaded() || image.is_in_view());
            prop_assert!(image.phase() >= phase);
            phase = image.phase();
        }
    }

    #[test]
    fn stagger_is_exactly_proportional(count in 0usize..64, step_ms in 0u64..2_000) {
        let increment = Duration::from_millis(step_ms);
        let specs = staggered(card(), count, increment);
        prop_assert_eq!(specs.len(), count);
        for (i, spec) in specs.iter().enumerate() {
            prop_assert_eq!(spec.timing.delay, increment * i as u32);
            prop_assert_eq!(spec.timing.delay, stagger(i, increment));
        }
    }

    #[test]
    fn menu_transitions(actions in prop::collection::vec(menu_action(), 0..30)) {
        let mut menu = MobileMenu::new();
        for action in actions {
            let before = menu.state();
            let transition = menu.dispatch(action);
            let expected = match (action, before) {
                (MenuAction::Navigate, _) => MenuState::Closed,
                (MenuAction::Toggle, MenuState::Closed) => MenuState::Open,
                (MenuAction::Toggle, MenuState::Open) => MenuState::Closed,
            };
            prop_assert_eq!(menu.state(), expected);
            prop_assert_eq!(transition.from, before);
            prop_assert_eq!(transition.to, expected);
        }
    }

    #[test]
    fn form_follows_transition_table(events in prop::collection::vec(form_event(), 0..30)) {
        let mut form = ContactForm::new();
        for event in events {
            let before = form.state();
            match event {
                FormEvent::Submit => { form.submit(); }
                FormEvent::Completed => { form.complete(form.generation()); }
                FormEvent::ResetRequested => { form.request_reset(); }
            }
            let expected = match (before, event) {
                (FormState::Idle, FormEvent::Submit) => FormState::Submitting,
                (FormState::Submitting, FormEvent::Completed) => FormState::Success,
                (FormState::Success, FormEvent::ResetRequested) => FormState::Idle,
                (state, _) => state,
            };
            prop_assert_eq!(form.state(), expected);
        }
    }

    #[test]
    fn stale_completion_never_completes(extra in 1u64..5) {
        let mut form = ContactForm::new();
        let generation = form.submit().unwrap();
        form.teardown();
        prop_assert!(form.complete(generation).is_none());
        prop_assert!(form.complete(generation + extra + 1).is_none());
        prop_assert_eq!(form.state(), FormState::Submitting);
    }

    #[test]
    fn reveals_never_revert_while_scrolling(
        positions in prop::collection::vec(0.0f64..6_000.0, 1..20),
        width in 320.0f64..1_600.0,
    ) {
        let mut sim = Simulator::new(
            &Site::default(),
            EngineSettings::default(),
            Viewport::new(width, 800.0),
        );
        sim.mount(Capability::Available);
        let mut revealed = 0;
        for y in positions {
            sim.scroll_to(y);
            sim.load_mounted_images();
            let now = sim.page().reveals().filter(|r| r.is_in_view()).count();
            prop_assert!(now >= revealed);
            revealed = now;
            prop_assert!(sim.page().images().all(|i| !i.is_loaded() || i.is_in_view()));
            let (made, released) = sim.page().observer().subscription_counts();
            prop_assert_eq!(made, released + sim.live_subscriptions());
        }
    }
}
