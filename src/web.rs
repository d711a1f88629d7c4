//! Browser host.
//!
//! Rebuilds the [`Page`] from the JSON the build embedded, installs delegated
//! listeners on the document, and applies engine effects to the live DOM.
//! One `IntersectionObserver` is created per subscription so that
//! disconnecting one element never disturbs another.
//!
//! The runtime lives in a thread-local and is only borrowed while the engine
//! processes an event; effects are applied after the borrow is released,
//! because applying them can re-enter (re-rendering a region asks the page
//! for its current state).

use crate::content::{SECTION_IDS, Site};
use crate::engine::{Capability, Effect, EngineSettings, Event, NodeId, ObserverId, Page};
use crate::render::{self, BOOTSTRAP_ID, Bootstrap};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Document, Element, HtmlFormElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, PageTransitionEvent, ScrollBehavior,
    ScrollIntoViewOptions,
};

type ObserverCallback = Closure<dyn FnMut(js_sys::Array)>;

struct Subscription {
    observer: IntersectionObserver,
    callback: ObserverCallback,
}

struct Runtime {
    site: Site,
    page: Page,
    anchors: BTreeSet<String>,
    subscriptions: BTreeMap<ObserverId, Subscription>,
    /// Callbacks of disconnected observers. A callback may be the one
    /// currently running, so they are only dropped on pagehide.
    spent: Vec<ObserverCallback>,
}

thread_local! {
    static RUNTIME: RefCell<Option<Runtime>> = const { RefCell::new(None) };
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = document()?;

    let json = document
        .get_element_by_id(BOOTSTRAP_ID)
        .and_then(|script| script.text_content())
        .ok_or_else(|| JsValue::from_str("bootstrap data missing"))?;
    let bootstrap: Bootstrap =
        serde_json::from_str(&json).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let settings = EngineSettings::from(&bootstrap.config);
    let page = Page::new(&bootstrap.site, settings);
    let anchors = SECTION_IDS
        .iter()
        .filter(|id| document.get_element_by_id(id).is_some())
        .map(|id| id.to_string())
        .collect();
    let capability = if js_sys::Reflect::has(&window, &JsValue::from_str("IntersectionObserver"))? {
        Capability::Available
    } else {
        Capability::Unavailable
    };

    RUNTIME.with(|rt| {
        *rt.borrow_mut() = Some(Runtime {
            site: bootstrap.site,
            page,
            anchors,
            subscriptions: BTreeMap::new(),
            spent: Vec::new(),
        });
    });

    install_listeners(&window, &document)?;

    let effects = with_runtime(|rt| rt.page.mount(capability)).unwrap_or_default();
    apply(effects, None);
    Ok(())
}

fn with_runtime<T>(f: impl FnOnce(&mut Runtime) -> T) -> Option<T> {
    RUNTIME.with(|rt| rt.try_borrow_mut().ok()?.as_mut().map(f))
}

/// Hand one event to the engine, then apply what it answered.
fn dispatch(event: Event, source: Option<&web_sys::Event>) {
    let effects = with_runtime(|rt| rt.page.handle(event, &rt.anchors));
    match effects {
        Some(effects) => apply(effects, source),
        None => warn("vitrine: event dropped, runtime busy or gone"),
    }
}

fn apply(effects: Vec<Effect>, source: Option<&web_sys::Event>) {
    for effect in effects {
        if let Err(err) = apply_one(effect, source) {
            web_sys::console::warn_2(&JsValue::from_str("vitrine: effect failed"), &err);
        }
    }
}

fn element(node: NodeId) -> Result<Option<Element>, JsValue> {
    document()?.query_selector(&format!("[data-node=\"{node}\"]"))
}

fn apply_one(effect: Effect, source: Option<&web_sys::Event>) -> Result<(), JsValue> {
    match effect {
        Effect::Observe {
            observer,
            node,
            margin,
        } => {
            let Some(target) = element(node)? else {
                return Ok(());
            };
            let callback: ObserverCallback = Closure::new(move |entries: js_sys::Array| {
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    dispatch(
                        Event::Intersection {
                            observer,
                            is_intersecting: entry.is_intersecting(),
                        },
                        None,
                    );
                }
            });
            let init = IntersectionObserverInit::new();
            init.set_root_margin(&margin.to_css());
            let platform =
                IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
            platform.observe(&target);
            with_runtime(|rt| {
                rt.subscriptions.insert(
                    observer,
                    Subscription {
                        observer: platform,
                        callback,
                    },
                )
            });
        }
        Effect::Disconnect { observer } => {
            with_runtime(|rt| {
                if let Some(sub) = rt.subscriptions.remove(&observer) {
                    sub.observer.disconnect();
                    rt.spent.push(sub.callback);
                }
            });
        }
        Effect::Restyle { node, style } => {
            if let Some(el) = element(node)? {
                el.set_attribute("style", &style)?;
            }
        }
        Effect::SetAttribute { node, name, value } => {
            if let Some(el) = element(node)? {
                match value {
                    Some(value) => el.set_attribute(name, &value)?,
                    None => el.remove_attribute(name)?,
                }
            }
        }
        Effect::Render { node } => {
            let markup = with_runtime(|rt| render::region(&rt.site, &rt.page, node)).flatten();
            if let (Some(el), Some(markup)) = (element(node)?, markup) {
                el.set_inner_html(&markup.into_string());
            }
        }
        Effect::PreventDefault => {
            if let Some(event) = source {
                event.prevent_default();
            }
        }
        Effect::ScrollIntoView { target } => {
            if let Some(el) = document()?.get_element_by_id(&target) {
                let options = ScrollIntoViewOptions::new();
                options.set_behavior(ScrollBehavior::Smooth);
                el.scroll_into_view_with_scroll_into_view_options(&options);
            }
        }
        Effect::StartTimer { timer, delay } => {
            let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
            let fire = Closure::once_into_js(move || dispatch(Event::TimerFired(timer), None));
            let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
            window.set_timeout_with_callback_and_timeout_and_arguments_0(
                fire.unchecked_ref(),
                millis,
            )?;
        }
        Effect::ResetFields { node } => {
            if let Some(form) = element(node)?.and_then(|el| el.dyn_into::<HtmlFormElement>().ok()) {
                form.reset();
            }
        }
    }
    Ok(())
}

/// Element an event started on, or the nearest ancestor matching `selector`.
fn closest(event: &web_sys::Event, selector: &str) -> Option<Element> {
    event
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .and_then(|el| el.closest(selector).ok().flatten())
}

/// Lazy frame owning the `<img>` a load or error event came from.
fn image_frame(event: &web_sys::Event) -> Option<NodeId> {
    let frame = closest(event, ".lazy-frame[data-node]")?;
    frame.get_attribute("data-node")?.parse().ok()
}

fn install_listeners(window: &web_sys::Window, document: &Document) -> Result<(), JsValue> {
    let on_click = Closure::<dyn FnMut(web_sys::Event)>::new(|event: web_sys::Event| {
        if let Some(link) = closest(&event, "[data-nav]") {
            let target = link.get_attribute("data-nav").unwrap_or_default();
            dispatch(Event::NavClicked { target }, Some(&event));
        } else if closest(&event, "[data-action=\"toggle-menu\"]").is_some() {
            dispatch(Event::MenuToggled, Some(&event));
        } else if closest(&event, "[data-action=\"reset-form\"]").is_some() {
            dispatch(Event::ResetRequested, Some(&event));
        }
    });
    document.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();

    let on_submit = Closure::<dyn FnMut(web_sys::Event)>::new(|event: web_sys::Event| {
        if closest(&event, "[data-action=\"submit-contact\"]").is_some() {
            dispatch(Event::FormSubmitted, Some(&event));
        }
    });
    document.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())?;
    on_submit.forget();

    // load and error do not bubble; listen in the capture phase.
    let capture = AddEventListenerOptions::new();
    capture.set_capture(true);
    let on_load = Closure::<dyn FnMut(web_sys::Event)>::new(|event: web_sys::Event| {
        if let Some(node) = image_frame(&event) {
            dispatch(Event::ImageLoaded { node }, None);
        }
    });
    document.add_event_listener_with_callback_and_add_event_listener_options(
        "load",
        on_load.as_ref().unchecked_ref(),
        &capture,
    )?;
    on_load.forget();

    let on_error = Closure::<dyn FnMut(web_sys::Event)>::new(|event: web_sys::Event| {
        if let Some(node) = image_frame(&event) {
            warn(&format!("vitrine: image {node} failed to load"));
            dispatch(Event::ImageFailed { node }, None);
        }
    });
    document.add_event_listener_with_callback_and_add_event_listener_options(
        "error",
        on_error.as_ref().unchecked_ref(),
        &capture,
    )?;
    on_error.forget();

    // A persisted pagehide means the back/forward cache; the page may be
    // shown again and must pick up where it left off.
    let on_pagehide = Closure::<dyn FnMut(PageTransitionEvent)>::new(|event: PageTransitionEvent| {
        let effects = with_runtime(|rt| rt.page.hide(event.persisted())).unwrap_or_default();
        apply(effects, None);
        with_runtime(|rt| rt.spent.clear());
    });
    window.add_event_listener_with_callback("pagehide", on_pagehide.as_ref().unchecked_ref())?;
    on_pagehide.forget();

    let on_pageshow = Closure::<dyn FnMut(PageTransitionEvent)>::new(|event: PageTransitionEvent| {
        if event.persisted() {
            let effects = with_runtime(|rt| rt.page.resume()).unwrap_or_default();
            apply(effects, None);
        }
    });
    window.add_event_listener_with_callback("pageshow", on_pageshow.as_ref().unchecked_ref())?;
    on_pageshow.forget();

    Ok(())
}
