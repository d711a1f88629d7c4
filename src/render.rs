//! Markup for the page and for every region the engine re-renders.
//!
//! Rendering is a pure function of the content and the current [`Page`]
//! state. The static build renders the whole document once, before mount,
//! so every animated element starts at its hidden pose and every lazy frame
//! shows only its placeholder. In the browser the runtime re-renders single
//! regions through [`region`] when the engine asks for it.
//!
//! ## Markup conventions
//!
//! | Attribute | Meaning |
//! |-----------|---------|
//! | `data-node="n7"` | Element the engine addresses by [`NodeId`] |
//! | `data-reveal` | Entrance-animated element (inline style owned by the engine) |
//! | `data-nav="about"` | Click navigates to `#about` |
//! | `data-action="toggle-menu"` | Mobile menu button |
//! | `data-action="submit-contact"` | Contact form |
//! | `data-action="reset-form"` | "Send another message" |
//! | `data-stage` | Stage of a presence region: `entering`, `present`, `exiting` |
//! | `data-loaded` | Lazy frame whose image finished loading |
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.

use crate::config::SiteConfig;
use crate::content::{NavLink, Site};
use crate::engine::{FormView, LazyImage, MenuState, NodeId, Page};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use serde::{Deserialize, Serialize};

/// Id of the `<script type="application/json">` element carrying [`Bootstrap`].
pub const BOOTSTRAP_ID: &str = "vitrine-bootstrap";

/// Forces everything visible when scripting is off.
const NOSCRIPT_CSS: &str = "[data-reveal]{opacity:1!important;transform:none!important}\
.lazy-placeholder{display:none}.menu-button{display:none!important}\
.nav-links{display:flex!important;flex-wrap:wrap}";

/// What the browser runtime needs to rebuild the page state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bootstrap {
    pub site: Site,
    pub config: SiteConfig,
}

impl Bootstrap {
    /// JSON safe to inline in a `<script>` element.
    pub fn to_script_json(&self) -> Result<String, serde_json::Error> {
        Ok(serde_json::to_string(self)?.replace("</", "<\\/"))
    }
}

fn node(id: NodeId) -> String {
    id.to_string()
}

/// Current inline style of an animated element.
fn reveal_style(page: &Page, id: NodeId) -> Option<String> {
    page.reveal(id).map(|element| element.style())
}

pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

/// Renders the whole document.
pub fn document(site: &Site, page: &Page, css: &str, bootstrap_json: &str, module: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(site.lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (site.document_title()) }
                style { (PreEscaped(css)) }
                noscript { style { (PreEscaped(NOSCRIPT_CSS)) } }
            }
            body {
                (site_header(site, page))
                main {
                    (hero(site, page))
                    (about(site, page))
                    (projects(site, page))
                    (contact(site, page))
                }
                (site_footer(site))
                script type="application/json" id=(BOOTSTRAP_ID) { (PreEscaped(bootstrap_json)) }
                script type="module" { (PreEscaped(loader_script(module))) }
            }
        }
    }
}

/// Loads the engine; if that fails the page falls back to static content.
fn loader_script(module: &str) -> String {
    let module = serde_json::to_string(&format!("./{}", module.trim_start_matches("./")))
        .unwrap_or_else(|_| "\"./pkg/vitrine.js\"".to_string());
    format!(
        "import({module}).then((m) => m.default()).catch((err) => {{\
         console.warn(\"vitrine: engine unavailable\", err);\
         document.documentElement.dataset.engine = \"off\";\
         document.querySelectorAll(\".lazy-frame noscript\").forEach((n) => {{\
         n.insertAdjacentHTML(\"afterend\", n.textContent);\
         n.parentElement.dataset.loaded = \"true\";}});}});"
    )
}

/// Inner markup of a re-renderable region, or `None` if `id` is not one.
pub fn region(site: &Site, page: &Page, id: NodeId) -> Option<Markup> {
    let bp = page.blueprint();
    if id == bp.menu_button {
        Some(menu_icon(page.menu().state()))
    } else if id == bp.menu_panel {
        Some(menu_panel_contents(site, page))
    } else if id == bp.contact_view {
        Some(contact_view_contents(site, page))
    } else {
        page.image(id).map(lazy_frame_contents)
    }
}

fn nav_link(link: &NavLink, class: &str) -> Markup {
    html! {
        a class=(class) href=(format!("#{}", link.anchor())) data-nav=(link.anchor()) { (link.label) }
    }
}

fn site_header(site: &Site, page: &Page) -> Markup {
    let bp = page.blueprint();
    let state = page.menu().state();
    let panel_stage = page.menu().panel().stage().map(|s| s.as_str());
    html! {
        header.site-header {
            nav.header-inner {
                a.brand href="#home" data-nav="home" data-node=(node(bp.brand)) data-reveal
                    style=[reveal_style(page, bp.brand)] { (site.brand) }
                ul.nav-links {
                    @for link in &site.nav {
                        li { (nav_link(link, "nav-link")) }
                    }
                }
                @if let Some(cta) = &site.cta {
                    (nav_link(cta, "button cta"))
                }
                button.menu-button type="button" data-action="toggle-menu"
                    data-node=(node(bp.menu_button)) aria-controls="mobile-menu"
                    aria-expanded=(state.is_open().to_string()) aria-label=(state.button_label()) {
                    (menu_icon(state))
                }
            }
            div #mobile-menu .menu-panel data-node=(node(bp.menu_panel)) data-stage=[panel_stage] {
                (menu_panel_contents(site, page))
            }
        }
    }
}

fn menu_icon(state: MenuState) -> Markup {
    let path = match state {
        MenuState::Closed => "M4 6h16M4 12h16M4 18h16",
        MenuState::Open => "M6 6l12 12M18 6L6 18",
    };
    html! {
        svg.menu-icon viewBox="0 0 24 24" width="24" height="24" fill="none"
            stroke="currentColor" stroke-width="2" stroke-linecap="round" aria-hidden="true" {
            path d=(path) {}
        }
    }
}

fn menu_panel_contents(site: &Site, page: &Page) -> Markup {
    html! {
        @if page.menu().panel().mounted().is_some() {
            ul.menu-links {
                @for link in &site.nav {
                    li { (nav_link(link, "menu-link")) }
                }
            }
            @if let Some(cta) = &site.cta {
                (nav_link(cta, "button cta"))
            }
        }
    }
}

fn headline(site: &Site) -> Markup {
    let hero = &site.hero;
    let split = hero
        .highlight
        .as_deref()
        .filter(|h| !h.is_empty())
        .and_then(|h| hero.headline.find(h).map(|at| (at, h)));
    html! {
        @match split {
            Some((at, highlight)) => {
                (hero.headline[..at])
                span.highlight { (highlight) }
                (hero.headline[at + highlight.len()..])
            }
            None => (hero.headline),
        }
    }
}

fn hero(site: &Site, page: &Page) -> Markup {
    let bp = page.blueprint();
    html! {
        section #home .hero {
            div.hero-copy data-node=(node(bp.hero_copy)) data-reveal style=[reveal_style(page, bp.hero_copy)] {
                h1 { (headline(site)) }
                p.tagline { (site.hero.tagline) }
                div.hero-actions {
                    @for (i, action) in site.hero.actions.iter().enumerate() {
                        (nav_link(action, if i == 0 { "button" } else { "button button-secondary" }))
                    }
                }
            }
            div.hero-art data-node=(node(bp.hero_art)) data-reveal style=[reveal_style(page, bp.hero_art)] {
                @if let Some(image) = &site.hero.image {
                    img src=(image.src) alt=(image.alt);
                } @else {
                    div.hero-art-fill aria-hidden="true" {}
                }
            }
        }
    }
}

/// Heading block of a section: the heading plus its intro copy.
fn section_heading(page: &Page, id: NodeId, heading: &str, intro: Markup) -> Markup {
    html! {
        div.section-heading data-node=(node(id)) data-reveal style=[reveal_style(page, id)] {
            h2 { (heading) }
            div.section-intro { (intro) }
        }
    }
}

fn about(site: &Site, page: &Page) -> Markup {
    let bp = page.blueprint();
    let intro = html! { (PreEscaped(markdown_to_html(&site.about.intro))) };
    html! {
        section #about .about {
            (section_heading(page, bp.about_heading, &site.about.heading, intro))
            div.feature-grid {
                @for (feature, id) in site.about.features.iter().zip(&bp.features) {
                    article.feature-card data-node=(node(*id)) data-reveal style=[reveal_style(page, *id)] {
                        h3 { (feature.title) }
                        p { (feature.body) }
                    }
                }
            }
        }
    }
}

fn projects(site: &Site, page: &Page) -> Markup {
    let bp = page.blueprint();
    let intro = html! { p { (site.projects.intro) } };
    html! {
        section #projects .projects {
            (section_heading(page, bp.projects_heading, &site.projects.heading, intro))
            div.project-grid {
                @for (project, nodes) in site.projects.items.iter().zip(&bp.projects) {
                    article.project-card data-node=(node(nodes.card)) data-reveal
                        style=[reveal_style(page, nodes.card)] {
                        @if let Some(image) = page.image(nodes.image) {
                            (lazy_frame(image))
                        }
                        div.project-body {
                            h3 { (project.title) }
                            p { (project.description) }
                            @if !project.tags.is_empty() {
                                ul.tags {
                                    @for tag in &project.tags {
                                        li { (tag) }
                                    }
                                }
                            }
                            a.project-link href=(project.link) target="_blank" rel="noopener noreferrer" {
                                (site.projects.link_label) " →"
                            }
                        }
                    }
                }
            }
        }
    }
}

/// A lazy frame with its current contents. Before the image is mounted the
/// frame also carries a `<noscript>` copy so the image is never lost when
/// scripting is off.
pub fn lazy_frame(image: &LazyImage) -> Markup {
    let resource = image.resource();
    html! {
        div.lazy-frame data-node=(node(image.node())) data-loaded=[image.is_loaded().then_some("true")] {
            (lazy_frame_contents(image))
            @if !image.is_in_view() {
                noscript { img src=(resource.src) alt=(resource.alt); }
            }
        }
    }
}

fn lazy_frame_contents(image: &LazyImage) -> Markup {
    let resource = image.resource();
    html! {
        div.lazy-placeholder aria-hidden="true" {}
        @if image.is_in_view() {
            img.lazy-image src=(resource.src) alt=(resource.alt) decoding="async";
        }
    }
}

fn contact(site: &Site, page: &Page) -> Markup {
    let bp = page.blueprint();
    let stage = page.form().view().stage().map(|s| s.as_str());
    let intro = html! { p { (site.contact.intro) } };
    html! {
        section #contact .contact {
            (section_heading(page, bp.contact_heading, &site.contact.heading, intro))
            div.contact-panel data-node=(node(bp.contact_panel)) data-reveal
                style=[reveal_style(page, bp.contact_panel)] {
                div.contact-view data-node=(node(bp.contact_view)) data-stage=[stage] {
                    (contact_view_contents(site, page))
                }
            }
        }
    }
}

fn contact_view_contents(site: &Site, page: &Page) -> Markup {
    let bp = page.blueprint();
    let copy = &site.contact;
    let busy = page.form().is_busy();
    html! {
        @match page.contact_view() {
            Some(FormView::Fields) => {
                form.contact-form data-node=(node(bp.contact_form)) data-action="submit-contact"
                    aria-busy=[busy.then_some("true")] {
                    label {
                        span { (copy.name_label) }
                        input type="text" name="name" required placeholder=(copy.name_placeholder);
                    }
                    label {
                        span { (copy.email_label) }
                        input type="email" name="email" required placeholder=(copy.email_placeholder);
                    }
                    label {
                        span { (copy.message_label) }
                        textarea name="message" rows="5" required placeholder=(copy.message_placeholder) {}
                    }
                    button.button type="submit" data-node=(node(bp.submit_button)) disabled[busy] {
                        (copy.submit_label)
                    }
                }
            }
            Some(FormView::Success) => {
                div.contact-success role="status" {
                    div.success-mark aria-hidden="true" { "✓" }
                    h3 { (copy.success_title) }
                    p { (copy.success_body) }
                    button.button.button-secondary type="button" data-action="reset-form" {
                        (copy.send_another_label)
                    }
                }
            }
            None => {}
        }
    }
}

fn site_footer(site: &Site) -> Markup {
    html! {
        footer.site-footer {
            p.footer-brand { (site.brand) }
            @if !site.socials.is_empty() {
                ul.socials {
                    @for social in &site.socials {
                        li { a href=(social.url) target="_blank" rel="noopener noreferrer" { (social.label) } }
                    }
                }
            }
            p.copyright {
                @match &site.footer.copyright {
                    Some(text) => (text),
                    None => { "© " (site.brand) }
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
