//! # Vitrine
//!
//! A single-page portfolio builder. The page (hero, about, projects, contact)
//! is rendered once from a content directory; in the browser a small engine
//! compiled to wasm takes over and discloses the page progressively as the
//! visitor scrolls.
//!
//! # Architecture: Build Once, Disclose at Runtime
//!
//! ```text
//! content/  ──► content + config ──► Page (engine state) ──► render ──► dist/index.html
//!                                         │
//!                  browser: web ◄─────────┘ same Page, rebuilt from the bootstrap JSON
//!                  headless: simulate ◄───┘
//! ```
//!
//! The build embeds the parsed content and config into the page as JSON. The
//! wasm entry point reads it back, rebuilds the same [`engine::Page`], and
//! from then on only feeds it events and applies the effects it answers
//! with. Node ids are allocated deterministically from content order, so the
//! markup and the runtime agree on which element is which.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`content`] | `site.toml` + `about.md`: every piece of copy on the page |
//! | [`config`] | `config.toml`: motion, timing, colors; merged over stock defaults |
//! | [`engine`] | The disclosure engine: observers, reveals, lazy images, menu, form |
//! | [`render`] | Maud markup for the whole page and for each re-renderable region |
//! | [`generate`] | Build pipeline: load, render, write `index.html`, copy assets |
//! | [`simulate`] | Headless host: geometry, virtual clock, effect trace |
//! | [`output`] | CLI output formatting |
//! | `web` | wasm32 host binding against the real DOM |
//!
//! # Design Decisions
//!
//! ## Events In, Effects Out
//!
//! The engine never holds a DOM handle. Hosts translate platform callbacks
//! into [`engine::Event`]s and apply the returned [`engine::Effect`]s. The
//! browser binding and the simulator are both thin, and every behavior of the
//! page can be tested without a browser.
//!
//! ## Fail Open
//!
//! Content is never hidden behind the engine. Without JavaScript a
//! `<noscript>` stylesheet drops the hidden poses and each lazy frame carries
//! a `<noscript>` image. If the module fails to load the loader script marks
//! the document and shows everything. If the browser has no intersection
//! observer every element is treated as already in view.

pub mod config;
pub mod content;
pub mod engine;
pub mod generate;
pub mod output;
pub mod render;
pub mod simulate;

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(test)]
pub(crate) mod test_helpers;
