//! Same-page anchor navigation.

use super::Document;
use super::menu::{MenuAction, MobileMenu, MenuTransition};
use tracing::debug;

/// What one navigation did, in causal order: the menu closes first, then the
/// scroll is issued (if the anchor exists).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub menu: MenuTransition,
    pub scroll_to: Option<String>,
}

/// Close the menu and resolve `target` (`"about"` or `"#about"`) against the
/// document. A missing anchor is a silent no-op for the scroll; the menu
/// closes regardless.
pub fn navigate(target: &str, menu: &mut MobileMenu, document: &dyn Document) -> Navigation {
    let menu = menu.dispatch(MenuAction::Navigate);
    let id = target.trim_start_matches('#');
    let scroll_to = if !id.is_empty() && document.has_element(id) {
        Some(id.to_string())
    } else {
        debug!(target, "navigation target not found, not scrolling");
        None
    };
    Navigation { menu, scroll_to }
}
