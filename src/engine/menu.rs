//! Mobile menu state.
//!
//! Two states, two actions: `toggle` flips between closed and open,
//! `navigate` forces closed from either. The panel's expand/collapse is a
//! presence region driven by the state; it is purely presentational and
//! never holds up input: a toggle during an animation changes the state at
//! once and the panel catches up.

use super::presence::{Change, Presence};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

impl MenuState {
    pub fn apply(self, action: MenuAction) -> MenuState {
        match (self, action) {
            (_, MenuAction::Navigate) => MenuState::Closed,
            (MenuState::Closed, MenuAction::Toggle) => MenuState::Open,
            (MenuState::Open, MenuAction::Toggle) => MenuState::Closed,
        }
    }

    pub fn is_open(self) -> bool {
        self == MenuState::Open
    }

    /// Accessible name of the menu button, describing what a click does.
    pub fn button_label(self) -> &'static str {
        match self {
            MenuState::Closed => "Open menu",
            MenuState::Open => "Close menu",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Toggle,
    Navigate,
}

/// Outcome of one menu action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuTransition {
    pub from: MenuState,
    pub to: MenuState,
    pub panel: Change<()>,
}

impl MenuTransition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

#[derive(Debug, Clone)]
pub struct MobileMenu {
    state: MenuState,
    panel: Presence<()>,
}

impl Default for MobileMenu {
    fn default() -> Self {
        Self::new()
    }
}

impl MobileMenu {
    pub fn new() -> Self {
        Self {
            state: MenuState::Closed,
            panel: Presence::empty(),
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn panel(&self) -> &Presence<()> {
        &self.panel
    }

    pub fn dispatch(&mut self, action: MenuAction) -> MenuTransition {
        let from = self.state;
        let to = from.apply(action);
        self.state = to;
        let panel = self.panel.request(to.is_open().then_some(()));
        if from != to {
            debug!(?from, ?to, ?action, "menu transition");
        }
        MenuTransition { from, to, panel }
    }

    pub fn panel_stage_ended(&mut self, epoch: u64) -> Change<()> {
        self.panel.stage_ended(epoch)
    }
}
