// Browsing mode resolution and the mode -> theme state machine.

use serde::{Deserialize, Serialize};

use crate::modules::signal::{ActivationSignal, EXTRA_PRIVATE_BROWSING_MODE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BrowsingMode {
    #[default]
    Normal,
    Private,
}

impl BrowsingMode {
    pub fn from_private(is_private: bool) -> Self {
        if is_private {
            Self::Private
        } else {
            Self::Normal
        }
    }

    pub fn is_private(self) -> bool {
        self == Self::Private
    }
}

/// Receives theme changes. Called synchronously, before the next frame.
pub trait ThemeSink {
    fn set_theme(&mut self, mode: BrowsingMode);
}

/// Mode for a fresh activation. Strips the private-mode extra so later
/// handlers never see it.
pub fn resolve_initial_mode(signal: &mut ActivationSignal) -> BrowsingMode {
    resolve_mode(signal, BrowsingMode::Normal)
}

/// Like [`resolve_initial_mode`] but keeps `fallback` when the signal does not
/// carry the private-mode extra (re-activation path).
pub fn resolve_mode(signal: &mut ActivationSignal, fallback: BrowsingMode) -> BrowsingMode {
    match signal.take_bool_extra(EXTRA_PRIVATE_BROWSING_MODE) {
        Some(is_private) => BrowsingMode::from_private(is_private),
        None => fallback,
    }
}

/// A displayed session always wins over the current mode.
pub fn reconcile_with_session(current: BrowsingMode, session_is_private: bool) -> BrowsingMode {
    let session_mode = BrowsingMode::from_private(session_is_private);
    if session_mode != current {
        session_mode
    } else {
        current
    }
}

/// Owns the single active mode and keeps the theme in lockstep with it.
pub struct ModeController {
    mode: BrowsingMode,
    theme: Box<dyn ThemeSink>,
}

impl ModeController {
    pub fn new(theme: Box<dyn ThemeSink>) -> Self {
        Self {
            mode: BrowsingMode::Normal,
            theme,
        }
    }

    pub fn mode(&self) -> BrowsingMode {
        self.mode
    }

    /// First application at startup; the theme is always told once.
    pub fn apply_initial(&mut self, mode: BrowsingMode) {
        self.mode = mode;
        self.theme.set_theme(mode);
        log::info!("[Mode] Initial mode: {:?}", mode);
    }

    /// Returns true if the mode changed.
    pub fn apply(&mut self, mode: BrowsingMode) -> bool {
        if self.mode == mode {
            return false;
        }
        log::info!("[Mode] {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        self.theme.set_theme(mode);
        true
    }
}
