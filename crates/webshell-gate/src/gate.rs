//! The navigation gate.

use webshell_types::config::{BackMode, GateConfig};
use webshell_types::event::{BLANK_URL, GateDecision};

/// Decides where each navigation goes.
///
/// Holds no state besides its configuration, so every evaluation is
/// independent and repeated evaluations of the same input agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationGate {
    config: GateConfig,
    back_mode: BackMode,
}

impl NavigationGate {
    pub fn new(config: GateConfig, back_mode: BackMode) -> Self {
        Self { config, back_mode }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn back_mode(&self) -> BackMode {
        self.back_mode
    }

    /// Whether `url` is exactly the home page, with or without its trailing
    /// slash. Other paths on the same origin do not count.
    pub fn is_home(&self, url: &str) -> bool {
        url == self.config.home_url() || url == self.config.home_url_alt()
    }

    /// `Allow` for the blank placeholder and the home page, `Divert` for
    /// everything else.
    pub fn evaluate_load(&self, url: &str) -> GateDecision {
        let decision = if url.is_empty() || url == BLANK_URL || self.is_home(url) {
            GateDecision::Allow
        } else {
            GateDecision::Divert
        };
        log::debug!("load '{url}' -> {decision:?}");
        decision
    }

    /// `AllowBack` only in navigable mode with history to pop.
    pub fn evaluate_back(&self, can_go_back: bool) -> GateDecision {
        let decision = match self.back_mode {
            BackMode::Contained => GateDecision::DelegateBack,
            BackMode::Navigable if can_go_back => GateDecision::AllowBack,
            BackMode::Navigable => GateDecision::DelegateBack,
        };
        log::debug!("back (can_go_back={can_go_back}, {}) -> {decision:?}", self.back_mode);
        decision
    }
}
