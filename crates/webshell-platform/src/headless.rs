//! In-memory embedded browser: history stack plus the event sequence a real
//! web view reports.
//!
//! Loads are two-phase. Resolving a `ShouldStartLoad` (or going back)
//! commits the history entry and reports `LoadStart` and a loading
//! navigation state; the next poll after the queue drains finishes the load
//! with `LoadEnd` and a settled navigation state, or with `LoadError` when a
//! failure was scripted. `stop_loading` cancels the unfinished half.

use std::collections::VecDeque;

use webshell_types::config::WebViewSettings;
use webshell_types::error::{Result, ShellError};
use webshell_types::event::{BrowserEvent, LoadError, NavigationEvent};

use crate::services::EmbeddedBrowser;

/// A single entry in the navigation history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub url: String,
    /// Monotonic commit counter, for telling repeated visits apart.
    pub sequence: u64,
}

/// Headless stand-in for a platform web view.
#[derive(Default)]
pub struct HeadlessBrowser {
    back_stack: Vec<HistoryEntry>,
    current: Option<HistoryEntry>,
    pending: VecDeque<BrowserEvent>,
    awaiting: Vec<String>,
    in_flight: Option<String>,
    fail_next: Option<String>,
    settings: Option<WebViewSettings>,
    sequence: u64,
}

impl HeadlessBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// A user-initiated link activation. Asks the host first.
    pub fn tap(&mut self, url: &str) {
        self.request(url);
    }

    /// Script-driven navigation (`history.pushState`). Commits without
    /// asking the host and reports a settled navigation state only.
    pub fn push_state(&mut self, url: &str) {
        self.commit(url);
        self.emit_state(false);
    }

    /// Make the next load fail with `description`.
    pub fn fail_next_load(&mut self, description: &str) {
        self.fail_next = Some(description.to_string());
    }

    /// Get the current URL, if any.
    pub fn current_url(&self) -> Option<&str> {
        self.current.as_ref().map(|e| e.url.as_str())
    }

    /// Check if back navigation is possible.
    pub fn can_go_back(&self) -> bool {
        !self.back_stack.is_empty()
    }

    /// Whether a load has started and not yet finished.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Settings applied by the host, if any.
    pub fn settings(&self) -> Option<&WebViewSettings> {
        self.settings.as_ref()
    }

    /// Get history entries (most recent first).
    ///
    /// Returns the current page followed by back-stack entries in
    /// reverse chronological order.
    pub fn history(&self) -> Vec<&HistoryEntry> {
        let mut entries: Vec<&HistoryEntry> = Vec::new();
        if let Some(current) = &self.current {
            entries.push(current);
        }
        for entry in self.back_stack.iter().rev() {
            entries.push(entry);
        }
        entries
    }

    fn request(&mut self, url: &str) {
        self.awaiting.push(url.to_string());
        self.pending.push_back(BrowserEvent::ShouldStartLoad {
            url: url.to_string(),
        });
    }

    /// Push current page to back stack.
    fn commit(&mut self, url: &str) {
        if let Some(entry) = self.current.take() {
            self.back_stack.push(entry);
        }
        self.sequence += 1;
        self.current = Some(HistoryEntry {
            url: url.to_string(),
            sequence: self.sequence,
        });
    }

    fn start_load(&mut self, url: &str) {
        // A new load supersedes the unfinished one.
        if let Some(prev) = self.in_flight.take() {
            self.pending.push_back(BrowserEvent::LoadEnd { url: prev });
        }
        self.in_flight = Some(url.to_string());
        self.pending.push_back(BrowserEvent::LoadStart {
            url: url.to_string(),
        });
        self.emit_state(true);
    }

    fn finish_load(&mut self) {
        let Some(url) = self.in_flight.take() else {
            return;
        };
        if let Some(description) = self.fail_next.take() {
            self.pending.push_back(BrowserEvent::LoadError(LoadError {
                url: url.clone(),
                description,
            }));
        }
        self.pending.push_back(BrowserEvent::LoadEnd { url });
        self.emit_state(false);
    }

    fn emit_state(&mut self, is_loading: bool) {
        let url = self.current_url().unwrap_or_default().to_string();
        let event = NavigationEvent::new(&url, is_loading, self.can_go_back());
        self.pending
            .push_back(BrowserEvent::NavigationStateChanged(event));
    }
}

impl EmbeddedBrowser for HeadlessBrowser {
    fn apply_settings(&mut self, settings: &WebViewSettings) -> Result<()> {
        self.settings = Some(settings.clone());
        Ok(())
    }

    fn load_url(&mut self, url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(ShellError::Browser("cannot load an empty URL".into()));
        }
        self.request(url);
        Ok(())
    }

    fn stop_loading(&mut self) -> Result<()> {
        if let Some(url) = self.in_flight.take() {
            log::debug!("headless: stopped loading {url}");
            self.pending.push_back(BrowserEvent::LoadEnd { url });
            self.emit_state(false);
        }
        Ok(())
    }

    fn go_back(&mut self) -> Result<()> {
        let Some(prev) = self.back_stack.pop() else {
            log::debug!("headless: go_back with empty history ignored");
            return Ok(());
        };
        let url = prev.url.clone();
        self.current = Some(prev);
        self.start_load(&url);
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<BrowserEvent> {
        if self.pending.is_empty() && self.awaiting.is_empty() {
            self.finish_load();
        }
        self.pending.drain(..).collect()
    }

    fn resolve_load(&mut self, url: &str, allow: bool) -> Result<()> {
        let Some(pos) = self.awaiting.iter().position(|u| u == url) else {
            return Err(ShellError::Browser(format!("no pending load for {url}")));
        };
        self.awaiting.remove(pos);
        if allow {
            self.commit(url);
            self.start_load(url);
        }
        Ok(())
    }
}
