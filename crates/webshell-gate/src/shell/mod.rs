//! The single-page shell: gate verdicts turned into platform side effects.
//!
//! All handlers run synchronously on the caller's thread. Collaborator
//! failures inside a handler are logged and swallowed so that no browser
//! event can take the shell down.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde::Serialize;

use webshell_platform::{
    AlertPresenter, BackButtonSource, BackSubscription, EmbeddedBrowser, UrlOpener,
};
use webshell_types::config::{AlertText, ShellConfig, WebViewSettings};
use webshell_types::error::Result;
use webshell_types::event::{BrowserEvent, LoadError, NavigationEvent};

use crate::gate::NavigationGate;

/// Presentation state, updated by the event handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShellState {
    pub loading: bool,
    pub can_go_back: bool,
    pub current_url: Option<String>,
    /// URLs handed to the system browser so far.
    pub diverted: usize,
}

/// Owns the gate and the platform collaborators.
pub struct Shell<B, O, A> {
    gate: NavigationGate,
    webview: WebViewSettings,
    alert: AlertText,
    max_events_per_pump: usize,
    browser: B,
    opener: O,
    alerts: A,
    state: ShellState,
    /// Polled but not yet dispatched; drained before the next poll.
    queued: VecDeque<BrowserEvent>,
}

impl<B, O, A> Shell<B, O, A>
where
    B: EmbeddedBrowser,
    O: UrlOpener,
    A: AlertPresenter,
{
    pub fn new(config: ShellConfig, browser: B, opener: O, alerts: A) -> Self {
        let ShellConfig {
            gate,
            webview,
            alert,
            max_events_per_pump,
        } = config;
        Self {
            gate: NavigationGate::new(gate.gate, gate.back_mode),
            webview,
            alert,
            max_events_per_pump: max_events_per_pump.max(1),
            browser,
            opener,
            alerts,
            state: ShellState::default(),
            queued: VecDeque::new(),
        }
    }

    pub fn gate(&self) -> &NavigationGate {
        &self.gate
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    pub fn browser_mut(&mut self) -> &mut B {
        &mut self.browser
    }

    pub fn opener(&self) -> &O {
        &self.opener
    }

    pub fn alerts(&self) -> &A {
        &self.alerts
    }

    /// Whether the loading overlay should be drawn.
    pub fn loading_indicator_visible(&self) -> bool {
        self.state.loading && self.webview.start_in_loading_state
    }

    /// Apply the view settings and start loading the home page.
    pub fn start(&mut self) -> Result<()> {
        self.browser.apply_settings(&self.webview)?;
        let home = self.gate.config().home_url().to_string();
        log::info!("Loading {home} ({} back mode)", self.gate.back_mode());
        self.browser.load_url(&home)
    }

    /// Pre-navigation hook. Returns `true` to let the load continue.
    pub fn on_should_start_load(&mut self, url: &str) -> bool {
        if self.gate.evaluate_load(url).permits() {
            return true;
        }
        self.divert(url);
        false
    }

    /// Post-navigation hook. Catches script-driven navigation that never
    /// went through [`on_should_start_load`](Self::on_should_start_load).
    pub fn on_navigation_state_change(&mut self, event: &NavigationEvent) {
        self.state.can_go_back = event.can_go_back;
        self.state.current_url = Some(event.url.clone());
        // Evaluating mid-load would race the pre-navigation hook.
        if !event.is_loading && !self.gate.evaluate_load(&event.url).permits() {
            self.divert(&event.url);
        }
    }

    pub fn on_load_start(&mut self, url: &str) {
        log::debug!("load start: {url}");
        self.state.loading = true;
    }

    pub fn on_load_end(&mut self, url: &str) {
        log::debug!("load end: {url}");
        self.state.loading = false;
    }

    /// Report a failed load with the fixed one-button dialog.
    pub fn on_load_error(&mut self, error: &LoadError) {
        self.state.loading = false;
        log::warn!("Failed to load {}: {}", error.url, error.description);
        if let Err(e) = self
            .alerts
            .show_alert(&self.alert.title, &self.alert.message, &self.alert.button)
        {
            log::error!("Couldn't show load error alert: {e}");
        }
    }

    /// Hardware back press. Returns whether the press was consumed.
    pub fn on_hardware_back(&mut self) -> bool {
        if !self.gate.evaluate_back(self.state.can_go_back).permits() {
            return false;
        }
        if let Err(e) = self.browser.go_back() {
            log::warn!("go_back failed: {e}");
        }
        true
    }

    /// Route one browser event to its handler.
    pub fn dispatch(&mut self, event: BrowserEvent) {
        match event {
            BrowserEvent::ShouldStartLoad { url } => {
                let allow = self.on_should_start_load(&url);
                if let Err(e) = self.browser.resolve_load(&url, allow) {
                    log::warn!("Couldn't resolve load of {url}: {e}");
                }
            },
            BrowserEvent::LoadStart { url } => self.on_load_start(&url),
            BrowserEvent::LoadEnd { url } => self.on_load_end(&url),
            BrowserEvent::LoadError(error) => self.on_load_error(&error),
            BrowserEvent::NavigationStateChanged(nav) => self.on_navigation_state_change(&nav),
        }
    }

    /// Drain and dispatch browser events until the browser goes quiet or the
    /// per-call budget runs out. Returns the number of events handled.
    ///
    /// Events left over when the budget runs out stay queued and are
    /// dispatched first on the next call, so nothing is lost.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        loop {
            if self.queued.is_empty() {
                self.queued.extend(self.browser.poll_events());
            }
            if self.queued.is_empty() {
                return handled;
            }
            if handled == self.max_events_per_pump {
                log::debug!(
                    "Event budget of {} reached, deferring {} event(s)",
                    self.max_events_per_pump,
                    self.queued.len()
                );
                return handled;
            }
            if let Some(event) = self.queued.pop_front() {
                self.dispatch(event);
                handled += 1;
            }
        }
    }

    /// Events polled from the browser but not yet dispatched.
    pub fn deferred_events(&self) -> usize {
        self.queued.len()
    }

    /// Cancel the in-view load, open `url` externally, and step the view
    /// back. Each step is best-effort.
    fn divert(&mut self, url: &str) {
        log::info!("Diverting {url} to the system browser");
        self.state.diverted += 1;
        if let Err(e) = self.browser.stop_loading() {
            log::warn!("stop_loading failed: {e}");
        }
        if let Err(e) = self.opener.open_url(url) {
            log::error!("Couldn't open link {url}: {e}");
        }
        // No-op when the diverted load was the first navigation.
        if let Err(e) = self.browser.go_back() {
            log::debug!("go_back after divert failed: {e}");
        }
    }
}

impl<B, O, A> Shell<B, O, A>
where
    B: EmbeddedBrowser + 'static,
    O: UrlOpener + 'static,
    A: AlertPresenter + 'static,
{
    /// Start the shell and register its back-button handler.
    ///
    /// The handler holds only a weak reference; once the returned
    /// [`MountedShell`] is unmounted or dropped it is never invoked again.
    pub fn mount(mut self, back: &impl BackButtonSource) -> Result<MountedShell<B, O, A>> {
        self.start()?;
        let shell = Rc::new(RefCell::new(self));
        let weak = Rc::downgrade(&shell);
        let subscription = back.subscribe(Box::new(move || {
            let Some(shell) = weak.upgrade() else {
                return false;
            };
            match shell.try_borrow_mut() {
                Ok(mut shell) => shell.on_hardware_back(),
                Err(_) => {
                    log::warn!("Back press while the shell is busy; delegating");
                    false
                },
            }
        }));
        Ok(MountedShell {
            shell,
            subscription: Some(subscription),
        })
    }
}

/// A started shell with its back-button registration.
pub struct MountedShell<B, O, A> {
    shell: Rc<RefCell<Shell<B, O, A>>>,
    subscription: Option<BackSubscription>,
}

impl<B, O, A> MountedShell<B, O, A>
where
    B: EmbeddedBrowser,
    O: UrlOpener,
    A: AlertPresenter,
{
    /// Run `f` against the shell.
    pub fn with<R>(&self, f: impl FnOnce(&mut Shell<B, O, A>) -> R) -> R {
        f(&mut *self.shell.borrow_mut())
    }

    /// See [`Shell::pump`].
    pub fn pump(&self) -> usize {
        self.with(|shell| shell.pump())
    }

    pub fn state(&self) -> ShellState {
        self.shell.borrow().state.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(BackSubscription::is_active)
    }

    /// Deregister the back-button handler and hand the shell back.
    pub fn unmount(mut self) -> Option<Shell<B, O, A>> {
        if let Some(subscription) = self.subscription.take() {
            subscription.remove();
        }
        Rc::try_unwrap(self.shell).ok().map(RefCell::into_inner)
    }
}
