//! Platform service traits and desktop implementation.

use webshell_types::config::WebViewSettings;
use webshell_types::error::{Result, ShellError};
use webshell_types::event::BrowserEvent;

use crate::back::BackSubscription;

// ---------------------------------------------------------------------------
// Embedded browser
// ---------------------------------------------------------------------------

/// Abstraction over the platform's embedded web view.
///
/// Events are pulled with [`poll_events`](Self::poll_events). A
/// `ShouldStartLoad` event stays pending until the host answers it with
/// [`resolve_load`](Self::resolve_load).
pub trait EmbeddedBrowser {
    /// Apply view settings. Called once, before the first load.
    fn apply_settings(&mut self, settings: &WebViewSettings) -> Result<()>;

    /// Start loading `url` as the view's source.
    fn load_url(&mut self, url: &str) -> Result<()>;

    /// Cancel the in-progress load, if any.
    fn stop_loading(&mut self) -> Result<()>;

    /// Pop one entry of in-view history.
    fn go_back(&mut self) -> Result<()>;

    /// Drain pending events.
    fn poll_events(&mut self) -> Vec<BrowserEvent>;

    /// Answer a pending `ShouldStartLoad` for `url`.
    fn resolve_load(&mut self, url: &str, allow: bool) -> Result<()>;
}

// ---------------------------------------------------------------------------
// External URL opener
// ---------------------------------------------------------------------------

/// Hands a URL to the system's default browser or handler.
pub trait UrlOpener {
    fn open_url(&mut self, url: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// Shows a modal message with a single acknowledgment button.
pub trait AlertPresenter {
    fn show_alert(&mut self, title: &str, message: &str, button: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Hardware back button
// ---------------------------------------------------------------------------

/// Source of cancellable hardware back presses.
///
/// A handler returns `true` to consume the press. The returned subscription
/// deregisters the handler when removed or dropped.
pub trait BackButtonSource {
    fn subscribe(&self, handler: Box<dyn FnMut() -> bool>) -> BackSubscription;
}

// ---------------------------------------------------------------------------
// Desktop implementation
// ---------------------------------------------------------------------------

/// Desktop/Pi platform: opens URLs with the OS opener and reports alerts on
/// stderr.
pub struct DesktopPlatform {
    dry_run: bool,
    alerts_shown: usize,
}

impl DesktopPlatform {
    pub fn new() -> Self {
        Self {
            dry_run: false,
            alerts_shown: 0,
        }
    }

    /// A platform that only logs the URLs it would open.
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            alerts_shown: 0,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Number of alerts presented so far.
    pub fn alerts_shown(&self) -> usize {
        self.alerts_shown
    }
}

impl Default for DesktopPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlOpener for DesktopPlatform {
    fn open_url(&mut self, url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(ShellError::Opener("empty URL".into()));
        }
        if self.dry_run {
            log::info!("[dry-run] would open {url}");
            return Ok(());
        }

        webbrowser::open(url).map_err(|e| ShellError::Opener(e.to_string()))
    }
}

impl AlertPresenter for DesktopPlatform {
    fn show_alert(&mut self, title: &str, message: &str, button: &str) -> Result<()> {
        self.alerts_shown += 1;
        log::warn!("{title}: {message}");
        eprintln!("[{title}] {message}  [{button}]");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-module tests
// ---------------------------------------------------------------------------
