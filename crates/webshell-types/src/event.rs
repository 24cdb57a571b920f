//! Platform-agnostic navigation event types.
//!
//! Every embedded-browser implementation maps its native callbacks to these
//! types. The gate and the shell never see raw platform events.

use serde::{Deserialize, Serialize};

/// URL of the blank placeholder document. Never diverted.
pub const BLANK_URL: &str = "about:blank";

/// Snapshot of the embedded browser's navigation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEvent {
    pub url: String,
    pub is_loading: bool,
    pub can_go_back: bool,
}

impl NavigationEvent {
    pub fn new(url: &str, is_loading: bool, can_go_back: bool) -> Self {
        Self {
            url: url.to_string(),
            is_loading,
            can_go_back,
        }
    }
}

/// Verdict of the navigation gate for a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateDecision {
    /// Keep loading inside the embedded view.
    Allow,
    /// Cancel the in-view load and hand the URL to the system browser.
    Divert,
    /// Pop the embedded browser's history and consume the back press.
    AllowBack,
    /// Leave the back press to the host (usually app exit).
    DelegateBack,
}

impl GateDecision {
    /// Whether this decision lets the embedded view proceed.
    pub fn permits(self) -> bool {
        matches!(self, Self::Allow | Self::AllowBack)
    }
}

/// An opaque page load failure. Network, DNS, TLS and HTTP failures are
/// not distinguished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub url: String,
    pub description: String,
}

/// Everything an embedded browser reports to its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserEvent {
    /// About to load `url`. Cancellable; answered via `resolve_load`.
    ShouldStartLoad { url: String },
    /// A page load began.
    LoadStart { url: String },
    /// A page load finished (successfully or not).
    LoadEnd { url: String },
    /// A page load failed.
    LoadError(LoadError),
    /// The navigation state changed (URL, loading flag, history).
    NavigationStateChanged(NavigationEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_event_new_copies_url() {
        let e = NavigationEvent::new("https://a.com/", true, false);
        assert_eq!(e.url, "https://a.com/");
        assert!(e.is_loading);
        assert!(!e.can_go_back);
    }

    #[test]
    fn permits_only_allowing_decisions() {
        assert!(GateDecision::Allow.permits());
        assert!(GateDecision::AllowBack.permits());
        assert!(!GateDecision::Divert.permits());
        assert!(!GateDecision::DelegateBack.permits());
    }

    #[test]
    fn browser_events_compare_by_payload() {
        let a = BrowserEvent::LoadStart {
            url: "https://a.com/".into(),
        };
        let b = BrowserEvent::LoadEnd {
            url: "https://a.com/".into(),
        };
        assert_ne!(a, b);
        assert_eq!(
            a,
            BrowserEvent::LoadStart {
                url: "https://a.com/".into()
            }
        );
    }

    #[test]
    fn load_error_variant_carries_description() {
        let e = BrowserEvent::LoadError(LoadError {
            url: "https://a.com/".into(),
            description: "connection refused".into(),
        });
        if let BrowserEvent::LoadError(err) = e {
            assert_eq!(err.description, "connection refused");
        } else {
            panic!("wrong variant");
        }
    }
}
