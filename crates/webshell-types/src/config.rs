//! Shell configuration: home page, back-button policy, web view settings.
//!
//! Every field has a default reproducing the stock shell, so an empty TOML
//! document is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShellError};

/// Origin the stock shell is built for.
pub const DEFAULT_HOME_ORIGIN: &str = "https://staging.ieditonline.com";

/// Path under the origin that counts as home.
pub const DEFAULT_HOME_PATH: &str = "/";

/// Upper bound on events handled by a single `Shell::pump` call.
pub const DEFAULT_MAX_EVENTS_PER_PUMP: usize = 64;

// ---------------------------------------------------------------------------
// Gate configuration
// ---------------------------------------------------------------------------

/// Home origin and path the navigation gate pins the view to.
///
/// Construction validates and normalises the inputs; afterwards the value is
/// immutable. The two accepted spellings of the home URL (with and without a
/// trailing slash) are computed once here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGateConfig", into = "RawGateConfig")]
pub struct GateConfig {
    home_origin: String,
    home_path: String,
    home_url: String,
    home_url_alt: String,
}

/// Unvalidated gate fields as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawGateConfig {
    #[serde(default = "default_home_origin")]
    pub home_origin: String,
    #[serde(default = "default_home_path")]
    pub home_path: String,
}

fn default_home_origin() -> String {
    DEFAULT_HOME_ORIGIN.to_string()
}
fn default_home_path() -> String {
    DEFAULT_HOME_PATH.to_string()
}

impl TryFrom<RawGateConfig> for GateConfig {
    type Error = ShellError;

    fn try_from(raw: RawGateConfig) -> Result<Self> {
        Self::new(&raw.home_origin, &raw.home_path)
    }
}

impl From<GateConfig> for RawGateConfig {
    fn from(cfg: GateConfig) -> Self {
        Self {
            home_origin: cfg.home_origin,
            home_path: cfg.home_path,
        }
    }
}

impl GateConfig {
    /// Build a gate configuration.
    ///
    /// `home_origin` must be an absolute `http`/`https` URL with a host and
    /// nothing after it, spelled the way `url` serialises an origin
    /// (lowercase host, no default port, no credentials). A trailing `/` on the origin is dropped; a missing
    /// leading `/` on the path is added and an empty path means `/`.
    pub fn new(home_origin: &str, home_path: &str) -> Result<Self> {
        let origin = home_origin.trim().trim_end_matches('/');
        if origin.is_empty() {
            return Err(ShellError::Config("home_origin is empty".into()));
        }

        let parsed = url::Url::parse(origin)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ShellError::Config(format!(
                "home_origin must be http or https, got '{}'",
                parsed.scheme()
            )));
        }
        if parsed.host_str().is_none() {
            return Err(ShellError::Config(format!(
                "home_origin '{origin}' has no host"
            )));
        }
        if parsed.path() != "/" || parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(ShellError::Config(format!(
                "home_origin '{origin}' must not carry a path, query or fragment"
            )));
        }
        // Loads are matched by exact string, and platforms report the
        // serialised form.
        let canonical = parsed.origin().ascii_serialization();
        if canonical != origin {
            return Err(ShellError::Config(format!(
                "home_origin '{origin}' must be written as '{canonical}'"
            )));
        }

        let path = home_path.trim();
        let path = if path.is_empty() {
            DEFAULT_HOME_PATH.to_string()
        } else if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        let home_url = format!("{origin}{path}");
        let home_url_alt = match home_url.strip_suffix('/') {
            Some(bare) => bare.to_string(),
            None => format!("{home_url}/"),
        };

        Ok(Self {
            home_origin: origin.to_string(),
            home_path: path,
            home_url,
            home_url_alt,
        })
    }

    pub fn home_origin(&self) -> &str {
        &self.home_origin
    }

    pub fn home_path(&self) -> &str {
        &self.home_path
    }

    /// The URL the shell loads on mount (`home_origin + home_path`).
    pub fn home_url(&self) -> &str {
        &self.home_url
    }

    /// `home_url` with its trailing slash toggled.
    pub fn home_url_alt(&self) -> &str {
        &self.home_url_alt
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            home_origin: DEFAULT_HOME_ORIGIN.to_string(),
            home_path: DEFAULT_HOME_PATH.to_string(),
            home_url: format!("{DEFAULT_HOME_ORIGIN}{DEFAULT_HOME_PATH}"),
            home_url_alt: DEFAULT_HOME_ORIGIN.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Back-button policy
// ---------------------------------------------------------------------------

/// Hardware back-button policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackMode {
    /// Back always falls through to the host (the view has no history).
    #[default]
    Contained,
    /// Back pops in-view history when there is any.
    Navigable,
}

impl std::fmt::Display for BackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Contained => write!(f, "contained"),
            Self::Navigable => write!(f, "navigable"),
        }
    }
}

// ---------------------------------------------------------------------------
// Web view settings
// ---------------------------------------------------------------------------

/// Settings applied to the embedded browser when the shell mounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebViewSettings {
    pub javascript_enabled: bool,
    pub dom_storage_enabled: bool,
    /// Show the loading indicator until the first load finishes.
    pub start_in_loading_state: bool,
    pub scales_page_to_fit: bool,
    /// When false, `target=_blank` opens go through the same
    /// pre-navigation hook as ordinary links.
    pub support_multiple_windows: bool,
    /// Origins the web view itself accepts. The gate is stricter.
    pub origin_whitelist: Vec<String>,
}

impl Default for WebViewSettings {
    fn default() -> Self {
        Self {
            javascript_enabled: true,
            dom_storage_enabled: true,
            start_in_loading_state: true,
            scales_page_to_fit: true,
            support_multiple_windows: false,
            origin_whitelist: vec!["*".to_string()],
        }
    }
}

// ---------------------------------------------------------------------------
// Load-error alert
// ---------------------------------------------------------------------------

/// Fixed text of the one-button dialog shown on a load failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertText {
    pub title: String,
    pub message: String,
    pub button: String,
}

impl Default for AlertText {
    fn default() -> Self {
        Self {
            title: "Error".to_string(),
            message: "Failed to load the page. Please check your connection.".to_string(),
            button: "OK".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level configuration
// ---------------------------------------------------------------------------

/// `[gate]` section: the gate configuration plus the back-button policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSection {
    #[serde(flatten)]
    pub gate: GateConfig,
    #[serde(default)]
    pub back_mode: BackMode,
}

/// Complete shell configuration (`webshell.toml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub gate: GateSection,
    pub webview: WebViewSettings,
    pub alert: AlertText,
    pub max_events_per_pump: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self::strict()
    }
}

impl ShellConfig {
    /// Single-page profile: only the home page stays in view and the back
    /// button always goes to the host.
    pub fn strict() -> Self {
        Self {
            gate: GateSection {
                gate: GateConfig::default(),
                back_mode: BackMode::Contained,
            },
            webview: WebViewSettings::default(),
            alert: AlertText::default(),
            max_events_per_pump: DEFAULT_MAX_EVENTS_PER_PUMP,
        }
    }

    /// Multi-page profile: the back button walks in-view history.
    pub fn permissive() -> Self {
        let mut cfg = Self::strict();
        cfg.gate.back_mode = BackMode::Navigable;
        cfg
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(text)?;
        if cfg.max_events_per_pump == 0 {
            return Err(ShellError::Config(
                "max_events_per_pump must be at least 1".into(),
            ));
        }
        Ok(cfg)
    }

    /// Load a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ShellError::Config(format!("{}: {e}", path.display())))?;
        let cfg = Self::from_toml(&text)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_gate_targets_stock_origin() {
        let cfg = GateConfig::default();
        assert_eq!(cfg.home_origin(), "https://staging.ieditonline.com");
        assert_eq!(cfg.home_path(), "/");
        assert_eq!(cfg.home_url(), "https://staging.ieditonline.com/");
        assert_eq!(cfg.home_url_alt(), "https://staging.ieditonline.com");
    }

    #[test]
    fn default_matches_validated_construction() {
        let built = GateConfig::new(DEFAULT_HOME_ORIGIN, DEFAULT_HOME_PATH).unwrap();
        assert_eq!(built, GateConfig::default());
    }

    #[test]
    fn origin_trailing_slash_is_dropped() {
        let cfg = GateConfig::new("https://a.com/", "/").unwrap();
        assert_eq!(cfg.home_origin(), "https://a.com");
        assert_eq!(cfg.home_url(), "https://a.com/");
    }

    #[test]
    fn path_without_leading_slash_is_fixed() {
        let cfg = GateConfig::new("https://a.com", "app").unwrap();
        assert_eq!(cfg.home_path(), "/app");
        assert_eq!(cfg.home_url(), "https://a.com/app");
        assert_eq!(cfg.home_url_alt(), "https://a.com/app/");
    }

    #[test]
    fn empty_path_means_root() {
        let cfg = GateConfig::new("https://a.com", "").unwrap();
        assert_eq!(cfg.home_url(), "https://a.com/");
    }

    #[test]
    fn slash_terminated_path_alt_drops_slash() {
        let cfg = GateConfig::new("https://a.com", "/app/").unwrap();
        assert_eq!(cfg.home_url(), "https://a.com/app/");
        assert_eq!(cfg.home_url_alt(), "https://a.com/app");
    }

    #[test]
    fn rejects_empty_origin() {
        assert!(matches!(
            GateConfig::new("  ", "/"),
            Err(ShellError::Config(_))
        ));
    }

    #[test]
    fn rejects_relative_origin() {
        assert!(matches!(
            GateConfig::new("staging.ieditonline.com", "/"),
            Err(ShellError::Url(_))
        ));
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert!(matches!(
            GateConfig::new("ftp://a.com", "/"),
            Err(ShellError::Config(_))
        ));
    }

    #[test]
    fn rejects_origin_with_path_or_query() {
        assert!(GateConfig::new("https://a.com/app", "/").is_err());
        assert!(GateConfig::new("https://a.com?x=1", "/").is_err());
        assert!(GateConfig::new("https://a.com#top", "/").is_err());
    }

    #[test]
    fn rejects_non_canonical_origin() {
        for origin in [
            "https://Staging.ieditonline.com",
            "HTTPS://staging.ieditonline.com",
            "https://a.com:443",
            "http://a.com:80",
            "https://user@a.com",
        ] {
            let err = GateConfig::new(origin, "/").unwrap_err();
            assert!(matches!(err, ShellError::Config(_)), "{origin}: {err}");
        }
    }

    #[test]
    fn canonical_error_names_the_expected_spelling() {
        let err = GateConfig::new("https://Staging.ieditonline.com", "/").unwrap_err();
        assert!(err.to_string().contains("'https://staging.ieditonline.com'"));
    }

    #[test]
    fn non_default_port_is_canonical() {
        let cfg = GateConfig::new("https://a.com:8443", "/").unwrap();
        assert_eq!(cfg.home_url(), "https://a.com:8443/");
    }

    #[test]
    fn back_mode_display() {
        assert_eq!(BackMode::Contained.to_string(), "contained");
        assert_eq!(BackMode::Navigable.to_string(), "navigable");
    }

    #[test]
    fn profiles_differ_only_in_back_mode() {
        let strict = ShellConfig::strict();
        let permissive = ShellConfig::permissive();
        assert_eq!(strict.gate.back_mode, BackMode::Contained);
        assert_eq!(permissive.gate.back_mode, BackMode::Navigable);
        assert_eq!(strict.gate.gate, permissive.gate.gate);
        assert_eq!(strict.webview, permissive.webview);
    }

    #[test]
    fn empty_toml_is_strict_profile() {
        let cfg = ShellConfig::from_toml("").unwrap();
        assert_eq!(cfg, ShellConfig::strict());
    }

    #[test]
    fn full_toml_round_trips_fields() {
        let text = r#"
            max_events_per_pump = 8

            [gate]
            home_origin = "https://example.org/"
            home_path = "/app"
            back_mode = "navigable"

            [webview]
            javascript_enabled = false
            origin_whitelist = ["https://*"]

            [alert]
            title = "Oops"
        "#;
        let cfg = ShellConfig::from_toml(text).unwrap();
        assert_eq!(cfg.max_events_per_pump, 8);
        assert_eq!(cfg.gate.gate.home_url(), "https://example.org/app");
        assert_eq!(cfg.gate.back_mode, BackMode::Navigable);
        assert!(!cfg.webview.javascript_enabled);
        assert!(cfg.webview.dom_storage_enabled);
        assert_eq!(cfg.webview.origin_whitelist, vec!["https://*".to_string()]);
        assert_eq!(cfg.alert.title, "Oops");
        assert_eq!(cfg.alert.button, "OK");
    }

    #[test]
    fn invalid_origin_in_toml_is_rejected() {
        let text = r#"
            [gate]
            home_origin = "mailto:someone@example.org"
        "#;
        assert!(ShellConfig::from_toml(text).is_err());
    }

    #[test]
    fn unknown_back_mode_is_rejected() {
        let text = r#"
            [gate]
            back_mode = "sideways"
        "#;
        assert!(matches!(
            ShellConfig::from_toml(text),
            Err(ShellError::TomlParse(_))
        ));
    }

    #[test]
    fn zero_pump_budget_is_rejected() {
        assert!(matches!(
            ShellConfig::from_toml("max_events_per_pump = 0"),
            Err(ShellError::Config(_))
        ));
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("webshell.toml");
        std::fs::write(&path, "[gate]\nback_mode = \"navigable\"\n").unwrap();
        let cfg = ShellConfig::from_file(&path).unwrap();
        assert_eq!(cfg.gate.back_mode, BackMode::Navigable);
    }

    #[test]
    fn from_file_missing_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ShellConfig::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ShellError::Config(_)));
    }
}
