//! WebShell desktop entry point.
//!
//! Runs the single-page shell against the headless browser and feeds it an
//! event script from stdin (see `script.rs`). Diverted links open in the
//! system browser unless `WEBSHELL_DRY_RUN` is set. An unconsumed back
//! press exits, as the host's default would.
//!
//! Usage: `webshell-app [config.toml]` (or `WEBSHELL_CONFIG=...`).

mod script;

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, Result};

use script::{ScriptCommand, parse_line};
use webshell_gate::Shell;
use webshell_platform::{BackHandler, DesktopPlatform, HeadlessBrowser};
use webshell_types::config::ShellConfig;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    log::info!(
        "Starting WebShell (home {}, {} back mode)",
        config.gate.gate.home_url(),
        config.gate.back_mode,
    );

    let dry_run = std::env::var_os("WEBSHELL_DRY_RUN").is_some();
    let platform = || {
        if dry_run {
            DesktopPlatform::dry_run()
        } else {
            DesktopPlatform::new()
        }
    };

    let back = BackHandler::new();
    let shell = Shell::new(config, HeadlessBrowser::new(), platform(), platform());
    let mounted = shell.mount(&back).context("mounting shell")?;
    mounted.pump();

    let stdin = std::io::stdin();
    for (lineno, line) in stdin.lock().lines().enumerate() {
        let line = line.context("reading event script")?;
        let cmd = match parse_line(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                log::warn!("line {}: {e}", lineno + 1);
                continue;
            },
        };

        match cmd {
            ScriptCommand::Tap(url) => mounted.with(|s| s.browser_mut().tap(&url)),
            ScriptCommand::Js(url) => mounted.with(|s| s.browser_mut().push_state(&url)),
            ScriptCommand::Fail(reason) => mounted.with(|s| s.browser_mut().fail_next_load(&reason)),
            ScriptCommand::Back => {
                if !back.press() {
                    log::info!("Back press not consumed; exiting");
                    break;
                }
            },
            ScriptCommand::State => {
                println!("{}", serde_json::to_string(&mounted.state())?);
            },
            ScriptCommand::Quit => break,
        }
        let handled = mounted.pump();
        log::debug!("handled {handled} browser event(s)");
    }

    if mounted.unmount().is_none() {
        log::warn!("Shell still referenced at teardown");
    }
    log::info!("WebShell shut down");
    Ok(())
}

/// Config from the first CLI arg, `WEBSHELL_CONFIG`, or the strict profile.
fn load_config() -> Result<ShellConfig> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("WEBSHELL_CONFIG").ok())
        .map(PathBuf::from);
    match path {
        Some(path) => ShellConfig::from_file(&path)
            .with_context(|| format!("loading config {}", path.display())),
        None => {
            log::info!("No config given; using the strict profile");
            Ok(ShellConfig::strict())
        },
    }
}
