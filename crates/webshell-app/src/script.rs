//! Line-oriented event script driving the headless shell.
//!
//! ```text
//! tap https://example.com/     # user activates a link
//! js  https://example.com/a    # page script changes the URL
//! fail offline                 # next load fails
//! back                         # hardware back press
//! state                        # print shell state as JSON
//! quit
//! ```

use anyhow::{Result, bail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    Tap(String),
    Js(String),
    Fail(String),
    Back,
    State,
    Quit,
}

/// Parse one script line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ScriptCommand>> {
    // `#` starts a comment only at line start or after whitespace, so URL
    // fragments survive.
    let line = if line.trim_start().starts_with('#') {
        ""
    } else {
        line.split_once(" #").map_or(line, |(code, _)| code).trim()
    };
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let cmd = match (verb, rest.is_empty()) {
        ("tap", false) => ScriptCommand::Tap(rest.to_string()),
        ("js", false) => ScriptCommand::Js(rest.to_string()),
        ("fail", _) => ScriptCommand::Fail(if rest.is_empty() {
            "load failed".to_string()
        } else {
            rest.to_string()
        }),
        ("back", true) => ScriptCommand::Back,
        ("state", true) => ScriptCommand::State,
        ("quit" | "exit", true) => ScriptCommand::Quit,
        ("tap" | "js", true) => bail!("'{verb}' needs a URL"),
        _ => bail!("unknown command: {line}"),
    };
    Ok(Some(cmd))
}
