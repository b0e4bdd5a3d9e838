// Opens analytics URLs in the user's default browser. The url always travels
// as a single argv element; nothing here ever interpolates it into a shell
// command line.

use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{AgentError, Result};
use crate::observer::{AgentObserver, DispatchRecord};
use crate::trigger::TriggerIntent;

pub trait Dispatcher: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

/// Launches the platform's default-browser handler.
#[derive(Debug, Default)]
pub struct BrowserDispatcher;

impl Dispatcher for BrowserDispatcher {
    fn open(&self, url: &str) -> Result<()> {
        open_in_default_browser(url)
    }
}

#[cfg(target_os = "windows")]
fn open_in_default_browser(url: &str) -> Result<()> {
    use std::os::windows::process::CommandExt;
    const CREATE_NO_WINDOW: u32 = 0x08000000;

    // `start` only exists inside cmd, so the url passes through one cmd
    // parse; it must be caret-escaped and quoted. The empty "" is the window
    // title slot.
    let mut command = Command::new("cmd");
    command.creation_flags(CREATE_NO_WINDOW);
    command.args(["/C", "start", ""]);
    command.arg(escape_for_cmd_start(url));
    command
        .spawn()
        .map(|_| ())
        .map_err(|e| AgentError::Dispatch(format!("failed to launch browser: {}", e)))
}

#[cfg(target_os = "macos")]
fn open_in_default_browser(url: &str) -> Result<()> {
    Command::new("open")
        .arg(url)
        .spawn()
        .map(|_| ())
        .map_err(|e| AgentError::Dispatch(format!("failed to launch browser: {}", e)))
}

#[cfg(all(unix, not(target_os = "macos")))]
fn open_in_default_browser(url: &str) -> Result<()> {
    Command::new("xdg-open")
        .arg(url)
        .spawn()
        .map(|_| ())
        .map_err(|e| AgentError::Dispatch(format!("failed to launch browser: {}", e)))
}

/// Escape a url for the tail of `cmd /C start "" <url>`. Metacharacters get a
/// caret, percent signs double, line breaks are stripped outright.
pub fn escape_for_cmd_start(url: &str) -> String {
    let mut escaped = String::with_capacity(url.len() + 8);
    for ch in url.chars() {
        match ch {
            '\n' | '\r' => {}
            '%' => escaped.push_str("%%"),
            '&' | '|' | '<' | '>' | '^' | '"' | '\'' | ';' | '$' | '`' => {
                escaped.push('^');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Single-quote a url for POSIX shells. Only needed where no direct argv
/// launcher exists; the built-in launchers above never consult a shell.
pub fn quote_for_posix_shell(url: &str) -> String {
    let mut quoted = String::with_capacity(url.len() + 2);
    quoted.push('\'');
    for ch in url.chars() {
        match ch {
            '\'' => quoted.push_str("'\\''"),
            '\n' | '\r' => {}
            _ => quoted.push(ch),
        }
    }
    quoted.push('\'');
    quoted
}

/// Open an intent's url after the configured delay. The delay is cancellable:
/// shutdown and session boundaries revoke pending opens, because their
/// fingerprints belong to the session that scheduled them.
pub fn spawn_dispatch(
    dispatcher: Arc<dyn Dispatcher>,
    observer: Arc<dyn AgentObserver>,
    intent: TriggerIntent,
    delay: Duration,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if !delay.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(url = %intent.url, "pending dispatch cancelled");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        } else if cancel.is_cancelled() {
            return;
        }
        match dispatcher.open(&intent.url) {
            Ok(()) => observer.on_dispatch(&DispatchRecord {
                feature: intent.feature,
                url: intent.url,
                at: Utc::now(),
            }),
            Err(err) => {
                warn!(%err, url = %intent.url, "browser dispatch failed");
                observer.on_error(&err);
            }
        }
    })
}
