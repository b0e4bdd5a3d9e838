// Discovery of the running client and its ephemeral credentials. The process
// command line is the primary source; the lockfile next to the install is the
// fallback when the command line is unreadable.

use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use sysinfo::{ProcessesToUpdate, System};
use tracing::debug;

use crate::error::{AgentError, Result};

const CLIENT_PROCESS_NAMES: [&str; 2] = ["leagueclientux.exe", "leagueclientux"];
const LOCKFILE_NAMES: [&str; 3] = ["lockfile", "LeagueClientUx.lockfile", "LeagueClient.lockfile"];
const PORT_ARG: &str = "--app-port=";
const TOKEN_ARG: &str = "--remoting-auth-token=";

/// Ephemeral credentials for one client process. Immutable once acquired;
/// the generation bumps on each reacquisition so stale copies are detectable.
#[derive(Clone)]
pub struct Credentials {
    pub host: IpAddr,
    pub port: u16,
    pub token: String,
    pub protocol: String,
    pub generation: u64,
}

// The token never reaches logs, so Debug keeps it out.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("token", &"<redacted>")
            .field("protocol", &self.protocol)
            .field("generation", &self.generation)
            .finish()
    }
}

pub struct ClientLocator {
    install_dir: Option<PathBuf>,
    generation: u64,
    system: System,
}

impl ClientLocator {
    pub fn new(install_dir: Option<PathBuf>) -> Self {
        ClientLocator {
            install_dir,
            generation: 0,
            system: System::new(),
        }
    }

    /// Locate the client and yield fresh credentials, or fail with
    /// `ClientNotRunning` when neither source produces a complete record.
    pub fn acquire(&mut self) -> Result<Credentials> {
        if let Some((port, token)) = self.scan_process_table() {
            return Ok(self.credentials(port, token, "https".to_string()));
        }
        if let Some(dir) = self.install_dir.clone() {
            match read_lockfile_in(&dir) {
                Ok(Some((port, token, protocol))) => {
                    return Ok(self.credentials(port, token, protocol));
                }
                Ok(None) => {}
                Err(err) => return Err(err),
            }
        }
        Err(AgentError::ClientNotRunning)
    }

    fn credentials(&mut self, port: u16, token: String, protocol: String) -> Credentials {
        self.generation += 1;
        debug!(port, generation = self.generation, "acquired client credentials");
        Credentials {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port,
            token,
            protocol,
            generation: self.generation,
        }
    }

    fn scan_process_table(&mut self) -> Option<(u16, String)> {
        self.system.refresh_processes(ProcessesToUpdate::All, true);
        for process in self.system.processes().values() {
            let name = process.name().to_string_lossy().to_ascii_lowercase();
            if !CLIENT_PROCESS_NAMES.contains(&name.as_str()) {
                continue;
            }
            let args: Vec<String> = process
                .cmd()
                .iter()
                .map(|arg| arg.to_string_lossy().into_owned())
                .collect();
            if let Some(found) = parse_command_line(&args) {
                return Some(found);
            }
        }
        None
    }
}

/// Extract `--app-port` and `--remoting-auth-token` from a client command
/// line. Both must be present for a usable record.
pub fn parse_command_line(args: &[String]) -> Option<(u16, String)> {
    let mut port = None;
    let mut token = None;
    for arg in args {
        if let Some(value) = arg.strip_prefix(PORT_ARG) {
            port = value.parse::<u16>().ok();
        } else if let Some(value) = arg.strip_prefix(TOKEN_ARG) {
            if !value.is_empty() {
                token = Some(value.to_string());
            }
        }
    }
    Some((port?, token?))
}

/// Parse the `name:pid:port:token:protocol` lockfile record.
pub fn parse_lockfile(content: &str) -> Result<(u16, String, String)> {
    let parts: Vec<&str> = content.trim().split(':').collect();
    if parts.len() < 5 {
        return Err(AgentError::CredentialParse(format!(
            "lockfile has {} fields, expected 5",
            parts.len()
        )));
    }
    let port: u16 = parts[2]
        .parse()
        .map_err(|_| AgentError::CredentialParse(format!("bad lockfile port {:?}", parts[2])))?;
    if parts[3].is_empty() {
        return Err(AgentError::CredentialParse("empty lockfile token".into()));
    }
    Ok((port, parts[3].to_string(), parts[4].to_string()))
}

fn read_lockfile_in(dir: &Path) -> Result<Option<(u16, String, String)>> {
    for name in LOCKFILE_NAMES {
        let path = dir.join(name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
            Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(AgentError::PermissionDenied(path.display().to_string()));
            }
            Err(_) => continue,
        };
        match parse_lockfile(&content) {
            Ok(record) => {
                debug!(path = %path.display(), "read credentials from lockfile");
                return Ok(Some(record));
            }
            Err(err) => return Err(err),
        }
    }
    Ok(None)
}
