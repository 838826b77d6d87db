//! Capability traits for every operation that can reveal the host's identity.
//!
//! Each trait has a real implementation backed by the operating system and a
//! shielded wrapper in [`shielded`] that consults the active profile first.

pub mod http;
pub mod shielded;

pub use http::ReqwestGateway;
pub use shielded::{ShieldedFiles, ShieldedIdentity, ShieldedNetwork, ShieldedProcess};

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use async_trait::async_trait;
use directories::BaseDirs;
use thiserror::Error;

use crate::request_policy::{CannedResponse, Payload};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub username: String,
    pub homedir: PathBuf,
}

pub trait IdentityGateway: Send + Sync {
    fn hostname(&self) -> String;
    fn user_info(&self) -> UserInfo;
}

/// Reads identity from the environment and the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIdentityGateway;

fn env_value(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

#[cfg(unix)]
fn os_hostname() -> Option<String> {
    let mut buf = [0u8; 256];
    #[allow(unsafe_code)]
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
    if rc != 0 {
        return None;
    }
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    let name = String::from_utf8_lossy(&buf[..end]).trim().to_string();
    (!name.is_empty()).then_some(name)
}

#[cfg(not(unix))]
fn os_hostname() -> Option<String> {
    env_value(&["COMPUTERNAME"])
}

impl IdentityGateway for SystemIdentityGateway {
    /// Empty when the OS reports no name; callers then build no hostname pair.
    fn hostname(&self) -> String {
        os_hostname().unwrap_or_default()
    }

    fn user_info(&self) -> UserInfo {
        UserInfo {
            username: env_value(&["USER", "USERNAME"]).unwrap_or_default(),
            homedir: BaseDirs::new()
                .map(|dirs| dirs.home_dir().to_path_buf())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata {
    pub ino: u64,
    pub len: u64,
    pub is_dir: bool,
}

pub trait FileGateway: Send + Sync {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
    fn metadata(&self, path: &Path) -> io::Result<FileMetadata>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileGateway;

impl FileGateway for StdFileGateway {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn metadata(&self, path: &Path) -> io::Result<FileMetadata> {
        let meta = std::fs::metadata(path)?;
        #[cfg(unix)]
        let ino = {
            use std::os::unix::fs::MetadataExt;
            meta.ino()
        };
        #[cfg(not(unix))]
        let ino = 0;
        Ok(FileMetadata {
            ino,
            len: meta.len(),
            is_dir: meta.is_dir(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

pub trait ProcessGateway: Send + Sync {
    fn run(&self, command: &str) -> io::Result<CommandOutput>;
}

/// Runs command lines through the platform shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellProcessGateway;

impl ProcessGateway for ShellProcessGateway {
    fn run(&self, command: &str) -> io::Result<CommandOutput> {
        let output = if cfg!(windows) {
            Command::new("cmd").args(["/C", command]).output()?
        } else {
            Command::new("sh").args(["-c", command]).output()?
        };
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid http method '{0}'")]
    InvalidMethod(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Payload>,
}

impl OutboundRequest {
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            method: method.to_string(),
            url: url.to_string(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get(url: &str) -> Self {
        Self::new("GET", url)
    }

    pub fn post(url: &str, body: impl Into<Payload>) -> Self {
        Self::new("POST", url).with_body(body)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: impl Into<Payload>) -> Self {
        self.body = Some(body.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl From<CannedResponse> for InboundResponse {
    fn from(canned: CannedResponse) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Self {
            status: canned.status,
            headers,
            body: canned.body.to_string(),
        }
    }
}

#[async_trait]
pub trait NetworkGateway: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<InboundResponse, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_files_report_length_and_kind() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("note.txt");
        std::fs::write(&file, b"hello").unwrap();
        let gateway = StdFileGateway;
        assert_eq!(gateway.read(&file).unwrap(), b"hello");
        let meta = gateway.metadata(&file).unwrap();
        assert_eq!(meta.len, 5);
        assert!(!meta.is_dir);
        assert!(gateway.metadata(dir.path()).unwrap().is_dir);
    }

    #[cfg(unix)]
    #[test]
    fn shell_gateway_captures_output() {
        let out = ShellProcessGateway.run("echo shell-ok").unwrap();
        assert_eq!(out.stdout.trim(), "shell-ok");
        assert_eq!(out.exit_code, 0);
    }

    #[cfg(unix)]
    #[test]
    fn system_hostname_comes_from_the_os() {
        let name = SystemIdentityGateway.hostname();
        assert!(!name.is_empty());
        assert!(!name.contains('\0'));
        assert_eq!(name, SystemIdentityGateway.hostname());
    }

    #[test]
    fn canned_response_is_json_success() {
        let response = InboundResponse::from(CannedResponse::success());
        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"success": true}"#);
        assert_eq!(response.headers["content-type"], "application/json");
    }

    #[test]
    fn request_builders_fill_fields() {
        let request = OutboundRequest::post("https://x.test/api", "body").with_header("X-Device-Id", "d");
        assert_eq!(request.method, "POST");
        assert_eq!(request.body, Some(Payload::Text("body".to_string())));
        assert_eq!(request.headers["X-Device-Id"], "d");
    }
}
