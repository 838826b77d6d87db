//! Wrappers that route each operation through the active profile.
//!
//! All of them fail open: once the shield is shut down, or when nothing
//! matches, the inner gateway performs the real operation.

use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use scopeguard::defer;
use tracing::{debug, info};

use super::{
    CommandOutput, FileGateway, FileMetadata, GatewayError, IdentityGateway, InboundResponse,
    NetworkGateway, OutboundRequest, ProcessGateway, UserInfo,
};
use crate::command_policy;
use crate::identity::{ssh, IdentityProfile};
use crate::request_policy::{CannedResponse, Policy};
use crate::shield::Shield;

pub struct ShieldedNetwork<G> {
    inner: G,
    shield: Shield,
}

impl<G: NetworkGateway> ShieldedNetwork<G> {
    pub fn new(inner: G, shield: Shield) -> Self {
        Self { inner, shield }
    }
}

#[async_trait]
impl<G: NetworkGateway> NetworkGateway for ShieldedNetwork<G> {
    async fn send(&self, mut request: OutboundRequest) -> Result<InboundResponse, GatewayError> {
        if !self.shield.is_running() {
            return self.inner.send(request).await;
        }
        let stats = self.shield.stats();
        defer! {
            stats.request_seen();
        }

        let decision = self.shield.classifier().classify(&request.url, request.body.as_ref());
        match decision.policy {
            Policy::Intercept => {
                stats.request_intercepted();
                info!(target: "network", url = %request.url, reason = ?decision.reason, "request intercepted");
                Ok(CannedResponse::success().into())
            }
            Policy::ReplaceIdentity => {
                let active = self.shield.current();
                if let Some(body) = request.body.take() {
                    let (rewritten, _) = active.replacer.replace_payload(&body);
                    request.body = Some(rewritten);
                }
                let headers = active.replacer.rewrite_headers(&mut request.headers);
                drop(active);
                stats.request_replaced();
                info!(
                    target: "network",
                    url = %request.url,
                    reason = ?decision.reason,
                    headers = headers.count(),
                    "identity replaced before sending"
                );
                self.inner.send(request).await
            }
            Policy::Allow => {
                stats.request_allowed();
                debug!(target: "network", url = %request.url, reason = ?decision.reason, "request allowed");
                self.inner.send(request).await
            }
        }
    }
}

/// Which profile inode stands in for a path's real one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InodeRole {
    Home,
    UserData,
    Project,
}

impl InodeRole {
    /// `home`/`Users`, then `userData`, then `project`/`workspace`.
    pub fn for_path(path: &str) -> Option<Self> {
        if path.contains("home") || path.contains("Users") {
            Some(InodeRole::Home)
        } else if path.contains("userData") {
            Some(InodeRole::UserData)
        } else if path.contains("project") || path.contains("workspace") {
            Some(InodeRole::Project)
        } else {
            None
        }
    }

    pub fn ino(self, profile: &IdentityProfile) -> u64 {
        let fs = &profile.filesystem;
        match self {
            InodeRole::Home => fs.home_directory_ino,
            InodeRole::UserData => fs.user_data_path_ino,
            InodeRole::Project => fs.project_root_ino,
        }
    }
}

pub fn is_credential_path(path: &str) -> bool {
    path.contains(".ssh") || path.contains("known_hosts") || path.contains("id_rsa")
}

/// Synthetic content for a credential path, or `None` for anything else.
pub fn credential_substitute(path: &str, profile: &IdentityProfile) -> Option<String> {
    if !is_credential_path(path) {
        return None;
    }
    let lower = path.to_lowercase();
    let keys = &profile.ssh;
    let content = if lower.contains("id_rsa") && !lower.contains(".pub") {
        keys.private_key.clone()
    } else if lower.contains("id_rsa.pub") || lower.contains("id_ed25519.pub") {
        keys.public_key.clone()
    } else if lower.contains("known_hosts") {
        keys.known_hosts.clone()
    } else if lower.contains("config") {
        keys.config.clone()
    } else {
        ssh::generic_config(&profile.system.username)
    };
    Some(content)
}

pub struct ShieldedFiles<F> {
    inner: F,
    shield: Shield,
}

impl<F: FileGateway> ShieldedFiles<F> {
    pub fn new(inner: F, shield: Shield) -> Self {
        Self { inner, shield }
    }
}

impl<F: FileGateway> FileGateway for ShieldedFiles<F> {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        if self.shield.is_running() {
            let text = path.to_string_lossy();
            if let Some(content) = credential_substitute(&text, &self.shield.current().profile) {
                self.shield.stats().file_substituted();
                info!(target: "filesystem", path = %text, "credential read substituted");
                return Ok(content.into_bytes());
            }
        }
        self.inner.read(path)
    }

    fn metadata(&self, path: &Path) -> io::Result<FileMetadata> {
        let mut meta = self.inner.metadata(path)?;
        if !self.shield.is_running() {
            return Ok(meta);
        }
        let text = path.to_string_lossy();
        if let Some(role) = InodeRole::for_path(&text) {
            meta.ino = role.ino(&self.shield.current().profile);
            debug!(target: "filesystem", path = %text, ?role, "inode replaced");
        }
        Ok(meta)
    }
}

pub struct ShieldedProcess<P> {
    inner: P,
    shield: Shield,
}

impl<P: ProcessGateway> ShieldedProcess<P> {
    pub fn new(inner: P, shield: Shield) -> Self {
        Self { inner, shield }
    }
}

impl<P: ProcessGateway> ProcessGateway for ShieldedProcess<P> {
    fn run(&self, command: &str) -> io::Result<CommandOutput> {
        if self.shield.is_running() {
            let matched = command_policy::classify(command);
            if let Some(category) = matched.category {
                let active = self.shield.current();
                let stdout = command_policy::render(&matched, &active.profile, active.template);
                self.shield.stats().command_intercepted();
                info!(target: "process", category = category.label(), "command intercepted");
                return Ok(CommandOutput {
                    stdout,
                    stderr: String::new(),
                    exit_code: 0,
                });
            }
        }
        self.inner.run(command)
    }
}

pub struct ShieldedIdentity<I> {
    inner: I,
    shield: Shield,
}

impl<I: IdentityGateway> ShieldedIdentity<I> {
    pub fn new(inner: I, shield: Shield) -> Self {
        Self { inner, shield }
    }
}

impl<I: IdentityGateway> IdentityGateway for ShieldedIdentity<I> {
    fn hostname(&self) -> String {
        if !self.shield.is_running() {
            return self.inner.hostname();
        }
        self.shield.current().profile.system.hostname.clone()
    }

    fn user_info(&self) -> UserInfo {
        let real = self.inner.user_info();
        if !self.shield.is_running() {
            return real;
        }
        let synthetic = self.shield.current().profile.system.username.clone();
        let homedir = remap_home(&real.homedir, &real.username, &synthetic);
        UserInfo {
            username: synthetic,
            homedir,
        }
    }
}

/// Swaps only path components equal to the real username.
fn remap_home(homedir: &Path, username: &str, synthetic: &str) -> PathBuf {
    if username.is_empty() {
        return homedir.to_path_buf();
    }
    homedir
        .components()
        .map(|component| match component {
            Component::Normal(name) if name == username => Path::new(synthetic).as_os_str(),
            other => other.as_os_str(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{generate_for, Platform};

    #[test]
    fn credential_paths_choose_shape_by_file() {
        let p = generate_for("files", Platform::Linux);
        let sub = |path: &str| credential_substitute(path, &p);
        assert_eq!(sub("/home/a/.ssh/id_rsa"), Some(p.ssh.private_key.clone()));
        assert_eq!(sub("/home/a/.ssh/id_rsa.pub"), Some(p.ssh.public_key.clone()));
        assert_eq!(sub("/home/a/.ssh/id_ed25519.pub"), Some(p.ssh.public_key.clone()));
        assert_eq!(sub("/home/a/.ssh/known_hosts"), Some(p.ssh.known_hosts.clone()));
        assert_eq!(sub("/home/a/.ssh/config"), Some(p.ssh.config.clone()));
        assert_eq!(
            sub("/home/a/.ssh/authorized_keys"),
            Some(ssh::generic_config(&p.system.username))
        );
        assert_eq!(sub("/home/a/notes.txt"), None);
    }

    #[test]
    fn home_remap_touches_whole_components_only() {
        let remap = |home: &str, user: &str| remap_home(Path::new(home), user, "user-77aa1122");
        assert_eq!(remap("/home/me", "me"), PathBuf::from("/home/user-77aa1122"));
        assert_eq!(remap("/home/amelia", "me"), PathBuf::from("/home/amelia"));
        assert_eq!(remap("/srv/me/home/me", "me"), PathBuf::from("/srv/user-77aa1122/home/user-77aa1122"));
        assert_eq!(remap("/home/me", ""), PathBuf::from("/home/me"));
    }

    #[test]
    fn inode_roles_checked_in_order() {
        assert_eq!(InodeRole::for_path("/home/a/userData"), Some(InodeRole::Home));
        assert_eq!(InodeRole::for_path("C:\\Users\\a"), Some(InodeRole::Home));
        assert_eq!(InodeRole::for_path("/opt/app/userData/x"), Some(InodeRole::UserData));
        assert_eq!(InodeRole::for_path("/srv/workspace/repo"), Some(InodeRole::Project));
        assert_eq!(InodeRole::for_path("/srv/my-project"), Some(InodeRole::Project));
        assert_eq!(InodeRole::for_path("/var/log"), None);
    }
}
