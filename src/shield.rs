use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tracing::info;

use crate::config::{ConfigError, ShieldConfig};
use crate::gateways::{
    FileGateway, IdentityGateway, NetworkGateway, ProcessGateway, ShieldedFiles, ShieldedIdentity,
    ShieldedNetwork, ShieldedProcess, SystemIdentityGateway,
};
use crate::hardware::{select, HardwareTemplate};
use crate::identity::IdentityProfile;
use crate::request_policy::{IdentityReplacer, RealIdentity, RequestClassifier};
use crate::stats::{ShieldStats, StatsSnapshot};
use crate::store::ProfileStore;

/// Everything derived from one profile. Built whole and swapped whole.
#[derive(Debug)]
pub struct ActiveIdentity {
    pub profile: IdentityProfile,
    pub template: &'static HardwareTemplate,
    pub replacer: IdentityReplacer,
}

impl ActiveIdentity {
    pub fn new(profile: IdentityProfile, real: &RealIdentity) -> Self {
        let template = select(&profile);
        let replacer = IdentityReplacer::new(real, &profile);
        Self {
            profile,
            template,
            replacer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShieldState {
    Running,
    ShutDown,
}

impl fmt::Display for ShieldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShieldState::Running => f.write_str("running"),
            ShieldState::ShutDown => f.write_str("shut down"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShieldStatus {
    pub version: &'static str,
    pub state: ShieldState,
    pub machine: String,
    pub hostname: String,
    pub username: String,
    pub template: &'static str,
    pub stats: StatsSnapshot,
}

impl fmt::Display for ShieldStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "identity-shield {} ({})", self.version, self.state)?;
        writeln!(f, "  machine:  {}...", self.machine)?;
        writeln!(f, "  hostname: {}", self.hostname)?;
        writeln!(f, "  username: {}", self.username)?;
        writeln!(f, "  template: {}", self.template)?;
        write!(
            f,
            "  requests: total={} allowed={} intercepted={} replaced={} commands={} files={}",
            self.stats.total_requests,
            self.stats.allowed,
            self.stats.intercepted,
            self.stats.replaced,
            self.stats.commands_intercepted,
            self.stats.files_substituted
        )
    }
}

struct ShieldInner {
    store: ProfileStore,
    real: RealIdentity,
    classifier: RequestClassifier,
    active: RwLock<Arc<ActiveIdentity>>,
    running: AtomicBool,
    stats: Arc<ShieldStats>,
}

/// Owner of the active profile. Clones share state.
#[derive(Clone)]
pub struct Shield {
    inner: Arc<ShieldInner>,
}

impl fmt::Debug for Shield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shield")
            .field("machine", &self.current().profile.short_id())
            .field("running", &self.is_running())
            .finish()
    }
}

impl Shield {
    /// Loads or creates the profile under the configured state directory.
    pub fn start(config: &ShieldConfig) -> Result<Self, ConfigError> {
        let store = ProfileStore::new(config.profile_path()).with_platform(config.platform()?);
        let real = RealIdentity::collect(&SystemIdentityGateway);
        let classifier = RequestClassifier::new(config.pattern_tables().into_rule_set());
        Ok(Self::from_parts(store, real, classifier))
    }

    pub fn from_parts(store: ProfileStore, real: RealIdentity, classifier: RequestClassifier) -> Self {
        let profile = store.load_or_create();
        Self::with_profile(store, real, classifier, profile)
    }

    /// Uses `profile` as-is without touching the store.
    pub fn with_profile(
        store: ProfileStore,
        real: RealIdentity,
        classifier: RequestClassifier,
        profile: IdentityProfile,
    ) -> Self {
        let active = Arc::new(ActiveIdentity::new(profile, &real));
        info!(
            target: "shield",
            machine = active.profile.short_id(),
            template = active.template.name,
            "shield started"
        );
        Self {
            inner: Arc::new(ShieldInner {
                store,
                real,
                classifier,
                active: RwLock::new(active),
                running: AtomicBool::new(true),
                stats: ShieldStats::new(),
            }),
        }
    }

    pub fn current(&self) -> Arc<ActiveIdentity> {
        let guard = self.inner.active.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Generates and persists a new profile, then swaps it in. Readers holding
    /// the previous value keep it until they drop it.
    pub fn reset(&self) -> Arc<ActiveIdentity> {
        let next = Arc::new(ActiveIdentity::new(self.inner.store.reset(), &self.inner.real));
        let mut guard = self.inner.active.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::clone(&next);
        drop(guard);
        info!(target: "shield", machine = next.profile.short_id(), "active profile replaced");
        next
    }

    pub fn classifier(&self) -> &RequestClassifier {
        &self.inner.classifier
    }

    pub fn stats(&self) -> Arc<ShieldStats> {
        Arc::clone(&self.inner.stats)
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Relaxed)
    }

    /// Every shielded gateway passes operations straight through afterwards.
    pub fn shutdown(&self) {
        if self.inner.running.swap(false, Ordering::Relaxed) {
            self.inner.stats.log_stats();
            info!(target: "shield", "shield shut down");
        }
    }

    pub fn status(&self) -> ShieldStatus {
        let active = self.current();
        ShieldStatus {
            version: env!("CARGO_PKG_VERSION"),
            state: if self.is_running() {
                ShieldState::Running
            } else {
                ShieldState::ShutDown
            },
            machine: active.profile.short_id().to_string(),
            hostname: active.profile.system.hostname.clone(),
            username: active.profile.system.username.clone(),
            template: active.template.name,
            stats: self.inner.stats.snapshot(),
        }
    }

    pub fn network<G: NetworkGateway>(&self, inner: G) -> ShieldedNetwork<G> {
        ShieldedNetwork::new(inner, self.clone())
    }

    pub fn files<F: FileGateway>(&self, inner: F) -> ShieldedFiles<F> {
        ShieldedFiles::new(inner, self.clone())
    }

    pub fn process<P: ProcessGateway>(&self, inner: P) -> ShieldedProcess<P> {
        ShieldedProcess::new(inner, self.clone())
    }

    pub fn identity<I: IdentityGateway>(&self, inner: I) -> ShieldedIdentity<I> {
        ShieldedIdentity::new(inner, self.clone())
    }
}
