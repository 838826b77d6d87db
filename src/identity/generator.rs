use std::time::{SystemTime, UNIX_EPOCH};

use rand::distributions::Alphanumeric;
use rand::Rng;

use super::hash::{
    bounded, compact_id, consistent_uuid, mac_address, pick, pick_with, rolling_hash,
    rolling_hash_with,
};
use super::ssh;
use super::*;

pub const SEED_PREFIX: &str = "shield-user-";

/// Used when a seed carries no parseable creation time.
const FALLBACK_ANCHOR_MS: u64 = 1_700_000_000_000;
const DAY_MS: u64 = 86_400_000;
const HOUR_MS: u64 = 3_600_000;
const INODE_SPACE: u64 = 10_000_000;

const EMAIL_PROVIDERS: &[&str] = &[
    "@gmail.com",
    "@outlook.com",
    "@hotmail.com",
    "@yahoo.com",
    "@icloud.com",
    "@protonmail.com",
    "@live.com",
];

const REPO_WORDS: &[&str] = &[
    "project", "app", "tool", "lib", "framework", "service", "api", "client", "server", "web",
    "mobile", "desktop", "game", "bot", "script", "utils", "helper", "manager", "handler",
    "processor", "generator", "parser", "analyzer", "monitor", "tracker", "logger", "config",
    "setup",
];

const REPO_ADJECTIVES: &[&str] = &[
    "awesome", "simple", "smart", "fast", "easy", "cool", "new", "modern", "clean", "light",
    "dark", "blue", "green", "red", "mini", "micro", "super", "ultra", "pro", "plus", "max",
    "core", "base", "main",
];

const TIMEZONES: &[&str] = &[
    "America/New_York",
    "America/Chicago",
    "America/Los_Angeles",
    "Europe/London",
    "Europe/Berlin",
    "Asia/Singapore",
];

/// Host operating system family, named the way editor runtimes report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    /// Platform of the build target. Unknown targets report as Windows.
    pub fn current() -> Self {
        match std::env::consts::OS {
            "macos" => Platform::MacOs,
            "linux" => Platform::Linux,
            _ => Platform::Windows,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "win32" | "windows" => Some(Platform::Windows),
            "darwin" | "macos" => Some(Platform::MacOs),
            "linux" => Some(Platform::Linux),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Platform::Windows => "win32",
            Platform::MacOs => "darwin",
            Platform::Linux => "linux",
        }
    }

    fn os_release(self) -> &'static str {
        match self {
            Platform::Windows => "10.0.19045",
            Platform::MacOs => "22.6.0",
            Platform::Linux => "5.15.0-91-generic",
        }
    }

    fn kernel_version(self) -> &'static str {
        match self {
            Platform::Windows => "10.0.19045.3693",
            Platform::MacOs => "Darwin Kernel Version 22.6.0",
            Platform::Linux => "5.15.0-91-generic #101-Ubuntu",
        }
    }
}

fn current_arch() -> &'static str {
    match std::env::consts::ARCH {
        "aarch64" => "arm64",
        "x86" => "ia32",
        _ => "x64",
    }
}

/// New seed stamped with the current time. The nonce keeps two resets in the
/// same millisecond apart.
pub fn fresh_seed() -> String {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(FALLBACK_ANCHOR_MS);
    let nonce: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{SEED_PREFIX}{}-{nonce}", to_base36(now_ms))
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Creation time embedded by [`fresh_seed`], if any.
fn seed_anchor_ms(seed: &str) -> u64 {
    seed.strip_prefix(SEED_PREFIX)
        .and_then(|rest| rest.split('-').next())
        .and_then(|stamp| u64::from_str_radix(stamp, 36).ok())
        .unwrap_or(FALLBACK_ANCHOR_MS)
}

/// Profile for the build target's platform.
pub fn generate(seed: &str) -> IdentityProfile {
    generate_for(seed, Platform::current())
}

pub fn generate_for(seed: &str, platform: Platform) -> IdentityProfile {
    let field = |suffix: &str| format!("{seed}{suffix}");
    let uuid = |suffix: &str| consistent_uuid(&field(suffix));
    let serial = |suffix: &str, len: usize| compact_id(&field(suffix), len);

    let username = format!("user-{}", &uuid("-user")[..8]);
    let hostname = format!("DESKTOP-{}", &uuid("-host")[..8]);
    let email = format!("{username}{}", pick(seed, EMAIL_PROVIDERS));
    let repo = format!(
        "{}-{}",
        pick_with(rolling_hash(seed), REPO_ADJECTIVES),
        pick_with(rolling_hash_with(seed, 7), REPO_WORDS)
    );
    let anchor = seed_anchor_ms(seed);

    IdentityProfile {
        seed: seed.to_string(),
        identifiers: Identifiers {
            machine_id: uuid("-machine"),
            telemetry_dev_device_id: uuid("-telemetry"),
            os_machine_id: uuid("-os"),
            user_data_machine_id: uuid("-userdata"),
            session_id: uuid("-session"),
            request_id: uuid("-request"),
            random_hash: uuid("-hash"),
            system_data_directory_uuid: uuid("-systemdir"),
        },
        system: SystemIdentity {
            platform: platform.name().to_string(),
            arch: current_arch().to_string(),
            hostname: hostname.clone(),
            username: username.clone(),
            os_release: platform.os_release().to_string(),
            kernel_version: platform.kernel_version().to_string(),
            timezone: pick(&field("-timezone"), TIMEZONES).to_string(),
            locale: "en-US".to_string(),
        },
        filesystem: FilesystemIdentity {
            home_directory_ino: bounded(&field("-ino-home"), INODE_SPACE),
            project_root_ino: bounded(&field("-ino-project"), INODE_SPACE),
            user_data_path_ino: bounded(&field("-ino-userdata"), INODE_SPACE),
            system_data_directory_ino: bounded(&field("-ino-systemdir"), INODE_SPACE),
        },
        hardware: HardwareIdentity {
            bios_info: BiosIdentity {
                vendor: "American Megatrends Inc.".to_string(),
                version: format!("2.{}", bounded(&field("-bios-version"), 100)),
                serial: serial("-bios", 12),
            },
            baseboard_info: BaseboardIdentity {
                manufacturer: "ASUSTeK COMPUTER INC.".to_string(),
                model: format!("PRIME-{}", &uuid("-board")[..6]),
                serial: serial("-baseboard", 12),
            },
            mac_addresses: vec![mac_address(&field("-mac1")), mac_address(&field("-mac2"))],
            memory_module_serials: vec![serial("-mem1", 12), serial("-mem2", 12)],
            usb_device_ids: vec![serial("-usb1", 8), serial("-usb2", 8)],
            audio_device_ids: vec![serial("-audio", 8)],
            disk_serials: vec![serial("-disk", 12)],
            gpu_info: GpuIdentity {
                vendor: "NVIDIA Corporation".to_string(),
                model: "GeForce RTX 3070".to_string(),
                device_id: serial("-gpu", 8),
            },
        },
        software: SoftwareIdentity {
            editor: "1.85.2".to_string(),
            runtime: "v18.17.0".to_string(),
            package_manager: "9.6.7".to_string(),
            extension_version: "0.525.0".to_string(),
            system_boot_time: anchor.saturating_sub(bounded(&field("-boot"), DAY_MS)),
            process_start_time: anchor.saturating_sub(bounded(&field("-process"), HOUR_MS)),
        },
        git: GitIdentity {
            user_email: email.clone(),
            user_name: username.clone(),
            default_remote_url: format!("https://github.com/{username}/{repo}.git"),
            config_global_user_name: username.clone(),
            config_global_user_email: email,
        },
        ssh: SshIdentity {
            private_key: ssh::private_key(seed),
            public_key: ssh::public_key(seed, &username, &hostname),
            known_hosts: ssh::known_hosts(seed),
            config: ssh::client_config(&username),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn same_seed_same_profile() {
        let a = generate_for("shield-user-fixed", Platform::Linux);
        let b = generate_for("shield-user-fixed", Platform::Linux);
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn primary_ids_distinct_across_seeds() {
        let seeds: HashSet<String> = (0..1000).map(|_| fresh_seed()).collect();
        let ids: HashSet<String> = seeds
            .iter()
            .map(|seed| generate_for(seed, Platform::Linux).identifiers.machine_id)
            .collect();
        assert_eq!(ids.len(), seeds.len());
        assert!(seeds.len() > 990);
    }

    #[test]
    fn serials_do_not_collide_between_fields() {
        let p = generate_for("collide-check", Platform::Windows);
        assert_ne!(p.hardware.bios_info.serial, p.hardware.baseboard_info.serial);
        assert_ne!(p.hardware.mac_addresses[0], p.hardware.mac_addresses[1]);
        assert_ne!(p.identifiers.machine_id, p.identifiers.os_machine_id);
    }

    #[test]
    fn cross_references_are_consistent() {
        let p = generate_for("xref", Platform::MacOs);
        assert_eq!(p.git.user_name, p.system.username);
        assert!(p.git.user_email.starts_with(&p.system.username));
        assert!(p.git.default_remote_url.contains(&p.system.username));
        assert!(p.ssh.public_key.ends_with(&format!("{}@{}", p.system.username, p.system.hostname)));
        assert!(p.ssh.config.contains(&p.system.username));
        assert_eq!(p.system.platform, "darwin");
        assert_eq!(p.system.kernel_version, "Darwin Kernel Version 22.6.0");
    }

    #[test]
    fn names_have_expected_shape() {
        let p = generate_for("shape", Platform::Windows);
        assert!(p.system.hostname.starts_with("DESKTOP-"));
        assert_eq!(p.system.hostname.len(), "DESKTOP-".len() + 8);
        assert!(p.system.username.starts_with("user-"));
        assert!(p.git.default_remote_url.starts_with("https://github.com/"));
        assert!(p.git.default_remote_url.ends_with(".git"));
        assert!(p.filesystem.home_directory_ino < INODE_SPACE);
        assert_eq!(p.hardware.bios_info.serial.len(), 12);
        assert_eq!(p.hardware.usb_device_ids[0].len(), 8);
    }

    #[test]
    fn fresh_seed_embeds_creation_time() {
        let seed = fresh_seed();
        assert!(seed.starts_with(SEED_PREFIX));
        let anchor = seed_anchor_ms(&seed);
        assert!(anchor > FALLBACK_ANCHOR_MS);
        let p = generate_for(&seed, Platform::Linux);
        assert!(p.software.system_boot_time <= anchor);
        assert!(anchor - p.software.process_start_time < HOUR_MS);
    }

    #[test]
    fn fresh_seeds_differ() {
        assert_ne!(fresh_seed(), fresh_seed());
    }

    #[test]
    fn base36_round_trips() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(u64::from_str_radix(&to_base36(1_728_000_000_000), 36).unwrap(), 1_728_000_000_000);
    }
}
