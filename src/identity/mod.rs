pub mod generator;
pub mod hash;
pub mod ssh;

pub use generator::{fresh_seed, generate, generate_for, Platform};

use serde::{Deserialize, Serialize};

/// The complete synthetic identity of one installation.
///
/// Built once from `seed` and never edited afterwards; a reset replaces the
/// whole value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProfile {
    #[serde(default)]
    pub seed: String,
    pub identifiers: Identifiers,
    pub system: SystemIdentity,
    pub filesystem: FilesystemIdentity,
    pub hardware: HardwareIdentity,
    pub software: SoftwareIdentity,
    pub git: GitIdentity,
    pub ssh: SshIdentity,
}

impl IdentityProfile {
    /// Machine id truncated for log lines.
    pub fn short_id(&self) -> &str {
        short(&self.identifiers.machine_id)
    }
}

/// First eight characters, or the whole string if shorter.
pub fn short(value: &str) -> &str {
    match value.char_indices().nth(8) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identifiers {
    pub machine_id: String,
    pub telemetry_dev_device_id: String,
    pub os_machine_id: String,
    pub user_data_machine_id: String,
    pub session_id: String,
    pub request_id: String,
    pub random_hash: String,
    pub system_data_directory_uuid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemIdentity {
    pub platform: String,
    pub arch: String,
    pub hostname: String,
    pub username: String,
    pub os_release: String,
    pub kernel_version: String,
    pub timezone: String,
    pub locale: String,
}

/// Inode numbers keyed by logical path role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesystemIdentity {
    pub home_directory_ino: u64,
    pub project_root_ino: u64,
    pub user_data_path_ino: u64,
    pub system_data_directory_ino: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareIdentity {
    pub bios_info: BiosIdentity,
    pub baseboard_info: BaseboardIdentity,
    pub mac_addresses: Vec<String>,
    pub memory_module_serials: Vec<String>,
    pub usb_device_ids: Vec<String>,
    pub audio_device_ids: Vec<String>,
    pub disk_serials: Vec<String>,
    pub gpu_info: GpuIdentity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiosIdentity {
    pub vendor: String,
    pub version: String,
    pub serial: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseboardIdentity {
    pub manufacturer: String,
    pub model: String,
    pub serial: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuIdentity {
    pub vendor: String,
    pub model: String,
    pub device_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwareIdentity {
    #[serde(rename = "vscode")]
    pub editor: String,
    #[serde(rename = "node")]
    pub runtime: String,
    #[serde(rename = "npm")]
    pub package_manager: String,
    pub extension_version: String,
    /// Milliseconds since the Unix epoch.
    pub system_boot_time: u64,
    pub process_start_time: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitIdentity {
    pub user_email: String,
    pub user_name: String,
    pub default_remote_url: String,
    pub config_global_user_name: String,
    pub config_global_user_email: String,
}

/// Well-formed but non-functional SSH material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshIdentity {
    pub private_key: String,
    pub public_key: String,
    pub known_hosts: String,
    pub config: String,
}
