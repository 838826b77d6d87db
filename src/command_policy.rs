//! Subprocess command classification and tool-shaped substitute output.
//!
//! Nothing here executes a command. Commands that do not match are returned
//! as not intercepted and the caller runs them for real.

use crate::hardware::{consistent_serial, HardwareTemplate};
use crate::identity::hash::hash_magnitude;
use crate::identity::IdentityProfile;

const GIB: u64 = 1024 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCategory {
    GitIdentity,
    GitRemote,
    WindowsSystemInfo,
    WmiCpu,
    WmiMemory,
    WmiDisk,
    WmiBaseboard,
    WmiMonitor,
    RegistryHardware,
    MacHardware,
    LinuxHardware,
}

impl CommandCategory {
    pub fn label(self) -> &'static str {
        match self {
            CommandCategory::GitIdentity => "git identity",
            CommandCategory::GitRemote => "git remote",
            CommandCategory::WindowsSystemInfo => "windows system info",
            CommandCategory::WmiCpu => "cpu query",
            CommandCategory::WmiMemory => "memory query",
            CommandCategory::WmiDisk => "disk query",
            CommandCategory::WmiBaseboard => "baseboard/bios query",
            CommandCategory::WmiMonitor => "monitor query",
            CommandCategory::RegistryHardware => "registry hardware query",
            CommandCategory::MacHardware => "macos hardware query",
            CommandCategory::LinuxHardware => "linux hardware query",
        }
    }
}

/// Classification of one command line. `category` is set exactly when
/// `intercept` is true; `command` keeps the lower-cased line for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMatch {
    pub intercept: bool,
    pub category: Option<CommandCategory>,
    pub command: String,
}

impl CommandMatch {
    fn hit(category: CommandCategory, command: String) -> Self {
        Self {
            intercept: true,
            category: Some(category),
            command,
        }
    }

    fn miss(command: String) -> Self {
        Self {
            intercept: false,
            category: None,
            command,
        }
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

pub fn classify(command: &str) -> CommandMatch {
    let cmd = command.trim().to_lowercase();
    match categorize(&cmd) {
        Some(category) => CommandMatch::hit(category, cmd),
        None => CommandMatch::miss(cmd),
    }
}

fn categorize(cmd: &str) -> Option<CommandCategory> {
    if cmd.is_empty() {
        return None;
    }

    if cmd.starts_with("git") || cmd.contains("git ") {
        if contains_any(cmd, &["user.email", "user.name"]) {
            return Some(CommandCategory::GitIdentity);
        }
        if contains_any(cmd, &["remote", "origin"]) {
            return Some(CommandCategory::GitRemote);
        }
    }

    if cmd.contains("systeminfo") {
        return Some(CommandCategory::WindowsSystemInfo);
    }

    if contains_any(cmd, &["get-ciminstance", "get-wmiobject"]) {
        if contains_any(cmd, &["win32_processor", "win32_computersystem"]) {
            return Some(CommandCategory::WmiCpu);
        }
        if cmd.contains("win32_physicalmemory") {
            return Some(CommandCategory::WmiMemory);
        }
        if contains_any(cmd, &["win32_diskdrive", "win32_logicaldisk"]) {
            return Some(CommandCategory::WmiDisk);
        }
        if contains_any(cmd, &["win32_baseboard", "win32_bios"]) {
            return Some(CommandCategory::WmiBaseboard);
        }
        if cmd.contains("wmimonitorid") {
            return Some(CommandCategory::WmiMonitor);
        }
    }

    if cmd.contains("reg query") && cmd.contains("hardware") {
        return Some(CommandCategory::RegistryHardware);
    }

    if contains_any(cmd, &["ioreg", "system_profiler"]) {
        return Some(CommandCategory::MacHardware);
    }

    if contains_any(cmd, &["dmidecode", "lscpu", "lshw"]) {
        return Some(CommandCategory::LinuxHardware);
    }

    None
}

/// Synthesized stdout for an intercepted command; empty for a miss.
pub fn render(matched: &CommandMatch, profile: &IdentityProfile, template: &HardwareTemplate) -> String {
    let Some(category) = matched.category else {
        return String::new();
    };
    let cmd = matched.command.as_str();
    match category {
        CommandCategory::GitIdentity => git_identity(cmd, profile),
        CommandCategory::GitRemote => profile.git.default_remote_url.clone(),
        CommandCategory::WindowsSystemInfo => windows_system_info(profile, template),
        CommandCategory::WmiCpu => wmi_cpu(template),
        CommandCategory::WmiMemory => wmi_memory(profile, template),
        CommandCategory::WmiDisk => wmi_disk(profile),
        CommandCategory::WmiBaseboard => wmi_baseboard(profile, template),
        CommandCategory::WmiMonitor => wmi_monitor(profile),
        CommandCategory::RegistryHardware => registry_hardware(profile, template),
        CommandCategory::MacHardware => mac_hardware(cmd, profile, template),
        CommandCategory::LinuxHardware => linux_hardware(cmd, profile, template),
    }
}

fn git_identity(cmd: &str, profile: &IdentityProfile) -> String {
    if cmd.contains("user.email") {
        profile.git.user_email.clone()
    } else {
        profile.git.user_name.clone()
    }
}

fn windows_system_info(profile: &IdentityProfile, template: &HardwareTemplate) -> String {
    format!(
        "Host Name:                 {host}
OS Name:                   Microsoft Windows 11 Pro
OS Version:                10.0.22631 N/A Build 22631
OS Manufacturer:           Microsoft Corporation
OS Configuration:          Standalone Workstation
Registered Owner:          {user}
Product ID:                {product}
System Manufacturer:       {manufacturer}
System Model:              {model}
System Type:               x64-based PC
Processor(s):              1 Processor(s) Installed.
                           [01]: {cpu}
BIOS Version:              {bios_vendor} {bios_version}, {bios_date}
Total Physical Memory:     {memory} GB",
        host = profile.system.hostname,
        user = profile.system.username,
        product = product_id(profile),
        manufacturer = template.baseboard.manufacturer,
        model = template.baseboard.model,
        cpu = template.cpu.brand,
        bios_vendor = template.bios.vendor,
        bios_version = template.bios.version,
        bios_date = template.bios.release_date,
        memory = template.memory_total / GIB,
    )
}

/// `XXXXX-XXXXX-XXXXX-AAOEM` shaped product id.
fn product_id(profile: &IdentityProfile) -> String {
    let n = hash_magnitude(&format!("{}product", profile.identifiers.machine_id));
    format!("{:05}-{:05}-{:05}-AAOEM", n % 100_000, (n / 7) % 100_000, (n / 13) % 100_000)
}

fn wmi_cpu(template: &HardwareTemplate) -> String {
    let cpu = &template.cpu;
    format!(
        "Name                      : {}
Manufacturer              : {}
MaxClockSpeed             : {}
NumberOfCores             : {}
NumberOfLogicalProcessors : {}
L2CacheSize               : 1024
L3CacheSize               : 8192",
        cpu.brand,
        cpu.manufacturer,
        (cpu.speed * 1000.0).round() as u64,
        cpu.cores,
        cpu.cores * 2
    )
}

fn wmi_memory(profile: &IdentityProfile, template: &HardwareTemplate) -> String {
    let module = template.memory_modules.first();
    format!(
        "Capacity          : {}
Speed             : {}
FormFactor        : 8
Manufacturer      : {}
PartNumber        : M471A2K43DB1-CWE
SerialNumber      : {}",
        template.memory_total,
        module.map(|m| m.clock_speed).unwrap_or(3200),
        module.map(|m| m.manufacturer).unwrap_or("Samsung"),
        consistent_serial(profile, "memory")
    )
}

fn wmi_disk(profile: &IdentityProfile) -> String {
    format!(
        "Caption       : Samsung SSD 980 PRO 1TB
Size          : 1000204886016
SerialNumber  : {}
InterfaceType : SCSI",
        consistent_serial(profile, "disk")
    )
}

fn wmi_baseboard(profile: &IdentityProfile, template: &HardwareTemplate) -> String {
    format!(
        "Manufacturer : {}
Product      : {}
Version      : {}
SerialNumber : {}",
        template.baseboard.manufacturer,
        template.baseboard.model,
        template.baseboard.version,
        profile.hardware.baseboard_info.serial
    )
}

fn wmi_monitor(profile: &IdentityProfile) -> String {
    format!(
        "ManufacturerName : DEL
ProductCodeID    : U2720Q
UserFriendlyName : DELL U2720Q
SerialNumberID   : {}",
        consistent_serial(profile, "display")
    )
}

fn registry_hardware(profile: &IdentityProfile, template: &HardwareTemplate) -> String {
    let feature_set = hash_magnitude(&format!("{}featureset", profile.identifiers.machine_id));
    format!(
        "
HKEY_LOCAL_MACHINE\\HARDWARE\\DESCRIPTION\\System\\CentralProcessor\\0
    FeatureSet    REG_DWORD    0x{:08x}
    ProcessorNameString    REG_SZ    {}
    VendorIdentifier    REG_SZ    {}
",
        feature_set,
        template.cpu.brand,
        if template.cpu.manufacturer == "AMD" { "AuthenticAMD" } else { "GenuineIntel" }
    )
}

fn mac_hardware(cmd: &str, profile: &IdentityProfile, template: &HardwareTemplate) -> String {
    let serial = consistent_serial(profile, "mac");
    if cmd.contains("ioreg") {
        return format!(
            "+-o Root  <class IORegistryEntry, id 0x100000100, retain 4>
  +-o MacBookPro18,1  <class IOPlatformExpertDevice, id 0x100000110, registered, matched, active, busy 0 (1 ms), retain 9>
    {{
      \"IOPlatformUUID\" = \"{}\"
      \"IOPlatformSerialNumber\" = \"{}\"
      \"model\" = <\"MacBookPro18,1\">
    }}",
            profile.identifiers.machine_id.to_uppercase(),
            serial
        );
    }
    format!(
        "Hardware:

    Hardware Overview:

      Model Name: MacBook Pro
      Model Identifier: MacBookPro18,1
      Total Number of Cores: {}
      Memory: {} GB
      Serial Number (system): {}
      Hardware UUID: {}",
        template.cpu.cores,
        template.memory_total / GIB,
        serial,
        profile.identifiers.machine_id.to_uppercase()
    )
}

fn linux_hardware(cmd: &str, profile: &IdentityProfile, template: &HardwareTemplate) -> String {
    if cmd.contains("dmidecode") {
        return format!(
            "# dmidecode 3.3
Handle 0x0001, DMI type 1, 27 bytes
System Information
\tManufacturer: {}
\tProduct Name: {}
\tVersion: {}
\tSerial Number: {}
\tUUID: {}
\tSKU Number: SKU-{}
\tFamily: {}",
            template.baseboard.manufacturer,
            template.baseboard.model,
            template.baseboard.version,
            profile.hardware.baseboard_info.serial,
            profile.identifiers.machine_id,
            profile.short_id(),
            template.chassis.kind
        );
    }
    format!(
        "Architecture:        x86_64
CPU op-mode(s):      32-bit, 64-bit
Byte Order:          Little Endian
CPU(s):              {}
Model name:          {}
CPU MHz:             {:.3}",
        template.cpu.cores,
        template.cpu.brand,
        template.cpu.speed * 1000.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::select;
    use crate::identity::{generate_for, Platform};

    fn category(command: &str) -> Option<CommandCategory> {
        classify(command).category
    }

    #[test]
    fn categories_follow_declared_order() {
        assert_eq!(category("git config --get user.name"), Some(CommandCategory::GitIdentity));
        assert_eq!(category("git remote get-url origin"), Some(CommandCategory::GitRemote));
        assert_eq!(category("SYSTEMINFO /FO LIST"), Some(CommandCategory::WindowsSystemInfo));
        assert_eq!(
            category("powershell Get-CimInstance Win32_Processor"),
            Some(CommandCategory::WmiCpu)
        );
        assert_eq!(
            category("Get-WmiObject Win32_PhysicalMemory"),
            Some(CommandCategory::WmiMemory)
        );
        assert_eq!(category("Get-CimInstance Win32_DiskDrive"), Some(CommandCategory::WmiDisk));
        assert_eq!(category("Get-CimInstance Win32_BIOS"), Some(CommandCategory::WmiBaseboard));
        assert_eq!(
            category("Get-WmiObject -Namespace root\\wmi WmiMonitorID"),
            Some(CommandCategory::WmiMonitor)
        );
        assert_eq!(
            category("reg query HKLM\\HARDWARE\\DESCRIPTION\\System"),
            Some(CommandCategory::RegistryHardware)
        );
        assert_eq!(
            category("ioreg -rd1 -c IOPlatformExpertDevice"),
            Some(CommandCategory::MacHardware)
        );
        assert_eq!(category("sudo dmidecode -t system"), Some(CommandCategory::LinuxHardware));
    }

    #[test]
    fn ordinary_commands_pass_through() {
        for command in ["ls -la", "git status", "npm install", "", "   ", "Get-CimInstance Win32_Service"] {
            let m = classify(command);
            assert!(!m.intercept, "{command:?} should not be intercepted");
            assert_eq!(m.category, None);
        }
    }

    #[test]
    fn miss_renders_nothing() {
        let p = generate_for("cmd", Platform::Linux);
        assert_eq!(render(&classify("ls"), &p, select(&p)), "");
    }

    #[test]
    fn git_name_and_remote_render_exactly() {
        let p = generate_for("cmd", Platform::Linux);
        let t = select(&p);
        assert_eq!(render(&classify("git config user.name"), &p, t), p.git.user_name);
        assert_eq!(render(&classify("git config --get remote.origin.url"), &p, t), p.git.default_remote_url);
    }

    #[test]
    fn hardware_output_uses_profile_serials() {
        let p = generate_for("cmd", Platform::Windows);
        let t = select(&p);
        let board = render(&classify("Get-CimInstance Win32_BaseBoard"), &p, t);
        assert!(board.contains(&p.hardware.baseboard_info.serial));
        let info = render(&classify("systeminfo"), &p, t);
        assert!(info.contains(&p.system.hostname));
        assert!(info.contains(t.cpu.brand));
        let dmi = render(&classify("dmidecode -t 1"), &p, t);
        assert!(dmi.contains(&p.identifiers.machine_id));
        let lscpu = render(&classify("lscpu"), &p, t);
        assert!(lscpu.contains(t.cpu.brand));
    }

    #[test]
    fn macos_outputs_share_platform_uuid() {
        let p = generate_for("cmd", Platform::MacOs);
        let t = select(&p);
        let uuid = p.identifiers.machine_id.to_uppercase();
        assert!(render(&classify("ioreg -l"), &p, t).contains(&uuid));
        assert!(render(&classify("system_profiler SPHardwareDataType"), &p, t).contains(&uuid));
    }
}
