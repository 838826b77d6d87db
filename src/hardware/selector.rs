use std::fmt;
use std::str::FromStr;

use chrono::{SecondsFormat, TimeZone, Utc};
use tracing::debug;

use super::catalog::{templates, HardwareTemplate};
use super::descriptors::*;
use crate::identity::hash::{bounded, hash_hex, hash_magnitude, upper_serial};
use crate::identity::IdentityProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    System,
    Bios,
    Baseboard,
    Chassis,
    Cpu,
    CpuFlags,
    CpuCache,
    CpuSpeed,
    MemorySummary,
    MemoryLayout,
    DiskLayout,
    OsInfo,
    Uuid,
    NetworkInterfaces,
    Versions,
    Time,
    Users,
    CpuTemperature,
    BlockDevices,
    AllData,
}

impl DescriptorKind {
    pub const ALL: [DescriptorKind; 20] = [
        DescriptorKind::System,
        DescriptorKind::Bios,
        DescriptorKind::Baseboard,
        DescriptorKind::Chassis,
        DescriptorKind::Cpu,
        DescriptorKind::CpuFlags,
        DescriptorKind::CpuCache,
        DescriptorKind::CpuSpeed,
        DescriptorKind::MemorySummary,
        DescriptorKind::MemoryLayout,
        DescriptorKind::DiskLayout,
        DescriptorKind::OsInfo,
        DescriptorKind::Uuid,
        DescriptorKind::NetworkInterfaces,
        DescriptorKind::Versions,
        DescriptorKind::Time,
        DescriptorKind::Users,
        DescriptorKind::CpuTemperature,
        DescriptorKind::BlockDevices,
        DescriptorKind::AllData,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DescriptorKind::System => "system",
            DescriptorKind::Bios => "bios",
            DescriptorKind::Baseboard => "baseboard",
            DescriptorKind::Chassis => "chassis",
            DescriptorKind::Cpu => "cpu",
            DescriptorKind::CpuFlags => "cpu-flags",
            DescriptorKind::CpuCache => "cpu-cache",
            DescriptorKind::CpuSpeed => "cpu-speed",
            DescriptorKind::MemorySummary => "memory-summary",
            DescriptorKind::MemoryLayout => "memory-layout",
            DescriptorKind::DiskLayout => "disk-layout",
            DescriptorKind::OsInfo => "os-info",
            DescriptorKind::Uuid => "uuid",
            DescriptorKind::NetworkInterfaces => "network-interfaces",
            DescriptorKind::Versions => "versions",
            DescriptorKind::Time => "time",
            DescriptorKind::Users => "users",
            DescriptorKind::CpuTemperature => "cpu-temperature",
            DescriptorKind::BlockDevices => "block-devices",
            DescriptorKind::AllData => "all-data",
        }
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDescriptorKind(pub String);

impl fmt::Display for UnknownDescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown descriptor kind '{}'", self.0)
    }
}

impl std::error::Error for UnknownDescriptorKind {}

impl FromStr for DescriptorKind {
    type Err = UnknownDescriptorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DescriptorKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownDescriptorKind(s.to_string()))
    }
}

/// Template for a profile: `|hash(machine_id)| mod len` over catalog order.
pub fn select(profile: &IdentityProfile) -> &'static HardwareTemplate {
    let catalog = templates();
    let index = hash_magnitude(&profile.identifiers.machine_id) as usize % catalog.len();
    let template = &catalog[index];
    debug!(target: "hardware", template = template.name, machine = profile.short_id(), "template selected");
    template
}

/// Serial bound to the machine id and a per-field key.
pub fn consistent_serial(profile: &IdentityProfile, key: &str) -> String {
    upper_serial(&format!("{}{}", profile.identifiers.machine_id, key))
}

pub fn render(kind: DescriptorKind, profile: &IdentityProfile, template: &HardwareTemplate) -> Descriptor {
    match kind {
        DescriptorKind::System => Descriptor::System(system(profile, template)),
        DescriptorKind::Bios => Descriptor::Bios(bios(profile, template)),
        DescriptorKind::Baseboard => Descriptor::Baseboard(baseboard(profile, template)),
        DescriptorKind::Chassis => Descriptor::Chassis(chassis(profile, template)),
        DescriptorKind::Cpu => Descriptor::Cpu(cpu(template)),
        DescriptorKind::CpuFlags => Descriptor::CpuFlags(template.cpu.flags.to_string()),
        DescriptorKind::CpuCache => Descriptor::CpuCache(STANDARD_CPU_CACHE),
        DescriptorKind::CpuSpeed => Descriptor::CpuSpeed(CpuSpeed {
            avg: template.cpu.speed,
            min: template.cpu.speed_min,
            max: template.cpu.speed_max,
        }),
        DescriptorKind::MemorySummary => Descriptor::MemorySummary(memory_summary(profile, template)),
        DescriptorKind::MemoryLayout => Descriptor::MemoryLayout(memory_layout(profile, template)),
        DescriptorKind::DiskLayout => Descriptor::DiskLayout(disk_layout(profile)),
        DescriptorKind::OsInfo => Descriptor::OsInfo(os_info(profile)),
        DescriptorKind::Uuid => Descriptor::Uuid(UuidDescriptor {
            os: profile.identifiers.os_machine_id.clone(),
            hardware: profile.identifiers.machine_id.clone(),
            macs: profile.hardware.mac_addresses.clone(),
        }),
        DescriptorKind::NetworkInterfaces => Descriptor::NetworkInterfaces(network_interfaces(profile)),
        DescriptorKind::Versions => Descriptor::Versions(versions(profile)),
        DescriptorKind::Time => Descriptor::Time(time(profile)),
        DescriptorKind::Users => Descriptor::Users(users(profile)),
        DescriptorKind::CpuTemperature => Descriptor::CpuTemperature(cpu_temperature(profile, template)),
        DescriptorKind::BlockDevices => Descriptor::BlockDevices(disk_layout(profile)),
        DescriptorKind::AllData => Descriptor::AllData(Box::new(all_data(profile, template))),
    }
}

pub fn system(profile: &IdentityProfile, template: &HardwareTemplate) -> SystemDescriptor {
    SystemDescriptor {
        manufacturer: template.baseboard.manufacturer.to_string(),
        model: template.baseboard.model.to_string(),
        version: template.baseboard.version.to_string(),
        serial: profile.hardware.baseboard_info.serial.clone(),
        uuid: profile.identifiers.machine_id.clone(),
        sku: format!("SKU-{}", profile.short_id()),
        family: template.chassis.kind.to_string(),
        is_virtual: false,
        virtual_host: String::new(),
    }
}

pub fn bios(profile: &IdentityProfile, template: &HardwareTemplate) -> BiosDescriptor {
    BiosDescriptor {
        vendor: template.bios.vendor.to_string(),
        version: template.bios.version.to_string(),
        release_date: template.bios.release_date.to_string(),
        revision: template.bios.revision.to_string(),
        serial: profile.hardware.bios_info.serial.clone(),
    }
}

pub fn baseboard(profile: &IdentityProfile, template: &HardwareTemplate) -> BaseboardDescriptor {
    BaseboardDescriptor {
        manufacturer: template.baseboard.manufacturer.to_string(),
        model: template.baseboard.model.to_string(),
        version: template.baseboard.version.to_string(),
        serial: profile.hardware.baseboard_info.serial.clone(),
        asset_tag: template.baseboard.asset_tag.to_string(),
    }
}

pub fn chassis(profile: &IdentityProfile, template: &HardwareTemplate) -> ChassisDescriptor {
    ChassisDescriptor {
        manufacturer: template.chassis.manufacturer.to_string(),
        model: template.chassis.model.to_string(),
        kind: template.chassis.kind.to_string(),
        version: template.chassis.version.to_string(),
        serial: consistent_serial(profile, "chassis"),
        asset_tag: template.chassis.asset_tag.to_string(),
    }
}

pub fn cpu(template: &HardwareTemplate) -> CpuDescriptor {
    let cpu = &template.cpu;
    CpuDescriptor {
        manufacturer: cpu.manufacturer.to_string(),
        brand: cpu.brand.to_string(),
        vendor: cpu.manufacturer.to_string(),
        family: cpu.family.to_string(),
        model: cpu.model.to_string(),
        stepping: cpu.stepping.to_string(),
        voltage: cpu.voltage.to_string(),
        speed: cpu.speed,
        speed_min: cpu.speed_min,
        speed_max: cpu.speed_max,
        governor: "performance".to_string(),
        cores: cpu.cores,
        physical_cores: cpu.physical_cores,
        processors: cpu.processors,
        socket: cpu.socket.to_string(),
        flags: cpu.flags.to_string(),
        virtualization: true,
        cache: STANDARD_CPU_CACHE,
    }
}

/// Usage sits between 30% and 70% of total, fixed per machine id.
pub fn memory_summary(profile: &IdentityProfile, template: &HardwareTemplate) -> MemorySummary {
    let total = template.memory_total;
    let percent = 30 + bounded(&format!("{}mem-usage", profile.identifiers.machine_id), 41);
    let used = total / 100 * percent;
    MemorySummary {
        total,
        free: total - used,
        used,
        active: used,
        available: total - used,
        buffers: used / 10,
        cached: used / 5,
        slab: used / 20,
        buffcache: used / 10 * 3,
        swaptotal: total,
        swapused: 0,
        swapfree: total,
    }
}

pub fn memory_layout(profile: &IdentityProfile, template: &HardwareTemplate) -> Vec<MemoryModuleDescriptor> {
    template
        .memory_modules
        .iter()
        .enumerate()
        .map(|(index, module)| {
            let fallback = consistent_serial(profile, &format!("mem{index}"));
            MemoryModuleDescriptor {
                size: module.size,
                bank: format!("BANK {index}"),
                kind: module.kind.to_string(),
                clock_speed: module.clock_speed,
                form_factor: "DIMM".to_string(),
                manufacturer: module.manufacturer.to_string(),
                part_num: format!("{}-{}", module.manufacturer, fallback),
                serial_num: profile
                    .hardware
                    .memory_module_serials
                    .get(index)
                    .cloned()
                    .unwrap_or(fallback),
                voltage_configured: 1.2,
                voltage_min: 1.2,
                voltage_max: 1.2,
            }
        })
        .collect()
}

pub fn disk_layout(profile: &IdentityProfile) -> Vec<DiskDescriptor> {
    let serial = profile
        .hardware
        .disk_serials
        .first()
        .cloned()
        .unwrap_or_else(|| consistent_serial(profile, "disk"));
    vec![DiskDescriptor {
        device: "/dev/sda".to_string(),
        kind: "SSD".to_string(),
        name: "Samsung SSD 980 PRO 1TB".to_string(),
        vendor: "Samsung".to_string(),
        size: 1_000_204_886_016,
        bytes_per_sector: 512,
        total_cylinders: 121_601,
        total_heads: 255,
        total_sectors: 1_953_525_168,
        total_tracks: 31_008_255,
        tracks_per_cylinder: 255,
        sectors_per_track: 63,
        firmware_revision: "5B2QGXA7".to_string(),
        serial_num: serial,
        interface_type: "NVMe".to_string(),
        smart_status: "Ok".to_string(),
        temperature: 35 + bounded(&format!("{}disk-temp", profile.identifiers.machine_id), 20) as u32,
    }]
}

pub fn os_info(profile: &IdentityProfile) -> OsInfo {
    let system = &profile.system;
    let distro = match system.platform.as_str() {
        "win32" => "Windows 10",
        "darwin" => "macOS",
        _ => "Ubuntu",
    };
    OsInfo {
        platform: system.platform.clone(),
        distro: distro.to_string(),
        release: system.os_release.clone(),
        codename: String::new(),
        kernel: system.kernel_version.clone(),
        arch: system.arch.clone(),
        hostname: system.hostname.clone(),
        fqdn: format!("{}.local", system.hostname),
        codepage: "UTF-8".to_string(),
        logofile: String::new(),
        serial: profile.identifiers.os_machine_id.clone(),
        build: system.os_release.clone(),
        servicepack: String::new(),
    }
}

pub fn network_interfaces(profile: &IdentityProfile) -> Vec<NetworkInterface> {
    let machine = &profile.identifiers.machine_id;
    let ip6 = hash_hex(&format!("{machine}ip6"));
    vec![NetworkInterface {
        iface: "Ethernet".to_string(),
        iface_name: "Ethernet".to_string(),
        ip4: format!("192.168.1.{}", 100 + bounded(&format!("{machine}ip4"), 50)),
        ip4subnet: "255.255.255.0".to_string(),
        ip6: format!("fe80::{}:{}", &ip6[0..4], &ip6[4..8]),
        mac: profile.hardware.mac_addresses.first().cloned().unwrap_or_default(),
        internal: false,
        is_virtual: false,
        operstate: "up".to_string(),
        kind: "wired".to_string(),
        duplex: "full".to_string(),
        mtu: 1500,
        speed: 1000,
        dhcp: true,
    }]
}

pub fn versions(profile: &IdentityProfile) -> Versions {
    let owned = |s: &str| s.to_string();
    Versions {
        kernel: profile.system.kernel_version.clone(),
        openssl: owned("1.1.1f"),
        system_openssl: owned("1.1.1f"),
        node: profile.software.runtime.clone(),
        v8: owned("10.2.154.26-node.26"),
        npm: profile.software.package_manager.clone(),
        yarn: owned("1.22.19"),
        git: owned("2.34.1"),
        python3: owned("3.10.6"),
        java: owned("11.0.17"),
        gcc: owned("11.3.0"),
        bash: owned("5.1.16"),
        powershell: owned("7.2.8"),
        dotnet: owned("6.0.404"),
    }
}

/// The clock reads the profile's process start time, so repeated calls agree.
pub fn time(profile: &IdentityProfile) -> TimeDescriptor {
    let software = &profile.software;
    TimeDescriptor {
        current: software.process_start_time,
        uptime: software.process_start_time.saturating_sub(software.system_boot_time) / 1000,
        timezone: profile.system.timezone.clone(),
        timezone_name: profile.system.timezone.clone(),
    }
}

fn iso_timestamp(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

pub fn users(profile: &IdentityProfile) -> Vec<UserSession> {
    let login = iso_timestamp(profile.software.system_boot_time);
    let command = match profile.system.platform.as_str() {
        "win32" => "explorer.exe",
        "darwin" => "loginwindow",
        _ => "bash",
    };
    vec![UserSession {
        user: profile.system.username.clone(),
        tty: "console".to_string(),
        date: login.clone(),
        time: login,
        ip: String::new(),
        command: command.to_string(),
    }]
}

/// Package 45..65 °C, cores 40..65 °C, fixed per machine id.
pub fn cpu_temperature(profile: &IdentityProfile, template: &HardwareTemplate) -> CpuTemperature {
    let machine = &profile.identifiers.machine_id;
    CpuTemperature {
        main: 45 + bounded(&format!("{machine}cpu-temp"), 20) as u32,
        cores: (0..template.cpu.cores)
            .map(|core| 40 + bounded(&format!("{machine}cpu-temp-{core}"), 25) as u32)
            .collect(),
        max: 85,
    }
}

pub fn all_data(profile: &IdentityProfile, template: &HardwareTemplate) -> AllData {
    AllData {
        system: system(profile, template),
        bios: bios(profile, template),
        baseboard: baseboard(profile, template),
        chassis: chassis(profile, template),
        cpu: cpu(template),
        mem: memory_summary(profile, template),
        mem_layout: memory_layout(profile, template),
        disk_layout: disk_layout(profile),
        os_info: BriefOsInfo {
            platform: profile.system.platform.clone(),
            hostname: profile.system.hostname.clone(),
            arch: profile.system.arch.clone(),
        },
        uuid: BriefUuid {
            os: profile.identifiers.os_machine_id.clone(),
            hardware: profile.identifiers.machine_id.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{generate_for, Platform};

    fn profile() -> IdentityProfile {
        generate_for("selector-fixture", Platform::Windows)
    }

    #[test]
    fn selection_is_stable() {
        let p = profile();
        let first = select(&p).name;
        for _ in 0..10 {
            assert_eq!(select(&p).name, first);
        }
    }

    #[test]
    fn every_template_reachable() {
        let mut seen = std::collections::HashSet::new();
        for n in 0..200 {
            let p = generate_for(&format!("reach-{n}"), Platform::Linux);
            seen.insert(select(&p).name);
        }
        assert_eq!(seen.len(), templates().len());
    }

    #[test]
    fn repeated_renders_identical() {
        let p = profile();
        let t = select(&p);
        for kind in DescriptorKind::ALL {
            let a = serde_json::to_string(&render(kind, &p, t)).unwrap();
            let b = serde_json::to_string(&render(kind, &p, t)).unwrap();
            assert_eq!(a, b, "{kind} not stable");
        }
    }

    #[test]
    fn distinct_fields_use_distinct_serials() {
        let p = profile();
        let t = select(&p);
        let bios = bios(&p, t).serial;
        let board = baseboard(&p, t).serial;
        let chassis = chassis(&p, t).serial;
        assert_ne!(bios, board);
        assert_ne!(board, chassis);
        assert_ne!(bios, chassis);
    }

    #[test]
    fn system_descriptor_merges_template_and_profile() {
        let p = profile();
        let t = select(&p);
        let json = render(DescriptorKind::System, &p, t).to_json();
        assert_eq!(json["manufacturer"], t.baseboard.manufacturer);
        assert_eq!(json["uuid"], p.identifiers.machine_id.as_str());
        assert_eq!(json["virtual"], false);
    }

    #[test]
    fn memory_summary_adds_up() {
        let p = profile();
        let t = select(&p);
        let m = memory_summary(&p, t);
        assert_eq!(m.used + m.free, m.total);
        assert!(m.used >= m.total / 100 * 30);
        assert!(m.used <= m.total / 100 * 70);
    }

    #[test]
    fn memory_layout_follows_template_modules() {
        let p = profile();
        let t = select(&p);
        let layout = memory_layout(&p, t);
        assert_eq!(layout.len(), t.memory_modules.len());
        assert_eq!(layout[0].serial_num, p.hardware.memory_module_serials[0]);
    }

    #[test]
    fn time_and_users_follow_software_block() {
        let p = profile();
        let t = time(&p);
        assert_eq!(t.current, p.software.process_start_time);
        assert_eq!(t.uptime, p.software.process_start_time.saturating_sub(p.software.system_boot_time) / 1000);
        assert_eq!(t.timezone, p.system.timezone);

        let sessions = users(&p);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].user, p.system.username);
        assert_eq!(sessions[0].command, "explorer.exe");
        assert!(sessions[0].date.ends_with('Z'));
        assert_eq!(sessions[0].date, sessions[0].time);
    }

    #[test]
    fn versions_report_profile_runtime() {
        let p = profile();
        let v = versions(&p);
        assert_eq!(v.node, p.software.runtime);
        assert_eq!(v.npm, p.software.package_manager);
        assert_eq!(v.kernel, p.system.kernel_version);
    }

    #[test]
    fn cpu_temperature_has_one_reading_per_core() {
        let p = profile();
        let t = select(&p);
        let temp = cpu_temperature(&p, t);
        assert_eq!(temp.cores.len(), t.cpu.cores as usize);
        assert!((45..65).contains(&temp.main));
        assert!(temp.cores.iter().all(|c| (40..65).contains(c)));
    }

    #[test]
    fn block_devices_match_disk_layout() {
        let p = profile();
        let t = select(&p);
        assert_eq!(
            render(DescriptorKind::BlockDevices, &p, t).to_json(),
            render(DescriptorKind::DiskLayout, &p, t).to_json()
        );
    }

    #[test]
    fn all_data_bundles_every_section() {
        let p = profile();
        let t = select(&p);
        let json = render(DescriptorKind::AllData, &p, t).to_json();
        for key in ["system", "bios", "baseboard", "chassis", "cpu", "mem", "memLayout", "diskLayout", "osInfo", "uuid"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["osInfo"]["hostname"], p.system.hostname.as_str());
        assert_eq!(json["uuid"]["hardware"], p.identifiers.machine_id.as_str());
    }

    #[test]
    fn kind_names_parse_back() {
        for kind in DescriptorKind::ALL {
            assert_eq!(kind.name().parse::<DescriptorKind>(), Ok(kind));
        }
        assert!("gpu".parse::<DescriptorKind>().is_err());
    }
}
