//! Query-response shapes for hardware and OS descriptors, serialized with the
//! field names system-information libraries use.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemDescriptor {
    pub manufacturer: String,
    pub model: String,
    pub version: String,
    pub serial: String,
    pub uuid: String,
    pub sku: String,
    pub family: String,
    #[serde(rename = "virtual")]
    pub is_virtual: bool,
    pub virtual_host: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BiosDescriptor {
    pub vendor: String,
    pub version: String,
    pub release_date: String,
    pub revision: String,
    pub serial: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseboardDescriptor {
    pub manufacturer: String,
    pub model: String,
    pub version: String,
    pub serial: String,
    pub asset_tag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChassisDescriptor {
    pub manufacturer: String,
    pub model: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
    pub serial: String,
    pub asset_tag: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CpuCache {
    pub l1d: u64,
    pub l1i: u64,
    pub l2: u64,
    pub l3: u64,
}

pub const STANDARD_CPU_CACHE: CpuCache = CpuCache {
    l1d: 32_768,
    l1i: 32_768,
    l2: 262_144,
    l3: 16_777_216,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuDescriptor {
    pub manufacturer: String,
    pub brand: String,
    pub vendor: String,
    pub family: String,
    pub model: String,
    pub stepping: String,
    pub voltage: String,
    pub speed: f64,
    pub speed_min: f64,
    pub speed_max: f64,
    pub governor: String,
    pub cores: u32,
    pub physical_cores: u32,
    pub processors: u32,
    pub socket: String,
    pub flags: String,
    pub virtualization: bool,
    pub cache: CpuCache,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuSpeed {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemorySummary {
    pub total: u64,
    pub free: u64,
    pub used: u64,
    pub active: u64,
    pub available: u64,
    pub buffers: u64,
    pub cached: u64,
    pub slab: u64,
    pub buffcache: u64,
    pub swaptotal: u64,
    pub swapused: u64,
    pub swapfree: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryModuleDescriptor {
    pub size: u64,
    pub bank: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub clock_speed: u32,
    pub form_factor: String,
    pub manufacturer: String,
    pub part_num: String,
    pub serial_num: String,
    pub voltage_configured: f64,
    pub voltage_min: f64,
    pub voltage_max: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskDescriptor {
    pub device: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub vendor: String,
    pub size: u64,
    pub bytes_per_sector: u32,
    pub total_cylinders: u64,
    pub total_heads: u32,
    pub total_sectors: u64,
    pub total_tracks: u64,
    pub tracks_per_cylinder: u32,
    pub sectors_per_track: u32,
    pub firmware_revision: String,
    pub serial_num: String,
    pub interface_type: String,
    pub smart_status: String,
    pub temperature: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OsInfo {
    pub platform: String,
    pub distro: String,
    pub release: String,
    pub codename: String,
    pub kernel: String,
    pub arch: String,
    pub hostname: String,
    pub fqdn: String,
    pub codepage: String,
    pub logofile: String,
    pub serial: String,
    pub build: String,
    pub servicepack: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UuidDescriptor {
    pub os: String,
    pub hardware: String,
    pub macs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    pub iface: String,
    pub iface_name: String,
    pub ip4: String,
    pub ip4subnet: String,
    pub ip6: String,
    pub mac: String,
    pub internal: bool,
    #[serde(rename = "virtual")]
    pub is_virtual: bool,
    pub operstate: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub duplex: String,
    pub mtu: u32,
    pub speed: u32,
    pub dhcp: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Versions {
    pub kernel: String,
    pub openssl: String,
    pub system_openssl: String,
    pub node: String,
    pub v8: String,
    pub npm: String,
    pub yarn: String,
    pub git: String,
    pub python3: String,
    pub java: String,
    pub gcc: String,
    pub bash: String,
    pub powershell: String,
    pub dotnet: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeDescriptor {
    pub current: u64,
    /// Seconds.
    pub uptime: u64,
    pub timezone: String,
    pub timezone_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSession {
    pub user: String,
    pub tty: String,
    pub date: String,
    pub time: String,
    pub ip: String,
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CpuTemperature {
    pub main: u32,
    pub cores: Vec<u32>,
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BriefOsInfo {
    pub platform: String,
    pub hostname: String,
    pub arch: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BriefUuid {
    pub os: String,
    pub hardware: String,
}

/// Everything a full system-information dump returns in one object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllData {
    pub system: SystemDescriptor,
    pub bios: BiosDescriptor,
    pub baseboard: BaseboardDescriptor,
    pub chassis: ChassisDescriptor,
    pub cpu: CpuDescriptor,
    pub mem: MemorySummary,
    pub mem_layout: Vec<MemoryModuleDescriptor>,
    pub disk_layout: Vec<DiskDescriptor>,
    pub os_info: BriefOsInfo,
    pub uuid: BriefUuid,
}

/// One rendered descriptor. Serializes as the bare inner shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Descriptor {
    System(SystemDescriptor),
    Bios(BiosDescriptor),
    Baseboard(BaseboardDescriptor),
    Chassis(ChassisDescriptor),
    Cpu(CpuDescriptor),
    CpuFlags(String),
    CpuCache(CpuCache),
    CpuSpeed(CpuSpeed),
    MemorySummary(MemorySummary),
    MemoryLayout(Vec<MemoryModuleDescriptor>),
    DiskLayout(Vec<DiskDescriptor>),
    OsInfo(OsInfo),
    Uuid(UuidDescriptor),
    NetworkInterfaces(Vec<NetworkInterface>),
    Versions(Versions),
    Time(TimeDescriptor),
    Users(Vec<UserSession>),
    CpuTemperature(CpuTemperature),
    BlockDevices(Vec<DiskDescriptor>),
    AllData(Box<AllData>),
}

impl Descriptor {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
