use lazy_static::lazy_static;

#[derive(Debug, Clone, PartialEq)]
pub struct CpuTemplate {
    pub manufacturer: &'static str,
    pub brand: &'static str,
    pub family: &'static str,
    pub model: &'static str,
    pub stepping: &'static str,
    pub voltage: &'static str,
    pub speed: f64,
    pub speed_min: f64,
    pub speed_max: f64,
    pub cores: u32,
    pub physical_cores: u32,
    pub processors: u32,
    pub socket: &'static str,
    pub flags: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiosTemplate {
    pub vendor: &'static str,
    pub version: &'static str,
    pub release_date: &'static str,
    pub revision: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardTemplate {
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub version: &'static str,
    pub asset_tag: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChassisTemplate {
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub kind: &'static str,
    pub version: &'static str,
    pub asset_tag: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryModuleTemplate {
    pub size: u64,
    pub kind: &'static str,
    pub clock_speed: u32,
    pub manufacturer: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HardwareTemplate {
    pub name: &'static str,
    pub cpu: CpuTemplate,
    pub bios: BiosTemplate,
    pub baseboard: BoardTemplate,
    pub chassis: ChassisTemplate,
    pub memory_total: u64,
    pub memory_modules: Vec<MemoryModuleTemplate>,
}

const GIB: u64 = 1024 * 1024 * 1024;

const INTEL_DESKTOP_FLAGS: &str = "fpu vme de pse tsc msr pae mce cx8 apic sep mtrr pge mca cmov pat pse36 clflush dts acpi mmx fxsr sse sse2 ss ht tm pbe syscall nx pdpe1gb rdtscp lm constant_tsc art arch_perfmon pebs bts rep_good nopl xtopology nonstop_tsc cpuid aperfmperf pni pclmulqdq dtes64 monitor ds_cpl vmx smx est tm2 ssse3 sdbg fma cx16 xtpr pdcm pcid sse4_1 sse4_2 x2apic movbe popcnt tsc_deadline_timer aes xsave avx f16c rdrand lahf_lm abm 3dnowprefetch cpuid_fault epb invpcid_single ssbd ibrs ibpb stibp ibrs_enhanced tpr_shadow vnmi flexpriority ept vpid ept_ad fsgsbase tsc_adjust bmi1 avx2 smep bmi2 erms invpcid mpx rdseed adx smap clflushopt intel_pt xsaveopt xsavec xgetbv1 xsaves dtherm ida arat pln pts hwp hwp_notify hwp_act_window hwp_epp md_clear flush_l1d arch_capabilities";

const AMD_DESKTOP_FLAGS: &str = "fpu vme de pse tsc msr pae mce cx8 apic sep mtrr pge mca cmov pat pse36 clflush mmx fxsr sse sse2 ht syscall nx mmxext fxsr_opt pdpe1gb rdtscp lm constant_tsc rep_good nopl xtopology nonstop_tsc cpuid extd_apicid aperfmperf rapl pni pclmulqdq monitor ssse3 fma cx16 sse4_1 sse4_2 movbe popcnt aes xsave avx f16c rdrand lahf_lm cmp_legacy svm extapic cr8_legacy abm sse4a misalignsse 3dnowprefetch osvw ibs skinit wdt tce topoext perfctr_core perfctr_nb bpext perfctr_llc mwaitx cpb cat_l3 cdp_l3 hw_pstate ssbd mba ibrs ibpb stibp vmmcall fsgsbase bmi1 avx2 smep bmi2 erms invpcid cqm rdt_a rdseed adx smap clflushopt clwb sha_ni xsaveopt xsavec xgetbv1 xsaves cqm_llc cqm_occup_llc cqm_mbm_total cqm_mbm_local clzero irperf xsaveerptr rdpru wbnoinvd arat npt lbrv svm_lock nrip_save tsc_scale vmcb_clean flushbyasid decodeassists pausefilter pfthreshold avic v_vmsave_vmload vgif v_spec_ctrl umip pku ospke vaes vpclmulqdq rdpid overflow_recov succor smca fsrm";

const INTEL_LAPTOP_FLAGS: &str = "fpu vme de pse tsc msr pae mce cx8 apic sep mtrr pge mca cmov pat pse36 clflush dts acpi mmx fxsr sse sse2 ss ht tm pbe syscall nx pdpe1gb rdtscp lm constant_tsc art arch_perfmon pebs bts rep_good nopl xtopology nonstop_tsc cpuid aperfmperf tsc_known_freq pni pclmulqdq dtes64 monitor ds_cpl vmx est tm2 ssse3 sdbg fma cx16 xtpr pdcm pcid sse4_1 sse4_2 x2apic movbe popcnt tsc_deadline_timer aes xsave avx f16c rdrand lahf_lm abm 3dnowprefetch cpuid_fault epb cat_l2 invpcid_single cdp_l2 ssbd ibrs ibpb stibp ibrs_enhanced tpr_shadow vnmi flexpriority ept vpid ept_ad fsgsbase tsc_adjust bmi1 avx2 smep bmi2 erms invpcid rdt_a avx512f avx512dq rdseed adx smap avx512ifma clflushopt intel_pt avx512cd sha_ni avx512bw avx512vl xsaveopt xsavec xgetbv1 xsaves split_lock_detect dtherm ida arat pln pts hwp hwp_notify hwp_act_window hwp_epp hwp_pkg_req avx512vbmi umip pku ospke avx512_vbmi2 gfni vaes vpclmulqdq avx512_vnni avx512_bitalg avx512_vpopcntdq rdpid movdiri movdir64b fsrm avx512_vp2intersect md_clear ibt flush_l1d arch_capabilities";

lazy_static! {
    /// Templates in selection order. Reordering changes which template every
    /// existing profile maps to.
    pub static ref CATALOG: Vec<HardwareTemplate> = vec![
        HardwareTemplate {
            name: "intel_desktop",
            cpu: CpuTemplate {
                manufacturer: "Intel",
                brand: "Intel(R) Core(TM) i7-10700K CPU @ 3.80GHz",
                family: "6",
                model: "165",
                stepping: "5",
                voltage: "1.2",
                speed: 3.8,
                speed_min: 0.8,
                speed_max: 5.1,
                cores: 8,
                physical_cores: 8,
                processors: 1,
                socket: "LGA1200",
                flags: INTEL_DESKTOP_FLAGS,
            },
            bios: BiosTemplate {
                vendor: "American Megatrends Inc.",
                version: "2.70",
                release_date: "2021-04-14",
                revision: "5.17",
            },
            baseboard: BoardTemplate {
                manufacturer: "ASUSTeK COMPUTER INC.",
                model: "PRIME Z490-A",
                version: "Rev 1.xx",
                asset_tag: "Default string",
            },
            chassis: ChassisTemplate {
                manufacturer: "Default string",
                model: "Default string",
                kind: "Desktop",
                version: "Default string",
                asset_tag: "Default string",
            },
            memory_total: 16 * GIB,
            memory_modules: vec![
                MemoryModuleTemplate { size: 8 * GIB, kind: "DDR4", clock_speed: 3200, manufacturer: "Corsair" },
                MemoryModuleTemplate { size: 8 * GIB, kind: "DDR4", clock_speed: 3200, manufacturer: "Corsair" },
            ],
        },
        HardwareTemplate {
            name: "amd_desktop",
            cpu: CpuTemplate {
                manufacturer: "AMD",
                brand: "AMD Ryzen 7 5800X 8-Core Processor",
                family: "25",
                model: "33",
                stepping: "0",
                voltage: "1.35",
                speed: 3.8,
                speed_min: 2.2,
                speed_max: 4.7,
                cores: 8,
                physical_cores: 8,
                processors: 1,
                socket: "AM4",
                flags: AMD_DESKTOP_FLAGS,
            },
            bios: BiosTemplate {
                vendor: "American Megatrends Inc.",
                version: "4.40",
                release_date: "2022-03-15",
                revision: "5.19",
            },
            baseboard: BoardTemplate {
                manufacturer: "ASUSTeK COMPUTER INC.",
                model: "ROG STRIX B550-F GAMING",
                version: "Rev 1.xx",
                asset_tag: "Default string",
            },
            chassis: ChassisTemplate {
                manufacturer: "Default string",
                model: "Default string",
                kind: "Desktop",
                version: "Default string",
                asset_tag: "Default string",
            },
            memory_total: 32 * GIB,
            memory_modules: vec![
                MemoryModuleTemplate { size: 16 * GIB, kind: "DDR4", clock_speed: 3600, manufacturer: "G.Skill" },
                MemoryModuleTemplate { size: 16 * GIB, kind: "DDR4", clock_speed: 3600, manufacturer: "G.Skill" },
            ],
        },
        HardwareTemplate {
            name: "intel_laptop",
            cpu: CpuTemplate {
                manufacturer: "Intel",
                brand: "Intel(R) Core(TM) i7-1165G7 @ 2.80GHz",
                family: "6",
                model: "140",
                stepping: "1",
                voltage: "0.9",
                speed: 2.8,
                speed_min: 0.4,
                speed_max: 4.7,
                cores: 4,
                physical_cores: 4,
                processors: 1,
                socket: "BGA1449",
                flags: INTEL_LAPTOP_FLAGS,
            },
            bios: BiosTemplate {
                vendor: "LENOVO",
                version: "1.45",
                release_date: "2022-08-10",
                revision: "1.45",
            },
            baseboard: BoardTemplate {
                manufacturer: "LENOVO",
                model: "20U7CTO1WW",
                version: "SDK0J40697 WIN",
                asset_tag: "Not Available",
            },
            chassis: ChassisTemplate {
                manufacturer: "LENOVO",
                model: "20U7CTO1WW",
                kind: "Notebook",
                version: "ThinkPad X1 Carbon Gen 9",
                asset_tag: "Not Available",
            },
            memory_total: 16 * GIB,
            memory_modules: vec![
                MemoryModuleTemplate { size: 16 * GIB, kind: "LPDDR4X", clock_speed: 4266, manufacturer: "Samsung" },
            ],
        },
    ];
}

pub fn templates() -> &'static [HardwareTemplate] {
    &CATALOG
}

pub fn by_name(name: &str) -> Option<&'static HardwareTemplate> {
    CATALOG.iter().find(|t| t.name == name)
}
