// SPDX-License-Identifier: GPL-3.0-only

//! LVM (Logical Volume Manager) metadata model
//!
//! Volume groups own their physical and logical volumes; logical volumes own
//! their segments. References between volumes (pool, origin, metadata, log and
//! image sub-volumes) are held by name and resolved through the owning
//! [`VolumeGroup`].
//!
//! Sizes are counted in 512-byte sectors unless a field says otherwise.

use std::borrow::Cow;

use enumflags2::{BitFlags, bitflags};
use serde::{Deserialize, Serialize};

use crate::flags::flag_list;

/// Status bits carried by a volume group.
#[bitflags]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VgFlag {
    Read,
    Write,
    Resizeable,
    Exported,
    Partial,
    Clustered,
}

/// Status bits carried by a logical volume.
#[bitflags]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LvFlag {
    Read,
    Write,
    Visible,
    FixedMinor,
    /// Held by an in-progress pvmove.
    Locked,
    Pvmove,
    Converting,
    Virtual,
    Mirrored,
    MirrorNotSynced,
    MirrorImage,
    MirrorLog,
    Raid,
    RaidImage,
    RaidMeta,
    ThinPool,
    ThinPoolData,
    ThinPoolMetadata,
    ThinVolume,
}

/// Status bits carried by a physical volume.
#[bitflags]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PvFlag {
    Allocatable,
    Exported,
    Missing,
}

/// Extent allocation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocPolicy {
    #[default]
    Inherit,
    Contiguous,
    Cling,
    ClingByTags,
    Normal,
    Anywhere,
}

impl AllocPolicy {
    /// Single-character form used in attribute strings.
    pub fn attr_char(self) -> char {
        match self {
            AllocPolicy::Contiguous => 'c',
            AllocPolicy::Cling => 'l',
            AllocPolicy::ClingByTags => 't',
            AllocPolicy::Normal => 'n',
            AllocPolicy::Anywhere => 'a',
            AllocPolicy::Inherit => 'i',
        }
    }
}

/// Configured read-ahead of a logical volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadAhead {
    #[default]
    Auto,
    Sectors(u32),
}

/// Kernel target a segment maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentType {
    #[default]
    Striped,
    Mirror,
    Snapshot,
    Raid1,
    Raid4,
    Raid5,
    Raid6,
    Raid10,
    ThinPool,
    Thin,
    Zero,
    Error,
}

impl SegmentType {
    pub fn name(self) -> &'static str {
        match self {
            SegmentType::Striped => "striped",
            SegmentType::Mirror => "mirror",
            SegmentType::Snapshot => "snapshot",
            SegmentType::Raid1 => "raid1",
            SegmentType::Raid4 => "raid4",
            SegmentType::Raid5 => "raid5",
            SegmentType::Raid6 => "raid6",
            SegmentType::Raid10 => "raid10",
            SegmentType::ThinPool => "thin-pool",
            SegmentType::Thin => "thin",
            SegmentType::Zero => "zero",
            SegmentType::Error => "error",
        }
    }

    pub fn is_raid(self) -> bool {
        matches!(
            self,
            SegmentType::Raid1
                | SegmentType::Raid4
                | SegmentType::Raid5
                | SegmentType::Raid6
                | SegmentType::Raid10
        )
    }

    /// Kernel modules a segment of this type needs loaded.
    pub fn modules(self) -> &'static [&'static str] {
        match self {
            SegmentType::Mirror => &["mirror"],
            SegmentType::Snapshot => &["snapshot"],
            SegmentType::ThinPool | SegmentType::Thin => &["thin-pool"],
            SegmentType::Zero => &["zero"],
            SegmentType::Error => &["error"],
            t if t.is_raid() => &["raid"],
            _ => &[],
        }
    }
}

/// Discard handling configured on a thin pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Discards {
    Ignore,
    NoPassdown,
    #[default]
    Passdown,
}

impl Discards {
    pub fn name(self) -> &'static str {
        match self {
            Discards::Ignore => "ignore",
            Discards::NoPassdown => "nopassdown",
            Discards::Passdown => "passdown",
        }
    }
}

/// One area of a segment: a run of extents on a PV or on another LV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmentArea {
    Pv { pv: String, pe: u32 },
    Lv { lv: String, le: u32 },
    Unassigned,
}

/// A contiguous mapped region of a logical volume.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LvSegment {
    pub segtype: SegmentType,

    /// First logical extent covered by this segment
    pub le: u32,

    /// Length in logical extents
    pub len: u32,

    /// Length of each area in extents
    pub area_len: u32,

    pub stripe_size: u32,
    pub region_size: u32,
    pub chunk_size: u32,

    pub areas: Vec<SegmentArea>,

    /// Segment is the temporary mirror of a pvmove
    pub pvmove: bool,

    pub log_lv: Option<String>,
    pub pool_lv: Option<String>,
    pub metadata_lv: Option<String>,
    pub origin: Option<String>,
    pub external_lv: Option<String>,

    pub transaction_id: u64,
    pub zero_new_blocks: bool,
    pub discards: Discards,

    pub writebehind: u32,
    pub min_recovery_rate: u32,
    pub max_recovery_rate: u32,

    pub tags: Vec<String>,
}

impl LvSegment {
    pub fn area_lv(&self, index: usize) -> Option<&str> {
        match self.areas.get(index) {
            Some(SegmentArea::Lv { lv, .. }) => Some(lv),
            _ => None,
        }
    }

    pub fn area_pv(&self, index: usize) -> Option<&str> {
        match self.areas.get(index) {
            Some(SegmentArea::Pv { pv, .. }) => Some(pv),
            _ => None,
        }
    }

    pub fn references_lv(&self, name: &str) -> bool {
        self.areas
            .iter()
            .any(|area| matches!(area, SegmentArea::Lv { lv, .. } if lv == name))
    }

    pub fn is_mirrored(&self) -> bool {
        self.segtype == SegmentType::Mirror
    }

    /// Name reported in the `segtype` column. Single-area striped is "linear".
    pub fn type_name(&self) -> &'static str {
        if self.segtype == SegmentType::Striped && self.areas.len() == 1 {
            "linear"
        } else {
            self.segtype.name()
        }
    }
}

/// Link from a snapshot (cow) volume to its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CowLink {
    pub origin: String,

    /// Chunk size in sectors
    #[serde(default)]
    pub chunk_size: u32,

    /// Snapshot is being merged back into its origin
    #[serde(default)]
    pub merging: bool,
}

/// Logical volume
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogicalVolume {
    /// Name; empty for the placeholder describing free space
    pub name: String,

    /// 32-character LVM identifier
    pub id: String,

    #[serde(with = "flag_list")]
    pub status: BitFlags<LvFlag>,

    pub alloc: AllocPolicy,
    pub read_ahead: ReadAhead,

    /// Persistent device numbers, when configured
    pub major: Option<i32>,
    pub minor: Option<i32>,

    /// Size in sectors
    pub size: u64,
    pub le_count: u32,

    /// Creation time (seconds since the epoch), 0 if unknown
    pub timestamp: i64,
    pub host: Option<String>,
    pub profile: Option<String>,
    pub tags: Vec<String>,

    pub segments: Vec<LvSegment>,

    /// Present when this volume is a snapshot (cow)
    pub snapshot: Option<CowLink>,

    /// Number of snapshots taken of this volume
    pub origin_count: u32,

    /// Snapshot currently merging into this origin
    pub merging_snapshot: Option<String>,
}

impl LogicalVolume {
    pub fn has(&self, flag: LvFlag) -> bool {
        self.status.contains(flag)
    }

    pub fn first_segment(&self) -> Option<&LvSegment> {
        self.segments.first()
    }

    pub fn is_cow(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn is_origin(&self) -> bool {
        self.origin_count > 0
    }

    pub fn is_merging_origin(&self) -> bool {
        self.merging_snapshot.is_some()
    }

    pub fn is_merging_cow(&self) -> bool {
        self.snapshot.as_ref().is_some_and(|cow| cow.merging)
    }

    pub fn is_thin_pool(&self) -> bool {
        self.has(LvFlag::ThinPool)
    }

    pub fn is_thin_volume(&self) -> bool {
        self.has(LvFlag::ThinVolume)
    }

    pub fn is_raid_type(&self) -> bool {
        self.status
            .intersects(LvFlag::Raid | LvFlag::RaidImage | LvFlag::RaidMeta)
    }

    /// Segment of a thin volume that points at its pool.
    pub fn thin_segment(&self) -> Option<&LvSegment> {
        self.segments
            .iter()
            .find(|seg| seg.segtype == SegmentType::Thin)
    }

    /// Kernel modules needed to activate this volume, without duplicates.
    pub fn modules(&self) -> Vec<&'static str> {
        let mut modules: Vec<&'static str> = Vec::new();
        if self.is_cow() || self.is_origin() {
            modules.push("snapshot");
        }
        for seg in &self.segments {
            for module in seg.segtype.modules() {
                if !modules.contains(module) {
                    modules.push(module);
                }
            }
        }
        modules
    }
}

/// On-disk metadata area of a physical volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataArea {
    /// Size in sectors
    pub size: u64,

    /// Free space in sectors
    pub free: u64,

    /// Area exists but is not kept up to date
    pub ignored: bool,
}

/// Allocated or free run of extents on a physical volume.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PvSegment {
    pub pe: u32,
    pub len: u32,

    /// Volume mapped onto this run, `None` when free
    pub lv: Option<String>,
}

/// Physical volume
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalVolume {
    /// Device path (e.g., "/dev/sda1")
    pub name: String,

    pub id: String,

    /// Metadata format name (e.g., "lvm2"), if labelled
    pub format: Option<String>,

    #[serde(with = "flag_list")]
    pub status: BitFlags<PvFlag>,

    /// Size recorded in the label, in sectors
    pub size: u64,

    /// Size of the underlying device, in sectors
    pub dev_size: u64,

    /// Offset of the first extent, in sectors
    pub pe_start: u64,

    /// Extent size in sectors
    pub pe_size: u32,
    pub pe_count: u32,
    pub pe_alloc_count: u32,

    pub tags: Vec<String>,
    pub mdas: Vec<MetadataArea>,
    pub segments: Vec<PvSegment>,
}

impl PhysicalVolume {
    pub fn has(&self, flag: PvFlag) -> bool {
        self.status.contains(flag)
    }

    /// Usable size; falls back to the label size for PVs without extents.
    pub fn size_field(&self) -> u64 {
        if self.pe_count == 0 {
            self.size
        } else {
            u64::from(self.pe_count) * u64::from(self.pe_size)
        }
    }

    pub fn free(&self) -> u64 {
        if self.pe_count == 0 {
            self.size
        } else {
            u64::from(self.pe_count.saturating_sub(self.pe_alloc_count)) * u64::from(self.pe_size)
        }
    }

    pub fn used(&self) -> u64 {
        if self.pe_count == 0 {
            0
        } else {
            u64::from(self.pe_alloc_count) * u64::from(self.pe_size)
        }
    }

    pub fn mda_count(&self) -> u32 {
        self.mdas.len() as u32
    }

    pub fn mda_used_count(&self) -> u32 {
        self.mdas.iter().filter(|mda| !mda.ignored).count() as u32
    }

    /// Smallest free space across the metadata areas, 0 if there are none.
    pub fn mda_free(&self) -> u64 {
        self.mdas.iter().map(|mda| mda.free).min().unwrap_or(0)
    }

    /// Smallest metadata area, 0 if there are none.
    pub fn mda_size(&self) -> u64 {
        self.mdas.iter().map(|mda| mda.size).min().unwrap_or(0)
    }
}

/// Volume group
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeGroup {
    /// Volume group name; empty for the group standing in for orphan PVs
    pub name: String,

    pub id: String,

    /// Metadata format name (e.g., "lvm2")
    pub format: Option<String>,

    #[serde(with = "flag_list")]
    pub status: BitFlags<VgFlag>,

    pub system_id: String,

    /// Extent size in sectors
    pub extent_size: u32,
    pub extent_count: u32,
    pub free_count: u32,

    pub max_lv: u32,
    pub max_pv: u32,
    pub seqno: u32,

    pub alloc: AllocPolicy,
    pub profile: Option<String>,
    pub tags: Vec<String>,

    /// Number of metadata copies to keep, `None` when unmanaged
    pub mda_copies: Option<u32>,

    pub pvs: Vec<PhysicalVolume>,
    pub lvs: Vec<LogicalVolume>,
}

impl VolumeGroup {
    /// Group reported for physical volumes that belong to no group.
    ///
    /// Carries only the format of the PV being reported so that group-scoped
    /// columns have something to render.
    pub fn orphan(format: Option<&str>) -> Self {
        Self {
            format: format.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn has(&self, flag: VgFlag) -> bool {
        self.status.contains(flag)
    }

    pub fn size(&self) -> u64 {
        u64::from(self.extent_count) * u64::from(self.extent_size)
    }

    pub fn free(&self) -> u64 {
        u64::from(self.free_count) * u64::from(self.extent_size)
    }

    pub fn lv(&self, name: &str) -> Option<&LogicalVolume> {
        self.lvs.iter().find(|lv| lv.name == name)
    }

    pub fn pv(&self, name: &str) -> Option<&PhysicalVolume> {
        self.pvs.iter().find(|pv| pv.name == name)
    }

    /// Snapshots are visible through their origin.
    pub fn is_visible(&self, lv: &LogicalVolume) -> bool {
        match lv.snapshot.as_ref().and_then(|cow| self.lv(&cow.origin)) {
            Some(origin) => origin.has(LvFlag::Visible),
            None => lv.has(LvFlag::Visible),
        }
    }

    pub fn origin_of(&self, lv: &LogicalVolume) -> Option<&LogicalVolume> {
        lv.snapshot.as_ref().and_then(|cow| self.lv(&cow.origin))
    }

    /// Number of user-visible volumes, snapshots excluded.
    pub fn visible_lv_count(&self) -> u32 {
        self.lvs
            .iter()
            .filter(|lv| !lv.is_cow() && lv.has(LvFlag::Visible))
            .count() as u32
    }

    pub fn snapshot_count(&self) -> u32 {
        self.lvs.iter().filter(|lv| lv.is_cow()).count() as u32
    }

    /// Mirrored volume whose first segment uses `image` as one of its legs.
    pub fn mirror_owner(&self, image: &LogicalVolume) -> Option<&LogicalVolume> {
        self.lvs.iter().find(|lv| {
            lv.first_segment()
                .is_some_and(|seg| seg.is_mirrored() && seg.references_lv(&image.name))
        })
    }

    /// Number of thin volume segments backed by the pool named `pool`.
    pub fn thin_users_of(&self, pool: &str) -> u32 {
        self.lvs
            .iter()
            .flat_map(|lv| lv.segments.iter())
            .filter(|seg| seg.segtype == SegmentType::Thin && seg.pool_lv.as_deref() == Some(pool))
            .count() as u32
    }

    pub fn mda_count(&self) -> u32 {
        self.pvs.iter().map(PhysicalVolume::mda_count).sum()
    }

    pub fn mda_used_count(&self) -> u32 {
        self.pvs.iter().map(PhysicalVolume::mda_used_count).sum()
    }

    pub fn mda_free(&self) -> u64 {
        self.pvs
            .iter()
            .flat_map(|pv| pv.mdas.iter())
            .map(|mda| mda.free)
            .min()
            .unwrap_or(0)
    }

    pub fn mda_size(&self) -> u64 {
        self.pvs
            .iter()
            .flat_map(|pv| pv.mdas.iter())
            .map(|mda| mda.size)
            .min()
            .unwrap_or(0)
    }

    /// Display name for diagnostics: `vg/lv`, or just the LV name for orphans.
    pub fn lv_display_name<'a>(&self, lv: &'a LogicalVolume) -> Cow<'a, str> {
        if self.name.is_empty() {
            Cow::Borrowed(lv.name.as_str())
        } else {
            Cow::Owned(format!("{}/{}", self.name, lv.name))
        }
    }
}

/// Everything a report is run against: groups plus PVs outside any group.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataSnapshot {
    pub vgs: Vec<VolumeGroup>,
    pub orphans: Vec<PhysicalVolume>,
}
