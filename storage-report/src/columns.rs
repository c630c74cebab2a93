// SPDX-License-Identifier: GPL-3.0-only

//! The table of every column a report can show.

use std::fmt;

use storage_types::{LogicalVolume, LvSegment, PhysicalVolume, PvSegment, VolumeGroup};
use tracing::trace;

use crate::error::Result;
use crate::field::{FieldValue, SortType};
use crate::format::{FieldContext, lv, pv, seg, vg};
use crate::object::{ObjectKind, ObjectRef, ReportObject};

pub type VgFormatter = fn(&FieldContext<'_>, &VolumeGroup) -> Result<FieldValue>;
pub type LvFormatter = fn(&FieldContext<'_>, &VolumeGroup, &LogicalVolume) -> Result<FieldValue>;
pub type PvFormatter = fn(&FieldContext<'_>, &PhysicalVolume) -> Result<FieldValue>;
pub type SegFormatter =
    fn(&FieldContext<'_>, &VolumeGroup, &LogicalVolume, &LvSegment) -> Result<FieldValue>;
pub type PvSegFormatter = fn(&FieldContext<'_>, &PvSegment) -> Result<FieldValue>;

/// Formatter typed by the object it reads.
#[derive(Clone, Copy)]
pub enum Formatter {
    Vg(VgFormatter),
    Lv(LvFormatter),
    Pv(PvFormatter),
    Seg(SegFormatter),
    PvSeg(PvSegFormatter),
}

impl Formatter {
    /// Whether this formatter can read objects of `kind`.
    pub fn reads(self, kind: ObjectKind) -> bool {
        matches!(
            (self, kind),
            (Formatter::Vg(_), ObjectKind::Vg)
                | (Formatter::Lv(_), ObjectKind::Lv)
                | (Formatter::Pv(_), ObjectKind::Pv | ObjectKind::Label)
                | (Formatter::Seg(_), ObjectKind::Seg)
                | (Formatter::PvSeg(_), ObjectKind::PvSeg)
        )
    }
}

/// One column.
#[derive(Clone, Copy)]
pub struct FieldSpec {
    pub kind: ObjectKind,
    pub sort: SortType,
    pub heading: &'static str,
    /// Minimum display width
    pub width: usize,
    pub id: &'static str,
    pub description: &'static str,
    pub format: Formatter,
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("sort", &self.sort)
            .finish_non_exhaustive()
    }
}

impl FieldSpec {
    /// Format this column for `row`. Rows without an object of the column's
    /// kind get an empty cell.
    pub fn evaluate(&self, ctx: &FieldContext<'_>, row: &ReportObject<'_>) -> Result<FieldValue> {
        let group = row.group_ref();
        let value = match (self.format, row.resolve(self.kind)) {
            (Formatter::Vg(format), Some(ObjectRef::Vg(vg))) => format(ctx, vg),
            (Formatter::Lv(format), Some(ObjectRef::Lv(lv))) => format(ctx, group, lv),
            (Formatter::Pv(format), Some(ObjectRef::Pv(pv))) => format(ctx, pv),
            (Formatter::Seg(format), Some(ObjectRef::Seg(seg))) => match row.lv_ref() {
                Some(lv) => format(ctx, group, lv, seg),
                None => Ok(FieldValue::empty()),
            },
            (Formatter::PvSeg(format), Some(ObjectRef::PvSeg(pvseg))) => format(ctx, pvseg),
            _ => {
                trace!(field = self.id, "row has no {}", self.kind.name());
                Ok(FieldValue::empty())
            }
        };
        value.map_err(|error| error.in_field(self.id))
    }
}

use ObjectKind::{Label, Lv, Pv, PvSeg, Seg, Vg};
use SortType::{Number as NUM, String as STR};

const fn field(
    kind: ObjectKind,
    sort: SortType,
    heading: &'static str,
    width: usize,
    id: &'static str,
    description: &'static str,
    format: Formatter,
) -> FieldSpec {
    FieldSpec {
        kind,
        sort,
        heading,
        width,
        id,
        description,
        format,
    }
}

pub static FIELDS: &[FieldSpec] = &[
    // Logical volumes
    field(Lv, STR, "LV UUID", 38, "lv_uuid", "Unique identifier.", Formatter::Lv(lv::lv_uuid)),
    field(Lv, STR, "LV", 4, "lv_name", "Name. LVs created for internal use are enclosed in brackets.", Formatter::Lv(lv::lv_name)),
    field(Lv, STR, "Path", 4, "lv_path", "Full pathname for LV.", Formatter::Lv(lv::lv_path)),
    field(Lv, STR, "Attr", 4, "lv_attr", "Various attributes - see man page.", Formatter::Lv(lv::lv_attr)),
    field(Lv, STR, "Active", 6, "lv_active", "Active state of the LV.", Formatter::Lv(lv::lv_active)),
    field(Lv, NUM, "Maj", 3, "lv_major", "Persistent major number or -1 if not persistent.", Formatter::Lv(lv::lv_major)),
    field(Lv, NUM, "Min", 3, "lv_minor", "Persistent minor number or -1 if not persistent.", Formatter::Lv(lv::lv_minor)),
    field(Lv, NUM, "Rahead", 6, "lv_read_ahead", "Read ahead setting in current units.", Formatter::Lv(lv::lv_read_ahead)),
    field(Lv, NUM, "KMaj", 4, "lv_kernel_major", "Currently assigned major number or -1 if LV is not active.", Formatter::Lv(lv::lv_kernel_major)),
    field(Lv, NUM, "KMin", 4, "lv_kernel_minor", "Currently assigned minor number or -1 if LV is not active.", Formatter::Lv(lv::lv_kernel_minor)),
    field(Lv, NUM, "KRahead", 7, "lv_kernel_read_ahead", "Currently-in-use read ahead setting in current units.", Formatter::Lv(lv::lv_kernel_read_ahead)),
    field(Lv, NUM, "LSize", 5, "lv_size", "Size of LV in current units.", Formatter::Lv(lv::lv_size)),
    field(Lv, NUM, "MSize", 5, "lv_metadata_size", "For thin pools, the size of the LV that holds the metadata.", Formatter::Lv(lv::lv_metadata_size)),
    field(Lv, NUM, "#Seg", 4, "seg_count", "Number of segments in LV.", Formatter::Lv(lv::seg_count)),
    field(Lv, STR, "Origin", 6, "origin", "For snapshots, the origin device of this LV.", Formatter::Lv(lv::origin)),
    field(Lv, NUM, "OSize", 5, "origin_size", "For snapshots, the size of the origin device of this LV.", Formatter::Lv(lv::origin_size)),
    field(Lv, NUM, "Data%", 6, "data_percent", "For snapshot and thin pools and volumes, the percentage full if LV is active.", Formatter::Lv(lv::data_percent)),
    field(Lv, NUM, "Snap%", 6, "snap_percent", "For snapshots, the percentage full if LV is active.", Formatter::Lv(lv::snap_percent)),
    field(Lv, NUM, "Meta%", 6, "metadata_percent", "For thin pools, the percentage of metadata full if LV is active.", Formatter::Lv(lv::metadata_percent)),
    field(Lv, NUM, "Cpy%Sync", 8, "copy_percent", "For RAID, mirrors and pvmove, current percentage in-sync.", Formatter::Lv(lv::copy_percent)),
    field(Lv, STR, "SyncAction", 10, "raid_sync_action", "For RAID, the current synchronization action being performed.", Formatter::Lv(lv::raid_sync_action)),
    field(Lv, NUM, "Mismatches", 10, "raid_mismatch_count", "For RAID, number of mismatches found or repaired.", Formatter::Lv(lv::raid_mismatch_count)),
    field(Lv, NUM, "WBehind", 7, "raid_write_behind", "For RAID1, the number of outstanding writes allowed to writemostly devices.", Formatter::Lv(lv::raid_write_behind)),
    field(Lv, NUM, "MinSync", 7, "raid_min_recovery_rate", "For RAID1, the minimum recovery I/O load in kiB/sec/disk.", Formatter::Lv(lv::raid_min_recovery_rate)),
    field(Lv, NUM, "MaxSync", 7, "raid_max_recovery_rate", "For RAID1, the maximum recovery I/O load in kiB/sec/disk.", Formatter::Lv(lv::raid_max_recovery_rate)),
    field(Lv, STR, "Move", 4, "move_pv", "For pvmove, Source PV of temporary LV created by pvmove.", Formatter::Lv(lv::move_pv)),
    field(Lv, STR, "Convert", 7, "convert_lv", "For lvconvert, Name of temporary LV created by lvconvert.", Formatter::Lv(lv::convert_lv)),
    field(Lv, STR, "Log", 3, "mirror_log", "For mirrors, the LV holding the synchronisation log.", Formatter::Lv(lv::mirror_log)),
    field(Lv, STR, "Data", 4, "data_lv", "For thin pools, the LV holding the associated data.", Formatter::Lv(lv::data_lv)),
    field(Lv, STR, "Meta", 4, "metadata_lv", "For thin pools, the LV holding the associated metadata.", Formatter::Lv(lv::metadata_lv)),
    field(Lv, STR, "Pool", 4, "pool_lv", "For thin volumes, the thin pool LV for this volume.", Formatter::Lv(lv::pool_lv)),
    field(Lv, STR, "LV Tags", 7, "lv_tags", "Tags, if any.", Formatter::Lv(lv::lv_tags)),
    field(Lv, STR, "LV Profile", 10, "lv_profile", "Configuration profile attached to this LV.", Formatter::Lv(lv::lv_profile)),
    field(Lv, NUM, "Time", 26, "lv_time", "Creation time of the LV, if known", Formatter::Lv(lv::lv_time)),
    field(Lv, STR, "Host", 10, "lv_host", "Creation host of the LV, if known.", Formatter::Lv(lv::lv_host)),
    field(Lv, STR, "Modules", 7, "modules", "Kernel device-mapper modules required for this LV.", Formatter::Lv(lv::modules)),
    // Labels
    field(Label, STR, "Fmt", 3, "pv_fmt", "Type of metadata.", Formatter::Pv(pv::pv_fmt)),
    field(Label, STR, "PV UUID", 38, "pv_uuid", "Unique identifier.", Formatter::Pv(pv::pv_uuid)),
    field(Label, NUM, "DevSize", 7, "dev_size", "Size of underlying device in current units.", Formatter::Pv(|ctx, pv| ctx.size(pv.dev_size))),
    field(Label, STR, "PV", 10, "pv_name", "Name.", Formatter::Pv(pv::pv_name)),
    field(Label, NUM, "PMdaFree", 9, "pv_mda_free", "Free metadata area space on this device in current units.", Formatter::Pv(|ctx, pv| ctx.size(pv.mda_free()))),
    field(Label, NUM, "PMdaSize", 9, "pv_mda_size", "Size of smallest metadata area on this device in current units.", Formatter::Pv(|ctx, pv| ctx.size(pv.mda_size()))),
    // Physical volumes
    field(Pv, NUM, "1st PE", 7, "pe_start", "Offset to the start of data on the underlying device.", Formatter::Pv(|ctx, pv| ctx.size(pv.pe_start))),
    field(Pv, NUM, "PSize", 5, "pv_size", "Size of PV in current units.", Formatter::Pv(|ctx, pv| ctx.size(pv.size_field()))),
    field(Pv, NUM, "PFree", 5, "pv_free", "Total amount of unallocated space in current units.", Formatter::Pv(|ctx, pv| ctx.size(pv.free()))),
    field(Pv, NUM, "Used", 4, "pv_used", "Total amount of allocated space in current units.", Formatter::Pv(|ctx, pv| ctx.size(pv.used()))),
    field(Pv, STR, "Attr", 4, "pv_attr", "Various attributes - see man page.", Formatter::Pv(pv::pv_attr)),
    field(Pv, NUM, "PE", 3, "pv_pe_count", "Total number of Physical Extents.", Formatter::Pv(|ctx, pv| ctx.uint(pv.pe_count))),
    field(Pv, NUM, "Alloc", 5, "pv_pe_alloc_count", "Total number of allocated Physical Extents.", Formatter::Pv(|ctx, pv| ctx.uint(pv.pe_alloc_count))),
    field(Pv, STR, "PV Tags", 7, "pv_tags", "Tags, if any.", Formatter::Pv(pv::pv_tags)),
    field(Pv, NUM, "#PMda", 5, "pv_mda_count", "Number of metadata areas on this device.", Formatter::Pv(|ctx, pv| ctx.uint(pv.mda_count()))),
    field(Pv, NUM, "#PMdaUse", 8, "pv_mda_used_count", "Number of metadata areas in use on this device.", Formatter::Pv(|ctx, pv| ctx.uint(pv.mda_used_count()))),
    // Volume groups
    field(Vg, STR, "Fmt", 3, "vg_fmt", "Type of metadata.", Formatter::Vg(vg::vg_fmt)),
    field(Vg, STR, "VG UUID", 38, "vg_uuid", "Unique identifier.", Formatter::Vg(vg::vg_uuid)),
    field(Vg, STR, "VG", 4, "vg_name", "Name.", Formatter::Vg(vg::vg_name)),
    field(Vg, STR, "Attr", 5, "vg_attr", "Various attributes - see man page.", Formatter::Vg(vg::vg_attr)),
    field(Vg, NUM, "VSize", 5, "vg_size", "Total size of VG in current units.", Formatter::Vg(|ctx, vg| ctx.size(vg.size()))),
    field(Vg, NUM, "VFree", 5, "vg_free", "Total amount of free space in current units.", Formatter::Vg(|ctx, vg| ctx.size(vg.free()))),
    field(Vg, STR, "SYS ID", 6, "vg_sysid", "System ID indicating when and where it was created.", Formatter::Vg(vg::vg_sysid)),
    field(Vg, NUM, "Ext", 3, "vg_extent_size", "Size of Physical Extents in current units.", Formatter::Vg(|ctx, vg| ctx.size(u64::from(vg.extent_size)))),
    field(Vg, NUM, "#Ext", 4, "vg_extent_count", "Total number of Physical Extents.", Formatter::Vg(|ctx, vg| ctx.uint(vg.extent_count))),
    field(Vg, NUM, "Free", 4, "vg_free_count", "Total number of unallocated Physical Extents.", Formatter::Vg(|ctx, vg| ctx.uint(vg.free_count))),
    field(Vg, NUM, "MaxLV", 5, "max_lv", "Maximum number of LVs allowed in VG or 0 if unlimited.", Formatter::Vg(|ctx, vg| ctx.uint(vg.max_lv))),
    field(Vg, NUM, "MaxPV", 5, "max_pv", "Maximum number of PVs allowed in VG or 0 if unlimited.", Formatter::Vg(|ctx, vg| ctx.uint(vg.max_pv))),
    field(Vg, NUM, "#PV", 3, "pv_count", "Number of PVs.", Formatter::Vg(|ctx, vg| ctx.uint(vg.pvs.len() as u64))),
    field(Vg, NUM, "#LV", 3, "lv_count", "Number of LVs.", Formatter::Vg(|ctx, vg| ctx.uint(vg.visible_lv_count()))),
    field(Vg, NUM, "#SN", 3, "snap_count", "Number of snapshots.", Formatter::Vg(|ctx, vg| ctx.uint(vg.snapshot_count()))),
    field(Vg, NUM, "Seq", 3, "vg_seqno", "Revision number of internal metadata.  Incremented whenever it changes.", Formatter::Vg(|ctx, vg| ctx.uint(vg.seqno))),
    field(Vg, STR, "VG Tags", 7, "vg_tags", "Tags, if any.", Formatter::Vg(vg::vg_tags)),
    field(Vg, STR, "VG Profile", 10, "vg_profile", "Configuration profile attached to this VG.", Formatter::Vg(vg::vg_profile)),
    field(Vg, NUM, "#VMda", 5, "vg_mda_count", "Number of metadata areas on this VG.", Formatter::Vg(|ctx, vg| ctx.uint(vg.mda_count()))),
    field(Vg, NUM, "#VMdaUse", 8, "vg_mda_used_count", "Number of metadata areas in use on this VG.", Formatter::Vg(|ctx, vg| ctx.uint(vg.mda_used_count()))),
    field(Vg, NUM, "VMdaFree", 9, "vg_mda_free", "Free metadata area space for this VG in current units.", Formatter::Vg(|ctx, vg| ctx.size(vg.mda_free()))),
    field(Vg, NUM, "VMdaSize", 9, "vg_mda_size", "Size of smallest metadata area for this VG in current units.", Formatter::Vg(|ctx, vg| ctx.size(vg.mda_size()))),
    field(Vg, NUM, "#VMdaCps", 8, "vg_mda_copies", "Target number of in use metadata areas in the VG.", Formatter::Vg(vg::vg_mda_copies)),
    // Segments
    field(Seg, STR, "Type", 4, "segtype", "Type of LV segment.", Formatter::Seg(seg::segtype)),
    field(Seg, NUM, "#Str", 4, "stripes", "Number of stripes or mirror legs.", Formatter::Seg(seg::stripes)),
    field(Seg, NUM, "Stripe", 6, "stripesize", "For stripes, amount of data placed on one device before switching to the next.", Formatter::Seg(seg::stripe_size)),
    field(Seg, NUM, "Region", 6, "regionsize", "For mirrors, the unit of data copied when synchronising devices.", Formatter::Seg(seg::region_size)),
    field(Seg, NUM, "Chunk", 5, "chunksize", "For snapshots, the unit of data used when tracking changes.", Formatter::Seg(seg::chunk_size)),
    field(Seg, NUM, "#Thins", 4, "thin_count", "For thin pools, the number of thin volumes in this pool.", Formatter::Seg(seg::thin_count)),
    field(Seg, STR, "Discards", 8, "discards", "For thin pools, how discards are handled.", Formatter::Seg(seg::discards)),
    field(Seg, NUM, "Zero", 4, "zero", "For thin pools, if zeroing is enabled.", Formatter::Seg(seg::zero)),
    field(Seg, NUM, "TransId", 4, "transaction_id", "For thin pools, the transaction id.", Formatter::Seg(seg::transaction_id)),
    field(Seg, NUM, "Start", 5, "seg_start", "Offset within the LV to the start of the segment in current units.", Formatter::Seg(seg::seg_start)),
    field(Seg, NUM, "Start", 5, "seg_start_pe", "Offset within the LV to the start of the segment in physical extents.", Formatter::Seg(seg::seg_start_pe)),
    field(Seg, NUM, "SSize", 5, "seg_size", "Size of segment in current units.", Formatter::Seg(seg::seg_size)),
    field(Seg, STR, "Seg Tags", 8, "seg_tags", "Tags, if any.", Formatter::Seg(seg::seg_tags)),
    field(Seg, STR, "PE Ranges", 9, "seg_pe_ranges", "Ranges of Physical Extents of underlying devices in command line format.", Formatter::Seg(seg::seg_pe_ranges)),
    field(Seg, STR, "Devices", 5, "devices", "Underlying devices used with starting extent numbers.", Formatter::Seg(seg::devices)),
    field(Seg, STR, "Monitor", 7, "seg_monitor", "dmeventd monitoring status of the segment.", Formatter::Seg(seg::seg_monitor)),
    // PV segments
    field(PvSeg, NUM, "Start", 5, "pvseg_start", "Physical Extent number of start of segment.", Formatter::PvSeg(seg::pvseg_start)),
    field(PvSeg, NUM, "SSize", 5, "pvseg_size", "Number of extents in segment.", Formatter::PvSeg(seg::pvseg_size)),
];

/// Exact, case-insensitive lookup by column id.
pub fn field_by_id(id: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|spec| spec.id.eq_ignore_ascii_case(id))
}
