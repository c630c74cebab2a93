// SPDX-License-Identifier: GPL-3.0-only

//! Segment and PV segment columns.

use storage_types::{
    LogicalVolume, LvFlag, LvSegment, PvSegment, SegmentArea, SegmentType, VolumeGroup,
};

use super::FieldContext;
use crate::error::Result;
use crate::field::FieldValue;

type SegResult = Result<FieldValue>;

fn is_thin_pool(seg: &LvSegment) -> bool {
    seg.segtype == SegmentType::ThinPool
}

pub fn segtype(
    ctx: &FieldContext<'_>,
    _vg: &VolumeGroup,
    _lv: &LogicalVolume,
    seg: &LvSegment,
) -> SegResult {
    ctx.text(seg.type_name())
}

pub fn stripes(
    ctx: &FieldContext<'_>,
    _vg: &VolumeGroup,
    _lv: &LogicalVolume,
    seg: &LvSegment,
) -> SegResult {
    ctx.uint(seg.areas.len() as u64)
}

pub fn stripe_size(
    ctx: &FieldContext<'_>,
    _vg: &VolumeGroup,
    _lv: &LogicalVolume,
    seg: &LvSegment,
) -> SegResult {
    ctx.size(u64::from(seg.stripe_size))
}

pub fn region_size(
    ctx: &FieldContext<'_>,
    _vg: &VolumeGroup,
    _lv: &LogicalVolume,
    seg: &LvSegment,
) -> SegResult {
    ctx.size(u64::from(seg.region_size))
}

/// Snapshot chunk size, or the block size of a thin pool.
pub fn chunk_size(
    ctx: &FieldContext<'_>,
    _vg: &VolumeGroup,
    lv: &LogicalVolume,
    seg: &LvSegment,
) -> SegResult {
    let size = match &lv.snapshot {
        Some(cow) => cow.chunk_size,
        None if is_thin_pool(seg) => seg.chunk_size,
        None => 0,
    };
    ctx.size(u64::from(size))
}

pub fn thin_count(
    ctx: &FieldContext<'_>,
    vg: &VolumeGroup,
    lv: &LogicalVolume,
    seg: &LvSegment,
) -> SegResult {
    if !is_thin_pool(seg) {
        return Ok(FieldValue::empty());
    }
    ctx.uint(vg.thin_users_of(&lv.name))
}

/// Discard mode of a pool; thin volumes report their pool's setting.
pub fn discards(
    ctx: &FieldContext<'_>,
    vg: &VolumeGroup,
    _lv: &LogicalVolume,
    seg: &LvSegment,
) -> SegResult {
    let pool_seg = if seg.segtype == SegmentType::Thin {
        seg.pool_lv
            .as_deref()
            .and_then(|pool| vg.lv(pool))
            .and_then(LogicalVolume::first_segment)
    } else {
        Some(seg)
    };

    match pool_seg.filter(|seg| is_thin_pool(seg)) {
        Some(pool_seg) => ctx.text(pool_seg.discards.name()),
        None => Ok(FieldValue::empty()),
    }
}

pub fn zero(
    ctx: &FieldContext<'_>,
    _vg: &VolumeGroup,
    _lv: &LogicalVolume,
    seg: &LvSegment,
) -> SegResult {
    if !is_thin_pool(seg) {
        return Ok(FieldValue::empty());
    }
    ctx.uint(u64::from(seg.zero_new_blocks))
}

pub fn transaction_id(
    ctx: &FieldContext<'_>,
    _vg: &VolumeGroup,
    _lv: &LogicalVolume,
    seg: &LvSegment,
) -> SegResult {
    if !is_thin_pool(seg) {
        return Ok(FieldValue::empty());
    }
    ctx.uint(seg.transaction_id)
}

pub fn seg_start(
    ctx: &FieldContext<'_>,
    vg: &VolumeGroup,
    _lv: &LogicalVolume,
    seg: &LvSegment,
) -> SegResult {
    ctx.size(u64::from(seg.le) * u64::from(vg.extent_size))
}

pub fn seg_start_pe(
    ctx: &FieldContext<'_>,
    _vg: &VolumeGroup,
    _lv: &LogicalVolume,
    seg: &LvSegment,
) -> SegResult {
    ctx.uint(seg.le)
}

pub fn seg_size(
    ctx: &FieldContext<'_>,
    vg: &VolumeGroup,
    _lv: &LogicalVolume,
    seg: &LvSegment,
) -> SegResult {
    ctx.size(u64::from(seg.len) * u64::from(vg.extent_size))
}

pub fn seg_tags(
    ctx: &FieldContext<'_>,
    _vg: &VolumeGroup,
    _lv: &LogicalVolume,
    seg: &LvSegment,
) -> SegResult {
    ctx.tags(&seg.tags)
}

fn area_start(area: &SegmentArea) -> (&str, u32) {
    match area {
        SegmentArea::Pv { pv, pe } => (pv, *pe),
        SegmentArea::Lv { lv, le } => (lv, *le),
        SegmentArea::Unassigned => ("unassigned", 0),
    }
}

/// `name:first-last` per area, space separated.
pub fn seg_pe_ranges(
    ctx: &FieldContext<'_>,
    _vg: &VolumeGroup,
    _lv: &LogicalVolume,
    seg: &LvSegment,
) -> SegResult {
    let ranges: Vec<String> = seg
        .areas
        .iter()
        .map(|area| {
            let (name, start) = area_start(area);
            let last = u64::from(start) + u64::from(seg.area_len.saturating_sub(1));
            format!("{name}:{start}-{last}")
        })
        .collect();
    ctx.owned_text(ranges.join(" "))
}

/// `name(first)` per area, comma separated.
pub fn devices(
    ctx: &FieldContext<'_>,
    _vg: &VolumeGroup,
    _lv: &LogicalVolume,
    seg: &LvSegment,
) -> SegResult {
    let devices: Vec<String> = seg
        .areas
        .iter()
        .map(|area| {
            let (name, start) = area_start(area);
            format!("{name}({start})")
        })
        .collect();
    ctx.owned_text(devices.join(","))
}

/// Event monitoring state of segments dmeventd can watch.
pub fn seg_monitor(
    ctx: &FieldContext<'_>,
    vg: &VolumeGroup,
    lv: &LogicalVolume,
    seg: &LvSegment,
) -> SegResult {
    let monitorable = lv.is_cow()
        || seg.is_mirrored()
        || seg.segtype.is_raid()
        || is_thin_pool(seg);
    if !monitorable || lv.has(LvFlag::Pvmove) {
        return Ok(FieldValue::empty());
    }

    match ctx.live.segment_monitored(vg, lv, seg) {
        Some(true) => ctx.text("monitored"),
        Some(false) => ctx.text("not monitored"),
        None => Ok(FieldValue::empty()),
    }
}

pub fn pvseg_start(ctx: &FieldContext<'_>, pvseg: &PvSegment) -> SegResult {
    ctx.uint(pvseg.pe)
}

pub fn pvseg_size(ctx: &FieldContext<'_>, pvseg: &PvSegment) -> SegResult {
    ctx.uint(pvseg.len)
}
