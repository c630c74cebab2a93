// SPDX-License-Identifier: GPL-3.0-only

//! Logical volume columns.

use chrono::{Local, TimeZone};
use storage_types::{
    LogicalVolume, LvFlag, LvInfo, LvSegment, PercentReading, ReadAhead, VolumeGroup,
};
use tracing::debug;

use super::{FieldContext, InvalidPercent};
use crate::attr;
use crate::error::{ReportError, Result};
use crate::field::FieldValue;

type LvResult = Result<FieldValue>;

fn info(ctx: &FieldContext<'_>, vg: &VolumeGroup, lv: &LogicalVolume) -> Option<LvInfo> {
    ctx.live.lv_info(vg, lv, false).filter(|info| info.exists)
}

pub fn lv_uuid(ctx: &FieldContext<'_>, _vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    ctx.uuid(&lv.id)
}

pub fn lv_name(ctx: &FieldContext<'_>, vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    ctx.hidden_name(vg, lv)
}

/// Device path of a user-visible volume.
pub fn lv_path(ctx: &FieldContext<'_>, vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    if vg.name.is_empty() || lv.name.is_empty() || !vg.is_visible(lv) {
        return ctx.text("");
    }
    ctx.owned_text(format!("{}{}/{}", ctx.config.dev_dir, vg.name, lv.name))
}

pub fn lv_attr(ctx: &FieldContext<'_>, vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    ctx.owned_text(attr::lv_attr(vg, lv, ctx.live).to_string())
}

pub fn lv_active(ctx: &FieldContext<'_>, vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    let active = info(ctx, vg, lv).is_some_and(|info| info.live_table);
    ctx.text(if active { "active" } else { "" })
}

pub fn lv_major(ctx: &FieldContext<'_>, _vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    ctx.int(lv.major.unwrap_or(-1))
}

pub fn lv_minor(ctx: &FieldContext<'_>, _vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    ctx.int(lv.minor.unwrap_or(-1))
}

pub fn lv_read_ahead(ctx: &FieldContext<'_>, _vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    match lv.read_ahead {
        ReadAhead::Auto => ctx.number("auto".to_string(), u64::MAX),
        ReadAhead::Sectors(sectors) => ctx.size(u64::from(sectors)),
    }
}

pub fn lv_kernel_major(ctx: &FieldContext<'_>, vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    ctx.int(info(ctx, vg, lv).map_or(-1, |info| info.major))
}

pub fn lv_kernel_minor(ctx: &FieldContext<'_>, vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    ctx.int(info(ctx, vg, lv).map_or(-1, |info| info.minor))
}

pub fn lv_kernel_read_ahead(
    ctx: &FieldContext<'_>,
    vg: &VolumeGroup,
    lv: &LogicalVolume,
) -> LvResult {
    match ctx.live.kernel_read_ahead(vg, lv) {
        Some(sectors) => ctx.size(u64::from(sectors)),
        None => ctx.int(-1),
    }
}

pub fn lv_size(ctx: &FieldContext<'_>, _vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    ctx.size(lv.size)
}

pub fn lv_metadata_size(ctx: &FieldContext<'_>, vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    if !lv.is_thin_pool() {
        return Ok(FieldValue::empty());
    }
    let size = lv
        .first_segment()
        .and_then(|seg| seg.metadata_lv.as_deref())
        .and_then(|name| vg.lv(name))
        .map_or(0, |meta| meta.size);
    ctx.size(size)
}

pub fn seg_count(ctx: &FieldContext<'_>, _vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    ctx.uint(lv.segments.len() as u64)
}

/// Snapshot origin, or the origin or external origin of a thin volume.
pub fn origin(ctx: &FieldContext<'_>, vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    if let Some(cow) = &lv.snapshot {
        return ctx.lv_reference(vg, Some(&cow.origin));
    }

    if lv.is_thin_volume()
        && let Some(seg) = lv.first_segment()
    {
        return ctx.lv_reference(vg, seg.origin.as_deref().or(seg.external_lv.as_deref()));
    }

    Ok(FieldValue::empty())
}

pub fn origin_size(ctx: &FieldContext<'_>, vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    let size = if lv.is_cow() {
        vg.origin_of(lv).map_or(0, |origin| origin.size)
    } else if lv.is_origin() {
        lv.size
    } else {
        0
    };

    if size == 0 {
        return Ok(FieldValue::empty_sorted(0));
    }
    ctx.size(size)
}

pub fn data_percent(ctx: &FieldContext<'_>, vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    if lv.is_cow() {
        return snap_percent(ctx, vg, lv);
    }
    if lv.is_thin_pool() || lv.is_thin_volume() {
        return thin_percent(ctx, vg, lv, false);
    }
    Ok(FieldValue::empty())
}

pub fn metadata_percent(ctx: &FieldContext<'_>, vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    if lv.is_thin_pool() {
        return thin_percent(ctx, vg, lv, true);
    }
    Ok(FieldValue::empty())
}

/// Usage of a snapshot, or merge progress of a merging origin.
pub fn snap_percent(ctx: &FieldContext<'_>, vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    if !ctx.live.activation() {
        return Ok(FieldValue::empty());
    }

    let merging_origin = lv.is_merging_origin();
    if (!lv.is_cow() && !merging_origin) || info(ctx, vg, lv).is_none() {
        return Ok(FieldValue::empty_sorted(0));
    }

    let reading = ctx.live.snapshot_percent(vg, lv).unwrap_or_else(|| {
        debug!(lv = %vg.lv_display_name(lv), "snapshot percent unavailable");
        PercentReading::Invalid
    });
    ctx.percent(reading, InvalidPercent::AssumeComplete, merging_origin)
}

fn thin_percent(
    ctx: &FieldContext<'_>,
    vg: &VolumeGroup,
    lv: &LogicalVolume,
    metadata: bool,
) -> LvResult {
    let mapped = ctx.live.lv_info(vg, lv, true).is_some_and(|info| info.exists);
    if !mapped {
        return Ok(FieldValue::empty());
    }

    let reading = if lv.is_thin_pool() {
        ctx.live.thin_pool_percent(vg, lv, metadata)
    } else {
        ctx.live.thin_percent(vg, lv)
    };

    let Some(reading) = reading else {
        return Err(ReportError::LiveQuery {
            volume: vg.lv_display_name(lv).into_owned(),
            reason: if metadata {
                "thin pool metadata usage unavailable".to_string()
            } else {
                "thin data usage unavailable".to_string()
            },
        });
    };
    ctx.percent(reading, InvalidPercent::AssumeComplete, false)
}

/// Resync progress of a RAID or mirror, or the copy progress of a pvmove.
pub fn copy_percent(ctx: &FieldContext<'_>, vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    let reading = if lv.has(LvFlag::Raid) {
        ctx.live.raid_percent(vg, lv)
    } else if lv.has(LvFlag::Pvmove) || lv.has(LvFlag::Mirrored) {
        ctx.live.mirror_percent(vg, lv)
    } else {
        None
    };

    match reading {
        Some(reading) => ctx.percent(reading, InvalidPercent::Suppress, false),
        None => Ok(FieldValue::empty_sorted(0)),
    }
}

pub fn raid_sync_action(ctx: &FieldContext<'_>, vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    if !lv.has(LvFlag::Raid) {
        return Ok(FieldValue::empty());
    }
    match ctx.live.raid_sync_action(vg, lv) {
        Some(action) => ctx.owned_text(action),
        None => Ok(FieldValue::empty()),
    }
}

pub fn raid_mismatch_count(
    ctx: &FieldContext<'_>,
    vg: &VolumeGroup,
    lv: &LogicalVolume,
) -> LvResult {
    if !lv.has(LvFlag::Raid) {
        return Ok(FieldValue::empty());
    }
    match ctx.live.raid_mismatch_count(vg, lv) {
        Some(count) => ctx.uint(count),
        None => Ok(FieldValue::empty()),
    }
}

/// First-segment RAID tunable; unset (zero) values are suppressed.
fn raid_setting(
    ctx: &FieldContext<'_>,
    lv: &LogicalVolume,
    value: fn(&LvSegment) -> u32,
) -> LvResult {
    match lv.first_segment().map(value) {
        Some(value) if lv.is_raid_type() && value != 0 => ctx.uint(value),
        _ => Ok(FieldValue::empty()),
    }
}

pub fn raid_write_behind(
    ctx: &FieldContext<'_>,
    _vg: &VolumeGroup,
    lv: &LogicalVolume,
) -> LvResult {
    raid_setting(ctx, lv, |seg| seg.writebehind)
}

pub fn raid_min_recovery_rate(
    ctx: &FieldContext<'_>,
    _vg: &VolumeGroup,
    lv: &LogicalVolume,
) -> LvResult {
    raid_setting(ctx, lv, |seg| seg.min_recovery_rate)
}

pub fn raid_max_recovery_rate(
    ctx: &FieldContext<'_>,
    _vg: &VolumeGroup,
    lv: &LogicalVolume,
) -> LvResult {
    raid_setting(ctx, lv, |seg| seg.max_recovery_rate)
}

/// Source device of the first pvmove segment.
pub fn move_pv(ctx: &FieldContext<'_>, _vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    let source = lv
        .segments
        .iter()
        .find(|seg| seg.pvmove)
        .and_then(|seg| seg.area_pv(0));
    ctx.maybe_text(source)
}

/// Volume a mirror is being converted from.
pub fn convert_lv(ctx: &FieldContext<'_>, vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    if !lv.has(LvFlag::Converting) || !lv.has(LvFlag::Mirrored) {
        return Ok(FieldValue::empty());
    }
    let source = lv
        .first_segment()
        .filter(|seg| seg.is_mirrored())
        .and_then(|seg| seg.area_lv(0));
    ctx.lv_reference(vg, source)
}

pub fn mirror_log(ctx: &FieldContext<'_>, vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    let log = lv.segments.iter().find_map(|seg| seg.log_lv.as_deref());
    ctx.lv_reference(vg, log)
}

pub fn data_lv(ctx: &FieldContext<'_>, vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    if !lv.is_thin_pool() {
        return Ok(FieldValue::empty());
    }
    ctx.lv_reference(vg, lv.first_segment().and_then(|seg| seg.area_lv(0)))
}

pub fn metadata_lv(ctx: &FieldContext<'_>, vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    if !lv.is_thin_pool() {
        return Ok(FieldValue::empty());
    }
    ctx.lv_reference(vg, lv.first_segment().and_then(|seg| seg.metadata_lv.as_deref()))
}

pub fn pool_lv(ctx: &FieldContext<'_>, vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    if !lv.is_thin_volume() {
        return Ok(FieldValue::empty());
    }
    ctx.lv_reference(vg, lv.thin_segment().and_then(|seg| seg.pool_lv.as_deref()))
}

pub fn lv_tags(ctx: &FieldContext<'_>, _vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    ctx.tags(&lv.tags)
}

pub fn lv_profile(ctx: &FieldContext<'_>, _vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    ctx.maybe_text(lv.profile.as_deref())
}

/// Creation time in local time, ordered by the raw timestamp.
pub fn lv_time(ctx: &FieldContext<'_>, _vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    let display = match lv.timestamp {
        0 => String::new(),
        seconds => Local
            .timestamp_opt(seconds, 0)
            .single()
            .map(|time| time.format("%Y-%m-%d %H:%M:%S %z").to_string())
            .unwrap_or_default(),
    };
    ctx.number(display, lv.timestamp as u64)
}

pub fn lv_host(ctx: &FieldContext<'_>, _vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    let host = lv.host.as_deref().unwrap_or_default();
    ctx.text_sorted(host.to_string(), host)
}

pub fn modules(ctx: &FieldContext<'_>, _vg: &VolumeGroup, lv: &LogicalVolume) -> LvResult {
    ctx.owned_text(lv.modules().join(","))
}

#[cfg(test)]
mod tests {
    use storage_types::{
        CowLink, LiveVolume, NoActivation, SegmentArea, SegmentType, StaticLiveState,
    };

    use super::*;
    use crate::field::{SortKey, SortType};
    use crate::format::testing::Harness;

    fn lv(name: &str) -> LogicalVolume {
        LogicalVolume {
            name: name.to_string(),
            status: LvFlag::Read | LvFlag::Write | LvFlag::Visible,
            size: 8192,
            ..Default::default()
        }
    }

    fn group(lvs: Vec<LogicalVolume>) -> VolumeGroup {
        VolumeGroup {
            name: "vg0".to_string(),
            extent_size: 8192,
            lvs,
            ..Default::default()
        }
    }

    fn mapped() -> LvInfo {
        LvInfo {
            exists: true,
            live_table: true,
            major: 253,
            minor: 4,
            ..Default::default()
        }
    }

    fn snapshot_group() -> VolumeGroup {
        let origin = LogicalVolume {
            origin_count: 1,
            size: 20480,
            ..lv("data")
        };
        let snap = LogicalVolume {
            snapshot: Some(CowLink {
                origin: "data".to_string(),
                chunk_size: 8,
                merging: false,
            }),
            ..lv("snap")
        };
        group(vec![origin, snap])
    }

    fn thin_group() -> VolumeGroup {
        let pool = LogicalVolume {
            status: LvFlag::ThinPool | LvFlag::Visible,
            segments: vec![LvSegment {
                segtype: SegmentType::ThinPool,
                areas: vec![SegmentArea::Lv { lv: "pool_tdata".to_string(), le: 0 }],
                metadata_lv: Some("pool_tmeta".to_string()),
                ..Default::default()
            }],
            ..lv("pool")
        };
        let data = LogicalVolume {
            status: LvFlag::ThinPoolData.into(),
            ..lv("pool_tdata")
        };
        let meta = LogicalVolume {
            status: LvFlag::ThinPoolMetadata.into(),
            size: 2048,
            ..lv("pool_tmeta")
        };
        let thin = LogicalVolume {
            status: LvFlag::ThinVolume | LvFlag::Visible,
            segments: vec![LvSegment {
                segtype: SegmentType::Thin,
                pool_lv: Some("pool".to_string()),
                ..Default::default()
            }],
            ..lv("thin1")
        };
        group(vec![pool, data, meta, thin])
    }

    #[test]
    fn auto_read_ahead_sorts_as_maximum() {
        let harness = Harness::new();
        let root = lv("root");
        let vg = group(vec![root.clone()]);

        let auto = lv_read_ahead(&harness.offline(), &vg, &root).expect("read ahead");
        assert_eq!(auto.display(), "auto");
        assert_eq!(auto.sort_key(SortType::Number), SortKey::Number(u64::MAX));

        let fixed = LogicalVolume {
            read_ahead: ReadAhead::Sectors(256),
            ..root
        };
        let value = lv_read_ahead(&harness.offline(), &vg, &fixed).expect("read ahead");
        assert_eq!(value.display(), "128.00k");
        assert_eq!(value.sort_key(SortType::Number), SortKey::Number(256));
    }

    #[test]
    fn kernel_numbers_fall_back_to_minus_one() {
        let harness = Harness::new();
        let root = lv("root");
        let vg = group(vec![root.clone()]);

        let offline = harness.offline();
        assert_eq!(lv_kernel_major(&offline, &vg, &root).expect("kmaj").display(), "-1");
        assert_eq!(lv_kernel_read_ahead(&offline, &vg, &root).expect("kra").display(), "-1");

        let mut live = StaticLiveState::default();
        live.insert("vg0", "root", LiveVolume { info: Some(mapped()), ..Default::default() });
        let ctx = harness.ctx(&live);
        assert_eq!(lv_kernel_major(&ctx, &vg, &root).expect("kmaj").display(), "253");
        assert_eq!(lv_kernel_minor(&ctx, &vg, &root).expect("kmin").display(), "4");
        assert_eq!(lv_active(&ctx, &vg, &root).expect("active").display(), "active");
    }

    #[test]
    fn snapshot_percent_rules() {
        let harness = Harness::new();
        let vg = snapshot_group();
        let (origin, snap) = (&vg.lvs[0], &vg.lvs[1]);

        // Without activation support the column is empty with no sort sentinel.
        let offline = snap_percent(&harness.offline(), &vg, snap).expect("snap%");
        assert_eq!(offline, FieldValue::empty());

        let mut live = StaticLiveState::default();
        let inactive = snap_percent(&harness.ctx(&live), &vg, snap).expect("snap%");
        assert_eq!(inactive, FieldValue::empty_sorted(0));

        live.insert(
            "vg0",
            "snap",
            LiveVolume {
                info: Some(mapped()),
                snapshot_percent: Some(PercentReading::Value(12.25)),
                ..Default::default()
            },
        );
        let ctx = harness.ctx(&live);
        let value = snap_percent(&ctx, &vg, snap).expect("snap%");
        assert_eq!(value, FieldValue::number("12.25".to_string(), 12250));
        assert_eq!(data_percent(&ctx, &vg, snap).expect("data%"), value);

        // Plain origins carry no percentage.
        assert_eq!(snap_percent(&ctx, &vg, origin).expect("snap%"), FieldValue::empty_sorted(0));
    }

    #[test]
    fn merging_origin_with_invalid_percent_is_suppressed() {
        let harness = Harness::new();
        let mut vg = snapshot_group();
        vg.lvs[0].merging_snapshot = Some("snap".to_string());
        let mut live = StaticLiveState::default();
        for name in ["data", "snap"] {
            live.insert(
                "vg0",
                name,
                LiveVolume {
                    info: Some(mapped()),
                    snapshot_percent: Some(PercentReading::MergeFailed),
                    ..Default::default()
                },
            );
        }
        let ctx = harness.ctx(&live);

        assert_eq!(
            snap_percent(&ctx, &vg, &vg.lvs[0]).expect("snap%"),
            FieldValue::empty_sorted(0)
        );

        let snap = snap_percent(&ctx, &vg, &vg.lvs[1]).expect("snap%");
        assert_eq!(snap.display(), "100.00");
        assert_eq!(snap.sort_key(SortType::Number), SortKey::Number(100_000));
    }

    #[test]
    fn origin_and_origin_size() {
        let harness = Harness::new();
        let ctx = harness.offline();
        let vg = snapshot_group();

        assert_eq!(origin(&ctx, &vg, &vg.lvs[1]).expect("origin").display(), "data");
        assert!(origin(&ctx, &vg, &vg.lvs[0]).expect("origin").is_suppressed());
        assert_eq!(origin_size(&ctx, &vg, &vg.lvs[1]).expect("osize").display(), "10.00m");
        assert_eq!(origin_size(&ctx, &vg, &vg.lvs[0]).expect("osize").display(), "10.00m");

        let plain = lv("plain");
        assert_eq!(origin_size(&ctx, &vg, &plain).expect("osize"), FieldValue::empty_sorted(0));
    }

    #[test]
    fn thin_pool_references_use_hidden_names() {
        let harness = Harness::new();
        let ctx = harness.offline();
        let vg = thin_group();
        let pool = &vg.lvs[0];

        let data = data_lv(&ctx, &vg, pool).expect("data_lv");
        assert_eq!(data.display(), "[pool_tdata]");
        assert_eq!(data.sort_key(SortType::String), SortKey::Text("pool_tdata"));
        assert_eq!(metadata_lv(&ctx, &vg, pool).expect("meta").display(), "[pool_tmeta]");
        assert_eq!(lv_metadata_size(&ctx, &vg, pool).expect("msize").display(), "1.00m");
        assert_eq!(pool_lv(&ctx, &vg, &vg.lvs[3]).expect("pool").display(), "pool");
        assert!(pool_lv(&ctx, &vg, pool).expect("pool").is_suppressed());
        assert_eq!(lv_path(&ctx, &vg, &vg.lvs[1]).expect("path").display(), "");
        assert_eq!(lv_path(&ctx, &vg, pool).expect("path").display(), "/dev/vg0/pool");
    }

    #[test]
    fn thin_percent_needs_a_mapped_device_and_a_reading() {
        let harness = Harness::new();
        let vg = thin_group();
        let pool = &vg.lvs[0];

        assert_eq!(
            data_percent(&harness.offline(), &vg, pool).expect("data%"),
            FieldValue::empty()
        );

        let mut live = StaticLiveState::default();
        live.insert(
            "vg0",
            "pool",
            LiveVolume {
                info: Some(mapped()),
                data_percent: Some(PercentReading::Value(50.0)),
                metadata_percent: Some(PercentReading::Invalid),
                ..Default::default()
            },
        );
        live.insert("vg0", "thin1", LiveVolume { info: Some(mapped()), ..Default::default() });
        let ctx = harness.ctx(&live);

        assert_eq!(data_percent(&ctx, &vg, pool).expect("data%").display(), "50.00");
        assert_eq!(metadata_percent(&ctx, &vg, pool).expect("meta%").display(), "100.00");
        assert!(matches!(
            data_percent(&ctx, &vg, &vg.lvs[3]),
            Err(ReportError::LiveQuery { .. })
        ));
    }

    #[test]
    fn copy_percent_suppresses_invalid_and_unknown() {
        let harness = Harness::new();
        let mirror = LogicalVolume {
            status: lv("m").status | LvFlag::Mirrored,
            ..lv("m")
        };
        let vg = group(vec![mirror.clone()]);

        assert_eq!(
            copy_percent(&harness.ctx(&NoActivation), &vg, &mirror).expect("cpy%"),
            FieldValue::empty_sorted(0)
        );

        let mut live = StaticLiveState::default();
        live.insert(
            "vg0",
            "m",
            LiveVolume { mirror_percent: Some(PercentReading::Invalid), ..Default::default() },
        );
        assert_eq!(
            copy_percent(&harness.ctx(&live), &vg, &mirror).expect("cpy%"),
            FieldValue::empty_sorted(0)
        );

        live.insert(
            "vg0",
            "m",
            LiveVolume { mirror_percent: Some(PercentReading::Value(100.0)), ..Default::default() },
        );
        assert_eq!(
            copy_percent(&harness.ctx(&live), &vg, &mirror).expect("cpy%").display(),
            "100.00"
        );
    }

    #[test]
    fn raid_settings_only_show_when_set() {
        let harness = Harness::new();
        let ctx = harness.offline();
        let raid = LogicalVolume {
            status: LvFlag::Raid | LvFlag::Visible,
            segments: vec![LvSegment {
                segtype: SegmentType::Raid1,
                writebehind: 0,
                max_recovery_rate: 128,
                ..Default::default()
            }],
            ..lv("r")
        };
        let vg = group(vec![raid.clone()]);

        assert!(raid_write_behind(&ctx, &vg, &raid).expect("wb").is_suppressed());
        assert_eq!(raid_max_recovery_rate(&ctx, &vg, &raid).expect("max").display(), "128");
        assert!(raid_sync_action(&ctx, &vg, &raid).expect("action").is_suppressed());
        assert!(raid_max_recovery_rate(&ctx, &vg, &lv("plain")).expect("max").is_suppressed());
    }

    #[test]
    fn move_and_log_references() {
        let harness = Harness::new();
        let ctx = harness.offline();
        let moving = LogicalVolume {
            status: LvFlag::Pvmove.into(),
            segments: vec![
                LvSegment::default(),
                LvSegment {
                    pvmove: true,
                    areas: vec![SegmentArea::Pv { pv: "/dev/sdb".to_string(), pe: 0 }],
                    ..Default::default()
                },
            ],
            ..lv("pvmove0")
        };
        let mirrored = LogicalVolume {
            segments: vec![LvSegment {
                segtype: SegmentType::Mirror,
                log_lv: Some("m_mlog".to_string()),
                ..Default::default()
            }],
            ..lv("m")
        };
        let log = LogicalVolume {
            status: LvFlag::MirrorLog.into(),
            ..lv("m_mlog")
        };
        let vg = group(vec![moving.clone(), mirrored.clone(), log]);

        assert_eq!(move_pv(&ctx, &vg, &moving).expect("move").display(), "/dev/sdb");
        assert!(move_pv(&ctx, &vg, &mirrored).expect("move").is_suppressed());
        assert_eq!(mirror_log(&ctx, &vg, &mirrored).expect("log").display(), "[m_mlog]");
        assert!(convert_lv(&ctx, &vg, &mirrored).expect("convert").is_suppressed());
    }

    #[test]
    fn time_host_and_modules() {
        let harness = Harness::new();
        let ctx = harness.offline();
        let mut root = lv("root");
        let vg = group(vec![root.clone()]);

        let unknown = lv_time(&ctx, &vg, &root).expect("time");
        assert_eq!(unknown.display(), "");

        root.timestamp = 1_700_000_000;
        root.host = Some("node1".to_string());
        let time = lv_time(&ctx, &vg, &root).expect("time");
        assert_eq!(time.display().len(), "2023-11-14 22:13:20 +0000".len());
        assert_eq!(time.sort_key(SortType::Number), SortKey::Number(1_700_000_000));
        assert_eq!(
            lv_host(&ctx, &vg, &root).expect("host").sort_key(SortType::String),
            SortKey::Text("node1")
        );

        root.snapshot = Some(CowLink { origin: "x".to_string(), chunk_size: 8, merging: false });
        assert_eq!(modules(&ctx, &vg, &root).expect("modules").display(), "snapshot");
    }

    #[test]
    fn formatting_is_deterministic() {
        let harness = Harness::new();
        let vg = snapshot_group();
        let mut live = StaticLiveState::default();
        live.insert(
            "vg0",
            "snap",
            LiveVolume {
                info: Some(mapped()),
                snapshot_percent: Some(PercentReading::Value(3.14159)),
                ..Default::default()
            },
        );
        let ctx = harness.ctx(&live);

        for formatter in [lv_attr, lv_name, snap_percent, origin_size, lv_size] {
            let first = formatter(&ctx, &vg, &vg.lvs[1]).expect("first");
            let second = formatter(&ctx, &vg, &vg.lvs[1]).expect("second");
            assert_eq!(first, second);
        }
    }
}
