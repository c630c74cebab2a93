// SPDX-License-Identifier: GPL-3.0-only

//! Shared fixtures: one volume group with a plain volume, an origin and its
//! snapshot, a thin pool with one thin volume, plus an orphan PV.

#![allow(dead_code)]

use enumflags2::BitFlags;
use storage_report::{Report, ReportConfig, ReportType};
use storage_types::{
    AllocPolicy, CowLink, LiveVolume, LogicalVolume, LvFlag, LvInfo, LvSegment, MetadataArea,
    MetadataSnapshot, PercentReading, PhysicalVolume, PvFlag, PvSegment, SegmentArea, SegmentType,
    StaticLiveState, VgFlag, VolumeGroup,
};

/// Sectors per 4 MiB extent.
pub const EXTENT: u32 = 8192;

pub const VG_ID: &str = "Vg0aaaBBBBccccDDDDeeeeFFFFgggggg";

pub fn rw() -> BitFlags<LvFlag> {
    LvFlag::Read | LvFlag::Write | LvFlag::Visible
}

pub fn volume(name: &str, status: BitFlags<LvFlag>, extents: u32) -> LogicalVolume {
    LogicalVolume {
        name: name.to_string(),
        status,
        size: u64::from(extents) * u64::from(EXTENT),
        le_count: extents,
        ..Default::default()
    }
}

pub fn linear(pv: &str, pe: u32, len: u32) -> LvSegment {
    LvSegment {
        segtype: SegmentType::Striped,
        len,
        area_len: len,
        areas: vec![SegmentArea::Pv {
            pv: pv.to_string(),
            pe,
        }],
        ..Default::default()
    }
}

fn pv(name: &str, pe_count: u32, pe_alloc_count: u32, segments: Vec<PvSegment>) -> PhysicalVolume {
    PhysicalVolume {
        name: name.to_string(),
        format: Some("lvm2".to_string()),
        status: PvFlag::Allocatable.into(),
        size: u64::from(pe_count) * u64::from(EXTENT) + 2048,
        dev_size: u64::from(pe_count) * u64::from(EXTENT) + 2048,
        pe_start: 2048,
        pe_size: EXTENT,
        pe_count,
        pe_alloc_count,
        mdas: vec![MetadataArea {
            size: 2040,
            free: 1000,
            ignored: false,
        }],
        segments,
        ..Default::default()
    }
}

fn pvseg(pe: u32, len: u32, lv: Option<&str>) -> PvSegment {
    PvSegment {
        pe,
        len,
        lv: lv.map(str::to_string),
    }
}

pub fn group() -> VolumeGroup {
    let root = LogicalVolume {
        segments: vec![linear("/dev/sda2", 0, 1000)],
        ..volume("root", rw(), 1000)
    };

    let home = LogicalVolume {
        origin_count: 1,
        segments: vec![linear("/dev/sda2", 1000, 200)],
        ..volume("home", rw(), 200)
    };

    let home_snap = LogicalVolume {
        snapshot: Some(CowLink {
            origin: "home".to_string(),
            chunk_size: 8,
            merging: false,
        }),
        segments: vec![LvSegment {
            segtype: SegmentType::Snapshot,
            ..linear("/dev/sdb", 0, 50)
        }],
        ..volume("home_snap", LvFlag::Read | LvFlag::Write, 50)
    };

    let pool = LogicalVolume {
        segments: vec![LvSegment {
            segtype: SegmentType::ThinPool,
            len: 100,
            area_len: 100,
            chunk_size: 128,
            transaction_id: 3,
            zero_new_blocks: true,
            metadata_lv: Some("pool_tmeta".to_string()),
            areas: vec![SegmentArea::Lv {
                lv: "pool_tdata".to_string(),
                le: 0,
            }],
            ..Default::default()
        }],
        ..volume("pool", rw() | LvFlag::ThinPool, 100)
    };

    let pool_tdata = LogicalVolume {
        segments: vec![linear("/dev/sdb", 50, 100)],
        ..volume("pool_tdata", LvFlag::Read | LvFlag::Write | LvFlag::ThinPoolData, 100)
    };

    let pool_tmeta = LogicalVolume {
        segments: vec![linear("/dev/sdb", 150, 1)],
        ..volume("pool_tmeta", LvFlag::Read | LvFlag::Write | LvFlag::ThinPoolMetadata, 1)
    };

    let thin1 = LogicalVolume {
        segments: vec![LvSegment {
            segtype: SegmentType::Thin,
            len: 256,
            pool_lv: Some("pool".to_string()),
            ..Default::default()
        }],
        ..volume("thin1", rw() | LvFlag::ThinVolume, 256)
    };

    let lvol0 = LogicalVolume {
        segments: vec![linear("/dev/sdb", 151, 1)],
        ..volume("lvol0", LvFlag::Read | LvFlag::Write, 1)
    };

    let sda2 = pv(
        "/dev/sda2",
        1280,
        1200,
        vec![
            pvseg(0, 1000, Some("root")),
            pvseg(1000, 200, Some("home")),
            pvseg(1200, 80, None),
        ],
    );
    let sdb = pv(
        "/dev/sdb",
        1279,
        152,
        vec![
            pvseg(0, 50, Some("home_snap")),
            pvseg(50, 100, Some("pool_tdata")),
            pvseg(150, 1, Some("pool_tmeta")),
            pvseg(151, 1, Some("lvol0")),
            pvseg(152, 1127, None),
        ],
    );

    VolumeGroup {
        name: "vg0".to_string(),
        id: VG_ID.to_string(),
        format: Some("lvm2".to_string()),
        status: VgFlag::Read | VgFlag::Write | VgFlag::Resizeable,
        extent_size: EXTENT,
        extent_count: 2559,
        free_count: 255,
        seqno: 12,
        alloc: AllocPolicy::Normal,
        pvs: vec![sda2, sdb],
        lvs: vec![root, home, home_snap, pool, pool_tdata, pool_tmeta, thin1, lvol0],
        ..Default::default()
    }
}

pub fn orphan() -> PhysicalVolume {
    PhysicalVolume {
        name: "/dev/sdc".to_string(),
        format: Some("lvm2".to_string()),
        size: 2 * 1024 * 1024,
        dev_size: 2 * 1024 * 1024,
        ..Default::default()
    }
}

pub fn snapshot() -> MetadataSnapshot {
    MetadataSnapshot {
        vgs: vec![group()],
        orphans: vec![orphan()],
    }
}

pub fn active(open_count: u32) -> LvInfo {
    LvInfo {
        exists: true,
        live_table: true,
        open_count,
        major: 253,
        ..Default::default()
    }
}

/// Kernel state with every visible volume active and `root` open.
pub fn live() -> StaticLiveState {
    let mut live = StaticLiveState::default();
    live.insert("vg0", "root", LiveVolume {
        info: Some(active(1)),
        ..Default::default()
    });
    live.insert("vg0", "home", LiveVolume {
        info: Some(active(0)),
        ..Default::default()
    });
    live.insert("vg0", "home_snap", LiveVolume {
        info: Some(active(0)),
        snapshot_percent: Some(PercentReading::Value(12.5)),
        ..Default::default()
    });
    live.insert("vg0", "pool", LiveVolume {
        info: Some(active(0)),
        layer_info: Some(active(1)),
        data_percent: Some(PercentReading::Value(40.0)),
        metadata_percent: Some(PercentReading::Value(4.5)),
        ..Default::default()
    });
    live.insert("vg0", "thin1", LiveVolume {
        info: Some(active(0)),
        thin_percent: Some(PercentReading::Value(75.0)),
        ..Default::default()
    });
    live
}

/// Settings producing comma-separated, unpadded lines.
pub fn plain_config() -> ReportConfig {
    ReportConfig {
        aligned: false,
        separator: ",".to_string(),
        ..Default::default()
    }
}

/// Run a report over the fixture snapshot and return its lines.
pub fn run(
    report_type: ReportType,
    options: Option<&str>,
    sort: Option<&str>,
    config: &ReportConfig,
) -> Vec<String> {
    let snapshot = snapshot();
    let live = live();
    let mut report = Report::new(report_type, options, sort, config, &live, Vec::new())
        .expect("report should build");
    report.add_snapshot(&snapshot).expect("rows should format");
    let out = report.render().expect("report should render");
    String::from_utf8(out)
        .expect("utf8 output")
        .lines()
        .map(str::to_string)
        .collect()
}
