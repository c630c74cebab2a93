// SPDX-License-Identifier: GPL-3.0-only

//! Live (kernel) state of activated volumes
//!
//! The metadata model describes what a volume should look like; these types
//! describe what device-mapper currently has. Every query can come back empty:
//! the device may not be active, the tooling may be missing, or the target may
//! report a status that cannot be parsed. Callers treat `None` as "unavailable".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::lvm::{LogicalVolume, LvSegment, VolumeGroup};

/// Device-mapper view of one volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LvInfo {
    /// A device node exists for the volume
    pub exists: bool,
    pub suspended: bool,
    pub live_table: bool,
    pub inactive_table: bool,
    pub read_only: bool,
    pub open_count: u32,
    pub major: i32,
    pub minor: i32,
}

/// Progress or usage reported by a target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentReading {
    /// Percentage in the range 0.0..=100.0
    Value(f64),
    Invalid,
    MergeFailed,
}

impl PercentReading {
    pub fn is_complete(self) -> bool {
        matches!(self, PercentReading::Value(value) if value >= 100.0)
    }
}

/// Queries against the running kernel.
///
/// Only `lv_info` is mandatory; the remaining queries default to "unavailable".
pub trait LiveState {
    /// Whether activation support is usable at all.
    fn activation(&self) -> bool {
        true
    }

    /// Device information. `with_layer` asks for the hidden layer device
    /// (e.g. the `-tpool` device of a thin pool) instead of the top device.
    fn lv_info(&self, vg: &VolumeGroup, lv: &LogicalVolume, with_layer: bool) -> Option<LvInfo>;

    fn snapshot_percent(&self, _vg: &VolumeGroup, _lv: &LogicalVolume) -> Option<PercentReading> {
        None
    }

    fn mirror_percent(&self, _vg: &VolumeGroup, _lv: &LogicalVolume) -> Option<PercentReading> {
        None
    }

    fn raid_percent(&self, _vg: &VolumeGroup, _lv: &LogicalVolume) -> Option<PercentReading> {
        None
    }

    /// Data (or metadata, when `metadata` is set) usage of a thin pool.
    fn thin_pool_percent(
        &self,
        _vg: &VolumeGroup,
        _lv: &LogicalVolume,
        _metadata: bool,
    ) -> Option<PercentReading> {
        None
    }

    fn thin_percent(&self, _vg: &VolumeGroup, _lv: &LogicalVolume) -> Option<PercentReading> {
        None
    }

    fn raid_sync_action(&self, _vg: &VolumeGroup, _lv: &LogicalVolume) -> Option<String> {
        None
    }

    fn raid_mismatch_count(&self, _vg: &VolumeGroup, _lv: &LogicalVolume) -> Option<u64> {
        None
    }

    /// Read-ahead in sectors as set on the kernel device.
    fn kernel_read_ahead(&self, _vg: &VolumeGroup, _lv: &LogicalVolume) -> Option<u32> {
        None
    }

    /// Whether the event daemon is monitoring the segment.
    fn segment_monitored(
        &self,
        _vg: &VolumeGroup,
        _lv: &LogicalVolume,
        _seg: &LvSegment,
    ) -> Option<bool> {
        None
    }
}

/// Live state for a process running without device-mapper access.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoActivation;

impl LiveState for NoActivation {
    fn activation(&self) -> bool {
        false
    }

    fn lv_info(&self, _vg: &VolumeGroup, _lv: &LogicalVolume, _with_layer: bool) -> Option<LvInfo> {
        None
    }
}

/// Recorded live state of one volume.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveVolume {
    pub info: Option<LvInfo>,

    /// Layer device info; `info` is used when absent
    pub layer_info: Option<LvInfo>,

    pub snapshot_percent: Option<PercentReading>,
    pub mirror_percent: Option<PercentReading>,
    pub raid_percent: Option<PercentReading>,
    pub data_percent: Option<PercentReading>,
    pub metadata_percent: Option<PercentReading>,
    pub thin_percent: Option<PercentReading>,
    pub sync_action: Option<String>,
    pub mismatch_count: Option<u64>,
    pub read_ahead: Option<u32>,
    pub monitored: Option<bool>,
}

/// Live state served from a table keyed by `vg/lv`.
///
/// Used for captured snapshots and in tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticLiveState {
    pub activation: bool,
    pub volumes: BTreeMap<String, LiveVolume>,
}

impl Default for StaticLiveState {
    fn default() -> Self {
        Self {
            activation: true,
            volumes: BTreeMap::new(),
        }
    }
}

impl StaticLiveState {
    pub fn key(vg: &VolumeGroup, lv: &LogicalVolume) -> String {
        format!("{}/{}", vg.name, lv.name)
    }

    pub fn insert(&mut self, vg: &str, lv: &str, volume: LiveVolume) {
        self.volumes.insert(format!("{vg}/{lv}"), volume);
    }

    fn volume(&self, vg: &VolumeGroup, lv: &LogicalVolume) -> Option<&LiveVolume> {
        self.volumes.get(&Self::key(vg, lv))
    }
}

impl LiveState for StaticLiveState {
    fn activation(&self) -> bool {
        self.activation
    }

    fn lv_info(&self, vg: &VolumeGroup, lv: &LogicalVolume, with_layer: bool) -> Option<LvInfo> {
        let volume = self.volume(vg, lv)?;
        if with_layer {
            volume.layer_info.or(volume.info)
        } else {
            volume.info
        }
    }

    fn snapshot_percent(&self, vg: &VolumeGroup, lv: &LogicalVolume) -> Option<PercentReading> {
        self.volume(vg, lv)?.snapshot_percent
    }

    fn mirror_percent(&self, vg: &VolumeGroup, lv: &LogicalVolume) -> Option<PercentReading> {
        self.volume(vg, lv)?.mirror_percent
    }

    fn raid_percent(&self, vg: &VolumeGroup, lv: &LogicalVolume) -> Option<PercentReading> {
        self.volume(vg, lv)?.raid_percent
    }

    fn thin_pool_percent(
        &self,
        vg: &VolumeGroup,
        lv: &LogicalVolume,
        metadata: bool,
    ) -> Option<PercentReading> {
        let volume = self.volume(vg, lv)?;
        if metadata {
            volume.metadata_percent
        } else {
            volume.data_percent
        }
    }

    fn thin_percent(&self, vg: &VolumeGroup, lv: &LogicalVolume) -> Option<PercentReading> {
        self.volume(vg, lv)?.thin_percent
    }

    fn raid_sync_action(&self, vg: &VolumeGroup, lv: &LogicalVolume) -> Option<String> {
        self.volume(vg, lv)?.sync_action.clone()
    }

    fn raid_mismatch_count(&self, vg: &VolumeGroup, lv: &LogicalVolume) -> Option<u64> {
        self.volume(vg, lv)?.mismatch_count
    }

    fn kernel_read_ahead(&self, vg: &VolumeGroup, lv: &LogicalVolume) -> Option<u32> {
        self.volume(vg, lv)?.read_ahead
    }

    fn segment_monitored(
        &self,
        vg: &VolumeGroup,
        lv: &LogicalVolume,
        _seg: &LvSegment,
    ) -> Option<bool> {
        self.volume(vg, lv)?.monitored
    }
}
