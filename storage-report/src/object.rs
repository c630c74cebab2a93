// SPDX-License-Identifier: GPL-3.0-only

//! Report rows and the objects each column reads from.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use storage_types::{LogicalVolume, LvSegment, PhysicalVolume, PvSegment, SegmentArea, VolumeGroup};

/// Kind of object a column is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Vg,
    Lv,
    Pv,
    /// Label fields are read from the PV itself
    Label,
    Seg,
    PvSeg,
}

impl ObjectKind {
    pub fn name(self) -> &'static str {
        match self {
            ObjectKind::Vg => "Volume Group",
            ObjectKind::Lv => "Logical Volume",
            ObjectKind::Pv => "Physical Volume",
            ObjectKind::Label => "Physical Volume Label",
            ObjectKind::Seg => "Logical Volume Segment",
            ObjectKind::PvSeg => "Physical Volume Segment",
        }
    }

    /// Prefix that may be left off column ids of this kind.
    pub fn id_prefix(self) -> &'static str {
        match self {
            ObjectKind::Vg => "vg_",
            ObjectKind::Lv => "lv_",
            ObjectKind::Pv | ObjectKind::Label => "pv_",
            ObjectKind::Seg => "seg_",
            ObjectKind::PvSeg => "pvseg_",
        }
    }
}

/// Object resolved out of a row for one [`ObjectKind`].
#[derive(Debug, Clone, Copy)]
pub enum ObjectRef<'r> {
    Vg(&'r VolumeGroup),
    Lv(&'r LogicalVolume),
    Pv(&'r PhysicalVolume),
    Seg(&'r LvSegment),
    PvSeg(&'r PvSegment),
}

/// One report row: the group it belongs to plus at most one object of each
/// other kind.
///
/// The group is always present. Rows for PVs outside any group carry an
/// owned orphan group with the PV's format, built for that row only.
#[derive(Debug, Clone)]
pub struct ReportObject<'a> {
    vg: Cow<'a, VolumeGroup>,
    lv: Option<Cow<'a, LogicalVolume>>,
    pv: Option<&'a PhysicalVolume>,
    seg: Option<&'a LvSegment>,
    pvseg: Option<&'a PvSegment>,
}

impl<'a> ReportObject<'a> {
    fn group(vg: Option<&'a VolumeGroup>, pv: Option<&PhysicalVolume>) -> Cow<'a, VolumeGroup> {
        match vg {
            Some(vg) => Cow::Borrowed(vg),
            None => Cow::Owned(VolumeGroup::orphan(pv.and_then(|pv| pv.format.as_deref()))),
        }
    }

    pub fn vg(vg: &'a VolumeGroup) -> Self {
        Self {
            vg: Cow::Borrowed(vg),
            lv: None,
            pv: None,
            seg: None,
            pvseg: None,
        }
    }

    pub fn lv(vg: &'a VolumeGroup, lv: &'a LogicalVolume) -> Self {
        Self {
            lv: Some(Cow::Borrowed(lv)),
            ..Self::vg(vg)
        }
    }

    pub fn seg(vg: &'a VolumeGroup, lv: &'a LogicalVolume, seg: &'a LvSegment) -> Self {
        Self {
            seg: Some(seg),
            ..Self::lv(vg, lv)
        }
    }

    /// Row for a PV; `vg` is `None` for orphans.
    pub fn pv(vg: Option<&'a VolumeGroup>, pv: &'a PhysicalVolume) -> Self {
        Self {
            vg: Self::group(vg, Some(pv)),
            lv: None,
            pv: Some(pv),
            seg: None,
            pvseg: None,
        }
    }

    /// Row for a run of extents on a PV.
    ///
    /// Allocated runs carry the volume and segment mapped onto them. Free runs
    /// carry an unnamed placeholder volume.
    pub fn pvseg(
        vg: Option<&'a VolumeGroup>,
        pv: &'a PhysicalVolume,
        pvseg: &'a PvSegment,
    ) -> Self {
        let mapped = vg.zip(pvseg.lv.as_deref()).and_then(|(vg, name)| vg.lv(name));
        let seg = mapped.and_then(|lv| {
            lv.segments.iter().find(|seg| {
                seg.areas.iter().any(|area| {
                    matches!(area, SegmentArea::Pv { pv: dev, pe } if *dev == pv.name && *pe == pvseg.pe)
                })
            })
        });

        let lv = match mapped {
            Some(lv) => Cow::Borrowed(lv),
            None => Cow::Owned(LogicalVolume::default()),
        };

        Self {
            vg: Self::group(vg, Some(pv)),
            lv: Some(lv),
            pv: Some(pv),
            seg,
            pvseg: Some(pvseg),
        }
    }

    pub fn group_ref(&self) -> &VolumeGroup {
        &self.vg
    }

    pub fn lv_ref(&self) -> Option<&LogicalVolume> {
        self.lv.as_deref()
    }

    pub fn pv_ref(&self) -> Option<&PhysicalVolume> {
        self.pv
    }

    pub fn seg_ref(&self) -> Option<&LvSegment> {
        self.seg
    }

    pub fn pvseg_ref(&self) -> Option<&PvSegment> {
        self.pvseg
    }

    /// Object a column of `kind` reads from, `None` when the row has none.
    pub fn resolve(&self, kind: ObjectKind) -> Option<ObjectRef<'_>> {
        match kind {
            ObjectKind::Vg => Some(ObjectRef::Vg(self.group_ref())),
            ObjectKind::Lv => self.lv_ref().map(ObjectRef::Lv),
            ObjectKind::Pv | ObjectKind::Label => self.pv.map(ObjectRef::Pv),
            ObjectKind::Seg => self.seg.map(ObjectRef::Seg),
            ObjectKind::PvSeg => self.pvseg.map(ObjectRef::PvSeg),
        }
    }
}
