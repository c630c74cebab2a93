// SPDX-License-Identifier: GPL-3.0-only

//! Fixed-width attribute strings for volumes, groups and physical volumes.
//!
//! LV attributes are six characters:
//!
//! | slot | meaning |
//! |---|---|
//! | 0 | volume role (see [`VolumeRole`]) |
//! | 1 | permissions: `w`, `r` or `-` |
//! | 2 | allocation policy, upper-cased while locked by pvmove |
//! | 3 | `m` for a fixed minor number |
//! | 4 | kernel state (see [`ActivationState`]) |
//! | 5 | `o` while the device is open |
//!
//! A volume with an empty name stands for free space and renders blank.

use std::fmt;

use storage_types::{
    LiveState, LogicalVolume, LvFlag, LvInfo, PercentReading, PhysicalVolume, PvFlag, VgFlag,
    VolumeGroup,
};

/// Attribute string of exactly `N` ASCII characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttrString<const N: usize>([u8; N]);

pub type LvAttr = AttrString<6>;
pub type VgAttr = AttrString<6>;
pub type PvAttr = AttrString<3>;

impl<const N: usize> AttrString<N> {
    fn filled(byte: u8) -> Self {
        Self([byte; N])
    }

    pub fn blank() -> Self {
        Self::filled(b' ')
    }

    pub fn slot(&self, index: usize) -> char {
        char::from(self.0[index])
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII is ever stored.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    fn set(&mut self, index: usize, value: char) {
        debug_assert!(value.is_ascii());
        self.0[index] = value as u8;
    }
}

impl<const N: usize> fmt::Display for AttrString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a volume, first match in declaration order wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeRole {
    Pvmove,
    Converting,
    Virtual,
    Origin { merging: bool },
    Mirrored { synced: bool },
    MirrorImage { in_sync: bool },
    MirrorLog,
    Snapshot { merging: bool },
    Plain,
}

impl VolumeRole {
    pub fn classify(vg: &VolumeGroup, lv: &LogicalVolume, live: &dyn LiveState) -> Self {
        if lv.has(LvFlag::Pvmove) {
            VolumeRole::Pvmove
        } else if lv.has(LvFlag::Converting) {
            VolumeRole::Converting
        } else if lv.has(LvFlag::Virtual) {
            VolumeRole::Virtual
        } else if lv.is_origin() {
            VolumeRole::Origin {
                merging: lv.is_merging_origin(),
            }
        } else if lv.has(LvFlag::Mirrored) {
            VolumeRole::Mirrored {
                synced: !lv.has(LvFlag::MirrorNotSynced),
            }
        } else if lv.has(LvFlag::MirrorImage) {
            VolumeRole::MirrorImage {
                in_sync: mirror_image_in_sync(vg, lv, live),
            }
        } else if lv.has(LvFlag::MirrorLog) {
            VolumeRole::MirrorLog
        } else if lv.is_cow() {
            VolumeRole::Snapshot {
                merging: lv.is_merging_cow(),
            }
        } else {
            VolumeRole::Plain
        }
    }

    pub fn attr_char(self) -> char {
        match self {
            VolumeRole::Pvmove => 'p',
            VolumeRole::Converting => 'c',
            VolumeRole::Virtual => 'v',
            VolumeRole::Origin { merging: true } => 'O',
            VolumeRole::Origin { merging: false } => 'o',
            VolumeRole::Mirrored { synced: false } => 'M',
            VolumeRole::Mirrored { synced: true } => 'm',
            VolumeRole::MirrorImage { in_sync: true } => 'i',
            VolumeRole::MirrorImage { in_sync: false } => 'I',
            VolumeRole::MirrorLog => 'l',
            VolumeRole::Snapshot { merging: true } => 'S',
            VolumeRole::Snapshot { merging: false } => 's',
            VolumeRole::Plain => '-',
        }
    }
}

/// A mirror leg is in sync when its mirror reports 100%. Any failed lookup
/// counts as out of sync.
pub fn mirror_image_in_sync(vg: &VolumeGroup, lv: &LogicalVolume, live: &dyn LiveState) -> bool {
    if !lv.has(LvFlag::MirrorImage) || lv.first_segment().is_none() {
        return false;
    }

    let Some(owner) = vg.mirror_owner(lv) else {
        return false;
    };

    live.mirror_percent(vg, owner)
        .is_some_and(PercentReading::is_complete)
}

/// Kernel state shown in slot 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    Suspended,
    Active,
    InactiveTable,
    NoTable,
    InvalidSnapshot { suspended: bool },
}

impl ActivationState {
    pub fn from_info(info: &LvInfo) -> Self {
        if info.suspended {
            ActivationState::Suspended
        } else if info.live_table {
            ActivationState::Active
        } else if info.inactive_table {
            ActivationState::InactiveTable
        } else {
            ActivationState::NoTable
        }
    }

    pub fn attr_char(self) -> char {
        match self {
            ActivationState::Suspended => 's',
            ActivationState::Active => 'a',
            ActivationState::InactiveTable => 'i',
            ActivationState::NoTable => 'd',
            ActivationState::InvalidSnapshot { suspended: true } => 'S',
            ActivationState::InvalidSnapshot { suspended: false } => 'I',
        }
    }
}

/// A mapped snapshot whose usage cannot be read, or reads invalid, has been
/// dropped by the kernel.
fn snapshot_dropped(vg: &VolumeGroup, lv: &LogicalVolume, live: &dyn LiveState) -> bool {
    match live.snapshot_percent(vg, lv) {
        None | Some(PercentReading::Invalid) => true,
        Some(_) => false,
    }
}

pub fn lv_attr(vg: &VolumeGroup, lv: &LogicalVolume, live: &dyn LiveState) -> LvAttr {
    if lv.name.is_empty() {
        return LvAttr::blank();
    }

    let mut attr = LvAttr::filled(b'-');

    attr.set(0, VolumeRole::classify(vg, lv, live).attr_char());

    attr.set(
        1,
        if lv.has(LvFlag::Pvmove) {
            '-'
        } else if lv.has(LvFlag::Write) {
            'w'
        } else if lv.has(LvFlag::Read) {
            'r'
        } else {
            '-'
        },
    );

    let alloc = lv.alloc.attr_char();
    attr.set(
        2,
        if lv.has(LvFlag::Locked) {
            alloc.to_ascii_uppercase()
        } else {
            alloc
        },
    );

    if lv.has(LvFlag::FixedMinor) {
        attr.set(3, 'm');
    }

    let Some(info) = live.lv_info(vg, lv, false).filter(|info| info.exists) else {
        return attr;
    };

    let mut state = ActivationState::from_info(&info);
    if info.live_table && lv.is_cow() && snapshot_dropped(vg, lv, live) {
        attr.set(0, attr.slot(0).to_ascii_uppercase());
        state = ActivationState::InvalidSnapshot {
            suspended: info.suspended,
        };
    }
    attr.set(4, state.attr_char());

    if info.open_count > 0 {
        attr.set(5, 'o');
    }

    attr
}

pub fn vg_attr(vg: &VolumeGroup) -> VgAttr {
    if vg.name.is_empty() {
        return VgAttr::blank();
    }

    let mut attr = VgAttr::filled(b'-');
    attr.set(0, if vg.has(VgFlag::Write) { 'w' } else { 'r' });
    if vg.has(VgFlag::Resizeable) {
        attr.set(1, 'z');
    }
    if vg.has(VgFlag::Exported) {
        attr.set(2, 'x');
    }
    if vg.has(VgFlag::Partial) || vg.pvs.iter().any(|pv| pv.has(PvFlag::Missing)) {
        attr.set(3, 'p');
    }
    attr.set(4, vg.alloc.attr_char());
    if vg.has(VgFlag::Clustered) {
        attr.set(5, 'c');
    }
    attr
}

pub fn pv_attr(pv: &PhysicalVolume) -> PvAttr {
    let mut attr = PvAttr::filled(b'-');
    if pv.has(PvFlag::Allocatable) {
        attr.set(0, 'a');
    }
    if pv.has(PvFlag::Exported) {
        attr.set(1, 'x');
    }
    if pv.has(PvFlag::Missing) {
        attr.set(2, 'm');
    }
    attr
}
