// SPDX-License-Identifier: GPL-3.0-only

//! Canonical LVM domain models for the storage report tools
//!
//! This crate is the single source of truth for the objects a report is run
//! against:
//!
//! - **lvm**: volume groups, logical volumes, physical volumes and their
//!   segments, as read from on-disk metadata
//! - **live**: the kernel's view of activated volumes and the [`LiveState`]
//!   query contract implemented by `storage-sys`
//!
//! Neither module performs I/O.

pub mod flags;
pub mod live;
pub mod lvm;

pub use live::{LiveState, LiveVolume, LvInfo, NoActivation, PercentReading, StaticLiveState};
pub use lvm::{
    AllocPolicy, CowLink, Discards, LogicalVolume, LvFlag, LvSegment, MetadataArea,
    MetadataSnapshot, PhysicalVolume, PvFlag, PvSegment, ReadAhead, SegmentArea, SegmentType,
    VgFlag, VolumeGroup,
};
