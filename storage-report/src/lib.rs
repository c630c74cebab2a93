// SPDX-License-Identifier: GPL-3.0-only

//! LVM status encoding and report field engine
//!
//! Turns volume groups, logical volumes, physical volumes and their segments
//! into report rows:
//!
//! - **attr**: the fixed-width LV, VG and PV attribute strings
//! - **format**: one formatter per column, producing a display string and an
//!   independent sort key
//! - **columns**: the static table mapping column ids to formatters
//! - **report**: column selection, sorting and text or JSON rendering
//!
//! Live device state is read through [`storage_types::LiveState`]; nothing in
//! this crate talks to the kernel directly.

pub mod arena;
pub mod attr;
pub mod columns;
pub mod config;
pub mod error;
pub mod field;
pub mod format;
pub mod object;
pub mod report;
pub mod units;

pub use arena::FieldArena;
pub use attr::{ActivationState, LvAttr, PvAttr, VgAttr, VolumeRole, lv_attr, pv_attr, vg_attr};
pub use columns::{FIELDS, FieldSpec, Formatter, field_by_id};
pub use config::{ERROR_MARKER, FieldErrorPolicy, OutputFormat, ReportConfig};
pub use error::{ReportError, Result};
pub use field::{FieldValue, SortKey, SortType};
pub use format::{FieldContext, InvalidPercent, format_lvm_id};
pub use object::{ObjectKind, ObjectRef, ReportObject};
pub use report::{Report, ReportType, find_field, write_field_help};
pub use units::{SizeUnits, display_size};
