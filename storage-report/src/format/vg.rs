// SPDX-License-Identifier: GPL-3.0-only

//! Volume group columns. Orphan PV rows reach these with a nameless group.

use storage_types::VolumeGroup;

use super::FieldContext;
use crate::attr;
use crate::error::Result;

type VgResult = Result<crate::field::FieldValue>;

pub fn vg_fmt(ctx: &FieldContext<'_>, vg: &VolumeGroup) -> VgResult {
    ctx.text(vg.format.as_deref().unwrap_or_default())
}

pub fn vg_uuid(ctx: &FieldContext<'_>, vg: &VolumeGroup) -> VgResult {
    ctx.uuid(&vg.id)
}

pub fn vg_name(ctx: &FieldContext<'_>, vg: &VolumeGroup) -> VgResult {
    ctx.text(&vg.name)
}

pub fn vg_attr(ctx: &FieldContext<'_>, vg: &VolumeGroup) -> VgResult {
    ctx.owned_text(attr::vg_attr(vg).to_string())
}

pub fn vg_sysid(ctx: &FieldContext<'_>, vg: &VolumeGroup) -> VgResult {
    ctx.text(&vg.system_id)
}

pub fn vg_tags(ctx: &FieldContext<'_>, vg: &VolumeGroup) -> VgResult {
    ctx.tags(&vg.tags)
}

pub fn vg_profile(ctx: &FieldContext<'_>, vg: &VolumeGroup) -> VgResult {
    ctx.maybe_text(vg.profile.as_deref())
}

pub fn vg_mda_copies(ctx: &FieldContext<'_>, vg: &VolumeGroup) -> VgResult {
    match vg.mda_copies {
        Some(copies) => ctx.uint(copies),
        None => ctx.number("unmanaged".to_string(), u64::MAX),
    }
}
