// SPDX-License-Identifier: GPL-3.0-only

//! Physical volume and label columns.

use storage_types::PhysicalVolume;

use super::FieldContext;
use crate::attr;
use crate::error::Result;
use crate::field::FieldValue;

pub fn pv_fmt(ctx: &FieldContext<'_>, pv: &PhysicalVolume) -> Result<FieldValue> {
    ctx.text(pv.format.as_deref().unwrap_or_default())
}

pub fn pv_uuid(ctx: &FieldContext<'_>, pv: &PhysicalVolume) -> Result<FieldValue> {
    ctx.uuid(&pv.id)
}

pub fn pv_name(ctx: &FieldContext<'_>, pv: &PhysicalVolume) -> Result<FieldValue> {
    ctx.text(&pv.name)
}

pub fn pv_attr(ctx: &FieldContext<'_>, pv: &PhysicalVolume) -> Result<FieldValue> {
    ctx.owned_text(attr::pv_attr(pv).to_string())
}

pub fn pv_tags(ctx: &FieldContext<'_>, pv: &PhysicalVolume) -> Result<FieldValue> {
    ctx.tags(&pv.tags)
}
