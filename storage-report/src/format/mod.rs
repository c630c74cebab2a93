// SPDX-License-Identifier: GPL-3.0-only

//! Column formatters and the helpers they share.
//!
//! Every formatter turns one object into a [`FieldValue`]. Strings and sort
//! keys are charged to the report's [`FieldArena`] through the helpers on
//! [`FieldContext`], so formatters never build values directly.

pub mod lv;
pub mod pv;
pub mod seg;
pub mod vg;

use storage_types::{LiveState, LogicalVolume, PercentReading, VolumeGroup};
use tracing::debug;

use crate::arena::FieldArena;
use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::field::FieldValue;
use crate::units::display_size;

/// Widest percentage a report prints, e.g. `"1000.00"`.
pub const PERCENT_WIDTH: usize = 7;

const UUID_LEN: usize = 32;
const UUID_GROUPS: [usize; 7] = [6, 4, 4, 4, 4, 4, 6];

/// How a percent column treats an invalid or merge-failed reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidPercent {
    /// Report 100%, except on a merging origin where the field is suppressed
    AssumeComplete,
    /// Suppress the field
    Suppress,
}

/// Everything a formatter may consult besides the object itself.
#[derive(Clone, Copy)]
pub struct FieldContext<'r> {
    pub config: &'r ReportConfig,
    pub live: &'r dyn LiveState,
    pub arena: &'r FieldArena,
}

impl<'r> FieldContext<'r> {
    pub fn new(config: &'r ReportConfig, live: &'r dyn LiveState, arena: &'r FieldArena) -> Self {
        Self { config, live, arena }
    }

    pub fn text(&self, display: &str) -> Result<FieldValue> {
        Ok(FieldValue::text(self.arena.alloc_str(display)?))
    }

    pub fn owned_text(&self, display: String) -> Result<FieldValue> {
        Ok(FieldValue::text(self.arena.adopt(display)?))
    }

    /// Text shown as `display` but ordered by `sort`.
    pub fn text_sorted(&self, display: String, sort: &str) -> Result<FieldValue> {
        Ok(FieldValue::Text {
            display: self.arena.adopt(display)?,
            sort: Some(self.arena.alloc_str(sort)?),
        })
    }

    /// Optional text; absent values are suppressed.
    pub fn maybe_text(&self, value: Option<&str>) -> Result<FieldValue> {
        match value {
            Some(value) => self.text(value),
            None => Ok(FieldValue::empty()),
        }
    }

    pub fn number(&self, display: String, sort: u64) -> Result<FieldValue> {
        self.arena.charge_sort_key()?;
        Ok(FieldValue::number(self.arena.adopt(display)?, sort))
    }

    pub fn uint(&self, value: impl Into<u64>) -> Result<FieldValue> {
        let value = value.into();
        self.number(value.to_string(), value)
    }

    /// Signed values sort by their two's-complement bits, so -1 sorts last.
    pub fn int(&self, value: impl Into<i64>) -> Result<FieldValue> {
        let value = value.into();
        self.number(value.to_string(), value as u64)
    }

    /// Size in sectors, rendered in the configured units.
    pub fn size(&self, sectors: u64) -> Result<FieldValue> {
        let display = display_size(sectors, self.config.units, self.config.suffix);
        self.number(display, sectors)
    }

    pub fn tags(&self, tags: &[String]) -> Result<FieldValue> {
        self.owned_text(tags.join(","))
    }

    /// Name of `lv`, bracketed when the volume is internal. The bare name is
    /// always the sort key.
    pub fn hidden_name(&self, vg: &VolumeGroup, lv: &LogicalVolume) -> Result<FieldValue> {
        if lv.name.is_empty() || vg.is_visible(lv) {
            return self.text(&lv.name);
        }
        self.text_sorted(format!("[{}]", lv.name), &lv.name)
    }

    /// Name of a volume referenced from another one.
    pub fn lv_reference(&self, vg: &VolumeGroup, name: Option<&str>) -> Result<FieldValue> {
        let Some(name) = name else {
            return Ok(FieldValue::empty());
        };
        match vg.lv(name) {
            Some(lv) => self.hidden_name(vg, lv),
            None => {
                debug!(vg = %vg.name, lv = name, "referenced volume not found in group");
                self.text(name)
            }
        }
    }

    /// Canonical `xxxxxx-xxxx-xxxx-xxxx-xxxx-xxxx-xxxxxx` form of an LVM id.
    pub fn uuid(&self, id: &str) -> Result<FieldValue> {
        if id.is_empty() {
            return Ok(FieldValue::empty());
        }
        self.owned_text(format_lvm_id(id)?)
    }

    /// Shared tail of every percent column.
    pub fn percent(
        &self,
        reading: PercentReading,
        invalid: InvalidPercent,
        merging_origin: bool,
    ) -> Result<FieldValue> {
        let value = match (reading, invalid) {
            (PercentReading::Value(value), _) => value,
            (_, InvalidPercent::Suppress) => return Ok(FieldValue::empty_sorted(0)),
            // A merge that has not started yet would show a bogus 100%.
            (_, InvalidPercent::AssumeComplete) if merging_origin => {
                return Ok(FieldValue::empty_sorted(0));
            }
            (_, InvalidPercent::AssumeComplete) => 100.0,
        };

        let display = format!("{value:.2}");
        if display.len() > PERCENT_WIDTH {
            return Err(ReportError::FormatOverflow {
                value: display,
                width: PERCENT_WIDTH,
            });
        }
        self.number(display, (value * 1000.0) as u64)
    }
}

pub fn format_lvm_id(id: &str) -> Result<String> {
    if id.len() != UUID_LEN || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ReportError::InvalidIdentifier(id.to_string()));
    }

    let mut formatted = String::with_capacity(UUID_LEN + UUID_GROUPS.len() - 1);
    let mut start = 0;
    for (index, len) in UUID_GROUPS.iter().enumerate() {
        if index > 0 {
            formatted.push('-');
        }
        formatted.push_str(&id[start..start + len]);
        start += len;
    }
    Ok(formatted)
}


#[cfg(test)]
mod tests {
    use storage_types::LvFlag;

    use super::testing::Harness;
    use super::*;
    use crate::field::{SortKey, SortType};

    #[test]
    fn percent_formats_two_decimals_and_scales_sort() {
        let harness = Harness::new();
        let ctx = harness.offline();

        let value = ctx
            .percent(PercentReading::Value(42.5), InvalidPercent::AssumeComplete, false)
            .expect("percent");
        assert_eq!(value, FieldValue::number("42.50".to_string(), 42500));
    }

    #[test]
    fn invalid_percent_is_complete_unless_merging_origin() {
        let harness = Harness::new();
        let ctx = harness.offline();

        for reading in [PercentReading::Invalid, PercentReading::MergeFailed] {
            let complete = ctx
                .percent(reading, InvalidPercent::AssumeComplete, false)
                .expect("percent");
            assert_eq!(complete.display(), "100.00");
            assert_eq!(complete.sort_key(SortType::Number), SortKey::Number(100_000));

            let merging = ctx
                .percent(reading, InvalidPercent::AssumeComplete, true)
                .expect("percent");
            assert_eq!(merging, FieldValue::empty_sorted(0));

            let suppressed = ctx.percent(reading, InvalidPercent::Suppress, false).expect("percent");
            assert_eq!(suppressed, FieldValue::empty_sorted(0));
        }
    }

    #[test]
    fn oversized_percent_is_a_format_overflow() {
        let harness = Harness::new();
        let ctx = harness.offline();

        assert!(ctx
            .percent(PercentReading::Value(1000.0), InvalidPercent::Suppress, false)
            .is_ok());
        assert!(matches!(
            ctx.percent(PercentReading::Value(10000.0), InvalidPercent::Suppress, false),
            Err(ReportError::FormatOverflow { width: 7, .. })
        ));
    }

    #[test]
    fn hidden_volume_is_bracketed_but_sorts_bare() {
        let harness = Harness::new();
        let ctx = harness.offline();
        let vg = VolumeGroup {
            name: "vg0".to_string(),
            lvs: vec![
                LogicalVolume { name: "lvol0".to_string(), ..Default::default() },
                LogicalVolume {
                    name: "root".to_string(),
                    status: LvFlag::Visible.into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let hidden = ctx.hidden_name(&vg, &vg.lvs[0]).expect("name");
        assert_eq!(hidden.display(), "[lvol0]");
        assert_eq!(hidden.sort_key(SortType::String), SortKey::Text("lvol0"));

        let visible = ctx.lv_reference(&vg, Some("root")).expect("name");
        assert_eq!(visible.display(), "root");
        assert!(ctx.lv_reference(&vg, None).expect("name").is_suppressed());
    }

    #[test]
    fn lvm_ids_are_grouped() {
        assert_eq!(
            format_lvm_id("abcdef0123456789ABCDEF0123456789").expect("id"),
            "abcdef-0123-4567-89AB-CDEF-0123-456789"
        );
        assert!(matches!(
            format_lvm_id("too-short"),
            Err(ReportError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn signed_values_sort_minus_one_last() {
        let harness = Harness::new();
        let ctx = harness.offline();
        let unknown = ctx.int(-1).expect("int");
        assert_eq!(unknown.display(), "-1");
        assert_eq!(unknown.sort_key(SortType::Number), SortKey::Number(u64::MAX));
    }

    #[test]
    fn every_value_is_charged_to_the_arena() {
        let harness = Harness::new();
        let ctx = harness.offline();
        ctx.text("root").expect("text");
        ctx.uint(7_u32).expect("uint");
        assert_eq!(harness.arena.used(), 4 + 1 + 8);
    }
}
