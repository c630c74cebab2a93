// SPDX-License-Identifier: GPL-3.0-only

//! Report engine: column selection, row collection, sorting and rendering.

use std::cmp::Ordering;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde_json::{Map, Value, json};
use storage_types::{LiveState, MetadataSnapshot};
use tracing::{debug, trace, warn};

use crate::arena::FieldArena;
use crate::columns::{FIELDS, FieldSpec, field_by_id};
use crate::config::{ERROR_MARKER, FieldErrorPolicy, OutputFormat, ReportConfig};
use crate::error::{ReportError, Result};
use crate::field::{FieldValue, SortType};
use crate::format::FieldContext;
use crate::object::{ObjectKind, ReportObject};

/// Prepended to upper-cased column ids with `field_name_prefix`.
pub const FIELD_NAME_PREFIX: &str = "LVM2_";

/// Which objects a report emits one row for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportType {
    Lvs,
    Vgs,
    Pvs,
    Segs,
    PvSegs,
}

impl ReportType {
    pub fn name(self) -> &'static str {
        match self {
            ReportType::Lvs => "lvs",
            ReportType::Vgs => "vgs",
            ReportType::Pvs => "pvs",
            ReportType::Segs => "segs",
            ReportType::PvSegs => "pvsegs",
        }
    }

    /// Kind of object each row is built around.
    pub fn primary(self) -> ObjectKind {
        match self {
            ReportType::Lvs => ObjectKind::Lv,
            ReportType::Vgs => ObjectKind::Vg,
            ReportType::Pvs => ObjectKind::Pv,
            ReportType::Segs => ObjectKind::Seg,
            ReportType::PvSegs => ObjectKind::PvSeg,
        }
    }

    /// Kinds whose columns this report can show.
    pub fn kinds(self) -> &'static [ObjectKind] {
        use ObjectKind::*;
        match self {
            ReportType::Lvs => &[Lv, Vg],
            ReportType::Vgs => &[Vg],
            ReportType::Pvs => &[Pv, Label, Vg],
            ReportType::Segs => &[Seg, Lv, Vg],
            ReportType::PvSegs => &[PvSeg, Pv, Label, Vg, Lv, Seg],
        }
    }

    pub fn default_fields(self) -> &'static str {
        match self {
            ReportType::Lvs => {
                "lv_name,vg_name,lv_attr,lv_size,pool_lv,origin,data_percent,move_pv,mirror_log,copy_percent,convert_lv"
            }
            ReportType::Vgs => "vg_name,pv_count,lv_count,snap_count,vg_attr,vg_size,vg_free",
            ReportType::Pvs => "pv_name,vg_name,pv_fmt,pv_attr,pv_size,pv_free",
            ReportType::Segs => "lv_name,vg_name,lv_attr,stripes,segtype,seg_size",
            ReportType::PvSegs => {
                "pv_name,vg_name,pv_fmt,pv_attr,pv_size,pv_free,pvseg_start,pvseg_size"
            }
        }
    }

    pub fn default_sort(self) -> &'static str {
        match self {
            ReportType::Lvs => "vg_name,lv_name",
            ReportType::Vgs => "vg_name",
            ReportType::Pvs => "pv_name",
            ReportType::Segs => "vg_name,lv_name,seg_start",
            ReportType::PvSegs => "pv_name,pvseg_start",
        }
    }

    /// Finer-grained report that can also show columns of `kind`.
    fn widened_for(self, kind: ObjectKind) -> Option<ReportType> {
        match (self, kind) {
            (ReportType::Lvs, ObjectKind::Seg) => Some(ReportType::Segs),
            (ReportType::Pvs, ObjectKind::Lv | ObjectKind::Seg | ObjectKind::PvSeg) => {
                Some(ReportType::PvSegs)
            }
            _ => None,
        }
    }

    fn json_key(self) -> &'static str {
        match self {
            ReportType::Lvs => "lv",
            ReportType::Vgs => "vg",
            ReportType::Pvs => "pv",
            ReportType::Segs => "seg",
            ReportType::PvSegs => "pvseg",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReportType {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lvs" => Ok(ReportType::Lvs),
            "vgs" => Ok(ReportType::Vgs),
            "pvs" => Ok(ReportType::Pvs),
            "segs" => Ok(ReportType::Segs),
            "pvsegs" => Ok(ReportType::PvSegs),
            other => Err(ReportError::Config(format!("unknown report type {other:?}"))),
        }
    }
}

/// Resolve a column name for `report_type`. Ids match exactly, or with their
/// kind prefix left off (`size` for `lv_size` in an lvs report).
pub fn find_field(report_type: ReportType, name: &str) -> Option<&'static FieldSpec> {
    if let Some(spec) = field_by_id(name) {
        return Some(spec);
    }

    let matches = |spec: &&FieldSpec| {
        spec.id
            .strip_prefix(spec.kind.id_prefix())
            .is_some_and(|rest| rest.eq_ignore_ascii_case(name))
    };
    let mut candidates = FIELDS.iter().filter(matches);
    let first = candidates.clone().next();

    candidates
        .clone()
        .find(|spec| spec.kind == report_type.primary())
        .or_else(|| candidates.find(|spec| report_type.kinds().contains(&spec.kind)))
        .or(first)
}

#[derive(Debug, Clone, Copy)]
struct SortColumn {
    column: usize,
    descending: bool,
}

/// A report being built.
///
/// Rows are either held until [`Report::render`] (buffered, sortable) or
/// written as soon as they are added.
pub struct Report<'r, W> {
    report_type: ReportType,
    /// Selected columns followed by hidden sort-only columns
    columns: Vec<&'static FieldSpec>,
    shown: usize,
    sort: Vec<SortColumn>,
    config: &'r ReportConfig,
    live: &'r dyn LiveState,
    arena: FieldArena,
    rows: Vec<Vec<FieldValue>>,
    out: W,
    headings_written: bool,
}

impl<'r, W: Write> Report<'r, W> {
    /// Build a report. `options` lists columns (`None` for the defaults, a
    /// leading `+` to extend them); `sort` lists sort keys (`-` for
    /// descending, `None` for the defaults).
    ///
    /// The report type widens to segs or pvsegs when a selected column needs it.
    pub fn new(
        report_type: ReportType,
        options: Option<&str>,
        sort: Option<&str>,
        config: &'r ReportConfig,
        live: &'r dyn LiveState,
        out: W,
    ) -> Result<Self> {
        let mut report_type = report_type;

        let options = match options {
            None => report_type.default_fields().to_string(),
            Some(extra) if extra.starts_with('+') => {
                format!("{},{}", report_type.default_fields(), &extra[1..])
            }
            Some(options) => options.to_string(),
        };

        let mut columns = Vec::new();
        for name in split_list(&options) {
            let spec = find_field(report_type, name)
                .ok_or_else(|| ReportError::UnknownField(name.to_string()))?;
            report_type = admit(report_type, spec)?;
            columns.push(spec);
        }
        let shown = columns.len();

        let mut sort_columns = Vec::new();
        for key in split_list(sort.unwrap_or(report_type.default_sort())) {
            let (name, descending) = match key.as_bytes()[0] {
                b'-' => (&key[1..], true),
                b'+' => (&key[1..], false),
                _ => (key, false),
            };
            let spec = find_field(report_type, name)
                .ok_or_else(|| ReportError::InvalidSortKey(key.to_string()))?;
            report_type = admit(report_type, spec)?;

            let column = match columns.iter().position(|shown| shown.id == spec.id) {
                Some(index) => index,
                None => {
                    columns.push(spec);
                    columns.len() - 1
                }
            };
            sort_columns.push(SortColumn { column, descending });
        }

        let arena = match config.memory_budget {
            Some(bytes) => FieldArena::with_budget(bytes),
            None => FieldArena::unbounded(),
        };

        debug!(
            report = report_type.name(),
            columns = shown,
            sort_keys = sort_columns.len(),
            "report prepared"
        );

        Ok(Self {
            report_type,
            columns,
            shown,
            sort: sort_columns,
            config,
            live,
            arena,
            rows: Vec::new(),
            out,
            headings_written: false,
        })
    }

    /// Report type after widening.
    pub fn report_type(&self) -> ReportType {
        self.report_type
    }

    /// Ids of the columns that are displayed.
    pub fn field_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns[..self.shown].iter().map(|spec| spec.id)
    }

    /// Bytes of formatted output held so far.
    pub fn memory_used(&self) -> usize {
        self.arena.used()
    }

    fn buffers(&self) -> bool {
        self.config.buffered
            || self.config.columns_as_rows
            || self.config.output == OutputFormat::Json
    }

    /// Evaluate every column for `row`, then buffer or stream it.
    pub fn add_object(&mut self, row: &ReportObject<'_>) -> Result<()> {
        let values = {
            let ctx = FieldContext::new(self.config, self.live, &self.arena);
            let mut values = Vec::with_capacity(self.columns.len());
            for spec in &self.columns {
                let value = match spec.evaluate(&ctx, row) {
                    Ok(value) => value,
                    Err(error)
                        if self.config.on_field_error == FieldErrorPolicy::Mark
                            && !exhausts_budget(&error) =>
                    {
                        warn!(%error, "rendering {ERROR_MARKER} in place of field");
                        FieldValue::text(ERROR_MARKER.to_string())
                    }
                    Err(error) => return Err(error),
                };
                values.push(value);
            }
            values
        };

        trace!(
            report = self.report_type.name(),
            lv = row.lv_ref().map(|lv| lv.name.as_str()),
            pv = row.pv_ref().map(|pv| pv.name.as_str()),
            "row added"
        );

        if self.buffers() {
            self.rows.push(values);
            Ok(())
        } else {
            self.stream(&values)
        }
    }

    /// Add one row per object of the report's type found in `snapshot`.
    pub fn add_snapshot(&mut self, snapshot: &MetadataSnapshot) -> Result<()> {
        let all = self.config.all_volumes;
        match self.report_type {
            ReportType::Vgs => {
                for vg in &snapshot.vgs {
                    self.add_object(&ReportObject::vg(vg))?;
                }
            }
            ReportType::Lvs => {
                for vg in &snapshot.vgs {
                    for lv in vg.lvs.iter().filter(|lv| all || vg.is_visible(lv)) {
                        self.add_object(&ReportObject::lv(vg, lv))?;
                    }
                }
            }
            ReportType::Segs => {
                for vg in &snapshot.vgs {
                    for lv in vg.lvs.iter().filter(|lv| all || vg.is_visible(lv)) {
                        for seg in &lv.segments {
                            self.add_object(&ReportObject::seg(vg, lv, seg))?;
                        }
                    }
                }
            }
            ReportType::Pvs => {
                for vg in &snapshot.vgs {
                    for pv in &vg.pvs {
                        self.add_object(&ReportObject::pv(Some(vg), pv))?;
                    }
                }
                for pv in &snapshot.orphans {
                    self.add_object(&ReportObject::pv(None, pv))?;
                }
            }
            ReportType::PvSegs => {
                for vg in &snapshot.vgs {
                    for pv in &vg.pvs {
                        for pvseg in &pv.segments {
                            self.add_object(&ReportObject::pvseg(Some(vg), pv, pvseg))?;
                        }
                    }
                }
                for pv in &snapshot.orphans {
                    for pvseg in &pv.segments {
                        self.add_object(&ReportObject::pvseg(None, pv, pvseg))?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Sort and write any buffered rows, returning the output.
    pub fn render(mut self) -> Result<W> {
        if self.buffers() {
            self.sort_rows();
            match (self.config.output, self.config.columns_as_rows) {
                (OutputFormat::Json, _) => self.write_json()?,
                (OutputFormat::Text, true) => self.write_transposed()?,
                (OutputFormat::Text, false) => self.write_rows()?,
            }
        } else if !self.headings_written {
            let widths = self.stream_widths();
            self.write_headings(&widths)?;
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn sort_rows(&mut self) {
        if self.sort.is_empty() {
            return;
        }
        let (columns, sort) = (&self.columns, &self.sort);
        self.rows.sort_by(|a, b| {
            for key in sort {
                let sort_type = columns[key.column].sort;
                let ordering = a[key.column]
                    .sort_key(sort_type)
                    .cmp(&b[key.column].sort_key(sort_type));
                let ordering = if key.descending {
                    ordering.reverse()
                } else {
                    ordering
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }

    fn show_headings(&self) -> bool {
        self.config.headings && !self.config.field_name_prefix
    }

    fn stream_widths(&self) -> Vec<usize> {
        self.columns[..self.shown]
            .iter()
            .map(|spec| spec.width.max(spec.heading.chars().count()))
            .collect()
    }

    fn buffered_widths(&self) -> Vec<usize> {
        (0..self.shown)
            .map(|index| {
                let spec = self.columns[index];
                let mut width = spec.width;
                if self.show_headings() {
                    width = width.max(spec.heading.chars().count());
                }
                self.rows
                    .iter()
                    .map(|row| row[index].display().chars().count())
                    .fold(width, usize::max)
            })
            .collect()
    }

    fn cell(&self, index: usize, text: &str, width: usize) -> String {
        let spec = self.columns[index];
        if self.config.field_name_prefix {
            let name = spec.id.to_ascii_uppercase();
            return if self.config.quoted {
                format!("{FIELD_NAME_PREFIX}{name}='{text}'")
            } else {
                format!("{FIELD_NAME_PREFIX}{name}={text}")
            };
        }
        if !self.config.aligned {
            return text.to_string();
        }
        match spec.sort {
            SortType::Number => format!("{text:>width$}"),
            SortType::String if index + 1 == self.shown => text.to_string(),
            SortType::String => format!("{text:<width$}"),
        }
    }

    fn write_cells(&mut self, cells: &[String]) -> Result<()> {
        writeln!(self.out, "{}", cells.join(&self.config.separator))?;
        Ok(())
    }

    fn write_headings(&mut self, widths: &[usize]) -> Result<()> {
        if !self.show_headings() {
            return Ok(());
        }
        let cells: Vec<String> = (0..self.shown)
            .map(|index| self.cell(index, self.columns[index].heading, widths[index]))
            .collect();
        self.headings_written = true;
        self.write_cells(&cells)
    }

    fn stream(&mut self, values: &[FieldValue]) -> Result<()> {
        let widths = self.stream_widths();
        if !self.headings_written {
            self.write_headings(&widths)?;
            self.headings_written = true;
        }
        let cells: Vec<String> = (0..self.shown)
            .map(|index| self.cell(index, values[index].display(), widths[index]))
            .collect();
        self.write_cells(&cells)
    }

    fn write_rows(&mut self) -> Result<()> {
        let widths = self.buffered_widths();
        self.write_headings(&widths)?;
        let lines: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                (0..self.shown)
                    .map(|index| self.cell(index, row[index].display(), widths[index]))
                    .collect()
            })
            .collect();
        for cells in &lines {
            self.write_cells(cells)?;
        }
        Ok(())
    }

    /// One line per column: the heading, then that column's value for every row.
    fn write_transposed(&mut self) -> Result<()> {
        let aligned = self.config.aligned && !self.config.field_name_prefix;
        let heading_width = self.columns[..self.shown]
            .iter()
            .map(|spec| spec.heading.chars().count())
            .max()
            .unwrap_or(0);
        let value_widths: Vec<usize> = self
            .rows
            .iter()
            .map(|row| {
                row[..self.shown]
                    .iter()
                    .map(|value| value.display().chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(self.shown);
        for index in 0..self.shown {
            let spec = self.columns[index];
            let mut cells = Vec::with_capacity(self.rows.len() + 1);
            if self.show_headings() {
                cells.push(if aligned {
                    format!("{:<heading_width$}", spec.heading)
                } else {
                    spec.heading.to_string()
                });
            }
            for (row, &width) in self.rows.iter().zip(&value_widths) {
                let text = row[index].display();
                cells.push(if self.config.field_name_prefix {
                    self.cell(index, text, width)
                } else if aligned {
                    format!("{text:<width$}")
                } else {
                    text.to_string()
                });
            }
            if aligned && let Some(last) = cells.last_mut() {
                let trimmed = last.trim_end().len();
                last.truncate(trimmed);
            }
            lines.push(cells);
        }
        for cells in &lines {
            self.write_cells(cells)?;
        }
        Ok(())
    }

    fn write_json(&mut self) -> Result<()> {
        let objects: Vec<Value> = self
            .rows
            .iter()
            .map(|row| {
                let object: Map<String, Value> = self.columns[..self.shown]
                    .iter()
                    .zip(row)
                    .map(|(spec, value)| (spec.id.to_string(), Value::from(value.display())))
                    .collect();
                Value::Object(object)
            })
            .collect();

        let mut section = Map::new();
        section.insert(self.report_type.json_key().to_string(), Value::Array(objects));
        let document = json!({ "report": [section] });

        serde_json::to_writer_pretty(&mut self.out, &document)?;
        writeln!(self.out)?;
        Ok(())
    }
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|item| !item.is_empty())
}

/// Report type able to show `spec`, widening `report_type` if needed.
fn admit(report_type: ReportType, spec: &FieldSpec) -> Result<ReportType> {
    if report_type.kinds().contains(&spec.kind) {
        return Ok(report_type);
    }
    match report_type.widened_for(spec.kind) {
        Some(wider) => {
            debug!(field = spec.id, from = %report_type, to = %wider, "widening report");
            Ok(wider)
        }
        None => Err(ReportError::FieldUnavailable {
            field: spec.id.to_string(),
            report: report_type.name(),
        }),
    }
}

/// Budget exhaustion aborts the report whatever the field error policy.
fn exhausts_budget(error: &ReportError) -> bool {
    match error {
        ReportError::AllocationFailure { .. } => true,
        ReportError::Field { source, .. } => exhausts_budget(source),
        _ => false,
    }
}

/// Write the `--list-fields` help: every column, grouped by object kind.
pub fn write_field_help<W: Write>(out: &mut W) -> Result<()> {
    let mut current = None;
    for spec in FIELDS {
        if current != Some(spec.kind) {
            if current.is_some() {
                writeln!(out)?;
            }
            let title = format!("{} Fields", spec.kind.name());
            writeln!(out, "{title}")?;
            writeln!(out, "{}", "-".repeat(title.len()))?;
            current = Some(spec.kind);
        }
        writeln!(out, "  {} - {}", spec.id, spec.description)?;
    }
    Ok(())
}
