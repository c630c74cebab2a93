// SPDX-License-Identifier: GPL-3.0-only

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::units::SizeUnits;

/// What to do when a single field fails to format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorPolicy {
    /// Fail the row and the report
    #[default]
    Abort,
    /// Render [`ERROR_MARKER`] in the cell and carry on
    Mark,
}

pub const ERROR_MARKER: &str = "ERROR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Report settings, loadable from a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Pad columns to a common width
    pub aligned: bool,

    /// Hold rows until the report is rendered; needed for sorting
    pub buffered: bool,

    pub headings: bool,

    /// Emit `LVM2_<ID>=value` pairs
    pub field_name_prefix: bool,

    /// Quote values when prefixed
    pub quoted: bool,

    /// Print one line per column instead of one per object
    pub columns_as_rows: bool,

    pub separator: String,
    pub output: OutputFormat,

    pub units: SizeUnits,

    /// Append the unit letter to sizes
    pub suffix: bool,

    /// Directory device paths are built under
    pub dev_dir: String,

    /// Upper bound on bytes of formatted output held by a report
    pub memory_budget: Option<usize>,

    pub on_field_error: FieldErrorPolicy,

    /// Also report volumes LVM keeps for internal use
    pub all_volumes: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            aligned: true,
            buffered: true,
            headings: true,
            field_name_prefix: false,
            quoted: true,
            columns_as_rows: false,
            separator: " ".to_string(),
            output: OutputFormat::Text,
            units: SizeUnits::default(),
            suffix: true,
            dev_dir: "/dev/".to_string(),
            memory_budget: None,
            on_field_error: FieldErrorPolicy::Abort,
            all_volumes: false,
        }
    }
}

impl ReportConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|error| ReportError::Config(error.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|error| {
            ReportError::Config(format!("failed to read {}: {error}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ReportConfig::from_toml_str("").expect("empty config");
        assert_eq!(config, ReportConfig::default());
        assert!(config.aligned);
        assert_eq!(config.on_field_error, FieldErrorPolicy::Abort);
    }

    #[test]
    fn values_override_defaults() {
        let config = ReportConfig::from_toml_str(
            r#"
            units = "m"
            suffix = false
            separator = ","
            on_field_error = "mark"
            memory_budget = 4096
            output = "json"
            "#,
        )
        .expect("config");

        assert_eq!(config.units, SizeUnits::Fixed { power: 2, si: false });
        assert!(!config.suffix);
        assert_eq!(config.separator, ",");
        assert_eq!(config.on_field_error, FieldErrorPolicy::Mark);
        assert_eq!(config.memory_budget, Some(4096));
        assert_eq!(config.output, OutputFormat::Json);
    }

    #[test]
    fn bad_units_and_unknown_keys_are_rejected() {
        assert!(matches!(
            ReportConfig::from_toml_str(r#"units = "q""#),
            Err(ReportError::Config(_))
        ));
        assert!(matches!(
            ReportConfig::from_toml_str("colour = true"),
            Err(ReportError::Config(_))
        ));
    }
}
