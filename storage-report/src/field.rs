// SPDX-License-Identifier: GPL-3.0-only

//! The value every column formatter produces.

use serde::{Deserialize, Serialize};

/// How a column orders its rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortType {
    String,
    Number,
}

/// A formatted cell: what is shown and, independently, how it sorts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Text ordered by `sort` when present, else by the display text itself.
    Text {
        display: String,
        sort: Option<String>,
    },

    /// Text produced from a magnitude; rows order by the magnitude.
    Number { display: String, sort: u64 },

    /// Column does not apply to this object. Renders empty; number columns
    /// order it by `sort` (0 when unset).
    Suppressed { sort: Option<u64> },
}

/// Ordering key extracted from a [`FieldValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey<'a> {
    Number(u64),
    Text(&'a str),
}

impl FieldValue {
    pub fn text(display: String) -> Self {
        FieldValue::Text {
            display,
            sort: None,
        }
    }

    pub fn number(display: String, sort: u64) -> Self {
        FieldValue::Number { display, sort }
    }

    /// Suppressed without an explicit sort sentinel.
    pub fn empty() -> Self {
        FieldValue::Suppressed { sort: None }
    }

    /// Suppressed, ordering as `sort`.
    pub fn empty_sorted(sort: u64) -> Self {
        FieldValue::Suppressed { sort: Some(sort) }
    }

    pub fn display(&self) -> &str {
        match self {
            FieldValue::Text { display, .. } | FieldValue::Number { display, .. } => display,
            FieldValue::Suppressed { .. } => "",
        }
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, FieldValue::Suppressed { .. })
    }

    pub fn sort_key(&self, sort_type: SortType) -> SortKey<'_> {
        match self {
            FieldValue::Text { display, sort } => SortKey::Text(sort.as_deref().unwrap_or(display)),
            FieldValue::Number { sort, .. } => SortKey::Number(*sort),
            FieldValue::Suppressed { sort } => match sort_type {
                SortType::Number => SortKey::Number(sort.unwrap_or(0)),
                SortType::String => SortKey::Text(""),
            },
        }
    }
}
