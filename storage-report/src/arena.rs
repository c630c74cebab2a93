// SPDX-License-Identifier: GPL-3.0-only

//! Accounting for the memory a report allocates.
//!
//! Every display string and sort key produced while a report runs is charged
//! here. Values stay owned by the rows that hold them; the arena only tracks
//! how much has been handed out and refuses once an optional budget is spent.

use std::cell::Cell;

use crate::error::{ReportError, Result};

#[derive(Debug, Default)]
pub struct FieldArena {
    budget: Option<usize>,
    used: Cell<usize>,
}

impl FieldArena {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_budget(bytes: usize) -> Self {
        Self {
            budget: Some(bytes),
            used: Cell::new(0),
        }
    }

    pub fn used(&self) -> usize {
        self.used.get()
    }

    pub fn remaining(&self) -> Option<usize> {
        self.budget.map(|budget| budget.saturating_sub(self.used.get()))
    }

    /// Reserve `bytes`, failing without side effects when over budget.
    pub fn charge(&self, bytes: usize) -> Result<()> {
        if let Some(remaining) = self.remaining()
            && bytes > remaining
        {
            return Err(ReportError::AllocationFailure {
                requested: bytes,
                remaining,
            });
        }
        self.used.set(self.used.get().saturating_add(bytes));
        Ok(())
    }

    /// Copy `text` into a report-owned string.
    pub fn alloc_str(&self, text: &str) -> Result<String> {
        self.charge(text.len())?;
        Ok(text.to_string())
    }

    /// Take ownership of an already formatted string.
    pub fn adopt(&self, text: String) -> Result<String> {
        self.charge(text.len())?;
        Ok(text)
    }

    /// Account for a fixed-width binary sort key.
    pub fn charge_sort_key(&self) -> Result<()> {
        self.charge(std::mem::size_of::<u64>())
    }
}
