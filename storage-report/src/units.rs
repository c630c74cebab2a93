// SPDX-License-Identifier: GPL-3.0-only

//! Size formatting in LVM unit letters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReportError;

const SECTOR_SIZE: u128 = 512;
const LETTERS: [char; 7] = ['B', 'k', 'm', 'g', 't', 'p', 'e'];

/// Unit selection, written as a single letter: `h`/`H` pick a unit per value
/// (1024- and 1000-based), `b` and `s` are bytes and sectors, `k m g t p e`
/// are fixed 1024-based units and their upper-case forms 1000-based ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SizeUnits {
    Human { si: bool },
    Bytes,
    Sectors,
    Fixed { power: u8, si: bool },
}

impl Default for SizeUnits {
    fn default() -> Self {
        SizeUnits::Human { si: false }
    }
}

impl FromStr for SizeUnits {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(letter), None) = (chars.next(), chars.next()) else {
            return Err(ReportError::InvalidUnits(s.to_string()));
        };

        let units = match letter {
            'h' => SizeUnits::Human { si: false },
            'H' => SizeUnits::Human { si: true },
            'b' | 'B' => SizeUnits::Bytes,
            's' | 'S' => SizeUnits::Sectors,
            other => {
                let power = LETTERS
                    .iter()
                    .skip(1)
                    .position(|candidate| *candidate == other.to_ascii_lowercase())
                    .ok_or_else(|| ReportError::InvalidUnits(s.to_string()))?;
                SizeUnits::Fixed {
                    power: power as u8 + 1,
                    si: other.is_ascii_uppercase(),
                }
            }
        };
        Ok(units)
    }
}

impl TryFrom<String> for SizeUnits {
    type Error = ReportError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SizeUnits> for String {
    fn from(units: SizeUnits) -> Self {
        units.to_string()
    }
}

impl fmt::Display for SizeUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match *self {
            SizeUnits::Human { si: false } => 'h',
            SizeUnits::Human { si: true } => 'H',
            SizeUnits::Bytes => 'b',
            SizeUnits::Sectors => 's',
            SizeUnits::Fixed { power, si } => unit_letter(power, si),
        };
        write!(f, "{letter}")
    }
}

fn unit_letter(power: u8, si: bool) -> char {
    let letter = LETTERS[usize::from(power).min(LETTERS.len() - 1)];
    if si { letter.to_ascii_uppercase() } else { letter }
}

fn base(si: bool) -> u128 {
    if si { 1000 } else { 1024 }
}

/// Render a size given in sectors.
pub fn display_size(sectors: u64, units: SizeUnits, suffix: bool) -> String {
    let fixed_letter = match units {
        SizeUnits::Human { .. } => None,
        SizeUnits::Bytes => Some('B'),
        SizeUnits::Sectors => Some('S'),
        SizeUnits::Fixed { power, si } => Some(unit_letter(power, si)),
    };

    if sectors == 0 {
        return match fixed_letter {
            Some(letter) if suffix => format!("0{letter}"),
            _ => "0".to_string(),
        };
    }

    let bytes = u128::from(sectors) * SECTOR_SIZE;
    let (divisor, letter) = match units {
        SizeUnits::Bytes => (1, 'B'),
        SizeUnits::Sectors => (SECTOR_SIZE, 'S'),
        SizeUnits::Fixed { power, si } => (base(si).pow(u32::from(power)), unit_letter(power, si)),
        SizeUnits::Human { si } => {
            let mut power = LETTERS.len() as u8 - 1;
            while power > 0 && base(si).pow(u32::from(power)) > bytes {
                power -= 1;
            }
            (base(si).pow(u32::from(power)), unit_letter(power, si))
        }
    };

    let precision = if bytes % divisor == 0 && divisor <= SECTOR_SIZE { 0 } else { 2 };
    let value = bytes as f64 / divisor as f64;
    if suffix {
        format!("{value:.precision$}{letter}")
    } else {
        format!("{value:.precision$}")
    }
}
