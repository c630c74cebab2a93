// SPDX-License-Identifier: GPL-3.0-only

//! Live volume state read through the `dmsetup` tool and sysfs.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use storage_types::{LiveState, LogicalVolume, LvInfo, PercentReading, VolumeGroup};

use crate::{Result, SysError};

const DMSETUP: &str = "dmsetup";

/// Layer suffix of the hidden pool device under a thin pool.
const THIN_POOL_LAYER: &str = "tpool";

/// Device-mapper name of a volume: each name has its dashes doubled and the
/// parts are joined with single dashes.
pub fn dm_name(vg: &str, lv: &str, layer: Option<&str>) -> String {
    let mut name = format!("{}-{}", vg.replace('-', "--"), lv.replace('-', "--"));
    if let Some(layer) = layer {
        name.push('-');
        name.push_str(layer);
    }
    name
}

fn parse_tabbed_line(line: &str) -> Vec<String> {
    line.split('\t')
        .map(|part| part.trim().to_string())
        .collect()
}

/// Parse one `dmsetup info -c -o name,major,minor,attr,open` row.
fn parse_info(output: &str) -> Option<LvInfo> {
    let line = output.lines().map(str::trim).find(|line| !line.is_empty())?;
    let cols = parse_tabbed_line(line);
    if cols.len() < 5 {
        return None;
    }

    // attr is four characters: live table, inactive table, suspended, r/w
    let attr: Vec<char> = cols[3].chars().collect();
    if attr.len() < 4 {
        return None;
    }

    Some(LvInfo {
        exists: true,
        live_table: attr[0] == 'L',
        inactive_table: attr[1] == 'I',
        suspended: attr[2] == 's',
        read_only: attr[3] == 'r',
        major: cols[1].parse().ok()?,
        minor: cols[2].parse().ok()?,
        open_count: cols[4].parse().ok()?,
    })
}

/// One target line of `dmsetup status`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StatusLine {
    length: u64,
    target: String,
    params: Vec<String>,
}

fn parse_status(output: &str) -> Vec<StatusLine> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let _start: u64 = parts.next()?.parse().ok()?;
            let length = parts.next()?.parse().ok()?;
            let target = parts.next()?.to_string();
            Some(StatusLine {
                length,
                target,
                params: parts.map(str::to_string).collect(),
            })
        })
        .collect()
}

fn ratio(token: &str) -> Option<(u64, u64)> {
    let (numerator, denominator) = token.split_once('/')?;
    Some((numerator.parse().ok()?, denominator.parse().ok()?))
}

fn percent_of(numerator: u64, denominator: u64) -> PercentReading {
    if denominator == 0 {
        return PercentReading::Value(100.0);
    }
    PercentReading::Value(numerator as f64 * 100.0 / denominator as f64)
}

/// Sum the ratios picked out of every line of a target, or report the first
/// invalid line.
fn summed_percent<F>(lines: &[StatusLine], targets: &[&str], pick: F) -> Option<PercentReading>
where
    F: Fn(&StatusLine) -> Option<std::result::Result<(u64, u64), PercentReading>>,
{
    let mut numerator = 0_u64;
    let mut denominator = 0_u64;
    let mut seen = false;

    for line in lines.iter().filter(|line| targets.contains(&line.target.as_str())) {
        match pick(line)? {
            Ok((num, den)) => {
                numerator = numerator.saturating_add(num);
                denominator = denominator.saturating_add(den);
                seen = true;
            }
            Err(reading) => return Some(reading),
        }
    }

    seen.then(|| percent_of(numerator, denominator))
}

fn snapshot_percent(lines: &[StatusLine]) -> Option<PercentReading> {
    summed_percent(lines, &["snapshot", "snapshot-merge"], |line| {
        let first = line.params.first()?;
        match first.as_str() {
            "Invalid" => Some(Err(PercentReading::Invalid)),
            "Merge" => Some(Err(PercentReading::MergeFailed)),
            token => ratio(token).map(Ok),
        }
    })
}

fn thin_pool_percent(lines: &[StatusLine], metadata: bool) -> Option<PercentReading> {
    summed_percent(lines, &["thin-pool"], |line| {
        // <transaction id> <used meta>/<total meta> <used data>/<total data> ...
        let index = if metadata { 1 } else { 2 };
        match line.params.first().map(String::as_str) {
            Some("Fail") | Some("Error") => Some(Err(PercentReading::Invalid)),
            _ => ratio(line.params.get(index)?).map(Ok),
        }
    })
}

fn thin_percent(lines: &[StatusLine]) -> Option<PercentReading> {
    summed_percent(lines, &["thin"], |line| {
        // <mapped sectors> <highest mapped sector>
        match line.params.first().map(String::as_str) {
            Some("Fail") | Some("Error") => Some(Err(PercentReading::Invalid)),
            Some(mapped) => Some(Ok((mapped.parse().ok()?, line.length))),
            None => None,
        }
    })
}

fn mirror_percent(lines: &[StatusLine]) -> Option<PercentReading> {
    summed_percent(lines, &["mirror"], |line| {
        // <#mirrors> <dev>... <in sync>/<total> ...
        let legs: usize = line.params.first()?.parse().ok()?;
        ratio(line.params.get(legs + 1)?).map(Ok)
    })
}

/// Fields of a `raid` status line.
#[derive(Debug, Clone, PartialEq)]
struct RaidStatus {
    percent: PercentReading,
    sync_action: Option<String>,
    mismatch_count: Option<u64>,
}

fn raid_status(lines: &[StatusLine]) -> Option<RaidStatus> {
    // <level> <#devs> <health chars> <in sync>/<total> [<action> <mismatches>]
    let line = lines.iter().find(|line| line.target == "raid")?;
    let (numerator, denominator) = ratio(line.params.get(3)?)?;
    Some(RaidStatus {
        percent: percent_of(numerator, denominator),
        sync_action: line.params.get(4).cloned(),
        mismatch_count: line.params.get(5).and_then(|count| count.parse().ok()),
    })
}

fn run_command(command: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(command).args(args).output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("does not exist") {
            return Err(SysError::DeviceNotFound(args.last().unwrap_or(&"").to_string()));
        }
        return Err(SysError::OperationFailed(format!(
            "{command} failed: {}",
            stderr.trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// [`LiveState`] backed by `dmsetup` and `/sys/dev/block`.
#[derive(Debug, Clone)]
pub struct DmsetupLiveState {
    sysfs_root: PathBuf,
}

impl DmsetupLiveState {
    /// Locate `dmsetup`; fails when the tooling is not installed or the
    /// `lvm-tools` feature is disabled.
    pub fn detect() -> Result<Self> {
        if !cfg!(feature = "lvm-tools") {
            return Err(SysError::ToolMissing(DMSETUP.to_string()));
        }

        which::which(DMSETUP).map_err(|_| SysError::ToolMissing(DMSETUP.to_string()))?;

        if unsafe { libc::geteuid() } != 0 {
            tracing::warn!("not running as root; device-mapper queries will likely fail");
        }

        Ok(Self {
            sysfs_root: PathBuf::from("/sys"),
        })
    }

    fn info(&self, name: &str) -> Option<LvInfo> {
        let output = run_command(
            DMSETUP,
            &[
                "info",
                "-c",
                "--noheadings",
                "--separator",
                "\t",
                "-o",
                "name,major,minor,attr,open",
                name,
            ],
        );

        match output {
            Ok(output) => parse_info(&output),
            Err(SysError::DeviceNotFound(_)) => Some(LvInfo::default()),
            Err(error) => {
                tracing::debug!("dmsetup info {name}: {error}");
                None
            }
        }
    }

    fn status(&self, name: &str) -> Option<Vec<StatusLine>> {
        match run_command(DMSETUP, &["status", name]) {
            Ok(output) => Some(parse_status(&output)),
            Err(error) => {
                tracing::debug!("dmsetup status {name}: {error}");
                None
            }
        }
    }

    fn volume_status(&self, vg: &VolumeGroup, lv: &LogicalVolume) -> Option<Vec<StatusLine>> {
        self.status(&dm_name(&vg.name, &lv.name, None))
    }
}

impl LiveState for DmsetupLiveState {
    fn lv_info(&self, vg: &VolumeGroup, lv: &LogicalVolume, with_layer: bool) -> Option<LvInfo> {
        let layer = (with_layer && lv.is_thin_pool()).then_some(THIN_POOL_LAYER);
        self.info(&dm_name(&vg.name, &lv.name, layer))
    }

    fn snapshot_percent(&self, vg: &VolumeGroup, lv: &LogicalVolume) -> Option<PercentReading> {
        snapshot_percent(&self.volume_status(vg, lv)?)
    }

    fn mirror_percent(&self, vg: &VolumeGroup, lv: &LogicalVolume) -> Option<PercentReading> {
        mirror_percent(&self.volume_status(vg, lv)?)
    }

    fn raid_percent(&self, vg: &VolumeGroup, lv: &LogicalVolume) -> Option<PercentReading> {
        raid_status(&self.volume_status(vg, lv)?).map(|status| status.percent)
    }

    fn thin_pool_percent(
        &self,
        vg: &VolumeGroup,
        lv: &LogicalVolume,
        metadata: bool,
    ) -> Option<PercentReading> {
        let lines = self.status(&dm_name(&vg.name, &lv.name, Some(THIN_POOL_LAYER)))?;
        thin_pool_percent(&lines, metadata)
    }

    fn thin_percent(&self, vg: &VolumeGroup, lv: &LogicalVolume) -> Option<PercentReading> {
        thin_percent(&self.volume_status(vg, lv)?)
    }

    fn raid_sync_action(&self, vg: &VolumeGroup, lv: &LogicalVolume) -> Option<String> {
        raid_status(&self.volume_status(vg, lv)?)?.sync_action
    }

    fn raid_mismatch_count(&self, vg: &VolumeGroup, lv: &LogicalVolume) -> Option<u64> {
        raid_status(&self.volume_status(vg, lv)?)?.mismatch_count
    }

    fn kernel_read_ahead(&self, vg: &VolumeGroup, lv: &LogicalVolume) -> Option<u32> {
        let info = self.lv_info(vg, lv, false)?;
        if !info.exists {
            return None;
        }

        let path = self
            .sysfs_root
            .join(format!("dev/block/{}:{}/queue/read_ahead_kb", info.major, info.minor));
        let kib: u32 = fs::read_to_string(&path).ok()?.trim().parse().ok()?;
        Some(kib.saturating_mul(2))
    }
}
