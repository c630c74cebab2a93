// SPDX-License-Identifier: GPL-3.0-only

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use storage_report::{
    OutputFormat, Report, ReportConfig, ReportType, SizeUnits, write_field_help,
};
use storage_types::{LiveState, MetadataSnapshot, NoActivation, StaticLiveState};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Parser)]
#[command(name = "lvm-report")]
#[command(about = "Report on LVM volume groups, volumes, physical volumes and segments")]
struct Args {
    /// lvs, vgs, pvs, segs or pvsegs
    #[arg(required_unless_present = "list_fields")]
    report: Option<ReportType>,

    /// JSON metadata snapshot: { "vgs": [...], "orphans": [...], "live": {...} }
    #[arg(long, required_unless_present = "list_fields")]
    metadata: Option<PathBuf>,

    /// Columns to show; a leading '+' appends to the defaults
    #[arg(short = 'o', long)]
    options: Option<String>,

    /// Sort keys; prefix a key with '-' to reverse it
    #[arg(short = 'O', long)]
    sort: Option<String>,

    #[arg(long)]
    units: Option<SizeUnits>,

    #[arg(long)]
    nosuffix: bool,

    /// Column separator; turns alignment off unless --aligned is given
    #[arg(long)]
    separator: Option<String>,

    #[arg(long)]
    aligned: bool,

    #[arg(long)]
    noheadings: bool,

    #[arg(long)]
    unbuffered: bool,

    #[arg(long)]
    nameprefixes: bool,

    #[arg(long)]
    rows: bool,

    #[arg(long)]
    unquoted: bool,

    #[arg(long)]
    json: bool,

    /// Include volumes LVM keeps for internal use
    #[arg(short = 'a', long)]
    all: bool,

    /// TOML report settings; flags override file values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where activation state comes from
    #[arg(long, value_enum, default_value_t = LiveSource::Snapshot)]
    live: LiveSource,

    /// Describe every column and exit
    #[arg(long)]
    list_fields: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LiveSource {
    /// Treat every volume as inactive
    None,
    /// Use the "live" table of the metadata snapshot
    Snapshot,
    /// Query device-mapper on this host
    Dmsetup,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SnapshotFile {
    #[serde(flatten)]
    metadata: MetadataSnapshot,
    live: StaticLiveState,
}

impl Args {
    fn apply(&self, config: &mut ReportConfig) {
        if let Some(units) = self.units {
            config.units = units;
        }
        if self.nosuffix {
            config.suffix = false;
        }
        if let Some(separator) = &self.separator {
            config.separator.clone_from(separator);
            config.aligned = self.aligned;
        }
        if self.aligned {
            config.aligned = true;
        }
        if self.noheadings {
            config.headings = false;
        }
        if self.unbuffered {
            config.buffered = false;
        }
        if self.nameprefixes {
            config.field_name_prefix = true;
        }
        if self.rows {
            config.columns_as_rows = true;
        }
        if self.unquoted {
            config.quoted = false;
        }
        if self.json {
            config.output = OutputFormat::Json;
        }
        if self.all {
            config.all_volumes = true;
        }
    }
}

#[cfg(feature = "dmsetup")]
fn dmsetup_state() -> Result<Box<dyn LiveState>> {
    let state = storage_sys::DmsetupLiveState::detect().context("dmsetup is unavailable")?;
    Ok(Box::new(state))
}

#[cfg(not(feature = "dmsetup"))]
fn dmsetup_state() -> Result<Box<dyn LiveState>> {
    anyhow::bail!("lvm-report was built without dmsetup support")
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lvm_report=info,warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if args.list_fields {
        write_field_help(&mut io::stdout().lock())?;
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::default(),
    };
    args.apply(&mut config);

    let report_type = args.report.context("a report type is required")?;
    let path = args.metadata.as_ref().context("--metadata is required")?;
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let snapshot: SnapshotFile = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a metadata snapshot", path.display()))?;

    let live: Box<dyn LiveState> = match args.live {
        LiveSource::None => Box::new(NoActivation),
        LiveSource::Snapshot => Box::new(snapshot.live),
        LiveSource::Dmsetup => dmsetup_state()?,
    };

    let mut report = Report::new(
        report_type,
        args.options.as_deref(),
        args.sort.as_deref(),
        &config,
        live.as_ref(),
        BufWriter::new(io::stdout().lock()),
    )?;
    debug!(
        report = %report.report_type(),
        vgs = snapshot.metadata.vgs.len(),
        orphans = snapshot.metadata.orphans.len(),
        "running report"
    );

    report.add_snapshot(&snapshot.metadata)?;
    report.render()?.flush()?;
    Ok(())
}
