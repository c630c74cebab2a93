// SPDX-License-Identifier: GPL-3.0-only

mod common;

use serde_json::Value;
use storage_report::{
    FieldErrorPolicy, OutputFormat, Report, ReportConfig, ReportError, ReportType,
};
use storage_types::{LiveVolume, MetadataSnapshot, NoActivation};

use common::{live, plain_config, run, snapshot};

#[test]
fn default_lv_report() {
    let lines = run(ReportType::Lvs, None, None, &plain_config());

    assert_eq!(
        lines,
        vec![
            "LV,VG,Attr,LSize,Pool,Origin,Data%,Move,Log,Cpy%Sync,Convert",
            "home,vg0,owi-a-,800.00m,,,,,,,",
            "home_snap,vg0,swi-a-,200.00m,,home,12.50,,,,",
            "pool,vg0,-wi-a-,400.00m,,,40.00,,,,",
            "root,vg0,-wi-ao,3.91g,,,,,,,",
            "thin1,vg0,-wi-a-,1.00g,pool,,75.00,,,,",
        ]
    );
}

#[test]
fn sizes_sort_by_magnitude_not_text() {
    let config = ReportConfig {
        headings: false,
        ..plain_config()
    };
    let lines = run(ReportType::Lvs, Some("lv_name,lv_size"), Some("-lv_size"), &config);

    assert_eq!(
        lines,
        vec![
            "root,3.91g",
            "thin1,1.00g",
            "home,800.00m",
            "pool,400.00m",
            "home_snap,200.00m",
        ]
    );
}

#[test]
fn internal_volumes_sort_by_their_bare_names() {
    let config = ReportConfig {
        all_volumes: true,
        headings: false,
        ..plain_config()
    };
    let lines = run(ReportType::Lvs, Some("lv_name,lv_attr"), Some("lv_name"), &config);

    assert_eq!(
        lines,
        vec![
            "home,owi-a-",
            "home_snap,swi-a-",
            "[lvol0],-wi---",
            "pool,-wi-a-",
            "[pool_tdata],-wi---",
            "[pool_tmeta],-wi---",
            "root,-wi-ao",
            "thin1,-wi-a-",
        ]
    );
}

#[test]
fn thin_pool_references() {
    let config = ReportConfig {
        headings: false,
        ..plain_config()
    };
    let lines = run(
        ReportType::Lvs,
        Some("lv_name,data_lv,metadata_lv,lv_metadata_size,metadata_percent"),
        Some("lv_name"),
        &config,
    );

    assert!(lines.contains(&"pool,[pool_tdata],[pool_tmeta],4.00m,4.50".to_string()));
    assert!(lines.contains(&"thin1,,,,".to_string()));
}

#[test]
fn orphan_pvs_report_an_empty_group() {
    let lines = run(ReportType::Pvs, None, None, &plain_config());

    assert_eq!(
        lines,
        vec![
            "PV,VG,Fmt,Attr,PSize,PFree",
            "/dev/sda2,vg0,lvm2,a--,5.00g,320.00m",
            "/dev/sdb,vg0,lvm2,a--,5.00g,4.40g",
            "/dev/sdc,,lvm2,---,1.00g,1.00g",
        ]
    );
}

#[test]
fn segment_columns_turn_an_lv_report_into_a_segment_report() {
    let config = ReportConfig {
        headings: false,
        ..plain_config()
    };
    let lines = run(
        ReportType::Lvs,
        Some("lv_name,segtype,seg_start_pe,devices"),
        None,
        &config,
    );

    assert_eq!(
        lines,
        vec![
            "home,linear,0,/dev/sda2(1000)",
            "home_snap,snapshot,0,/dev/sdb(0)",
            "pool,thin-pool,0,pool_tdata(0)",
            "root,linear,0,/dev/sda2(0)",
            "thin1,thin,0,",
        ]
    );
}

#[test]
fn pv_segments_map_back_to_volumes() {
    let config = ReportConfig {
        headings: false,
        ..plain_config()
    };
    let lines = run(
        ReportType::Pvs,
        Some("pv_name,pvseg_start,pvseg_size,lv_name,segtype"),
        None,
        &config,
    );

    assert_eq!(
        lines,
        vec![
            "/dev/sda2,0,1000,root,linear",
            "/dev/sda2,1000,200,home,linear",
            "/dev/sda2,1200,80,,",
            "/dev/sdb,0,50,home_snap,snapshot",
            "/dev/sdb,50,100,[pool_tdata],linear",
            "/dev/sdb,150,1,[pool_tmeta],linear",
            "/dev/sdb,151,1,[lvol0],linear",
            "/dev/sdb,152,1127,,",
        ]
    );
}

#[test]
fn aligned_columns() {
    let lines = run(ReportType::Vgs, Some("vg_name,vg_free"), None, &ReportConfig::default());
    assert_eq!(lines, vec!["VG      VFree", "vg0  1020.00m"]);
}

#[test]
fn unbuffered_rows_use_the_column_widths() {
    let config = ReportConfig {
        buffered: false,
        ..Default::default()
    };
    let lines = run(ReportType::Vgs, Some("vg_name,vg_free"), None, &config);
    assert_eq!(lines, vec!["VG   VFree", "vg0  1020.00m"]);
}

#[test]
fn name_prefixes() {
    let config = ReportConfig {
        field_name_prefix: true,
        ..Default::default()
    };
    let lines = run(ReportType::Vgs, Some("vg_name,vg_attr"), None, &config);
    assert_eq!(lines, vec!["LVM2_VG_NAME='vg0' LVM2_VG_ATTR='wz--n-'"]);

    let config = ReportConfig {
        quoted: false,
        ..config
    };
    let lines = run(ReportType::Vgs, Some("vg_name,vg_attr"), None, &config);
    assert_eq!(lines, vec!["LVM2_VG_NAME=vg0 LVM2_VG_ATTR=wz--n-"]);
}

#[test]
fn columns_as_rows() {
    let config = ReportConfig {
        columns_as_rows: true,
        ..plain_config()
    };
    let lines = run(ReportType::Vgs, Some("vg_name,pv_count,vg_free"), None, &config);
    assert_eq!(lines, vec!["VG,vg0", "#PV,2", "VFree,1020.00m"]);
}

#[test]
fn json_output() {
    let config = ReportConfig {
        output: OutputFormat::Json,
        ..Default::default()
    };
    let lines = run(
        ReportType::Vgs,
        Some("vg_name,vg_uuid,vg_attr,vg_free,lv_count,snap_count"),
        None,
        &config,
    );

    let document: Value = serde_json::from_str(&lines.join("\n")).expect("valid json");
    let vg = &document["report"][0]["vg"][0];
    assert_eq!(vg["vg_name"], "vg0");
    assert_eq!(vg["vg_uuid"], "Vg0aaa-BBBB-cccc-DDDD-eeee-FFFF-gggggg");
    assert_eq!(vg["vg_attr"], "wz--n-");
    assert_eq!(vg["vg_free"], "1020.00m");
    assert_eq!(vg["lv_count"], "4");
    assert_eq!(vg["snap_count"], "1");
}

#[test]
fn config_file_drives_rendering() {
    let config = ReportConfig::from_toml_str(
        r#"
        aligned = false
        headings = false
        separator = "|"
        units = "m"
        suffix = false
        "#,
    )
    .expect("config");
    let lines = run(ReportType::Vgs, Some("vg_name,vg_free"), None, &config);
    assert_eq!(lines, vec!["vg0|1020.00"]);
}

fn bad_pv_snapshot() -> MetadataSnapshot {
    let mut snapshot = snapshot();
    snapshot.vgs[0].pvs[1].id = "not-an-lvm-id".to_string();
    snapshot
}

#[test]
fn field_errors_abort_by_default() {
    let config = plain_config();
    let mut report = Report::new(
        ReportType::Pvs,
        Some("pv_name,pv_uuid"),
        None,
        &config,
        &NoActivation,
        Vec::new(),
    )
    .expect("report");

    let error = report.add_snapshot(&bad_pv_snapshot()).expect_err("malformed id");
    let ReportError::Field { field, source } = error else {
        panic!("error should name the failing field");
    };
    assert_eq!(field, "pv_uuid");
    assert!(matches!(*source, ReportError::InvalidIdentifier(_)));
}

#[test]
fn field_errors_can_be_marked() {
    let config = ReportConfig {
        on_field_error: FieldErrorPolicy::Mark,
        headings: false,
        ..plain_config()
    };
    let mut report = Report::new(
        ReportType::Pvs,
        Some("pv_name,pv_uuid"),
        None,
        &config,
        &NoActivation,
        Vec::new(),
    )
    .expect("report");
    report.add_snapshot(&bad_pv_snapshot()).expect("marked rows");
    let out = String::from_utf8(report.render().expect("render")).expect("utf8");

    assert!(out.lines().any(|line| line == "/dev/sdb,ERROR"));
    assert!(out.lines().any(|line| line == "/dev/sdc,"));
}

#[test]
fn exhausted_budget_fails_even_when_marking() {
    let config = ReportConfig {
        memory_budget: Some(16),
        on_field_error: FieldErrorPolicy::Mark,
        ..Default::default()
    };
    let snapshot = snapshot();
    let mut report =
        Report::new(ReportType::Vgs, None, None, &config, &NoActivation, Vec::new()).expect("report");

    let error = report.add_snapshot(&snapshot).expect_err("budget exceeded");
    assert!(matches!(
        error,
        ReportError::Field { ref source, .. }
            if matches!(**source, ReportError::AllocationFailure { .. })
    ));
    assert!(report.memory_used() <= 16);
}

#[test]
fn mapped_thin_volume_without_usage_is_an_error() {
    let snapshot = snapshot();
    let mut live = live();
    live.insert("vg0", "thin1", LiveVolume {
        info: Some(common::active(0)),
        ..Default::default()
    });
    let config = plain_config();
    let mut report =
        Report::new(ReportType::Lvs, None, None, &config, &live, Vec::new()).expect("report");

    let error = report.add_snapshot(&snapshot).expect_err("thin usage missing");
    assert!(matches!(
        error,
        ReportError::Field { field: "data_percent", ref source }
            if matches!(**source, ReportError::LiveQuery { .. })
    ));
}

#[test]
fn rendering_is_deterministic() {
    let config = ReportConfig::default();
    let options = Some("+lv_uuid,lv_path,lv_read_ahead,lv_kernel_major,origin_size,modules");
    let first = run(ReportType::Lvs, options, None, &config);
    let second = run(ReportType::Lvs, options, None, &config);
    assert_eq!(first, second);
}
