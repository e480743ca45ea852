use std::fs::{self, File};
use std::io::Write;

use rstest::rstest;
use stride_config::{load_samples_csv, load_samples_jsonl};
use stride_traits::RawFix;
use tempfile::tempdir;

const HEADER: &str = "source,timestamp_ms,latitude,longitude,altitude,speed,horizontal_accuracy,vertical_accuracy,speed_accuracy";

#[rstest]
fn csv_reads_rows_and_absent_accuracies() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.csv");
    let mut f = File::create(&path).unwrap();
    writeln!(f, "{HEADER}").unwrap();
    writeln!(f, "gps,1000,0.0,0.0,10.0,2.5,3.0,4.0,0.5").unwrap();
    writeln!(f, "fused,1400,0.0001,0.0,10.5,2.4,,,").unwrap();
    drop(f);

    let rows = load_samples_csv(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].source, "gps");
    assert_eq!(rows[0].horizontal_accuracy, Some(3.0));
    assert_eq!(rows[1].horizontal_accuracy, None);
    assert_eq!(rows[1].vertical_accuracy, None);

    let fix: RawFix = rows[0].clone().into();
    assert_eq!(fix.captured_ms, 1000);
    assert_eq!(fix.speed_accuracy, Some(0.5));
}

#[rstest]
fn csv_rejects_wrong_headers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(&path, "source,time,lat,lon\ngps,1,0,0\n").unwrap();
    let err = load_samples_csv(&path).expect_err("headers must be exact");
    assert!(format!("{err}").contains("sample CSV must have headers"));
}

#[rstest]
fn csv_reports_row_number_of_bad_value() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad_row.csv");
    fs::write(
        &path,
        format!("{HEADER}\ngps,1000,0.0,0.0,1.0,0.0,3.0,,\ngps,oops,0.0,0.0,1.0,0.0,3.0,,\n"),
    )
    .unwrap();
    let err = load_samples_csv(&path).expect_err("non-numeric timestamp");
    assert!(format!("{err}").contains("invalid CSV row 3"));
}

#[rstest]
fn jsonl_skips_blank_and_comment_lines() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.jsonl");
    fs::write(
        &path,
        r#"# recorded on a phone
{"source":"gps","timestamp_ms":0,"latitude":0.0,"longitude":0.0,"altitude":5.0,"speed":0.0,"horizontal_accuracy":3.0}

{"source":"gps","timestamp_ms":2000,"latitude":0.0009,"longitude":0.0,"horizontal_accuracy":3.0,"vertical_accuracy":null}
"#,
    )
    .unwrap();
    let rows = load_samples_jsonl(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].altitude, 0.0);
    assert_eq!(rows[1].vertical_accuracy, None);
}
