use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use loradec_core::{
    BatchError, JsonLinesSource, LayoutIds, SourceError, UplinkSource, decode_uplinks_file,
};

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

#[test]
fn jsonl_source_reads_uplinks_from_fixture() {
    let path = repo_root()
        .join("tests")
        .join("golden")
        .join("mixed")
        .join("input.jsonl");
    let mut source = JsonLinesSource::open(&path).unwrap();

    let mut uplinks = 0;
    while let Some(event) = source.next_uplink().unwrap() {
        assert!(event.uplink.is_ok(), "line {} should parse", event.line);
        uplinks += 1;
    }

    assert_eq!(uplinks, 5);
}

#[test]
fn batch_reports_missing_file_as_source_error() {
    let mut path = std::env::temp_dir();
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    path.push(format!("loradec_missing_{unique}.jsonl"));

    let err = decode_uplinks_file(&path, &LayoutIds).unwrap_err();
    assert!(matches!(err, BatchError::Source(SourceError::Io(_))));
}

#[test]
fn batch_records_input_size() {
    let mut path = std::env::temp_dir();
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    path.push(format!("loradec_size_{unique}.jsonl"));
    let body = "{\"device\":\"cpu-load\",\"port\":1,\"bytes\":[0,50]}\n";
    fs::write(&path, body).unwrap();

    let report = decode_uplinks_file(&path, &LayoutIds).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(report.input.bytes, body.len() as u64);
    assert_eq!(report.summary.decoded, 1);
}
