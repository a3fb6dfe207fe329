use std::path::Path;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::codec::error::DecodeError;
use crate::decoder::decode_device;
use crate::payload::PayloadError;
use crate::record::DecodedRecord;
use crate::registry::DeviceResolver;
use crate::source::{JsonLinesSource, SourceError, Uplink, UplinkSource};
use crate::{DEFAULT_GENERATED_AT, InputInfo, Report, UplinkResult, UplinkSummary, make_stub_report};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Why a single uplink produced no record.
#[derive(Debug, Error)]
pub enum UplinkError {
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Decode every uplink of a JSON Lines file into a report.
///
/// # Errors
/// Returns `BatchError` when the file cannot be read; per-uplink failures are
/// recorded in the report instead.
pub fn decode_uplinks_file<D: DeviceResolver>(
    path: &Path,
    resolver: &D,
) -> Result<Report, BatchError> {
    let source = JsonLinesSource::open(path)?;
    let input = InputInfo {
        path: path.display().to_string(),
        bytes: path.metadata()?.len(),
    };
    decode_source(input, source, resolver)
}

pub fn decode_source<S: UplinkSource, D: DeviceResolver>(
    input: InputInfo,
    mut source: S,
    resolver: &D,
) -> Result<Report, BatchError> {
    let mut first_ts = None;
    let mut last_ts = None;
    let mut uplinks = Vec::new();

    while let Some(event) = source.next_uplink()? {
        let result = match event.uplink {
            Err(err) => UplinkResult {
                line: event.line,
                error: Some(err.to_string()),
                ..UplinkResult::default()
            },
            Ok(uplink) => {
                let result = decode_one(event.line, &uplink, resolver);
                if result.received_at.is_some() {
                    update_ts_bounds(&mut first_ts, &mut last_ts, uplink.received_at);
                }
                result
            }
        };
        uplinks.push(result);
    }

    let decoded = uplinks.iter().filter(|entry| entry.record.is_some()).count() as u64;
    let uplinks_total = uplinks.len() as u64;

    let mut report = make_stub_report(&input.path, input.bytes);
    report.summary = UplinkSummary {
        uplinks_total,
        decoded,
        failed: uplinks_total - decoded,
        time_start: ts_to_rfc3339(first_ts),
        time_end: ts_to_rfc3339(last_ts),
    };
    report.generated_at = report
        .summary
        .time_end
        .clone()
        .or(report.summary.time_start.clone())
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());
    report.uplinks = uplinks;
    Ok(report)
}

/// Resolve, validate and decode a single uplink.
pub fn decode_uplink<D: DeviceResolver>(
    uplink: &Uplink,
    resolver: &D,
) -> Result<DecodedRecord, UplinkError> {
    let kind = resolver.resolve(&uplink.device)?;
    let port = uplink.port()?;
    let payload = uplink.raw_payload()?;
    received_at(uplink)?;
    Ok(decode_device(kind, &payload, port)?)
}

/// RFC3339 form of the uplink's receive time; unrepresentable times are malformed.
fn received_at(uplink: &Uplink) -> Result<Option<String>, PayloadError> {
    match uplink.received_at {
        None => Ok(None),
        Some(ts) => ts_to_rfc3339(Some(ts))
            .map(Some)
            .ok_or_else(|| PayloadError::ReceivedAtOutOfRange(ts.to_string())),
    }
}

fn decode_one<D: DeviceResolver>(line: usize, uplink: &Uplink, resolver: &D) -> UplinkResult {
    let mut result = UplinkResult {
        line,
        device: Some(uplink.device.clone()),
        layout: resolver
            .resolve(&uplink.device)
            .ok()
            .map(|kind| kind.id().to_string()),
        port: uplink.port().ok().map(|port| port.0),
        received_at: received_at(uplink).ok().flatten(),
        ..UplinkResult::default()
    };
    match decode_uplink(uplink, resolver) {
        Ok(record) => result.record = Some(record),
        Err(err) => result.error = Some(err.to_string()),
    }
    result
}

fn update_ts_bounds(first: &mut Option<f64>, last: &mut Option<f64>, ts: Option<f64>) {
    let ts = match ts {
        Some(ts) if ts.is_finite() => ts,
        _ => return,
    };
    if first.is_none_or(|existing| ts < existing) {
        *first = Some(ts);
    }
    if last.is_none_or(|existing| ts > existing) {
        *last = Some(ts);
    }
}

fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let ts = ts.filter(|ts| ts.is_finite())?;
    let nanos = (ts * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::layouts::DeviceKind;
    use crate::registry::{DeviceRegistry, LayoutIds};
    use crate::record::FieldValue;

    fn input() -> InputInfo {
        InputInfo {
            path: "uplinks.jsonl".to_string(),
            bytes: 0,
        }
    }

    fn run<D: DeviceResolver>(lines: &str, resolver: &D) -> Report {
        decode_source(input(), JsonLinesSource::new(Cursor::new(lines.to_string())), resolver)
            .unwrap()
    }

    #[test]
    fn decodes_uplinks_in_input_order() {
        let lines = concat!(
            "{\"device\":\"cpu-load\",\"port\":1,\"bytes\":[0,50]}\n",
            "{\"device\":\"dht22\",\"port\":2,\"payload\":\"00000960\"}\n",
        );
        let report = run(lines, &LayoutIds);
        assert_eq!(report.summary.uplinks_total, 2);
        assert_eq!(report.summary.decoded, 2);
        assert_eq!(report.summary.failed, 0);
        assert_eq!(report.uplinks[0].layout.as_deref(), Some("cpu-load"));
        let record = report.uplinks[1].record.as_ref().unwrap();
        assert_eq!(record.get_f64("humid"), Some(24.0));
        assert_eq!(report.uplinks[1].port, Some(2));
    }

    #[test]
    fn failures_do_not_stop_the_batch() {
        let lines = concat!(
            "{\"device\":\"bme280\",\"port\":1,\"bytes\":[7,9,96]}\n",
            "garbage\n",
            "{\"device\":\"nope\",\"port\":1,\"bytes\":[0,0]}\n",
            "{\"device\":\"cpu-load\",\"port\":999,\"bytes\":[0,0]}\n",
            "{\"device\":\"cpu-load\",\"port\":1,\"bytes\":[0,300]}\n",
            "{\"device\":\"cpu-load\",\"port\":1,\"bytes\":[0,100]}\n",
        );
        let report = run(lines, &LayoutIds);
        assert_eq!(report.summary.uplinks_total, 6);
        assert_eq!(report.summary.decoded, 1);
        assert_eq!(report.summary.failed, 5);

        let errors: Vec<_> = report
            .uplinks
            .iter()
            .map(|entry| entry.error.clone().unwrap_or_default())
            .collect();
        assert!(errors[0].contains("field `humid` out of range"));
        assert!(errors[1].contains("invalid uplink JSON"));
        assert!(errors[2].contains("unknown device 'nope'"));
        assert!(errors[3].contains("port out of range"));
        assert!(errors[4].contains("byte 1 out of range"));
        assert!(errors[5].is_empty());
        assert!(report.uplinks[0].record.is_none());
        assert!(report.uplinks[1].device.is_none());
    }

    #[test]
    fn registry_resolves_configured_ids() {
        let mut registry = DeviceRegistry::new();
        registry.insert("feather-07", DeviceKind::Bme280);
        let report = run(
            "{\"device\":\"feather-07\",\"port\":1,\"bytes\":[7,9,96,9,96]}\n",
            &registry,
        );
        let entry = &report.uplinks[0];
        assert_eq!(entry.layout.as_deref(), Some("bme280"));
        let record = entry.record.as_ref().unwrap();
        assert_eq!(record.get("featherID"), Some(FieldValue::Unsigned(7)));
    }

    #[test]
    fn generated_at_follows_latest_uplink() {
        let lines = concat!(
            "{\"device\":\"cpu-load\",\"port\":1,\"bytes\":[0,1],\"received_at\":1700000010.0}\n",
            "{\"device\":\"cpu-load\",\"port\":1,\"bytes\":[0,1],\"received_at\":1700000000.0}\n",
        );
        let report = run(lines, &LayoutIds);
        assert_eq!(
            report.summary.time_start.as_deref(),
            Some("2023-11-14T22:13:20Z")
        );
        assert_eq!(report.summary.time_end.as_deref(), Some("2023-11-14T22:13:30Z"));
        assert_eq!(report.generated_at, "2023-11-14T22:13:30Z");
    }

    #[test]
    fn unrepresentable_received_at_rejects_uplink() {
        let lines = concat!(
            "{\"device\":\"cpu-load\",\"port\":1,\"bytes\":[0,1],\"received_at\":1700000000.0}\n",
            "{\"device\":\"cpu-load\",\"port\":1,\"bytes\":[0,1],\"received_at\":1e20}\n",
        );
        let report = run(lines, &LayoutIds);
        assert_eq!(report.summary.decoded, 1);
        assert_eq!(report.summary.failed, 1);
        assert_eq!(
            report.summary.time_start.as_deref(),
            Some("2023-11-14T22:13:20Z")
        );
        assert_eq!(report.summary.time_end.as_deref(), Some("2023-11-14T22:13:20Z"));
        assert_eq!(report.generated_at, "2023-11-14T22:13:20Z");

        let rejected = &report.uplinks[1];
        assert!(rejected.record.is_none());
        assert!(rejected.received_at.is_none());
        let error = rejected.error.as_deref().unwrap();
        assert!(error.contains("received_at out of range"), "{error}");
    }

    #[test]
    fn generated_at_defaults_without_timestamps() {
        let report = run("{\"device\":\"cpu-load\",\"port\":1,\"bytes\":[0,1]}\n", &LayoutIds);
        assert_eq!(report.generated_at, DEFAULT_GENERATED_AT);
        assert!(report.summary.time_start.is_none());
    }

    #[test]
    fn decode_uplink_combines_all_checks() {
        let uplink = Uplink {
            device: "dht22-semifloat".to_string(),
            port: 3,
            bytes: None,
            payload: Some("7c007a00".to_string()),
            received_at: None,
        };
        let record = decode_uplink(&uplink, &LayoutIds).unwrap();
        assert_eq!(record.get_f64("degreesC"), Some(50.0));
        assert_eq!(record.get_f64("humidity"), Some(25.0));
    }
}
