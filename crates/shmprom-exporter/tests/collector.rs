//! Ingestion and persistence behavior of the snapshot collector.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::sync::Arc;
use std::thread;

use chrono::{TimeZone, Utc};

use shmprom_core::metrics::{MetricField, MetricsSnapshot, SessionHandle, ShareMemoryMetrics};
use shmprom_core::ErrorClass;
use shmprom_exporter::persist;
use shmprom_exporter::{MetricsRegistry, SessionMonitor, SnapshotCollector};

fn collector_in(dir: &std::path::Path) -> SnapshotCollector {
    let registry = Arc::new(MetricsRegistry::new(None).unwrap());
    SnapshotCollector::new(registry, dir)
}

#[test]
fn starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let c = collector_in(dir.path());
    assert!(c.latest().is_empty());
    assert_eq!(c.ingested(), 0);
    assert_eq!(c.last_session(), None);
}

#[test]
fn reference_snapshot_lands_in_both_sinks() {
    let dir = tempfile::tempdir().unwrap();
    let c = collector_in(dir.path());
    let (p, s, m) = common::reference_groups();

    c.on_snapshot(&p, &s, &m, &SessionHandle(1));

    let latest = c.latest();
    assert_eq!(latest.len(), MetricField::COUNT);
    assert_eq!(latest["receivedSyncEvents"], 10.0);
    assert_eq!(latest["sentSyncEvents"], 20.0);
    assert_eq!(latest["outboundBytes"], 30.0);
    assert_eq!(latest["inboundBytes"], 40.0);
    assert_eq!(latest["sendQueueDepth"], 50.0);
    assert_eq!(latest["receiveQueueDepth"], 60.0);
    assert_eq!(latest["shmAllocErrors"], 1.0);
    assert_eq!(latest["fallbackWrites"], 2.0);
    assert_eq!(latest["fallbackReads"], 3.0);
    assert_eq!(latest["eventConnErrors"], 4.0);
    assert_eq!(latest["queueFullErrors"], 5.0);
    assert_eq!(latest["activeStreams"], 6.0);
    assert_eq!(latest["hotRestartSuccesses"], 7.0);
    assert_eq!(latest["hotRestartFailures"], 8.0);
    assert_eq!(latest["capacityBytes"], 1_048_576.0);
    assert_eq!(latest["inUseBytes"], 524_288.0);

    for field in MetricField::ALL {
        assert_eq!(
            c.registry().gauge_value(field),
            Some(latest[field.key()]),
            "gauge and map disagree on {field}"
        );
    }
    assert_eq!(c.last_session(), Some(SessionHandle(1)));
    assert_eq!(c.ingested(), 1);
}

#[test]
fn sinks_can_be_driven_separately() {
    let dir = tempfile::tempdir().unwrap();
    let c = collector_in(dir.path());
    let (p, s, m) = common::reference_groups();
    let snap = MetricsSnapshot::new(&p, &s, &m);

    c.publish_gauges(&snap);
    assert!(c.latest().is_empty());
    assert_eq!(c.registry().gauge_value(MetricField::OutboundBytes), Some(30.0));

    let fresh = collector_in(dir.path());
    fresh.record_latest(&snap, SessionHandle(9));
    assert_eq!(fresh.latest_value("outboundBytes"), Some(30.0));
    assert_eq!(fresh.registry().gauge_value(MetricField::OutboundBytes), Some(0.0));
}

#[test]
fn last_write_wins() {
    let dir = tempfile::tempdir().unwrap();
    let c = collector_in(dir.path());
    let (p, s, m) = common::reference_groups();
    c.on_snapshot(&p, &s, &m, &SessionHandle(1));

    let mut p2 = p;
    p2.receive_sync_event_count = 11;
    let m2 = ShareMemoryMetrics {
        capacity_of_share_memory_in_bytes: 2048,
        all_in_used_share_memory_in_bytes: 0,
    };
    c.on_snapshot(&p2, &s, &m2, &SessionHandle(1));

    assert_eq!(c.latest().len(), MetricField::COUNT);
    assert_eq!(c.latest_value("receivedSyncEvents"), Some(11.0));
    assert_eq!(c.latest_value("capacityBytes"), Some(2048.0));
    assert_eq!(c.latest_value("inUseBytes"), Some(0.0));
    assert_eq!(c.registry().gauge_value(MetricField::InUseBytes), Some(0.0));
    assert_eq!(c.ingested(), 2);
}

#[test]
fn session_monitor_trait_delegates() {
    let dir = tempfile::tempdir().unwrap();
    let c = Arc::new(collector_in(dir.path()));
    let monitor: Arc<dyn SessionMonitor> = c.clone();
    let (p, s, m) = common::reference_groups();

    monitor.on_emit_session_metrics(&p, &s, &m, &SessionHandle(3));

    assert_eq!(c.latest().len(), MetricField::COUNT);
    assert_eq!(c.last_session(), Some(SessionHandle(3)));
    assert_eq!(c.ingested(), 1);
    assert_eq!(c.registry().gauge_value(MetricField::ActiveStreams), Some(6.0));
}

#[test]
fn flush_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let c = collector_in(dir.path());
    let (p, s, m) = common::reference_groups();
    c.on_snapshot(&p, &s, &m, &SessionHandle(1));

    let ts = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
    let path = c.flush_at(&ts).unwrap();
    assert_eq!(path, dir.path().join("MonitorInfo_20240309070501.log"));

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), MetricField::COUNT);
    assert!(text.contains("receivedSyncEvents: 10.000000\n"));
    assert!(text.contains("capacityBytes: 1048576.000000\n"));

    let back = persist::read_snapshot(&path).unwrap();
    assert_eq!(back, c.latest());
}

#[test]
fn flush_uses_local_timestamp_name() {
    let dir = tempfile::tempdir().unwrap();
    let c = collector_in(dir.path());
    let (p, s, m) = common::reference_groups();
    c.on_snapshot(&p, &s, &m, &SessionHandle(1));

    let path = c.flush().unwrap();
    let name = path.file_name().unwrap().to_str().unwrap();
    let digits = name
        .strip_prefix("MonitorInfo_")
        .and_then(|r| r.strip_suffix(".log"))
        .unwrap();
    assert_eq!(digits.len(), 14);
    assert!(digits.chars().all(|c| c.is_ascii_digit()));
}

#[test]
fn flush_before_ingestion_writes_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let c = collector_in(dir.path());
    let path = c.flush().unwrap();
    assert_eq!(std::fs::read_to_string(path).unwrap(), "");
}

#[test]
fn flush_failure_is_reported_and_state_survives() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    let c = collector_in(&missing);
    let (p, s, m) = common::reference_groups();
    c.on_snapshot(&p, &s, &m, &SessionHandle(1));

    let err = c.flush().unwrap_err();
    assert_eq!(err.class(), ErrorClass::Persistence);
    assert_eq!(c.latest().len(), MetricField::COUNT);

    // ingestion is unaffected
    c.on_snapshot(&p, &s, &m, &SessionHandle(1));
    assert_eq!(c.ingested(), 2);
}

#[test]
fn concurrent_ingestion_and_flush() {
    let dir = tempfile::tempdir().unwrap();
    let c = Arc::new(collector_in(dir.path()));
    let (p, s, m) = common::reference_groups();
    c.on_snapshot(&p, &s, &m, &SessionHandle(1));

    let writer = {
        let c = Arc::clone(&c);
        thread::spawn(move || {
            for i in 0..500u64 {
                let mut p = p;
                p.send_queue_count = i;
                c.on_snapshot(&p, &s, &m, &SessionHandle(1));
            }
        })
    };
    for n in 0..20u32 {
        let ts = Utc.timestamp_opt(1_700_000_000 + i64::from(n), 0).unwrap();
        let path = c.flush_at(&ts).unwrap();
        let back = persist::read_snapshot(&path).unwrap();
        assert_eq!(back.len(), MetricField::COUNT);
    }
    writer.join().unwrap();

    assert_eq!(c.latest_value("sendQueueDepth"), Some(499.0));
}

#[test]
fn parse_line_rejects_garbage() {
    assert_eq!(
        persist::parse_line("activeStreams: 6.000000"),
        Some(("activeStreams".to_string(), 6.0))
    );
    assert_eq!(persist::parse_line("activeStreams 6"), None);
    assert_eq!(persist::parse_line(": 6.0"), None);
    assert_eq!(persist::parse_line("activeStreams: six"), None);
}
