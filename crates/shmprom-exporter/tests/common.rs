//! Shared fixtures for exporter integration tests.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::net::SocketAddr;

use shmprom_core::metrics::{PerformanceMetrics, ShareMemoryMetrics, StabilityMetrics};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

pub fn reference_groups() -> (PerformanceMetrics, StabilityMetrics, ShareMemoryMetrics) {
    (
        PerformanceMetrics {
            receive_sync_event_count: 10,
            send_sync_event_count: 20,
            out_flow_bytes: 30,
            in_flow_bytes: 40,
            send_queue_count: 50,
            receive_queue_count: 60,
        },
        StabilityMetrics {
            alloc_shm_error_count: 1,
            fallback_write_count: 2,
            fallback_read_count: 3,
            event_conn_error_count: 4,
            queue_full_error_count: 5,
            active_stream_count: 6,
            hot_restart_success_count: 7,
            hot_restart_error_count: 8,
        },
        ShareMemoryMetrics {
            capacity_of_share_memory_in_bytes: 1024 * 1024,
            all_in_used_share_memory_in_bytes: 512 * 1024,
        },
    )
}

/// Minimal HTTP/1.1 GET; returns (status code, body).
pub async fn http_get(addr: SocketAddr, path: &str) -> (u16, String) {
    let mut stream = tokio::net::TcpStream::connect(addr).await.expect("connect");
    let req = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream.write_all(req.as_bytes()).await.expect("write request");

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.expect("read response");
    let text = String::from_utf8(raw).expect("utf-8 response");

    let (head, body) = text.split_once("\r\n\r\n").expect("header terminator");
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .expect("status code");
    (status, body.to_string())
}
