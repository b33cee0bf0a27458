//! Session metric model.
//!
//! An IPC session reports three groups of plain integer counters on every
//! reporting tick. Each counter maps to exactly one [`MetricField`]; the set of
//! fields is closed and fixed for the lifetime of the process.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Throughput counters of one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PerformanceMetrics {
    pub receive_sync_event_count: u64,
    pub send_sync_event_count: u64,
    pub out_flow_bytes: u64,
    pub in_flow_bytes: u64,
    pub send_queue_count: u64,
    pub receive_queue_count: u64,
}

/// Error and stability counters of one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StabilityMetrics {
    pub alloc_shm_error_count: u64,
    pub fallback_write_count: u64,
    pub fallback_read_count: u64,
    pub event_conn_error_count: u64,
    pub queue_full_error_count: u64,
    pub active_stream_count: u64,
    pub hot_restart_success_count: u64,
    pub hot_restart_error_count: u64,
}

/// Shared memory utilization of one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShareMemoryMetrics {
    pub capacity_of_share_memory_in_bytes: u64,
    pub all_in_used_share_memory_in_bytes: u64,
}

/// Opaque identity of the session that produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionHandle(pub u64);

impl SessionHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

impl From<u64> for SessionHandle {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricGroup {
    Performance,
    Stability,
    ShareMemoryUsage,
}

impl MetricGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricGroup::Performance => "performance",
            MetricGroup::Stability => "stability",
            MetricGroup::ShareMemoryUsage => "share_memory_usage",
        }
    }

    /// Fields of this group in declaration order.
    pub fn fields(self) -> impl Iterator<Item = MetricField> {
        MetricField::ALL.into_iter().filter(move |f| f.group() == self)
    }
}

/// One of the sixteen exported metric fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricField {
    ReceivedSyncEvents,
    SentSyncEvents,
    OutboundBytes,
    InboundBytes,
    SendQueueDepth,
    ReceiveQueueDepth,

    ShmAllocErrors,
    FallbackWrites,
    FallbackReads,
    EventConnErrors,
    QueueFullErrors,
    ActiveStreams,
    HotRestartSuccesses,
    HotRestartFailures,

    CapacityBytes,
    InUseBytes,
}

impl MetricField {
    pub const COUNT: usize = 16;

    /// Every field, in declaration order.
    pub const ALL: [MetricField; Self::COUNT] = [
        MetricField::ReceivedSyncEvents,
        MetricField::SentSyncEvents,
        MetricField::OutboundBytes,
        MetricField::InboundBytes,
        MetricField::SendQueueDepth,
        MetricField::ReceiveQueueDepth,
        MetricField::ShmAllocErrors,
        MetricField::FallbackWrites,
        MetricField::FallbackReads,
        MetricField::EventConnErrors,
        MetricField::QueueFullErrors,
        MetricField::ActiveStreams,
        MetricField::HotRestartSuccesses,
        MetricField::HotRestartFailures,
        MetricField::CapacityBytes,
        MetricField::InUseBytes,
    ];

    /// Stable key used in the latest-state map and in snapshot files.
    pub fn key(self) -> &'static str {
        match self {
            MetricField::ReceivedSyncEvents => "receivedSyncEvents",
            MetricField::SentSyncEvents => "sentSyncEvents",
            MetricField::OutboundBytes => "outboundBytes",
            MetricField::InboundBytes => "inboundBytes",
            MetricField::SendQueueDepth => "sendQueueDepth",
            MetricField::ReceiveQueueDepth => "receiveQueueDepth",
            MetricField::ShmAllocErrors => "shmAllocErrors",
            MetricField::FallbackWrites => "fallbackWrites",
            MetricField::FallbackReads => "fallbackReads",
            MetricField::EventConnErrors => "eventConnErrors",
            MetricField::QueueFullErrors => "queueFullErrors",
            MetricField::ActiveStreams => "activeStreams",
            MetricField::HotRestartSuccesses => "hotRestartSuccesses",
            MetricField::HotRestartFailures => "hotRestartFailures",
            MetricField::CapacityBytes => "capacityBytes",
            MetricField::InUseBytes => "inUseBytes",
        }
    }

    /// Prometheus gauge name (without namespace).
    pub fn gauge_name(self) -> &'static str {
        match self {
            MetricField::ReceivedSyncEvents => "receive_sync_event_count",
            MetricField::SentSyncEvents => "send_sync_event_count",
            MetricField::OutboundBytes => "out_flow_bytes",
            MetricField::InboundBytes => "in_flow_bytes",
            MetricField::SendQueueDepth => "send_queue_count",
            MetricField::ReceiveQueueDepth => "receive_queue_count",
            MetricField::ShmAllocErrors => "alloc_shm_error_count",
            MetricField::FallbackWrites => "fallback_write_count",
            MetricField::FallbackReads => "fallback_read_count",
            MetricField::EventConnErrors => "event_conn_error_count",
            MetricField::QueueFullErrors => "queue_full_error_count",
            MetricField::ActiveStreams => "active_stream_count",
            MetricField::HotRestartSuccesses => "hot_restart_success_count",
            MetricField::HotRestartFailures => "hot_restart_error_count",
            MetricField::CapacityBytes => "capacity_of_share_memory",
            MetricField::InUseBytes => "all_in_used_share_memory",
        }
    }

    /// Help text published alongside the gauge.
    pub fn help(self) -> &'static str {
        match self {
            MetricField::ReceivedSyncEvents => "The SyncEvent count that session had received",
            MetricField::SentSyncEvents => "The SyncEvent count that session had sent",
            MetricField::OutboundBytes => "The out flow in bytes that session had sent",
            MetricField::InboundBytes => "The in flow in bytes that session had receive",
            MetricField::SendQueueDepth => "The pending count of send queue",
            MetricField::ReceiveQueueDepth => "The pending count of receive queue",
            MetricField::ShmAllocErrors => "The error count of allocating share memory",
            MetricField::FallbackWrites => {
                "The count of the fallback data write to unix/tcp connection"
            }
            MetricField::FallbackReads => {
                "The error count of receiving fallback data from unix/tcp connection every period"
            }
            MetricField::EventConnErrors => {
                "The error count of unix/tcp connection which usually happened in that the peer's process exit(crashed or other reason)"
            }
            MetricField::QueueFullErrors => {
                "The error count due to the IO-Queue(SendQueue or ReceiveQueue) is full which usually happened in that the peer was busy"
            }
            MetricField::ActiveStreams => "Current all active stream count",
            MetricField::HotRestartSuccesses => "The successful count of hot restart",
            MetricField::HotRestartFailures => "The failed count of hot restart",
            MetricField::CapacityBytes => "The capacity of the share memory in bytes",
            MetricField::InUseBytes => {
                "The amount of share memory in bytes that is currently in use"
            }
        }
    }

    pub fn group(self) -> MetricGroup {
        match self {
            MetricField::ReceivedSyncEvents
            | MetricField::SentSyncEvents
            | MetricField::OutboundBytes
            | MetricField::InboundBytes
            | MetricField::SendQueueDepth
            | MetricField::ReceiveQueueDepth => MetricGroup::Performance,
            MetricField::ShmAllocErrors
            | MetricField::FallbackWrites
            | MetricField::FallbackReads
            | MetricField::EventConnErrors
            | MetricField::QueueFullErrors
            | MetricField::ActiveStreams
            | MetricField::HotRestartSuccesses
            | MetricField::HotRestartFailures => MetricGroup::Stability,
            MetricField::CapacityBytes | MetricField::InUseBytes => MetricGroup::ShareMemoryUsage,
        }
    }

    /// Reverse lookup from a state-map key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Read-only view over one reporting tick.
///
/// Borrows the three groups from the producer; it is never stored past the
/// ingestion call.
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot<'a> {
    pub performance: &'a PerformanceMetrics,
    pub stability: &'a StabilityMetrics,
    pub share_memory: &'a ShareMemoryMetrics,
}

impl<'a> MetricsSnapshot<'a> {
    pub fn new(
        performance: &'a PerformanceMetrics,
        stability: &'a StabilityMetrics,
        share_memory: &'a ShareMemoryMetrics,
    ) -> Self {
        Self {
            performance,
            stability,
            share_memory,
        }
    }

    /// Raw counter backing `field`.
    pub fn value(&self, field: MetricField) -> u64 {
        let p = self.performance;
        let s = self.stability;
        let m = self.share_memory;
        match field {
            MetricField::ReceivedSyncEvents => p.receive_sync_event_count,
            MetricField::SentSyncEvents => p.send_sync_event_count,
            MetricField::OutboundBytes => p.out_flow_bytes,
            MetricField::InboundBytes => p.in_flow_bytes,
            MetricField::SendQueueDepth => p.send_queue_count,
            MetricField::ReceiveQueueDepth => p.receive_queue_count,
            MetricField::ShmAllocErrors => s.alloc_shm_error_count,
            MetricField::FallbackWrites => s.fallback_write_count,
            MetricField::FallbackReads => s.fallback_read_count,
            MetricField::EventConnErrors => s.event_conn_error_count,
            MetricField::QueueFullErrors => s.queue_full_error_count,
            MetricField::ActiveStreams => s.active_stream_count,
            MetricField::HotRestartSuccesses => s.hot_restart_success_count,
            MetricField::HotRestartFailures => s.hot_restart_error_count,
            MetricField::CapacityBytes => m.capacity_of_share_memory_in_bytes,
            MetricField::InUseBytes => m.all_in_used_share_memory_in_bytes,
        }
    }

    /// All sixteen `(field, value)` pairs widened to `f64`.
    pub fn iter(&self) -> impl Iterator<Item = (MetricField, f64)> + '_ {
        MetricField::ALL
            .into_iter()
            .map(move |f| (f, self.value(f) as f64))
    }
}
