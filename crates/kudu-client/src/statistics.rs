// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Per-client operation counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Kind of request issued through a client handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Metadata reads (listing and describing tables).
    Metadata,
    /// Admin mutations (partition changes).
    Admin,
}

/// Lock-free counters updated by a client on every request.
#[derive(Debug, Default)]
pub struct ClientStatistics {
    metadata_requests: AtomicU64,
    admin_requests: AtomicU64,
    failed_requests: AtomicU64,
}

impl ClientStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, kind: OperationKind, success: bool) {
        match kind {
            OperationKind::Metadata => self.metadata_requests.fetch_add(1, Ordering::Relaxed),
            OperationKind::Admin => self.admin_requests.fetch_add(1, Ordering::Relaxed),
        };
        if !success {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            metadata_requests: self.metadata_requests.load(Ordering::Relaxed),
            admin_requests: self.admin_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`ClientStatistics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatisticsSnapshot {
    pub metadata_requests: u64,
    pub admin_requests: u64,
    pub failed_requests: u64,
}

impl StatisticsSnapshot {
    pub fn total_requests(&self) -> u64 {
        self.metadata_requests + self.admin_requests
    }
}
