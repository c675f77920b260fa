// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted tag reader for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use tagvault_core::types::{AdapterType, HealthStatus, ScanOutcome};
use tagvault_core::{HardwareError, PluginAdapter, TagReader, TagvaultError};

enum Scripted {
    Outcome(ScanOutcome),
    Absent(String),
    Io(String),
}

/// A tag reader that replays queued outcomes.
///
/// Once the queue is empty every scan returns [`ScanOutcome::TimedOut`].
pub struct MockTagReader {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    scans: AtomicUsize,
}

impl MockTagReader {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            scans: AtomicUsize::new(0),
        }
    }

    /// Queue a tag that the next scan will report.
    pub async fn present_tag(&self, uid: &str) {
        self.push(Scripted::Outcome(ScanOutcome::Scanned(uid.to_string())))
            .await;
    }

    /// Queue an arbitrary outcome.
    pub async fn push_outcome(&self, outcome: ScanOutcome) {
        self.push(Scripted::Outcome(outcome)).await;
    }

    /// Queue a missing/unauthorized device failure.
    pub async fn unplug(&self, message: &str) {
        self.push(Scripted::Absent(message.to_string())).await;
    }

    /// Queue a serial I/O failure.
    pub async fn fail_io(&self, message: &str) {
        self.push(Scripted::Io(message.to_string())).await;
    }

    async fn push(&self, item: Scripted) {
        self.script.lock().await.push_back(item);
    }

    /// Number of scans served so far.
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }
}

impl Default for MockTagReader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockTagReader {
    fn name(&self) -> &str {
        "mock-reader"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::TagReader
    }

    async fn health_check(&self) -> Result<HealthStatus, TagvaultError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TagvaultError> {
        Ok(())
    }
}

#[async_trait]
impl TagReader for MockTagReader {
    async fn scan(&self, _timeout: Duration) -> Result<ScanOutcome, TagvaultError> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().await.pop_front() {
            Some(Scripted::Outcome(outcome)) => Ok(outcome),
            Some(Scripted::Absent(message)) => {
                Err(HardwareError::UnauthorizedOrAbsent(message).into())
            }
            Some(Scripted::Io(message)) => Err(HardwareError::Io(message).into()),
            None => Ok(ScanOutcome::TimedOut),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_in_order_then_times_out() {
        let reader = MockTagReader::new();
        reader.present_tag("67 AE 7B B4").await;
        reader.unplug("no serial ports found").await;
        reader.fail_io("failed to enumerate serial ports").await;

        let timeout = Duration::from_secs(1);
        assert_eq!(
            reader.scan(timeout).await.unwrap(),
            ScanOutcome::Scanned("67 AE 7B B4".into())
        );
        assert!(matches!(
            reader.scan(timeout).await,
            Err(TagvaultError::Hardware(HardwareError::UnauthorizedOrAbsent(_)))
        ));
        assert!(matches!(
            reader.scan(timeout).await,
            Err(TagvaultError::Hardware(HardwareError::Io(_)))
        ));
        assert_eq!(reader.scan(timeout).await.unwrap(), ScanOutcome::TimedOut);
        assert_eq!(reader.scan_count(), 4);
    }
}
