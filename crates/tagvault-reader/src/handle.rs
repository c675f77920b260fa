// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exclusive access to the tag reader.
//!
//! A scan takes an owned lock guard and moves it into a blocking-pool task
//! together with the open port. Both are released when that task ends, even
//! if the request that started the scan has gone away.

use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tagvault_config::ReaderConfig;
use tagvault_core::{
    AdapterType, HardwareError, HealthStatus, PluginAdapter, ScanOutcome, TagReader, TagvaultError,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::discovery::{self, AllowList};
use crate::protocol;

/// Blocking access to serial hardware.
pub trait SerialBackend: Send + Sync + 'static {
    type Port: Read + Send;

    /// Path of the authorized device, or why there is none.
    fn locate(&self) -> Result<String, HardwareError>;

    /// Open `path` for reading with the configured line settings.
    fn open(&self, path: &str) -> std::io::Result<Self::Port>;
}

/// The real serial ports of this machine.
#[derive(Debug, Clone)]
pub struct SystemSerial {
    allow: AllowList,
    baud_rate: u32,
    read_timeout: Duration,
}

impl SystemSerial {
    pub fn new(config: &ReaderConfig) -> Self {
        Self {
            allow: AllowList::from(config),
            baud_rate: config.baud_rate,
            read_timeout: Duration::from_millis(config.read_timeout_ms),
        }
    }
}

impl SerialBackend for SystemSerial {
    type Port = Box<dyn serialport::SerialPort>;

    fn locate(&self) -> Result<String, HardwareError> {
        discovery::discover_authorized_device(&self.allow)
    }

    fn open(&self, path: &str) -> std::io::Result<Self::Port> {
        serialport::new(path, self.baud_rate)
            .timeout(self.read_timeout)
            .open()
            .map_err(std::io::Error::from)
    }
}

/// The single shared tag reader.
pub struct TagReaderHandle<B: SerialBackend = SystemSerial> {
    backend: Arc<B>,
    tag_prefix: String,
    lock: Arc<Mutex<()>>,
}

impl TagReaderHandle<SystemSerial> {
    /// A handle over the machine's serial ports.
    pub fn system(config: &ReaderConfig) -> Self {
        Self::with_backend(SystemSerial::new(config), config.tag_prefix.clone())
    }
}

impl<B: SerialBackend> TagReaderHandle<B> {
    pub fn with_backend(backend: B, tag_prefix: impl Into<String>) -> Self {
        Self {
            backend: Arc::new(backend),
            tag_prefix: tag_prefix.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Locate, open and read one tag. Runs on the blocking pool.
fn scan_blocking<B: SerialBackend>(
    backend: &B,
    prefix: &str,
    timeout: Duration,
) -> Result<ScanOutcome, HardwareError> {
    let path = backend.locate()?;
    let port = match backend.open(&path) {
        Ok(port) => port,
        Err(err) => {
            warn!(port = %path, error = %err, "failed to open tag reader");
            return Ok(ScanOutcome::Unreadable);
        }
    };
    debug!(port = %path, "tag reader opened");
    Ok(protocol::read_tag(port, prefix, timeout))
}

#[async_trait]
impl<B: SerialBackend> PluginAdapter for TagReaderHandle<B> {
    fn name(&self) -> &str {
        "serial-tag-reader"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::TagReader
    }

    async fn health_check(&self) -> Result<HealthStatus, TagvaultError> {
        let backend = Arc::clone(&self.backend);
        let located = tokio::task::spawn_blocking(move || backend.locate())
            .await
            .map_err(|e| TagvaultError::Internal(format!("reader health task failed: {e}")))?;
        Ok(match located {
            Ok(_) => HealthStatus::Healthy,
            Err(err) => HealthStatus::Degraded(err.to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), TagvaultError> {
        // wait for an in-flight scan to give the port back
        let _guard = self.lock.lock().await;
        Ok(())
    }
}

#[async_trait]
impl<B: SerialBackend> TagReader for TagReaderHandle<B> {
    async fn scan(&self, timeout: Duration) -> Result<ScanOutcome, TagvaultError> {
        let guard = Arc::clone(&self.lock).lock_owned().await;
        let backend = Arc::clone(&self.backend);
        let prefix = self.tag_prefix.clone();

        let outcome = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            scan_blocking(backend.as_ref(), &prefix, timeout)
        })
        .await
        .map_err(|e| TagvaultError::Internal(format!("scan task failed: {e}")))??;

        match &outcome {
            ScanOutcome::Scanned(_) => info!("tag scanned"),
            ScanOutcome::TimedOut => info!(timeout_secs = timeout.as_secs(), "tag scan timed out"),
            ScanOutcome::Unreadable => warn!("tag reader unreadable"),
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    /// Backend whose port answers after a delay and tracks overlap.
    struct FakeBackend {
        present: bool,
        openable: bool,
        delay: Duration,
        payload: &'static [u8],
        active: Arc<AtomicUsize>,
        max_active: Arc<AtomicUsize>,
    }

    impl FakeBackend {
        fn answering(payload: &'static [u8], delay: Duration) -> Self {
            Self {
                present: true,
                openable: true,
                delay,
                payload,
                active: Arc::new(AtomicUsize::new(0)),
                max_active: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    struct SlowPort {
        inner: Cursor<&'static [u8]>,
        delay: Option<Duration>,
        active: Arc<AtomicUsize>,
    }

    impl Read for SlowPort {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if let Some(delay) = self.delay.take() {
                std::thread::sleep(delay);
            }
            self.inner.read(buf)
        }
    }

    impl Drop for SlowPort {
        fn drop(&mut self) {
            self.active.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl SerialBackend for FakeBackend {
        type Port = SlowPort;

        fn locate(&self) -> Result<String, HardwareError> {
            if self.present {
                Ok("/dev/fake0".to_string())
            } else {
                Err(HardwareError::UnauthorizedOrAbsent("no serial ports found".to_string()))
            }
        }

        fn open(&self, _path: &str) -> std::io::Result<SlowPort> {
            if !self.openable {
                return Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "busy"));
            }
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now, Ordering::SeqCst);
            Ok(SlowPort {
                inner: Cursor::new(self.payload),
                delay: Some(self.delay),
                active: Arc::clone(&self.active),
            })
        }
    }

    #[tokio::test]
    async fn scan_returns_identifier() {
        let handle = TagReaderHandle::with_backend(
            FakeBackend::answering(b"Card UID: 67 AE 7B B4\n", Duration::ZERO),
            "Card UID:",
        );
        let outcome = handle.scan(Duration::from_secs(1)).await.unwrap();
        assert_eq!(outcome, ScanOutcome::Scanned("67 AE 7B B4".to_string()));
    }

    #[tokio::test]
    async fn absent_reader_is_a_hardware_error() {
        let mut backend = FakeBackend::answering(b"", Duration::ZERO);
        backend.present = false;
        let handle = TagReaderHandle::with_backend(backend, "Card UID:");
        let err = handle.scan(Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(
            err,
            TagvaultError::Hardware(HardwareError::UnauthorizedOrAbsent(_))
        ));
        assert!(matches!(
            handle.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));
    }

    #[tokio::test]
    async fn open_failure_is_unreadable() {
        let mut backend = FakeBackend::answering(b"", Duration::ZERO);
        backend.openable = false;
        let handle = TagReaderHandle::with_backend(backend, "Card UID:");
        assert_eq!(
            handle.scan(Duration::from_secs(1)).await.unwrap(),
            ScanOutcome::Unreadable
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_scans_are_serialized() {
        let backend = FakeBackend::answering(b"Card UID: AA\n", Duration::from_millis(100));
        let max_active = Arc::clone(&backend.max_active);
        let handle = Arc::new(TagReaderHandle::with_backend(backend, "Card UID:"));

        let started = Instant::now();
        let tasks: Vec<_> = (0..3)
            .map(|_| {
                let handle = Arc::clone(&handle);
                tokio::spawn(async move { handle.scan(Duration::from_secs(2)).await })
            })
            .collect();
        for task in tasks {
            let outcome = task.await.unwrap().unwrap();
            assert_eq!(outcome, ScanOutcome::Scanned("AA".to_string()));
        }

        assert_eq!(max_active.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn abandoned_scan_still_releases_the_reader() {
        let backend = FakeBackend::answering(b"Card UID: BB\n", Duration::from_millis(150));
        let handle = Arc::new(TagReaderHandle::with_backend(backend, "Card UID:"));

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), handle.scan(Duration::from_secs(2))).await;
        assert!(abandoned.is_err());

        let outcome = handle.scan(Duration::from_secs(2)).await.unwrap();
        assert_eq!(outcome, ScanOutcome::Scanned("BB".to_string()));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn scan_log_omits_identifier() {
        let handle = TagReaderHandle::with_backend(
            FakeBackend::answering(b"Card UID: 67 AE 7B B4\n", Duration::ZERO),
            "Card UID:",
        );
        handle.scan(Duration::from_secs(1)).await.unwrap();
        assert!(logs_contain("tag scanned"));
        assert!(!logs_contain("67 AE 7B B4"));
    }
}
