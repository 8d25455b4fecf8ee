use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use crate::config::Decoder;
use crate::error::AppError;
use crate::process::{self, ProcessHandle, ProcessRegistry};
use crate::result::Result;
use crate::status::{StatusStore, STATUS_RECORDING};

/// Point-in-time join of the process registry and the status store.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeStatus {
    pub recording: bool,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
}

/// Orchestrates the decoder process lifecycle against the registry.
///
/// start/stop/reset are serialized behind one async lock: a caller arriving
/// during an in-flight stop queues behind it rather than interleaving with
/// the grace interval or the finalize step.
#[derive(Clone)]
pub struct RecordingController {
    registry: ProcessRegistry,
    decoder: Decoder,
    op_lock: Arc<Mutex<()>>,
}

impl RecordingController {
    pub fn new(registry: ProcessRegistry, decoder: Decoder) -> Self {
        Self {
            registry,
            decoder,
            op_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Launches the decoder in streaming capture mode and returns its pid
    /// without waiting for output. Fails with `AlreadyRecording` when a live
    /// handle exists; a stale handle is cleared by the registry probe.
    pub async fn start(&self) -> Result<u32> {
        let _op = self.op_lock.lock().await;
        let command = format!("{} start", self.decoder.command);
        let pid = self.registry.try_acquire(|| ProcessHandle::spawn(&command))?;
        info!(pid, "recording started");
        Ok(pid)
    }

    /// Signals the decoder, waits the grace interval so it can flush its
    /// capture, then runs one synchronous finalize step and reaps the
    /// handle. The handle is released even when finalization fails.
    pub async fn stop(&self) -> Result<String> {
        let _op = self.op_lock.lock().await;
        if !self.registry.signal_term() {
            return Err(AppError::NotRecording);
        }
        tokio::time::sleep(Duration::from_millis(self.decoder.grace_ms)).await;

        let finalize = self.finalize().await;
        self.reap_released_handle().await;
        match &finalize {
            Ok(_) => info!("recording stopped and processed"),
            Err(e) => info!(error = ?e, "recording stopped with finalize error"),
        }
        finalize
    }

    /// Clears any registered handle unconditionally. Recovery hatch for when
    /// start/stop got out of sync; succeeds even with nothing running.
    pub async fn reset(&self) -> Result<()> {
        let _op = self.op_lock.lock().await;
        if let Some(mut handle) = self.registry.release() {
            let pid = handle.pid();
            handle.signal_term();
            let timeout = Duration::from_millis(self.decoder.finalize_timeout_ms);
            // reap off the request path
            tokio::task::spawn_blocking(move || {
                handle.wait_timeout(timeout);
            });
            info!(pid, "recording reset");
        }
        Ok(())
    }

    pub fn composite(&self, store: &StatusStore) -> CompositeStatus {
        let current = store.get();
        let pid = self.registry.live_pid();
        CompositeStatus {
            recording: pid.is_some() && current.status == STATUS_RECORDING,
            status: current.status,
            pid,
            last_update: current.timestamp,
        }
    }

    async fn finalize(&self) -> Result<String> {
        let command = format!("{} stop", self.decoder.command);
        tokio::task::spawn_blocking(move || process::run_to_completion(&command))
            .await
            .map_err(|e| AppError::ProcessError(e.to_string()))?
    }

    async fn reap_released_handle(&self) {
        if let Some(mut handle) = self.registry.release() {
            let timeout = Duration::from_millis(self.decoder.finalize_timeout_ms);
            let _ = tokio::task::spawn_blocking(move || {
                let status = handle.wait_timeout(timeout);
                info!(
                    pid = handle.pid(),
                    ?status,
                    output = %handle.output().trim(),
                    "decoder process reaped"
                );
            })
            .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::RecordingStatus;
    use std::fs;
    use tempfile::TempDir;

    fn fake_decoder(dir: &TempDir) -> String {
        let path = dir.path().join("decoder.sh");
        fs::write(
            &path,
            "#!/bin/sh\ncase \"$1\" in\n  start) exec sleep 30 ;;\n  stop) echo finalized ;;\nesac\n",
        )
        .unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }
        path.to_string_lossy().into_owned()
    }

    fn controller(command: String) -> RecordingController {
        RecordingController::new(
            ProcessRegistry::new(),
            Decoder {
                command,
                grace_ms: 20,
                finalize_timeout_ms: 3000,
            },
        )
    }

    #[tokio::test]
    async fn test_second_start_conflicts() {
        let dir = TempDir::new().unwrap();
        let ctl = controller(fake_decoder(&dir));

        let pid = ctl.start().await.unwrap();
        assert!(matches!(ctl.start().await, Err(AppError::AlreadyRecording)));
        assert_eq!(ctl.registry.current_pid(), Some(pid));

        ctl.reset().await.unwrap();
    }

    #[tokio::test]
    async fn test_start_self_heals_after_external_kill() {
        let dir = TempDir::new().unwrap();
        let ctl = controller(fake_decoder(&dir));

        let pid = ctl.start().await.unwrap();
        #[cfg(unix)]
        unsafe {
            libc::kill(pid as libc::pid_t, libc::SIGKILL);
        }
        tokio::time::sleep(Duration::from_millis(200)).await;

        let second = ctl.start().await.unwrap();
        assert_ne!(pid, second);

        ctl.reset().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_without_recording() {
        let dir = TempDir::new().unwrap();
        let ctl = controller(fake_decoder(&dir));
        assert!(matches!(ctl.stop().await, Err(AppError::NotRecording)));
    }

    #[tokio::test]
    async fn test_stop_finalizes_and_clears_handle() {
        let dir = TempDir::new().unwrap();
        let ctl = controller(fake_decoder(&dir));

        ctl.start().await.unwrap();
        let output = ctl.stop().await.unwrap();
        assert!(output.contains("finalized"));
        assert!(ctl.registry.current_pid().is_none());

        // the slot is free again
        ctl.start().await.unwrap();
        ctl.reset().await.unwrap();
    }

    #[tokio::test]
    async fn test_spawn_failure_guarantees_idle() {
        let ctl = controller("/nonexistent/decoder".to_string());
        assert!(matches!(ctl.start().await, Err(AppError::SpawnFailure(_))));
        assert!(ctl.registry.current_pid().is_none());
    }

    #[tokio::test]
    async fn test_composite_requires_live_handle_and_recording_status() {
        let dir = TempDir::new().unwrap();
        let ctl = controller(fake_decoder(&dir));
        let store = StatusStore::new();

        assert!(!ctl.composite(&store).recording);

        ctl.start().await.unwrap();
        store.set(RecordingStatus {
            status: "starting".to_string(),
            timestamp: Some(Utc::now()),
            error: None,
        });
        let composite = ctl.composite(&store);
        assert!(!composite.recording);
        assert!(composite.pid.is_some());

        store.set(RecordingStatus {
            status: "recording".to_string(),
            timestamp: Some(Utc::now()),
            error: None,
        });
        assert!(ctl.composite(&store).recording);

        ctl.reset().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!ctl.composite(&store).recording);
    }
}
