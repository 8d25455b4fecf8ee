use std::io::{BufRead, BufReader};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::AppError;
use crate::result::Result;

/// Handle to the one permitted live decoder process.
///
/// Owns the child plus the buffer its stdio streams drain into. The streams
/// are read on dedicated threads so a long-running capture never blocks the
/// request that spawned it.
pub struct ProcessHandle {
    pid: u32,
    child: Child,
    output: Arc<Mutex<String>>,
}

impl ProcessHandle {
    /// Spawns `command_line` with piped stdio and starts draining both
    /// streams in the background.
    pub fn spawn(command_line: &str) -> Result<Self> {
        let mut parts = command_line.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| AppError::SpawnFailure("empty decoder command".to_string()))?;
        let mut child = Command::new(program)
            .args(parts)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AppError::SpawnFailure(e.to_string()))?;

        let output = Arc::new(Mutex::new(String::new()));
        if let Some(stdout) = child.stdout.take() {
            spawn_reader(stdout, output.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_reader(stderr, output.clone());
        }

        let pid = child.id();
        debug!(pid, command = command_line, "decoder process spawned");
        Ok(Self { pid, child, output })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Probes the process without disturbing it. An exited child is reaped
    /// by the probe and reports dead.
    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Sends SIGTERM so the decoder can flush and finalize before exiting.
    pub fn signal_term(&mut self) {
        #[cfg(unix)]
        unsafe {
            libc::kill(self.pid as libc::pid_t, libc::SIGTERM);
        }
        #[cfg(not(unix))]
        {
            let _ = self.child.kill();
        }
    }

    /// Blocks until the child exits or the deadline passes. A child still
    /// running at the deadline is killed outright and then reaped.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Option<ExitStatus> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => return Some(status),
                Ok(None) => {
                    if Instant::now() >= deadline {
                        warn!(pid = self.pid, "decoder did not exit in time, killing");
                        let _ = self.child.kill();
                        return self.child.wait().ok();
                    }
                    std::thread::sleep(Duration::from_millis(50));
                }
                Err(e) => {
                    warn!(pid = self.pid, error = %e, "wait on decoder failed");
                    return None;
                }
            }
        }
    }

    /// Snapshot of everything the process has written so far.
    pub fn output(&self) -> String {
        self.output.lock().unwrap().clone()
    }
}

/// Runs `command_line` to completion and returns its combined output.
///
/// Blocking; callers on the async runtime wrap this in `spawn_blocking`.
pub fn run_to_completion(command_line: &str) -> Result<String> {
    let mut parts = command_line.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| AppError::SpawnFailure("empty decoder command".to_string()))?;
    let output = Command::new(program)
        .args(parts)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| AppError::SpawnFailure(e.to_string()))?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    if output.status.success() {
        Ok(combined)
    } else {
        Err(AppError::ProcessError(format!(
            "finalize exited with {}: {}",
            output.status,
            combined.trim()
        )))
    }
}

fn spawn_reader<R: std::io::Read + Send + 'static>(reader: R, buffer: Arc<Mutex<String>>) {
    std::thread::spawn(move || {
        for line in BufReader::new(reader).lines() {
            let Ok(line) = line else { break };
            debug!(target: "decoder", "{line}");
            let mut buf = buffer.lock().unwrap();
            buf.push_str(&line);
            buf.push('\n');
        }
    });
}

/// Process-wide single-slot registry for the decoder handle.
///
/// All check-then-act sequences run under one mutex, so concurrent starts
/// cannot both claim the slot.
#[derive(Clone, Default)]
pub struct ProcessRegistry {
    slot: Arc<Mutex<Option<ProcessHandle>>>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claims the slot and installs the handle produced by
    /// `spawn`. An existing handle is probed first rather than trusted: the
    /// decoder can die without the registry hearing about it (crash, kill
    /// from outside), and a stale handle must not wedge every future start.
    pub fn try_acquire<F>(&self, spawn: F) -> Result<u32>
    where
        F: FnOnce() -> Result<ProcessHandle>,
    {
        let mut slot = self.slot.lock().unwrap();
        if let Some(handle) = slot.as_mut() {
            if handle.is_alive() {
                return Err(AppError::AlreadyRecording);
            }
            debug!(pid = handle.pid(), "clearing stale decoder handle");
            *slot = None;
        }
        let handle = spawn()?;
        let pid = handle.pid();
        *slot = Some(handle);
        Ok(pid)
    }

    /// Clears the slot unconditionally, handing the handle back for reaping.
    pub fn release(&self) -> Option<ProcessHandle> {
        self.slot.lock().unwrap().take()
    }

    /// Pid of the held handle, if any, without probing.
    pub fn current_pid(&self) -> Option<u32> {
        self.slot.lock().unwrap().as_ref().map(|h| h.pid())
    }

    /// Pid of the held handle when the process is verifiably alive.
    pub fn live_pid(&self) -> Option<u32> {
        let mut slot = self.slot.lock().unwrap();
        match slot.as_mut() {
            Some(handle) => {
                if handle.is_alive() {
                    Some(handle.pid())
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// SIGTERMs the held handle. Returns false when the slot is empty.
    pub fn signal_term(&self) -> bool {
        let mut slot = self.slot.lock().unwrap();
        match slot.as_mut() {
            Some(handle) => {
                handle.signal_term();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_sleep() -> Result<ProcessHandle> {
        ProcessHandle::spawn("sleep 30")
    }

    fn spawn_short_lived() -> Result<ProcessHandle> {
        ProcessHandle::spawn("true")
    }

    #[test]
    fn test_single_slot_rejects_second_acquire() {
        let registry = ProcessRegistry::new();
        let pid = registry.try_acquire(spawn_sleep).unwrap();

        assert!(matches!(
            registry.try_acquire(spawn_sleep),
            Err(AppError::AlreadyRecording)
        ));
        assert_eq!(registry.current_pid(), Some(pid));

        let mut handle = registry.release().unwrap();
        handle.signal_term();
        assert!(handle.wait_timeout(Duration::from_secs(5)).is_some());
        assert!(registry.current_pid().is_none());
    }

    #[test]
    fn test_stale_handle_self_heals() {
        let registry = ProcessRegistry::new();
        registry.try_acquire(spawn_short_lived).unwrap();

        // give the short-lived process time to exit
        std::thread::sleep(Duration::from_millis(300));

        let pid = registry.try_acquire(spawn_sleep).unwrap();
        assert_eq!(registry.live_pid(), Some(pid));

        let mut handle = registry.release().unwrap();
        handle.signal_term();
        handle.wait_timeout(Duration::from_secs(5));
    }

    #[test]
    fn test_release_on_empty_slot_is_noop() {
        let registry = ProcessRegistry::new();
        assert!(registry.release().is_none());
        assert!(registry.live_pid().is_none());
    }

    #[test]
    fn test_spawn_failure_leaves_slot_empty() {
        let registry = ProcessRegistry::new();
        let result = registry.try_acquire(|| ProcessHandle::spawn("/nonexistent/decoder"));
        assert!(matches!(result, Err(AppError::SpawnFailure(_))));
        assert!(registry.current_pid().is_none());
    }
}
