// src/exec/launcher.rs

//! Spawn a command and capture its combined output.
//!
//! One launch goes through these steps, in order:
//!
//! 1. validate the request (no side effects yet)
//! 2. drop privileges if a user was requested
//! 3. optionally move into the command's directory
//! 4. take the [`ExecutionGuard`]
//! 5. spawn with stdout and stderr on separate pipes
//! 6. drain both pipes through the [`StreamMultiplexer`] and close them
//! 7. put the working directory back
//! 8. release the child handle and the guard
//!
//! Once the directory has been changed, steps 7 and 8 run even when a later
//! step fails. A failure to restore the working directory is reported to the
//! sink but does not turn a captured result into an error.
//!
//! A bare command name is looked up the same way [`PathProbe`] looks it up:
//! with an explicit search path configured, the launcher resolves the name
//! itself instead of leaving it to the process `PATH`.
//!
//! The call blocks until both pipes reach end-of-stream. There is no
//! timeout: a child that keeps its streams open keeps the caller waiting.

use std::ffi::OsString;
use std::io::{self, ErrorKind};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use tokio::io::AsyncRead;
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{debug, info, warn};

use crate::config::ExecSection;
use crate::errors::ExecError;
use crate::exec::command::{LaunchRequest, SpawnPlan};
use crate::exec::guard::{ExecutionGuard, GuardToken};
use crate::exec::multiplex::StreamMultiplexer;
use crate::exec::privileges::{PrivilegeDrop, UnixPrivilegeDrop};
use crate::exec::workdir::{DirectoryContext, containing_dir};
use crate::path::{PathProbe, is_absolute_command};
use crate::sink::{ErrorSink, TracingSink};

/// Bytes written by the child to stdout and stderr, in arrival order.
///
/// May contain NUL bytes and non-UTF-8 data. An empty buffer is a valid
/// result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    bytes: Vec<u8>,
}

impl CapturedOutput {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Launcher {
    guard: ExecutionGuard,
    probe: PathProbe,
    multiplexer: StreamMultiplexer,
    sink: Arc<dyn ErrorSink>,
    privileges: Arc<dyn PrivilegeDrop>,
    /// Global pref: privileges were already dropped for the whole scanner,
    /// so per-call requests are ignored.
    privileges_dropped: bool,
}

impl Default for Launcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Launcher {
    /// Launcher bound to the process-wide guard and the process `PATH`.
    pub fn new() -> Self {
        Self {
            guard: ExecutionGuard::global(),
            probe: PathProbe::new(),
            multiplexer: StreamMultiplexer::default(),
            sink: Arc::new(TracingSink),
            privileges: Arc::new(UnixPrivilegeDrop),
            privileges_dropped: false,
        }
    }

    /// Launcher configured from the `[exec]` config section.
    pub fn from_config(exec: &ExecSection) -> Self {
        let probe = match &exec.search_path {
            Some(path) => PathProbe::with_search_path(path),
            None => PathProbe::new(),
        };
        Self::new()
            .with_probe(probe)
            .with_chunk_size(exec.chunk_size)
            .with_privileges_dropped(exec.drop_privileges)
    }

    pub fn with_guard(mut self, guard: ExecutionGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn with_probe(mut self, probe: PathProbe) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.multiplexer = StreamMultiplexer::new(chunk_size);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_privilege_drop(mut self, privileges: Arc<dyn PrivilegeDrop>) -> Self {
        self.privileges = privileges;
        self
    }

    pub fn with_privileges_dropped(mut self, dropped: bool) -> Self {
        self.privileges_dropped = dropped;
        self
    }

    pub fn guard(&self) -> &ExecutionGuard {
        &self.guard
    }

    pub fn probe(&self) -> &PathProbe {
        &self.probe
    }

    pub fn sink(&self) -> &Arc<dyn ErrorSink> {
        &self.sink
    }

    /// Run `req` to completion and return its combined output.
    pub async fn launch(&self, req: &LaunchRequest) -> Result<CapturedOutput, ExecError> {
        self.launch_with(req, ExecutionHandle::<ChildStdout, ChildStderr>::spawn)
            .await
    }

    async fn launch_with<O, E, S>(
        &self,
        req: &LaunchRequest,
        spawn: S,
    ) -> Result<CapturedOutput, ExecError>
    where
        O: AsyncRead + Unpin,
        E: AsyncRead + Unpin,
        S: FnOnce(&str, &SpawnPlan) -> Result<ExecutionHandle<O, E>, ExecError>,
    {
        req.validate()?;

        self.drop_privileges(req)?;

        let (program, workdir) = self.relocate(req)?;

        let token = self.guard.try_acquire();
        let outcome = match &token {
            Some(token) => {
                if !req.args.named_keys().is_empty() {
                    self.sink
                        .warning("pread: named elements in 'cmd' are ignored!");
                }
                let plan = SpawnPlan::build(&program, req.args.to_argv());
                self.spawn_and_capture(token, &req.cmd, &plan, spawn).await
            }
            None => Err(ExecError::Reentrancy {
                pid: self.guard.tracked_pid(),
            }),
        };

        if let Some(workdir) = workdir {
            self.leave_dir(workdir);
        }
        drop(token);

        match &outcome {
            Ok(out) => info!(cmd = %req.cmd, bytes = out.len(), "pread finished"),
            Err(e) => debug!(cmd = %req.cmd, error = %e, "pread failed"),
        }
        outcome
    }

    /// Blocking wrapper around [`launch`](Self::launch) for synchronous
    /// callers such as the builtin dispatcher.
    ///
    /// Works from plain threads and from inside a Tokio runtime. On a
    /// multi-thread runtime the current worker is handed over with
    /// `block_in_place`; a current-thread runtime cannot be blocked from
    /// within, so the launch runs on a helper thread with its own runtime.
    pub fn launch_blocking(&self, req: &LaunchRequest) -> Result<CapturedOutput, ExecError> {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(self.launch(req)))
            }
            Ok(_) => std::thread::scope(|scope| {
                scope
                    .spawn(|| self.launch_on_private_runtime(req))
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            }),
            Err(_) => self.launch_on_private_runtime(req),
        }
    }

    fn launch_on_private_runtime(&self, req: &LaunchRequest) -> Result<CapturedOutput, ExecError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|source| ExecError::Spawn {
                cmd: req.cmd.clone(),
                source,
            })?;
        rt.block_on(self.launch(req))
    }

    fn drop_privileges(&self, req: &LaunchRequest) -> Result<(), ExecError> {
        let Some(user) = req.drop_privileges_user.as_deref() else {
            return Ok(());
        };
        if self.privileges_dropped {
            debug!(user, "privileges already dropped globally; ignoring per-call user");
            return Ok(());
        }
        self.privileges
            .drop_to(user)
            .map_err(ExecError::PrivilegeDrop)
    }

    /// Work out what to execute and, if asked, move next to it.
    fn relocate(
        &self,
        req: &LaunchRequest,
    ) -> Result<(OsString, Option<DirectoryContext>), ExecError> {
        if !req.change_dir {
            return Ok((self.program_in_place(&req.cmd)?, None));
        }

        let resolved = if is_absolute_command(&req.cmd) {
            PathBuf::from(&req.cmd)
        } else {
            self.probe.resolve(&req.cmd)?
        };
        let dir = containing_dir(&resolved);

        let (ctx, report) = DirectoryContext::enter(&dir)?;
        if let Some(e) = report.save_error {
            self.sink.warning(&format!("pread(): getcwd: {e}"));
        }
        Ok((resolved.into_os_string(), Some(ctx)))
    }

    /// Program to hand to the OS when not relocating.
    ///
    /// Without an explicit search path the OS does the lookup in `PATH`,
    /// which is what the probe uses too. With one, bare names are resolved
    /// here and a miss never falls back to `PATH`.
    fn program_in_place(&self, cmd: &str) -> Result<OsString, ExecError> {
        if self.probe.search_path().is_none() || cmd.contains('/') {
            return Ok(OsString::from(cmd));
        }
        match self.probe.find(cmd) {
            Some(path) => Ok(path.into_os_string()),
            None => Err(ExecError::Spawn {
                cmd: cmd.to_string(),
                source: io::Error::new(ErrorKind::NotFound, "not found in search path"),
            }),
        }
    }

    fn leave_dir(&self, workdir: DirectoryContext) {
        if let Err((dir, e)) = workdir.restore() {
            self.sink
                .error(&format!("pread(): chdir({}): {e}", dir.display()));
        }
    }

    async fn spawn_and_capture<O, E, S>(
        &self,
        token: &GuardToken,
        cmd: &str,
        plan: &SpawnPlan,
        spawn: S,
    ) -> Result<CapturedOutput, ExecError>
    where
        O: AsyncRead + Unpin,
        E: AsyncRead + Unpin,
        S: FnOnce(&str, &SpawnPlan) -> Result<ExecutionHandle<O, E>, ExecError>,
    {
        let handle = spawn(cmd, plan)?;
        if let Some(pid) = handle.pid {
            token.track(pid);
        }
        let bytes = handle.capture(&self.multiplexer).await?;
        Ok(CapturedOutput { bytes })
    }
}

/// A spawned child and its two output pipes. Lives only inside one launch.
struct ExecutionHandle<O, E> {
    child: Child,
    pid: Option<u32>,
    stdout: O,
    stderr: E,
}

impl ExecutionHandle<ChildStdout, ChildStderr> {
    fn spawn(cmd: &str, plan: &SpawnPlan) -> Result<Self, ExecError> {
        let mut command = Command::new(&plan.program);
        command
            .arg0(&plan.arg0)
            .args(&plan.rest)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let spawn_err = |source| ExecError::Spawn {
            cmd: cmd.to_string(),
            source,
        };

        let mut child = command.spawn().map_err(spawn_err)?;
        let pid = child.id();
        debug!(cmd, ?pid, argc = plan.rest.len() + 1, "spawned child");

        match (child.stdout.take(), child.stderr.take()) {
            (Some(stdout), Some(stderr)) => Ok(Self {
                child,
                pid,
                stdout,
                stderr,
            }),
            _ => {
                // Both pipes were requested above; this only happens if the
                // runtime failed to set one up.
                release_child(child, pid);
                Err(spawn_err(io::Error::other("child output pipes missing")))
            }
        }
    }
}

impl<O: AsyncRead + Unpin, E: AsyncRead + Unpin> ExecutionHandle<O, E> {
    /// Drain both pipes, close them and let go of the child.
    async fn capture(self, multiplexer: &StreamMultiplexer) -> Result<Vec<u8>, ExecError> {
        let Self {
            child,
            pid,
            mut stdout,
            mut stderr,
        } = self;

        let drained = multiplexer.drain(&mut stdout, &mut stderr).await;
        drop(stdout);
        drop(stderr);

        if let Err(e) = &drained {
            warn!(?pid, error = %e, "capturing child output failed");
        }
        release_child(child, pid);
        drained
    }
}

/// Reap the child if it already exited; otherwise drop the handle and leave
/// it to Tokio's orphan reaper. The child is never killed.
fn release_child(mut child: Child, pid: Option<u32>) {
    match child.try_wait() {
        Ok(Some(status)) => debug!(?pid, %status, "child exited"),
        Ok(None) => debug!(?pid, "child still running after closing its streams"),
        Err(e) => warn!(?pid, error = %e, "could not query child status"),
    }
}
