// Copyright (c) 2025 Kodama Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Kokic (@kokic)

use std::{
    future::Future,
    marker::PhantomData,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use camino::Utf8PathBuf;
use eyre::{eyre, WrapErr};
use tokio::task::JoinHandle;

use crate::config::typeset::{Typeset, DEFAULT_DELAY_MS, REGION_PLACEHOLDER};

/// An external equation typesetter.
///
/// `None` asks for the whole output to be typeset.
pub trait TypesetEngine<R>: Send + Sync + 'static {
    fn typeset(&self, regions: Option<&[R]>) -> impl Future<Output = eyre::Result<()>> + Send;
}

/// Coalescing policy: every new request supersedes the pending one and
/// restarts the delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debounce {
    pub delay: Duration,
}

impl Default for Debounce {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
        }
    }
}

impl From<&Typeset> for Debounce {
    fn from(config: &Typeset) -> Self {
        Self {
            delay: config.delay(),
        }
    }
}

/// Runs the engine for the last requested region once requests stop
/// arriving for [`Debounce::delay`].
pub struct TypesetTrigger<E, R> {
    engine: Arc<E>,
    policy: Debounce,
    pending: Mutex<Option<JoinHandle<()>>>,
    region: PhantomData<fn(R)>,
}

impl<E, R> TypesetTrigger<E, R>
where
    E: TypesetEngine<R>,
    R: Send + Sync + 'static,
{
    pub fn new(engine: E, policy: Debounce) -> Self {
        Self {
            engine: Arc::new(engine),
            policy,
            pending: Mutex::new(None),
            region: PhantomData,
        }
    }

    /// Schedule a typesetting pass over `region`, cancelling the pass
    /// scheduled by the previous call if its delay has not run out yet.
    ///
    /// Must be called from within a tokio runtime.
    pub fn request(&self, region: R) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let engine = Arc::clone(&self.engine);
        let delay = self.policy.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detached, so a later request cannot cancel a pass already running.
            tokio::spawn(async move {
                run(engine.as_ref(), Some(std::slice::from_ref(&region))).await;
            });
        }));
    }

    /// Typeset everything right away, bypassing the delay.
    pub async fn typeset_all(&self) {
        run(self.engine.as_ref(), None).await;
    }

    /// Whether a scheduled pass is still waiting for its delay.
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<E, R> Drop for TypesetTrigger<E, R> {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}

/// Engine failures are reported and dropped, never retried.
async fn run<E, R>(engine: &E, regions: Option<&[R]>)
where
    E: TypesetEngine<R>,
{
    if let Err(err) = engine.typeset(regions).await {
        tracing::error!("typesetting failed: {err:?}");
    }
}

/// Typesets output files by running an external command.
///
/// Every argument equal to `<region>` is replaced with the region path. When
/// no argument is a placeholder the region paths are appended instead.
///
/// A whole-output pass uses the root given to [`CommandEngine::with_root`] as
/// its only region, or no region at all.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    command: Vec<String>,
    root: Option<Utf8PathBuf>,
}

impl CommandEngine {
    pub fn new(command: Vec<String>) -> eyre::Result<Self> {
        if command.is_empty() {
            return Err(eyre!("no typesetting command configured"));
        }
        Ok(Self {
            command,
            root: None,
        })
    }

    pub fn with_root(mut self, root: Utf8PathBuf) -> Self {
        self.root = Some(root);
        self
    }

    fn build(&self, regions: Option<&[Utf8PathBuf]>) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.command[0]);
        let regions = match (regions, &self.root) {
            (Some(regions), _) => regions,
            (None, Some(root)) => std::slice::from_ref(root),
            (None, None) => &[],
        };
        let mut substituted = false;
        for arg in &self.command[1..] {
            if arg == REGION_PLACEHOLDER {
                command.args(regions);
                substituted = true;
                continue;
            }
            command.arg(arg);
        }
        if !substituted {
            command.args(regions);
        }
        command
    }
}

impl TypesetEngine<Utf8PathBuf> for CommandEngine {
    async fn typeset(&self, regions: Option<&[Utf8PathBuf]>) -> eyre::Result<()> {
        let program = &self.command[0];
        let output = self
            .build(regions)
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .output()
            .await
            .wrap_err_with(|| eyre!("failed to start typesetter `{}`", program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(eyre!(
                "typesetter `{}` exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            ));
        }

        tracing::info!(regions = regions.map_or(0, <[_]>::len), "typeset finished");
        Ok(())
    }
}
