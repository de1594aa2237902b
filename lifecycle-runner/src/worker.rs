//! Worker bodies -- the lifecycle tests run between setup and teardown.
//!
//! The coordinator hands every worker a [`WorkerContext`] once the suite
//! tenancy exists. What the worker does with it is pluggable through
//! [`LifecycleWorker`]:
//!
//! - [`CommandWorker`]: spawns an external test command per worker
//! - [`IdleWorker`]: logs the plan view and succeeds (no test command given)
//! - [`SuiteWorker`]: the one the `run` command picks between them

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Result, bail};
use tokio::process::Command;

use lifecycle_core::SuiteContext;
use lifecycle_core::config::CONFIG_PATH_ENV;

use crate::coordinator::Role;

/// Environment variable carrying the worker index.
pub const WORKER_INDEX_ENV: &str = "LIFECYCLE_WORKER_INDEX";
/// Environment variable carrying the number of workers.
pub const WORKER_COUNT_ENV: &str = "LIFECYCLE_WORKER_COUNT";
/// Environment variable carrying the suite organization.
pub const ORG_ENV: &str = "LIFECYCLE_ORG";
/// Environment variable carrying the suite space.
pub const SPACE_ENV: &str = "LIFECYCLE_SPACE";
/// Environment variable carrying the service offering under test.
pub const SERVICE_OFFERING_ENV: &str = "LIFECYCLE_SERVICE_OFFERING";

/// Everything a worker knows about its place in the suite.
#[derive(Debug, Clone)]
pub struct WorkerContext {
    /// Worker index (0-based).
    pub index: usize,
    /// Total number of workers.
    pub count: usize,
    /// Leader or follower.
    pub role: Role,
    /// Setup broadcast payload.
    pub payload: Arc<[u8]>,
    /// Shared suite configuration.
    pub suite: Arc<SuiteContext>,
}

/// Lifecycle tests executed by one worker.
///
/// An `Err` marks the worker's tests as failed; the suite still waits for
/// every worker and runs teardown.
pub trait LifecycleWorker: Send + Sync + 'static {
    fn run(&self, ctx: WorkerContext) -> impl Future<Output = Result<()>> + Send;
}

/// Runs an external test command with the suite tenancy in its environment.
#[derive(Debug, Clone)]
pub struct CommandWorker {
    program: String,
    args: Vec<String>,
    config_path: Option<PathBuf>,
}

impl CommandWorker {
    /// Build a worker from `command[0]` and its arguments.
    ///
    /// Returns `None` for an empty command line.
    pub fn from_command_line(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            config_path: None,
        })
    }

    /// Forward the suite configuration path as `CONFIG_PATH`.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Environment handed to the test command.
    pub fn environment(&self, ctx: &WorkerContext) -> Vec<(&'static str, String)> {
        let tenancy = &ctx.suite.tenancy;
        let mut env = vec![
            (WORKER_INDEX_ENV, ctx.index.to_string()),
            (WORKER_COUNT_ENV, ctx.count.to_string()),
            (ORG_ENV, tenancy.organization_name.clone()),
            (SPACE_ENV, tenancy.space_name.clone()),
            (SERVICE_OFFERING_ENV, ctx.suite.service_offering.clone()),
        ];
        if let Some(path) = &self.config_path {
            env.push((CONFIG_PATH_ENV, path.display().to_string()));
        }
        env
    }
}

impl LifecycleWorker for CommandWorker {
    async fn run(&self, ctx: WorkerContext) -> Result<()> {
        tracing::info!(
            worker = ctx.index,
            program = %self.program,
            "running lifecycle test command"
        );

        let status = Command::new(&self.program)
            .args(&self.args)
            .envs(self.environment(&ctx))
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| anyhow::anyhow!("failed to spawn '{}': {}", self.program, e))?;

        if !status.success() {
            bail!("test command '{}' exited with {}", self.program, status);
        }
        Ok(())
    }
}

/// Logs the plans visible to the worker and succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleWorker;

impl LifecycleWorker for IdleWorker {
    async fn run(&self, ctx: WorkerContext) -> Result<()> {
        for plan in ctx.suite.plans.iter() {
            tracing::info!(
                worker = ctx.index,
                offering = %ctx.suite.service_offering,
                plan = %plan.name,
                update_to = plan.update_to_plan.as_deref().unwrap_or("-"),
                has_params = plan.arbitrary_params.is_some(),
                "plan available"
            );
        }
        Ok(())
    }
}

/// Worker chosen by the `run` command.
#[derive(Debug, Clone)]
pub enum SuiteWorker {
    Command(CommandWorker),
    Idle(IdleWorker),
}

impl SuiteWorker {
    /// Pick the worker for a `run` invocation.
    ///
    /// A dry run never spawns the test command: its calls only go to the
    /// recording client, so there is no tenancy for the command to test.
    pub fn for_run(command: &[String], config_path: Option<&Path>, dry_run: bool) -> Self {
        let Some(worker) = CommandWorker::from_command_line(command) else {
            return Self::Idle(IdleWorker);
        };
        if dry_run {
            tracing::info!(
                program = %worker.program,
                args = ?worker.args,
                "dry run, test command not executed"
            );
            return Self::Idle(IdleWorker);
        }
        match config_path {
            Some(path) => Self::Command(worker.with_config_path(path)),
            None => Self::Command(worker),
        }
    }
}

impl LifecycleWorker for SuiteWorker {
    async fn run(&self, ctx: WorkerContext) -> Result<()> {
        match self {
            Self::Command(worker) => worker.run(ctx).await,
            Self::Idle(worker) => worker.run(ctx).await,
        }
    }
}
