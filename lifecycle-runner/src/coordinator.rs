//! Single-execution coordination across parallel workers.
//!
//! The [`Coordinator`] spawns N workers that share one [`ExecutionBarrier`].
//! The barrier guarantees:
//!
//! - exactly one worker (the leader, first to take the setup lock) runs the
//!   setup phase, and no worker starts its lifecycle tests before the leader
//!   has broadcast completion;
//! - every worker signals the finish rendezvous after its tests, and only
//!   then does the leader run the teardown phase.
//!
//! # Phases
//!
//! ```text
//! worker 0 ─┐                       ┌─ tests ─┐
//! worker 1 ─┼─ setup lock ─ leader ─┼─ tests ─┼─ finish barrier ─ leader: teardown
//! worker N ─┘   (followers wait     └─ tests ─┘
//!                on the broadcast)
//! ```
//!
//! A setup failure is fatal: the leader returns its error, followers return
//! `SyncError::SetupFailed`, and teardown never runs. Once setup succeeded,
//! the leader always runs teardown, even when the finish rendezvous timed out.
//! Teardown failures do not discard the collected worker results.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Barrier, Mutex, watch};
use tracing::Instrument;

use lifecycle_core::SuiteContext;
use lifecycle_core::error::{LifecycleError, SyncError};

use crate::worker::{LifecycleWorker, WorkerContext};

/// A suite-level phase run once by the leader (setup or teardown).
pub trait SuitePhase: Send + Sync + 'static {
    /// Phase name for logging.
    fn name(&self) -> &'static str;

    /// Run the phase to completion.
    fn run(&self) -> impl Future<Output = Result<(), LifecycleError>> + Send;
}

/// The part a worker plays in the suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Runs setup and teardown.
    Leader,
    /// Waits for the leader at both barriers.
    Follower,
}

/// `None` until the leader broadcasts its setup result.
type SetupSignal = Option<Result<Arc<[u8]>, String>>;

struct Election {
    leader: Option<usize>,
    /// Moved to the leader on election; dropped with it if it never broadcasts.
    setup_tx: Option<watch::Sender<SetupSignal>>,
}

/// Two-phase synchronization state shared by all workers of one suite run.
pub struct ExecutionBarrier {
    workers: usize,
    timeout: Option<Duration>,
    election: Mutex<Election>,
    setup_rx: watch::Receiver<SetupSignal>,
    finish: Barrier,
}

/// What a worker observed at the finish rendezvous.
#[derive(Debug)]
pub struct FinishOutcome {
    /// `Err` when the rendezvous timed out before every worker arrived.
    pub rendezvous: Result<(), SyncError>,
    /// The teardown result; `None` for followers.
    pub teardown: Option<Result<(), LifecycleError>>,
}

impl ExecutionBarrier {
    /// Create a barrier for `workers` participants.
    ///
    /// `timeout` bounds the finish rendezvous; `None` waits forever. The
    /// setup broadcast is never bounded, so a slow setup cannot strand a
    /// provisioned tenancy.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidWorkerCount` when `workers` is zero.
    pub fn new(workers: usize, timeout: Option<Duration>) -> Result<Self, SyncError> {
        if workers == 0 {
            return Err(SyncError::InvalidWorkerCount(workers));
        }
        let (setup_tx, setup_rx) = watch::channel(None);
        Ok(Self {
            workers,
            timeout,
            election: Mutex::new(Election {
                leader: None,
                setup_tx: Some(setup_tx),
            }),
            setup_rx,
            finish: Barrier::new(workers),
        })
    }

    /// Number of participating workers.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Index of the elected leader, if any worker has taken the setup lock.
    pub async fn leader(&self) -> Option<usize> {
        self.election.lock().await.leader
    }

    /// Phase one: elect a leader, run `setup` on it, release everyone.
    ///
    /// The leader runs `setup` and broadcasts its payload (or its failure).
    /// Followers return only after that broadcast.
    ///
    /// # Errors
    ///
    /// - the leader gets the error returned by `setup`
    /// - followers get `SyncError::SetupFailed` carrying the leader's message
    /// - followers get `SyncError::LeaderGone` when the leader is dropped
    ///   before broadcasting
    pub async fn synchronized_setup<F, Fut>(
        &self,
        worker: usize,
        setup: F,
    ) -> Result<(Role, Arc<[u8]>), LifecycleError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>, LifecycleError>>,
    {
        let setup_tx = {
            let mut election = self.election.lock().await;
            match election.leader {
                None => {
                    election.leader = Some(worker);
                    election.setup_tx.take()
                }
                Some(_) => None,
            }
        };

        if let Some(setup_tx) = setup_tx {
            tracing::info!(worker, "elected leader, running suite setup");
            return match setup().await {
                Ok(payload) => {
                    let payload: Arc<[u8]> = payload.into();
                    setup_tx.send_replace(Some(Ok(Arc::clone(&payload))));
                    tracing::info!(worker, "suite setup complete, releasing workers");
                    Ok((Role::Leader, payload))
                }
                Err(e) => {
                    setup_tx.send_replace(Some(Err(e.to_string())));
                    tracing::error!(worker, error = %e, "suite setup failed");
                    Err(e)
                }
            };
        }

        tracing::debug!(worker, "waiting for leader to finish setup");
        let mut rx = self.setup_rx.clone();
        let signal = rx
            .wait_for(Option::is_some)
            .await
            .map(|signal| SetupSignal::clone(&signal))
            .map_err(|_| SyncError::LeaderGone)?;

        match signal.ok_or(SyncError::LeaderGone)? {
            Ok(payload) => Ok((Role::Follower, payload)),
            Err(reason) => Err(SyncError::SetupFailed(reason).into()),
        }
    }

    /// Phase two: wait for every worker, then run `teardown` on the leader.
    ///
    /// The leader runs `teardown` even when the rendezvous times out; the
    /// timeout is reported in [`FinishOutcome::rendezvous`].
    pub async fn synchronized_teardown<F, Fut>(
        &self,
        worker: usize,
        role: Role,
        teardown: F,
    ) -> FinishOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), LifecycleError>>,
    {
        tracing::debug!(worker, "worker finished, waiting for peers");
        let rendezvous = self.bounded("finish", self.finish.wait()).await.map(|_| ());
        if let Err(e) = &rendezvous {
            tracing::warn!(worker, error = %e, "not every worker reached the finish barrier");
        }

        if role != Role::Leader {
            return FinishOutcome {
                rendezvous,
                teardown: None,
            };
        }

        tracing::info!(worker, "running suite teardown");
        FinishOutcome {
            rendezvous,
            teardown: Some(teardown().await),
        }
    }

    async fn bounded<T>(
        &self,
        phase: &'static str,
        wait: impl Future<Output = T>,
    ) -> Result<T, SyncError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .map_err(|_| SyncError::Timeout {
                    phase,
                    secs: limit.as_secs(),
                }),
            None => Ok(wait.await),
        }
    }
}

/// Outcome of one worker's lifecycle tests.
#[derive(Debug, Clone)]
pub struct WorkerReport {
    /// Worker index (0-based).
    pub index: usize,
    /// Leader or follower.
    pub role: Role,
    /// `Err` carries the failure message of the worker's tests.
    pub test_result: Result<(), String>,
}

/// Result of a suite run whose setup succeeded.
#[derive(Debug)]
pub struct SuiteOutcome {
    /// Per-worker results, ordered by worker index.
    pub workers: Vec<WorkerReport>,
    /// First finish-barrier timeout observed by any worker.
    pub rendezvous: Result<(), SyncError>,
    /// The leader's teardown result.
    pub teardown: Result<(), LifecycleError>,
}

impl SuiteOutcome {
    /// Workers whose tests failed.
    pub fn failed_workers(&self) -> impl Iterator<Item = &WorkerReport> {
        self.workers.iter().filter(|w| w.test_result.is_err())
    }

    /// Whether every worker passed, met at the finish barrier, and teardown
    /// completed.
    pub fn is_success(&self) -> bool {
        self.teardown.is_ok()
            && self.rendezvous.is_ok()
            && self.failed_workers().next().is_none()
    }

    /// Process exit code for this outcome.
    ///
    /// Precedence: teardown failure, then rendezvous timeout, then test
    /// failures.
    pub fn exit_code(&self) -> i32 {
        if let Err(e) = &self.teardown {
            return e.exit_code();
        }
        if let Err(e) = &self.rendezvous {
            return LifecycleError::Sync(e.clone()).exit_code();
        }
        if self.failed_workers().next().is_some() {
            return 1;
        }
        0
    }
}

struct WorkerExit {
    report: WorkerReport,
    finish: FinishOutcome,
}

/// Runs setup once, N workers in parallel, then teardown once.
pub struct Coordinator<P, D, W> {
    setup: Arc<P>,
    teardown: Arc<D>,
    worker: Arc<W>,
    context: Arc<SuiteContext>,
    workers: usize,
    barrier_timeout: Option<Duration>,
}

impl<P, D, W> Coordinator<P, D, W>
where
    P: SuitePhase,
    D: SuitePhase,
    W: LifecycleWorker,
{
    /// Create a coordinator with a single worker and no barrier timeout.
    pub fn new(setup: P, teardown: D, worker: W, context: Arc<SuiteContext>) -> Self {
        Self {
            setup: Arc::new(setup),
            teardown: Arc::new(teardown),
            worker: Arc::new(worker),
            context,
            workers: 1,
            barrier_timeout: None,
        }
    }

    /// Set the number of parallel workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Bound the finish rendezvous (`None` waits forever).
    pub fn with_barrier_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.barrier_timeout = timeout;
        self
    }

    /// Run the whole suite.
    ///
    /// Returns only after every worker task has exited, which includes the
    /// leader's teardown.
    ///
    /// # Errors
    ///
    /// Returns the leader's setup error when setup fails (teardown is not
    /// attempted), or a `SyncError` when the worker count is invalid or a
    /// worker task is lost.
    pub async fn run(&self) -> Result<SuiteOutcome, LifecycleError> {
        let barrier = Arc::new(ExecutionBarrier::new(
            self.workers,
            self.barrier_timeout,
        )?);

        tracing::info!(
            workers = self.workers,
            setup = self.setup.name(),
            teardown = self.teardown.name(),
            "starting suite workers"
        );

        let mut handles = Vec::with_capacity(self.workers);
        for index in 0..self.workers {
            let task = worker_task(
                index,
                Arc::clone(&barrier),
                Arc::clone(&self.setup),
                Arc::clone(&self.teardown),
                Arc::clone(&self.worker),
                Arc::clone(&self.context),
            );
            handles.push(tokio::spawn(
                task.instrument(tracing::info_span!("worker", index)),
            ));
        }

        let mut exits = Vec::with_capacity(handles.len());
        let mut setup_error: Option<LifecycleError> = None;
        let mut follower_error: Option<LifecycleError> = None;

        for handle in handles {
            match handle.await {
                Ok(Ok(exit)) => exits.push(exit),
                Ok(Err(LifecycleError::Sync(SyncError::SetupFailed(reason)))) => {
                    follower_error =
                        follower_error.or(Some(SyncError::SetupFailed(reason).into()));
                }
                Ok(Err(e)) => {
                    setup_error = setup_error.or(Some(e));
                }
                Err(e) => {
                    setup_error =
                        setup_error.or(Some(SyncError::WorkerAborted(e.to_string()).into()));
                }
            }
        }

        if let Some(e) = setup_error.or(follower_error) {
            tracing::error!(error = %e, "suite aborted before lifecycle tests completed");
            return Err(e);
        }

        let mut rendezvous = Ok(());
        let mut teardown = Ok(());
        let mut workers = Vec::with_capacity(exits.len());
        for exit in exits {
            if let Some(result) = exit.finish.teardown {
                teardown = result;
            }
            if rendezvous.is_ok() {
                rendezvous = exit.finish.rendezvous;
            }
            workers.push(exit.report);
        }

        Ok(SuiteOutcome {
            workers,
            rendezvous,
            teardown,
        })
    }
}

async fn worker_task<P, D, W>(
    index: usize,
    barrier: Arc<ExecutionBarrier>,
    setup: Arc<P>,
    teardown: Arc<D>,
    body: Arc<W>,
    suite: Arc<SuiteContext>,
) -> Result<WorkerExit, LifecycleError>
where
    P: SuitePhase,
    D: SuitePhase,
    W: LifecycleWorker,
{
    let count = barrier.workers();

    // The setup phase runs in its own task so a panic still reaches the
    // followers as a failure broadcast.
    let (role, payload) = barrier
        .synchronized_setup(index, || async move {
            match tokio::spawn(async move { setup.run().await }).await {
                Ok(result) => result.map(|()| Vec::new()),
                Err(e) => Err(SyncError::WorkerAborted(format!("setup task: {e}")).into()),
            }
        })
        .await?;

    let ctx = WorkerContext {
        index,
        count,
        role,
        payload,
        suite,
    };
    let test_result = match tokio::spawn(async move { body.run(ctx).await }).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(format!("{e:#}")),
        Err(e) => Err(format!("worker task aborted: {e}")),
    };

    match &test_result {
        Ok(()) => tracing::info!(index, "lifecycle tests passed"),
        Err(reason) => tracing::warn!(index, reason = %reason, "lifecycle tests failed"),
    }

    let finish = barrier
        .synchronized_teardown(index, role, || async move {
            match tokio::spawn(async move { teardown.run().await }).await {
                Ok(result) => result,
                Err(e) => Err(SyncError::WorkerAborted(format!("teardown task: {e}")).into()),
            }
        })
        .await;

    Ok(WorkerExit {
        report: WorkerReport {
            index,
            role,
            test_result,
        },
        finish,
    })
}
