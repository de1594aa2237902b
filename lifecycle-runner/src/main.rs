mod cli;
mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::Instrument;
use uuid::Uuid;

use lifecycle_core::SuiteContext;
use lifecycle_core::config::{CONFIG_PATH_ENV, PlatformConfig, RunnerConfig, SuiteConfig};
use lifecycle_core::error::{ConfigError, LifecycleError};
use lifecycle_platform::{CfCliClient, PlatformClient, RecordingClient};
use lifecycle_runner::coordinator::Coordinator;
use lifecycle_runner::decommissioner::Decommissioner;
use lifecycle_runner::provisioner::Provisioner;
use lifecycle_runner::worker::{LifecycleWorker, SuiteWorker};

use crate::cli::{Commands, RunnerCli};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = RunnerCli::parse();

    // 로깅 초기화 전이므로 stderr로 직접 보고
    let config = match load_runner_config(&cli).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("lifecycle-runner: {e}");
            return exit_code(e.exit_code());
        }
    };

    if let Err(e) = logging::init_tracing(&config.general) {
        eprintln!("lifecycle-runner: {e:#}");
        return ExitCode::FAILURE;
    }

    match execute(&cli, &config).await {
        Ok(code) => exit_code(code),
        Err(e) => {
            tracing::error!(error = %e, exit_code = e.exit_code(), "lifecycle-runner failed");
            exit_code(e.exit_code())
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

/// Load the runner config, then apply CLI overrides on top.
async fn load_runner_config(cli: &RunnerCli) -> Result<RunnerConfig, LifecycleError> {
    let mut config = match &cli.config {
        Some(path) => RunnerConfig::load(path).await?,
        None => RunnerConfig::from_env()?,
    };

    if let Some(level) = &cli.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.general.log_format = format.clone();
    }
    if let Commands::Run {
        workers: Some(workers),
        ..
    } = &cli.command
    {
        config.coordinator.workers = *workers;
    }

    config.validate()?;
    Ok(config)
}

fn document_path(path: Option<&PathBuf>) -> Result<&Path, ConfigError> {
    path.map(PathBuf::as_path)
        .ok_or_else(|| ConfigError::PathNotSet {
            env_var: CONFIG_PATH_ENV.to_owned(),
        })
}

async fn load_context(
    cli: &RunnerCli,
    config: &RunnerConfig,
) -> Result<SuiteContext, LifecycleError> {
    let platform = PlatformConfig::load(document_path(cli.platform_config.as_ref())?).await?;
    let suite = SuiteConfig::load(document_path(cli.suite_config.as_ref())?).await?;
    Ok(SuiteContext::assemble(platform, suite, &config.tenancy)?)
}

async fn execute(cli: &RunnerCli, config: &RunnerConfig) -> Result<i32, LifecycleError> {
    let context = Arc::new(load_context(cli, config).await?);

    let dry_run = match &cli.command {
        Commands::Validate => {
            print_plan_table(&context);
            return Ok(0);
        }
        Commands::Run { dry_run, .. }
        | Commands::Setup { dry_run }
        | Commands::Teardown { dry_run } => *dry_run,
    };

    if dry_run {
        let client = Arc::new(RecordingClient::new());
        let result = dispatch(cli, config, Arc::clone(&client), context).await;
        for (index, call) in client.calls().iter().enumerate() {
            println!("{:>3}. cf {}", index + 1, call);
        }
        return result;
    }

    let client = CfCliClient::from_config(&config.cf, &config.quota, &config.security_group);
    dispatch(cli, config, Arc::new(client), context).await
}

async fn dispatch<C: PlatformClient>(
    cli: &RunnerCli,
    config: &RunnerConfig,
    client: Arc<C>,
    context: Arc<SuiteContext>,
) -> Result<i32, LifecycleError> {
    match &cli.command {
        Commands::Setup { .. } => {
            Provisioner::new(client, context).provision().await?;
            Ok(0)
        }
        Commands::Teardown { .. } => {
            Decommissioner::new(client, context).decommission().await?;
            Ok(0)
        }
        Commands::Run {
            test_command,
            dry_run,
            ..
        } => {
            let config_path = cli.suite_config.as_deref();
            let worker = SuiteWorker::for_run(test_command, config_path, *dry_run);
            run_suite(config, client, context, worker).await
        }
        Commands::Validate => Ok(0),
    }
}

async fn run_suite<C, W>(
    config: &RunnerConfig,
    client: Arc<C>,
    context: Arc<SuiteContext>,
    worker: W,
) -> Result<i32, LifecycleError>
where
    C: PlatformClient,
    W: LifecycleWorker,
{
    let run_id = Uuid::new_v4();
    let barrier_timeout = match config.coordinator.barrier_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };

    let coordinator = Coordinator::new(
        Provisioner::new(Arc::clone(&client), Arc::clone(&context)),
        Decommissioner::new(client, Arc::clone(&context)),
        worker,
        context,
    )
    .with_workers(config.coordinator.workers)
    .with_barrier_timeout(barrier_timeout);

    let span = tracing::info_span!("suite", %run_id);
    let outcome = coordinator.run().instrument(span).await?;

    for report in &outcome.workers {
        match &report.test_result {
            Ok(()) => tracing::info!(
                %run_id,
                worker = report.index,
                role = ?report.role,
                "worker passed"
            ),
            Err(reason) => tracing::warn!(
                %run_id,
                worker = report.index,
                role = ?report.role,
                reason = %reason,
                "worker failed"
            ),
        }
    }
    if let Err(e) = &outcome.rendezvous {
        tracing::warn!(%run_id, error = %e, "workers did not all reach the finish barrier");
    }
    if let Err(e) = &outcome.teardown {
        tracing::error!(%run_id, error = %e, "suite teardown failed");
    }

    let failed = outcome.failed_workers().count();
    tracing::info!(
        %run_id,
        workers = outcome.workers.len(),
        failed,
        success = outcome.is_success(),
        "suite finished"
    );

    Ok(outcome.exit_code())
}

fn print_plan_table(context: &SuiteContext) {
    println!("tenancy:  {}", context.tenancy);
    println!("offering: {}", context.service_offering);
    println!();
    println!("{:<24} {:<24} PARAMS", "PLAN", "UPDATE TO");
    for plan in context.plans.iter() {
        println!(
            "{:<24} {:<24} {}",
            plan.name,
            plan.update_to_plan.as_deref().unwrap_or("-"),
            if plan.arbitrary_params.is_some() { "yes" } else { "no" }
        );
    }
}
