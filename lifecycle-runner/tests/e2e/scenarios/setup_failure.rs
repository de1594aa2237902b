//! A failing provisioning step is fatal to the suite.
//!
//! Nothing after the failing step is attempted, no worker runs its tests
//! and no teardown is attempted.

use std::sync::Arc;

use lifecycle_core::error::LifecycleError;
use lifecycle_platform::{Operation, PlatformCall, RecordingClient};
use lifecycle_runner::coordinator::Coordinator;
use lifecycle_runner::decommissioner::Decommissioner;
use lifecycle_runner::provisioner::Provisioner;
use lifecycle_runner::worker::IdleWorker;

use crate::helpers::calls::enabled_plans;
use crate::helpers::fixture::{ORG, SuiteFixture};

async fn run_failing_suite(client: Arc<RecordingClient>, fixture: &SuiteFixture) -> LifecycleError {
    let ctx = fixture.context();
    Coordinator::new(
        Provisioner::new(Arc::clone(&client), Arc::clone(&ctx)),
        Decommissioner::new(Arc::clone(&client), Arc::clone(&ctx)),
        IdleWorker,
        ctx,
    )
    .with_workers(4)
    .run()
    .await
    .expect_err("setup failure must abort the suite")
}

#[tokio::test]
async fn test_e2e_create_space_failure_stops_provisioning() {
    // Given: create-space is rejected by the platform
    let client = Arc::new(RecordingClient::new().failing_on(Operation::CreateSpace));
    let fixture = SuiteFixture::new().plans(&["small", "large"]);

    // When: the suite runs
    let err = run_failing_suite(Arc::clone(&client), &fixture).await;

    // Then: the remote error surfaces, later steps and teardown never run
    match err {
        LifecycleError::Remote(remote) => assert_eq!(remote.operation, "create-space"),
        other => panic!("expected remote error, got {other:?}"),
    }
    assert_eq!(client.count(Operation::CreateSecurityGroup), 0);
    assert_eq!(client.count(Operation::CreateQuota), 0);
    assert_eq!(client.count(Operation::EnableServiceAccess), 0);
    assert_eq!(client.count(Operation::DeleteOrg), 0);
    assert_eq!(client.count(Operation::CreateOrg), 1);
}

#[tokio::test]
async fn test_e2e_second_plan_failure_keeps_first_enabled() {
    // Given: enabling "large" fails
    let client = Arc::new(RecordingClient::new().failing_on_call(
        PlatformCall::EnableServiceAccess {
            offering: "p-rabbitmq".to_owned(),
            plan: "large".to_owned(),
            org: ORG.to_owned(),
        },
    ));
    let fixture = SuiteFixture::new().plans(&["small", "large", "xlarge"]);

    // When: the suite runs
    let err = run_failing_suite(Arc::clone(&client), &fixture).await;

    // Then: "small" stays enabled, "xlarge" was never attempted
    assert!(matches!(err, LifecycleError::Remote(_)));
    assert_eq!(enabled_plans(&client), ["small", "large"]);
    assert_eq!(client.count(Operation::DisableServiceAccess), 0);
}
