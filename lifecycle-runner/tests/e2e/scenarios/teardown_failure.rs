//! Teardown failures are reported without losing worker results.

use std::sync::Arc;

use lifecycle_core::error::LifecycleError;
use lifecycle_platform::{Operation, RecordingClient};
use lifecycle_runner::coordinator::Coordinator;
use lifecycle_runner::decommissioner::Decommissioner;
use lifecycle_runner::provisioner::Provisioner;
use lifecycle_runner::worker::IdleWorker;

use crate::helpers::calls::disabled_plans;
use crate::helpers::fixture::SuiteFixture;

#[tokio::test]
async fn test_e2e_delete_space_failure_skips_remaining_teardown() {
    // Given: delete-space fails
    let client = Arc::new(RecordingClient::new().failing_on(Operation::DeleteSpace));
    let ctx = SuiteFixture::new().plans(&["small", "large"]).context();

    // When: the suite runs
    let outcome = Coordinator::new(
        Provisioner::new(Arc::clone(&client), Arc::clone(&ctx)),
        Decommissioner::new(Arc::clone(&client), Arc::clone(&ctx)),
        IdleWorker,
        ctx,
    )
    .with_workers(2)
    .run()
    .await
    .expect("worker results are returned");

    // Then: workers passed, plans were revoked, deletion stopped at the space
    assert_eq!(outcome.failed_workers().count(), 0);
    assert!(matches!(outcome.teardown, Err(LifecycleError::Remote(_))));
    assert_eq!(outcome.exit_code(), 3);
    assert_eq!(disabled_plans(&client), ["small", "large"]);
    assert_eq!(client.count(Operation::DeleteOrg), 0);
    assert_eq!(client.count(Operation::DeleteQuota), 0);
    assert_eq!(client.count(Operation::DeleteSecurityGroup), 0);
}

#[tokio::test]
async fn test_e2e_standalone_teardown_revokes_all_plans() {
    // Given: no provisioning happened in this process
    let client = Arc::new(RecordingClient::new());
    let ctx = SuiteFixture::new().plans(&["small", "large"]).context();

    // When: the operator runs teardown alone
    Decommissioner::new(Arc::clone(&client), ctx)
        .decommission()
        .await
        .expect("should decommission");

    // Then: every configured plan is revoked
    assert_eq!(disabled_plans(&client), ["small", "large"]);
    assert_eq!(client.count(Operation::DeleteOrg), 1);
}
