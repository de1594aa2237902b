//! Plan access is granted and revoked per plan, in registry order.
//!
//! Runs the complete suite with four workers against the plans
//! ["small", "large"] of the `p-rabbitmq` offering.

use std::sync::Arc;

use lifecycle_platform::{Operation, PlatformCall, RecordingClient};
use lifecycle_runner::coordinator::Coordinator;
use lifecycle_runner::decommissioner::Decommissioner;
use lifecycle_runner::provisioner::Provisioner;
use lifecycle_runner::worker::IdleWorker;

use crate::helpers::calls::{assert_all_before, disabled_plans, enabled_plans};
use crate::helpers::fixture::{ORG, SPACE, SuiteFixture};

async fn run_suite(fixture: &SuiteFixture, workers: usize) -> Arc<RecordingClient> {
    let client = Arc::new(RecordingClient::new());
    let ctx = fixture.context();
    let outcome = Coordinator::new(
        Provisioner::new(Arc::clone(&client), Arc::clone(&ctx)),
        Decommissioner::new(Arc::clone(&client), Arc::clone(&ctx)),
        IdleWorker,
        ctx,
    )
    .with_workers(workers)
    .run()
    .await
    .expect("suite should run");
    assert!(outcome.is_success());
    client
}

#[tokio::test]
async fn test_e2e_two_plans_enabled_and_disabled_in_order() {
    // Given: plans ["small", "large"] on p-rabbitmq
    let fixture = SuiteFixture::new().plans(&["small", "large"]);

    // When: the suite runs with four workers
    let client = run_suite(&fixture, 4).await;

    // Then: enable small then large, disable small then large before delete-space
    assert_eq!(enabled_plans(&client), ["small", "large"]);
    assert_eq!(disabled_plans(&client), ["small", "large"]);
    assert_all_before(&client, Operation::CreateQuota, Operation::EnableServiceAccess);
    assert_all_before(&client, Operation::DisableServiceAccess, Operation::DeleteSpace);
}

#[tokio::test]
async fn test_e2e_repeated_plan_name_is_granted_per_entry() {
    // Given: the same plan listed twice
    let fixture = SuiteFixture::new().plans(&["small", "small"]);

    // When: the suite runs
    let client = run_suite(&fixture, 2).await;

    // Then: each entry is enabled and disabled on its own
    assert_eq!(enabled_plans(&client), ["small", "small"]);
    assert_eq!(disabled_plans(&client), ["small", "small"]);
    assert_all_before(&client, Operation::EnableServiceAccess, Operation::DisableServiceAccess);
}

#[tokio::test]
async fn test_e2e_full_call_sequence() {
    let fixture = SuiteFixture::new().plans(&["small", "large"]);

    let client = run_suite(&fixture, 3).await;

    assert_eq!(
        client.operations(),
        vec![
            Operation::Api,
            Operation::Auth,
            Operation::CreateOrg,
            Operation::CreateSpace,
            Operation::Target,
            Operation::CreateSecurityGroup,
            Operation::BindSecurityGroup,
            Operation::CreateQuota,
            Operation::SetQuota,
            Operation::EnableServiceAccess,
            Operation::EnableServiceAccess,
            Operation::Target,
            Operation::DisableServiceAccess,
            Operation::DisableServiceAccess,
            Operation::DeleteSpace,
            Operation::DeleteOrg,
            Operation::DeleteQuota,
            Operation::DeleteSecurityGroup,
        ]
    );
}

#[tokio::test]
async fn test_e2e_containment_order() {
    let fixture = SuiteFixture::new().plans(&["single-node"]);

    let client = run_suite(&fixture, 2).await;

    assert_all_before(&client, Operation::CreateOrg, Operation::CreateSpace);
    assert_all_before(&client, Operation::DeleteSpace, Operation::DeleteOrg);
    assert_eq!(
        client.calls()[3],
        PlatformCall::CreateSpace {
            org: ORG.to_owned(),
            space: SPACE.to_owned(),
        }
    );
}
