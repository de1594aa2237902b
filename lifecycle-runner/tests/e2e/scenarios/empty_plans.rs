//! An empty plan list skips plan access entirely.

use std::sync::Arc;

use lifecycle_platform::{Operation, RecordingClient};
use lifecycle_runner::decommissioner::Decommissioner;
use lifecycle_runner::provisioner::Provisioner;

use crate::helpers::fixture::SuiteFixture;

#[tokio::test]
async fn test_e2e_empty_plans_provision_ends_at_set_quota() {
    let client = Arc::new(RecordingClient::new());
    let ctx = SuiteFixture::new().context();

    Provisioner::new(Arc::clone(&client), ctx)
        .provision()
        .await
        .expect("should provision");

    assert_eq!(client.count(Operation::EnableServiceAccess), 0);
    assert_eq!(client.operations().last(), Some(&Operation::SetQuota));
}

#[tokio::test]
async fn test_e2e_empty_plans_teardown_goes_from_target_to_delete_space() {
    let client = Arc::new(RecordingClient::new());
    let ctx = SuiteFixture::new().context();

    Decommissioner::new(Arc::clone(&client), ctx)
        .decommission()
        .await
        .expect("should decommission");

    let ops = client.operations();
    assert_eq!(client.count(Operation::DisableServiceAccess), 0);
    assert_eq!(&ops[..2], &[Operation::Target, Operation::DeleteSpace]);
}
