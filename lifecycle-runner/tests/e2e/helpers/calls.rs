//! Assertions over the recorded platform call sequence.

use lifecycle_platform::{Operation, PlatformCall, RecordingClient};

use super::fixture::{OFFERING, ORG};

/// Plan names passed to `enable-service-access`, in call order.
#[allow(dead_code)]
pub fn enabled_plans(client: &RecordingClient) -> Vec<String> {
    client
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            PlatformCall::EnableServiceAccess {
                offering,
                plan,
                org,
            } => {
                assert_eq!(offering, OFFERING);
                assert_eq!(org, ORG);
                Some(plan)
            }
            _ => None,
        })
        .collect()
}

/// Plan names passed to `disable-service-access`, in call order.
#[allow(dead_code)]
pub fn disabled_plans(client: &RecordingClient) -> Vec<String> {
    client
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            PlatformCall::DisableServiceAccess {
                offering,
                plan,
                org,
            } => {
                assert_eq!(offering, OFFERING);
                assert_eq!(org, ORG);
                Some(plan)
            }
            _ => None,
        })
        .collect()
}

/// Assert that every call of `earlier` precedes every call of `later`.
///
/// # Panics
///
/// Panics if either operation was never called or the order is violated.
#[allow(dead_code)]
pub fn assert_all_before(client: &RecordingClient, earlier: Operation, later: Operation) {
    let ops = client.operations();
    let last_earlier = ops
        .iter()
        .rposition(|op| *op == earlier)
        .unwrap_or_else(|| panic!("{earlier} was never called"));
    let first_later = ops
        .iter()
        .position(|op| *op == later)
        .unwrap_or_else(|| panic!("{later} was never called"));
    assert!(
        last_earlier < first_later,
        "expected every {earlier} before {later}, got {ops:?}"
    );
}
