//! Invalid configuration is rejected before any platform call.

use lifecycle_core::SuiteContext;
use lifecycle_core::config::{PlatformConfig, SuiteConfig, TenancyConfig};
use lifecycle_core::error::{ConfigError, LifecycleError};
use lifecycle_core::types::PlanSpec;

use crate::helpers::fixture::SuiteFixture;

#[tokio::test]
async fn test_e2e_combined_document_loads_both_views() {
    // Given: one JSON file carrying platform and suite fields
    let fixture = SuiteFixture::new()
        .plans(&["single-node"])
        .plan(PlanSpec::named("cluster").with_update_to("single-node"));
    let (_dir, path) = fixture.write_combined();

    // When: both documents are loaded from the same path
    let platform = PlatformConfig::load(&path).await.expect("platform view");
    let suite = SuiteConfig::load(&path).await.expect("suite view");
    let ctx = SuiteContext::assemble(platform, suite, &TenancyConfig::default())
        .expect("valid context");

    // Then: the plan registry keeps the document order
    let names: Vec<&str> = ctx.plans.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["single-node", "cluster"]);
    assert_eq!(
        ctx.plans.get("cluster").and_then(|p| p.update_to_plan.as_deref()),
        Some("single-node")
    );
}

#[tokio::test]
async fn test_e2e_missing_document_is_file_not_found() {
    let err = SuiteConfig::load("/nonexistent/lifecycle/config.json")
        .await
        .expect_err("missing file");

    assert!(matches!(
        err,
        LifecycleError::Config(ConfigError::FileNotFound { .. })
    ));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_e2e_missing_org_name_rejected() {
    let fixture = SuiteFixture::new().plans(&["small"]);
    let mut platform = fixture.platform();
    platform.org_name.clear();

    let err = SuiteContext::assemble(platform, fixture.suite(), &TenancyConfig::default())
        .expect_err("org_name is required");

    assert!(matches!(err, ConfigError::MissingField { ref field } if field == "org_name"));
}
