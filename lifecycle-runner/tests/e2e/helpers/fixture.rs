//! Suite fixture builder for E2E tests.
//!
//! Provides [`SuiteFixture`] for creating `SuiteContext` instances and the
//! matching JSON documents on disk.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use lifecycle_core::SuiteContext;
use lifecycle_core::config::{PlatformConfig, SuiteConfig, TenancyConfig};
use lifecycle_core::types::PlanSpec;

pub const ORG: &str = "lifecycle-org";
pub const SPACE: &str = "lifecycle-space";
pub const OFFERING: &str = "p-rabbitmq";

/// Builder for a suite with a given plan list.
///
/// Defaults to the `p-rabbitmq` offering and no plans.
#[allow(dead_code)]
pub struct SuiteFixture {
    plans: Vec<PlanSpec>,
}

#[allow(dead_code)]
impl SuiteFixture {
    pub fn new() -> Self {
        Self { plans: Vec::new() }
    }

    /// Add plans by name, in order.
    pub fn plans(mut self, names: &[&str]) -> Self {
        self.plans.extend(names.iter().map(|n| PlanSpec::named(*n)));
        self
    }

    /// Add a fully specified plan.
    pub fn plan(mut self, plan: PlanSpec) -> Self {
        self.plans.push(plan);
        self
    }

    pub fn platform(&self) -> PlatformConfig {
        PlatformConfig {
            api: "https://api.sys.example.com".to_owned(),
            admin_user: "admin".to_owned(),
            admin_password: "admin-secret".to_owned(),
            skip_ssl_validation: true,
            org_name: ORG.to_owned(),
            ..Default::default()
        }
    }

    pub fn suite(&self) -> SuiteConfig {
        SuiteConfig {
            plans: self.plans.clone(),
            service_offering: OFFERING.to_owned(),
            app_type: "spring".to_owned(),
            space_name: SPACE.to_owned(),
        }
    }

    /// Assemble the shared suite context.
    pub fn context(&self) -> Arc<SuiteContext> {
        let ctx = SuiteContext::assemble(self.platform(), self.suite(), &TenancyConfig::default())
            .expect("fixture context should be valid");
        Arc::new(ctx)
    }

    /// Write platform and suite fields into one JSON document.
    ///
    /// Returns the temp directory (keep it alive) and the file path.
    pub fn write_combined(&self) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        let platform = self.platform();
        let plans: Vec<_> = self
            .plans
            .iter()
            .map(|p| serde_json::to_value(p).expect("plan serializes"))
            .collect();
        let document = json!({
            "api": platform.api,
            "admin_user": platform.admin_user,
            "admin_password": platform.admin_password,
            "skip_ssl_validation": platform.skip_ssl_validation,
            "org_name": platform.org_name,
            "plans": plans,
            "service_offering": OFFERING,
            "app_type": "spring",
            "space_name": SPACE,
        });
        std::fs::write(&path, document.to_string()).expect("write config");
        (dir, path)
    }
}
