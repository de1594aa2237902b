//! Tenancy provisioning -- the ordered setup sequence.
//!
//! # Creation Order (dependencies before dependents)
//!
//! 1. `api` + `auth` (session)
//! 2. `create-org`
//! 3. `create-space` (contained in the org)
//! 4. `target` org/space
//! 5. `create-security-group` + `bind-security-group` (needs org and space)
//! 6. `create-quota` + `set-quota` (needs org)
//! 7. `enable-service-access` once per plan, registry order
//!
//! The first failure aborts the sequence. Nothing already created is rolled
//! back; the decommissioner cleans up unconditionally on its own pass.

use std::future::Future;
use std::sync::Arc;

use lifecycle_core::SuiteContext;
use lifecycle_core::error::LifecycleError;
use lifecycle_platform::{PlatformClient, PlatformError};

use crate::coordinator::SuitePhase;

/// Creates the suite tenancy and grants plan access.
pub struct Provisioner<C: PlatformClient> {
    client: Arc<C>,
    context: Arc<SuiteContext>,
}

impl<C: PlatformClient> Provisioner<C> {
    /// Create a provisioner sharing the platform client and suite context.
    pub fn new(client: Arc<C>, context: Arc<SuiteContext>) -> Self {
        Self { client, context }
    }

    /// Run the full provisioning sequence.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Remote` for the first platform call that
    /// fails. Later steps are never attempted.
    pub async fn provision(&self) -> Result<(), LifecycleError> {
        let platform = &self.context.platform;
        let tenancy = &self.context.tenancy;
        let org = tenancy.organization_name.as_str();
        let space = tenancy.space_name.as_str();

        tracing::info!(
            tenancy = %tenancy,
            plans = self.context.plans.len(),
            "provisioning suite tenancy"
        );

        step(
            "api",
            self.client.api(&platform.api, platform.skip_ssl_validation),
        )
        .await?;
        step(
            "auth",
            self.client
                .auth(&platform.admin_user, &platform.admin_password),
        )
        .await?;
        step("create-org", self.client.create_org(org)).await?;
        step("create-space", self.client.create_space(org, space)).await?;
        step("target", self.client.target(org, space)).await?;

        let group = tenancy.security_group_name.as_str();
        step(
            "create-security-group",
            self.client.create_security_group(group),
        )
        .await?;
        step(
            "bind-security-group",
            self.client.bind_security_group(group, org, space),
        )
        .await?;

        let quota = tenancy.quota_name.as_str();
        step("create-quota", self.client.create_quota(quota)).await?;
        step("set-quota", self.client.set_quota(org, quota)).await?;

        for grant in self.context.grants() {
            tracing::debug!(plan = grant.plan_name, "granting plan access");
            step(
                "enable-service-access",
                self.client
                    .enable_service_access(grant.service_offering, grant.plan_name, org),
            )
            .await?;
        }

        tracing::info!(tenancy = %tenancy, "suite tenancy provisioned");
        Ok(())
    }
}

impl<C: PlatformClient> SuitePhase for Provisioner<C> {
    fn name(&self) -> &'static str {
        "provision"
    }

    async fn run(&self) -> Result<(), LifecycleError> {
        self.provision().await
    }
}

/// Await one platform call, logging its outcome.
pub(crate) async fn step<F>(name: &'static str, call: F) -> Result<(), LifecycleError>
where
    F: Future<Output = Result<(), PlatformError>>,
{
    tracing::info!(step = name, "running step");
    match call.await {
        Ok(()) => {
            tracing::debug!(step = name, "step completed");
            Ok(())
        }
        Err(e) => {
            tracing::error!(step = name, error = %e, "step failed");
            Err(e.into())
        }
    }
}
