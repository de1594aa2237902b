//! Tenancy decommissioning -- the ordered teardown sequence.
//!
//! # Teardown Order
//!
//! 1. `target` org/space (the context may not have survived the tests)
//! 2. `disable-service-access` once per plan, registry order, for every
//!    configured plan regardless of how far provisioning got
//! 3. `delete-space`
//! 4. `delete-org`
//! 5. `delete-quota`
//! 6. `delete-security-group`
//!
//! Space goes before org because the space lives inside the org. Quota and
//! security group are standalone named definitions; their relative order is
//! kept as observed and is not a containment requirement.
//!
//! A failing step aborts the remaining ones. The skipped steps are logged so
//! an operator knows which resources need manual cleanup.

use std::fmt;
use std::sync::Arc;

use lifecycle_core::error::LifecycleError;
use lifecycle_core::{PlanGrant, SuiteContext};
use lifecycle_platform::PlatformClient;

use crate::coordinator::SuitePhase;
use crate::provisioner::step;

/// One planned teardown step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownStep<'a> {
    Target,
    DisableServiceAccess(PlanGrant<'a>),
    DeleteSpace,
    DeleteOrg,
    DeleteQuota,
    DeleteSecurityGroup,
}

impl fmt::Display for TeardownStep<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Target => f.write_str("target"),
            Self::DisableServiceAccess(grant) => write!(f, "disable-service-access({grant})"),
            Self::DeleteSpace => f.write_str("delete-space"),
            Self::DeleteOrg => f.write_str("delete-org"),
            Self::DeleteQuota => f.write_str("delete-quota"),
            Self::DeleteSecurityGroup => f.write_str("delete-security-group"),
        }
    }
}

/// Removes plan access and destroys the suite tenancy.
pub struct Decommissioner<C: PlatformClient> {
    client: Arc<C>,
    context: Arc<SuiteContext>,
}

impl<C: PlatformClient> Decommissioner<C> {
    /// Create a decommissioner sharing the platform client and suite context.
    pub fn new(client: Arc<C>, context: Arc<SuiteContext>) -> Self {
        Self { client, context }
    }

    /// The full teardown sequence, in execution order.
    pub fn steps(&self) -> Vec<TeardownStep<'_>> {
        let mut steps = Vec::with_capacity(self.context.plans.len() + 5);
        steps.push(TeardownStep::Target);
        steps.extend(
            self.context
                .grants()
                .map(TeardownStep::DisableServiceAccess),
        );
        steps.extend([
            TeardownStep::DeleteSpace,
            TeardownStep::DeleteOrg,
            TeardownStep::DeleteQuota,
            TeardownStep::DeleteSecurityGroup,
        ]);
        steps
    }

    /// Run the full teardown sequence.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Remote` for the first platform call that
    /// fails; the remaining steps are skipped and logged.
    pub async fn decommission(&self) -> Result<(), LifecycleError> {
        let tenancy = &self.context.tenancy;
        let steps = self.steps();

        tracing::info!(
            tenancy = %tenancy,
            steps = steps.len(),
            "decommissioning suite tenancy"
        );

        for (index, current) in steps.iter().enumerate() {
            if let Err(e) = self.execute(*current).await {
                let skipped: Vec<String> =
                    steps[index + 1..].iter().map(|s| s.to_string()).collect();
                tracing::error!(
                    failed_step = %current,
                    skipped = ?skipped,
                    tenancy = %tenancy,
                    "teardown aborted, manual cleanup required"
                );
                return Err(e);
            }
        }

        tracing::info!(tenancy = %tenancy, "suite tenancy decommissioned");
        Ok(())
    }

    async fn execute(&self, current: TeardownStep<'_>) -> Result<(), LifecycleError> {
        let tenancy = &self.context.tenancy;
        let org = tenancy.organization_name.as_str();

        match current {
            TeardownStep::Target => {
                step("target", self.client.target(org, &tenancy.space_name)).await
            }
            TeardownStep::DisableServiceAccess(grant) => {
                tracing::debug!(plan = grant.plan_name, "revoking plan access");
                step(
                    "disable-service-access",
                    self.client
                        .disable_service_access(grant.service_offering, grant.plan_name, org),
                )
                .await
            }
            TeardownStep::DeleteSpace => {
                step("delete-space", self.client.delete_space(&tenancy.space_name)).await
            }
            TeardownStep::DeleteOrg => step("delete-org", self.client.delete_org(org)).await,
            TeardownStep::DeleteQuota => {
                step("delete-quota", self.client.delete_quota(&tenancy.quota_name)).await
            }
            TeardownStep::DeleteSecurityGroup => {
                step(
                    "delete-security-group",
                    self.client
                        .delete_security_group(&tenancy.security_group_name),
                )
                .await
            }
        }
    }
}

impl<C: PlatformClient> SuitePhase for Decommissioner<C> {
    fn name(&self) -> &'static str {
        "decommission"
    }

    async fn run(&self) -> Result<(), LifecycleError> {
        self.decommission().await
    }
}
