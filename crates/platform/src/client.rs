//! Platform API abstraction for testability.
//!
//! The [`PlatformClient`] trait abstracts every remote operation the suite
//! performs against the platform, allowing production code to use
//! [`CfCliClient`](crate::CfCliClient) while tests and dry runs use
//! [`RecordingClient`](crate::RecordingClient).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   ┌────────────────┐
//! │ Provisioner │   │ Decommissioner │
//! └──────┬──────┘   └───────┬────────┘
//!        └────────┬─────────┘
//!                 ▼
//!         ┌────────────────┐
//!         │ PlatformClient │ (trait)
//!         └────────────────┘
//!            │         │
//!            ▼         ▼
//!      ┌─────────┐ ┌───────────┐
//!      │  CfCli  │ │ Recording │
//!      └────┬────┘ └───────────┘
//!           │
//!           ▼
//!      Platform API
//! ```
//!
//! Every call is fire-and-check: it either succeeds or returns a
//! [`PlatformError`]. There is no partial-success result.

use std::fmt;
use std::future::Future;

use crate::error::PlatformError;

/// Remote operation kinds, named after the platform CLI verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Api,
    Auth,
    CreateOrg,
    CreateSpace,
    Target,
    CreateSecurityGroup,
    BindSecurityGroup,
    CreateQuota,
    SetQuota,
    EnableServiceAccess,
    DisableServiceAccess,
    DeleteSpace,
    DeleteOrg,
    DeleteQuota,
    DeleteSecurityGroup,
}

impl Operation {
    /// CLI verb for this operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Auth => "auth",
            Self::CreateOrg => "create-org",
            Self::CreateSpace => "create-space",
            Self::Target => "target",
            Self::CreateSecurityGroup => "create-security-group",
            Self::BindSecurityGroup => "bind-security-group",
            Self::CreateQuota => "create-quota",
            Self::SetQuota => "set-quota",
            Self::EnableServiceAccess => "enable-service-access",
            Self::DisableServiceAccess => "disable-service-access",
            Self::DeleteSpace => "delete-space",
            Self::DeleteOrg => "delete-org",
            Self::DeleteQuota => "delete-quota",
            Self::DeleteSecurityGroup => "delete-security-group",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single remote call with its arguments.
///
/// `Display` renders the call the way an operator would type it, with the
/// password of an `Auth` call redacted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    Api {
        endpoint: String,
        skip_ssl_validation: bool,
    },
    Auth {
        user: String,
        password: String,
    },
    CreateOrg {
        org: String,
    },
    CreateSpace {
        org: String,
        space: String,
    },
    Target {
        org: String,
        space: String,
    },
    CreateSecurityGroup {
        name: String,
    },
    BindSecurityGroup {
        name: String,
        org: String,
        space: String,
    },
    CreateQuota {
        name: String,
    },
    SetQuota {
        org: String,
        quota: String,
    },
    EnableServiceAccess {
        offering: String,
        plan: String,
        org: String,
    },
    DisableServiceAccess {
        offering: String,
        plan: String,
        org: String,
    },
    DeleteSpace {
        space: String,
    },
    DeleteOrg {
        org: String,
    },
    DeleteQuota {
        name: String,
    },
    DeleteSecurityGroup {
        name: String,
    },
}

impl PlatformCall {
    /// Operation kind of this call.
    pub fn operation(&self) -> Operation {
        match self {
            Self::Api { .. } => Operation::Api,
            Self::Auth { .. } => Operation::Auth,
            Self::CreateOrg { .. } => Operation::CreateOrg,
            Self::CreateSpace { .. } => Operation::CreateSpace,
            Self::Target { .. } => Operation::Target,
            Self::CreateSecurityGroup { .. } => Operation::CreateSecurityGroup,
            Self::BindSecurityGroup { .. } => Operation::BindSecurityGroup,
            Self::CreateQuota { .. } => Operation::CreateQuota,
            Self::SetQuota { .. } => Operation::SetQuota,
            Self::EnableServiceAccess { .. } => Operation::EnableServiceAccess,
            Self::DisableServiceAccess { .. } => Operation::DisableServiceAccess,
            Self::DeleteSpace { .. } => Operation::DeleteSpace,
            Self::DeleteOrg { .. } => Operation::DeleteOrg,
            Self::DeleteQuota { .. } => Operation::DeleteQuota,
            Self::DeleteSecurityGroup { .. } => Operation::DeleteSecurityGroup,
        }
    }
}

impl fmt::Display for PlatformCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.operation();
        match self {
            Self::Api {
                endpoint,
                skip_ssl_validation,
            } => {
                write!(f, "{op} {endpoint}")?;
                if *skip_ssl_validation {
                    write!(f, " --skip-ssl-validation")?;
                }
                Ok(())
            }
            Self::Auth { user, .. } => write!(f, "{op} {user} ********"),
            Self::CreateOrg { org } | Self::DeleteOrg { org } => write!(f, "{op} {org}"),
            Self::CreateSpace { org, space } => write!(f, "{op} {space} -o {org}"),
            Self::Target { org, space } => write!(f, "{op} -o {org} -s {space}"),
            Self::CreateSecurityGroup { name }
            | Self::CreateQuota { name }
            | Self::DeleteQuota { name }
            | Self::DeleteSecurityGroup { name } => write!(f, "{op} {name}"),
            Self::BindSecurityGroup { name, org, space } => {
                write!(f, "{op} {name} {org} {space}")
            }
            Self::SetQuota { org, quota } => write!(f, "{op} {org} {quota}"),
            Self::EnableServiceAccess {
                offering,
                plan,
                org,
            }
            | Self::DisableServiceAccess {
                offering,
                plan,
                org,
            } => write!(f, "{op} {offering} -p {plan} -o {org}"),
            Self::DeleteSpace { space } => write!(f, "{op} {space}"),
        }
    }
}

/// Trait abstracting platform API operations.
///
/// All remote calls go through this trait, enabling testability via the
/// recording client. The trait is `Send + Sync + 'static`, allowing safe
/// sharing across worker tasks.
///
/// # Implementations
///
/// - [`CfCliClient`](crate::CfCliClient): drives the platform CLI
/// - [`RecordingClient`](crate::RecordingClient): records calls, injects failures
///
/// # Error Handling
///
/// Each call either succeeds or fails with a [`PlatformError`]. Callers treat
/// every failure as fatal to the enclosing phase; nothing here retries.
pub trait PlatformClient: Send + Sync + 'static {
    /// Points the client at an API endpoint.
    fn api(
        &self,
        endpoint: &str,
        skip_ssl_validation: bool,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Authenticates with admin credentials.
    fn auth(
        &self,
        user: &str,
        password: &str,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Creates an organization.
    fn create_org(&self, org: &str) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Creates a space inside an organization.
    fn create_space(
        &self,
        org: &str,
        space: &str,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Makes org/space the active context for subsequent calls.
    fn target(
        &self,
        org: &str,
        space: &str,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Creates a named security group definition.
    fn create_security_group(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Binds a security group to a space.
    fn bind_security_group(
        &self,
        name: &str,
        org: &str,
        space: &str,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Creates a named resource quota.
    fn create_quota(&self, name: &str) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Attaches a quota to an organization.
    fn set_quota(
        &self,
        org: &str,
        quota: &str,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Exposes an offering plan to an organization.
    fn enable_service_access(
        &self,
        offering: &str,
        plan: &str,
        org: &str,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Hides an offering plan from an organization.
    fn disable_service_access(
        &self,
        offering: &str,
        plan: &str,
        org: &str,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Deletes a space in the targeted organization.
    fn delete_space(&self, space: &str) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Deletes an organization.
    fn delete_org(&self, org: &str) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Deletes a quota definition.
    fn delete_quota(&self, name: &str) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Deletes a security group definition.
    fn delete_security_group(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;
}
