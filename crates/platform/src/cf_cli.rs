//! Production platform client driving the `cf` CLI.
//!
//! Each [`PlatformClient`] call becomes exactly one CLI invocation. The CLI
//! keeps its session (endpoint, token, targeted org/space) under `CF_HOME`,
//! which is why `api` and `auth` must precede every other call and why
//! `delete-space` depends on a prior `target`.
//!
//! # Command Mapping
//!
//! | Operation | Command |
//! |---|---|
//! | api | `cf api URL [--skip-ssl-validation]` |
//! | auth | `cf auth USER PASSWORD` |
//! | create-org | `cf create-org ORG` |
//! | create-space | `cf create-space SPACE -o ORG` |
//! | target | `cf target -o ORG -s SPACE` |
//! | create-security-group | `cf create-security-group NAME RULES_FILE` |
//! | bind-security-group | `cf bind-security-group NAME ORG SPACE` |
//! | create-quota | `cf create-quota NAME -m MEM -i INST_MEM -r ROUTES -s SERVICES [--allow-paid-service-plans]` |
//! | set-quota | `cf set-quota ORG QUOTA` |
//! | enable/disable-service-access | `cf VERB OFFERING -p PLAN -o ORG` |
//! | delete-* | `cf delete-* NAME -f` |

use std::io::Write;
use std::path::{Path, PathBuf};

use lifecycle_core::config::{CfConfig, QuotaConfig, SecurityGroupConfig, SecurityGroupRule};
use tokio::process::Command;

use crate::client::{Operation, PlatformCall, PlatformClient};
use crate::error::PlatformError;

/// Maximum number of output bytes kept in a `CommandFailed` error.
const MAX_ERROR_OUTPUT: usize = 4096;

/// [`PlatformClient`] implementation that shells out to the `cf` CLI.
#[derive(Debug, Clone)]
pub struct CfCliClient {
    binary: String,
    home: Option<PathBuf>,
    quota: QuotaConfig,
    rules: Vec<SecurityGroupRule>,
}

impl CfCliClient {
    /// Creates a client using `binary` with default quota and rules.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            home: None,
            quota: QuotaConfig::default(),
            rules: SecurityGroupConfig::default().rules,
        }
    }

    /// Creates a client from the runner's `[cf]`, `[quota]` and
    /// `[security_group]` sections.
    pub fn from_config(cf: &CfConfig, quota: &QuotaConfig, group: &SecurityGroupConfig) -> Self {
        let home = if cf.home.is_empty() {
            None
        } else {
            Some(PathBuf::from(&cf.home))
        };
        Self {
            binary: cf.binary.clone(),
            home,
            quota: quota.clone(),
            rules: group.rules.clone(),
        }
    }

    /// Sets `CF_HOME` for every invocation.
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Builds the CLI argument list for a call.
    ///
    /// `rules_file` is only consulted for `CreateSecurityGroup`.
    pub fn command_args(&self, call: &PlatformCall, rules_file: Option<&Path>) -> Vec<String> {
        let verb = call.operation().as_str().to_owned();
        let mut args = vec![verb];

        match call {
            PlatformCall::Api {
                endpoint,
                skip_ssl_validation,
            } => {
                args.push(endpoint.clone());
                if *skip_ssl_validation {
                    args.push("--skip-ssl-validation".to_owned());
                }
            }
            PlatformCall::Auth { user, password } => {
                args.push(user.clone());
                args.push(password.clone());
            }
            PlatformCall::CreateOrg { org } => args.push(org.clone()),
            PlatformCall::CreateSpace { org, space } => {
                args.extend([space.clone(), "-o".to_owned(), org.clone()]);
            }
            PlatformCall::Target { org, space } => {
                args.extend([
                    "-o".to_owned(),
                    org.clone(),
                    "-s".to_owned(),
                    space.clone(),
                ]);
            }
            PlatformCall::CreateSecurityGroup { name } => {
                args.push(name.clone());
                if let Some(path) = rules_file {
                    args.push(path.display().to_string());
                }
            }
            PlatformCall::BindSecurityGroup { name, org, space } => {
                args.extend([name.clone(), org.clone(), space.clone()]);
            }
            PlatformCall::CreateQuota { name } => {
                args.extend([
                    name.clone(),
                    "-m".to_owned(),
                    self.quota.memory.clone(),
                    "-i".to_owned(),
                    self.quota.instance_memory.clone(),
                    "-r".to_owned(),
                    self.quota.routes.to_string(),
                    "-s".to_owned(),
                    self.quota.service_instances.to_string(),
                ]);
                if self.quota.allow_paid_service_plans {
                    args.push("--allow-paid-service-plans".to_owned());
                }
            }
            PlatformCall::SetQuota { org, quota } => {
                args.extend([org.clone(), quota.clone()]);
            }
            PlatformCall::EnableServiceAccess {
                offering,
                plan,
                org,
            }
            | PlatformCall::DisableServiceAccess {
                offering,
                plan,
                org,
            } => {
                args.extend([
                    offering.clone(),
                    "-p".to_owned(),
                    plan.clone(),
                    "-o".to_owned(),
                    org.clone(),
                ]);
            }
            PlatformCall::DeleteSpace { space } => {
                args.extend([space.clone(), "-f".to_owned()]);
            }
            PlatformCall::DeleteOrg { org } => args.extend([org.clone(), "-f".to_owned()]),
            PlatformCall::DeleteQuota { name } | PlatformCall::DeleteSecurityGroup { name } => {
                args.extend([name.clone(), "-f".to_owned()]);
            }
        }

        args
    }

    /// Writes the security group rules to a temporary JSON file.
    fn write_rules_file(&self) -> Result<tempfile::NamedTempFile, PlatformError> {
        let prepare_err = |reason: String| PlatformError::Prepare {
            operation: Operation::CreateSecurityGroup,
            reason,
        };

        let body = serde_json::to_vec_pretty(&self.rules)
            .map_err(|e| prepare_err(format!("failed to encode rules: {e}")))?;
        let mut file = tempfile::Builder::new()
            .prefix("security-group-")
            .suffix(".json")
            .tempfile()
            .map_err(|e| prepare_err(format!("failed to create rules file: {e}")))?;
        file.write_all(&body)
            .and_then(|()| file.flush())
            .map_err(|e| prepare_err(format!("failed to write rules file: {e}")))?;
        Ok(file)
    }

    async fn execute(&self, call: PlatformCall) -> Result<(), PlatformError> {
        let operation = call.operation();

        // Held until the command exits.
        let rules_file = match operation {
            Operation::CreateSecurityGroup => Some(self.write_rules_file()?),
            _ => None,
        };
        let args = self.command_args(&call, rules_file.as_ref().map(|f| f.path()));

        tracing::info!(command = %call, "invoking cf");

        let mut command = Command::new(&self.binary);
        command.args(&args).kill_on_drop(true);
        if let Some(home) = &self.home {
            command.env("CF_HOME", home);
        }

        let output = command.output().await.map_err(|e| PlatformError::Spawn {
            operation,
            binary: self.binary.clone(),
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).trim().to_owned();
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.trim().is_empty() {
                if !combined.is_empty() {
                    combined.push('\n');
                }
                combined.push_str(stderr.trim());
            }
            if combined.len() > MAX_ERROR_OUTPUT {
                let mut cut = MAX_ERROR_OUTPUT;
                while !combined.is_char_boundary(cut) {
                    cut -= 1;
                }
                combined.truncate(cut);
                combined.push_str("...");
            }

            tracing::error!(
                command = %call,
                status = %output.status,
                "cf command failed"
            );
            return Err(PlatformError::CommandFailed {
                operation,
                status: output.status.to_string(),
                output: combined,
            });
        }

        tracing::debug!(operation = %operation, "cf command succeeded");
        Ok(())
    }
}

impl PlatformClient for CfCliClient {
    async fn api(&self, endpoint: &str, skip_ssl_validation: bool) -> Result<(), PlatformError> {
        self.execute(PlatformCall::Api {
            endpoint: endpoint.to_owned(),
            skip_ssl_validation,
        })
        .await
    }

    async fn auth(&self, user: &str, password: &str) -> Result<(), PlatformError> {
        self.execute(PlatformCall::Auth {
            user: user.to_owned(),
            password: password.to_owned(),
        })
        .await
    }

    async fn create_org(&self, org: &str) -> Result<(), PlatformError> {
        self.execute(PlatformCall::CreateOrg {
            org: org.to_owned(),
        })
        .await
    }

    async fn create_space(&self, org: &str, space: &str) -> Result<(), PlatformError> {
        self.execute(PlatformCall::CreateSpace {
            org: org.to_owned(),
            space: space.to_owned(),
        })
        .await
    }

    async fn target(&self, org: &str, space: &str) -> Result<(), PlatformError> {
        self.execute(PlatformCall::Target {
            org: org.to_owned(),
            space: space.to_owned(),
        })
        .await
    }

    async fn create_security_group(&self, name: &str) -> Result<(), PlatformError> {
        self.execute(PlatformCall::CreateSecurityGroup {
            name: name.to_owned(),
        })
        .await
    }

    async fn bind_security_group(
        &self,
        name: &str,
        org: &str,
        space: &str,
    ) -> Result<(), PlatformError> {
        self.execute(PlatformCall::BindSecurityGroup {
            name: name.to_owned(),
            org: org.to_owned(),
            space: space.to_owned(),
        })
        .await
    }

    async fn create_quota(&self, name: &str) -> Result<(), PlatformError> {
        self.execute(PlatformCall::CreateQuota {
            name: name.to_owned(),
        })
        .await
    }

    async fn set_quota(&self, org: &str, quota: &str) -> Result<(), PlatformError> {
        self.execute(PlatformCall::SetQuota {
            org: org.to_owned(),
            quota: quota.to_owned(),
        })
        .await
    }

    async fn enable_service_access(
        &self,
        offering: &str,
        plan: &str,
        org: &str,
    ) -> Result<(), PlatformError> {
        self.execute(PlatformCall::EnableServiceAccess {
            offering: offering.to_owned(),
            plan: plan.to_owned(),
            org: org.to_owned(),
        })
        .await
    }

    async fn disable_service_access(
        &self,
        offering: &str,
        plan: &str,
        org: &str,
    ) -> Result<(), PlatformError> {
        self.execute(PlatformCall::DisableServiceAccess {
            offering: offering.to_owned(),
            plan: plan.to_owned(),
            org: org.to_owned(),
        })
        .await
    }

    async fn delete_space(&self, space: &str) -> Result<(), PlatformError> {
        self.execute(PlatformCall::DeleteSpace {
            space: space.to_owned(),
        })
        .await
    }

    async fn delete_org(&self, org: &str) -> Result<(), PlatformError> {
        self.execute(PlatformCall::DeleteOrg {
            org: org.to_owned(),
        })
        .await
    }

    async fn delete_quota(&self, name: &str) -> Result<(), PlatformError> {
        self.execute(PlatformCall::DeleteQuota {
            name: name.to_owned(),
        })
        .await
    }

    async fn delete_security_group(&self, name: &str) -> Result<(), PlatformError> {
        self.execute(PlatformCall::DeleteSecurityGroup {
            name: name.to_owned(),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(client: &CfCliClient, call: PlatformCall) -> Vec<String> {
        client.command_args(&call, None)
    }

    #[test]
    fn api_args_with_skip_ssl() {
        let client = CfCliClient::new("cf");
        let call = PlatformCall::Api {
            endpoint: "https://api.example.com".to_owned(),
            skip_ssl_validation: true,
        };
        assert_eq!(
            args(&client, call),
            ["api", "https://api.example.com", "--skip-ssl-validation"]
        );
    }

    #[test]
    fn api_args_without_skip_ssl() {
        let client = CfCliClient::new("cf");
        let call = PlatformCall::Api {
            endpoint: "https://api.example.com".to_owned(),
            skip_ssl_validation: false,
        };
        assert_eq!(args(&client, call), ["api", "https://api.example.com"]);
    }

    #[test]
    fn create_space_args() {
        let client = CfCliClient::new("cf");
        let call = PlatformCall::CreateSpace {
            org: "org".to_owned(),
            space: "space".to_owned(),
        };
        assert_eq!(args(&client, call), ["create-space", "space", "-o", "org"]);
    }

    #[test]
    fn create_quota_args_use_configured_limits() {
        let quota = QuotaConfig {
            memory: "20G".to_owned(),
            instance_memory: "2G".to_owned(),
            routes: 10,
            service_instances: 5,
            allow_paid_service_plans: false,
        };
        let client = CfCliClient::from_config(
            &CfConfig::default(),
            &quota,
            &SecurityGroupConfig::default(),
        );
        let call = PlatformCall::CreateQuota {
            name: "q".to_owned(),
        };
        assert_eq!(
            args(&client, call),
            ["create-quota", "q", "-m", "20G", "-i", "2G", "-r", "10", "-s", "5"]
        );
    }

    #[test]
    fn create_security_group_args_include_rules_file() {
        let client = CfCliClient::new("cf");
        let call = PlatformCall::CreateSecurityGroup {
            name: "sg".to_owned(),
        };
        let path = Path::new("/tmp/rules.json");
        assert_eq!(
            client.command_args(&call, Some(path)),
            ["create-security-group", "sg", "/tmp/rules.json"]
        );
    }

    #[test]
    fn service_access_args() {
        let client = CfCliClient::new("cf");
        let call = PlatformCall::DisableServiceAccess {
            offering: "p-rabbitmq".to_owned(),
            plan: "small".to_owned(),
            org: "org".to_owned(),
        };
        assert_eq!(
            args(&client, call),
            ["disable-service-access", "p-rabbitmq", "-p", "small", "-o", "org"]
        );
    }

    #[test]
    fn delete_args_force() {
        let client = CfCliClient::new("cf");
        let call = PlatformCall::DeleteSpace {
            space: "space".to_owned(),
        };
        assert_eq!(args(&client, call), ["delete-space", "space", "-f"]);
    }

    #[test]
    fn rules_file_contains_configured_rules() {
        let client = CfCliClient::new("cf");
        let file = client.write_rules_file().expect("should write rules");
        let content = std::fs::read_to_string(file.path()).expect("should read rules");
        let parsed: Vec<SecurityGroupRule> =
            serde_json::from_str(&content).expect("rules should be json");
        assert_eq!(parsed, SecurityGroupConfig::default().rules);
    }

    #[tokio::test]
    async fn missing_binary_reports_spawn_error() {
        let client = CfCliClient::new("/nonexistent/bin/cf-lifecycle-test");
        let err = client.create_org("org").await.expect_err("should fail");
        assert!(matches!(
            err,
            PlatformError::Spawn {
                operation: Operation::CreateOrg,
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_reports_command_failed() {
        let client = CfCliClient::new("false");
        let err = client.delete_org("org").await.expect_err("false exits 1");
        assert!(matches!(
            err,
            PlatformError::CommandFailed {
                operation: Operation::DeleteOrg,
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_is_success() {
        let client = CfCliClient::new("true");
        client
            .create_security_group("sg")
            .await
            .expect("true exits 0");
    }
}
