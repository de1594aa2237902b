//! 기록용 플랫폼 클라이언트
//!
//! 원격 호출을 실제로 수행하지 않고 순서대로 기록합니다.
//! `--dry-run` 실행과 테스트에서 사용하며, 특정 작업이나 특정 호출에서
//! 실패를 주입할 수 있습니다.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::client::{Operation, PlatformCall, PlatformClient};
use crate::error::PlatformError;

/// 호출을 기록하는 [`PlatformClient`] 구현
#[derive(Debug, Default)]
pub struct RecordingClient {
    calls: Mutex<Vec<PlatformCall>>,
    failing_operations: Vec<Operation>,
    failing_calls: Vec<PlatformCall>,
}

impl RecordingClient {
    /// 모든 호출이 성공하는 클라이언트를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 지정한 작업 유형의 모든 호출이 실패하도록 설정합니다.
    pub fn failing_on(mut self, operation: Operation) -> Self {
        self.failing_operations.push(operation);
        self
    }

    /// 인자까지 정확히 일치하는 호출만 실패하도록 설정합니다.
    pub fn failing_on_call(mut self, call: PlatformCall) -> Self {
        self.failing_calls.push(call);
        self
    }

    /// 지금까지 기록된 호출 (실패한 호출 포함)
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.lock().clone()
    }

    /// 기록된 호출의 작업 유형 목록
    pub fn operations(&self) -> Vec<Operation> {
        self.lock().iter().map(PlatformCall::operation).collect()
    }

    /// 지정한 작업 유형이 호출된 횟수
    pub fn count(&self, operation: Operation) -> usize {
        self.lock()
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    /// 작업 유형이 처음 기록된 위치
    pub fn position(&self, operation: Operation) -> Option<usize> {
        self.lock()
            .iter()
            .position(|call| call.operation() == operation)
    }

    /// 기록을 비웁니다. 주입된 실패 설정은 유지됩니다.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PlatformCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: PlatformCall) -> Result<(), PlatformError> {
        let operation = call.operation();
        let fails = self.failing_operations.contains(&operation)
            || self.failing_calls.contains(&call);
        let rendered = call.to_string();
        self.lock().push(call);

        tracing::debug!(call = %rendered, fails, "recorded platform call");

        if fails {
            return Err(PlatformError::Rejected {
                operation,
                reason: format!("injected failure for '{rendered}'"),
            });
        }
        Ok(())
    }
}

impl PlatformClient for RecordingClient {
    async fn api(&self, endpoint: &str, skip_ssl_validation: bool) -> Result<(), PlatformError> {
        self.record(PlatformCall::Api {
            endpoint: endpoint.to_owned(),
            skip_ssl_validation,
        })
    }

    async fn auth(&self, user: &str, password: &str) -> Result<(), PlatformError> {
        self.record(PlatformCall::Auth {
            user: user.to_owned(),
            password: password.to_owned(),
        })
    }

    async fn create_org(&self, org: &str) -> Result<(), PlatformError> {
        self.record(PlatformCall::CreateOrg {
            org: org.to_owned(),
        })
    }

    async fn create_space(&self, org: &str, space: &str) -> Result<(), PlatformError> {
        self.record(PlatformCall::CreateSpace {
            org: org.to_owned(),
            space: space.to_owned(),
        })
    }

    async fn target(&self, org: &str, space: &str) -> Result<(), PlatformError> {
        self.record(PlatformCall::Target {
            org: org.to_owned(),
            space: space.to_owned(),
        })
    }

    async fn create_security_group(&self, name: &str) -> Result<(), PlatformError> {
        self.record(PlatformCall::CreateSecurityGroup {
            name: name.to_owned(),
        })
    }

    async fn bind_security_group(
        &self,
        name: &str,
        org: &str,
        space: &str,
    ) -> Result<(), PlatformError> {
        self.record(PlatformCall::BindSecurityGroup {
            name: name.to_owned(),
            org: org.to_owned(),
            space: space.to_owned(),
        })
    }

    async fn create_quota(&self, name: &str) -> Result<(), PlatformError> {
        self.record(PlatformCall::CreateQuota {
            name: name.to_owned(),
        })
    }

    async fn set_quota(&self, org: &str, quota: &str) -> Result<(), PlatformError> {
        self.record(PlatformCall::SetQuota {
            org: org.to_owned(),
            quota: quota.to_owned(),
        })
    }

    async fn enable_service_access(
        &self,
        offering: &str,
        plan: &str,
        org: &str,
    ) -> Result<(), PlatformError> {
        self.record(PlatformCall::EnableServiceAccess {
            offering: offering.to_owned(),
            plan: plan.to_owned(),
            org: org.to_owned(),
        })
    }

    async fn disable_service_access(
        &self,
        offering: &str,
        plan: &str,
        org: &str,
    ) -> Result<(), PlatformError> {
        self.record(PlatformCall::DisableServiceAccess {
            offering: offering.to_owned(),
            plan: plan.to_owned(),
            org: org.to_owned(),
        })
    }

    async fn delete_space(&self, space: &str) -> Result<(), PlatformError> {
        self.record(PlatformCall::DeleteSpace {
            space: space.to_owned(),
        })
    }

    async fn delete_org(&self, org: &str) -> Result<(), PlatformError> {
        self.record(PlatformCall::DeleteOrg {
            org: org.to_owned(),
        })
    }

    async fn delete_quota(&self, name: &str) -> Result<(), PlatformError> {
        self.record(PlatformCall::DeleteQuota {
            name: name.to_owned(),
        })
    }

    async fn delete_security_group(&self, name: &str) -> Result<(), PlatformError> {
        self.record(PlatformCall::DeleteSecurityGroup {
            name: name.to_owned(),
        })
    }
}
