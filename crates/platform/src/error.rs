//! 플랫폼 클라이언트 에러 타입
//!
//! [`PlatformError`]는 플랫폼 원격 호출 중 발생하는 모든 에러를 표현합니다.
//! `From<PlatformError> for LifecycleError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use lifecycle_core::error::{LifecycleError, RemoteError};

use crate::client::Operation;

/// 플랫폼 원격 호출 에러
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// CLI 프로세스를 시작하지 못함
    #[error("{operation}: failed to launch '{binary}': {reason}")]
    Spawn {
        /// 실패한 작업
        operation: Operation,
        /// 실행하려던 바이너리
        binary: String,
        /// 실패 사유
        reason: String,
    },

    /// CLI 명령이 0이 아닌 상태로 종료됨
    #[error("{operation}: command exited with {status}: {output}")]
    CommandFailed {
        /// 실패한 작업
        operation: Operation,
        /// 종료 상태 설명
        status: String,
        /// 명령 출력 (stdout + stderr)
        output: String,
    },

    /// 플랫폼이 요청을 거부함 (기록용 클라이언트의 주입된 실패 포함)
    #[error("{operation}: {reason}")]
    Rejected {
        /// 실패한 작업
        operation: Operation,
        /// 거부 사유
        reason: String,
    },

    /// 요청 준비 단계 실패 (임시 파일 작성 등)
    #[error("{operation}: failed to prepare request: {reason}")]
    Prepare {
        /// 실패한 작업
        operation: Operation,
        /// 실패 사유
        reason: String,
    },
}

impl PlatformError {
    /// 실패한 작업
    pub fn operation(&self) -> Operation {
        match self {
            Self::Spawn { operation, .. }
            | Self::CommandFailed { operation, .. }
            | Self::Rejected { operation, .. }
            | Self::Prepare { operation, .. } => *operation,
        }
    }
}

impl From<PlatformError> for RemoteError {
    fn from(err: PlatformError) -> Self {
        let operation = err.operation().to_string();
        let reason = match err {
            PlatformError::Spawn { binary, reason, .. } => {
                format!("failed to launch '{binary}': {reason}")
            }
            PlatformError::CommandFailed { status, output, .. } => {
                format!("command exited with {status}: {output}")
            }
            PlatformError::Rejected { reason, .. } | PlatformError::Prepare { reason, .. } => {
                reason
            }
        };
        RemoteError { operation, reason }
    }
}

impl From<PlatformError> for LifecycleError {
    fn from(err: PlatformError) -> Self {
        LifecycleError::Remote(err.into())
    }
}
