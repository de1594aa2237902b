//! 에러 타입 -- 도메인별 에러 정의
//!
//! 스위트 수준의 치명적 에러는 모두 [`LifecycleError`]로 모입니다.
//! 세 가지 분류(설정, 원격 호출, 동기화)는 각각 별도 enum으로 표현됩니다.

/// Lifecycle suite 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// 설정 관련 에러 (원격 호출 전에 발생)
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 플랫폼 원격 호출 에러
    #[error("remote operation error: {0}")]
    Remote(#[from] RemoteError),

    /// 워커 간 동기화 에러
    #[error("synchronization error: {0}")]
    Sync(#[from] SyncError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LifecycleError {
    /// 에러를 프로세스 종료 코드로 변환합니다.
    ///
    /// | Code | Meaning               |
    /// |------|-----------------------|
    /// | 2    | Configuration error   |
    /// | 3    | Remote operation error|
    /// | 4    | Synchronization error |
    /// | 10   | IO error              |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Remote(_) => 3,
            Self::Sync(_) => 4,
            Self::Io(_) => 10,
        }
    }
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일 경로가 지정되지 않음
    #[error("config path is empty -- did you set {env_var}?")]
    PathNotSet { env_var: String },

    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 필수 필드 누락
    #[error("missing required config field '{field}'")]
    MissingField { field: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 플랫폼 원격 호출 에러
///
/// 어떤 작업이 실패했는지와 플랫폼이 돌려준 메시지를 함께 담습니다.
#[derive(Debug, thiserror::Error)]
#[error("{operation} failed: {reason}")]
pub struct RemoteError {
    /// 실패한 작업 이름 (예: `create-space`)
    pub operation: String,
    /// 플랫폼이 보고한 실패 사유
    pub reason: String,
}

/// 워커 간 동기화 에러
#[derive(Debug, Clone, thiserror::Error)]
pub enum SyncError {
    /// 리더의 셋업이 실패했음을 팔로워가 관측함
    #[error("suite setup failed on leader worker: {0}")]
    SetupFailed(String),

    /// 리더가 셋업 완료를 알리기 전에 사라짐
    #[error("leader worker exited before signaling setup completion")]
    LeaderGone,

    /// 배리어 대기 시간 초과
    #[error("timed out after {secs}s waiting at the {phase} barrier")]
    Timeout { phase: &'static str, secs: u64 },

    /// 워커 태스크가 패닉 등으로 비정상 종료됨
    #[error("worker task aborted: {0}")]
    WorkerAborted(String),

    /// 워커 수가 유효하지 않음
    #[error("invalid worker count: {0}")]
    InvalidWorkerCount(usize),
}
