//! Service lifecycle suite 공통 크레이트
//!
//! 설정 문서, 도메인 타입, 에러 분류, 플랜 레지스트리를 제공합니다.
//! 플랫폼 클라이언트와 러너 크레이트가 모두 이 크레이트에 의존합니다.

pub mod config;
pub mod context;
pub mod error;
pub mod plan;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, LifecycleError, RemoteError, SyncError};

// 설정
pub use config::{PlatformConfig, RunnerConfig, SuiteConfig};

// 컨텍스트
pub use context::SuiteContext;

// 플랜 레지스트리
pub use plan::PlanRegistry;

// 도메인 타입
pub use types::{PlanGrant, PlanSpec, Tenancy};
