//! 설정 관리 -- 스위트 문서, 플랫폼 자격증명 문서, 러너 설정
//!
//! 세 종류의 설정을 다룹니다.
//! - [`SuiteConfig`]: 플랜 목록, 서비스 오퍼링, space 이름 (JSON)
//! - [`PlatformConfig`]: 관리자 자격증명, API 엔드포인트, TLS 검증 생략 여부 (JSON)
//! - [`RunnerConfig`]: 로깅, 워커 수, 테넌시 이름, cf CLI, quota 정의 (TOML)
//!
//! 두 JSON 문서는 같은 파일에 있어도 됩니다 (알 수 없는 키는 무시).
//!
//! # 러너 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LIFECYCLE_COORDINATOR_WORKERS=4` 형식)
//! 3. 설정 파일 (`lifecycle.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), lifecycle_core::error::LifecycleError> {
//! use lifecycle_core::config::{PlatformConfig, RunnerConfig, SuiteConfig};
//!
//! let platform = PlatformConfig::load("config.json").await?;
//! let suite = SuiteConfig::load("config.json").await?;
//! let runner = RunnerConfig::parse("[coordinator]\nworkers = 4")?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LifecycleError};
use crate::types::PlanSpec;

/// 스위트 문서와 플랫폼 문서의 경로를 담는 환경변수
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

/// 기본 security group 이름
pub const DEFAULT_SECURITY_GROUP_NAME: &str = "cf-rabbitmq-smoke-tests-security-group";

/// 기본 quota 이름
pub const DEFAULT_QUOTA_NAME: &str = "cf-rabbitmq-smoke-tests-quota";

/// 파일을 읽어 문자열로 반환합니다. 파일이 없으면 `FileNotFound`로 변환합니다.
async fn read_config_file(path: &Path) -> Result<String, LifecycleError> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LifecycleError::Config(ConfigError::FileNotFound {
                path: path.display().to_string(),
            })
        } else {
            LifecycleError::Io(e)
        }
    })
}

fn require(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingField {
            field: field.to_owned(),
        });
    }
    Ok(())
}

// ─── SuiteConfig ─────────────────────────────────────────────────────

/// 스위트 문서
///
/// ```json
/// {
///   "plans": [{"name": "small", "update_to_plan": "large", "arbitrary_params": {}}],
///   "service_offering": "p-rabbitmq",
///   "app_type": "spring",
///   "space_name": "lifecycle"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// 테스트 대상 플랜 (순서 유지)
    pub plans: Vec<PlanSpec>,
    /// 서비스 오퍼링 이름
    pub service_offering: String,
    /// 테스트 앱 유형 태그 (코어 로직에서는 사용하지 않음)
    pub app_type: String,
    /// 테넌시의 space 이름
    pub space_name: String,
}

impl SuiteConfig {
    /// JSON 파일에서 스위트 문서를 로드하고 검증합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LifecycleError> {
        let content = read_config_file(path.as_ref()).await?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// JSON 문자열에서 스위트 문서를 파싱합니다.
    pub fn parse(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::ParseFailed {
            reason: format!("could not decode suite config json: {e}"),
        })
    }

    /// 필수 필드를 검증합니다.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(&self.service_offering, "service_offering")?;
        require(&self.space_name, "space_name")?;
        Ok(())
    }
}

// ─── PlatformConfig ──────────────────────────────────────────────────

/// 플랫폼 관리자 자격증명 문서
///
/// `admin_password`는 `Debug` 출력에서 가려집니다.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// API 엔드포인트
    pub api: String,
    /// 앱 도메인 (선택)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apps_domain: Option<String>,
    /// 관리자 사용자
    pub admin_user: String,
    /// 관리자 비밀번호
    pub admin_password: String,
    /// TLS 인증서 검증 생략 여부
    pub skip_ssl_validation: bool,
    /// 테넌시 조직 이름
    pub org_name: String,
}

impl fmt::Debug for PlatformConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("api", &self.api)
            .field("apps_domain", &self.apps_domain)
            .field("admin_user", &self.admin_user)
            .field("admin_password", &"<redacted>")
            .field("skip_ssl_validation", &self.skip_ssl_validation)
            .field("org_name", &self.org_name)
            .finish()
    }
}

impl PlatformConfig {
    /// JSON 파일에서 플랫폼 문서를 로드하고 검증합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LifecycleError> {
        let content = read_config_file(path.as_ref()).await?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// JSON 문자열에서 플랫폼 문서를 파싱합니다.
    pub fn parse(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::ParseFailed {
            reason: format!("could not decode platform config json: {e}"),
        })
    }

    /// 필수 필드를 검증합니다.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(&self.api, "api")?;
        require(&self.admin_user, "admin_user")?;
        require(&self.admin_password, "admin_password")?;
        require(&self.org_name, "org_name")?;
        Ok(())
    }
}

// ─── RunnerConfig ────────────────────────────────────────────────────

/// 러너 통합 설정
///
/// `lifecycle.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 워커 조정 설정
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
    /// 테넌시 리소스 이름
    #[serde(default)]
    pub tenancy: TenancyConfig,
    /// cf CLI 설정
    #[serde(default)]
    pub cf: CfConfig,
    /// quota 정의
    #[serde(default)]
    pub quota: QuotaConfig,
    /// security group 규칙
    #[serde(default)]
    pub security_group: SecurityGroupConfig,
}

impl RunnerConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LifecycleError> {
        let content = read_config_file(path.as_ref()).await?;
        let mut config = Self::parse(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일 없이 기본값에 환경변수 오버라이드만 적용합니다.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseFailed {
            reason: e.to_string(),
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LIFECYCLE_{SECTION}_{FIELD}`
    /// 예: `LIFECYCLE_COORDINATOR_WORKERS=4`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LIFECYCLE_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LIFECYCLE_GENERAL_LOG_FORMAT");

        // Coordinator
        override_usize(
            &mut self.coordinator.workers,
            "LIFECYCLE_COORDINATOR_WORKERS",
        );
        override_u64(
            &mut self.coordinator.barrier_timeout_secs,
            "LIFECYCLE_COORDINATOR_BARRIER_TIMEOUT_SECS",
        );

        // Tenancy
        override_string(
            &mut self.tenancy.security_group_name,
            "LIFECYCLE_TENANCY_SECURITY_GROUP_NAME",
        );
        override_string(&mut self.tenancy.quota_name, "LIFECYCLE_TENANCY_QUOTA_NAME");

        // cf CLI
        override_string(&mut self.cf.binary, "LIFECYCLE_CF_BINARY");
        override_string(&mut self.cf.home, "LIFECYCLE_CF_HOME");

        // Quota
        override_string(&mut self.quota.memory, "LIFECYCLE_QUOTA_MEMORY");
        override_string(
            &mut self.quota.instance_memory,
            "LIFECYCLE_QUOTA_INSTANCE_MEMORY",
        );
        override_u32(&mut self.quota.routes, "LIFECYCLE_QUOTA_ROUTES");
        override_u32(
            &mut self.quota.service_instances,
            "LIFECYCLE_QUOTA_SERVICE_INSTANCES",
        );
        override_bool(
            &mut self.quota.allow_paid_service_plans,
            "LIFECYCLE_QUOTA_ALLOW_PAID_SERVICE_PLANS",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            });
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            });
        }

        if self.coordinator.workers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "coordinator.workers".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }

        if self.tenancy.security_group_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "tenancy.security_group_name".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.tenancy.quota_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "tenancy.quota_name".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.cf.binary.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "cf.binary".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.quota.memory.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "quota.memory".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        let valid_protocols = ["all", "tcp", "udp", "icmp"];
        for (index, rule) in self.security_group.rules.iter().enumerate() {
            if !valid_protocols.contains(&rule.protocol.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: format!("security_group.rules[{index}].protocol"),
                    reason: format!("must be one of: {}", valid_protocols.join(", ")),
                });
            }
            if rule.destination.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("security_group.rules[{index}].destination"),
                    reason: "must not be empty".to_owned(),
                });
            }
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 워커 조정 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// 병렬 워커 수
    pub workers: usize,
    /// 배리어 대기 제한 시간 (초, 0이면 무제한)
    pub barrier_timeout_secs: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            barrier_timeout_secs: 0,
        }
    }
}

/// 테넌시 리소스 이름
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TenancyConfig {
    /// security group 이름
    pub security_group_name: String,
    /// quota 이름
    pub quota_name: String,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            security_group_name: DEFAULT_SECURITY_GROUP_NAME.to_owned(),
            quota_name: DEFAULT_QUOTA_NAME.to_owned(),
        }
    }
}

/// cf CLI 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CfConfig {
    /// cf 실행 파일 경로
    pub binary: String,
    /// CF_HOME 디렉토리 (비어 있으면 상속)
    pub home: String,
}

impl Default for CfConfig {
    fn default() -> Self {
        Self {
            binary: "cf".to_owned(),
            home: String::new(),
        }
    }
}

/// quota 정의
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// 전체 메모리 한도 (예: `10G`)
    pub memory: String,
    /// 인스턴스당 메모리 한도 (`-1`이면 무제한)
    pub instance_memory: String,
    /// 라우트 수 한도
    pub routes: u32,
    /// 서비스 인스턴스 수 한도
    pub service_instances: u32,
    /// 유료 서비스 플랜 허용 여부
    pub allow_paid_service_plans: bool,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            memory: "10G".to_owned(),
            instance_memory: "-1".to_owned(),
            routes: 1000,
            service_instances: 100,
            allow_paid_service_plans: true,
        }
    }
}

/// security group 규칙 목록
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityGroupConfig {
    /// egress 규칙
    pub rules: Vec<SecurityGroupRule>,
}

impl Default for SecurityGroupConfig {
    fn default() -> Self {
        Self {
            rules: vec![SecurityGroupRule {
                protocol: "all".to_owned(),
                destination: "0.0.0.0-255.255.255.255".to_owned(),
                ports: None,
            }],
        }
    }
}

/// security group egress 규칙 (플랫폼 JSON 형식 그대로 직렬화)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroupRule {
    /// 프로토콜 (all, tcp, udp, icmp)
    pub protocol: String,
    /// 대상 IP 또는 범위
    pub destination: String,
    /// 포트 또는 포트 범위 (tcp/udp 전용)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<String>,
}

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
