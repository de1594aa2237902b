//! 스위트 컨텍스트 -- 시작 시 한 번 조립되는 불변 설정 묶음
//!
//! 전역 상태 대신 [`SuiteContext`]를 `Arc`로 감싸 코디네이터,
//! 프로비저너, 디커미셔너, 워커에 전달합니다.

use crate::config::{PlatformConfig, SuiteConfig, TenancyConfig};
use crate::error::ConfigError;
use crate::plan::PlanRegistry;
use crate::types::{PlanGrant, Tenancy};

/// 스위트 실행에 필요한 모든 읽기 전용 정보
#[derive(Debug, Clone)]
pub struct SuiteContext {
    /// 플랫폼 자격증명
    pub platform: PlatformConfig,
    /// 서비스 오퍼링 이름
    pub service_offering: String,
    /// 테스트 앱 유형 태그
    pub app_type: String,
    /// 플랜 레지스트리
    pub plans: PlanRegistry,
    /// 생성/삭제 대상 테넌시
    pub tenancy: Tenancy,
}

impl SuiteContext {
    /// 검증된 문서들로부터 컨텍스트를 조립합니다.
    pub fn assemble(
        platform: PlatformConfig,
        suite: SuiteConfig,
        names: &TenancyConfig,
    ) -> Result<Self, ConfigError> {
        platform.validate()?;
        suite.validate()?;

        let tenancy = Tenancy {
            organization_name: platform.org_name.clone(),
            space_name: suite.space_name,
            security_group_name: names.security_group_name.clone(),
            quota_name: names.quota_name.clone(),
        };
        let plans = PlanRegistry::new(suite.plans)?;

        Ok(Self {
            platform,
            service_offering: suite.service_offering,
            app_type: suite.app_type,
            plans,
            tenancy,
        })
    }

    /// 조직 단위 플랜 접근 권한을 레지스트리 순서대로 반환합니다.
    pub fn grants(&self) -> impl ExactSizeIterator<Item = PlanGrant<'_>> {
        self.plans.grants(&self.service_offering)
    }
}
