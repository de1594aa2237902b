//! 도메인 타입 -- 테넌시, 서비스 플랜, 플랜 접근 권한

use std::fmt;

use serde::{Deserialize, Serialize};

/// 스위트 전용으로 격리된 플랫폼 테넌시
///
/// 프로비저너가 전부 생성하고 디커미셔너가 전부 삭제합니다.
/// - space는 org가 존재하는 동안에만 존재
/// - security group 바인딩은 org와 space가 모두 존재하는 동안에만 유효
/// - quota 연결은 org가 존재하는 동안에만 유효
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenancy {
    /// 조직 이름
    pub organization_name: String,
    /// 조직 내 space 이름
    pub space_name: String,
    /// space에 바인딩되는 security group 이름
    pub security_group_name: String,
    /// 조직에 연결되는 quota 이름
    pub quota_name: String,
}

impl fmt::Display for Tenancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.organization_name, self.space_name)
    }
}

/// 플랜 레지스트리 항목
///
/// 로드 이후 읽기 전용입니다. 소유권은 설정에 있으며
/// 프로비저너, 디커미셔너, 테스트는 참조만 합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSpec {
    /// 서비스 플랜 이름
    pub name: String,
    /// update 테스트에서 전환할 대상 플랜 (선택)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_to_plan: Option<String>,
    /// 프로비저닝 시 전달할 임의 파라미터 (선택, 구조는 해석하지 않음)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arbitrary_params: Option<serde_json::Value>,
}

impl PlanSpec {
    /// 이름만 가진 플랜을 생성합니다.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            update_to_plan: None,
            arbitrary_params: None,
        }
    }

    /// update 대상 플랜을 지정합니다.
    pub fn with_update_to(mut self, plan: impl Into<String>) -> Self {
        self.update_to_plan = Some(plan.into());
        self
    }

    /// 임의 파라미터를 지정합니다.
    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.arbitrary_params = Some(params);
        self
    }
}

/// 조직 단위 서비스 접근 권한
///
/// 레지스트리의 플랜마다 하나씩 존재합니다.
/// enable/disable은 플랜 단위로 짝을 이뤄야 하며 일괄 처리하지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanGrant<'a> {
    /// 플랜 이름
    pub plan_name: &'a str,
    /// 서비스 오퍼링 이름
    pub service_offering: &'a str,
}

impl fmt::Display for PlanGrant<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.service_offering, self.plan_name)
    }
}
