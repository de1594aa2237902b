//! 플랜 레지스트리 -- 설정에서 한 번 로드되는 순서 있는 플랜 목록
//!
//! 프로비저너와 디커미셔너는 모두 레지스트리 순서대로 순회합니다.
//! 로드 시점 검증 외에는 에러 복구가 없습니다.

use crate::error::ConfigError;
use crate::types::{PlanGrant, PlanSpec};

/// 순서가 보장되는 불변 플랜 목록
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanRegistry {
    plans: Vec<PlanSpec>,
}

impl PlanRegistry {
    /// 플랜 목록을 검증하고 레지스트리를 생성합니다.
    ///
    /// - 모든 플랜은 비어 있지 않은 `name`을 가져야 함
    /// - 같은 이름이 여러 번 나오면 항목마다 따로 권한을 부여/회수함
    /// - `update_to_plan`이 지정된 경우 비어 있을 수 없음
    pub fn new(plans: Vec<PlanSpec>) -> Result<Self, ConfigError> {
        for (index, plan) in plans.iter().enumerate() {
            if plan.name.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: format!("plans[{index}].name"),
                });
            }

            if let Some(target) = &plan.update_to_plan {
                if target.trim().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: format!("plans[{index}].update_to_plan"),
                        reason: "must not be empty when present".to_owned(),
                    });
                }
            }
        }

        Ok(Self { plans })
    }

    /// 레지스트리 순서대로 플랜을 순회합니다.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &PlanSpec> {
        self.plans.iter()
    }

    /// 레지스트리 순서대로 조직 단위 접근 권한을 생성합니다.
    pub fn grants<'a>(
        &'a self,
        service_offering: &'a str,
    ) -> impl ExactSizeIterator<Item = PlanGrant<'a>> {
        self.plans.iter().map(move |plan| PlanGrant {
            plan_name: &plan.name,
            service_offering,
        })
    }

    /// 이름으로 플랜을 찾습니다.
    pub fn get(&self, name: &str) -> Option<&PlanSpec> {
        self.plans.iter().find(|plan| plan.name == name)
    }

    /// 등록된 플랜 수
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    /// 플랜이 하나도 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}
