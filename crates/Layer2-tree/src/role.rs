//! 역할별 작업 사본

use accessmap_foundation::AccessConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 역할 하나의 체크 상태
///
/// 세션 시작 시 `access[role]`에서 한 번 채워지고, 명시적 토글로만 바뀐다.
/// 자동으로 저장되지 않는다.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleState {
    pub role_id: String,
    pub checked: BTreeSet<String>,
}

impl RoleState {
    pub fn new(role_id: impl Into<String>) -> Self {
        Self {
            role_id: role_id.into(),
            checked: BTreeSet::new(),
        }
    }

    pub fn seeded<I, S>(role_id: impl Into<String>, grants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            role_id: role_id.into(),
            checked: grants.into_iter().map(Into::into).collect(),
        }
    }

    /// 설정 문서의 역할 순서대로 작업 사본 생성
    pub fn from_config(config: &AccessConfig) -> Vec<RoleState> {
        config
            .roles
            .iter()
            .map(|role| {
                let grants = config.grants(role).unwrap_or(&[]);
                RoleState::seeded(role.clone(), grants.iter().cloned())
            })
            .collect()
    }

    pub fn is_checked(&self, id: &str) -> bool {
        self.checked.contains(id)
    }

    /// 체크 상태 일괄 설정, 실제로 바뀐 개수 반환
    pub fn set<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>, on: bool) -> usize {
        let mut changed = 0;
        for id in ids {
            let flipped = if on {
                self.checked.insert(id.to_string())
            } else {
                self.checked.remove(id)
            };
            if flipped {
                changed += 1;
            }
        }
        changed
    }

    /// 저장용 정렬된 grant 목록
    pub fn grants(&self) -> Vec<String> {
        self.checked.iter().cloned().collect()
    }
}
