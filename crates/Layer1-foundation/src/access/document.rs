//! 접근 설정 문서 (AccessConfig)
//!
//! 디스크에 저장되는 유일한 문서. 전체 스냅샷으로만 저장한다.

use super::roles::BASELINE_ROLES;
use crate::marker::MarkerForest;
use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// 역할별 마커 접근 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessConfig {
    /// 역할 목록 (중복 없음, 순서 유지)
    pub roles: Vec<String>,

    /// 마커 계층 (스캔마다 통째로 교체)
    pub markers: MarkerForest,

    /// 역할 → 허용된 마커 id
    pub access: BTreeMap<String, Vec<String>>,

    /// 마지막 저장 시각 (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self::baseline()
    }
}

impl AccessConfig {
    /// 최소 기본 문서: 기본 역할, 빈 마커, 빈 권한
    pub fn baseline() -> Self {
        let roles: Vec<String> = BASELINE_ROLES.iter().map(|r| r.to_string()).collect();
        let access = roles.iter().map(|r| (r.clone(), Vec::new())).collect();
        Self {
            roles,
            markers: MarkerForest::default(),
            access,
            generated_at: None,
        }
    }

    // ========================================================================
    // Parse
    // ========================================================================

    /// 텍스트에서 파싱
    ///
    /// JSON 자체가 깨졌으면 `ConfigParse`, 구조가 다르면 `ConfigShape`.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| Error::ConfigParse(e.to_string()))?;
        validate_shape(&value)?;
        // Value를 거치면 맵 순서가 사라지므로 원문에서 다시 읽는다
        serde_json::from_str(text).map_err(|e| Error::ConfigShape(e.to_string()))
    }

    /// 저장용 JSON 텍스트
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 저장 시각 기록
    pub fn stamp(&mut self, at: DateTime<Utc>) {
        self.generated_at = Some(at.to_rfc3339_opts(SecondsFormat::Millis, true));
    }

    // ========================================================================
    // Roles
    // ========================================================================

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// 역할 추가 (이미 있으면 false)
    pub fn add_role(&mut self, role: &str) -> Result<bool> {
        let role = role.trim();
        if role.is_empty() {
            return Err(Error::InvalidInput("role id must not be empty".to_string()));
        }
        if self.has_role(role) {
            return Ok(false);
        }
        self.roles.push(role.to_string());
        self.access.entry(role.to_string()).or_default();
        Ok(true)
    }

    // ========================================================================
    // Grants
    // ========================================================================

    pub fn grants(&self, role: &str) -> Option<&[String]> {
        self.access.get(role).map(Vec::as_slice)
    }

    /// 역할의 허용 목록을 통째로 교체 (정렬 + 중복 제거)
    pub fn apply_grants<I, S>(&mut self, role: &str, grants: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.has_role(role) {
            return Err(Error::RoleNotFound(role.to_string()));
        }
        let grants: BTreeSet<String> = grants.into_iter().map(Into::into).collect();
        self.access
            .insert(role.to_string(), grants.into_iter().collect());
        Ok(())
    }

    /// 현재 마커 계층에 없는 허용 id (역할별, 보고용)
    pub fn stale_grants(&self) -> BTreeMap<String, Vec<String>> {
        let known: HashSet<&str> = self.markers.ids().into_iter().collect();
        self.access
            .iter()
            .filter_map(|(role, grants)| {
                let stale: Vec<String> = grants
                    .iter()
                    .filter(|id| !known.contains(id.as_str()))
                    .cloned()
                    .collect();
                (!stale.is_empty()).then(|| (role.clone(), stale))
            })
            .collect()
    }

    // ========================================================================
    // Invariants
    // ========================================================================

    /// 불변식 위반 목록 (정상이면 비어 있음)
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for baseline in BASELINE_ROLES {
            if !self.has_role(baseline) {
                problems.push(format!("baseline role '{}' missing", baseline));
            }
        }

        let mut seen = HashSet::new();
        for role in &self.roles {
            if !seen.insert(role.as_str()) {
                problems.push(format!("role '{}' listed twice", role));
            }
            if !self.access.contains_key(role) {
                problems.push(format!("role '{}' has no access entry", role));
            }
        }

        for role in self.access.keys() {
            if !self.has_role(role) {
                problems.push(format!("access entry '{}' has no role", role));
            }
        }

        for id in self.markers.duplicate_ids() {
            problems.push(format!("marker '{}' appears more than once", id));
        }

        problems
    }
}

/// 구조 검사: roles(문자열 배열), markers(객체), access(문자열 배열의 객체)
fn validate_shape(value: &Value) -> Result<()> {
    let obj = value
        .as_object()
        .ok_or_else(|| Error::ConfigShape("document is not an object".to_string()))?;

    match obj.get("roles") {
        Some(Value::Array(items)) if items.iter().all(Value::is_string) => {}
        Some(_) => {
            return Err(Error::ConfigShape(
                "'roles' must be an array of strings".to_string(),
            ))
        }
        None => return Err(Error::ConfigShape("'roles' is missing".to_string())),
    }

    match obj.get("markers") {
        Some(Value::Object(_)) => {}
        Some(_) => return Err(Error::ConfigShape("'markers' must be an object".to_string())),
        None => return Err(Error::ConfigShape("'markers' is missing".to_string())),
    }

    match obj.get("access") {
        Some(Value::Object(entries)) => {
            for (role, grants) in entries {
                let valid = grants
                    .as_array()
                    .map(|ids| ids.iter().all(Value::is_string))
                    .unwrap_or(false);
                if !valid {
                    return Err(Error::ConfigShape(format!(
                        "'access.{}' must be an array of strings",
                        role
                    )));
                }
            }
        }
        Some(_) => return Err(Error::ConfigShape("'access' must be an object".to_string())),
        None => return Err(Error::ConfigShape("'access' is missing".to_string())),
    }

    match obj.get("generatedAt") {
        None | Some(Value::Null) | Some(Value::String(_)) => Ok(()),
        Some(_) => Err(Error::ConfigShape(
            "'generatedAt' must be a string".to_string(),
        )),
    }
}
