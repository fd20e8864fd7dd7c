//! 스캔 레코드

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 소스에서 발견한 마커 선언 하나
///
/// 같은 id가 여러 번 나올 수 있다. 뒤에 나온 레코드가 설명과 부모를 바꿀 수 있다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerRecord {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_ref: Option<String>,

    /// 선언이 발견된 위치 (진단용)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,

    /// 1부터 시작하는 줄 번호
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl MarkerRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: None,
            parent_ref: None,
            source: None,
            line: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_ref = Some(parent.into());
        self
    }

    pub fn located(mut self, source: impl Into<PathBuf>, line: usize) -> Self {
        self.source = Some(source.into());
        self.line = Some(line);
        self
    }

    /// 비어 있지 않은 설명
    pub fn non_empty_description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    /// 비어 있지 않은 부모 참조
    pub fn non_empty_parent(&self) -> Option<&str> {
        self.parent_ref
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}
