//! Core Traits - 경계 인터페이스
//!
//! Layer2 이상에서 구현한다.

use crate::Result;
use std::path::{Path, PathBuf};

// ============================================================================
// SourceProvider - 소스 텍스트 제공자
// ============================================================================

/// 스캔할 소스 텍스트를 제공하는 호스트 경계
///
/// `list`가 돌려준 순서가 곧 레코드 순서가 된다.
pub trait SourceProvider: Send + Sync {
    /// 표시용 이름 (로그)
    fn name(&self) -> &str;

    /// 읽을 수 있는 파일 목록 (확장자 필터 적용 후, 결정적 순서)
    fn list(&self) -> Result<Vec<PathBuf>>;

    /// 파일 하나 읽기
    fn read(&self, path: &Path) -> std::io::Result<String>;
}
