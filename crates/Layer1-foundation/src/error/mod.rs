//! Error types for AccessMap
//!
//! 모든 에러를 중앙에서 관리

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// AccessMap 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 스캔 관련
    // ========================================================================
    #[error("Failed to read {}: {source}", path.display())]
    ScanIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ========================================================================
    // 접근 설정 문서 관련
    // ========================================================================
    #[error("Access config is not valid JSON: {0}")]
    ConfigParse(String),

    #[error("Access config has an invalid shape: {0}")]
    ConfigShape(String),

    #[error("Failed to write access config {}: {message}", path.display())]
    ConfigWrite { path: PathBuf, message: String },

    // ========================================================================
    // 저장소 관련
    // ========================================================================
    #[error("Storage error: {0}")]
    Storage(String),

    // ========================================================================
    // 역할 관련
    // ========================================================================
    #[error("Role not found: {0}")]
    RoleNotFound(String),

    // ========================================================================
    // 일반
    // ========================================================================
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 스캔 IO 에러 생성 헬퍼
    pub fn scan_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::ScanIo {
            path: path.into(),
            source,
        }
    }

    /// 설정 쓰기 에러 생성 헬퍼
    pub fn config_write(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::ConfigWrite {
            path: path.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_io_display_names_path() {
        let err = Error::scan_io(
            "src/app.html",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("src/app.html"));
    }

    #[test]
    fn test_config_write_display() {
        let err = Error::config_write("/tmp/access.json", "refusing to overwrite");
        assert_eq!(
            err.to_string(),
            "Failed to write access config /tmp/access.json: refusing to overwrite"
        );
    }
}
