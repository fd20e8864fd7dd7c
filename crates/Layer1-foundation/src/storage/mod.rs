//! Storage module for AccessMap
//!
//! - `json`: JSON - 범용 파일 저장/로드 (설정, 접근 설정 문서)

mod json;

// JSON Storage (범용)
pub use json::{JsonStore, PROJECT_DIR_NAME};
