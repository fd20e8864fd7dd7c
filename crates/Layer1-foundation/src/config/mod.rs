//! Config - 설정 관리
//!
//! - `settings.rs` - 스캔 루트, 확장자, 접근 설정 문서 경로

mod settings;

pub use settings::{Settings, SETTINGS_FILE};
