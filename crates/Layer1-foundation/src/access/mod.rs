//! Access configuration
//!
//! - `roles`: 기본 역할 (super-admin, admin, user)
//! - `document`: 디스크 문서 (AccessConfig) + 구조 검사

mod document;
pub mod roles;

pub use document::AccessConfig;
pub use roles::{is_baseline, role_label, ADMIN, BASELINE_ROLES, SUPER_ADMIN, USER};
