//! # accessmap-foundation
//!
//! Foundation layer for AccessMap:
//! - Core: 경계 Trait 정의 (SourceProvider)
//! - Marker: 마커 레코드 / 계층 구조 (MarkerRecord, MarkerNode, MarkerForest)
//! - Access: 역할별 접근 설정 문서 (AccessConfig, 기본 역할)
//! - Storage: JsonStore (범용, 임시 파일 + rename)
//! - Config: 통합 설정 (Settings)
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  accessmap-cli (scan / tree / grant / browse)           │
//! │            │                         │                  │
//! │            ▼                         ▼                  │
//! │  accessmap-core              accessmap-tree             │
//! │  (scanner, hierarchy,        (PermissionTreeStore)      │
//! │   reconciler)                                           │
//! │            │                         │                  │
//! │            └──────────┬──────────────┘                  │
//! │                       ▼                                 │
//! │              accessmap-foundation                       │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod access;
pub mod config;
pub mod core;
pub mod error;
pub mod marker;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Core (경계 Trait)
// ============================================================================
pub use self::core::SourceProvider;

// ============================================================================
// Marker (마커 모델)
// ============================================================================
pub use marker::{MarkerForest, MarkerNode, MarkerRecord, FALLBACK_DESCRIPTION};

// ============================================================================
// Access (접근 설정)
// ============================================================================
pub use access::{
    // Document
    AccessConfig,
    // Roles
    is_baseline,
    role_label,
    ADMIN,
    BASELINE_ROLES,
    SUPER_ADMIN,
    USER,
};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{Settings, SETTINGS_FILE};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::{JsonStore, PROJECT_DIR_NAME};
