//! Core Module - 핵심 인터페이스
//!
//! 호스트 애플리케이션과 맞닿는 경계를 trait로 정의합니다.
//!
//! ## 데이터 흐름
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ SourceProvider│ → │   Scanner    │ → │  Hierarchy   │ → │  Reconciler  │
//! │ (list/read)   │   │ (records)    │   │  (forest)    │   │ (AccessConfig)│
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────┬───────┘
//!                                                                  │
//!                                        ┌─────────────────────────┘
//!                                        ▼
//!                               ┌──────────────────┐
//!                               │ PermissionTree   │ → apply → save
//!                               │ Store (per role) │
//!                               └──────────────────┘
//! ```

pub mod traits;

pub use traits::SourceProvider;
