//! Config Reconciler
//!
//! - `store`: 접근 설정 문서 로드/저장 (기본 문서 대체, 손상 백업)
//! - `reconciler`: 병합 규칙 + 스캔 파이프라인

mod reconciler;
mod store;

pub use reconciler::{reconcile, Reconciler, SyncReport};
pub use store::{ConfigStore, LoadOutcome, LoadedConfig};
