//! Marker model
//!
//! - `record`: 스캔 한 번에서 나온 평면 레코드 (MarkerRecord)
//! - `forest`: 계층 구조 (MarkerNode, MarkerForest) + 순서 보존 직렬화

mod forest;
mod record;

pub use forest::{MarkerForest, MarkerNode, FALLBACK_DESCRIPTION};
pub use record::MarkerRecord;
