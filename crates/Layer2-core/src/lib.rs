//! accessmap-core: Marker discovery & reconciliation
//!
//! Layer2 - 소스 스캔부터 접근 설정 문서 저장까지
//!
//! # 주요 모듈
//!
//! - `scan`: 소스 텍스트에서 `access-marker` 선언 추출
//! - `hierarchy`: 평면 레코드 → 마커 포레스트 (순환 차단)
//! - `reconcile`: 기존 문서와 병합, 로드/저장
//!
//! # 사용 예시
//!
//! ```ignore
//! use accessmap_core::{ConfigStore, FsSource, Reconciler};
//! use accessmap_foundation::Settings;
//!
//! let settings = Settings::load(&root)?;
//! let source = FsSource::from_settings(&root, &settings);
//! let reconciler = Reconciler::new(ConfigStore::from_settings(&root, &settings));
//!
//! let report = reconciler.sync(&source)?;
//! println!("{} markers", report.config.markers.len());
//! ```

pub mod hierarchy;
pub mod reconcile;
pub mod scan;

// Re-exports: Scan
pub use scan::{extract_line, extract_text, FsSource, MemorySource, ScanReport, Scanner, SkippedFile};

// Re-exports: Hierarchy
pub use hierarchy::{build_forest, Hierarchy, HierarchyBuilder, UnresolvedParent};

// Re-exports: Reconcile
pub use reconcile::{reconcile, ConfigStore, LoadOutcome, LoadedConfig, Reconciler, SyncReport};
