//! Marker Scanner
//!
//! - `extract`: 줄 단위 어노테이션 추출
//! - `source`: 파일 시스템 / 메모리 소스
//! - `scanner`: 소스 전체 스캔 (ScanReport)

mod extract;
mod scanner;
mod source;

pub use extract::{extract_line, extract_text};
pub use scanner::{ScanReport, Scanner, SkippedFile};
pub use source::{FsSource, MemorySource};
