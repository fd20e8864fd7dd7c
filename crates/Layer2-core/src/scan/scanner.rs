//! Marker Scanner
//!
//! 파일 읽기는 rayon으로 병렬 처리하지만 결과는 `list()` 순서대로 모은다.
//! 읽을 수 없는 파일은 경고 후 건너뛰고 스캔은 계속한다.

use super::extract::extract_text;
use accessmap_foundation::{Error, MarkerRecord, Result, SourceProvider};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// 건너뛴 파일
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// 스캔 한 번의 결과
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    /// 등장 순서대로의 레코드
    pub records: Vec<MarkerRecord>,
    /// 읽은 파일 수
    pub files_scanned: usize,
    /// 읽지 못한 파일
    pub skipped: Vec<SkippedFile>,
}

impl ScanReport {
    /// 서로 다른 id 수
    pub fn distinct_ids(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// 스캐너
#[derive(Debug, Clone)]
pub struct Scanner {
    parallel: bool,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    pub fn new() -> Self {
        Self { parallel: true }
    }

    /// 순차 읽기 (디버깅용)
    pub fn sequential() -> Self {
        Self { parallel: false }
    }

    /// 소스 전체 스캔
    ///
    /// 목록을 얻지 못하면 에러. 개별 파일 실패는 `skipped`에 기록된다.
    pub fn scan(&self, source: &dyn SourceProvider) -> Result<ScanReport> {
        let files = source.list()?;

        let contents: Vec<(PathBuf, std::io::Result<String>)> = if self.parallel {
            files
                .par_iter()
                .map(|path| (path.clone(), source.read(path)))
                .collect()
        } else {
            files
                .iter()
                .map(|path| (path.clone(), source.read(path)))
                .collect()
        };

        let mut report = ScanReport::default();
        for (path, content) in contents {
            match content {
                Ok(text) => {
                    let records = extract_text(&text, Some(&path));
                    debug!("{}: {} declarations", path.display(), records.len());
                    report.files_scanned += 1;
                    report.records.extend(records);
                }
                Err(e) => {
                    let err = Error::scan_io(&path, e);
                    warn!("Skipping file: {}", err);
                    report.skipped.push(SkippedFile {
                        path,
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            "Scanned {} files from {} ({} skipped): {} declarations, {} markers",
            report.files_scanned,
            source.name(),
            report.skipped.len(),
            report.records.len(),
            report.distinct_ids()
        );
        Ok(report)
    }
}
