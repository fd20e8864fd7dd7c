//! 소스 제공자 구현
//!
//! - `FsSource`: 디렉토리 순회 (gitignore 존중, 확장자 + glob 제외 필터)
//! - `MemorySource`: 메모리 내 파일 (호스트 임베딩, 테스트)

use accessmap_foundation::{Error, Result, Settings, SourceProvider};
use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// ============================================================================
// FsSource
// ============================================================================

/// 파일 시스템 소스
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
    name: String,
    extensions: Vec<String>,
    exclude: Vec<glob::Pattern>,
    respect_gitignore: bool,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            name: root.display().to_string(),
            root,
            extensions: Vec::new(),
            exclude: Vec::new(),
            respect_gitignore: true,
        }
    }

    /// 설정에서 생성 (source_root는 project_root 기준으로 해석)
    pub fn from_settings(project_root: &Path, settings: &Settings) -> Self {
        Self::new(settings.source_root_in(project_root))
            .extensions(settings.extensions.iter().cloned())
            .exclude(settings.exclude.iter().map(String::as_str))
            .respect_gitignore(settings.respect_gitignore)
    }

    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// 제외 패턴 (잘못된 패턴은 경고 후 무시)
    pub fn exclude<'a, I>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.exclude = patterns
            .into_iter()
            .filter_map(|p| match glob::Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Ignoring invalid exclude pattern '{}': {}", p, e);
                    None
                }
            })
            .collect();
        self
    }

    pub fn respect_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 확장자가 매칭되는지 확인 (목록이 비어 있으면 전부 허용)
    fn matches_extension(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }

    /// 제외 패턴에 걸리는지 확인
    fn is_excluded(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let relative = relative.to_string_lossy().replace('\\', "/");
        let absolute = path.to_string_lossy().replace('\\', "/");
        self.exclude
            .iter()
            .any(|p| p.matches(&relative) || p.matches(&absolute))
    }
}

impl SourceProvider for FsSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn list(&self) -> Result<Vec<PathBuf>> {
        if !self.root.exists() {
            return Err(Error::NotFound(format!(
                "source root {}",
                self.root.display()
            )));
        }

        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .require_git(false)
            .build();

        let mut files: Vec<PathBuf> = walker
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| entry.into_path())
            .filter(|path| self.matches_extension(path) && !self.is_excluded(path))
            .collect();

        // 순회 순서는 플랫폼마다 다르므로 정렬해서 레코드 순서를 고정
        files.sort();
        debug!("{} candidate files under {}", files.len(), self.name);
        Ok(files)
    }

    fn read(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }
}

// ============================================================================
// MemorySource
// ============================================================================

/// 메모리 내 소스
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<PathBuf, Option<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.files.insert(path.into(), Some(text.into()));
        self
    }

    /// 목록에는 나오지만 읽을 수 없는 파일
    pub fn unreadable(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.insert(path.into(), None);
        self
    }
}

impl SourceProvider for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn list(&self) -> Result<Vec<PathBuf>> {
        Ok(self.files.keys().cloned().collect())
    }

    fn read(&self, path: &Path) -> std::io::Result<String> {
        match self.files.get(path) {
            Some(Some(text)) => Ok(text.clone()),
            Some(None) => Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "unreadable",
            )),
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no such file",
            )),
        }
    }
}
