//! Settings - 통합 설정
//!
//! 글로벌(`~/.config/accessmap/settings.json`)과 프로젝트
//! (`.accessmap/settings.json`) 설정을 병합한다. 프로젝트 설정이 우선.

use crate::storage::JsonStore;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 설정 파일명
pub const SETTINGS_FILE: &str = "settings.json";

/// AccessMap 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// 버전 (마이그레이션용)
    #[serde(default = "default_version")]
    pub version: u32,

    /// 어노테이션을 스캔할 소스 루트 (프로젝트 루트 기준 상대 경로 가능)
    #[serde(default = "default_source_root")]
    pub source_root: PathBuf,

    /// 스캔 대상 확장자 (점 없이)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// 제외할 glob 패턴
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// 접근 설정 문서 경로
    #[serde(default = "default_config_file")]
    pub config_file: PathBuf,

    /// 손상된 문서를 덮어쓰기 전에 백업
    #[serde(default = "default_true")]
    pub backup_on_corrupt: bool,

    /// .gitignore 존중
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            source_root: default_source_root(),
            extensions: default_extensions(),
            exclude: default_exclude(),
            config_file: default_config_file(),
            backup_on_corrupt: true,
            respect_gitignore: true,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드
    pub fn load(project_root: &Path) -> Result<Self> {
        let mut settings = Self::new();

        if let Ok(global) = JsonStore::global() {
            if let Some(global_settings) = global.load_optional::<Settings>(SETTINGS_FILE)? {
                settings.merge(global_settings);
            }
        }

        let project = JsonStore::project(project_root);
        if let Some(project_settings) = project.load_optional::<Settings>(SETTINGS_FILE)? {
            settings.merge(project_settings);
        }

        Ok(settings)
    }

    /// 프로젝트 설정만 로드
    pub fn load_project(project_root: &Path) -> Self {
        JsonStore::project(project_root).load_or_default(SETTINGS_FILE)
    }

    /// 프로젝트 설정 저장
    pub fn save_project(&self, project_root: &Path) -> Result<()> {
        JsonStore::project(project_root).save(SETTINGS_FILE, self)
    }

    // ========================================================================
    // Merge
    // ========================================================================

    /// 다른 설정과 병합 (other가 기본값이 아닌 항목만 우선)
    pub fn merge(&mut self, other: Settings) {
        if other.source_root != default_source_root() {
            self.source_root = other.source_root;
        }
        if other.extensions != default_extensions() {
            self.extensions = other.extensions;
        }
        if other.exclude != default_exclude() {
            self.exclude = other.exclude;
        }
        if other.config_file != default_config_file() {
            self.config_file = other.config_file;
        }
        self.backup_on_corrupt = other.backup_on_corrupt;
        self.respect_gitignore = other.respect_gitignore;
    }

    // ========================================================================
    // Paths
    // ========================================================================

    /// 프로젝트 루트 기준으로 해석한 소스 루트
    pub fn source_root_in(&self, project_root: &Path) -> PathBuf {
        resolve(project_root, &self.source_root)
    }

    /// 프로젝트 루트 기준으로 해석한 접근 설정 문서 경로
    pub fn config_path_in(&self, project_root: &Path) -> PathBuf {
        resolve(project_root, &self.config_file)
    }

    /// 확장자 매칭 (대소문자 무시)
    pub fn accepts_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source_root = root.into();
        self
    }

    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = path.into();
        self
    }

    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_string())
            .collect();
        self
    }
}

fn resolve(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn default_version() -> u32 {
    1
}

fn default_source_root() -> PathBuf {
    PathBuf::from("src")
}

fn default_extensions() -> Vec<String> {
    ["html", "htm", "js", "jsx", "ts", "tsx", "vue"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_exclude() -> Vec<String> {
    vec!["**/node_modules/**".to_string(), "**/dist/**".to_string()]
}

fn default_config_file() -> PathBuf {
    PathBuf::from(".accessmap/access.json")
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_settings_default() {
        let settings = Settings::new();
        assert_eq!(settings.version, 1);
        assert_eq!(settings.source_root, PathBuf::from("src"));
        assert!(settings.extensions.contains(&"html".to_string()));
        assert!(settings.backup_on_corrupt);
    }

    #[test]
    fn test_settings_builder_strips_dots() {
        let settings = Settings::new()
            .source_root("ui")
            .extensions([".html", "vue"])
            .config_file("access.json");

        assert_eq!(settings.source_root, PathBuf::from("ui"));
        assert_eq!(settings.extensions, vec!["html", "vue"]);
        assert_eq!(settings.config_file, PathBuf::from("access.json"));
    }

    #[test]
    fn test_settings_merge() {
        let mut base = Settings::new().source_root("app");
        let overlay = Settings::new().extensions(["html"]);

        base.merge(overlay);

        // overlay의 source_root는 기본값이므로 base 유지
        assert_eq!(base.source_root, PathBuf::from("app"));
        assert_eq!(base.extensions, vec!["html"]);
    }

    #[test]
    fn test_accepts_extension() {
        let settings = Settings::new().extensions(["html"]);
        assert!(settings.accepts_extension(Path::new("index.HTML")));
        assert!(!settings.accepts_extension(Path::new("main.rs")));
        assert!(!settings.accepts_extension(Path::new("Makefile")));
    }

    #[test]
    fn test_paths_resolve_against_project_root() {
        let settings = Settings::new();
        let root = Path::new("/srv/app");
        assert_eq!(settings.source_root_in(root), PathBuf::from("/srv/app/src"));
        assert_eq!(
            settings.config_path_in(root),
            PathBuf::from("/srv/app/.accessmap/access.json")
        );
    }

    #[test]
    fn test_project_settings_roundtrip_on_disk() {
        let dir = tempdir().unwrap();
        let settings = Settings::new().source_root("web");
        settings.save_project(dir.path()).unwrap();

        let loaded = Settings::load_project(dir.path());
        assert_eq!(loaded.source_root, PathBuf::from("web"));
    }
}
