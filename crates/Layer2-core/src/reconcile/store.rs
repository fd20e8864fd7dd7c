//! 접근 설정 문서 저장소
//!
//! 로드는 실패하지 않는다: 없거나, 비었거나, 깨졌거나, 구조가 다르면 기본 문서로
//! 대체하고 그 이유를 `LoadOutcome`으로 알려준다. 깨진 파일(UTF-8이 아닌 경우 포함)은
//! 덮어쓰기 전에 가능하면 백업한다. 존재하지만 읽을 수 없는 파일은 저장이 거부된다.
//! 저장 실패만 호출자에게 에러로 돌아간다.

use accessmap_foundation::{AccessConfig, Error, JsonStore, Result, Settings};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 로드 결과 종류
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LoadOutcome {
    /// 정상 로드
    Loaded,
    /// 파일 없음 → 기본 문서
    Missing,
    /// 빈 파일 → 기본 문서
    Empty,
    /// 읽기 실패 → 기본 문서 (저장은 거부됨)
    Unreadable { reason: String },
    /// JSON 파싱 실패 → 기본 문서
    Corrupt {
        reason: String,
        backup: Option<PathBuf>,
    },
    /// 구조 검사 실패 → 기본 문서
    InvalidShape {
        reason: String,
        backup: Option<PathBuf>,
    },
}

impl LoadOutcome {
    /// 기본 문서로 대체되었는지
    pub fn is_bootstrap(&self) -> bool {
        !matches!(self, LoadOutcome::Loaded)
    }

    pub fn describe(&self) -> String {
        match self {
            LoadOutcome::Loaded => "loaded".to_string(),
            LoadOutcome::Missing => "missing, bootstrapped".to_string(),
            LoadOutcome::Empty => "empty, bootstrapped".to_string(),
            LoadOutcome::Unreadable { reason } => format!("unreadable ({}), bootstrapped", reason),
            LoadOutcome::Corrupt { reason, backup } => {
                format!("corrupt ({}), bootstrapped{}", reason, backup_note(backup))
            }
            LoadOutcome::InvalidShape { reason, backup } => {
                format!("invalid shape ({}), bootstrapped{}", reason, backup_note(backup))
            }
        }
    }
}

fn backup_note(backup: &Option<PathBuf>) -> String {
    backup
        .as_ref()
        .map(|p| format!(", backup at {}", p.display()))
        .unwrap_or_default()
}

/// 로드된 문서 + 결과 종류
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AccessConfig,
    pub outcome: LoadOutcome,
}

/// 접근 설정 문서 저장소 (단일 writer 가정)
#[derive(Debug, Clone)]
pub struct ConfigStore {
    store: JsonStore,
    filename: String,
    backup_on_corrupt: bool,
}

impl ConfigStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "access.json".to_string());
        Self {
            store: JsonStore::new(dir),
            filename,
            backup_on_corrupt: true,
        }
    }

    pub fn from_settings(project_root: &Path, settings: &Settings) -> Self {
        Self::new(settings.config_path_in(project_root)).backup_on_corrupt(settings.backup_on_corrupt)
    }

    pub fn backup_on_corrupt(mut self, enabled: bool) -> Self {
        self.backup_on_corrupt = enabled;
        self
    }

    pub fn path(&self) -> PathBuf {
        self.store.file_path(&self.filename)
    }

    /// 로드 (실패 시 기본 문서)
    pub fn load(&self) -> LoadedConfig {
        let bytes = match self.store.read_bytes(&self.filename) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                info!("No access config at {}, starting from baseline", self.path().display());
                return bootstrap(LoadOutcome::Missing);
            }
            Err(e) => {
                warn!("Cannot read access config: {}", e);
                return bootstrap(LoadOutcome::Unreadable {
                    reason: e.to_string(),
                });
            }
        };

        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                let reason = format!("not valid UTF-8 ({})", e.utf8_error());
                warn!("Access config is {}; using baseline", reason);
                let backup = self.backup_corrupt();
                return bootstrap(LoadOutcome::Corrupt { reason, backup });
            }
        };

        if text.trim().is_empty() {
            info!("Access config {} is empty, starting from baseline", self.path().display());
            return bootstrap(LoadOutcome::Empty);
        }

        match AccessConfig::parse(&text) {
            Ok(config) => {
                debug!(
                    "Loaded access config: {} roles, {} markers",
                    config.roles.len(),
                    config.markers.len()
                );
                LoadedConfig {
                    config,
                    outcome: LoadOutcome::Loaded,
                }
            }
            Err(Error::ConfigParse(reason)) => {
                warn!("Access config is not valid JSON ({}); using baseline", reason);
                let backup = self.backup_corrupt();
                bootstrap(LoadOutcome::Corrupt { reason, backup })
            }
            Err(Error::ConfigShape(reason)) => {
                warn!("Access config failed structural validation ({}); using baseline", reason);
                let backup = self.backup_corrupt();
                bootstrap(LoadOutcome::InvalidShape { reason, backup })
            }
            Err(other) => {
                warn!("Unexpected error loading access config: {}", other);
                let backup = self.backup_corrupt();
                bootstrap(LoadOutcome::Corrupt {
                    reason: other.to_string(),
                    backup,
                })
            }
        }
    }

    fn backup_corrupt(&self) -> Option<PathBuf> {
        if !self.backup_on_corrupt {
            return None;
        }
        let suffix = format!("corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S%3f"));
        match self.store.backup(&self.filename, &suffix) {
            Ok(path) => {
                info!("Backed up unreadable access config to {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Backup of corrupt access config failed: {}", e);
                None
            }
        }
    }

    /// 저장 (generatedAt 기록)
    pub fn save(&self, config: &mut AccessConfig) -> Result<()> {
        self.save_at(config, Utc::now())
    }

    /// 저장 (시각 지정)
    ///
    /// 기존 파일이 있는데 읽을 수 없으면 백업할 방법이 없으므로 덮어쓰지 않는다.
    pub fn save_at(&self, config: &mut AccessConfig, at: DateTime<Utc>) -> Result<()> {
        if let Err(e) = self.store.read_bytes(&self.filename) {
            return Err(Error::config_write(
                self.path(),
                format!("existing document is unreadable, refusing to overwrite ({})", e),
            ));
        }
        config.stamp(at);
        let text = config
            .to_json_pretty()
            .map_err(|e| Error::config_write(self.path(), e.to_string()))?;
        self.store
            .write_text(&self.filename, &text)
            .map_err(|e| Error::config_write(self.path(), e.to_string()))?;
        info!("Saved access config to {}", self.path().display());
        Ok(())
    }
}

fn bootstrap(outcome: LoadOutcome) -> LoadedConfig {
    LoadedConfig {
        config: AccessConfig::baseline(),
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accessmap_foundation::ADMIN;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_bootstraps() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("access.json"));
        let loaded = store.load();
        assert_eq!(loaded.outcome, LoadOutcome::Missing);
        assert_eq!(loaded.config, AccessConfig::baseline());
    }

    #[test]
    fn test_empty_file_bootstraps_without_backup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("access.json");
        fs::write(&path, "  \n").unwrap();

        let loaded = ConfigStore::new(&path).load();
        assert_eq!(loaded.outcome, LoadOutcome::Empty);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_corrupt_file_is_backed_up() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("access.json");
        fs::write(&path, "{ \"roles\": [").unwrap();

        let loaded = ConfigStore::new(&path).load();
        match loaded.outcome {
            LoadOutcome::Corrupt {
                backup: Some(backup),
                ..
            } => {
                assert_eq!(fs::read_to_string(backup).unwrap(), "{ \"roles\": [");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(loaded.config.invariant_violations().is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_corrupt_and_backed_up() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("access.json");
        let mut original = br#"{ "roles": ["admin"], "markers": [], "access": { "admin": ["dashboard"] } }"#.to_vec();
        original.extend_from_slice(b"\xff\xfe");
        fs::write(&path, &original).unwrap();

        let loaded = ConfigStore::new(&path).load();
        match loaded.outcome {
            LoadOutcome::Corrupt {
                reason,
                backup: Some(backup),
            } => {
                assert!(reason.contains("UTF-8"));
                assert_eq!(fs::read(backup).unwrap(), original);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(loaded.config, AccessConfig::baseline());
    }

    #[test]
    fn test_unreadable_file_is_not_overwritten() {
        let dir = tempdir().unwrap();
        // 디렉토리는 열 수는 있지만 파일로 읽을 수 없다
        let path = dir.path().join("access.json");
        fs::create_dir(&path).unwrap();
        let store = ConfigStore::new(&path);

        let mut loaded = store.load();
        assert!(matches!(loaded.outcome, LoadOutcome::Unreadable { .. }));

        let err = store.save(&mut loaded.config).unwrap_err();
        assert!(matches!(err, Error::ConfigWrite { .. }));
        assert!(path.is_dir());
    }

    #[test]
    fn test_shape_failure_reported_distinctly() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("access.json");
        fs::write(&path, r#"{ "roles": ["admin"], "markers": [], "access": {} }"#).unwrap();

        let loaded = ConfigStore::new(&path).backup_on_corrupt(false).load();
        assert!(matches!(
            loaded.outcome,
            LoadOutcome::InvalidShape { backup: None, .. }
        ));
        assert!(loaded.outcome.is_bootstrap());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("nested").join("access.json"));

        let mut config = AccessConfig::baseline();
        config.apply_grants(ADMIN, ["dashboard"]).unwrap();
        store.save(&mut config).unwrap();
        assert!(config.generated_at.is_some());

        let loaded = store.load();
        assert_eq!(loaded.outcome, LoadOutcome::Loaded);
        assert_eq!(loaded.config, config);
    }

    #[test]
    fn test_write_failure_is_config_write_error() {
        let dir = tempdir().unwrap();
        // 디렉토리 자리에 파일이 있으면 하위 디렉토리를 만들 수 없다
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let store = ConfigStore::new(blocker.join("access.json"));

        let mut config = AccessConfig::baseline();
        let err = store.save(&mut config).unwrap_err();
        assert!(matches!(err, Error::ConfigWrite { .. }));
    }

    #[test]
    fn test_bare_filename_uses_current_dir() {
        let store = ConfigStore::new("access.json");
        assert_eq!(store.path(), PathBuf::from("./access.json"));
    }
}
