//! JSON 파일 저장소
//!
//! 모든 쓰기는 임시 파일에 기록한 뒤 rename 하는 방식으로 교체한다.
//! 다중 writer 보호는 제공하지 않는다.

use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// 프로젝트 설정 디렉토리 이름
pub const PROJECT_DIR_NAME: &str = ".accessmap";

/// JSON 설정 저장소
#[derive(Debug, Clone)]
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// 글로벌 설정 (~/.config/accessmap/)
    pub fn global() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Cannot find config directory".to_string()))?
            .join("accessmap");
        Ok(Self::new(dir))
    }

    /// 프로젝트 설정 (.accessmap/)
    pub fn project(root: impl Into<PathBuf>) -> Self {
        Self::new(root.into().join(PROJECT_DIR_NAME))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.base_dir.join(filename)
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.base_dir.exists() {
            std::fs::create_dir_all(&self.base_dir)
                .map_err(|e| Error::Storage(format!("Failed to create directory: {}", e)))?;
        }
        Ok(())
    }

    /// 원문 바이트 로드 (파일이 없으면 None). 인코딩 검사는 호출자 몫.
    pub fn read_bytes(&self, filename: &str) -> Result<Option<Vec<u8>>> {
        let path = self.file_path(filename);
        match std::fs::read(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// JSON 로드
    pub fn load<T: DeserializeOwned>(&self, filename: &str) -> Result<T> {
        let path = self.file_path(filename);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// JSON 로드 (기본값)
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, filename: &str) -> T {
        self.load(filename).unwrap_or_default()
    }

    /// JSON 로드 (Optional)
    pub fn load_optional<T: DeserializeOwned>(&self, filename: &str) -> Result<Option<T>> {
        let path = self.file_path(filename);
        if !path.exists() {
            return Ok(None);
        }
        self.load(filename).map(Some)
    }

    /// JSON 저장 (임시 파일 + rename)
    pub fn save<T: Serialize>(&self, filename: &str, data: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(data)
            .map_err(|e| Error::Storage(format!("Failed to serialize: {}", e)))?;
        self.write_text(filename, &content)
    }

    /// 텍스트 저장 (임시 파일 + rename)
    pub fn write_text(&self, filename: &str, content: &str) -> Result<()> {
        self.ensure_dir()?;
        let path = self.file_path(filename);
        let tmp = self.file_path(&format!("{}.tmp", filename));

        std::fs::write(&tmp, content)
            .map_err(|e| Error::Storage(format!("Failed to write {}: {}", tmp.display(), e)))?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(Error::Storage(format!(
                "Failed to replace {}: {}",
                path.display(),
                e
            )));
        }
        debug!("Wrote {}", path.display());
        Ok(())
    }

    /// 백업 복사본 생성 (`<filename>.<suffix>.bak`)
    pub fn backup(&self, filename: &str, suffix: &str) -> Result<PathBuf> {
        let path = self.file_path(filename);
        let backup = self.file_path(&format!("{}.{}.bak", filename, suffix));
        std::fs::copy(&path, &backup).map_err(|e| {
            Error::Storage(format!("Failed to back up {}: {}", path.display(), e))
        })?;
        Ok(backup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("nested"));

        let sample = Sample {
            name: "roles".to_string(),
            count: 3,
        };
        store.save("sample.json", &sample).unwrap();

        assert!(store.file_path("sample.json").is_file());
        assert!(!store.file_path("sample.json.tmp").exists());
        let loaded: Sample = store.load("sample.json").unwrap();
        assert_eq!(loaded, sample);
    }

    #[test]
    fn test_read_bytes_missing_is_none() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        assert!(store.read_bytes("absent.json").unwrap().is_none());
        let fallback: Sample = store.load_or_default("absent.json");
        assert_eq!(fallback, Sample::default());
    }

    #[test]
    fn test_read_bytes_keeps_invalid_utf8() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        std::fs::write(store.file_path("access.json"), b"{}\xff").unwrap();
        assert_eq!(store.read_bytes("access.json").unwrap(), Some(b"{}\xff".to_vec()));
    }

    #[test]
    fn test_backup_copies_original() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        store.write_text("access.json", "{ broken").unwrap();

        let backup = store.backup("access.json", "corrupt").unwrap();
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "{ broken");
    }

    #[test]
    fn test_project_dir_name() {
        let store = JsonStore::project("/tmp/app");
        assert!(store.base_dir().ends_with(PROJECT_DIR_NAME));
    }
}
