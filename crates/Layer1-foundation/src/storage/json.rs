//! JSON 파일 저장소
//!
//! 설정(`freight.json`)과 로컬 템플릿 파일이 같은 디렉토리 규칙을 쓴다.
//! 글로벌은 `<config_dir>/freightdesk/`, 프로젝트는 `<root>/.freightdesk/`.

use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// 설정 디렉토리 이름
pub(crate) const APP_DIR: &str = "freightdesk";

/// 디렉토리 하나에 묶인 JSON 파일 묶음
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn global() -> Result<Self> {
        dirs::config_dir()
            .map(|dir| Self::new(dir.join(APP_DIR)))
            .ok_or_else(|| Error::Config("no per-user config directory on this platform".into()))
    }

    pub fn project(root: impl AsRef<Path>) -> Self {
        Self::new(root.as_ref().join(format!(".{APP_DIR}")))
    }

    pub fn current_project() -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| Error::Config(format!("working directory unavailable: {e}")))?;
        Ok(Self::project(cwd))
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    pub fn exists(&self, filename: &str) -> bool {
        self.file_path(filename).is_file()
    }

    /// 파일이 없으면 `None`, 있는데 깨져 있으면 에러
    pub fn load_optional<T: DeserializeOwned>(&self, filename: &str) -> Result<Option<T>> {
        let path = self.file_path(filename);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error("read", &path, e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| storage_error("parse", &path, e))
    }

    /// 같은 디렉토리의 임시 파일에 쓴 뒤 rename (읽는 쪽은 이전 파일 아니면 새 파일만 본다)
    pub fn save<T: Serialize>(&self, filename: &str, data: &T) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| storage_error("create", &self.dir, e))?;

        let path = self.file_path(filename);
        let staging = self.file_path(&format!(".{filename}.{}.tmp", std::process::id()));
        let body = serde_json::to_vec_pretty(data)?;

        if let Err(e) = std::fs::write(&staging, body) {
            let _ = std::fs::remove_file(&staging);
            return Err(storage_error("write", &staging, e));
        }
        std::fs::rename(&staging, &path).map_err(|e| {
            let _ = std::fs::remove_file(&staging);
            storage_error("replace", &path, e)
        })
    }
}

fn storage_error(action: &str, path: &Path, cause: impl std::fmt::Display) -> Error {
    Error::Storage(format!("cannot {action} {}: {cause}", path.display()))
}
