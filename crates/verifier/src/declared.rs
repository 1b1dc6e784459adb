//! 선언 설정 리더
//!
//! 인프라 적용 시 사용한 시나리오별 변수 파일을 읽습니다.
//! 파일 경로는 `{config_folder}/{scenario_name}/{file_name}`으로 구성됩니다.
//!
//! 변수가 없으면 기본값으로 대체하지 않고 항상
//! [`DeclaredConfigError::ConfigVariableNotFound`]를 반환합니다.
//!
//! # 사용 예시
//! ```ignore
//! let location = ScenarioLocation::new("../../examples", "ecr", "test.tfvars");
//! let name = DeclaredConfigReader::read_variable(&location, "name")?;
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regcheck_core::error::DeclaredConfigError;
use tracing::debug;

use crate::tfvars::parse_tfvars;
use crate::value::TfValue;

/// 변수 파일 최대 크기 (1 MiB)
pub const MAX_VARIABLES_FILE_SIZE: u64 = 1024 * 1024;

/// 시나리오 변수 파일의 위치
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioLocation {
    /// 시나리오 디렉토리들을 담은 상위 폴더
    pub config_folder: PathBuf,
    /// 시나리오 디렉토리 이름
    pub scenario_name: String,
    /// 변수 파일 이름
    pub file_name: String,
}

impl ScenarioLocation {
    /// 새 위치를 생성합니다.
    pub fn new(
        config_folder: impl Into<PathBuf>,
        scenario_name: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            config_folder: config_folder.into(),
            scenario_name: scenario_name.into(),
            file_name: file_name.into(),
        }
    }

    /// 변수 파일 경로
    pub fn path(&self) -> PathBuf {
        self.config_folder
            .join(&self.scenario_name)
            .join(&self.file_name)
    }
}

/// 한 시나리오의 선언 변수 스냅샷 (읽은 뒤 변경되지 않음)
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredConfig {
    path: String,
    values: BTreeMap<String, TfValue>,
}

impl DeclaredConfig {
    /// 변수 파일 내용을 파싱합니다. `path`는 에러 메시지에만 사용됩니다.
    pub fn parse(path: impl Into<String>, content: &str) -> Result<Self, DeclaredConfigError> {
        let path = path.into();
        let values = parse_tfvars(content).map_err(|e| DeclaredConfigError::ParseFailed {
            path: path.clone(),
            line: e.line,
            reason: e.reason,
        })?;
        Ok(Self { path, values })
    }

    /// 이미 파싱된 값으로 생성합니다.
    pub fn from_values(path: impl Into<String>, values: BTreeMap<String, TfValue>) -> Self {
        Self {
            path: path.into(),
            values,
        }
    }

    /// 원본 파일 경로
    pub fn path(&self) -> &str {
        &self.path
    }

    /// 선언된 변수 수
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 선언된 변수가 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 변수 이름 목록 (정렬)
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// 변수 값을 조회합니다.
    pub fn get(&self, name: &str) -> Result<&TfValue, DeclaredConfigError> {
        self.values
            .get(name)
            .ok_or_else(|| DeclaredConfigError::ConfigVariableNotFound {
                variable: name.to_owned(),
                path: self.path.clone(),
            })
    }

    /// 스칼라 변수 값을 문자열로 조회합니다.
    pub fn string(&self, name: &str) -> Result<String, DeclaredConfigError> {
        let value = self.get(name)?;
        value
            .render()
            .ok_or_else(|| DeclaredConfigError::UnexpectedType {
                variable: name.to_owned(),
                expected: "string".to_owned(),
                actual: value.type_name().to_owned(),
            })
    }
}

/// 선언 설정 리더
pub struct DeclaredConfigReader;

impl DeclaredConfigReader {
    /// 시나리오 변수 파일을 한 번 읽어 스냅샷을 만듭니다.
    pub fn read(location: &ScenarioLocation) -> Result<DeclaredConfig, DeclaredConfigError> {
        Self::read_path(&location.path())
    }

    /// 경로로 변수 파일을 읽습니다.
    pub fn read_path(path: &Path) -> Result<DeclaredConfig, DeclaredConfigError> {
        let shown = path.display().to_string();

        let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DeclaredConfigError::FileNotFound {
                path: shown.clone(),
            },
            _ => DeclaredConfigError::Io {
                path: shown.clone(),
                reason: format!("failed to read metadata: {e}"),
            },
        })?;

        if !metadata.is_file() {
            return Err(DeclaredConfigError::Io {
                path: shown,
                reason: "not a regular file".to_owned(),
            });
        }

        if metadata.len() > MAX_VARIABLES_FILE_SIZE {
            return Err(DeclaredConfigError::TooLarge {
                path: shown,
                size: metadata.len(),
                max: MAX_VARIABLES_FILE_SIZE,
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| DeclaredConfigError::Io {
            path: shown.clone(),
            reason: format!("failed to read file: {e}"),
        })?;

        let config = DeclaredConfig::parse(shown, &content)?;
        debug!(path = config.path(), variables = config.len(), "read declared configuration");
        Ok(config)
    }

    /// 변수 하나를 문자열로 읽습니다.
    pub fn read_variable(
        location: &ScenarioLocation,
        name: &str,
    ) -> Result<String, DeclaredConfigError> {
        Self::read(location)?.string(name)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn scenario_dir(content: &str) -> (tempfile::TempDir, ScenarioLocation) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("ecr")).unwrap();
        let mut file = std::fs::File::create(dir.path().join("ecr/test.tfvars")).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let location = ScenarioLocation::new(dir.path(), "ecr", "test.tfvars");
        (dir, location)
    }

    #[test]
    fn location_composes_path() {
        let location = ScenarioLocation::new("../../examples", "ecr", "test.tfvars");
        assert_eq!(
            location.path(),
            PathBuf::from("../../examples/ecr/test.tfvars")
        );
    }

    #[test]
    fn read_variable_returns_string() {
        let (_dir, location) = scenario_dir("name = \"ecr-test\"\n");
        assert_eq!(
            DeclaredConfigReader::read_variable(&location, "name").unwrap(),
            "ecr-test"
        );
    }

    #[test]
    fn missing_variable_is_not_substituted() {
        let (_dir, location) = scenario_dir("other = \"x\"\n");
        let err = DeclaredConfigReader::read_variable(&location, "name").unwrap_err();
        match err {
            DeclaredConfigError::ConfigVariableNotFound { variable, path } => {
                assert_eq!(variable, "name");
                assert!(path.ends_with("test.tfvars"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file() {
        let location = ScenarioLocation::new("/nonexistent/regcheck", "ecr", "test.tfvars");
        let err = DeclaredConfigReader::read(&location).unwrap_err();
        assert!(matches!(err, DeclaredConfigError::FileNotFound { .. }));
    }

    #[test]
    fn parse_error_carries_path_and_line() {
        let (_dir, location) = scenario_dir("name = \"ok\"\nbroken\n");
        let err = DeclaredConfigReader::read(&location).unwrap_err();
        match err {
            DeclaredConfigError::ParseFailed { path, line, .. } => {
                assert!(path.ends_with("test.tfvars"));
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn oversized_file_is_rejected() {
        let big = format!("pad = \"{}\"\n", "x".repeat(MAX_VARIABLES_FILE_SIZE as usize));
        let (_dir, location) = scenario_dir(&big);
        let err = DeclaredConfigReader::read(&location).unwrap_err();
        assert!(matches!(err, DeclaredConfigError::TooLarge { .. }));
    }

    #[test]
    fn directory_is_not_a_variables_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("ecr/test.tfvars")).unwrap();
        let location = ScenarioLocation::new(dir.path(), "ecr", "test.tfvars");
        let err = DeclaredConfigReader::read(&location).unwrap_err();
        assert!(matches!(err, DeclaredConfigError::Io { .. }));
    }

    #[test]
    fn string_rejects_list_values() {
        let config = DeclaredConfig::parse("test.tfvars", "names = [\"a\", \"b\"]\n").unwrap();
        let err = config.string("names").unwrap_err();
        assert!(matches!(err, DeclaredConfigError::UnexpectedType { .. }));
        assert_eq!(config.get("names").unwrap().as_names().unwrap().len(), 2);
    }

    #[test]
    fn numbers_render_as_strings() {
        let config = DeclaredConfig::parse("test.tfvars", "count = 3\n").unwrap();
        assert_eq!(config.string("count").unwrap(), "3");
        assert_eq!(config.variables().collect::<Vec<_>>(), vec!["count"]);
    }
}
