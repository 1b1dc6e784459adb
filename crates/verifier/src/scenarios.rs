//! 시나리오 카탈로그
//!
//! 내장 시나리오 테이블과 TOML 시나리오 파일 로딩을 제공합니다.
//! 파일에서 읽은 시나리오는 같은 이름의 내장 시나리오를 덮어씁니다.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::VerifierError;
use crate::expectation::{CheckSpec, ScenarioSpec, TargetSource, ValueSource};

/// 시나리오 파일 최대 크기 (1 MiB)
const MAX_SCENARIO_FILE_SIZE: u64 = 1024 * 1024;

/// 디렉토리당 최대 시나리오 파일 수
const MAX_SCENARIO_FILES: usize = 256;

/// 이름으로 조회 가능한 시나리오 모음
#[derive(Debug, Clone, Default)]
pub struct ScenarioCatalog {
    scenarios: BTreeMap<String, ScenarioSpec>,
}

impl ScenarioCatalog {
    /// 빈 카탈로그
    pub fn new() -> Self {
        Self::default()
    }

    /// 내장 시나리오 카탈로그
    ///
    /// - `ecr`: 단일 저장소, 존재/접근 정책/수명주기 정책/태그
    /// - `collection_ecr`: 모듈 컬렉션 변형, 출력값 `repository_name`과 식별자 비교 추가
    /// - `composable_complete`: 여러 저장소 배치 변형 (`repository_names` 리스트)
    pub fn builtin() -> Self {
        let single_repository_checks = vec![
            CheckSpec::Existence { name: None },
            CheckSpec::AccessPolicy { name: None },
            CheckSpec::LifecyclePolicy { name: None },
            CheckSpec::TagsPresent { name: None },
        ];

        let mut collection_checks = single_repository_checks.clone();
        collection_checks.push(CheckSpec::Identity {
            name: None,
            expected: ValueSource::Output("repository_name".to_owned()),
        });

        let mut catalog = Self::new();
        catalog.insert(ScenarioSpec {
            name: "ecr".to_owned(),
            description: "single repository: existence, access policy, lifecycle policy, tags"
                .to_owned(),
            target: TargetSource::Declared("name".to_owned()),
            checks: single_repository_checks,
        });
        catalog.insert(ScenarioSpec {
            name: "collection_ecr".to_owned(),
            description: "module collection: single repository checks plus identity against output repository_name"
                .to_owned(),
            target: TargetSource::Declared("name".to_owned()),
            checks: collection_checks,
        });
        catalog.insert(ScenarioSpec {
            name: "composable_complete".to_owned(),
            description: "batch of repositories declared in repository_names".to_owned(),
            target: TargetSource::Declared("repository_names".to_owned()),
            checks: vec![
                CheckSpec::Existence { name: None },
                CheckSpec::Identity {
                    name: None,
                    expected: ValueSource::Declared("repository_names".to_owned()),
                },
                CheckSpec::TagsPresent { name: None },
            ],
        });
        catalog
    }

    /// 시나리오를 추가합니다. 같은 이름이 있으면 교체하고 이전 값을 반환합니다.
    pub fn insert(&mut self, spec: ScenarioSpec) -> Option<ScenarioSpec> {
        self.scenarios.insert(spec.name.clone(), spec)
    }

    /// 디렉토리의 시나리오 파일을 읽어 추가합니다. 추가된 수를 반환합니다.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, VerifierError> {
        let loaded = load_scenarios_from_dir(dir)?;
        let count = loaded.len();
        for spec in loaded {
            if let Some(previous) = self.insert(spec) {
                debug!(scenario = %previous.name, "scenario overridden by file");
            }
        }
        Ok(count)
    }

    /// 이름으로 시나리오를 찾습니다.
    pub fn get(&self, name: &str) -> Result<&ScenarioSpec, VerifierError> {
        self.scenarios
            .get(name)
            .ok_or_else(|| VerifierError::ScenarioNotFound(name.to_owned()))
    }

    /// 시나리오 이름 목록 (정렬)
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(String::as_str)
    }

    /// 모든 시나리오 (이름 순)
    pub fn iter(&self) -> impl Iterator<Item = &ScenarioSpec> {
        self.scenarios.values()
    }

    /// 시나리오 수
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

/// TOML 파일에서 시나리오 하나를 로드하고 검증합니다.
pub fn load_scenario_from_file(path: &Path) -> Result<ScenarioSpec, VerifierError> {
    let metadata = std::fs::metadata(path).map_err(|e| VerifierError::ScenarioLoad {
        path: path.display().to_string(),
        reason: format!("failed to read metadata: {e}"),
    })?;

    if metadata.len() > MAX_SCENARIO_FILE_SIZE {
        return Err(VerifierError::ScenarioLoad {
            path: path.display().to_string(),
            reason: format!(
                "file too large: {} bytes (max: {MAX_SCENARIO_FILE_SIZE})",
                metadata.len()
            ),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| VerifierError::ScenarioLoad {
        path: path.display().to_string(),
        reason: format!("failed to read file: {e}"),
    })?;

    let spec: ScenarioSpec = toml::from_str(&content).map_err(|e| VerifierError::ScenarioLoad {
        path: path.display().to_string(),
        reason: format!("failed to parse TOML: {e}"),
    })?;

    spec.validate()?;
    Ok(spec)
}

/// 디렉토리의 모든 `.toml` 파일에서 시나리오를 로드합니다.
///
/// 로드에 실패한 파일은 경고 후 건너뜁니다. 파일 이름 순으로 처리합니다.
pub fn load_scenarios_from_dir(dir: &Path) -> Result<Vec<ScenarioSpec>, VerifierError> {
    let entries = std::fs::read_dir(dir).map_err(|e| VerifierError::ScenarioLoad {
        path: dir.display().to_string(),
        reason: format!("failed to read directory: {e}"),
    })?;

    let canonical_dir = dir.canonicalize().map_err(|e| VerifierError::ScenarioLoad {
        path: dir.display().to_string(),
        reason: format!("failed to canonicalize directory: {e}"),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "failed to read directory entry");
                continue;
            }
        };

        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "toml") {
            continue;
        }

        let canonical_path = match path.canonicalize() {
            Ok(p) => p,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to canonicalize path, skipping");
                continue;
            }
        };
        if !canonical_path.starts_with(&canonical_dir) {
            warn!(
                path = %path.display(),
                canonical = %canonical_path.display(),
                "scenario file points outside the directory, skipping"
            );
            continue;
        }
        if !canonical_path.is_file() {
            continue;
        }
        paths.push(canonical_path);
    }

    paths.sort();
    if paths.len() > MAX_SCENARIO_FILES {
        warn!(
            found = paths.len(),
            max = MAX_SCENARIO_FILES,
            "too many scenario files, ignoring the rest"
        );
        paths.truncate(MAX_SCENARIO_FILES);
    }

    let mut specs = Vec::with_capacity(paths.len());
    for path in paths {
        match load_scenario_from_file(&path) {
            Ok(spec) => {
                debug!(scenario = %spec.name, path = %path.display(), "loaded scenario");
                specs.push(spec);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load scenario file");
            }
        }
    }

    Ok(specs)
}
