//! 기대값 집합 -- 선언형 체크 테이블
//!
//! 시나리오는 대상 저장소를 어떻게 정할지([`TargetSource`])와
//! 순서 있는 체크 목록([`CheckSpec`])으로 정의됩니다.
//! 시나리오마다 함수를 복사하는 대신 러너 하나가 이 테이블을 해석합니다.
//!
//! # TOML 형식
//! ```toml
//! name = "collection_ecr"
//! description = "module collection variant"
//! target = { declared = "name" }
//!
//! [[checks]]
//! kind = "existence"
//!
//! [[checks]]
//! kind = "identity"
//! expected = { output = "repository_name" }
//!
//! [[checks]]
//! kind = "output_matches"
//! output = "repository_url"
//! pattern = "^[0-9]+\\.dkr\\.ecr\\."
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::VerifierError;

/// 시나리오당 최대 체크 수
pub const MAX_CHECKS_PER_SCENARIO: usize = 64;

/// 대상 저장소 이름 목록의 출처
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSource {
    /// 선언 변수 (문자열 하나 또는 문자열 리스트)
    Declared(String),
    /// 프로비저닝 출력값
    Output(String),
    /// 고정 이름 목록
    Names(Vec<String>),
}

/// 기대값의 출처
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    /// 선언 변수
    Declared(String),
    /// 프로비저닝 출력값 (평가 시점에 조회)
    Output(String),
    /// 고정 값
    Literal(String),
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Declared(var) => write!(f, "var.{var}"),
            Self::Output(name) => write!(f, "output.{name}"),
            Self::Literal(text) => write!(f, "{text:?}"),
        }
    }
}

/// 서브 체크 하나의 정의
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckSpec {
    /// 조회된 저장소 수 == 대상 이름 수
    Existence {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// 기대 이름 집합 == 라이브 저장소 이름 집합
    Identity {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        expected: ValueSource,
    },
    /// 모든 저장소에 접근 정책이 있음
    AccessPolicy {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// 모든 저장소에 수명주기 정책이 있음
    LifecyclePolicy {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// 모든 저장소에 태그가 하나 이상 있음
    TagsPresent {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// 기대 태그가 모든 저장소에 같은 값으로 있음
    TagsMatch {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        expected: ValueSource,
    },
    /// 출력값이 정규식과 일치
    OutputMatches {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        output: String,
        pattern: String,
    },
}

impl CheckSpec {
    /// 체크 종류 이름
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Existence { .. } => "existence",
            Self::Identity { .. } => "identity",
            Self::AccessPolicy { .. } => "access_policy",
            Self::LifecyclePolicy { .. } => "lifecycle_policy",
            Self::TagsPresent { .. } => "tags_present",
            Self::TagsMatch { .. } => "tags_match",
            Self::OutputMatches { .. } => "output_matches",
        }
    }

    /// 리포트에 표시되는 이름 (지정하지 않으면 종류에서 파생)
    pub fn report_name(&self) -> String {
        let custom = match self {
            Self::Existence { name }
            | Self::Identity { name, .. }
            | Self::AccessPolicy { name }
            | Self::LifecyclePolicy { name }
            | Self::TagsPresent { name }
            | Self::TagsMatch { name, .. }
            | Self::OutputMatches { name, .. } => name,
        };
        match (custom, self) {
            (Some(name), _) => name.clone(),
            (None, Self::OutputMatches { output, .. }) => format!("output_matches:{output}"),
            (None, _) => self.kind().to_owned(),
        }
    }

    /// 체크가 참조하는 기대값 출처
    pub fn value_source(&self) -> Option<&ValueSource> {
        match self {
            Self::Identity { expected, .. } | Self::TagsMatch { expected, .. } => Some(expected),
            _ => None,
        }
    }

    /// 이름 지정 체크를 만듭니다.
    pub fn named(mut self, report_name: impl Into<String>) -> Self {
        let slot = match &mut self {
            Self::Existence { name }
            | Self::Identity { name, .. }
            | Self::AccessPolicy { name }
            | Self::LifecyclePolicy { name }
            | Self::TagsPresent { name }
            | Self::TagsMatch { name, .. }
            | Self::OutputMatches { name, .. } => name,
        };
        *slot = Some(report_name.into());
        self
    }
}

/// 시나리오 정의
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    /// 시나리오 이름 (카탈로그 키)
    pub name: String,
    /// 설명
    #[serde(default)]
    pub description: String,
    /// 대상 저장소 이름 출처
    pub target: TargetSource,
    /// 체크 목록 (정의 순서대로 평가)
    pub checks: Vec<CheckSpec>,
}

impl ScenarioSpec {
    /// 시나리오 정의를 검증합니다.
    pub fn validate(&self) -> Result<(), VerifierError> {
        let invalid = |reason: String| VerifierError::ScenarioValidation {
            scenario: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty".to_owned()));
        }

        match &self.target {
            TargetSource::Declared(var) | TargetSource::Output(var) if var.trim().is_empty() => {
                return Err(invalid("target reference must not be empty".to_owned()));
            }
            TargetSource::Names(names) if names.is_empty() => {
                return Err(invalid("target names must not be empty".to_owned()));
            }
            _ => {}
        }

        if self.checks.is_empty() {
            return Err(invalid("at least one check is required".to_owned()));
        }
        if self.checks.len() > MAX_CHECKS_PER_SCENARIO {
            return Err(invalid(format!(
                "too many checks: {} (max: {MAX_CHECKS_PER_SCENARIO})",
                self.checks.len()
            )));
        }

        let mut seen = HashSet::new();
        for check in &self.checks {
            let report_name = check.report_name();
            if report_name.trim().is_empty() {
                return Err(invalid(format!("{} check has an empty name", check.kind())));
            }
            if !seen.insert(report_name.clone()) {
                return Err(invalid(format!("duplicate check name '{report_name}'")));
            }
            if let CheckSpec::OutputMatches { output, pattern, .. } = check {
                if output.trim().is_empty() {
                    return Err(invalid(format!("check '{report_name}' has an empty output")));
                }
                regex::Regex::new(pattern).map_err(|e| {
                    invalid(format!("check '{report_name}' has an invalid pattern: {e}"))
                })?;
            }
        }

        Ok(())
    }

    /// 시나리오가 참조하는 선언 변수 이름 (대상 포함, 중복 제거)
    pub fn declared_variables(&self) -> Vec<&str> {
        let mut vars = Vec::new();
        if let TargetSource::Declared(var) = &self.target {
            vars.push(var.as_str());
        }
        for check in &self.checks {
            if let Some(ValueSource::Declared(var)) = check.value_source() {
                if !vars.contains(&var.as_str()) {
                    vars.push(var.as_str());
                }
            }
        }
        vars
    }
}
