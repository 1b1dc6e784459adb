//! 프로비저닝 컨텍스트
//!
//! 외부 오케스트레이션이 넘겨주는 읽기 전용 키-값 접근자입니다.
//! 러너는 이 trait만 보고, 적용/삭제 같은 프로비저닝 동작은 하지 않습니다.
//!
//! [`TerraformContext`]는 변수 파일과 `terraform output -json` 결과 파일로 컨텍스트를 만듭니다.

use std::collections::BTreeMap;
use std::path::Path;

use regcheck_core::error::DeclaredConfigError;
use tracing::debug;

use crate::declared::{DeclaredConfig, DeclaredConfigReader, MAX_VARIABLES_FILE_SIZE, ScenarioLocation};
use crate::value::TfValue;

/// 시나리오 한 번의 실행에 필요한 프로비저닝 정보
pub trait ProvisioningContext: Send + Sync {
    /// 변수 파일 위치 (폴더/시나리오/파일 이름)
    fn location(&self) -> &ScenarioLocation;

    /// 적용 후 노출된 출력값. 없으면 `None`.
    fn output(&self, name: &str) -> Option<TfValue>;

    /// 선언 변수 값. 없으면 `ConfigVariableNotFound`.
    fn declared_variable(&self, name: &str) -> Result<TfValue, DeclaredConfigError>;
}

/// 파일 기반 프로비저닝 컨텍스트
#[derive(Debug, Clone)]
pub struct TerraformContext {
    location: ScenarioLocation,
    declared: DeclaredConfig,
    outputs: BTreeMap<String, TfValue>,
}

impl TerraformContext {
    /// 위치의 변수 파일을 읽어 컨텍스트를 만듭니다. 출력값은 비어 있습니다.
    pub fn load(location: ScenarioLocation) -> Result<Self, DeclaredConfigError> {
        let declared = DeclaredConfigReader::read(&location)?;
        Ok(Self::from_parts(location, declared))
    }

    /// 이미 읽은 선언 설정으로 컨텍스트를 만듭니다.
    pub fn from_parts(location: ScenarioLocation, declared: DeclaredConfig) -> Self {
        Self {
            location,
            declared,
            outputs: BTreeMap::new(),
        }
    }

    /// 출력값을 지정합니다.
    pub fn with_outputs(mut self, outputs: BTreeMap<String, TfValue>) -> Self {
        self.outputs = outputs;
        self
    }

    /// 출력값 파일을 읽어 지정합니다.
    pub fn with_outputs_file(self, path: &Path) -> Result<Self, DeclaredConfigError> {
        let outputs = load_outputs_file(path)?;
        Ok(self.with_outputs(outputs))
    }

    /// 선언 설정 스냅샷
    pub fn declared(&self) -> &DeclaredConfig {
        &self.declared
    }

    /// 출력값 이름 목록
    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.keys().map(String::as_str)
    }
}

impl ProvisioningContext for TerraformContext {
    fn location(&self) -> &ScenarioLocation {
        &self.location
    }

    fn output(&self, name: &str) -> Option<TfValue> {
        self.outputs.get(name).cloned()
    }

    fn declared_variable(&self, name: &str) -> Result<TfValue, DeclaredConfigError> {
        self.declared.get(name).cloned()
    }
}

/// 출력값 파일을 읽습니다.
pub fn load_outputs_file(path: &Path) -> Result<BTreeMap<String, TfValue>, DeclaredConfigError> {
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
    let outputs = parse_outputs(&shown, &content)?;
    debug!(path = %path.display(), outputs = outputs.len(), "read provisioning outputs");
    Ok(outputs)
}

/// 출력값 JSON을 파싱합니다.
///
/// `terraform output -json` 형태(`{"x": {"value": .., "type": ..}}`)와
/// 평탄한 `{"x": ..}` 형태를 모두 받습니다. 모든 항목이 `value` 키를 가진
/// 객체일 때만 전자로 해석합니다.
pub fn parse_outputs(
    path: &str,
    content: &str,
) -> Result<BTreeMap<String, TfValue>, DeclaredConfigError> {
    let root: serde_json::Value =
        serde_json::from_str(content).map_err(|e| DeclaredConfigError::ParseFailed {
            path: path.to_owned(),
            line: e.line(),
            reason: e.to_string(),
        })?;

    let serde_json::Value::Object(entries) = root else {
        return Err(DeclaredConfigError::ParseFailed {
            path: path.to_owned(),
            line: 1,
            reason: "outputs must be a JSON object".to_owned(),
        });
    };

    let wrapped = !entries.is_empty()
        && entries
            .values()
            .all(|v| v.as_object().is_some_and(|o| o.contains_key("value")));

    Ok(entries
        .into_iter()
        .map(|(name, value)| {
            let value = match value {
                serde_json::Value::Object(mut o) if wrapped => {
                    o.remove("value").unwrap_or(serde_json::Value::Null)
                }
                other => other,
            };
            (name, TfValue::from(value))
        })
        .collect())
}
