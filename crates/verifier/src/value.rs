//! 변수/출력값 표현
//!
//! [`TfValue`]는 변수 파일의 값과 프로비저닝 출력값을 같은 형태로 표현합니다.
//! 숫자는 원문 텍스트를 그대로 보존하여 문자열 렌더링이 입력과 일치하도록 합니다.

use std::collections::BTreeMap;
use std::fmt;

use regcheck_core::types::TagSet;
use serde::Serialize;

/// 변수 파일 또는 출력값의 값
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TfValue {
    /// `null`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// 숫자 (원문 텍스트)
    Number(String),
    /// 문자열
    String(String),
    /// 리스트
    List(Vec<TfValue>),
    /// 맵 (키 정렬)
    Map(BTreeMap<String, TfValue>),
}

impl TfValue {
    /// 값 종류 이름 (에러 메시지용)
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    /// 문자열 값이면 참조를 반환합니다.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// 스칼라 값을 문자열로 렌더링합니다. 리스트, 맵, null은 `None`.
    pub fn render(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Number(n) => Some(n.clone()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Null | Self::List(_) | Self::Map(_) => None,
        }
    }

    /// 리소스 이름 목록으로 해석합니다.
    ///
    /// 문자열은 이름 하나, 스칼라 리스트는 여러 이름입니다.
    pub fn as_names(&self) -> Option<Vec<String>> {
        match self {
            Self::String(s) => Some(vec![s.clone()]),
            Self::List(items) => items.iter().map(TfValue::render).collect(),
            _ => None,
        }
    }

    /// 스칼라 값으로 이루어진 맵을 태그 집합으로 해석합니다.
    pub fn as_tags(&self) -> Option<TagSet> {
        match self {
            Self::Map(map) => map
                .iter()
                .map(|(k, v)| v.render().map(|v| (k.clone(), v)))
                .collect(),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for TfValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.to_string()),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(TfValue::from).collect())
            }
            serde_json::Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (k, TfValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for TfValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl fmt::Display for TfValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => f.write_str(n),
            Self::String(s) => write!(f, "{s:?}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k} = {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}
