//! 도메인 타입 — 프로바이더가 보고한 라이브 리소스 상태
//!
//! 인스펙터가 생성하고 러너가 읽기만 합니다. 하네스는 이 값을 절대 수정하지 않습니다.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 컨테이너 이미지 저장소의 라이브 식별 정보
///
/// `DescribeRepositories` 응답 한 항목에 해당합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveRepository {
    /// 저장소 이름
    pub name: String,
    /// 저장소 ARN (태그 조회 키)
    pub arn: String,
    /// 저장소 URI (`{registry}.dkr.ecr.{region}.amazonaws.com/{name}`)
    pub uri: String,
    /// 레지스트리(계정) ID
    pub registry_id: String,
    /// 이미지 태그 변경 가능 여부 (MUTABLE, IMMUTABLE)
    pub image_tag_mutability: Option<String>,
    /// push 시 이미지 스캔 여부
    pub scan_on_push: bool,
}

impl fmt::Display for LiveRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.arn)
    }
}

/// 저장소에 연결된 정책 문서 (접근 정책 또는 수명주기 정책)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    /// 정책이 연결된 저장소 이름
    pub repository: String,
    /// 정책 원문 (JSON)
    pub text: String,
}

impl PolicyDocument {
    /// 정책 원문이 비어 있는지 여부
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// 리소스 태그 집합 (키 정렬 유지)
pub type TagSet = BTreeMap<String, String>;

/// 리포트용 태그 요약 문자열 (`k1=v1, k2=v2`)
pub fn format_tags(tags: &TagSet) -> String {
    if tags.is_empty() {
        return "{}".to_owned();
    }
    tags.iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_repository_display() {
        let repo = LiveRepository {
            name: "ecr-test".to_owned(),
            arn: "arn:aws:ecr:us-east-2:123456789012:repository/ecr-test".to_owned(),
            uri: "123456789012.dkr.ecr.us-east-2.amazonaws.com/ecr-test".to_owned(),
            registry_id: "123456789012".to_owned(),
            image_tag_mutability: Some("IMMUTABLE".to_owned()),
            scan_on_push: true,
        };
        let shown = repo.to_string();
        assert!(shown.starts_with("ecr-test"));
        assert!(shown.contains("repository/ecr-test"));
    }

    #[test]
    fn blank_policy_detection() {
        let policy = PolicyDocument {
            repository: "r".to_owned(),
            text: "  \n".to_owned(),
        };
        assert!(policy.is_blank());
    }

    #[test]
    fn format_tags_is_sorted() {
        let mut tags = TagSet::new();
        tags.insert("provisioner".to_owned(), "Terraform".to_owned());
        tags.insert("env".to_owned(), "sandbox".to_owned());
        assert_eq!(format_tags(&tags), "env=sandbox, provisioner=Terraform");
    }

    #[test]
    fn format_empty_tags() {
        assert_eq!(format_tags(&TagSet::new()), "{}");
    }
}
