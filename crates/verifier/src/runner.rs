//! 시나리오 러너
//!
//! [`ScenarioRunner`]는 시나리오 정의 하나를 다음 순서로 실행합니다.
//!
//! ```text
//! Init --> FetchDeclared --> FetchLive --> Evaluate (모든 체크) --> Report
//!              |
//!              +-- 선언 변수/대상 출력값 없음 --> 중단 (Err)
//! ```
//!
//! 중단 경로는 대상 식별자를 만들 수 없을 때 하나뿐입니다.
//! 프로바이더 에러, 불일치, 부재는 모두 해당 서브 체크의 실패로 기록되고
//! 나머지 체크는 계속 실행됩니다. 따라서 리포트의 결과 수는 항상 체크 수와 같습니다.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use chrono::Utc;
use regcheck_core::error::DeclaredConfigError;
use regcheck_core::metrics as m;
use regcheck_core::report::{CheckOutcome, FailureKind, ScenarioReport};
use regcheck_core::types::{LiveRepository, TagSet, format_tags};
use regcheck_inspector::{RegistryClient, ResourceInspector};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::context::ProvisioningContext;
use crate::error::VerifierError;
use crate::expectation::{CheckSpec, ScenarioSpec, TargetSource, ValueSource};
use crate::value::TfValue;

/// 러너 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Init,
    FetchDeclared,
    FetchLive,
    Evaluate,
    Report,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::FetchDeclared => "fetch_declared",
            Self::FetchLive => "fetch_live",
            Self::Evaluate => "evaluate",
            Self::Report => "report",
        };
        f.write_str(name)
    }
}

/// FetchDeclared 단계 결과
struct Declared {
    targets: Vec<String>,
    values: HashMap<String, TfValue>,
}

/// FetchLive 단계 결과
struct Live {
    repositories: Vec<LiveRepository>,
    describe_error: Option<String>,
}

#[derive(Clone, Copy)]
enum PolicyKind {
    Access,
    Lifecycle,
}

impl PolicyKind {
    fn label(self) -> &'static str {
        match self {
            Self::Access => "access policy",
            Self::Lifecycle => "lifecycle policy",
        }
    }
}

/// 시나리오 러너
///
/// 시나리오 사이에 공유하는 가변 상태가 없습니다.
/// 같은 러너로 여러 시나리오를 순서대로 실행해도 서로 영향을 주지 않습니다.
pub struct ScenarioRunner<C: RegistryClient> {
    inspector: ResourceInspector<C>,
}

impl<C: RegistryClient> ScenarioRunner<C> {
    /// 인스펙터로 러너를 생성합니다.
    pub fn new(inspector: ResourceInspector<C>) -> Self {
        Self { inspector }
    }

    /// 내부 인스펙터
    pub fn inspector(&self) -> &ResourceInspector<C> {
        &self.inspector
    }

    /// 시나리오를 실행합니다.
    ///
    /// # Errors
    ///
    /// - 시나리오 정의가 유효하지 않으면 `ScenarioValidation`
    /// - 선언 변수 또는 대상 출력값이 없으면 `Declared` (시나리오 중단)
    pub async fn run<P>(&self, spec: &ScenarioSpec, ctx: &P) -> Result<ScenarioReport, VerifierError>
    where
        P: ProvisioningContext + ?Sized,
    {
        spec.validate()?;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut state = RunState::Init;

        transition(&mut state, RunState::FetchDeclared, &spec.name, run_id);
        let declared = match resolve_declared(spec, ctx) {
            Ok(declared) => declared,
            Err(e) => {
                warn!(scenario = %spec.name, %run_id, error = %e, "scenario aborted");
                metrics::counter!(
                    m::SCENARIOS_TOTAL,
                    m::LABEL_SCENARIO => spec.name.clone(),
                    m::LABEL_RESULT => "aborted"
                )
                .increment(1);
                return Err(e.into());
            }
        };

        transition(&mut state, RunState::FetchLive, &spec.name, run_id);
        let live = self.fetch_live(&declared.targets).await;

        transition(&mut state, RunState::Evaluate, &spec.name, run_id);
        let mut outcomes = Vec::with_capacity(spec.checks.len());
        for check in &spec.checks {
            let outcome = self.evaluate(check, &declared, &live, ctx).await;
            record_outcome(&outcome);
            outcomes.push(outcome);
        }

        transition(&mut state, RunState::Report, &spec.name, run_id);
        let report = ScenarioReport {
            scenario: spec.name.clone(),
            run_id,
            started_at,
            finished_at: Utc::now(),
            targets: declared.targets,
            outcomes,
        };

        let passed = report.passed();
        info!(
            scenario = %report.scenario,
            %run_id,
            passed = report.passed_count(),
            total = report.outcomes.len(),
            result = if passed { "passed" } else { "failed" },
            "scenario finished"
        );
        metrics::counter!(
            m::SCENARIOS_TOTAL,
            m::LABEL_SCENARIO => spec.name.clone(),
            m::LABEL_RESULT => if passed { "passed" } else { "failed" }
        )
        .increment(1);

        Ok(report)
    }

    async fn fetch_live(&self, targets: &[String]) -> Live {
        match self.inspector.describe(targets).await {
            Ok(repositories) => Live {
                repositories,
                describe_error: None,
            },
            Err(e) => {
                warn!(error = %e, "describe failed, evaluating without live state");
                Live {
                    repositories: Vec::new(),
                    describe_error: Some(e.to_string()),
                }
            }
        }
    }

    async fn evaluate<P>(
        &self,
        check: &CheckSpec,
        declared: &Declared,
        live: &Live,
        ctx: &P,
    ) -> CheckOutcome
    where
        P: ProvisioningContext + ?Sized,
    {
        let name = check.report_name();
        match check {
            CheckSpec::Existence { .. } => evaluate_existence(&name, &declared.targets, live),
            CheckSpec::Identity { expected, .. } => {
                match resolve_value(&name, expected, declared, ctx) {
                    Ok(value) => evaluate_identity(&name, expected, &value, live),
                    Err(outcome) => outcome,
                }
            }
            CheckSpec::AccessPolicy { .. } => {
                self.evaluate_policy(&name, PolicyKind::Access, live).await
            }
            CheckSpec::LifecyclePolicy { .. } => {
                self.evaluate_policy(&name, PolicyKind::Lifecycle, live)
                    .await
            }
            CheckSpec::TagsPresent { .. } => self.evaluate_tags(&name, None, live).await,
            CheckSpec::TagsMatch { expected, .. } => {
                let value = match resolve_value(&name, expected, declared, ctx) {
                    Ok(value) => value,
                    Err(outcome) => return outcome,
                };
                match value.as_tags() {
                    Some(tags) => self.evaluate_tags(&name, Some(&tags), live).await,
                    None => CheckOutcome::failed(
                        &name,
                        FailureKind::ExpectationMismatch,
                        format!(
                            "{expected} is a {}, expected a map of tags",
                            value.type_name()
                        ),
                    ),
                }
            }
            CheckSpec::OutputMatches {
                output, pattern, ..
            } => evaluate_output_match(&name, output, pattern, ctx),
        }
    }

    async fn evaluate_policy(&self, name: &str, kind: PolicyKind, live: &Live) -> CheckOutcome {
        if let Some(outcome) = live_precondition(name, live) {
            return outcome;
        }

        let mut errors = Vec::new();
        let mut absent = Vec::new();
        for repo in &live.repositories {
            let result = match kind {
                PolicyKind::Access => self.inspector.fetch_access_policy(&repo.name).await,
                PolicyKind::Lifecycle => self.inspector.fetch_lifecycle_policy(&repo.name).await,
            };
            match result {
                Ok(Some(policy)) if !policy.is_blank() => {}
                Ok(_) => absent.push(repo.name.as_str()),
                Err(e) => errors.push(format!("{}: {e}", repo.name)),
            }
        }

        if !errors.is_empty() {
            return CheckOutcome::failed(name, FailureKind::ProviderApi, errors.join("; "));
        }
        if !absent.is_empty() {
            return CheckOutcome::failed(
                name,
                FailureKind::ResourceAbsent,
                format!("no {} attached to: {}", kind.label(), absent.join(", ")),
            )
            .with_values("present", "absent");
        }
        CheckOutcome::passed(
            name,
            format!(
                "{} attached to {} repositories",
                kind.label(),
                live.repositories.len()
            ),
        )
    }

    /// `expected`가 없으면 태그가 하나 이상 있는지, 있으면 모든 기대 태그가 같은 값인지 확인합니다.
    async fn evaluate_tags(
        &self,
        name: &str,
        expected: Option<&TagSet>,
        live: &Live,
    ) -> CheckOutcome {
        if let Some(outcome) = live_precondition(name, live) {
            return outcome;
        }

        let mut errors = Vec::new();
        let mut mismatch: Option<(String, TagSet)> = None;
        for repo in &live.repositories {
            match self.inspector.fetch_tags(&repo.arn).await {
                Ok(tags) => {
                    let ok = match expected {
                        None => !tags.is_empty(),
                        Some(want) => want.iter().all(|(k, v)| tags.get(k) == Some(v)),
                    };
                    if !ok && mismatch.is_none() {
                        mismatch = Some((repo.name.clone(), tags));
                    }
                }
                Err(e) => errors.push(format!("{}: {e}", repo.name)),
            }
        }

        if !errors.is_empty() {
            return CheckOutcome::failed(name, FailureKind::ProviderApi, errors.join("; "));
        }
        match (mismatch, expected) {
            (Some((repo, actual)), None) => CheckOutcome::failed(
                name,
                FailureKind::ExpectationMismatch,
                format!("repository {repo} has no tags"),
            )
            .with_values("non-empty", format_tags(&actual)),
            (Some((repo, actual)), Some(want)) => CheckOutcome::failed(
                name,
                FailureKind::ExpectationMismatch,
                format!("repository {repo} is missing expected tags"),
            )
            .with_values(format_tags(want), format_tags(&actual)),
            (None, _) => CheckOutcome::passed(
                name,
                format!("tags verified on {} repositories", live.repositories.len()),
            ),
        }
    }
}

fn transition(state: &mut RunState, next: RunState, scenario: &str, run_id: Uuid) {
    debug!(scenario, %run_id, from = %state, to = %next, "scenario state transition");
    *state = next;
}

fn record_outcome(outcome: &CheckOutcome) {
    let result = if outcome.is_passed() { "passed" } else { "failed" };
    metrics::counter!(m::CHECKS_TOTAL, m::LABEL_RESULT => result).increment(1);
    match outcome.failure {
        None => debug!(check = %outcome.name, "check passed"),
        Some(kind) => warn!(
            check = %outcome.name,
            failure = %kind,
            message = %outcome.message,
            "check failed"
        ),
    }
}

/// 대상 이름과 체크가 참조하는 선언 변수를 미리 읽습니다.
fn resolve_declared<P>(spec: &ScenarioSpec, ctx: &P) -> Result<Declared, DeclaredConfigError>
where
    P: ProvisioningContext + ?Sized,
{
    let mut values = HashMap::new();
    for var in spec.declared_variables() {
        values.insert(var.to_owned(), ctx.declared_variable(var)?);
    }

    let names = match &spec.target {
        TargetSource::Declared(var) => {
            let value = values
                .get(var)
                .ok_or_else(|| DeclaredConfigError::ConfigVariableNotFound {
                    variable: var.clone(),
                    path: ctx.location().path().display().to_string(),
                })?;
            names_of(var, value)?
        }
        TargetSource::Output(output) => {
            let value = ctx
                .output(output)
                .ok_or_else(|| DeclaredConfigError::OutputNotFound {
                    output: output.clone(),
                })?;
            names_of(output, &value)?
        }
        TargetSource::Names(names) => names.clone(),
    };

    let mut targets: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if !targets.contains(&name) {
            targets.push(name);
        }
    }
    debug!(scenario = %spec.name, targets = ?targets, "resolved target repositories");

    Ok(Declared { targets, values })
}

fn names_of(variable: &str, value: &TfValue) -> Result<Vec<String>, DeclaredConfigError> {
    value
        .as_names()
        .ok_or_else(|| DeclaredConfigError::UnexpectedType {
            variable: variable.to_owned(),
            expected: "string or list of strings".to_owned(),
            actual: value.type_name().to_owned(),
        })
}

/// 기대값을 해석합니다. 출력값은 이 시점에 조회하며, 없으면 해당 체크만 실패합니다.
fn resolve_value<P>(
    name: &str,
    source: &ValueSource,
    declared: &Declared,
    ctx: &P,
) -> Result<TfValue, CheckOutcome>
where
    P: ProvisioningContext + ?Sized,
{
    match source {
        ValueSource::Declared(var) => declared.values.get(var).cloned().ok_or_else(|| {
            CheckOutcome::failed(
                name,
                FailureKind::ExpectationMismatch,
                format!("declared variable '{var}' was not resolved"),
            )
        }),
        ValueSource::Output(output) => ctx.output(output).ok_or_else(|| {
            CheckOutcome::failed(
                name,
                FailureKind::OutputNotFound,
                format!("provisioning output '{output}' not found"),
            )
        }),
        ValueSource::Literal(text) => Ok(TfValue::String(text.clone())),
    }
}

/// 저장소별 조회가 필요한 체크의 전제 조건
fn live_precondition(name: &str, live: &Live) -> Option<CheckOutcome> {
    if let Some(err) = &live.describe_error {
        return Some(CheckOutcome::failed(
            name,
            FailureKind::ProviderApi,
            format!("repositories could not be described: {err}"),
        ));
    }
    if live.repositories.is_empty() {
        return Some(CheckOutcome::failed(
            name,
            FailureKind::ResourceAbsent,
            "no repositories were described, nothing to inspect",
        ));
    }
    None
}

fn evaluate_existence(name: &str, targets: &[String], live: &Live) -> CheckOutcome {
    let expected = targets.len();
    if let Some(err) = &live.describe_error {
        return CheckOutcome::failed(
            name,
            FailureKind::ProviderApi,
            format!("expected {expected} repositories, describe failed: {err}"),
        );
    }

    let actual = live.repositories.len();
    if actual == expected {
        return CheckOutcome::passed(name, format!("found {actual} of {expected} repositories"))
            .with_values(expected.to_string(), actual.to_string());
    }

    let missing: Vec<&str> = targets
        .iter()
        .filter(|t| !live.repositories.iter().any(|r| &r.name == *t))
        .map(String::as_str)
        .collect();
    let mut message = format!("expected {expected} repositories, found {actual}");
    if !missing.is_empty() {
        message.push_str(&format!(" (missing: {})", missing.join(", ")));
    }
    CheckOutcome::failed(name, FailureKind::ExpectationMismatch, message)
        .with_values(expected.to_string(), actual.to_string())
}

fn evaluate_identity(
    name: &str,
    source: &ValueSource,
    value: &TfValue,
    live: &Live,
) -> CheckOutcome {
    let Some(expected) = value.as_names() else {
        return CheckOutcome::failed(
            name,
            FailureKind::ExpectationMismatch,
            format!(
                "{source} is a {}, expected a name or list of names",
                value.type_name()
            ),
        );
    };
    if let Some(outcome) = live_precondition(name, live) {
        return outcome.with_values(expected.join(", "), "");
    }

    let expected: BTreeSet<&str> = expected.iter().map(String::as_str).collect();
    let actual: BTreeSet<&str> = live.repositories.iter().map(|r| r.name.as_str()).collect();
    let expected_text = expected.iter().copied().collect::<Vec<_>>().join(", ");
    let actual_text = actual.iter().copied().collect::<Vec<_>>().join(", ");

    if expected == actual {
        CheckOutcome::passed(name, format!("live repositories match {source}"))
            .with_values(expected_text, actual_text)
    } else {
        CheckOutcome::failed(
            name,
            FailureKind::ExpectationMismatch,
            format!("live repositories do not match {source}"),
        )
        .with_values(expected_text, actual_text)
    }
}

fn evaluate_output_match<P>(name: &str, output: &str, pattern: &str, ctx: &P) -> CheckOutcome
where
    P: ProvisioningContext + ?Sized,
{
    let Some(value) = ctx.output(output) else {
        return CheckOutcome::failed(
            name,
            FailureKind::OutputNotFound,
            format!("provisioning output '{output}' not found"),
        );
    };
    let Some(text) = value.render() else {
        return CheckOutcome::failed(
            name,
            FailureKind::ExpectationMismatch,
            format!("output '{output}' is a {}, not a scalar", value.type_name()),
        );
    };
    let re = match regex::Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => {
            return CheckOutcome::failed(
                name,
                FailureKind::ExpectationMismatch,
                format!("invalid pattern: {e}"),
            );
        }
    };

    if re.is_match(&text) {
        CheckOutcome::passed(name, format!("output '{output}' matches {pattern}"))
            .with_values(pattern, text)
    } else {
        CheckOutcome::failed(
            name,
            FailureKind::ExpectationMismatch,
            format!("output '{output}' does not match {pattern}"),
        )
        .with_values(pattern, text)
    }
}
