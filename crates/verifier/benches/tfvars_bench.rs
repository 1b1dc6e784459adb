//! 변수 파일 파서 벤치마크
//!
//! 작은 시나리오 파일과 큰 맵/리스트가 섞인 파일의 파싱 처리량을 측정합니다.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use regcheck_verifier::parse_tfvars;

/// 일반적인 시나리오 변수 파일
const SMALL_TFVARS: &str = r#"
name                 = "ecr-test"
image_tag_mutability = "IMMUTABLE"
scan_on_push         = true
tags = {
  Environment = "test"
  Owner       = "platform"
}
"#;

/// 정책 heredoc과 여러 저장소 이름을 포함한 변수 파일
const POLICY_TFVARS: &str = r#"
repository_names = ["api", "worker", "frontend", "batch", "migrations"]
lifecycle_policy = <<-EOT
  {
    "rules": [
      {
        "rulePriority": 1,
        "description": "expire untagged images",
        "selection": {"tagStatus": "untagged", "countType": "sinceImagePushed", "countUnit": "days", "countNumber": 14},
        "action": {"type": "expire"}
      }
    ]
  }
  EOT
"#;

fn large_tfvars(entries: usize) -> String {
    let mut out = String::from("tags = {\n");
    for i in 0..entries {
        out.push_str(&format!("  key_{i} = \"value-{i}\" # comment {i}\n"));
    }
    out.push_str("}\nrepository_names = [\n");
    for i in 0..entries {
        out.push_str(&format!("  \"repo-{i}\",\n"));
    }
    out.push_str("]\n");
    out
}

fn bench_small(c: &mut Criterion) {
    let mut group = c.benchmark_group("tfvars");
    group.throughput(Throughput::Elements(1));
    group.bench_function("small", |b| {
        b.iter(|| parse_tfvars(black_box(SMALL_TFVARS)).unwrap())
    });
    group.bench_function("heredoc_policy", |b| {
        b.iter(|| parse_tfvars(black_box(POLICY_TFVARS)).unwrap())
    });
    group.finish();
}

fn bench_large(c: &mut Criterion) {
    let mut group = c.benchmark_group("tfvars_large");
    for entries in [100, 1_000, 10_000] {
        let input = large_tfvars(entries);
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(entries), &input, |b, input| {
            b.iter(|| parse_tfvars(black_box(input)).unwrap())
        });
    }
    group.finish();
}

/// 줄 번호 계산이 입력 길이에 선형이어야 하는 긴 목록
fn bench_long_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("tfvars_long_list");
    group.sample_size(10);
    let mut input = String::from("repository_names = [\n");
    for i in 0..100_000 {
        input.push_str(&format!("  \"repo-{i}\",\n"));
    }
    input.push_str("]\n");
    group.throughput(Throughput::Bytes(input.len() as u64));
    group.bench_function("100000", |b| {
        b.iter(|| parse_tfvars(black_box(&input)).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_small, bench_large, bench_long_list);
criterion_main!(benches);
