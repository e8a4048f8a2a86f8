#![cfg(unix)]

use lazy_static::lazy_static;
use pretty_assertions::assert_eq;
use stainless_service::{
    stainless::{self, CompiledArtifact},
    staging, tool, CompilerSettings, StainlessClient, ToolsSettings, VerifierSettings,
};
use std::{
    collections::BTreeMap,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    time::Duration,
};

const FAKE_VERIFIER: &str = r#"#!/bin/sh
case "$1" in
--json)
  pwd
  echo "$2"
  shift 2
  if grep -q sleep "$@"; then exec sleep 30; fi
  if grep -q garbage "$@"; then echo "parse error"; exit 1; fi
  if grep -q nosolver "$@"; then echo '{}' > report.json; exit 0; fi
  echo '{"stainless":[{"valid":1}]}' > report.json
  ;;
--solidity)
  shift
  status=0
  for f in "$@"; do
    if grep -q garbage "$f"; then status=1; continue; fi
    stem=$(basename "$f" .scala)
    cat "$f" > "$stem.sol"
  done
  exit $status
  ;;
esac
"#;

const FAKE_COMPILER: &str = r#"#!/bin/sh
out="$4"
shift 4
mkdir -p "$out"
for f in "$@"; do
  case "$f" in
  /*) ;;
  *) echo "relative input $f" >&2; exit 2 ;;
  esac
  if grep -q broken "$f"; then echo "ParserError in $f" >&2; exit 1; fi
  stem=$(basename "$f" .sol)
  prefix=$(dirname "$f" | tr '/' '_')
  echo '[]' > "$out/${prefix}_${stem}_sol_${stem}.abi"
  printf '60806040' > "$out/${prefix}_${stem}_sol_${stem}.bin"
done
"#;

lazy_static! {
    // Scripts are written once, before any of them is executed.
    static ref TOOLS_DIR: PathBuf = {
        let dir = tempfile::tempdir().unwrap().into_path();
        write_script(&dir.join("stainless-smart"), FAKE_VERIFIER);
        write_script(&dir.join("solcjs"), FAKE_COMPILER);
        dir
    };
}

fn write_script(path: &Path, content: &str) {
    std::fs::write(path, content).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

fn client(cache_dir: &Path, timeout: Duration) -> StainlessClient {
    let verifier = VerifierSettings {
        executable: TOOLS_DIR.join("stainless-smart"),
        cache_dir: cache_dir.to_path_buf(),
        ..Default::default()
    };
    let compiler = CompilerSettings {
        executable: TOOLS_DIR.join("solcjs"),
        ..Default::default()
    };
    let tools = ToolsSettings {
        timeout,
        ..Default::default()
    };
    StainlessClient::new(verifier, compiler, &tools)
}

fn sources(items: &[(&str, &str)]) -> BTreeMap<String, String> {
    items
        .iter()
        .map(|(name, content)| (name.to_string(), content.to_string()))
        .collect()
}

#[tokio::test]
async fn verification_returns_report_and_cleans_up() {
    let cache = tempfile::tempdir().unwrap();
    let cache_dir = cache.path().join("stainless-cache-dir");
    let client = client(&cache_dir, Duration::from_secs(10));

    let result = client
        .verify(&sources(&[("Candy.scala", "object Candy")]))
        .await
        .expect("verification should succeed");

    assert_eq!(
        result.report.as_deref(),
        Some("{\"stainless\":[{\"valid\":1}]}\n")
    );
    let mut console = result.console.lines();
    let working_dir = PathBuf::from(console.next().unwrap());
    assert!(!working_dir.exists(), "staging area was not removed");
    assert_eq!(
        console.next().unwrap(),
        format!("--cache-dir={}", cache_dir.display())
    );
    assert!(cache_dir.is_dir());
}

#[tokio::test]
async fn verification_without_report_fails() {
    let cache = tempfile::tempdir().unwrap();
    let client = client(cache.path(), Duration::from_secs(10));

    let err = client
        .verify(&sources(&[("p.scala", "garbage")]))
        .await
        .expect_err("garbage cannot be verified");
    match err {
        stainless::Error::NoReport { console, .. } => {
            assert!(console.ends_with("parse error\n"), "{console}")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn verification_with_empty_report_fails() {
    let cache = tempfile::tempdir().unwrap();
    let client = client(cache.path(), Duration::from_secs(10));

    let err = client
        .verify(&sources(&[("A.scala", "nosolver")]))
        .await
        .expect_err("empty report is a failure");
    assert!(
        matches!(err, stainless::Error::EmptyReport { .. }),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn verification_is_killed_after_timeout() {
    let cache = tempfile::tempdir().unwrap();
    let client = client(cache.path(), Duration::from_secs(1));

    let started = std::time::Instant::now();
    let err = client
        .verify(&sources(&[("A.scala", "sleep")]))
        .await
        .expect_err("verifier should time out");
    assert!(
        matches!(err, stainless::Error::Tool(tool::Error::Timeout { .. })),
        "unexpected error: {err}"
    );
    assert!(started.elapsed() < Duration::from_secs(20));
}

#[tokio::test]
async fn bytecode_is_generated_for_every_transpiled_file() {
    let cache = tempfile::tempdir().unwrap();
    let client = client(cache.path(), Duration::from_secs(10));

    let result = client
        .generate_bytecode(&sources(&[
            ("Candy.scala", "object Candy"),
            ("Token.scala", "object Token"),
            ("Broken.scala", "garbage"),
        ]))
        .await
        .expect("generation should succeed");

    let artifact = CompiledArtifact {
        abi: "[]\n".into(),
        bin: "60806040".into(),
    };
    assert_eq!(
        result,
        BTreeMap::from([
            ("Candy.sol".to_string(), artifact.clone()),
            ("Token.sol".to_string(), artifact),
        ])
    );
}

#[tokio::test]
async fn overlapping_stems_are_paired_separately() {
    let cache = tempfile::tempdir().unwrap();
    let client = client(cache.path(), Duration::from_secs(10));

    let result = client
        .generate_bytecode(&sources(&[
            ("Candy.scala", "object Candy"),
            ("OtherCandy.scala", "object OtherCandy"),
        ]))
        .await
        .expect("generation should succeed");

    assert_eq!(
        result.keys().collect::<Vec<_>>(),
        vec!["Candy.sol", "OtherCandy.sol"]
    );
}

#[tokio::test]
async fn compiler_errors_are_reported() {
    let cache = tempfile::tempdir().unwrap();
    let client = client(cache.path(), Duration::from_secs(10));

    let err = client
        .generate_bytecode(&sources(&[("Candy.scala", "broken")]))
        .await
        .expect_err("compiler should fail");
    match err {
        stainless::Error::CompilationFailed { stderr, .. } => {
            assert!(stderr.contains("ParserError"), "{stderr}")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn invalid_file_names_are_rejected() {
    let cache = tempfile::tempdir().unwrap();
    let client = client(cache.path(), Duration::from_secs(10));

    let err = client
        .generate_bytecode(&sources(&[("../Candy.scala", "object Candy")]))
        .await
        .expect_err("escaping names are rejected");
    assert!(
        matches!(
            err,
            stainless::Error::Staging(staging::Error::InvalidFileName(_))
        ),
        "unexpected error: {err}"
    );
}
