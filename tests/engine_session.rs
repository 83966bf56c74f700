//! Session lifecycle and the line protocol, against a scripted line-REPL
//! subprocess (a small shell script standing in for the real engine).

use std::io::Write;
use std::path::PathBuf;

use statchain::{Engine, EngineConfig, EngineError, RSession};

/// A fake engine: answers the sentinel handshake plus a few canned
/// commands, stays silent otherwise, and exits when stdin closes.
const FAKE_REPL: &str = r#"while IFS= read -r line; do
  case "$line" in
    *"---STATCHAIN EOT---"*) printf '%s\n' '[1] "---STATCHAIN EOT---"' ;;
    "mean(x)") printf '[1] 7.889\n' ;;
    "greet()") printf '[1] "hello world"\n' ;;
    "boom()") printf 'Error: object not found\n' ;;
  esac
done
"#;

fn fake_repl_config(dir: &tempfile::TempDir) -> EngineConfig {
    let script = dir.path().join("fake_repl.sh");
    let mut file = std::fs::File::create(&script).unwrap();
    file.write_all(FAKE_REPL.as_bytes()).unwrap();
    EngineConfig::new("sh").with_args([script.to_str().unwrap()])
}

#[tokio::test]
async fn execute_round_trips_through_the_sentinel() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = RSession::spawn(fake_repl_config(&dir)).await.unwrap();

    assert!(engine.is_running());
    assert_eq!(engine.execute("mean(x)").await.unwrap(), "[1] 7.889\n");
    assert_eq!(engine.execute_number("mean(x)").await.unwrap(), 7.889);
    assert_eq!(
        engine.execute_string("greet()").await.unwrap(),
        "hello world"
    );
    // Commands the fake ignores still complete via the sentinel.
    assert_eq!(engine.execute("whatever(1)").await.unwrap(), "");

    engine.close().await;
}

#[tokio::test]
async fn engine_reported_errors_surface_without_killing_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = RSession::spawn(fake_repl_config(&dir)).await.unwrap();

    match engine.execute("boom()").await.unwrap_err() {
        EngineError::Execution { output } => assert!(output.contains("object not found")),
        other => panic!("expected Execution, got {other:?}"),
    }
    // The session survives an evaluation error.
    assert!(engine.is_running());
    assert_eq!(engine.execute_number("mean(x)").await.unwrap(), 7.889);

    engine.close().await;
}

#[tokio::test]
async fn multi_statement_commands_are_refused() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = RSession::spawn(fake_repl_config(&dir)).await.unwrap();

    assert!(matches!(
        engine.execute("a(); b()").await.unwrap_err(),
        EngineError::MalformedCommand { .. }
    ));
    assert!(matches!(
        engine.execute("a()\nb()").await.unwrap_err(),
        EngineError::MalformedCommand { .. }
    ));

    engine.close().await;
}

#[tokio::test]
async fn close_is_idempotent_and_kills_liveness() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = RSession::spawn(fake_repl_config(&dir)).await.unwrap();
    assert!(engine.is_running());

    engine.close().await;
    assert!(!engine.is_running());

    // Dead sessions refuse commands rather than resurrecting.
    assert!(matches!(
        engine.execute("mean(x)").await.unwrap_err(),
        EngineError::Dead
    ));

    // Closing again is a no-op.
    engine.close().await;
    assert!(!engine.is_running());
}

#[tokio::test]
async fn restart_revives_the_session_and_keeps_symbols_unique() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = RSession::spawn(fake_repl_config(&dir)).await.unwrap();

    let before = engine.unique_name();
    engine.close().await;

    engine.restart().await.unwrap();
    assert!(engine.is_running());
    assert_eq!(engine.execute_number("mean(x)").await.unwrap(), 7.889);

    // The counter survives the restart: no collisions across lives.
    let after = engine.unique_name();
    assert_ne!(before, after);

    engine.close().await;
}

#[tokio::test]
async fn graphic_capture_round_trips_a_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = RSession::spawn(fake_repl_config(&dir)).await.unwrap();

    let path = engine.start_graphic_output().await.unwrap();
    assert_eq!(path.extension().unwrap(), "png");
    engine.execute_discard("hist(x)").await.unwrap();
    assert_eq!(engine.stop_graphic_output().await.unwrap(), path);

    engine.close().await;
}

#[tokio::test]
async fn missing_binaries_are_unavailable() {
    let config = EngineConfig::new(PathBuf::from("/definitely/not/a/real/engine"));
    match RSession::spawn(config).await.unwrap_err() {
        EngineError::Unavailable { binary, .. } => {
            assert_eq!(binary, PathBuf::from("/definitely/not/a/real/engine"));
        }
        other => panic!("expected Unavailable, got {other:?}"),
    }
}
