//! Tests for the dumpling runner using stand-in binaries.

use dumpling_bench::{run_dump, DumpError, RunConfig};

/// The connection target is given explicitly so `TIDB_*` variables in the
/// environment do not change the arguments under test.
fn config_with_binary(binary: &str, extra: &[&str]) -> RunConfig {
    let mut args = vec![
        "dumpling-bench",
        "--action",
        "run",
        "--dumpling",
        binary,
        "--host",
        "127.0.0.1",
        "--port",
        "4000",
        "--database",
        "test",
    ];
    for (flag, value) in [("--user", "root"), ("--password", "")] {
        if !extra.contains(&flag) {
            args.extend([flag, value]);
        }
    }
    args.extend_from_slice(extra);
    RunConfig::try_from_args(args).expect("valid arguments")
}

#[cfg(unix)]
#[tokio::test]
async fn test_successful_dump_captures_stdout() {
    let config = config_with_binary("echo", &[]);
    let report = run_dump(&config).await.unwrap();

    assert_eq!(
        report.stdout.trim_end(),
        "--host 127.0.0.1 --port 4000 --filter test.t --tidb-mem-quota-query 8589934592 \
         --logfile dump.log --rows 10000 --loglevel debug --threads 32"
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_dump_receives_credentials() {
    let config = config_with_binary("echo", &["--user", "bench", "--password", "s3cret"]);
    let report = run_dump(&config).await.unwrap();

    assert!(report
        .stdout
        .trim_end()
        .ends_with("--threads 32 --user bench --password s3cret"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_nonzero_exit_returns_stderr() {
    // `sh` rejects the long options and complains on stderr.
    let config = config_with_binary("sh", &[]);
    match run_dump(&config).await {
        Err(DumpError::Failed { status, stderr, .. }) => {
            assert!(!status.success());
            assert!(!stderr.is_empty());
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_binary_is_a_launch_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("dumpling");
    let config = config_with_binary(missing.to_str().unwrap(), &[]);

    let err = run_dump(&config).await.unwrap_err();
    assert!(matches!(err, DumpError::Launch { .. }));
    assert!(err.to_string().starts_with("failed to launch"));
}
