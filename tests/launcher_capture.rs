// tests/launcher_capture.rs
mod common;
use crate::common::{init_tracing, launcher_in, launcher_with, RecordingSink, ScriptDir};

use std::error::Error;
use std::sync::Arc;

use nasl_exec::errors::ExecError;
use nasl_exec::exec::{ArgList, DenyPrivilegeDrop, LaunchRequest};

type TestResult = Result<(), Box<dyn Error>>;

fn sh(script: &str) -> LaunchRequest {
    LaunchRequest::new("sh", ["sh", "-c", script].into_iter().collect::<ArgList>())
}

#[tokio::test]
async fn captures_both_streams() -> TestResult {
    init_tracing();
    let sink = RecordingSink::new();
    let launcher = launcher_with(&sink);

    let out = launcher.launch(&sh("printf out; printf err >&2")).await?;

    assert_eq!(out.len(), 6);
    let text = String::from_utf8(out.into_bytes())?;
    assert!(text.contains("out"), "{text:?}");
    assert!(text.contains("err"), "{text:?}");
    assert!(sink.is_empty());
    Ok(())
}

/// Every byte of both streams arrives, and each stream keeps its own order.
/// stdout only uses `a-j` and newlines, stderr only `A-J` and `;`, so the
/// combined buffer can be split back apart.
#[tokio::test]
async fn large_output_keeps_per_stream_order() -> TestResult {
    init_tracing();
    let sink = RecordingSink::new();
    let launcher = launcher_with(&sink).with_chunk_size(512);

    let out = launcher
        .launch(&sh(
            "seq 1 20000 | tr '0-9' 'a-j'; seq 1 20000 | tr '0-9\\n' 'A-J;' >&2",
        ))
        .await?;

    let expected_out: String = (1..=20000)
        .map(|i: u32| {
            let s: String = i.to_string().chars().map(|c| (c as u8 - b'0' + b'a') as char).collect();
            s + "\n"
        })
        .collect();
    let expected_err: String = (1..=20000)
        .map(|i: u32| {
            let s: String = i.to_string().chars().map(|c| (c as u8 - b'0' + b'A') as char).collect();
            s + ";"
        })
        .collect();

    let bytes = out.as_bytes();
    assert_eq!(bytes.len(), expected_out.len() + expected_err.len());

    let got_out: Vec<u8> = bytes
        .iter()
        .copied()
        .filter(|b| b.is_ascii_lowercase() || *b == b'\n')
        .collect();
    let got_err: Vec<u8> = bytes
        .iter()
        .copied()
        .filter(|b| b.is_ascii_uppercase() || *b == b';')
        .collect();
    assert_eq!(got_out, expected_out.as_bytes());
    assert_eq!(got_err, expected_err.as_bytes());
    Ok(())
}

#[tokio::test]
async fn binary_output_with_nul_bytes_is_preserved() -> TestResult {
    init_tracing();
    let launcher = launcher_with(&RecordingSink::new());

    let out = launcher.launch(&sh("printf 'a\\000b\\377'")).await?;

    assert_eq!(out.as_bytes(), &[b'a', 0, b'b', 0xff]);
    Ok(())
}

#[tokio::test]
async fn silent_command_with_empty_argv_is_empty_success() -> TestResult {
    init_tracing();
    let launcher = launcher_with(&RecordingSink::new());

    let out = launcher.launch(&LaunchRequest::new("true", ArgList::new())).await?;

    assert!(out.is_empty());
    Ok(())
}

#[tokio::test]
async fn child_stdin_is_not_inherited() -> TestResult {
    init_tracing();
    let launcher = launcher_with(&RecordingSink::new());

    // `cat` with no input returns at once because stdin is /dev/null.
    let out = launcher.launch(&LaunchRequest::new("cat", ArgList::new())).await?;

    assert!(out.is_empty());
    Ok(())
}

#[tokio::test]
async fn supplied_arguments_are_the_whole_argv() -> TestResult {
    init_tracing();
    let launcher = launcher_with(&RecordingSink::new());
    let req = LaunchRequest::new(
        "sh",
        ["not-sh", "-c", "printf '%s' \"$0\""].into_iter().collect::<ArgList>(),
    );

    let out = launcher.launch(&req).await?;

    assert_eq!(out.as_bytes(), b"not-sh");
    Ok(())
}

#[tokio::test]
async fn holes_are_skipped_and_named_entries_warned() -> TestResult {
    init_tracing();
    let sink = RecordingSink::new();
    let launcher = launcher_with(&sink);

    let mut args = ArgList::new();
    args.push("sh")
        .push_hole()
        .push("-c")
        .push("printf '%s|' \"$@\"")
        .push("x")
        .push_hole()
        .push("y")
        .push_named("extra");

    let out = launcher.launch(&LaunchRequest::new("sh", args)).await?;

    assert_eq!(out.as_bytes(), b"y|");
    assert_eq!(
        sink.warnings(),
        vec!["pread: named elements in 'cmd' are ignored!".to_string()]
    );
    assert!(sink.errors().is_empty());
    Ok(())
}

#[tokio::test]
async fn spawn_failure_is_reported_and_guard_released() -> TestResult {
    init_tracing();
    let launcher = launcher_with(&RecordingSink::new());

    let err = launcher
        .launch(&LaunchRequest::new("/nonexistent/scanner-tool", ArgList::new()))
        .await
        .unwrap_err();

    assert!(matches!(err, ExecError::Spawn { .. }), "{err:?}");
    assert!(!launcher.guard().is_busy());
    assert_eq!(launcher.launch(&sh("printf again")).await?.as_bytes(), b"again");
    Ok(())
}

#[tokio::test]
async fn empty_command_fails_validation_without_side_effects() -> TestResult {
    init_tracing();
    let launcher = launcher_with(&RecordingSink::new());

    let err = launcher
        .launch(&LaunchRequest::new("", ArgList::new()))
        .await
        .unwrap_err();

    assert!(matches!(err, ExecError::Validation(_)));
    assert!(!launcher.guard().is_busy());
    Ok(())
}

#[tokio::test]
async fn refused_privilege_drop_aborts_before_spawn() -> TestResult {
    init_tracing();
    let scripts = ScriptDir::new()?;
    let marker = scripts.path().join("ran");
    let launcher = launcher_with(&RecordingSink::new())
        .with_privilege_drop(Arc::new(DenyPrivilegeDrop));

    let req = sh(&format!("touch '{}'", marker.display())).drop_privileges_user("nobody");
    let err = launcher.launch(&req).await.unwrap_err();

    assert!(matches!(err, ExecError::PrivilegeDrop(_)), "{err:?}");
    assert!(!marker.exists(), "child must not have been spawned");
    assert!(!launcher.guard().is_busy());
    Ok(())
}

#[tokio::test]
async fn globally_dropped_privileges_skip_per_call_drop() -> TestResult {
    init_tracing();
    let launcher = launcher_with(&RecordingSink::new())
        .with_privilege_drop(Arc::new(DenyPrivilegeDrop))
        .with_privileges_dropped(true);

    let out = launcher
        .launch(&sh("printf ok").drop_privileges_user("nobody"))
        .await?;

    assert_eq!(out.as_bytes(), b"ok");
    Ok(())
}

#[test]
fn blocking_launch_works_without_a_runtime() -> TestResult {
    init_tracing();
    let launcher = launcher_with(&RecordingSink::new());

    let out = launcher.launch_blocking(&sh("printf sync"))?;

    assert_eq!(out.as_bytes(), b"sync");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn blocking_launch_inside_multi_thread_runtime() -> TestResult {
    init_tracing();
    let launcher = launcher_with(&RecordingSink::new());

    let out = launcher.launch_blocking(&sh("printf worker"))?;

    assert_eq!(out.as_bytes(), b"worker");
    Ok(())
}

#[tokio::test]
async fn blocking_launch_inside_current_thread_runtime() -> TestResult {
    init_tracing();
    let launcher = launcher_with(&RecordingSink::new());

    let out = launcher.launch_blocking(&sh("printf helper"))?;

    assert_eq!(out.as_bytes(), b"helper");
    assert!(!launcher.guard().is_busy());
    Ok(())
}

#[tokio::test]
async fn configured_search_path_is_used_without_relocation() -> TestResult {
    init_tracing();
    let scripts = ScriptDir::new()?;
    scripts.script("only-here", "printf here")?;
    let launcher = launcher_in(&RecordingSink::new(), &scripts);

    assert!(launcher.probe().resolvable("only-here"));
    let out = launcher
        .launch(&LaunchRequest::new("only-here", ArgList::new()))
        .await?;
    assert_eq!(out.as_bytes(), b"here");

    // `sh` is on the process PATH but not in the configured search path.
    assert!(!launcher.probe().resolvable("sh"));
    let err = launcher
        .launch(&LaunchRequest::new("sh", ["sh", "-c", "true"].into_iter().collect::<ArgList>()))
        .await
        .unwrap_err();
    assert!(matches!(err, ExecError::Spawn { .. }), "{err:?}");
    assert!(!launcher.guard().is_busy());
    Ok(())
}
