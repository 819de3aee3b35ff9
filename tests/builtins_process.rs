// tests/builtins_process.rs
mod common;
use crate::common::{init_tracing, launcher_in, launcher_with, RecordingSink, ScriptDir};

use std::error::Error;

use nasl_exec::builtins::{self, CallArgs, NaslArray, NaslValue, UnsafeBuiltins};

type TestResult = Result<(), Box<dyn Error>>;

fn builtins_with(sink: &RecordingSink) -> UnsafeBuiltins {
    UnsafeBuiltins::new(launcher_with(sink))
}

fn argv(items: &[&str]) -> NaslValue {
    items.iter().copied().collect::<NaslArray>().into()
}

#[test]
fn pread_returns_combined_output_as_data() {
    init_tracing();
    let sink = RecordingSink::new();
    let mut ctx = builtins_with(&sink);

    let args = CallArgs::new()
        .named("cmd", "sh")
        .named("argv", argv(&["sh", "-c", "printf 'x\\000y'; printf z >&2"]));
    let out = ctx.call("pread", &args);

    let Some(NaslValue::Data(bytes)) = out else {
        panic!("expected data, got {out:?}");
    };
    assert_eq!(bytes.len(), 4);
    assert!(bytes.starts_with(b"x\0y") || bytes.ends_with(b"x\0y"), "{bytes:?}");
    assert!(sink.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn pread_from_async_interpreter_task() {
    init_tracing();
    let sink = RecordingSink::new();
    let mut ctx = builtins_with(&sink);

    let args = CallArgs::new()
        .named("cmd", "sh")
        .named("argv", argv(&["sh", "-c", "printf async"]));

    assert_eq!(ctx.call("pread", &args), Some(NaslValue::Data(b"async".to_vec())));
    assert!(sink.is_empty());
}

#[tokio::test]
async fn pread_from_single_threaded_runtime() {
    init_tracing();
    let sink = RecordingSink::new();
    let mut ctx = builtins_with(&sink);

    let args = CallArgs::new()
        .named("cmd", "sh")
        .named("argv", argv(&["sh", "-c", "printf local"]));

    assert_eq!(ctx.call("pread", &args), Some(NaslValue::Data(b"local".to_vec())));
    assert!(sink.is_empty());
}

#[test]
fn pread_integer_arguments_are_stringified() {
    init_tracing();
    let mut ctx = builtins_with(&RecordingSink::new());

    let mut arr = NaslArray::new();
    arr.push("sh").push("-c").push("printf %s \"$1\"").push("sh").push(42i64);
    let args = CallArgs::new().named("cmd", "sh").named("argv", arr);

    assert_eq!(ctx.call("pread", &args), Some(NaslValue::Data(b"42".to_vec())));
}

#[test]
fn pread_without_argv_is_a_usage_error() {
    init_tracing();
    let sink = RecordingSink::new();
    let mut ctx = builtins_with(&sink);

    assert_eq!(ctx.call("pread", &CallArgs::new().named("cmd", "ls")), None);
    assert_eq!(sink.errors(), vec!["pread() usage: cmd:..., argv:...".to_string()]);
}

#[test]
fn pread_argv_must_be_an_array() {
    init_tracing();
    let sink = RecordingSink::new();
    let mut ctx = builtins_with(&sink);

    let args = CallArgs::new().named("cmd", "ls").named("argv", "ls -la");
    assert_eq!(ctx.call("pread", &args), None);
    assert_eq!(
        sink.errors(),
        vec!["pread: argv element must be an array (string)".to_string()]
    );
}

#[test]
fn pread_named_argv_entries_only_warn() {
    init_tracing();
    let sink = RecordingSink::new();
    let mut ctx = builtins_with(&sink);

    let mut arr = NaslArray::new();
    arr.push("sh").push("-c").push("printf ok").set_named("ignored", "x");
    let args = CallArgs::new().named("cmd", "sh").named("argv", arr);

    assert_eq!(ctx.call("pread", &args), Some(NaslValue::Data(b"ok".to_vec())));
    assert_eq!(sink.warnings().len(), 1);
    assert!(sink.errors().is_empty());
}

#[test]
fn pread_with_cd_reports_missing_command() {
    init_tracing();
    let scripts = ScriptDir::new().unwrap();
    let sink = RecordingSink::new();
    let mut ctx = UnsafeBuiltins::new(launcher_in(&sink, &scripts));

    let args = CallArgs::new()
        .named("cmd", "absent-tool")
        .named("argv", argv(&["absent-tool"]))
        .named("cd", 1i64);

    assert_eq!(ctx.call("pread", &args), None);
    assert_eq!(
        sink.errors(),
        vec!["pread: 'absent-tool' not found in PATH".to_string()]
    );
}

#[test]
fn pread_is_usable_again_after_a_failure() {
    init_tracing();
    let sink = RecordingSink::new();
    let mut ctx = builtins_with(&sink);

    let bad = CallArgs::new()
        .named("cmd", "/no/such/tool")
        .named("argv", argv(&["tool"]));
    assert_eq!(ctx.call("pread", &bad), None);
    assert_eq!(sink.errors().len(), 1);

    let good = CallArgs::new()
        .named("cmd", "sh")
        .named("argv", argv(&["sh", "-c", "printf back"]));
    assert_eq!(ctx.call("pread", &good), Some(NaslValue::Data(b"back".to_vec())));
}

#[test]
fn find_in_path_answers_without_running_anything() -> TestResult {
    init_tracing();
    let scripts = ScriptDir::new()?;
    let marker = scripts.path().join("executed");
    scripts.script("tripwire", &format!("touch '{}'", marker.display()))?;
    let mut ctx = UnsafeBuiltins::new(launcher_in(&RecordingSink::new(), &scripts));

    assert_eq!(
        ctx.call("find_in_path", &CallArgs::new().arg("tripwire")),
        Some(NaslValue::Int(1))
    );
    assert_eq!(
        ctx.call("find_in_path", &CallArgs::new().arg("sh")),
        Some(NaslValue::Int(0)),
        "only the configured search path is consulted"
    );
    assert!(!marker.exists());
    Ok(())
}

#[test]
fn find_in_path_uses_process_path_by_default() {
    init_tracing();
    let mut ctx = builtins_with(&RecordingSink::new());

    assert_eq!(
        ctx.call("find_in_path", &CallArgs::new().arg("sh")),
        Some(NaslValue::Int(1))
    );
    assert_eq!(
        ctx.call("find_in_path", &CallArgs::new().arg("surely-not-a-real-binary-xyz")),
        Some(NaslValue::Int(0))
    );
}

#[test]
fn find_in_path_requires_an_argument() {
    init_tracing();
    let sink = RecordingSink::new();
    let mut ctx = builtins_with(&sink);

    assert_eq!(ctx.call("find_in_path", &CallArgs::new()), None);
    assert_eq!(sink.errors(), vec!["find_in_path() usage: cmd".to_string()]);
}

#[test]
fn unknown_builtins_are_reported() {
    init_tracing();
    let sink = RecordingSink::new();
    let mut ctx = builtins_with(&sink);

    assert_eq!(ctx.call("system", &CallArgs::new()), None);
    assert_eq!(sink.errors(), vec!["system: unknown builtin".to_string()]);
    assert!(builtins::lookup("pread").is_some());
}
