// src/builtins/process.rs

//! `pread` and `find_in_path`.

use tracing::debug;

use super::context::CallArgs;
use super::value::NaslValue;
use super::UnsafeBuiltins;
use crate::exec::LaunchRequest;

/// `pread(cmd:, argv:, cd:, drop_privileges_user:)`
///
/// Runs `cmd` with `argv` as its argument vector and returns everything the
/// child wrote to stdout and stderr as data.
pub fn pread(ctx: &mut UnsafeBuiltins, args: &CallArgs) -> Option<NaslValue> {
    let cmd = args.get_str_by_name("cmd");
    let argv = args.get_by_name("argv");
    let (Some(cmd), Some(argv)) = (cmd, argv) else {
        ctx.error("pread() usage: cmd:..., argv:...");
        return None;
    };

    let Some(argv) = argv.as_array() else {
        ctx.error(format!(
            "pread: argv element must be an array ({})",
            argv.type_name()
        ));
        return None;
    };

    let mut req = LaunchRequest::new(cmd.into_owned(), argv.to_arg_list())
        .change_dir(args.get_int_by_name("cd", 0) != 0);
    if let Some(user) = args.get_str_by_name("drop_privileges_user") {
        req = req.drop_privileges_user(user.into_owned());
    }

    match ctx.launcher().launch_blocking(&req) {
        Ok(out) => Some(NaslValue::Data(out.into_bytes())),
        Err(e) => {
            debug!(cmd = %req.cmd, error = %e, "pread failed");
            ctx.error(format!("pread: {e}"));
            None
        }
    }
}

/// `find_in_path(cmd)`: 1 if `cmd` is found in the search path, else 0.
pub fn find_in_path(ctx: &mut UnsafeBuiltins, args: &CallArgs) -> Option<NaslValue> {
    let Some(cmd) = args.get_str_by_num(0) else {
        ctx.error("find_in_path() usage: cmd");
        return None;
    };
    let found = ctx.launcher().probe().resolvable(&cmd);
    Some(NaslValue::Int(i64::from(found)))
}
