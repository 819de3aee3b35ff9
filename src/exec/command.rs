// src/exec/command.rs

//! What to launch: command, argument vector, relocation flag.
//!
//! Arguments come from an indexable and possibly sparse collection. Empty
//! slots are skipped when the argument vector is built. Named (non-indexed)
//! entries are not arguments at all: they are remembered only so the
//! launcher can warn that they were ignored.
//!
//! The command is *not* prepended to the argument vector. The supplied
//! arguments are the child's `argv` verbatim, so callers pass the program
//! name as argument 0 when the program expects one. An empty argument list
//! runs the command with `argv[0]` set to the command itself.
//!
//! The program executed is always `cmd`; `argv[0]` only sets the name the
//! child sees. This differs from spawners that search for and execute
//! `argv[0]` and use `cmd` only to pick the working directory: when the two
//! name different programs, `cmd` is the one that runs here.

use std::ffi::{OsStr, OsString};

use crate::errors::ExecError;

/// Sparse, ordered argument collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgList {
    slots: Vec<Option<OsString>>,
    named: Vec<String>,
}

impl ArgList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument in the next index.
    pub fn push(&mut self, arg: impl Into<OsString>) -> &mut Self {
        self.slots.push(Some(arg.into()));
        self
    }

    /// Append an empty slot; it is skipped in the argument vector.
    pub fn push_hole(&mut self) -> &mut Self {
        self.slots.push(None);
        self
    }

    /// Record a named entry. Named entries never reach the child.
    pub fn push_named(&mut self, key: impl Into<String>) -> &mut Self {
        self.named.push(key.into());
        self
    }

    /// Number of indexed slots, holes included.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn named_keys(&self) -> &[String] {
        &self.named
    }

    /// Arguments in index order, holes removed.
    pub fn to_argv(&self) -> Vec<OsString> {
        self.slots.iter().flatten().cloned().collect()
    }
}

impl<S: Into<OsString>> FromIterator<S> for ArgList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().map(|s| Some(s.into())).collect(),
            named: Vec::new(),
        }
    }
}

/// A single `pread`-style launch.
#[derive(Debug, Clone, Default)]
pub struct LaunchRequest {
    pub cmd: String,
    pub args: ArgList,
    /// Run the child from the directory containing the command.
    pub change_dir: bool,
    /// Drop privileges to this user before spawning.
    pub drop_privileges_user: Option<String>,
}

impl LaunchRequest {
    pub fn new(cmd: impl Into<String>, args: ArgList) -> Self {
        Self {
            cmd: cmd.into(),
            args,
            ..Self::default()
        }
    }

    pub fn change_dir(mut self, change_dir: bool) -> Self {
        self.change_dir = change_dir;
        self
    }

    pub fn drop_privileges_user(mut self, user: impl Into<String>) -> Self {
        self.drop_privileges_user = Some(user.into());
        self
    }

    /// Reject inputs that can never launch. Runs before any side effect.
    pub fn validate(&self) -> Result<(), ExecError> {
        if self.cmd.is_empty() {
            return Err(ExecError::Validation(
                "pread() usage: cmd:..., argv:...".to_string(),
            ));
        }
        if self.cmd.contains('\0') {
            return Err(ExecError::Validation(format!(
                "pread: command {:?} contains a NUL byte",
                self.cmd
            )));
        }
        Ok(())
    }
}

/// Program, `argv[0]` and remaining arguments for the spawn call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnPlan {
    pub program: OsString,
    pub arg0: OsString,
    pub rest: Vec<OsString>,
}

impl SpawnPlan {
    /// `program` is what gets executed (bare names are searched in `PATH`).
    pub fn build(program: &OsStr, argv: Vec<OsString>) -> Self {
        let mut argv = argv.into_iter();
        let arg0 = argv.next().unwrap_or_else(|| program.to_os_string());
        Self {
            program: program.to_os_string(),
            arg0,
            rest: argv.collect(),
        }
    }
}
