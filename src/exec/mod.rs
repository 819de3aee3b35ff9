// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`guard`] holds the single-flight [`ExecutionGuard`].
//! - [`multiplex`] drains a child's stdout and stderr into one buffer.
//! - [`workdir`] changes the working directory for the duration of a launch.
//! - [`command`] models the command and its sparse argument list.
//! - [`privileges`] switches user before a spawn when a script asks for it.
//! - [`launcher`] ties the pieces together into [`Launcher::launch`].

pub mod command;
pub mod guard;
pub mod launcher;
pub mod multiplex;
pub mod privileges;
pub mod workdir;

pub use command::{ArgList, LaunchRequest};
pub use guard::{ExecutionGuard, GuardToken};
pub use launcher::{CapturedOutput, Launcher};
pub use multiplex::StreamMultiplexer;
pub use privileges::{DenyPrivilegeDrop, PrivilegeDrop, UnixPrivilegeDrop};
pub use workdir::DirectoryContext;
