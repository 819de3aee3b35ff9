// src/lib.rs

pub mod builtins;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod path;
pub mod sink;

use std::io::Write;

use anyhow::{Context, Result};
use tracing::debug;

use crate::cli::{CliArgs, CliCommand};
use crate::config::ConfigFile;
use crate::exec::{ArgList, LaunchRequest, Launcher};

/// High-level entry point used by `main.rs`.
///
/// Returns the process exit code: 0 on success, 1 when the launch failed or
/// the command was not found.
pub async fn run(args: CliArgs, cfg: &ConfigFile) -> Result<i32> {
    let launcher = Launcher::from_config(&cfg.exec);

    match args.command {
        CliCommand::Pread {
            cd,
            user,
            cmd,
            argv,
        } => {
            let mut req = LaunchRequest::new(cmd, argv.into_iter().collect::<ArgList>())
                .change_dir(cd);
            if let Some(user) = user {
                req = req.drop_privileges_user(user);
            }

            match launcher.launch(&req).await {
                Ok(out) => {
                    let mut stdout = std::io::stdout().lock();
                    stdout
                        .write_all(out.as_bytes())
                        .and_then(|_| stdout.flush())
                        .context("writing captured output to stdout")?;
                    Ok(0)
                }
                Err(e) => {
                    launcher.sink().error(&format!("pread: {e}"));
                    Ok(1)
                }
            }
        }
        CliCommand::FindInPath { name } => {
            let found = launcher.probe().resolvable(&name);
            debug!(cmd = %name, found, "find_in_path");
            println!("{}", u8::from(found));
            Ok(if found { 0 } else { 1 })
        }
    }
}
