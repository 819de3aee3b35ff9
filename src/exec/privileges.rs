// src/exec/privileges.rs

//! Privilege drop before spawning.
//!
//! A script may ask for its child to run as another user. The launcher asks
//! a [`PrivilegeDrop`] implementation to switch the *current process* before
//! anything is spawned; when it refuses, the launch is aborted.

use std::fmt::Debug;

use nix::unistd::{Gid, Uid, User, setgid, setuid};
use tracing::{debug, info};

pub trait PrivilegeDrop: Send + Sync + Debug {
    fn drop_to(&self, user: &str) -> Result<(), String>;
}

/// Switch to `user` with `setgid`/`setuid` when running as root.
///
/// Without root there is nothing to drop and the call succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixPrivilegeDrop;

impl PrivilegeDrop for UnixPrivilegeDrop {
    fn drop_to(&self, user: &str) -> Result<(), String> {
        if !Uid::effective().is_root() {
            debug!(user, "not running as root; privilege drop is a no-op");
            return Ok(());
        }

        let entry = User::from_name(user)
            .map_err(|e| format!("failed to look up user '{user}': {e}"))?
            .ok_or_else(|| format!("user '{user}' does not exist"))?;

        drop_supplementary_groups(entry.gid)?;
        setgid(entry.gid).map_err(|e| format!("setgid({}) failed: {e}", entry.gid))?;
        setuid(entry.uid).map_err(|e| format!("setuid({}) failed: {e}", entry.uid))?;

        info!(user, uid = %entry.uid, gid = %entry.gid, "dropped privileges");
        Ok(())
    }
}

#[cfg(not(target_vendor = "apple"))]
fn drop_supplementary_groups(gid: Gid) -> Result<(), String> {
    nix::unistd::setgroups(&[gid]).map_err(|e| format!("setgroups failed: {e}"))
}

#[cfg(target_vendor = "apple")]
fn drop_supplementary_groups(_gid: Gid) -> Result<(), String> {
    Ok(())
}

/// Refuses every request. Useful where the embedding forbids user switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyPrivilegeDrop;

impl PrivilegeDrop for DenyPrivilegeDrop {
    fn drop_to(&self, user: &str) -> Result<(), String> {
        Err(format!("switching to user '{user}' is not permitted"))
    }
}
