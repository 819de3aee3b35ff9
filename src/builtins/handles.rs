// src/builtins/handles.rs

//! Handle-based file I/O: `file_open`, `file_close`, `file_read`,
//! `file_write`, `file_seek`.
//!
//! Scripts get an integer handle back from `file_open`. The handle is the
//! file's descriptor number, but the file itself is owned by the
//! [`HandleTable`] of the builtin context, so a script can never touch a
//! descriptor it did not open through these builtins.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;

use tracing::debug;

use super::context::CallArgs;
use super::value::NaslValue;
use super::UnsafeBuiltins;

/// Open files of one builtin context, keyed by handle.
#[derive(Debug, Default)]
pub struct HandleTable {
    files: BTreeMap<i64, File>,
}

impl HandleTable {
    pub fn insert(&mut self, file: File) -> i64 {
        let handle = i64::from(file.as_raw_fd());
        self.files.insert(handle, file);
        handle
    }

    pub fn get_mut(&mut self, handle: i64) -> Option<&mut File> {
        self.files.get_mut(&handle)
    }

    pub fn remove(&mut self, handle: i64) -> Option<File> {
        self.files.remove(&handle)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Open options for a script mode string. Unknown modes open read-only.
fn open_options(mode: &str) -> OpenOptions {
    let mut opts = OpenOptions::new();
    match mode {
        "w" => opts.write(true).create(true),
        "w+" => opts.write(true).truncate(true).create(true),
        "a" => opts.append(true).create(true),
        "a+" => opts.read(true).append(true).create(true),
        _ => opts.read(true),
    };
    opts.mode(0o600);
    opts
}

/// `file_open(name:, mode:)`: open a file and return its handle.
pub fn file_open(ctx: &mut UnsafeBuiltins, args: &CallArgs) -> Option<NaslValue> {
    let Some(fname) = args.get_str_by_name("name") else {
        ctx.error("file_open: need file name argument");
        return None;
    };
    let Some(mode) = args.get_str_by_name("mode") else {
        ctx.error("file_open: need file mode argument");
        return None;
    };

    let file = match open_options(&mode).open(fname.as_ref()) {
        Ok(f) => f,
        Err(e) => {
            ctx.error(format!("file_open: {fname}: possible symlink attack!?! {e}"));
            return None;
        }
    };
    if let Err(e) = file.metadata() {
        ctx.error(format!("file_open: {fname}: possible symlink attack!?! {e}"));
        return None;
    }

    let handle = ctx.handles_mut().insert(file);
    debug!(file = %fname, %mode, handle, "opened file");
    Some(NaslValue::Int(handle))
}

/// `file_close(fp)`
pub fn file_close(ctx: &mut UnsafeBuiltins, args: &CallArgs) -> Option<NaslValue> {
    let handle = args.get_int_by_num(0, -1);
    if handle < 0 {
        ctx.error("file_close: need file pointer argument");
        return None;
    }
    match ctx.handles_mut().remove(handle) {
        Some(file) => {
            drop(file);
            Some(NaslValue::Int(0))
        }
        None => {
            ctx.error(format!("file_close: unknown file pointer {handle}"));
            None
        }
    }
}

/// `file_read(fp:, length:)`: up to `length` bytes as data.
///
/// Stops early at end of file; a read error ends the read with what was
/// collected so far.
pub fn file_read(ctx: &mut UnsafeBuiltins, args: &CallArgs) -> Option<NaslValue> {
    let handle = args.get_int_by_name("fp", -1);
    if handle < 0 {
        ctx.error("file_read: need file pointer argument");
        return None;
    }
    let length = u64::try_from(args.get_int_by_name("length", 0)).unwrap_or(0);

    let Some(file) = ctx.handles_mut().get_mut(handle) else {
        ctx.error(format!("file_read: unknown file pointer {handle}"));
        return None;
    };

    // Only what the file actually holds is allocated, whatever `length` says.
    let mut buf = Vec::new();
    if let Err(e) = std::io::Read::by_ref(file).take(length).read_to_end(&mut buf) {
        debug!(handle, error = %e, read = buf.len(), "file_read stopped early");
    }
    Some(NaslValue::Data(buf))
}

/// `file_write(fp:, data:)`: bytes actually written.
pub fn file_write(ctx: &mut UnsafeBuiltins, args: &CallArgs) -> Option<NaslValue> {
    let handle = args.get_int_by_name("fp", -1);
    let data = args.get_bytes_by_name("data");
    let Some(data) = data.filter(|_| handle >= 0) else {
        ctx.error("file_write: need two arguments 'fp' and 'data'");
        return None;
    };

    let Some(file) = ctx.handles_mut().get_mut(handle) else {
        ctx.error(format!("file_write: unknown file pointer {handle}"));
        return None;
    };

    let mut n = 0;
    let mut failure = None;
    while n < data.len() {
        match file.write(&data[n..]) {
            Ok(0) => {
                failure = Some(std::io::Error::from(ErrorKind::WriteZero));
                break;
            }
            Ok(written) => n += written,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }
    if let Some(e) = failure {
        ctx.error(format!("file_write: write() failed - {e}"));
    }
    Some(NaslValue::Int(n as i64))
}

/// `file_seek(fp:, offset:)`: absolute seek.
pub fn file_seek(ctx: &mut UnsafeBuiltins, args: &CallArgs) -> Option<NaslValue> {
    let offset = args.get_int_by_name("offset", 0);
    let handle = args.get_int_by_name("fp", -1);
    if handle < 0 {
        ctx.error("file_seek: need one arguments 'fp'");
        return None;
    }

    let Ok(offset) = u64::try_from(offset) else {
        ctx.error(format!("fseek: invalid offset {offset}"));
        return None;
    };
    let Some(file) = ctx.handles_mut().get_mut(handle) else {
        ctx.error(format!("file_seek: unknown file pointer {handle}"));
        return None;
    };
    match file.seek(SeekFrom::Start(offset)) {
        Ok(_) => Some(NaslValue::Int(0)),
        Err(e) => {
            ctx.error(format!("fseek: {e}"));
            None
        }
    }
}
