// src/builtins/files.rs

//! Whole-file builtins: read, replace, remove, stat, temp dir.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use nix::unistd::{AccessFlags, access};
use tempfile::NamedTempFile;

use super::context::CallArgs;
use super::value::NaslValue;
use super::UnsafeBuiltins;

/// `fread(name)`: whole file contents as data.
pub fn fread(ctx: &mut UnsafeBuiltins, args: &CallArgs) -> Option<NaslValue> {
    let Some(fname) = args.get_str_by_num(0) else {
        ctx.error("fread: need one argument (file name)");
        return None;
    };

    match fs::read(fname.as_ref()) {
        Ok(content) => Some(NaslValue::Data(content)),
        Err(e) => {
            ctx.error(format!("fread: {fname}: {e}"));
            None
        }
    }
}

/// `fwrite(data:, file:)`: replace `file` with `data`, returns bytes written.
///
/// The new content is written to a temporary file next to the target and
/// renamed over it, so readers never see a half-written file.
pub fn fwrite(ctx: &mut UnsafeBuiltins, args: &CallArgs) -> Option<NaslValue> {
    let data = args.get_bytes_by_name("data");
    let fname = args.get_str_by_name("file");
    let (Some(data), Some(fname)) = (data, fname) else {
        ctx.error("fwrite: need two arguments 'data' and 'file'");
        return None;
    };

    match replace_contents(Path::new(fname.as_ref()), &data) {
        Ok(()) => Some(NaslValue::Int(data.len() as i64)),
        Err(e) => {
            ctx.error(format!("fwrite: {fname}: {e}"));
            None
        }
    }
}

fn replace_contents(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// `unlink(name)`: remove a file. Succeeds without a value.
pub fn unlink(ctx: &mut UnsafeBuiltins, args: &CallArgs) -> Option<NaslValue> {
    let Some(fname) = args.get_str_by_num(0) else {
        ctx.error("unlink: need one argument (file name)");
        return None;
    };

    match fs::remove_file(fname.as_ref()) {
        Ok(()) => Some(NaslValue::Null),
        Err(e) => {
            ctx.error(format!("unlink({fname}): {e}"));
            None
        }
    }
}

/// `get_tmp_dir()`: the temp directory with a trailing `/`, if usable.
pub fn get_tmp_dir(ctx: &mut UnsafeBuiltins, _args: &CallArgs) -> Option<NaslValue> {
    let path = format!("{}/", std::env::temp_dir().display());
    let flags = AccessFlags::R_OK | AccessFlags::W_OK | AccessFlags::X_OK;
    if access(path.as_str(), flags).is_err() {
        ctx.error(format!(
            "get_tmp_dir(): {path} not available - check your installation"
        ));
        return None;
    }
    Some(NaslValue::Data(path.into_bytes()))
}

/// `file_stat(name)`: file size in bytes.
///
/// A failed stat returns nothing and is not reported; scripts use it as an
/// existence check.
pub fn file_stat(ctx: &mut UnsafeBuiltins, args: &CallArgs) -> Option<NaslValue> {
    let Some(fname) = args.get_str_by_num(0) else {
        ctx.error("file_stat: need one argument (file name)");
        return None;
    };
    let meta = fs::metadata(fname.as_ref()).ok()?;
    Some(NaslValue::Int(meta.len() as i64))
}
