use std::path::PathBuf;

use tracing::debug;

use skein_runtime::port::{Fd, OpenMode, STDIN_FD, STDOUT_FD};
use skein_runtime::value::{NativeFn, FALSE};
use skein_runtime::{Context, Env, Result, Value};

use crate::args::{expect_char, expect_int, expect_str, fixed, with_optional};

fn fd_arg(name: &'static str, value: Option<Value>, default: Fd) -> Result<Option<Fd>> {
    match value {
        Some(value) => {
            let fd = expect_int(name, &value)?;
            // Negative descriptors can never be open
            Ok(if fd < 0 { None } else { Some(fd as Fd) })
        }
        None => Ok(Some(default)),
    }
}

/// Opens a file, returning its descriptor or `#f` on failure
pub fn stdlib_open_file(ctx: &mut Context, args: Value, _: &mut Env) -> Result<Value> {
    let [path, mode] = fixed::<2>("open-file", &args)?;
    let path = expect_str("open-file", &path)?;
    let mode = expect_char("open-file", &mode)?;

    let mode = match OpenMode::from_mode_char(mode) {
        Some(mode) => mode,
        None => return Ok(FALSE),
    };

    let path = PathBuf::from(String::from_utf8_lossy(&path.bytes()).into_owned());
    match ctx.ports_mut().open(&path, mode) {
        Ok(fd) => Ok(Value::Int(fd as i32)),
        Err(err) => {
            debug!(path = %path.display(), %err, "unable to open file");
            Ok(FALSE)
        }
    }
}

/// Closes a file descriptor, returning `#f` if it wasn't an open file
pub fn stdlib_close_file(ctx: &mut Context, args: Value, _: &mut Env) -> Result<Value> {
    let [fd] = fixed::<1>("close-file", &args)?;
    let fd = expect_int("close-file", &fd)?;

    if fd < 0 {
        return Ok(FALSE);
    }

    Ok(Value::Bool(ctx.ports_mut().close(fd as Fd).is_ok()))
}

/// Reads one byte as a character
///
/// Returns `()` at the end of input and `#f` if the read fails.
pub fn stdlib_read_char(ctx: &mut Context, args: Value, _: &mut Env) -> Result<Value> {
    let ([], fd) = with_optional::<0>("read-char", &args)?;

    let fd = match fd_arg("read-char", fd, STDIN_FD)? {
        Some(fd) => fd,
        None => return Ok(FALSE),
    };

    match ctx.ports_mut().read_byte(fd) {
        Ok(Some(byte)) => Ok(Value::Char(byte)),
        Ok(None) => Ok(Value::Nil),
        Err(_) => Ok(FALSE),
    }
}

pub fn stdlib_write_char(ctx: &mut Context, args: Value, _: &mut Env) -> Result<Value> {
    let ([c], fd) = with_optional::<1>("write-char", &args)?;
    let c = expect_char("write-char", &c)?;

    let fd = match fd_arg("write-char", fd, STDOUT_FD)? {
        Some(fd) => fd,
        None => return Ok(FALSE),
    };

    Ok(Value::Bool(ctx.ports_mut().write_bytes(fd, &[c]).is_ok()))
}

pub const EXPORTS: &[(&str, NativeFn)] = &[
    ("open-file", stdlib_open_file),
    ("close-file", stdlib_close_file),
    ("read-char", stdlib_read_char),
    ("write-char", stdlib_write_char),
];
