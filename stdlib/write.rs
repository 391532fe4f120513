use skein_runtime::error::ErrorKind;
use skein_runtime::port::STDOUT_FD;
use skein_runtime::value::NativeFn;
use skein_runtime::{Context, Env, Result, Value};
use skein_runtime_syntax::writer::display_value;

/// Writes each argument to standard output, returning the number of arguments written
pub fn stdlib_write(ctx: &mut Context, args: Value, _: &mut Env) -> Result<Value> {
    let mut output = Vec::<u8>::new();
    let mut count = 0;

    for value in args.list_iter() {
        // Writing to a `Vec` can't fail
        let _ = display_value(&mut output, ctx.interner(), &value);
        count += 1;
    }

    ctx.ports_mut()
        .write_bytes(STDOUT_FD, &output)
        .map_err(|error| ErrorKind::Io {
            path: "<stdout>".to_owned(),
            error,
        })?;

    Ok(Value::Int(count))
}

pub const EXPORTS: &[(&str, NativeFn)] = &[("write", stdlib_write)];
