use std::path::PathBuf;

use tracing::debug;

use crate::engine::{EngineCtx, Request};
use crate::reporting::emit_error_to_stderr;
use crate::DriverConfig;

/// Evaluates each input file in order, stopping at the first error
///
/// Returns false if any file failed to evaluate.
pub fn run_input_files(cfg: &DriverConfig, input_paths: Vec<PathBuf>) -> bool {
    let engine_ctx = match EngineCtx::new() {
        Ok(engine_ctx) => engine_ctx,
        Err(err) => {
            eprintln!("unable to start evaluation engine: {}", err);
            return false;
        }
    };

    for input_path in input_paths {
        debug!(path = %input_path.display(), "running file");

        let evaled = match engine_ctx.eval_sync(Request::LoadFile(input_path)) {
            Ok(evaled) => evaled,
            Err(_) => {
                eprintln!("evaluation engine exited unexpectedly");
                return false;
            }
        };

        if let Some(err) = evaled.error {
            emit_error_to_stderr(cfg.colour, &err);
            return false;
        }
    }

    true
}
