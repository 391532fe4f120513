mod command;
mod history;
mod skein_helper;
mod syntax;

use std::path;

use ansi_term::{Colour, Style};
use tracing::warn;

use crate::engine::{EngineCtx, Evaled, Request};
use crate::reporting::emit_error_to_stderr;
use crate::DriverConfig;

use command::{parse_command, ParsedCommand};
use history::repl_history_path;
use skein_helper::SkeinHelper;

const PROMPT: &str = "skein> ";
const REPL_ORIGIN: &str = "<repl>";

fn print_evaled(cfg: &DriverConfig, evaled: Evaled) {
    let expr_arrow_style = if cfg.colour {
        Colour::Green.bold()
    } else {
        Style::new()
    };

    for value_str in evaled.values {
        println!("{} {}", expr_arrow_style.paint("=>"), value_str);
    }

    if let Some(err) = evaled.error {
        emit_error_to_stderr(cfg.colour, &err);
    }
}

pub fn interactive_loop(cfg: &DriverConfig, include_paths: Vec<path::PathBuf>) {
    use rustyline::error::ReadlineError;

    // Setup our evaluation backend
    let engine_ctx = match EngineCtx::new() {
        Ok(engine_ctx) => engine_ctx,
        Err(err) => {
            eprintln!("unable to start evaluation engine: {}", err);
            return;
        }
    };

    // Setup Rustyline
    let mut rl = rustyline::Editor::<SkeinHelper>::new();

    let mut sent_prelude_requests = 0;
    for include_path in include_paths {
        if engine_ctx.send(Request::LoadFile(include_path)).is_err() {
            return;
        }
        sent_prelude_requests += 1;
    }

    // Request an empty evaluation so we learn the initial bound names
    let initial_request = Request::Eval {
        origin: REPL_ORIGIN.to_owned(),
        source: String::new(),
    };
    if engine_ctx.send(initial_request).is_err() {
        return;
    }
    sent_prelude_requests += 1;

    // Load our history while the engine is thinking
    let history_path = repl_history_path();
    if let Some(ref history_path) = history_path {
        let _ = rl.load_history(history_path);
    }

    // Collect all the responses
    for _ in 0..sent_prelude_requests {
        match engine_ctx.receive() {
            Ok(evaled) => {
                rl.set_helper(Some(SkeinHelper::new(
                    evaled.bound_names.clone(),
                    cfg.colour,
                )));

                // Values of included files aren't echoed
                if let Some(err) = evaled.error {
                    emit_error_to_stderr(cfg.colour, &err);
                }
            }
            Err(_) => {
                eprintln!("evaluation engine exited unexpectedly");
                return;
            }
        }
    }

    loop {
        let mut history_dirty = false;
        let readline = rl.readline(PROMPT);

        match readline {
            Ok(line) => {
                if !line.chars().all(char::is_whitespace) {
                    history_dirty = rl.add_history_entry(line.clone());
                }

                let input = match parse_command(line) {
                    ParsedCommand::Eval(input) => input,
                    ParsedCommand::Quit => {
                        break;
                    }
                    ParsedCommand::Other => {
                        continue;
                    }
                };

                let request = Request::Eval {
                    origin: REPL_ORIGIN.to_owned(),
                    source: input,
                };

                if engine_ctx.send(request).is_err() {
                    eprintln!("evaluation engine exited unexpectedly");
                    break;
                }

                if history_dirty {
                    // Write our history while the engine is thinking
                    if let Some(ref history_path) = history_path {
                        let _ = rl.save_history(&history_path);
                    }
                }

                match engine_ctx.receive() {
                    Ok(evaled) => {
                        // Refresh our completions
                        rl.set_helper(Some(SkeinHelper::new(
                            evaled.bound_names.clone(),
                            cfg.colour,
                        )));

                        print_evaled(cfg, evaled);
                    }
                    Err(_) => {
                        eprintln!("evaluation engine exited unexpectedly");
                        break;
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(other) => {
                warn!(error = %other, "readline failed");
                break;
            }
        }
    }
}
