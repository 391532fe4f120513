pub const QUIT_COMMAND: &str = "/quit";
pub const HELP_COMMAND: &str = "/help";

#[derive(Debug, PartialEq)]
pub enum ParsedCommand {
    Eval(String),
    Quit,
    Other,
}

pub fn parse_command(line: String) -> ParsedCommand {
    match line.trim() {
        HELP_COMMAND => {
            println!("Available REPL commands:");
            println!();
            println!("/help                 Prints this summary");
            println!("/quit                 Exits the REPL");
            ParsedCommand::Other
        }
        QUIT_COMMAND => ParsedCommand::Quit,
        _ => ParsedCommand::Eval(line),
    }
}
