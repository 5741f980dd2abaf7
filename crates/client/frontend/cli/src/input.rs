//! Parsing of typed intents.

/// Commands understood by the prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CliCommand {
    Refresh,
    Enter,
    Select,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  refresh (r)   reload lottery state
  enter   (e)   enter the lottery for 1 ETH
  select  (s)   select a winner (manager only)
  status        show the current state
  help    (h)   show this help
  quit    (q)   exit";

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Option<Result<CliCommand, String>> {
    let word = line.trim();
    if word.is_empty() {
        return None;
    }

    let command = match word.to_ascii_lowercase().as_str() {
        "refresh" | "r" => CliCommand::Refresh,
        "enter" | "e" => CliCommand::Enter,
        "select" | "s" => CliCommand::Select,
        "status" | "show" => CliCommand::Status,
        "help" | "h" | "?" => CliCommand::Help,
        "quit" | "q" | "exit" => CliCommand::Quit,
        _ => return Some(Err(format!("unknown command '{word}', type 'help'"))),
    };
    Some(Ok(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_words_and_shortcuts() {
        assert_eq!(parse_command(" ENTER "), Some(Ok(CliCommand::Enter)));
        assert_eq!(parse_command("s"), Some(Ok(CliCommand::Select)));
        assert_eq!(parse_command("exit"), Some(Ok(CliCommand::Quit)));
        assert_eq!(parse_command("   "), None);
        assert!(matches!(parse_command("dance"), Some(Err(_))));
    }
}
