//! Slash command parsing

/// A parsed REPL line that starts with `/`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashCommand<'a> {
    Add(&'a str),
    Priority(Option<&'a str>),
    Done(&'a str),
    Remove(&'a str),
    List,
    Key(&'a str),
    Open,
    Close,
    Status,
    Help,
    Quit,
    Unknown(&'a str),
}

impl<'a> SlashCommand<'a> {
    /// Parse a line; the command word is matched exactly, the rest is trimmed
    pub fn parse(input: &'a str) -> Self {
        let input = input.trim();
        let (cmd, rest) = input.split_once(char::is_whitespace).unwrap_or((input, ""));
        let rest = rest.trim();

        match cmd {
            "/add" | "/a" => Self::Add(rest),
            "/priority" | "/p" => Self::Priority(if rest.is_empty() { None } else { Some(rest) }),
            "/done" | "/d" => Self::Done(rest),
            "/rm" | "/delete" => Self::Remove(rest),
            "/list" | "/ls" => Self::List,
            "/key" => Self::Key(rest),
            "/open" => Self::Open,
            "/close" => Self::Close,
            "/status" => Self::Status,
            "/help" | "/h" => Self::Help,
            "/quit" | "/q" | "/exit" => Self::Quit,
            other => Self::Unknown(other),
        }
    }
}

/// Whether a line may be stored in the readline history
pub fn keep_in_history(line: &str) -> bool {
    !matches!(SlashCommand::parse(line), SlashCommand::Key(_))
}
