//! Maps a line of terminal input to the single gesture it represents.

/// One user gesture; each produces at most one outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gesture {
    Send(String),
    Upgrade,
    Background(String),
    Language(String),
    ToggleVoice,
    Health,
    Quit,
}

/// Parse an input line. Unknown `/commands` are sent as plain text.
pub fn parse(line: &str) -> Gesture {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Gesture::Send(trimmed.to_string());
    };
    let (command, arg) = match rest.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim().to_string()),
        None => (rest, String::new()),
    };
    match command.to_ascii_lowercase().as_str() {
        "upgrade" => Gesture::Upgrade,
        "bg" | "background" => Gesture::Background(arg),
        "lang" | "language" => Gesture::Language(arg),
        "voice" => Gesture::ToggleVoice,
        "health" => Gesture::Health,
        "quit" | "exit" => Gesture::Quit,
        _ => Gesture::Send(trimmed.to_string()),
    }
}
