//! Command line parsing
//!
//! A request is one line of text: a case-insensitive verb, optionally followed
//! by a single space and a raw argument string. [`Request::parse`] does the
//! split, [`Command::try_from`] turns it into a typed command or the
//! [`CommandError`] that will be reported back to the client.

use crate::node::Point;
use crate::response::CommandError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default tap duration in milliseconds
pub const DEFAULT_TAP_DURATION_MS: u64 = 80;

/// Default swipe duration in milliseconds
pub const DEFAULT_SWIPE_DURATION_MS: u64 = 300;

/// Timeout used by the wait verbs when the timeout token is not a number
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5000;

pub const SET_TEXT_ID_USAGE: &str = "usage: SET_TEXT_ID <view_id> <text>";
pub const SWIPE_USAGE: &str = "usage: SWIPE x1 y1 x2 y2 [durationMs]";
pub const WAIT_TEXT_USAGE: &str = "usage: WAIT_TEXT <text> <timeoutMs>";
pub const WAIT_ID_USAGE: &str = "usage: WAIT_ID <view_id> <timeoutMs>";

/// A request line split into verb and argument string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Upper-cased verb
    pub verb: String,
    /// Everything after the first space, verbatim
    pub args: String,
}

impl Request {
    /// Split a raw line into verb and arguments.
    ///
    /// Surrounding whitespace (including the line terminator) is trimmed
    /// first; the argument string itself is passed through untouched so that
    /// free text keeps its inner spacing.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let (verb, args) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
        Self {
            verb: verb.to_uppercase(),
            args: args.to_string(),
        }
    }
}

/// System-level navigation actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GlobalAction {
    Back,
    Home,
    Recents,
    Notifications,
    QuickSettings,
}

impl GlobalAction {
    pub const ALL: [GlobalAction; 5] = [
        GlobalAction::Back,
        GlobalAction::Home,
        GlobalAction::Recents,
        GlobalAction::Notifications,
        GlobalAction::QuickSettings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GlobalAction::Back => "BACK",
            GlobalAction::Home => "HOME",
            GlobalAction::Recents => "RECENTS",
            GlobalAction::Notifications => "NOTIFICATIONS",
            GlobalAction::QuickSettings => "QUICK_SETTINGS",
        }
    }
}

impl fmt::Display for GlobalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GlobalAction {
    type Err = CommandError;

    /// Case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        GlobalAction::ALL
            .into_iter()
            .find(|action| action.as_str() == upper)
            .ok_or(CommandError::UnknownGlobalAction)
    }
}

/// A fully parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serialize the whole current snapshot
    Dump,
    /// Find the first node whose text or description contains the query
    FindText(String),
    /// Tap the center of the first node matched by text
    ClickText(String),
    /// Find the first node with exactly this view identifier
    FindId(String),
    /// Tap the center of the first node matched by identifier
    ClickId(String),
    /// Replace the text of the node with this identifier
    SetTextId { id: String, text: String },
    /// Perform a system navigation action
    Global(GlobalAction),
    /// Two-point stroke
    Swipe {
        from: Point,
        to: Point,
        duration_ms: u64,
    },
    /// Poll until a node matches the text query or the timeout elapses
    WaitText { text: String, timeout_ms: u64 },
    /// Poll until a node has the identifier or the timeout elapses
    WaitId { id: String, timeout_ms: u64 },
}

impl Command {
    /// The wire verb for this command
    pub fn verb(&self) -> &'static str {
        match self {
            Command::Dump => "DUMP",
            Command::FindText(_) => "FIND_TEXT",
            Command::ClickText(_) => "CLICK_TEXT",
            Command::FindId(_) => "FIND_ID",
            Command::ClickId(_) => "CLICK_ID",
            Command::SetTextId { .. } => "SET_TEXT_ID",
            Command::Global(_) => "GLOBAL",
            Command::Swipe { .. } => "SWIPE",
            Command::WaitText { .. } => "WAIT_TEXT",
            Command::WaitId { .. } => "WAIT_ID",
        }
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        Command::try_from(&Request::parse(line))
    }
}

impl TryFrom<&Request> for Command {
    type Error = CommandError;

    fn try_from(request: &Request) -> Result<Self, Self::Error> {
        let args = request.args.as_str();
        match request.verb.as_str() {
            "DUMP" => Ok(Command::Dump),
            "FIND_TEXT" => Ok(Command::FindText(args.to_string())),
            "CLICK_TEXT" => Ok(Command::ClickText(args.to_string())),
            "FIND_ID" => Ok(Command::FindId(args.to_string())),
            "CLICK_ID" => Ok(Command::ClickId(args.to_string())),
            "SET_TEXT_ID" => parse_set_text(args),
            "GLOBAL" => Ok(Command::Global(args.parse()?)),
            "SWIPE" => parse_swipe(args),
            "WAIT_TEXT" => {
                let (text, timeout_ms) = parse_wait(args, WAIT_TEXT_USAGE)?;
                Ok(Command::WaitText { text, timeout_ms })
            }
            "WAIT_ID" => {
                let (id, timeout_ms) = parse_wait(args, WAIT_ID_USAGE)?;
                Ok(Command::WaitId { id, timeout_ms })
            }
            _ => Err(CommandError::UnknownCommand),
        }
    }
}

fn parse_set_text(args: &str) -> Result<Command, CommandError> {
    match args.split_once(' ') {
        Some((id, text)) if !id.is_empty() => Ok(Command::SetTextId {
            id: id.to_string(),
            text: text.to_string(),
        }),
        _ => Err(CommandError::Usage(SET_TEXT_ID_USAGE)),
    }
}

fn parse_swipe(args: &str) -> Result<Command, CommandError> {
    let tokens: Vec<&str> = args.split(' ').filter(|t| !t.trim().is_empty()).collect();
    if tokens.len() < 4 {
        return Err(CommandError::Usage(SWIPE_USAGE));
    }

    let coord = |token: &str| {
        token
            .parse::<i32>()
            .map_err(|_| CommandError::InvalidArguments)
    };
    let from = Point::new(coord(tokens[0])?, coord(tokens[1])?);
    let to = Point::new(coord(tokens[2])?, coord(tokens[3])?);

    let duration_ms = match tokens.get(4) {
        Some(token) => token
            .parse::<u64>()
            .map_err(|_| CommandError::InvalidArguments)?,
        None => DEFAULT_SWIPE_DURATION_MS,
    };
    // A stroke must last at least one millisecond
    if duration_ms == 0 {
        return Err(CommandError::InvalidArguments);
    }

    Ok(Command::Swipe {
        from,
        to,
        duration_ms,
    })
}

/// Split `<query> <timeoutMs>` at the last space.
fn parse_wait(args: &str, usage: &'static str) -> Result<(String, u64), CommandError> {
    let (query, timeout) = args.rsplit_once(' ').ok_or(CommandError::Usage(usage))?;
    let timeout_ms = timeout.parse().unwrap_or(DEFAULT_WAIT_TIMEOUT_MS);
    Ok((query.to_string(), timeout_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_split() {
        let req = Request::parse("set_text_id pkg:id/name hello   world\n");
        assert_eq!(req.verb, "SET_TEXT_ID");
        assert_eq!(req.args, "pkg:id/name hello   world");

        let req = Request::parse("  dump  ");
        assert_eq!(req.verb, "DUMP");
        assert_eq!(req.args, "");
    }

    #[test]
    fn test_verb_case_insensitive() {
        assert_eq!("dump".parse::<Command>(), Ok(Command::Dump));
        assert_eq!(
            "Find_Text Sign in".parse::<Command>(),
            Ok(Command::FindText("Sign in".into()))
        );
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(
            "TAP 1 2".parse::<Command>(),
            Err(CommandError::UnknownCommand)
        );
        assert_eq!("".parse::<Command>(), Err(CommandError::UnknownCommand));
    }

    #[test]
    fn test_find_without_argument_is_empty_query() {
        assert_eq!(
            "FIND_TEXT".parse::<Command>(),
            Ok(Command::FindText(String::new()))
        );
    }

    #[test]
    fn test_set_text() {
        assert_eq!(
            "SET_TEXT_ID pkg:id/user John Smith".parse::<Command>(),
            Ok(Command::SetTextId {
                id: "pkg:id/user".into(),
                text: "John Smith".into()
            })
        );
        assert_eq!(
            "SET_TEXT_ID pkg:id/user".parse::<Command>(),
            Err(CommandError::Usage(SET_TEXT_ID_USAGE))
        );
        // Leading space in the argument means an empty id
        assert_eq!(
            "SET_TEXT_ID  pkg:id/user text".parse::<Command>(),
            Err(CommandError::Usage(SET_TEXT_ID_USAGE))
        );
    }

    #[test]
    fn test_global_actions() {
        assert_eq!(
            "GLOBAL back".parse::<Command>(),
            Ok(Command::Global(GlobalAction::Back))
        );
        assert_eq!(
            "GLOBAL QUICK_SETTINGS".parse::<Command>(),
            Ok(Command::Global(GlobalAction::QuickSettings))
        );
        assert_eq!(
            "GLOBAL FOO".parse::<Command>(),
            Err(CommandError::UnknownGlobalAction)
        );
        assert_eq!(
            "GLOBAL".parse::<Command>(),
            Err(CommandError::UnknownGlobalAction)
        );
        for action in GlobalAction::ALL {
            assert_eq!(action.as_str().parse::<GlobalAction>(), Ok(action));
        }
    }

    #[test]
    fn test_swipe_default_duration() {
        assert_eq!(
            "SWIPE 10 10 90 90".parse::<Command>(),
            Ok(Command::Swipe {
                from: Point::new(10, 10),
                to: Point::new(90, 90),
                duration_ms: 300
            })
        );
    }

    #[test]
    fn test_swipe_explicit_duration_and_extra_spaces() {
        assert_eq!(
            "SWIPE  0 1000   0 200 450 extra".parse::<Command>(),
            Ok(Command::Swipe {
                from: Point::new(0, 1000),
                to: Point::new(0, 200),
                duration_ms: 450
            })
        );
    }

    #[test]
    fn test_swipe_errors() {
        assert_eq!(
            "SWIPE 1 2 3".parse::<Command>(),
            Err(CommandError::Usage(SWIPE_USAGE))
        );
        assert_eq!(
            "SWIPE 1 2 three 4".parse::<Command>(),
            Err(CommandError::InvalidArguments)
        );
        assert_eq!(
            "SWIPE 1 2 3 4 -5".parse::<Command>(),
            Err(CommandError::InvalidArguments)
        );
        assert_eq!(
            "SWIPE 1 2 3 4 0".parse::<Command>(),
            Err(CommandError::InvalidArguments)
        );
    }

    #[test]
    fn test_wait_parsing() {
        assert_eq!(
            "WAIT_TEXT Login 1000".parse::<Command>(),
            Ok(Command::WaitText {
                text: "Login".into(),
                timeout_ms: 1000
            })
        );
        assert_eq!(
            "WAIT_TEXT Sign in now 250".parse::<Command>(),
            Ok(Command::WaitText {
                text: "Sign in now".into(),
                timeout_ms: 250
            })
        );
        assert_eq!(
            "WAIT_ID pkg:id/done soon".parse::<Command>(),
            Ok(Command::WaitId {
                id: "pkg:id/done".into(),
                timeout_ms: DEFAULT_WAIT_TIMEOUT_MS
            })
        );
        assert_eq!(
            "WAIT_TEXT Login".parse::<Command>(),
            Err(CommandError::Usage(WAIT_TEXT_USAGE))
        );
        assert_eq!(
            "WAIT_ID".parse::<Command>(),
            Err(CommandError::Usage(WAIT_ID_USAGE))
        );
    }

    #[test]
    fn test_verb_names() {
        assert_eq!(Command::Dump.verb(), "DUMP");
        assert_eq!(Command::Global(GlobalAction::Home).verb(), "GLOBAL");
    }
}
