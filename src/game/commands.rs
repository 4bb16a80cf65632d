//! Slash-command recognition for chat text.
//!
//! Only `/vote <target>` is a real command. Everything else starting with a
//! slash is deliberately not distinguishable from an unavailable command:
//! the dispatcher drops it without any observable effect.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Vote { target: String },
}

/// Matches `/vote <target>`, case-insensitively and tolerant of extra
/// whitespace around the slash, the keyword and the target. Returns `None`
/// for anything that is not a well-formed vote.
pub fn parse_slash_command(text: &str) -> Option<SlashCommand> {
    let rest = text.trim().strip_prefix('/')?;
    let rest = rest.trim_start();

    let (keyword, target) = match rest.split_once(char::is_whitespace) {
        Some((keyword, target)) => (keyword, target.trim()),
        None => (rest, ""),
    };

    if !keyword.eq_ignore_ascii_case("vote") || target.is_empty() {
        return None;
    }

    Some(SlashCommand::Vote {
        target: target.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(target: &str) -> Option<SlashCommand> {
        Some(SlashCommand::Vote {
            target: target.to_string(),
        })
    }

    #[test]
    fn recognizes_plain_votes() {
        assert_eq!(parse_slash_command("/vote Alice"), vote("Alice"));
        assert_eq!(parse_slash_command("/VOTE alice"), vote("alice"));
        assert_eq!(parse_slash_command("/VoTe Bob"), vote("Bob"));
    }

    #[test]
    fn tolerates_extra_whitespace_everywhere() {
        assert_eq!(parse_slash_command("  /vote Alice  "), vote("Alice"));
        assert_eq!(parse_slash_command("/   vote   Alice"), vote("Alice"));
        assert_eq!(parse_slash_command(" /  VOTE \t Bob "), vote("Bob"));
    }

    #[test]
    fn keeps_interior_spaces_in_the_target() {
        assert_eq!(parse_slash_command("/vote Old MacDonald"), vote("Old MacDonald"));
    }

    #[test]
    fn rejects_everything_else() {
        assert_eq!(parse_slash_command("/vote"), None);
        assert_eq!(parse_slash_command("/vote   "), None);
        assert_eq!(parse_slash_command("/votealice"), None);
        assert_eq!(parse_slash_command("/kick Bob"), None);
        assert_eq!(parse_slash_command("/"), None);
        assert_eq!(parse_slash_command("hello"), None);
    }
}
