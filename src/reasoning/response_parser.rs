//! Parsing of the `REASONING:` / `ANSWER:` reply format requested by the prompts.

/// What the `ANSWER:` line of a reply said
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParsedAnswer {
    /// A choice index
    Index(usize),
    /// An explicit `null`: the model is not confident
    Null,
    /// No `ANSWER:` line at all
    #[default]
    Missing,
    /// An `ANSWER:` line that is neither an index nor `null`
    Invalid(String),
}

/// Reasoning text and answer extracted from a model reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedReply {
    pub reasoning: String,
    pub answer: ParsedAnswer,
}

impl ParsedReply {
    /// Confident answer, `None` for an explicit `null`.
    ///
    /// A missing or unreadable answer is an error carrying a description.
    pub fn confident_answer(&self) -> Result<Option<usize>, String> {
        match &self.answer {
            ParsedAnswer::Index(index) => Ok(Some(*index)),
            ParsedAnswer::Null => Ok(None),
            ParsedAnswer::Missing => Err("reply has no ANSWER line".to_string()),
            ParsedAnswer::Invalid(text) => Err(format!("unparseable answer '{}'", text)),
        }
    }
}

const REASONING_TAG: &str = "REASONING:";
const ANSWER_TAG: &str = "ANSWER:";

/// Extracts the tagged lines of `output`; the last occurrence of a tag wins.
///
/// Range checks against the choice list happen in the search state.
pub fn parse_reply(output: &str) -> ParsedReply {
    let mut parsed = ParsedReply::default();

    for line in output.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix(REASONING_TAG) {
            parsed.reasoning = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix(ANSWER_TAG) {
            parsed.answer = parse_answer(rest);
        }
    }

    parsed
}

fn parse_answer(text: &str) -> ParsedAnswer {
    let text = text.trim();
    if text.eq_ignore_ascii_case("null") {
        return ParsedAnswer::Null;
    }
    match text.parse::<usize>() {
        Ok(index) => ParsedAnswer::Index(index),
        Err(_) => ParsedAnswer::Invalid(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_well_formed_reply() {
        let reply = "REASONING: The options given are 0: 3, 1: 4, 2: 5.\nANSWER: 1";
        let parsed = parse_reply(reply);
        assert_eq!(parsed.reasoning, "The options given are 0: 3, 1: 4, 2: 5.");
        assert_eq!(parsed.answer, ParsedAnswer::Index(1));
        assert_eq!(parsed.confident_answer(), Ok(Some(1)));
    }

    #[test]
    fn test_null_is_not_garbage() {
        let unsure = parse_reply("REASONING: unsure\nANSWER: null");
        assert_eq!(unsure.answer, ParsedAnswer::Null);
        assert_eq!(unsure.confident_answer(), Ok(None));
        assert_eq!(parse_reply("ANSWER: NULL").answer, ParsedAnswer::Null);

        let garbage = parse_reply("ANSWER: option B");
        assert_eq!(garbage.answer, ParsedAnswer::Invalid("option B".to_string()));
        assert_matches!(garbage.confident_answer(), Err(msg) if msg.contains("option B"));
        assert_eq!(
            parse_reply("ANSWER: -1").answer,
            ParsedAnswer::Invalid("-1".to_string())
        );
    }

    #[test]
    fn test_indented_lines_and_last_tag_wins() {
        let reply =
            "Sure!\n  REASONING: first pass\n  ANSWER: 0\nREASONING: second pass\n ANSWER: 2 ";
        let parsed = parse_reply(reply);
        assert_eq!(parsed.reasoning, "second pass");
        assert_eq!(parsed.answer, ParsedAnswer::Index(2));
    }

    #[test]
    fn test_untagged_reply() {
        let parsed = parse_reply("I think it is 4.");
        assert_eq!(parsed, ParsedReply::default());
        assert_eq!(parsed.answer, ParsedAnswer::Missing);
        assert!(parsed.confident_answer().is_err());
    }
}
