//! How a reply line is interpreted once it has been read

use crate::Command;

/// Selects how a successful reply is turned into an [`Outcome`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseMatch {
    /// Hand the reply line back verbatim
    Raw,
    /// Succeed iff the reply starts with these bytes
    Literal(Vec<u8>),
    /// Succeed iff the reply starts with the command's first character
    CommandPrefix,
}

impl ResponseMatch {
    pub fn literal(bytes: impl Into<Vec<u8>>) -> Self {
        ResponseMatch::Literal(bytes.into())
    }

    /// Apply this interpretation to a reply that was actually received
    pub fn interpret(&self, command: &Command, line: Vec<u8>) -> Outcome {
        match self {
            ResponseMatch::Raw => Outcome::Line(line),
            ResponseMatch::Literal(expected) => Outcome::Matched(line.starts_with(expected)),
            ResponseMatch::CommandPrefix => {
                Outcome::Matched(line.first() == Some(&command.first_byte()))
            }
        }
    }

    /// The value reported when no reply could be obtained at all
    pub fn failure(&self) -> Outcome {
        match self {
            ResponseMatch::Raw => Outcome::NoResponse,
            ResponseMatch::Literal(_) | ResponseMatch::CommandPrefix => Outcome::Matched(false),
        }
    }
}

/// Result of sending one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Reply line, for [`ResponseMatch::Raw`]
    Line(Vec<u8>),
    /// Whether the reply matched, for the boolean interpretations
    Matched(bool),
    /// A raw send got no reply
    NoResponse,
}

impl Outcome {
    /// True for a received raw line or a positive match
    pub fn is_success(&self) -> bool {
        match self {
            Outcome::Line(_) => true,
            Outcome::Matched(matched) => *matched,
            Outcome::NoResponse => false,
        }
    }

    pub fn line(&self) -> Option<&[u8]> {
        match self {
            Outcome::Line(line) => Some(line),
            _ => None,
        }
    }

    pub fn into_line(self) -> Option<Vec<u8>> {
        match self {
            Outcome::Line(line) => Some(line),
            _ => None,
        }
    }
}
