use std::ops::Range;

use logos::Logos;
use thiserror::Error;

use crate::cmd::execution_plan::ExecutionPlan;

use self::token::{LexerError, Token};

pub mod token;
pub mod unescape;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unexpected EOF while looking for matching `{quote}'")]
    UnterminatedQuote { quote: char, offset: usize },
    #[error("unexpected end of line after `\\'")]
    DanglingEscape { offset: usize },
    #[error("unexpected character {character:?} at column {}", .offset + 1)]
    UnexpectedCharacter { character: char, offset: usize },
    #[error("syntax error: empty command in pipeline")]
    EmptyStage,
    #[error("syntax error: missing file name after `>'")]
    MissingRedirectTarget,
    #[error("syntax error near unexpected token `{token}'")]
    UnexpectedToken { token: String, offset: usize },
    #[error("{command}: missing operand")]
    MissingOperand { command: &'static str },
}

/// A token and the byte range it was lexed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Range<usize>,
}

pub fn tokenize(line: &str) -> Result<Vec<Spanned<Token>>, ParseError> {
    let mut tokens = Vec::new();

    for (res, span) in Token::lexer(line).spanned() {
        match res {
            Ok(value) => tokens.push(Spanned { value, span }),
            Err(err) => return Err(lexer_error(line, span, err)),
        }
    }

    Ok(tokens)
}

fn lexer_error(line: &str, span: Range<usize>, err: LexerError) -> ParseError {
    use self::unescape::UnescapeError;

    match err {
        LexerError::Unescape(UnescapeError::UnterminatedQuote { quote, index }) => {
            ParseError::UnterminatedQuote {
                quote,
                offset: span.start + index,
            }
        }
        LexerError::Unescape(UnescapeError::DanglingEscape { index }) => {
            ParseError::DanglingEscape {
                offset: span.start + index,
            }
        }
        // the word pattern refused an unbalanced quote or a trailing backslash
        // somewhere from here on; rescan the rest of the line to find which
        LexerError::UnexpectedCharacter => {
            let rest = &line[span.start..];
            match unescape::unescape(rest) {
                Err(err) => lexer_error(line, span.start..line.len(), err.into()),
                Ok(_) => match rest.chars().next() {
                    Some(character) => ParseError::UnexpectedCharacter {
                        character,
                        offset: span.start,
                    },
                    None => ParseError::Empty,
                },
            }
        }
    }
}

pub fn parse_command(cmd: &str) -> Result<ExecutionPlan, ParseError> {
    let tokens = tokenize(cmd)?;

    trace!(?tokens, "tokenized command");

    ExecutionPlan::from_tokens(tokens)
}
