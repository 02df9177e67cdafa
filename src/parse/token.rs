use logos::{Lexer, Logos};
use thiserror::Error;

use super::unescape::{unescape, UnescapeError};

#[derive(Debug, Clone, PartialEq, Default, Error)]
pub enum LexerError {
    #[default]
    #[error("unexpected character")]
    UnexpectedCharacter,
    #[error(transparent)]
    Unescape(#[from] UnescapeError),
}

#[derive(Debug, Clone, PartialEq, Eq, Logos)]
#[logos(skip r"[ \t\r\n\f]+", error = LexerError)]
pub enum Token {
    #[token("|")]
    Pipe,
    #[token(">")]
    Write,

    // a word is any run of bare characters, escapes and complete quoted segments
    #[regex(r#"([^ \t\r\n\f|>'"\\]|\\(.|\n)|'[^']*'|"([^"\\]|\\(.|\n))*")+"#, word_callback)]
    Word(String),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pipe => f.write_str("|"),
            Self::Write => f.write_str(">"),
            Self::Word(word) => f.write_str(word),
        }
    }
}

fn word_callback(lex: &mut Lexer<Token>) -> Result<String, LexerError> {
    Ok(unescape(lex.slice())?)
}
