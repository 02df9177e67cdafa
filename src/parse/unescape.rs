use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnescapeError {
    #[error("unexpected EOF while looking for matching `{quote}'")]
    UnterminatedQuote { quote: char, index: usize },
    #[error("dangling escape at {index}")]
    DanglingEscape { index: usize },
}

/// Resolves the quoting of a single shell word.
///
/// Single quotes are literal. Inside double quotes only `\"`, `\\`, `` \` `` and
/// `\$` are escapes; any other backslash is kept. Outside quotes a backslash
/// escapes the next character. Adjacent quoted and bare segments concatenate.
pub fn unescape(word: &str) -> Result<String, UnescapeError> {
    let mut res = String::with_capacity(word.len());
    let mut quote = None::<(char, usize)>;

    let mut chars = word.char_indices();

    while let Some((idx, c)) = chars.next() {
        match (quote, c) {
            (Some(('\'', _)), '\'') | (Some(('"', _)), '"') => quote = None,
            (Some(('\'', _)), _) => res.push(c),
            (Some(('"', _)), '\\') => match chars.next() {
                Some((_, escaped @ ('"' | '\\' | '`' | '$'))) => res.push(escaped),
                Some((_, other)) => {
                    res.push('\\');
                    res.push(other);
                }
                None => return Err(UnescapeError::DanglingEscape { index: idx }),
            },
            (None, '\'' | '"') => quote = Some((c, idx)),
            (None, '\\') => match chars.next() {
                Some((_, escaped)) => res.push(escaped),
                None => return Err(UnescapeError::DanglingEscape { index: idx }),
            },
            _ => res.push(c),
        }
    }

    match quote {
        Some((quote, index)) => Err(UnescapeError::UnterminatedQuote { quote, index }),
        None => Ok(res),
    }
}
