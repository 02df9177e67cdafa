use std::{fmt, str::FromStr};

use itertools::Itertools;

use crate::parse::{parse_command, token::Token, ParseError, Spanned};

/// One command in a pipeline: the program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub program: String,
    pub args: Vec<String>,
}

impl Stage {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn from_words(words: Vec<String>) -> Result<Self, ParseError> {
        let mut words = words.into_iter();
        let program = words.next().ok_or(ParseError::EmptyStage)?;

        Ok(Self {
            program,
            args: words.collect(),
        })
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionShape {
    Plain,
    Piped,
    Redirected,
    PipedRedirected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionPlan {
    Execute(Stage),
    /// Two or more stages, each feeding its stdout to the next.
    Pipe(Vec<Stage>),
    Redirect {
        source: Box<ExecutionPlan>,
        target: String,
    },
}

impl ExecutionPlan {
    pub fn shape(&self) -> ExecutionShape {
        match self {
            Self::Execute(_) => ExecutionShape::Plain,
            Self::Pipe(_) => ExecutionShape::Piped,
            Self::Redirect { source, .. } => match source.shape() {
                ExecutionShape::Piped => ExecutionShape::PipedRedirected,
                _ => ExecutionShape::Redirected,
            },
        }
    }

    pub fn stages(&self) -> &[Stage] {
        match self {
            Self::Execute(stage) => std::slice::from_ref(stage),
            Self::Pipe(stages) => stages,
            Self::Redirect { source, .. } => source.stages(),
        }
    }

    pub fn from_tokens(tokens: Vec<Spanned<Token>>) -> Result<Self, ParseError> {
        if tokens.is_empty() {
            return Err(ParseError::Empty);
        }

        let mut stages = Vec::new();
        let mut current = Vec::new();
        let mut target = None::<String>;

        let mut tokens = tokens.into_iter();

        while let Some(Spanned { value, span }) = tokens.next() {
            if target.is_some() {
                // nothing may follow the redirect target
                return Err(ParseError::UnexpectedToken {
                    token: value.to_string(),
                    offset: span.start,
                });
            }

            match value {
                Token::Word(word) => current.push(word),
                Token::Pipe => stages.push(Stage::from_words(std::mem::take(&mut current))?),
                Token::Write => {
                    if current.is_empty() {
                        return Err(ParseError::UnexpectedToken {
                            token: value.to_string(),
                            offset: span.start,
                        });
                    }

                    match tokens.next() {
                        Some(Spanned {
                            value: Token::Word(word),
                            ..
                        }) => target = Some(word),
                        Some(Spanned { value, span }) => {
                            return Err(ParseError::UnexpectedToken {
                                token: value.to_string(),
                                offset: span.start,
                            })
                        }
                        None => return Err(ParseError::MissingRedirectTarget),
                    }
                }
            }
        }

        stages.push(Stage::from_words(current)?);

        let plan = if stages.len() == 1 {
            Self::Execute(stages.remove(0))
        } else {
            Self::Pipe(stages)
        };

        Ok(match target {
            Some(target) => Self::Redirect {
                source: Box::new(plan),
                target,
            },
            None => plan,
        })
    }
}

impl FromStr for ExecutionPlan {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_command(s)
    }
}

impl fmt::Display for ExecutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Execute(stage) => write!(f, "{stage}"),
            Self::Pipe(stages) => write!(f, "{}", stages.iter().join(" | ")),
            Self::Redirect { source, target } => write!(f, "{source} > {target}"),
        }
    }
}
