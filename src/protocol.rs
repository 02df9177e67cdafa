use serde::{Deserialize, Serialize};

use crate::{history::HistoryEntry, prelude::*};

/// One line of input on the request channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Request {
    Execute {
        command: String,
    },
    History,
    ClearHistory,
    Suggestions {
        #[serde(default)]
        partial: String,
    },
}

impl Request {
    pub fn decode(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Response {
    Execute(ExecutionResult),
    History { history: Vec<HistoryEntry> },
    Cleared { success: bool },
    Suggestions { suggestions: Vec<&'static str> },
    Invalid { error: String },
}

impl Response {
    pub fn invalid(reason: impl std::fmt::Display) -> Self {
        Self::Invalid {
            error: format!("invalid request: {reason}"),
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

pub async fn handle(interpreter: &Interpreter, session: &mut Session, request: Request) -> Response {
    match request {
        Request::Execute { command } => {
            Response::Execute(interpreter.execute(session, &command).await)
        }
        Request::History => Response::History {
            history: interpreter.history(),
        },
        Request::ClearHistory => {
            interpreter.clear_history();
            Response::Cleared { success: true }
        }
        Request::Suggestions { partial } => Response::Suggestions {
            suggestions: interpreter.suggest(&partial),
        },
    }
}
