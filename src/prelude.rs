pub use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver as Receiver};

pub use crate::{
    cmd::{ExecutionResult, Interpreter},
    config::Config,
    error::ShellError,
    state::Session,
};
