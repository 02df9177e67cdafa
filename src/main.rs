use color_eyre::Result;
use termsim::{
    input::{self, InputMessage},
    prelude::*,
    protocol::{self, Response},
};
use tokio::io::AsyncWriteExt;
use tracing_subscriber::prelude::*;

#[macro_use]
extern crate tracing;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    let (writer, _guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        &config.log.directory,
        &config.log.file,
    ));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_error::ErrorLayer::default())
        .init();

    color_eyre::install()?;

    let mut session = Session::from_current_dir()?;
    trace!(cwd = ?session.working_dir(), ?config, "starting interpreter");

    let interpreter = Interpreter::new(config);

    trace!("spawning input task");
    let mut rx = input::spawn_input_task(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();

    while let Some(msg) = rx.recv().await {
        let response = match msg {
            InputMessage::Request(request) => {
                protocol::handle(&interpreter, &mut session, request).await
            }
            InputMessage::Invalid(reason) => {
                warn!(%reason, "rejecting request");
                Response::invalid(reason)
            }
            InputMessage::Error(err) => {
                error!("failed to read input: {err}");
                break;
            }
        };

        let mut line = response.encode()?;
        line.push('\n');
        stdout.write_all(line.as_bytes()).await?;
        stdout.flush().await?;
    }

    trace!("input closed, exiting");

    Ok(())
}
