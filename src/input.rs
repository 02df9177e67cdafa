use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::{prelude::*, protocol::Request};

#[derive(Debug)]
pub enum InputMessage {
    Request(Request),
    Invalid(String),
    Error(String),
}

pub type InputReceiver = Receiver<InputMessage>;

/// Reads newline-delimited requests from `reader` until EOF. Blank lines are
/// ignored, and a line that is not UTF-8 is reported as invalid rather than
/// ending the stream. The channel closes when the reader does.
pub fn spawn_input_task<R>(reader: R) -> InputReceiver
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (sender, receiver) = unbounded_channel();

    tokio::task::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();

        loop {
            buf.clear();

            let msg = match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => match decode_line(&buf) {
                    Some(msg) => msg,
                    None => continue,
                },
                Err(err) => InputMessage::Error(err.to_string()),
            };

            let fatal = matches!(msg, InputMessage::Error(_));
            if sender.send(msg).is_err() || fatal {
                break;
            }
        }

        trace!("input task finished");
    });

    receiver
}

fn decode_line(raw: &[u8]) -> Option<InputMessage> {
    let line = match std::str::from_utf8(raw) {
        Ok(line) => line,
        Err(err) => return Some(InputMessage::Invalid(err.to_string())),
    };

    if line.trim().is_empty() {
        return None;
    }

    Some(match Request::decode(line.trim_end_matches(['\r', '\n'])) {
        Ok(request) => InputMessage::Request(request),
        Err(err) => InputMessage::Invalid(err.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn decodes_lines_and_skips_blanks() {
        let input: &[u8] = b"{\"op\":\"history\"}\n\n   \nnonsense\n";
        let mut rx = spawn_input_task(input);

        assert!(matches!(
            rx.recv().await,
            Some(InputMessage::Request(Request::History))
        ));
        assert!(matches!(rx.recv().await, Some(InputMessage::Invalid(_))));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn non_utf8_line_is_invalid_and_reading_continues() {
        let input: &[u8] = b"\xff\xfe\n{\"op\":\"history\"}\n";
        let mut rx = spawn_input_task(input);

        assert!(matches!(rx.recv().await, Some(InputMessage::Invalid(_))));
        assert!(matches!(
            rx.recv().await,
            Some(InputMessage::Request(Request::History))
        ));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn last_line_without_newline_is_read() {
        let input: &[u8] = b"{\"op\":\"clear-history\"}";
        let mut rx = spawn_input_task(input);

        assert!(matches!(
            rx.recv().await,
            Some(InputMessage::Request(Request::ClearHistory))
        ));
        assert!(rx.recv().await.is_none());
    }
}
