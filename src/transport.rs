//! Session transport adapters
//!
//! Each adapter turns a line-delimited byte stream into `SessionEvent`s: one
//! `Connected` when the stream opens, one `Message` per non-empty line and one
//! `Disconnected` when it ends. The room/WebRTC layer of a real deployment is
//! replaced by whatever writes those lines.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::session::SessionEvent;

/// Longest line accepted as one message, newline included
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Forward every line of `reader` as a message.
///
/// Returns the number of messages forwarded. Stops early if the receiver is
/// gone. Lines longer than `MAX_LINE_BYTES` are dropped.
pub async fn pump_lines<R>(mut reader: R, tx: &mpsc::Sender<SessionEvent>) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    if tx.send(SessionEvent::Connected).await.is_err() {
        return Ok(0);
    }

    let mut forwarded = 0;
    let mut line = Vec::new();
    let result = loop {
        line.clear();
        let read = (&mut reader)
            .take(MAX_LINE_BYTES as u64 + 1)
            .read_until(b'\n', &mut line)
            .await;
        match read {
            Ok(0) => break Ok(forwarded),
            Ok(n) if n > MAX_LINE_BYTES && line.last() != Some(&b'\n') => {
                warn!("Dropping session line longer than {} bytes", MAX_LINE_BYTES);
                if let Err(e) = skip_rest_of_line(&mut reader).await {
                    break Err(e);
                }
            }
            Ok(_) => {
                let payload = trim_line_end(&line);
                if payload.iter().all(u8::is_ascii_whitespace) {
                    continue;
                }
                if tx.send(SessionEvent::Message(payload.to_vec())).await.is_err() {
                    return Ok(forwarded);
                }
                forwarded += 1;
            }
            Err(e) => break Err(e),
        }
    };

    let _ = tx.send(SessionEvent::Disconnected).await;
    result
}

/// Discard input up to and including the next newline.
async fn skip_rest_of_line<R>(reader: &mut R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let buf = reader.fill_buf().await?;
        if buf.is_empty() {
            return Ok(());
        }
        let (used, found) = match buf.iter().position(|&b| b == b'\n') {
            Some(i) => (i + 1, true),
            None => (buf.len(), false),
        };
        reader.consume(used);
        if found {
            return Ok(());
        }
    }
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    while end > 0 && matches!(line[end - 1], b'\n' | b'\r') {
        end -= 1;
    }
    &line[..end]
}

/// Accept session connections on `addr`, one at a time.
pub async fn serve_tcp(addr: &str, tx: mpsc::Sender<SessionEvent>) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening for session messages on {}", listener.local_addr()?);

    loop {
        let (stream, peer) = listener.accept().await?;
        info!("Session connected from {}", peer);
        match pump_lines(BufReader::new(stream), &tx).await {
            Ok(count) => info!("Session from {} closed after {} messages", peer, count),
            Err(e) => warn!("Session from {} failed: {}", peer, e),
        }
        if tx.is_closed() {
            debug!("Dashboard gone; stopping listener");
            return Ok(());
        }
    }
}

/// Read session messages from stdin in the background.
pub fn spawn_stdin(tx: mpsc::Sender<SessionEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let stdin = BufReader::new(tokio::io::stdin());
        if let Err(e) = pump_lines(stdin, &tx).await {
            warn!("Error reading stdin: {}", e);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn collect(input: &'static [u8]) -> (usize, Vec<SessionEvent>) {
        let (tx, mut rx) = mpsc::channel(16);
        let count = pump_lines(input, &tx).await.unwrap();
        drop(tx);
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        (count, events)
    }

    #[tokio::test]
    async fn test_lines_become_messages() {
        let (count, events) = collect(b"{\"a\":1}\r\n\n  \n{\"b\":2}").await;
        assert_eq!(count, 2);
        assert_eq!(
            events,
            vec![
                SessionEvent::Connected,
                SessionEvent::Message(b"{\"a\":1}".to_vec()),
                SessionEvent::Message(b"{\"b\":2}".to_vec()),
                SessionEvent::Disconnected,
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_stream_still_connects() {
        let (count, events) = collect(b"").await;
        assert_eq!(count, 0);
        assert_eq!(events, vec![SessionEvent::Connected, SessionEvent::Disconnected]);
    }

    #[tokio::test]
    async fn test_overlong_line_is_dropped() {
        let mut input = vec![b'a'; 70_000];
        input.extend_from_slice(b"\nok\n");
        let (tx, mut rx) = mpsc::channel(16);
        let count = pump_lines(&input[..], &tx).await.unwrap();
        drop(tx);
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert_eq!(count, 1);
        assert_eq!(
            events,
            vec![
                SessionEvent::Connected,
                SessionEvent::Message(b"ok".to_vec()),
                SessionEvent::Disconnected,
            ]
        );
    }

    #[tokio::test]
    async fn test_line_at_limit_is_kept() {
        let mut input = vec![b'x'; MAX_LINE_BYTES - 1];
        input.push(b'\n');
        let (tx, mut rx) = mpsc::channel(4);
        assert_eq!(pump_lines(&input[..], &tx).await.unwrap(), 1);
        drop(tx);
        assert_eq!(rx.recv().await, Some(SessionEvent::Connected));
        match rx.recv().await {
            Some(SessionEvent::Message(payload)) => assert_eq!(payload.len(), MAX_LINE_BYTES - 1),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_closed_receiver_stops_pump() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        let count = pump_lines(&b"x\ny\n"[..], &tx).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_tcp_session() {
        use tokio::io::AsyncWriteExt;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let (tx, mut rx) = mpsc::channel(16);
        let bind_addr = addr.clone();
        let server = tokio::spawn(async move { serve_tcp(&bind_addr, tx).await });
        let mut stream = loop {
            match tokio::net::TcpStream::connect(&addr).await {
                Ok(stream) => break stream,
                Err(_) => tokio::time::sleep(std::time::Duration::from_millis(10)).await,
            }
        };
        stream.write_all(b"hello\n").await.unwrap();
        stream.shutdown().await.unwrap();
        drop(stream);

        assert_eq!(rx.recv().await, Some(SessionEvent::Connected));
        assert_eq!(rx.recv().await, Some(SessionEvent::Message(b"hello".to_vec())));
        assert_eq!(rx.recv().await, Some(SessionEvent::Disconnected));
        server.abort();
    }
}
