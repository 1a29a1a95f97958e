// src/exec/framed_reader.rs

//! Turns one shell output stream into discrete messages.
//!
//! The session appends a sentinel line to every command it submits, so the
//! end of "this command's output on this stream" is the point where the
//! accumulated bytes (ignoring trailing whitespace) end with the sentinel.
//! Each completed message is pushed onto a single-slot queue; the reader
//! stalls until the previous message has been taken.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::types::StreamKind;

/// Initial size of the accumulation buffer. It doubles whenever it fills up.
pub const INITIAL_BUFFER_SIZE: usize = 4 * 1024;

/// Background reader for a single output stream.
pub struct FramedReader<R> {
    stream: R,
    kind: StreamKind,
    sentinel: &'static str,
    buffer: Vec<u8>,
    filled: usize,
    tx: mpsc::Sender<String>,
    cancel: CancellationToken,
}

impl<R> FramedReader<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    pub fn new(
        stream: R,
        kind: StreamKind,
        sentinel: &'static str,
        tx: mpsc::Sender<String>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            stream,
            kind,
            sentinel,
            buffer: vec![0; INITIAL_BUFFER_SIZE],
            filled: 0,
            tx,
            cancel,
        }
    }

    /// Spawn the reader loop on the Tokio runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Read until cancellation, EOF, a read error, or the consumer going away.
    ///
    /// Bytes of an unfinished message are dropped when the loop ends.
    pub async fn run(mut self) {
        debug!(stream = %self.kind, "framed reader started");

        loop {
            if self.filled == self.buffer.len() {
                self.grow();
            }

            let read = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                res = self.stream.read(&mut self.buffer[self.filled..]) => res,
            };

            match read {
                Ok(0) => {
                    debug!(stream = %self.kind, "stream closed");
                    break;
                }
                Ok(n) => {
                    self.filled += n;
                    trace!(stream = %self.kind, bytes = n, buffered = self.filled, "read chunk");
                }
                Err(err) => {
                    debug!(stream = %self.kind, error = %err, "stream read failed; treating as closed");
                    break;
                }
            }

            let Some(message) = complete_message(&self.buffer[..self.filled], self.sentinel)
            else {
                continue;
            };
            let message = String::from_utf8_lossy(message).into_owned();
            self.filled = 0;

            let delivered = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => false,
                sent = self.tx.send(message) => sent.is_ok(),
            };
            if !delivered {
                break;
            }
        }

        if self.filled > 0 {
            debug!(
                stream = %self.kind,
                bytes = self.filled,
                "discarding unfinished message"
            );
        }
        debug!(stream = %self.kind, "framed reader stopped");
    }

    fn grow(&mut self) {
        let new_len = (self.buffer.len() * 2).max(INITIAL_BUFFER_SIZE);
        trace!(stream = %self.kind, from = self.buffer.len(), to = new_len, "growing buffer");
        self.buffer.resize(new_len, 0);
    }
}

/// Start a framed reader for `stream` and return the receiving end of its
/// single-slot delivery queue.
pub fn spawn_framed_reader<R>(
    stream: R,
    kind: StreamKind,
    sentinel: &'static str,
    cancel: CancellationToken,
) -> (mpsc::Receiver<String>, JoinHandle<()>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<String>(1);
    let handle = FramedReader::new(stream, kind, sentinel, tx, cancel).spawn();
    (rx, handle)
}

/// If `buffered` (minus trailing whitespace) ends with `sentinel`, return
/// the message in front of it without the line break that precedes it.
pub fn complete_message<'a>(buffered: &'a [u8], sentinel: &str) -> Option<&'a [u8]> {
    let end = buffered
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    let body = buffered[..end].strip_suffix(sentinel.as_bytes())?;
    Some(body.strip_suffix(b"\n").unwrap_or(body))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::AsyncWriteExt;

    use super::*;

    const SENTINEL: &str = "test.finish";

    #[test]
    fn complete_message_strips_sentinel_and_line_break() {
        assert_eq!(
            complete_message(b"hello\nworld\ntest.finish\n", SENTINEL),
            Some(&b"hello\nworld"[..])
        );
        assert_eq!(complete_message(b"test.finish  \n", SENTINEL), Some(&b""[..]));
        assert_eq!(complete_message(b"\ntest.finish", SENTINEL), Some(&b""[..]));
    }

    #[test]
    fn complete_message_waits_for_sentinel() {
        assert_eq!(complete_message(b"", SENTINEL), None);
        assert_eq!(complete_message(b"hello\n", SENTINEL), None);
        assert_eq!(complete_message(b"hello\ntest.fin", SENTINEL), None);
        assert_eq!(complete_message(b"test.finish\nmore", SENTINEL), None);
    }

    #[tokio::test]
    async fn delivers_messages_split_across_reads() {
        let (mut writer, reader) = tokio::io::duplex(64);
        let cancel = CancellationToken::new();
        let (mut rx, handle) =
            spawn_framed_reader(reader, StreamKind::Stdout, SENTINEL, cancel.clone());

        writer.write_all(b"first\ntest.").await.unwrap();
        writer.flush().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        writer.write_all(b"finish\n").await.unwrap();
        assert_eq!(rx.recv().await.as_deref(), Some("first"));

        writer.write_all(b"second\ntest.finish\n").await.unwrap();
        assert_eq!(rx.recv().await.as_deref(), Some("second"));

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn grows_buffer_instead_of_dropping_bytes() {
        let (mut writer, reader) = tokio::io::duplex(1024);
        let cancel = CancellationToken::new();
        let (mut rx, handle) =
            spawn_framed_reader(reader, StreamKind::Stderr, SENTINEL, cancel.clone());

        let payload = "x".repeat(INITIAL_BUFFER_SIZE * 3 + 17);
        let writer_task = tokio::spawn(async move {
            writer.write_all(payload.as_bytes()).await.unwrap();
            writer.write_all(b"\ntest.finish\n").await.unwrap();
            writer
        });

        let message = rx.recv().await.expect("message");
        assert_eq!(message.len(), INITIAL_BUFFER_SIZE * 3 + 17);
        assert!(message.bytes().all(|b| b == b'x'));

        let _writer = writer_task.await.unwrap();
        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn stops_on_eof_without_delivering_partial_message() {
        let (mut writer, reader) = tokio::io::duplex(64);
        let (mut rx, handle) = spawn_framed_reader(
            reader,
            StreamKind::Stdout,
            SENTINEL,
            CancellationToken::new(),
        );

        writer.write_all(b"partial output").await.unwrap();
        drop(writer);

        handle.await.unwrap();
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn cancellation_stops_a_blocked_reader() {
        let (_writer, reader) = tokio::io::duplex(64);
        let cancel = CancellationToken::new();
        let (_rx, handle) =
            spawn_framed_reader(reader, StreamKind::Stdout, SENTINEL, cancel.clone());

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("reader did not stop")
            .unwrap();
    }
}
