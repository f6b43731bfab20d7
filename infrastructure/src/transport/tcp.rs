//! TCP transport: newline-delimited JSON text frames.
//!
//! Each frame is one line of UTF-8 text in either direction. A background
//! reader task owns the read half of the socket and forwards lines through
//! an unbounded channel, so [`Connection::recv_text`] is cancel-safe and
//! frames keep their arrival order.
//!
//! Invalid UTF-8 is forwarded lossily and left for the frame parser to
//! reject. Lines longer than the frame limit are skipped.

use async_trait::async_trait;
use reentry_application::ports::transport::{Connection, Transport, TransportError};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Longest inbound line accepted as a frame, newline included.
pub const MAX_FRAME_BYTES: usize = 1024 * 1024;

/// Connects to a chat backend at `host:port`.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    address: String,
}

impl TcpTransport {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

#[async_trait]
impl Transport for TcpTransport {
    fn endpoint(&self) -> String {
        format!("tcp://{}", self.address)
    }

    async fn connect(&self) -> Result<Box<dyn Connection>, TransportError> {
        let stream = TcpStream::connect(&self.address).await.map_err(|e| {
            TransportError::ConnectFailed {
                endpoint: self.address.clone(),
                reason: e.to_string(),
            }
        })?;
        if let Err(e) = stream.set_nodelay(true) {
            debug!("Could not set TCP_NODELAY on {}: {}", self.address, e);
        }
        Ok(Box::new(TcpConnection::from_stream(stream)))
    }
}

/// One established TCP channel.
pub struct TcpConnection {
    writer: Option<BufWriter<OwnedWriteHalf>>,
    rx: mpsc::UnboundedReceiver<Result<String, TransportError>>,
    reader_handle: JoinHandle<()>,
}

impl TcpConnection {
    pub fn from_stream(stream: TcpStream) -> Self {
        Self::with_frame_limit(stream, MAX_FRAME_BYTES)
    }

    /// Like [`from_stream`](Self::from_stream) with a custom line limit.
    pub fn with_frame_limit(stream: TcpStream, max_frame_bytes: usize) -> Self {
        let (read_half, write_half) = stream.into_split();
        let (tx, rx) = mpsc::unbounded_channel();
        let reader_handle = tokio::spawn(reader_loop(read_half, tx, max_frame_bytes));

        Self {
            writer: Some(BufWriter::new(write_half)),
            rx,
            reader_handle,
        }
    }
}

/// Forward every non-blank line until EOF, an I/O error, or a dropped receiver.
async fn reader_loop(
    read_half: OwnedReadHalf,
    tx: mpsc::UnboundedSender<Result<String, TransportError>>,
    max_frame_bytes: usize,
) {
    let mut reader = BufReader::new(read_half);
    let mut line = Vec::new();

    loop {
        line.clear();
        let read = (&mut reader)
            .take(max_frame_bytes as u64)
            .read_until(b'\n', &mut line)
            .await;

        match read {
            Ok(0) => {
                debug!("Reader loop: connection closed by peer");
                return;
            }
            Ok(n) if n >= max_frame_bytes && !line.ends_with(b"\n") => {
                warn!("Reader loop: skipping frame over {} bytes", max_frame_bytes);
                if let Err(e) = skip_rest_of_line(&mut reader).await {
                    warn!("Reader loop: read error: {}", e);
                    let _ = tx.send(Err(TransportError::ReceiveFailed(e.to_string())));
                    return;
                }
            }
            Ok(_) => {
                let text = String::from_utf8_lossy(&line);
                let frame = text.trim_end_matches(['\r', '\n']);
                if frame.trim().is_empty() {
                    continue;
                }
                trace!("Reader loop received: {}", frame);
                if tx.send(Ok(frame.to_string())).is_err() {
                    return;
                }
            }
            Err(e) => {
                warn!("Reader loop: read error: {}", e);
                let _ = tx.send(Err(TransportError::ReceiveFailed(e.to_string())));
                return;
            }
        }
    }
}

/// Consume input up to and including the next newline, or to EOF.
async fn skip_rest_of_line(reader: &mut BufReader<OwnedReadHalf>) -> std::io::Result<()> {
    loop {
        let (newline, available) = {
            let buf = reader.fill_buf().await?;
            (buf.iter().position(|b| *b == b'\n'), buf.len())
        };
        match newline {
            Some(i) => {
                reader.consume(i + 1);
                return Ok(());
            }
            None if available == 0 => return Ok(()),
            None => reader.consume(available),
        }
    }
}

#[async_trait]
impl Connection for TcpConnection {
    async fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        let writer = self.writer.as_mut().ok_or(TransportError::Closed)?;
        let send_failed = |e: std::io::Error| TransportError::SendFailed(e.to_string());

        writer.write_all(text.as_bytes()).await.map_err(send_failed)?;
        writer.write_all(b"\n").await.map_err(send_failed)?;
        writer.flush().await.map_err(send_failed)
    }

    async fn recv_text(&mut self) -> Option<Result<String, TransportError>> {
        self.rx.recv().await
    }

    async fn close(&mut self) {
        if let Some(mut writer) = self.writer.take()
            && let Err(e) = writer.shutdown().await
        {
            debug!("TCP shutdown failed: {}", e);
        }
        self.reader_handle.abort();
        self.rx.close();
    }
}

impl Drop for TcpConnection {
    fn drop(&mut self) {
        self.reader_handle.abort();
    }
}
