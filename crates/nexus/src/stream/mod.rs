//! Live websocket feeds
//!
//! Each feed owns a blocking websocket on a background thread. The
//! socket carries a read timeout so the reader can notice its stop flag
//! between frames; dropped connections end the thread without any
//! reconnect attempt.

pub mod price;
pub mod trade;

use crate::error::Result;

use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

pub use price::spawn_price_feed;
pub use trade::spawn_trade_feed;

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

/// Handle to a running feed reader thread
pub struct FeedHandle {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FeedHandle {
    /// Signal the reader to stop and wait for it to finish
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Open a websocket and put a read timeout on the underlying stream
fn connect(url: &str) -> Result<Socket> {
    let (socket, _response) = tungstenite::connect(url)?;
    let timeout = Duration::from_millis(crate::config::network::SOCKET_POLL_MS);
    match socket.get_ref() {
        MaybeTlsStream::Plain(stream) => {
            stream.set_read_timeout(Some(timeout))?;
        }
        MaybeTlsStream::Rustls(stream) => {
            stream.sock.set_read_timeout(Some(timeout))?;
        }
        _ => {}
    }
    Ok(socket)
}

fn is_read_timeout(err: &tungstenite::Error) -> bool {
    matches!(
        err,
        tungstenite::Error::Io(e)
            if e.kind() == std::io::ErrorKind::WouldBlock
                || e.kind() == std::io::ErrorKind::TimedOut
    )
}

/// Connect to `url` and run `on_text` for every text frame on a new thread
///
/// The reader answers pings, skips frames `on_text` rejects, and exits on
/// a close frame, a connection error, or the stop flag.
fn spawn_reader<F>(name: &str, url: String, mut on_text: F) -> Result<FeedHandle>
where
    F: FnMut(&str) -> Result<()> + Send + 'static,
{
    let mut socket = connect(&url)?;
    tracing::debug!("feed connected: {}", url);

    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = Arc::clone(&stop);
    let feed = name.to_string();

    let handle = std::thread::Builder::new()
        .name(format!("nexus-feed-{}", name))
        .spawn(move || {
            loop {
                if stop_flag.load(Ordering::SeqCst) {
                    let _ = socket.close(None);
                    break;
                }
                match socket.read() {
                    Ok(Message::Text(text)) => {
                        if let Err(e) = on_text(&text) {
                            tracing::warn!("{} feed: discarding message: {}", feed, e);
                        }
                    }
                    Ok(Message::Ping(payload)) => {
                        let _ = socket.send(Message::Pong(payload));
                    }
                    Ok(Message::Close(_)) => {
                        tracing::debug!("{} feed: server closed connection", feed);
                        break;
                    }
                    Ok(_) => {}
                    Err(e) if is_read_timeout(&e) => {}
                    Err(e) => {
                        tracing::warn!("{} feed: connection lost: {}", feed, e);
                        break;
                    }
                }
            }
        })?;

    Ok(FeedHandle {
        stop,
        handle: Some(handle),
    })
}
