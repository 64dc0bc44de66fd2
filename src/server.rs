//! Length-prefixed binary TCP front end over the router.
//!
//! Each frame is a 4-byte big-endian length followed by a bincode payload.
//! Clients send [`Request`] frames and receive [`Event`] frames.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use crate::config::MAX_FRAME_LEN;
use crate::protocol::{ConnectionId, Event, Request};
use crate::router::{Outbox, Router};

/// Encode `value` and write it as one length-prefixed frame.
pub async fn write_frame<W, T>(writer: &mut W, value: &T) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let data = bincode::serialize(value).context("frame encode")?;
    let len = u32::try_from(data.len()).context("frame too large")?;
    if len > MAX_FRAME_LEN {
        anyhow::bail!("frame of {len} bytes exceeds limit");
    }
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(&data).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-prefixed frame and decode it.
pub async fn read_frame<R, T>(reader: &mut R) -> anyhow::Result<T>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf);
    if len == 0 || len > MAX_FRAME_LEN {
        anyhow::bail!("invalid frame length {len}");
    }
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf).await?;
    let value = bincode::deserialize(&buf).context("frame decode")?;
    Ok(value)
}

/// Outbox backed by one unbounded channel per connection. Delivery is
/// best-effort: a closed channel means the writer task is gone and the read
/// loop will notice on its own.
#[derive(Default)]
pub struct ChannelOutbox {
    senders: HashMap<ConnectionId, mpsc::UnboundedSender<Event>>,
}

impl ChannelOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, conn: ConnectionId, sender: mpsc::UnboundedSender<Event>) {
        self.senders.insert(conn, sender);
    }

    fn remove(&mut self, conn: ConnectionId) {
        self.senders.remove(&conn);
    }
}

impl Outbox for ChannelOutbox {
    fn send(&mut self, to: ConnectionId, event: Event) {
        if let Some(sender) = self.senders.get(&to) {
            let _ = sender.send(event);
        }
    }

    fn broadcast(&mut self, event: Event) {
        for sender in self.senders.values() {
            let _ = sender.send(event.clone());
        }
    }
}

struct Shared {
    router: Router,
    outbox: ChannelOutbox,
}

/// TCP server wrapping a [`Router`]. Connection tasks run concurrently but
/// every request resolves under one lock, so the router sees a serial stream.
pub struct Server {
    shared: Arc<Mutex<Shared>>,
    next_conn: AtomicU64,
}

impl Server {
    pub fn new(router: Router) -> Self {
        Server {
            shared: Arc::new(Mutex::new(Shared {
                router,
                outbox: ChannelOutbox::new(),
            })),
            next_conn: AtomicU64::new(1),
        }
    }

    /// Bind `addr` and accept connections until the task is dropped.
    pub async fn run(&self, addr: &str) -> anyhow::Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("bind {addr}"))?;
        info!("listening on {addr}");
        self.serve(listener).await
    }

    /// Accept loop over an already bound listener.
    pub async fn serve(&self, listener: TcpListener) -> anyhow::Result<()> {
        loop {
            let (stream, peer) = listener.accept().await?;
            let conn = ConnectionId(self.next_conn.fetch_add(1, Ordering::Relaxed));
            info!("{peer} connected as {conn}");
            let shared = Arc::clone(&self.shared);
            tokio::spawn(handle_connection(shared, stream, conn));
        }
    }
}

async fn handle_connection(shared: Arc<Mutex<Shared>>, stream: TcpStream, conn: ConnectionId) {
    let (mut reader, mut writer) = stream.into_split();
    let (sender, mut inbox) = mpsc::unbounded_channel();
    {
        let mut shared = shared.lock().unwrap();
        let Shared { router, outbox } = &mut *shared;
        outbox.insert(conn, sender);
        router.connection_opened(conn, outbox);
    }

    // Writer drains the outbox channel. It ends early when a write fails, or
    // normally when the channel is removed from the outbox at cleanup and the
    // last sender drops.
    let mut writer_task = tokio::spawn(async move {
        while let Some(event) = inbox.recv().await {
            if let Err(err) = write_frame(&mut writer, &event).await {
                debug!("{conn}: write failed: {err:#}");
                break;
            }
        }
    });

    // A connection that can no longer be written to is dead, even if its read
    // half keeps producing frames.
    loop {
        tokio::select! {
            read = read_frame::<_, Request>(&mut reader) => match read {
                Ok(request) => {
                    let mut shared = shared.lock().unwrap();
                    let Shared { router, outbox } = &mut *shared;
                    router.handle(conn, request, outbox);
                }
                Err(err) => {
                    debug!("{conn}: read ended: {err:#}");
                    break;
                }
            },
            _ = &mut writer_task => {
                debug!("{conn}: writer stopped, closing");
                break;
            }
        }
    }

    let mut shared = shared.lock().unwrap();
    let Shared { router, outbox } = &mut *shared;
    outbox.remove(conn);
    router.connection_closed(conn, outbox);
}
