//! Liveness responder for the dashboard health check.
//!
//! Every request, whatever its method or path, gets the same plaintext 200.
//! At most one connection is serviced per call, and the accept wait is
//! bounded so the scheduler never stalls here.

use core::fmt::Write as _;

use embassy_time::{Duration, with_timeout};
use embedded_io_async::{Read, Write};
use heapless::String;

use crate::error::NetError;
use crate::traits::{Connection, Listener};

pub const BODY: &str = "Hello world!\n";
pub const REQUEST_CAPACITY: usize = 1024;
/// Bound on the read, the write and the close of an accepted connection
pub const IO_TIMEOUT: Duration = Duration::from_secs(1);

/// Why a connection was dropped without a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Net(NetError),
    /// Request bytes were not UTF-8
    BadRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nobody connected within the accept window
    NoConnection,
    Serviced,
    /// A connection came in but failed. Logged and dropped.
    Ignored(Fault),
}

pub struct Responder<L> {
    listener: L,
    accept_window: Duration,
    buf: [u8; REQUEST_CAPACITY],
}

impl<L: Listener> Responder<L> {
    pub fn new(listener: L, accept_window: Duration) -> Self {
        Self {
            listener,
            accept_window,
            buf: [0; REQUEST_CAPACITY],
        }
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// Service at most one inbound connection
    pub async fn poll(&mut self) -> Outcome {
        let mut conn = match with_timeout(self.accept_window, self.listener.accept()).await {
            Err(_) => return Outcome::NoConnection,
            Ok(Err(e)) => {
                log::warn!("[HTTP] accept failed: {}", e);
                return Outcome::Ignored(Fault::Net(e));
            }
            Ok(Ok(conn)) => conn,
        };

        let result = respond(&mut conn, &mut self.buf).await;
        if with_timeout(IO_TIMEOUT, conn.close()).await.is_err() {
            log::warn!("[HTTP] close timed out");
        }
        match result {
            Ok(()) => Outcome::Serviced,
            Err(fault) => {
                log::warn!("[HTTP] request dropped: {:?}", fault);
                Outcome::Ignored(fault)
            }
        }
    }
}

fn response() -> String<128> {
    let mut out = String::new();
    // Fits: fixed head plus a 13 byte body.
    let _ = write!(
        out,
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        BODY.len(),
        BODY
    );
    out
}

async fn respond<C: Connection>(conn: &mut C, buf: &mut [u8]) -> Result<(), Fault> {
    let n = match with_timeout(IO_TIMEOUT, conn.read(buf)).await {
        Ok(Ok(n)) => n,
        Ok(Err(_)) => return Err(Fault::Net(NetError::Read)),
        Err(_) => return Err(Fault::Net(NetError::Timeout)),
    };
    let request = core::str::from_utf8(&buf[..n]).map_err(|_| Fault::BadRequest)?;
    log::debug!("[HTTP] request: {}", request.lines().next().unwrap_or(""));

    let reply = response();
    let sent = match with_timeout(IO_TIMEOUT, conn.write_all(reply.as_bytes())).await {
        Ok(Ok(())) => with_timeout(IO_TIMEOUT, conn.flush()).await,
        other => other,
    };
    match sent {
        Ok(Ok(())) => Ok(()),
        Ok(Err(_)) => Err(Fault::Net(NetError::Write)),
        Err(_) => Err(Fault::Net(NetError::Timeout)),
    }
}
