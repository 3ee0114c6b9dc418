//! Error types for every fallible seam of the firmware

use core::fmt;

/// Sensor read failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The sensor never finished initialization
    NotReady,
    /// The bus transaction failed
    Bus,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "sensor not initialized"),
            Self::Bus => write!(f, "sensor bus error"),
        }
    }
}

impl core::error::Error for SensorError {}

/// Display sink failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    Bus,
    Draw,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "display bus error"),
            Self::Draw => write!(f, "display draw error"),
        }
    }
}

impl core::error::Error for DisplayError {}

/// Transport failures on sockets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetError {
    /// DNS resolution failed
    Dns,
    /// Outbound connection was refused or reset
    Connect,
    /// Listening socket could not accept
    Accept,
    Read,
    Write,
    /// The peer closed before the exchange finished
    Closed,
    Timeout,
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dns => write!(f, "DNS resolution failed"),
            Self::Connect => write!(f, "connect failed"),
            Self::Accept => write!(f, "accept failed"),
            Self::Read => write!(f, "socket read failed"),
            Self::Write => write!(f, "socket write failed"),
            Self::Closed => write!(f, "connection closed by peer"),
            Self::Timeout => write!(f, "socket timeout"),
        }
    }
}

impl core::error::Error for NetError {}

impl embedded_io_async::Error for NetError {
    fn kind(&self) -> embedded_io_async::ErrorKind {
        match self {
            Self::Closed => embedded_io_async::ErrorKind::BrokenPipe,
            Self::Connect => embedded_io_async::ErrorKind::ConnectionRefused,
            Self::Timeout => embedded_io_async::ErrorKind::TimedOut,
            _ => embedded_io_async::ErrorKind::Other,
        }
    }
}

/// HTTP client failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpError {
    Net(NetError),
    /// Request URL or headers did not fit their buffers
    RequestTooLarge,
    /// Response did not fit the receive buffer
    ResponseTooLarge,
    /// Response was not parseable HTTP/1.x
    Malformed,
    /// Server answered with a non-2xx status
    Status(u16),
}

impl From<NetError> for HttpError {
    fn from(err: NetError) -> Self {
        Self::Net(err)
    }
}

impl From<reqwless::Error> for HttpError {
    fn from(err: reqwless::Error) -> Self {
        match err {
            reqwless::Error::Dns => Self::Net(NetError::Dns),
            reqwless::Error::Network(kind) => Self::Net(match kind {
                embedded_io_async::ErrorKind::TimedOut => NetError::Timeout,
                embedded_io_async::ErrorKind::ConnectionRefused => NetError::Connect,
                _ => NetError::Read,
            }),
            reqwless::Error::BufferTooSmall => Self::ResponseTooLarge,
            other => {
                log::debug!("[HTTP] client error: {:?}", other);
                Self::Malformed
            }
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Net(e) => write!(f, "transport: {}", e),
            Self::RequestTooLarge => write!(f, "request too large"),
            Self::ResponseTooLarge => write!(f, "response too large"),
            Self::Malformed => write!(f, "malformed HTTP response"),
            Self::Status(code) => write!(f, "unexpected status {}", code),
        }
    }
}

impl core::error::Error for HttpError {}

/// Time source failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeError {
    Http(HttpError),
    /// Body was not the expected JSON array of time records
    Json,
}

impl From<HttpError> for TimeError {
    fn from(err: HttpError) -> Self {
        Self::Http(err)
    }
}

impl fmt::Display for TimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "{}", e),
            Self::Json => write!(f, "unexpected time payload"),
        }
    }
}

impl core::error::Error for TimeError {}

/// Startup configuration failures. These are the only fatal errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    BadUrl(&'static str),
    BadValue(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "missing configuration key {}", key),
            Self::BadUrl(key) => write!(f, "{} is not an http:// URL", key),
            Self::BadValue(key) => write!(f, "{} has an invalid value", key),
        }
    }
}

impl core::error::Error for ConfigError {}
