//! Hardware and network abstraction traits

use embedded_io_async::{Read, Write};

use crate::clock::WallClock;
use crate::error::{DisplayError, HttpError, NetError, SensorError, TimeError};
use crate::influx::Metric;
use crate::model::{DisplayState, Field, Reading};

/// Trait for temperature/humidity sensors
pub trait SensorSource {
    /// Read temperature in Celsius and relative humidity in percent
    fn read(&mut self) -> Result<Reading, SensorError>;
}

/// Trait for display devices
pub trait DisplaySink {
    /// Show `state` after `changed` was written
    fn render(&mut self, state: &DisplayState, changed: Field) -> Result<(), DisplayError>;

    /// Apply a brightness multiplier in `0.0..=1.0`
    fn set_brightness(&mut self, level: f32) -> Result<(), DisplayError>;
}

/// Trait for querying the station link
pub trait LinkInfo {
    fn ipv4(&self) -> Option<[u8; 4]>;

    /// Received signal strength in dBm
    fn rssi(&mut self) -> Option<i32>;
}

/// A byte stream that can be shut down by this side
#[allow(async_fn_in_trait)]
pub trait Connection: Read + Write {
    async fn close(&mut self);
}

/// Trait for accepting inbound TCP streams
#[allow(async_fn_in_trait)]
pub trait Listener {
    type Conn<'a>: Connection
    where
        Self: 'a;

    /// Wait for the next connection. Callers bound the wait.
    async fn accept(&mut self) -> Result<Self::Conn<'_>, NetError>;
}

/// Trait for the remote services the telemetry cycle talks to
#[allow(async_fn_in_trait)]
pub trait Uplink {
    async fn fetch_time(&mut self) -> Result<WallClock, TimeError>;

    async fn write_metric(&mut self, metric: &Metric<'_>) -> Result<(), HttpError>;
}
