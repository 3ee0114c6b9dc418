//! Periodic sensor sampling and metric upload.
//!
//! Each step of a cycle stands alone: a failed sensor read still lets the
//! time fetch and the metric writes run, and each network call is bounded by
//! the configured timeout.

use embassy_time::{Duration, Instant, with_timeout};

use crate::influx::Metric;
use crate::model::{Field, Reading, TemperatureUnit, text_fmt};
use crate::screen::Screen;
use crate::traits::{DisplaySink, SensorSource, Uplink};

/// Fires at most once per interval. The first check always fires.
#[derive(Debug, Clone, Copy)]
pub struct TelemetryTimer {
    interval: Duration,
    last_fired: Option<Instant>,
}

impl TelemetryTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Check the timer, consuming the fire when due
    pub fn due(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_fired {
            if now.saturating_duration_since(last) < self.interval {
                return false;
            }
        }
        self.last_fired = Some(now);
        true
    }
}

/// What one fired cycle managed to do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub sensor_ok: bool,
    pub time_ok: bool,
    pub writes_attempted: u8,
    pub writes_ok: u8,
}

pub struct TelemetryCycle {
    timer: TelemetryTimer,
    unit: TemperatureUnit,
    host: &'static str,
    room: &'static str,
    net_timeout: Duration,
    last_reading: Option<Reading>,
}

impl TelemetryCycle {
    pub fn new(
        interval: Duration,
        unit: TemperatureUnit,
        host: &'static str,
        room: &'static str,
        net_timeout: Duration,
    ) -> Self {
        Self {
            timer: TelemetryTimer::new(interval),
            unit,
            host,
            room,
            net_timeout,
            last_reading: None,
        }
    }

    pub fn last_reading(&self) -> Option<Reading> {
        self.last_reading
    }

    /// Run the cycle if its interval has elapsed
    pub async fn maybe_run<S, D, U>(
        &mut self,
        now: Instant,
        sensor: &mut S,
        screen: &mut Screen<D>,
        uplink: &mut U,
        sending: bool,
    ) -> Option<CycleReport>
    where
        S: SensorSource,
        D: DisplaySink,
        U: Uplink,
    {
        if !self.timer.due(now) {
            return None;
        }
        Some(self.run(sensor, screen, uplink, sending).await)
    }

    async fn run<S, D, U>(
        &mut self,
        sensor: &mut S,
        screen: &mut Screen<D>,
        uplink: &mut U,
        sending: bool,
    ) -> CycleReport
    where
        S: SensorSource,
        D: DisplaySink,
        U: Uplink,
    {
        let mut report = CycleReport::default();

        match sensor.read() {
            Ok(reading) => {
                report.sensor_ok = true;
                self.last_reading = Some(reading);
                let temperature = self.unit.from_celsius(reading.temperature_c);
                screen.set_text(
                    Field::Temperature,
                    text_fmt(format_args!("{:.1}{}", temperature, self.unit.symbol())),
                );
                screen.set_text(
                    Field::Humidity,
                    text_fmt(format_args!("{:.1}%", reading.humidity_pct)),
                );
            }
            Err(e) => log::warn!("[SENSOR] read failed: {}", e),
        }

        match with_timeout(self.net_timeout, uplink.fetch_time()).await {
            Ok(Ok(clock)) => {
                report.time_ok = true;
                screen.set_text(Field::Time, clock.time);
                screen.set_text(Field::Date, clock.date);
            }
            Ok(Err(e)) => log::warn!("[TIME] fetch failed: {}", e),
            Err(_) => log::warn!("[TIME] fetch timed out"),
        }

        if !sending {
            return report;
        }
        let Some(reading) = self.last_reading else {
            log::warn!("[INFLUX] no reading to send yet");
            return report;
        };
        let samples = [
            ("temperature", self.unit.from_celsius(reading.temperature_c)),
            ("humidity", reading.humidity_pct),
        ];
        for (measurement, value) in samples {
            let metric = Metric {
                measurement,
                host: self.host,
                room: self.room,
                value,
            };
            report.writes_attempted += 1;
            match with_timeout(self.net_timeout, uplink.write_metric(&metric)).await {
                Ok(Ok(())) => report.writes_ok += 1,
                Ok(Err(e)) => log::warn!("[INFLUX] {} write failed: {}", measurement, e),
                Err(_) => log::warn!("[INFLUX] {} write timed out", measurement),
            }
        }
        report
    }
}
