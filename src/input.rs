//! Debounced button inputs.
//!
//! Each physical button is a [`ButtonChannel`]: a digital input polled once per
//! scheduler tick and a [`Debouncer`] that turns raw levels into edge events.
//! Debouncing never sleeps. After an edge fires, further qualifying edges are
//! suppressed until the hold time has passed.

use embassy_time::{Duration, Instant};
use embedded_hal::digital::InputPin;

/// Transition that counts as a press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// low to high, for pull-down buttons
    Rising,
    /// high to low, for pull-up buttons
    Falling,
}

impl Edge {
    /// Level of the line while the button is released
    pub fn idle_level(self) -> bool {
        matches!(self, Edge::Falling)
    }

    fn matches(self, last: bool, current: bool) -> bool {
        match self {
            Edge::Rising => !last && current,
            Edge::Falling => last && !current,
        }
    }
}

/// Pure edge detector with time-based suppression
#[derive(Debug, Clone)]
pub struct Debouncer {
    edge: Edge,
    hold: Duration,
    last_level: bool,
    suppressed_until: Option<Instant>,
}

impl Debouncer {
    pub fn new(edge: Edge, hold: Duration) -> Self {
        Self {
            edge,
            hold,
            last_level: edge.idle_level(),
            suppressed_until: None,
        }
    }

    pub fn edge(&self) -> Edge {
        self.edge
    }

    /// Feed one raw sample. Returns the edge when a press is accepted.
    pub fn poll(&mut self, level: bool, now: Instant) -> Option<Edge> {
        let last = core::mem::replace(&mut self.last_level, level);
        if !self.edge.matches(last, level) {
            return None;
        }
        if let Some(until) = self.suppressed_until {
            if now < until {
                return None;
            }
        }
        self.suppressed_until = Some(now + self.hold);
        Some(self.edge)
    }
}

/// A physical button: its input line plus debounce state
pub struct ButtonChannel<P> {
    name: &'static str,
    pin: P,
    debouncer: Debouncer,
}

impl<P: InputPin> ButtonChannel<P> {
    pub fn new(name: &'static str, pin: P, edge: Edge, hold: Duration) -> Self {
        Self {
            name,
            pin,
            debouncer: Debouncer::new(edge, hold),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Sample the line once. A failed read counts as no edge.
    pub fn poll(&mut self, now: Instant) -> Option<Edge> {
        let level = match self.pin.is_high() {
            Ok(level) => level,
            Err(e) => {
                log::warn!("[BUTTON] {} read failed: {:?}", self.name, e);
                return None;
            }
        };
        let edge = self.debouncer.poll(level, now);
        if edge.is_some() {
            log::debug!("[BUTTON] {} pressed", self.name);
        }
        edge
    }
}
