//! The three button-driven state machines.
//!
//! Each advances on an edge event and applies its side effect to the screen
//! before returning.

use crate::model::{Field, Text, Tone, text, text_fmt};
use crate::screen::Screen;
use crate::traits::{DisplaySink, LinkInfo};

/// Brightness multipliers, brightest first
pub const BRIGHTNESS_LEVELS: [f32; 5] = [1.0, 0.3, 0.01, 0.001, 0.0];

/// Gates telemetry writes
#[derive(Debug, Clone, Copy)]
pub struct SendingToggle {
    enabled: bool,
}

impl SendingToggle {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn on_edge<D: DisplaySink>(&mut self, screen: &mut Screen<D>) {
        self.enabled = !self.enabled;
        let (label, tone) = if self.enabled {
            ("ON", Tone::Good)
        } else {
            ("OFF", Tone::Bad)
        };
        screen.set(Field::SendStatus, text(label), tone);
        log::info!("Toggle sending: {}", self.enabled);
    }
}

/// What the footer line shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FooterMode {
    Room,
    Ip,
    Wifi,
}

impl FooterMode {
    pub const ALL: [FooterMode; 3] = [FooterMode::Room, FooterMode::Ip, FooterMode::Wifi];
}

/// Footer text for `mode`
pub fn footer_text<N: LinkInfo>(mode: FooterMode, room: &str, link: &mut N) -> Text {
    match mode {
        FooterMode::Room => text_fmt(format_args!("Room: {}", room)),
        FooterMode::Ip => match link.ipv4() {
            Some([a, b, c, d]) => text_fmt(format_args!("IP: {}.{}.{}.{}", a, b, c, d)),
            None => text("IP: --"),
        },
        FooterMode::Wifi => match link.rssi() {
            Some(rssi) => text_fmt(format_args!("WiFi: {} {}", wifi_bars(rssi), rssi)),
            None => text("WiFi: ?"),
        },
    }
}

/// Signal bars for an RSSI in dBm
pub fn wifi_bars(rssi: i32) -> &'static str {
    if rssi >= -55 {
        "||||"
    } else if rssi >= -70 {
        "|||"
    } else if rssi >= -80 {
        "||"
    } else {
        "|"
    }
}

/// Cycles the footer through room, IP and signal strength
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusRotation {
    index: usize,
}

impl StatusRotation {
    pub fn mode(&self) -> FooterMode {
        FooterMode::ALL[self.index]
    }

    pub fn on_edge<D: DisplaySink, N: LinkInfo>(
        &mut self,
        screen: &mut Screen<D>,
        room: &str,
        link: &mut N,
    ) -> FooterMode {
        self.index = (self.index + 1) % FooterMode::ALL.len();
        let mode = self.mode();
        screen.set_text(Field::Footer, footer_text(mode, room, link));
        log::info!("Bottom mode: {}", screen.state().footer.text);
        mode
    }
}

/// Steps the panel through [`BRIGHTNESS_LEVELS`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrightnessCycle {
    index: usize,
}

impl BrightnessCycle {
    pub fn level(&self) -> f32 {
        BRIGHTNESS_LEVELS[self.index]
    }

    pub fn on_edge<D: DisplaySink>(&mut self, screen: &mut Screen<D>) -> f32 {
        self.index = (self.index + 1) % BRIGHTNESS_LEVELS.len();
        let level = self.level();
        screen.set_brightness(level);
        log::info!("Brightness: {}", level);
        level
    }
}

/// Room/IP footer flip bound to the sending button.
///
/// Only active when the legacy coupling is configured. It keeps its own flag
/// and does not move the status rotation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FooterFlip {
    show_ip: bool,
}

impl FooterFlip {
    pub fn on_edge<D: DisplaySink, N: LinkInfo>(
        &mut self,
        screen: &mut Screen<D>,
        room: &str,
        link: &mut N,
    ) {
        self.show_ip = !self.show_ip;
        let mode = if self.show_ip {
            FooterMode::Ip
        } else {
            FooterMode::Room
        };
        screen.set_text(Field::Footer, footer_text(mode, room, link));
        log::info!("Bottom label toggled: {}", screen.state().footer.text);
    }
}
