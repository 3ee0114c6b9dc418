// Model of the data read and shown in this app

use core::fmt::Write;
use heapless::String;

pub const TEXT_CAPACITY: usize = 32;

/// Fixed-capacity label text
pub type Text = String<TEXT_CAPACITY>;

/// Build a label text, truncating at capacity
pub fn text(s: &str) -> Text {
    let mut out = Text::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Format into a label text, truncating at capacity
pub fn text_fmt(args: core::fmt::Arguments<'_>) -> Text {
    struct Truncating(Text);

    impl Write for Truncating {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            for c in s.chars() {
                if self.0.push(c).is_err() {
                    break;
                }
            }
            Ok(())
        }
    }

    let mut out = Truncating(Text::new());
    let _ = out.write_fmt(args);
    out.0
}

/// Semantic color of a label. The sink decides how each tone looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Main,
    Accent,
    Good,
    Bad,
}

/// Addressable label on the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Time,
    Date,
    Temperature,
    Humidity,
    SendStatus,
    Footer,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn from_celsius(self, celsius: f32) -> f32 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: Text,
    pub tone: Tone,
}

impl Label {
    fn new(s: &str, tone: Tone) -> Self {
        Self { text: text(s), tone }
    }
}

/// Everything the panel shows
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    pub time: Label,
    pub date: Label,
    pub temperature: Label,
    pub humidity: Label,
    pub send_status: Label,
    pub footer: Label,
    pub brightness: f32,
}

impl DisplayState {
    pub fn new(unit: TemperatureUnit, room: &str) -> Self {
        Self {
            time: Label::new("--:-- AM", Tone::Accent),
            date: Label::new("--/--", Tone::Accent),
            temperature: Label {
                text: text_fmt(format_args!("--.-{}", unit.symbol())),
                tone: Tone::Main,
            },
            humidity: Label::new("--.-%", Tone::Main),
            send_status: Label::new("ON", Tone::Good),
            footer: Label {
                text: text_fmt(format_args!("Room: {}", room)),
                tone: Tone::Main,
            },
            brightness: 1.0,
        }
    }

    pub fn label(&self, field: Field) -> &Label {
        match field {
            Field::Time => &self.time,
            Field::Date => &self.date,
            Field::Temperature => &self.temperature,
            Field::Humidity => &self.humidity,
            Field::SendStatus => &self.send_status,
            Field::Footer => &self.footer,
        }
    }

    pub fn label_mut(&mut self, field: Field) -> &mut Label {
        match field {
            Field::Time => &mut self.time,
            Field::Date => &mut self.date,
            Field::Temperature => &mut self.temperature,
            Field::Humidity => &mut self.humidity,
            Field::SendStatus => &mut self.send_status,
            Field::Footer => &mut self.footer,
        }
    }
}
