//! Display state paired with the sink that renders it

use crate::model::{DisplayState, Field, Text, Tone};
use crate::traits::DisplaySink;

/// Owns the panel state; every write is forwarded to the sink at once
pub struct Screen<D> {
    state: DisplayState,
    sink: D,
}

impl<D: DisplaySink> Screen<D> {
    /// Render every field of the initial state and apply its brightness
    pub fn new(state: DisplayState, sink: D) -> Self {
        let mut screen = Self { state, sink };
        for field in [
            Field::Time,
            Field::Date,
            Field::Temperature,
            Field::Humidity,
            Field::SendStatus,
            Field::Footer,
        ] {
            screen.render(field);
        }
        let level = screen.state.brightness;
        screen.set_brightness(level);
        screen
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut D {
        &mut self.sink
    }

    /// Replace the text of `field`, keeping its tone
    pub fn set_text(&mut self, field: Field, text: Text) {
        self.state.label_mut(field).text = text;
        self.render(field);
    }

    pub fn set(&mut self, field: Field, text: Text, tone: Tone) {
        let label = self.state.label_mut(field);
        label.text = text;
        label.tone = tone;
        self.render(field);
    }

    pub fn set_brightness(&mut self, level: f32) {
        self.state.brightness = level;
        if let Err(e) = self.sink.set_brightness(level) {
            log::warn!("[DISPLAY] brightness {} failed: {}", level, e);
        }
    }

    fn render(&mut self, field: Field) {
        if let Err(e) = self.sink.render(&self.state, field) {
            log::warn!("[DISPLAY] render {:?} failed: {}", field, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TemperatureUnit, text};
    use crate::testing::RecordingSink;

    #[test]
    fn new_screen_renders_all_fields_once() {
        let sink = RecordingSink::new();
        let screen = Screen::new(
            DisplayState::new(TemperatureUnit::Celsius, "Lab"),
            sink.clone(),
        );
        assert_eq!(sink.renders().len(), 6);
        assert_eq!(sink.brightness_calls(), vec![1.0]);
        assert_eq!(screen.state().temperature.text.as_str(), "--.-°C");
    }

    #[test]
    fn writes_reach_the_sink_immediately() {
        let sink = RecordingSink::new();
        let mut screen = Screen::new(
            DisplayState::new(TemperatureUnit::Celsius, "Lab"),
            sink.clone(),
        );
        screen.set(Field::SendStatus, text("OFF"), Tone::Bad);
        let renders = sink.renders();
        let last = renders.last().unwrap();
        assert_eq!(last.0, Field::SendStatus);
        assert_eq!(last.1.as_str(), "OFF");
        assert_eq!(screen.state().send_status.tone, Tone::Bad);
    }

    #[test]
    fn sink_failures_do_not_lose_state() {
        let sink = RecordingSink::new();
        let mut screen = Screen::new(
            DisplayState::new(TemperatureUnit::Celsius, "Lab"),
            sink.clone(),
        );
        sink.fail(true);
        screen.set_text(Field::Humidity, text("40.0%"));
        assert_eq!(screen.state().humidity.text.as_str(), "40.0%");
    }
}
