use embedded_graphics::{
    mono_font::{
        MonoFont, MonoTextStyle, MonoTextStyleBuilder,
        iso_8859_1::{FONT_6X10, FONT_9X15},
    },
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line, PrimitiveStyle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use esp_hal::i2c::master::I2c;
use ssd1306::{
    I2CDisplayInterface, Ssd1306, mode::BufferedGraphicsMode, prelude::*,
};

use crate::error::DisplayError;
use crate::hardware::SSD1306Hardware;
use crate::model::{DisplayState, Field, Label, Tone};
use crate::traits::DisplaySink;

const WIDTH: i32 = 128;
const TOP_RULE_Y: i32 = 11;
const MAIN_ROW_Y: i32 = 15;
const MID_RULE_Y: i32 = 33;
const STATUS_ROW_Y: i32 = 37;
const FOOTER_ROW_Y: i32 = 50;

type Panel<'a> = Ssd1306<
    I2CInterface<I2c<'a, esp_hal::Blocking>>,
    DisplaySize128x64,
    BufferedGraphicsMode<DisplaySize128x64>,
>;

/// 128x64 monochrome OLED, mounted upside down
pub struct Ssd1306Panel<'a> {
    display: Panel<'a>,
    on: bool,
}

impl<'a> Ssd1306Panel<'a> {
    pub fn new(hw: SSD1306Hardware<'a>) -> Result<Self, DisplayError> {
        log::info!("[DISPLAY] Initializing SSD1306");
        let interface = I2CDisplayInterface::new(hw.i2c);
        let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate180)
            .into_buffered_graphics_mode();
        display.init().map_err(|_| DisplayError::Bus)?;
        display.clear_buffer();
        display.flush().map_err(|_| DisplayError::Bus)?;
        Ok(Self { display, on: true })
    }

    fn style(font: &'static MonoFont<'static>, tone: Tone) -> MonoTextStyle<'static, BinaryColor> {
        let builder = MonoTextStyleBuilder::new().font(font);
        match tone {
            Tone::Bad => builder
                .text_color(BinaryColor::Off)
                .background_color(BinaryColor::On)
                .build(),
            Tone::Main | Tone::Accent | Tone::Good => builder.text_color(BinaryColor::On).build(),
        }
    }

    fn label(
        &mut self,
        label: &Label,
        font: &'static MonoFont<'static>,
        at: Point,
        alignment: Alignment,
    ) -> Result<(), DisplayError> {
        let layout = TextStyleBuilder::new()
            .baseline(Baseline::Top)
            .alignment(alignment)
            .build();
        Text::with_text_style(&label.text, at, Self::style(font, label.tone), layout)
            .draw(&mut self.display)
            .map_err(|_| DisplayError::Draw)?;
        Ok(())
    }

    fn rule(&mut self, y: i32) -> Result<(), DisplayError> {
        Line::new(Point::new(0, y), Point::new(WIDTH - 1, y))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut self.display)
            .map_err(|_| DisplayError::Draw)
    }

    fn draw(&mut self, state: &DisplayState) -> Result<(), DisplayError> {
        self.display.clear_buffer();

        self.label(&state.time, &FONT_6X10, Point::new(0, 0), Alignment::Left)?;
        self.label(&state.date, &FONT_6X10, Point::new(WIDTH - 1, 0), Alignment::Right)?;
        self.rule(TOP_RULE_Y)?;

        self.label(&state.temperature, &FONT_9X15, Point::new(0, MAIN_ROW_Y), Alignment::Left)?;
        self.label(
            &state.humidity,
            &FONT_9X15,
            Point::new(WIDTH - 1, MAIN_ROW_Y),
            Alignment::Right,
        )?;
        self.rule(MID_RULE_Y)?;

        Text::with_baseline(
            "Sending:",
            Point::new(0, STATUS_ROW_Y),
            Self::style(&FONT_6X10, Tone::Main),
            Baseline::Top,
        )
        .draw(&mut self.display)
        .map_err(|_| DisplayError::Draw)?;
        self.label(&state.send_status, &FONT_6X10, Point::new(54, STATUS_ROW_Y), Alignment::Left)?;
        self.label(&state.footer, &FONT_6X10, Point::new(0, FOOTER_ROW_Y), Alignment::Left)?;

        self.display.flush().map_err(|_| DisplayError::Bus)
    }
}

impl DisplaySink for Ssd1306Panel<'_> {
    fn render(&mut self, state: &DisplayState, changed: Field) -> Result<(), DisplayError> {
        log::debug!("[DISPLAY] redraw after {:?}", changed);
        self.draw(state)
    }

    fn set_brightness(&mut self, level: f32) -> Result<(), DisplayError> {
        if level <= 0.0 {
            self.on = false;
            return self.display.set_display_on(false).map_err(|_| DisplayError::Bus);
        }
        let contrast = (level.min(1.0) * 255.0) as u8;
        let precharge = if level >= 0.5 { 2 } else { 1 };
        self.display
            .set_brightness(Brightness::custom(precharge, contrast))
            .map_err(|_| DisplayError::Bus)?;
        if !self.on {
            self.on = true;
            self.display.set_display_on(true).map_err(|_| DisplayError::Bus)?;
        }
        Ok(())
    }
}
