use bme280::i2c::BME280;
use esp_hal::gpio::AnyPin;
use esp_hal::{
    delay::Delay,
    gpio::{Input, InputConfig, Pull},
    i2c::master::{Config as I2cConfig, I2c},
    peripherals::{I2C0, I2C1},
    time::Rate,
};

use crate::error::{DisplayError, SensorError};
use crate::model::Reading;
use crate::scheduler::Buttons;
use crate::traits::SensorSource;

pub struct Bme280Sensor<'a> {
    bme: BME280<I2c<'a, esp_hal::Blocking>>,
    delay: Delay,
    ready: bool,
}

impl<'a> Bme280Sensor<'a> {
    pub fn new<SDA, SCL>(i2c_periph: I2C0<'a>, sda: SDA, scl: SCL) -> Result<Self, SensorError>
    where
        SDA: Into<AnyPin<'a>>,
        SCL: Into<AnyPin<'a>>,
    {
        let i2c = I2c::new(
            i2c_periph,
            I2cConfig::default().with_frequency(Rate::from_khz(100)),
        )
        .map_err(|_| SensorError::Bus)?
        .with_sda(sda.into())
        .with_scl(scl.into());

        // SDO low: 0x76
        Ok(Self {
            bme: BME280::new_primary(i2c),
            delay: Delay::new(),
            ready: false,
        })
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn init(&mut self) -> Result<(), SensorError> {
        match self.bme.init(&mut self.delay) {
            Ok(()) => {
                self.ready = true;
                log::info!("[SENSOR] BME280 initialized");
                Ok(())
            }
            Err(e) => {
                self.ready = false;
                log::warn!("[SENSOR] BME280 init failed: {:?}", e);
                Err(SensorError::NotReady)
            }
        }
    }
}

impl SensorSource for Bme280Sensor<'_> {
    fn read(&mut self) -> Result<Reading, SensorError> {
        // A sensor missing at boot gets one init attempt per cycle.
        if !self.ready {
            self.init()?;
        }
        let m = self.bme.measure(&mut self.delay).map_err(|e| {
            log::warn!("[SENSOR] measure failed: {:?}", e);
            SensorError::Bus
        })?;
        Ok(Reading {
            temperature_c: m.temperature,
            humidity_pct: m.humidity,
        })
    }
}

pub struct SSD1306Hardware<'a> {
    pub i2c: I2c<'a, esp_hal::Blocking>,
}

impl<'a> SSD1306Hardware<'a> {
    pub fn new<SDA, SCL>(i2c_periph: I2C1<'a>, sda: SDA, scl: SCL) -> Result<Self, DisplayError>
    where
        SDA: Into<AnyPin<'a>>,
        SCL: Into<AnyPin<'a>>,
    {
        let i2c = I2c::new(
            i2c_periph,
            I2cConfig::default().with_frequency(Rate::from_khz(400)),
        )
        .map_err(|_| DisplayError::Bus)?
        .with_sda(sda.into())
        .with_scl(scl.into());

        Ok(Self { i2c })
    }
}

/// Sending button idles high (pull-up), the other two idle low (pull-down)
pub fn button_inputs<'a, S, B, T>(sending: S, brightness: B, status: T) -> Buttons<Input<'a>>
where
    S: Into<AnyPin<'a>>,
    B: Into<AnyPin<'a>>,
    T: Into<AnyPin<'a>>,
{
    let pull_up = InputConfig::default().with_pull(Pull::Up);
    let pull_down = InputConfig::default().with_pull(Pull::Down);
    Buttons {
        sending: Input::new(sending.into(), pull_up),
        brightness: Input::new(brightness.into(), pull_down),
        status: Input::new(status.into(), pull_down),
    }
}
