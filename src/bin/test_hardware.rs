#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Instant, Timer};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;

use roomsense::{
    clock,
    controls::wifi_bars,
    display::Ssd1306Panel,
    hardware::{Bme280Sensor, SSD1306Hardware},
    influx::Metric,
    input::{Debouncer, Edge},
    model::{DisplayState, Field, TemperatureUnit},
    traits::{DisplaySink, SensorSource},
};

esp_bootloader_esp_idf::esp_app_desc!();

// Test result tracking
struct TestResults {
    passed: u32,
    failed: u32,
    total: u32,
}

impl TestResults {
    fn new() -> Self {
        Self {
            passed: 0,
            failed: 0,
            total: 0,
        }
    }

    fn assert(&mut self, condition: bool, test_name: &str) {
        self.total += 1;
        if condition {
            self.passed += 1;
            esp_println::println!("  ✓ {}", test_name);
        } else {
            self.failed += 1;
            esp_println::println!("  ✗ {} FAILED", test_name);
        }
    }

    fn assert_eq<T: PartialEq + core::fmt::Debug>(&mut self, left: T, right: T, test_name: &str) {
        self.total += 1;
        if left == right {
            self.passed += 1;
            esp_println::println!("  ✓ {}", test_name);
        } else {
            self.failed += 1;
            esp_println::println!("  ✗ {} FAILED: {:?} != {:?}", test_name, left, right);
        }
    }

    fn assert_close(&mut self, value: f32, expected: f32, tolerance: f32, test_name: &str) {
        self.total += 1;
        if (value - expected).abs() < tolerance {
            self.passed += 1;
            esp_println::println!("  ✓ {}", test_name);
        } else {
            self.failed += 1;
            esp_println::println!(
                "  ✗ {} FAILED: {:.2} not close to {:.2} (tolerance: {:.2})",
                test_name,
                value,
                expected,
                tolerance
            );
        }
    }

    fn print_summary(&self) {
        esp_println::println!("\n==========================================");
        esp_println::println!("Test Summary:");
        esp_println::println!("  Total:  {}", self.total);
        esp_println::println!("  Passed: {}", self.passed);
        esp_println::println!("  Failed: {}", self.failed);
        if self.failed == 0 {
            esp_println::println!("\n✓ ALL TESTS PASSED!");
        } else {
            esp_println::println!("\n✗ SOME TESTS FAILED");
        }
        esp_println::println!("==========================================");
    }
}

fn test_logic(results: &mut TestResults) {
    esp_println::println!("\n[TEST] Logic Tests");

    let hold = Duration::from_millis(200);
    let start = Instant::from_millis(1_000);
    let mut debouncer = Debouncer::new(Edge::Rising, hold);
    results.assert_eq(debouncer.poll(true, start), Some(Edge::Rising), "rising edge fires");
    debouncer.poll(false, start + Duration::from_millis(10));
    results.assert_eq(
        debouncer.poll(true, start + Duration::from_millis(20)),
        None,
        "bounce within hold suppressed",
    );
    debouncer.poll(false, start + Duration::from_millis(300));
    results.assert_eq(
        debouncer.poll(true, start + Duration::from_millis(310)),
        Some(Edge::Rising),
        "edge after hold fires",
    );

    results.assert_eq(wifi_bars(-50), "||||", "strong signal bars");
    results.assert_eq(wifi_bars(-75), "||", "weak signal bars");
    results.assert_eq(wifi_bars(-90), "|", "poor signal bars");

    results.assert_close(
        TemperatureUnit::Fahrenheit.from_celsius(22.5),
        72.5,
        0.01,
        "Celsius to Fahrenheit",
    );

    match clock::parse(br#"[{"just_time":"9:05","am_pm":"pm","month":"10/","day":"19"}]"#) {
        Ok(wall) => {
            results.assert_eq(wall.time.as_str(), "9:05 PM", "clock time text");
            results.assert_eq(wall.date.as_str(), "10/19", "clock date text");
        }
        Err(e) => {
            esp_println::println!("    clock parse failed: {}", e);
            results.assert(false, "clock payload parse");
        }
    }

    let metric = Metric {
        measurement: "temperature",
        host: "esp32s3",
        room: "living room",
        value: 72.456,
    };
    match metric.line() {
        Ok(line) => results.assert_eq(
            line.as_str(),
            "temperature,host=esp32s3,room=living\\ room value=72.46",
            "line protocol record",
        ),
        Err(e) => {
            esp_println::println!("    line build failed: {}", e);
            results.assert(false, "line protocol record");
        }
    }
}

fn test_bme280_sensor(results: &mut TestResults, sensor: &mut Bme280Sensor<'_>) {
    esp_println::println!("\n[TEST] BME280 Sensor Tests");

    if let Err(e) = sensor.init() {
        esp_println::println!("  Failed to initialize BME280: {}", e);
        results.assert(false, "BME280 initialization");
        return;
    }
    results.assert(sensor.is_ready(), "BME280 initialization");

    esp_println::println!("  Reading samples (5)...");
    let mut samples = heapless::Vec::<(f32, f32), 5>::new();
    for i in 0..5 {
        match sensor.read() {
            Ok(reading) => {
                esp_println::println!(
                    "    Sample {}: {:.2}°C {:.1}%",
                    i + 1,
                    reading.temperature_c,
                    reading.humidity_pct
                );
                let _ = samples.push((reading.temperature_c, reading.humidity_pct));
            }
            Err(e) => esp_println::println!("    Failed to read sample: {}", e),
        }
    }

    results.assert_eq(samples.len(), 5, "collected 5 samples");
    if samples.len() == 5 {
        for (temp, humidity) in samples.iter() {
            results.assert(*temp > -40.0 && *temp < 85.0, "temperature in valid range");
            results.assert(*humidity >= 0.0 && *humidity <= 100.0, "humidity in valid range");
        }

        let min_temp = samples.iter().fold(f32::INFINITY, |a, &(t, _)| a.min(t));
        let max_temp = samples.iter().fold(f32::NEG_INFINITY, |a, &(t, _)| a.max(t));
        results.assert(max_temp - min_temp < 2.0, "temperature readings stable (within 2°C)");
    }
}

async fn test_display(results: &mut TestResults, display: &mut Ssd1306Panel<'_>) {
    esp_println::println!("\n[TEST] SSD1306 Display Tests");

    let state = DisplayState::new(TemperatureUnit::Fahrenheit, "Test bench");
    results.assert(
        display.render(&state, Field::Footer).is_ok(),
        "render placeholder frame",
    );

    for level in [1.0, 0.3, 0.01, 0.001, 0.0, 1.0] {
        results.assert(display.set_brightness(level).is_ok(), "set brightness");
        Timer::after(Duration::from_millis(250)).await;
    }
}

#[esp_rtos::main]
async fn main(_spawner: Spawner) {
    esp_println::logger::init_logger_from_env();
    let peripherals = esp_hal::init(esp_hal::Config::default());

    esp_println::println!("\n==========================================");
    esp_println::println!("=== Hardware Unit Test Runner ===");
    esp_println::println!("==========================================");

    let mut results = TestResults::new();

    // Run tests that don't need hardware
    test_logic(&mut results);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    match Bme280Sensor::new(peripherals.I2C0, peripherals.GPIO8, peripherals.GPIO9) {
        Ok(mut sensor) => test_bme280_sensor(&mut results, &mut sensor),
        Err(e) => {
            esp_println::println!("  I2C0 setup failed: {}", e);
            results.assert(false, "BME280 bus setup");
        }
    }

    let panel = SSD1306Hardware::new(peripherals.I2C1, peripherals.GPIO2, peripherals.GPIO1)
        .and_then(Ssd1306Panel::new);
    match panel {
        Ok(mut display) => test_display(&mut results, &mut display).await,
        Err(e) => {
            esp_println::println!("  Failed to initialize SSD1306: {}", e);
            results.assert(false, "SSD1306 initialization");
        }
    }

    results.print_summary();

    esp_println::println!("\nTest run complete. Looping...");
    loop {
        if results.failed == 0 {
            Timer::after(Duration::from_millis(200)).await;
        } else {
            Timer::after(Duration::from_millis(1000)).await;
        }
    }
}
