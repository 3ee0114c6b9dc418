#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_net::{
    Runner, StackResources,
    dns::DnsSocket,
    tcp::client::{TcpClient, TcpClientState},
};
use embassy_time::{Duration, Timer};
use esp_alloc as _;
use esp_backtrace as _;
use esp_hal::{rng::Rng, timer::timg::TimerGroup};
use esp_radio::{Controller, wifi::WifiDevice};

use roomsense::{
    config::Config,
    display::Ssd1306Panel,
    hardware::{self, Bme280Sensor, SSD1306Hardware},
    net::{self, HTTP_PORT, TcpListener, WifiLink},
    scheduler::{Devices, Scheduler},
    uplink::HttpUplink,
};

const SOCKET_BUFFER: usize = 2048;
const CLIENT_BUFFER: usize = 1024;

esp_bootloader_esp_idf::esp_app_desc!();

macro_rules! mk_static {
    ($t:ty,$val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write(($val));
        x
    }};
}

#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}

async fn park() -> ! {
    loop {
        Timer::after(Duration::from_secs(1)).await;
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) {
    esp_println::logger::init_logger_from_env();
    let peripherals = esp_hal::init(esp_hal::Config::default());
    esp_alloc::heap_allocator!(size: 72 * 1024);

    esp_println::println!("=== Roomsense ===");

    // Initialize RTOS timer for embassy
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            esp_println::println!("[ERROR] {}", e);
            park().await
        }
    };

    // BME280 on GPIO8 (SDA) / GPIO9 (SCL)
    let mut sensor = Bme280Sensor::new(peripherals.I2C0, peripherals.GPIO8, peripherals.GPIO9)
        .expect("I2C0 config");
    // A missing sensor is retried on every read
    let _ = sensor.init();

    // SSD1306 on GPIO2 (SDA) / GPIO1 (SCL), address 0x3C
    let bus = SSD1306Hardware::new(peripherals.I2C1, peripherals.GPIO2, peripherals.GPIO1)
        .expect("I2C1 config");
    let display = match Ssd1306Panel::new(bus) {
        Ok(display) => display,
        Err(e) => {
            esp_println::println!("[ERROR] display init failed: {}", e);
            park().await
        }
    };

    let buttons =
        hardware::button_inputs(peripherals.GPIO0, peripherals.GPIO12, peripherals.GPIO13);

    let radio = &*mk_static!(Controller<'static>, esp_radio::init().expect("radio init"));
    let (mut controller, interfaces) =
        esp_radio::wifi::new(radio, peripherals.WIFI, Default::default()).expect("wifi init");

    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;
    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        embassy_net::Config::dhcpv4(Default::default()),
        mk_static!(StackResources<4>, StackResources::<4>::new()),
        seed,
    );
    if let Err(e) = spawner.spawn(net_task(runner)) {
        esp_println::println!("[ERROR] Failed to spawn net task: {:?}", e);
        park().await
    }

    net::join(&mut controller, config.wifi_ssid, config.wifi_pass).await;
    net::wait_for_ip(stack).await;

    let tcp_state = mk_static!(
        TcpClientState<1, CLIENT_BUFFER, CLIENT_BUFFER>,
        TcpClientState::new()
    );
    let tcp_client = mk_static!(
        TcpClient<'static, 1, CLIENT_BUFFER, CLIENT_BUFFER>,
        TcpClient::new(stack, tcp_state)
    );
    tcp_client.set_timeout(Some(config.net_timeout));
    let dns_socket = mk_static!(DnsSocket<'static>, DnsSocket::new(stack));
    let listener = TcpListener::new(
        stack,
        mk_static!([u8; SOCKET_BUFFER], [0; SOCKET_BUFFER]),
        mk_static!([u8; SOCKET_BUFFER], [0; SOCKET_BUFFER]),
        HTTP_PORT,
    );

    let mut scheduler = Scheduler::new(
        &config,
        Devices {
            buttons,
            sensor,
            display,
            uplink: HttpUplink::new(&*tcp_client, &*dns_socket, &config),
            listener,
            link: WifiLink::new(stack, controller),
        },
    );
    scheduler.run().await
}
