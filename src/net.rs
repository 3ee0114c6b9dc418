//! Wi-Fi station bring-up and the inbound TCP listener over embassy-net

use core::net::Ipv4Addr;

use embassy_net::{
    Stack,
    tcp::{State, TcpSocket},
};
use embassy_time::{Duration, Timer};
use embedded_io_async::{ErrorType, Read, Write};
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController};

use crate::error::NetError;
use crate::traits::{Connection, LinkInfo, Listener};

pub const HTTP_PORT: u16 = 80;
const RETRY_DELAY: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Configure station mode and keep trying until the AP accepts us
pub async fn join(controller: &mut WifiController<'static>, ssid: &str, password: &str) {
    let client_config = ModeConfig::Client(
        ClientConfig::default()
            .with_ssid(ssid.into())
            .with_password(password.into()),
    );
    loop {
        if !matches!(controller.is_started(), Ok(true)) {
            if let Err(e) = controller.set_config(&client_config) {
                log::warn!("[WIFI] config rejected: {:?}", e);
                Timer::after(RETRY_DELAY).await;
                continue;
            }
            if let Err(e) = controller.start_async().await {
                log::warn!("[WIFI] start failed: {:?}", e);
                Timer::after(RETRY_DELAY).await;
                continue;
            }
            log::info!("[WIFI] started");
        }

        log::info!("[WIFI] connecting to {}", ssid);
        match controller.connect_async().await {
            Ok(()) => {
                log::info!("[WIFI] connected to {}", ssid);
                return;
            }
            Err(e) => {
                log::warn!("[WIFI] connect failed: {:?}, retrying", e);
                Timer::after(RETRY_DELAY).await;
            }
        }
    }
}

/// Wait for link and a DHCP lease
pub async fn wait_for_ip(stack: Stack<'static>) -> Ipv4Addr {
    while !stack.is_link_up() {
        Timer::after(POLL_INTERVAL).await;
    }
    log::info!("[WIFI] link up");
    loop {
        if let Some(config) = stack.config_v4() {
            let address = config.address.address();
            log::info!("[WIFI] IP address: {}", address);
            return address;
        }
        Timer::after(POLL_INTERVAL).await;
    }
}

/// A connection borrowed from a long-lived socket
pub struct TcpStream<'a> {
    socket: &'a mut TcpSocket<'static>,
}

impl ErrorType for TcpStream<'_> {
    type Error = NetError;
}

impl Read for TcpStream<'_> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, NetError> {
        self.socket.read(buf).await.map_err(|_| NetError::Read)
    }
}

impl Write for TcpStream<'_> {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, NetError> {
        self.socket.write(buf).await.map_err(|_| NetError::Write)
    }

    async fn flush(&mut self) -> Result<(), NetError> {
        self.socket.flush().await.map_err(|_| NetError::Write)
    }
}

impl Connection for TcpStream<'_> {
    async fn close(&mut self) {
        self.socket.close();
        // Waits for the FIN to be acknowledged
        let _ = self.socket.flush().await;
    }
}

/// Inbound listener that stays in LISTEN between accept windows
pub struct TcpListener {
    socket: TcpSocket<'static>,
    port: u16,
}

impl TcpListener {
    pub fn new(
        stack: Stack<'static>,
        rx_buffer: &'static mut [u8],
        tx_buffer: &'static mut [u8],
        port: u16,
    ) -> Self {
        let mut socket = TcpSocket::new(stack, rx_buffer, tx_buffer);
        socket.set_timeout(Some(Duration::from_secs(5)));
        Self { socket, port }
    }
}

impl Listener for TcpListener {
    type Conn<'a>
        = TcpStream<'a>
    where
        Self: 'a;

    async fn accept(&mut self) -> Result<TcpStream<'_>, NetError> {
        loop {
            match self.socket.state() {
                State::Closed | State::Listen => {
                    self.socket.accept(self.port).await.map_err(|e| {
                        log::warn!("[HTTP] accept failed: {:?}", e);
                        NetError::Accept
                    })?;
                    break;
                }
                // Handshake started during an earlier window
                State::SynReceived => Timer::after_millis(5).await,
                State::Established => break,
                // Leftover from the last serviced client
                _ => self.socket.abort(),
            }
        }
        Ok(TcpStream {
            socket: &mut self.socket,
        })
    }
}

/// Station address and signal strength
pub struct WifiLink {
    stack: Stack<'static>,
    controller: WifiController<'static>,
}

impl WifiLink {
    pub fn new(stack: Stack<'static>, controller: WifiController<'static>) -> Self {
        Self { stack, controller }
    }
}

impl LinkInfo for WifiLink {
    fn ipv4(&self) -> Option<[u8; 4]> {
        self.stack
            .config_v4()
            .map(|config| config.address.address().octets())
    }

    fn rssi(&mut self) -> Option<i32> {
        match self.controller.rssi() {
            Ok(rssi) => Some(rssi),
            Err(e) => {
                log::warn!("[WIFI] RSSI unavailable: {:?}", e);
                None
            }
        }
    }
}
