//! Uplink to the time server and InfluxDB over plain HTTP

use core::fmt::Write as _;

use embedded_nal_async::{Dns, TcpConnect};
use heapless::String;
use reqwless::client::HttpClient;
use reqwless::request::{Method, RequestBuilder};

use crate::clock::{self, WallClock};
use crate::config::{Config, InfluxConfig};
use crate::error::{HttpError, TimeError};
use crate::http::Url;
use crate::influx::{self, Metric};
use crate::traits::Uplink;

const RESPONSE_CAPACITY: usize = 1024;

pub struct HttpUplink<'a, T, D>
where
    T: TcpConnect + 'a,
    D: Dns + 'a,
{
    client: HttpClient<'a, T, D>,
    time_server: Url<'static>,
    influx: InfluxConfig,
    buf: [u8; RESPONSE_CAPACITY],
}

impl<'a, T, D> HttpUplink<'a, T, D>
where
    T: TcpConnect + 'a,
    D: Dns + 'a,
{
    pub fn new(tcp: &'a T, dns: &'a D, config: &Config) -> Self {
        Self {
            client: HttpClient::new(tcp, dns),
            time_server: config.time_server,
            influx: config.influx,
            buf: [0; RESPONSE_CAPACITY],
        }
    }
}

impl<'a, T, D> Uplink for HttpUplink<'a, T, D>
where
    T: TcpConnect + 'a,
    D: Dns + 'a,
{
    async fn fetch_time(&mut self) -> Result<WallClock, TimeError> {
        let host = self.time_server.authority()?;
        let headers = [("Connection", "close")];
        let mut request = self
            .client
            .request(Method::GET, self.time_server.as_str())
            .await
            .map_err(HttpError::from)?
            .host(&host)
            .headers(&headers);
        let response = request.send(&mut self.buf).await.map_err(HttpError::from)?;
        if !response.status.is_successful() {
            return Err(HttpError::Status(response.status.0).into());
        }
        let body = response
            .body()
            .read_to_end()
            .await
            .map_err(HttpError::from)?;
        clock::parse(body)
    }

    async fn write_metric(&mut self, metric: &Metric<'_>) -> Result<(), HttpError> {
        let line = metric.line()?;
        let url = influx::write_url(&self.influx.url, self.influx.org, self.influx.bucket)?;
        let host = self.influx.url.authority()?;
        let mut auth: String<160> = String::new();
        write!(auth, "Token {}", self.influx.token).map_err(|_| HttpError::RequestTooLarge)?;
        let headers = [
            ("Authorization", auth.as_str()),
            ("Content-Type", "text/plain; charset=utf-8"),
            ("Connection", "close"),
        ];

        log::info!("[INFLUX] sending {}", line);
        let mut request = self
            .client
            .request(Method::POST, &url)
            .await?
            .host(&host)
            .headers(&headers)
            .body(line.as_bytes());
        let response = request.send(&mut self.buf).await?;
        let status = response.status.0;
        log::info!("[INFLUX] status {}", status);
        if response.status.is_successful() {
            Ok(())
        } else {
            Err(HttpError::Status(status))
        }
    }
}
