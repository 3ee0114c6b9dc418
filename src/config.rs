//! Startup configuration.
//!
//! Values are baked in at compile time from environment variables (see
//! `build.rs` for the `roomsense.local.env` convenience file). Everything is
//! validated once; a missing or malformed key is the only fatal error in the
//! firmware.

use embassy_time::Duration;

use crate::error::ConfigError;
use crate::http::Url;
use crate::model::TemperatureUnit;

#[derive(Debug, Clone, Copy)]
pub struct InfluxConfig {
    pub url: Url<'static>,
    pub org: &'static str,
    pub bucket: &'static str,
    pub token: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub wifi_ssid: &'static str,
    pub wifi_pass: &'static str,
    pub time_server: Url<'static>,
    pub influx: InfluxConfig,
    /// Host tag on every metric
    pub host: &'static str,
    /// Room tag on every metric, also shown in the footer
    pub room: &'static str,
    pub unit: TemperatureUnit,
    /// Sending button also flips the footer between room and IP
    pub couple_footer: bool,
    pub update_interval: Duration,
    pub tick: Duration,
    pub debounce: Duration,
    /// Hold for the sending button, which settles slower than the others
    pub sending_debounce: Duration,
    pub accept_window: Duration,
    pub net_timeout: Duration,
}

impl Config {
    /// Configuration compiled into the firmware image
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match key {
            "WIFI_SSID" => option_env!("WIFI_SSID"),
            "WIFI_PASS" => option_env!("WIFI_PASS"),
            "TIME_SERVER_URL" => option_env!("TIME_SERVER_URL"),
            "INFLUX_URL" => option_env!("INFLUX_URL"),
            "INFLUX_ORG" => option_env!("INFLUX_ORG"),
            "INFLUX_BUCKET" => option_env!("INFLUX_BUCKET"),
            "INFLUX_TOKEN" => option_env!("INFLUX_TOKEN"),
            "SENSOR_HOST" => option_env!("SENSOR_HOST"),
            "SENSOR_ROOM" => option_env!("SENSOR_ROOM"),
            "ROOMSENSE_UNIT" => option_env!("ROOMSENSE_UNIT"),
            "ROOMSENSE_COUPLE_FOOTER" => option_env!("ROOMSENSE_COUPLE_FOOTER"),
            "ROOMSENSE_UPDATE_SECS" => option_env!("ROOMSENSE_UPDATE_SECS"),
            "ROOMSENSE_TICK_MS" => option_env!("ROOMSENSE_TICK_MS"),
            "ROOMSENSE_DEBOUNCE_MS" => option_env!("ROOMSENSE_DEBOUNCE_MS"),
            "ROOMSENSE_SENDING_DEBOUNCE_MS" => option_env!("ROOMSENSE_SENDING_DEBOUNCE_MS"),
            "ROOMSENSE_ACCEPT_MS" => option_env!("ROOMSENSE_ACCEPT_MS"),
            "ROOMSENSE_NET_TIMEOUT_MS" => option_env!("ROOMSENSE_NET_TIMEOUT_MS"),
            _ => None,
        })
    }

    /// Build and validate from an arbitrary key source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<&'static str>,
    {
        let required = |key: &'static str| match lookup(key) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(ConfigError::Missing(key)),
        };
        let url = |key: &'static str| {
            required(key).and_then(|value| Url::parse(value).ok_or(ConfigError::BadUrl(key)))
        };
        let number = |key: &'static str, default: u64| match lookup(key) {
            None | Some("") => Ok(default),
            Some(value) => value.trim().parse::<u64>().map_err(|_| ConfigError::BadValue(key)),
        };

        let unit = match lookup("ROOMSENSE_UNIT") {
            None | Some("") | Some("F") | Some("f") => TemperatureUnit::Fahrenheit,
            Some("C") | Some("c") => TemperatureUnit::Celsius,
            Some(_) => return Err(ConfigError::BadValue("ROOMSENSE_UNIT")),
        };
        let couple_footer = match number("ROOMSENSE_COUPLE_FOOTER", 0)? {
            0 => false,
            1 => true,
            _ => return Err(ConfigError::BadValue("ROOMSENSE_COUPLE_FOOTER")),
        };
        let update_secs = number("ROOMSENSE_UPDATE_SECS", 60)?;
        if update_secs == 0 {
            return Err(ConfigError::BadValue("ROOMSENSE_UPDATE_SECS"));
        }

        Ok(Self {
            wifi_ssid: required("WIFI_SSID")?,
            wifi_pass: lookup("WIFI_PASS").ok_or(ConfigError::Missing("WIFI_PASS"))?,
            time_server: url("TIME_SERVER_URL")?,
            influx: InfluxConfig {
                url: url("INFLUX_URL")?,
                org: required("INFLUX_ORG")?,
                bucket: required("INFLUX_BUCKET")?,
                token: required("INFLUX_TOKEN")?,
            },
            host: required("SENSOR_HOST")?,
            room: required("SENSOR_ROOM")?,
            unit,
            couple_footer,
            update_interval: Duration::from_secs(update_secs),
            tick: Duration::from_millis(number("ROOMSENSE_TICK_MS", 50)?),
            debounce: Duration::from_millis(number("ROOMSENSE_DEBOUNCE_MS", 200)?),
            sending_debounce: Duration::from_millis(number("ROOMSENSE_SENDING_DEBOUNCE_MS", 400)?),
            accept_window: Duration::from_millis(number("ROOMSENSE_ACCEPT_MS", 100)?),
            net_timeout: Duration::from_millis(number("ROOMSENSE_NET_TIMEOUT_MS", 10_000)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(key: &'static str) -> Option<&'static str> {
        match key {
            "WIFI_SSID" => Some("home"),
            "WIFI_PASS" => Some("secret"),
            "TIME_SERVER_URL" => Some("http://time.lan:8000/now"),
            "INFLUX_URL" => Some("http://influx.lan:8086"),
            "INFLUX_ORG" => Some("house"),
            "INFLUX_BUCKET" => Some("climate"),
            "INFLUX_TOKEN" => Some("tok"),
            "SENSOR_HOST" => Some("sensor-1"),
            "SENSOR_ROOM" => Some("Office"),
            _ => None,
        }
    }

    #[test]
    fn defaults_apply_when_tunables_absent() {
        let config = Config::from_lookup(base).unwrap();
        assert_eq!(config.unit, TemperatureUnit::Fahrenheit);
        assert!(!config.couple_footer);
        assert_eq!(config.update_interval, Duration::from_secs(60));
        assert_eq!(config.tick, Duration::from_millis(50));
        assert_eq!(config.debounce, Duration::from_millis(200));
        assert_eq!(config.sending_debounce, Duration::from_millis(400));
        assert_eq!(config.accept_window, Duration::from_millis(100));
        assert_eq!(config.net_timeout, Duration::from_millis(10_000));
        assert_eq!(config.time_server.host, "time.lan");
        assert_eq!(config.time_server.port, 8000);
        assert_eq!(config.influx.url.port, 8086);
    }

    #[test]
    fn tunables_override_defaults() {
        let config = Config::from_lookup(|key| match key {
            "ROOMSENSE_UNIT" => Some("C"),
            "ROOMSENSE_COUPLE_FOOTER" => Some("1"),
            "ROOMSENSE_UPDATE_SECS" => Some("30"),
            "ROOMSENSE_TICK_MS" => Some("20"),
            "ROOMSENSE_SENDING_DEBOUNCE_MS" => Some("600"),
            other => base(other),
        })
        .unwrap();
        assert_eq!(config.unit, TemperatureUnit::Celsius);
        assert!(config.couple_footer);
        assert_eq!(config.update_interval, Duration::from_secs(30));
        assert_eq!(config.tick, Duration::from_millis(20));
        assert_eq!(config.sending_debounce, Duration::from_millis(600));
        assert_eq!(config.debounce, Duration::from_millis(200));
    }

    #[test]
    fn missing_credentials_are_fatal() {
        let result = Config::from_lookup(|key| match key {
            "INFLUX_TOKEN" => None,
            other => base(other),
        });
        assert_eq!(result.err(), Some(ConfigError::Missing("INFLUX_TOKEN")));
    }

    #[test]
    fn open_network_allows_empty_password() {
        let config = Config::from_lookup(|key| match key {
            "WIFI_PASS" => Some(""),
            other => base(other),
        })
        .unwrap();
        assert_eq!(config.wifi_pass, "");
    }

    #[test]
    fn https_urls_are_rejected() {
        let result = Config::from_lookup(|key| match key {
            "INFLUX_URL" => Some("https://cloud.influx.example"),
            other => base(other),
        });
        assert_eq!(result.err(), Some(ConfigError::BadUrl("INFLUX_URL")));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let result = Config::from_lookup(|key| match key {
            "ROOMSENSE_TICK_MS" => Some("fast"),
            other => base(other),
        });
        assert_eq!(result.err(), Some(ConfigError::BadValue("ROOMSENSE_TICK_MS")));

        let zero = Config::from_lookup(|key| match key {
            "ROOMSENSE_UPDATE_SECS" => Some("0"),
            other => base(other),
        });
        assert_eq!(zero.err(), Some(ConfigError::BadValue("ROOMSENSE_UPDATE_SECS")));
    }
}
