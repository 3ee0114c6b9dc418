//! InfluxDB v2 line-protocol writes

use core::fmt::Write;

use heapless::String;

use crate::error::HttpError;
use crate::http::Url;

pub const LINE_CAPACITY: usize = 192;
pub const URL_CAPACITY: usize = 256;

/// One measurement sample, tagged with where it came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metric<'a> {
    pub measurement: &'a str,
    pub host: &'a str,
    pub room: &'a str,
    pub value: f32,
}

impl Metric<'_> {
    /// `{measurement},host={host},room={room} value={value:.2}`
    pub fn line(&self) -> Result<String<LINE_CAPACITY>, HttpError> {
        let mut line = String::new();
        write_escaped(&mut line, self.measurement).map_err(|_| HttpError::RequestTooLarge)?;
        line.push_str(",host=").map_err(|_| HttpError::RequestTooLarge)?;
        write_escaped(&mut line, self.host).map_err(|_| HttpError::RequestTooLarge)?;
        line.push_str(",room=").map_err(|_| HttpError::RequestTooLarge)?;
        write_escaped(&mut line, self.room).map_err(|_| HttpError::RequestTooLarge)?;
        write!(line, " value={:.2}", self.value).map_err(|_| HttpError::RequestTooLarge)?;
        Ok(line)
    }
}

// Commas, spaces and equals signs are separators in measurement and tag text.
fn write_escaped<const N: usize>(out: &mut String<N>, raw: &str) -> Result<(), ()> {
    for c in raw.chars() {
        if matches!(c, ',' | ' ' | '=') {
            out.push('\\').map_err(|_| ())?;
        }
        out.push(c).map_err(|_| ())?;
    }
    Ok(())
}

/// Write endpoint for `bucket` with second precision
pub fn write_url(
    base: &Url<'_>,
    org: &str,
    bucket: &str,
) -> Result<String<URL_CAPACITY>, HttpError> {
    let mut url = String::new();
    write!(
        url,
        "http://{}{}/api/v2/write?org={}&bucket={}&precision=s",
        base.authority()?,
        base.base_path(),
        org,
        bucket
    )
    .map_err(|_| HttpError::RequestTooLarge)?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_has_tags_and_two_decimals() {
        let metric = Metric {
            measurement: "temperature",
            host: "sensor-3",
            room: "Office",
            value: 72.456,
        };
        assert_eq!(
            metric.line().unwrap().as_str(),
            "temperature,host=sensor-3,room=Office value=72.46"
        );
    }

    #[test]
    fn tag_separators_are_escaped() {
        let metric = Metric {
            measurement: "humidity",
            host: "s1",
            room: "Living Room",
            value: 40.0,
        };
        assert_eq!(
            metric.line().unwrap().as_str(),
            "humidity,host=s1,room=Living\\ Room value=40.00"
        );
    }

    #[test]
    fn write_url_joins_base_path() {
        let base = Url::parse("http://influx.lan:8086").unwrap();
        assert_eq!(
            write_url(&base, "home", "climate").unwrap().as_str(),
            "http://influx.lan:8086/api/v2/write?org=home&bucket=climate&precision=s"
        );

        let prefixed = Url::parse("http://proxy.lan/influx/").unwrap();
        assert_eq!(
            write_url(&prefixed, "home", "climate").unwrap().as_str(),
            "http://proxy.lan/influx/api/v2/write?org=home&bucket=climate&precision=s"
        );
    }
}
