//! `http://` URLs for the outbound services

use core::fmt::Write as _;

use heapless::String;

use crate::error::HttpError;

pub const AUTHORITY_CAPACITY: usize = 72;

/// Parsed `http://` URL borrowing the original string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Url<'a> {
    raw: &'a str,
    pub host: &'a str,
    pub port: u16,
    /// Path plus query, always starting with `/`
    pub target: &'a str,
}

impl<'a> Url<'a> {
    pub fn parse(url: &'a str) -> Option<Self> {
        let rest = url.strip_prefix("http://")?;
        let (authority, target) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, "/"),
        };
        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => (host, port.parse().ok()?),
            None => (authority, 80),
        };
        if host.is_empty() {
            return None;
        }
        Some(Self {
            raw: url,
            host,
            port,
            target,
        })
    }

    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    /// `Host` header value: the port is only spelled out when it is not 80
    pub fn authority(&self) -> Result<String<AUTHORITY_CAPACITY>, HttpError> {
        let mut authority = String::new();
        let written = if self.port == 80 {
            write!(authority, "{}", self.host)
        } else {
            write!(authority, "{}:{}", self.host, self.port)
        };
        written.map_err(|_| HttpError::RequestTooLarge)?;
        Ok(authority)
    }

    /// Target path with its trailing slash removed, for appending sub-paths
    pub fn base_path(&self) -> &'a str {
        let path = match self.target.find('?') {
            Some(i) => &self.target[..i],
            None => self.target,
        };
        path.trim_end_matches('/')
    }
}
