#![cfg_attr(not(test), no_std)]

pub mod clock;
pub mod config;
pub mod controls;
pub mod error;
pub mod http;
pub mod influx;
pub mod input;
pub mod model;
pub mod responder;
pub mod scheduler;
pub mod screen;
pub mod telemetry;
pub mod traits;
pub mod uplink;

#[cfg(target_arch = "xtensa")]
pub mod display;
#[cfg(target_arch = "xtensa")]
pub mod hardware;
#[cfg(target_arch = "xtensa")]
pub mod net;

#[cfg(test)]
mod testing;
