//! DHT11 Sensor Driver for Embedded Rust
//!
//! This crate provides a platform-agnostic, bit-banged driver for the DHT11
//! temperature and humidity sensor, built on top of the [`embedded-hal`] traits.
//!
//! The sensor talks over a single open-drain data line. The host pulls the line
//! low to request a reading, the sensor acknowledges, then clocks out 40 bits
//! whose value is encoded in the width of each high pulse. Every edge is found
//! by polling the pin once per microsecond, and every wait is bounded.
//!
//! # Features
//! - Blocking synchronous API using `embedded-hal` traits
//! - Designed for `no_std` environments
//! - Cycle-counter based microsecond [`Timebase`]
//! - Timings gathered in one [`Timing`] structure
//! - Optional logging support via `defmt`
//!
//! # Dependencies
//! This driver depends on the following `embedded-hal` traits:
//! - [`InputPin`] and [`OutputPin`] for GPIO access, plus [`DataPin`] for
//!   switching direction
//! - [`DelayNs`] for accurate timing, plus [`Monotonic`] to enforce the 2 s
//!   quiet period between reads
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` and emits protocol logs
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//! [`InputPin`]: embedded_hal::digital::InputPin
//! [`OutputPin`]: embedded_hal::digital::OutputPin
//! [`DelayNs`]: embedded_hal::delay::DelayNs

#![cfg_attr(not(test), no_std)]

mod fmt;

pub mod dht11;
pub mod error;
pub mod line;
pub mod reading;
pub mod timebase;
pub mod timing;

pub use dht11::{Dht11, State};
pub use error::DhtError;
pub use line::{DataPin, Line, LineState, OpenDrain};
pub use reading::{RawFrame, Reading};
pub use timebase::{CycleCounter, Monotonic, Timebase};
pub use timing::{AckEndPolicy, Timing};
