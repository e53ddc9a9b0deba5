#![allow(dead_code)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// #![warn(clippy::cargo)]

pub mod calibration;
pub mod config;
pub mod error;
pub mod math;
pub mod metrics;
pub mod regression;
pub mod sample;
pub mod theory;
pub mod units;

pub type Result<T> = ::std::result::Result<T, error::Error>;
