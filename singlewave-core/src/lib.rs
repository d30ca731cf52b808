//! Core of the SingleWave push notification SDK.
//!
//! Registers the device with the SingleWave backend, keeps the device token and
//! custom subscriber data in a host-provided store, and reports notification
//! opens. Platform concerns (permission dialogs, APNs registration, badges)
//! stay in the host behind the traits of [`platform`] and [`storage`].
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod backend;
pub mod config;
pub use config::*;

mod client;
pub use client::*;

pub mod dispatch;

mod error;
pub use error::*;

pub mod logger;
pub mod permissions;
pub mod platform;
pub use platform::*;

pub mod registration;
pub mod storage;
pub mod tracker;

// private modules
mod http_request;

uniffi::setup_scaffolding!("singlewave_core");
