//! Home maintenance tracking: log the upkeep you do on your home, see the
//! value it adds, and look up your address as you type it.
//!
//! A [`session::Session`] ties together the in-memory [`store::Store`] and
//! the [`lookup::AddressLookup`] for one run of the app.

pub mod catalog;
pub mod components;
pub mod config;
pub mod errors;
pub mod geocoding;
pub mod lookup;
pub mod models;
pub mod session;
pub mod store;
pub mod subscription;
