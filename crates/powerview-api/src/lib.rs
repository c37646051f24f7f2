// powerview-api: Async Rust client for the PowerView hub HTTP API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::HubClient;
pub use error::Error;
pub use models::{
    Motion, PositionEntry, Shade, ShadeId, ShadePositions, ShadeUpdate, ShadesResponse, UserData,
};
pub use transport::TransportConfig;
