//! drivesync-remote — Drive REST adapter
//!
//! Implements the core's `RemoteStore` port against the Drive HTTP API:
//! an authenticated [`client`], the OAuth2 [`auth`] flows, the [`wire`]
//! DTOs and the [`gateway`] itself.

pub mod auth;
pub mod client;
pub mod gateway;
pub mod wire;

pub use client::DriveClient;
pub use gateway::{DriveGateway, ROOT_ID};
