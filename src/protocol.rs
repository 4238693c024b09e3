mod auth;
mod capabilities;
mod packet;

pub(crate) mod auth_plugin;
pub(crate) mod connect;
pub(crate) mod response;
pub(crate) mod text;

pub(crate) use auth::{AuthReply, AuthResponse};
pub(crate) use capabilities::Capabilities;
pub(crate) use packet::Packet;

/// Largest payload a single wire packet can carry; larger payloads are split.
pub(crate) const MAX_PACKET_SIZE: usize = 0xff_ff_ff;
