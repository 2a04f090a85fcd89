//! Typed payloads carried in [`crate::Frame::data`].
//!
//! - [`chat`]: chat messages (broadcast, private, system) and send requests
//! - [`presence`]: users and join/leave notices
//! - [`session`]: login, room selection, and transport lifecycle payloads

pub mod chat;
pub mod presence;
pub mod session;
