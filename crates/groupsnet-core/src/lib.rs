//! # GroupsNet Core
//!
//! Core traits, types, and errors for GroupsNet static-route forwarding.
//!
//! GroupsNet forwards messages in an opportunistic network along routes that
//! were computed offline. This crate holds the vocabulary shared by the route
//! table, the forwarding policy and any substrate that drives them.
//!
//! ## Key Traits
//!
//! - [`ActiveRouter`]: The contact/transfer substrate the policy is layered on
//!
//! ## Key Types
//!
//! - [`NodeAddress`]: Address of a simulated node
//! - [`OriginId`]: Integer key of a message into the route table
//! - [`Route`]: Shared, immutable set of authorized node addresses
//! - [`Message`]: A buffered message carrying its attached route
//! - [`Candidate`]: A (message, connection) pair eligible for forwarding

pub mod error;
pub mod identity;
pub mod message;
pub mod route;
pub mod traits;

// Re-export main types
pub use error::*;
pub use identity::*;
pub use message::*;
pub use route::*;
pub use traits::*;
