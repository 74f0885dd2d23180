//! Client for X/Twitter's private GraphQL API.
//!
//! The platform ships no stable schema: responses embed tweets, users, and
//! pagination cursors at arbitrary depths inside generic object/array trees,
//! tagged by a discriminator field (`__typename`, `cursorType`) rather than
//! located at a fixed path. This crate finds entities by recursive tree
//! search instead of binding to declared response shapes, so minor upstream
//! payload drift does not break deserialization.
//!
//! ## Capabilities
//!
//! ### Guest session (no credentials)
//! - Single tweet and user lookups
//! - A user's primary timeline
//!
//! ### Authenticated session (stored auth token)
//! - Home timeline, search, followers/following
//! - Tweet create/delete, favorites
//!
//! Guest sessions activate a guest token lazily on first use; activation
//! happens at most once per client even under concurrent first calls.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod auth;
mod client;
mod config;
mod entities;
mod error;
mod extract;
mod request;
mod resource;
mod search;

pub use auth::AccessLevel;
pub use client::{Client, ErrorInspector};
pub use config::{Config, RateLimitInfo, RetryConfig};
pub use entities::{Entity, Page, Tweet, User};
pub use error::{Error, Result};
pub use request::{Params, RequestDescriptor};
pub use resource::Resource;
pub use search::search;
