//! # instrument-types
//!
//! Core types shared by every part of the instrument dashboard: the request
//! and response messages exchanged with a metric store, plus the two small
//! text codecs the dashboard is driven by.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types and codecs work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature to put messages on the wire
//! - **Typed endpoints**: Every request knows its endpoint and its response type
//! - **Parse misses are values**: Codecs return `Option`/enum results, never panic
//!
//! ## Features
//!
//! - `std` (default): Standard library support
//! - `serde`: serialization via serde (used by `instrument-client`)
//!
//! ## Example
//!
//! ```rust
//! use instrument_types::{format_duration, parse_duration, Identifier};
//!
//! let id = Identifier::parse("/net/ifInOctets{hostname=gw,interface=eth0}").unwrap();
//! assert_eq!(id.label("interface"), Some("eth0"));
//!
//! let window = parse_duration("12h").seconds().unwrap();
//! assert_eq!(window, 43_200);
//! assert_eq!(format_duration(window / 2).as_deref(), Some("6h"));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod duration;
mod identifier;
mod messages;
mod sample;

pub use duration::*;
pub use identifier::*;
pub use messages::*;
pub use sample::*;
