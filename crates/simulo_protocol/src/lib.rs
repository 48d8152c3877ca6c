//! # Simulo Protocol
//!
//! Binary event stream from the host into the runtime.
//!
//! ## Wire Format
//!
//! A flat sequence of records, each starting with a one-byte tag. All
//! multi-byte fields are big-endian.
//!
//! ```text
//! tag 0  pose upsert      [0][id: u32][17 x (x: i16, y: i16)]   73 bytes
//! tag 1  pose delete      [1][id: u32]                            5 bytes
//! tag 2  viewport resize  [2][width: u16][height: u16]            5 bytes
//! ```
//!
//! Any other tag is an unrecoverable protocol error. A record whose fixed
//! size runs past the end of the span is an error too; partial records are
//! never carried over to the next poll.
//!
//! ## Example
//!
//! ```rust,ignore
//! use simulo_protocol::{decode_events, EventEncoder, HostEvent};
//!
//! let mut encoder = EventEncoder::new();
//! encoder.write_pose_delete(42);
//! encoder.write_viewport_resize(800, 600);
//!
//! let events = decode_events(encoder.as_slice())?;
//! assert_eq!(events[0], HostEvent::PoseDelete { id: 42 });
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod event;

pub use decoder::{decode_events, decode_into, EventDecoder};
pub use encoder::EventEncoder;
pub use error::{DecodeError, DecodeResult};
pub use event::{EventTag, HostEvent, POSE_DELETE_LEN, POSE_UPSERT_LEN, VIEWPORT_RESIZE_LEN};
