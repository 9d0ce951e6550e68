//! Buffering primitives behind provider streams.

pub mod bridge;
mod ring;

pub use bridge::{BridgeHandle, BridgeReader, BridgeState, BridgeWriter, channel};
pub use ring::RingBuffer;
