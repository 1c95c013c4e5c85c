//! CAN frame and channel types.

use serde::{Deserialize, Serialize};

use crate::consts::FRAME_LEN;

/// CAN bus instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum CanChannel {
    #[default]
    Can1 = 1,
    Can2 = 2,
    Can3 = 3,
}

/// A classic CAN frame with an 8-byte payload buffer.
///
/// `len` is the number of valid payload bytes as received; outbound frames
/// are always full length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CanFrame {
    pub id: u32,
    pub len: u8,
    pub data: [u8; FRAME_LEN],
}

impl CanFrame {
    /// Full-length frame.
    #[inline]
    pub const fn new(id: u32, data: [u8; FRAME_LEN]) -> Self {
        Self {
            id,
            len: FRAME_LEN as u8,
            data,
        }
    }

    /// Frame from a received payload slice.
    ///
    /// Payloads longer than 8 bytes are truncated.
    pub fn from_slice(id: u32, payload: &[u8]) -> Self {
        let len = payload.len().min(FRAME_LEN);
        let mut data = [0u8; FRAME_LEN];
        data[..len].copy_from_slice(&payload[..len]);
        Self {
            id,
            len: len as u8,
            data,
        }
    }

    /// Valid payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.data[..usize::from(self.len).min(FRAME_LEN)]
    }
}
