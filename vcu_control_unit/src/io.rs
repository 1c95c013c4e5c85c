//! Ports to the transport and output drivers.
//!
//! The core only sees these traits: frame transmission, discrete outputs,
//! the buzzer PWM and the inbound frame queue. Hardware bindings implement
//! them outside the core; [`RecordingIo`] records every call for tests and
//! [`crate::sim::SimBus`] closes the loop with the simulation plant.

use std::collections::VecDeque;

use static_assertions::const_assert;
use thiserror::Error;
use tracing::debug;

use vcu_common::consts::{NUM_INVERTERS, NUM_LIVENESS_NODES};
use vcu_common::protocol::frame::{CanChannel, CanFrame};

/// Capacity of the inbound frame queue.
///
/// Six nodes at one frame per tick each plus the status-B traffic fits with
/// room for a late tick.
pub const INBOUND_CAPACITY: usize = 64;

// Two full ticks of traffic, status B included.
const_assert!(INBOUND_CAPACITY >= 2 * (NUM_LIVENESS_NODES + NUM_INVERTERS));

/// Bounded inbound frame queue filled by the receive path and drained once per tick.
pub type InboundQueue = heapless::Deque<CanFrame, INBOUND_CAPACITY>;

// ─── Errors ─────────────────────────────────────────────────────────

/// Transport refused a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TxError {
    #[error("transmit mailbox full on {0:?}")]
    MailboxFull(CanChannel),
    #[error("bus off on {0:?}")]
    BusOff(CanChannel),
}

// ─── Ports ──────────────────────────────────────────────────────────

/// Frame transmission.
pub trait FrameSink {
    fn send_frame(&mut self, channel: CanChannel, frame: &CanFrame) -> Result<(), TxError>;
}

/// Discrete outputs driven by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Indicator {
    StageInitLamp = 0,
    StagePreDriveLamp = 1,
    StageDriveLamp = 2,
    BrakeLight = 3,
    /// BE1, gates traction power.
    MainContactor = 4,
}

impl Indicator {
    pub const ALL: [Self; 5] = [
        Self::StageInitLamp,
        Self::StagePreDriveLamp,
        Self::StageDriveLamp,
        Self::BrakeLight,
        Self::MainContactor,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    On,
    Off,
    Toggle,
}

impl From<bool> for Level {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

pub trait Indicators {
    fn set_indicator(&mut self, indicator: Indicator, level: Level);
}

/// PWM buzzer.
pub trait Buzzer {
    fn start_tone(&mut self, freq_hz: u32, duty_pct: f32);
    fn stop_tone(&mut self);
}

/// Everything the core drives.
pub trait VehicleIo: FrameSink + Indicators + Buzzer {}

impl<T: FrameSink + Indicators + Buzzer> VehicleIo for T {}

/// Inbound frames, popped until empty once per tick.
pub trait FrameSource {
    fn pop(&mut self) -> Option<CanFrame>;
}

impl<const N: usize> FrameSource for heapless::Deque<CanFrame, N> {
    #[inline]
    fn pop(&mut self) -> Option<CanFrame> {
        self.pop_front()
    }
}

impl FrameSource for VecDeque<CanFrame> {
    #[inline]
    fn pop(&mut self) -> Option<CanFrame> {
        self.pop_front()
    }
}

// ─── Counters ───────────────────────────────────────────────────────

/// Transport counters kept by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct IoCounters {
    /// Frames decoded and applied to the store.
    pub rx_frames: u64,
    /// Frames with an ID the core does not handle.
    pub rx_ignored: u64,
    /// Frames too short for their message.
    pub rx_malformed: u64,
    /// Transmissions refused by the transport.
    pub tx_dropped: u64,
}

/// Send one frame, counting and dropping it on failure.
pub(crate) fn send_or_drop<IO: FrameSink + ?Sized>(
    io: &mut IO,
    channel: CanChannel,
    frame: &CanFrame,
    counters: &mut IoCounters,
) {
    if let Err(e) = io.send_frame(channel, frame) {
        counters.tx_dropped += 1;
        debug!(id = frame.id, error = %e, "frame dropped");
    }
}

// ─── Recording double ───────────────────────────────────────────────

/// One recorded output call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IoEvent {
    Frame { channel: CanChannel, frame: CanFrame },
    Indicator { indicator: Indicator, level: Level },
    ToneStart { freq_hz: u32, duty_pct: f32 },
    ToneStop,
}

/// Output port that records every call and tracks the resulting output levels.
#[derive(Debug, Clone, Default)]
pub struct RecordingIo {
    pub events: Vec<IoEvent>,
    outputs: [bool; 5],
    tone: bool,
    /// When set, every `send_frame` fails with `MailboxFull`.
    pub fail_sends: bool,
}

impl RecordingIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget recorded events; output levels are kept.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Current level of an output after all recorded calls.
    pub fn is_on(&self, indicator: Indicator) -> bool {
        self.outputs[indicator as usize]
    }

    pub fn tone_active(&self) -> bool {
        self.tone
    }

    /// Frames sent, in order.
    pub fn frames(&self) -> impl Iterator<Item = &CanFrame> + '_ {
        self.events.iter().filter_map(|e| match e {
            IoEvent::Frame { frame, .. } => Some(frame),
            _ => None,
        })
    }

    /// Frames sent with the given ID, in order.
    pub fn frames_with_id(&self, id: u32) -> Vec<CanFrame> {
        self.frames().filter(|f| f.id == id).copied().collect()
    }

    pub fn tone_starts(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, IoEvent::ToneStart { .. }))
            .count()
    }

    pub fn tone_stops(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, IoEvent::ToneStop))
            .count()
    }

    /// Number of calls that touched `indicator` with `level`.
    pub fn indicator_calls(&self, indicator: Indicator, level: Level) -> usize {
        self.events
            .iter()
            .filter(|e| {
                matches!(e, IoEvent::Indicator { indicator: i, level: l } if *i == indicator && *l == level)
            })
            .count()
    }
}

impl FrameSink for RecordingIo {
    fn send_frame(&mut self, channel: CanChannel, frame: &CanFrame) -> Result<(), TxError> {
        if self.fail_sends {
            return Err(TxError::MailboxFull(channel));
        }
        self.events.push(IoEvent::Frame {
            channel,
            frame: *frame,
        });
        Ok(())
    }
}

impl Indicators for RecordingIo {
    fn set_indicator(&mut self, indicator: Indicator, level: Level) {
        let slot = &mut self.outputs[indicator as usize];
        *slot = match level {
            Level::On => true,
            Level::Off => false,
            Level::Toggle => !*slot,
        };
        self.events.push(IoEvent::Indicator { indicator, level });
    }
}

impl Buzzer for RecordingIo {
    fn start_tone(&mut self, freq_hz: u32, duty_pct: f32) {
        self.tone = true;
        self.events.push(IoEvent::ToneStart { freq_hz, duty_pct });
    }

    fn stop_tone(&mut self) {
        self.tone = false;
        self.events.push(IoEvent::ToneStop);
    }
}
