//! Module: assembler
//!
//! Purpose: frame assembler. Consumes byte/break/timeout events from
//! the bit-timing engine, accumulates bytes into a frame and publishes
//! completed captures through the mailbox.
//!
//! State machine:
//!
//! ```text
//!        break start          break end            byte (sync, dropped)
//! Idle ──────────────▶ BreakDetected ──────▶ SyncWait ──────────────▶ Receiving
//!  ▲                          ▲                  │                        │
//!  │ gap timeout / overrun    │ break start      │ gap timeout            │ byte
//!  └──────────────────────────┴──────────────────┴────────────────────────┘
//! ```
//!
//! A frame completes on bus silence, on the next break, or when the
//! capacity limit forces it. Completions with at least one byte are
//! published; empty completions are discarded with a fault. A sync
//! mismatch is recorded but never aborts reception; only breaks and
//! overruns cut a frame short.
//!
//! Runs exclusively in interrupt context. O(1) per event, no blocking,
//! no allocation.

use crate::diag::{DiagEvent, DiagStream};
use crate::errors::{
    ErrorRegister, ERROR_BUFFER_OVERRUN, ERROR_FRAME_TOO_LONG, ERROR_FRAME_TOO_SHORT,
    ERROR_SYNC_BYTE,
};
use crate::frame::RxFrame;
use crate::mailbox::FrameMailbox;

/// Baud-sync byte every frame carries after the break. Consumed during
/// decode, never stored.
pub const SYNC_BYTE: u8 = 0x55;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// No reception window open; bytes on the wire are ignored.
    Idle,
    /// Break seen, delimiter not yet.
    BreakDetected,
    /// Next byte is the sync byte.
    SyncWait,
    /// Accumulating ID/data/checksum bytes.
    Receiving,
}

/// The frame assembler.
///
/// Holds the in-progress capture privately; only structurally complete
/// frames ever cross into the mailbox.
pub struct FrameAssembler<'a> {
    state: State,
    frame: RxFrame,
    mailbox: &'a FrameMailbox,
    errors: &'a ErrorRegister,
    diag: &'a DiagStream,
}

impl<'a> FrameAssembler<'a> {
    pub fn new(
        mailbox: &'a FrameMailbox,
        errors: &'a ErrorRegister,
        diag: &'a DiagStream,
    ) -> Self {
        Self {
            state: State::Idle,
            frame: RxFrame::new(),
            mailbox,
            errors,
            diag,
        }
    }

    /// The dominant run crossed the break threshold. Any in-progress
    /// frame is force-completed; a new window opens.
    #[inline]
    pub fn on_break_start(&mut self) {
        if self.window_open() {
            self.complete();
        }
        self.state = State::BreakDetected;
    }

    /// Break delimiter seen; the recovery period is over.
    #[inline]
    pub fn on_break_end(&mut self) {
        if self.state == State::BreakDetected {
            self.state = State::SyncWait;
        }
    }

    /// A byte came off the wire.
    #[inline]
    pub fn on_byte(&mut self, value: u8) {
        match self.state {
            // No window: wire chatter between frames is not ours.
            State::Idle | State::BreakDetected => {}

            State::SyncWait => {
                if value != SYNC_BYTE {
                    self.record(ERROR_SYNC_BYTE);
                }
                // Consumed either way; reception continues.
                self.state = State::Receiving;
            }

            State::Receiving => {
                if !self.frame.push(value) {
                    // Capacity reached mid-reception: flag, force
                    // completion with the stored prefix, close the
                    // window. Later bytes of this over-long frame are
                    // ignored.
                    self.record(ERROR_BUFFER_OVERRUN | ERROR_FRAME_TOO_LONG);
                    self.complete();
                    self.state = State::Idle;
                }
            }
        }
    }

    /// Bus went silent for the timeout window.
    #[inline]
    pub fn on_gap_timeout(&mut self) {
        if self.window_open() {
            self.complete();
        }
        self.state = State::Idle;
    }

    /// True while a break has opened a reception window.
    #[inline]
    fn window_open(&self) -> bool {
        matches!(self.state, State::SyncWait | State::Receiving)
    }

    /// Publish the capture if it meets the minimum, else discard it
    /// with a fault. The working buffer is clear afterwards.
    fn complete(&mut self) {
        if self.frame.is_publishable() {
            self.mailbox.publish(&self.frame);
            self.diag.push(DiagEvent::FramePublished {
                len: self.frame.len() as u8,
            });
        } else {
            self.record(ERROR_FRAME_TOO_SHORT);
            self.diag.push(DiagEvent::FrameDiscarded);
        }
        self.frame.clear();
    }

    fn record(&self, bits: u8) {
        self.errors.record(bits);
        self.diag.push(DiagEvent::ErrorRecorded { bits });
    }
}
