//! # softlin
//!
//! Software-only LIN bus frame receiver: no hardware UART, one GPIO
//! input line, byte-level serial data reconstructed from raw edge
//! transitions and timer ticks at sub-bit precision.
//!
//! ## Architecture
//!
//! All decode work happens inside two interrupt handlers the platform
//! routes into one [`LinReceiver`]:
//! - The falling-edge interrupt phase-aligns the bit clock.
//! - The timer interrupt samples mid-bit and drives the decode FSMs.
//!
//! Completed frames cross to the main context through the lock-free
//! [`FrameMailbox`]; faults accumulate in the [`ErrorRegister`].
//! Nothing blocks, nothing allocates, all storage is static.
//!
//! Frame content (checksum, ID parity, sync value) is delivered
//! unvalidated; the receiver is built for continuous best-effort
//! operation on a noisy shared bus, where malformed frames are normal
//! and must never wedge reception.

#![cfg_attr(not(test), no_std)]

pub mod assembler;
pub mod diag;
pub mod errors;
pub mod frame;
pub mod mailbox;
pub mod probe;
pub mod receiver;
pub mod sampler;
pub mod timing;

pub use assembler::{FrameAssembler, SYNC_BYTE};
pub use diag::{DiagEvent, DiagStream};
pub use errors::{
    ErrorRegister, ERROR_BUFFER_OVERRUN, ERROR_FRAME_TOO_LONG, ERROR_FRAME_TOO_SHORT,
    ERROR_OTHER, ERROR_START_BIT, ERROR_STOP_BIT, ERROR_SYNC_BYTE,
};
pub use frame::{RxFrame, MAX_FRAME_BYTES, MIN_FRAME_BYTES};
pub use mailbox::FrameMailbox;
pub use probe::{DebugProbe, NoProbe, PinProbe};
pub use receiver::LinReceiver;
pub use sampler::{BitSampler, LineEvent, TimerCtl};
pub use timing::BitTiming;
