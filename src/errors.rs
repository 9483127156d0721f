//! Error/status register for the decoder.
//!
//! Faults observed while decoding are OR-ed into a single shared
//! bitmask; several can co-occur within one frame attempt. The
//! interrupt side records, the main loop polls with an atomic
//! read-and-clear. Recording a fault never interrupts frame
//! processing and never blocks.

use core::sync::atomic::{AtomicU8, AtomicU32, Ordering};

/// Completed frame had zero data-bearing bytes.
pub const ERROR_FRAME_TOO_SHORT: u8 = 1 << 0;

/// Byte count exceeded capacity before natural completion.
pub const ERROR_FRAME_TOO_LONG: u8 = 1 << 1;

/// Expected low start bit not observed.
pub const ERROR_START_BIT: u8 = 1 << 2;

/// Expected high stop bit not observed.
pub const ERROR_STOP_BIT: u8 = 1 << 3;

/// First byte after a break did not equal the 0x55 sync value.
pub const ERROR_SYNC_BYTE: u8 = 1 << 4;

/// Frame buffer capacity reached mid-reception.
pub const ERROR_BUFFER_OVERRUN: u8 = 1 << 5;

/// Unclassified decode fault (e.g. a pin read failure).
pub const ERROR_OTHER: u8 = 1 << 6;

/// Shared fault bitmask, interrupt producer / main-context consumer.
///
/// # Usage
///
/// ```ignore
/// static ERRORS: ErrorRegister = ErrorRegister::new();
///
/// // In interrupt context:
/// ERRORS.record(ERROR_STOP_BIT);
///
/// // In the main loop:
/// let faults = ERRORS.get_and_clear();
/// if faults != 0 {
///     // report, count, blink...
/// }
/// ```
pub struct ErrorRegister {
    /// Accumulated error bits since the last `get_and_clear`.
    bits: AtomicU8,

    /// Total faults recorded since boot (never cleared).
    count: AtomicU32,
}

impl ErrorRegister {
    /// Create a clear register.
    pub const fn new() -> Self {
        Self {
            bits: AtomicU8::new(0),
            count: AtomicU32::new(0),
        }
    }

    /// OR the given bits into the register.
    ///
    /// Interrupt-safe: a single atomic RMW, never blocks.
    #[inline]
    pub fn record(&self, bits: u8) {
        self.bits.fetch_or(bits, Ordering::Release);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Return the accumulated bits and clear them, atomically.
    ///
    /// A fault recorded concurrently with this call lands either in the
    /// returned mask or in the next one, never in both and never lost.
    #[inline]
    pub fn get_and_clear(&self) -> u8 {
        self.bits.swap(0, Ordering::AcqRel)
    }

    /// Peek at the accumulated bits without clearing.
    #[inline]
    pub fn peek(&self) -> u8 {
        self.bits.load(Ordering::Acquire)
    }

    /// Total faults recorded since boot.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }
}

impl Default for ErrorRegister {
    fn default() -> Self {
        Self::new()
    }
}
