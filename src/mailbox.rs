//! Module: mailbox
//!
//! Purpose: lock-free hand-off of completed frames from interrupt
//! context to the main program.
//!
//! ```text
//! decoder (ISR) ──publish──▶ FrameMailbox ──read_next_frame──▶ main loop
//!                            (seqlock slot)
//! ```
//!
//! The producer runs inside interrupt handlers and must never wait;
//! the consumer polls from the main context and must never observe a
//! half-written frame. A single sequence-locked slot gives both: the
//! publish is wait-free, and the reader re-copies on the (rare) torn
//! read instead of taking a lock. A frame published before the
//! previous one was consumed replaces it; the reader always gets the
//! newest complete capture.
//!
//! # Memory Ordering
//!
//! - `publish` bumps `seq` to odd with `AcqRel`, writes the slot, bumps
//!   back to even with `Release`, then sets `fresh` with `Release`.
//! - `read_next_frame` consumes `fresh` with `AcqRel`, then copies the
//!   slot between two `Acquire` loads of `seq`; equal even values mean
//!   the copy saw a stable slot.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::frame::RxFrame;

/// Single-slot frame hand-off.
///
/// # Safety
///
/// This type uses `UnsafeCell` internally but is safe to use because:
/// - Exactly one producer (the decoder, in interrupt context) writes
///   the slot, bracketed by sequence bumps.
/// - The consumer never dereferences the slot without validating the
///   sequence around its copy.
/// - All coordination is through atomics; neither side blocks.
pub struct FrameMailbox {
    /// Odd while the producer is writing, even while stable.
    seq: AtomicU32,

    /// A frame has been published since the last successful read.
    fresh: AtomicBool,

    /// Frames published while `fresh` was still set (consumer lagged).
    overwritten: AtomicU32,

    slot: UnsafeCell<RxFrame>,
}

// SAFETY: single interrupt-context producer, single main-context
// consumer, all slot access validated through `seq`.
unsafe impl Sync for FrameMailbox {}

impl FrameMailbox {
    /// Create an empty mailbox. Usable as a `static`.
    pub const fn new() -> Self {
        Self {
            seq: AtomicU32::new(0),
            fresh: AtomicBool::new(false),
            overwritten: AtomicU32::new(0),
            slot: UnsafeCell::new(RxFrame::new()),
        }
    }

    /// Publish a completed frame. Interrupt context only.
    ///
    /// O(1), wait-free: one 11-byte copy plus a handful of atomic
    /// operations. An unread previous frame is replaced (latest wins).
    #[inline]
    pub fn publish(&self, frame: &RxFrame) {
        self.seq.fetch_add(1, Ordering::AcqRel);
        // SAFETY: sole producer; `seq` is odd, readers will retry.
        unsafe {
            *self.slot.get() = *frame;
        }
        self.seq.fetch_add(1, Ordering::Release);
        if self.fresh.swap(true, Ordering::Release) {
            self.overwritten.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Copy the newest unread frame into `out`. Main context only.
    ///
    /// Returns `true` and fills `out` when a frame was published since
    /// the last successful read; otherwise returns `false` and leaves
    /// `out` untouched. Safe to poll repeatedly.
    #[inline]
    pub fn read_next_frame(&self, out: &mut RxFrame) -> bool {
        if !self.fresh.swap(false, Ordering::AcqRel) {
            return false;
        }
        loop {
            let before = self.seq.load(Ordering::Acquire);
            if before & 1 == 0 {
                // SAFETY: the copy is discarded unless `seq` proves the
                // slot was stable for its whole duration.
                let copy = unsafe { *self.slot.get() };
                if self.seq.load(Ordering::Acquire) == before {
                    *out = copy;
                    return true;
                }
            }
            // Producer mid-publish; it cannot be preempted by us, so
            // the retry is bounded by one frame copy.
            core::hint::spin_loop();
        }
    }

    /// Whether an unread frame is waiting.
    #[inline]
    pub fn has_frame(&self) -> bool {
        self.fresh.load(Ordering::Acquire)
    }

    /// Frames replaced before the consumer read them.
    #[inline]
    pub fn overwritten(&self) -> u32 {
        self.overwritten.load(Ordering::Relaxed)
    }
}

impl Default for FrameMailbox {
    fn default() -> Self {
        Self::new()
    }
}
