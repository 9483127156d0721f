//! Module: diag
//!
//! Purpose: interrupt-safe decode diagnostics.
//!
//! Blocking output is forbidden inside the decoder's interrupt path, so
//! decode activity is traced as compact typed records into a lock-free
//! ring. The interrupt side pushes in O(1) and drops on overflow; the
//! main loop drains at leisure and formats however it likes.
//!
//! ```text
//! ISR path            DiagStream           main loop
//! ────────            ──────────           ─────────
//! push(event) ──────▶ [e0][e1][e2] ──────▶ drain() → report
//! non-blocking        lock-free ring       blocking ok
//! ```

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Default ring capacity. A frame produces a handful of events; 64
/// covers several frames between drains.
pub const DIAG_BUFFER_SIZE: usize = 64;

/// One decode event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagEvent {
    /// Slot placeholder; never pushed.
    None,
    /// A falling edge armed mid-bit sampling.
    EdgeArmed,
    /// An armed start slot sampled high.
    FalseStart,
    /// A byte came off the wire.
    ByteSampled { value: u8, stop_ok: bool },
    /// The dominant run crossed the break threshold.
    BreakStart,
    /// Break delimiter seen.
    BreakEnd,
    /// The reception window closed on bus silence.
    GapTimeout,
    /// A frame went into the mailbox.
    FramePublished { len: u8 },
    /// A completed window held no bytes; nothing published.
    FrameDiscarded,
    /// Error bits were recorded.
    ErrorRecorded { bits: u8 },
}

impl Default for DiagEvent {
    fn default() -> Self {
        DiagEvent::None
    }
}

/// Lock-free SPSC diagnostics ring.
///
/// # Safety
///
/// `UnsafeCell` slots are safe here because exactly one producer (the
/// interrupt path) writes and exactly one consumer (the main loop)
/// reads, coordinated through the atomic indices: the producer only
/// writes slots the consumer has passed, the consumer only reads slots
/// the producer has released with its index store.
///
/// # Memory Ordering
///
/// Producer stores `write_idx` with `Release` after filling the slot;
/// consumer loads it with `Acquire` before reading. The consumer's own
/// `read_idx` only needs `Release`/`Relaxed` symmetry for the producer's
/// full-check.
pub struct DiagStream<const N: usize = DIAG_BUFFER_SIZE> {
    slots: UnsafeCell<[DiagEvent; N]>,
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: single producer, single consumer, atomic index coordination.
unsafe impl<const N: usize> Sync for DiagStream<N> {}

impl<const N: usize> DiagStream<N> {
    const MASK: usize = N - 1;

    /// Create an empty ring.
    ///
    /// # Panics
    ///
    /// Panics at compile time if N is not a power of 2.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Diag buffer size must be power of 2");

        Self {
            slots: UnsafeCell::new([DiagEvent::None; N]),
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Push an event. Interrupt-safe, never blocks.
    ///
    /// Returns `false` when the ring is full and the event was dropped.
    #[inline]
    pub fn push(&self, event: DiagEvent) -> bool {
        let write = self.write_idx.load(Ordering::Relaxed);
        let read = self.read_idx.load(Ordering::Acquire);

        if write.wrapping_sub(read) >= N as u32 {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        // SAFETY: sole producer; this slot is outside the consumer's
        // published range until the store below.
        unsafe {
            (*self.slots.get())[(write as usize) & Self::MASK] = event;
        }
        self.write_idx.store(write.wrapping_add(1), Ordering::Release);
        true
    }

    /// Pop the oldest event, if any. Main context only.
    #[inline]
    pub fn drain(&self) -> Option<DiagEvent> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        // SAFETY: sole consumer; the producer released this slot with
        // its `write_idx` store.
        let event = unsafe { (*self.slots.get())[(read as usize) & Self::MASK] };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(event)
    }

    /// Events waiting to be drained.
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }

    /// Events dropped because the ring was full.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<const N: usize> Default for DiagStream<N> {
    fn default() -> Self {
        Self::new()
    }
}
