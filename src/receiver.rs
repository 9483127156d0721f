//! Module: receiver
//!
//! Purpose: the decoder context object. Owns the bit-timing engine,
//! the frame assembler, the bus input pin and the debug probe; the
//! platform registers its two interrupt handlers to call into it.
//!
//! ```text
//! edge ISR ──▶ on_falling_edge() ─┐
//!                                 ├─▶ BitSampler ─▶ FrameAssembler ─▶ FrameMailbox
//! timer ISR ─▶ on_bit_tick() ─────┘        │                               │
//!                                          ▼                               ▼
//!                                    ErrorRegister ◀── main loop ──▶ read_next_frame
//! ```
//!
//! Both entry points are O(1), never block and never allocate. Nothing
//! in here propagates an error: a pin read failure records the
//! unclassified fault bit and decoding carries on. The mailbox, the
//! error register and the diag ring are the only state shared with the
//! main context; everything else is owned here and touched exclusively
//! from interrupt context.

use embedded_hal::digital::InputPin;

use crate::assembler::FrameAssembler;
use crate::diag::{DiagEvent, DiagStream};
use crate::errors::{ErrorRegister, ERROR_OTHER, ERROR_START_BIT, ERROR_STOP_BIT};
use crate::mailbox::FrameMailbox;
use crate::probe::DebugProbe;
use crate::sampler::{BitSampler, LineEvent, TimerCtl};
use crate::timing::BitTiming;

/// Software LIN receiver.
///
/// One instance per bus line; it models the single hardware timer and
/// input pin it is built on. Construct it once at setup, hand the
/// shared statics in, then route the platform's edge and timer
/// interrupts to [`on_falling_edge`](Self::on_falling_edge) and
/// [`on_bit_tick`](Self::on_bit_tick).
///
/// # Example
///
/// ```ignore
/// static MAILBOX: FrameMailbox = FrameMailbox::new();
/// static ERRORS: ErrorRegister = ErrorRegister::new();
/// static DIAG: DiagStream = DiagStream::new();
///
/// let timing = BitTiming::from_baud(19_200);
/// let mut rx = LinReceiver::new(timing, bus_pin, NoProbe, &MAILBOX, &ERRORS, &DIAG);
/// // program the timer from rx.timing(), register the ISRs...
///
/// // Main loop:
/// let mut frame = RxFrame::new();
/// if MAILBOX.read_next_frame(&mut frame) { /* ... */ }
/// let faults = ERRORS.get_and_clear();
/// ```
pub struct LinReceiver<'a, P, D> {
    pin: P,
    probe: D,
    timing: BitTiming,
    sampler: BitSampler,
    assembler: FrameAssembler<'a>,
    errors: &'a ErrorRegister,
    diag: &'a DiagStream,
}

impl<'a, P: InputPin, D: DebugProbe> LinReceiver<'a, P, D> {
    pub fn new(
        timing: BitTiming,
        pin: P,
        probe: D,
        mailbox: &'a FrameMailbox,
        errors: &'a ErrorRegister,
        diag: &'a DiagStream,
    ) -> Self {
        Self {
            pin,
            probe,
            timing,
            sampler: BitSampler::new(),
            assembler: FrameAssembler::new(mailbox, errors, diag),
            errors,
            diag,
        }
    }

    /// Bit-clock configuration to program the hardware timer with.
    #[inline]
    pub fn timing(&self) -> &BitTiming {
        &self.timing
    }

    /// Edge-interrupt entry point: a falling edge on the bus line.
    ///
    /// Apply the returned command to the timer: `Restart` means first
    /// compare match half a bit from now, then one per bit.
    #[inline]
    pub fn on_falling_edge(&mut self) -> TimerCtl {
        let ctl = self.sampler.on_falling_edge();
        if ctl == TimerCtl::Restart {
            self.diag.push(DiagEvent::EdgeArmed);
        }
        ctl
    }

    /// Timer-interrupt entry point: one bit slot elapsed.
    ///
    /// Samples the line, drives the probe, advances decode. Apply the
    /// returned command to the timer.
    #[inline]
    pub fn on_bit_tick(&mut self) -> TimerCtl {
        let level = match self.pin.is_high() {
            Ok(level) => level,
            Err(_) => {
                // Read failures must not wedge the receiver; treat the
                // line as recessive and note the fault.
                self.errors.record(ERROR_OTHER);
                self.diag.push(DiagEvent::ErrorRecorded { bits: ERROR_OTHER });
                true
            }
        };
        self.probe.on_sample(level);

        match self.sampler.tick(level) {
            LineEvent::None => TimerCtl::Unchanged,

            LineEvent::FalseStart => {
                self.errors.record(ERROR_START_BIT);
                self.diag.push(DiagEvent::FalseStart);
                TimerCtl::Unchanged
            }

            LineEvent::Byte { value, stop_ok } => {
                if !stop_ok {
                    self.errors.record(ERROR_STOP_BIT);
                }
                self.diag.push(DiagEvent::ByteSampled { value, stop_ok });
                self.assembler.on_byte(value);
                TimerCtl::Unchanged
            }

            LineEvent::BreakStart => {
                self.diag.push(DiagEvent::BreakStart);
                self.probe.frame_active(true);
                self.assembler.on_break_start();
                TimerCtl::Unchanged
            }

            LineEvent::BreakEnd => {
                self.diag.push(DiagEvent::BreakEnd);
                self.assembler.on_break_end();
                TimerCtl::Unchanged
            }

            LineEvent::GapTimeout => {
                self.diag.push(DiagEvent::GapTimeout);
                self.probe.frame_active(false);
                self.assembler.on_gap_timeout();
                TimerCtl::Stop
            }
        }
    }
}
