//! Shared test harness: wall-clock waveform simulation.
//!
//! Tests build a bus waveform as a list of level transitions in
//! nanoseconds at the *nominal* baud, then replay it against a
//! receiver whose virtual timer ticks at the *configured* period from
//! `BitTiming`, so the integer quantization of the real divider chain
//! is part of every decode test.

use std::cell::Cell;
use std::rc::Rc;

use softlin::{BitTiming, DiagStream, ErrorRegister, FrameMailbox, LinReceiver, NoProbe, TimerCtl};

/// Bus pin backed by a shared level cell the simulator drives.
#[derive(Clone)]
pub struct SimPin(Rc<Cell<bool>>);

impl embedded_hal::digital::ErrorType for SimPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.get())
    }
}

/// A LIN bus waveform under construction. Line starts recessive.
pub struct Waveform {
    bit_ns: f64,
    t_ns: f64,
    level: bool,
    transitions: Vec<(f64, bool)>,
}

impl Waveform {
    pub fn new(baud: u32) -> Self {
        Self {
            bit_ns: 1e9 / baud as f64,
            t_ns: 0.0,
            level: true,
            transitions: Vec::new(),
        }
    }

    /// Hold the line at `level` for `bits` bit times.
    pub fn hold(&mut self, bits: f64, level: bool) {
        if level != self.level {
            self.transitions.push((self.t_ns, level));
            self.level = level;
        }
        self.t_ns += bits * self.bit_ns;
    }

    /// Recessive (high) bus for `bits` bit times.
    pub fn idle(&mut self, bits: f64) {
        self.hold(bits, true);
    }

    /// Dominant (low) pulse of `bits` bit times.
    pub fn low(&mut self, bits: f64) {
        self.hold(bits, false);
    }

    /// One serialized byte: start, 8 data bits LSB-first, stop.
    pub fn byte(&mut self, value: u8) {
        self.hold(1.0, false);
        for i in 0..8 {
            self.hold(1.0, (value >> i) & 1 == 1);
        }
        self.hold(1.0, true);
    }

    /// A byte whose stop slot is driven dominant (framing error).
    pub fn byte_bad_stop(&mut self, value: u8) {
        self.hold(1.0, false);
        for i in 0..8 {
            self.hold(1.0, (value >> i) & 1 == 1);
        }
        self.hold(1.0, false);
    }

    /// Conforming break: 13 dominant bits plus one recessive delimiter.
    pub fn brk(&mut self) {
        self.low(13.0);
        self.idle(1.0);
    }

    /// A complete frame: break, sync, then the given bytes.
    pub fn frame(&mut self, bytes: &[u8]) {
        self.brk();
        self.byte(softlin::SYNC_BYTE);
        for &b in bytes {
            self.byte(b);
        }
    }
}

/// Everything a decode test needs, wired to one receiver.
pub struct Harness {
    pub mailbox: FrameMailbox,
    pub errors: ErrorRegister,
    pub diag: DiagStream,
    level: Rc<Cell<bool>>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            mailbox: FrameMailbox::new(),
            errors: ErrorRegister::new(),
            diag: DiagStream::new(),
            level: Rc::new(Cell::new(true)),
        }
    }

    pub fn receiver(&self, baud: u32) -> LinReceiver<'_, SimPin, NoProbe> {
        LinReceiver::new(
            BitTiming::from_baud(baud),
            SimPin(Rc::clone(&self.level)),
            NoProbe,
            &self.mailbox,
            &self.errors,
            &self.diag,
        )
    }

    /// Replay `wave` through the receiver: falling transitions fire the
    /// edge handler, the virtual timer fires at the configured period
    /// and honors the returned `TimerCtl`.
    pub fn run(&self, rx: &mut LinReceiver<'_, SimPin, NoProbe>, wave: &Waveform) {
        let period = rx.timing().bit_period_ns() as f64;
        let end = wave.t_ns + 25.0 * wave.bit_ns;

        let mut next_transition = 0usize;
        let mut tick_at: Option<f64> = None;

        loop {
            let transition = wave.transitions.get(next_transition).copied();
            let due_tick = tick_at.filter(|&t| t <= end);

            let edge_first = match (transition, due_tick) {
                (None, None) => break,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (Some((tt, _)), Some(t)) => tt <= t,
            };

            if edge_first {
                let (tt, new_level) = transition.unwrap();
                self.level.set(new_level);
                if !new_level {
                    match rx.on_falling_edge() {
                        TimerCtl::Restart => tick_at = Some(tt + period / 2.0),
                        TimerCtl::Stop => tick_at = None,
                        TimerCtl::Unchanged => {}
                    }
                }
                next_transition += 1;
            } else {
                let t = due_tick.unwrap();
                match rx.on_bit_tick() {
                    TimerCtl::Restart => tick_at = Some(t + period / 2.0),
                    TimerCtl::Unchanged => tick_at = Some(t + period),
                    TimerCtl::Stop => tick_at = None,
                }
            }
        }
    }

    /// Build, replay and decode one waveform at `baud` on a fresh
    /// receiver.
    pub fn decode(&self, baud: u32, build: impl FnOnce(&mut Waveform)) {
        let mut wave = Waveform::new(baud);
        wave.idle(2.0);
        build(&mut wave);
        wave.idle(15.0);
        let mut rx = self.receiver(baud);
        self.run(&mut rx, &wave);
    }

    /// Pop the next published frame's bytes, if any.
    pub fn take_frame(&self) -> Option<Vec<u8>> {
        let mut out = softlin::RxFrame::new();
        self.mailbox
            .read_next_frame(&mut out)
            .then(|| out.bytes().to_vec())
    }
}
