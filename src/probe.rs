//! Debug timing probe: scope-visible sampling output.
//!
//! The decoder drives a probe at every sampling decision so bit timing
//! can be verified against the bus on an oscilloscope. Purely
//! observable; consumers never depend on it.

use embedded_hal::digital::OutputPin;

/// Receives the decoder's sampling activity.
pub trait DebugProbe {
    /// One mid-bit sample was taken; `level` is what the line read.
    fn on_sample(&mut self, level: bool);

    /// A reception window opened (`true`) or closed (`false`).
    fn frame_active(&mut self, _active: bool) {}
}

/// Probe that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProbe;

impl DebugProbe for NoProbe {
    #[inline]
    fn on_sample(&mut self, _level: bool) {}
}

/// Probe that toggles a GPIO at every sample.
///
/// Pin errors are swallowed; a broken scope pin must not disturb
/// decoding.
pub struct PinProbe<P> {
    pin: P,
    state: bool,
}

impl<P: OutputPin> PinProbe<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, state: false }
    }

    /// Take the pin back.
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> DebugProbe for PinProbe<P> {
    #[inline]
    fn on_sample(&mut self, _level: bool) {
        self.state = !self.state;
        let _ = if self.state {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
    }
}
