//! Module: timing
//!
//! Purpose: derive the bit-clock configuration from a requested baud
//! rate, once, at setup time.
//!
//! The decoder samples the bus with a general-purpose timer modelled
//! after a classic 8-bit timer/counter: the CPU clock is divided by a
//! prescaler, and a compare (reload) value sets the tick period. The
//! smallest prescaler whose tick count per bit fits the 8-bit compare
//! range is chosen, keeping quantization error minimal.
//!
//! Out-of-range baud requests fall back silently to the documented
//! default. Interrupt-context code stays free of error propagation;
//! there is deliberately no failing path here.

/// Lowest supported baud rate.
pub const MIN_BAUD: u32 = 1_000;

/// Highest supported baud rate.
pub const MAX_BAUD: u32 = 20_000;

/// Baud used when the requested rate is out of range.
pub const DEFAULT_BAUD: u32 = 9_600;

/// Reference CPU clock the compare values are derived from.
pub const DEFAULT_CLOCK_HZ: u32 = 16_000_000;

/// Prescaler options, smallest first.
const PRESCALERS: [u16; 6] = [8, 32, 64, 128, 256, 1024];

/// Bit-clock configuration for one baud rate.
///
/// The platform programs its timer from `prescaler()` and `compare()`;
/// the timer then fires once per bit slot. Phase is not set here: the
/// edge interrupt re-arms the counter so the first tick of each byte
/// lands half a bit after the start-bit edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitTiming {
    baud: u32,
    clock_hz: u32,
    prescaler: u16,
    compare: u8,
}

impl BitTiming {
    /// Derive the configuration for `baud` against the reference clock.
    ///
    /// Requests outside `[MIN_BAUD, MAX_BAUD]` silently configure
    /// `DEFAULT_BAUD` instead.
    pub fn from_baud(baud: u32) -> Self {
        Self::from_baud_with_clock(baud, DEFAULT_CLOCK_HZ)
    }

    /// Same as [`from_baud`](Self::from_baud) for a different CPU clock.
    pub fn from_baud_with_clock(baud: u32, clock_hz: u32) -> Self {
        let baud = if (MIN_BAUD..=MAX_BAUD).contains(&baud) {
            baud
        } else {
            DEFAULT_BAUD
        };
        Self::compute(baud, clock_hz)
    }

    fn compute(baud: u32, clock_hz: u32) -> Self {
        for prescaler in PRESCALERS {
            let divisor = prescaler as u64 * baud as u64;
            let ticks = (clock_hz as u64 + divisor / 2) / divisor;
            if (2..=256).contains(&ticks) {
                return Self {
                    baud,
                    clock_hz,
                    prescaler,
                    compare: (ticks - 1) as u8,
                };
            }
        }
        // Clock outside the range any prescaler covers: saturate at the
        // slowest setting rather than fail.
        Self {
            baud,
            clock_hz,
            prescaler: PRESCALERS[PRESCALERS.len() - 1],
            compare: u8::MAX,
        }
    }

    /// Nominal baud this configuration targets (after any fallback).
    #[inline]
    pub fn baud(&self) -> u32 {
        self.baud
    }

    /// CPU clock the configuration was derived from.
    #[inline]
    pub fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    /// Selected clock prescaler.
    #[inline]
    pub fn prescaler(&self) -> u16 {
        self.prescaler
    }

    /// Timer compare (reload) value; the timer fires every
    /// `compare + 1` prescaled ticks.
    #[inline]
    pub fn compare(&self) -> u8 {
        self.compare
    }

    /// Baud rate actually produced by the integer divider chain.
    #[inline]
    pub fn actual_baud(&self) -> u32 {
        let period = self.prescaler as u64 * (self.compare as u64 + 1);
        ((self.clock_hz as u64 + period / 2) / period) as u32
    }

    /// Duration of one bit slot in nanoseconds.
    #[inline]
    pub fn bit_period_ns(&self) -> u64 {
        let period = self.prescaler as u64 * (self.compare as u64 + 1);
        period * 1_000_000_000 / self.clock_hz as u64
    }
}
