//! Bit-clock configuration tests across the whole supported range.

use softlin::timing::{BitTiming, DEFAULT_BAUD, MAX_BAUD, MIN_BAUD};

#[test]
fn test_every_supported_baud_configures_accurately() {
    for baud in MIN_BAUD..=MAX_BAUD {
        let t = BitTiming::from_baud(baud);
        assert_eq!(t.baud(), baud);

        let actual = t.actual_baud() as f64;
        let rel_err = (actual - baud as f64).abs() / baud as f64;
        assert!(
            rel_err < 0.01,
            "{} baud configured as {} ({:.3}% off)",
            baud,
            t.actual_baud(),
            rel_err * 100.0
        );

        // Drift across one byte must keep the stop-bit sample inside
        // its slot: 9.5 bit periods of accumulated error < half a bit.
        assert!(rel_err * 9.5 < 0.5);
    }
}

#[test]
fn test_out_of_range_always_configures_default() {
    let reference = BitTiming::from_baud(DEFAULT_BAUD);
    for bad in [0, 1, 999, 20_001, 50_000, u32::MAX] {
        let t = BitTiming::from_baud(bad);
        assert_eq!(t.baud(), DEFAULT_BAUD);
        assert_eq!(t, reference);
    }
}

#[test]
fn test_in_range_edges_are_not_defaulted() {
    assert_eq!(BitTiming::from_baud(MIN_BAUD).baud(), MIN_BAUD);
    assert_eq!(BitTiming::from_baud(MAX_BAUD).baud(), MAX_BAUD);
}

#[test]
fn test_compare_value_fits_timer_register() {
    // The compare field is u8 by construction; make sure the chosen
    // prescaler keeps at least a handful of ticks per bit so mid-bit
    // phase stays meaningful.
    for baud in MIN_BAUD..=MAX_BAUD {
        let t = BitTiming::from_baud(baud);
        assert!(t.compare() >= 32, "{} baud: {} ticks", baud, t.compare());
    }
}

#[test]
fn test_alternate_clocks() {
    for clock in [8_000_000, 12_000_000, 16_000_000, 20_000_000] {
        let t = BitTiming::from_baud_with_clock(9_600, clock);
        let actual = t.actual_baud() as f64;
        assert!((actual - 9_600.0).abs() / 9_600.0 < 0.01, "clock {clock}");
    }
}
