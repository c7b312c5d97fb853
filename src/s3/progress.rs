//! Per-part progress reporting for multipart transfers.

/// Integer percentage of a transfer. A zero-byte transfer is complete by
/// definition.
pub fn percent_done(transferred: u64, total: u64) -> u64 {
    if total == 0 {
        return 100;
    }
    transferred * 100 / total
}

/// Console hook printed after every uploaded part.
pub fn report(transferred: u64, total: u64) {
    println!(
        "transferred {transferred} of {total} bytes ({}% done)",
        percent_done(transferred, total)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_down() {
        assert_eq!(percent_done(0, 100), 0);
        assert_eq!(percent_done(50, 200), 25);
        assert_eq!(percent_done(3, 9), 33);
        assert_eq!(percent_done(9, 9), 100);
    }

    #[test]
    fn zero_total_is_complete() {
        assert_eq!(percent_done(0, 0), 100);
    }
}
