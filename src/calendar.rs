//! Proleptic Gregorian day arithmetic and the TAI-UTC leap second table.
//!
//! CDF's EPOCH and EPOCH16 encodings count from 0000-01-01T00:00:00 in the
//! proleptic Gregorian calendar, so all day math here is rebased to year 0
//! rather than the Unix epoch. The civil <-> day-count conversions are the
//! standard era-based algorithm described in Howard Hinnant's "chrono
//! compatible low-level date algorithms".

/// Days from 0000-01-01 to 2000-01-01.
pub const DAYS_0000_TO_2000: i64 = 730_485;

pub const SECS_PER_DAY: i64 = 86_400;

/// Number of days from 0000-01-01 to the given proleptic Gregorian date.
pub fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let month = month as i64;
    let day = day as i64;
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y - era * 400; // [0, 399]
    let mp = if month > 2 { month - 3 } else { month + 9 }; // March-based month
    let doy = (153 * mp + 2) / 5 + day - 1; // [0, 365]
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy; // [0, 146096]

    // The era math counts from 0000-03-01; 0000-01-01 is 60 days earlier.
    era * 146_097 + doe + 60
}

/// Inverse of `days_from_civil`.
pub fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days - 60; // rebase to 0000-03-01
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097; // [0, 146096]
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365; // [0, 399]
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // [0, 11]
    let day = doy - (153 * mp + 2) / 5 + 1; // [1, 31]
    let month = if mp < 10 { mp + 3 } else { mp - 9 }; // [1, 12]
    let year = if month <= 2 { y + 1 } else { y };

    (year, month as u32, day as u32)
}

/// TAI-UTC offsets since the start of the stepped-leap-second era. Each entry
/// is (year, month, offset), effective from the first of that month at
/// 00:00:00 UTC. Current through the 2017-01-01 leap second, matching the
/// table shipped with CDF 3.8.
const LEAP_TABLE: &[(i64, u32, i64)] = &[
    (1972, 1, 10),
    (1972, 7, 11),
    (1973, 1, 12),
    (1974, 1, 13),
    (1975, 1, 14),
    (1976, 1, 15),
    (1977, 1, 16),
    (1978, 1, 17),
    (1979, 1, 18),
    (1980, 1, 19),
    (1981, 7, 20),
    (1982, 7, 21),
    (1983, 7, 22),
    (1985, 7, 23),
    (1988, 1, 24),
    (1990, 1, 25),
    (1991, 1, 26),
    (1992, 7, 27),
    (1993, 7, 28),
    (1994, 7, 29),
    (1996, 1, 30),
    (1997, 7, 31),
    (1999, 1, 32),
    (2006, 1, 33),
    (2009, 1, 34),
    (2012, 7, 35),
    (2015, 7, 36),
    (2017, 1, 37),
];

/// UTC label seconds from 2000-01-01T12:00:00 to midnight of the given date.
fn j2000_label_secs(year: i64, month: u32, day: u32) -> i64 {
    (days_from_civil(year, month, day) - DAYS_0000_TO_2000) * SECS_PER_DAY - SECS_PER_DAY / 2
}

/// TAI-UTC offset in effect on the given calendar date. Dates before the
/// table use the first entry's offset; the pre-1972 drift formula is not
/// modeled.
pub fn delta_at(year: i64, month: u32, _day: u32) -> i64 {
    let mut offset = LEAP_TABLE[0].2;
    for &(y, m, dat) in LEAP_TABLE {
        if (year, month) >= (y, m) {
            offset = dat;
        } else {
            break;
        }
    }
    offset
}

/// Recover the TAI-UTC offset from a `utc_label + delta_at` second count
/// relative to 2000-01-01T12:00:00. Returns the offset and whether the
/// instant falls inside an inserted leap second (to be rendered 23:59:60).
pub fn delta_at_from_sum(sum: i64) -> (i64, bool) {
    for (i, &(y, m, dat)) in LEAP_TABLE.iter().enumerate().rev() {
        let start = j2000_label_secs(y, m, 1);
        let utc = sum - dat;
        if utc >= start {
            // Inside the second inserted just before the next entry takes
            // effect, the scan lands on this entry with utc overshooting
            // into the next one.
            let in_leap = match LEAP_TABLE.get(i + 1) {
                Some(&(ny, nm, _)) => utc >= j2000_label_secs(ny, nm, 1),
                None => false,
            };
            return (dat, in_leap);
        }
    }
    (LEAP_TABLE[0].2, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_day_constants() {
        assert_eq!(days_from_civil(0, 1, 1), 0);
        assert_eq!(days_from_civil(1970, 1, 1), 719_528);
        assert_eq!(days_from_civil(2000, 1, 1), DAYS_0000_TO_2000);
    }

    #[test]
    fn test_civil_round_trip() {
        // Sweep a range that crosses century and 400-year boundaries.
        let start = days_from_civil(1899, 12, 28);
        let end = days_from_civil(2101, 1, 3);
        for days in start..end {
            let (y, m, d) = civil_from_days(days);
            assert_eq!(days_from_civil(y, m, d), days);
        }
    }

    #[test]
    fn test_civil_from_days_known_dates() {
        assert_eq!(civil_from_days(0), (0, 1, 1));
        assert_eq!(civil_from_days(719_528), (1970, 1, 1));
        assert_eq!(civil_from_days(days_from_civil(2015, 3, 18)), (2015, 3, 18));
        assert_eq!(civil_from_days(days_from_civil(2000, 2, 29)), (2000, 2, 29));
    }

    #[test]
    fn test_delta_at_by_date() {
        assert_eq!(delta_at(1960, 1, 1), 10); // pre-table clamp
        assert_eq!(delta_at(1972, 1, 1), 10);
        assert_eq!(delta_at(1972, 7, 1), 11);
        assert_eq!(delta_at(2000, 1, 1), 32);
        assert_eq!(delta_at(2015, 3, 18), 35);
        assert_eq!(delta_at(2015, 7, 1), 36);
        assert_eq!(delta_at(2024, 6, 1), 37);
    }

    #[test]
    fn test_delta_at_from_sum() {
        // 2015-03-18T00:00:00 UTC: label seconds + offset 35.
        let sum = j2000_label_secs(2015, 3, 18) + 35;
        assert_eq!(delta_at_from_sum(sum), (35, false));

        // One second before the 2015-07-01 leap second: 2015-06-30T23:59:59.
        let boundary = j2000_label_secs(2015, 7, 1);
        assert_eq!(delta_at_from_sum(boundary - 1 + 35), (35, false));
        // Inside the inserted second: 2015-06-30T23:59:60.
        assert_eq!(delta_at_from_sum(boundary + 35), (35, true));
        // First instant after: 2015-07-01T00:00:00, offset now 36.
        assert_eq!(delta_at_from_sum(boundary + 36), (36, false));
    }
}
