/// Booking time-of-day buckets.
///
/// Maps the hour component of a booking timestamp onto six fixed four-hour
/// ranges. The ranges are inclusive on both ends and start at hour 1, so
/// hour 0 (midnight) belongs to no bucket and comes back as missing.

use std::fmt;

// ---------------------------------------------------------------------------
// Bucket labels
// ---------------------------------------------------------------------------

/// One of the six booking time-of-day ranges, in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeOfDay {
    /// Hours 1–4.
    EarlyMorning,
    /// Hours 5–8.
    Morning,
    /// Hours 9–12.
    LateMorning,
    /// Hours 13–16.
    Afternoon,
    /// Hours 17–20.
    Evening,
    /// Hours 21–24.
    Night,
}

impl TimeOfDay {
    /// All buckets in chronological order.
    pub const ALL: [TimeOfDay; 6] = [
        TimeOfDay::EarlyMorning,
        TimeOfDay::Morning,
        TimeOfDay::LateMorning,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];

    /// Chart/report label, e.g. `"05 to 08"`.
    pub fn label(&self) -> &'static str {
        match self {
            TimeOfDay::EarlyMorning => "01 to 04",
            TimeOfDay::Morning => "05 to 08",
            TimeOfDay::LateMorning => "09 to 12",
            TimeOfDay::Afternoon => "13 to 16",
            TimeOfDay::Evening => "17 to 20",
            TimeOfDay::Night => "21 to 24",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Bucketing
// ---------------------------------------------------------------------------

/// Returns the bucket containing `hour`, or `None` when the hour falls
/// outside every range (0, or anything above 24).
pub fn time_of_day(hour: u32) -> Option<TimeOfDay> {
    match hour {
        1..=4 => Some(TimeOfDay::EarlyMorning),
        5..=8 => Some(TimeOfDay::Morning),
        9..=12 => Some(TimeOfDay::LateMorning),
        13..=16 => Some(TimeOfDay::Afternoon),
        17..=20 => Some(TimeOfDay::Evening),
        21..=24 => Some(TimeOfDay::Night),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, "01 to 04")]
    #[case(4, "01 to 04")]
    #[case(5, "05 to 08")]
    #[case(8, "05 to 08")]
    #[case(9, "09 to 12")]
    #[case(12, "09 to 12")]
    #[case(13, "13 to 16")]
    #[case(16, "13 to 16")]
    #[case(17, "17 to 20")]
    #[case(20, "17 to 20")]
    #[case(21, "21 to 24")]
    #[case(24, "21 to 24")]
    fn test_range_edges(#[case] hour: u32, #[case] label: &str) {
        assert_eq!(time_of_day(hour).map(|b| b.label()), Some(label));
    }

    #[rstest]
    #[case(0)]
    #[case(25)]
    #[case(99)]
    fn test_unmapped_hours_are_missing(#[case] hour: u32) {
        assert_eq!(time_of_day(hour), None);
    }

    #[test]
    fn test_buckets_are_ordered_and_four_wide() {
        let buckets: Vec<TimeOfDay> = (1..=24).filter_map(time_of_day).collect();
        assert_eq!(buckets.len(), 24);

        // Each bucket covers exactly four consecutive hours, in order.
        for (i, chunk) in buckets.chunks(4).enumerate() {
            assert!(chunk.iter().all(|b| *b == TimeOfDay::ALL[i]));
        }
        assert!(buckets.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_display_matches_label() {
        assert_eq!(TimeOfDay::Night.to_string(), "21 to 24");
    }
}
