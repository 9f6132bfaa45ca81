#[cfg(test)]
mod tests {
    use crate::grid::{merge_adjacent, overlaps, TimeRange};
    use crate::occupancy::mark_occupancy;
    use crate::test_support::{date, madrid};
    use careslot_common::services::{CalendarEvent, Metadata};
    use chrono_tz::Europe::Madrid;
    use proptest::prelude::*;

    fn hour_ranges() -> Vec<TimeRange> {
        (9..14u16)
            .chain(16..20)
            .map(|h| TimeRange::hours(h, h + 1).unwrap())
            .collect()
    }

    fn range_strategy() -> impl Strategy<Value = TimeRange> {
        (0u16..1439, 1u16..600).prop_map(|(start, len)| {
            TimeRange::new(start, (start + len).min(24 * 60)).unwrap()
        })
    }

    proptest! {
        #[test]
        fn test_overlap_is_symmetric(a in range_strategy(), b in range_strategy()) {
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn test_overlap_matches_predicate(a in range_strategy(), b in range_strategy()) {
            let expected = a.start_minutes() < b.end_minutes() && b.start_minutes() < a.end_minutes();
            prop_assert_eq!(a.overlaps(&b), expected);
            prop_assert_eq!(
                overlaps(a.start_minutes(), a.end_minutes(), b.start_minutes(), b.end_minutes()),
                expected
            );
        }

        // An event exactly covering one catalog hour marks that hour only.
        #[test]
        fn test_exact_event_marks_single_range(index in 0usize..9) {
            let ranges = hour_ranges();
            let day = date(2025, 5, 12);
            let target = ranges[index];
            let event = CalendarEvent {
                id: Some("evt".to_string()),
                start: madrid(day, u32::from(target.start_minutes() / 60), 0),
                end: madrid(day, u32::from(target.end_minutes() / 60), 0),
                summary: "busy".to_string(),
                metadata: Metadata::new(),
            };

            let slots = mark_occupancy(day, &Madrid, &ranges, &[event]).unwrap();
            for (position, slot) in slots.iter().enumerate() {
                prop_assert_eq!(slot.taken, position == index);
            }
        }

        // An event starting mid-hour spills into exactly the hours it touches.
        #[test]
        fn test_shifted_event_marks_touched_ranges(start_hour in 9u32..19, minute in 1u32..59) {
            let ranges = hour_ranges();
            let day = date(2025, 5, 12);
            let event = CalendarEvent {
                id: None,
                start: madrid(day, start_hour, minute),
                end: madrid(day, start_hour + 1, minute),
                summary: "busy".to_string(),
                metadata: Metadata::new(),
            };

            let slots = mark_occupancy(day, &Madrid, &ranges, &[event]).unwrap();
            for slot in slots {
                let hour = u32::from(slot.range.start_minutes() / 60);
                prop_assert_eq!(slot.taken, hour == start_hour || hour == start_hour + 1);
            }
        }

        #[test]
        fn test_merge_keeps_covered_minutes(ranges in proptest::collection::vec(range_strategy(), 0..8)) {
            let merged = merge_adjacent(&ranges);
            for window in merged.windows(2) {
                prop_assert!(window[0].end_minutes() < window[1].start_minutes());
            }
            for range in &ranges {
                let covered = merged.iter().any(|m| {
                    m.start_minutes() <= range.start_minutes() && range.end_minutes() <= m.end_minutes()
                });
                prop_assert!(covered, "{} not covered by {:?}", range, merged);
            }
        }
    }
}
