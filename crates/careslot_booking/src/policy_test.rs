#[cfg(test)]
mod tests {
    use crate::policy::{is_weekend, parse_date, DatePolicy, PolicyViolation};
    use crate::test_support::date;
    use careslot_common::CareslotError;
    use chrono::{TimeZone, Utc};
    use chrono_tz::Europe::Madrid;

    #[test]
    fn test_weekend_detection() {
        assert!(is_weekend(date(2025, 5, 10)));
        assert!(is_weekend(date(2025, 5, 11)));
        assert!(!is_weekend(date(2025, 5, 12)));
        assert!(!is_weekend(date(2025, 5, 9)));
    }

    #[test]
    fn test_five_workdays_from_monday_is_next_monday() {
        let policy = DatePolicy::new(Madrid, 5);
        assert_eq!(
            policy.earliest_bookable_date(date(2025, 5, 5)),
            date(2025, 5, 12)
        );
    }

    #[test]
    fn test_zero_lead_time_is_today() {
        let policy = DatePolicy::new(Madrid, 0);
        assert_eq!(policy.earliest_bookable_date(date(2025, 5, 7)), date(2025, 5, 7));
        assert!(policy.check(date(2025, 5, 7), date(2025, 5, 7)).is_ok());
    }

    #[test]
    fn test_lead_time_from_a_weekend() {
        let policy = DatePolicy::new(Madrid, 1);
        // Saturday: Sunday is skipped, Monday is the first counted day.
        assert_eq!(
            policy.earliest_bookable_date(date(2025, 5, 10)),
            date(2025, 5, 12)
        );
    }

    #[test]
    fn test_friday_with_two_workdays() {
        let policy = DatePolicy::new(Madrid, 2);
        assert_eq!(policy.earliest_bookable_date(date(2025, 5, 9)), date(2025, 5, 13));
    }

    #[test]
    fn test_check_reports_the_rule() {
        let policy = DatePolicy::new(Madrid, 5);
        let today = date(2025, 5, 5);

        assert_eq!(
            policy.check(date(2025, 5, 17), today),
            Err(PolicyViolation::Weekend)
        );
        assert_eq!(
            policy.check(date(2025, 5, 9), today),
            Err(PolicyViolation::BeforeLeadTime {
                earliest: date(2025, 5, 12)
            })
        );
        assert!(policy.check(date(2025, 5, 12), today).is_ok());
        assert_eq!(PolicyViolation::Weekend.reason(), "weekend");
    }

    #[test]
    fn test_past_date_on_a_weekend_names_a_weekday() {
        let policy = DatePolicy::new(Madrid, 0);
        let saturday = date(2025, 5, 10);

        assert_eq!(
            policy.check(date(2025, 5, 8), saturday),
            Err(PolicyViolation::BeforeLeadTime {
                earliest: date(2025, 5, 12)
            })
        );
    }

    #[test]
    fn test_next_bookable_date_skips_weekend() {
        let policy = DatePolicy::new(Madrid, 0);
        assert_eq!(policy.next_bookable_date(date(2025, 5, 10)), date(2025, 5, 12));
        assert_eq!(policy.next_bookable_date(date(2025, 5, 8)), date(2025, 5, 8));
    }

    #[test]
    fn test_today_uses_business_zone() {
        let policy = DatePolicy::new(Madrid, 0);
        // 23:30 UTC on Friday is already Saturday in Madrid.
        let now = Utc.with_ymd_and_hms(2025, 5, 9, 23, 30, 0).unwrap();
        assert_eq!(policy.today(now), date(2025, 5, 10));
    }

    #[test]
    fn test_day_window_spans_local_day() {
        let policy = DatePolicy::new(Madrid, 0);
        let (start, end) = policy.day_window(date(2025, 5, 12)).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 5, 11, 22, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 5, 12, 22, 0, 0).unwrap());

        // The spring-forward day is 23 hours long.
        let (start, end) = policy.day_window(date(2025, 3, 30)).unwrap();
        assert_eq!((end - start).num_hours(), 23);
    }

    #[test]
    fn test_parse_date_is_a_validation_error() {
        assert_eq!(parse_date(" 2025-05-12 ").unwrap(), date(2025, 5, 12));
        for input in ["12/05/2025", "2025-13-01", "tomorrow", ""] {
            assert!(matches!(
                parse_date(input),
                Err(CareslotError::ValidationError(_))
            ));
        }
    }
}
