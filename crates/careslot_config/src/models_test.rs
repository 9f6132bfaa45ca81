#[cfg(test)]
mod tests {
    use crate::{load_config_from, AppConfig, ConfigLoadError, HourBlock};
    use std::fs;
    use std::path::PathBuf;

    const SAMPLE: &str = r#"
        use_gcal = false

        [server]
        host = "127.0.0.1"
        port = 8080

        [booking]
        time_zone = "Europe/Madrid"
        lead_workdays = 2
        hourly_rate = 18.5
        tax_rate = 0.21

        [[caregivers]]
        name = "José"
        calendar_id = "jose@group.calendar.google.com"
        email = "jose@example.com"
    "#;

    fn sample_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "careslot-config-{}-{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("default.toml"), SAMPLE).unwrap();
        dir
    }

    fn sample_config() -> AppConfig {
        let dir = sample_dir("sample");
        load_config_from(&dir, "test").unwrap()
    }

    #[test]
    fn test_load_config_applies_defaults() {
        let config = sample_config();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.booking.lead_workdays, 2);
        assert_eq!(config.booking.currency, "EUR");
        assert_eq!(
            config.booking.morning,
            HourBlock {
                start_hour: 9,
                end_hour: 14
            }
        );
        assert_eq!(config.booking.afternoon.start_hour, 16);
        assert!(config.booking.mirror_calendars.is_empty());
        assert_eq!(config.caregivers.len(), 1);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_environment_file_overrides_default() {
        let dir = sample_dir("override");
        fs::write(
            dir.join("staging.toml"),
            "[booking]\nlead_workdays = 5\nhourly_rate = 20.0\ntax_rate = 0.1\n",
        )
        .unwrap();

        let config = load_config_from(&dir, "staging").unwrap();
        assert_eq!(config.booking.lead_workdays, 5);
        assert_eq!(config.booking.hourly_rate, 20.0);
    }

    #[test]
    fn test_validate_rejects_empty_caregivers() {
        let mut config = sample_config();
        config.caregivers.clear();

        assert!(matches!(config.validate(), Err(ConfigLoadError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_inverted_block() {
        let mut config = sample_config();
        config.booking.afternoon = HourBlock {
            start_hour: 20,
            end_hour: 16,
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_overlapping_blocks() {
        let mut config = sample_config();
        config.booking.morning = HourBlock {
            start_hour: 9,
            end_hour: 18,
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_time_zone() {
        let mut config = sample_config();
        config.booking.time_zone = "Mars/Olympus_Mons".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_gcal_key_when_enabled() {
        let mut config = sample_config();
        config.use_gcal = true;

        assert!(config.validate().is_err());
    }
}
