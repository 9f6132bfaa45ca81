#[cfg(test)]
mod tests {
    use crate::auth::create_calendar_hub;
    use careslot_common::CareslotError;
    use careslot_config::GcalConfig;

    #[tokio::test]
    async fn test_create_calendar_hub_missing_key_path() {
        let config = GcalConfig {
            key_path: None,
            request_timeout_secs: 5,
        };

        match create_calendar_hub(&config).await {
            Ok(_) => panic!("Expected an error but got Ok"),
            Err(err) => {
                assert!(matches!(err, CareslotError::ConfigError(_)));
                assert!(
                    err.to_string().contains("key_path"),
                    "Error message should mention missing key_path, got: {}",
                    err
                );
            }
        }
    }

    #[tokio::test]
    async fn test_create_calendar_hub_invalid_key_path() {
        let config = GcalConfig {
            key_path: Some("/nonexistent/careslot-service-account.json".to_string()),
            request_timeout_secs: 5,
        };

        match create_calendar_hub(&config).await {
            Ok(_) => panic!("Expected an error but got Ok"),
            Err(err) => {
                let err_string = err.to_string();
                assert!(
                    err_string.contains("careslot-service-account.json"),
                    "Error should name the key file, got: {}",
                    err_string
                );
            }
        }
    }
}
