pub mod cli_consts {
    //! Monitor Configuration Constants
    //!
    //! This module contains all configuration constants for the monitor,
    //! organized by functional area for clarity and maintainability.

    // =============================================================================
    // QUEUE CONFIGURATION
    // =============================================================================

    /// The maximum number of events to keep in the activity logs.
    pub const MAX_ACTIVITY_LOGS: usize = 100;

    /// Maximum number of buffered events between workers and the UI
    pub const EVENT_QUEUE_SIZE: usize = 100;

    /// Attribution sent with every mutating call when none is configured
    pub const DEFAULT_USER: &str = "operator";

    // =============================================================================
    // POLLING CONFIGURATION
    // =============================================================================

    /// Telemetry polling cadence
    pub mod polling {
        use std::time::Duration;

        /// Period between poll cycles (milliseconds)
        pub const POLL_INTERVAL_MS: u64 = 3_000;

        /// Lower bound accepted from the config file (milliseconds)
        pub const MIN_POLL_INTERVAL_MS: u64 = 250;

        pub const fn poll_interval() -> Duration {
            Duration::from_millis(POLL_INTERVAL_MS)
        }
    }

    // =============================================================================
    // UI CONFIGURATION
    // =============================================================================

    /// Transient banner lifetime
    pub mod messages {
        use std::time::Duration;

        /// How long a transient message stays visible (milliseconds)
        pub const MESSAGE_TTL_MS: u64 = 3_000;

        pub const fn message_ttl() -> Duration {
            Duration::from_millis(MESSAGE_TTL_MS)
        }
    }

    // =============================================================================
    // DOSING
    // =============================================================================

    pub mod dosing {
        pub const MIN_DOSE_ML: u32 = 10;
        pub const MAX_DOSE_ML: u32 = 1_000;
        pub const DOSE_STEP_ML: u32 = 10;
        /// Initial amount shown in the dashboard dose input
        pub const DEFAULT_DOSE_ML: u32 = 100;
    }

    // =============================================================================
    // SENSOR THRESHOLDS
    // =============================================================================

    pub mod thresholds {
        /// Below this TDS the reservoir is critically under-dosed (ppm)
        pub const TDS_DANGER_LOW: f64 = 500.0;
        /// Upper edge of the low warning band, exclusive (ppm)
        pub const TDS_WARNING_LOW: f64 = 600.0;
        /// Lower edge of the high warning band, exclusive (ppm)
        pub const TDS_WARNING_HIGH: f64 = 1_000.0;
        /// Above this TDS the reservoir is critically over-dosed (ppm)
        pub const TDS_DANGER_HIGH: f64 = 1_100.0;

        pub const TEMP_MIN_C: f64 = 15.0;
        pub const TEMP_MAX_C: f64 = 35.0;
        pub const WATER_LEVEL_MIN_CM: f64 = 10.0;
    }

    // =============================================================================
    // NETWORK CONFIGURATION
    // =============================================================================

    pub mod network {
        use std::time::Duration;

        pub const CONNECT_TIMEOUT_SECS: u64 = 5;
        pub const REQUEST_TIMEOUT_SECS: u64 = 10;
        /// CSV exports can be large; the download gets a longer budget
        pub const EXPORT_TIMEOUT_SECS: u64 = 120;

        pub const fn connect_timeout() -> Duration {
            Duration::from_secs(CONNECT_TIMEOUT_SECS)
        }

        pub const fn request_timeout() -> Duration {
            Duration::from_secs(REQUEST_TIMEOUT_SECS)
        }

        pub const fn export_timeout() -> Duration {
            Duration::from_secs(EXPORT_TIMEOUT_SECS)
        }
    }

    /// File name used when the server does not suggest one
    pub const DEFAULT_EXPORT_FILE_NAME: &str = "dualfarm_sensor_data.csv";
}
