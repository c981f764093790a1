// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use std::time::Duration;

use holdings_monitor_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn config() {
        let err = CoreError::Config("holdings list is empty".into());
        assert_eq!(err.to_string(), "Configuration error: holdings list is empty");
    }

    #[test]
    fn invalid_holding() {
        let err = CoreError::InvalidHolding {
            index: 3,
            symbol: "TCS.NS".into(),
            reason: "quantity must be a positive number".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid holding #3 (TCS.NS): quantity must be a positive number"
        );
    }

    #[test]
    fn api() {
        let err = CoreError::Api {
            provider: "Google Finance".into(),
            message: "HTTP 429".into(),
        };
        assert_eq!(err.to_string(), "API error (Google Finance): HTTP 429");
    }

    #[test]
    fn network() {
        let err = CoreError::Network("connection refused".into());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn timeout_reports_milliseconds() {
        let err = CoreError::Timeout {
            operation: "Quote lookup".into(),
            symbol: "INFY.NS".into(),
            after: Duration::from_secs(3),
        };
        assert_eq!(err.to_string(), "Quote lookup for INFY.NS timed out after 3000ms");
    }

    #[test]
    fn cycle_aborted() {
        let err = CoreError::CycleAborted("task panicked".into());
        assert_eq!(err.to_string(), "Refresh cycle aborted: task panicked");
    }

    #[test]
    fn file_io_and_deserialization() {
        assert_eq!(CoreError::FileIO("denied".into()).to_string(), "File I/O error: denied");
        assert_eq!(
            CoreError::Deserialization("eof".into()).to_string(),
            "Deserialization error: eof"
        );
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: CoreError = io.into();
        assert!(matches!(err, CoreError::FileIO(ref m) if m.contains("no such file")));
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn question_mark_converts() {
        fn parse(raw: &str) -> Result<u32, CoreError> {
            Ok(serde_json::from_str(raw)?)
        }
        assert_eq!(parse("7").unwrap(), 7);
        assert!(matches!(parse("x"), Err(CoreError::Deserialization(_))));
    }

    #[tokio::test]
    async fn from_reqwest_error_redacts_query() {
        // Nothing listens on port 9 of the loopback; the connect fails fast.
        let client = reqwest::Client::new();
        let e = client
            .get("http://127.0.0.1:9/quote?symbol=SECRET&token=abc")
            .send()
            .await
            .unwrap_err();
        let err: CoreError = e.into();
        match err {
            CoreError::Network(msg) => {
                assert!(!msg.contains("token=abc"));
                assert!(!msg.contains("SECRET"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

// ── Debug / trait bounds ────────────────────────────────────────────

mod traits {
    use super::*;

    #[test]
    fn is_std_error_and_send_sync() {
        fn assert_bounds<T: std::error::Error + Send + Sync + 'static>() {}
        assert_bounds::<CoreError>();
    }

    #[test]
    fn debug_names_the_variant() {
        let err = CoreError::CycleAborted("x".into());
        assert!(format!("{err:?}").contains("CycleAborted"));
    }
}
