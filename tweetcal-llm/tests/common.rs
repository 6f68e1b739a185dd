use std::sync::OnceLock;

use tweetcal_common::observability::{LogConfig, LogFormat, init_logging};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "tweetcal-tests",
            log_dir: Some(std::env::temp_dir().join("tweetcal-tests")),
            emit_stderr: true,
            format: if std::env::var("TWEETCAL_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug",
        };

        init_logging(config).unwrap_or_default()
    });
}
