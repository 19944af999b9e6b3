//! Tracing subscriber setup for embedding applications.

use tracing::Level;

use crate::config::LogConfig;
use crate::error::{DbError, DbResult};

/// Install a `fmt` subscriber at the configured level.
///
/// Only the first call installs anything; later calls (or a subscriber set
/// by the host application) are left in place.
pub fn init(config: &LogConfig) -> DbResult<()> {
    let level: Level = config
        .level
        .parse()
        .map_err(|_| DbError::Config(format!("unknown log level {:?}", config.level)))?;
    let _ = tracing_subscriber::fmt().with_max_level(level).try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let config = LogConfig {
            level: "debug".into(),
        };
        init(&config).unwrap();
        init(&config).unwrap();
    }

    #[test]
    fn unknown_level_is_rejected() {
        let config = LogConfig {
            level: "chatty".into(),
        };
        assert!(matches!(init(&config), Err(DbError::Config(_))));
    }
}
