pub mod form;
pub mod table_nav;

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Elapsed time since `at`, rounded to whole seconds ("3m 12s ago").
pub fn ago(at: Option<DateTime<Utc>>) -> String {
    let Some(at) = at else {
        return "-".to_owned();
    };
    let elapsed = Utc::now()
        .signed_duration_since(at)
        .to_std()
        .unwrap_or_default();
    let rounded = Duration::from_secs(elapsed.as_secs());
    format!("{} ago", humantime::format_duration(rounded))
}
