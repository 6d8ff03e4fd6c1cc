use chrono::Local;
use film_tagger_application::Clock;

/// Local wall-clock time, formatted for backup directory names.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_timestamp_string(&self) -> String {
        Local::now().format("%Y%m%d_%H%M%S").to_string()
    }
}
