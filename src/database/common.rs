use std::convert::TryInto;
use std::time::{SystemTime, UNIX_EPOCH};

pub fn get_current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis()
        .try_into()
        .expect("timestamp overflow")
}
