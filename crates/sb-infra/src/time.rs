use chrono::{DateTime, Local};

use sb_core::ports::ClockPort;

pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
