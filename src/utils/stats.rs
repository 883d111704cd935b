use std::time::{Duration, Instant};

/// Wall-clock timer for one stage.
#[derive(Debug, Clone)]
pub struct StatsTimer {
    start_time: Instant,
    duration: Duration,
}

impl Default for StatsTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsTimer {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            duration: Duration::ZERO,
        }
    }

    pub fn finish(&mut self) -> Duration {
        self.duration = self.start_time.elapsed();
        self.duration
    }

    pub fn get_duration_secs(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}
