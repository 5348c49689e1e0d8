// src/dev_utils.rs

use std::time::{Duration, Instant};

/// Measures one stage of a run (picking, opening) and reports it on drop.
///
/// Output goes to the `profile` log target at debug level, so
/// `RUST_LOG=profile=debug fzf-open` shows only the timings.
#[derive(Debug)]
pub struct BlockTimer {
    stage: &'static str,
    start: Instant,
}

impl BlockTimer {
    pub fn new(stage: &'static str) -> Self {
        Self {
            stage,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for BlockTimer {
    fn drop(&mut self) {
        let elapsed = self.elapsed();
        log::debug!(
            target: "profile",
            "{:<6} {:>8.3} ms",
            self.stage,
            elapsed.as_secs_f64() * 1000.0
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_grows() {
        let timer = BlockTimer::new("pick");
        std::thread::sleep(Duration::from_millis(5));
        assert!(timer.elapsed() >= Duration::from_millis(5));
    }
}
