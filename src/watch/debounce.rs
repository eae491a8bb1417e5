//! Cancel-and-restart quiet-period timer.
//!
//! Every trigger pushes the deadline out to a full quiet period; bursts of
//! triggers therefore collapse into a single expiry after the last one.

use tokio::time::{sleep_until, Duration, Instant};

/// Default quiet period between the last observed mutation and the rescan.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(150);

#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Arm the timer, restarting the quiet period if already armed.
    pub fn poke(&mut self) {
        self.deadline = Some(Instant::now() + self.quiet);
    }

    /// Disarm without firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

/// Wait out a deadline; pends forever when there is none. Split from the
/// struct so select loops can hold the deadline by value while mutating the
/// debouncer in other branches.
pub async fn wait(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_quiet_period() {
        let mut debouncer = Debouncer::new(Duration::from_millis(150));
        let start = Instant::now();
        debouncer.poke();
        wait(debouncer.deadline()).await;
        assert!(Instant::now() - start >= Duration::from_millis(150));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poke_restarts_the_quiet_period() {
        let mut debouncer = Debouncer::new(Duration::from_millis(150));
        let start = Instant::now();
        debouncer.poke();
        tokio::time::advance(Duration::from_millis(100)).await;
        debouncer.poke();
        wait(debouncer.deadline()).await;
        // 100ms elapsed plus a full quiet period after the second poke.
        assert!(Instant::now() - start >= Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_cancel_disarms() {
        let mut debouncer = Debouncer::default();
        debouncer.poke();
        assert!(debouncer.is_armed());
        debouncer.cancel();
        assert!(!debouncer.is_armed());
        assert!(debouncer.deadline().is_none());
    }
}
