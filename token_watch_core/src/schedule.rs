// Countdown driving the periodic refresh cycle

/// Outcome of one wall-clock second
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Schedule is stopped
    Idle,
    /// Seconds left until the next cycle
    Countdown(u64),
    /// A cycle should start now; the countdown has been rewound
    Due,
}

/// Cancellable refresh timer advanced explicitly by its driver, one `tick`
/// per second, so cycles can be driven deterministically in tests.
#[derive(Debug, Clone)]
pub struct RefreshSchedule {
    interval_secs: u64,
    remaining: u64,
    running: bool,
}

impl RefreshSchedule {
    pub fn new(interval_secs: u64) -> Self {
        let interval_secs = interval_secs.max(1);
        Self {
            interval_secs,
            remaining: interval_secs,
            running: false,
        }
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining
    }

    pub fn start(&mut self) {
        self.running = true;
        self.reset();
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Rewind to the full interval; called whenever a cycle starts
    pub fn reset(&mut self) {
        self.remaining = self.interval_secs;
    }

    pub fn tick(&mut self) -> Tick {
        if !self.running {
            return Tick::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.reset();
            Tick::Due
        } else {
            Tick::Countdown(self.remaining)
        }
    }
}
