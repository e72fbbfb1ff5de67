/// Wall-clock accumulator for the session screen.
/// Advanced by the runner every frame with the frame delta.
#[derive(Debug, Clone, Default)]
pub struct SessionClock {
    elapsed: f64,
}

impl SessionClock {
    pub fn new() -> Self {
        Self { elapsed: 0.0 }
    }

    /// Add frame time (seconds). Negative deltas are ignored.
    pub fn advance(&mut self, dt: f32) {
        if dt > 0.0 {
            self.elapsed += dt as f64;
        }
    }

    /// Total elapsed time in seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Elapsed time rounded to whole seconds, as shown on the session screen.
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed.round() as u64
    }
}

/// One-shot countdown, used for the pause between answer feedback and the
/// next question.
#[derive(Debug, Clone, Default)]
pub struct Delay {
    remaining: Option<f32>,
}

impl Delay {
    pub fn new() -> Self {
        Self { remaining: None }
    }

    /// Arm the delay. Re-arming restarts the countdown.
    pub fn start(&mut self, seconds: f32) {
        self.remaining = Some(seconds.max(0.0));
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_pending(&self) -> bool {
        self.remaining.is_some()
    }

    /// Advance by `dt`. Returns true exactly once, on the tick the delay
    /// runs out.
    pub fn tick(&mut self, dt: f32) -> bool {
        match self.remaining {
            Some(left) => {
                let left = left - dt;
                if left <= 0.0 {
                    self.remaining = None;
                    true
                } else {
                    self.remaining = Some(left);
                    false
                }
            }
            None => false,
        }
    }
}
