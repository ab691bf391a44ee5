//! Frame clock with a simulation-step divider and step timing

use std::time::Duration;

/// Simulation steps slower than this are reported as over budget.
pub const STEP_BUDGET: Duration = Duration::from_millis(16);

/// Counts display frames and decides which of them run a simulation step.
///
/// The simulation advances once every `update_interval` frames; everything
/// else (orbit angle, rendering) runs every frame.
pub struct FrameClock {
    /// Frames ticked so far
    pub frame: u64,
    /// Simulation step divider (default: every 3rd frame)
    pub update_interval: u32,
    /// Duration of the most recent simulation step
    pub last_step: Duration,
    /// Longest simulation step seen
    pub worst_step: Duration,
    /// Number of steps that exceeded [`STEP_BUDGET`]
    pub over_budget: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            frame: 0,
            update_interval: 3,
            last_step: Duration::ZERO,
            worst_step: Duration::ZERO,
            over_budget: 0,
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock that steps every `interval` frames (0 is treated as 1)
    pub fn with_update_interval(interval: u32) -> Self {
        Self {
            update_interval: interval.max(1),
            ..Self::default()
        }
    }

    /// Advance one frame. Returns true if this frame should run a simulation
    /// step.
    pub fn tick(&mut self) -> bool {
        self.frame += 1;
        self.should_step()
    }

    /// Whether the current frame is a simulation frame
    pub fn should_step(&self) -> bool {
        self.frame % self.update_interval.max(1) as u64 == 0
    }

    /// Record how long a simulation step took. Returns true if it exceeded
    /// [`STEP_BUDGET`].
    pub fn record_step(&mut self, elapsed: Duration) -> bool {
        self.last_step = elapsed;
        self.worst_step = self.worst_step.max(elapsed);
        let over = elapsed > STEP_BUDGET;
        if over {
            self.over_budget += 1;
        }
        over
    }

    /// Restart frame counting, e.g. after the swarm is respawned
    pub fn reset(&mut self) {
        let interval = self.update_interval;
        *self = Self::with_update_interval(interval);
    }
}
