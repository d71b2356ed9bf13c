//! Tick-driven joint tweens.
//!
//! Each process is a small state machine that moves one or two angles by a
//! fixed rate pair per tick and switches rates when the driving angle crosses
//! a threshold. A tick never reschedules anything itself; it returns
//! [`TickResult`] and the caller decides whether another tick is needed.
//! Ticks are fixed-size (`TICK_INTERVAL_MS`), so a sequence of ticks from a
//! given pose always produces the same angles.

use crate::pose::{AngleId, PoseState, Side};

pub const TICK_INTERVAL_MS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    Continue,
    Halt,
}

/// Angle deltas applied on every tick while a phase is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatePair {
    pub primary: f32,
    pub secondary: f32,
}

impl RatePair {
    pub const fn new(primary: f32, secondary: f32) -> Self {
        Self { primary, secondary }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaitPhase {
    Swing,
    Return,
    Settle,
}

/// One forward-swing / back-swing / settle step of a leg. Runs once to
/// completion per activation.
#[derive(Debug, Clone)]
pub struct GaitCycle {
    pub side: Side,
    running: bool,
    phase: GaitPhase,
    rates: RatePair,
}

impl GaitCycle {
    pub const SWING_RATES: RatePair = RatePair::new(1.0, -1.0);
    pub const RETURN_RATES: RatePair = RatePair::new(-1.5, 0.25);
    pub const SETTLE_RATES: RatePair = RatePair::new(-0.5, 2.5);
    pub const RETURN_AT_DEG: f32 = 40.0;
    pub const SETTLE_AT_DEG: f32 = -10.0;
    pub const HALT_AT_DEG: f32 = -20.0;

    pub fn new(side: Side) -> Self {
        Self {
            side,
            running: false,
            phase: GaitPhase::Swing,
            rates: Self::SWING_RATES,
        }
    }

    /// Zero the leg and start from the swing phase.
    pub fn arm(&mut self, pose: &mut PoseState) {
        pose.reset_leg(self.side);
        self.running = true;
        self.phase = GaitPhase::Swing;
        self.rates = Self::SWING_RATES;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn phase(&self) -> GaitPhase {
        self.phase
    }

    pub fn tick(&mut self, pose: &mut PoseState) -> TickResult {
        if !self.running {
            return TickResult::Halt;
        }

        let hip = pose.limb(self.side).hip;
        if hip >= Self::RETURN_AT_DEG {
            self.phase = GaitPhase::Return;
            self.rates = Self::RETURN_RATES;
        } else if hip <= Self::HALT_AT_DEG {
            self.running = false;
            log::info!("Gait cycle ({}) finished", self.side.label());
            return TickResult::Halt;
        } else if hip <= Self::SETTLE_AT_DEG {
            self.phase = GaitPhase::Settle;
            self.rates = Self::SETTLE_RATES;
        }

        pose.add(AngleId::Hip(self.side), self.rates.primary);
        pose.add(AngleId::Knee(self.side), self.rates.secondary);
        TickResult::Continue
    }
}

/// Raise-and-lower swing of one arm: shoulder drops to -45 degrees, then
/// comes back until it passes zero.
#[derive(Debug, Clone)]
pub struct ArmSwing {
    pub side: Side,
    running: bool,
    rates: RatePair,
}

impl ArmSwing {
    pub const OUT_RATES: RatePair = RatePair::new(-0.75, 1.5);
    pub const BACK_RATES: RatePair = RatePair::new(0.75, -1.5);
    pub const TURN_AT_DEG: f32 = -45.0;

    pub fn new(side: Side) -> Self {
        Self {
            side,
            running: false,
            rates: Self::OUT_RATES,
        }
    }

    pub fn arm(&mut self, pose: &mut PoseState) {
        pose.reset_arm(self.side);
        self.running = true;
        self.rates = Self::OUT_RATES;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tick(&mut self, pose: &mut PoseState) -> TickResult {
        if !self.running {
            return TickResult::Halt;
        }

        let shoulder = pose.limb(self.side).shoulder;
        if shoulder <= Self::TURN_AT_DEG {
            self.rates = Self::BACK_RATES;
        } else if shoulder > 0.0 {
            self.running = false;
            log::info!("Arm swing ({}) finished", self.side.label());
            return TickResult::Halt;
        }

        pose.add(AngleId::Shoulder(self.side), self.rates.primary);
        pose.add(AngleId::Elbow(self.side), self.rates.secondary);
        TickResult::Continue
    }
}

/// Continuous cannon rotation. Stopping is cooperative: the stop flag is
/// checked at the start of the next tick.
#[derive(Debug, Clone, Default)]
pub struct CannonSpin {
    spinning: bool,
    stop_requested: bool,
}

impl CannonSpin {
    pub const RATE_DEG: f32 = 1.0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if this call started a new spin. Starting while already
    /// spinning only cancels a pending stop.
    pub fn start(&mut self) -> bool {
        self.stop_requested = false;
        if self.spinning {
            return false;
        }
        self.spinning = true;
        true
    }

    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    pub fn is_running(&self) -> bool {
        self.spinning
    }

    pub fn tick(&mut self, pose: &mut PoseState) -> TickResult {
        if !self.spinning {
            return TickResult::Halt;
        }
        if self.stop_requested {
            self.spinning = false;
            log::info!("Cannon spin stopped at {:.1} deg", pose.cannon_yaw);
            return TickResult::Halt;
        }
        pose.add(AngleId::CannonYaw, Self::RATE_DEG);
        TickResult::Continue
    }
}

/// All tween processes of the robot, advanced together once per tick.
#[derive(Debug, Clone)]
pub struct AnimationDriver {
    pub gait: GaitCycle,
    pub arm_swing: ArmSwing,
    pub cannon: CannonSpin,
    ticks: u64,
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self {
            gait: GaitCycle::new(Side::Left),
            arm_swing: ArmSwing::new(Side::Right),
            cannon: CannonSpin::new(),
            ticks: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.gait.is_running() || self.arm_swing.is_running() || self.cannon.is_running()
    }

    /// Labels of the processes that still want ticks.
    pub fn running_labels(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();
        if self.gait.is_running() {
            labels.push("gait");
        }
        if self.arm_swing.is_running() {
            labels.push("arm swing");
        }
        if self.cannon.is_running() {
            labels.push("cannon spin");
        }
        labels
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance every running process once. Returns true if any angle moved.
    pub fn tick(&mut self, pose: &mut PoseState) -> bool {
        if !self.is_active() {
            return false;
        }
        self.ticks += 1;

        let results = [
            self.gait.tick(pose),
            self.arm_swing.tick(pose),
            self.cannon.tick(pose),
        ];
        results.contains(&TickResult::Continue)
    }
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self::new()
    }
}
