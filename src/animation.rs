//! Per-tick animation rules.
//!
//! Time advances by a fixed nominal step per tick rather than by wall clock,
//! so the motion is the same on every machine that keeps up with the refresh
//! rate. Elapsed time is an exact [`Duration`] sum; the palette index is
//! derived from it, never accumulated separately.

use std::time::Duration;

use crate::input::PointerState;

/// Base spin of the whole composition per tick, around X and Y.
pub const ROOT_SPIN: (f32, f32) = (0.005, 0.007);
/// Extra spin per tick at full pointer deflection.
pub const POINTER_BIAS: f32 = 0.002;
/// Angular frequency of the particle bob in radians per second.
pub const PARTICLE_BOB_RATE: f32 = 0.36;
pub const PARTICLE_BOB_AMPLITUDE: f32 = 0.08;
pub const PARTICLE_SPIN: f32 = 0.003;
/// Spin per tick around Z of the inner, middle and outer ring.
pub const RING_SPINS: [f32; 3] = [0.0065, -0.0045, 0.0035];

/// Rotation added to the root per tick: `(x, y)`.
pub fn root_rotation_delta(pointer: PointerState) -> (f32, f32) {
    (
        ROOT_SPIN.0 + pointer.y * POINTER_BIAS,
        ROOT_SPIN.1 + pointer.x * POINTER_BIAS,
    )
}

/// Vertical offset of the particle field after `elapsed`.
pub fn particle_offset(elapsed: Duration) -> f32 {
    (elapsed.as_secs_f32() * PARTICLE_BOB_RATE).sin() * PARTICLE_BOB_AMPLITUDE
}

/// Palette slot active after `elapsed`.
pub fn palette_index_at(elapsed: Duration, period: Duration, palette_len: usize) -> usize {
    if period.is_zero() || palette_len == 0 {
        return 0;
    }
    let steps = elapsed.as_nanos() / period.as_nanos();
    (steps % palette_len as u128) as usize
}

#[derive(Clone, Debug)]
pub struct AnimationState {
    elapsed: Duration,
    ticks: u64,
    palette_index: usize,
    step: Duration,
    period: Duration,
    palette_len: usize,
}

impl AnimationState {
    pub fn new(step: Duration, period: Duration, palette_len: usize) -> Self {
        Self {
            elapsed: Duration::ZERO,
            ticks: 0,
            palette_index: 0,
            step,
            period,
            palette_len,
        }
    }

    /// Advance by one step. Returns the new palette index if it changed.
    pub fn advance(&mut self) -> Option<usize> {
        self.elapsed += self.step;
        self.ticks += 1;
        let index = palette_index_at(self.elapsed, self.period, self.palette_len);
        (index != self.palette_index).then(|| {
            self.palette_index = index;
            index
        })
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn palette_index(&self) -> usize {
        self.palette_index
    }
}
