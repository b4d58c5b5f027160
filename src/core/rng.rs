// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f};

const FLOAT_ONE_MINUS_EPSILON: Float = 0.99999994;

/// Counter-based random cursor. Every draw hashes `(stream, counter)` and bumps
/// the counter, so two cursors with equal fields always yield the same sequence.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct RngCursor {
    stream: u32,
    counter: u32,
}

// PCG-RXS-M-XS output permutation (Jarzynski & Olano 2020).
fn pcg_hash(input: u32) -> u32 {
    let state = input.wrapping_mul(747796405).wrapping_add(2891336453);
    let word = ((state >> ((state >> 28) + 4)) ^ state).wrapping_mul(277803737);
    (word >> 22) ^ word
}

impl RngCursor {
    pub fn new(stream: u32, counter: u32) -> Self {
        Self { stream, counter }
    }

    /// One stream per pixel; `seed` decorrelates whole renders.
    pub fn for_pixel(x: u32, y: u32, seed: u32) -> Self {
        let stream = pcg_hash(x ^ pcg_hash(y ^ pcg_hash(seed)));
        Self { stream, counter: 0 }
    }

    pub fn stream(&self) -> u32 {
        self.stream
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn next_u32(self) -> (u32, RngCursor) {
        let value = pcg_hash(self.counter ^ pcg_hash(self.stream));
        (value, RngCursor { stream: self.stream, counter: self.counter.wrapping_add(1) })
    }

    /// Uniform value in [0, 1) and the advanced cursor.
    pub fn next(self) -> (Float, RngCursor) {
        let (bits, cursor) = self.next_u32();
        let value = ((bits >> 8) as Float) * (1.0 / 16777216.0);
        (value.min(FLOAT_ONE_MINUS_EPSILON), cursor)
    }

    pub fn next_float(&mut self) -> Float {
        let (value, cursor) = self.next();
        *self = cursor;
        value
    }

    pub fn next_2d(&mut self) -> Vector2f {
        let u = self.next_float();
        let v = self.next_float();
        Vector2f::new(u, v)
    }
}
