//! Bit-exact reimplementation of the 48-bit linear congruential generator used by
//! the game for world generation, so seeds produce the same sequences.

use quarry_common::{QuarryError, Result};

const MULTIPLIER: i64 = 0x5DEECE66D;
const ADDEND: i64 = 0xB;
const MASK: i64 = (1 << 48) - 1;
const FLOAT_UNIT: f32 = 1.0 / (1u32 << 24) as f32;
const DOUBLE_UNIT: f64 = 1.0 / (1u64 << 53) as f64;

#[derive(Debug, Clone)]
pub struct JavaRandom {
    state: i64,
    next_gaussian: Option<f64>,
}

impl JavaRandom {
    pub fn new(seed: i64) -> Self {
        JavaRandom {
            state: scramble(seed),
            next_gaussian: None,
        }
    }

    /// Resets the generator as if it had just been created with `seed`.
    pub fn set_seed(&mut self, seed: i64) {
        self.state = scramble(seed);
        self.next_gaussian = None;
    }

    /// Advances the state and returns its top `bits` bits (1..=32).
    fn next(&mut self, bits: u32) -> i32 {
        debug_assert!((1..=32).contains(&bits));
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(ADDEND)
            & MASK;
        (self.state >> (48 - bits)) as u32 as i32
    }

    pub fn next_int(&mut self) -> i32 {
        self.next(32)
    }

    /// Uniform value in `[0, bound)`.
    pub fn next_int_bounded(&mut self, bound: i32) -> Result<i32> {
        if bound <= 0 {
            return Err(QuarryError::ValueOutOfRange {
                field: "bound",
                value: bound as i64,
            });
        }
        if bound & bound.wrapping_neg() == bound {
            return Ok(((bound as i64 * self.next(31) as i64) >> 31) as i32);
        }
        loop {
            let bits = self.next(31);
            let value = bits % bound;
            // Reject draws from the last, partial bucket.
            if bits.wrapping_sub(value).wrapping_add(bound - 1) >= 0 {
                return Ok(value);
            }
        }
    }

    pub fn next_long(&mut self) -> i64 {
        let high = (self.next(32) as i64) << 32;
        high.wrapping_add(self.next(32) as i64)
    }

    pub fn next_bool(&mut self) -> bool {
        self.next(1) != 0
    }

    /// Uniform value in `[0, 1)` with 24 bits of precision.
    pub fn next_float(&mut self) -> f32 {
        self.next(24) as f32 * FLOAT_UNIT
    }

    /// Uniform value in `[0, 1)` with 53 bits of precision.
    pub fn next_double(&mut self) -> f64 {
        let high = (self.next(26) as i64) << 27;
        (high + self.next(27) as i64) as f64 * DOUBLE_UNIT
    }

    /// Fills `bytes`, four bytes per drawn int, low byte first.
    pub fn next_bytes(&mut self, bytes: &mut [i8]) {
        for chunk in bytes.chunks_mut(4) {
            let mut rnd = self.next_int();
            for byte in chunk {
                *byte = rnd as i8;
                rnd >>= 8;
            }
        }
    }

    /// Standard normal sample. Values are produced in pairs; the second is cached.
    pub fn next_gaussian(&mut self) -> f64 {
        if let Some(cached) = self.next_gaussian.take() {
            return cached;
        }
        loop {
            let v1 = 2.0 * self.next_double() - 1.0;
            let v2 = 2.0 * self.next_double() - 1.0;
            let s = v1 * v1 + v2 * v2;
            if s < 1.0 && s != 0.0 {
                let multiplier = (-2.0 * s.ln() / s).sqrt();
                self.next_gaussian = Some(v2 * multiplier);
                return v1 * multiplier;
            }
        }
    }
}

fn scramble(seed: i64) -> i64 {
    (seed ^ MULTIPLIER) & MASK
}
