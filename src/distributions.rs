// General distribution functions and utilities.
// This module contains the probability distributions and repetition
// control shared by the primitive generators.

use crate::data::{DataSource, Draw};

const MAX64: u64 = u64::MAX;

pub fn weighted(source: &mut DataSource, probability: f64) -> Draw<bool> {
    // TODO: Less bit-hungry implementation.

    let truthy = (probability * (u64::MAX as f64 + 1.0)).floor() as u64;
    let probe = source.bits(64)?;
    Ok(match (truthy, probe) {
        (0, _) => false,
        (MAX64, _) => true,
        (_, 0) => false,
        (_, 1) => true,
        _ => probe >= MAX64 - truthy,
    })
}

/// Uniform integer in `[0, max]` by rejection sampling on the bit length.
pub fn bounded_int(source: &mut DataSource, max: u64) -> Draw<u64> {
    let bitlength = 64 - max.leading_zeros() as u64;
    if bitlength == 0 {
        source.write(0)?;
        return Ok(0);
    }
    loop {
        let probe = source.bits(bitlength)?;
        if probe <= max {
            return Ok(probe);
        }
    }
}

/// Length control for collections: one draw per element decides whether to
/// keep going, forced while below `min_count` or at `max_count`.
#[derive(Debug, Clone)]
pub struct Repeat {
    min_count: u64,
    max_count: u64,
    p_continue: f64,

    current_count: u64,
}

impl Repeat {
    pub fn new(min_count: u64, max_count: u64, expected_count: f64) -> Repeat {
        Repeat {
            min_count,
            max_count,
            p_continue: 1.0 - 1.0 / (1.0 + expected_count),
            current_count: 0,
        }
    }

    pub fn count(&self) -> u64 {
        self.current_count
    }

    pub fn should_continue(&mut self, source: &mut DataSource) -> Draw<bool> {
        if self.min_count == self.max_count {
            if self.current_count < self.max_count {
                self.current_count += 1;
                return Ok(true);
            } else {
                return Ok(false);
            }
        } else if self.current_count < self.min_count {
            source.write(1)?;
            self.current_count += 1;
            return Ok(true);
        } else if self.current_count >= self.max_count {
            source.write(0)?;
            return Ok(false);
        }

        let result = weighted(source, self.p_continue)?;
        if result {
            self.current_count += 1;
        }
        Ok(result)
    }
}
