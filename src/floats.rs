// Float drawing for array cells, using a lexicographic word encoding.
// Floats are drawn at binary64 and rounded to the storage width of the
// descriptor they end up in (binary16, binary32 or binary64).

use crate::data::{DataSource, Draw};
use crate::distributions::bounded_int;
use half::f16;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatWidth {
    Width16,
    Width32,
    Width64,
}

impl FloatWidth {
    /// Width for an item size in bytes, if it is an IEEE interchange format.
    pub fn from_itemsize(itemsize: usize) -> Option<FloatWidth> {
        match itemsize {
            2 => Some(FloatWidth::Width16),
            4 => Some(FloatWidth::Width32),
            8 => Some(FloatWidth::Width64),
            _ => None,
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            FloatWidth::Width16 => 16,
            FloatWidth::Width32 => 32,
            FloatWidth::Width64 => 64,
        }
    }

    pub fn exponent_bits(self) -> u32 {
        match self {
            FloatWidth::Width16 => 5,
            FloatWidth::Width32 => 8,
            FloatWidth::Width64 => 11,
        }
    }

    pub fn mantissa_bits(self) -> u32 {
        match self {
            FloatWidth::Width16 => 10,
            FloatWidth::Width32 => 23,
            FloatWidth::Width64 => 52,
        }
    }

    pub fn bias(self) -> i32 {
        match self {
            FloatWidth::Width16 => 15,
            FloatWidth::Width32 => 127,
            FloatWidth::Width64 => 1023,
        }
    }

    pub fn max_exponent(self) -> u32 {
        (1 << self.exponent_bits()) - 1
    }

    pub fn mantissa_mask(self) -> u64 {
        (1u64 << self.mantissa_bits()) - 1
    }
}

// Exponents are ordered so that simpler floats come first: non-negative
// unbiased exponents ascending, then negative ones, then inf/nan.
fn exponent_key(e: u32, width: FloatWidth) -> f64 {
    if e == width.max_exponent() {
        f64::INFINITY
    } else {
        let unbiased = e as i32 - width.bias();
        if unbiased < 0 {
            10000.0 - unbiased as f64
        } else {
            unbiased as f64
        }
    }
}

fn encoding_table() -> &'static [u32] {
    static TABLE: OnceLock<Vec<u32>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let width = FloatWidth::Width64;
        let mut exponents: Vec<u32> = (0..=width.max_exponent()).collect();
        exponents.sort_by(|&a, &b| exponent_key(a, width).total_cmp(&exponent_key(b, width)));
        exponents
    })
}

fn reverse_bits(x: u64, n: u32) -> u64 {
    if n == 0 {
        return 0;
    }
    x.reverse_bits() >> (64 - n)
}

fn update_mantissa(unbiased_exponent: i32, mantissa: u64, width: FloatWidth) -> u64 {
    let mantissa_bits = width.mantissa_bits();

    if unbiased_exponent <= 0 {
        reverse_bits(mantissa, mantissa_bits)
    } else if unbiased_exponent <= mantissa_bits as i32 - 1 {
        let n_fractional_bits = mantissa_bits - unbiased_exponent as u32;
        let fractional_part = mantissa & ((1 << n_fractional_bits) - 1);
        let integer_part = mantissa ^ fractional_part;
        integer_part | reverse_bits(fractional_part, n_fractional_bits)
    } else {
        mantissa
    }
}

/// Decode a lexicographically ordered word into a non-negative binary64.
///
/// Words with the top bit clear are small integers; the rest carry a
/// reordered exponent and mantissa.
pub fn lex_to_float(i: u64) -> f64 {
    let width = FloatWidth::Width64;
    let has_fractional_part = (i >> 63) != 0;

    if has_fractional_part {
        let exponent_idx = (i >> width.mantissa_bits()) & ((1 << width.exponent_bits()) - 1);
        let exponent = encoding_table()[exponent_idx as usize];
        let mantissa = update_mantissa(
            exponent as i32 - width.bias(),
            i & width.mantissa_mask(),
            width,
        );
        f64::from_bits(((exponent as u64) << width.mantissa_bits()) | mantissa)
    } else {
        let integral_part = i & ((1 << 56) - 1);
        integral_part as f64
    }
}

const NASTY_FLOATS: [f64; 12] = [
    0.0,
    -0.0,
    1.0,
    -1.0,
    0.5,
    f64::INFINITY,
    f64::NEG_INFINITY,
    f64::NAN,
    f64::MIN_POSITIVE,
    f64::EPSILON,
    f64::MAX,
    65504.0,
];

/// Draw any binary64, NaN and infinities included.
pub fn draw_float(source: &mut DataSource) -> Draw<f64> {
    if source.bits(5)? == 0 {
        let i = bounded_int(source, NASTY_FLOATS.len() as u64 - 1)? as usize;
        return Ok(NASTY_FLOATS[i]);
    }

    let magnitude = lex_to_float(source.bits(64)?);
    if source.bits(1)? == 1 {
        Ok(-magnitude)
    } else {
        Ok(magnitude)
    }
}

/// Round a binary64 to the nearest value representable at `width`.
pub fn round_to_width(value: f64, width: FloatWidth) -> f64 {
    match width {
        FloatWidth::Width16 => f16::from_f64(value).to_f64(),
        FloatWidth::Width32 => value as f32 as f64,
        FloatWidth::Width64 => value,
    }
}

/// Raw IEEE bits of `value` stored at `width`.
pub fn float_to_int(value: f64, width: FloatWidth) -> u64 {
    match width {
        FloatWidth::Width16 => f16::from_f64(value).to_bits() as u64,
        FloatWidth::Width32 => (value as f32).to_bits() as u64,
        FloatWidth::Width64 => value.to_bits(),
    }
}
