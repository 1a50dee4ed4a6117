// String and bytes generation functions.
// Sizes are controlled by `Repeat`, so every extra character or byte is one
// deletable continue-decision in the stream.

use crate::data::{DataSource, Draw};
use crate::distributions::{bounded_int, weighted, Repeat};

// Hypothesis' average size for collections with the given bounds.
pub fn average_size(min_size: usize, max_size: usize) -> f64 {
    let min_size = min_size as f64;
    let max_size = max_size as f64;
    (min_size * 2.0).max(min_size + 5.0).min(0.5 * (min_size + max_size))
}

fn draw_char(source: &mut DataSource) -> Draw<char> {
    if weighted(source, 0.75)? {
        let c = 0x20 + bounded_int(source, 0x7e - 0x20)? as u32;
        return Ok(char::from_u32(c).unwrap_or(' '));
    }
    let c = bounded_int(source, char::MAX as u64)? as u32;
    Ok(char::from_u32(c).unwrap_or(char::REPLACEMENT_CHARACTER))
}

pub fn draw_text(source: &mut DataSource, min_size: usize, max_size: usize) -> Draw<String> {
    let mut repeat = Repeat::new(
        min_size as u64,
        max_size as u64,
        average_size(min_size, max_size) - min_size as f64,
    );
    let mut result = String::new();
    while repeat.should_continue(source)? {
        result.push(draw_char(source)?);
    }
    Ok(result)
}

pub fn draw_bytes(source: &mut DataSource, min_size: usize, max_size: usize) -> Draw<Vec<u8>> {
    let mut repeat = Repeat::new(
        min_size as u64,
        max_size as u64,
        average_size(min_size, max_size) - min_size as f64,
    );
    let mut result = Vec::new();
    while repeat.should_continue(source)? {
        result.push(source.bits(8)? as u8);
    }
    Ok(result)
}
