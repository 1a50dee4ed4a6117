//! # DataSource: the random-input stream
//!
//! Every generator in this crate draws from a `DataSource`. A source hands out
//! fixed-width words, either from a seeded ChaCha8 generator or from a stream
//! that was recorded earlier, and appends each word it hands out to its own
//! record. Feeding that record back through [`DataSource::from_vec`] replays
//! exactly the same sequence of draws, which is what makes a failing example
//! reproducible.
//!
//! ```rust
//! use conjecture_arrays::data::DataSource;
//! use conjecture_arrays::strategies::{integers, Generator};
//!
//! let digits = integers(0, 9).unwrap();
//! let mut source = DataSource::from_seed(7);
//! let first = digits.draw(&mut source).unwrap();
//!
//! let mut replay = DataSource::from_vec(source.into_record());
//! assert_eq!(digits.draw(&mut replay).unwrap(), first);
//! ```
//!
//! Draws can be wrapped in labelled spans with [`DataSource::draw`], so the
//! region of the stream consumed by each sub-draw (for example each cell of
//! an array) is known once the draw has finished.

use byteorder::{BigEndian, ByteOrder};
use crypto_hash::{digest, Algorithm};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

use crate::strategies::Generator;

pub type DataStream = Vec<u64>;

pub type Draw<T> = Result<T, DrawError>;

/// Default cap on the number of words a single source will hand out.
pub const DEFAULT_MAX_SIZE: usize = 8 * 1024;

/// Reasons a single draw can fail after its generator was built.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DrawError {
    /// The replayed stream ran out, or the source reached its size limit.
    #[error("Overran the available data")]
    Overrun,
    /// A value could not be stored into an array of the given descriptor.
    #[error("Cannot store {value} in an array of dtype {dtype}")]
    TypeMismatch { dtype: String, value: String },
}

/// Calculate a stable label for a generator from its name.
///
/// The label is the first eight bytes, read big-endian, of the SHA-256
/// digest of the name, so it is the same across runs and platforms.
pub fn calc_label_from_name(name: &str) -> u64 {
    let hash = digest(Algorithm::SHA256, name.as_bytes());
    BigEndian::read_u64(&hash[..8])
}

/// Region of the record consumed by one labelled draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawSpan {
    pub label: u64,
    pub start: usize,
    pub end: usize,
    pub depth: usize,
}

impl DrawSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone)]
enum BitGenerator {
    Random(ChaCha8Rng),
    Recorded(DataStream),
}

#[derive(Debug, Clone)]
pub struct DataSource {
    bitgenerator: BitGenerator,
    record: DataStream,
    written_indices: HashSet<usize>,
    spans: Vec<DrawSpan>,
    open_spans: Vec<(u64, usize)>,
    max_size: usize,
}

impl DataSource {
    fn new(bitgenerator: BitGenerator) -> DataSource {
        DataSource {
            bitgenerator,
            record: DataStream::new(),
            written_indices: HashSet::new(),
            spans: Vec::new(),
            open_spans: Vec::new(),
            max_size: DEFAULT_MAX_SIZE,
        }
    }

    pub fn from_seed(seed: u64) -> DataSource {
        DataSource::new(BitGenerator::Random(ChaCha8Rng::seed_from_u64(seed)))
    }

    pub fn from_vec(record: DataStream) -> DataSource {
        DataSource::new(BitGenerator::Recorded(record))
    }

    pub fn with_max_size(mut self, max_size: usize) -> DataSource {
        self.max_size = max_size;
        self
    }

    /// Hand out the next `n_bits` bits of the stream.
    pub fn bits(&mut self, n_bits: u64) -> Draw<u64> {
        assert!(n_bits <= 64);
        if self.record.len() >= self.max_size {
            return Err(DrawError::Overrun);
        }

        let mut result = match &mut self.bitgenerator {
            BitGenerator::Random(random) => random.next_u64(),
            BitGenerator::Recorded(v) => match v.get(self.record.len()) {
                Some(&value) => value,
                None => return Err(DrawError::Overrun),
            },
        };

        if n_bits < 64 {
            result &= (1u64 << n_bits) - 1;
        }

        self.record.push(result);
        Ok(result)
    }

    /// Record a value whose outcome was already decided by the caller.
    pub fn write(&mut self, value: u64) -> Draw<()> {
        if self.record.len() >= self.max_size {
            return Err(DrawError::Overrun);
        }
        if let BitGenerator::Recorded(v) = &self.bitgenerator {
            if self.record.len() >= v.len() {
                return Err(DrawError::Overrun);
            }
        }
        self.written_indices.insert(self.record.len());
        self.record.push(value);
        Ok(())
    }

    /// Draw from `generator` inside a span labelled with its label.
    pub fn draw<G: Generator + ?Sized>(&mut self, generator: &G) -> Draw<G::Output> {
        self.start_draw(generator.label());
        let result = generator.draw(self);
        self.stop_draw();
        result
    }

    pub fn start_draw(&mut self, label: u64) {
        self.open_spans.push((label, self.record.len()));
    }

    pub fn stop_draw(&mut self) {
        if let Some((label, start)) = self.open_spans.pop() {
            self.spans.push(DrawSpan {
                label,
                start,
                end: self.record.len(),
                depth: self.open_spans.len(),
            });
        }
    }

    pub fn record(&self) -> &[u64] {
        &self.record
    }

    pub fn into_record(self) -> DataStream {
        self.record
    }

    pub fn written_indices(&self) -> &HashSet<usize> {
        &self.written_indices
    }

    /// Closed spans, in the order they finished.
    pub fn spans(&self) -> &[DrawSpan] {
        &self.spans
    }

    pub fn is_replaying(&self) -> bool {
        matches!(self.bitgenerator, BitGenerator::Recorded(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_are_masked_to_width() {
        let mut source = DataSource::from_vec(vec![u64::MAX, u64::MAX, u64::MAX]);
        assert_eq!(source.bits(1).unwrap(), 1);
        assert_eq!(source.bits(8).unwrap(), 255);
        assert_eq!(source.bits(64).unwrap(), u64::MAX);
    }

    #[test]
    fn test_recorded_stream_overruns_at_end() {
        let mut source = DataSource::from_vec(vec![3]);
        assert!(source.bits(8).is_ok());
        assert_eq!(source.bits(8), Err(DrawError::Overrun));
        assert_eq!(source.write(0), Err(DrawError::Overrun));
    }

    #[test]
    fn test_max_size_limits_random_source() {
        let mut source = DataSource::from_seed(0).with_max_size(4);
        for _ in 0..4 {
            source.bits(64).unwrap();
        }
        assert_eq!(source.bits(64), Err(DrawError::Overrun));
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = DataSource::from_seed(42);
        let mut b = DataSource::from_seed(42);
        for _ in 0..32 {
            assert_eq!(a.bits(64).unwrap(), b.bits(64).unwrap());
        }
    }

    #[test]
    fn test_replaying_record_reproduces_bits() {
        let mut source = DataSource::from_seed(9);
        let drawn: Vec<u64> = (0..10).map(|i| source.bits(i * 6 + 1).unwrap()).collect();
        assert!(!source.is_replaying());

        let mut replay = DataSource::from_vec(source.into_record());
        assert!(replay.is_replaying());
        let replayed: Vec<u64> = (0..10).map(|i| replay.bits(i * 6 + 1).unwrap()).collect();
        assert_eq!(drawn, replayed);
    }

    #[test]
    fn test_write_is_recorded_and_tracked() {
        let mut source = DataSource::from_seed(1);
        source.bits(3).unwrap();
        source.write(17).unwrap();
        assert_eq!(source.record()[1], 17);
        assert!(source.written_indices().contains(&1));
        assert!(!source.written_indices().contains(&0));
    }

    #[test]
    fn test_spans_nest_and_close_in_order() {
        let mut source = DataSource::from_seed(5);
        source.start_draw(1);
        source.bits(8).unwrap();
        source.start_draw(2);
        source.bits(8).unwrap();
        source.bits(8).unwrap();
        source.stop_draw();
        source.stop_draw();

        let spans = source.spans();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0], DrawSpan { label: 2, start: 1, end: 3, depth: 1 });
        assert_eq!(spans[1], DrawSpan { label: 1, start: 0, end: 3, depth: 0 });
        assert_eq!(spans[0].len(), 2);
        assert!(!spans[0].is_empty());

        source.start_draw(3);
        source.stop_draw();
        assert!(source.spans()[2].is_empty());
    }

    #[test]
    fn test_labels_are_stable_and_distinct() {
        assert_eq!(calc_label_from_name("arrays"), calc_label_from_name("arrays"));
        assert_ne!(calc_label_from_name("arrays"), calc_label_from_name("array_shapes"));
    }

    #[test]
    fn test_draw_error_display() {
        let err = DrawError::TypeMismatch {
            dtype: "<i2".to_string(),
            value: "Str(\"x\")".to_string(),
        };
        assert_eq!(err.to_string(), "Cannot store Str(\"x\") in an array of dtype <i2");
    }
}
