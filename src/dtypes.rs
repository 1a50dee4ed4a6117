//! # Descriptor generators
//!
//! Generators whose values are realized [`DType`]s. Every numeric family is a
//! specialization of [`dtype_factory`]: a requested set of widths (in bits)
//! is validated against the kind's valid widths, converted to bytes, and
//! sampled uniformly. The byte order comes from an [`Endianness`] policy;
//! [`Endianness::Either`] picks little or big endian with equal probability
//! on each draw.
//!
//! Descriptors are built structurally from `(kind, width, byte order)` and
//! never go through the descriptor string syntax.

use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::dtype::{ByteOrder, DType, Kind};
use crate::errors::{check_argument, InvalidArgument};
use crate::strategies::{just, one_of, sampled_from, BoxedGenerator, Generator};

pub const INTEGER_SIZES: &[u32] = &[8, 16, 32, 64];
pub const FLOAT_SIZES: &[u32] = &[16, 32, 64];
pub const VALID_FLOAT_SIZES: &[u32] = &[16, 32, 64, 96, 128];
pub const COMPLEX_SIZES: &[u32] = &[64, 128];
pub const VALID_COMPLEX_SIZES: &[u32] = &[64, 128, 192, 256];

/// Byte order policy for generated descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    /// `<`
    Little,
    /// `>`
    Big,
    /// `=`, the byte order of the target
    Native,
    /// `?`, little or big chosen per draw
    Either,
}

impl Endianness {
    pub fn code(self) -> char {
        match self {
            Endianness::Little => '<',
            Endianness::Big => '>',
            Endianness::Native => '=',
            Endianness::Either => '?',
        }
    }

    fn byte_orders(self) -> Vec<ByteOrder> {
        match self {
            Endianness::Little => vec![ByteOrder::Little],
            Endianness::Big => vec![ByteOrder::Big],
            Endianness::Native => vec![ByteOrder::native()],
            Endianness::Either => vec![ByteOrder::Little, ByteOrder::Big],
        }
    }
}

impl Default for Endianness {
    fn default() -> Self {
        Endianness::Either
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

fn unknown_endianness(code: &str) -> InvalidArgument {
    InvalidArgument::new(format!(
        "Unknown endianness: was {:?}, must be in [\"?\", \"<\", \"=\", \">\"]",
        code
    ))
}

impl TryFrom<char> for Endianness {
    type Error = InvalidArgument;

    fn try_from(c: char) -> Result<Endianness, InvalidArgument> {
        match c {
            '<' => Ok(Endianness::Little),
            '>' => Ok(Endianness::Big),
            '=' => Ok(Endianness::Native),
            '?' => Ok(Endianness::Either),
            _ => Err(unknown_endianness(&c.to_string())),
        }
    }
}

impl FromStr for Endianness {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Endianness, InvalidArgument> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Endianness::try_from(c).map_err(|_| unknown_endianness(s)),
            _ => Err(unknown_endianness(s)),
        }
    }
}

/// Options shared by the numeric descriptor families.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DtypeConfig {
    pub endianness: Endianness,

    /// Widths in bits. `None` uses the family's default widths.
    pub sizes: Option<Vec<u32>>,
}

impl DtypeConfig {
    pub fn endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    pub fn sizes(mut self, sizes: Vec<u32>) -> Self {
        self.sizes = Some(sizes);
        self
    }

    pub fn size(self, size: u32) -> Self {
        self.sizes(vec![size])
    }
}

/// Descriptors of `kind` with a width drawn from `sizes`.
///
/// When `valid_sizes` is given, `sizes` are widths in bits and must be a
/// non-empty subset of it. Without it, `sizes` are item sizes in bytes.
pub fn dtype_factory(
    kind: Kind,
    sizes: &[u32],
    valid_sizes: Option<&[u32]>,
    endianness: Endianness,
) -> Result<BoxedGenerator<DType>, InvalidArgument> {
    let mut widths: Vec<usize> = match valid_sizes {
        Some(valid_sizes) => {
            check_argument(!sizes.is_empty(), || {
                "Dtype must have at least one possible size.".to_string()
            })?;
            check_argument(sizes.iter().all(|s| valid_sizes.contains(s)), || {
                format!(
                    "Invalid sizes: was {:?} must be an item or sequence in {:?}",
                    sizes, valid_sizes
                )
            })?;
            sizes.iter().map(|&bits| bits as usize / 8).collect()
        }
        None => sizes.iter().map(|&bytes| bytes as usize).collect(),
    };
    widths.sort_unstable();
    widths.dedup();

    debug!(
        "dtype_factory: kind '{}', byte widths {:?}, endianness '{}'",
        kind.code(),
        widths,
        endianness
    );

    let mut branches = Vec::new();
    for order in endianness.byte_orders() {
        let dtypes = widths
            .iter()
            .map(|&width| DType::new(kind, width, order))
            .collect::<Result<Vec<DType>, InvalidArgument>>()?;
        branches.push(sampled_from(dtypes)?.boxed());
    }

    if branches.len() == 1 {
        Ok(branches.remove(0))
    } else {
        Ok(one_of(branches)?.boxed())
    }
}

fn family(
    kind: Kind,
    config: DtypeConfig,
    default_sizes: &[u32],
    valid_sizes: &[u32],
) -> Result<BoxedGenerator<DType>, InvalidArgument> {
    let sizes = config.sizes.unwrap_or_else(|| default_sizes.to_vec());
    dtype_factory(kind, &sizes, Some(valid_sizes), config.endianness)
}

/// The single boolean descriptor, `|b1`.
pub fn boolean_dtypes() -> BoxedGenerator<DType> {
    just(DType::bool()).boxed()
}

pub fn unsigned_integer_dtypes(config: DtypeConfig) -> Result<BoxedGenerator<DType>, InvalidArgument> {
    family(Kind::UInt, config, INTEGER_SIZES, INTEGER_SIZES)
}

pub fn integer_dtypes(config: DtypeConfig) -> Result<BoxedGenerator<DType>, InvalidArgument> {
    family(Kind::Int, config, INTEGER_SIZES, INTEGER_SIZES)
}

/// Floats default to 16, 32 and 64 bits; 96 and 128 are accepted on request.
pub fn floating_dtypes(config: DtypeConfig) -> Result<BoxedGenerator<DType>, InvalidArgument> {
    family(Kind::Float, config, FLOAT_SIZES, VALID_FLOAT_SIZES)
}

/// Sizes are the width of the whole number, both components together.
pub fn complex_number_dtypes(config: DtypeConfig) -> Result<BoxedGenerator<DType>, InvalidArgument> {
    family(Kind::Complex, config, COMPLEX_SIZES, VALID_COMPLEX_SIZES)
}

/// Any scalar descriptor: the five families with their defaults, each chosen
/// with equal probability.
pub fn scalar_dtypes() -> Result<BoxedGenerator<DType>, InvalidArgument> {
    Ok(one_of(vec![
        boolean_dtypes(),
        integer_dtypes(DtypeConfig::default())?,
        unsigned_integer_dtypes(DtypeConfig::default())?,
        floating_dtypes(DtypeConfig::default())?,
        complex_number_dtypes(DtypeConfig::default())?,
    ])?
    .boxed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataSource;
    use std::collections::HashSet;

    fn sample(generator: &BoxedGenerator<DType>, n: usize) -> Vec<DType> {
        let mut source = DataSource::from_seed(21);
        (0..n).map(|_| generator.draw(&mut source).unwrap()).collect()
    }

    #[test]
    fn test_parse_endianness() {
        assert_eq!("<".parse::<Endianness>().unwrap(), Endianness::Little);
        assert_eq!(">".parse::<Endianness>().unwrap(), Endianness::Big);
        assert_eq!("=".parse::<Endianness>().unwrap(), Endianness::Native);
        assert_eq!("?".parse::<Endianness>().unwrap(), Endianness::Either);
        assert_eq!(Endianness::try_from('<').unwrap(), Endianness::Little);

        let err = "x".parse::<Endianness>().unwrap_err();
        assert_eq!(
            err.message(),
            "Unknown endianness: was \"x\", must be in [\"?\", \"<\", \"=\", \">\"]"
        );
        assert!("<<".parse::<Endianness>().is_err());
        assert!("".parse::<Endianness>().is_err());
    }

    #[test]
    fn test_config_builders() {
        let config = DtypeConfig::default().endianness(Endianness::Big).size(32);
        assert_eq!(config.endianness, Endianness::Big);
        assert_eq!(config.sizes, Some(vec![32]));
        assert_eq!(DtypeConfig::default().endianness, Endianness::Either);
        assert_eq!(DtypeConfig::default().sizes, None);
    }

    #[test]
    fn test_invalid_sizes_message() {
        let err = unsigned_integer_dtypes(DtypeConfig::default().size(7)).unwrap_err();
        assert_eq!(
            err.message(),
            "Invalid sizes: was [7] must be an item or sequence in [8, 16, 32, 64]"
        );
    }

    #[test]
    fn test_empty_sizes_rejected() {
        let err = integer_dtypes(DtypeConfig::default().sizes(Vec::new())).unwrap_err();
        assert_eq!(err.message(), "Dtype must have at least one possible size.");
        assert!(dtype_factory(Kind::Int, &[], None, Endianness::Little).is_err());
    }

    #[test]
    fn test_sizes_are_deduplicated() {
        let g = dtype_factory(Kind::Int, &[32, 32, 32], Some(INTEGER_SIZES), Endianness::Little).unwrap();
        assert!(sample(&g, 20).iter().all(|d| d.itemsize() == 4));
    }

    #[test]
    fn test_unvalidated_sizes_are_item_sizes() {
        let g = dtype_factory(Kind::Bytes, &[5], None, Endianness::Little).unwrap();
        assert!(sample(&g, 20).iter().all(|d| d.itemsize() == 5 && d.to_string() == "|S5"));

        let g = dtype_factory(Kind::Int, &[4, 4, 2], None, Endianness::Big).unwrap();
        let sizes: HashSet<usize> = sample(&g, 100).iter().map(|d| d.itemsize()).collect();
        assert_eq!(sizes, [2, 4].into_iter().collect());
    }

    #[test]
    fn test_native_endianness() {
        let g = floating_dtypes(DtypeConfig::default().endianness(Endianness::Native).size(64)).unwrap();
        assert!(sample(&g, 20).iter().all(|d| d.byteorder() == ByteOrder::native()));
    }

    #[test]
    fn test_float_defaults() {
        let g = floating_dtypes(DtypeConfig::default()).unwrap();
        let sizes: HashSet<usize> = sample(&g, 300).iter().map(|d| d.itemsize()).collect();
        assert_eq!(sizes, [2, 4, 8].into_iter().collect());
    }

    #[test]
    fn test_wide_floats_on_request() {
        let g = floating_dtypes(DtypeConfig::default().sizes(vec![96, 128])).unwrap();
        assert!(sample(&g, 50).iter().all(|d| d.itemsize() == 12 || d.itemsize() == 16));
    }

    #[test]
    fn test_boolean_dtypes() {
        assert!(sample(&boolean_dtypes(), 10).iter().all(|d| *d == DType::bool()));
    }

    #[test]
    fn test_scalar_dtypes_cover_all_kinds() {
        let g = scalar_dtypes().unwrap();
        let kinds: HashSet<char> = sample(&g, 500).iter().map(|d| d.kind().code()).collect();
        assert_eq!(kinds, ['b', 'i', 'u', 'f', 'c'].into_iter().collect());
    }
}
