//! Descriptor families: widths, byte orders and validation.

use std::collections::HashSet;

use conjecture_arrays::{
    complex_number_dtypes, dtype_factory, floating_dtypes, integer_dtypes, unsigned_integer_dtypes,
    BoxedGenerator, ByteOrder, DType, DataSource, DtypeConfig, Endianness, Generator, Kind,
};

fn sample(generator: &BoxedGenerator<DType>, seed: u64, n: usize) -> Vec<DType> {
    let mut source = DataSource::from_seed(seed);
    (0..n).map(|_| generator.draw(&mut source).unwrap()).collect()
}

#[test]
fn test_requested_sizes_only() {
    let g = unsigned_integer_dtypes(DtypeConfig::default().sizes(vec![8, 16])).unwrap();
    let sizes: HashSet<usize> = sample(&g, 1, 200).iter().map(|d| d.itemsize()).collect();
    assert_eq!(sizes, [1, 2].into_iter().collect());
}

#[test]
fn test_invalid_size_rejected() {
    assert!(unsigned_integer_dtypes(DtypeConfig::default().size(7)).is_err());
    assert!(integer_dtypes(DtypeConfig::default().sizes(vec![8, 128])).is_err());
    assert!(floating_dtypes(DtypeConfig::default().size(8)).is_err());
    assert!(complex_number_dtypes(DtypeConfig::default().size(32)).is_err());
}

#[test]
fn test_little_endian_only() {
    let g = complex_number_dtypes(DtypeConfig::default().endianness(Endianness::Little)).unwrap();
    for dtype in sample(&g, 2, 100) {
        assert_eq!(dtype.kind(), Kind::Complex);
        assert_eq!(dtype.byteorder(), ByteOrder::Little);
    }
}

#[test]
fn test_either_endianness_reaches_both() {
    let g = complex_number_dtypes(DtypeConfig::default()).unwrap();
    let orders: HashSet<ByteOrder> = sample(&g, 3, 200).iter().map(|d| d.byteorder()).collect();
    assert!(orders.contains(&ByteOrder::Little));
    assert!(orders.contains(&ByteOrder::Big));
}

#[test]
fn test_endianness_from_codes() {
    let endianness: Endianness = ">".parse().unwrap();
    let g = integer_dtypes(DtypeConfig::default().endianness(endianness).size(32)).unwrap();
    assert!(sample(&g, 4, 20).iter().all(|d| d.to_string() == ">i4"));
    assert!("little".parse::<Endianness>().is_err());
}

#[test]
fn test_single_byte_descriptors_have_no_byte_order() {
    let g = integer_dtypes(DtypeConfig::default().size(8)).unwrap();
    assert!(sample(&g, 5, 50).iter().all(|d| d.to_string() == "|i1"));
}

#[test]
fn test_generated_descriptors_parse_back() {
    let g = floating_dtypes(DtypeConfig::default()).unwrap();
    for dtype in sample(&g, 6, 50) {
        assert_eq!(dtype.to_string().parse::<DType>().unwrap(), dtype);
    }
}

#[test]
fn test_factory_without_valid_sizes() {
    let g = dtype_factory(Kind::UInt, &[8, 1, 8], None, Endianness::Big).unwrap();
    let sizes: HashSet<usize> = sample(&g, 7, 100).iter().map(|d| d.itemsize()).collect();
    assert_eq!(sizes, [1, 8].into_iter().collect());

    let g = dtype_factory(Kind::Bytes, &[5], None, Endianness::Little).unwrap();
    assert!(sample(&g, 8, 20).iter().all(|d| d.itemsize() == 5));
}

#[test]
fn test_factory_with_valid_sizes_converts_bits() {
    let g = dtype_factory(Kind::UInt, &[64, 8, 64], Some(&[8, 16, 32, 64][..]), Endianness::Big).unwrap();
    let sizes: HashSet<usize> = sample(&g, 9, 100).iter().map(|d| d.itemsize()).collect();
    assert_eq!(sizes, [1, 8].into_iter().collect());
}
