//! # Conjecture Arrays
//!
//! Generators for dense n-dimensional arrays, their shapes and their element
//! type descriptors, built on a small conjecture-style generator algebra.
//!
//! All randomness flows through a [`DataSource`], so every generated array
//! can be replayed from the recorded stream that produced it.

pub mod data;
pub mod distributions;
pub mod floats;
pub mod strings;
pub mod errors;
pub mod strategies;
pub mod dtype;
pub mod array;
pub mod shapes;
pub mod dtypes;
pub mod arrays;

// Re-export the public surface
pub use data::{DataSource, DataStream, Draw, DrawError, DrawSpan};
pub use errors::InvalidArgument;
pub use strategies::{BoxedGenerator, Generator};
pub use dtype::{ByteOrder, Complex, DType, Element, Kind};
pub use array::NdArray;
pub use shapes::{array_shapes, order_check, ShapeConfig};
pub use dtypes::{
    boolean_dtypes, complex_number_dtypes, dtype_factory, floating_dtypes, integer_dtypes,
    scalar_dtypes, unsigned_integer_dtypes, DtypeConfig, Endianness,
};
pub use arrays::{arrays, from_dtype, ArrayGenerator, Arrays, Drawn, IntoDType, IntoShape};
