//! # Array generators
//!
//! [`from_dtype`] infers an element generator from a descriptor, and
//! [`arrays`] builds a generator of whole arrays from a descriptor, a shape
//! and an optional element generator.
//!
//! An array draw fills a freshly allocated row-major buffer one cell at a
//! time. Cell `i` is always the `i`-th element draw from the stream, and each
//! element draw runs inside its own span, so the stream region behind every
//! cell is known afterwards:
//!
//! ```rust
//! use conjecture_arrays::arrays::{arrays, Drawn};
//! use conjecture_arrays::data::DataSource;
//! use conjecture_arrays::strategies::Generator;
//!
//! let matrices = arrays("<i2", [2, 3], None).unwrap();
//! let mut source = DataSource::from_seed(1);
//! match source.draw(&matrices).unwrap() {
//!     Drawn::Array(array) => assert_eq!(array.shape(), &[2, 3]),
//!     Drawn::Scalar(_) => unreachable!(),
//! }
//! assert_eq!(source.spans().iter().filter(|span| span.depth == 1).count(), 6);
//! ```
//!
//! A request for a 0-dimensional array of any kind except object is answered
//! with the element generator itself: its draws are bare scalars, not
//! one-cell arrays. Object arrays keep their container even with no axes.

use log::{debug, trace};

use crate::array::{cell_count, NdArray};
use crate::data::{DataSource, Draw};
use crate::dtype::{DType, Element, Kind};
use crate::errors::{check_argument, InvalidArgument};
use crate::strategies::{binary, booleans, complex_numbers, floats, integers, text, BoxedGenerator, Generator};

/// Casts every value of `inner` into `dtype`'s representation.
#[derive(Debug, Clone)]
struct CastTo<G> {
    inner: G,
    dtype: DType,
}

impl<G> Generator for CastTo<G>
where
    G: Generator,
    G::Output: Into<Element>,
{
    type Output = Element;

    fn draw(&self, source: &mut DataSource) -> Draw<Element> {
        let value = self.inner.draw(source)?;
        self.dtype.cast(value.into())
    }
}

fn cast_to<G>(inner: G, dtype: DType) -> BoxedGenerator<Element>
where
    G: Generator + Send + Sync + 'static,
    G::Output: Into<Element>,
{
    CastTo { inner, dtype }.boxed()
}

fn no_inference(dtype: &DType) -> InvalidArgument {
    InvalidArgument::new(format!("No strategy inference for {}", dtype))
}

/// Element generator for `dtype`, producing values already cast to it.
///
/// Object, datetime and timedelta descriptors have no inferred generator.
pub fn from_dtype(dtype: &DType) -> Result<BoxedGenerator<Element>, InvalidArgument> {
    let dtype = *dtype;
    let elements = match dtype.kind() {
        Kind::Bool => cast_to(booleans(), dtype),
        Kind::Float => cast_to(floats(), dtype),
        Kind::Complex => cast_to(complex_numbers(), dtype),
        Kind::Bytes | Kind::Void => cast_to(binary(), dtype),
        Kind::Int | Kind::UInt => {
            let (min, max) = dtype.integer_bounds().ok_or_else(|| no_inference(&dtype))?;
            cast_to(integers(min, max)?, dtype)
        }
        Kind::Unicode => cast_to(text(), dtype),
        Kind::Object | Kind::DateTime | Kind::TimeDelta => return Err(no_inference(&dtype)),
    };
    debug!("from_dtype: inferred element generator for {}", dtype);
    Ok(elements)
}

/// Generator of dense arrays with a fixed descriptor and shape.
#[derive(Debug, Clone)]
pub struct ArrayGenerator {
    elements: BoxedGenerator<Element>,
    shape: Vec<usize>,
    size: usize,
    dtype: DType,
}

impl ArrayGenerator {
    /// Fails on a zero-length axis, on a shape whose cell count overflows
    /// `usize`, and on an empty shape unless `dtype` is the object descriptor.
    pub fn new(elements: BoxedGenerator<Element>, shape: Vec<usize>, dtype: DType) -> Result<ArrayGenerator, InvalidArgument> {
        check_argument(!shape.is_empty() || dtype.kind() == Kind::Object, || {
            format!("0-dimensional {} arrays are drawn as scalars, not arrays", dtype)
        })?;
        check_argument(shape.iter().all(|&n| n > 0), || {
            format!("Array shape {:?} has a zero-length axis", shape)
        })?;
        let size = cell_count(&shape)
            .ok_or_else(|| InvalidArgument::new(format!("Array shape {:?} has too many cells", shape)))?;
        Ok(ArrayGenerator {
            elements,
            shape,
            size,
            dtype,
        })
    }

    pub fn elements(&self) -> &BoxedGenerator<Element> {
        &self.elements
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Cells per drawn array.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }
}

impl Generator for ArrayGenerator {
    type Output = NdArray;

    fn draw(&self, source: &mut DataSource) -> Draw<NdArray> {
        let mut result = NdArray::zeros(self.dtype, &self.shape);
        trace!("drawing {} array of shape {:?} ({} cells)", self.dtype, self.shape, self.size);

        for i in 0..self.size {
            let value = source.draw(&self.elements)?;
            result.set(i, self.dtype.cast(value)?);
        }
        Ok(result)
    }
}

/// Result of [`arrays`]: a bare element generator for 0-dimensional
/// non-object requests, an [`ArrayGenerator`] otherwise.
#[derive(Debug, Clone)]
pub enum Arrays {
    Scalar(BoxedGenerator<Element>),
    Array(ArrayGenerator),
}

impl Arrays {
    pub fn is_scalar(&self) -> bool {
        matches!(self, Arrays::Scalar(_))
    }

    pub fn as_array(&self) -> Option<&ArrayGenerator> {
        match self {
            Arrays::Array(generator) => Some(generator),
            Arrays::Scalar(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&BoxedGenerator<Element>> {
        match self {
            Arrays::Scalar(generator) => Some(generator),
            Arrays::Array(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Drawn {
    Scalar(Element),
    Array(NdArray),
}

impl Drawn {
    pub fn as_array(&self) -> Option<&NdArray> {
        match self {
            Drawn::Array(array) => Some(array),
            Drawn::Scalar(_) => None,
        }
    }

    pub fn into_array(self) -> Option<NdArray> {
        match self {
            Drawn::Array(array) => Some(array),
            Drawn::Scalar(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Element> {
        match self {
            Drawn::Scalar(element) => Some(element),
            Drawn::Array(_) => None,
        }
    }
}

impl Generator for Arrays {
    type Output = Drawn;

    fn draw(&self, source: &mut DataSource) -> Draw<Drawn> {
        match self {
            Arrays::Scalar(elements) => Ok(Drawn::Scalar(elements.draw(source)?)),
            Arrays::Array(generator) => Ok(Drawn::Array(generator.draw(source)?)),
        }
    }

    fn label(&self) -> u64 {
        match self {
            Arrays::Scalar(elements) => elements.label(),
            Arrays::Array(generator) => generator.label(),
        }
    }
}

/// Anything [`arrays`] accepts as a descriptor.
pub trait IntoDType {
    fn into_dtype(self) -> Result<DType, InvalidArgument>;
}

impl IntoDType for DType {
    fn into_dtype(self) -> Result<DType, InvalidArgument> {
        Ok(self)
    }
}

impl IntoDType for &DType {
    fn into_dtype(self) -> Result<DType, InvalidArgument> {
        Ok(*self)
    }
}

impl IntoDType for &str {
    fn into_dtype(self) -> Result<DType, InvalidArgument> {
        self.parse()
    }
}

impl IntoDType for String {
    fn into_dtype(self) -> Result<DType, InvalidArgument> {
        self.parse()
    }
}

/// Anything [`arrays`] accepts as a shape. A bare length is a 1-d shape.
pub trait IntoShape {
    fn into_dims(self) -> Vec<usize>;
}

impl IntoShape for usize {
    fn into_dims(self) -> Vec<usize> {
        vec![self]
    }
}

impl IntoShape for Vec<usize> {
    fn into_dims(self) -> Vec<usize> {
        self
    }
}

impl IntoShape for &[usize] {
    fn into_dims(self) -> Vec<usize> {
        self.to_vec()
    }
}

impl<const N: usize> IntoShape for [usize; N] {
    fn into_dims(self) -> Vec<usize> {
        self.to_vec()
    }
}

impl IntoShape for () {
    fn into_dims(self) -> Vec<usize> {
        Vec::new()
    }
}

/// Arrays of `dtype` with the given `shape`.
///
/// Cells come from `elements` when given and from [`from_dtype`] otherwise;
/// either way each value is cast into `dtype` as it is stored.
pub fn arrays<D, S>(dtype: D, shape: S, elements: Option<BoxedGenerator<Element>>) -> Result<Arrays, InvalidArgument>
where
    D: IntoDType,
    S: IntoShape,
{
    let dtype = dtype.into_dtype()?;
    let shape = shape.into_dims();
    let elements = match elements {
        Some(elements) => elements,
        None => from_dtype(&dtype)?,
    };

    if shape.is_empty() && dtype.kind() != Kind::Object {
        debug!("arrays: 0-dimensional {} request, drawing scalars", dtype);
        return Ok(Arrays::Scalar(elements));
    }

    debug!("arrays: {} with shape {:?}", dtype, shape);
    Ok(Arrays::Array(ArrayGenerator::new(elements, shape, dtype)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DrawError;
    use crate::strategies::just;

    fn dt(s: &str) -> DType {
        s.parse().unwrap()
    }

    #[test]
    fn test_from_dtype_matches_kind() {
        let mut source = DataSource::from_seed(2);
        let cases = [("?", 'b'), ("<f4", 'f'), (">c16", 'c'), ("S4", 'S'), ("V3", 'V'), ("<U5", 'U'), ("<i8", 'i'), (">u4", 'u')];
        for (descriptor, kind) in cases {
            let elements = from_dtype(&dt(descriptor)).unwrap();
            for _ in 0..20 {
                let value = elements.draw(&mut source).unwrap();
                let ok = match (kind, &value) {
                    ('b', Element::Bool(_)) | ('f', Element::Float(_)) | ('c', Element::Complex(_)) => true,
                    ('S', Element::Bytes(b)) => b.len() <= 4,
                    ('V', Element::Bytes(b)) => b.len() == 3,
                    ('U', Element::Str(s)) => s.chars().count() <= 5,
                    ('i', Element::Int(_)) | ('u', Element::UInt(_)) => true,
                    _ => false,
                };
                assert!(ok, "{} produced {:?}", descriptor, value);
            }
        }
    }

    #[test]
    fn test_from_dtype_rejects_object_and_times() {
        let err = from_dtype(&DType::object()).unwrap_err();
        assert_eq!(err.message(), "No strategy inference for |O");
        assert!(from_dtype(&dt("<M8")).is_err());
        assert!(from_dtype(&dt("<m8")).is_err());
    }

    #[test]
    fn test_half_floats_are_rounded() {
        let elements = from_dtype(&dt("<f2")).unwrap();
        let mut source = DataSource::from_seed(9);
        for _ in 0..100 {
            if let Element::Float(f) = elements.draw(&mut source).unwrap() {
                assert!(f.is_nan() || half::f16::from_f64(f).to_f64() == f);
            }
        }
    }

    #[test]
    fn test_array_generator_rejects_bad_shapes() {
        let elements = from_dtype(&dt("<i4")).unwrap();
        assert!(ArrayGenerator::new(elements.clone(), vec![], dt("<i4")).is_err());
        assert!(ArrayGenerator::new(elements.clone(), vec![2, 0], dt("<i4")).is_err());
        assert!(ArrayGenerator::new(elements.clone(), vec![usize::MAX, 2], dt("<i4")).is_err());
        assert_eq!(ArrayGenerator::new(elements, vec![2, 1], dt("<i4")).unwrap().size(), 2);
        assert!(ArrayGenerator::new(just(Element::None).boxed(), vec![], DType::object()).is_ok());
    }

    #[test]
    fn test_cells_fill_in_order() {
        let counter = crate::strategies::integers(0, 1000).unwrap().map(Element::from);
        let generator = match arrays("<u2", [3], Some(counter.boxed())).unwrap() {
            Arrays::Array(generator) => generator,
            Arrays::Scalar(_) => panic!("expected an array generator"),
        };
        let mut source = DataSource::from_seed(5);
        let array = generator.draw(&mut source).unwrap();

        let cells: Vec<&crate::data::DrawSpan> = source.spans().iter().collect();
        assert_eq!(cells.len(), 3);
        assert!(cells.windows(2).all(|w| w[0].end <= w[1].start));
        assert!(array.iter().all(|cell| matches!(cell, Element::UInt(n) if *n <= 1000)));
    }

    #[test]
    fn test_caller_elements_are_cast() {
        let generator = arrays("<i1", 2, Some(just(Element::Float(3.7)).boxed())).unwrap();
        let mut source = DataSource::from_seed(0);
        let array = generator.draw(&mut source).unwrap().into_array().unwrap();
        assert_eq!(array.as_slice(), &[Element::Int(3), Element::Int(3)]);
    }

    #[test]
    fn test_uncastable_elements_fail_the_draw() {
        let generator = arrays("<i1", 2, Some(just(Element::Int(1000)).boxed())).unwrap();
        let mut source = DataSource::from_seed(0);
        assert!(matches!(generator.draw(&mut source), Err(DrawError::TypeMismatch { .. })));
    }

    #[test]
    fn test_bad_descriptor_string() {
        assert!(arrays("<i3", 3, None).is_err());
        assert!(arrays(String::from("<f8"), vec![1, 2], None).is_ok());
    }

    #[test]
    fn test_shape_like_inputs() {
        let dtype = dt("?");
        let from_slice: &[usize] = &[2, 2];
        assert_eq!(arrays(dtype, 4usize, None).unwrap().as_array().unwrap().shape(), &[4]);
        assert_eq!(arrays(&dtype, from_slice, None).unwrap().as_array().unwrap().shape(), &[2, 2]);
        assert!(arrays(dtype, (), None).unwrap().is_scalar());
    }
}
