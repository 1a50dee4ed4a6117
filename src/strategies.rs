//! # Generator algebra
//!
//! A [`Generator`] turns bits from a [`DataSource`] into a value. Generators
//! are immutable once built: the only state a draw touches is the source it
//! is handed, so a generator can be drawn from any number of times, from any
//! number of sources, and the same source contents always give the same
//! value.
//!
//! The combinators here mirror the ones the array and dtype generators are
//! built from:
//!
//! - [`Mapped`] post-processes each drawn value (`generator.map(f)`).
//! - [`OneOf`] picks one branch uniformly and draws from it (`a.or(b)`).
//! - [`SampledFrom`] picks one of a fixed, non-empty set of values.
//! - [`Lists`] draws a variable number of elements.
//!
//! Primitive generators cover booleans, bounded integers, floats, complex
//! numbers, text and byte strings.

use std::fmt;
use std::sync::Arc;

use crate::data::{calc_label_from_name, DataSource, Draw};
use crate::distributions::{bounded_int, weighted, Repeat};
use crate::dtype::Complex;
use crate::errors::{check_argument, InvalidArgument};
use crate::floats::draw_float;
use crate::strings::{average_size, draw_bytes, draw_text};

pub trait Generator {
    type Output;

    fn draw(&self, source: &mut DataSource) -> Draw<Self::Output>;

    /// Label for spans opened around draws from this generator.
    fn label(&self) -> u64 {
        calc_label_from_name(std::any::type_name::<Self>())
    }

    fn map<U, F>(self, f: F) -> Mapped<Self, F>
    where
        Self: Sized,
        F: Fn(Self::Output) -> U,
    {
        Mapped { inner: self, f }
    }

    /// Union of `self` and `other`, each chosen with equal probability.
    fn or<G>(self, other: G) -> OneOf<Self::Output>
    where
        Self: Sized + Send + Sync + 'static,
        G: Generator<Output = Self::Output> + Send + Sync + 'static,
        Self::Output: 'static,
    {
        OneOf {
            branches: vec![self.boxed(), other.boxed()],
        }
    }

    fn boxed(self) -> BoxedGenerator<Self::Output>
    where
        Self: Sized + Send + Sync + 'static,
    {
        BoxedGenerator(Arc::new(self))
    }
}

/// Shared handle to a type-erased generator. Cloning is cheap.
pub struct BoxedGenerator<T>(Arc<dyn Generator<Output = T> + Send + Sync>);

impl<T> BoxedGenerator<T> {
    /// Whether both handles refer to the same generator.
    pub fn ptr_eq(&self, other: &BoxedGenerator<T>) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for BoxedGenerator<T> {
    fn clone(&self) -> Self {
        BoxedGenerator(Arc::clone(&self.0))
    }
}

impl<T> fmt::Debug for BoxedGenerator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoxedGenerator({:#018x})", self.0.label())
    }
}

impl<T> Generator for BoxedGenerator<T> {
    type Output = T;

    fn draw(&self, source: &mut DataSource) -> Draw<T> {
        self.0.draw(source)
    }

    fn label(&self) -> u64 {
        self.0.label()
    }
}

#[derive(Clone)]
pub struct Mapped<G, F> {
    inner: G,
    f: F,
}

impl<G, F, U> Generator for Mapped<G, F>
where
    G: Generator,
    F: Fn(G::Output) -> U,
{
    type Output = U;

    fn draw(&self, source: &mut DataSource) -> Draw<U> {
        self.inner.draw(source).map(&self.f)
    }
}

pub struct OneOf<T> {
    branches: Vec<BoxedGenerator<T>>,
}

impl<T> Clone for OneOf<T> {
    fn clone(&self) -> Self {
        OneOf {
            branches: self.branches.clone(),
        }
    }
}

pub fn one_of<T>(branches: Vec<BoxedGenerator<T>>) -> Result<OneOf<T>, InvalidArgument> {
    check_argument(!branches.is_empty(), || {
        "one_of requires at least one generator".to_string()
    })?;
    Ok(OneOf { branches })
}

impl<T> Generator for OneOf<T> {
    type Output = T;

    fn draw(&self, source: &mut DataSource) -> Draw<T> {
        let i = bounded_int(source, self.branches.len() as u64 - 1)? as usize;
        source.draw(&self.branches[i])
    }
}

#[derive(Debug, Clone)]
pub struct SampledFrom<T> {
    values: Vec<T>,
}

pub fn sampled_from<T: Clone>(values: Vec<T>) -> Result<SampledFrom<T>, InvalidArgument> {
    check_argument(!values.is_empty(), || {
        "Cannot sample from an empty collection".to_string()
    })?;
    Ok(SampledFrom { values })
}

impl<T: Clone> Generator for SampledFrom<T> {
    type Output = T;

    fn draw(&self, source: &mut DataSource) -> Draw<T> {
        let i = bounded_int(source, self.values.len() as u64 - 1)? as usize;
        Ok(self.values[i].clone())
    }
}

#[derive(Debug, Clone)]
pub struct Just<T>(T);

pub fn just<T: Clone>(value: T) -> Just<T> {
    Just(value)
}

impl<T: Clone> Generator for Just<T> {
    type Output = T;

    fn draw(&self, _source: &mut DataSource) -> Draw<T> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Clone)]
pub struct Lists<G> {
    elements: G,
    min_size: usize,
    max_size: usize,
}

pub fn lists<G: Generator>(elements: G, min_size: usize, max_size: usize) -> Result<Lists<G>, InvalidArgument> {
    check_argument(min_size <= max_size, || {
        format!("min_size={} must not be greater than max_size={}", min_size, max_size)
    })?;
    Ok(Lists {
        elements,
        min_size,
        max_size,
    })
}

impl<G: Generator> Generator for Lists<G> {
    type Output = Vec<G::Output>;

    fn draw(&self, source: &mut DataSource) -> Draw<Vec<G::Output>> {
        let mut repeat = Repeat::new(
            self.min_size as u64,
            self.max_size as u64,
            average_size(self.min_size, self.max_size) - self.min_size as f64,
        );
        let mut result = Vec::new();
        while repeat.should_continue(source)? {
            result.push(source.draw(&self.elements)?);
        }
        Ok(result)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Booleans;

pub fn booleans() -> Booleans {
    Booleans
}

impl Generator for Booleans {
    type Output = bool;

    fn draw(&self, source: &mut DataSource) -> Draw<bool> {
        weighted(source, 0.5)
    }
}

/// Integers in `[min, max]`. The span may be as wide as any 64-bit
/// integer type, signed or unsigned.
#[derive(Debug, Clone, Copy)]
pub struct Integers {
    min: i128,
    max: i128,
}

pub fn integers(min: i128, max: i128) -> Result<Integers, InvalidArgument> {
    check_argument(min <= max, || {
        format!("Cannot have max_value={} < min_value={}", max, min)
    })?;
    check_argument(max - min <= u64::MAX as i128, || {
        format!("Range [{}, {}] is wider than 64 bits", min, max)
    })?;
    Ok(Integers { min, max })
}

impl Generator for Integers {
    type Output = i128;

    fn draw(&self, source: &mut DataSource) -> Draw<i128> {
        if source.bits(5)? == 0 {
            let edges = [self.min, self.max, 0i128.clamp(self.min, self.max)];
            return Ok(edges[bounded_int(source, 2)? as usize]);
        }
        let offset = bounded_int(source, (self.max - self.min) as u64)?;
        Ok(self.min + offset as i128)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Floats;

pub fn floats() -> Floats {
    Floats
}

impl Generator for Floats {
    type Output = f64;

    fn draw(&self, source: &mut DataSource) -> Draw<f64> {
        draw_float(source)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ComplexNumbers;

pub fn complex_numbers() -> ComplexNumbers {
    ComplexNumbers
}

impl Generator for ComplexNumbers {
    type Output = Complex;

    fn draw(&self, source: &mut DataSource) -> Draw<Complex> {
        let re = draw_float(source)?;
        let im = draw_float(source)?;
        Ok(Complex::new(re, im))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Text;

pub fn text() -> Text {
    Text
}

impl Generator for Text {
    type Output = String;

    fn draw(&self, source: &mut DataSource) -> Draw<String> {
        draw_text(source, 0, usize::MAX)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Binary;

pub fn binary() -> Binary {
    Binary
}

impl Generator for Binary {
    type Output = Vec<u8>;

    fn draw(&self, source: &mut DataSource) -> Draw<Vec<u8>> {
        draw_bytes(source, 0, usize::MAX)
    }
}
