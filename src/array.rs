//! Dense, row-major n-dimensional array values.
//!
//! An [`NdArray`] owns a flat buffer of cells of one [`DType`] together with
//! a shape. Generators allocate the buffer at its final length with
//! [`NdArray::empty`], fill it cell by cell, then reshape it.

use byteorder::{BigEndian, LittleEndian};

use crate::dtype::{ByteOrder, DType, Element, Kind};
use crate::errors::InvalidArgument;
use crate::floats::{float_to_int, FloatWidth};

/// Number of cells in `shape`, or `None` if it does not fit in a `usize`.
pub fn cell_count(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n))
}

#[derive(Debug, Clone, PartialEq)]
pub struct NdArray {
    dtype: DType,
    shape: Vec<usize>,
    data: Vec<Element>,
}

impl NdArray {
    /// One-dimensional buffer of `len` unwritten cells.
    pub fn empty(dtype: DType, len: usize) -> NdArray {
        NdArray::zeros(dtype, &[len])
    }

    /// Unwritten cells laid out in `shape`. An empty shape holds one cell.
    ///
    /// Panics if the cell count overflows `usize`; see [`cell_count`].
    pub fn zeros(dtype: DType, shape: &[usize]) -> NdArray {
        let len = cell_count(shape).unwrap_or(usize::MAX);
        NdArray {
            dtype,
            shape: shape.to_vec(),
            data: vec![dtype.empty_element(); len],
        }
    }

    /// Overwrite the cell at flat position `index`.
    pub fn set(&mut self, index: usize, value: Element) {
        self.data[index] = value;
    }

    /// Reinterpret the buffer with a new shape, keeping row-major order.
    pub fn into_shape(self, shape: &[usize]) -> Result<NdArray, InvalidArgument> {
        if cell_count(shape) != Some(self.data.len()) {
            return Err(InvalidArgument::new(format!(
                "cannot reshape array of size {} into shape {:?}",
                self.data.len(),
                shape
            )));
        }
        Ok(NdArray {
            shape: shape.to_vec(),
            ..self
        })
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Cell at a multi-dimensional index. A 0-d array is indexed with `&[]`.
    pub fn get(&self, index: &[usize]) -> Option<&Element> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut flat = 0;
        for (&i, &n) in index.iter().zip(&self.shape) {
            if i >= n {
                return None;
            }
            flat = flat * n + i;
        }
        self.data.get(flat)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.data.iter()
    }

    pub fn as_slice(&self) -> &[Element] {
        &self.data
    }

    /// Raw buffer contents, laid out in the descriptor's byte order.
    pub fn to_bytes(&self) -> Result<Vec<u8>, InvalidArgument> {
        let mut out = Vec::with_capacity(self.data.len() * self.dtype.itemsize());
        match self.dtype.byteorder() {
            ByteOrder::Big => self.write_cells::<BigEndian>(&mut out)?,
            ByteOrder::Little | ByteOrder::NotApplicable => self.write_cells::<LittleEndian>(&mut out)?,
        }
        Ok(out)
    }

    fn write_cells<B: byteorder::ByteOrder>(&self, out: &mut Vec<u8>) -> Result<(), InvalidArgument> {
        let itemsize = self.dtype.itemsize();
        let unsupported = || InvalidArgument::new(format!("dtype {} has no fixed byte layout here", self.dtype));
        let mut buf = [0u8; 8];

        for cell in &self.data {
            match (self.dtype.kind(), cell) {
                (Kind::Bool, Element::Bool(b)) => out.push(*b as u8),
                (Kind::Int, Element::Int(v)) | (Kind::DateTime, Element::Int(v)) | (Kind::TimeDelta, Element::Int(v)) => {
                    match itemsize {
                        1 => out.push(*v as i8 as u8),
                        2 => B::write_i16(&mut buf, *v as i16),
                        4 => B::write_i32(&mut buf, *v as i32),
                        _ => B::write_i64(&mut buf, *v),
                    }
                    if itemsize > 1 {
                        out.extend_from_slice(&buf[..itemsize]);
                    }
                }
                (Kind::UInt, Element::UInt(v)) => {
                    match itemsize {
                        1 => out.push(*v as u8),
                        2 => B::write_u16(&mut buf, *v as u16),
                        4 => B::write_u32(&mut buf, *v as u32),
                        _ => B::write_u64(&mut buf, *v),
                    }
                    if itemsize > 1 {
                        out.extend_from_slice(&buf[..itemsize]);
                    }
                }
                (Kind::Float, Element::Float(f)) => {
                    let width = FloatWidth::from_itemsize(itemsize).ok_or_else(unsupported)?;
                    write_float::<B>(out, *f, width);
                }
                (Kind::Complex, Element::Complex(z)) => {
                    let width = FloatWidth::from_itemsize(itemsize / 2).ok_or_else(unsupported)?;
                    write_float::<B>(out, z.re, width);
                    write_float::<B>(out, z.im, width);
                }
                (Kind::Bytes, Element::Bytes(b)) | (Kind::Void, Element::Bytes(b)) if itemsize > 0 => {
                    let start = out.len();
                    out.extend(b.iter().take(itemsize));
                    out.resize(start + itemsize, 0);
                }
                (Kind::Unicode, Element::Str(s)) if itemsize > 0 => {
                    let start = out.len();
                    for c in s.chars().take(itemsize / 4) {
                        B::write_u32(&mut buf, c as u32);
                        out.extend_from_slice(&buf[..4]);
                    }
                    out.resize(start + itemsize, 0);
                }
                _ => return Err(unsupported()),
            }
        }
        Ok(())
    }
}

fn write_float<B: byteorder::ByteOrder>(out: &mut Vec<u8>, value: f64, width: FloatWidth) {
    let mut buf = [0u8; 8];
    let bits = float_to_int(value, width);
    match width {
        FloatWidth::Width16 => B::write_u16(&mut buf, bits as u16),
        FloatWidth::Width32 => B::write_u32(&mut buf, bits as u32),
        FloatWidth::Width64 => B::write_u64(&mut buf, bits),
    }
    out.extend_from_slice(&buf[..width.bits() as usize / 8]);
}
