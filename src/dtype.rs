//! # Type descriptors and array elements
//!
//! A [`DType`] describes the binary layout of one array cell: a storage
//! [`Kind`], an item size in bytes and, for multi-byte kinds, a [`ByteOrder`].
//! Descriptors are built either structurally with [`DType::new`] or by
//! parsing the NumPy descriptor syntax (`"<u4"`, `"|b1"`, `"U10"`, `"float32"`,
//! `"d"`). Both paths validate the item size against the kind and put the
//! byte order into canonical form, so two descriptors that describe the same
//! layout compare equal.
//!
//! Cell values are [`Element`]s. [`DType::cast`] is the finishing step that
//! turns any element into the descriptor's own representation: floats are
//! rounded to the storage width, integers are range checked, strings are cut
//! to the item size.

use std::fmt;
use std::str::FromStr;

use crate::data::DrawError;
use crate::errors::InvalidArgument;
use crate::floats::{round_to_width, FloatWidth};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    UInt,
    Float,
    Complex,
    Bytes,
    Unicode,
    Void,
    Object,
    DateTime,
    TimeDelta,
}

impl Kind {
    pub fn code(self) -> char {
        match self {
            Kind::Bool => 'b',
            Kind::Int => 'i',
            Kind::UInt => 'u',
            Kind::Float => 'f',
            Kind::Complex => 'c',
            Kind::Bytes => 'S',
            Kind::Unicode => 'U',
            Kind::Void => 'V',
            Kind::Object => 'O',
            Kind::DateTime => 'M',
            Kind::TimeDelta => 'm',
        }
    }

    pub fn from_code(code: char) -> Option<Kind> {
        match code {
            'b' => Some(Kind::Bool),
            'i' => Some(Kind::Int),
            'u' => Some(Kind::UInt),
            'f' => Some(Kind::Float),
            'c' => Some(Kind::Complex),
            'S' | 'a' => Some(Kind::Bytes),
            'U' => Some(Kind::Unicode),
            'V' => Some(Kind::Void),
            'O' => Some(Kind::Object),
            'M' => Some(Kind::DateTime),
            'm' => Some(Kind::TimeDelta),
            _ => None,
        }
    }

    /// Item sizes the kind can have, or `None` for flexible kinds.
    pub fn valid_itemsizes(self) -> Option<&'static [usize]> {
        match self {
            Kind::Bool => Some(&[1]),
            Kind::Int | Kind::UInt => Some(&[1, 2, 4, 8]),
            Kind::Float => Some(&[2, 4, 8, 12, 16]),
            Kind::Complex => Some(&[8, 16, 24, 32]),
            Kind::Object | Kind::DateTime | Kind::TimeDelta => Some(&[8]),
            Kind::Bytes | Kind::Unicode | Kind::Void => None,
        }
    }

    fn has_byte_order(self, itemsize: usize) -> bool {
        match self {
            Kind::Bool | Kind::Bytes | Kind::Void | Kind::Object => false,
            Kind::Unicode => true,
            Kind::Int | Kind::UInt | Kind::Float | Kind::Complex | Kind::DateTime | Kind::TimeDelta => {
                itemsize > 1
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    Little,
    Big,
    NotApplicable,
}

impl ByteOrder {
    pub fn native() -> ByteOrder {
        if cfg!(target_endian = "little") {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        }
    }

    pub fn code(self) -> char {
        match self {
            ByteOrder::Little => '<',
            ByteOrder::Big => '>',
            ByteOrder::NotApplicable => '|',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DType {
    kind: Kind,
    itemsize: usize,
    byteorder: ByteOrder,
}

impl DType {
    /// Build a descriptor from its parts.
    ///
    /// Fails if `itemsize` is not a valid width for `kind`. The byte order is
    /// dropped for kinds where it has no meaning and defaults to native order
    /// where it does.
    pub fn new(kind: Kind, itemsize: usize, byteorder: ByteOrder) -> Result<DType, InvalidArgument> {
        let valid = match kind.valid_itemsizes() {
            Some(sizes) => sizes.contains(&itemsize),
            None => kind != Kind::Unicode || itemsize % 4 == 0,
        };
        if !valid {
            return Err(InvalidArgument::new(format!(
                "Invalid item size {} for dtype kind '{}'",
                itemsize,
                kind.code()
            )));
        }

        let byteorder = if !kind.has_byte_order(itemsize) {
            ByteOrder::NotApplicable
        } else if byteorder == ByteOrder::NotApplicable {
            ByteOrder::native()
        } else {
            byteorder
        };

        Ok(DType {
            kind,
            itemsize,
            byteorder,
        })
    }

    pub fn bool() -> DType {
        DType {
            kind: Kind::Bool,
            itemsize: 1,
            byteorder: ByteOrder::NotApplicable,
        }
    }

    pub fn object() -> DType {
        DType {
            kind: Kind::Object,
            itemsize: 8,
            byteorder: ByteOrder::NotApplicable,
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn itemsize(&self) -> usize {
        self.itemsize
    }

    pub fn byteorder(&self) -> ByteOrder {
        self.byteorder
    }

    pub fn is_native_order(&self) -> bool {
        self.byteorder == ByteOrder::NotApplicable || self.byteorder == ByteOrder::native()
    }

    /// Inclusive range of an integer descriptor, in two's complement.
    pub fn integer_bounds(&self) -> Option<(i128, i128)> {
        match self.kind {
            Kind::UInt => Some((0, (1i128 << (8 * self.itemsize)) - 1)),
            Kind::Int | Kind::DateTime | Kind::TimeDelta => {
                let min = -(1i128 << (8 * self.itemsize - 1));
                Some((min, -min - 1))
            }
            _ => None,
        }
    }

    /// Value of a freshly allocated, not yet written cell.
    pub fn empty_element(&self) -> Element {
        match self.kind {
            Kind::Bool => Element::Bool(false),
            Kind::Int | Kind::DateTime | Kind::TimeDelta => Element::Int(0),
            Kind::UInt => Element::UInt(0),
            Kind::Float => Element::Float(0.0),
            Kind::Complex => Element::Complex(Complex::new(0.0, 0.0)),
            Kind::Bytes => Element::Bytes(Vec::new()),
            Kind::Void => Element::Bytes(vec![0; self.itemsize]),
            Kind::Unicode => Element::Str(String::new()),
            Kind::Object => Element::None,
        }
    }

    fn round_float(&self, value: f64, itemsize: usize) -> f64 {
        match FloatWidth::from_itemsize(itemsize) {
            Some(width) => round_to_width(value, width),
            None => value,
        }
    }

    /// Convert `value` into this descriptor's representation.
    pub fn cast(&self, value: Element) -> Result<Element, DrawError> {
        let mismatch = |value: &Element| DrawError::TypeMismatch {
            dtype: self.to_string(),
            value: format!("{:?}", value),
        };

        match self.kind {
            Kind::Object => Ok(value),
            Kind::Bool => match value {
                Element::Bool(b) => Ok(Element::Bool(b)),
                Element::Int(i) => Ok(Element::Bool(i != 0)),
                Element::UInt(u) => Ok(Element::Bool(u != 0)),
                Element::Float(f) => Ok(Element::Bool(f != 0.0)),
                Element::Complex(z) => Ok(Element::Bool(z.re != 0.0 || z.im != 0.0)),
                other => Err(mismatch(&other)),
            },
            Kind::Int | Kind::UInt | Kind::DateTime | Kind::TimeDelta => {
                let n = match &value {
                    Element::Bool(b) => Some(*b as i128),
                    Element::Int(i) => Some(*i as i128),
                    Element::UInt(u) => Some(*u as i128),
                    Element::Float(f) if f.is_finite() => Some(f.trunc() as i128),
                    Element::Str(s) => s.trim().parse::<i128>().ok(),
                    _ => None,
                };
                match (n, self.integer_bounds()) {
                    (Some(n), Some((min, max))) if n >= min && n <= max => {
                        if self.kind == Kind::UInt {
                            Ok(Element::UInt(n as u64))
                        } else {
                            Ok(Element::Int(n as i64))
                        }
                    }
                    _ => Err(mismatch(&value)),
                }
            }
            Kind::Float => {
                let x = match &value {
                    Element::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
                    Element::Int(i) => Some(*i as f64),
                    Element::UInt(u) => Some(*u as f64),
                    Element::Float(f) => Some(*f),
                    Element::Str(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                match x {
                    Some(x) => Ok(Element::Float(self.round_float(x, self.itemsize))),
                    None => Err(mismatch(&value)),
                }
            }
            Kind::Complex => {
                let z = match &value {
                    Element::Bool(b) => Some(Complex::new(if *b { 1.0 } else { 0.0 }, 0.0)),
                    Element::Int(i) => Some(Complex::new(*i as f64, 0.0)),
                    Element::UInt(u) => Some(Complex::new(*u as f64, 0.0)),
                    Element::Float(f) => Some(Complex::new(*f, 0.0)),
                    Element::Complex(z) => Some(*z),
                    _ => None,
                };
                match z {
                    Some(z) => {
                        let half = self.itemsize / 2;
                        Ok(Element::Complex(Complex::new(
                            self.round_float(z.re, half),
                            self.round_float(z.im, half),
                        )))
                    }
                    None => Err(mismatch(&value)),
                }
            }
            Kind::Bytes => {
                let mut bytes = match value {
                    Element::Bytes(b) => b,
                    Element::Str(s) if s.is_ascii() => s.into_bytes(),
                    Element::Bool(b) => (if b { "True" } else { "False" }).as_bytes().to_vec(),
                    Element::Int(i) => i.to_string().into_bytes(),
                    Element::UInt(u) => u.to_string().into_bytes(),
                    Element::Float(f) => f.to_string().into_bytes(),
                    other => return Err(mismatch(&other)),
                };
                if self.itemsize > 0 {
                    bytes.truncate(self.itemsize);
                }
                // Trailing NULs are padding, not content.
                while bytes.last() == Some(&0) {
                    bytes.pop();
                }
                Ok(Element::Bytes(bytes))
            }
            Kind::Unicode => {
                let s = match value {
                    Element::Str(s) => s,
                    Element::Bytes(b) => match String::from_utf8(b) {
                        Ok(s) => s,
                        Err(e) => return Err(mismatch(&Element::Bytes(e.into_bytes()))),
                    },
                    Element::Bool(b) => (if b { "True" } else { "False" }).to_string(),
                    Element::Int(i) => i.to_string(),
                    Element::UInt(u) => u.to_string(),
                    Element::Float(f) => f.to_string(),
                    other => return Err(mismatch(&other)),
                };
                let s: String = if self.itemsize > 0 {
                    s.chars().take(self.itemsize / 4).collect()
                } else {
                    s
                };
                Ok(Element::Str(s.trim_end_matches('\0').to_string()))
            }
            Kind::Void => match value {
                Element::Bytes(mut b) => {
                    if self.itemsize > 0 {
                        b.resize(self.itemsize, 0);
                    }
                    Ok(Element::Bytes(b))
                }
                other => Err(mismatch(&other)),
            },
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Kind::Object => write!(f, "{}O", self.byteorder.code()),
            Kind::Unicode => write!(f, "{}U{}", self.byteorder.code(), self.itemsize / 4),
            kind => write!(f, "{}{}{}", self.byteorder.code(), kind.code(), self.itemsize),
        }
    }
}

// NumPy's single character type codes.
fn typecode(code: char) -> Option<(Kind, usize)> {
    match code {
        '?' => Some((Kind::Bool, 1)),
        'b' => Some((Kind::Int, 1)),
        'B' => Some((Kind::UInt, 1)),
        'h' => Some((Kind::Int, 2)),
        'H' => Some((Kind::UInt, 2)),
        'i' => Some((Kind::Int, 4)),
        'I' => Some((Kind::UInt, 4)),
        'l' | 'q' => Some((Kind::Int, 8)),
        'L' | 'Q' => Some((Kind::UInt, 8)),
        'e' => Some((Kind::Float, 2)),
        'f' => Some((Kind::Float, 4)),
        'd' => Some((Kind::Float, 8)),
        'g' => Some((Kind::Float, 16)),
        'F' => Some((Kind::Complex, 8)),
        'D' => Some((Kind::Complex, 16)),
        'G' => Some((Kind::Complex, 32)),
        'O' => Some((Kind::Object, 8)),
        'S' | 'a' => Some((Kind::Bytes, 0)),
        'c' => Some((Kind::Bytes, 1)),
        'U' => Some((Kind::Unicode, 0)),
        'V' => Some((Kind::Void, 0)),
        'M' => Some((Kind::DateTime, 8)),
        'm' => Some((Kind::TimeDelta, 8)),
        _ => None,
    }
}

fn from_name(name: &str) -> Option<(Kind, usize)> {
    match name {
        "bool" => Some((Kind::Bool, 1)),
        "int8" => Some((Kind::Int, 1)),
        "int16" => Some((Kind::Int, 2)),
        "int32" => Some((Kind::Int, 4)),
        "int64" => Some((Kind::Int, 8)),
        "uint8" => Some((Kind::UInt, 1)),
        "uint16" => Some((Kind::UInt, 2)),
        "uint32" => Some((Kind::UInt, 4)),
        "uint64" => Some((Kind::UInt, 8)),
        "float16" => Some((Kind::Float, 2)),
        "float32" => Some((Kind::Float, 4)),
        "float64" => Some((Kind::Float, 8)),
        "complex64" => Some((Kind::Complex, 8)),
        "complex128" => Some((Kind::Complex, 16)),
        "object" => Some((Kind::Object, 8)),
        "bytes" => Some((Kind::Bytes, 0)),
        "str" => Some((Kind::Unicode, 0)),
        _ => None,
    }
}

impl FromStr for DType {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<DType, InvalidArgument> {
        let invalid = || InvalidArgument::new(format!("Data type {:?} not understood", s));
        let descriptor = s.trim();

        if let Some((kind, itemsize)) = from_name(descriptor) {
            return DType::new(kind, itemsize, ByteOrder::native());
        }

        let (byteorder, rest) = match descriptor.chars().next() {
            Some('<') => (ByteOrder::Little, &descriptor[1..]),
            Some('>') => (ByteOrder::Big, &descriptor[1..]),
            Some('=') => (ByteOrder::native(), &descriptor[1..]),
            Some('|') => (ByteOrder::NotApplicable, &descriptor[1..]),
            _ => (ByteOrder::native(), descriptor),
        };

        let mut chars = rest.chars();
        let code = chars.next().ok_or_else(invalid)?;
        let digits = chars.as_str();

        let (kind, itemsize) = if digits.is_empty() {
            typecode(code).ok_or_else(invalid)?
        } else {
            let kind = Kind::from_code(code).ok_or_else(invalid)?;
            let n: usize = digits.parse().map_err(|_| invalid())?;
            if kind == Kind::Unicode {
                (kind, n.checked_mul(4).ok_or_else(invalid)?)
            } else {
                (kind, n)
            }
        };

        DType::new(kind, itemsize, byteorder)
    }
}

impl TryFrom<&str> for DType {
    type Error = InvalidArgument;

    fn try_from(s: &str) -> Result<DType, InvalidArgument> {
        s.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub fn new(re: f64, im: f64) -> Complex {
        Complex { re, im }
    }
}

/// One array cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Complex(Complex),
    Bytes(Vec<u8>),
    Str(String),
    /// Unfilled object slot.
    None,
}

impl From<bool> for Element {
    fn from(b: bool) -> Element {
        Element::Bool(b)
    }
}

impl From<i128> for Element {
    fn from(n: i128) -> Element {
        if let Ok(i) = i64::try_from(n) {
            Element::Int(i)
        } else if let Ok(u) = u64::try_from(n) {
            Element::UInt(u)
        } else {
            Element::Float(n as f64)
        }
    }
}

impl From<f64> for Element {
    fn from(f: f64) -> Element {
        Element::Float(f)
    }
}

impl From<Complex> for Element {
    fn from(z: Complex) -> Element {
        Element::Complex(z)
    }
}

impl From<String> for Element {
    fn from(s: String) -> Element {
        Element::Str(s)
    }
}

impl From<Vec<u8>> for Element {
    fn from(b: Vec<u8>) -> Element {
        Element::Bytes(b)
    }
}
