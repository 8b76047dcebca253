//! In-memory variable data and index bindings
//!
//! [`ColumnData`] holds one variable's values in its native type, and
//! [`ColumnData::bind`] pairs it with a [`FieldBinding`] into an
//! [`IndexBinding`] that sets the value at a given offset on a record. The
//! primitive type is resolved once here, so the per-record path never
//! inspects types.

use crate::errors::{BindingError, Result};
use crate::field::{FieldBinding, FieldType};
use ndarray::ArrayD;
use netcdf::types::NcVariableType;
use netcdf::Variable;
use std::fmt;

/// A variable's values, loaded in row-major order
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    I8(ArrayD<i8>),
    U8(ArrayD<u8>),
    I16(ArrayD<i16>),
    U16(ArrayD<u16>),
    I32(ArrayD<i32>),
    U32(ArrayD<u32>),
    I64(ArrayD<i64>),
    U64(ArrayD<u64>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
    Char(ArrayD<char>),
}

macro_rules! each_column {
    ($column:expr, $array:ident => $body:expr) => {
        match $column {
            ColumnData::I8($array) => $body,
            ColumnData::U8($array) => $body,
            ColumnData::I16($array) => $body,
            ColumnData::U16($array) => $body,
            ColumnData::I32($array) => $body,
            ColumnData::U32($array) => $body,
            ColumnData::I64($array) => $body,
            ColumnData::U64($array) => $body,
            ColumnData::F32($array) => $body,
            ColumnData::F64($array) => $body,
            ColumnData::Char($array) => $body,
        }
    };
}

impl ColumnData {
    /// Read every value of `variable` into memory
    ///
    /// # Errors
    ///
    /// Returns an error if the variable's type can't be bound or the read fails.
    pub fn read(variable: &Variable<'_>) -> Result<Self> {
        let name = variable.name().to_string();
        let vartype = variable.vartype();
        let field_type = FieldType::from_variable_type(&vartype).ok_or_else(|| {
            BindingError::UnhandledVariableType {
                variable: name,
                data_type: crate::field::describe_variable_type(&vartype),
            }
        })?;

        let shape: Vec<usize> = variable.dimensions().iter().map(|d| d.len()).collect();

        // enums have no conversion to their base type in netCDF-C, take the raw values
        let raw = matches!(vartype, NcVariableType::Enum(_));

        macro_rules! load {
            ($variant:ident, $ty:ty) => {{
                let values: Vec<$ty> = if raw {
                    decode_raw(&variable.get_raw_values(..)?)
                } else {
                    variable.get_values::<$ty, _>(..)?
                };
                ColumnData::$variant(ArrayD::from_shape_vec(shape, values)?)
            }};
        }

        let column = match field_type {
            FieldType::I8 => load!(I8, i8),
            FieldType::U8 => load!(U8, u8),
            FieldType::I16 => load!(I16, i16),
            FieldType::U16 => load!(U16, u16),
            FieldType::I32 => load!(I32, i32),
            FieldType::U32 => load!(U32, u32),
            FieldType::I64 => load!(I64, i64),
            FieldType::U64 => load!(U64, u64),
            FieldType::F32 => load!(F32, f32),
            FieldType::F64 => load!(F64, f64),
            FieldType::Char => {
                // NC_CHAR has no numeric conversion in netCDF-C either
                let bytes = variable.get_raw_values(..)?;
                let chars = bytes.into_iter().map(char::from).collect();
                ColumnData::Char(ArrayD::from_shape_vec(shape, chars)?)
            }
        };

        Ok(column)
    }

    #[must_use]
    pub fn field_type(&self) -> FieldType {
        match self {
            ColumnData::I8(_) => FieldType::I8,
            ColumnData::U8(_) => FieldType::U8,
            ColumnData::I16(_) => FieldType::I16,
            ColumnData::U16(_) => FieldType::U16,
            ColumnData::I32(_) => FieldType::I32,
            ColumnData::U32(_) => FieldType::U32,
            ColumnData::I64(_) => FieldType::I64,
            ColumnData::U64(_) => FieldType::U64,
            ColumnData::F32(_) => FieldType::F32,
            ColumnData::F64(_) => FieldType::F64,
            ColumnData::Char(_) => FieldType::Char,
        }
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        each_column!(self, array => array.shape())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        each_column!(self, array => array.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pair these values with a setter. The resulting binding reads the value
    /// at a row-major offset into the column.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::IncorrectVariableType`] if the setter doesn't
    /// accept this column's type.
    pub fn bind<T>(self, variable: &str, binding: &FieldBinding<T>) -> Result<IndexBinding<T>>
    where
        T: 'static,
    {
        macro_rules! bind_as {
            ($array:expr, $setter:expr) => {{
                let values = $array.into_raw_vec();
                let setter = $setter.clone();
                IndexBinding::new(move |record: &mut T, offset: usize| setter(record, values[offset]))
            }};
        }

        let file_type = self.field_type();
        let bound = match (self, binding) {
            (_, FieldBinding::Noop) => IndexBinding::noop(),
            (ColumnData::I8(a), FieldBinding::I8(s)) => bind_as!(a, s),
            (ColumnData::U8(a), FieldBinding::U8(s)) => bind_as!(a, s),
            (ColumnData::I16(a), FieldBinding::I16(s)) => bind_as!(a, s),
            (ColumnData::U16(a), FieldBinding::U16(s)) => bind_as!(a, s),
            (ColumnData::I32(a), FieldBinding::I32(s)) => bind_as!(a, s),
            (ColumnData::U32(a), FieldBinding::U32(s)) => bind_as!(a, s),
            (ColumnData::I64(a), FieldBinding::I64(s)) => bind_as!(a, s),
            (ColumnData::U64(a), FieldBinding::U64(s)) => bind_as!(a, s),
            (ColumnData::F32(a), FieldBinding::F32(s)) => bind_as!(a, s),
            (ColumnData::F64(a), FieldBinding::F64(s)) => bind_as!(a, s),
            (ColumnData::Char(a), FieldBinding::Char(s)) => bind_as!(a, s),
            (_, other) => {
                return Err(BindingError::IncorrectVariableType {
                    variable: variable.to_string(),
                    file_type,
                    setter_type: other.type_name(),
                }
                .into())
            }
        };

        Ok(bound)
    }
}

/// Native-endian primitives decodable from raw NetCDF bytes
trait RawValue: Sized {
    fn decode(bytes: &[u8]) -> Self;
}

macro_rules! raw_values {
    ($($ty:ty),*) => {
        $(
            impl RawValue for $ty {
                fn decode(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$ty>()];
                    buf.copy_from_slice(bytes);
                    <$ty>::from_ne_bytes(buf)
                }
            }
        )*
    };
}

raw_values!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

fn decode_raw<V: RawValue>(bytes: &[u8]) -> Vec<V> {
    bytes
        .chunks_exact(std::mem::size_of::<V>())
        .map(V::decode)
        .collect()
}

/// Sets one or more values on a record given an offset into their columns
pub struct IndexBinding<T> {
    set: Box<dyn Fn(&mut T, usize) + Send + Sync>,
}

impl<T: 'static> IndexBinding<T> {
    pub fn new(set: impl Fn(&mut T, usize) + Send + Sync + 'static) -> Self {
        Self { set: Box::new(set) }
    }

    /// Binding that leaves the record untouched
    #[must_use]
    pub fn noop() -> Self {
        Self::new(|_, _| {})
    }

    /// Chain bindings, applied in order at the same offset
    #[must_use]
    pub fn compose(bindings: Vec<IndexBinding<T>>) -> Self {
        match bindings.len() {
            0 => Self::noop(),
            1 => bindings.into_iter().next().map_or_else(Self::noop, |only| only),
            _ => Self::new(move |record, offset| {
                for binding in &bindings {
                    binding.set(record, offset);
                }
            }),
        }
    }

    /// Apply `self` then `other`
    #[must_use]
    pub fn combine(self, other: IndexBinding<T>) -> Self {
        Self::compose(vec![self, other])
    }
}

impl<T> IndexBinding<T> {
    #[inline]
    pub fn set(&self, record: &mut T, offset: usize) {
        (self.set)(record, offset);
    }
}

impl<T> fmt::Debug for IndexBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexBinding").finish_non_exhaustive()
    }
}
