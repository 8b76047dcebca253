//! Typed field setters
//!
//! A [`FieldBinding`] is how a caller tells the reader to put a variable's
//! value into a record. There is one variant per primitive the reader can
//! load, so values reach the setter unboxed and in their native type.

use netcdf::types::{EnumTypeValues, FloatType, IntType, NcVariableType};
use std::fmt;
use std::sync::Arc;

/// Setter for a single primitive value on a record of type `T`
pub type Setter<T, V> = Arc<dyn Fn(&mut T, V) + Send + Sync>;

/// Primitive types a variable can be bound as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    /// Single `NC_CHAR` values, read as ASCII
    Char,
}

impl FieldType {
    /// Map a NetCDF variable type onto a bindable field type, `None` for
    /// strings, compounds, opaque and variable-length types. Enums map to
    /// their base integer type.
    #[must_use]
    pub fn from_variable_type(vartype: &NcVariableType) -> Option<Self> {
        match vartype {
            NcVariableType::Int(int_type) => Some(Self::from_int_type(int_type)),
            NcVariableType::Enum(enum_type) => Some(match &enum_type.fieldvalues {
                EnumTypeValues::I8(_) => Self::I8,
                EnumTypeValues::U8(_) => Self::U8,
                EnumTypeValues::I16(_) => Self::I16,
                EnumTypeValues::U16(_) => Self::U16,
                EnumTypeValues::I32(_) => Self::I32,
                EnumTypeValues::U32(_) => Self::U32,
                EnumTypeValues::I64(_) => Self::I64,
                EnumTypeValues::U64(_) => Self::U64,
            }),
            NcVariableType::Float(FloatType::F32) => Some(Self::F32),
            NcVariableType::Float(FloatType::F64) => Some(Self::F64),
            NcVariableType::Char => Some(Self::Char),
            _ => None,
        }
    }

    fn from_int_type(int_type: &IntType) -> Self {
        match int_type {
            IntType::I8 => Self::I8,
            IntType::U8 => Self::U8,
            IntType::I16 => Self::I16,
            IntType::U16 => Self::U16,
            IntType::I32 => Self::I32,
            IntType::U32 => Self::U32,
            IntType::I64 => Self::I64,
            IntType::U64 => Self::U64,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::U8 => "u8",
            Self::I16 => "i16",
            Self::U16 => "u16",
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::I64 => "i64",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Char => "char",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable name for any NetCDF variable type, used in error messages
pub(crate) fn describe_variable_type(vartype: &NcVariableType) -> String {
    if let Some(field_type) = FieldType::from_variable_type(vartype) {
        return field_type.to_string();
    }
    match vartype {
        NcVariableType::String => "string".to_string(),
        other => format!("{other:?}"),
    }
}

/// Setter binding a variable's values into a record of type `T`
pub enum FieldBinding<T> {
    /// Binds no setter. Rejected by validation, leave a variable unbound to skip it
    Noop,
    I8(Setter<T, i8>),
    U8(Setter<T, u8>),
    I16(Setter<T, i16>),
    U16(Setter<T, u16>),
    I32(Setter<T, i32>),
    U32(Setter<T, u32>),
    I64(Setter<T, i64>),
    U64(Setter<T, u64>),
    F32(Setter<T, f32>),
    F64(Setter<T, f64>),
    Char(Setter<T, char>),
}

macro_rules! field_constructors {
    ($($name:ident => $variant:ident: $ty:ty),* $(,)?) => {
        impl<T> FieldBinding<T> {
            $(
                #[doc = concat!("Binding for variables stored as `", stringify!($ty), "`")]
                pub fn $name(setter: impl Fn(&mut T, $ty) + Send + Sync + 'static) -> Self {
                    FieldBinding::$variant(Arc::new(setter))
                }
            )*
        }
    };
}

field_constructors! {
    i8 => I8: i8,
    u8 => U8: u8,
    i16 => I16: i16,
    u16 => U16: u16,
    i32 => I32: i32,
    u32 => U32: u32,
    i64 => I64: i64,
    u64 => U64: u64,
    f32 => F32: f32,
    f64 => F64: f64,
    char => Char: char,
}

impl<T> FieldBinding<T> {
    /// The type this binding accepts, `None` for [`FieldBinding::Noop`]
    #[must_use]
    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            FieldBinding::Noop => None,
            FieldBinding::I8(_) => Some(FieldType::I8),
            FieldBinding::U8(_) => Some(FieldType::U8),
            FieldBinding::I16(_) => Some(FieldType::I16),
            FieldBinding::U16(_) => Some(FieldType::U16),
            FieldBinding::I32(_) => Some(FieldType::I32),
            FieldBinding::U32(_) => Some(FieldType::U32),
            FieldBinding::I64(_) => Some(FieldType::I64),
            FieldBinding::U64(_) => Some(FieldType::U64),
            FieldBinding::F32(_) => Some(FieldType::F32),
            FieldBinding::F64(_) => Some(FieldType::F64),
            FieldBinding::Char(_) => Some(FieldType::Char),
        }
    }

    /// Name of the accepted type, `"noop"` for [`FieldBinding::Noop`]
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.field_type().map_or("noop", FieldType::as_str)
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        matches!(self, FieldBinding::Noop)
    }
}

// Derive would require `T: Clone`, the setters are shared not copied.
impl<T> Clone for FieldBinding<T> {
    fn clone(&self) -> Self {
        match self {
            FieldBinding::Noop => FieldBinding::Noop,
            FieldBinding::I8(s) => FieldBinding::I8(Arc::clone(s)),
            FieldBinding::U8(s) => FieldBinding::U8(Arc::clone(s)),
            FieldBinding::I16(s) => FieldBinding::I16(Arc::clone(s)),
            FieldBinding::U16(s) => FieldBinding::U16(Arc::clone(s)),
            FieldBinding::I32(s) => FieldBinding::I32(Arc::clone(s)),
            FieldBinding::U32(s) => FieldBinding::U32(Arc::clone(s)),
            FieldBinding::I64(s) => FieldBinding::I64(Arc::clone(s)),
            FieldBinding::U64(s) => FieldBinding::U64(Arc::clone(s)),
            FieldBinding::F32(s) => FieldBinding::F32(Arc::clone(s)),
            FieldBinding::F64(s) => FieldBinding::F64(Arc::clone(s)),
            FieldBinding::Char(s) => FieldBinding::Char(Arc::clone(s)),
        }
    }
}

impl<T> fmt::Debug for FieldBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldBinding::{}", self.type_name())
    }
}
