//! Shared NetCDF fixtures for the integration tests
#![allow(dead_code)]

use ncschema::prelude::*;
use ndarray::{Array1, ArrayD, IxDyn};
use netcdf::types::{NcTypeDescriptor, NcVariableType};
use netcdf::NcType;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// One field per fixture variable
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GridRecord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub t: i32,
    pub byte: i8,
    pub ubyte: u8,
    pub short: i16,
    pub ushort: u16,
    pub int: i32,
    pub uint: u32,
    pub long: i64,
    pub ulong: u64,
    pub float: f32,
    pub double: f64,
}

/// Coordinate variables written over every grid point
pub const COORDINATE_VARIABLES: [&str; 10] = [
    "byte", "ubyte", "short", "ushort", "int", "uint", "long", "ulong", "float", "double",
];

macro_rules! write_coordinate {
    ($file:expr, $ty:ty, $name:expr, $dims:expr, $shape:expr, $value:expr) => {{
        let len: usize = $shape.iter().product();
        let data: Vec<$ty> = (0..len).map($value).collect();
        let array = ArrayD::from_shape_vec(IxDyn($shape), data).expect("Failed to create array");
        let mut var = $file
            .add_variable::<$ty>($name, $dims)
            .expect("Failed to add variable");
        var.put(array.view(), ..).expect("Failed to write data");
    }};
}

/// Write a grid file with one `i32` dimension variable per dimension, named
/// after it and holding `0..len`, plus every variable in
/// [`COORDINATE_VARIABLES`] over all dimensions. The coordinate value at a
/// grid point is derived from its row-major offset `k`: `k` for the integer
/// variables, `2k` for `float` and `k + 0.5` for `double`.
pub fn grid_file(dir: &TempDir, dims: &[(&str, usize)]) -> PathBuf {
    let names: Vec<&str> = dims.iter().map(|(name, _)| *name).collect();
    let shape: Vec<usize> = dims.iter().map(|(_, len)| *len).collect();
    let path = dir.path().join(format!("grid_{}.nc", names.join("")));

    let mut file = netcdf::create(&path).expect("Failed to create NetCDF file");
    for &(name, len) in dims {
        file.add_dimension(name, len).expect("Failed to add dimension");
    }
    for &(name, len) in dims {
        let values: Vec<i32> = (0..len as i32).collect();
        let mut var = file
            .add_variable::<i32>(name, &[name])
            .expect("Failed to add dimension variable");
        var.put(Array1::from(values).view(), ..)
            .expect("Failed to write dimension variable");
    }

    write_coordinate!(file, i8, "byte", &names, &shape, |k| k as i8);
    write_coordinate!(file, u8, "ubyte", &names, &shape, |k| k as u8);
    write_coordinate!(file, i16, "short", &names, &shape, |k| k as i16);
    write_coordinate!(file, u16, "ushort", &names, &shape, |k| k as u16);
    write_coordinate!(file, i32, "int", &names, &shape, |k| k as i32);
    write_coordinate!(file, u32, "uint", &names, &shape, |k| k as u32);
    write_coordinate!(file, i64, "long", &names, &shape, |k| k as i64);
    write_coordinate!(file, u64, "ulong", &names, &shape, |k| k as u64);
    write_coordinate!(file, f32, "float", &names, &shape, |k| k as f32 * 2.0);
    write_coordinate!(file, f64, "double", &names, &shape, |k| k as f64 + 0.5);

    path
}

/// Write a file with the given dimensions and unwritten `f32` variables,
/// for tests that only look at structure.
pub fn layout_file(path: &Path, dims: &[(&str, usize)], variables: &[(&str, &[&str])]) {
    let mut file = netcdf::create(path).expect("Failed to create NetCDF file");
    for &(name, len) in dims {
        file.add_dimension(name, len).expect("Failed to add dimension");
    }
    for &(name, var_dims) in variables {
        file.add_variable::<f32>(name, var_dims)
            .expect("Failed to add variable");
    }
}

/// Schema binding every dimension in `dims` and every coordinate variable
pub fn full_schema(dims: &[&str]) -> SchemaBinding<GridRecord> {
    let mut builder = SchemaBinding::builder().record_initializer(|| Ok(GridRecord::default()));
    for dim in dims {
        builder = match *dim {
            "x" => builder.i32_dimension("x", |r: &mut GridRecord, v| r.x = v),
            "y" => builder.i32_dimension("y", |r: &mut GridRecord, v| r.y = v),
            "z" => builder.i32_dimension("z", |r: &mut GridRecord, v| r.z = v),
            "t" => builder.i32_dimension("t", |r: &mut GridRecord, v| r.t = v),
            other => panic!("No fixture dimension named {other}"),
        };
    }
    builder
        .i8_coordinate_variable("byte", |r: &mut GridRecord, v| r.byte = v)
        .u8_coordinate_variable("ubyte", |r: &mut GridRecord, v| r.ubyte = v)
        .i16_coordinate_variable("short", |r: &mut GridRecord, v| r.short = v)
        .u16_coordinate_variable("ushort", |r: &mut GridRecord, v| r.ushort = v)
        .i32_coordinate_variable("int", |r: &mut GridRecord, v| r.int = v)
        .u32_coordinate_variable("uint", |r: &mut GridRecord, v| r.uint = v)
        .i64_coordinate_variable("long", |r: &mut GridRecord, v| r.long = v)
        .u64_coordinate_variable("ulong", |r: &mut GridRecord, v| r.ulong = v)
        .f32_coordinate_variable("float", |r: &mut GridRecord, v| r.float = v)
        .f64_coordinate_variable("double", |r: &mut GridRecord, v| r.double = v)
        .build()
        .expect("Failed to build schema")
}

/// Check every coordinate field of `record` against the values
/// [`grid_file`] writes at row-major offset `k`.
pub fn assert_coordinates(record: &GridRecord, k: usize) {
    assert_eq!(record.byte, k as i8, "byte at offset {k}");
    assert_eq!(record.ubyte, k as u8, "ubyte at offset {k}");
    assert_eq!(record.short, k as i16, "short at offset {k}");
    assert_eq!(record.ushort, k as u16, "ushort at offset {k}");
    assert_eq!(record.int, k as i32, "int at offset {k}");
    assert_eq!(record.uint, k as u32, "uint at offset {k}");
    assert_eq!(record.long, k as i64, "long at offset {k}");
    assert_eq!(record.ulong, k as u64, "ulong at offset {k}");
    assert_eq!(record.float, k as f32 * 2.0, "float at offset {k}");
    assert_eq!(record.double, k as f64 + 0.5, "double at offset {k}");
}

/// `NC_CHAR` element for writing char variables
#[repr(transparent)]
#[derive(Debug, Clone, Copy)]
pub struct NcChar(pub i8);

unsafe impl NcTypeDescriptor for NcChar {
    fn type_descriptor() -> NcVariableType {
        NcVariableType::Char
    }
}

/// `i8`-based enum for writing enum variables
#[derive(NcType, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum Wind {
    Calm = 0,
    Breeze = 1,
    Gale = 2,
}

/// Write a 1-D file along `x` with three dimension variables sharing the
/// axis (`x: i32` holding `0..len`, `lat: f64` holding `10 * i` and
/// `code: char` holding `'A'..`) and a char coordinate variable `letter`
/// holding `'a'..`.
pub fn char_file(dir: &TempDir, len: usize) -> PathBuf {
    let path = dir.path().join("chars.nc");
    let mut file = netcdf::create(&path).expect("Failed to create NetCDF file");
    file.add_dimension("x", len).expect("Failed to add dimension");

    let x: Vec<i32> = (0..len as i32).collect();
    let lat: Vec<f64> = (0..len).map(|i| i as f64 * 10.0).collect();
    let code: Vec<NcChar> = (0..len).map(|i| NcChar((b'A' + i as u8) as i8)).collect();
    let letter: Vec<NcChar> = (0..len).map(|i| NcChar((b'a' + i as u8) as i8)).collect();

    let mut var = file.add_variable::<i32>("x", &["x"]).expect("Failed to add variable");
    var.put(Array1::from(x).view(), ..).expect("Failed to write data");
    let mut var = file.add_variable::<f64>("lat", &["x"]).expect("Failed to add variable");
    var.put(Array1::from(lat).view(), ..).expect("Failed to write data");
    let mut var = file.add_variable::<NcChar>("code", &["x"]).expect("Failed to add variable");
    var.put(Array1::from(code).view(), ..).expect("Failed to write data");
    let mut var = file.add_variable::<NcChar>("letter", &["x"]).expect("Failed to add variable");
    var.put(Array1::from(letter).view(), ..).expect("Failed to write data");

    path
}

/// Write a 1-D file along `x` with an `x: i32` dimension variable and a
/// [`Wind`] enum coordinate variable `wind` cycling through the members.
pub fn enum_file(dir: &TempDir, len: usize) -> PathBuf {
    let path = dir.path().join("enums.nc");
    let mut file = netcdf::create(&path).expect("Failed to create NetCDF file");
    file.add_dimension("x", len).expect("Failed to add dimension");
    file.add_type::<Wind>().expect("Failed to add enum type");

    let x: Vec<i32> = (0..len as i32).collect();
    let members = [Wind::Calm, Wind::Breeze, Wind::Gale];
    let wind: Vec<Wind> = (0..len).map(|i| members[i % members.len()]).collect();

    let mut var = file.add_variable::<i32>("x", &["x"]).expect("Failed to add variable");
    var.put(Array1::from(x).view(), ..).expect("Failed to write data");
    let mut var = file.add_variable::<Wind>("wind", &["x"]).expect("Failed to add variable");
    var.put(Array1::from(wind).view(), ..).expect("Failed to write data");

    path
}

/// Write a file with an unlimited `time` dimension that has no records yet,
/// a `time: i32` dimension variable and an `f32` coordinate `temperature(time)`.
pub fn empty_unlimited_file(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("empty.nc");
    let mut file = netcdf::create(&path).expect("Failed to create NetCDF file");
    file.add_unlimited_dimension("time")
        .expect("Failed to add unlimited dimension");
    file.add_variable::<i32>("time", &["time"])
        .expect("Failed to add variable");
    file.add_variable::<f32>("temperature", &["time"])
        .expect("Failed to add variable");
    path
}
