mod common;

use common::{full_schema, grid_file, GridRecord};
use ncschema::hypercube::{index_of, offset_of};
use ncschema::prelude::*;
use rayon::prelude::*;
use tempfile::tempdir;

/// Cube whose records are their own row-major offsets
struct OffsetCube {
    shape: Vec<usize>,
    names: Vec<String>,
}

impl OffsetCube {
    fn new(shape: &[usize]) -> Self {
        Self {
            shape: shape.to_vec(),
            names: (0..shape.len()).map(|i| format!("d{i}")).collect(),
        }
    }
}

impl Hypercube for OffsetCube {
    type Record = usize;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn dimension_names(&self) -> &[String] {
        &self.names
    }

    fn read_offset(&self, offset: usize) -> Result<usize> {
        if offset >= self.len() {
            return Err(NcSchemaError::OffsetOutOfBounds {
                offset,
                len: self.len(),
            });
        }
        Ok(offset)
    }
}

#[test]
fn test_offset_and_index_conversion() {
    let shape = [2, 3, 4];
    assert_eq!(offset_of(&shape, &[0, 0, 0]).unwrap(), 0);
    assert_eq!(offset_of(&shape, &[0, 0, 3]).unwrap(), 3);
    assert_eq!(offset_of(&shape, &[0, 1, 0]).unwrap(), 4);
    assert_eq!(offset_of(&shape, &[1, 2, 3]).unwrap(), 23);

    for offset in 0..24 {
        let index = index_of(&shape, offset);
        assert_eq!(offset_of(&shape, &index).unwrap(), offset);
    }
    assert_eq!(index_of(&shape, 17), vec![1, 1, 1]);
}

#[test]
fn test_index_out_of_bounds() {
    let cube = OffsetCube::new(&[2, 3]);

    assert!(matches!(
        cube.read(&[2, 0]),
        Err(NcSchemaError::IndexOutOfBounds { .. })
    ));
    // wrong arity
    assert!(matches!(
        cube.read(&[1]),
        Err(NcSchemaError::IndexOutOfBounds { .. })
    ));
    assert!(matches!(
        cube.read_offset(6),
        Err(NcSchemaError::OffsetOutOfBounds { offset: 6, len: 6 })
    ));
}

#[test]
fn test_records_in_row_major_order() {
    let cube = OffsetCube::new(&[3, 2, 2]);
    assert_eq!(cube.len(), 12);
    assert_eq!(cube.ndim(), 3);

    let records = cube.records();
    assert_eq!(records.len(), 12);

    let offsets: Vec<usize> = records.collect::<Result<_>>().unwrap();
    assert_eq!(offsets, (0..12).collect::<Vec<_>>());

    let reversed: Vec<usize> = cube.records().rev().collect::<Result<_>>().unwrap();
    assert_eq!(reversed, (0..12).rev().collect::<Vec<_>>());
}

#[test]
fn test_into_records() {
    let mut records = OffsetCube::new(&[4]).into_records();
    assert_eq!(records.cube().shape(), &[4]);
    assert_eq!(records.next().unwrap().unwrap(), 0);
    assert_eq!(records.len(), 3);
    assert_eq!(records.count(), 3);
}

#[test]
fn test_transform() {
    let cube = OffsetCube::new(&[2, 5]).transform(|offset| format!("record-{offset}"));

    assert_eq!(cube.shape(), &[2, 5]);
    assert_eq!(cube.dimension_names(), &["d0", "d1"]);
    assert_eq!(cube.read(&[1, 2]).unwrap(), "record-7");
    assert_eq!(cube.delegate().len(), 10);

    let doubled = cube.transform(|s| s.len());
    assert_eq!(doubled.read_offset(0).unwrap(), "record-0".len());
}

#[test]
fn test_parallel_records_keep_order() {
    let cube = OffsetCube::new(&[4, 5, 6]);

    let sequential: Vec<usize> = cube.records().collect::<Result<_>>().unwrap();
    let parallel: Vec<usize> = cube.par_records().collect::<Result<_>>().unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn test_parallel_schema_bound_records() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = grid_file(&temp_dir, &[("x", 4), ("y", 3), ("z", 5)]);

    let cube = SchemaBoundCube::open(&path, &full_schema(&["x", "y", "z"]))
        .expect("Failed to build cube");

    let sequential: Vec<GridRecord> = cube.records().collect::<Result<_>>().unwrap();
    let parallel: Vec<GridRecord> = cube.par_records().collect::<Result<_>>().unwrap();
    assert_eq!(sequential.len(), 60);
    assert_eq!(sequential, parallel);

    let longs: Vec<i64> = cube
        .par_records()
        .map(|r| r.map(|r| r.long))
        .collect::<Result<_>>()
        .unwrap();
    assert_eq!(longs.iter().sum::<i64>(), (0..60).sum::<i64>());
}

#[test]
fn test_transformed_schema_bound_cube() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = grid_file(&temp_dir, &[("x", 3), ("y", 3)]);

    let cube = SchemaBoundCube::open(&path, &full_schema(&["x", "y"]))
        .expect("Failed to build cube")
        .transform(|r: GridRecord| (r.x, r.y, r.double));

    assert_eq!(cube.read(&[2, 1]).unwrap(), (2, 1, 7.5));
    assert_eq!(cube.into_records().count(), 9);
}
