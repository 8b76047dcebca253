//! N-dimensional grids of records
//!
//! A [`Hypercube`] gives random access to records laid out on a 1 to 4
//! dimensional grid, plus row-major iteration (last dimension varies fastest)
//! and parallel reads through rayon.

use crate::errors::{NcSchemaError, Result};
use rayon::prelude::*;
use std::iter::FusedIterator;

/// Random-access grid of records
pub trait Hypercube {
    type Record;

    /// Length of each dimension
    fn shape(&self) -> &[usize];

    /// Dimension names, in the same order as [`Hypercube::shape`]
    fn dimension_names(&self) -> &[String];

    /// Read the record at a row-major offset into the grid
    ///
    /// # Errors
    ///
    /// Returns [`NcSchemaError::OffsetOutOfBounds`] past the end of the grid, or
    /// whatever building the record fails with.
    fn read_offset(&self, offset: usize) -> Result<Self::Record>;

    /// Total number of records
    fn len(&self) -> usize {
        self.shape().iter().product()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Read the record at the given index, one entry per dimension
    ///
    /// # Errors
    ///
    /// Returns [`NcSchemaError::IndexOutOfBounds`] if the index has the wrong
    /// number of entries or any entry is past its dimension.
    fn read(&self, index: &[usize]) -> Result<Self::Record> {
        let offset = offset_of(self.shape(), index)?;
        self.read_offset(offset)
    }

    /// Iterate all records in row-major order
    fn records(&self) -> Records<'_, Self>
    where
        Self: Sized,
    {
        Records {
            cube: self,
            next: 0,
            end: self.len(),
        }
    }

    /// Owning version of [`Hypercube::records`]
    fn into_records(self) -> IntoRecords<Self>
    where
        Self: Sized,
    {
        let end = self.len();
        IntoRecords {
            cube: self,
            next: 0,
            end,
        }
    }

    /// Read all records in parallel on the current rayon pool. Collecting
    /// the iterator keeps row-major order.
    fn par_records(&self) -> impl IndexedParallelIterator<Item = Result<Self::Record>> + '_
    where
        Self: Sized + Sync,
        Self::Record: Send,
    {
        (0..self.len())
            .into_par_iter()
            .map(move |offset| self.read_offset(offset))
    }

    /// Cube with the same shape whose records are `transformer(record)`.
    ///
    /// Useful to turn a cube of mutable builders into a cube of finished
    /// values without leaving the hypercube API.
    fn transform<U, F>(self, transformer: F) -> Transformed<Self, F>
    where
        Self: Sized,
        F: Fn(Self::Record) -> U,
    {
        Transformed {
            delegate: self,
            transformer,
        }
    }
}

/// Row-major offset of `index` within a grid of `shape`
///
/// # Errors
///
/// Returns [`NcSchemaError::IndexOutOfBounds`] on an arity or bounds mismatch.
pub fn offset_of(shape: &[usize], index: &[usize]) -> Result<usize> {
    if index.len() != shape.len() || index.iter().zip(shape).any(|(i, len)| i >= len) {
        return Err(NcSchemaError::IndexOutOfBounds {
            index: index.to_vec(),
            shape: shape.to_vec(),
        });
    }
    Ok(index
        .iter()
        .zip(shape)
        .fold(0, |offset, (i, len)| offset * len + i))
}

/// Multi-dimensional index of a row-major `offset` within a grid of `shape`
#[must_use]
pub fn index_of(shape: &[usize], offset: usize) -> Vec<usize> {
    let mut index = vec![0; shape.len()];
    let mut remaining = offset;
    for (axis, len) in shape.iter().enumerate().rev() {
        if *len > 0 {
            index[axis] = remaining % len;
            remaining /= len;
        }
    }
    index
}

/// Borrowing row-major iterator over a cube's records
pub struct Records<'c, C> {
    cube: &'c C,
    next: usize,
    end: usize,
}

impl<C: Hypercube> Iterator for Records<'_, C> {
    type Item = Result<C::Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let record = self.cube.read_offset(self.next);
        self.next += 1;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl<C: Hypercube> DoubleEndedIterator for Records<'_, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        self.end -= 1;
        Some(self.cube.read_offset(self.end))
    }
}

impl<C: Hypercube> ExactSizeIterator for Records<'_, C> {}
impl<C: Hypercube> FusedIterator for Records<'_, C> {}

/// Owning row-major iterator over a cube's records
pub struct IntoRecords<C> {
    cube: C,
    next: usize,
    end: usize,
}

impl<C> IntoRecords<C> {
    /// The cube being iterated
    pub fn cube(&self) -> &C {
        &self.cube
    }
}

impl<C: Hypercube> Iterator for IntoRecords<C> {
    type Item = Result<C::Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let record = self.cube.read_offset(self.next);
        self.next += 1;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl<C: Hypercube> ExactSizeIterator for IntoRecords<C> {}
impl<C: Hypercube> FusedIterator for IntoRecords<C> {}

/// Cube returned by [`Hypercube::transform`]
pub struct Transformed<C, F> {
    delegate: C,
    transformer: F,
}

impl<C, F> Transformed<C, F> {
    /// The untransformed cube
    pub fn delegate(&self) -> &C {
        &self.delegate
    }
}

impl<U, C, F> Hypercube for Transformed<C, F>
where
    C: Hypercube,
    F: Fn(C::Record) -> U,
{
    type Record = U;

    fn shape(&self) -> &[usize] {
        self.delegate.shape()
    }

    fn dimension_names(&self) -> &[String] {
        self.delegate.dimension_names()
    }

    fn read_offset(&self, offset: usize) -> Result<U> {
        self.delegate.read_offset(offset).map(&self.transformer)
    }
}
