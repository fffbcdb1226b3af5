use num::{BigUint, ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::errors::{FieldError, Result};
use crate::vector::FieldVector;

/// A row-major matrix of field elements in one contiguous buffer.
///
/// Same storage and lifecycle discipline as [`FieldVector`]: the handle owns
/// the buffer, operations allocate fresh output, and dropping the handle
/// reclaims the storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMatrix {
    rows: usize,
    cols: usize,
    elems: Vec<u128>,
    element_size: usize,
}

impl FieldMatrix {
    pub(crate) fn new(rows: usize, cols: usize, elems: Vec<u128>, element_size: usize) -> Self {
        debug_assert_eq!(elems.len(), rows * cols);
        Self {
            rows,
            cols,
            elems,
            element_size,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    pub fn element_count(&self) -> usize {
        self.elems.len()
    }

    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Serialized size of one row: `cols * element_size`.
    pub fn row_stride_bytes(&self) -> usize {
        self.cols * self.element_size
    }

    pub fn byte_length(&self) -> usize {
        self.elems.len() * self.element_size
    }

    pub fn get_value(&self, row: usize, col: usize) -> u128 {
        assert!(row < self.rows && col < self.cols, "index out of bounds");
        self.elems[row * self.cols + col]
    }

    /// Writes a raw value into one slot; same contract as
    /// [`FieldVector::set_value`].
    pub fn set_value(&mut self, row: usize, col: usize, value: &BigUint) -> Result<()> {
        assert!(row < self.rows && col < self.cols, "index out of bounds");
        let value = value.to_u128().ok_or_else(|| {
            FieldError::OutOfRange(format!("value {value} does not fit in 128 bits"))
        })?;
        self.elems[row * self.cols + col] = value;
        Ok(())
    }

    pub fn row(&self, row: usize) -> &[u128] {
        &self.elems[row * self.cols..(row + 1) * self.cols]
    }

    /// The elements as one row-major slice.
    pub fn to_values(&self) -> &[u128] {
        &self.elems
    }

    /// Serializes the whole matrix in row-major order, little-endian
    /// elements.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.byte_length());
        for &x in &self.elems {
            bytes.extend_from_slice(&x.to_le_bytes()[..self.element_size]);
        }
        bytes
    }

    /// Serializes the selected rows, one buffer per requested index.
    pub fn rows_to_bytes(&self, indexes: &[usize]) -> Result<Vec<Vec<u8>>> {
        indexes
            .iter()
            .map(|&r| {
                if r >= self.rows {
                    return Err(FieldError::InvalidArgument(format!(
                        "row {r} out of bounds for {} rows",
                        self.rows
                    )));
                }
                let mut bytes = Vec::with_capacity(self.row_stride_bytes());
                for &x in self.row(r) {
                    bytes.extend_from_slice(&x.to_le_bytes()[..self.element_size]);
                }
                Ok(bytes)
            })
            .collect()
    }

    /// Copies each row out into its own vector handle.
    pub fn rows_to_vectors(&self) -> Vec<FieldVector> {
        (0..self.rows)
            .map(|r| FieldVector::new(self.row(r).to_vec(), self.element_size))
            .collect()
    }

    /// The transposed matrix, freshly allocated.
    pub fn transpose(&self) -> FieldMatrix {
        let mut elems = vec![0u128; self.elems.len()];
        for r in 0..self.rows {
            for c in 0..self.cols {
                elems[c * self.rows + r] = self.elems[r * self.cols + c];
            }
        }
        FieldMatrix::new(self.cols, self.rows, elems, self.element_size)
    }
}

#[cfg(test)]
mod tests {
    use num::BigUint;

    use super::FieldMatrix;
    use crate::errors::FieldError;

    fn sample() -> FieldMatrix {
        FieldMatrix::new(2, 3, vec![1, 2, 3, 4, 5, 6], 16)
    }

    #[test]
    fn shape_accessors() {
        let m = sample();
        assert_eq!(m.row_count(), 2);
        assert_eq!(m.col_count(), 3);
        assert_eq!(m.element_count(), 6);
        assert_eq!(m.row_stride_bytes(), 48);
        assert_eq!(m.byte_length(), 96);
        assert_eq!(m.get_value(1, 2), 6);
        assert_eq!(m.row(1), &[4, 5, 6]);
    }

    #[test]
    fn set_value_range_check() {
        let mut m = sample();
        m.set_value(0, 0, &BigUint::from(u128::MAX)).unwrap();
        assert_eq!(m.get_value(0, 0), u128::MAX);
        assert!(matches!(
            m.set_value(0, 1, &(BigUint::from(u128::MAX) + 1u32)),
            Err(FieldError::OutOfRange(_))
        ));
    }

    #[test]
    fn row_major_bytes() {
        let m = sample();
        let bytes = m.to_bytes();
        assert_eq!(bytes.len(), 96);
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes[16], 2);
        assert_eq!(bytes[80], 6);

        let rows = m.rows_to_bytes(&[1]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], 4);
        assert!(m.rows_to_bytes(&[2]).is_err());
    }

    #[test]
    fn transpose_round_trip() {
        let m = sample();
        let t = m.transpose();
        assert_eq!(t.row_count(), 3);
        assert_eq!(t.col_count(), 2);
        assert_eq!(t.row(0), &[1, 4]);
        assert_eq!(t.transpose(), m);
    }

    #[test]
    fn rows_to_vectors() {
        let m = sample();
        let rows = m.rows_to_vectors();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].to_values(), &[1, 2, 3]);
        assert_eq!(rows[1].to_values(), &[4, 5, 6]);
    }
}
