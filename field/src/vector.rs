use num::{BigUint, ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::errors::{FieldError, Result};

/// A vector of field elements in a contiguous, row-major little-endian
/// buffer.
///
/// Handles own their storage; every operation that yields a vector allocates
/// a fresh one and operands are never aliased with results. Dropping the
/// handle reclaims the buffer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldVector {
    elems: Vec<u128>,
    element_size: usize,
}

impl FieldVector {
    pub(crate) fn new(elems: Vec<u128>, element_size: usize) -> Self {
        Self {
            elems,
            element_size,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Bytes per element, fixed by the owning field.
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Total serialized size: `len * element_size`.
    pub fn byte_length(&self) -> usize {
        self.elems.len() * self.element_size
    }

    pub fn get_value(&self, idx: usize) -> u128 {
        self.elems[idx]
    }

    /// Writes a raw value into one slot.
    ///
    /// Only representability is checked: values of 2^128 and above are
    /// rejected, values at or above the modulus are not. Callers storing raw
    /// values must reduce them first; operation results are always reduced.
    pub fn set_value(&mut self, idx: usize, value: &BigUint) -> Result<()> {
        let value = value.to_u128().ok_or_else(|| {
            FieldError::OutOfRange(format!("value {value} does not fit in 128 bits"))
        })?;
        self.elems[idx] = value;
        Ok(())
    }

    /// The elements as a slice.
    pub fn to_values(&self) -> &[u128] {
        &self.elems
    }

    pub(crate) fn into_values(self) -> Vec<u128> {
        self.elems
    }

    /// Serializes every element, little-endian, `element_size` bytes each.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.range_to_bytes(0, self.len()).unwrap()
    }

    /// Serializes `count` elements starting at `start`.
    pub fn range_to_bytes(&self, start: usize, count: usize) -> Result<Vec<u8>> {
        let end = start.checked_add(count).filter(|&e| e <= self.len());
        let Some(end) = end else {
            return Err(FieldError::InvalidArgument(format!(
                "range {start}..{} exceeds vector length {}",
                start.wrapping_add(count),
                self.len()
            )));
        };
        let mut bytes = Vec::with_capacity(count * self.element_size);
        for &x in &self.elems[start..end] {
            bytes.extend_from_slice(&x.to_le_bytes()[..self.element_size]);
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use num::BigUint;

    use super::FieldVector;
    use crate::errors::FieldError;

    #[test]
    fn lengths_and_bytes() {
        let v = FieldVector::new(vec![1, 2, 3], 16);
        assert_eq!(v.len(), 3);
        assert_eq!(v.byte_length(), 48);
        assert_eq!(v.element_size(), 16);
        assert_eq!(v.get_value(2), 3);
    }

    #[test]
    fn set_value_range_check() {
        let mut v = FieldVector::new(vec![0, 0], 16);

        let max = BigUint::from(u128::MAX);
        v.set_value(0, &max).unwrap();
        assert_eq!(v.get_value(0), u128::MAX);

        let too_big = BigUint::from(u128::MAX) + 1u32;
        assert!(matches!(
            v.set_value(1, &too_big),
            Err(FieldError::OutOfRange(_))
        ));
        assert_eq!(v.get_value(1), 0);
    }

    #[test]
    fn little_endian_wire_form() {
        let v = FieldVector::new(vec![1, 0x0102], 16);
        let bytes = v.to_bytes();
        assert_eq!(bytes.len(), 32);
        assert_eq!(bytes[0], 1);
        assert!(bytes[1..16].iter().all(|&b| b == 0));
        assert_eq!(bytes[16], 0x02);
        assert_eq!(bytes[17], 0x01);
    }

    #[test]
    fn byte_ranges() {
        let v = FieldVector::new(vec![5, 6, 7, 8], 2);
        assert_eq!(v.range_to_bytes(1, 2).unwrap(), vec![6, 0, 7, 0]);
        assert_eq!(v.range_to_bytes(4, 0).unwrap(), Vec::<u8>::new());
        assert!(v.range_to_bytes(3, 2).is_err());
        assert!(v.range_to_bytes(usize::MAX, 2).is_err());
    }
}
