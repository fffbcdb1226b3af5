use log::debug;

use crate::engine::{CoreEngine, ElementOp, Engine, FieldEngine, Operand, PackedEngine};
use crate::errors::{FieldError, Result};
use crate::matrix::FieldMatrix;
use crate::prime::PrimeField128;
use crate::vector::FieldVector;

/// Construction options for [`FiniteField`].
#[derive(Copy, Clone, Debug, Default)]
pub struct FieldOptions {
    /// Select the lane-parallel engine instead of the sequential one. Both
    /// produce bit-identical results.
    pub use_accelerated: bool,
}

/// Builds the field GF(p) with the requested engine.
pub fn create_prime_field(modulus: u128, options: FieldOptions) -> FiniteField {
    FiniteField::with_options(modulus, options)
}

/// A prime field together with the engine its bulk operations dispatch to.
///
/// The façade validates shapes and wraps results in fresh handles; the
/// arithmetic itself happens in the field kernel and the selected engine.
/// Instances are immutable and freely shareable.
#[derive(Clone, Debug)]
pub struct FiniteField {
    pub(crate) field: PrimeField128,
    pub(crate) engine: Engine,
}

impl FiniteField {
    /// GF(p) on the sequential engine.
    pub fn new(modulus: u128) -> Self {
        Self::with_options(modulus, FieldOptions::default())
    }

    pub fn with_options(modulus: u128, options: FieldOptions) -> Self {
        let engine = if options.use_accelerated {
            Engine::Packed(PackedEngine)
        } else {
            Engine::Core(CoreEngine)
        };
        debug!("creating GF({modulus}) on {engine:?}");
        Self {
            field: PrimeField128::new(modulus),
            engine,
        }
    }

    /// The underlying field instance.
    pub fn prime(&self) -> &PrimeField128 {
        &self.field
    }

    pub fn modulus(&self) -> u128 {
        self.field.modulus()
    }

    pub fn element_size(&self) -> usize {
        self.field.element_size()
    }

    // Element operations, delegated to the field kernel.

    pub fn add(&self, x: u128, y: u128) -> u128 {
        self.field.add(x, y)
    }

    pub fn sub(&self, x: u128, y: u128) -> u128 {
        self.field.sub(x, y)
    }

    pub fn mul(&self, x: u128, y: u128) -> u128 {
        self.field.mul(x, y)
    }

    pub fn div(&self, x: u128, y: u128) -> u128 {
        self.field.div(x, y)
    }

    pub fn inv(&self, x: u128) -> u128 {
        self.field.inv(x)
    }

    pub fn neg(&self, x: u128) -> u128 {
        self.field.neg(x)
    }

    pub fn exp(&self, b: u128, e: u128) -> Result<u128> {
        self.field.exp(b, e)
    }

    pub fn exp_signed(&self, b: u128, e: i128) -> Result<u128> {
        self.field.exp_signed(b, e)
    }

    pub fn rand(&self) -> u128 {
        self.field.rand()
    }

    /// `sha256(seed) mod p`.
    pub fn prng(&self, seed: &[u8]) -> u128 {
        self.field.prng(seed)
    }

    /// A vector of `n` elements derived from `seed` by repeated hashing.
    pub fn prng_vector(&self, seed: &[u8], n: usize) -> FieldVector {
        self.wrap_vector(self.field.prng_sequence(seed, n))
    }

    pub fn get_root_of_unity(&self, order: u128) -> Result<u128> {
        self.field.root_of_unity(order)
    }

    /// `[1, w, w^2, ...]` until the powers wrap, as a vector handle.
    pub fn get_power_cycle(&self, root: u128) -> Result<FieldVector> {
        Ok(self.wrap_vector(self.field.power_cycle(root)?))
    }

    // Handle constructors.

    /// A zero-filled vector of length `n`.
    pub fn new_vector(&self, n: usize) -> FieldVector {
        self.wrap_vector(vec![0u128; n])
    }

    /// Wraps raw values into a vector handle. Values are stored as given;
    /// callers supplying non-canonical values must reduce them first.
    pub fn vector_from_values(&self, values: Vec<u128>) -> FieldVector {
        self.wrap_vector(values)
    }

    /// Parses a little-endian byte buffer of whole elements.
    pub fn vector_from_bytes(&self, bytes: &[u8]) -> Result<FieldVector> {
        let size = self.field.element_size();
        if bytes.len() % size != 0 {
            return Err(FieldError::InvalidArgument(format!(
                "buffer length {} is not a multiple of the element size {size}",
                bytes.len()
            )));
        }
        let values = bytes
            .chunks_exact(size)
            .map(|chunk| self.field.element_from_bytes(chunk))
            .collect::<Result<Vec<u128>>>()?;
        Ok(self.wrap_vector(values))
    }

    /// A zero-filled `rows x cols` matrix.
    pub fn new_matrix(&self, rows: usize, cols: usize) -> FieldMatrix {
        FieldMatrix::new(rows, cols, vec![0u128; rows * cols], self.element_size())
    }

    /// Wraps row-major raw values into a matrix handle.
    pub fn matrix_from_values(
        &self,
        rows: usize,
        cols: usize,
        values: Vec<u128>,
    ) -> Result<FieldMatrix> {
        if values.len() != rows * cols {
            return Err(FieldError::DimensionMismatch(format!(
                "{rows}x{cols} matrix needs {} values, got {}",
                rows * cols,
                values.len()
            )));
        }
        Ok(FieldMatrix::new(rows, cols, values, self.element_size()))
    }

    /// Parses a row-major little-endian byte buffer.
    pub fn matrix_from_bytes(&self, rows: usize, cols: usize, bytes: &[u8]) -> Result<FieldMatrix> {
        let vector = self.vector_from_bytes(bytes)?;
        self.matrix_from_values(rows, cols, vector.into_values())
    }

    // Elementwise vector operations: vector-vector and vector-scalar
    // broadcast forms of one kernel.

    pub fn add_vectors(&self, a: &FieldVector, b: &FieldVector) -> Result<FieldVector> {
        self.elementwise_vv(ElementOp::Add, a, b)
    }

    pub fn add_vector_scalar(&self, a: &FieldVector, s: u128) -> FieldVector {
        self.elementwise_vs(ElementOp::Add, a, s)
    }

    pub fn sub_vectors(&self, a: &FieldVector, b: &FieldVector) -> Result<FieldVector> {
        self.elementwise_vv(ElementOp::Sub, a, b)
    }

    pub fn sub_vector_scalar(&self, a: &FieldVector, s: u128) -> FieldVector {
        self.elementwise_vs(ElementOp::Sub, a, s)
    }

    pub fn mul_vectors(&self, a: &FieldVector, b: &FieldVector) -> Result<FieldVector> {
        self.elementwise_vv(ElementOp::Mul, a, b)
    }

    pub fn mul_vector_scalar(&self, a: &FieldVector, s: u128) -> FieldVector {
        self.elementwise_vs(ElementOp::Mul, a, s)
    }

    pub fn div_vectors(&self, a: &FieldVector, b: &FieldVector) -> Result<FieldVector> {
        self.elementwise_vv(ElementOp::Div, a, b)
    }

    pub fn div_vector_scalar(&self, a: &FieldVector, s: u128) -> FieldVector {
        self.elementwise_vs(ElementOp::Div, a, s)
    }

    /// Elementwise inverses through one Montgomery batch; zeros stay zero.
    pub fn inv_vector_elements(&self, v: &FieldVector) -> FieldVector {
        self.wrap_vector(self.engine.batch_inverse(&self.field, v.to_values()))
    }

    /// `[1, seed, seed^2, ...]` of the given length.
    pub fn get_power_series(&self, seed: u128, n: usize) -> FieldVector {
        self.wrap_vector(self.engine.power_series(&self.field, seed, n))
    }

    /// Dot product of two equal-length vectors.
    pub fn combine_vectors(&self, a: &FieldVector, b: &FieldVector) -> Result<u128> {
        if a.len() != b.len() {
            return Err(FieldError::DimensionMismatch(format!(
                "vector lengths {} and {} differ",
                a.len(),
                b.len()
            )));
        }
        Ok(self.engine.dot(&self.field, a.to_values(), b.to_values()))
    }

    /// Linear combination `sum_i coefficients[i] * vectors[i]` of
    /// equal-length vectors.
    pub fn combine_many_vectors(
        &self,
        vectors: &[FieldVector],
        coefficients: &[u128],
    ) -> Result<FieldVector> {
        if vectors.len() != coefficients.len() {
            return Err(FieldError::DimensionMismatch(format!(
                "{} vectors but {} coefficients",
                vectors.len(),
                coefficients.len()
            )));
        }
        let n = vectors.first().map_or(0, FieldVector::len);
        if vectors.iter().any(|v| v.len() != n) {
            return Err(FieldError::DimensionMismatch(
                "vectors to combine must share one length".into(),
            ));
        }
        let mut acc = vec![0u128; n];
        for (v, &c) in vectors.iter().zip(coefficients) {
            let scaled = self
                .engine
                .elementwise(&self.field, ElementOp::Mul, v.to_values(), Operand::Scalar(c));
            acc = self
                .engine
                .elementwise(&self.field, ElementOp::Add, &acc, Operand::Elements(&scaled));
        }
        Ok(self.wrap_vector(acc))
    }

    // Matrix operations.

    /// Row-major matrix product; inner dimensions must agree.
    pub fn mul_matrices(&self, a: &FieldMatrix, b: &FieldMatrix) -> Result<FieldMatrix> {
        if a.col_count() != b.row_count() {
            return Err(FieldError::DimensionMismatch(format!(
                "cannot multiply {}x{} by {}x{}",
                a.row_count(),
                a.col_count(),
                b.row_count(),
                b.col_count()
            )));
        }
        let out = self.engine.mat_mul(
            &self.field,
            a.to_values(),
            b.to_values(),
            a.row_count(),
            a.col_count(),
            b.col_count(),
        );
        Ok(FieldMatrix::new(
            a.row_count(),
            b.col_count(),
            out,
            self.element_size(),
        ))
    }

    /// Matrix-by-vector product: the single-column specialization of
    /// [`Self::mul_matrices`].
    pub fn mul_matrix_by_vector(&self, m: &FieldMatrix, v: &FieldVector) -> Result<FieldVector> {
        if m.col_count() != v.len() {
            return Err(FieldError::DimensionMismatch(format!(
                "cannot multiply {}x{} by a vector of length {}",
                m.row_count(),
                m.col_count(),
                v.len()
            )));
        }
        let out = self.engine.mat_mul(
            &self.field,
            m.to_values(),
            v.to_values(),
            m.row_count(),
            m.col_count(),
            1,
        );
        Ok(self.wrap_vector(out))
    }

    // Internal plumbing.

    pub(crate) fn wrap_vector(&self, values: Vec<u128>) -> FieldVector {
        FieldVector::new(values, self.element_size())
    }

    pub(crate) fn elementwise_vv(
        &self,
        op: ElementOp,
        a: &FieldVector,
        b: &FieldVector,
    ) -> Result<FieldVector> {
        if a.len() != b.len() {
            return Err(FieldError::DimensionMismatch(format!(
                "vector lengths {} and {} differ",
                a.len(),
                b.len()
            )));
        }
        let out = self
            .engine
            .elementwise(&self.field, op, a.to_values(), Operand::Elements(b.to_values()));
        Ok(self.wrap_vector(out))
    }

    pub(crate) fn elementwise_vs(&self, op: ElementOp, a: &FieldVector, s: u128) -> FieldVector {
        let out = self
            .engine
            .elementwise(&self.field, op, a.to_values(), Operand::Scalar(s));
        self.wrap_vector(out)
    }
}

#[cfg(test)]
mod tests {
    use super::{create_prime_field, FieldOptions, FiniteField};
    use crate::errors::FieldError;
    use crate::field_testing::{rand_elements, P128};

    fn both_engines() -> (FiniteField, FiniteField) {
        (
            FiniteField::new(P128),
            create_prime_field(
                P128,
                FieldOptions {
                    use_accelerated: true,
                },
            ),
        )
    }

    #[test]
    fn engines_agree_on_the_full_surface() {
        let (core, packed) = both_engines();
        let a_values = rand_elements(core.prime(), 257);
        let b_values = rand_elements(core.prime(), 257);

        let a = core.vector_from_values(a_values.clone());
        let b = core.vector_from_values(b_values.clone());
        let pa = packed.vector_from_values(a_values);
        let pb = packed.vector_from_values(b_values);

        assert_eq!(core.add_vectors(&a, &b).unwrap(), packed.add_vectors(&pa, &pb).unwrap());
        assert_eq!(core.sub_vectors(&a, &b).unwrap(), packed.sub_vectors(&pa, &pb).unwrap());
        assert_eq!(core.mul_vectors(&a, &b).unwrap(), packed.mul_vectors(&pa, &pb).unwrap());
        assert_eq!(core.div_vectors(&a, &b).unwrap(), packed.div_vectors(&pa, &pb).unwrap());
        assert_eq!(core.mul_vector_scalar(&a, 7), packed.mul_vector_scalar(&pa, 7));
        assert_eq!(core.inv_vector_elements(&a), packed.inv_vector_elements(&pa));
        assert_eq!(
            core.combine_vectors(&a, &b).unwrap(),
            packed.combine_vectors(&pa, &pb).unwrap()
        );
        assert_eq!(core.get_power_series(3, 100), packed.get_power_series(3, 100));
    }

    #[test]
    fn scalar_broadcast_scenario() {
        let f = FiniteField::new(P128);
        let v = f.vector_from_values(vec![1, 2, 3, 4]);
        assert_eq!(f.mul_vector_scalar(&v, 5).to_values(), &[5, 10, 15, 20]);
    }

    #[test]
    fn power_series_scenario() {
        let f = FiniteField::new(P128);
        assert_eq!(
            f.get_power_series(3, 5).to_values(),
            &[1, 3, 9, 27, 81]
        );
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let f = FiniteField::new(P128);
        let a = f.vector_from_values(vec![1, 2, 3]);
        let b = f.vector_from_values(vec![1, 2]);
        assert!(matches!(
            f.add_vectors(&a, &b),
            Err(FieldError::DimensionMismatch(_))
        ));
        assert!(matches!(
            f.combine_vectors(&a, &b),
            Err(FieldError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn empty_vectors_stay_empty() {
        let f = FiniteField::new(P128);
        let empty = f.new_vector(0);
        assert_eq!(f.add_vectors(&empty, &empty).unwrap().len(), 0);
    }

    #[test]
    fn batch_inverse_round_trip_with_zeros() {
        let f = FiniteField::new(P128);
        let v = f.vector_from_values(vec![0, 1, 2, 0, 5]);
        let inv = f.inv_vector_elements(&v);
        assert_eq!(inv.get_value(0), 0);
        assert_eq!(f.inv_vector_elements(&inv), v);
    }

    #[test]
    fn matrix_product_and_vector_specialization() {
        let f = FiniteField::new(P128);
        let a = f.matrix_from_values(2, 2, vec![1, 2, 3, 4]).unwrap();
        let b = f.matrix_from_values(2, 2, vec![5, 6, 7, 8]).unwrap();
        let c = f.mul_matrices(&a, &b).unwrap();
        assert_eq!(c.to_values(), &[19, 22, 43, 50]);

        let v = f.vector_from_values(vec![5, 7]);
        let mv = f.mul_matrix_by_vector(&a, &v).unwrap();
        assert_eq!(mv.to_values(), &[19, 43]);

        let bad = f.matrix_from_values(3, 1, vec![1, 2, 3]).unwrap();
        assert!(matches!(
            f.mul_matrices(&a, &bad),
            Err(FieldError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn combine_many_vectors_linear_combination() {
        let f = FiniteField::new(P128);
        let u = f.vector_from_values(vec![1, 0, 2]);
        let v = f.vector_from_values(vec![0, 3, 1]);
        let out = f.combine_many_vectors(&[u, v], &[2, 5]).unwrap();
        assert_eq!(out.to_values(), &[2, 15, 9]);

        let w = f.vector_from_values(vec![1]);
        assert!(f
            .combine_many_vectors(&[f.new_vector(2), w], &[1, 1])
            .is_err());
    }

    #[test]
    fn byte_round_trips_through_handles() {
        let f = FiniteField::new(P128);
        let v = f.vector_from_values(vec![1, 2, 3, 4]);
        let parsed = f.vector_from_bytes(&v.to_bytes()).unwrap();
        assert_eq!(parsed, v);

        let m = f.matrix_from_values(2, 2, vec![9, 8, 7, 6]).unwrap();
        let parsed = f.matrix_from_bytes(2, 2, &m.to_bytes()).unwrap();
        assert_eq!(parsed, m);

        assert!(f.vector_from_bytes(&[0u8; 17]).is_err());
        assert!(f.matrix_from_bytes(2, 2, &[0u8; 48]).is_err());
    }

    #[test]
    fn prng_vector_matches_prng() {
        let f = FiniteField::new(P128);
        let v = f.prng_vector(b"seed", 3);
        assert_eq!(v.len(), 3);
        assert_eq!(v.get_value(0), f.prng(b"seed"));
    }
}
