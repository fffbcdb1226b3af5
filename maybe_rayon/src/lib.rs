//! Feature-gated slice parallelism.
//!
//! With the `parallel` feature the `par_chunks*` entry points resolve to
//! rayon's slice iterators; without it they resolve to the serial `std`
//! equivalents, so callers compile identically either way.

#[cfg(not(feature = "parallel"))]
use std::slice::{Chunks, ChunksMut};

#[cfg(feature = "parallel")]
pub use rayon::prelude::{IndexedParallelIterator, ParallelIterator};
#[cfg(feature = "parallel")]
use rayon::slice::{
    Chunks as ParChunks, ChunksMut as ParChunksMut, ParallelSlice, ParallelSliceMut,
};

#[cfg(feature = "parallel")]
pub trait MaybeParChunks<T: Sync> {
    fn par_chunks(&self, chunk_size: usize) -> ParChunks<'_, T>;
}

#[cfg(not(feature = "parallel"))]
pub trait MaybeParChunks<T> {
    fn par_chunks(&self, chunk_size: usize) -> Chunks<'_, T>;
}

#[cfg(feature = "parallel")]
impl<T: Sync> MaybeParChunks<T> for [T] {
    fn par_chunks(&self, chunk_size: usize) -> ParChunks<'_, T> {
        ParallelSlice::par_chunks(self, chunk_size)
    }
}

#[cfg(not(feature = "parallel"))]
impl<T> MaybeParChunks<T> for [T] {
    fn par_chunks(&self, chunk_size: usize) -> Chunks<'_, T> {
        self.chunks(chunk_size)
    }
}

#[cfg(feature = "parallel")]
pub trait MaybeParChunksMut<T: Send> {
    fn par_chunks_mut(&mut self, chunk_size: usize) -> ParChunksMut<'_, T>;
}

#[cfg(not(feature = "parallel"))]
pub trait MaybeParChunksMut<T: Send> {
    fn par_chunks_mut(&mut self, chunk_size: usize) -> ChunksMut<'_, T>;
}

#[cfg(feature = "parallel")]
impl<T: Send> MaybeParChunksMut<T> for [T] {
    fn par_chunks_mut(&mut self, chunk_size: usize) -> ParChunksMut<'_, T> {
        ParallelSliceMut::par_chunks_mut(self, chunk_size)
    }
}

#[cfg(not(feature = "parallel"))]
impl<T: Send> MaybeParChunksMut<T> for [T] {
    fn par_chunks_mut(&mut self, chunk_size: usize) -> ChunksMut<'_, T> {
        self.chunks_mut(chunk_size)
    }
}

#[cfg(test)]
mod tests {
    #[cfg(feature = "parallel")]
    use crate::{IndexedParallelIterator, ParallelIterator};
    use crate::{MaybeParChunks, MaybeParChunksMut};

    #[test]
    fn chunked_sum_matches_serial() {
        let xs: Vec<u64> = (0..1000).collect();
        let mut partials = vec![0u64; 8];
        partials
            .par_chunks_mut(1)
            .zip(xs.par_chunks(125))
            .for_each(|(acc, chunk)| acc[0] = chunk.iter().sum());
        let total: u64 = partials.iter().sum();
        assert_eq!(total, xs.iter().sum());
    }
}
