//! Row-block parallel helpers shared by the image passes.

use rayon::prelude::*;

/// Number of chunks per rayon thread; extra chunks even out uneven rows.
const CHUNKS_PER_THREAD: usize = 3;

/// Rows per parallel chunk for an image of `height` rows.
#[inline]
pub fn rows_per_chunk(height: usize) -> usize {
    let num_chunks = rayon::current_num_threads() * CHUNKS_PER_THREAD;
    (height / num_chunks).max(1)
}

/// Splits a row-major buffer into row-aligned mutable chunks.
///
/// Yields `(first_row, chunk)` pairs; every chunk holds whole rows.
pub fn par_rows_mut<T: Send>(
    data: &mut [T],
    width: usize,
) -> impl IndexedParallelIterator<Item = (usize, &mut [T])> {
    assert!(width > 0, "width must be > 0");
    let chunk_rows = rows_per_chunk(data.len() / width);
    data.par_chunks_mut(width * chunk_rows)
        .enumerate()
        .map(move |(chunk_idx, chunk)| (chunk_idx * chunk_rows, chunk))
}

/// Parallel sum of `f(value)` over a slice, accumulated in f64.
pub fn par_sum_f64<F>(data: &[f32], f: F) -> f64
where
    F: Fn(f32) -> f64 + Sync,
{
    let chunk_len = (data.len() / (rayon::current_num_threads() * CHUNKS_PER_THREAD)).max(4096);
    data.par_chunks(chunk_len)
        .map(|chunk| chunk.iter().map(|&v| f(v)).sum::<f64>())
        .sum()
}
