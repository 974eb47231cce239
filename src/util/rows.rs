//! Row-wise output fill, optionally parallel via rayon.
//!
//! Every stage writes one output element per pixel and reads only shared,
//! immutable inputs, so rows can be produced in any order. The closure
//! receives the row index and the mutable output row.

/// Fills `out` row by row using `f(y, row)`.
///
/// With the `rayon` feature and `parallel == true` rows are distributed over
/// the rayon pool; otherwise they are filled sequentially. Both paths call the
/// same closure, so results are identical.
pub(crate) fn fill_rows<T, F>(out: &mut [T], width: usize, parallel: bool, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    if width == 0 {
        return;
    }

    #[cfg(feature = "rayon")]
    {
        if parallel {
            use rayon::prelude::*;
            out.par_chunks_mut(width)
                .enumerate()
                .for_each(|(y, row)| f(y, row));
            return;
        }
    }
    #[cfg(not(feature = "rayon"))]
    let _ = parallel;

    for (y, row) in out.chunks_mut(width).enumerate() {
        f(y, row);
    }
}
