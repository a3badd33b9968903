//! Parallel sampler.
//!
//! Splits `[0, N)` into contiguous chunks, gives every chunk its own RNG stream, and
//! lets the context fill the chunks on the Rayon pool. Chunks are copied into the
//! sample matrix in chunk order once all of them are done, so the sample depends only
//! on `(seed, iteration, chunk count)`.
//!
//! Performance evaluation is single-threaded and row-ordered.

use std::ops::Range;

use ce_core::{CrossEntropyContext, Parameter, SampleChunk};
use ce_prob::RandomStreams;
use nalgebra::DMatrix;
use rayon::prelude::*;

/// One iteration's sample and the aligned performance vector.
#[derive(Debug, Clone)]
pub struct Sample {
    values: DMatrix<f64>,
    performances: Vec<f64>,
}

impl Sample {
    /// `N × D` matrix of sampled states.
    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Performance of each row.
    pub fn performances(&self) -> &[f64] {
        &self.performances
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.performances.len()
    }

    /// Whether the sample has no rows.
    pub fn is_empty(&self) -> bool {
        self.performances.is_empty()
    }

    /// Copy row `i` into `state`.
    pub fn copy_state(&self, i: usize, state: &mut [f64]) {
        for (j, s) in state.iter_mut().enumerate() {
            *s = self.values[(i, j)];
        }
    }
}

/// Contiguous, near-equal chunk ranges covering `[0, sample_size)`.
///
/// The first `sample_size % n_chunks` chunks get one extra row.
pub fn chunk_ranges(sample_size: usize, n_chunks: usize) -> Vec<Range<usize>> {
    let n_chunks = n_chunks.clamp(1, sample_size.max(1));
    let base = sample_size / n_chunks;
    let extra = sample_size % n_chunks;
    let mut start = 0;
    (0..n_chunks)
        .map(|c| {
            let len = base + usize::from(c < extra);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

/// Fan-out/fan-in sampler bound to a seed and a chunk count.
#[derive(Debug, Clone)]
pub struct Sampler {
    streams: RandomStreams,
    n_chunks: usize,
}

impl Sampler {
    /// Sampler with streams rooted at `seed`.
    pub fn new(seed: u64, n_chunks: usize) -> Self {
        Self { streams: RandomStreams::new(seed), n_chunks: n_chunks.max(1) }
    }

    /// Number of chunks per sample.
    pub fn n_chunks(&self) -> usize {
        self.n_chunks
    }

    /// Draw `sample_size` states from `parameter`.
    ///
    /// `round` selects the stream family; every iteration uses a distinct value.
    pub fn sample<C>(
        &self,
        context: &C,
        parameter: &Parameter,
        sample_size: usize,
        round: u64,
    ) -> DMatrix<f64>
    where
        C: CrossEntropyContext + ?Sized,
    {
        let dimension = context.state_dimension();
        let ranges = chunk_ranges(sample_size, self.n_chunks);
        let rngs = self.streams.streams(round, ranges.len());

        let chunks: Vec<SampleChunk> = ranges
            .into_par_iter()
            .zip(rngs.into_par_iter())
            .map(|(rows, mut rng)| {
                let mut chunk = SampleChunk::new(rows, sample_size, dimension);
                context.partial_sample(&mut chunk, &mut rng, parameter);
                chunk
            })
            .collect();

        let mut values = DMatrix::zeros(sample_size, dimension);
        for chunk in &chunks {
            if !chunk.is_empty() {
                values.rows_mut(chunk.rows().start, chunk.len()).copy_from(chunk.values());
            }
        }
        values
    }

    /// Draw a sample and evaluate the performance of every row.
    pub fn draw<C>(
        &self,
        context: &C,
        parameter: &Parameter,
        sample_size: usize,
        round: u64,
    ) -> Sample
    where
        C: CrossEntropyContext + ?Sized,
    {
        let values = self.sample(context, parameter, sample_size, round);
        let performances = evaluate(context, &values);
        Sample { values, performances }
    }
}

/// Performance of every row of `values`, in row order.
pub fn evaluate<C>(context: &C, values: &DMatrix<f64>) -> Vec<f64>
where
    C: CrossEntropyContext + ?Sized,
{
    let mut state = vec![0.0; values.ncols()];
    (0..values.nrows())
        .map(|i| {
            for (j, s) in state.iter_mut().enumerate() {
                *s = values[(i, j)];
            }
            context.performance(&state)
        })
        .collect()
}
