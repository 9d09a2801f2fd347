//! Sequence-dependent Markov backgrounds.
//!
//! A [`MarkovBackground`] is fitted on the sequence it will be used to
//! score, so that motif odds can be expressed relative to the local
//! composition of each sequence instead of a global background.

use typenum::marker_traits::Unsigned;

use crate::abc::Alphabet;
use crate::abc::Symbol;
use crate::seq::EncodedSequence;

/// An order-`k` Markov model over the concrete symbols of an alphabet.
///
/// The model stores one conditional probability table for every order
/// from `0` to `k`, so that positions with a truncated context (at the
/// start of a sequence, or right after an ambiguous symbol) can still be
/// assigned a probability.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkovBackground<A: Alphabet> {
    order: usize,
    /// `tables[j][c * K + x]` is `P(x | c)` for a context `c` of length `j`.
    tables: Vec<Vec<f64>>,
    alphabet: std::marker::PhantomData<A>,
}

impl<A: Alphabet> MarkovBackground<A> {
    /// Fit a Markov model of the given order on a sequence.
    ///
    /// Only words made of concrete symbols are counted.
    pub fn from_sequence<S>(sequence: S, order: usize) -> Self
    where
        S: AsRef<EncodedSequence<A>>,
    {
        let seq = sequence.as_ref();
        let k = A::K::USIZE;
        let mut counts = (0..=order)
            .map(|j| vec![0.0f64; k.pow(j as u32 + 1)])
            .collect::<Vec<_>>();

        let mut run = 0;
        for (i, symbol) in seq.iter().enumerate() {
            if !A::is_concrete(*symbol) {
                run = 0;
                continue;
            }
            run += 1;
            for (j, table) in counts.iter_mut().enumerate().take(run.min(order + 1)) {
                table[Self::word_index(seq, i, j)] += 1.0;
            }
        }

        let tables = counts
            .into_iter()
            .map(|mut table| {
                for row in table.chunks_mut(k) {
                    let total: f64 = row.iter().sum();
                    if total > 0.0 {
                        row.iter_mut().for_each(|x| *x /= total);
                    } else {
                        row.iter_mut().for_each(|x| *x = 1.0 / k as f64);
                    }
                }
                table
            })
            .collect();

        Self {
            order,
            tables,
            alphabet: std::marker::PhantomData,
        }
    }

    /// The order of the model.
    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Get the conditional probability of the symbol at `i` given the
    /// `context` symbols preceding it.
    fn probability(&self, seq: &EncodedSequence<A>, i: usize, context: usize) -> f64 {
        self.tables[context][Self::word_index(seq, i, context)]
    }

    /// Get the cumulative log-probabilities of a sequence under the model.
    ///
    /// The returned vector has `len() + 1` elements, with `cum[0] = 0` and
    /// `cum[i + 1] = cum[i] + ln P(seq[i] | context)`. Ambiguous symbols
    /// contribute nothing, and reset the context of the next symbols.
    pub fn log_cumulative<S>(&self, sequence: S) -> Vec<f64>
    where
        S: AsRef<EncodedSequence<A>>,
    {
        let seq = sequence.as_ref();
        let mut cum = Vec::with_capacity(seq.len() + 1);
        let mut total = 0.0;
        let mut run = 0;
        cum.push(total);
        for (i, symbol) in seq.iter().enumerate() {
            if A::is_concrete(*symbol) {
                total += self.probability(seq, i, run.min(self.order)).ln();
                run += 1;
            } else {
                run = 0;
            }
            cum.push(total);
        }
        cum
    }

    /// Get the table index of the word `seq[i - j..=i]`.
    fn word_index(seq: &EncodedSequence<A>, i: usize, j: usize) -> usize {
        let k = A::K::USIZE;
        (i - j..=i).fold(0, |index, x| index * k + seq[x].as_index())
    }
}
