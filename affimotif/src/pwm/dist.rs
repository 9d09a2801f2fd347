//! Discretized score distributions for *p-value* computation.
//!
//! This module implements the discretized computation of the score
//! distribution of a [`ScoringMatrix`] as implemented in MEME[\[1\]](#ref1).
//! The log-odds are first discretized with a position-independent affine
//! rescaling into a limited range (300 by default, as used by AMA). The
//! probability mass function of the summed integer scores is then built by
//! convolving the columns one at a time, and turned into a survival
//! function (the right tail of the cumulative distribution). The same
//! machinery is used for every contiguous sub-range of columns by
//! [`RangeDistribution`], which is required to score partial alignments.
//!
//! # Example
//! ```
//! # use affimotif::*;
//! # let data = DenseMatrix::from_rows([
//! #     [0.70, 0.10, 0.10, 0.10],
//! #     [0.10, 0.10, 0.70, 0.10],
//! #     [0.10, 0.70, 0.10, 0.10],
//! # ]);
//! # let freqs = FrequencyMatrix::<Dna>::new(data).unwrap();
//! # let pssm = freqs.to_scoring(None);
//! // Create a `ScoreDistribution` from a `ScoringMatrix`
//! let dist = ScoreDistribution::from(&pssm);
//!
//! // Get the *p-value* of the best discretized window, 1/64 under a
//! // uniform background.
//! let best = dist.unscale(dist.sf().len() as i32 - 1, 3);
//! let pvalue = dist.pvalue(best);
//! assert!((pvalue - 1.0 / 64.0).abs() < 1e-9);
//! ```
//!
//! Scores are only exact on the lattice of the discretized matrix: the
//! integer score of a window is a sum of separately rounded cells, which
//! cannot be recovered from the real log-odds of the window. The odds
//! returned by [`ScoreDistribution::to_odds`] lie on that lattice, so the
//! log-odds of any of their windows maps back to its integer score.
//!
//! ## 📚 References
//! - <a id="ref1">\[1\]</a> Bailey, Timothy L., Mikael Boden, Fabian A. Buske, Martin Frith, Charles E. Grant, Luca Clementi, Jingyuan Ren, Wilfred W. Li, and William S. Noble. ‘MEME SUITE: Tools for Motif Discovery and Searching’. Nucleic Acids Research 37 (1 July 2009): W202–8. [doi:10.1093/nar/gkp335](https://doi.org/10.1093/nar/gkp335).

#[cfg(feature = "sampling")]
use rand::distributions::uniform::Uniform;
#[cfg(feature = "sampling")]
use rand::distributions::Distribution;

use crate::abc::Alphabet;
use crate::abc::Symbol;
use crate::bg::Background;
use crate::dense::DenseMatrix;

use super::OddsMatrix;
use super::ScoringMatrix;

/// The default discretization range, used by AMA.
pub const DEFAULT_RANGE: usize = 300;

// --- Discretization ----------------------------------------------------------

/// An affine mapping of real scores to non-negative integers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discretization {
    offset: f64,
    scale: f64,
}

impl Discretization {
    /// Fit a discretization of the given values into `[0, range]`.
    ///
    /// Infinite values are ignored when computing the bounds.
    pub fn fit<'a, I>(values: I, range: usize) -> Self
    where
        I: IntoIterator<Item = &'a f64>,
    {
        let (mut small, large) = values
            .into_iter()
            .filter(|x| x.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, &x| match acc {
                None => Some((x, x)),
                Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
            })
            .unwrap_or((0.0, 0.0));
        if small == large {
            small = large - 1.0;
        }
        let offset = small.floor();
        let scale = ((range as f64) / (large - offset)).floor().max(1.0);
        Self { offset, scale }
    }

    /// The value mapped to zero.
    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// The number of integer units per real unit.
    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Discretize a single value.
    ///
    /// Non-finite values are mapped to `i32::MIN`, which marks an
    /// impossible cell.
    #[inline]
    pub fn discretize(&self, x: f64) -> i32 {
        if x.is_finite() {
            f64::round((x - self.offset) * self.scale) as i32
        } else {
            i32::MIN
        }
    }

    /// Convert a real score summed over `width` cells to an integer score.
    #[inline]
    pub fn scale_sum(&self, x: f64, width: usize) -> i32 {
        f64::round((x - width as f64 * self.offset) * self.scale) as i32
    }

    /// Convert an integer score summed over `width` cells to a real score.
    #[inline]
    pub fn unscale_sum(&self, x: i32, width: usize) -> f64 {
        x as f64 / self.scale + width as f64 * self.offset
    }
}

// --- Convolution -------------------------------------------------------------

/// Extend a probability mass function with one column of integer scores.
///
/// Cells set to `i32::MIN`, or with a zero weight, never occur.
pub fn convolve(pmf: &[f64], row: &[i32], weights: &[f64]) -> Vec<f64> {
    let max = row
        .iter()
        .zip(weights)
        .filter(|&(&s, &w)| s != i32::MIN && w > 0.0)
        .map(|(&s, _)| s.max(0) as usize)
        .max()
        .unwrap_or(0);
    let mut new = vec![0.0; pmf.len() + max];
    for (&s, &w) in row.iter().zip(weights) {
        if s == i32::MIN || w <= 0.0 {
            continue;
        }
        let s = s.max(0) as usize;
        for (k, &old) in pmf.iter().enumerate() {
            if old != 0.0 {
                new[k + s] += old * w;
            }
        }
    }
    new
}

/// Turn a probability mass function into a survival function.
pub fn survival(pmf: Vec<f64>) -> Vec<f64> {
    let mut sf = pmf;
    for i in (0..sf.len().saturating_sub(1)).rev() {
        sf[i] = (sf[i] + sf[i + 1]).min(1.0);
    }
    sf
}

/// Look up the survival function at `score`, clamping to the table.
#[inline]
pub fn lookup(sf: &[f64], score: i32) -> f64 {
    if score <= 0 || sf.is_empty() {
        1.0
    } else {
        sf[(score as usize).min(sf.len() - 1)]
    }
}

// --- ScoreDistribution -------------------------------------------------------

/// An exact distribution of the discretized scores of a [`ScoringMatrix`].
#[derive(Debug, Clone)]
pub struct ScoreDistribution<A: Alphabet> {
    /// The affine discretization of the matrix.
    discretization: Discretization,
    /// The discrete score matrix.
    data: DenseMatrix<i32, A::K>,
    /// The probability mass function of the whole-matrix score.
    pmf: Vec<f64>,
    /// The survival function of the whole-matrix score.
    sf: Vec<f64>,
}

impl<A: Alphabet> ScoreDistribution<A> {
    /// Discretize a scoring matrix and compute its score distribution.
    ///
    /// The `background` is the distribution of sequence symbols used for
    /// the *p-values*, which is not necessarily the background the
    /// scoring matrix was built with.
    pub fn new<S>(pssm: S, background: &Background<A>, range: usize) -> Self
    where
        S: AsRef<ScoringMatrix<A>>,
    {
        let pssm = pssm.as_ref();
        let discretization = Discretization::fit(pssm.matrix().cells(), range);
        let data = pssm.matrix().map(|&x| discretization.discretize(x));
        let mut dist = Self {
            discretization,
            data,
            pmf: Vec::new(),
            sf: Vec::new(),
        };
        dist.pmf = dist.mass(background);
        dist.sf = survival(dist.pmf.clone());
        dist
    }

    /// Compute the probability mass function of the scores under a background.
    pub fn mass(&self, background: &Background<A>) -> Vec<f64> {
        let weights = background.concrete();
        self.data
            .iter()
            .fold(vec![1.0], |pmf, row| convolve(&pmf, row, weights))
    }

    /// Get the odds matrix of the discretized log-odds.
    ///
    /// Each cell holds `2^x`, where `x` is the unscaled integer cell.
    /// Impossible cells have null odds.
    pub fn to_odds(&self, background: Background<A>) -> OddsMatrix<A> {
        let data = self.data.map(|&s| {
            if s == i32::MIN {
                0.0
            } else {
                self.unscale(s, 1).exp2()
            }
        });
        OddsMatrix { background, data }
    }

    /// Compute the distributions of every contiguous range of columns.
    pub fn ranges(&self, background: &Background<A>) -> RangeDistribution {
        let rows = self.data.iter().collect::<Vec<_>>();
        RangeDistribution::new(&rows, background.concrete())
    }

    /// The probability mass function of the whole-matrix score.
    #[inline]
    pub fn pmf(&self) -> &[f64] {
        self.pmf.as_slice()
    }

    /// The survival function of the whole-matrix score.
    #[inline]
    pub fn sf(&self) -> &[f64] {
        self.sf.as_slice()
    }

    /// The discrete score matrix.
    #[inline]
    pub fn matrix(&self) -> &DenseMatrix<i32, A::K> {
        &self.data
    }

    /// The discretization used for the matrix.
    #[inline]
    pub fn discretization(&self) -> &Discretization {
        &self.discretization
    }

    /// Scale the given log-odds, summed over `width` columns, to an integer score.
    #[inline]
    pub fn scale(&self, score: f64, width: usize) -> i32 {
        self.discretization.scale_sum(score, width)
    }

    /// Unscale the given integer score, summed over `width` columns, to log-odds.
    #[inline]
    pub fn unscale(&self, score: i32, width: usize) -> f64 {
        self.discretization.unscale_sum(score, width)
    }

    /// Get the integer score of a window of sequence symbols.
    ///
    /// Returns `None` if the window contains a non-concrete symbol, or a
    /// symbol with a null frequency in the motif.
    pub fn window<'s, I>(&self, window: I) -> Option<i32>
    where
        I: IntoIterator<Item = &'s A::Symbol>,
    {
        let mut score = 0i32;
        for (row, symbol) in self.data.iter().zip(window) {
            if !A::is_concrete(*symbol) {
                return None;
            }
            let s = row[symbol.as_index()];
            if s == i32::MIN {
                return None;
            }
            score += s;
        }
        Some(score)
    }

    /// Get the *p-value* for the given whole-matrix log-odds.
    ///
    /// The score is expected to lie on the lattice of the discretized
    /// matrix, as obtained with [`ScoreDistribution::unscale`] or from the
    /// odds of [`ScoreDistribution::to_odds`]. Scores above the best
    /// attainable one get the smallest *p-value* of the table.
    #[inline]
    pub fn pvalue(&self, score: f64) -> f64 {
        lookup(&self.sf, self.scale(score, self.data.rows()))
    }

    /// Get the smallest whole-matrix log-odds with a *p-value* under `pvalue`.
    pub fn score(&self, pvalue: f64) -> f64 {
        let i = self
            .sf
            .partition_point(|&x| x > pvalue)
            .min(self.sf.len().saturating_sub(1));
        self.unscale(i as i32, self.data.rows())
    }

    /// Get the minimum *p-value* attainable by the matrix.
    pub fn min_pvalue(&self) -> f64 {
        self.sf
            .iter()
            .rev()
            .find(|&&x| x > 0.0)
            .cloned()
            .unwrap_or(0.0)
    }
}

impl<A: Alphabet, S: AsRef<ScoringMatrix<A>>> From<S> for ScoreDistribution<A> {
    fn from(pssm: S) -> Self {
        let pssm = pssm.as_ref();
        Self::new(pssm, pssm.background(), DEFAULT_RANGE)
    }
}

#[cfg(feature = "sampling")]
impl<A: Alphabet> Distribution<f64> for ScoreDistribution<A> {
    fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let s = Uniform::new_inclusive(0.0, 1.0);
        let p = s.sample(rng);
        self.score(p)
    }
}

// --- RangeDistribution -------------------------------------------------------

/// The score distributions of every contiguous range of matrix columns.
#[derive(Debug, Clone)]
pub struct RangeDistribution {
    width: usize,
    pmfs: Vec<Vec<f64>>,
    sfs: Vec<Vec<f64>>,
}

impl RangeDistribution {
    /// Compute the distributions for the given integer rows.
    ///
    /// `weights[j]` is the probability of observing column `j` in a row.
    pub fn new<R: AsRef<[i32]>>(rows: &[R], weights: &[f64]) -> Self {
        let histograms = rows
            .iter()
            .map(|row| {
                let cells = row
                    .as_ref()
                    .iter()
                    .zip(weights)
                    .filter(|&(&s, &w)| s != i32::MIN && w > 0.0);
                let max = cells.clone().map(|(&s, _)| s.max(0)).max().unwrap_or(0);
                let mut histogram = vec![0.0; max as usize + 1];
                for (&s, &w) in cells {
                    histogram[s.max(0) as usize] += w;
                }
                histogram
            })
            .collect::<Vec<_>>();
        Self::from_histograms(&histograms)
    }

    /// Compute the distributions from the score histogram of each row.
    ///
    /// `histograms[i][s]` is the probability that row `i` scores `s`.
    pub fn from_histograms<H: AsRef<[f64]>>(histograms: &[H]) -> Self {
        let rows = histograms
            .iter()
            .map(|h| (0..h.as_ref().len() as i32).collect::<Vec<i32>>())
            .collect::<Vec<_>>();
        let width = histograms.len();
        let mut pmfs = vec![Vec::new(); width * width];
        for start in (0..width).rev() {
            let mut pmf = vec![1.0];
            for end in start..width {
                pmf = convolve(&pmf, &rows[end], histograms[end].as_ref());
                pmfs[start * width + end] = pmf.clone();
            }
        }
        let sfs = pmfs.iter().cloned().map(survival).collect();
        Self { width, pmfs, sfs }
    }

    /// The number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// The probability mass function of the scores of `[start, end]`.
    ///
    /// # Panics
    /// Panics if `start > end` or `end` is out of bounds.
    #[inline]
    pub fn pmf(&self, start: usize, end: usize) -> &[f64] {
        assert!(start <= end && end < self.width);
        &self.pmfs[start * self.width + end]
    }

    /// The survival function of the scores of `[start, end]`.
    ///
    /// # Panics
    /// Panics if `start > end` or `end` is out of bounds.
    #[inline]
    pub fn sf(&self, start: usize, end: usize) -> &[f64] {
        assert!(start <= end && end < self.width);
        &self.sfs[start * self.width + end]
    }

    /// Get the *p-value* of an integer score summed over `[start, end]`.
    #[inline]
    pub fn pvalue(&self, start: usize, end: usize, score: i32) -> f64 {
        lookup(self.sf(start, end), score)
    }
}
