//! Significance of average-odds scores.
//!
//! The *p-value* of the average odds of a sequence is read from tables of
//! the distribution of the average odds of `1, 2, 4, ...` windows, built
//! once per matrix pair and GC bin. The tables live on a regular grid of
//! log2-odds: the table for `2m` windows is obtained by averaging two
//! independent copies of the table for `m` windows, which only depends on
//! the distance between the two grid points. The mass of an average that
//! falls between two grid points is split between them so that the mean
//! odds are preserved exactly.
//!
//! A window count between two powers of two interpolates the logarithm of
//! the *p-values* linearly in the count, since tail probabilities of an
//! average decay exponentially with the number of terms. A sequence with
//! a single window on a single strand is looked up exactly in the
//! discretized survival function instead.

use super::abc::Alphabet;
use super::pssm::PssmPair;
use super::pwm::dist::lookup;
use super::pwm::dist::survival;

/// The default number of points of the log2-odds grid.
pub const DEFAULT_GRID_SIZE: usize = 512;

/// The default largest window count with a dedicated table.
pub const DEFAULT_MAX_WINDOWS: usize = 1 << 16;

/// The tolerance used when locating a score on the grid.
const GRID_TOLERANCE: f64 = 1e-6;

// --- Grid --------------------------------------------------------------------

/// A regular grid of log2-odds values.
#[derive(Clone, Debug, PartialEq)]
struct Grid {
    origin: f64,
    step: f64,
    size: usize,
}

impl Grid {
    fn new(lo: f64, hi: f64, size: usize) -> Self {
        if size < 2 || hi <= lo {
            Self {
                origin: lo,
                step: 1.0,
                size: 1,
            }
        } else {
            Self {
                origin: lo,
                step: (hi - lo) / (size - 1) as f64,
                size,
            }
        }
    }

    /// The fractional grid position of a log2-odds value.
    #[inline]
    fn position(&self, x: f64) -> f64 {
        (x - self.origin) / self.step
    }

    /// The share of the upper point for a value `frac` steps past a point.
    #[inline]
    fn upper(&self, frac: f64) -> f64 {
        (((frac * self.step).exp2() - 1.0) / (self.step.exp2() - 1.0)).clamp(0.0, 1.0)
    }

    #[inline]
    fn deposit(&self, pmf: &mut [f64], i: usize, up: f64, mass: f64) {
        if i + 1 < self.size {
            pmf[i] += mass * (1.0 - up);
            pmf[i + 1] += mass * up;
        } else {
            pmf[self.size - 1] += mass;
        }
    }

    /// Place `(log2 odds, probability)` atoms on the grid.
    ///
    /// Missing mass corresponds to windows with null odds, and is placed
    /// on the lowest point.
    fn place(&self, atoms: &[(f64, f64)]) -> Vec<f64> {
        let mut pmf = vec![0.0; self.size];
        let mut total = 0.0;
        for &(x, p) in atoms.iter().filter(|(x, p)| x.is_finite() && *p > 0.0) {
            let pos = self.position(x).max(0.0);
            let i = (pos.floor() as usize).min(self.size - 1);
            self.deposit(&mut pmf, i, self.upper(pos - i as f64), p);
            total += p;
        }
        if total < 1.0 {
            pmf[0] += 1.0 - total;
        }
        pmf
    }

    /// Get, for each grid distance `d`, where the average of two points
    /// `d` steps apart falls, relative to the upper point.
    fn shifts(&self) -> Vec<(usize, f64)> {
        (0..self.size)
            .map(|d| {
                let c = ((1.0 + (-(d as f64) * self.step).exp2()) / 2.0).log2() / self.step;
                let floor = c.floor();
                ((-floor) as usize, self.upper(c - floor))
            })
            .collect()
    }

    /// Get the distribution of the average of two independent variables.
    fn average(&self, a: &[f64], b: &[f64], shifts: &[(usize, f64)]) -> Vec<f64> {
        let mut pmf = vec![0.0; self.size];
        for (i, &pa) in a.iter().enumerate().filter(|(_, p)| **p > 0.0) {
            for (j, &pb) in b.iter().enumerate().filter(|(_, p)| **p > 0.0) {
                let (hi, d) = if i >= j { (i, i - j) } else { (j, j - i) };
                let (shift, up) = shifts[d];
                self.deposit(&mut pmf, hi.saturating_sub(shift), up, pa * pb);
            }
        }
        pmf
    }

    /// Get the distribution of the average of two copies of a variable.
    fn double(&self, a: &[f64], shifts: &[(usize, f64)]) -> Vec<f64> {
        let mut pmf = vec![0.0; self.size];
        for (i, &pi) in a.iter().enumerate().filter(|(_, p)| **p > 0.0) {
            self.deposit(&mut pmf, i, 0.0, pi * pi);
            for (j, &pj) in a.iter().enumerate().take(i).filter(|(_, p)| **p > 0.0) {
                let (shift, up) = shifts[i - j];
                self.deposit(&mut pmf, i.saturating_sub(shift), up, 2.0 * pi * pj);
            }
        }
        pmf
    }
}

// --- AverageDistribution -----------------------------------------------------

/// The distributions of the average odds of `2^k` windows.
#[derive(Clone, Debug)]
pub struct AverageDistribution {
    grid: Grid,
    sfs: Vec<Vec<f64>>,
}

impl AverageDistribution {
    /// Compute the tables from the window log2-odds atoms of each strand.
    ///
    /// `strands` holds one or two lists of `(log2 odds, probability)`
    /// atoms. With two strands, a unit is the average of one window of
    /// each strand. Tables are built for `1, 2, 4, ...` units, up to the
    /// largest power of two not above `max_windows`.
    pub fn new<S: AsRef<[(f64, f64)]>>(strands: &[S], size: usize, max_windows: usize) -> Self {
        let (lo, hi) = strands
            .iter()
            .flat_map(|s| s.as_ref().iter())
            .filter(|(x, p)| x.is_finite() && *p > 0.0)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (x, _)| {
                (lo.min(*x), hi.max(*x))
            });
        if lo > hi {
            return Self {
                grid: Grid::new(0.0, 0.0, 1),
                sfs: vec![vec![1.0]],
            };
        }

        let grid = Grid::new(lo, hi, size);
        let shifts = grid.shifts();
        let mut units = strands.iter().map(|s| grid.place(s.as_ref()));
        let mut pmf = units.next().unwrap_or_else(|| vec![1.0; grid.size]);
        for other in units {
            pmf = grid.average(&pmf, &other, &shifts);
        }

        let levels = (usize::BITS - max_windows.max(1).leading_zeros()) as usize;
        let mut sfs = Vec::with_capacity(levels);
        sfs.push(survival(pmf.clone()));
        for _ in 1..levels {
            pmf = grid.double(&pmf, &shifts);
            sfs.push(survival(pmf.clone()));
        }

        Self { grid, sfs }
    }

    /// The number of tables, for `1, 2, 4, ...` units.
    #[inline]
    pub fn levels(&self) -> usize {
        self.sfs.len()
    }

    /// Get the *p-value* of an average odds `score` over `n` units.
    ///
    /// Counts above the largest table use the largest table.
    pub fn pvalue(&self, score: f64, n: usize) -> f64 {
        if n == 0 || score.is_nan() || score <= 0.0 {
            return 1.0;
        }
        let pos = self.grid.position(score.log2());
        if pos <= 0.0 {
            return 1.0;
        }
        let i = ((pos + GRID_TOLERANCE).floor() as usize).min(self.grid.size - 1);

        let k = (usize::BITS - 1 - n.leading_zeros()) as usize;
        let last = self.sfs.len() - 1;
        if k >= last {
            return self.sfs[last][i];
        }
        let base = 1usize << k;
        let t = (n - base) as f64 / base as f64;
        let (p0, p1) = (self.sfs[k][i], self.sfs[k + 1][i]);
        if t <= 0.0 {
            p0
        } else if p0 > 0.0 && p1 > 0.0 {
            ((1.0 - t) * p0.ln() + t * p1.ln()).exp().min(1.0)
        } else {
            (1.0 - t) * p0 + t * p1
        }
    }
}

// --- ama_pvalue --------------------------------------------------------------

/// Get the *p-value* of an average-odds score.
///
/// `length` is the length of the scanned part of the sequence, and `gc`
/// its GC content, used to select a GC bin when the matrices have some.
/// Only meaningful for scores obtained with
/// [`ScoringMethod::AvgOdds`](crate::scan::ScoringMethod::AvgOdds).
pub fn ama_pvalue<A: Alphabet>(
    score: f64,
    length: usize,
    gc: Option<f64>,
    pair: &PssmPair<A>,
) -> f64 {
    let w = pair.len();
    let windows = (length + 1).saturating_sub(w);
    if windows == 0 || score.is_nan() || score <= 0.0 {
        return 1.0;
    }

    if windows == 1 && pair.strands() == 1 {
        let positive = pair.positive();
        let sf = positive
            .gc_bin(gc)
            .map(|b| b.sf())
            .unwrap_or(positive.distribution().sf());
        let x = positive.distribution().scale(score.log2(), w);
        return lookup(sf, x);
    }

    pair.average(gc).pvalue(score, windows)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::abc::Dna;
    use crate::bg::Background;
    use crate::dense::DenseMatrix;
    use crate::pssm::PssmBuilder;
    use crate::pssm::Strands;
    use crate::pwm::FrequencyMatrix;
    use crate::pwm::Motif;

    macro_rules! assert_almost_eq {
        ($x:expr, $y:expr, places = $places:expr) => {{
            assert_eq!(
                ($x * 10.0_f64.powi($places)).round(),
                ($y * 10.0_f64.powi($places)).round(),
            )
        }};
    }

    #[rustfmt::skip]
    const FREQS: [[f64; 4]; 2] = [
        //  A     C     G     T
        [ 0.70, 0.10, 0.10, 0.10 ],
        [ 0.10, 0.10, 0.10, 0.70 ],
    ];

    fn build(strands: Strands) -> PssmPair<Dna> {
        let freqs = FrequencyMatrix::new(DenseMatrix::from_rows(FREQS)).unwrap();
        let bg = Background::uniform();
        PssmBuilder::new()
            .pseudocount(0.0)
            .build_pair(&Motif::new("AT", freqs), &bg, &bg, strands)
            .unwrap()
    }

    #[test]
    fn average_tables() {
        let atoms = [(0.5f64.log2(), 0.5), (1.5f64.log2(), 0.5)];
        let dist = AverageDistribution::new(&[atoms], 512, 8);
        assert_eq!(dist.levels(), 4);
        assert_eq!(dist.pvalue(0.5, 1), 1.0);
        assert_eq!(dist.pvalue(1.5, 0), 1.0);
        assert_almost_eq!(dist.pvalue(1.5, 1), 0.5, places = 6);
        assert_almost_eq!(dist.pvalue(1.5, 2), 0.25, places = 6);
        assert_almost_eq!(dist.pvalue(1.0, 2), 0.75, places = 6);
        assert_almost_eq!(dist.pvalue(1.5, 4), 0.0625, places = 6);
        let p = dist.pvalue(1.5, 3);
        assert!(p < 0.25 && p > 0.0625, "{} not in (0.0625, 0.25)", p);
        assert_eq!(dist.pvalue(1.5, 100), dist.pvalue(1.5, 8));
    }

    #[test]
    fn strand_units() {
        // a unit of two strands is the average of one window of each
        let forward = [(0.5f64.log2(), 0.5), (1.5f64.log2(), 0.5)];
        let reverse = [(1.5f64.log2(), 1.0)];
        let dist = AverageDistribution::new(&[&forward[..], &reverse[..]], 512, 1);
        assert_eq!(dist.levels(), 1);
        assert_almost_eq!(dist.pvalue(1.5, 1), 0.5, places = 6);
        assert_almost_eq!(dist.pvalue(1.0, 1), 1.0, places = 6);
    }

    #[test]
    fn degenerate_grid() {
        let atoms = [(0.0, 1.0)];
        let dist = AverageDistribution::new(&[atoms], 512, 4);
        assert_eq!(dist.pvalue(1.0, 3), 1.0);
        assert_eq!(dist.pvalue(2.0, 3), 1.0);
    }

    #[test]
    fn single_window() {
        let pair = build(Strands::Forward);
        let best = pair.positive().max_odds();
        assert_almost_eq!(ama_pvalue(best, 2, None, &pair), 1.0 / 16.0, places = 9);
        assert_eq!(ama_pvalue(0.0, 2, None, &pair), 1.0);
        assert_eq!(ama_pvalue(best, 1, None, &pair), 1.0);
    }

    #[test]
    fn single_window_lattice() {
        let pair = build(Strands::Forward);
        let dist = pair.positive().distribution();
        for &a in Dna::concrete() {
            for &b in Dna::concrete() {
                let window = [a, b];
                let odds = pair.positive().odds().window(window.iter()).unwrap();
                let s = dist.window(window.iter()).unwrap();
                let p = ama_pvalue(odds, 2, None, &pair);
                assert_eq!(p, lookup(dist.sf(), s), "{:?}", window);
            }
        }
    }

    #[test]
    fn window_counts() {
        let pair = build(Strands::Both);
        let best = pair.positive().max_odds();
        // both strands of one position is a single unit of the tables
        let p1 = ama_pvalue(best, 2, None, &pair);
        let p2 = ama_pvalue(best, 3, None, &pair);
        let p50 = ama_pvalue(best, 51, None, &pair);
        assert!(p1 > p2 && p2 > p50, "{} {} {}", p1, p2, p50);
        assert!(p50 > 0.0);
        assert_eq!(ama_pvalue(1.0, 1, None, &pair), 1.0);
        assert_almost_eq!(ama_pvalue(1e-9, 101, None, &pair), 1.0, places = 9);
    }
}
