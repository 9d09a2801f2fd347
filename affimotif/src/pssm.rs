//! Position-specific scoring matrices with their score distributions.

use super::abc::Alphabet;
use super::abc::ComplementableAlphabet;
use super::bg::Background;
use super::err::Error;
use super::pvalue::AverageDistribution;
use super::pvalue::DEFAULT_GRID_SIZE;
use super::pvalue::DEFAULT_MAX_WINDOWS;
use super::pwm::dist::survival;
use super::pwm::dist::RangeDistribution;
use super::pwm::dist::ScoreDistribution;
use super::pwm::dist::DEFAULT_RANGE;
use super::pwm::Motif;
use super::pwm::OddsMatrix;

/// The number of sites assumed for motifs without a site count.
pub const DEFAULT_SITE_COUNT: f64 = 20.0;

/// The default pseudocount added to motif frequencies.
pub const DEFAULT_PSEUDOCOUNT: f64 = 0.01;

// --- Strands -----------------------------------------------------------------

/// The strands of a sequence to scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strands {
    /// Scan both the given strand and its reverse complement.
    #[default]
    Both,
    /// Scan only the given strand.
    Forward,
}

// --- GcBin -------------------------------------------------------------------

/// A score distribution computed for a given GC content.
#[derive(Clone, Debug)]
pub struct GcBin<A: Alphabet> {
    background: Background<A>,
    pmf: Vec<f64>,
    sf: Vec<f64>,
}

impl<A: Alphabet> GcBin<A> {
    /// The GC-interpolated background of the bin.
    #[inline]
    pub fn background(&self) -> &Background<A> {
        &self.background
    }

    /// The probability mass function of the whole-motif score under the bin background.
    #[inline]
    pub fn pmf(&self) -> &[f64] {
        &self.pmf
    }

    /// The survival function of the whole-motif score under the bin background.
    #[inline]
    pub fn sf(&self) -> &[f64] {
        &self.sf
    }
}

// --- Pssm --------------------------------------------------------------------

/// A position-specific scoring matrix ready for scanning.
#[derive(Clone, Debug)]
pub struct Pssm<A: Alphabet> {
    odds: OddsMatrix<A>,
    distribution: ScoreDistribution<A>,
    background: Background<A>,
    gc_bins: Vec<GcBin<A>>,
    ranges: Option<RangeDistribution>,
    grid_size: usize,
    max_windows: usize,
}

impl<A: Alphabet> Pssm<A> {
    /// The width of the motif.
    #[inline]
    pub fn len(&self) -> usize {
        self.odds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.odds.is_empty()
    }

    /// The odds of the smoothed motif against the scoring background.
    ///
    /// The odds are taken from the discretized log-odds, so that the
    /// log-odds of every window lies on the lattice of the score tables.
    #[inline]
    pub fn odds(&self) -> &OddsMatrix<A> {
        &self.odds
    }

    /// The distribution of the discretized log-odds.
    #[inline]
    pub fn distribution(&self) -> &ScoreDistribution<A> {
        &self.distribution
    }

    /// The background used to compute *p-values*.
    #[inline]
    pub fn background(&self) -> &Background<A> {
        &self.background
    }

    /// The GC-stratified survival functions, empty unless GC bins were requested.
    #[inline]
    pub fn gc_bins(&self) -> &[GcBin<A>] {
        &self.gc_bins
    }

    /// The sub-range distributions, if they were requested.
    #[inline]
    pub fn ranges(&self) -> Option<&RangeDistribution> {
        self.ranges.as_ref()
    }

    /// Select the GC bin for the given GC content.
    ///
    /// Returns `None` if the matrix has no GC bins or if the GC content
    /// is unknown, in which case the motif background should be used.
    pub fn gc_bin(&self, gc: Option<f64>) -> Option<&GcBin<A>> {
        self.gc_bin_index(gc).map(|i| &self.gc_bins[i])
    }

    fn gc_bin_index(&self, gc: Option<f64>) -> Option<usize> {
        let gc = gc?;
        if self.gc_bins.is_empty() {
            return None;
        }
        let n = self.gc_bins.len();
        Some(((gc * n as f64).floor().max(0.0) as usize).min(n - 1))
    }

    /// Get the `(log2 odds, probability)` atoms of a window score distribution.
    fn atoms(&self, pmf: &[f64]) -> Vec<(f64, f64)> {
        let w = self.len();
        pmf.iter()
            .enumerate()
            .filter(|(_, &p)| p > 0.0)
            .map(|(s, &p)| (self.distribution.unscale(s as i32, w), p))
            .collect()
    }

    /// The highest odds attainable by the matrix.
    #[inline]
    pub fn max_odds(&self) -> f64 {
        self.odds.max_odds()
    }
}

// --- PssmPair ----------------------------------------------------------------

/// The matrices used to scan one or both strands of a sequence.
#[derive(Clone, Debug)]
pub struct PssmPair<A: Alphabet> {
    positive: Pssm<A>,
    negative: Option<Pssm<A>>,
    average: AverageDistribution,
    gc_averages: Vec<AverageDistribution>,
}

impl<A: Alphabet> PssmPair<A> {
    fn new(positive: Pssm<A>, negative: Option<Pssm<A>>) -> Self {
        let average = Self::tables(&positive, negative.as_ref(), |pssm| pssm.distribution.pmf());
        let gc_averages = (0..positive.gc_bins.len())
            .map(|i| Self::tables(&positive, negative.as_ref(), |pssm| pssm.gc_bins[i].pmf()))
            .collect();
        Self {
            average,
            gc_averages,
            positive,
            negative,
        }
    }

    fn tables<F>(positive: &Pssm<A>, negative: Option<&Pssm<A>>, select: F) -> AverageDistribution
    where
        F: Fn(&Pssm<A>) -> &[f64],
    {
        let strands = std::iter::once(positive)
            .chain(negative)
            .map(|pssm| pssm.atoms(select(pssm)))
            .collect::<Vec<_>>();
        AverageDistribution::new(&strands, positive.grid_size, positive.max_windows)
    }

    /// Create a new pair scanning only the forward strand.
    pub fn forward(positive: Pssm<A>) -> Self {
        Self::new(positive, None)
    }

    /// Create a new pair scanning both strands.
    ///
    /// # Panics
    /// Panics if the matrices do not have the same width or the same
    /// number of GC bins.
    pub fn both(positive: Pssm<A>, negative: Pssm<A>) -> Self {
        assert_eq!(positive.len(), negative.len());
        assert_eq!(positive.gc_bins.len(), negative.gc_bins.len());
        Self::new(positive, Some(negative))
    }

    /// The width of the motif.
    #[inline]
    pub fn len(&self) -> usize {
        self.positive.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positive.is_empty()
    }

    #[inline]
    pub fn positive(&self) -> &Pssm<A> {
        &self.positive
    }

    #[inline]
    pub fn negative(&self) -> Option<&Pssm<A>> {
        self.negative.as_ref()
    }

    /// The number of strands scanned by the pair.
    #[inline]
    pub fn strands(&self) -> usize {
        1 + self.negative.is_some() as usize
    }

    /// Iterate over the matrices of each strand.
    pub fn iter(&self) -> impl Iterator<Item = &Pssm<A>> {
        std::iter::once(&self.positive).chain(self.negative.iter())
    }

    /// Get the average-odds tables for the given GC content.
    ///
    /// The tables of the motif background are used when the matrices
    /// have no GC bins or when the GC content is unknown.
    pub fn average(&self, gc: Option<f64>) -> &AverageDistribution {
        self.positive
            .gc_bin_index(gc)
            .map(|i| &self.gc_averages[i])
            .unwrap_or(&self.average)
    }
}

// --- PssmBuilder -------------------------------------------------------------

/// A builder for [`Pssm`] and [`PssmPair`] values.
#[derive(Clone, Debug)]
pub struct PssmBuilder {
    pseudocount: f64,
    range: usize,
    gc_bins: usize,
    ranges: bool,
    grid_size: usize,
    max_windows: usize,
}

impl Default for PssmBuilder {
    fn default() -> Self {
        Self {
            pseudocount: DEFAULT_PSEUDOCOUNT,
            range: DEFAULT_RANGE,
            gc_bins: 1,
            ranges: false,
            grid_size: DEFAULT_GRID_SIZE,
            max_windows: DEFAULT_MAX_WINDOWS,
        }
    }
}

impl PssmBuilder {
    /// Create a new builder with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the pseudocount added to the motif frequencies.
    pub fn pseudocount(&mut self, pseudocount: f64) -> &mut Self {
        self.pseudocount = pseudocount;
        self
    }

    /// Change the range of the discretized log-odds.
    pub fn range(&mut self, range: usize) -> &mut Self {
        self.range = range;
        self
    }

    /// Change the number of GC bins to compute survival functions for.
    pub fn gc_bins(&mut self, gc_bins: usize) -> &mut Self {
        self.gc_bins = gc_bins;
        self
    }

    /// Enable or disable the computation of sub-range distributions.
    pub fn ranges(&mut self, ranges: bool) -> &mut Self {
        self.ranges = ranges;
        self
    }

    /// Change the number of points of the average-odds grid.
    pub fn grid_size(&mut self, grid_size: usize) -> &mut Self {
        self.grid_size = grid_size;
        self
    }

    /// Change the largest window count with a dedicated average-odds table.
    pub fn max_windows(&mut self, max_windows: usize) -> &mut Self {
        self.max_windows = max_windows;
        self
    }

    /// Build a matrix for the given motif.
    ///
    /// The `scoring` background is used for smoothing and for the odds
    /// ratios, the `pvalues` background for the score distributions.
    pub fn build<A: Alphabet>(
        &self,
        motif: &Motif<A>,
        scoring: &Background<A>,
        pvalues: &Background<A>,
    ) -> Result<Pssm<A>, Error> {
        if self.pseudocount.is_nan() || self.pseudocount < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "pseudocount must be non-negative, got {}",
                self.pseudocount
            )));
        }
        if self.range == 0 {
            return Err(Error::InvalidConfig(String::from(
                "discretization range must be positive",
            )));
        }
        if self.gc_bins == 0 {
            return Err(Error::InvalidConfig(String::from(
                "number of GC bins must be positive",
            )));
        }
        if self.grid_size < 2 || self.max_windows == 0 {
            return Err(Error::InvalidConfig(format!(
                "invalid average-odds tables: {} grid points for {} windows",
                self.grid_size, self.max_windows
            )));
        }
        if motif.is_empty() {
            return Err(Error::InvalidData(Some(format!(
                "motif {} has no columns",
                motif.id()
            ))));
        }

        let nsites = motif.nsites().unwrap_or(DEFAULT_SITE_COUNT);
        let scoring_matrix = motif
            .frequencies()
            .smooth(scoring, self.pseudocount, nsites)
            .to_scoring(scoring.clone());
        let distribution = ScoreDistribution::new(scoring_matrix, pvalues, self.range);
        let odds = distribution.to_odds(scoring.clone());

        let mut gc_bins = Vec::new();
        if self.gc_bins > 1 {
            for i in 0..self.gc_bins {
                let gc = (i as f64 + 0.5) / self.gc_bins as f64;
                let background = Background::with_gc_content(gc).map_err(|_| {
                    Error::InvalidConfig(String::from("alphabet has no GC symbols"))
                })?;
                let pmf = distribution.mass(&background);
                let sf = survival(pmf.clone());
                gc_bins.push(GcBin { background, pmf, sf });
            }
        }

        let ranges = if self.ranges {
            Some(distribution.ranges(pvalues))
        } else {
            None
        };

        Ok(Pssm {
            odds,
            distribution,
            background: pvalues.clone(),
            gc_bins,
            ranges,
            grid_size: self.grid_size,
            max_windows: self.max_windows,
        })
    }

    /// Build the matrices for scanning the requested strands with a motif.
    ///
    /// The negative strand matrix is built from the reverse-complement of
    /// the motif, scored against the complement of the `scoring`
    /// background. Both matrices share the same `pvalues` background.
    pub fn build_pair<A: ComplementableAlphabet>(
        &self,
        motif: &Motif<A>,
        scoring: &Background<A>,
        pvalues: &Background<A>,
        strands: Strands,
    ) -> Result<PssmPair<A>, Error> {
        let positive = self.build(motif, scoring, pvalues)?;
        match strands {
            Strands::Forward => Ok(PssmPair::forward(positive)),
            Strands::Both => {
                let rc = motif.reverse_complement();
                let negative = self.build(&rc, &scoring.complement(), pvalues)?;
                Ok(PssmPair::both(positive, negative))
            }
        }
    }
}
