//! Sliding-window scanner aggregating motif odds over a sequence.

use typenum::marker_traits::Unsigned;

use super::abc::Alphabet;
use super::pssm::Pssm;
use super::pssm::PssmPair;
use super::pwm::dist::lookup;
use super::seq::EncodedSequence;

// --- ScoringMethod -----------------------------------------------------------

/// The statistic used to aggregate the odds of all windows of a sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ScoringMethod {
    /// The average odds over all scored windows.
    #[default]
    AvgOdds,
    /// The highest odds over all windows.
    MaxOdds,
    /// The sum of the odds over all windows.
    SumOdds,
    /// The number of windows with a *p-value* strictly below `threshold`.
    TotalHits { threshold: f64 },
}

/// The way scores obtained on both strands are combined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StrandCombination {
    /// Pool the windows of both strands before aggregating.
    #[default]
    Pooled,
    /// Aggregate each strand separately, then combine the strand scores.
    ///
    /// Only average, maximum and hit count scores are combined per
    /// strand, summed odds are always pooled.
    PerStrand,
}

// --- StrandScore -------------------------------------------------------------

/// The accumulated odds of the windows of one strand.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StrandScore {
    /// The sum of the window odds.
    pub sum: f64,
    /// The highest window odds.
    pub max: f64,
    /// The number of windows under the *p-value* threshold.
    pub hits: usize,
    /// The number of windows scored.
    pub scored: usize,
}

impl StrandScore {
    /// Get the aggregate score of the strand for the given method.
    pub fn score(&self, method: ScoringMethod) -> f64 {
        match method {
            ScoringMethod::AvgOdds if self.scored > 0 => self.sum / self.scored as f64,
            ScoringMethod::AvgOdds => 0.0,
            ScoringMethod::MaxOdds => self.max,
            ScoringMethod::SumOdds => self.sum,
            ScoringMethod::TotalHits { .. } => self.hits as f64,
        }
    }
}

// --- ScanResult --------------------------------------------------------------

/// The aggregate score of a sequence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanResult {
    /// The aggregate score, zero if the sequence was not feasible.
    pub score: f64,
    /// The number of windows scored on all strands.
    pub scored: usize,
    /// Whether at least one window was scored.
    pub feasible: bool,
}

impl ScanResult {
    /// Check whether the result holds a usable score.
    ///
    /// Infeasible results, and negative or NaN scores obtained from a
    /// degenerate motif or background, are not valid.
    pub fn is_valid(&self) -> bool {
        self.feasible && self.score >= 0.0
    }
}

// --- Scanner -----------------------------------------------------------------

/// A scanner computing the aggregate score of sequences with a motif.
#[derive(Debug, Clone)]
pub struct Scanner<'a, A: Alphabet> {
    pair: &'a PssmPair<A>,
    method: ScoringMethod,
    combination: StrandCombination,
    last: usize,
    log_background: Option<&'a [f64]>,
}

impl<'a, A: Alphabet> Scanner<'a, A> {
    /// Create a new scanner for the given matrices.
    pub fn new(pair: &'a PssmPair<A>) -> Self {
        Self {
            pair,
            method: ScoringMethod::default(),
            combination: StrandCombination::default(),
            last: 0,
            log_background: None,
        }
    }

    /// Change the aggregation method.
    pub fn method(&mut self, method: ScoringMethod) -> &mut Self {
        self.method = method;
        self
    }

    /// Change how the strand scores are combined.
    pub fn combination(&mut self, combination: StrandCombination) -> &mut Self {
        self.combination = combination;
        self
    }

    /// Only scan windows in the last `last` positions of each sequence.
    ///
    /// A value of zero, or a value not smaller than the sequence length,
    /// scans the whole sequence.
    pub fn last(&mut self, last: usize) -> &mut Self {
        self.last = last;
        self
    }

    /// Use the cumulative log-probabilities of a sequence-dependent background.
    ///
    /// The matrices are expected to have been built with a uniform
    /// background, and `cumulative` must have one more element than the
    /// sequence being scanned.
    pub fn log_background(&mut self, cumulative: &'a [f64]) -> &mut Self {
        self.log_background = Some(cumulative);
        self
    }

    /// Get the range of window start positions for a sequence of length `len`.
    fn windows(&self, len: usize) -> std::ops::Range<usize> {
        let w = self.pair.len();
        let n = (len + 1).saturating_sub(w);
        let start = if self.last > 0 && self.last < len {
            len - self.last
        } else {
            0
        };
        start..n.max(start)
    }

    /// Accumulate the window odds of one strand.
    fn scan_strand(&self, pssm: &Pssm<A>, seq: &EncodedSequence<A>) -> StrandScore {
        let w = pssm.len();
        let symbols: &[A::Symbol] = seq.as_ref();
        let uniform = w as f64 * (1.0 / A::K::USIZE as f64).ln();
        let mut score = StrandScore::default();

        for s in self.windows(seq.len()) {
            let window = &symbols[s..s + w];
            let mut odds = match pssm.odds().window(window) {
                Some(odds) => odds,
                None => continue,
            };
            if let Some(cum) = self.log_background {
                odds *= (uniform - (cum[s + w] - cum[s])).exp();
            }
            score.sum += odds;
            score.max = score.max.max(odds);
            score.scored += 1;
            if let ScoringMethod::TotalHits { threshold } = self.method {
                if let Some(x) = pssm.distribution().window(window) {
                    if lookup(pssm.distribution().sf(), x) < threshold {
                        score.hits += 1;
                    }
                }
            }
        }

        score
    }

    /// Get the accumulated odds of each strand of a sequence.
    pub fn strand_scores<S>(&self, seq: S) -> Vec<StrandScore>
    where
        S: AsRef<EncodedSequence<A>>,
    {
        let seq = seq.as_ref();
        self.pair
            .iter()
            .map(|pssm| self.scan_strand(pssm, seq))
            .collect()
    }

    /// Compute the aggregate score of a sequence.
    pub fn scan<S>(&self, seq: S) -> ScanResult
    where
        S: AsRef<EncodedSequence<A>>,
    {
        let strands = self.strand_scores(seq);
        let scored = strands.iter().map(|s| s.scored).sum::<usize>();
        if scored == 0 {
            return ScanResult {
                score: 0.0,
                scored,
                feasible: false,
            };
        }

        let pooled = strands.iter().fold(StrandScore::default(), |acc, s| StrandScore {
            sum: acc.sum + s.sum,
            max: acc.max.max(s.max),
            hits: acc.hits + s.hits,
            scored: acc.scored + s.scored,
        });
        let score = match (self.combination, self.method) {
            (StrandCombination::Pooled, method) | (_, method @ ScoringMethod::SumOdds) => {
                pooled.score(method)
            }
            (StrandCombination::PerStrand, method) => {
                let scores = strands.iter().map(|s| s.score(method));
                match method {
                    ScoringMethod::MaxOdds => scores.fold(0.0, f64::max),
                    ScoringMethod::TotalHits { .. } => scores.sum(),
                    _ => scores.sum::<f64>() / strands.len() as f64,
                }
            }
        };

        ScanResult {
            score,
            scored,
            feasible: true,
        }
    }
}
