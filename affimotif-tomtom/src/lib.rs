#![doc = include_str!("../README.md")]

#[cfg(not(feature = "fnv"))]
use std::collections::HashMap;

use affimotif::abc::Alphabet;
use affimotif::abc::ComplementableAlphabet;
use affimotif::bg::Background;
use affimotif::err::Error;
use affimotif::pssm::DEFAULT_SITE_COUNT;
use affimotif::pwm::dist::survival;
use affimotif::pwm::dist::Discretization;
use affimotif::pwm::dist::RangeDistribution;
use affimotif::pwm::Motif;
use affimotif::pwm::Strand;

pub mod distance;
pub mod qvalue;

pub use distance::ColumnScore;

use self::distance::ColumnScorer;

/// The number of bins used to discretize the column scores.
pub const BINS: usize = 100;

/// The default pseudocount added to query and target frequencies.
pub const DEFAULT_PSEUDOCOUNT: f64 = 0.1;

/// The map type used to cache null distributions by target width.
#[cfg(feature = "fnv")]
type WidthMap<V> = fnv::FnvHashMap<usize, V>;
#[cfg(not(feature = "fnv"))]
type WidthMap<V> = HashMap<usize, V>;

// --- Match -------------------------------------------------------------------

/// The best alignment of a query motif with a target motif.
#[derive(Clone, Debug, PartialEq)]
pub struct Match {
    /// The index of the target in the database.
    pub target: usize,
    /// The identifier of the target motif.
    pub target_id: String,
    /// The position of the first target column relative to the first query column.
    pub offset: isize,
    /// The number of aligned columns.
    pub overlap: usize,
    /// The orientation of the target in the alignment.
    pub orientation: Strand,
    pub pvalue: f64,
    pub evalue: f64,
    pub qvalue: f64,
}

// --- Alignment ---------------------------------------------------------------

/// A configuration of a query against a target of a given width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Alignment {
    /// The configuration index, starting at 1.
    config: usize,
    /// The first aligned column of the query.
    qstart: usize,
    /// The first aligned column of the target.
    tstart: usize,
    /// The number of aligned columns.
    overlap: usize,
}

impl Alignment {
    fn new(config: usize, wq: usize, wt: usize) -> Self {
        let (qstart, tstart) = if config <= wq {
            (wq - config, 0)
        } else {
            (0, config - wq)
        };
        let overlap = (wq - qstart).min(wt - tstart);
        Self {
            config,
            qstart,
            tstart,
            overlap,
        }
    }

    #[inline]
    fn qend(&self) -> usize {
        self.qstart + self.overlap - 1
    }
}

/// The best alignment found on one strand of a target.
#[derive(Clone, Copy, Debug)]
struct Best {
    alignment: Alignment,
    /// The integer score, shifted to a common origin in complete mode.
    score: i64,
    /// The *p-value* of the alignment, in incomplete mode.
    pvalue: f64,
}

// --- Null distribution -------------------------------------------------------

/// Fold the distribution of a new variable into the distribution of a maximum.
///
/// Both variables are assumed independent.
fn fold_max(old: &[f64], cur: &[f64]) -> Vec<f64> {
    let n = old.len().max(cur.len());
    let mut new = vec![0.0; n];
    let (mut cdf_old, mut cdf_cur) = (0.0, 0.0);
    for k in 0..n {
        let o = old.get(k).cloned().unwrap_or(0.0);
        let c = cur.get(k).cloned().unwrap_or(0.0);
        new[k] = c * cdf_old + o * cdf_cur + c * o;
        cdf_old += o;
        cdf_cur += c;
    }
    new
}

/// The survival function of the best shifted alignment score.
#[derive(Clone, Debug)]
struct Null {
    base: i64,
    sf: Vec<f64>,
}

impl Null {
    fn new(alignments: &[Alignment], ranges: &RangeDistribution, shift: i64, strands: usize) -> Self {
        let base = alignments
            .iter()
            .map(|a| a.overlap as i64 * shift)
            .min()
            .unwrap_or(0);
        let mut max: Option<Vec<f64>> = None;
        for _ in 0..strands {
            for a in alignments {
                let offset = (a.overlap as i64 * shift - base) as usize;
                let pmf = ranges.pmf(a.qstart, a.qend());
                let mut cur = vec![0.0; offset + pmf.len()];
                cur[offset..].copy_from_slice(pmf);
                max = Some(match max {
                    None => cur,
                    Some(old) => fold_max(&old, &cur),
                });
            }
        }
        Self {
            base,
            sf: survival(max.unwrap_or_else(|| vec![1.0])),
        }
    }

    fn pvalue(&self, score: i64) -> f64 {
        let i = score - self.base;
        if i <= 0 {
            1.0
        } else {
            self.sf[(i as usize).min(self.sf.len() - 1)]
        }
    }
}

/// Get the median of a row of scores.
fn median(row: &[f64]) -> f64 {
    let mut sorted = row.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    let lo = (n / 2).saturating_sub(1);
    let hi = ((n + 1) / 2).saturating_sub(1);
    (sorted[lo] + sorted[hi]) / 2.0
}

// --- Tomtom ------------------------------------------------------------------

/// A target motif and its reverse complement.
#[derive(Clone, Debug)]
struct Target<A: Alphabet> {
    forward: Motif<A>,
    reverse: Option<Motif<A>>,
}

/// The columns of one strand of a target in the score matrix.
#[derive(Clone, Copy, Debug)]
struct Slot {
    target: usize,
    strand: Strand,
    start: usize,
    width: usize,
}

/// A motif database to compare query motifs against.
#[derive(Clone, Debug)]
pub struct Tomtom<A: Alphabet> {
    background: Background<A>,
    targets: Vec<Target<A>>,
    score: ColumnScore,
    complete: bool,
    internal: bool,
    min_overlap: usize,
    pseudocount: f64,
}

impl<A: Alphabet> Tomtom<A> {
    fn with_targets(targets: Vec<Target<A>>, background: Background<A>) -> Self {
        Self {
            background,
            targets,
            score: ColumnScore::default(),
            complete: true,
            internal: false,
            min_overlap: 1,
            pseudocount: DEFAULT_PSEUDOCOUNT,
        }
    }

    /// Create a new database comparing queries with the given targets.
    ///
    /// Targets are only aligned in their given orientation.
    pub fn new<I>(targets: I, background: Background<A>) -> Self
    where
        I: IntoIterator<Item = Motif<A>>,
    {
        let targets = targets
            .into_iter()
            .map(|forward| Target {
                forward,
                reverse: None,
            })
            .collect();
        Self::with_targets(targets, background)
    }

    /// Change the column similarity function.
    pub fn column_score(&mut self, score: ColumnScore) -> &mut Self {
        self.score = score;
        self
    }

    /// Score unaligned columns as median scores, or ignore them.
    pub fn complete_scores(&mut self, complete: bool) -> &mut Self {
        self.complete = complete;
        self
    }

    /// Only consider alignments where the shorter motif is fully aligned.
    pub fn internal(&mut self, internal: bool) -> &mut Self {
        self.internal = internal;
        self
    }

    /// Change the minimum number of aligned columns.
    pub fn min_overlap(&mut self, min_overlap: usize) -> &mut Self {
        self.min_overlap = min_overlap;
        self
    }

    /// Change the pseudocount added to the motif frequencies.
    pub fn pseudocount(&mut self, pseudocount: f64) -> &mut Self {
        self.pseudocount = pseudocount;
        self
    }

    /// The number of target motifs.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// The number of orientations each target is aligned in.
    fn strands(&self) -> usize {
        if self.targets.iter().any(|t| t.reverse.is_some()) {
            2
        } else {
            1
        }
    }

    /// Get the smoothed columns and the site count of a motif.
    fn columns(&self, motif: &Motif<A>) -> (Vec<Vec<f64>>, f64) {
        let nsites = motif.nsites().unwrap_or(DEFAULT_SITE_COUNT);
        let freqs = motif
            .frequencies()
            .smooth(&self.background, self.pseudocount, nsites);
        let columns = freqs.matrix().iter().map(|row| row.to_vec()).collect();
        (columns, nsites)
    }

    /// Get the alignments of a query and a target passing the overlap filters.
    fn alignments(&self, wq: usize, wt: usize) -> Vec<Alignment> {
        let (lo, hi) = (wq.min(wt), wq.max(wt));
        let mo = self.min_overlap.min(lo);
        (1..wq + wt)
            .filter(|&c| !self.internal || (lo <= c && c <= hi))
            .filter(|&c| mo <= 1 || (mo <= c && c <= wq + wt - mo))
            .map(|c| Alignment::new(c, wq, wt))
            .collect()
    }

    /// Compare a query motif to every target of the database.
    ///
    /// Returns one match per target, in database order.
    pub fn compare(&self, query: &Motif<A>) -> Result<Vec<Match>, Error> {
        if query.is_empty() {
            return Err(Error::InvalidData(Some(format!(
                "query motif {} has no columns",
                query.id()
            ))));
        }
        if self.pseudocount.is_nan() || self.pseudocount < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "pseudocount must be non-negative, got {}",
                self.pseudocount
            )));
        }
        let scorer = ColumnScorer::new::<A>(self.score)?;
        if self.targets.is_empty() {
            return Ok(Vec::new());
        }

        // lay out the columns of every target strand side by side
        let mut columns = Vec::new();
        let mut nsites = Vec::new();
        let mut slots = Vec::new();
        for (i, target) in self.targets.iter().enumerate() {
            let strands = std::iter::once((Strand::Positive, &target.forward))
                .chain(target.reverse.iter().map(|m| (Strand::Negative, m)));
            for (strand, motif) in strands {
                let (cols, n) = self.columns(motif);
                slots.push(Slot {
                    target: i,
                    strand,
                    start: columns.len(),
                    width: cols.len(),
                });
                nsites.extend(std::iter::repeat(n).take(cols.len()));
                columns.extend(cols);
            }
        }

        // score every query column against every target column
        let (query_columns, nq) = self.columns(query);
        let bg = self.background.concrete();
        let mut scores = query_columns
            .iter()
            .map(|q| {
                columns
                    .iter()
                    .zip(nsites.iter())
                    .map(|(t, &nt)| scorer.score(q, nq, t, nt, bg))
                    .collect::<Vec<f64>>()
            })
            .collect::<Vec<_>>();
        if self.complete {
            for row in scores.iter_mut() {
                let m = median(row);
                row.iter_mut().for_each(|x| *x -= m);
            }
        }

        let discretization = Discretization::fit(scores.iter().flatten(), BINS);
        let matrix = scores
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&x| discretization.discretize(x))
                    .collect::<Vec<i32>>()
            })
            .collect::<Vec<_>>();
        let weights = vec![1.0 / columns.len() as f64; columns.len()];
        let ranges = RangeDistribution::new(&matrix, &weights);
        let shift = (discretization.offset() * discretization.scale()).round() as i64;
        log::debug!(
            "scored {} query columns against {} target columns",
            matrix.len(),
            columns.len()
        );

        let wq = matrix.len();
        let strands = self.strands();
        let mut nulls = WidthMap::<Null>::default();
        let mut best: Vec<Option<(Slot, Best)>> = vec![None; self.targets.len()];

        for slot in slots.iter() {
            let alignments = self.alignments(wq, slot.width);
            let mut candidate: Option<Best> = None;
            for a in alignments.iter() {
                let cells = (0..a.overlap).map(|k| matrix[a.qstart + k][slot.start + a.tstart + k]);
                let score = match cells
                    .map(|x| if x == i32::MIN { None } else { Some(x as i64) })
                    .sum::<Option<i64>>()
                {
                    Some(score) => score,
                    None => continue,
                };
                let current = if self.complete {
                    Best {
                        alignment: *a,
                        score: score + a.overlap as i64 * shift,
                        pvalue: f64::NAN,
                    }
                } else {
                    Best {
                        alignment: *a,
                        score,
                        pvalue: ranges.pvalue(a.qstart, a.qend(), score as i32),
                    }
                };
                let better = match &candidate {
                    None => true,
                    Some(b) if self.complete => {
                        current.score > b.score
                            || (current.score == b.score
                                && current.alignment.overlap > b.alignment.overlap)
                    }
                    Some(b) => {
                        current.pvalue < b.pvalue
                            || (current.pvalue == b.pvalue
                                && current.alignment.overlap > b.alignment.overlap)
                    }
                };
                if better {
                    candidate = Some(current);
                }
            }

            let mut candidate = match candidate {
                Some(c) => c,
                None => continue,
            };
            if self.complete {
                let null = nulls
                    .entry(slot.width)
                    .or_insert_with(|| Null::new(&alignments, &ranges, shift, strands));
                candidate.pvalue = null.pvalue(candidate.score);
            } else {
                let n = (strands * alignments.len()) as f64;
                candidate.pvalue = -(n * (-candidate.pvalue).ln_1p()).exp_m1();
            }

            // keep the best orientation of the target
            let entry = &mut best[slot.target];
            let replace = match entry {
                None => true,
                Some((_, b)) => candidate.pvalue < b.pvalue,
            };
            if replace {
                *entry = Some((*slot, candidate));
            }
        }

        let n = self.targets.len() as f64;
        let mut matches = best
            .into_iter()
            .enumerate()
            .map(|(i, b)| {
                let target_id = self.targets[i].forward.id().to_string();
                match b {
                    Some((slot, b)) => Match {
                        target: i,
                        target_id,
                        offset: b.alignment.config as isize - wq as isize,
                        overlap: b.alignment.overlap,
                        orientation: slot.strand,
                        pvalue: b.pvalue,
                        evalue: b.pvalue * n,
                        qvalue: 1.0,
                    },
                    None => Match {
                        target: i,
                        target_id,
                        offset: 0,
                        overlap: 0,
                        orientation: Strand::Positive,
                        pvalue: 1.0,
                        evalue: n,
                        qvalue: 1.0,
                    },
                }
            })
            .collect::<Vec<_>>();

        let pvalues = matches.iter().map(|m| m.pvalue).collect::<Vec<_>>();
        for (m, q) in matches.iter_mut().zip(qvalue::benjamini_hochberg(&pvalues)) {
            m.qvalue = q;
        }
        Ok(matches)
    }
}

impl<A: ComplementableAlphabet> Tomtom<A> {
    /// Create a new database aligning targets in both orientations.
    pub fn with_reverse_complements<I>(targets: I, background: Background<A>) -> Self
    where
        I: IntoIterator<Item = Motif<A>>,
    {
        let targets = targets
            .into_iter()
            .map(|forward| Target {
                reverse: Some(forward.reverse_complement()),
                forward,
            })
            .collect();
        Self::with_targets(targets, background)
    }
}
