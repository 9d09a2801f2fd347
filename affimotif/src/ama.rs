//! Average motif affinity scanning of sequence databases.
//!
//! The [`Ama`] driver ties together the other modules of the crate: it
//! builds the matrices of every motif once, then scores each sequence it
//! is given with every motif, and collects the results per motif with
//! optional aggregation of duplicate sequence identifiers.
//!
//! # Example
//! ```
//! # use affimotif::*;
//! # use affimotif::ama::*;
//! let freqs = FrequencyMatrix::<Dna>::new(DenseMatrix::from_rows([
//!     [0.97, 0.01, 0.01, 0.01],
//! ])).unwrap();
//! let mut options = AmaOptions::default();
//! options
//!     .background(BackgroundSource::Uniform)
//!     .strands(Strands::Forward)
//!     .pvalues(true);
//!
//! let mut ama = Ama::new(vec![Motif::new("A", freqs)], &options).unwrap();
//! let seq = EncodedSequence::<Dna>::encode("AAAA").unwrap();
//! ama.scan("seq1", &seq);
//!
//! let results = ama.finish();
//! let record = &results[0].1[0];
//! assert!(record.score.unwrap() > 3.8);
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use super::abc::Alphabet;
use super::abc::ComplementableAlphabet;
use super::aggregate::Pattern;
use super::aggregate::ScanOutcome;
use super::aggregate::ScannedSequence;
use super::bg::markov::MarkovBackground;
use super::bg::Background;
use super::err::Error;
use super::pssm::PssmBuilder;
use super::pssm::PssmPair;
use super::pssm::Strands;
use super::pssm::DEFAULT_PSEUDOCOUNT;
use super::pvalue::ama_pvalue;
use super::pwm::dist::DEFAULT_RANGE;
use super::pwm::Motif;
use super::scan::Scanner;
use super::scan::ScoringMethod;
use super::seq::EncodedSequence;

// --- BackgroundSource --------------------------------------------------------

/// The source of the background used to build the motif matrices.
#[derive(Clone, Debug, PartialEq)]
pub enum BackgroundSource {
    /// Equiprobable concrete symbols.
    Uniform,
    /// The non-redundant database frequencies of the alphabet.
    Nrdb,
    /// A background file with one letter and its frequency per line.
    File(PathBuf),
    /// Explicit concrete frequencies.
    Frequencies(Vec<f64>),
}

impl BackgroundSource {
    /// Resolve the background for the given alphabet.
    pub fn load<A: Alphabet>(&self) -> Result<Background<A>, Error> {
        match self {
            BackgroundSource::Uniform => Ok(Background::uniform()),
            BackgroundSource::Nrdb => Ok(Background::nrdb()),
            BackgroundSource::File(path) => {
                let file = File::open(path)?;
                Background::from_reader(BufReader::new(file))
            }
            BackgroundSource::Frequencies(f) => Background::new(f).map_err(|_| {
                Error::InvalidData(Some(format!("invalid background frequencies: {:?}", f)))
            }),
        }
    }
}

// --- AmaOptions --------------------------------------------------------------

/// The options of an AMA run.
#[derive(Clone, Debug)]
pub struct AmaOptions {
    scoring: ScoringMethod,
    pseudocount: f64,
    strands: Strands,
    pvalues: bool,
    normalize: bool,
    gc_bins: usize,
    sequence_background: Option<usize>,
    last: usize,
    combine_duplicates: bool,
    range: usize,
    background: Option<BackgroundSource>,
    motif_ids: Vec<String>,
}

impl Default for AmaOptions {
    fn default() -> Self {
        Self {
            scoring: ScoringMethod::AvgOdds,
            pseudocount: DEFAULT_PSEUDOCOUNT,
            strands: Strands::Both,
            pvalues: false,
            normalize: false,
            gc_bins: 1,
            sequence_background: None,
            last: 0,
            combine_duplicates: false,
            range: DEFAULT_RANGE,
            background: None,
            motif_ids: Vec::new(),
        }
    }
}

impl AmaOptions {
    /// Change the method used to aggregate window odds.
    pub fn scoring(&mut self, scoring: ScoringMethod) -> &mut Self {
        self.scoring = scoring;
        self
    }

    /// Change the pseudocount added to the motif frequencies.
    pub fn pseudocount(&mut self, pseudocount: f64) -> &mut Self {
        self.pseudocount = pseudocount;
        self
    }

    /// Change the strands that are scanned.
    pub fn strands(&mut self, strands: Strands) -> &mut Self {
        self.strands = strands;
        self
    }

    /// Enable or disable the computation of *p-values*.
    pub fn pvalues(&mut self, pvalues: bool) -> &mut Self {
        self.pvalues = pvalues;
        self
    }

    /// Enable or disable the normalization of scores by the highest odds.
    pub fn normalize(&mut self, normalize: bool) -> &mut Self {
        self.normalize = normalize;
        self
    }

    /// Change the number of GC bins.
    ///
    /// More than one bin enables the computation of *p-values*.
    pub fn gc_bins(&mut self, gc_bins: usize) -> &mut Self {
        self.gc_bins = gc_bins;
        if gc_bins > 1 {
            self.pvalues = true;
        }
        self
    }

    /// Use a Markov background of the given order fitted on each sequence.
    pub fn sequence_background(&mut self, order: Option<usize>) -> &mut Self {
        self.sequence_background = order;
        self
    }

    /// Only scan the last `last` positions of each sequence, or everything with 0.
    pub fn last(&mut self, last: usize) -> &mut Self {
        self.last = last;
        self
    }

    /// Enable or disable the aggregation of sequences with the same identifier.
    pub fn combine_duplicates(&mut self, combine: bool) -> &mut Self {
        self.combine_duplicates = combine;
        self
    }

    /// Change the range of the discretized log-odds.
    pub fn range(&mut self, range: usize) -> &mut Self {
        self.range = range;
        self
    }

    /// Change the source of the motif background.
    pub fn background(&mut self, background: BackgroundSource) -> &mut Self {
        self.background = Some(background);
        self
    }

    /// Only use the motifs with the given identifiers.
    pub fn motif_ids<I, S>(&mut self, ids: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.motif_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Check that the options are consistent for the given alphabet.
    pub fn validate<A: Alphabet>(&self) -> Result<(), Error> {
        match (&self.sequence_background, &self.background) {
            (Some(_), Some(_)) => {
                return Err(Error::InvalidConfig(String::from(
                    "a sequence background cannot be combined with a background source",
                )))
            }
            (None, None) => {
                return Err(Error::InvalidConfig(String::from(
                    "either a sequence background or a background source is required",
                )))
            }
            _ => (),
        }
        if self.gc_bins == 0 {
            return Err(Error::InvalidConfig(String::from(
                "number of GC bins must be positive",
            )));
        }
        if self.gc_bins > 1 && A::gc_symbols().is_empty() {
            return Err(Error::InvalidConfig(format!(
                "GC bins require an alphabet with GC symbols, got {}",
                A::as_str()
            )));
        }
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
        if let ScoringMethod::TotalHits { threshold } = self.scoring {
            if !(0.0..=1.0).contains(&threshold) || threshold == 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "hit threshold must be in (0, 1], got {}",
                    threshold
                )));
            }
        }
        Ok(())
    }

    /// Disable the options that a sequence background cannot support.
    fn apply_sequence_background(&mut self) {
        if self.sequence_background.is_none() {
            return;
        }
        if self.pvalues {
            log::warn!("p-values are not available with a sequence background, disabling");
            self.pvalues = false;
        }
        if self.normalize {
            log::warn!("normalization is not available with a sequence background, disabling");
            self.normalize = false;
        }
        if self.gc_bins > 1 {
            log::warn!("GC bins are not available with a sequence background, disabling");
            self.gc_bins = 1;
        }
    }
}

// --- Ama ---------------------------------------------------------------------

/// A motif with its scanning matrices and collected results.
#[derive(Debug, Clone)]
struct Entry<A: Alphabet> {
    pair: PssmPair<A>,
    pattern: Pattern,
}

/// A driver scoring sequences with a set of motifs.
#[derive(Debug, Clone)]
pub struct Ama<A: ComplementableAlphabet> {
    options: AmaOptions,
    entries: Vec<Entry<A>>,
}

impl<A: ComplementableAlphabet> Ama<A> {
    /// Create a new driver for the given motifs.
    pub fn new<I>(motifs: I, options: &AmaOptions) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Motif<A>>,
    {
        options.validate::<A>()?;
        let mut options = options.clone();
        options.apply_sequence_background();

        let background = match &options.background {
            Some(source) => source.load::<A>()?,
            None => Background::uniform(),
        };

        let mut builder = PssmBuilder::new();
        builder
            .pseudocount(options.pseudocount)
            .range(options.range)
            .gc_bins(options.gc_bins);

        let pvalues = options.pvalues && options.scoring == ScoringMethod::AvgOdds;
        let mut entries = Vec::new();
        for motif in motifs {
            if !options.motif_ids.is_empty() && !options.motif_ids.iter().any(|id| id == motif.id()) {
                continue;
            }
            let pair = builder.build_pair(&motif, &background, &background, options.strands)?;
            log::debug!(
                "built matrices for motif {} (width {}, {} strand(s))",
                motif.id(),
                pair.len(),
                pair.strands()
            );
            entries.push(Entry {
                pair,
                pattern: Pattern::new(motif.id()).with_pvalues(pvalues),
            });
        }
        log::info!("loaded {} motif(s)", entries.len());

        Ok(Self { options, entries })
    }

    /// The number of motifs used for scanning.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Score a sequence with every motif.
    pub fn scan<S>(&mut self, name: &str, seq: S)
    where
        S: AsRef<EncodedSequence<A>>,
    {
        let seq = seq.as_ref();
        let len = seq.len();
        let scan_len = if self.options.last != 0 {
            self.options.last.min(len)
        } else {
            len
        };

        let cumulative = self
            .options
            .sequence_background
            .map(|order| MarkovBackground::<A>::from_sequence(seq, order).log_cumulative(seq));
        let gc = if self.options.gc_bins > 1 {
            seq.gc_content()
        } else {
            None
        };
        let pvalues = self.options.pvalues && self.options.scoring == ScoringMethod::AvgOdds;
        let combine = self.options.combine_duplicates;

        for entry in self.entries.iter_mut() {
            if scan_len < entry.pair.len() {
                log::debug!(
                    "sequence {} is shorter than motif {}",
                    name,
                    entry.pattern.motif_id()
                );
                entry.pattern.record(name, len, ScanOutcome::TooShort, combine);
                continue;
            }

            let mut scanner = Scanner::new(&entry.pair);
            scanner.method(self.options.scoring).last(self.options.last);
            if let Some(cum) = cumulative.as_deref() {
                scanner.log_background(cum);
            }
            let result = scanner.scan(seq);

            let outcome = if !result.feasible {
                log::warn!(
                    "sequence {} has no scorable window for motif {}",
                    name,
                    entry.pattern.motif_id()
                );
                ScanOutcome::Infeasible
            } else {
                if !result.is_valid() {
                    log::warn!(
                        "sequence {} has an invalid score ({}) for motif {}",
                        name,
                        result.score,
                        entry.pattern.motif_id()
                    );
                }
                let pvalue = if pvalues && result.is_valid() {
                    Some(ama_pvalue(result.score, scan_len, gc, &entry.pair))
                } else {
                    None
                };
                ScanOutcome::Scored {
                    score: result.score,
                    pvalue,
                    positions: result.scored,
                }
            };
            entry.pattern.record(name, len, outcome, combine);
        }
    }

    /// Finalize the results of every motif.
    pub fn finish(self) -> Vec<(String, Vec<ScannedSequence>)> {
        let normalize = self.options.normalize;
        self.entries
            .into_iter()
            .map(|entry| {
                let rma = if normalize {
                    Some(entry.pair.positive().max_odds())
                } else {
                    None
                };
                let id = entry.pattern.motif_id().to_string();
                (id, entry.pattern.finalize(rma))
            })
            .collect()
    }
}
