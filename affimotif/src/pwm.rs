//! Frequency, odds and scoring matrices for sequence motifs.

use super::abc::Alphabet;
use super::abc::ComplementableAlphabet;
use super::abc::Symbol;
use super::bg::Background;
use super::dense::DenseMatrix;
use super::err::InvalidData;

pub mod dist;

/// The tolerance used when checking that matrix rows sum to one.
const ROW_TOLERANCE: f64 = 1e-3;

// --- Strand ------------------------------------------------------------------

/// The strand a matrix or a match was obtained from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Strand {
    #[default]
    Positive,
    Negative,
}

impl Strand {
    /// Get the opposite strand.
    pub fn flip(self) -> Self {
        match self {
            Strand::Positive => Strand::Negative,
            Strand::Negative => Strand::Positive,
        }
    }
}

// --- FrequencyMatrix ---------------------------------------------------------

/// A matrix storing symbol frequencies at each position.
#[derive(Clone, Debug)]
pub struct FrequencyMatrix<A: Alphabet> {
    alphabet: std::marker::PhantomData<A>,
    data: DenseMatrix<f64, A::K>,
}

impl<A: Alphabet> FrequencyMatrix<A> {
    /// Create a new frequency matrix without checking the contents.
    fn new_unchecked(data: DenseMatrix<f64, A::K>) -> Self {
        Self {
            alphabet: std::marker::PhantomData,
            data,
        }
    }

    /// Create a new frequency matrix.
    ///
    /// Every row must be a distribution over the concrete symbols, i.e.
    /// contain non-negative values summing to one.
    pub fn new(data: DenseMatrix<f64, A::K>) -> Result<Self, InvalidData> {
        for row in data.iter() {
            if row.iter().any(|x| x.is_nan() || *x < 0.0) {
                return Err(InvalidData);
            }
            let sum: f64 = row.iter().sum();
            if (sum - 1.0).abs() > ROW_TOLERANCE {
                return Err(InvalidData);
            }
        }
        Ok(Self::new_unchecked(data))
    }

    /// The length of the motif encoded in this matrix.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.rows()
    }

    /// Check whether the matrix has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.rows() == 0
    }

    /// The raw frequencies of the matrix.
    #[inline]
    pub fn matrix(&self) -> &DenseMatrix<f64, A::K> {
        &self.data
    }

    /// Smooth the frequencies towards a background.
    ///
    /// Each frequency `p` is replaced with `(p·n + c·b) / (n + c)`, where
    /// `n` is the number of sites, `c` the pseudocount and `b` the
    /// background frequency of the symbol.
    pub fn smooth(&self, background: &Background<A>, pseudocount: f64, nsites: f64) -> Self {
        if pseudocount == 0.0 {
            return self.clone();
        }
        let bg = background.concrete();
        let mut data = self.data.clone();
        for row in data.iter_mut() {
            for (x, &b) in row.iter_mut().zip(bg) {
                *x = (*x * nsites + pseudocount * b) / (nsites + pseudocount);
            }
        }
        Self::new_unchecked(data)
    }

    /// Convert to an odds matrix using the given background frequencies.
    pub fn to_odds<B>(&self, background: B) -> OddsMatrix<A>
    where
        B: Into<Option<Background<A>>>,
    {
        let bg = background.into().unwrap_or_default();
        let mut odds = DenseMatrix::new(self.data.rows());
        for (src, dst) in self.data.iter().zip(odds.iter_mut()) {
            for (j, (&x, &f)) in src.iter().zip(bg.concrete()).enumerate() {
                dst[j] = if x == 0.0 { 0.0 } else { x / f };
            }
        }
        OddsMatrix {
            background: bg,
            data: odds,
        }
    }

    /// Convert to a scoring matrix using the given background frequencies.
    pub fn to_scoring<B>(&self, background: B) -> ScoringMatrix<A>
    where
        B: Into<Option<Background<A>>>,
    {
        self.to_odds(background).to_scoring()
    }
}

impl<A: ComplementableAlphabet> FrequencyMatrix<A> {
    /// Get the frequency matrix of the reverse-complement motif.
    pub fn reverse_complement(&self) -> Self {
        let mut data = DenseMatrix::new(self.data.rows());
        for (src, dst) in self.data.iter().rev().zip(data.iter_mut()) {
            for symbol in A::concrete() {
                dst[A::complement(*symbol).as_index()] = src[symbol.as_index()];
            }
        }
        Self::new_unchecked(data)
    }
}

impl<A: Alphabet> PartialEq for FrequencyMatrix<A> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<A: Alphabet> AsRef<DenseMatrix<f64, A::K>> for FrequencyMatrix<A> {
    fn as_ref(&self) -> &DenseMatrix<f64, A::K> {
        &self.data
    }
}

// --- Motif -------------------------------------------------------------------

/// A motif with its frequency matrix and metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct Motif<A: Alphabet> {
    id: String,
    alt_id: Option<String>,
    frequencies: FrequencyMatrix<A>,
    nsites: Option<f64>,
    evalue: Option<f64>,
    complexity: Option<f64>,
    strand: Strand,
}

impl<A: Alphabet> Motif<A> {
    /// Create a new motif with the given identifier and frequencies.
    pub fn new<S: Into<String>>(id: S, frequencies: FrequencyMatrix<A>) -> Self {
        Self {
            id: id.into(),
            alt_id: None,
            frequencies,
            nsites: None,
            evalue: None,
            complexity: None,
            strand: Strand::Positive,
        }
    }

    pub fn with_alt_id<S: Into<String>>(mut self, alt_id: S) -> Self {
        self.alt_id = Some(alt_id.into());
        self
    }

    pub fn with_nsites(mut self, nsites: f64) -> Self {
        self.nsites = Some(nsites);
        self
    }

    pub fn with_evalue(mut self, evalue: f64) -> Self {
        self.evalue = Some(evalue);
        self
    }

    pub fn with_complexity(mut self, complexity: f64) -> Self {
        self.complexity = Some(complexity);
        self
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn alt_id(&self) -> Option<&str> {
        self.alt_id.as_deref()
    }

    #[inline]
    pub fn frequencies(&self) -> &FrequencyMatrix<A> {
        &self.frequencies
    }

    /// The number of sites the motif was built from, if known.
    #[inline]
    pub fn nsites(&self) -> Option<f64> {
        self.nsites
    }

    #[inline]
    pub fn evalue(&self) -> Option<f64> {
        self.evalue
    }

    #[inline]
    pub fn complexity(&self) -> Option<f64> {
        self.complexity
    }

    /// The strand of the motif, negative for reverse-complemented motifs.
    #[inline]
    pub fn strand(&self) -> Strand {
        self.strand
    }

    /// The width of the motif.
    #[inline]
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

impl<A: ComplementableAlphabet> Motif<A> {
    /// Get the reverse-complement of the motif.
    pub fn reverse_complement(&self) -> Self {
        Self {
            frequencies: self.frequencies.reverse_complement(),
            strand: self.strand.flip(),
            ..self.clone()
        }
    }
}

// --- OddsMatrix --------------------------------------------------------------

/// A matrix storing odds ratio of symbol occurences at each position.
#[derive(Clone, Debug, PartialEq)]
pub struct OddsMatrix<A: Alphabet> {
    background: Background<A>,
    data: DenseMatrix<f64, A::K>,
}

impl<A: Alphabet> OddsMatrix<A> {
    /// The length of the motif encoded in this odds matrix.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.rows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.rows() == 0
    }

    /// The odds ratios of the matrix.
    #[inline]
    pub fn odds(&self) -> &DenseMatrix<f64, A::K> {
        &self.data
    }

    /// The background frequencies of the odds matrix.
    #[inline]
    pub fn background(&self) -> &Background<A> {
        &self.background
    }

    /// Get the odds of the window of sequence symbols.
    ///
    /// Returns `None` if the window contains a non-concrete symbol.
    #[inline]
    pub fn window<'s, I>(&self, window: I) -> Option<f64>
    where
        I: IntoIterator<Item = &'s A::Symbol>,
    {
        let mut odds = 1.0;
        for (row, symbol) in self.data.iter().zip(window) {
            if !A::is_concrete(*symbol) {
                return None;
            }
            odds *= row[symbol.as_index()];
        }
        Some(odds)
    }

    /// Get the highest odds attainable by the matrix.
    pub fn max_odds(&self) -> f64 {
        self.data
            .iter()
            .map(|row| row.iter().cloned().fold(0.0, f64::max))
            .product()
    }

    /// Get a position-specific scoring matrix from this odds matrix.
    pub fn to_scoring(&self) -> ScoringMatrix<A> {
        ScoringMatrix {
            background: self.background.clone(),
            data: self.data.map(|x| x.log2()),
        }
    }
}

impl<A: Alphabet> AsRef<OddsMatrix<A>> for OddsMatrix<A> {
    fn as_ref(&self) -> &Self {
        self
    }
}

impl<A: Alphabet> AsRef<DenseMatrix<f64, A::K>> for OddsMatrix<A> {
    fn as_ref(&self) -> &DenseMatrix<f64, A::K> {
        &self.data
    }
}

impl<A: Alphabet> From<ScoringMatrix<A>> for OddsMatrix<A> {
    fn from(pssm: ScoringMatrix<A>) -> Self {
        OddsMatrix {
            data: pssm.data.map(|x| x.exp2()),
            background: pssm.background,
        }
    }
}

// --- ScoringMatrix -----------------------------------------------------------

/// A matrix storing log-odds ratio of symbol occurences at each position.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoringMatrix<A: Alphabet> {
    background: Background<A>,
    data: DenseMatrix<f64, A::K>,
}

impl<A: Alphabet> ScoringMatrix<A> {
    /// The length of the motif encoded in this scoring matrix.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.rows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.rows() == 0
    }

    /// The log-odds of the position-specific scoring matrix.
    #[inline]
    pub fn matrix(&self) -> &DenseMatrix<f64, A::K> {
        &self.data
    }

    /// The background frequencies of the position-specific scoring matrix.
    #[inline]
    pub fn background(&self) -> &Background<A> {
        &self.background
    }

    /// Get the highest score attainable by the matrix.
    pub fn max_score(&self) -> f64 {
        self.data
            .iter()
            .map(|row| row.iter().cloned().fold(f64::NEG_INFINITY, f64::max))
            .sum()
    }
}

impl<A: Alphabet> AsRef<ScoringMatrix<A>> for ScoringMatrix<A> {
    fn as_ref(&self) -> &Self {
        self
    }
}

impl<A: Alphabet> AsRef<DenseMatrix<f64, A::K>> for ScoringMatrix<A> {
    fn as_ref(&self) -> &DenseMatrix<f64, A::K> {
        &self.data
    }
}

impl<A: Alphabet> From<OddsMatrix<A>> for ScoringMatrix<A> {
    fn from(odds: OddsMatrix<A>) -> Self {
        ScoringMatrix {
            data: odds.data.map(|x| x.log2()),
            background: odds.background,
        }
    }
}
