//! Similarity scores between two motif columns.
//!
//! All scores are oriented so that larger values mean more similar
//! columns. The Bayesian scores (BLiC and LLR) compare the counts of both
//! columns under Dirichlet priors, following Habib *et al.*[\[1\]](#ref1).
//!
//! ## 📚 References
//! - <a id="ref1">\[1\]</a> Habib, Naomi, Tommy Kaplan, Hanah Margalit, and Nir Friedman. ‘A Novel Bayesian DNA Motif Comparison Method for Clustering and Retrieval’. PLoS Computational Biology 4, no. 2 (29 February 2008): e1000010. [doi:10.1371/journal.pcbi.1000010](https://doi.org/10.1371/journal.pcbi.1000010).

use affimotif::abc::Alphabet;
use affimotif::err::Error;
use affimotif::num::Unsigned;

/// A column similarity function.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColumnScore {
    /// Pearson correlation coefficient.
    #[default]
    Pearson,
    /// Average log-likelihood ratio.
    Allr,
    /// Negated Euclidean distance.
    Euclidean,
    /// Sandelin-Wasserman similarity.
    Sandelin,
    /// Negated symmetric Kullback-Leibler divergence.
    KullbackLeibler,
    /// Bayesian likelihood 2-component score with a one-component prior.
    Blic1,
    /// Bayesian likelihood 2-component score with a five-component DNA prior.
    Blic5,
    /// Log-likelihood ratio with a one-component prior.
    Llr1,
    /// Log-likelihood ratio with a five-component DNA prior.
    Llr5,
}

/// The smallest frequency used inside a logarithm.
///
/// Null frequencies only contribute through their logarithm once floored,
/// so that columns with missing symbols keep a finite score.
pub const MIN_FREQUENCY: f64 = 1e-10;

#[inline]
fn floored(x: f64) -> f64 {
    x.max(MIN_FREQUENCY)
}

// --- ln_gamma ----------------------------------------------------------------

/// The logarithm of the gamma function for positive arguments.
///
/// Uses the Lanczos approximation, accurate to about 2e-10.
pub fn ln_gamma(x: f64) -> f64 {
    #[rustfmt::skip]
    const COEFFICIENTS: [f64; 6] = [
        76.18009172947146,     -86.50532032941677,
        24.01409824083091,     -1.231739572450155,
        0.1208650973866179e-2, -0.5395239384953e-5,
    ];
    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();
    let mut y = x;
    let mut series = 1.000000000190015;
    for c in COEFFICIENTS.iter() {
        y += 1.0;
        series += c / y;
    }
    -tmp + (2.5066282746310005 * series / x).ln()
}

// --- Dirichlet ---------------------------------------------------------------

/// A mixture of Dirichlet distributions used as a prior on column frequencies.
#[derive(Clone, Debug, PartialEq)]
pub struct Dirichlet {
    weights: Vec<f64>,
    alphas: Vec<Vec<f64>>,
}

impl Dirichlet {
    /// A single Dirichlet component with all parameters set to one.
    pub fn uniform(k: usize) -> Self {
        Self {
            weights: vec![1.0],
            alphas: vec![vec![1.0; k]],
        }
    }

    /// The five-component mixture for nucleotide columns.
    ///
    /// Each of the first four components favours one nucleotide, the last
    /// one favours no nucleotide in particular.
    pub fn dna_mixture() -> Self {
        #[rustfmt::skip]
        let alphas = vec![
            vec![5.0, 1.0, 1.0, 1.0],
            vec![1.0, 5.0, 1.0, 1.0],
            vec![1.0, 1.0, 5.0, 1.0],
            vec![1.0, 1.0, 1.0, 5.0],
            vec![2.0, 2.0, 2.0, 2.0],
        ];
        Self {
            weights: vec![0.2; 5],
            alphas,
        }
    }

    /// The number of components of the mixture.
    pub fn len(&self) -> usize {
        self.alphas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alphas.is_empty()
    }

    /// The log marginal likelihood of the given counts under the mixture.
    ///
    /// The multinomial coefficient is omitted, since it cancels out in
    /// every likelihood ratio.
    pub fn log_marginal(&self, counts: &[f64]) -> f64 {
        let n: f64 = counts.iter().sum();
        let terms = self
            .weights
            .iter()
            .zip(self.alphas.iter())
            .map(|(w, alpha)| {
                let a: f64 = alpha.iter().sum();
                let ll = alpha
                    .iter()
                    .zip(counts)
                    .map(|(&ai, &ni)| ln_gamma(ai + ni) - ln_gamma(ai))
                    .sum::<f64>();
                w.ln() + ln_gamma(a) - ln_gamma(a + n) + ll
            })
            .collect::<Vec<f64>>();
        let max = terms.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        max + terms.iter().map(|t| (t - max).exp()).sum::<f64>().ln()
    }
}

// --- ColumnScorer ------------------------------------------------------------

/// A column score with the prior it requires.
#[derive(Clone, Debug)]
pub struct ColumnScorer {
    score: ColumnScore,
    prior: Option<Dirichlet>,
}

impl ColumnScorer {
    /// Prepare a column score for the given alphabet.
    ///
    /// The five-component priors are only defined for nucleotides.
    pub fn new<A: Alphabet>(score: ColumnScore) -> Result<Self, Error> {
        let k = A::K::USIZE;
        let prior = match score {
            ColumnScore::Blic1 | ColumnScore::Llr1 => Some(Dirichlet::uniform(k)),
            ColumnScore::Blic5 | ColumnScore::Llr5 if k == 4 => Some(Dirichlet::dna_mixture()),
            ColumnScore::Blic5 | ColumnScore::Llr5 => {
                return Err(Error::InvalidConfig(format!(
                    "{:?} requires a nucleotide alphabet, got {}",
                    score,
                    A::as_str()
                )))
            }
            _ => None,
        };
        Ok(Self { score, prior })
    }

    /// The column score being computed.
    pub fn column_score(&self) -> ColumnScore {
        self.score
    }

    /// Score a query column against a target column.
    ///
    /// `nq` and `nt` are the site counts of the query and target motifs,
    /// and `bg` the background frequencies.
    pub fn score(&self, q: &[f64], nq: f64, t: &[f64], nt: f64, bg: &[f64]) -> f64 {
        match self.score {
            ColumnScore::Pearson => pearson(q, t),
            ColumnScore::Allr => allr(q, nq, t, nt, bg),
            ColumnScore::Euclidean => -squared_distance(q, t).sqrt(),
            ColumnScore::Sandelin => 2.0 - squared_distance(q, t),
            ColumnScore::KullbackLeibler => kullback_leibler(q, t),
            ColumnScore::Blic1 | ColumnScore::Blic5 => match &self.prior {
                Some(prior) => blic(prior, q, nq, t, nt, bg),
                None => unreachable!("Bayesian scores always have a prior"),
            },
            ColumnScore::Llr1 | ColumnScore::Llr5 => match &self.prior {
                Some(prior) => llr(prior, q, nq, t, nt),
                None => unreachable!("Bayesian scores always have a prior"),
            },
        }
    }
}

fn pearson(q: &[f64], t: &[f64]) -> f64 {
    let mean = 1.0 / q.len() as f64;
    let (mut num, mut sq, mut st) = (0.0, 0.0, 0.0);
    for (&x, &y) in q.iter().zip(t) {
        num += (x - mean) * (y - mean);
        sq += (x - mean) * (x - mean);
        st += (y - mean) * (y - mean);
    }
    let denom = (sq * st).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        num / denom
    }
}

fn allr(q: &[f64], nq: f64, t: &[f64], nt: f64, bg: &[f64]) -> f64 {
    let mut num = 0.0;
    let mut denom = 0.0;
    for ((&x, &y), &b) in q.iter().zip(t).zip(bg) {
        let b = floored(b);
        num += nt * y * (floored(x) / b).ln() + nq * x * (floored(y) / b).ln();
        denom += nq * x + nt * y;
    }
    num / denom
}

fn squared_distance(q: &[f64], t: &[f64]) -> f64 {
    q.iter().zip(t).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn kullback_leibler(q: &[f64], t: &[f64]) -> f64 {
    let divergence = q
        .iter()
        .zip(t)
        .map(|(&x, &y)| {
            let ratio = floored(x) / floored(y);
            x * ratio.log10() - y * ratio.log10()
        })
        .sum::<f64>();
    -divergence / 2.0
}

fn counts(freqs: &[f64], n: f64) -> Vec<f64> {
    freqs.iter().map(|x| x * n).collect()
}

fn log_background(counts: &[f64], bg: &[f64]) -> f64 {
    counts.iter().zip(bg).map(|(n, &b)| n * floored(b).ln()).sum()
}

fn llr(prior: &Dirichlet, q: &[f64], nq: f64, t: &[f64], nt: f64) -> f64 {
    let x = counts(q, nq);
    let y = counts(t, nt);
    let common = x.iter().zip(&y).map(|(a, b)| a + b).collect::<Vec<_>>();
    prior.log_marginal(&common) - prior.log_marginal(&x) - prior.log_marginal(&y)
}

fn blic(prior: &Dirichlet, q: &[f64], nq: f64, t: &[f64], nt: f64, bg: &[f64]) -> f64 {
    let x = counts(q, nq);
    let y = counts(t, nt);
    let common = x.iter().zip(&y).map(|(a, b)| a + b).collect::<Vec<_>>();
    let source = prior.log_marginal(&common) - prior.log_marginal(&x) - prior.log_marginal(&y);
    let motif = prior.log_marginal(&common) - log_background(&common, bg);
    source + motif
}
