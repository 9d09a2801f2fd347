//! Background models for scoring and *p-value* computation.
//!
//! A [`Background`] stores one probability per symbol of an alphabet. Only
//! the concrete symbols carry free parameters: the probability of an
//! ambiguity code is always the sum of the probabilities of the concrete
//! symbols it stands for. Sequence-dependent backgrounds are implemented
//! separately in the [`markov`] module.

use std::io::BufRead;
use std::ops::Index;
use std::str::FromStr;

use generic_array::GenericArray;
use nom::character::complete::anychar;
use nom::character::complete::space1;
use nom::combinator::all_consuming;
use nom::number::complete::double;
use nom::sequence::separated_pair;
use nom::IResult;
use nom::Parser;
use typenum::marker_traits::Unsigned;

use super::abc::Alphabet;
use super::abc::ComplementableAlphabet;
use super::abc::Symbol;
use super::err::Error;
use super::err::InvalidData;

pub mod markov;

/// The tolerance used when checking that frequencies sum to one.
const TOLERANCE: f64 = 1e-6;

// --- Background --------------------------------------------------------------

/// The background frequencies for an alphabet.
#[derive(Clone, Debug)]
pub struct Background<A: Alphabet> {
    frequencies: GenericArray<f64, A::L>,
    alphabet: std::marker::PhantomData<A>,
}

impl<A: Alphabet> Background<A> {
    /// Create a background from the given concrete frequencies.
    fn from_concrete_unchecked(concrete: &[f64]) -> Self {
        let mut frequencies = GenericArray::<f64, A::L>::default();
        for symbol in A::symbols() {
            frequencies[symbol.as_index()] = A::expand(*symbol)
                .iter()
                .map(|s| concrete[s.as_index()])
                .sum();
        }
        Self {
            frequencies,
            alphabet: std::marker::PhantomData,
        }
    }

    /// Create a new background with the given concrete frequencies.
    ///
    /// The slice must contain one frequency per concrete symbol, i.e.
    /// real numbers between zero and one that sum to one. The frequencies
    /// of ambiguous symbols are derived from the concrete frequencies.
    ///
    /// # Example
    /// ```
    /// # use affimotif::abc::*;
    /// # use affimotif::bg::Background;
    /// let bg = Background::<Dna>::new([0.3, 0.2, 0.2, 0.3]).unwrap();
    /// assert_eq!(bg[Nucleotide::S], 0.4);
    /// ```
    pub fn new<F>(concrete: F) -> Result<Self, InvalidData>
    where
        F: AsRef<[f64]>,
    {
        let concrete = concrete.as_ref();
        if concrete.len() != A::K::USIZE {
            return Err(InvalidData);
        }
        let mut sum = 0.0;
        for &f in concrete.iter() {
            if !(0.0..=1.0).contains(&f) {
                return Err(InvalidData);
            }
            sum += f;
        }
        if (sum - 1.0).abs() > TOLERANCE {
            return Err(InvalidData);
        }
        Ok(Self::from_concrete_unchecked(concrete))
    }

    /// Create a new background with uniform frequencies.
    ///
    /// # Note
    /// The `Default` implementation for `Background` uses uniform frequencies.
    ///
    /// # Example
    /// ```
    /// # use affimotif::abc::*;
    /// # use affimotif::bg::Background;
    /// let bg = Background::<Dna>::uniform();
    /// assert_eq!(bg.concrete(), &[0.25, 0.25, 0.25, 0.25]);
    /// assert_eq!(bg[Nucleotide::N], 1.0);
    /// ```
    pub fn uniform() -> Self {
        let concrete = vec![1.0 / A::K::USIZE as f64; A::K::USIZE];
        Self::from_concrete_unchecked(&concrete)
    }

    /// Create a new background from the non-redundant database frequencies.
    pub fn nrdb() -> Self {
        let nrdb = A::nrdb();
        let total: f64 = nrdb.iter().sum();
        let concrete = nrdb.iter().map(|x| x / total).collect::<Vec<_>>();
        Self::from_concrete_unchecked(&concrete)
    }

    /// Create a background with the given fraction of GC symbols.
    ///
    /// The GC symbols share the `gc` mass evenly, and the other concrete
    /// symbols share the rest, which interpolates linearly between a
    /// pure-AT and a pure-GC background. Fails for alphabets without GC
    /// symbols.
    pub fn with_gc_content(gc: f64) -> Result<Self, InvalidData> {
        let gc_symbols = A::gc_symbols();
        let k = A::K::USIZE;
        if gc_symbols.is_empty() || gc_symbols.len() >= k || !(0.0..=1.0).contains(&gc) {
            return Err(InvalidData);
        }
        let mut concrete = vec![(1.0 - gc) / (k - gc_symbols.len()) as f64; k];
        for s in gc_symbols {
            concrete[s.as_index()] = gc / gc_symbols.len() as f64;
        }
        Ok(Self::from_concrete_unchecked(&concrete))
    }

    /// Read a background from a file-like reader.
    ///
    /// Each line must contain a letter and its frequency, separated by
    /// whitespace. A `#` starts a comment, and blank lines are ignored.
    /// All concrete letters must be given exactly once; frequencies given
    /// for ambiguous letters are ignored since they are derived from the
    /// concrete ones. The concrete frequencies are renormalized to sum
    /// to one.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut concrete: Vec<Option<f64>> = vec![None; A::K::USIZE];
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let number = i + 1;
            let text = match line.find('#') {
                Some(j) => &line[..j],
                None => line.as_str(),
            }
            .trim();
            if text.is_empty() {
                continue;
            }

            let (letter, frequency) = match all_consuming(entry).parse(text) {
                Ok((_, x)) => x,
                Err(_) => {
                    return Err(Error::Parse {
                        line: number,
                        text: line.clone(),
                    })
                }
            };
            let symbol = A::Symbol::from_char(letter).map_err(|_| Error::UnknownLetter {
                line: number,
                letter,
            })?;
            if !(0.0..=1.0).contains(&frequency) || frequency == 0.0 {
                return Err(Error::IllegalFrequency { letter, frequency });
            }
            if !A::is_concrete(symbol) {
                continue;
            }

            let slot = &mut concrete[symbol.as_index()];
            if slot.is_some() {
                return Err(Error::DuplicateLetter(symbol.as_char()));
            }
            *slot = Some(frequency);
        }

        let mut frequencies = Vec::with_capacity(A::K::USIZE);
        for (symbol, f) in A::concrete().iter().zip(concrete) {
            match f {
                Some(x) => frequencies.push(x),
                None => return Err(Error::MissingLetter(symbol.as_char())),
            }
        }
        let total: f64 = frequencies.iter().sum();
        frequencies.iter_mut().for_each(|x| *x /= total);

        Ok(Self::from_concrete_unchecked(&frequencies))
    }

    /// A reference to the frequencies of all symbols, in index order.
    #[inline]
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// A reference to the frequencies of the concrete symbols.
    #[inline]
    pub fn concrete(&self) -> &[f64] {
        &self.frequencies[..A::K::USIZE]
    }
}

impl<A: ComplementableAlphabet> Background<A> {
    /// Get the background of the complementary strand.
    pub fn complement(&self) -> Self {
        let mut concrete = vec![0.0; A::K::USIZE];
        for symbol in A::concrete() {
            concrete[A::complement(*symbol).as_index()] = self[*symbol];
        }
        Self::from_concrete_unchecked(&concrete)
    }
}

#[cfg(feature = "sampling")]
impl<A: Alphabet> Background<A> {
    /// Sample a random sequence of concrete symbols from the background.
    pub fn sample_sequence<R: rand::Rng + ?Sized>(
        &self,
        rng: &mut R,
        length: usize,
    ) -> Result<crate::seq::EncodedSequence<A>, InvalidData> {
        use rand::distributions::Distribution;

        let index = rand_distr::WeightedIndex::new(self.concrete()).map_err(|_| InvalidData)?;
        let symbols = A::concrete();
        let data = (0..length)
            .map(|_| symbols[index.sample(rng)])
            .collect::<Vec<_>>();
        Ok(crate::seq::EncodedSequence::new(data))
    }
}

impl<A: Alphabet> Index<<A as Alphabet>::Symbol> for Background<A> {
    type Output = f64;
    #[inline]
    fn index(&self, index: A::Symbol) -> &f64 {
        &self.frequencies[index.as_index()]
    }
}

impl<A: Alphabet> AsRef<[f64]> for Background<A> {
    fn as_ref(&self) -> &[f64] {
        self.frequencies()
    }
}

impl<A: Alphabet> PartialEq for Background<A> {
    fn eq(&self, other: &Self) -> bool {
        self.frequencies == other.frequencies
    }
}

impl<A: Alphabet> Default for Background<A> {
    fn default() -> Self {
        Self::uniform()
    }
}

impl<A: Alphabet> FromStr for Background<A> {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_reader(s.as_bytes())
    }
}

/// Parse a `<letter> <frequency>` pair.
fn entry(input: &str) -> IResult<&str, (char, f64)> {
    separated_pair(anychar, space1, double).parse(input)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::abc::Dna;
    use crate::abc::Nucleotide;
    use crate::abc::Protein;

    fn check_normalized<A: Alphabet>(bg: &Background<A>) {
        let total: f64 = bg.concrete().iter().sum();
        assert!((total - 1.0).abs() < 1e-6, "{} != 1", total);
        for &symbol in A::symbols() {
            let expected: f64 = A::expand(symbol).iter().map(|s| bg[*s]).sum();
            assert!((bg[symbol] - expected).abs() < 1e-12, "{:?}", symbol);
        }
    }

    #[test]
    fn test_background_new() {
        assert!(Background::<Dna>::new([0.3, 0.2, 0.2, 0.3]).is_ok());
        assert!(Background::<Dna>::new([0.1, 0.1, 0.1, 0.1]).is_err());
        assert!(Background::<Dna>::new([0.5, 0.5]).is_err());
        assert!(Background::<Dna>::new([1.5, -0.5, 0.0, 0.0]).is_err());
    }

    #[test]
    fn normalized_modes() {
        check_normalized(&Background::<Dna>::uniform());
        check_normalized(&Background::<Dna>::nrdb());
        check_normalized(&Background::<Dna>::nrdb().complement());
        check_normalized(&Background::<Dna>::with_gc_content(0.7).unwrap());
        check_normalized(&Background::<Protein>::uniform());
        check_normalized(&Background::<Protein>::nrdb());
    }

    #[test]
    fn complement() {
        let bg = Background::<Dna>::new([0.1, 0.2, 0.3, 0.4]).unwrap();
        let c = bg.complement();
        assert_eq!(c.concrete(), &[0.4, 0.3, 0.2, 0.1]);
        assert!((c[Nucleotide::R] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn gc_content() {
        let bg = Background::<Dna>::with_gc_content(0.6).unwrap();
        assert!((bg[Nucleotide::S] - 0.6).abs() < 1e-12);
        assert!((bg[Nucleotide::A] - 0.2).abs() < 1e-12);
        assert!(Background::<Protein>::with_gc_content(0.5).is_err());
        assert!(Background::<Dna>::with_gc_content(1.5).is_err());
    }

    #[test]
    fn parse_file() {
        let text = "# tab separated\nA\t0.3\r\nC 0.2  # comment\n\n   \nG 2e-1\nT 0.3\nN 1.0\n";
        let bg = Background::<Dna>::from_str(text).unwrap();
        for (x, y) in bg.concrete().iter().zip([0.3, 0.2, 0.2, 0.3]) {
            assert!((x - y).abs() < 1e-9, "{} != {}", x, y);
        }
        check_normalized(&bg);
    }

    #[test]
    fn parse_renormalized() {
        let bg = Background::<Dna>::from_str("A 0.3\nC 0.3\nG 0.3\nT 0.3\n").unwrap();
        for x in bg.concrete() {
            assert!((x - 0.25).abs() < 1e-9, "{} != 0.25", x);
        }
    }

    #[test]
    fn parse_errors() {
        let err = Background::<Dna>::from_str("A 0.25\nC 0.25\nG 0.25\n").unwrap_err();
        assert!(matches!(err, Error::MissingLetter('T')));

        let err = Background::<Dna>::from_str("A 0.25\nC 0.25\nG 0.25\na 0.25\n").unwrap_err();
        assert!(matches!(err, Error::DuplicateLetter('A')));

        let err = Background::<Dna>::from_str("A 0.5\nC 0\nG 0.25\nT 0.25\n").unwrap_err();
        assert!(matches!(err, Error::IllegalFrequency { letter: 'C', .. }));

        let err = Background::<Dna>::from_str("A 0.5\nC 1.2\nG 0.25\nT 0.25\n").unwrap_err();
        assert!(matches!(err, Error::IllegalFrequency { letter: 'C', .. }));

        let err = Background::<Dna>::from_str("A 0.25\nJ 0.25\n").unwrap_err();
        assert!(matches!(err, Error::UnknownLetter { line: 2, letter: 'J' }));

        let err = Background::<Dna>::from_str("A 0.25\nC zero\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }
}
