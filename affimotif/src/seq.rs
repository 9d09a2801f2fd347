//! Storage for alphabet-encoded sequences.

use std::cmp::PartialEq;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::ops::Index;
use std::str::FromStr;

use typenum::marker_traits::Unsigned;

use super::abc::Alphabet;
use super::abc::ComplementableAlphabet;
use super::abc::Symbol;
use super::err::InvalidSymbol;

// --- EncodedSequence ---------------------------------------------------------

/// A biological sequence encoded with an alphabet.
///
/// Any symbol that is not concrete (see [`Alphabet::is_concrete`]) marks a
/// position that cannot be scored: windows overlapping it are skipped by
/// the scanner.
#[derive(Clone, Debug)]
pub struct EncodedSequence<A: Alphabet> {
    alphabet: std::marker::PhantomData<A>,
    data: Vec<A::Symbol>,
}

impl<A: Alphabet> EncodedSequence<A> {
    /// Create a new encoded sequence.
    pub fn new(data: Vec<A::Symbol>) -> Self {
        Self {
            data,
            alphabet: std::marker::PhantomData,
        }
    }

    /// Create a new encoded sequence from a textual representation.
    pub fn encode(sequence: &str) -> Result<Self, InvalidSymbol> {
        sequence
            .chars()
            .map(A::Symbol::from_char)
            .collect::<Result<_, _>>()
            .map(Self::new)
    }

    /// Create a new encoded sequence, replacing unknown characters with
    /// the wildcard symbol.
    pub fn encode_lossy(sequence: &str) -> Self {
        sequence
            .chars()
            .map(|c| A::Symbol::from_char(c).unwrap_or_else(|_| A::default_symbol()))
            .collect::<Vec<_>>()
            .into()
    }

    /// Return the number of symbols in the sequence.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check whether the sequence is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over the symbols in the sequence.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, A::Symbol> {
        self.data.iter()
    }

    /// Get the fraction of GC symbols among the concrete symbols.
    ///
    /// Returns `None` if the alphabet has no GC symbols, or if the
    /// sequence contains no concrete symbol.
    pub fn gc_content(&self) -> Option<f64> {
        let gc = A::gc_symbols();
        if gc.is_empty() {
            return None;
        }
        let frequencies = self.symbol_frequencies()?;
        Some(gc.iter().map(|s| frequencies[s.as_index()]).sum())
    }

    /// Get the frequencies of each concrete symbol in the sequence.
    ///
    /// Returns `None` if the sequence contains no concrete symbol.
    pub fn symbol_frequencies(&self) -> Option<Vec<f64>> {
        let mut counts = vec![0usize; A::K::USIZE];
        let mut total = 0;
        for symbol in self.data.iter().filter(|s| A::is_concrete(**s)) {
            counts[symbol.as_index()] += 1;
            total += 1;
        }
        if total == 0 {
            return None;
        }
        Some(
            counts
                .into_iter()
                .map(|c| c as f64 / total as f64)
                .collect(),
        )
    }
}

impl<A: ComplementableAlphabet> EncodedSequence<A> {
    /// Get the reverse complement of the sequence.
    pub fn reverse_complement(&self) -> Self {
        self.data
            .iter()
            .rev()
            .map(|s| A::complement(*s))
            .collect::<Vec<_>>()
            .into()
    }
}

impl<A: Alphabet> AsRef<EncodedSequence<A>> for EncodedSequence<A> {
    fn as_ref(&self) -> &Self {
        self
    }
}

impl<A: Alphabet> AsRef<[<A as Alphabet>::Symbol]> for EncodedSequence<A> {
    fn as_ref(&self) -> &[<A as Alphabet>::Symbol] {
        self.data.as_slice()
    }
}

impl<A: Alphabet> Default for EncodedSequence<A> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<A: Alphabet> Display for EncodedSequence<A> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        for c in self.data.iter() {
            write!(f, "{}", c.as_char())?;
        }
        Ok(())
    }
}

impl<A: Alphabet> FromStr for EncodedSequence<A> {
    type Err = InvalidSymbol;
    fn from_str(seq: &str) -> Result<Self, Self::Err> {
        Self::encode(seq)
    }
}

impl<A: Alphabet> From<Vec<A::Symbol>> for EncodedSequence<A> {
    fn from(data: Vec<A::Symbol>) -> Self {
        Self::new(data)
    }
}

impl<A: Alphabet> Index<usize> for EncodedSequence<A> {
    type Output = A::Symbol;
    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl<'a, A: Alphabet> IntoIterator for &'a EncodedSequence<A> {
    type Item = &'a A::Symbol;
    type IntoIter = std::slice::Iter<'a, A::Symbol>;
    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl<A, S> PartialEq<S> for EncodedSequence<A>
where
    A: Alphabet,
    S: AsRef<[<A as Alphabet>::Symbol]>,
{
    fn eq(&self, other: &S) -> bool {
        self.data.as_slice() == other.as_ref()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::abc::Dna;
    use crate::abc::Nucleotide::*;
    use crate::abc::Protein;

    #[test]
    fn test_encode() {
        let seq = EncodedSequence::<Dna>::encode("ACgtN").unwrap();
        assert_eq!(seq, [A, C, G, T, N]);
        assert!(EncodedSequence::<Dna>::encode("ACJT").is_err());
    }

    #[test]
    fn test_encode_lossy() {
        let seq = EncodedSequence::<Dna>::encode_lossy("AC-T");
        assert_eq!(seq, [A, C, N, T]);
        assert_eq!(seq.to_string(), "ACNT");
    }

    #[test]
    fn test_gc_content() {
        let seq = EncodedSequence::<Dna>::encode("AGCNTG").unwrap();
        let gc = seq.gc_content().unwrap();
        assert!((gc - 0.6).abs() < 1e-12, "{} != 0.6", gc);
        let seq = EncodedSequence::<Dna>::encode("NNNN").unwrap();
        assert_eq!(seq.gc_content(), None);
        let seq = EncodedSequence::<Protein>::encode("MKV").unwrap();
        assert_eq!(seq.gc_content(), None);
    }

    #[test]
    fn test_reverse_complement() {
        let seq = EncodedSequence::<Dna>::encode("AACGRN").unwrap();
        assert_eq!(seq.reverse_complement().to_string(), "NYCGTT");
    }
}
