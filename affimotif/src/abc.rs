//! Digital encoding for biological sequences using an alphabet.
//!
//! Symbols are indexed the way MEME indexes them: the concrete symbols of
//! an alphabet come first, in lexicographic order, followed by the IUPAC
//! ambiguity codes. A symbol is *concrete* if its index is smaller than
//! [`Alphabet::K`], and its distribution can then be derived from the
//! concrete distribution using [`Alphabet::expand`].

use std::fmt::Debug;

use generic_array::ArrayLength;
use typenum::consts::U16;
use typenum::consts::U20;
use typenum::consts::U24;
use typenum::consts::U4;
use typenum::marker_traits::NonZero;
use typenum::marker_traits::Unsigned;

use super::err::InvalidSymbol;

// --- Symbol ------------------------------------------------------------------

/// A symbol from a biological alphabet.
pub trait Symbol: Default + Sized + Copy + Eq {
    /// View this symbol as a zero-based index.
    fn as_index(&self) -> usize;
    /// View this symbol as a string character.
    fn as_char(&self) -> char {
        self.as_ascii() as char
    }
    /// Parse a string character into a symbol.
    fn from_char(c: char) -> Result<Self, InvalidSymbol> {
        if c.is_ascii() {
            Self::from_ascii(c as u8)
        } else {
            Err(InvalidSymbol(c))
        }
    }
    /// View this symbol as an ASCII charater.
    fn as_ascii(&self) -> u8;
    /// Parse an ASCII character into a symbol, ignoring case.
    fn from_ascii(c: u8) -> Result<Self, InvalidSymbol>;
}

/// A symbol that can be complemented.
pub trait ComplementableSymbol: Symbol {
    /// Get the complement of this symbol.
    fn complement(&self) -> Self;
}

// --- Alphabet ----------------------------------------------------------------

/// A biological alphabet with associated metadata.
pub trait Alphabet: Debug + Copy + Default + 'static {
    type Symbol: Symbol + Debug;
    /// The number of concrete symbols.
    type K: Unsigned + NonZero + ArrayLength + Debug;
    /// The number of symbols, including ambiguity codes.
    type L: Unsigned + NonZero + ArrayLength + Debug;

    /// Get the wildcard symbol for this alphabet.
    fn default_symbol() -> Self::Symbol {
        Default::default()
    }

    /// Get all the symbols of this alphabet, in index order.
    fn symbols() -> &'static [Self::Symbol];

    /// Get the concrete symbols of this alphabet.
    fn concrete() -> &'static [Self::Symbol] {
        &Self::symbols()[..Self::K::USIZE]
    }

    /// Get a string with all symbols from this alphabet.
    fn as_str() -> &'static str;

    /// Check whether a symbol is concrete.
    #[inline]
    fn is_concrete(symbol: Self::Symbol) -> bool {
        symbol.as_index() < Self::K::USIZE
    }

    /// Get the concrete symbols an ambiguous symbol stands for.
    ///
    /// Concrete symbols expand to themselves.
    fn expand(symbol: Self::Symbol) -> &'static [Self::Symbol];

    /// Get the non-redundant database frequencies of the concrete symbols.
    ///
    /// The values are listed as published and may not sum exactly to one.
    fn nrdb() -> &'static [f64];

    /// Get the symbols counted as GC content, if any.
    fn gc_symbols() -> &'static [Self::Symbol] {
        &[]
    }
}

// --- ComplementableAlphabet --------------------------------------------------

/// An alphabet that defines the complement operation.
pub trait ComplementableAlphabet: Alphabet {
    /// Get the complement of this symbol.
    fn complement(s: Self::Symbol) -> Self::Symbol;
}

impl<A: Alphabet> ComplementableAlphabet for A
where
    <A as Alphabet>::Symbol: ComplementableSymbol,
{
    fn complement(s: Self::Symbol) -> Self::Symbol {
        s.complement()
    }
}

// --- DNA ---------------------------------------------------------------------

/// The DNA alphabet composed of 4 deoxyribonucleotides and 12 ambiguity codes.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dna;

impl Alphabet for Dna {
    type Symbol = Nucleotide;
    type K = U4;
    type L = U16;

    fn symbols() -> &'static [Nucleotide] {
        &[
            Nucleotide::A,
            Nucleotide::C,
            Nucleotide::G,
            Nucleotide::T,
            Nucleotide::U,
            Nucleotide::R,
            Nucleotide::Y,
            Nucleotide::K,
            Nucleotide::M,
            Nucleotide::S,
            Nucleotide::W,
            Nucleotide::B,
            Nucleotide::D,
            Nucleotide::H,
            Nucleotide::V,
            Nucleotide::N,
        ]
    }

    fn as_str() -> &'static str {
        "ACGTURYKMSWBDHVN"
    }

    fn expand(symbol: Nucleotide) -> &'static [Nucleotide] {
        use Nucleotide::*;
        match symbol {
            A => &[A],
            C => &[C],
            G => &[G],
            T => &[T],
            U => &[T],
            R => &[A, G],
            Y => &[C, T],
            K => &[G, T],
            M => &[A, C],
            S => &[C, G],
            W => &[A, T],
            B => &[C, G, T],
            D => &[A, G, T],
            H => &[A, C, T],
            V => &[A, C, G],
            N => &[A, C, G, T],
        }
    }

    fn nrdb() -> &'static [f64] {
        &[0.281774, 0.222020, 0.228876, 0.267330]
    }

    fn gc_symbols() -> &'static [Nucleotide] {
        &[Nucleotide::C, Nucleotide::G]
    }
}

/// A deoxyribonucleotide, or an IUPAC nucleotide ambiguity code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Nucleotide {
    /// Adenine.
    ///
    /// ![adenine.png](https://www.ebi.ac.uk/chebi/displayImage.do?defaultImage=true&imageIndex=0&chebiId=16708)
    A = 0,
    /// Cytosine.
    ///
    /// ![cytosine.png](https://www.ebi.ac.uk/chebi/displayImage.do?defaultImage=true&imageIndex=0&chebiId=16040)
    C = 1,
    /// Guanine.
    ///
    /// ![guanine.png](https://www.ebi.ac.uk/chebi/displayImage.do?defaultImage=true&imageIndex=0&chebiId=16235)
    G = 2,
    /// Thymine.
    ///
    /// ![thymine.png](https://www.ebi.ac.uk/chebi/displayImage.do?defaultImage=true&imageIndex=0&chebiId=17821)
    T = 3,
    /// Uracil, read as thymine.
    U = 4,
    /// Purine (A or G).
    R = 5,
    /// Pyrimidine (C or T).
    Y = 6,
    /// Keto (G or T).
    K = 7,
    /// Amino (A or C).
    M = 8,
    /// Strong (C or G).
    S = 9,
    /// Weak (A or T).
    W = 10,
    /// Not A.
    B = 11,
    /// Not C.
    D = 12,
    /// Not G.
    H = 13,
    /// Not T.
    V = 14,
    /// Unknown base.
    #[default]
    N = 15,
}

impl From<Nucleotide> for char {
    fn from(n: Nucleotide) -> char {
        n.as_char()
    }
}

impl Symbol for Nucleotide {
    fn as_index(&self) -> usize {
        *self as usize
    }

    fn as_ascii(&self) -> u8 {
        Dna::as_str().as_bytes()[self.as_index()]
    }

    fn from_ascii(c: u8) -> Result<Self, InvalidSymbol> {
        match c.to_ascii_uppercase() {
            b'A' => Ok(Nucleotide::A),
            b'C' => Ok(Nucleotide::C),
            b'G' => Ok(Nucleotide::G),
            b'T' => Ok(Nucleotide::T),
            b'U' => Ok(Nucleotide::U),
            b'R' => Ok(Nucleotide::R),
            b'Y' => Ok(Nucleotide::Y),
            b'K' => Ok(Nucleotide::K),
            b'M' => Ok(Nucleotide::M),
            b'S' => Ok(Nucleotide::S),
            b'W' => Ok(Nucleotide::W),
            b'B' => Ok(Nucleotide::B),
            b'D' => Ok(Nucleotide::D),
            b'H' => Ok(Nucleotide::H),
            b'V' => Ok(Nucleotide::V),
            b'N' => Ok(Nucleotide::N),
            _ => Err(InvalidSymbol(c as char)),
        }
    }
}

impl ComplementableSymbol for Nucleotide {
    fn complement(&self) -> Self {
        use Nucleotide::*;
        match *self {
            A => T,
            T | U => A,
            G => C,
            C => G,
            R => Y,
            Y => R,
            K => M,
            M => K,
            S => S,
            W => W,
            B => V,
            V => B,
            D => H,
            H => D,
            N => N,
        }
    }
}

// --- Protein -----------------------------------------------------------------

/// The protein alphabet composed of 20 residues and 4 ambiguity codes.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Protein;

impl Alphabet for Protein {
    type Symbol = AminoAcid;
    type K = U20;
    type L = U24;

    fn symbols() -> &'static [AminoAcid] {
        &[
            AminoAcid::A,
            AminoAcid::C,
            AminoAcid::D,
            AminoAcid::E,
            AminoAcid::F,
            AminoAcid::G,
            AminoAcid::H,
            AminoAcid::I,
            AminoAcid::K,
            AminoAcid::L,
            AminoAcid::M,
            AminoAcid::N,
            AminoAcid::P,
            AminoAcid::Q,
            AminoAcid::R,
            AminoAcid::S,
            AminoAcid::T,
            AminoAcid::V,
            AminoAcid::W,
            AminoAcid::Y,
            AminoAcid::B,
            AminoAcid::U,
            AminoAcid::X,
            AminoAcid::Z,
        ]
    }

    fn as_str() -> &'static str {
        "ACDEFGHIKLMNPQRSTVWYBUXZ"
    }

    fn expand(symbol: AminoAcid) -> &'static [AminoAcid] {
        match symbol {
            AminoAcid::B => &[AminoAcid::D, AminoAcid::N],
            AminoAcid::Z => &[AminoAcid::E, AminoAcid::Q],
            AminoAcid::U | AminoAcid::X => Self::concrete(),
            other => {
                let i = other.as_index();
                &Self::symbols()[i..=i]
            }
        }
    }

    #[rustfmt::skip]
    fn nrdb() -> &'static [f64] {
        &[
            0.073164, 0.018163, 0.051739, 0.062340, 0.040283,
            0.069328, 0.022428, 0.056282, 0.058493, 0.091712,
            0.023067, 0.046077, 0.050674, 0.040755, 0.051897,
            0.073802, 0.059411, 0.064362, 0.013341, 0.032682,
        ]
    }
}

/// A proteinogenic amino acid, or an IUPAC residue ambiguity code.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AminoAcid {
    A = 0,
    C = 1,
    D = 2,
    E = 3,
    F = 4,
    G = 5,
    H = 6,
    I = 7,
    K = 8,
    L = 9,
    M = 10,
    N = 11,
    P = 12,
    Q = 13,
    R = 14,
    S = 15,
    T = 16,
    V = 17,
    W = 18,
    Y = 19,
    /// Aspartic acid or asparagine.
    B = 20,
    /// Selenocysteine, scored as any residue.
    U = 21,
    /// Any residue.
    #[default]
    X = 22,
    /// Glutamic acid or glutamine.
    Z = 23,
}

impl From<AminoAcid> for char {
    fn from(aa: AminoAcid) -> char {
        aa.as_char()
    }
}

impl Symbol for AminoAcid {
    fn as_index(&self) -> usize {
        *self as usize
    }

    fn as_ascii(&self) -> u8 {
        Protein::as_str().as_bytes()[self.as_index()]
    }

    fn from_ascii(c: u8) -> Result<Self, InvalidSymbol> {
        let upper = c.to_ascii_uppercase();
        Protein::as_str()
            .bytes()
            .position(|x| x == upper)
            .map(|i| Protein::symbols()[i])
            .ok_or(InvalidSymbol(c as char))
    }
}
