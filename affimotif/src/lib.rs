#![doc = include_str!("../README.md")]

extern crate generic_array;
extern crate typenum;

pub mod abc;
pub mod aggregate;
pub mod ama;
pub mod bg;
pub mod dense;
pub mod err;
pub mod num;
pub mod pssm;
pub mod pvalue;
pub mod pwm;
pub mod scan;
pub mod seq;

pub use abc::Alphabet;
pub use abc::AminoAcid;
pub use abc::ComplementableAlphabet;
pub use abc::ComplementableSymbol;
pub use abc::Dna;
pub use abc::Nucleotide;
pub use abc::Protein;
pub use abc::Symbol;
pub use aggregate::Pattern;
pub use aggregate::RecordState;
pub use aggregate::ScanOutcome;
pub use aggregate::ScannedSequence;
pub use bg::Background;
pub use dense::DenseMatrix;
pub use err::Error;
pub use err::InvalidData;
pub use err::InvalidSymbol;
pub use pssm::Pssm;
pub use pssm::PssmBuilder;
pub use pssm::PssmPair;
pub use pssm::Strands;
pub use pwm::dist::RangeDistribution;
pub use pwm::dist::ScoreDistribution;
pub use pwm::FrequencyMatrix;
pub use pwm::Motif;
pub use pwm::OddsMatrix;
pub use pwm::ScoringMatrix;
pub use pwm::Strand;
pub use scan::ScanResult;
pub use scan::Scanner;
pub use scan::ScoringMethod;
pub use seq::EncodedSequence;
