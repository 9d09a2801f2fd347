use std::str::FromStr;

use affimotif::abc::Dna;
use affimotif::bg::Background;
use affimotif::pssm::PssmBuilder;
use affimotif::pssm::Strands;
use affimotif::pvalue::ama_pvalue;
use affimotif::scan::ScoringMethod;
use affimotif::scan::Scanner;
use affimotif::seq::EncodedSequence;
use affimotif::DenseMatrix;
use affimotif::FrequencyMatrix;
use affimotif::Motif;

#[rustfmt::skip]
const AGC: [[f64; 4]; 3] = [
    //  A     C     G     T
    [ 0.70, 0.10, 0.10, 0.10 ],
    [ 0.10, 0.10, 0.70, 0.10 ],
    [ 0.10, 0.70, 0.10, 0.10 ],
];

#[rustfmt::skip]
const AT: [[f64; 4]; 2] = [
    //  A     C     G     T
    [ 0.70, 0.10, 0.10, 0.10 ],
    [ 0.10, 0.10, 0.10, 0.70 ],
];

const PALINDROMES: &[&str] = &["ACGTTAACGT", "GAATTC", "AGCTAGCTAGCT"];

fn motif<const N: usize>(id: &str, rows: [[f64; 4]; N]) -> Motif<Dna> {
    let freqs = FrequencyMatrix::new(DenseMatrix::from_rows(rows)).unwrap();
    Motif::new(id, freqs)
}

#[test]
fn palindrome_symmetric_motif() {
    let bg = Background::<Dna>::uniform();
    let builder = PssmBuilder::new();
    let both = builder
        .build_pair(&motif("AT", AT), &bg, &bg, Strands::Both)
        .unwrap();
    let forward = builder
        .build_pair(&motif("AT", AT), &bg, &bg, Strands::Forward)
        .unwrap();

    for palindrome in PALINDROMES {
        let seq = EncodedSequence::<Dna>::from_str(palindrome).unwrap();
        assert_eq!(seq.reverse_complement(), seq);
        let s1 = Scanner::new(&both).scan(&seq).score;
        let s2 = Scanner::new(&forward).scan(&seq).score;
        assert!((s1 - s2).abs() < 1e-9, "{} != {} for {}", s1, s2, palindrome);
    }
}

#[test]
fn palindrome_any_motif() {
    let bg = Background::<Dna>::uniform();
    let builder = PssmBuilder::new();
    let both = builder
        .build_pair(&motif("AGC", AGC), &bg, &bg, Strands::Both)
        .unwrap();
    let forward = builder
        .build_pair(&motif("AGC", AGC), &bg, &bg, Strands::Forward)
        .unwrap();

    for palindrome in PALINDROMES {
        let seq = EncodedSequence::<Dna>::from_str(palindrome).unwrap();
        let s1 = Scanner::new(&both).scan(&seq).score;
        let s2 = Scanner::new(&forward).scan(&seq).score;
        assert!((s1 - s2).abs() < 1e-9, "{} != {} for {}", s1, s2, palindrome);
    }
}

#[rustfmt::skip]
const ACTG: [[f64; 4]; 4] = [
    //  A     C     G     T
    [ 0.85, 0.05, 0.05, 0.05 ],
    [ 0.05, 0.85, 0.05, 0.05 ],
    [ 0.05, 0.05, 0.05, 0.85 ],
    [ 0.05, 0.05, 0.85, 0.05 ],
];

#[test]
fn single_column_end_to_end() {
    let freqs = FrequencyMatrix::<Dna>::new(DenseMatrix::from_rows([[0.97, 0.01, 0.01, 0.01]]))
        .unwrap();
    let bg = Background::<Dna>::uniform();
    let pair = PssmBuilder::new()
        .pseudocount(0.01)
        .build_pair(&Motif::new("A", freqs), &bg, &bg, Strands::Forward)
        .unwrap();

    let seq = EncodedSequence::<Dna>::from_str("AAAA").unwrap();
    let expected: f64 = (0.97 * 20.0 + 0.01 * 0.25) / 20.01 / 0.25;
    let lattice = pair.positive().odds().odds()[0][0];
    let scale = pair.positive().distribution().discretization().scale();

    let mut scanner = Scanner::new(&pair);
    let avg = scanner.method(ScoringMethod::AvgOdds).scan(&seq);
    assert!(avg.feasible);
    assert_eq!(avg.scored, 4);
    assert!((avg.score - lattice).abs() < 1e-12, "{} != {}", avg.score, lattice);
    assert!(
        (avg.score.log2() - expected.log2()).abs() <= 0.5 / scale + 1e-12,
        "{} != {}",
        avg.score,
        expected
    );

    let max = scanner.method(ScoringMethod::MaxOdds).scan(&seq);
    assert!((max.score - avg.score).abs() < 1e-12);

    // only four best windows reach the best average
    let pvalue = ama_pvalue(avg.score, seq.len(), None, &pair);
    assert!((pvalue - 1.0 / 256.0).abs() < 1e-9, "{} != {}", pvalue, 1.0 / 256.0);
}

#[cfg(feature = "sampling")]
#[test]
fn average_odds_calibration() {
    use affimotif::pwm::dist::lookup;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ALPHA: f64 = 0.05;
    const SLACK: f64 = 0.02;
    const TRIALS: usize = 2000;

    let bg = Background::<Dna>::uniform();
    let builder = PssmBuilder::new();
    let w = ACTG.len();

    for (strands, length) in [
        (Strands::Forward, w),
        (Strands::Forward, 3 * w),
        (Strands::Both, 3 * w),
        (Strands::Both, 200),
    ] {
        let pair = builder
            .build_pair(&motif("ACTG", ACTG), &bg, &bg, strands)
            .unwrap();
        let dist = pair.positive().distribution();
        let scanner = Scanner::new(&pair);

        let mut rng = StdRng::seed_from_u64(42);
        let mut hits = 0;
        for _ in 0..TRIALS {
            let seq = bg.sample_sequence(&mut rng, length).unwrap();
            let result = scanner.scan(&seq);
            assert!(result.is_valid());
            let pvalue = ama_pvalue(result.score, length, None, &pair);
            assert!((0.0..=1.0).contains(&pvalue), "invalid p-value: {}", pvalue);
            if length == w && strands == Strands::Forward {
                let exact = lookup(dist.sf(), dist.window(seq.iter()).unwrap());
                assert_eq!(pvalue, exact, "single window p-value is not exact");
            }
            if pvalue < ALPHA {
                hits += 1;
            }
        }

        let rate = hits as f64 / TRIALS as f64;
        assert!(
            rate <= ALPHA + SLACK,
            "false positive rate too high for {:?} strands of length {}: {}",
            strands,
            length,
            rate
        );
        if length == w && strands == Strands::Forward {
            assert!(rate > 0.0);
        }
    }
}
