#![feature(test)]

extern crate affimotif;
extern crate rand;
extern crate test;

use affimotif::abc::Dna;
use affimotif::bg::markov::MarkovBackground;
use affimotif::bg::Background;
use affimotif::pssm::PssmBuilder;
use affimotif::pssm::PssmPair;
use affimotif::pssm::Strands;
use affimotif::pvalue::ama_pvalue;
use affimotif::scan::ScoringMethod;
use affimotif::scan::Scanner;
use affimotif::seq::EncodedSequence;
use affimotif::DenseMatrix;
use affimotif::FrequencyMatrix;
use affimotif::Motif;
use rand::rngs::StdRng;
use rand::SeedableRng;

const LENGTH: usize = 100_000;

#[rustfmt::skip]
const LEXA: [[f64; 4]; 8] = [
    //  A     C     G     T
    [ 0.05, 0.80, 0.05, 0.10 ],
    [ 0.10, 0.05, 0.05, 0.80 ],
    [ 0.05, 0.05, 0.85, 0.05 ],
    [ 0.30, 0.20, 0.20, 0.30 ],
    [ 0.40, 0.10, 0.10, 0.40 ],
    [ 0.30, 0.20, 0.20, 0.30 ],
    [ 0.05, 0.85, 0.05, 0.05 ],
    [ 0.80, 0.05, 0.05, 0.10 ],
];

fn setup(gc_bins: usize) -> (EncodedSequence<Dna>, PssmPair<Dna>) {
    let bg = Background::<Dna>::nrdb();
    let mut rng = StdRng::seed_from_u64(0);
    let seq = bg.sample_sequence(&mut rng, LENGTH).unwrap();
    let freqs = FrequencyMatrix::new(DenseMatrix::from_rows(LEXA)).unwrap();
    let pair = PssmBuilder::new()
        .gc_bins(gc_bins)
        .build_pair(&Motif::new("LexA", freqs), &bg, &bg, Strands::Both)
        .unwrap();
    (seq, pair)
}

fn bench_method(bencher: &mut test::Bencher, method: ScoringMethod) {
    let (seq, pair) = setup(1);
    let mut scanner = Scanner::new(&pair);
    scanner.method(method);
    bencher.bytes = LENGTH as u64;
    bencher.iter(|| test::black_box(scanner.scan(&seq)));
}

#[bench]
fn avg_odds(bencher: &mut test::Bencher) {
    bench_method(bencher, ScoringMethod::AvgOdds);
}

#[bench]
fn max_odds(bencher: &mut test::Bencher) {
    bench_method(bencher, ScoringMethod::MaxOdds);
}

#[bench]
fn total_hits(bencher: &mut test::Bencher) {
    bench_method(bencher, ScoringMethod::TotalHits { threshold: 1e-4 });
}

#[bench]
fn markov(bencher: &mut test::Bencher) {
    let (seq, pair) = setup(1);
    bencher.bytes = LENGTH as u64;
    bencher.iter(|| {
        let cum = MarkovBackground::<Dna>::from_sequence(&seq, 2).log_cumulative(&seq);
        let mut scanner = Scanner::new(&pair);
        scanner.log_background(&cum);
        test::black_box(scanner.scan(&seq))
    });
}

#[bench]
fn pvalue(bencher: &mut test::Bencher) {
    let (seq, pair) = setup(10);
    let score = Scanner::new(&pair).scan(&seq).score;
    let gc = seq.gc_content();
    bencher.iter(|| test::black_box(ama_pvalue(score, seq.len(), gc, &pair)));
}

#[bench]
fn build(bencher: &mut test::Bencher) {
    let bg = Background::<Dna>::nrdb();
    let freqs = FrequencyMatrix::new(DenseMatrix::from_rows(LEXA)).unwrap();
    let motif = Motif::new("LexA", freqs);
    let mut builder = PssmBuilder::new();
    builder.gc_bins(10).ranges(true);
    bencher.iter(|| test::black_box(builder.build_pair(&motif, &bg, &bg, Strands::Both)));
}
