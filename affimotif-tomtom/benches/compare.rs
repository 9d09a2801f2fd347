#![feature(test)]

extern crate affimotif;
extern crate affimotif_tomtom;
extern crate rand;
extern crate test;

use affimotif::abc::Dna;
use affimotif::bg::Background;
use affimotif::DenseMatrix;
use affimotif::FrequencyMatrix;
use affimotif::Motif;
use affimotif_tomtom::ColumnScore;
use affimotif_tomtom::Tomtom;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

const TARGETS: usize = 200;

fn random_motif<R: Rng>(rng: &mut R, id: usize) -> Motif<Dna> {
    let width = rng.gen_range(6..20);
    let mut rows = Vec::with_capacity(width);
    for _ in 0..width {
        let mut row = [0.0; 4];
        row.iter_mut().for_each(|x| *x = rng.gen::<f64>() + 0.01);
        let total = row.iter().sum::<f64>();
        row.iter_mut().for_each(|x| *x /= total);
        rows.push(row);
    }
    let freqs = FrequencyMatrix::new(DenseMatrix::from_rows(rows)).unwrap();
    Motif::new(format!("motif{}", id), freqs)
}

fn bench_score(bencher: &mut test::Bencher, score: ColumnScore, complete: bool) {
    let mut rng = StdRng::seed_from_u64(0);
    let targets = (0..TARGETS)
        .map(|i| random_motif(&mut rng, i))
        .collect::<Vec<_>>();
    let query = targets[0].clone();
    let mut tomtom = Tomtom::with_reverse_complements(targets, Background::<Dna>::uniform());
    tomtom.column_score(score).complete_scores(complete);
    bencher.iter(|| test::black_box(tomtom.compare(&query)));
}

#[bench]
fn pearson_complete(bencher: &mut test::Bencher) {
    bench_score(bencher, ColumnScore::Pearson, true);
}

#[bench]
fn pearson_incomplete(bencher: &mut test::Bencher) {
    bench_score(bencher, ColumnScore::Pearson, false);
}

#[bench]
fn allr_complete(bencher: &mut test::Bencher) {
    bench_score(bencher, ColumnScore::Allr, true);
}

#[bench]
fn blic5_complete(bencher: &mut test::Bencher) {
    bench_score(bencher, ColumnScore::Blic5, true);
}
