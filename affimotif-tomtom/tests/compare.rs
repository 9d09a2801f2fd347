extern crate affimotif;
extern crate affimotif_tomtom;

use affimotif::abc::Dna;
use affimotif::bg::Background;
use affimotif::err::Error;
use affimotif::pwm::Strand;
use affimotif::DenseMatrix;
use affimotif::FrequencyMatrix;
use affimotif::Motif;
use affimotif_tomtom::ColumnScore;
use affimotif_tomtom::Match;
use affimotif_tomtom::Tomtom;

#[rustfmt::skip]
const AGGTCA: [[f64; 4]; 6] = [
    //  A     C     G     T
    [ 0.85, 0.05, 0.05, 0.05 ],
    [ 0.05, 0.05, 0.85, 0.05 ],
    [ 0.10, 0.05, 0.80, 0.05 ],
    [ 0.05, 0.05, 0.05, 0.85 ],
    [ 0.05, 0.80, 0.05, 0.10 ],
    [ 0.80, 0.10, 0.05, 0.05 ],
];

#[rustfmt::skip]
const SHIFTED: [[f64; 4]; 7] = [
    //  A     C     G     T
    [ 0.25, 0.25, 0.25, 0.25 ],
    [ 0.85, 0.05, 0.05, 0.05 ],
    [ 0.05, 0.05, 0.85, 0.05 ],
    [ 0.10, 0.05, 0.80, 0.05 ],
    [ 0.05, 0.05, 0.05, 0.85 ],
    [ 0.05, 0.80, 0.05, 0.10 ],
    [ 0.80, 0.10, 0.05, 0.05 ],
];

#[rustfmt::skip]
const PREFIX: [[f64; 4]; 4] = [
    //  A     C     G     T
    [ 0.85, 0.05, 0.05, 0.05 ],
    [ 0.05, 0.05, 0.85, 0.05 ],
    [ 0.10, 0.05, 0.80, 0.05 ],
    [ 0.05, 0.05, 0.05, 0.85 ],
];

#[rustfmt::skip]
const CCAT: [[f64; 4]; 5] = [
    //  A     C     G     T
    [ 0.10, 0.70, 0.10, 0.10 ],
    [ 0.05, 0.85, 0.05, 0.05 ],
    [ 0.70, 0.10, 0.10, 0.10 ],
    [ 0.10, 0.10, 0.10, 0.70 ],
    [ 0.30, 0.20, 0.20, 0.30 ],
];

#[rustfmt::skip]
const GATA: [[f64; 4]; 4] = [
    //  A     C     G     T
    [ 0.40, 0.10, 0.40, 0.10 ],
    [ 0.70, 0.10, 0.10, 0.10 ],
    [ 0.10, 0.10, 0.10, 0.70 ],
    [ 0.70, 0.10, 0.10, 0.10 ],
];

fn motif<const N: usize>(id: &str, rows: [[f64; 4]; N]) -> Motif<Dna> {
    let freqs = FrequencyMatrix::new(DenseMatrix::from_rows(rows)).unwrap();
    Motif::new(id, freqs).with_nsites(20.0)
}

fn database() -> Vec<Motif<Dna>> {
    vec![
        motif("CCAT", CCAT),
        motif("GATA", GATA),
        motif("AGGTCA", AGGTCA),
    ]
}

fn best(matches: &[Match]) -> &Match {
    matches
        .iter()
        .min_by(|x, y| x.pvalue.total_cmp(&y.pvalue))
        .unwrap()
}

fn check_statistics(matches: &[Match], targets: usize) {
    for m in matches {
        assert!(m.pvalue >= 0.0 && m.pvalue <= 1.0, "{} at {}", m.pvalue, m.target_id);
        assert_eq!(m.evalue, m.pvalue * targets as f64);
        assert!(m.qvalue >= m.pvalue, "{} < {} at {}", m.qvalue, m.pvalue, m.target_id);
        assert!(m.qvalue <= 1.0);
    }
}

#[test]
fn self_match_complete() {
    let tomtom = Tomtom::new(database(), Background::<Dna>::uniform());
    let matches = tomtom.compare(&motif("AGGTCA", AGGTCA)).unwrap();
    assert_eq!(matches.len(), 3);
    check_statistics(&matches, 3);

    let m = best(&matches);
    assert_eq!(m.target, 2);
    assert_eq!(m.target_id, "AGGTCA");
    assert_eq!(m.offset, 0);
    assert_eq!(m.overlap, 6);
    assert_eq!(m.orientation, Strand::Positive);
}

#[test]
fn self_match_incomplete() {
    let mut tomtom = Tomtom::new(database(), Background::<Dna>::uniform());
    tomtom.complete_scores(false);
    let matches = tomtom.compare(&motif("AGGTCA", AGGTCA)).unwrap();
    check_statistics(&matches, 3);

    let m = best(&matches);
    assert_eq!(m.target, 2);
    assert_eq!(m.offset, 0);
    assert_eq!(m.overlap, 6);
}

#[test]
fn reverse_complement_target() {
    let query = motif("AGGTCA", AGGTCA);
    let targets = vec![motif("CCAT", CCAT), query.reverse_complement()];
    let tomtom = Tomtom::with_reverse_complements(targets, Background::<Dna>::uniform());
    let matches = tomtom.compare(&query).unwrap();
    check_statistics(&matches, 2);

    let m = &matches[1];
    assert_eq!(m.orientation, Strand::Negative);
    assert_eq!(m.offset, 0);
    assert_eq!(m.overlap, 6);
    assert!(m.pvalue < matches[0].pvalue);
}

#[test]
fn shifted_target() {
    let targets = vec![motif("GATA", GATA), motif("SHIFTED", SHIFTED)];
    for &complete in &[true, false] {
        let mut tomtom = Tomtom::new(targets.clone(), Background::<Dna>::uniform());
        tomtom.complete_scores(complete);
        let matches = tomtom.compare(&motif("AGGTCA", AGGTCA)).unwrap();
        let m = &matches[1];
        assert_eq!(m.offset, 1, "complete = {}", complete);
        assert_eq!(m.overlap, 6, "complete = {}", complete);
    }
}

#[test]
fn internal_alignments() {
    let targets = vec![motif("CCAT", CCAT), motif("PREFIX", PREFIX)];
    let mut tomtom = Tomtom::new(targets, Background::<Dna>::uniform());
    tomtom.internal(true);
    let matches = tomtom.compare(&motif("AGGTCA", AGGTCA)).unwrap();
    for m in matches.iter() {
        assert!(m.overlap == 4 || m.overlap == 5, "{} at {}", m.overlap, m.target_id);
    }
    assert_eq!(matches[1].offset, 0);
    assert_eq!(matches[1].overlap, 4);
}

#[test]
fn min_overlap() {
    let mut tomtom = Tomtom::new(database(), Background::<Dna>::uniform());
    tomtom.min_overlap(3).column_score(ColumnScore::Allr);
    let matches = tomtom.compare(&motif("GATA", GATA)).unwrap();
    check_statistics(&matches, 3);
    assert!(matches.iter().all(|m| m.overlap >= 3));
    assert_eq!(best(&matches).target_id, "GATA");
}

#[test]
fn column_scores() {
    let query = motif("AGGTCA", AGGTCA);
    for &score in &[
        ColumnScore::Pearson,
        ColumnScore::Allr,
        ColumnScore::Euclidean,
        ColumnScore::Sandelin,
        ColumnScore::KullbackLeibler,
        ColumnScore::Blic1,
        ColumnScore::Blic5,
        ColumnScore::Llr1,
        ColumnScore::Llr5,
    ] {
        let mut tomtom = Tomtom::new(database(), Background::<Dna>::uniform());
        tomtom.column_score(score);
        let matches = tomtom.compare(&query).unwrap();
        check_statistics(&matches, 3);
        assert_eq!(best(&matches).target, 2, "{:?}", score);
    }
}

#[test]
fn empty_database() {
    let tomtom = Tomtom::<Dna>::new(Vec::new(), Background::uniform());
    assert!(tomtom.is_empty());
    let matches = tomtom.compare(&motif("GATA", GATA)).unwrap();
    assert!(matches.is_empty());
}

#[test]
fn negative_pseudocount() {
    let mut tomtom = Tomtom::new(database(), Background::<Dna>::uniform());
    tomtom.pseudocount(-1.0);
    match tomtom.compare(&motif("GATA", GATA)) {
        Err(Error::InvalidConfig(_)) => (),
        other => panic!("unexpected result: {:?}", other),
    }
}
