//! Aggregation of the scores of sequences sharing an identifier.
//!
//! Sequence databases can contain several records with the same
//! identifier, for instance alternative transcripts of a gene. When
//! duplicates are combined, the scores of all records are averaged and
//! the smallest *p-value* is kept, then corrected for the number of
//! records with the Šidák formula `1 - (1 - p)^n`.
//!
//! Sequences that could not be scored get a null score, and a *p-value*
//! of one only when *p-values* are computed.

use std::collections::HashMap;

/// The outcome of scanning one sequence with one motif.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScanOutcome {
    /// At least one window could be scored.
    Scored {
        score: f64,
        pvalue: Option<f64>,
        positions: usize,
    },
    /// No window could be scored.
    Infeasible,
    /// The sequence is shorter than the motif and was not scanned.
    TooShort,
}

/// The aggregation state of a sequence record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordState {
    Unseen,
    FirstSeen,
    Accumulating,
    Finalized,
}

/// The result of scanning a sequence with a motif.
#[derive(Clone, Debug, PartialEq)]
pub struct ScannedSequence {
    /// The sequence identifier.
    pub name: String,
    /// The length of the sequence, the longest one for duplicates.
    pub length: usize,
    pub score: Option<f64>,
    pub pvalue: Option<f64>,
    /// The number of windows that were scored.
    pub scanned_position_count: usize,
    /// The number of records with this identifier.
    pub duplicate_occurrence_count: usize,
    finalized: bool,
}

impl ScannedSequence {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            length: 0,
            score: None,
            pvalue: None,
            scanned_position_count: 0,
            duplicate_occurrence_count: 0,
            finalized: false,
        }
    }

    /// The aggregation state of the record.
    pub fn state(&self) -> RecordState {
        if self.finalized {
            RecordState::Finalized
        } else {
            match self.duplicate_occurrence_count {
                0 => RecordState::Unseen,
                1 => RecordState::FirstSeen,
                _ => RecordState::Accumulating,
            }
        }
    }

    /// Add the outcome of one scan to the record.
    fn update(&mut self, length: usize, outcome: ScanOutcome, pvalues: bool) {
        let first = self.duplicate_occurrence_count == 0;
        match outcome {
            ScanOutcome::Scored {
                score,
                pvalue,
                positions,
            } => {
                let valid = score >= 0.0;
                let score = if score.is_nan() { 0.0 } else { score };
                self.score = Some(self.score.unwrap_or(0.0) + score);
                self.scanned_position_count += positions;
                if !valid {
                    if pvalues {
                        self.pvalue.get_or_insert(1.0);
                    }
                } else if let Some(p) = pvalue {
                    self.pvalue = Some(match self.pvalue {
                        Some(old) if !first => old.min(p),
                        _ => p,
                    });
                }
            }
            ScanOutcome::Infeasible | ScanOutcome::TooShort => {
                self.score.get_or_insert(0.0);
                if pvalues {
                    self.pvalue.get_or_insert(1.0);
                }
            }
        }
        self.length = self.length.max(length);
        self.duplicate_occurrence_count += 1;
    }

    /// Average the score and correct the *p-value* of duplicate records.
    fn finalize(&mut self, rma_max: Option<f64>) {
        let n = self.duplicate_occurrence_count;
        if n > 1 {
            if let Some(score) = self.score.as_mut() {
                *score /= n as f64;
            }
            if let Some(p) = self.pvalue.as_mut() {
                *p = 1.0 - (1.0 - *p).powi(n as i32);
            }
        }
        if let (Some(max), Some(score)) = (rma_max, self.score.as_mut()) {
            if max > 0.0 {
                *score /= max;
            }
        }
        self.finalized = true;
    }
}

/// The scan results of one motif over a sequence database.
#[derive(Clone, Debug, Default)]
pub struct Pattern {
    motif_id: String,
    pvalues: bool,
    records: Vec<ScannedSequence>,
    index: HashMap<String, usize>,
}

impl Pattern {
    /// Create a new empty pattern for the given motif.
    pub fn new<S: Into<String>>(motif_id: S) -> Self {
        Self {
            motif_id: motif_id.into(),
            pvalues: false,
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Assign a *p-value* of one to sequences that could not be scored.
    pub fn with_pvalues(mut self, pvalues: bool) -> Self {
        self.pvalues = pvalues;
        self
    }

    /// The identifier of the motif.
    pub fn motif_id(&self) -> &str {
        &self.motif_id
    }

    /// The records collected so far, in order of first occurrence.
    pub fn records(&self) -> &[ScannedSequence] {
        &self.records
    }

    /// Record the outcome of scanning a sequence.
    ///
    /// With `combine`, records are matched to previous records with the
    /// same identifier, ignoring ASCII case. Otherwise, every call creates
    /// a new record.
    pub fn record(&mut self, name: &str, length: usize, outcome: ScanOutcome, combine: bool) {
        let i = if combine {
            let key = name.to_ascii_lowercase();
            match self.index.get(&key) {
                Some(&i) => i,
                None => {
                    self.records.push(ScannedSequence::new(name));
                    self.index.insert(key, self.records.len() - 1);
                    self.records.len() - 1
                }
            }
        } else {
            self.records.push(ScannedSequence::new(name));
            self.records.len() - 1
        };
        self.records[i].update(length, outcome, self.pvalues);
    }

    /// Finalize all records.
    ///
    /// When `rma_max` is given, every score is divided by it to obtain a
    /// relative motif affinity.
    pub fn finalize(self, rma_max: Option<f64>) -> Vec<ScannedSequence> {
        let mut records = self.records;
        for record in records.iter_mut() {
            record.finalize(rma_max);
        }
        records
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn scored(score: f64, pvalue: f64) -> ScanOutcome {
        ScanOutcome::Scored {
            score,
            pvalue: Some(pvalue),
            positions: 10,
        }
    }

    #[test]
    fn duplicates_order_invariant() {
        let outcomes = [scored(2.0, 0.1), scored(4.0, 0.05)];
        let mut results = Vec::new();
        for order in [[0, 1], [1, 0]] {
            let mut pattern = Pattern::new("M1").with_pvalues(true);
            for i in order {
                pattern.record("X", 100, outcomes[i], true);
            }
            let records = pattern.finalize(None);
            assert_eq!(records.len(), 1);
            results.push(records[0].clone());
        }
        assert_eq!(results[0], results[1]);
        let record = &results[0];
        assert!((record.score.unwrap() - 3.0).abs() < 1e-12);
        assert!((record.pvalue.unwrap() - 0.0975).abs() < 1e-12);
        assert_eq!(record.duplicate_occurrence_count, 2);
        assert_eq!(record.scanned_position_count, 20);
        assert_eq!(record.state(), RecordState::Finalized);
    }

    #[test]
    fn infeasible_first_wins() {
        let mut pattern = Pattern::new("M1").with_pvalues(true);
        pattern.record("x", 5, ScanOutcome::Infeasible, true);
        pattern.record("X", 50, scored(2.0, 0.2), true);
        pattern.record("X", 20, ScanOutcome::Infeasible, true);
        let record = &pattern.records()[0];
        assert_eq!(record.state(), RecordState::Accumulating);
        assert_eq!(record.pvalue, Some(0.2));
        assert_eq!(record.length, 50);
        assert_eq!(record.name, "x");
    }

    #[test]
    fn invalid_score() {
        let mut pattern = Pattern::new("M1").with_pvalues(true);
        pattern.record("A", 5, scored(-1.0, 0.01), true);
        assert_eq!(pattern.records()[0].pvalue, Some(1.0));
        pattern.record("A", 5, scored(2.0, 0.01), true);
        assert_eq!(pattern.records()[0].pvalue, Some(0.01));
    }

    #[test]
    fn too_short() {
        let mut pattern = Pattern::new("M1").with_pvalues(true);
        pattern.record("A", 2, ScanOutcome::TooShort, false);
        assert_eq!(pattern.records()[0].state(), RecordState::FirstSeen);
        let records = pattern.finalize(None);
        assert_eq!(records[0].score, Some(0.0));
        assert_eq!(records[0].pvalue, Some(1.0));
    }

    #[test]
    fn unscored_without_pvalues() {
        let mut pattern = Pattern::new("M1");
        pattern.record("A", 2, ScanOutcome::TooShort, false);
        pattern.record("B", 20, ScanOutcome::Infeasible, false);
        let outcome = ScanOutcome::Scored {
            score: -1.0,
            pvalue: None,
            positions: 10,
        };
        pattern.record("C", 20, outcome, false);
        let records = pattern.finalize(None);
        assert_eq!(records.len(), 3);
        for record in records.iter() {
            assert!(record.pvalue.is_none(), "{} has a p-value", record.name);
        }
        assert_eq!(records[0].score, Some(0.0));
        assert_eq!(records[1].score, Some(0.0));
    }

    #[test]
    fn no_combine() {
        let mut pattern = Pattern::new("M1").with_pvalues(true);
        pattern.record("A", 10, scored(2.0, 0.1), false);
        pattern.record("A", 10, scored(4.0, 0.1), false);
        let records = pattern.finalize(Some(2.0));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].score, Some(1.0));
        assert_eq!(records[1].score, Some(2.0));
        assert_eq!(records[1].pvalue, Some(0.1));
    }
}
