use crate::fava_common::*;
use crate::pair_similarity::{PairScore, PairTable};

/// How many pairs survive the filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PairSelection {
    /// keep pairs with `score >= cutoff`
    Cutoff(f64),
    /// keep the top pairs, counting both directions
    Count(usize),
}

impl PairSelection {
    /// A cutoff takes precedence over the count, and a NaN cutoff is
    /// treated as missing.
    pub fn new(cutoff: Option<f64>, count: usize) -> Self {
        match cutoff {
            Some(c) if !c.is_nan() => PairSelection::Cutoff(c),
            _ => PairSelection::Count(count),
        }
    }
}

/// Drop self pairs, sort by score (high to low, stable), then select
pub fn filter_pairs(table: PairTable, selection: PairSelection) -> PairTable {
    let PairTable { labels, pairs } = table;

    let mut pairs: Vec<PairScore> = pairs
        .into_iter()
        .filter(|p| p.left != p.right && labels[p.left] != labels[p.right])
        .collect();

    pairs.sort_by(|a, b| b.score.total_cmp(&a.score));

    match selection {
        PairSelection::Cutoff(cutoff) => {
            info!("Keeping pairs with score >= {}", cutoff);
            pairs.retain(|p| p.score >= cutoff);
        }
        PairSelection::Count(count) => {
            info!("Keeping the top {} pairs", count);
            warn!("Both directions of each pair are counted (A-B and B-A).");
            pairs.truncate(count);
        }
    }

    info!("{} pairs selected", pairs.len());
    PairTable { labels, pairs }
}

/// Round to `digits` decimal places; never returns `-0.0`
pub fn round_score(score: f64, digits: usize) -> f64 {
    let scale = 10f64.powi(digits.min(15) as i32);
    let r = (score * scale).round() / scale;
    if r == 0.0 {
        0.0
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PairTable {
        let labels: Vec<Box<str>> = vec!["a".into(), "b".into(), "c".into()];
        let scores = [[1.0, 0.3, -0.2], [0.3, 1.0, 0.7], [-0.2, 0.7, 1.0]];
        let mut pairs = vec![];
        for (left, row) in scores.iter().enumerate() {
            for (right, &score) in row.iter().enumerate() {
                pairs.push(PairScore { left, right, score });
            }
        }
        PairTable { labels, pairs }
    }

    #[test]
    fn selection_precedence() {
        assert_eq!(PairSelection::new(Some(0.5), 10), PairSelection::Cutoff(0.5));
        assert_eq!(PairSelection::new(None, 10), PairSelection::Count(10));
        assert_eq!(PairSelection::new(Some(f64::NAN), 10), PairSelection::Count(10));
    }

    #[test]
    fn cutoff_bounds() {
        let full = filter_pairs(table(), PairSelection::Cutoff(-0.2));
        assert_eq!(full.len(), 6);
        assert!(full.pairs.iter().all(|p| p.left != p.right));

        let none = filter_pairs(table(), PairSelection::Cutoff(1.1));
        assert!(none.is_empty());
    }

    #[test]
    fn count_keeps_stable_order() {
        let out = filter_pairs(table(), PairSelection::Count(3));
        let named: Vec<(&str, &str, f64)> = out.named_pairs().collect();
        assert_eq!(named, vec![("b", "c", 0.7), ("c", "b", 0.7), ("a", "b", 0.3)]);

        let all = filter_pairs(table(), PairSelection::Count(100));
        assert_eq!(all.len(), 6);
    }

    #[test]
    fn rounding() {
        assert_eq!(round_score(0.123456789, 5), 0.12346);
        assert_eq!(round_score(-0.5, 0), -1.0);

        let tiny = round_score(-0.000001, 5);
        assert_eq!(tiny, 0.0);
        assert!(tiny.is_sign_positive());
        assert_eq!(format!("{}", tiny), "0");
    }
}
