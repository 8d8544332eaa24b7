//! Pairwise concordance between risk scores and observed times.
//!
//! A pair of subjects is *concordant* when the one that failed first carries
//! the higher risk score. Which pairs are comparable at all depends on the
//! [`Convention`]; both conventions are counted in O(n log n) by sorting on
//! time and accumulating risk ranks in a Fenwick tree, and
//! [`count_pairs_exhaustive`] enumerates every pair as a reference.

use ndarray::ArrayView1;
use serde::Deserialize;
use crate::{
    data::{Subject, SurvivalData},
    error::Result,
};

/// which pairs count and how ties score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Convention {
    /// every pair with different times is comparable, censored or not.
    ///
    /// Equal risk at different times is not counted. At equal times a pair is
    /// tied when the risks are equal and not counted otherwise.
    /// `c = concordant / (concordant + discordant + tied)`.
    AllPairs,
    /// Harrell's censoring-aware c-index.
    ///
    /// The subject with the shorter time must have had the event; at equal
    /// times the pair is comparable only if exactly one is censored (the
    /// censored one outlived the other). Tied risks score one half:
    /// `c = (concordant + 0.5 * tied) / (concordant + discordant + tied)`.
    #[default]
    Harrell,
}

/// how one unordered pair was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOutcome {
    Concordant,
    Discordant,
    Tied,
    NotComparable,
}

/// counts of comparable pairs by outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PairCounts {
    pub concordant: u64,
    pub discordant: u64,
    pub tied: u64,
}

impl PairCounts {
    /// total comparable pairs
    pub fn comparable(&self) -> u64 {
        self.concordant + self.discordant + self.tied
    }

    pub fn record(&mut self, outcome: ComparisonOutcome) {
        match outcome {
            ComparisonOutcome::Concordant => self.concordant += 1,
            ComparisonOutcome::Discordant => self.discordant += 1,
            ComparisonOutcome::Tied => self.tied += 1,
            ComparisonOutcome::NotComparable => {}
        }
    }

    /// c-index under `convention`; `None` when nothing was comparable
    pub fn concordance_index(&self, convention: Convention) -> Option<f64> {
        let total = self.comparable();
        if total == 0 {
            return None;
        }

        let credited = match convention {
            Convention::AllPairs => self.concordant as f64,
            Convention::Harrell => self.concordant as f64 + 0.5 * self.tied as f64,
        };
        Some(credited / total as f64)
    }
}

/// risk ordering for a pair where `first` is known to have failed first
fn rank_outcome(first: &Subject, second: &Subject) -> ComparisonOutcome {
    if first.risk > second.risk {
        ComparisonOutcome::Concordant
    } else if first.risk < second.risk {
        ComparisonOutcome::Discordant
    } else {
        ComparisonOutcome::Tied
    }
}

/// classify one pair - argument order doesn't matter
pub fn classify_pair(a: &Subject, b: &Subject, convention: Convention) -> ComparisonOutcome {
    match convention {
        Convention::AllPairs => {
            if a.time != b.time {
                let (early, late) = if a.time < b.time { (a, b) } else { (b, a) };
                match rank_outcome(early, late) {
                    // equal risk at different times isn't counted
                    ComparisonOutcome::Tied => ComparisonOutcome::NotComparable,
                    outcome => outcome,
                }
            } else if a.risk == b.risk {
                ComparisonOutcome::Tied
            } else {
                // equal time, different risk: not counted
                ComparisonOutcome::NotComparable
            }
        }
        Convention::Harrell => {
            let (early, late) = if a.time < b.time {
                (a, b)
            } else if b.time < a.time {
                (b, a)
            } else {
                match (a.event, b.event) {
                    (true, false) => (a, b),
                    (false, true) => (b, a),
                    _ => return ComparisonOutcome::NotComparable,
                }
            };

            if !early.event {
                return ComparisonOutcome::NotComparable;
            }
            rank_outcome(early, late)
        }
    }
}

/// brute force over every unordered pair - O(n^2), the reference for `count_pairs`
pub fn count_pairs_exhaustive(data: &SurvivalData, convention: Convention) -> PairCounts {
    let subjects: Vec<Subject> = data.iter().collect();
    let mut counts = PairCounts::default();

    for i in 0..subjects.len() {
        for j in (i + 1)..subjects.len() {
            counts.record(classify_pair(&subjects[i], &subjects[j], convention));
        }
    }

    counts
}

/// Fenwick tree of counts over dense risk ranks
struct RankCounter {
    tree: Vec<u64>,
    total: u64,
}

impl RankCounter {
    fn new(n_ranks: usize) -> Self {
        Self {
            tree: vec![0; n_ranks + 1],
            total: 0,
        }
    }

    fn insert(&mut self, rank: usize) {
        let mut i = rank + 1;
        while i < self.tree.len() {
            self.tree[i] += 1;
            i += i & i.wrapping_neg();
        }
        self.total += 1;
    }

    /// how many inserted ranks are < `rank`
    fn below(&self, rank: usize) -> u64 {
        let mut i = rank;
        let mut sum = 0;
        while i > 0 {
            sum += self.tree[i];
            i -= i & i.wrapping_neg();
        }
        sum
    }

    /// how many inserted ranks are > `rank`
    fn above(&self, rank: usize) -> u64 {
        self.total - self.below(rank + 1)
    }

    fn equal(&self, rank: usize) -> u64 {
        self.below(rank + 1) - self.below(rank)
    }
}

/// dense ranks of the risk scores, equal risks share a rank
fn risk_ranks(risks: ArrayView1<f64>) -> (Vec<usize>, usize) {
    let mut distinct: Vec<f64> = risks.to_vec();
    distinct.sort_by(f64::total_cmp);
    distinct.dedup_by(|a, b| a == b);

    let ranks = risks
        .iter()
        .map(|&r| distinct.partition_point(|&x| x < r))
        .collect();
    (ranks, distinct.len())
}

/// subject indices grouped by equal time, groups in ascending time order
fn time_groups(times: ArrayView1<f64>) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (0..times.len()).collect();
    order.sort_by(|&a, &b| times[a].total_cmp(&times[b]));

    let mut groups: Vec<Vec<usize>> = Vec::new();
    for idx in order {
        match groups.last_mut() {
            Some(group) if times[group[0]] == times[idx] => group.push(idx),
            _ => groups.push(vec![idx]),
        }
    }
    groups
}

/// number of pairs sharing a value in a sorted slice
fn equal_value_pairs(sorted: &[usize]) -> u64 {
    sorted
        .chunk_by(|a, b| a == b)
        .map(|run| {
            let k = run.len() as u64;
            k * (k - 1) / 2
        })
        .sum()
}

/// count concordant/discordant/tied pairs in O(n log n)
pub fn count_pairs(data: &SurvivalData, convention: Convention) -> PairCounts {
    let mut counts = PairCounts::default();
    if data.n_samples() < 2 {
        return counts;
    }

    let (ranks, n_ranks) = risk_ranks(data.risks());
    let groups = time_groups(data.times());
    let events = data.events();
    let mut seen = RankCounter::new(n_ranks);

    match convention {
        Convention::AllPairs => {
            // walk forward in time: `seen` holds everyone strictly earlier
            for group in &groups {
                for &i in group {
                    let r = ranks[i];
                    counts.concordant += seen.above(r);
                    counts.discordant += seen.below(r);
                }

                let mut group_ranks: Vec<usize> = group.iter().map(|&i| ranks[i]).collect();
                group_ranks.sort_unstable();
                counts.tied += equal_value_pairs(&group_ranks);

                for &i in group {
                    seen.insert(ranks[i]);
                }
            }
        }
        Convention::Harrell => {
            // walk backward in time: `seen` holds everyone strictly later
            for group in groups.iter().rev() {
                let mut censored: Vec<usize> = group
                    .iter()
                    .filter(|&&i| !events[i])
                    .map(|&i| ranks[i])
                    .collect();
                censored.sort_unstable();

                for &i in group.iter().filter(|&&i| events[i]) {
                    let r = ranks[i];
                    let censored_below = censored.partition_point(|&c| c < r) as u64;
                    let censored_upto = censored.partition_point(|&c| c <= r) as u64;
                    let censored_above = censored.len() as u64 - censored_upto;

                    counts.concordant += seen.below(r) + censored_below;
                    counts.discordant += seen.above(r) + censored_above;
                    counts.tied += seen.equal(r) + (censored_upto - censored_below);
                }

                for &i in group {
                    seen.insert(ranks[i]);
                }
            }
        }
    }

    counts
}

/// c-index of `data` under `convention`; `None` if no pair is comparable
pub fn concordance_index(data: &SurvivalData, convention: Convention) -> Option<f64> {
    count_pairs(data, convention).concordance_index(convention)
}

/// Harrell c-index straight from arrays - validates first
pub fn c_index(
    risk_scores: ArrayView1<f64>,
    times: ArrayView1<f64>,
    events: &[bool],
) -> Result<Option<f64>> {
    let data = SurvivalData::new(times.to_vec(), events.to_vec(), risk_scores.to_vec())?;
    Ok(concordance_index(&data, Convention::Harrell))
}
