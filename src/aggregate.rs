// Group-by counting over a Dataset

use crate::data::Dataset;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregateError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// How the distinct values of a column are ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingPolicy {
    /// Order in which each value is first seen scanning front to back
    #[default]
    FirstOccurrence,
    /// Numeric order when every value is a number, lexicographic otherwise
    Sorted,
}

impl FromStr for OrderingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" | "first_occurrence" => Ok(OrderingPolicy::FirstOccurrence),
            "sorted" => Ok(OrderingPolicy::Sorted),
            other => Err(format!(
                "unknown ordering '{}' (expected \"first\" or \"sorted\")",
                other
            )),
        }
    }
}

impl fmt::Display for OrderingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderingPolicy::FirstOccurrence => write!(f, "first"),
            OrderingPolicy::Sorted => write!(f, "sorted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub key: String,
    pub count: usize,
}

/// Ordered `(key, count)` pairs for one column
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AggregationResult {
    pub column: String,
    pub groups: Vec<Group>,
}

impl AggregationResult {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.key.as_str()).collect()
    }

    pub fn counts(&self) -> Vec<usize> {
        self.groups.iter().map(|g| g.count).collect()
    }

    pub fn total(&self) -> usize {
        self.groups.iter().map(|g| g.count).sum()
    }

    pub fn max_count(&self) -> usize {
        self.groups.iter().map(|g| g.count).max().unwrap_or(0)
    }

    /// Keep the first `n` groups in their current order.
    pub fn top_n(&self, n: i64) -> Result<AggregationResult, AggregateError> {
        top_n(self, n)
    }
}

/// Single pass over one column: first-seen key order plus running counts
struct Tally<'a> {
    order: Vec<&'a str>,
    counts: HashMap<&'a str, usize>,
}

impl<'a> Tally<'a> {
    fn scan(dataset: &'a Dataset, column: &str) -> Self {
        let mut order = Vec::new();
        let mut counts: HashMap<&'a str, usize> = HashMap::new();

        for value in dataset.column(column).flatten() {
            let count = counts.entry(value).or_insert_with(|| {
                order.push(value);
                0
            });
            *count += 1;
        }

        Tally { order, counts }
    }

    fn keys(&self, policy: OrderingPolicy) -> Vec<&'a str> {
        let mut keys = self.order.clone();
        if policy == OrderingPolicy::Sorted {
            sort_natural(&mut keys);
        }
        keys
    }

    fn into_result(self, column: &str, policy: OrderingPolicy) -> AggregationResult {
        let groups = self
            .keys(policy)
            .into_iter()
            .map(|key| Group {
                key: key.to_string(),
                count: self.counts.get(key).copied().unwrap_or(0),
            })
            .collect();

        AggregationResult {
            column: column.to_string(),
            groups,
        }
    }
}

/// Sort keys numerically if all of them parse as finite numbers, lexicographically otherwise.
/// Numerically identical spellings such as `7` and `7.0` fall back to byte order.
pub fn sort_natural(keys: &mut [&str]) {
    let numeric: Option<Vec<f64>> = keys
        .iter()
        .map(|k| k.parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect();

    match numeric {
        Some(values) if !values.is_empty() => {
            let mut pairs: Vec<(f64, &str)> = values.into_iter().zip(keys.iter().copied()).collect();
            pairs.sort_by(|a, b| {
                a.0.partial_cmp(&b.0)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| compare_exact(a.1, b.1))
                    .then_with(|| a.1.cmp(b.1))
            });
            for (slot, (_, key)) in keys.iter_mut().zip(pairs) {
                *slot = key;
            }
        }
        _ => keys.sort_unstable(),
    }
}

/// Exact comparison of two keys whose `f64` values collide. Plain decimals
/// compare by value; keys with an exponent sort after them.
fn compare_exact(a: &str, b: &str) -> Ordering {
    match (Decimal::parse(a), Decimal::parse(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Plain decimal literal split into sign, integer digits and fraction digits,
/// with leading and trailing zeros stripped.
#[derive(Debug, PartialEq, Eq)]
struct Decimal<'a> {
    negative: bool,
    int: &'a str,
    frac: &'a str,
}

impl<'a> Decimal<'a> {
    fn parse(text: &'a str) -> Option<Self> {
        let text = text.trim();
        let (negative, body) = match text.as_bytes().first().copied()? {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };
        let (int, frac) = body.split_once('.').unwrap_or((body, ""));
        if int.is_empty() && frac.is_empty() {
            return None;
        }
        if !int.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }
        let int = int.trim_start_matches('0');
        let frac = frac.trim_end_matches('0');
        let negative = negative && !(int.is_empty() && frac.is_empty());
        Some(Decimal { negative, int, frac })
    }

    fn magnitude_cmp(&self, other: &Self) -> Ordering {
        self.int
            .len()
            .cmp(&other.int.len())
            .then_with(|| self.int.cmp(other.int))
            .then_with(|| self.frac.cmp(other.frac))
    }
}

impl Ord for Decimal<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.magnitude_cmp(other),
            (true, true) => other.magnitude_cmp(self),
        }
    }
}

impl PartialOrd for Decimal<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub fn distinct_values_by_first_occurrence(dataset: &Dataset, column: &str) -> Vec<String> {
    distinct_values(dataset, column, OrderingPolicy::FirstOccurrence)
}

pub fn distinct_values_sorted(dataset: &Dataset, column: &str) -> Vec<String> {
    distinct_values(dataset, column, OrderingPolicy::Sorted)
}

pub fn distinct_values(dataset: &Dataset, column: &str, policy: OrderingPolicy) -> Vec<String> {
    Tally::scan(dataset, column)
        .keys(policy)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Count of records whose `column` equals each key, aligned with `keys`.
/// Records without the column never match.
pub fn counts_for<K: AsRef<str>>(dataset: &Dataset, column: &str, keys: &[K]) -> Vec<usize> {
    let tally = Tally::scan(dataset, column);
    keys.iter()
        .map(|k| tally.counts.get(k.as_ref()).copied().unwrap_or(0))
        .collect()
}

pub fn group_by(dataset: &Dataset, column: &str, policy: OrderingPolicy) -> AggregationResult {
    Tally::scan(dataset, column).into_result(column, policy)
}

/// Truncate to the first `n` groups without re-sorting. Fails on negative `n`.
pub fn top_n(result: &AggregationResult, n: i64) -> Result<AggregationResult, AggregateError> {
    if n < 0 {
        return Err(AggregateError::InvalidArgument(format!(
            "top_n expects a non-negative count, got {}",
            n
        )));
    }

    let n = usize::try_from(n).unwrap_or(usize::MAX);
    if n >= result.groups.len() {
        return Ok(result.clone());
    }

    Ok(AggregationResult {
        column: result.column.clone(),
        groups: result.groups[..n].to_vec(),
    })
}
