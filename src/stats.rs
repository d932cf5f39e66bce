use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};

/// String-keyed map that remembers the order keys were first seen in.
///
/// Rankings sort stably over this order, so equal scores keep
/// first-encountered order.
#[derive(Debug, Clone)]
pub struct Grouped<V> {
    index: HashMap<String, usize>,
    entries: Vec<(String, V)>,
}

impl<V> Default for Grouped<V> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<V: Default> Grouped<V> {
    pub(crate) fn entry_mut(&mut self, key: &str) -> &mut V {
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                self.entries.push((key.to_string(), V::default()));
                self.index.insert(key.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[slot].1
    }
}

impl<V> Grouped<V> {
    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ranked by descending `score`, ties in first-seen order.
    /// `None` keeps every entry, `Some(0)` keeps none.
    fn ranked<S, F>(&self, limit: Option<usize>, score: F) -> Vec<(&str, S)>
    where
        S: Ord,
        F: Fn(&V) -> S,
    {
        let mut ranked: Vec<(&str, S)> = self.iter().map(|(k, v)| (k, score(v))).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        if let Some(limit) = limit {
            ranked.truncate(limit);
        }
        ranked
    }
}

/// Earliest and latest valid timestamps seen in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub min: DateTime<Utc>,
    pub max: DateTime<Utc>,
}

impl TimeRange {
    pub(crate) fn observe(range: &mut Option<TimeRange>, ts: DateTime<Utc>) {
        *range = Some(match *range {
            Some(r) => TimeRange {
                min: r.min.min(ts),
                max: r.max.max(ts),
            },
            None => TimeRange { min: ts, max: ts },
        });
    }
}

/// How rows were disposed of during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCounters {
    pub rows_read: u64,
    pub rows_skipped: u64,
    pub rows_filtered: u64,
}

impl RowCounters {
    pub fn rows_accepted(&self) -> u64 {
        self.rows_read - self.rows_skipped - self.rows_filtered
    }
}

/// Summaries of one aggregation run. Built by [`crate::aggregate`] and never
/// modified afterwards.
#[derive(Debug, Clone, Default)]
pub struct AggregationResult {
    pub(crate) counts_by_address: Grouped<u64>,
    pub(crate) addresses_by_domain: Grouped<HashSet<String>>,
    pub(crate) addresses_by_category: Grouped<HashSet<String>>,
    pub(crate) activity_by_minute: BTreeMap<DateTime<Utc>, u64>,
    pub(crate) time_range: Option<TimeRange>,
    pub(crate) counters: RowCounters,
}

impl AggregationResult {
    pub fn counts_by_address(&self) -> &Grouped<u64> {
        &self.counts_by_address
    }

    pub fn addresses_by_domain(&self) -> &Grouped<HashSet<String>> {
        &self.addresses_by_domain
    }

    pub fn addresses_by_category(&self) -> &Grouped<HashSet<String>> {
        &self.addresses_by_category
    }

    pub fn activity_by_minute(&self) -> &BTreeMap<DateTime<Utc>, u64> {
        &self.activity_by_minute
    }

    /// Extent of every well-formed row, regardless of the range filter.
    /// `None` means the file held no valid rows.
    pub fn time_range(&self) -> Option<TimeRange> {
        self.time_range
    }

    pub fn counters(&self) -> RowCounters {
        self.counters
    }

    /// Number of records that made it into the summaries.
    pub fn total_records(&self) -> u64 {
        self.counts_by_address.iter().map(|(_, count)| *count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts_by_address.is_empty()
    }

    pub fn top_addresses(&self, limit: Option<usize>) -> Vec<(&str, u64)> {
        self.counts_by_address.ranked(limit, |count| *count)
    }

    pub fn top_domains(&self, limit: Option<usize>) -> Vec<(&str, usize)> {
        self.addresses_by_domain.ranked(limit, |addresses| addresses.len())
    }

    pub fn top_categories(&self, limit: Option<usize>) -> Vec<(&str, usize)> {
        self.addresses_by_category.ranked(limit, |addresses| addresses.len())
    }

    /// Busiest minute. Ties go to the earliest minute.
    pub fn peak_minute(&self) -> Option<(DateTime<Utc>, u64)> {
        self.activity_by_minute
            .iter()
            .fold(None, |best: Option<(DateTime<Utc>, u64)>, (&minute, &count)| {
                match best {
                    Some((_, best_count)) if best_count >= count => best,
                    _ => Some((minute, count)),
                }
            })
    }
}
