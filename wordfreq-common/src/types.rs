//! Core value types shared across the wordfreq crates
//!
//! The aggregation side owns a mutable [`FrequencyTable`]; everything
//! downstream only ever sees immutable [`Snapshot`] copies of it.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// One normalized word and the number of times it has been seen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    /// Normalized word (never empty)
    pub word: String,
    /// Occurrences seen so far in the current run (>= 1)
    pub count: u64,
}

impl WordCount {
    pub fn new(word: impl Into<String>, count: u64) -> Self {
        Self {
            word: word.into(),
            count,
        }
    }
}

/// Mutable word -> count mapping owned by the aggregator
///
/// Keys are case-normalized by the tokenizer before they reach the table,
/// so case variants of a word collapse into one entry. No ordering is
/// guaranteed; ordering is the sorter's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: HashMap<String, u64>,
}

/// Immutable, independently-readable copy of the table at a point in time
pub type Snapshot = Arc<FrequencyTable>;

/// Sequence of word counts with a total order imposed by a [`SortMethod`]
pub type OrderedResult = Vec<WordCount>;

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the count for a normalized word (insert with 1 if absent)
    pub fn record(&mut self, word: String) {
        *self.counts.entry(word).or_insert(0) += 1;
    }

    /// Count for a word, if present
    pub fn get(&self, word: &str) -> Option<u64> {
        self.counts.get(word).copied()
    }

    /// Number of distinct words in the table
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts (total word occurrences folded in so far)
    pub fn total_occurrences(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Freeze the current state into a snapshot copy
    ///
    /// The copy is independent of the live table: folding further chunks
    /// never mutates a snapshot that has already been handed out.
    pub fn snapshot(&self) -> Snapshot {
        Arc::new(self.clone())
    }

    /// Flatten the table into unordered (word, count) items
    pub fn to_items(&self) -> Vec<WordCount> {
        self.counts
            .iter()
            .map(|(word, count)| WordCount::new(word.clone(), *count))
            .collect()
    }
}

impl FromIterator<(String, u64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

/// Sorting criterion for the ordered word-frequency view
///
/// Closed enumeration: declaration order defines both the selector display
/// order and the default selection (index 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum SortMethod {
    /// Descending by count; ties ascending alphabetical
    ByFrequency,
    /// Ascending lexicographic by normalized word
    Alphabetical,
    /// Ascending by word length; ties ascending alphabetical
    ByLength,
}

impl SortMethod {
    /// All methods in enumeration (and selector display) order
    pub const ALL: [SortMethod; 3] = [
        SortMethod::ByFrequency,
        SortMethod::Alphabetical,
        SortMethod::ByLength,
    ];

    /// Human-readable selector label
    pub fn label(&self) -> &'static str {
        match self {
            SortMethod::ByFrequency => "By Frequency",
            SortMethod::Alphabetical => "Alphabetically",
            SortMethod::ByLength => "By Length",
        }
    }

    /// Static selector label list, in enumeration order
    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|method| method.label()).collect()
    }

    /// Resolve a 0-based selection index, rejecting out-of-range values
    pub fn from_index(index: usize) -> Option<SortMethod> {
        Self::ALL.get(index).copied()
    }

    /// Total order between two items under this method
    pub fn compare(&self, a: &WordCount, b: &WordCount) -> Ordering {
        match self {
            SortMethod::ByFrequency => b
                .count
                .cmp(&a.count)
                .then_with(|| a.word.cmp(&b.word)),
            SortMethod::Alphabetical => a.word.cmp(&b.word),
            SortMethod::ByLength => a
                .word
                .len()
                .cmp(&b.word.len())
                .then_with(|| a.word.cmp(&b.word)),
        }
    }

    /// Sort items in place under this method
    pub fn sort(&self, items: &mut [WordCount]) {
        items.sort_by(|a, b| self.compare(a, b));
    }
}

impl std::fmt::Display for SortMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl TryFrom<usize> for SortMethod {
    type Error = crate::error::Error;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::from_index(index).ok_or(crate::error::Error::InvalidSelection {
            index,
            len: Self::ALL.len(),
        })
    }
}

/// One display row for the presentation collaborator
///
/// Word as the primary label, count rendered as decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRow {
    pub title: String,
    pub value: String,
}

impl From<&WordCount> for ListRow {
    fn from(item: &WordCount) -> Self {
        Self {
            title: item.word.clone(),
            value: item.count.to_string(),
        }
    }
}
