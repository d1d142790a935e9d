use std::collections::HashMap;

use crate::models::{FrequencyTable, RankedEntry, RankedList};

/// Single-pass count. Keys keep the order in which they first appear.
pub fn count<S: AsRef<str>>(tokens: &[S]) -> FrequencyTable {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(tokens.len());
    let mut entries: Vec<(String, usize)> = Vec::new();

    for token in tokens {
        let token = token.as_ref();
        match index.get(token) {
            Some(&slot) => entries[slot].1 += 1,
            None => {
                index.insert(token, entries.len());
                entries.push((token.to_string(), 1));
            }
        }
    }

    FrequencyTable { entries }
}

/// Count descending; equal counts stay in first-occurrence order.
pub fn rank_table(table: &FrequencyTable) -> RankedList {
    let mut entries: Vec<RankedEntry> = table
        .iter()
        .map(|(token, count)| RankedEntry {
            token: token.to_string(),
            count,
        })
        .collect();
    // Stable sort keeps the table order among ties.
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    RankedList { entries }
}

pub fn rank<S: AsRef<str>>(tokens: &[S]) -> RankedList {
    rank_table(&count(tokens))
}
