use crate::catalog::{flatten, SearchableItem};
use crate::dto::{Category, DuplicateItem};
use crate::options::{DuplicateSearchOptions, GroupBy, MatchType};
use crate::similarity::{has_word_overlap, similarity};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

///
/// Finds exact, shared-word, similar and partial duplicates across a category tree.
///
/// Passes run in that order, each gated by its flag in `options`. The result
/// is a pure function of the input: identical trees and options give identical
/// items, ids and ordering.
///
pub fn find_service_duplicates(
    categories: &[Category],
    options: &DuplicateSearchOptions,
) -> Vec<DuplicateItem> {
    let items = distinct_items(flatten(categories, options));
    debug!(items = items.len(), "flattened catalog");

    let mut duplicates = Vec::new();
    if options.exact_match {
        let found = exact_groups(&items, options);
        debug!(count = found.len(), "exact pass");
        duplicates.extend(found);
    }
    if !needs_pairs(options) {
        return duplicates;
    }
    if options.exact_words {
        let found = word_groups(&items, options.min_word_length);
        debug!(count = found.len(), "exact_words pass");
        duplicates.extend(found);
    }
    if options.similar_match {
        let found = similar_pairs(&items, options.similarity_threshold);
        debug!(count = found.len(), "similar pass");
        duplicates.extend(found);
    }
    if options.partial_match {
        let found = partial_pairs(&items);
        debug!(count = found.len(), "partial pass");
        duplicates.extend(found);
    }
    duplicates
}

/// Whether any enabled pass compares items pairwise.
fn needs_pairs(options: &DuplicateSearchOptions) -> bool {
    options.exact_words || options.similar_match || options.partial_match
}

/// Keeps the first item for each key so an item listed twice in the tree
/// never pairs or groups with itself.
fn distinct_items(items: Vec<SearchableItem>) -> Vec<SearchableItem> {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    items
        .into_iter()
        .filter(|item| seen.insert(item.key()))
        .collect()
}

fn group_key(item: &SearchableItem, group_by: GroupBy) -> String {
    match group_by {
        GroupBy::Name => item.normalized_text.clone(),
        GroupBy::Type => format!("{}:{}", item.item_type.as_str(), item.normalized_text),
    }
}

fn exact_groups(items: &[SearchableItem], options: &DuplicateSearchOptions) -> Vec<DuplicateItem> {
    let min_size = options.min_group_size.max(2);
    let mut order: Vec<(String, Vec<usize>)> = Vec::new();
    let mut lookup: FxHashMap<String, usize> = FxHashMap::default();
    for (idx, item) in items.iter().enumerate() {
        let key = group_key(item, options.group_by);
        match lookup.get(&key) {
            Some(&slot) => order[slot].1.push(idx),
            None => {
                lookup.insert(key.clone(), order.len());
                order.push((key, vec![idx]));
            }
        }
    }
    order
        .into_iter()
        .filter(|(_, members)| members.len() >= min_size)
        .map(|(key, members)| DuplicateItem {
            id: format!("{}-{}", MatchType::Exact.as_str(), key),
            text: items[members[0]].text.clone(),
            match_type: MatchType::Exact,
            occurrences: members.iter().map(|&idx| items[idx].occurrence()).collect(),
            similarity: None,
        })
        .collect()
}

///
/// Partners `j > i` of item `i` whose normalized text differs from it.
///
/// Pairs are produced lazily in `(i, j)` index order; nothing is collected.
///
fn partners(items: &[SearchableItem], i: usize) -> impl Iterator<Item = usize> + '_ {
    ((i + 1)..items.len())
        .filter(move |&j| items[i].normalized_text != items[j].normalized_text)
}

fn candidate_pairs(items: &[SearchableItem]) -> impl Iterator<Item = (usize, usize)> + '_ {
    (0..items.len()).flat_map(move |i| partners(items, i).map(move |j| (i, j)))
}

fn sorted_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn pair_item(
    match_type: MatchType,
    a: &SearchableItem,
    b: &SearchableItem,
    score: f64,
) -> DuplicateItem {
    let (a_key, b_key) = (a.key(), b.key());
    let (first, second) = sorted_pair(&a_key, &b_key);
    DuplicateItem {
        id: format!("{}-{}-{}", match_type.as_str(), first, second),
        text: format!("{} / {}", a.text, b.text),
        match_type,
        occurrences: vec![a.occurrence(), b.occurrence()],
        similarity: Some(score),
    }
}

fn similar_pairs(items: &[SearchableItem], threshold: f64) -> Vec<DuplicateItem> {
    (0..items.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            partners(items, i).filter_map(move |j| {
                let score = similarity(&items[i].normalized_text, &items[j].normalized_text);
                (score >= threshold)
                    .then(|| pair_item(MatchType::Similar, &items[i], &items[j], score))
            })
        })
        .collect()
}

fn partial_pairs(items: &[SearchableItem]) -> Vec<DuplicateItem> {
    candidate_pairs(items)
        .filter(|&(i, j)| {
            let (a, b) = (&items[i].normalized_text, &items[j].normalized_text);
            a.contains(b.as_str()) || b.contains(a.as_str())
        })
        .map(|(i, j)| {
            let score = similarity(&items[i].normalized_text, &items[j].normalized_text);
            pair_item(MatchType::Partial, &items[i], &items[j], score)
        })
        .collect()
}

fn word_groups(items: &[SearchableItem], min_word_length: usize) -> Vec<DuplicateItem> {
    let mut table = DeduplicationTable::default();
    for (i, j) in candidate_pairs(items) {
        if has_word_overlap(&items[i].normalized_text, &items[j].normalized_text, min_word_length) {
            table.link(i, j);
        }
    }
    table
        .grouped_indices()
        .into_iter()
        .map(|members| {
            let first_key = members
                .iter()
                .map(|&idx| items[idx].key())
                .min()
                .unwrap_or_default();
            DuplicateItem {
                id: format!(
                    "{}-{}-{}",
                    MatchType::ExactWords.as_str(),
                    first_key,
                    members.len()
                ),
                text: items[members[0]].text.clone(),
                match_type: MatchType::ExactWords,
                occurrences: members.iter().map(|&idx| items[idx].occurrence()).collect(),
                similarity: None,
            }
        })
        .collect()
}

///
/// Tracks clusters of linked item indices.
///
/// Linking two items already in different clusters folds one cluster into
/// the other, so the final clusters are the connected components of all
/// links regardless of the order the links arrive in.
///
#[derive(Default)]
struct DeduplicationTable {
    /// Mapping of cluster id to item indices
    duplicate_groups: FxHashMap<usize, Vec<usize>>,
    /// Reverse lookup to identify the cluster id of an item index
    item_lookup: FxHashMap<usize, usize>,
    next_id: usize,
}

impl DeduplicationTable {
    fn link(&mut self, a: usize, b: usize) {
        match (self.cluster_of(a), self.cluster_of(b)) {
            (None, None) => {
                let cluster_id = self.new_id();
                self.add(cluster_id, a);
                self.add(cluster_id, b);
            }
            (Some(cluster_id), None) => self.add(cluster_id, b),
            (None, Some(cluster_id)) => self.add(cluster_id, a),
            (Some(keep), Some(fold)) if keep != fold => {
                let moved = self.remove(fold);
                self.update(keep, moved);
            }
            _ => {}
        }
    }

    ///
    /// Clusters with members in ascending index order, ordered by their first member.
    ///
    fn grouped_indices(&self) -> Vec<Vec<usize>> {
        let mut groups: Vec<Vec<usize>> = self
            .duplicate_groups
            .values()
            .map(|members| {
                let mut members = members.clone();
                members.sort_unstable();
                members
            })
            .collect();
        groups.sort_unstable_by_key(|members| members[0]);
        groups
    }

    fn cluster_of(&self, idx: usize) -> Option<usize> {
        self.item_lookup.get(&idx).copied()
    }

    fn new_id(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }

    fn add(&mut self, cluster_id: usize, idx: usize) {
        self.duplicate_groups.entry(cluster_id).or_default().push(idx);
        self.item_lookup.insert(idx, cluster_id);
    }

    fn update(&mut self, cluster_id: usize, members: Vec<usize>) {
        for idx in members {
            self.add(cluster_id, idx);
        }
    }

    fn remove(&mut self, cluster_id: usize) -> Vec<usize> {
        let members = self.duplicate_groups.remove(&cluster_id).unwrap_or_default();
        for idx in &members {
            self.item_lookup.remove(idx);
        }
        members
    }
}
