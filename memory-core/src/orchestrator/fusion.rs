//! Reciprocal-rank fusion for merging per-tier recall result lists (spec §4.7).

use std::collections::HashMap;

use crate::tiers::RecallMatch;

const DEFAULT_K: f32 = 60.0;

/// Merge any number of already-ranked result lists into one. Each item earns
/// `1/(k+rank)` per list it appears in (1-indexed rank); items present in more
/// than one list are deduplicated by memory id, keeping the copy with the
/// higher raw similarity. The merged list is sorted by fused score descending
/// (ties broken by id, for determinism and `fuse(A,B) == fuse(B,A)`), the top
/// score is normalized to 1.0, and every other score is scaled proportionally.
/// The caller is responsible for truncating to its own `limit`.
#[must_use]
pub fn fuse(lists: &[Vec<RecallMatch>], k: Option<f32>) -> Vec<RecallMatch> {
    let k = k.unwrap_or(DEFAULT_K);
    let mut fused: HashMap<String, (RecallMatch, f32)> = HashMap::new();

    for list in lists {
        for (idx, item) in list.iter().enumerate() {
            let rank = (idx + 1) as f32;
            let contribution = 1.0 / (k + rank);
            let entry = fused
                .entry(item.memory.id.clone())
                .or_insert_with(|| (item.clone(), 0.0));
            entry.1 += contribution;
            if item.similarity > entry.0.similarity {
                entry.0.memory = item.memory.clone();
                entry.0.similarity = item.similarity;
            }
        }
    }

    let mut entries: Vec<(RecallMatch, f32)> = fused.into_values().collect();
    entries.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.memory.id.cmp(&b.0.memory.id))
    });

    let top_score = entries.first().map(|(_, score)| *score).unwrap_or(0.0);
    if top_score <= f32::EPSILON {
        return entries.into_iter().map(|(m, _)| m).collect();
    }
    entries
        .into_iter()
        .map(|(mut recall_match, score)| {
            recall_match.similarity = score / top_score;
            recall_match
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Memory, MemoryType, Metadata, Tier};
    use std::collections::BTreeSet;

    fn memory_with_id(id: &str) -> Memory {
        let mut memory = Memory::new(
            MemoryType::Decision,
            Tier::L2,
            "content".to_string(),
            BTreeSet::new(),
            Metadata::default(),
            None,
        );
        memory.id = id.to_string();
        memory
    }

    fn matches(pairs: &[(&str, f32)]) -> Vec<RecallMatch> {
        pairs
            .iter()
            .map(|(id, sim)| RecallMatch {
                memory: memory_with_id(id),
                similarity: *sim,
            })
            .collect()
    }

    #[test]
    fn spec_example_orders_b_then_a() {
        let a = matches(&[("a", 0.9), ("b", 0.8), ("c", 0.7)]);
        let b = matches(&[("b", 0.85), ("d", 0.6), ("a", 0.5)]);
        let fused = fuse(&[a, b], Some(60.0));
        assert_eq!(fused[0].memory.id, "b");
        assert_eq!(fused[1].memory.id, "a");
        assert!((fused[0].similarity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn commutative_modulo_tie_break() {
        let a = matches(&[("a", 0.9), ("b", 0.8)]);
        let b = matches(&[("b", 0.85), ("a", 0.5)]);
        let ab = fuse(&[a.clone(), b.clone()], Some(60.0));
        let ba = fuse(&[b, a], Some(60.0));
        let ab_ids: Vec<&str> = ab.iter().map(|m| m.memory.id.as_str()).collect();
        let ba_ids: Vec<&str> = ba.iter().map(|m| m.memory.id.as_str()).collect();
        assert_eq!(ab_ids, ba_ids);
    }

    #[test]
    fn single_list_preserves_order() {
        let a = matches(&[("a", 0.9), ("b", 0.8), ("c", 0.7)]);
        let fused = fuse(&[a, Vec::new()], Some(60.0));
        let ids: Vec<&str> = fused.iter().map(|m| m.memory.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!((fused[0].similarity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(fuse(&[], Some(60.0)).is_empty());
    }
}
