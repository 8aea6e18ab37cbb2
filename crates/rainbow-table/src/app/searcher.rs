//! Search workflow implementation
//!
//! This module provides the ladder search recovering a password from a
//! target hash, in a sequential and a rayon-parallel flavour, plus a variant
//! collecting every distinct match.
//!
//! For each start offset `o` (from `row_length - 1` down to 0) the target is
//! assumed to sit at column `o`; walking it forward to the end of the chain
//! gives a candidate end hash. A stored chain with that end is replayed from
//! its start to confirm the target really occurs in it.

use crate::app::table::RainbowTable;
use crate::domain::chain::{enumerate_chain, find_in_chain};
use crate::domain::hash::{hash_password, reduce_hash};
use crate::domain::key::HashKey;
use crate::domain::params::RainbowParameters;
use crate::error::{RainbowError, Result};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tracing::debug;

/// Search a password hashing to `target`
///
/// Runs on the calling thread, trying start offsets from the last column
/// down to the first.
///
/// # Arguments
/// * `table` - The table to search
/// * `target` - The hash to invert, `hash_length` bytes long
///
/// # Returns
/// The first verified match in offset order, `Ok(None)` if the table holds
/// none, or `InvalidHash` if the target length differs from the table's
/// hash length
pub fn search_password(table: &RainbowTable, target: &HashKey) -> Result<Option<String>> {
    let params = table.params();
    check_target(params, target)?;

    let found = (0..params.row_length)
        .rev()
        .find_map(|offset| search_offset(table, target, offset));

    log_outcome(target, found.as_deref());
    Ok(found)
}

/// Search a password hashing to `target` using the rayon pool
///
/// Offsets are spread across threads; the result is the same password the
/// sequential search returns.
pub fn search_password_parallel(table: &RainbowTable, target: &HashKey) -> Result<Option<String>> {
    let params = table.params();
    check_target(params, target)?;

    let found = (0..params.row_length)
        .into_par_iter()
        .rev()
        .find_map_first(|offset| search_offset(table, target, offset));

    log_outcome(target, found.as_deref());
    Ok(found)
}

/// Collect every distinct password hashing to `target` reachable in the table
///
/// With short hash lengths several passwords can share a hash.
///
/// # Returns
/// All passwords found in a matching chain, sorted and deduplicated
pub fn search_all_passwords(table: &RainbowTable, target: &HashKey) -> Result<Vec<String>> {
    let params = table.params();
    check_target(params, target)?;

    let found: FxHashSet<String> = (0..params.row_length)
        .into_par_iter()
        .flat_map_iter(|offset| {
            let end = walk_to_end(params, target, offset);
            table
                .lookup(&end)
                .map(|start| matches_in_chain(params, &start, target))
                .unwrap_or_default()
        })
        .collect();

    let mut results: Vec<String> = found.into_iter().collect();
    results.sort();

    debug!(hash = %target, matches = results.len(), "collected all matches");
    Ok(results)
}

fn check_target(params: &RainbowParameters, target: &HashKey) -> Result<()> {
    if target.len() != params.hash_length {
        return Err(RainbowError::InvalidHash {
            expected: params.hash_length,
            found: target.len(),
        });
    }
    Ok(())
}

/// Try a single start offset
fn search_offset(table: &RainbowTable, target: &HashKey, offset: u32) -> Option<String> {
    let params = table.params();

    // Step 1: walk the target to the end of the chain
    let end = walk_to_end(params, target, offset);

    // Step 2: O(1) lookup for the end hash
    let start = table.lookup(&end)?;

    // Step 3: replay the candidate chain to rule out a false alarm
    let password = find_in_chain(params, &start, target)?;
    debug!(offset, start = %start, "verified match");
    Some(password)
}

/// Hash reached at the chain end if `target` sits at column `offset`
///
/// Offset `row_length - 1` is the last column, so the target itself is
/// the candidate end.
fn walk_to_end(params: &RainbowParameters, target: &HashKey, offset: u32) -> HashKey {
    let mut hash = *target;
    for column in offset..params.row_length - 1 {
        let password = reduce_hash(params, &hash, column);
        hash = hash_password(params, &password);
    }
    hash
}

fn matches_in_chain(params: &RainbowParameters, start: &str, target: &HashKey) -> Vec<String> {
    enumerate_chain(params, start)
        .into_iter()
        .filter(|(_, hash)| hash == target)
        .map(|(password, _)| password)
        .collect()
}

fn log_outcome(target: &HashKey, found: Option<&str>) {
    match found {
        Some(password) => debug!(hash = %target, password, "search succeeded"),
        None => debug!(hash = %target, "no match found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chain::{ChainEntry, compute_chain};

    fn table() -> RainbowTable {
        RainbowTable::configure("abcdefgh", 5, 3, 12, 1).unwrap()
    }

    #[test]
    fn test_search_empty_table() {
        let table = table();
        let target = hash_password(table.params(), "abcde");
        assert_eq!(search_password(&table, &target).unwrap(), None);
        assert_eq!(search_password_parallel(&table, &target).unwrap(), None);
        assert!(search_all_passwords(&table, &target).unwrap().is_empty());
    }

    #[test]
    fn test_search_wrong_length() {
        let table = table();
        let target = HashKey::new(&[1, 2]).unwrap();
        assert!(matches!(
            search_password(&table, &target),
            Err(RainbowError::InvalidHash {
                expected: 3,
                found: 2
            })
        ));
        assert!(search_password_parallel(&table, &target).is_err());
        assert!(search_all_passwords(&table, &target).is_err());
    }

    #[test]
    fn test_walk_last_offset_is_identity() {
        let table = table();
        let target = HashKey::new(&[7, 7, 7]).unwrap();
        assert_eq!(walk_to_end(table.params(), &target, 11), target);
    }

    #[test]
    fn test_walk_reaches_chain_end() {
        let table = table();
        let params = table.params();
        let columns = enumerate_chain(params, "hgfed");
        let end = compute_chain(params, "hgfed".to_string()).end;

        for (offset, (_, hash)) in columns.iter().enumerate() {
            assert_eq!(walk_to_end(params, hash, offset as u32), end);
        }
    }

    #[test]
    fn test_finds_every_column() {
        let table = table();
        let params = table.params().clone();
        let entry = compute_chain(&params, "abcde".to_string());
        table.insert_chain(entry);

        for (password, hash) in enumerate_chain(&params, "abcde") {
            let found = search_password(&table, &hash).unwrap();
            let found = found.unwrap_or_else(|| panic!("column {} not found", password));
            assert_eq!(hash_password(&params, &found), hash);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let table = table();
        let params = table.params().clone();
        for start in ["abcde", "bcdef", "hhhhh", "aaaaa"] {
            table.insert_chain(compute_chain(&params, start.to_string()));
        }

        for (_, hash) in enumerate_chain(&params, "bcdef") {
            assert_eq!(
                search_password(&table, &hash).unwrap(),
                search_password_parallel(&table, &hash).unwrap()
            );
        }
    }

    #[test]
    fn test_false_alarm_rejected() {
        // A stored end that the target walks into, but whose chain never
        // contains the target
        let table = table();
        let params = table.params().clone();
        let target = hash_password(&params, "ccccc");
        let end = walk_to_end(&params, &target, 0);

        let bogus_start = (0..)
            .map(|i: u32| {
                let c = params.alphabet.get(i as usize % 8);
                std::iter::repeat_n(c, 5).collect::<String>()
            })
            .take(8)
            .find(|s| find_in_chain(&params, s, &target).is_none())
            .unwrap();
        table.insert_chain(ChainEntry::new(bogus_start, end));

        assert_eq!(search_password(&table, &target).unwrap(), None);
    }

    #[test]
    fn test_search_all_includes_first_match() {
        let table = table();
        let params = table.params().clone();
        table.insert_chain(compute_chain(&params, "defgh".to_string()));

        let (_, hash) = enumerate_chain(&params, "defgh")[6].clone();
        let first = search_password(&table, &hash).unwrap().unwrap();
        let all = search_all_passwords(&table, &hash).unwrap();

        assert!(all.contains(&first));
        for password in &all {
            assert_eq!(hash_password(&params, password), hash);
        }
    }
}
