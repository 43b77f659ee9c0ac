//! Merkle-pruned tree diff: compare two noder trees and produce a list of
//! changes.
//!
//! Children are paired by name. A pair whose hashes match is skipped
//! without listing its children; a pair where either hash is unavailable is
//! always descended into. A name present on one side only becomes an
//! Insert or Delete for every leaf beneath it.

use std::cmp::Ordering;

use tracing::trace;

use crate::change::Change;
use crate::error::DiffResult;
use crate::noder::Noder;

/// Compare two trees rooted at `from` and `to`.
///
/// `None` stands for an empty tree, so diffing `None` against a tree
/// reports every leaf of that tree as inserted. Changes come out in path
/// order.
pub fn diff_tree<A: Noder, B: Noder>(from: Option<&A>, to: Option<&B>) -> DiffResult<Vec<Change>> {
    let mut changes = Vec::new();
    diff_nodes(from, to, &mut changes)?;
    Ok(changes)
}

/// Diff several independent root pairs and concatenate the results in the
/// order given.
///
/// Each pair is diffed on its own; no change from one pair depends on the
/// content of another.
pub fn diff_roots<A, B, I>(pairs: I) -> DiffResult<Vec<Change>>
where
    A: Noder,
    B: Noder,
    I: IntoIterator<Item = (Option<A>, Option<B>)>,
{
    let mut changes = Vec::new();
    for (from, to) in pairs {
        diff_nodes(from.as_ref(), to.as_ref(), &mut changes)?;
    }
    Ok(changes)
}

fn diff_nodes<A: Noder, B: Noder>(
    from: Option<&A>,
    to: Option<&B>,
    out: &mut Vec<Change>,
) -> DiffResult<()> {
    match (from, to) {
        (None, None) => Ok(()),
        (None, Some(to)) => insert_all(to, out),
        (Some(from), None) => delete_all(from, out),
        (Some(from), Some(to)) => diff_pair(from, to, out),
    }
}

fn diff_pair<A: Noder, B: Noder>(from: &A, to: &B, out: &mut Vec<Change>) -> DiffResult<()> {
    let (from_hash, to_hash) = (from.hash(), to.hash());
    if from_hash.same_content(&to_hash) {
        return Ok(());
    }
    if from_hash.is_null() && to_hash.is_null() {
        trace!(path = from.path(), "no hash on either side, descending");
    }

    match (from.is_dir(), to.is_dir()) {
        (false, false) => {
            out.push(Change::modify(from, to));
            Ok(())
        }
        (true, true) => diff_children(from, to, out),
        // A file replaced by a directory, or the reverse.
        _ => {
            delete_all(from, out)?;
            insert_all(to, out)
        }
    }
}

fn diff_children<A: Noder, B: Noder>(from: &A, to: &B, out: &mut Vec<Change>) -> DiffResult<()> {
    let mut left = from.children()?;
    let mut right = to.children()?;
    left.sort_by(|a, b| a.name().cmp(b.name()));
    right.sort_by(|a, b| a.name().cmp(b.name()));

    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let order = match (left.peek(), right.peek()) {
            (None, None) => return Ok(()),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(l), Some(r)) => l.name().cmp(r.name()),
        };
        match order {
            Ordering::Less => {
                if let Some(l) = left.next() {
                    delete_all(&l, out)?;
                }
            }
            Ordering::Greater => {
                if let Some(r) = right.next() {
                    insert_all(&r, out)?;
                }
            }
            Ordering::Equal => {
                if let (Some(l), Some(r)) = (left.next(), right.next()) {
                    diff_pair(&l, &r, out)?;
                }
            }
        }
    }
}

fn insert_all<N: Noder>(node: &N, out: &mut Vec<Change>) -> DiffResult<()> {
    for_each_leaf(node, &mut |leaf| out.push(Change::insert(leaf)))
}

fn delete_all<N: Noder>(node: &N, out: &mut Vec<Change>) -> DiffResult<()> {
    for_each_leaf(node, &mut |leaf| out.push(Change::delete(leaf)))
}

fn for_each_leaf<N: Noder>(node: &N, f: &mut dyn FnMut(&N)) -> DiffResult<()> {
    if !node.is_dir() {
        f(node);
        return Ok(());
    }
    let mut children = node.children()?;
    children.sort_by(|a, b| a.name().cmp(b.name()));
    for child in &children {
        for_each_leaf(child, f)?;
    }
    Ok(())
}
