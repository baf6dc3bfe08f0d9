// Copyright 2026 The qcdt-tools Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Classifying and pruning subtrees against the early-boot whitelist.
//!
//! Classification is a pure query over the original, untouched blob;
//! removal is applied afterwards to the mutable working copy. Keeping
//! the two phases on separate structures means node deletion can never
//! invalidate an in-progress traversal.

use log::debug;
use qcdt_device_tree::fdt::{Fdt, FdtNode};
use qcdt_device_tree::model::DeviceTree;

use crate::error::Error;

/// Subtrees early boot needs; everything else is fair game for removal.
pub const BOOT_WHITELIST: [&str; 6] = [
    "/aliases",
    "/chosen",
    "/memory",
    "/cpus",
    "/soc/qcom,mdss_mdp",
    "/soc/qcom,mdss_dsi",
];

/// Deepest nesting the classifier tolerates before declaring the blob
/// corrupt.
pub const MAX_DEPTH: usize = 32;

/// Verdict for a single node path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The node is a whitelist entry, or an ancestor or descendant of one.
    Keep,
    /// The node is unrelated to every whitelist entry.
    Remove,
}

/// Walks the blob depth-first in pre-order and classifies every node
/// below the root against `whitelist`. The root itself is always kept
/// and never appears in the output.
///
/// # Errors
///
/// Fails with [`Error::TreeTooDeep`] past [`MAX_DEPTH`] levels, or with
/// a codec error when the blob is malformed.
pub fn classify(fdt: &Fdt<'_>, whitelist: &[&str]) -> Result<Vec<(String, Decision)>, Error> {
    let mut decisions = Vec::new();
    for child in fdt.root()?.children() {
        classify_node(&child?, "", 1, whitelist, &mut decisions)?;
    }
    Ok(decisions)
}

fn classify_node(
    node: &FdtNode<'_>,
    parent_path: &str,
    depth: usize,
    whitelist: &[&str],
    decisions: &mut Vec<(String, Decision)>,
) -> Result<(), Error> {
    let path = format!("{parent_path}/{}", node.name()?);
    if depth > MAX_DEPTH {
        return Err(Error::TreeTooDeep { path });
    }

    let keep = whitelist
        .iter()
        .any(|entry| entry.starts_with(&path) || path.starts_with(entry));
    decisions.push((
        path.clone(),
        if keep { Decision::Keep } else { Decision::Remove },
    ));

    for child in node.children() {
        classify_node(&child?, &path, depth + 1, whitelist, decisions)?;
    }
    Ok(())
}

/// Applies every `Remove` decision to the working copy, in classifier
/// order.
///
/// A path that no longer resolves is skipped: removing a node takes its
/// descendants with it, and their own `Remove` entries arrive later in
/// the sequence.
///
/// # Errors
///
/// Fails with [`Error::Prune`] for a decision whose path could never
/// name a removable node (not absolute, or the root itself).
pub fn prune(tree: &mut DeviceTree, decisions: &[(String, Decision)]) -> Result<(), Error> {
    for (path, decision) in decisions {
        if *decision != Decision::Remove {
            continue;
        }
        if !path.starts_with('/') || path == "/" {
            return Err(Error::Prune { path: path.clone() });
        }
        if tree.remove_node(path).is_none() {
            debug!("{path} went away with an ancestor");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use qcdt_device_tree::fdt::Fdt;
    use qcdt_device_tree::model::{DeviceTree, DeviceTreeNode};

    use super::*;

    fn sample_tree() -> DeviceTree {
        DeviceTree::new(
            DeviceTreeNode::builder("")
                .child(
                    DeviceTreeNode::builder("memory")
                        .child(DeviceTreeNode::new("bank@0"))
                        .build(),
                )
                .child(DeviceTreeNode::new("cpus"))
                .child(
                    DeviceTreeNode::builder("soc")
                        .child(DeviceTreeNode::new("qcom,mdss_mdp"))
                        .child(DeviceTreeNode::new("serial@f9960000"))
                        .build(),
                )
                .build(),
        )
    }

    fn classify_sample(whitelist: &[&str]) -> Vec<(String, Decision)> {
        let dtb = sample_tree().to_dtb();
        let fdt = Fdt::new(&dtb).unwrap();
        classify(&fdt, whitelist).unwrap()
    }

    #[test]
    fn descendants_and_ancestors_of_entries_are_kept() {
        let decisions = classify_sample(&["/memory", "/cpus"]);
        let verdict = |path: &str| {
            decisions
                .iter()
                .find(|(p, _)| p == path)
                .map(|(_, d)| *d)
                .unwrap()
        };
        assert_eq!(verdict("/memory"), Decision::Keep);
        assert_eq!(verdict("/memory/bank@0"), Decision::Keep);
        assert_eq!(verdict("/soc"), Decision::Remove);
        assert_eq!(verdict("/soc/serial@f9960000"), Decision::Remove);
    }

    #[test]
    fn ancestor_of_deep_entry_is_kept() {
        let decisions = classify_sample(&BOOT_WHITELIST);
        let map: std::collections::HashMap<_, _> = decisions.into_iter().collect();
        assert_eq!(map["/soc"], Decision::Keep);
        assert_eq!(map["/soc/qcom,mdss_mdp"], Decision::Keep);
        assert_eq!(map["/soc/serial@f9960000"], Decision::Remove);
    }

    #[test]
    fn nesting_bound_is_enforced() {
        let mut node = DeviceTreeNode::new("n33");
        for level in (1..=32).rev() {
            let mut parent = DeviceTreeNode::new(format!("n{level}"));
            parent.add_child(node);
            node = parent;
        }
        let mut root = DeviceTreeNode::new("");
        root.add_child(node);
        let dtb = DeviceTree::new(root).to_dtb();

        let fdt = Fdt::new(&dtb).unwrap();
        let result = classify(&fdt, &BOOT_WHITELIST);
        assert!(matches!(result, Err(Error::TreeTooDeep { .. })));
    }

    #[test]
    fn pruning_skips_already_removed_descendants() {
        let mut tree = sample_tree();
        let decisions = vec![
            ("/soc".to_owned(), Decision::Remove),
            ("/soc/serial@f9960000".to_owned(), Decision::Remove),
        ];
        prune(&mut tree, &decisions).unwrap();
        assert!(tree.root().child("soc").is_none());
        assert!(tree.root().child("memory").is_some());
    }

    #[test]
    fn pruning_rejects_unremovable_paths() {
        let mut tree = sample_tree();
        let decisions = vec![("/".to_owned(), Decision::Remove)];
        assert!(matches!(
            prune(&mut tree, &decisions),
            Err(Error::Prune { .. })
        ));
    }
}
