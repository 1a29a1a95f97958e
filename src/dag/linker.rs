// src/dag/linker.rs

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use tracing::{debug, warn};

use super::graph::ordered;
use super::paths::{clean_join, display_name, relative_name};
use super::{LinkError, LinkedExample};
use crate::markdown::Example;

pub struct Linker {
    root: PathBuf,
}

impl Linker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve links between `examples`.
    ///
    /// The result keeps the input order.
    pub fn link(&self, examples: Vec<Example>) -> Result<Vec<LinkedExample>, LinkError> {
        let mut nodes: Vec<LinkedExample> = examples.into_iter().map(|e| self.resolve(e)).collect();

        let mut index: HashMap<String, usize> = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.name.clone(), i).is_some() {
                return Err(LinkError::Duplicate(display_name(&node.name).to_string()));
            }
        }

        connect_includes(&mut nodes, &index)?;
        drop_unknown_requires(&mut nodes, &index);

        let order = ordered(
            nodes.len(),
            nodes
                .iter()
                .enumerate()
                .flat_map(|(i, n)| n.children.iter().map(move |&c| (i, c))),
            |i| nodes[i].name.clone(),
        )?;

        filter_requires(&mut nodes, &order);

        for node in nodes.iter_mut() {
            node.leaf =
                node.children.is_empty() && node.requires.is_empty() && !node.parents.is_empty();
        }
        for i in 0..nodes.len() {
            let deps = dependencies_of(&nodes, i, &nodes[i].requires, |c| !nodes[c].leaf);
            nodes[i].dependencies = deps;
        }

        // Dependency setups call each other, so they must not loop either.
        ordered(
            nodes.len(),
            nodes.iter().enumerate().flat_map(|(i, n)| {
                n.dependencies
                    .iter()
                    .filter_map(|d| index.get(d).copied())
                    .map(move |d| (i, d))
            }),
            |i| nodes[i].name.clone(),
        )?;

        for node in &nodes {
            debug!(
                example = display_name(&node.name),
                leaf = node.leaf,
                dependencies = ?node.dependencies,
                "linked example"
            );
        }

        Ok(nodes)
    }

    fn resolve(&self, example: Example) -> LinkedExample {
        let name = relative_name(&self.root, &example.dir);
        let includes = example
            .includes
            .iter()
            .map(|inc| clean_join(&name, inc))
            .collect();
        let requires = example
            .requires
            .iter()
            .map(|req| clean_join(&name, req))
            .collect();

        LinkedExample {
            name,
            dir: example.dir,
            run: example.run,
            cleanup: example.cleanup,
            includes,
            requires,
            children: Vec::new(),
            parents: Vec::new(),
            leaf: false,
            dependencies: Vec::new(),
        }
    }
}

fn connect_includes(
    nodes: &mut [LinkedExample],
    index: &HashMap<String, usize>,
) -> Result<(), LinkError> {
    for parent in 0..nodes.len() {
        for include in nodes[parent].includes.clone() {
            let child = *index
                .get(&include)
                .ok_or_else(|| LinkError::UnknownInclude {
                    example: display_name(&nodes[parent].name).to_string(),
                    include: display_name(&include).to_string(),
                })?;
            nodes[child].parents.push(parent);
            nodes[parent].children.push(child);
        }
    }
    Ok(())
}

fn drop_unknown_requires(nodes: &mut [LinkedExample], index: &HashMap<String, usize>) {
    for node in nodes.iter_mut() {
        let name = node.name.clone();
        node.requires.retain(|req| {
            let known = index.contains_key(req);
            if !known {
                warn!(
                    example = display_name(&name),
                    require = display_name(req),
                    "ignoring requirement on unknown example"
                );
            }
            known
        });
    }
}

/// Drop requires already provided by an ancestor.
///
/// An ancestor provides its own name, its dependencies and whatever its own
/// ancestors provide. Nodes are visited parents-first; while doing so a
/// child counts as a non-leaf when it has children or any requires at all.
fn filter_requires(nodes: &mut [LinkedExample], order: &[usize]) {
    let mut provided: Vec<BTreeSet<String>> = vec![BTreeSet::new(); nodes.len()];
    let mut deps: Vec<Vec<String>> = vec![Vec::new(); nodes.len()];

    for &i in order {
        let mut from_parents = BTreeSet::new();
        for &p in &nodes[i].parents {
            from_parents.extend(deps[p].iter().cloned());
            from_parents.extend(provided[p].iter().cloned());
            from_parents.insert(nodes[p].name.clone());
        }

        nodes[i].requires.retain(|req| !from_parents.contains(req));

        let nodes: &[LinkedExample] = nodes;
        deps[i] = dependencies_of(nodes, i, &nodes[i].requires, |c| {
            !nodes[c].children.is_empty() || !nodes[c].requires.is_empty()
        });
        provided[i] = from_parents;
    }
}

fn dependencies_of(
    nodes: &[LinkedExample],
    i: usize,
    requires: &[String],
    non_leaf: impl Fn(usize) -> bool,
) -> Vec<String> {
    let mut out = requires.to_vec();
    out.extend(
        nodes[i]
            .children
            .iter()
            .copied()
            .filter(|&c| non_leaf(c))
            .map(|c| nodes[c].name.clone()),
    );
    out
}
