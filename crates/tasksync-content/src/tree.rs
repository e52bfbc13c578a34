//! Parent/child relationships encoded as nested indentation

use std::collections::{HashMap, HashSet};

use crate::model::TaskRecord;
use crate::syntax::SyntaxCodec;

/// Spaces per nesting level
pub const INDENT_WIDTH: usize = 4;

/// Where indentation places one task line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineParent {
    /// Depth zero
    Root,
    /// Nested under the line at this index
    Child(usize),
    /// Indented with no line one level up to hang from; shown as a root
    Orphan,
}

/// Assign each line its parent from a run of line depths.
///
/// The parent is the nearest preceding line exactly one level shallower
/// within the current branch. A line indented deeper than that is promoted
/// to [`LineParent::Orphan`] and can still parent the lines below it.
pub fn parse_indentation(depths: &[usize]) -> Vec<LineParent> {
    let mut branch: Vec<(usize, usize)> = Vec::new();
    let mut parents = Vec::with_capacity(depths.len());

    for (index, &depth) in depths.iter().enumerate() {
        while branch.last().is_some_and(|&(d, _)| d >= depth) {
            branch.pop();
        }

        let parent = match branch.last() {
            _ if depth == 0 => LineParent::Root,
            Some(&(d, line)) if d + 1 == depth => LineParent::Child(line),
            _ => LineParent::Orphan,
        };
        parents.push(parent);
        branch.push((depth, index));
    }

    parents
}

/// One rendered line: which input node, at what depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutEntry {
    pub index: usize,
    pub depth: usize,
}

/// Pre-order placement of a forest, plus any cycles found in it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForestLayout {
    pub entries: Vec<LayoutEntry>,
    /// Each cycle's member ids, starting from the first member in input order
    pub cycles: Vec<Vec<String>>,
    /// Ids rendered flat because no root reaches them: cycle members and
    /// everything below them
    pub stranded: Vec<String>,
}

impl ForestLayout {
    /// Ids whose flat placement does not reflect their parent links
    pub fn implicated(&self) -> HashSet<&str> {
        self.stranded.iter().map(String::as_str).collect()
    }

    /// Split the entries into one run per top-level tree
    pub fn trees(&self) -> Vec<&[LayoutEntry]> {
        let mut trees = Vec::new();
        let mut start = 0;
        for (i, entry) in self.entries.iter().enumerate().skip(1) {
            if entry.depth == 0 {
                trees.push(&self.entries[start..i]);
                start = i;
            }
        }
        if start < self.entries.len() {
            trees.push(&self.entries[start..]);
        }
        trees
    }
}

/// Renders a set of records as an indented forest
#[derive(Debug, Clone, Copy)]
pub struct TreeCodec<'a> {
    syntax: &'a SyntaxCodec,
}

impl<'a> TreeCodec<'a> {
    pub fn new(syntax: &'a SyntaxCodec) -> Self {
        Self { syntax }
    }

    /// Lay out `nodes` (id, parent id) depth-first from every root.
    ///
    /// Nodes must already be in sibling order; children keep their relative
    /// input order. A node is a root when it has no parent or its parent is
    /// not among `nodes`. Nodes unreachable from any root sit on or below a
    /// cycle and are appended flat, at depth zero, in input order.
    pub fn layout(nodes: &[(&str, Option<&str>)]) -> ForestLayout {
        let position: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, (id, _))| (*id, i))
            .collect();
        let parent_index: Vec<Option<usize>> = nodes
            .iter()
            .map(|(_, parent)| parent.and_then(|p| position.get(p).copied()))
            .collect();

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        for (i, parent) in parent_index.iter().enumerate() {
            match *parent {
                Some(p) if p != i => children[p].push(i),
                _ => {}
            }
        }

        let mut visited = vec![false; nodes.len()];
        let mut entries = Vec::with_capacity(nodes.len());
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for root in (0..nodes.len()).filter(|&i| parent_index[i].is_none()) {
            stack.push((root, 0));
            while let Some((node, depth)) = stack.pop() {
                if visited[node] {
                    continue;
                }
                visited[node] = true;
                entries.push(LayoutEntry { index: node, depth });
                for &child in children[node].iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
        }

        let stranded: Vec<usize> = (0..nodes.len()).filter(|&i| !visited[i]).collect();
        let cycles = find_cycles(&stranded, &parent_index)
            .into_iter()
            .map(|cycle| cycle.into_iter().map(|i| nodes[i].0.to_string()).collect())
            .collect();

        let stranded_ids = stranded.iter().map(|&i| nodes[i].0.to_string()).collect();
        entries.extend(stranded.into_iter().map(|index| LayoutEntry { index, depth: 0 }));

        ForestLayout {
            entries,
            cycles,
            stranded: stranded_ids,
        }
    }

    /// Render `records` in layout order.
    ///
    /// With `omit_grouping_tag`, depth-zero lines leave out their first tag
    /// because the enclosing section header already shows it.
    pub fn render(
        &self,
        records: &[&TaskRecord],
        layout: &ForestLayout,
        omit_grouping_tag: bool,
    ) -> Vec<String> {
        self.render_entries(records, &layout.entries, omit_grouping_tag)
    }

    /// Render a slice of layout entries, e.g. the trees placed in one section
    pub fn render_entries(
        &self,
        records: &[&TaskRecord],
        entries: &[LayoutEntry],
        omit_grouping_tag: bool,
    ) -> Vec<String> {
        entries
            .iter()
            .filter_map(|entry| {
                records.get(entry.index).map(|record| {
                    self.syntax
                        .render_at(record, entry.depth, omit_grouping_tag && entry.depth == 0)
                })
            })
            .collect()
    }

    /// Lay out and render in one step; returns the lines and the layout
    pub fn render_forest(
        &self,
        records: &[&TaskRecord],
        parent_of: &HashMap<String, String>,
        omit_grouping_tag: bool,
    ) -> (Vec<String>, ForestLayout) {
        let nodes: Vec<(&str, Option<&str>)> = records
            .iter()
            .map(|r| (r.id(), parent_of.get(r.id()).map(String::as_str)))
            .collect();
        let layout = Self::layout(&nodes);
        (self.render(records, &layout, omit_grouping_tag), layout)
    }
}

/// Walk parent links from each stranded node; every stranded node reaches a
/// cycle because a node with no parent in the set is a root.
fn find_cycles(stranded: &[usize], parent_index: &[Option<usize>]) -> Vec<Vec<usize>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unseen,
        OnPath,
        Done,
    }

    let mut marks = vec![Mark::Unseen; parent_index.len()];
    let mut cycles = Vec::new();

    for &start in stranded {
        let mut path = Vec::new();
        let mut node = Some(start);

        while let Some(current) = node {
            if marks[current] != Mark::Unseen {
                break;
            }
            marks[current] = Mark::OnPath;
            path.push(current);
            node = parent_index[current];
        }

        let closing = node
            .filter(|&hit| marks[hit] == Mark::OnPath)
            .and_then(|hit| path.iter().position(|&n| n == hit));
        if let Some(from) = closing {
            let mut cycle = path[from..].to_vec();
            if let Some(first) = cycle.iter().enumerate().min_by_key(|(_, n)| **n).map(|(i, _)| i) {
                cycle.rotate_left(first);
            }
            cycles.push(cycle);
        }

        for n in path {
            marks[n] = Mark::Done;
        }
    }

    cycles
}
