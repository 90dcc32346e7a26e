//! Plain-text rendering of an induced tree.

use std::fmt::{self, Write};

use bosque_tree::{DecisionTree, TreeNode};

/// Render `tree` depth-first, one node per line.
///
/// The root line holds only the root's attribute (or class, for a
/// single-leaf tree). A node at depth `d` is indented by `d` tabs:
///
/// ```text
/// Tempo
/// 	----- Sol (ganho: 0.97) --- Umidade
/// 		----- Alta (ganho: 0) --- Nao
/// ```
#[must_use]
pub fn render_tree(tree: &DecisionTree) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_tree(&mut out, tree);
    out
}

/// Write the rendering of [`render_tree`] to any formatter sink.
///
/// # Errors
///
/// Propagates errors from the underlying writer.
pub fn write_tree(out: &mut impl Write, tree: &DecisionTree) -> fmt::Result {
    writeln!(out, "{}", node_name(tree, tree.root()))?;
    for child in tree.root().children() {
        write_node(out, tree, child, 1)?;
    }
    Ok(())
}

fn write_node(
    out: &mut impl Write,
    tree: &DecisionTree,
    node: &TreeNode,
    depth: usize,
) -> fmt::Result {
    for _ in 0..depth {
        out.write_char('\t')?;
    }
    out.write_str("----- ")?;
    if let Some(edge) = node.edge() {
        write!(out, "{edge}")?;
    }
    match node {
        TreeNode::Split { gain, .. } => write!(out, " (ganho: {gain:.2})")?,
        TreeNode::Leaf { .. } => out.write_str(" (ganho: 0)")?,
    }
    writeln!(out, " --- {}", node_name(tree, node))?;

    for child in node.children() {
        write_node(out, tree, child, depth + 1)?;
    }
    Ok(())
}

fn node_name<'t>(tree: &'t DecisionTree, node: &TreeNode) -> &'t str {
    match node {
        TreeNode::Split { attribute, .. } => tree.attribute_name(*attribute),
        TreeNode::Leaf { prediction, .. } => tree.class_name(*prediction),
    }
}

#[cfg(test)]
mod tests {
    use bosque_tree::{Dataset, DecisionTreeConfig};

    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn weather_tree() {
        let ds = Dataset::from_records(
            strings(&["Weather", "Play"]),
            vec![
                strings(&["Sunny", "No"]),
                strings(&["Rain", "Yes"]),
                strings(&["Sunny", "No"]),
                strings(&["Rain", "Yes"]),
            ],
            "Play",
        )
        .unwrap();
        let tree = DecisionTreeConfig::new().fit(&ds).unwrap();
        assert_eq!(
            render_tree(&tree),
            "Weather\n\t----- Sunny (ganho: 0) --- No\n\t----- Rain (ganho: 0) --- Yes\n"
        );
    }

    #[test]
    fn numeric_edges_and_nested_gain() {
        // x splits at its mean 2.5, then the upper half at its own mean 3.5.
        let ds = Dataset::from_records(
            strings(&["x", "y"]),
            vec![
                strings(&["1", "a"]),
                strings(&["2", "a"]),
                strings(&["3", "b"]),
                strings(&["4", "c"]),
            ],
            "y",
        )
        .unwrap();
        let tree = DecisionTreeConfig::new().fit(&ds).unwrap();
        assert_eq!(
            render_tree(&tree),
            "x\n\
             \t----- <= 2.5 (ganho: 0) --- a\n\
             \t----- > 2.5 (ganho: 1.00) --- x\n\
             \t\t----- <= 3.5 (ganho: 0) --- b\n\
             \t\t----- > 3.5 (ganho: 0) --- c\n"
        );
    }

    #[test]
    fn single_leaf_tree() {
        let ds = Dataset::from_records(
            strings(&["x", "y"]),
            vec![strings(&["1", "Sim"]), strings(&["2", "Sim"])],
            "y",
        )
        .unwrap();
        let tree = DecisionTreeConfig::new().fit(&ds).unwrap();
        assert_eq!(render_tree(&tree), "Sim\n");
    }
}
