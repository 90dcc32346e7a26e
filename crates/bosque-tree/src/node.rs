use std::fmt;

/// Zero-based attribute (column) index into a [`Dataset`](crate::Dataset) schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttributeIndex(usize);

impl AttributeIndex {
    /// Create a new attribute index from a zero-based column position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based column index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for AttributeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The branch condition that led a parent node to one of its children.
#[derive(Debug, Clone, PartialEq)]
pub enum Edge {
    /// Categorical branch: the row's level equals this value.
    Category(String),
    /// Numeric branch: the row's value is `<= threshold`.
    AtMost(f64),
    /// Numeric branch: the row's value is `> threshold`.
    Above(f64),
}

impl Edge {
    /// Return `true` when a cell satisfies this branch condition.
    ///
    /// A numeric edge never admits a categorical cell and vice versa.
    #[must_use]
    pub fn admits(&self, cell: Cell<'_>) -> bool {
        match (self, cell) {
            (Edge::Category(level), Cell::Level(value)) => level == value,
            (Edge::AtMost(threshold), Cell::Number(value)) => value <= *threshold,
            (Edge::Above(threshold), Cell::Number(value)) => value > *threshold,
            _ => false,
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Category(level) => f.write_str(level),
            Edge::AtMost(threshold) => write!(f, "<= {threshold}"),
            Edge::Above(threshold) => write!(f, "> {threshold}"),
        }
    }
}

/// A single cell of a row, borrowed from its dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    /// Value of a numeric column.
    Number(f64),
    /// Level of a categorical column.
    Level(&'a str),
}

/// A node of an induced decision tree.
///
/// Every node owns its children; the root carries no incoming edge.
#[derive(Debug, Clone)]
pub enum TreeNode {
    /// An interior decision node.
    Split {
        /// Branch condition from the parent, `None` at the root.
        edge: Option<Edge>,
        /// Attribute the rows were partitioned on.
        attribute: AttributeIndex,
        /// Information gain of the split, in bits.
        gain: f64,
        /// Number of training rows that reached this node.
        n_rows: usize,
        /// Children in branch enumeration order; never empty.
        children: Vec<TreeNode>,
    },
    /// A terminal node.
    Leaf {
        /// Branch condition from the parent, `None` for a single-leaf tree.
        edge: Option<Edge>,
        /// Predicted class index.
        prediction: usize,
        /// Number of training rows that reached this leaf.
        n_rows: usize,
    },
}

impl TreeNode {
    /// Return the incoming edge, or `None` for the root.
    #[must_use]
    pub fn edge(&self) -> Option<&Edge> {
        match self {
            TreeNode::Split { edge, .. } | TreeNode::Leaf { edge, .. } => edge.as_ref(),
        }
    }

    /// Return the number of training rows that reached this node.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        match self {
            TreeNode::Split { n_rows, .. } | TreeNode::Leaf { n_rows, .. } => *n_rows,
        }
    }

    /// Return the children of a split node; empty for a leaf.
    #[must_use]
    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Split { children, .. } => children,
            TreeNode::Leaf { .. } => &[],
        }
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    /// Return the number of nodes in the subtree rooted here.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        1 + self.children().iter().map(TreeNode::n_nodes).sum::<usize>()
    }

    /// Return the number of leaves in the subtree rooted here.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { children, .. } => children.iter().map(TreeNode::n_leaves).sum(),
        }
    }

    /// Return the depth of the subtree rooted here (a leaf has depth 0).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.children()
            .iter()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}
