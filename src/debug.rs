//! Match tree printing
//!
//! Renders a [`Node`] and its descendants one per line, which is the
//! quickest way to see which alternative or repetition count won:
//!
//! ```text
//! rule @0..19 "BIT = \"0\" / \"1\"\r\n"
//!   rulename @0..3 "BIT"
//!     ALPHA @0..1 "B"
//! ...
//! ```

use std::fmt::Write;

use crate::node::Node;

/// Match tree pretty printer
pub struct TreePrinter {
    /// Indentation string
    indent: String,
    /// Maximum depth to print
    max_depth: Option<usize>,
    /// Whether empty matches are printed
    show_empty: bool,
}

impl TreePrinter {
    /// Create a new tree printer
    pub fn new() -> Self {
        Self {
            indent: "  ".to_string(),
            max_depth: None,
            show_empty: true,
        }
    }

    /// Set the indentation string
    pub fn indent(mut self, indent: &str) -> Self {
        self.indent = indent.to_string();
        self
    }

    /// Set the maximum depth to print
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Skip zero-length matches (satisfied optionals, `*x` with no items)
    pub fn hide_empty(mut self) -> Self {
        self.show_empty = false;
        self
    }

    /// Render `node` and its descendants
    pub fn print(&self, node: &Node<'_>) -> String {
        let mut output = String::new();
        self.print_node(node, 0, &mut output);
        output
    }

    fn print_node(&self, node: &Node<'_>, depth: usize, output: &mut String) {
        let indent = self.indent.repeat(depth);

        if let Some(max) = self.max_depth {
            if depth > max {
                writeln!(output, "{}...", indent).unwrap();
                return;
            }
        }

        writeln!(
            output,
            "{}{} @{}..{} {:?}",
            indent,
            node.key(),
            node.pos(),
            node.end(),
            String::from_utf8_lossy(node.value())
        )
        .unwrap();

        for child in node.children() {
            if self.show_empty || !child.is_empty() {
                self.print_node(child, depth + 1, output);
            }
        }
    }
}

impl Default for TreePrinter {
    fn default() -> Self {
        Self::new()
    }
}
