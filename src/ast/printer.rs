//! Indented rendering of a tree, one node per line.

use super::ast::NodeRef;

pub fn print_tree(node: NodeRef<'_>) -> String {
    let mut out = String::new();
    print_node(node, 0, &mut out);
    out
}

fn print_node(node: NodeRef<'_>, depth: usize, out: &mut String) {
    out.push_str(&"  ".repeat(depth));
    out.push_str(&node.label());
    if node.line() > 0 {
        out.push_str(&format!(" (line {})", node.line()));
    }
    out.push('\n');

    for child in node.children() {
        print_node(child, depth + 1, out);
    }
}
