//! Tree command implementation.

use colored::Colorize;

use super::{block_on, open_session};
use crate::cli::Target;
use crate::error::Result;
use crate::model::TreeEntry;

/// Execute tree command.
pub fn execute(target: Target<'_>, json: bool) -> Result<()> {
    block_on(run(target, json))?
}

async fn run(target: Target<'_>, json: bool) -> Result<()> {
    let session = open_session(target, false).await?;
    let tree = session.tree();

    if json {
        println!("{}", serde_json::to_string(&tree)?);
        return Ok(());
    }

    if tree.is_empty() {
        println!("No documents.");
        return Ok(());
    }
    for line in render(&tree) {
        println!("{line}");
    }
    Ok(())
}

fn render(entries: &[TreeEntry]) -> Vec<String> {
    let mut lines = Vec::new();
    render_into(entries, 0, &mut lines);
    lines
}

fn render_into(entries: &[TreeEntry], depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    for entry in entries {
        if entry.is_dir {
            lines.push(format!("{indent}{}", format!("{}/", entry.name()).blue().bold()));
            render_into(&entry.children, depth + 1, lines);
        } else {
            lines.push(format!("{indent}{}", entry.name()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_nests_directories() {
        colored::control::set_override(false);
        let tree = vec![
            TreeEntry::dir("journal", vec![TreeEntry::file("journal/monday.md")]),
            TreeEntry::file("todo.md"),
        ];
        assert_eq!(render(&tree), vec!["journal/", "  monday.md", "todo.md"]);
    }
}
