use anyhow::Result;
use apiflow_core::NodeStatus;
use colored::{ColoredString, Colorize};
use comfy_table::Table;

pub fn print_table(table: Table) -> Result<()> {
    println!("{table}");
    Ok(())
}

pub fn status_label(status: NodeStatus) -> ColoredString {
    match status {
        NodeStatus::Idle => status.as_str().dimmed(),
        NodeStatus::Loading => status.as_str().yellow(),
        NodeStatus::Success => status.as_str().green(),
        NodeStatus::Error => status.as_str().red(),
    }
}

/// Single-line preview of `text`, cut at `max_chars`.
pub fn preview_text(text: &str, max_chars: usize) -> String {
    let line = text.replace(['\n', '\r'], " ");
    match line.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &line[..cut]),
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_text() {
        assert_eq!(preview_text("short", 10), "short");
        assert_eq!(preview_text("a\nb", 10), "a b");
        assert_eq!(preview_text("abcdef", 4), "abcd...");
    }
}
