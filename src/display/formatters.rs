// Display formatting utilities shared by the text and terminal renderers

/// Width of one rendered cell, enough for a 5 character label
pub const CELL_WIDTH: usize = 6;

/// Column header line for a yard `cols` wide (1-indexed)
pub fn format_column_headers(cols: usize) -> String {
    let mut line = String::from("    ");
    for col in 1..=cols {
        line.push_str(&pad_cell(&format!("{:02}", col)));
    }
    line.trim_end().to_string()
}

/// Row prefix for yard row `y`
pub fn format_row_prefix(y: i64) -> String {
    format!("{:02}: ", y)
}

/// Center `text` in a cell, truncating to fit
pub fn pad_cell(text: &str) -> String {
    let clipped: String = text.chars().take(CELL_WIDTH - 1).collect();
    format!("{:^width$}", clipped, width = CELL_WIDTH)
}

/// Section header with a rule underneath
pub fn format_section_header(title: &str) -> String {
    format!("{}\n{}", title, "=".repeat(title.chars().count().max(12)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_cell_width() {
        assert_eq!(pad_cell("NAN").chars().count(), CELL_WIDTH);
        assert_eq!(pad_cell("ABCDEFGH").trim(), "ABCDE");
        assert_eq!(pad_cell(""), " ".repeat(CELL_WIDTH));
    }

    #[test]
    fn test_headers() {
        let headers = format_column_headers(3);
        assert!(headers.starts_with("    "));
        assert!(headers.contains("01"));
        assert!(headers.ends_with("03"));
        assert_eq!(format_row_prefix(8), "08: ");
    }
}
