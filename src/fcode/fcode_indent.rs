//! Block indentation of free-format code.
//!
//! Lines are classified by their first keyword: `do`/`if` open a block,
//! `end ...` closes one, `else`/`else if` does both. A closing line is
//! outdented before it is written, an opening line indents what follows.
//! Lines after a continued line (`... &`) get an extra double indent.
//! Fixed-format code keeps its columns and passes through untouched.
use crate::fcode::fcode_settings::SourceFormat;

pub const TAB_WIDTH: usize = 3;

const OPENING_PREFIXES: [&str; 3] = ["do ", "if(", "if "];
const CLOSING_PREFIXES: [&str; 3] = ["end ", "enddo", "endif"];

fn is_else(line: &str) -> bool {
    line == "else" || line.starts_with("else ") || line.starts_with("else(")
}

pub fn opens_block(line: &str) -> bool {
    line == "do" || is_else(line) || OPENING_PREFIXES.iter().any(|k| line.starts_with(k))
}

pub fn closes_block(line: &str) -> bool {
    line == "end" || is_else(line) || CLOSING_PREFIXES.iter().any(|k| line.starts_with(k))
}

/// Re-indents free-format lines; fixed-format lines are returned as they are.
pub fn indent_code(lines: &[String], format: SourceFormat) -> Vec<String> {
    if format == SourceFormat::Fixed {
        return lines.to_vec();
    }
    let mut level: usize = 0;
    let mut cont_padding: usize = 0;
    let mut result = Vec::with_capacity(lines.len());
    for line in lines.iter().map(|l| l.trim_start()) {
        if closes_block(line) {
            level = level.saturating_sub(1);
        }
        let padding = " ".repeat(level * TAB_WIDTH + cont_padding);
        result.push(format!("{}{}", padding, line));
        cont_padding = if line.ends_with('&') { 2 * TAB_WIDTH } else { 0 };
        if opens_block(line) {
            level += 1;
        }
    }
    result
}

/// `indent_code` for a block of text
pub fn indent_code_str(code: &str, format: SourceFormat) -> String {
    let lines: Vec<String> = code.lines().map(String::from).collect();
    indent_code(&lines, format).join("\n")
}
