//! Leading-column padding and line wrapping for Fortran source.
//!
//! Fixed format: statements start in column 7, continuation lines carry a
//! marker in column 6 and nothing may pass column 72. Free format: no
//! columns, a trailing ` &` announces that the statement continues.
//!
//! Comment lines are split at blanks. Code lines are split where the
//! character class changes (word characters against operators, blanks and
//! parentheses against everything else), so identifiers and operators are
//! never cut in half.
use crate::fcode::fcode_settings::SourceFormat;

/// last usable column of a statement line
pub const LINE_LIMIT: usize = 72;
/// text columns of a code continuation line after its 7-column lead
pub const CONTINUATION_LIMIT: usize = 65;
/// text columns of a comment continuation line after the repeated comment lead
pub const COMMENT_CONTINUATION_LIMIT: usize = 66;

/// Leading columns of each kind of line in one source format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeadingColumns {
    pub code: &'static str,
    pub continuation: &'static str,
    pub comment: &'static str,
    /// appended to every segment followed by a continuation line
    pub trailing: &'static str,
}

impl SourceFormat {
    pub fn leading_columns(self) -> LeadingColumns {
        match self {
            SourceFormat::Fixed => LeadingColumns {
                code: "      ",
                continuation: "     @ ",
                comment: "C     ",
                trailing: "",
            },
            SourceFormat::Free => LeadingColumns {
                code: "",
                continuation: "      ",
                comment: "! ",
                trailing: " &",
            },
        }
    }
}

/// Replaces the `!` of comment lines by the comment lead and prefixes code lines with the code lead.
pub fn pad_leading_columns(lines: &[String], format: SourceFormat) -> Vec<String> {
    let lead = format.leading_columns();
    lines
        .iter()
        .map(|line| match line.strip_prefix('!') {
            Some(comment) => format!("{}{}", lead.comment, comment.trim_start()),
            None => format!("{}{}", lead.code, line),
        })
        .collect()
}

/// `.` belongs to words so that `3.14`, `.lt.` and `.true.` stay whole
fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

fn is_blank_or_paren(c: char) -> bool {
    matches!(c, ' ' | '\t' | '(' | ')')
}

/// true when `pos` falls on either side of the sign of a float exponent (`1.5e-9`)
fn in_exponent(line: &[char], pos: usize) -> bool {
    let mantissa_end = |i: usize| line[i].is_ascii_digit() || line[i] == '.';
    let exponent_mark = |i: usize| matches!(line[i], 'e' | 'E' | 'd' | 'D');
    let sign = |i: usize| matches!(line[i], '+' | '-');
    let before_sign = pos >= 2 && sign(pos) && exponent_mark(pos - 1) && mantissa_end(pos - 2);
    let after_sign = pos >= 3
        && line[pos].is_ascii_digit()
        && sign(pos - 1)
        && exponent_mark(pos - 2)
        && mantissa_end(pos - 3);
    before_sign || after_sign
}

/// Position at which a code line may be cut so that the head fits in `endpos` columns.
/// Scans back from `endpos` to the nearest character-class boundary; with
/// none in sight the line is cut hard at `endpos`. A boundary that would
/// leave only the leading blanks in the head does not count, and neither
/// does one inside a float exponent.
pub fn split_pos_code(line: &[char], endpos: usize) -> usize {
    if line.len() <= endpos {
        return line.len();
    }
    let indent = line
        .iter()
        .position(|c| !c.is_whitespace())
        .unwrap_or(line.len());
    let boundary = |pos: usize| {
        let (c, prev) = (line[pos], line[pos - 1]);
        let class_change =
            is_word(c) != is_word(prev) || is_blank_or_paren(c) != is_blank_or_paren(prev);
        class_change && !in_exponent(line, pos)
    };
    let mut pos = endpos;
    while !boundary(pos) {
        pos -= 1;
        if pos <= indent {
            return endpos;
        }
    }
    pos
}

fn trim_start(chars: &[char]) -> &[char] {
    let first = chars
        .iter()
        .position(|c| !c.is_whitespace())
        .unwrap_or(chars.len());
    &chars[first..]
}

fn text(chars: &[char]) -> String {
    chars.iter().collect()
}

fn wrap_code_line(line: &str, lead: &LeadingColumns, result: &mut Vec<String>) {
    let chars: Vec<char> = line.chars().collect();
    let mut rest: &[char] = &chars;
    let mut first = true;
    loop {
        let limit = if first {
            LINE_LIMIT
        } else {
            CONTINUATION_LIMIT
        };
        let pos = split_pos_code(rest, limit);
        let mut hunk = text(&rest[..pos]).trim_end().to_string();
        rest = trim_start(&rest[pos..]);
        if !rest.is_empty() {
            hunk.push_str(lead.trailing);
        }
        if first {
            result.push(hunk);
        } else {
            result.push(format!("{}{}", lead.continuation, hunk));
        }
        first = false;
        if rest.is_empty() {
            break;
        }
    }
}

fn wrap_comment_line(line: &str, lead: &LeadingColumns, result: &mut Vec<String>) {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= LINE_LIMIT {
        result.push(line.to_string());
        return;
    }
    let window_start = lead.comment.chars().count();
    let pos = chars[window_start..LINE_LIMIT]
        .iter()
        .rposition(|&c| c == ' ')
        .map(|p| p + window_start)
        .unwrap_or(LINE_LIMIT);
    result.push(text(&chars[..pos]));
    let mut rest = trim_start(&chars[pos..]);
    while !rest.is_empty() {
        let window = rest.len().min(COMMENT_CONTINUATION_LIMIT);
        let pos = match rest[..window].iter().rposition(|&c| c == ' ') {
            Some(p) if rest.len() >= COMMENT_CONTINUATION_LIMIT => p,
            _ => window,
        };
        result.push(format!("{}{}", lead.comment, text(&rest[..pos])));
        rest = trim_start(&rest[pos..]);
    }
}

/// Wraps padded lines to the column limits of `format`.
/// Lines that already fit are returned unchanged.
pub fn wrap_fortran(lines: &[String], format: SourceFormat) -> Vec<String> {
    let lead = format.leading_columns();
    let mut result = Vec::with_capacity(lines.len());
    for line in lines {
        if line.starts_with(lead.comment) {
            wrap_comment_line(line, &lead, &mut result);
        } else if line.starts_with(lead.code) {
            wrap_code_line(line, &lead, &mut result);
        } else {
            result.push(line.clone());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_sum(terms: usize) -> String {
        (0..terms)
            .map(|i| format!("alpha_{}*beta_{}", i, i))
            .collect::<Vec<_>>()
            .join(" + ")
    }

    #[test]
    fn test_short_lines_unchanged() {
        let lines = vec![
            "      x = 1".to_string(),
            "C     comment".to_string(),
            "      parameter (pi = 3.14159265358979)".to_string(),
        ];
        assert_eq!(wrap_fortran(&lines, SourceFormat::Fixed), lines);
        let free = vec!["x = 1".to_string(), "! comment".to_string()];
        assert_eq!(wrap_fortran(&free, SourceFormat::Free), free);
    }

    #[test]
    fn test_split_pos_code_prefers_boundaries() {
        let line: Vec<char> = "abc + defgh".chars().collect();
        assert_eq!(split_pos_code(&line, 20), line.len());
        // inside "defgh" the nearest boundary is the blank before it
        assert_eq!(split_pos_code(&line, 8), 6);
        let word: Vec<char> = "abcdefghij".chars().collect();
        assert_eq!(split_pos_code(&word, 4), 4);
    }

    #[test]
    fn test_fixed_code_wrapping() {
        let line = format!("      y = {}", long_sum(12));
        let wrapped = wrap_fortran(&[line.clone()], SourceFormat::Fixed);
        assert!(wrapped.len() > 1);
        for (i, hunk) in wrapped.iter().enumerate() {
            assert!(hunk.chars().count() <= LINE_LIMIT, "too long: {}", hunk);
            if i > 0 {
                assert!(hunk.starts_with("     @ "));
                assert!(!hunk.ends_with('&'));
            }
        }
        let rejoined: String = wrapped
            .iter()
            .enumerate()
            .map(|(i, h)| if i == 0 { h.clone() } else { h[7..].to_string() })
            .collect::<Vec<_>>()
            .join("");
        let squeeze = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
        assert_eq!(squeeze(&rejoined), squeeze(&line));
    }

    #[test]
    fn test_free_code_wrapping_marks_continuations() {
        let line = format!("y = {}", long_sum(12));
        let wrapped = wrap_fortran(&[line], SourceFormat::Free);
        let last = wrapped.len() - 1;
        assert!(last > 0);
        for (i, hunk) in wrapped.iter().enumerate() {
            if i < last {
                assert!(hunk.ends_with(" &"));
                assert!(!hunk.ends_with("& &"));
            } else {
                assert!(!hunk.ends_with('&'));
            }
            if i > 0 {
                assert!(hunk.starts_with("      "));
            }
        }
    }

    #[test]
    fn test_float_is_not_split_at_its_point() {
        let name = "a".repeat(52);
        let line = format!("      y = {} + 3.14159265358979", name);
        assert_eq!(
            wrap_fortran(&[line], SourceFormat::Free),
            vec![
                format!("      y = {} + &", name),
                "      3.14159265358979".to_string(),
            ]
        );
    }

    #[test]
    fn test_dotted_operator_stays_whole() {
        let name = "a".repeat(60);
        let line = format!("      if ({} .lt. 1) then", name);
        assert_eq!(
            wrap_fortran(&[line], SourceFormat::Fixed),
            vec![
                format!("      if ({}", name),
                "     @ .lt. 1) then".to_string(),
            ]
        );
    }

    #[test]
    fn test_float_exponent_is_not_split() {
        let line: Vec<char> = "ab + 1.5e-9".chars().collect();
        assert_eq!(split_pos_code(&line, 9), 5);
        assert_eq!(split_pos_code(&line, 10), 5);
        // an ordinary minus is still a boundary
        let line: Vec<char> = "ab - cd".chars().collect();
        assert_eq!(split_pos_code(&line, 4), 4);
    }

    #[test]
    fn test_long_identifier_is_cut_hard() {
        let line = format!("      {}", "a".repeat(100));
        let wrapped = wrap_fortran(&[line], SourceFormat::Fixed);
        assert_eq!(wrapped[0].len(), LINE_LIMIT);
        assert_eq!(wrapped[1], format!("     @ {}", "a".repeat(34)));
    }

    #[test]
    fn test_comment_wrapping_at_blanks() {
        let words = vec!["word"; 30].join(" ");
        let line = format!("C     {}", words);
        let wrapped = wrap_fortran(&[line], SourceFormat::Fixed);
        assert!(wrapped.len() > 1);
        for hunk in &wrapped {
            assert!(hunk.starts_with("C     "));
            assert!(hunk.len() <= LINE_LIMIT);
            assert!(!hunk.ends_with(' '));
        }
    }

    #[test]
    fn test_comment_without_blanks() {
        let line = format!("C     {}", "x".repeat(150));
        let wrapped = wrap_fortran(&[line], SourceFormat::Fixed);
        assert_eq!(wrapped[0].len(), 72);
        assert_eq!(wrapped[1].len(), 6 + 66);
        assert_eq!(wrapped[2], format!("C     {}", "x".repeat(150 - 66 - 66)));
    }

    #[test]
    fn test_pad_leading_columns() {
        let lines = vec!["! Not Fortran:".to_string(), "x = 1".to_string()];
        assert_eq!(
            pad_leading_columns(&lines, SourceFormat::Fixed),
            vec!["C     Not Fortran:".to_string(), "      x = 1".to_string()]
        );
        assert_eq!(
            pad_leading_columns(&lines, SourceFormat::Free),
            vec!["! Not Fortran:".to_string(), "x = 1".to_string()]
        );
    }
}
