/// Half-open location span: 1-based lines, 0-based (character) columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSpan {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

/// Renders the span's start line with one line of context on either side and a
/// caret marker under the span. Lines are labelled with their 0-based index.
pub fn render_code_frame(source: &str, span: SourceSpan) -> String {
    let lines: Vec<&str> = source.split('\n').map(|l| l.trim_end_matches('\r')).collect();

    let code_ix = span.start_line.saturating_sub(1);
    let Some(code_line) = lines.get(code_ix) else {
        return String::new();
    };
    let before_ix = code_ix.checked_sub(1);
    let after_ix = Some(span.end_line.max(span.start_line)).filter(|ix| *ix < lines.len());

    let width = [before_ix, Some(code_ix), after_ix]
        .iter()
        .flatten()
        .map(|ix| ix.to_string().len())
        .max()
        .unwrap_or(1);

    let end_column = if span.end_line == span.start_line {
        span.end_column
    } else {
        code_line.chars().count()
    };
    let carets = end_column.saturating_sub(span.start_column).max(1);

    let mut out = Vec::with_capacity(4);
    if let Some(ix) = before_ix {
        out.push(format!("{ix:>width$} | {}", lines[ix]));
    }
    out.push(format!("{code_ix:>width$} | {code_line}"));
    out.push(format!(
        "{:width$}   {}{}",
        "",
        " ".repeat(span.start_column),
        "^".repeat(carets)
    ));
    if let Some(ix) = after_ix {
        out.push(format!("{ix:>width$} | {}", lines[ix]));
    }
    out.join("\n")
}
