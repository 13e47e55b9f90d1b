/// Strip the chatter vision models wrap around a formula.
///
/// Drops a Markdown code fence, prose before the first `$`, and anything
/// after the last `$` or `}`; collapses blank lines.
pub fn clean_latex(raw: &str) -> String {
    let mut result = strip_code_fence(raw.trim()).to_string();

    if let Some(start) = result.find('$') {
        if start > 0 {
            result = result[start..].to_string();
        }
    }

    if let Some((idx, ch)) = result
        .char_indices()
        .rev()
        .find(|&(_, c)| c == '$' || c == '}')
    {
        result.truncate(idx + ch.len_utf8());
    }

    while result.contains("\n\n") {
        result = result.replace("\n\n", "\n");
    }

    result.trim().to_string()
}

/// The formula without one surrounding `$$..$$` or `$..$` pair, ready for
/// a renderer that expects bare TeX. Text with inner delimiters is left as is.
pub fn strip_math_delimiters(markup: &str) -> &str {
    let trimmed = markup.trim();
    for delimiter in ["$$", "$"] {
        if let Some(inner) = trimmed
            .strip_prefix(delimiter)
            .and_then(|rest| rest.strip_suffix(delimiter))
            .filter(|inner| !inner.contains('$'))
        {
            return inner.trim();
        }
    }
    trimmed
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.trim_end().strip_suffix("```") else {
        return text;
    };
    // Skip an info string such as ```latex
    match body.find('\n') {
        Some(newline) if !body[..newline].contains('\\') => body[newline + 1..].trim(),
        _ => body.trim(),
    }
}
