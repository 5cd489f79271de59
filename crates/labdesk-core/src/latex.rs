/// Escape characters that LaTeX treats specially in text mode.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str(r"\textbackslash{}"),
            '{' => out.push_str(r"\{"),
            '}' => out.push_str(r"\}"),
            '$' => out.push_str(r"\$"),
            '&' => out.push_str(r"\&"),
            '#' => out.push_str(r"\#"),
            '%' => out.push_str(r"\%"),
            '_' => out.push_str(r"\_"),
            '^' => out.push_str(r"\textasciicircum{}"),
            '~' => out.push_str(r"\textasciitilde{}"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_unchanged() {
        assert_eq!(escape_latex("time (s)"), "time (s)");
    }

    #[test]
    fn specials_escaped() {
        assert_eq!(escape_latex("50% & more"), r"50\% \& more");
        assert_eq!(escape_latex("v_0"), r"v\_0");
        assert_eq!(escape_latex("$x^2$"), r"\$x\textasciicircum{}2\$");
        assert_eq!(escape_latex(r"a\b"), r"a\textbackslash{}b");
        assert_eq!(escape_latex("{#~}"), r"\{\#\textasciitilde{}\}");
    }
}
