use std::time::Duration;

use tracing::{debug, warn};

use crate::tool::{self, ToolCommand};
use crate::{PipelineConfig, RenderError};

const PREAMBLE: &str = r"\documentclass[11pt]{article}
\usepackage{amsmath, amssymb}
\usepackage{graphicx}
\usepackage{hyperref}
\usepackage{booktabs}
\begin{document}
";

const MATHJAX: &str = r#"<script>
window.MathJax = {
  tex: { inlineMath: [['$', '$'], ['\\(', '\\)']] },
  svg: { fontCache: 'global' }
};
</script>
<script async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-svg.js"></script>
"#;

const STYLE: &str = r#"<style>
  .lab-content {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif;
    line-height: 1.6;
    max-width: 800px;
    margin: 0 auto;
  }
  .lab-content h1, .lab-content h2, .lab-content h3 {
    margin-top: 1.5rem;
    margin-bottom: 0.5rem;
  }
  .lab-content p {
    margin: 0.4rem 0;
  }
</style>
"#;

/// Instructions ready for display.
#[derive(Debug, Clone)]
pub struct ConvertedHtml {
    pub html: String,
    /// `false` when the converter failed and `html` carries the error panel.
    pub converted: bool,
}

/// Turns lab instruction LaTeX into a self-contained HTML fragment.
#[derive(Debug, Clone)]
pub struct HtmlConverter {
    pandoc: String,
    timeout: Duration,
}

impl HtmlConverter {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            pandoc: config.pandoc.clone(),
            timeout: config.convert_timeout,
        }
    }

    /// Convert instruction source. Never fails: converter errors are rendered
    /// into the returned HTML so the student still sees the raw source.
    pub async fn convert(&self, tex_source: &str) -> ConvertedHtml {
        let (body, converted) = match self.run_pandoc(tex_source).await {
            Ok(html) => (html, true),
            Err(e) => {
                warn!("LaTeX to HTML conversion failed: {e}");
                (error_panel(&e.to_string(), tex_source), false)
            }
        };
        ConvertedHtml {
            html: wrap_fragment(&body),
            converted,
        }
    }

    async fn run_pandoc(&self, tex_source: &str) -> Result<String, RenderError> {
        // Removed when `input` drops, on every path out of this function.
        let input = tempfile::Builder::new()
            .prefix("labdesk-")
            .suffix(".tex")
            .tempfile()?;
        tokio::fs::write(input.path(), wrap_document(tex_source)).await?;

        let cmd = ToolCommand::new(&self.pandoc, self.timeout)
            .arg(input.path())
            .args([
                "--from=latex",
                "--to=html",
                "--mathjax",
                "--embed-resources",
                "--strip-comments",
            ]);
        let output = tool::run(&cmd).await?;
        debug!(bytes = output.stdout.len(), "pandoc produced html");
        String::from_utf8(output.stdout).map_err(|_| RenderError::InvalidOutput(self.pandoc.clone()))
    }
}

/// Embed instruction source in a minimal article so the converter accepts it.
pub fn wrap_document(tex_source: &str) -> String {
    format!("{PREAMBLE}{tex_source}\n\\end{{document}}\n")
}

fn error_panel(error: &str, tex_source: &str) -> String {
    format!(
        "<div style=\"border:1px solid #f00; padding:0.5rem;\">\n  \
         <strong>LaTeX rendering error:</strong> {}<br/>\n  \
         <pre>{}</pre>\n</div>\n",
        html_escape::encode_text(error),
        html_escape::encode_text(tex_source),
    )
}

fn wrap_fragment(body: &str) -> String {
    format!("{MATHJAX}{STYLE}\n<div class=\"lab-content\">\n{body}\n</div>\n")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::test_helpers::fake_tool;

    fn converter(pandoc: &str) -> HtmlConverter {
        HtmlConverter::new(&PipelineConfig {
            pandoc: pandoc.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn document_wrapper_has_preamble_and_end() {
        let doc = wrap_document(r"\section{Pendulum}");
        assert!(doc.starts_with(r"\documentclass[11pt]{article}"));
        assert!(doc.contains(r"\usepackage{booktabs}"));
        assert!(doc.contains("\\begin{document}\n\\section{Pendulum}\n\\end{document}\n"));
    }

    #[tokio::test]
    async fn converted_output_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let pandoc = fake_tool(dir.path(), "pandoc", r#"echo "<h1>Pendulum</h1>""#);

        let out = converter(&pandoc).convert(r"\section{Pendulum}").await;
        assert!(out.converted);
        assert!(out.html.contains("window.MathJax"));
        assert!(out.html.contains("tex-svg.js"));
        assert!(out.html.contains(".lab-content {"));
        assert!(out.html.contains("<div class=\"lab-content\">\n<h1>Pendulum</h1>"));
    }

    #[tokio::test]
    async fn pandoc_receives_wrapped_document_and_flags() {
        let dir = tempfile::tempdir().unwrap();
        // Echo the input file and the flags back as the "html".
        let pandoc = fake_tool(dir.path(), "pandoc", r#"cat "$1"; shift; echo "$@""#);

        let out = converter(&pandoc).convert("Measure $T$.").await;
        assert!(out.converted);
        assert!(out.html.contains("\\begin{document}\nMeasure $T$.\n\\end{document}"));
        assert!(out
            .html
            .contains("--from=latex --to=html --mathjax --embed-resources --strip-comments"));
    }

    #[tokio::test]
    async fn temp_input_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let record = dir.path().join("input-path");
        let script = format!(r#"echo "$1" > "{}"; echo ok"#, record.display());
        let pandoc = fake_tool(dir.path(), "pandoc", &script);

        converter(&pandoc).convert("x").await;
        let input = std::fs::read_to_string(&record).unwrap();
        assert!(!std::path::Path::new(input.trim()).exists());
    }

    #[tokio::test]
    async fn failure_shows_escaped_source() {
        let dir = tempfile::tempdir().unwrap();
        let pandoc = fake_tool(dir.path(), "pandoc", "echo 'unexpected <eof>' >&2; exit 64");

        let out = converter(&pandoc).convert(r"\frac{a<b}{c}").await;
        assert!(!out.converted);
        assert!(out.html.contains("LaTeX rendering error:"));
        assert!(out.html.contains("unexpected &lt;eof&gt;"));
        assert!(out.html.contains(r"<pre>\frac{a&lt;b}{c}</pre>"));
        assert!(out.html.contains("<div class=\"lab-content\">"));
    }

    #[tokio::test]
    async fn missing_converter_falls_back() {
        let out = converter("labdesk-missing-pandoc").convert("hello").await;
        assert!(!out.converted);
        assert!(out.html.contains("labdesk-missing-pandoc is not installed"));
        assert!(out.html.contains("<pre>hello</pre>"));
    }
}
