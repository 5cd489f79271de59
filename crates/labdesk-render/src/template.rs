use labdesk_core::ReportSubmission;
use serde_json::{Map, Value};
use tera::{Context, Tera};

use crate::RenderError;

const NAME: &str = "report.tex";

/// Upper bound on missing variables filled in for one render.
const MAX_UNDEFINED: usize = 64;

/// A lab's LaTeX report template, Jinja syntax.
///
/// Variables the submission does not provide render as empty text, the way
/// Jinja's default `Undefined` does.
pub struct ReportTemplate {
    tera: Tera,
}

impl ReportTemplate {
    pub fn parse(source: &str) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        // LaTeX output: HTML escaping would corrupt it.
        tera.autoescape_on(vec![]);
        tera.add_raw_template(NAME, source)?;
        Ok(Self { tera })
    }

    pub fn render(&self, submission: &ReportSubmission) -> Result<String, RenderError> {
        let mut values = submission.template_context();
        let mut filled = 0;
        loop {
            let ctx = Context::from_value(Value::Object(values.clone()))?;
            let err = match self.tera.render(NAME, &ctx) {
                Ok(tex) => return Ok(tex),
                Err(e) => e,
            };
            match undefined_variable(&err) {
                Some(path) if filled < MAX_UNDEFINED && insert_empty(&mut values, &path) => {
                    filled += 1;
                }
                _ => return Err(err.into()),
            }
        }
    }
}

/// The dotted path tera could not resolve, if that is why rendering failed.
fn undefined_variable(err: &tera::Error) -> Option<String> {
    let mut source: Option<&dyn std::error::Error> = Some(err);
    while let Some(e) = source {
        let msg = e.to_string();
        if let Some(rest) = msg.strip_prefix("Variable `") {
            if let Some((path, _)) = rest.split_once("` not found in context") {
                return Some(path.to_string());
            }
        }
        source = e.source();
    }
    None
}

/// Set `path` (`a` or `a.b.c`) to an empty string, creating objects on the way.
/// Returns `false` when nothing could be added, e.g. the path is already set
/// (a loop variable shadows it) or goes through a non-object value.
fn insert_empty(values: &mut Map<String, Value>, path: &str) -> bool {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    if head.is_empty() || head.contains('[') {
        return false;
    }
    match rest {
        None => {
            if values.contains_key(head) {
                return false;
            }
            values.insert(head.to_string(), Value::String(String::new()));
            true
        }
        Some(rest) => match values
            .entry(head)
            .or_insert_with(|| Value::Object(Map::new()))
        {
            Value::Object(inner) => insert_empty(inner, rest),
            _ => false,
        },
    }
}
