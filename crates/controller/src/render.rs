//! Views of the drawer, rendered with [upon] templates.
//!
//! Two HTML fragments (the read-only summary and the edit form) and a plain
//! text summary for terminals. Every value that reaches an HTML template goes
//! through the `escape` formatter; the text template prints values as they
//! are.

use crate::error::{ErrorKind, Result};
use crate::summary::Summary;
use exn::ResultExt;
use filestation_integrity::EditForm;
use serde::Serialize;
use upon::{Engine, Template};

const SUMMARY_HTML: &str = r#"<section class="metadata" data-path="{{ path|escape }}">
<h3>General</h3>
<dl class="general">
{%- for field in general %}
<dt>{{ field.key|escape }}</dt><dd>{{ field.value|escape }}</dd>
{%- endfor %}
</dl>
<h3>Hashes</h3>
<dl class="hashes">
{%- for line in hashes %}
<dt>{{ line.algorithm|escape }}</dt><dd><code>{{ line.value|escape }}</code> <span class="verdict {{ line.verdict }}" style="color: {{ line.colour }}">{{ line.symbol }}</span></dd>
{%- endfor %}
</dl>
<h3>RDS</h3>
<dl class="rds">
{%- for field in rds %}
<dt>{{ field.key|escape }}</dt><dd>{{ field.value|escape }}</dd>
{%- endfor %}
</dl>
</section>
"#;

const FORM_HTML: &str = r#"<form class="metadata-edit" data-path="{{ path|escape }}">
{%- for field in fields %}
<label>{{ field.key|escape }} <input type="text" name="{{ field.key|escape }}" value="{{ field.value|escape }}"></label>
{%- endfor %}
</form>
"#;

const SUMMARY_TEXT: &str = "{{ path }}
General
{%- for field in general %}
  {{ field.key }}: {{ field.value }}
{%- endfor %}
Hashes
{%- for line in hashes %}
  {{ line.symbol }} {{ line.algorithm }}: {{ line.value }}
{%- endfor %}
RDS
{%- for field in rds %}
  {{ field.key }}: {{ field.value }}
{%- endfor %}
";

#[derive(Serialize)]
struct Field<'a> {
    key: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct Line<'a> {
    algorithm: &'a str,
    value: &'a str,
    verdict: &'static str,
    symbol: &'static str,
    colour: &'static str,
}

#[derive(Serialize)]
struct SummaryContext<'a> {
    path: &'a str,
    general: Vec<Field<'a>>,
    hashes: Vec<Line<'a>>,
    rds: Vec<Field<'a>>,
}
impl<'a> SummaryContext<'a> {
    fn new(summary: &'a Summary, missing: &'a str) -> Self {
        Self {
            path: &summary.path,
            general: summary.general.iter().map(|(key, value)| Field { key, value }).collect(),
            hashes: summary
                .hashes
                .iter()
                .map(|line| Line {
                    algorithm: line.algorithm.as_str(),
                    value: line.value.as_deref().unwrap_or(missing),
                    verdict: line.verdict.as_str(),
                    symbol: line.verdict.symbol(),
                    colour: line.verdict.colour(),
                })
                .collect(),
            rds: summary
                .rds
                .iter()
                .map(|(key, value)| Field {
                    key,
                    value: value.as_deref().unwrap_or(missing),
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct FormContext<'a> {
    path: &'a str,
    fields: Vec<Field<'a>>,
}

/// Compiled drawer templates, reusable across renders.
pub struct Views {
    engine: Engine<'static>,
    summary_html: Template<'static>,
    form_html: Template<'static>,
    summary_text: Template<'static>,
}
impl Views {
    pub fn new() -> Result<Self> {
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        let summary_html = engine.compile(SUMMARY_HTML).or_raise(|| ErrorKind::Template)?;
        let form_html = engine.compile(FORM_HTML).or_raise(|| ErrorKind::Template)?;
        let summary_text = engine.compile(SUMMARY_TEXT).or_raise(|| ErrorKind::Template)?;
        Ok(Self {
            engine,
            summary_html,
            form_html,
            summary_text,
        })
    }

    /// The read-only drawer as an HTML fragment. Missing values render empty.
    pub fn summary_html(&self, summary: &Summary) -> Result<String> {
        let ctx = SummaryContext::new(summary, "");
        self.summary_html.render(&self.engine, &ctx).to_string().or_raise(|| ErrorKind::Template)
    }

    /// The read-only drawer for a terminal. Missing values show as `-`.
    pub fn summary_text(&self, summary: &Summary) -> Result<String> {
        let ctx = SummaryContext::new(summary, "-");
        self.summary_text.render(&self.engine, &ctx).to_string().or_raise(|| ErrorKind::Template)
    }

    /// The edit form, filled with the form's current values.
    pub fn form_html(&self, path: &str, form: &EditForm) -> Result<String> {
        let ctx = FormContext {
            path,
            fields: form.fields().iter().map(|f| Field { key: &f.key, value: &f.value }).collect(),
        };
        self.form_html.render(&self.engine, &ctx).to_string().or_raise(|| ErrorKind::Template)
    }
}

mod addons {
    use std::fmt::Write;
    use upon::{Engine, Value, fmt as upon_fmt};

    /// Escapes text for use in HTML element content and quoted attributes.
    fn escape_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => {
                for c in s.chars() {
                    match c {
                        '&' => f.write_str("&amp;")?,
                        '<' => f.write_str("&lt;")?,
                        '>' => f.write_str("&gt;")?,
                        '"' => f.write_str("&quot;")?,
                        '\'' => f.write_str("&#x27;")?,
                        c => f.write_char(c)?,
                    }
                }
            },
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    pub(crate) fn configure(engine: &mut Engine<'_>) {
        engine.add_formatter("escape", escape_formatter);
    }
}
