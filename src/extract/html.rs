//! DOM snapshot backed by the `scraper` HTML parser.

use scraper::{ElementRef, Html, Node, Selector};
use serde_json::Value;

use super::{Document, Probe};

/// Elements that start a new line when text is flattened, mirroring how a
/// browser lays out `innerText`.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "footer", "form",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre",
    "section", "table", "tr", "ul",
];

const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

const HEADING_CSS: &str = "h1, h2, h3, h4, h5, h6, div";

/// A parsed page. Not `Send`: build it, probe it, and drop it without
/// holding it across an await point.
pub struct HtmlDocument {
    html: Html,
    json_ld: Vec<Value>,
}

impl HtmlDocument {
    pub fn parse(source: &str) -> Self {
        let html = Html::parse_document(source);
        let json_ld = collect_json_ld(&html);
        Self { html, json_ld }
    }

    fn select(&self, css: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(css) {
            Ok(sel) => self.html.select(&sel).collect(),
            Err(e) => {
                tracing::warn!("Invalid selector {css:?}: {e}");
                Vec::new()
            }
        }
    }

    fn first(&self, css: &str) -> Option<ElementRef<'_>> {
        self.select(css).into_iter().next()
    }

    /// The `JobPosting` object if one is declared, otherwise the first JSON-LD object.
    fn job_posting(&self) -> Option<&Value> {
        self.json_ld
            .iter()
            .find(|v| is_job_posting(v))
            .or_else(|| self.json_ld.first())
    }

    fn sibling_of_heading(&self, heading: &str, sep: Option<&str>) -> Option<String> {
        let wanted = heading.to_uppercase();
        let header = self
            .select(HEADING_CSS)
            .into_iter()
            .find(|el| inline_text(*el).to_uppercase() == wanted)?;
        let next = header.next_siblings().find_map(ElementRef::wrap)?;
        let text = block_text(next);
        Some(match sep {
            Some(sep) => text
                .lines()
                .filter(|l| l.chars().count() > 1)
                .collect::<Vec<_>>()
                .join(sep),
            None => text,
        })
    }

    fn criteria(&self, item: &str, label: &str, value: &str, keys: &[&str]) -> Option<String> {
        let label_sel = Selector::parse(label).ok()?;
        let value_sel = Selector::parse(value).ok()?;
        self.select(item).into_iter().find_map(|el| {
            let label = el.select(&label_sel).next().map(inline_text)?.to_lowercase();
            if !keys.iter().any(|k| label.contains(k)) {
                return None;
            }
            el.select(&value_sel)
                .next()
                .map(inline_text)
                .filter(|v| !v.is_empty())
        })
    }

    fn json_ld_salary(&self) -> Option<String> {
        let salary = first_item(self.job_posting()?.get("baseSalary")?)?;
        let value = salary.get("value").and_then(first_item);

        let (min, max, single, unit) = match value {
            Some(Value::Object(v)) => (
                v.get("minValue").and_then(number),
                v.get("maxValue").and_then(number),
                v.get("value").and_then(number),
                v.get("unitText").and_then(Value::as_str),
            ),
            Some(other) => (None, None, number(other), None),
            None => (None, None, None, None),
        };

        let mut out = match (min, max, single) {
            (Some(min), Some(max), _) if min != max => format!("{min} - {max}"),
            (Some(min), _, _) => min,
            (None, Some(max), _) => max,
            (None, None, Some(single)) => single,
            (None, None, None) => return None,
        };
        if let Some(currency) = salary.get("currency").and_then(Value::as_str) {
            out.push(' ');
            out.push_str(currency);
        }
        if let Some(unit) = unit {
            out.push_str(" per ");
            out.push_str(&unit.to_lowercase());
        }
        Some(out)
    }
}

impl Document for HtmlDocument {
    fn probe(&self, probe: &Probe) -> Option<String> {
        match *probe {
            Probe::Text(css) => self.first(css).map(inline_text),
            Probe::Block(css) => self.first(css).map(block_text),
            Probe::Parent(css) => self
                .first(css)
                .and_then(|el| el.parent())
                .and_then(ElementRef::wrap)
                .map(inline_text),
            Probe::All { css, sep } => non_empty_join(self.select(css).into_iter().map(inline_text), sep),
            Probe::Attr { css, attr } => self
                .first(css)
                .and_then(|el| el.value().attr(attr))
                .map(|v| v.trim().to_string()),
            Probe::Chip { css, words } => self
                .select(css)
                .into_iter()
                .map(inline_text)
                .find(|t| words.contains(&t.as_str())),
            Probe::Sibling { heading, sep } => self.sibling_of_heading(heading, sep),
            Probe::Criteria {
                item,
                label,
                value,
                keys,
            } => self.criteria(item, label, value, keys),
            Probe::Keyword { css, needles } => self.select(css).into_iter().map(inline_text).find(|text| {
                let lower = text.to_lowercase();
                needles.iter().any(|needle| lower.contains(needle))
            }),
            Probe::JsonLd { paths, sep } => {
                let posting = self.job_posting()?;
                non_empty_join(
                    paths
                        .iter()
                        .filter_map(|path| lookup(posting, path))
                        .filter_map(scalar),
                    sep,
                )
            }
            Probe::JsonLdSalary => self.json_ld_salary(),
            Probe::Join { parts, sep } => {
                non_empty_join(parts.iter().filter_map(|p| self.probe(p)), sep)
            }
            Probe::Prefixed { prefix, inner } => self
                .probe(inner)
                .filter(|v| !v.trim().is_empty())
                .map(|v| format!("{prefix}{v}")),
        }
    }
}

fn non_empty_join(parts: impl Iterator<Item = String>, sep: &str) -> Option<String> {
    let parts: Vec<String> = parts
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(sep))
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn walk(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(e) => {
                let name = e.name();
                if HIDDEN_TAGS.contains(&name) {
                    continue;
                }
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    walk(child_el, out);
                }
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Visible text with one line per block element.
pub(crate) fn block_text(el: ElementRef<'_>) -> String {
    let mut raw = String::new();
    walk(el, &mut raw);
    raw.lines()
        .map(collapse_whitespace)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Visible text on a single line.
pub(crate) fn inline_text(el: ElementRef<'_>) -> String {
    block_text(el).replace('\n', " ")
}

fn collect_json_ld(html: &Html) -> Vec<Value> {
    let Ok(sel) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for script in html.select(&sel) {
        let text: String = script.text().collect();
        match serde_json::from_str::<Value>(text.trim()) {
            Ok(value) => flatten_json_ld(value, &mut out),
            Err(e) => tracing::debug!("Skipping malformed JSON-LD block: {e}"),
        }
    }
    out
}

fn flatten_json_ld(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => items.into_iter().for_each(|v| flatten_json_ld(v, out)),
        Value::Object(mut obj) => {
            if let Some(Value::Array(graph)) = obj.remove("@graph") {
                graph.into_iter().for_each(|v| flatten_json_ld(v, out));
            }
            if !obj.is_empty() {
                out.push(Value::Object(obj));
            }
        }
        _ => {}
    }
}

fn is_job_posting(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => t == "JobPosting",
        Some(Value::Array(types)) => types.iter().any(|t| t == "JobPosting"),
        _ => false,
    }
}

fn first_item(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.first(),
        other => Some(other),
    }
}

fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(root, |v, key| first_item(v)?.get(*key))
        .and_then(first_item)
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(_) => number(value),
        _ => None,
    }
}

fn number(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 => Some(format!("{}", f as i64)),
            _ => Some(n.to_string()),
        },
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}
