//! Specification table shown on product pages.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Notebook, Product, Smartphone};

pub const SD_MAX_CAPACITY_LABEL: &str = "SD max capacity";

type Field<T> = (&'static str, fn(&T) -> String);

const NOTEBOOK_FIELDS: &[Field<Notebook>] = &[
    ("Diagonal", |n| n.diagonal.clone()),
    ("Display type", |n| n.display_type.clone()),
    ("Processor frequency", |n| n.processor_freq.clone()),
    ("RAM", |n| n.ram.clone()),
    ("Video card", |n| n.video_card.clone()),
    ("Battery capacity", |n| n.battery_capacity.clone()),
];

const SMARTPHONE_FIELDS: &[Field<Smartphone>] = &[
    ("Diagonal", |s| s.diagonal.clone()),
    ("Display type", |s| s.display_type.clone()),
    ("Screen resolution", |s| s.resolution.clone()),
    ("Battery capacity", |s| s.battery_capacity.clone()),
    ("RAM", |s| s.ram.clone()),
    ("SD", |s| yes_no(s.sd).to_string()),
    (SD_MAX_CAPACITY_LABEL, |s| s.sd_max_volume.clone().unwrap_or_default()),
    ("Main camera", |s| s.camera_main.clone()),
    ("Frontal camera", |s| s.camera_frontal.clone()),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SpecRow {
    pub name: String,
    pub value: String,
}

/// Ordered specification rows for `product`.
///
/// Smartphones without an SD slot get no "SD max capacity" row.
pub fn product_spec(product: &Product) -> Vec<SpecRow> {
    match product {
        Product::Notebook(notebook) => rows(NOTEBOOK_FIELDS, notebook, |_| true),
        Product::Smartphone(phone) => rows(SMARTPHONE_FIELDS, phone, |name| {
            phone.sd || name != SD_MAX_CAPACITY_LABEL
        }),
    }
}

fn rows<T>(fields: &[Field<T>], item: &T, include: impl Fn(&str) -> bool) -> Vec<SpecRow> {
    fields
        .iter()
        .filter(|&&(name, _)| include(name))
        .map(|&(name, read)| SpecRow {
            name: name.to_string(),
            value: read(item),
        })
        .collect()
}

/// Render rows as the HTML table embedded in product pages.
pub fn render_spec_table(rows: &[SpecRow]) -> String {
    let mut html = String::from("<table class=\"table\"><tbody>");
    for row in rows {
        html.push_str("<tr><td>");
        html.push_str(&escape_html(&row.name));
        html.push_str("</td><td>");
        html.push_str(&escape_html(&row.value));
        html.push_str("</td></tr>");
    }
    html.push_str("</tbody></table>");
    html
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
