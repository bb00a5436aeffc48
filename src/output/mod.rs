use serde::Serialize;

use crate::api::{Car, CarsPage};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Xml,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "xml" => Some(Self::Xml),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".xml") {
        return Some(OutputFormat::Xml);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

#[derive(Clone, Debug, Serialize)]
pub struct OutputRecord {
    pub id: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: i64,
    pub mileage: i64,
    pub engine_type: String,
    pub engine_volume: f64,
    pub transmission: String,
    pub location: String,
    pub url: String,
    pub image_url: Option<String>,
    pub created_at: Option<String>,
}

impl From<&Car> for OutputRecord {
    fn from(car: &Car) -> Self {
        Self {
            id: car.id.clone(),
            make: car.make.clone(),
            model: car.model.clone(),
            year: car.year,
            price: car.price,
            mileage: car.mileage,
            engine_type: car.engine_type.clone(),
            engine_volume: car.engine_volume,
            transmission: car.transmission.clone(),
            location: car.location.clone(),
            url: car.url.clone(),
            image_url: car.image_url.clone(),
            created_at: car.created_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct OutputPage {
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
    pub cars: Vec<OutputRecord>,
}

pub fn build_page(page: &CarsPage) -> OutputPage {
    OutputPage {
        page: page.page,
        total_pages: page.total_pages,
        total: page.total,
        cars: page.data.iter().map(OutputRecord::from).collect(),
    }
}

pub fn render_text(page: &OutputPage) -> Vec<u8> {
    let mut out = String::new();
    for r in &page.cars {
        out.push_str(&format!(
            "{}\t{} {}\t{}\t{}\t{}\n",
            r.id, r.make, r.model, r.year, r.price, r.url
        ));
    }
    out.into_bytes()
}

pub fn render_json(page: &OutputPage) -> Vec<u8> {
    serde_json::to_vec_pretty(page).unwrap_or_else(|_| b"{}\n".to_vec())
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub fn render_xml(page: &OutputPage) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    out.push('\n');
    out.push_str(&format!(
        "<cars page=\"{}\" total_pages=\"{}\" total=\"{}\">\n",
        page.page, page.total_pages, page.total
    ));
    for r in &page.cars {
        out.push_str(&format!("  <car id=\"{}\">\n", escape_xml(&r.id)));
        let text_fields = [
            ("make", &r.make),
            ("model", &r.model),
            ("engine_type", &r.engine_type),
            ("transmission", &r.transmission),
            ("location", &r.location),
            ("url", &r.url),
        ];
        for (tag, value) in text_fields {
            out.push_str(&format!("    <{tag}>{}</{tag}>\n", escape_xml(value)));
        }
        out.push_str(&format!("    <year>{}</year>\n", r.year));
        out.push_str(&format!("    <price>{}</price>\n", r.price));
        out.push_str(&format!("    <mileage>{}</mileage>\n", r.mileage));
        out.push_str(&format!(
            "    <engine_volume>{}</engine_volume>\n",
            r.engine_volume
        ));
        if let Some(image) = r.image_url.as_deref() {
            out.push_str(&format!("    <image_url>{}</image_url>\n", escape_xml(image)));
        }
        if let Some(created) = r.created_at.as_deref() {
            out.push_str(&format!("    <created_at>{created}</created_at>\n"));
        }
        out.push_str("  </car>\n");
    }
    out.push_str("</cars>\n");
    out.into_bytes()
}

pub fn render(page: &CarsPage, format: OutputFormat) -> Vec<u8> {
    let page = build_page(page);
    match format {
        OutputFormat::Text => render_text(&page),
        OutputFormat::Json => render_json(&page),
        OutputFormat::Xml => render_xml(&page),
    }
}
