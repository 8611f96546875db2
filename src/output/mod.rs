use serde::Serialize;

use crate::model::{AnalysisRecord, AnalysisRequest};

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
    pub perf_id: String,
    pub timestamp: String,
    pub sequence: u32,
    pub parameter: String,
    pub unit_of_measure: String,
    pub reference_value: f64,
    pub observed_value: f64,
    pub gap: f64,
}

pub fn build_records(request: &AnalysisRequest, records: &[AnalysisRecord]) -> Vec<OutputRecord> {
    records
        .iter()
        .map(|r| OutputRecord {
            perf_id: request.performance_id.clone(),
            timestamp: request.timestamp.clone(),
            sequence: r.sequence,
            parameter: r.parameter.clone(),
            unit_of_measure: r.unit_of_measure.clone(),
            reference_value: r.reference_value,
            observed_value: r.observed_value,
            gap: r.gap,
        })
        .collect()
}

pub fn render_text(records: &[OutputRecord]) -> Vec<u8> {
    let mut out = String::new();
    for r in records {
        out.push_str(&format!(
            "{}\t{}\t{}\t{:.3}\t{:.3}\t{:+.3}\n",
            r.sequence, r.parameter, r.unit_of_measure, r.reference_value, r.observed_value, r.gap
        ));
    }
    out.into_bytes()
}

pub fn render_json(records: &[OutputRecord]) -> Vec<u8> {
    serde_json::to_vec_pretty(records).unwrap_or_else(|_| b"[]\n".to_vec())
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub fn render_xml(records: &[OutputRecord]) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    out.push('\n');
    out.push_str("<records>\n");
    for r in records {
        out.push_str("  <record>\n");
        out.push_str(&format!(
            "    <perf_id>{}</perf_id>\n",
            escape_xml(&r.perf_id)
        ));
        out.push_str(&format!(
            "    <timestamp>{}</timestamp>\n",
            escape_xml(&r.timestamp)
        ));
        out.push_str(&format!("    <sequence>{}</sequence>\n", r.sequence));
        out.push_str(&format!(
            "    <parameter>{}</parameter>\n",
            escape_xml(&r.parameter)
        ));
        out.push_str(&format!(
            "    <unit_of_measure>{}</unit_of_measure>\n",
            escape_xml(&r.unit_of_measure)
        ));
        out.push_str(&format!(
            "    <reference_value>{}</reference_value>\n",
            r.reference_value
        ));
        out.push_str(&format!(
            "    <observed_value>{}</observed_value>\n",
            r.observed_value
        ));
        out.push_str(&format!("    <gap>{}</gap>\n", r.gap));
        out.push_str("  </record>\n");
    }
    out.push_str("</records>\n");
    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<OutputRecord> {
        let request = AnalysisRequest::new("PLTU-3", "2024-03-01 07:30:00");
        let records = vec![AnalysisRecord::new(
            1,
            1,
            "Generator <Output>",
            "MW",
            660.0,
            648.5,
        )];
        build_records(&request, &records)
    }

    #[test]
    fn format_parse_and_inference() {
        assert_eq!(OutputFormat::parse("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("txt"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::parse("html"), None);
        assert_eq!(
            infer_format_from_path("./report.xml"),
            Some(OutputFormat::Xml)
        );
        assert_eq!(infer_format_from_path("report"), None);
    }

    #[test]
    fn text_rendition_is_one_row_per_line() {
        let out = String::from_utf8(render_text(&sample())).unwrap();
        assert!(out.contains("Generator <Output>"));
        assert!(out.contains("-11.500"));
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn xml_rendition_escapes_markup() {
        let out = String::from_utf8(render_xml(&sample())).unwrap();
        assert!(out.contains("Generator &lt;Output&gt;"));
        assert!(out.contains("<perf_id>PLTU-3</perf_id>"));
    }

    #[test]
    fn json_rendition_round_trips() {
        let out = render_json(&sample());
        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed[0]["gap"].as_f64().unwrap(), -11.5);
    }
}
