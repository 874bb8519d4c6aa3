use std::fmt::Write;

use crate::errors::InternalError;
use crate::types::internal::ReportSnapshot;

/// Renders a frozen snapshot into presentational markup.
///
/// Must be deterministic: identical snapshots render to identical strings.
pub trait ReportRenderer: Send + Sync {
    fn render(&self, snapshot: &ReportSnapshot) -> Result<String, InternalError>;
}

/// Plain HTML certificate renderer.
pub struct CertificateRenderer;

impl ReportRenderer for CertificateRenderer {
    fn render(&self, snapshot: &ReportSnapshot) -> Result<String, InternalError> {
        let mut out = String::with_capacity(2048);

        out.push_str("<!DOCTYPE html>\n<html>\n<head><title>Certificate of Analysis</title></head>\n<body>\n");
        let _ = writeln!(out, "<h1>Certificate of Analysis — Version {}</h1>", snapshot.version);
        let _ = writeln!(out, "<p>Job: {}</p>", escape(&snapshot.job_code));
        let _ = writeln!(out, "<p>Sample: {}</p>", escape(&snapshot.sample_name));
        let _ = writeln!(out, "<p>Matrix: {}</p>", escape(&snapshot.matrix));
        if let Some(temperature) = snapshot.temperature {
            let _ = writeln!(out, "<p>Temperature: {} &deg;C</p>", temperature);
        }
        if let Some(condition) = &snapshot.condition {
            let _ = writeln!(out, "<p>Condition: {}</p>", escape(condition));
        }
        if let Some(received_at) = &snapshot.received_at {
            let _ = writeln!(out, "<p>Received: {}</p>", escape(received_at));
        }
        let _ = writeln!(out, "<p>Generated: {} by {}</p>", snapshot.generated_at, escape(&snapshot.generated_by));

        out.push_str("<table>\n<tr><th>Method</th><th>Result</th><th>Unit</th><th>Limits</th><th>OOS</th></tr>\n");
        for line in &snapshot.lines {
            let result = line
                .result_value
                .map(|v| v.to_string())
                .unwrap_or_else(|| "—".to_string());
            let unit = line.unit.as_deref().unwrap_or("");
            let limits = format_limits(&line.comparator, line.limit_low, line.limit_high);
            let oos = if line.out_of_spec { "OOS" } else { "" };
            let _ = writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&line.method),
                result,
                escape(unit),
                limits,
                oos
            );
        }
        out.push_str("</table>\n</body>\n</html>\n");

        Ok(out)
    }
}

fn format_limits(comparator: &str, low: Option<f64>, high: Option<f64>) -> String {
    let low = low.map(|v| v.to_string()).unwrap_or_else(|| "—".to_string());
    let high = high.map(|v| v.to_string()).unwrap_or_else(|| "—".to_string());
    match comparator {
        "GTE" => format!("&ge; {}", low),
        "LTE" => format!("&le; {}", high),
        "EQUALS" => format!("= {}", low),
        "RANGE" => format!("{} – {}", low, high),
        other => other.to_string(),
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
