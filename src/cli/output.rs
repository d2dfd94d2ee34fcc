use std::fmt::Write as FmtWrite;

use crate::models::{IndexingReport, OutputFormat, SearchResults};
use crate::services::AgentAnswer;

pub trait Formatter {
    fn format_search_results(&self, results: &SearchResults) -> String;
    fn format_index_report(&self, report: &IndexingReport) -> String;
    fn format_answer(&self, answer: &AgentAnswer) -> String;
    fn format_status(&self, status: &StatusInfo) -> String;
    fn format_message(&self, message: &str) -> String;
    fn format_error(&self, error: &str) -> String;
}

#[derive(Debug, Clone)]
pub struct StatusInfo {
    pub vector_store_driver: String,
    pub vector_store_url: String,
    pub vector_store_connected: bool,
    pub vector_store_points: u64,
    pub collection: String,
    pub embedding_model: String,
    pub chat_provider: String,
    pub chat_model: String,
    pub chat_ready: bool,
}

fn preview(text: &str, max_chars: usize) -> String {
    let head: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        format!("{}...", head)
    } else {
        head
    }
}

pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_search_results(&self, results: &SearchResults) -> String {
        if results.is_empty() {
            return format!("No products found for: {}\n", results.query);
        }

        let mut output = String::new();
        writeln!(output, "Search results for: \"{}\"", results.query).unwrap();
        writeln!(
            output,
            "Found {} products in {}ms\n",
            results.len(),
            results.duration_ms
        )
        .unwrap();

        for (i, hit) in results.results.iter().enumerate() {
            writeln!(
                output,
                "{}. [Score: {:.3}] {}",
                i + 1,
                hit.score,
                hit.sku().unwrap_or("-")
            )
            .unwrap();
            writeln!(output, "   ---").unwrap();
            for line in preview(&hit.text, 300).lines() {
                writeln!(output, "   {}", line).unwrap();
            }
            writeln!(output).unwrap();
        }

        output
    }

    fn format_index_report(&self, report: &IndexingReport) -> String {
        let mut output = String::new();
        writeln!(output, "Indexing Complete").unwrap();
        writeln!(output, "-----------------").unwrap();
        writeln!(output, "Products:   {}", report.total).unwrap();
        writeln!(output, "Indexed:    {}", report.indexed).unwrap();
        writeln!(output, "Errors:     {}", report.errors).unwrap();
        writeln!(output, "Duration:   {:.2}s", report.duration_seconds).unwrap();
        writeln!(output, "Throughput: {:.1} products/s", report.products_per_second).unwrap();
        if !report.failures.is_empty() {
            writeln!(output, "\nFailures:").unwrap();
            for failure in &report.failures {
                writeln!(output, "  {} - {}", failure.sku, failure.reason).unwrap();
            }
        }
        output
    }

    fn format_answer(&self, answer: &AgentAnswer) -> String {
        let mut output = String::new();
        writeln!(output, "{}", answer.answer.trim_end()).unwrap();
        if !answer.hits.is_empty() {
            writeln!(output, "\nSources:").unwrap();
            for hit in &answer.hits {
                writeln!(
                    output,
                    "  {} (score {:.3})",
                    hit.sku().unwrap_or("-"),
                    hit.score
                )
                .unwrap();
            }
        }
        output
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        let mut output = String::new();
        writeln!(output, "Status").unwrap();
        writeln!(output, "------").unwrap();

        let vector_status = if status.vector_store_connected {
            "[CONNECTED]"
        } else {
            "[DISCONNECTED]"
        };
        writeln!(
            output,
            "Vector Store:  {} ({})",
            status.vector_store_driver, vector_status
        )
        .unwrap();
        writeln!(output, "  URL:         {}", status.vector_store_url).unwrap();
        writeln!(output, "  Collection:  {}", status.collection).unwrap();
        if status.vector_store_connected {
            writeln!(output, "  Products:    {}", status.vector_store_points).unwrap();
        }
        writeln!(output).unwrap();

        writeln!(output, "Embedding:     {}", status.embedding_model).unwrap();
        let chat_status = if status.chat_ready {
            "[READY]"
        } else {
            "[NO API KEY]"
        };
        writeln!(
            output,
            "Chat:          {} {} {}",
            status.chat_provider, status.chat_model, chat_status
        )
        .unwrap();

        output
    }

    fn format_message(&self, message: &str) -> String {
        format!("{}\n", message)
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}\n", error)
    }
}

pub struct JsonFormatter {
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render<T: serde::Serialize>(&self, value: &T) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        let mut output =
            rendered.unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string());
        output.push('\n');
        output
    }
}

impl Formatter for JsonFormatter {
    fn format_search_results(&self, results: &SearchResults) -> String {
        self.render(results)
    }

    fn format_index_report(&self, report: &IndexingReport) -> String {
        self.render(report)
    }

    fn format_answer(&self, answer: &AgentAnswer) -> String {
        self.render(answer)
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        let json = serde_json::json!({
            "vector_store": {
                "driver": status.vector_store_driver,
                "url": status.vector_store_url,
                "connected": status.vector_store_connected,
                "collection": status.collection,
                "points": status.vector_store_points,
            },
            "embedding": {
                "model": status.embedding_model,
            },
            "chat": {
                "provider": status.chat_provider,
                "model": status.chat_model,
                "ready": status.chat_ready,
            }
        });
        self.render(&json)
    }

    fn format_message(&self, message: &str) -> String {
        format!("{}\n", serde_json::json!({ "message": message }))
    }

    fn format_error(&self, error: &str) -> String {
        format!("{}\n", serde_json::json!({ "error": error }))
    }
}

pub struct MarkdownFormatter;

impl Formatter for MarkdownFormatter {
    fn format_search_results(&self, results: &SearchResults) -> String {
        if results.is_empty() {
            return format!("## No products found\n\nQuery: `{}`\n", results.query);
        }

        let mut output = String::new();
        writeln!(output, "## Search Results\n").unwrap();
        writeln!(output, "**Query:** `{}`\n", results.query).unwrap();
        writeln!(
            output,
            "Found {} products in {}ms\n",
            results.len(),
            results.duration_ms
        )
        .unwrap();

        for (i, hit) in results.results.iter().enumerate() {
            writeln!(
                output,
                "### {}. `{}` (score {:.3})\n",
                i + 1,
                hit.sku().unwrap_or("-"),
                hit.score
            )
            .unwrap();
            writeln!(output, "```").unwrap();
            writeln!(output, "{}", hit.text).unwrap();
            writeln!(output, "```\n").unwrap();
        }

        output
    }

    fn format_index_report(&self, report: &IndexingReport) -> String {
        let mut output = String::new();
        writeln!(output, "## Indexing Complete\n").unwrap();
        writeln!(output, "| Metric | Value |").unwrap();
        writeln!(output, "|--------|-------|").unwrap();
        writeln!(output, "| Products | {} |", report.total).unwrap();
        writeln!(output, "| Indexed | {} |", report.indexed).unwrap();
        writeln!(output, "| Errors | {} |", report.errors).unwrap();
        writeln!(output, "| Duration | {:.2}s |", report.duration_seconds).unwrap();
        writeln!(
            output,
            "| Throughput | {:.1} products/s |",
            report.products_per_second
        )
        .unwrap();
        if !report.failures.is_empty() {
            writeln!(output, "\n### Failures\n").unwrap();
            for failure in &report.failures {
                writeln!(output, "- `{}`: {}", failure.sku, failure.reason).unwrap();
            }
        }
        output
    }

    fn format_answer(&self, answer: &AgentAnswer) -> String {
        let mut output = String::new();
        writeln!(output, "## {}\n", answer.query).unwrap();
        writeln!(output, "{}\n", answer.answer.trim_end()).unwrap();
        if !answer.hits.is_empty() {
            writeln!(output, "### Sources\n").unwrap();
            for hit in &answer.hits {
                writeln!(
                    output,
                    "- `{}` (score {:.3})",
                    hit.sku().unwrap_or("-"),
                    hit.score
                )
                .unwrap();
            }
        }
        output
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        let mut output = String::new();
        writeln!(output, "## Status\n").unwrap();

        let vector_status = if status.vector_store_connected {
            "✅"
        } else {
            "❌"
        };
        writeln!(
            output,
            "### Vector Store ({}) {}\n",
            status.vector_store_driver, vector_status
        )
        .unwrap();
        writeln!(output, "- **URL:** `{}`", status.vector_store_url).unwrap();
        writeln!(output, "- **Collection:** {}", status.collection).unwrap();
        writeln!(output, "- **Products:** {}", status.vector_store_points).unwrap();
        writeln!(output).unwrap();

        let chat_status = if status.chat_ready { "✅" } else { "❌" };
        writeln!(output, "### Models\n").unwrap();
        writeln!(output, "- **Embedding:** {}", status.embedding_model).unwrap();
        writeln!(
            output,
            "- **Chat:** {} / {} {}",
            status.chat_provider, status.chat_model, chat_status
        )
        .unwrap();

        output
    }

    fn format_message(&self, message: &str) -> String {
        format!("> {}\n", message)
    }

    fn format_error(&self, error: &str) -> String {
        format!("> ⚠️ **Error:** {}\n", error)
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
        OutputFormat::Markdown => Box::new(MarkdownFormatter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IndexingFailure, Metadata, SearchHit};
    use std::time::Duration;

    fn report() -> IndexingReport {
        IndexingReport::new(
            7,
            3,
            10,
            Duration::from_secs(2),
            "2026-01-01T00:00:00+00:00".to_string(),
            vec![IndexingFailure {
                sku: "SKU-3".to_string(),
                reason: "upsert error: refused".to_string(),
            }],
        )
    }

    #[test]
    fn test_text_report_lists_failures() {
        let output = TextFormatter.format_index_report(&report());
        assert!(output.contains("Indexed:    7"));
        assert!(output.contains("Errors:     3"));
        assert!(output.contains("SKU-3 - upsert error: refused"));
    }

    #[test]
    fn test_json_report_is_parseable() {
        let output = JsonFormatter::new(false).format_index_report(&report());
        let value: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(value["indexed"], 7);
        assert_eq!(value["total"], 10);
        assert_eq!(value["products_per_second"], 3.5);
    }

    #[test]
    fn test_empty_search_results() {
        let results = SearchResults::new("panel".to_string(), vec![], 3);
        assert_eq!(
            TextFormatter.format_search_results(&results),
            "No products found for: panel\n"
        );
    }

    #[test]
    fn test_long_text_is_truncated_in_text_output() {
        let mut metadata = Metadata::new();
        metadata.insert("sku".to_string(), "LP-60".into());
        let hit = SearchHit {
            text: "x".repeat(400),
            metadata,
            score: 0.75,
        };
        let results = SearchResults::new("panel".to_string(), vec![hit], 3);
        let output = TextFormatter.format_search_results(&results);
        assert!(output.contains("1. [Score: 0.750] LP-60"));
        assert!(output.contains(&format!("{}...", "x".repeat(300))));
    }
}
