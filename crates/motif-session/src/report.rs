//! Human-facing session reports (the "print" export)

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Node};

use crate::bundle::NotebookContent;
use crate::error::SessionError;
use crate::surface::Surface;

const TITLE: &str = "MOTIF ORACLE NOTEBOOK - SESSION REPORT";

/// Report sections in print order
const SECTIONS: [(Surface, &str); 5] = [
    (Surface::Character, "CHARACTER"),
    (Surface::Scene, "SCENE NOTES"),
    (Surface::Story, "STORY SO FAR"),
    (Surface::Extra, "EXTRA NOTES"),
    (Surface::Oracle, "DICE ROLLS"),
];

const BLOCK_TAGS: [&str; 14] = [
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul", "ol", "blockquote", "pre", "tr",
];

const HTML_STYLE: &str = r#"        body {
            font-family: Arial, sans-serif;
            line-height: 1.6;
            max-width: 800px;
            margin: 2rem auto;
            padding: 0 1rem;
        }
        h1, h2 { color: #8b0000; }
        h2 { border-bottom: 2px solid #8b0000; padding-bottom: 0.5rem; }
        .timestamp { font-style: italic; color: #666; }
        .section { margin: 2rem 0; }"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Markdown,
    Html,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Markdown => "md",
            ReportFormat::Html => "html",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt" | "text" => Ok(ReportFormat::Text),
            "md" | "markdown" => Ok(ReportFormat::Markdown),
            "html" => Ok(ReportFormat::Html),
            _ => Err(SessionError::UnknownFormat(s.to_string())),
        }
    }
}

pub fn generate_report(
    content: &NotebookContent,
    format: ReportFormat,
    generated_at: DateTime<Utc>,
) -> String {
    let timestamp = generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string();

    match format {
        ReportFormat::Text => {
            let mut out = format!("{TITLE}\nGenerated: {timestamp}\n");
            for (surface, heading) in SECTIONS {
                out.push_str(&format!("\n{heading}\n{}\n", html_to_text(content.get(surface))));
            }
            out
        }
        ReportFormat::Markdown => {
            let mut out = format!("# {TITLE}\n*Generated: {timestamp}*\n");
            for (surface, heading) in SECTIONS {
                out.push_str(&format!(
                    "\n## {heading}\n{}\n",
                    html_to_markdown(content.get(surface))
                ));
            }
            out
        }
        ReportFormat::Html => {
            let mut out = format!(
                "<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"UTF-8\">\n    \
                 <title>Motif Oracle Notebook - Session Report</title>\n    <style>\n{HTML_STYLE}\n    \
                 </style>\n</head>\n<body>\n    <h1>{TITLE}</h1>\n    \
                 <p class=\"timestamp\">Generated: {timestamp}</p>\n"
            );
            for (surface, heading) in SECTIONS {
                out.push_str(&format!(
                    "\n    <div class=\"section\">\n        <h2>{heading}</h2>\n        {}\n    </div>\n",
                    clean_empty_paragraphs(content.get(surface))
                ));
            }
            out.push_str("</body>\n</html>\n");
            out
        }
    }
}

/// Text content of a markup fragment, one line per block or `<br>`.
pub fn html_to_text(markup: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    let mut out = String::new();
    collect_text(fragment.root_element(), &mut out);

    out.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Markdown-ish rendering: every text line becomes its own paragraph.
pub fn html_to_markdown(markup: &str) -> String {
    html_to_text(markup)
        .lines()
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn collect_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                let name = element.name();
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    let block = BLOCK_TAGS.contains(&name);
                    if block {
                        out.push('\n');
                    }
                    collect_text(child_el, out);
                    if block {
                        out.push('\n');
                    }
                }
            }
            _ => {}
        }
    }
}

/// Drop paragraphs holding only whitespace or `&nbsp;`, which editors leave
/// behind after clearing a line.
pub fn clean_empty_paragraphs(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;

    while let Some(start) = rest.find("<p>") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 3..];
        match after_open.find("</p>") {
            Some(end) if is_blank_paragraph(&after_open[..end]) => {
                rest = &after_open[end + 4..];
            }
            _ => {
                out.push_str("<p>");
                rest = after_open;
            }
        }
    }

    out.push_str(rest);
    out
}

fn is_blank_paragraph(inner: &str) -> bool {
    inner.replace("&nbsp;", "").trim().is_empty()
}
