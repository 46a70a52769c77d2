//! HTTP document fetcher with text extraction
//!
//! Downloads a document by URL and extracts plain text according to the
//! declared content type, falling back to a guess from the URL path when
//! the server stays silent.

use async_trait::async_trait;
use pulldown_cmark::{Event, Parser, Tag};
use scraper::{Html, Selector};

use crate::domain::ingestion::{DocumentFetcher, RawText};
use crate::domain::DomainError;
use crate::infrastructure::http::HttpClientTrait;

#[derive(Debug, Clone, Copy, PartialEq)]
enum DocumentKind {
    Html,
    Markdown,
    Plain,
}

impl DocumentKind {
    fn detect(content_type: Option<&str>, url: &str) -> Self {
        let declared = content_type
            .map(|c| c.split(';').next().unwrap_or("").trim().to_ascii_lowercase());

        let mime = match declared {
            Some(m) if !m.is_empty() && m != "application/octet-stream" => m,
            _ => {
                // strip the query string before guessing from the path
                let path = url.split(['?', '#']).next().unwrap_or(url);
                mime_guess::from_path(path)
                    .first_raw()
                    .unwrap_or("text/plain")
                    .to_ascii_lowercase()
            }
        };

        match mime.as_str() {
            "text/html" | "application/xhtml+xml" => Self::Html,
            "text/markdown" | "text/x-markdown" => Self::Markdown,
            _ => Self::Plain,
        }
    }
}

/// Fetches documents over HTTP and extracts their text
#[derive(Debug, Clone)]
pub struct HttpFetcher<C: HttpClientTrait> {
    client: C,
}

impl<C: HttpClientTrait> HttpFetcher<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: HttpClientTrait> DocumentFetcher for HttpFetcher<C> {
    async fn fetch(&self, url: &str) -> Result<RawText, DomainError> {
        let body = self.client.get(url).await?;
        let kind = DocumentKind::detect(body.content_type.as_deref(), url);

        let text = match kind {
            DocumentKind::Html => html_text(&body.text),
            DocumentKind::Markdown => markdown_text(&body.text),
            DocumentKind::Plain => body.text,
        };

        Ok(RawText::new(text, url))
    }
}

fn html_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let body_selector = Selector::parse("body").ok();

    let text = body_selector
        .as_ref()
        .and_then(|sel| document.select(sel).next())
        .map(|body| element_text(&body))
        .unwrap_or_else(|| document.root_element().text().collect());

    normalize_lines(&text)
}

fn element_text(element: &scraper::ElementRef) -> String {
    let mut text = String::new();

    for node in element.children() {
        if let Some(el) = scraper::ElementRef::wrap(node) {
            let tag = el.value().name();
            if matches!(tag, "script" | "style" | "noscript" | "head") {
                continue;
            }

            let block = matches!(
                tag,
                "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "br" | "li" | "tr"
            );
            if block && !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }

            text.push_str(&element_text(&el));

            if block {
                text.push('\n');
            }
        } else if let Some(t) = node.value().as_text() {
            text.push_str(t);
        }
    }

    text
}

fn markdown_text(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut text = String::new();

    for event in parser {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            Event::Start(Tag::Paragraph | Tag::Heading(..) | Tag::Item | Tag::CodeBlock(_)) => {
                if !text.is_empty() && !text.ends_with('\n') {
                    text.push('\n');
                }
            }
            Event::End(Tag::Paragraph | Tag::Heading(..) | Tag::Item | Tag::CodeBlock(_)) => {
                text.push('\n');
            }
            _ => {}
        }
    }

    normalize_lines(&text)
}

fn normalize_lines(text: &str) -> String {
    text.lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
