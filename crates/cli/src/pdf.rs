//! Quote documents for a single lead.
//!
//! Quotes are rendered from an embedded tera template and converted with
//! `wkhtmltopdf` when it is on `PATH`; otherwise the HTML itself is written.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use geoinsight_core::{DomainError, QuoteDocument};
use serde::Serialize;
use tera::{Context, Tera};
use tokio::process::Command;
use tracing::{info, warn};

// Registered with an `.html` name so tera autoescapes interpolated values.
const QUOTE_TEMPLATE: &str = "quote.html";

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("invalid quote: {0}")]
    InvalidQuote(#[from] DomainError),
    #[error("template error: {0}")]
    Template(String),
    #[error("conversion error: {0}")]
    Conversion(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Formats a number to two decimals: `amount | money`.
fn tera_money_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let formatted = match value {
        tera::Value::String(raw) => raw
            .parse::<rust_decimal::Decimal>()
            .map(|amount| format!("{:.2}", amount.round_dp(2)))
            .map_err(|error| tera::Error::msg(format!("money filter: {error}")))?,
        tera::Value::Number(number) => format!("{:.2}", number.as_f64().unwrap_or(0.0)),
        _ => "0.00".to_string(),
    };
    Ok(tera::Value::String(formatted))
}

#[derive(Serialize)]
struct QuoteRow<'a> {
    name: &'a str,
    qty: u32,
    price: String,
    subtotal: String,
}

/// Where a rendered quote was written and in which format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderedQuote {
    Pdf(PathBuf),
    Html(PathBuf),
}

impl RenderedQuote {
    pub fn path(&self) -> &Path {
        match self {
            Self::Pdf(path) | Self::Html(path) => path,
        }
    }
}

#[derive(Clone, Debug)]
pub struct QuoteRenderer {
    tera: Tera,
    wkhtmltopdf_path: Option<PathBuf>,
}

impl QuoteRenderer {
    pub fn new() -> Result<Self, PdfError> {
        let mut renderer = Self::html_only()?;
        renderer.wkhtmltopdf_path = which::which("wkhtmltopdf").ok();
        match &renderer.wkhtmltopdf_path {
            Some(path) => info!(path = %path.display(), "wkhtmltopdf found"),
            None => warn!("wkhtmltopdf not found in PATH; quotes will be written as HTML"),
        }
        Ok(renderer)
    }

    /// Renderer that never shells out; quotes are always written as HTML.
    pub fn html_only() -> Result<Self, PdfError> {
        let mut tera = Tera::default();
        tera.register_filter("money", tera_money_filter);
        tera.add_raw_template(
            QUOTE_TEMPLATE,
            include_str!("../../../templates/quotes/quote.html.tera"),
        )
        .map_err(|error| PdfError::Template(error.to_string()))?;

        Ok(Self { tera, wkhtmltopdf_path: None })
    }

    pub fn render_html(&self, quote: &QuoteDocument) -> Result<String, PdfError> {
        quote.validate()?;

        let rows = quote
            .items
            .iter()
            .map(|item| {
                Ok(QuoteRow {
                    name: &item.name,
                    qty: item.qty,
                    price: item.price.to_string(),
                    subtotal: item.subtotal()?.to_string(),
                })
            })
            .collect::<Result<Vec<QuoteRow<'_>>, PdfError>>()?;

        let mut context = Context::new();
        context.insert("business_name", &quote.business_name);
        context.insert("lead_id", &quote.lead_id);
        context.insert("items", &rows);
        context.insert("total", &quote.total()?.to_string());

        self.tera
            .render(QUOTE_TEMPLATE, &context)
            .map_err(|error| PdfError::Template(error.to_string()))
    }

    /// Writes `quote_<lead_id>.pdf` into `output_dir`, falling back to
    /// `quote_<lead_id>.html` when conversion is unavailable or fails.
    pub async fn write(
        &self,
        quote: &QuoteDocument,
        output_dir: &Path,
    ) -> Result<RenderedQuote, PdfError> {
        let html = self.render_html(quote)?;
        tokio::fs::create_dir_all(output_dir).await?;

        let html_path = output_dir.join(format!("quote_{}.html", quote.lead_id));
        tokio::fs::write(&html_path, &html).await?;

        if let Some(wkhtmltopdf) = &self.wkhtmltopdf_path {
            let pdf_path = output_dir.join(format!("quote_{}.pdf", quote.lead_id));
            match convert_html_to_pdf(wkhtmltopdf, &html_path, &pdf_path).await {
                Ok(()) => {
                    let _ = tokio::fs::remove_file(&html_path).await;
                    info!(
                        event_name = "quote.rendered",
                        lead_id = %quote.lead_id,
                        path = %pdf_path.display(),
                        "quote PDF written"
                    );
                    return Ok(RenderedQuote::Pdf(pdf_path));
                }
                Err(error) => {
                    warn!(error = %error, "PDF conversion failed, keeping HTML");
                }
            }
        }

        info!(
            event_name = "quote.rendered",
            lead_id = %quote.lead_id,
            path = %html_path.display(),
            "quote HTML written"
        );
        Ok(RenderedQuote::Html(html_path))
    }
}

async fn convert_html_to_pdf(
    wkhtmltopdf: &Path,
    html_path: &Path,
    pdf_path: &Path,
) -> Result<(), PdfError> {
    let output = Command::new(wkhtmltopdf)
        .args(["--page-size", "A4", "--encoding", "utf-8", "--quiet"])
        .arg(html_path)
        .arg(pdf_path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(PdfError::Conversion(String::from_utf8_lossy(&output.stderr).to_string()));
    }
    Ok(())
}
