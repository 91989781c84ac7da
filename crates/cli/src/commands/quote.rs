use std::fs;
use std::path::Path;

use crate::commands::{load_config, runtime, CommandResult};
use crate::pdf::{QuoteRenderer, RenderedQuote};
use geoinsight_core::{QuoteDocument, QuoteItem};

const COMMAND: &str = "quote";

/// Renders a quote for `lead_id` from a JSON file holding `[{"name", "qty", "price"}, ...]`.
pub fn run(business_name: &str, lead_id: &str, items_path: &Path) -> CommandResult {
    let items = match read_items(items_path) {
        Ok(items) => items,
        Err(message) => return CommandResult::failure(COMMAND, "invalid_argument", message, 2),
    };
    let quote = QuoteDocument {
        business_name: business_name.trim().to_string(),
        lead_id: lead_id.trim().to_string(),
        items,
    };
    let total = match quote.validate().and_then(|()| quote.total()) {
        Ok(total) => total,
        Err(error) => {
            return CommandResult::failure(COMMAND, "invalid_argument", error.to_string(), 2)
        }
    };

    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let renderer = QuoteRenderer::new()?;
        renderer.write(&quote, &config.quotes.output_dir).await
    });

    match result {
        Ok(rendered) => {
            let format = match rendered {
                RenderedQuote::Pdf(_) => "pdf",
                RenderedQuote::Html(_) => "html",
            };
            CommandResult::success(
                COMMAND,
                format!(
                    "wrote {format} quote for `{}` (total {}) to {}",
                    quote.business_name,
                    total.round_dp(2),
                    rendered.path().display()
                ),
            )
        }
        Err(error) => CommandResult::failure(COMMAND, "render", error.to_string(), 8),
    }
}

fn read_items(path: &Path) -> Result<Vec<QuoteItem>, String> {
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("failed to read items file `{}`: {error}", path.display()))?;
    serde_json::from_str(&raw)
        .map_err(|error| format!("items file `{}` is not a valid item list: {error}", path.display()))
}
