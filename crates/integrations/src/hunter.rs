use async_trait::async_trait;
use geoinsight_core::config::ProspectingConfig;
use geoinsight_core::{
    grid_cells, EnrichmentOutcome, LeadCandidate, LeadHunter, ProviderError, TargetConfig,
};
use secrecy::SecretString;
use tracing::{debug, info};

/// Lead hunter that walks the search grid and returns a fixed candidate set.
///
/// Search and scraping providers are not wired yet; keys are only used to
/// decide whether enrichment runs.
#[derive(Clone, Default)]
pub struct StaticLeadHunter {
    serper_api_key: Option<SecretString>,
    firecrawl_api_key: Option<SecretString>,
}

impl StaticLeadHunter {
    pub fn new(config: &ProspectingConfig) -> Self {
        Self {
            serper_api_key: config.serper_api_key.clone(),
            firecrawl_api_key: config.firecrawl_api_key.clone(),
        }
    }

    fn candidates() -> Vec<LeadCandidate> {
        vec![
            LeadCandidate {
                name: "Ferretería El Tornillo".to_string(),
                address: "Calle 123".to_string(),
                website: Some("https://eltornillo.example.com".to_string()),
            },
            LeadCandidate {
                name: "Constructora Acme".to_string(),
                address: "Cra 45".to_string(),
                website: Some("https://acme.example.com".to_string()),
            },
        ]
    }
}

#[async_trait]
impl LeadHunter for StaticLeadHunter {
    async fn grid_search(
        &self,
        target: &TargetConfig,
    ) -> Result<Vec<LeadCandidate>, ProviderError> {
        let cells = grid_cells(target);
        for cell in &cells {
            debug!(
                event_name = "hunter.grid.cell",
                lat = cell.lat,
                lng = cell.lng,
                keyword = %target.keyword,
                "searching grid cell"
            );
        }

        let candidates = Self::candidates();
        info!(
            event_name = "hunter.grid.completed",
            keyword = %target.keyword,
            radius_km = target.radius_km,
            cells = cells.len(),
            search_configured = self.serper_api_key.is_some(),
            candidates = candidates.len(),
            "grid search completed"
        );
        Ok(candidates)
    }

    async fn enrich(&self, website: &str) -> EnrichmentOutcome {
        if self.firecrawl_api_key.is_none() {
            debug!(event_name = "hunter.enrich.skipped", website = %website, "no scrape key");
            return EnrichmentOutcome::Skipped { reason: "No API Key".to_string() };
        }

        info!(event_name = "hunter.enrich.completed", website = %website, "website enriched");
        EnrichmentOutcome::Enriched {
            emails: vec!["contacto@ejemplo.com".to_string()],
            buying_signals: vec![
                "Sitio web antiguo".to_string(),
                "Sin comercio electrónico".to_string(),
            ],
        }
    }
}
