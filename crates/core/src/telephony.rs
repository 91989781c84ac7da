use async_trait::async_trait;

use crate::domain::telephony::{AvailableNumber, ProvisionOutcome};

/// Telephony vendor boundary.
///
/// Listing soft-fails to an empty vector; purchasing reports failures through
/// [`ProvisionOutcome::Error`] so the caller decides how to surface them.
#[async_trait]
pub trait TelephonyProvisioner: Send + Sync {
    async fn list_available_numbers(&self, country_code: &str) -> Vec<AvailableNumber>;

    async fn buy_and_bind(&self, phone_number: &str) -> ProvisionOutcome;
}
