use async_trait::async_trait;
use geoinsight_core::config::TelephonyConfig;
use geoinsight_core::{AvailableNumber, ProviderError, ProvisionOutcome, TelephonyProvisioner};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::http::{build_client, read_json, request_error, trim_base_url};

const PROVIDER: &str = "twilio";
const API_VERSION: &str = "2010-04-01";
const AVAILABLE_NUMBERS_PAGE_SIZE: u32 = 10;

#[derive(Clone)]
struct TwilioCredentials {
    account_sid: String,
    auth_token: SecretString,
}

/// Twilio REST client that buys numbers and points their voice webhook at the
/// voice-AI platform.
#[derive(Clone)]
pub struct TwilioProvisioner {
    client: Client,
    credentials: Option<TwilioCredentials>,
    base_url: String,
    voice_webhook_url: String,
}

#[derive(Debug, Deserialize)]
struct AvailableNumbersPage {
    #[serde(default)]
    available_phone_numbers: Vec<AvailableNumber>,
}

#[derive(Debug, Deserialize)]
struct IncomingNumber {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct Account {
    friendly_name: String,
}

impl TwilioProvisioner {
    pub fn from_config(config: &TelephonyConfig) -> Result<Self, ProviderError> {
        let credentials = match (&config.account_sid, &config.auth_token) {
            (Some(account_sid), Some(auth_token)) => Some(TwilioCredentials {
                account_sid: account_sid.clone(),
                auth_token: auth_token.clone(),
            }),
            _ => None,
        };

        if credentials.is_none() {
            warn!(
                event_name = "telephony.client.unconfigured",
                "twilio credentials missing; number listing and provisioning are disabled"
            );
        }

        Ok(Self {
            client: build_client(PROVIDER, config.timeout_secs)?,
            credentials,
            base_url: trim_base_url(&config.base_url).to_string(),
            voice_webhook_url: config.voice_webhook_url.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    fn credentials(&self) -> Result<&TwilioCredentials, ProviderError> {
        self.credentials.as_ref().ok_or(ProviderError::NotConfigured { provider: PROVIDER })
    }

    fn account_url(&self, credentials: &TwilioCredentials, path: &str) -> String {
        format!(
            "{}/{API_VERSION}/Accounts/{}{path}",
            self.base_url, credentials.account_sid
        )
    }

    /// Fetches the account resource; used as the connectivity handshake.
    pub async fn fetch_account_name(&self) -> Result<String, ProviderError> {
        let credentials = self.credentials()?;
        let response = self
            .client
            .get(self.account_url(credentials, ".json"))
            .basic_auth(&credentials.account_sid, Some(credentials.auth_token.expose_secret()))
            .send()
            .await
            .map_err(|error| request_error(PROVIDER, error))?;

        let account: Account = read_json(PROVIDER, response).await?;
        Ok(account.friendly_name)
    }

    async fn fetch_available_numbers(
        &self,
        country_code: &str,
    ) -> Result<Vec<AvailableNumber>, ProviderError> {
        let credentials = self.credentials()?;
        let url = self.account_url(
            credentials,
            &format!("/AvailablePhoneNumbers/{country_code}/Local.json"),
        );
        let response = self
            .client
            .get(url)
            .basic_auth(&credentials.account_sid, Some(credentials.auth_token.expose_secret()))
            .query(&[("PageSize", AVAILABLE_NUMBERS_PAGE_SIZE)])
            .send()
            .await
            .map_err(|error| request_error(PROVIDER, error))?;

        let page: AvailableNumbersPage = read_json(PROVIDER, response).await?;
        Ok(page.available_phone_numbers)
    }

    async fn purchase(&self, phone_number: &str) -> Result<String, ProviderError> {
        let credentials = self.credentials()?;
        let response = self
            .client
            .post(self.account_url(credentials, "/IncomingPhoneNumbers.json"))
            .basic_auth(&credentials.account_sid, Some(credentials.auth_token.expose_secret()))
            .form(&[("PhoneNumber", phone_number)])
            .send()
            .await
            .map_err(|error| request_error(PROVIDER, error))?;

        let number: IncomingNumber = read_json(PROVIDER, response).await?;
        Ok(number.sid)
    }

    /// Points the number's voice webhook at the configured voice-AI endpoint.
    /// Safe to repeat for a number that is already bound.
    pub async fn bind_voice_url(&self, number_sid: &str) -> Result<(), ProviderError> {
        let credentials = self.credentials()?;
        let response = self
            .client
            .post(self.account_url(credentials, &format!("/IncomingPhoneNumbers/{number_sid}.json")))
            .basic_auth(&credentials.account_sid, Some(credentials.auth_token.expose_secret()))
            .form(&[("VoiceUrl", self.voice_webhook_url.as_str())])
            .send()
            .await
            .map_err(|error| request_error(PROVIDER, error))?;

        let _: IncomingNumber = read_json(PROVIDER, response).await?;
        info!(
            event_name = "telephony.bind.completed",
            number_sid = %number_sid,
            voice_url = %self.voice_webhook_url,
            "voice webhook bound"
        );
        Ok(())
    }
}

fn normalize_country_code(raw: &str) -> Option<String> {
    let code = raw.trim().to_ascii_uppercase();
    (code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic())).then_some(code)
}

#[async_trait]
impl TelephonyProvisioner for TwilioProvisioner {
    async fn list_available_numbers(&self, country_code: &str) -> Vec<AvailableNumber> {
        if !self.is_configured() {
            return Vec::new();
        }

        let Some(country_code) = normalize_country_code(country_code) else {
            warn!(
                event_name = "telephony.list.invalid_country",
                country_code = %country_code,
                "country code must be two ISO letters"
            );
            return Vec::new();
        };

        match self.fetch_available_numbers(&country_code).await {
            Ok(numbers) => {
                info!(
                    event_name = "telephony.list.completed",
                    country_code = %country_code,
                    count = numbers.len(),
                    "available numbers listed"
                );
                numbers
            }
            Err(error) => {
                warn!(
                    event_name = "telephony.list.failed",
                    country_code = %country_code,
                    error = %error,
                    "listing available numbers failed"
                );
                Vec::new()
            }
        }
    }

    async fn buy_and_bind(&self, phone_number: &str) -> ProvisionOutcome {
        if !self.is_configured() {
            return ProvisionOutcome::Error {
                message: "telephony provider is not configured".to_string(),
            };
        }

        let sid = match self.purchase(phone_number).await {
            Ok(sid) => sid,
            Err(error) => {
                error!(
                    event_name = "telephony.provision.purchase_failed",
                    phone_number = %phone_number,
                    error = %error,
                    "number purchase failed"
                );
                return ProvisionOutcome::Error { message: error.to_string() };
            }
        };

        info!(
            event_name = "telephony.provision.purchased",
            phone_number = %phone_number,
            number_sid = %sid,
            "number purchased"
        );

        // The purchase is not rolled back; the caller gets the sid for a manual rebind.
        if let Err(error) = self.bind_voice_url(&sid).await {
            error!(
                event_name = "telephony.provision.unbound",
                phone_number = %phone_number,
                number_sid = %sid,
                error = %error,
                "number purchased but voice webhook binding failed"
            );
            return ProvisionOutcome::Error {
                message: format!(
                    "number {phone_number} was purchased as {sid} but binding its voice webhook failed: {error}; \
                     run `geoinsight telephony rebind --sid {sid}` to retry"
                ),
            };
        }

        ProvisionOutcome::Success { sid, phone: phone_number.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use geoinsight_core::config::AppConfig;
    use geoinsight_core::{ProviderError, ProvisionOutcome, TelephonyProvisioner};
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::TwilioProvisioner;

    const ACCOUNTS: &str = "/2010-04-01/Accounts/AC123";

    fn provisioner(base_url: Option<&str>) -> TwilioProvisioner {
        let mut config = AppConfig::default().telephony;
        if let Some(base_url) = base_url {
            config.account_sid = Some("AC123".to_string());
            config.auth_token = Some("token".to_string().into());
            config.base_url = base_url.to_string();
        }
        TwilioProvisioner::from_config(&config).expect("client")
    }

    #[tokio::test]
    async fn unconfigured_client_soft_fails() {
        let provisioner = provisioner(None);

        assert!(provisioner.list_available_numbers("CO").await.is_empty());
        assert_eq!(
            provisioner.buy_and_bind("+5715550000").await,
            ProvisionOutcome::Error { message: "telephony provider is not configured".to_string() }
        );
        assert!(matches!(
            provisioner.fetch_account_name().await,
            Err(ProviderError::NotConfigured { provider: "twilio" })
        ));
    }

    #[tokio::test]
    async fn lists_local_numbers_for_country() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{ACCOUNTS}/AvailablePhoneNumbers/CO/Local.json")))
            .and(query_param("PageSize", "10"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "available_phone_numbers": [
                    {"phone_number": "+5715550001", "capabilities": {"voice": true, "SMS": false, "MMS": false}},
                    {"phone_number": "+5715550002", "capabilities": {"voice": true, "SMS": true, "MMS": false}}
                ]
            })))
            .mount(&server)
            .await;

        let numbers = provisioner(Some(&server.uri())).list_available_numbers("co").await;

        assert_eq!(numbers.len(), 2);
        assert_eq!(numbers[0].phone_number, "+5715550001");
        assert!(numbers[1].capabilities.sms);
    }

    #[tokio::test]
    async fn listing_errors_become_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Authenticate"})))
            .mount(&server)
            .await;

        let provisioner = provisioner(Some(&server.uri()));
        assert!(provisioner.list_available_numbers("CO").await.is_empty());
        assert!(provisioner.list_available_numbers("COL").await.is_empty());
    }

    #[tokio::test]
    async fn buy_and_bind_purchases_then_sets_voice_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{ACCOUNTS}/IncomingPhoneNumbers.json")))
            .and(body_string_contains("PhoneNumber=%2B5715550001"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"sid": "PN001"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{ACCOUNTS}/IncomingPhoneNumbers/PN001.json")))
            .and(body_string_contains("VoiceUrl=https%3A%2F%2Fapi.vapi.ai%2Fphone%2Ftwilio"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sid": "PN001"})))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = provisioner(Some(&server.uri())).buy_and_bind("+5715550001").await;

        assert_eq!(
            outcome,
            ProvisionOutcome::Success { sid: "PN001".to_string(), phone: "+5715550001".to_string() }
        );
    }

    #[tokio::test]
    async fn failed_purchase_reports_error_without_binding() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{ACCOUNTS}/IncomingPhoneNumbers.json")))
            .respond_with(ResponseTemplate::new(400).set_body_string("number not available"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{ACCOUNTS}/IncomingPhoneNumbers/PN001.json")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sid": "PN001"})))
            .expect(0)
            .mount(&server)
            .await;

        let outcome = provisioner(Some(&server.uri())).buy_and_bind("+5715550001").await;

        match outcome {
            ProvisionOutcome::Error { message } => assert!(message.contains("400")),
            other => panic!("expected error outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn bind_failure_after_purchase_names_the_purchased_sid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{ACCOUNTS}/IncomingPhoneNumbers.json")))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"sid": "PN777"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{ACCOUNTS}/IncomingPhoneNumbers/PN777.json")))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let outcome = provisioner(Some(&server.uri())).buy_and_bind("+5715550007").await;

        match outcome {
            ProvisionOutcome::Error { message } => {
                assert!(message.contains("PN777"));
                assert!(message.contains("rebind"));
            }
            other => panic!("expected error outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_account_name_reads_friendly_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{ACCOUNTS}.json")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"friendly_name": "Geo Insight"})),
            )
            .mount(&server)
            .await;

        let name = provisioner(Some(&server.uri())).fetch_account_name().await.expect("account");
        assert_eq!(name, "Geo Insight");
    }
}
