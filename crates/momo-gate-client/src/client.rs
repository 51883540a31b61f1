//! MoMo Collection API client implementation.

use reqwest::{Client, StatusCode};
use std::time::Duration;

use async_trait::async_trait;
use momo_gate_core::{
    AccessToken, AccessTokenProvider, InitiatePayment, InitiationReceipt, PaymentInitiator,
    PaymentStatusProbe, ProviderReferenceId, ProviderStatus, RemoteError,
};

use crate::config::MomoConfig;
use crate::error::ClientError;
use crate::types::{MomoErrorResponse, Party, RequestToPay, RequestToPayStatus, TokenResponse};

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const TARGET_ENVIRONMENT_HEADER: &str = "X-Target-Environment";
const REFERENCE_ID_HEADER: &str = "X-Reference-Id";
const CALLBACK_URL_HEADER: &str = "X-Callback-Url";

/// MoMo Collection API client.
///
/// Implements the three remote operations the payment gate consumes.
#[derive(Debug, Clone)]
pub struct MomoClient {
    client: Client,
    config: MomoConfig,
    base_url: String,
}

impl MomoClient {
    /// Create a new MoMo client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the base URL is empty.
    pub fn new(config: MomoConfig) -> Result<Self, ClientError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Configuration("MoMo base URL is empty".into()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ClientError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    /// Exchange the API user and key for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or MoMo refuses the credentials.
    pub async fn create_access_token(&self) -> Result<TokenResponse, ClientError> {
        let url = format!("{}/token/", self.base_url);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.api_user, Some(&self.config.api_key))
            .header(SUBSCRIPTION_KEY_HEADER, &self.config.subscription_key)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Submit a request-to-pay under a freshly generated reference id.
    ///
    /// Only `202 Accepted` counts as success; the generated reference is
    /// returned for status queries.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or MoMo does not accept it.
    pub async fn request_to_pay(
        &self,
        access_token: &AccessToken,
        body: &RequestToPay,
    ) -> Result<ProviderReferenceId, ClientError> {
        let url = format!("{}/requesttopay", self.base_url);
        let reference_id = uuid::Uuid::new_v4().to_string();

        tracing::debug!(
            reference_id = %reference_id,
            external_id = %body.external_id,
            amount = %body.amount,
            currency = %body.currency,
            "Submitting MoMo request-to-pay"
        );

        let mut request = self
            .client
            .post(&url)
            .bearer_auth(access_token.secret())
            .header(REFERENCE_ID_HEADER, &reference_id)
            .header(TARGET_ENVIRONMENT_HEADER, &self.config.target_environment)
            .header(SUBSCRIPTION_KEY_HEADER, &self.config.subscription_key)
            .json(body);

        if let Some(callback_url) = &self.config.callback_url {
            request = request.header(CALLBACK_URL_HEADER, callback_url);
        }

        let response = request.send().await?;

        if response.status() != StatusCode::ACCEPTED {
            return Err(Self::api_error(response).await);
        }

        Ok(ProviderReferenceId::new(reference_id))
    }

    /// Read the status of a request-to-pay.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or MoMo returns an error.
    pub async fn request_to_pay_status(
        &self,
        access_token: &AccessToken,
        reference: &ProviderReferenceId,
    ) -> Result<RequestToPayStatus, ClientError> {
        let url = format!("{}/requesttopay/{}", self.base_url, reference);

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token.secret())
            .header(TARGET_ENVIRONMENT_HEADER, &self.config.target_environment)
            .header(SUBSCRIPTION_KEY_HEADER, &self.config.subscription_key)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        if response.status().is_success() {
            let body = response.text().await?;
            return Ok(serde_json::from_str(&body)?);
        }

        Err(Self::api_error(response).await)
    }

    async fn api_error(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let (code, message) = match serde_json::from_str::<MomoErrorResponse>(&body) {
            Ok(err) => (
                err.code,
                err.message.unwrap_or_else(|| format!("HTTP {status}")),
            ),
            Err(_) if body.is_empty() => (None, format!("HTTP {status}")),
            Err(_) => (None, body),
        };

        tracing::warn!(status = %status, code = ?code, message = %message, "MoMo API error");

        ClientError::Api {
            status: status.as_u16(),
            code,
            message,
        }
    }
}

#[async_trait]
impl AccessTokenProvider for MomoClient {
    async fn obtain_access_token(&self) -> Result<AccessToken, RemoteError> {
        let token = self.create_access_token().await?;
        Ok(AccessToken::new(token.access_token))
    }
}

#[async_trait]
impl PaymentInitiator for MomoClient {
    async fn initiate_payment(
        &self,
        request: &InitiatePayment,
    ) -> Result<InitiationReceipt, RemoteError> {
        let body = RequestToPay {
            amount: request.amount_minor.to_string(),
            currency: request.currency.code().to_string(),
            external_id: request.external_reference.to_string(),
            payer: Party::msisdn(request.payer_phone.as_str()),
            payer_message: request.payer_message.clone(),
            payee_note: request.payer_message.clone(),
        };

        let reference = self.request_to_pay(&request.access_token, &body).await?;
        Ok(InitiationReceipt {
            provider_reference_id: Some(reference),
        })
    }
}

#[async_trait]
impl PaymentStatusProbe for MomoClient {
    async fn query_payment_status(
        &self,
        access_token: &AccessToken,
        reference: &ProviderReferenceId,
    ) -> Result<ProviderStatus, RemoteError> {
        let status = self.request_to_pay_status(access_token, reference).await?;
        ProviderStatus::from_wire(&status.status)
            .ok_or_else(|| ClientError::UnknownStatus(status.status).into())
    }
}
