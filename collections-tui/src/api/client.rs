use reqwest::multipart;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ApiError;
use super::models::{Customer, CustomerList, NewCustomer, UploadAck};

/// Stateless client for the six backend operations.
///
/// Every failure is logged before being returned so the caller can surface it
/// however its view requires.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn list_all(&self) -> Result<Vec<Customer>, ApiError> {
        self.list("all-customers").await
    }

    pub async fn list_pending(&self) -> Result<Vec<Customer>, ApiError> {
        self.list("pending-customers").await
    }

    /// Resolved customers come from the same endpoint as the full list; the
    /// successful-only filter is applied view-side.
    pub async fn list_resolved(&self) -> Result<Vec<Customer>, ApiError> {
        self.list("all-customers").await
    }

    pub async fn create_customer(&self, customer: &NewCustomer) -> Result<Value, ApiError> {
        let response = self
            .http
            .post(self.url("add-customer"))
            .json(customer)
            .send()
            .await
            .map_err(|e| transport("add-customer", e))?;
        decode("add-customer", response).await
    }

    pub async fn upload_recording(
        &self,
        customer_id: &str,
        file_name: String,
        bytes: Vec<u8>,
    ) -> Result<UploadAck, ApiError> {
        let endpoint = format!("upload-recording/{customer_id}");
        // The content-type header is left to reqwest: the multipart boundary
        // must match the one it generates.
        let form =
            multipart::Form::new().part("file", multipart::Part::bytes(bytes).file_name(file_name));
        let response = self
            .http
            .post(self.url(&endpoint))
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport(&endpoint, e))?;
        decode(&endpoint, response).await
    }

    pub async fn start_call(&self, customer_id: &str) -> Result<Value, ApiError> {
        let endpoint = format!("start-call/{customer_id}");
        let response = self
            .http
            .post(self.url(&endpoint))
            .send()
            .await
            .map_err(|e| transport(&endpoint, e))?;
        decode(&endpoint, response).await
    }

    async fn list(&self, endpoint: &str) -> Result<Vec<Customer>, ApiError> {
        let response = self
            .http
            .get(self.url(endpoint))
            .send()
            .await
            .map_err(|e| transport(endpoint, e))?;
        let list: CustomerList = decode(endpoint, response).await?;
        Ok(list.customers)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn transport(endpoint: &str, err: reqwest::Error) -> ApiError {
    let err = ApiError::from(err);
    log::error!("{endpoint}: {err}");
    err
}

/// Decode a 2xx body, or turn a non-2xx response into a server error that
/// keeps the status even when the body is not structured.
async fn decode<T: DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let err = ApiError::server(status.as_u16(), &body);
        log::error!("{endpoint}: {err}");
        return Err(err);
    }
    response.json::<T>().await.map_err(|e| transport(endpoint, e))
}
