//! HTTP client for the CJDropShipping API.
//!
//! Every call sends the `CJ-Access-Token` header and unwraps the
//! `{ code, message, data }` envelope, surfacing non-200 codes as
//! [`CjError::Api`].

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::CjError;
use super::types::{
    AccessToken, CjEnvelope, CjOrderPage, CreateOrderRequest, CreatedOrder, SUCCESS_CODE,
};

pub const DEFAULT_BASE_URL: &str = "https://developers.cjdropshipping.com/api2.0/v1";

const TOKEN_HEADER: &str = "CJ-Access-Token";

#[derive(Debug, Clone)]
pub struct CjClient {
    client: Client,
    base_url: Url,
}

impl CjClient {
    /// Creates a client for `base_url`, normally [`DEFAULT_BASE_URL`] from config.
    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Result<Self, CjError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("dropship-api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Trailing slash so `join` appends to the versioned path instead of
        // replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalised).map_err(|_| CjError::InvalidBaseUrl(base_url.to_owned()))?;

        Ok(Self { client, base_url })
    }

    /// Exchanges a stored API key for a bearer access token.
    pub async fn get_access_token(&self, api_key: &str) -> Result<AccessToken, CjError> {
        let request = self
            .client
            .post(self.url("authentication/getAccessToken")?)
            .header(TOKEN_HEADER, api_key)
            .json(&serde_json::json!({}));
        self.send(request, "getAccessToken").await
    }

    pub async fn list_products(
        &self,
        token: &str,
        page: i64,
        page_size: i64,
    ) -> Result<Value, CjError> {
        let request = self.authed_get("product/list", token)?.query(&[
            ("page", page.to_string()),
            ("pageSize", page_size.to_string()),
            ("lang", "en".to_string()),
        ]);
        self.send(request, "product/list").await
    }

    pub async fn search_products(
        &self,
        token: &str,
        keyword: &str,
        page: i64,
        page_size: i64,
    ) -> Result<Value, CjError> {
        let request = self.authed_get("product/query", token)?.query(&[
            ("keyword", keyword.to_string()),
            ("page", page.to_string()),
            ("pageSize", page_size.to_string()),
            ("lang", "en".to_string()),
        ]);
        self.send(request, "product/query").await
    }

    pub async fn product_detail(&self, token: &str, product_id: &str) -> Result<Value, CjError> {
        let request = self
            .authed_get("product/query", token)?
            .query(&[("id", product_id), ("lang", "en")]);
        self.send(request, "product/query").await
    }

    pub async fn categories(&self, token: &str) -> Result<Value, CjError> {
        let request = self.authed_get("product/getCategory", token)?;
        self.send(request, "product/getCategory").await
    }

    pub async fn balance(&self, token: &str) -> Result<Value, CjError> {
        let request = self.authed_get("shopping/pay/getBalance", token)?;
        self.send(request, "shopping/pay/getBalance").await
    }

    pub async fn create_order(
        &self,
        token: &str,
        order: &CreateOrderRequest,
    ) -> Result<CreatedOrder, CjError> {
        let request = self
            .client
            .post(self.url("shopping/order/createOrder")?)
            .header(TOKEN_HEADER, token)
            .json(order);
        self.send(request, "shopping/order/createOrder").await
    }

    pub async fn list_orders(
        &self,
        token: &str,
        page: i64,
        page_size: i64,
    ) -> Result<CjOrderPage, CjError> {
        let request = self
            .authed_get("shopping/order/queryById", token)?
            .query(&[("pageNo", page), ("pageSize", page_size)]);
        let page: Option<CjOrderPage> = self.send(request, "shopping/order/queryById").await?;
        Ok(page.unwrap_or_default())
    }

    pub async fn shipping_rates(
        &self,
        token: &str,
        product_id: &str,
        country: &str,
    ) -> Result<Value, CjError> {
        let request = self.authed_get("logistic/freightCalculate", token)?.query(&[
            ("productId", product_id),
            ("country", country),
            ("productNum", "1"),
        ]);
        self.send(request, "logistic/freightCalculate").await
    }

    fn url(&self, path: &str) -> Result<Url, CjError> {
        self.base_url
            .join(path)
            .map_err(|_| CjError::InvalidBaseUrl(format!("{}{path}", self.base_url)))
    }

    fn authed_get(&self, path: &str, token: &str) -> Result<RequestBuilder, CjError> {
        Ok(self.client.get(self.url(path)?).header(TOKEN_HEADER, token))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, CjError> {
        let body: Value = request.send().await?.error_for_status()?.json().await?;
        tracing::debug!(endpoint = context, "cj response received");
        unwrap_envelope(body, context)
    }
}

/// Checks the envelope code and decodes `data` into `T`.
pub(crate) fn unwrap_envelope<T: DeserializeOwned>(body: Value, context: &str) -> Result<T, CjError> {
    let envelope: CjEnvelope<Value> =
        serde_json::from_value(body).map_err(|source| CjError::Deserialize {
            context: context.to_owned(),
            source,
        })?;

    if envelope.code != SUCCESS_CODE {
        return Err(CjError::Api {
            code: envelope.code,
            message: envelope
                .message
                .unwrap_or_else(|| "unknown CJ error".to_string()),
        });
    }

    serde_json::from_value(envelope.data.unwrap_or(Value::Null)).map_err(|source| {
        CjError::Deserialize {
            context: context.to_owned(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_success_code_becomes_api_error() {
        let body = serde_json::json!({ "code": 1600100, "result": false, "message": "Param error", "data": null });
        let err = unwrap_envelope::<Value>(body, "test").unwrap_err();
        match err {
            CjError::Api { code, message } => {
                assert_eq!(code, 1600100);
                assert_eq!(message, "Param error");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_data_decodes_as_null() {
        let body = serde_json::json!({ "code": 200, "result": true, "message": "Success" });
        let value: Value = unwrap_envelope(body, "test").unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn base_url_keeps_version_path() {
        let client = CjClient::with_base_url("https://example.test/api2.0/v1", 5).unwrap();
        let url = client.url("product/list").unwrap();
        assert_eq!(url.as_str(), "https://example.test/api2.0/v1/product/list");
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(
            CjClient::with_base_url("not a url", 5),
            Err(CjError::InvalidBaseUrl(_))
        ));
    }
}
