//! GraphQL-over-HTTP implementation of [`BoxApi`].
//!
//! Every operation is a single `POST` to the configured endpoint. Lookups
//! send `Cache-Control: no-cache` so intermediaries never answer them from a
//! cache. Each request carries a fresh `x-request-id` for log correlation.

use async_trait::async_trait;
use boxwise_core::batch::MutationResponse;
use boxwise_core::types::DbId;
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::api::{BoxApi, CodeLookup, LabelLookup};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::wire::{
    AssignTagsData, BoxByLabelData, GraphQlRequest, GraphQlResponse, MoveBoxesData, QrCodeData,
    ShipmentData,
};

const BOX_FIELDS: &str = "
    labelIdentifier
    state
    lastModifiedOn
    location { id name base { id name } }
    tags { id name }
";

const UPDATED_BOX_FIELDS: &str = "
    labelIdentifier
    state
    lastModifiedOn
    location { id name }
";

/// HTTP client for a box GraphQL endpoint.
pub struct GraphQlBoxApi {
    client: reqwest::Client,
    api_url: String,
    access_token: Option<String>,
}

impl GraphQlBoxApi {
    /// Build a client from configuration, applying the request timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            access_token: config.access_token.clone(),
        })
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self {
            client,
            api_url,
            access_token: None,
        }
    }

    /// GraphQL endpoint URL.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    // ---- private helpers ----

    /// POST one GraphQL operation and return its `data`.
    ///
    /// Top-level GraphQL errors are mapped through
    /// [`GraphQlError::into_api_error`](crate::wire::GraphQlError::into_api_error);
    /// only the first one is considered.
    async fn execute<V, T>(
        &self,
        operation_name: &str,
        query: &str,
        variables: V,
        fresh: bool,
    ) -> Result<T, ApiError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let request_id = uuid::Uuid::new_v4().to_string();
        let body = GraphQlRequest {
            operation_name,
            query,
            variables,
        };

        let mut request = self
            .client
            .post(&self.api_url)
            .header("x-request-id", &request_id)
            .json(&body);
        if fresh {
            request = request.header(CACHE_CONTROL, "no-cache");
        }
        if let Some(token) = &self.access_token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        tracing::debug!(operation = operation_name, request_id = %request_id, "Sending API request");

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                operation = operation_name,
                request_id = %request_id,
                status = status.as_u16(),
                "API request failed",
            );
            return Err(ApiError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let envelope: GraphQlResponse<T> = serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                operation = operation_name,
                request_id = %request_id,
                error = %e,
                "Malformed API response",
            );
            ApiError::Malformed(format!("{operation_name}: {e}"))
        })?;

        if let Some(error) = envelope.errors.into_iter().next() {
            return Err(error.into_api_error());
        }

        envelope
            .data
            .ok_or_else(|| ApiError::Malformed(format!("{operation_name}: response has no data")))
    }
}

#[async_trait]
impl BoxApi for GraphQlBoxApi {
    async fn resolve_code(&self, code: &str) -> Result<CodeLookup, ApiError> {
        let query = format!(
            "query BoxByQrCode($qrCode: String!) {{
                qrCode(code: $qrCode) {{
                    __typename
                    ... on QrCode {{
                        code
                        box {{
                            __typename
                            ... on Box {{ {BOX_FIELDS} }}
                        }}
                    }}
                }}
            }}"
        );
        let data: QrCodeData = self
            .execute("BoxByQrCode", &query, json!({ "qrCode": code }), true)
            .await?;
        data.qr_code.into_lookup()
    }

    async fn resolve_label(&self, label_identifier: &str) -> Result<LabelLookup, ApiError> {
        let query = format!(
            "query BoxByLabelIdentifier($labelIdentifier: String!) {{
                box(labelIdentifier: $labelIdentifier) {{
                    {BOX_FIELDS}
                    deletedOn
                }}
            }}"
        );
        let data: BoxByLabelData = self
            .execute(
                "BoxByLabelIdentifier",
                &query,
                json!({ "labelIdentifier": label_identifier }),
                true,
            )
            .await?;
        data.into_lookup()
    }

    async fn move_boxes(
        &self,
        label_identifiers: &[String],
        location_id: DbId,
    ) -> Result<MutationResponse, ApiError> {
        let query = format!(
            "mutation MoveBoxes($labelIdentifiers: [String!]!, $locationId: Int!) {{
                moveBoxesToLocation(
                    updateInput: {{ labelIdentifiers: $labelIdentifiers, locationId: $locationId }}
                ) {{
                    __typename
                    ... on BoxResult {{
                        updatedBoxes {{ {UPDATED_BOX_FIELDS} }}
                        invalidBoxLabelIdentifiers
                    }}
                }}
            }}"
        );
        let data: MoveBoxesData = self
            .execute(
                "MoveBoxes",
                &query,
                json!({ "labelIdentifiers": label_identifiers, "locationId": location_id }),
                false,
            )
            .await?;
        data.result.into_response()
    }

    async fn assign_tags(
        &self,
        label_identifiers: &[String],
        tag_ids: &[DbId],
    ) -> Result<MutationResponse, ApiError> {
        let query = format!(
            "mutation AssignTagsToBoxes($labelIdentifiers: [String!]!, $tagIds: [Int!]!) {{
                assignTagsToBoxes(
                    updateInput: {{ labelIdentifiers: $labelIdentifiers, tagIds: $tagIds }}
                ) {{
                    __typename
                    ... on BoxResult {{
                        updatedBoxes {{ {UPDATED_BOX_FIELDS} }}
                        invalidBoxLabelIdentifiers
                    }}
                }}
            }}"
        );
        let data: AssignTagsData = self
            .execute(
                "AssignTagsToBoxes",
                &query,
                json!({ "labelIdentifiers": label_identifiers, "tagIds": tag_ids }),
                false,
            )
            .await?;
        data.result.into_response()
    }

    async fn assign_to_shipment(
        &self,
        shipment_id: DbId,
        label_identifiers: &[String],
    ) -> Result<MutationResponse, ApiError> {
        let query = format!(
            "mutation AssignBoxesToShipment($id: ID!, $labelIdentifiers: [String!]!) {{
                updateShipmentWhenPreparing(
                    updateInput: {{ id: $id, preparedBoxLabelIdentifiers: $labelIdentifiers }}
                ) {{
                    id
                    details {{
                        removedOn
                        box {{ {UPDATED_BOX_FIELDS} }}
                    }}
                }}
            }}"
        );
        let data: ShipmentData = self
            .execute(
                "AssignBoxesToShipment",
                &query,
                json!({ "id": shipment_id.to_string(), "labelIdentifiers": label_identifiers }),
                false,
            )
            .await?;
        Ok(data.shipment.into_response(label_identifiers))
    }
}
