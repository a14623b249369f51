//! GraphQL wire DTOs and their conversion into domain types.
//!
//! Result unions are discriminated by `__typename`. Unknown type names
//! deserialize to an `Unknown` variant. Both unknown result types and
//! missing or mistyped fields are [`ApiError::Malformed`]: the response
//! does not fit the schema this client was built against, so retrying
//! will not help.

use std::collections::HashSet;

use boxwise_core::batch::MutationResponse;
use boxwise_core::box_state::BoxState;
use boxwise_core::boxes::{BaseRef, BoxRef, LocationRef, TagRef, UpdatedBox};
use boxwise_core::types::{DbId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};

use crate::api::{CodeLookup, LabelLookup};
use crate::error::ApiError;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Request body for a GraphQL POST.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest<'a, V: Serialize> {
    pub operation_name: &'a str,
    pub query: &'a str,
    pub variables: V,
}

/// Standard GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<ErrorExtensions>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorExtensions {
    pub code: Option<String>,
}

impl GraphQlError {
    /// Map a top-level GraphQL error onto the structured API errors.
    pub fn into_api_error(self) -> ApiError {
        let code = self.extensions.and_then(|ext| ext.code);
        match code.as_deref() {
            Some("FORBIDDEN") => ApiError::InsufficientPermission,
            Some("NOT_FOUND") => ApiError::NotFound,
            _ => ApiError::Application {
                code: code.unwrap_or_else(|| "GRAPHQL_ERROR".to_string()),
                message: self.message,
            },
        }
    }
}

/// GraphQL `ID`s arrive as strings; older endpoints send integers.
fn deserialize_id<'de, D>(deserializer: D) -> Result<DbId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Str(String),
        Num(DbId),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Num(id) => Ok(id),
        RawId::Str(s) => s
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid id '{s}'"))),
    }
}

// ---------------------------------------------------------------------------
// Box
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct BaseDto {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: DbId,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LocationDto {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: DbId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub base: Option<BaseDto>,
}

impl LocationDto {
    fn to_location_ref(&self) -> LocationRef {
        LocationRef {
            id: self.id,
            name: self.name.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TagDto {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: DbId,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxDto {
    pub label_identifier: String,
    pub state: BoxState,
    pub location: Option<LocationDto>,
    #[serde(default)]
    pub tags: Option<Vec<TagDto>>,
    pub last_modified_on: Option<Timestamp>,
    #[serde(default)]
    pub deleted_on: Option<Timestamp>,
}

impl BoxDto {
    /// Convert into a snapshot. The owning base is taken from the location.
    pub fn into_box_ref(self) -> Result<BoxRef, ApiError> {
        let location = self.location.ok_or_else(|| {
            ApiError::Malformed(format!("box {} has no location", self.label_identifier))
        })?;
        let base = location.base.as_ref().ok_or_else(|| {
            ApiError::Malformed(format!("box {} has no base", self.label_identifier))
        })?;

        Ok(BoxRef {
            base: BaseRef {
                id: base.id,
                name: base.name.clone(),
            },
            location: Some(location.to_location_ref()),
            label_identifier: self.label_identifier,
            state: self.state,
            tags: self
                .tags
                .unwrap_or_default()
                .into_iter()
                .map(|t| TagRef {
                    id: t.id,
                    name: t.name,
                })
                .collect(),
            last_modified_on: self.last_modified_on,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedBoxDto {
    pub label_identifier: String,
    pub state: BoxState,
    pub location: Option<LocationDto>,
    pub last_modified_on: Option<Timestamp>,
}

impl From<UpdatedBoxDto> for UpdatedBox {
    fn from(dto: UpdatedBoxDto) -> Self {
        Self {
            location: dto.location.as_ref().map(LocationDto::to_location_ref),
            label_identifier: dto.label_identifier,
            state: dto.state,
            last_modified_on: dto.last_modified_on,
        }
    }
}

// ---------------------------------------------------------------------------
// Code lookup
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct QrCodeData {
    #[serde(rename = "qrCode")]
    pub qr_code: QrCodeResult,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
pub enum QrCodeResult {
    QrCode {
        #[serde(rename = "box", default)]
        linked_box: Option<LinkedBoxResult>,
    },
    InsufficientPermissionError,
    ResourceDoesNotExistError,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
pub enum LinkedBoxResult {
    Box(BoxDto),
    InsufficientPermissionError,
    UnauthorizedForBaseError,
    ResourceDoesNotExistError,
    #[serde(other)]
    Unknown,
}

impl QrCodeResult {
    pub fn into_lookup(self) -> Result<CodeLookup, ApiError> {
        match self {
            Self::QrCode { linked_box: None } => Ok(CodeLookup::NotAssigned),
            Self::QrCode {
                linked_box: Some(linked),
            } => match linked {
                LinkedBoxResult::Box(dto) => Ok(CodeLookup::Box(dto.into_box_ref()?)),
                LinkedBoxResult::InsufficientPermissionError
                | LinkedBoxResult::UnauthorizedForBaseError => Ok(CodeLookup::BoxNotAuthorized),
                LinkedBoxResult::ResourceDoesNotExistError => Ok(CodeLookup::BoxNotFound),
                LinkedBoxResult::Unknown => Err(unknown_result("box")),
            },
            Self::InsufficientPermissionError => Err(ApiError::InsufficientPermission),
            Self::ResourceDoesNotExistError => Err(ApiError::NotFound),
            Self::Unknown => Err(unknown_result("qrCode")),
        }
    }
}

// ---------------------------------------------------------------------------
// Label lookup
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct BoxByLabelData {
    #[serde(rename = "box")]
    pub found: Option<BoxDto>,
}

impl BoxByLabelData {
    pub fn into_lookup(self) -> Result<LabelLookup, ApiError> {
        match self.found {
            None => Err(ApiError::NotFound),
            Some(dto) if dto.deleted_on.is_some() => Ok(LabelLookup::Deleted),
            Some(dto) => Ok(LabelLookup::Box(dto.into_box_ref()?)),
        }
    }
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct MoveBoxesData {
    #[serde(rename = "moveBoxesToLocation")]
    pub result: BoxMutationResult,
}

#[derive(Debug, Deserialize)]
pub struct AssignTagsData {
    #[serde(rename = "assignTagsToBoxes")]
    pub result: BoxMutationResult,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
pub enum BoxMutationResult {
    BoxResult(BoxResultDto),
    InsufficientPermissionError,
    UnauthorizedForBaseError,
    ResourceDoesNotExistError,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxResultDto {
    pub updated_boxes: Vec<UpdatedBoxDto>,
    pub invalid_box_label_identifiers: Vec<String>,
}

impl BoxMutationResult {
    pub fn into_response(self) -> Result<MutationResponse, ApiError> {
        match self {
            Self::BoxResult(dto) => Ok(MutationResponse {
                updated_boxes: dto.updated_boxes.into_iter().map(UpdatedBox::from).collect(),
                invalid_identifiers: dto.invalid_box_label_identifiers,
            }),
            Self::InsufficientPermissionError | Self::UnauthorizedForBaseError => {
                Err(ApiError::InsufficientPermission)
            }
            Self::ResourceDoesNotExistError => Err(ApiError::NotFound),
            Self::Unknown => Err(unknown_result("BoxResult")),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ShipmentData {
    #[serde(rename = "updateShipmentWhenPreparing")]
    pub shipment: ShipmentDto,
}

#[derive(Debug, Deserialize)]
pub struct ShipmentDto {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: DbId,
    #[serde(default)]
    pub details: Vec<ShipmentDetailDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentDetailDto {
    #[serde(default)]
    pub removed_on: Option<Timestamp>,
    #[serde(rename = "box")]
    pub shipped_box: UpdatedBoxDto,
}

impl ShipmentDto {
    /// Submitted boxes now active on the shipment are updated; every other
    /// submitted identifier is invalid.
    pub fn into_response(self, submitted: &[String]) -> MutationResponse {
        let wanted: HashSet<&str> = submitted.iter().map(String::as_str).collect();

        let updated_boxes: Vec<UpdatedBox> = self
            .details
            .into_iter()
            .filter(|d| d.removed_on.is_none())
            .filter(|d| wanted.contains(d.shipped_box.label_identifier.as_str()))
            .map(|d| UpdatedBox::from(d.shipped_box))
            .collect();

        let on_shipment: HashSet<&str> = updated_boxes
            .iter()
            .map(|b| b.label_identifier.as_str())
            .collect();
        let invalid_identifiers = submitted
            .iter()
            .filter(|id| !on_shipment.contains(id.as_str()))
            .cloned()
            .collect();

        MutationResponse {
            updated_boxes,
            invalid_identifiers,
        }
    }
}

fn unknown_result(field: &str) -> ApiError {
    ApiError::Malformed(format!("unexpected result type for {field}"))
}
