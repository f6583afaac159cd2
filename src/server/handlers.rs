use super::types::{ErrorResponse, GenerateImageRequest, ImageQuery, SchemaQuery};
use crate::{
    Error,
    cloudflare::{ImageModel, SchemaClient, is_valid_model_id},
    config::Credentials,
    storage::{BlobStore, ListingFailure, collect_listing, object_key},
};
use axum::{
    extract::{Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{error, info, warn};

const IMAGE_JPEG: &str = "image/jpeg";

// Accepts unpadded input like a browser's atob.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Collaborators and settings every handler receives.
#[derive(Clone)]
pub struct AppState {
    pub image_model: Arc<dyn ImageModel>,
    pub store: Arc<dyn BlobStore>,
    pub schema_client: Arc<dyn SchemaClient>,
    pub credentials: Credentials,
    pub default_model: String,
    pub page_size: i32,
}

type TextError = (StatusCode, String);

fn text_error(status: StatusCode, message: impl Into<String>) -> TextError {
    (status, message.into())
}

pub async fn generate_image(
    State(state): State<AppState>,
    payload: Result<Json<GenerateImageRequest>, JsonRejection>,
) -> Result<Response, TextError> {
    let Json(request) = payload.map_err(|e| {
        warn!("Rejected generate_image body: {}", e);
        text_error(StatusCode::BAD_REQUEST, "Invalid request body")
    })?;

    let prompt = request
        .prompt
        .filter(|p| !p.is_empty())
        .ok_or_else(|| text_error(StatusCode::BAD_REQUEST, "Missing prompt"))?;
    let model = request
        .model
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| state.default_model.clone());
    if !is_valid_model_id(&model) {
        warn!("Rejected malformed model identifier {:?}", model);
        return Err(text_error(StatusCode::BAD_REQUEST, "Invalid model"));
    }

    info!("Generating image with model {}", model);

    let output = state
        .image_model
        .run(&model, json!({ "prompt": prompt }))
        .await
        .map_err(|e| {
            error!("Inference with model {} failed: {}", model, e);
            text_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    let Some(image) = output.get("image").and_then(Value::as_str) else {
        error!("Model {} returned no image field", model);
        return Err(text_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Model did not return an image.",
        ));
    };

    let key = object_key(&prompt);
    let bytes = decode_image(image).map_err(|e| {
        error!("Failed to decode image for {}: {}", key, e);
        text_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to decode image data")
    })?;

    state
        .store
        .put(&key, bytes, IMAGE_JPEG)
        .await
        .map_err(|e| {
            error!("Failed to store image {}: {}", key, e);
            text_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store image")
        })?;

    info!("Stored generated image as {}", key);

    Ok((
        [(header::CONTENT_TYPE, IMAGE_JPEG)],
        format!("data:image/jpeg;base64,{}", image),
    )
        .into_response())
}

fn decode_image(encoded: &str) -> Result<Vec<u8>, Error> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    Ok(LENIENT_BASE64.decode(compact)?)
}

pub async fn get_image(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, TextError> {
    let Some(key) = query.key.filter(|k| !k.is_empty()) else {
        error!("Missing key in query parameter");
        return Err(text_error(StatusCode::BAD_REQUEST, "Missing key"));
    };

    let object = state.store.get(&key).await.map_err(|e| {
        error!("Error accessing bucket for {}: {}", key, e);
        text_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error accessing storage bucket",
        )
    })?;

    let Some(object) = object else {
        error!("Object not found in bucket for key: {}", key);
        return Err(text_error(StatusCode::NOT_FOUND, "Not found"));
    };

    let content_type = object.content_type.clone().unwrap_or_default();
    let data = object.bytes().await.map_err(|e| {
        error!("Failed to read object {}: {}", key, e);
        text_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to read object data",
        )
    })?;

    Ok(([(header::CONTENT_TYPE, content_type)], data).into_response())
}

pub async fn list_images(State(state): State<AppState>) -> Result<Response, TextError> {
    match collect_listing(state.store.as_ref(), state.page_size).await {
        Ok(objects) => {
            info!("Listed {} objects", objects.len());
            Ok(Json(objects).into_response())
        }
        Err(ListingFailure::FirstPage(e)) => {
            error!("Failed to list objects in bucket: {}", e);
            Err(text_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to list objects in bucket",
            ))
        }
        Err(ListingFailure::Pagination(e)) => {
            error!("Failed to list objects in bucket (pagination): {}", e);
            Err(text_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to list objects in bucket (pagination)",
            ))
        }
    }
}

pub async fn get_schema(
    State(state): State<AppState>,
    Query(query): Query<SchemaQuery>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let bad_request =
        |msg: &str| (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(msg)));

    let Some(model) = query.model.filter(|m| !m.is_empty()) else {
        return Err(bad_request("Model not specified"));
    };
    let Some(account_id) = state.credentials.account_id.as_deref() else {
        return Err(bad_request("Account ID not specified"));
    };
    let Some(api_token) = state.credentials.api_token.as_deref() else {
        return Err(bad_request("API token not specified"));
    };

    match state.schema_client.get(account_id, &model, api_token).await {
        Ok(schema) => {
            info!("Fetched schema for model {}", model);
            Ok((StatusCode::OK, Json(schema)).into_response())
        }
        Err(e) => {
            error!("Cloudflare API error fetching schema for {}: {}", model, e);
            let status = match e.upstream_status() {
                Some(401) => StatusCode::UNAUTHORIZED,
                _ => StatusCode::BAD_GATEWAY,
            };
            let response = match e {
                Error::Vendor {
                    message, details, ..
                } => ErrorResponse {
                    error: message,
                    details,
                },
                other => ErrorResponse::new(other.to_string()),
            };
            Err((status, Json(response)))
        }
    }
}
