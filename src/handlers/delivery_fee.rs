use axum::{Json, body::Bytes, extract::State, http::Method};
use tracing::{debug, warn};
use uuid::Uuid;

use super::ApiError;
use crate::{
    models::{delivery_fee::DeliveryFee, delivery_request::DeliveryRequest},
    server::AppState,
};

/// `POST /delivery-fee`. Malformed or non-object bodies are reported as
/// `_schema` validation errors, whatever the content type.
pub async fn handle_delivery_fee(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DeliveryFee>, ApiError> {
    let request_id = Uuid::new_v4();

    let request = DeliveryRequest::from_slice(&body).inspect_err(|errors| {
        warn!(
            %request_id,
            fields = ?errors.fields().collect::<Vec<_>>(),
            "delivery fee request rejected"
        );
    })?;

    let fee = state.pricing.calculate(&request);

    debug!(
        %request_id,
        cart_value = request.cart_value,
        delivery_distance = request.delivery_distance,
        number_of_items = request.number_of_items,
        time = %request.time,
        delivery_fee = fee.cents(),
        "delivery fee calculated"
    );

    Ok(Json(fee))
}

pub async fn handle_method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed {
        allow: Method::POST,
    }
}
