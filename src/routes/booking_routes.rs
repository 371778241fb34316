use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::booking_dto::{BookingListQuery, CancelRequest, QuoteRequest, SubmissionForm};
use crate::dto::ApiResponse;
use crate::models::{ActorContext, Booking};
use crate::services::PriceQuote;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

/// Customer booking routes, mounted under `/api/bookings`.
///
/// `body_limit` caps the multipart submission, proof image included.
pub fn create_booking_router(body_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/", post(submit_booking).get(list_my_bookings))
        .route("/quote", post(quote_booking))
        .route("/:id", get(get_booking))
        .route("/:id/cancel", post(cancel_booking))
        .layer(DefaultBodyLimit::max(body_limit))
}

async fn quote_booking(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> AppResult<Json<ApiResponse<PriceQuote>>> {
    let range = request.range()?;
    let quote = state
        .bookings
        .quote(request.vehicle_id, &range, &request.accessories)
        .await?;

    Ok(Json(ApiResponse::success(quote)))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

async fn submit_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<Booking>>)> {
    let mut form = SubmissionForm::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "payment_proof" {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field.bytes().await.map_err(multipart_error)?;
            form.set_proof(content_type, bytes);
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            form.set_field(&name, &value)?;
        }
    }
    let submission = form.finish()?;

    // The file is written first so the booking row never points at nothing
    let proof_ref = match submission.proof {
        Some(upload) => Some(state.proofs.store(&upload.content_type, upload.bytes).await?),
        None => None,
    };

    let result = state
        .bookings
        .submit(
            &actor,
            submission.vehicle_id,
            submission.range,
            submission.accessories,
            submission.payment_method,
            proof_ref.clone(),
        )
        .await;

    match result {
        Ok(booking) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success_with_message(
                booking,
                "Booking submitted and awaiting admin approval",
            )),
        )),
        Err(e) => {
            if let Some(reference) = proof_ref {
                if let Err(discard_err) = state.proofs.discard(&reference).await {
                    tracing::warn!("⚠️ Could not discard orphaned proof {}: {}", reference, discard_err);
                }
            }
            Err(e.into())
        }
    }
}

async fn list_my_bookings(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Query(query): Query<BookingListQuery>,
) -> AppResult<Json<Vec<Booking>>> {
    let bookings = state.bookings.list_mine(&actor, query.status).await?;
    Ok(Json(bookings))
}

async fn get_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Booking>> {
    let booking = state.bookings.get(&actor, id).await?;
    Ok(Json(booking))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<Uuid>,
    request: Option<Json<CancelRequest>>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    request.validate()?;

    let booking = state.bookings.cancel(&actor, id, request.reason).await?;
    Ok(Json(ApiResponse::success_with_message(booking, "Booking cancelled")))
}
