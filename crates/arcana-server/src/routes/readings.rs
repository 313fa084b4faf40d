use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use arcana_core::{ReadingError, StartReadingRequest};
use arcana_schema::{Locale, Message, TarotCard, VoiceGender};
use arcana_speech::SynthesizedAudio;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(start_reading).get(list_readings))
        .route("/{id}/messages", post(continue_reading))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartReadingBody {
    pub cards: Vec<TarotCard>,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub locale: Locale,
    #[serde(default)]
    pub generate_audio: bool,
    #[serde(default)]
    pub voice_gender: VoiceGender,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartReadingReply {
    pub reading: String,
    pub conversation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<SynthesizedAudio>,
}

#[derive(Deserialize)]
pub struct ContinueBody {
    pub question: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueReply {
    pub response: String,
    pub updated_history: Vec<Message>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingSummary {
    pub id: String,
    pub initial_question: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct ErrorReply {
    pub error: String,
}

/// The session credential travels as a bearer token. An absent or
/// malformed header verifies as rejected downstream.
fn bearer_token(headers: &HeaderMap) -> String {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string()
}

/// Auth rejection is a hard redirect to the re-authentication flow, never
/// an error payload. Everything else maps to a status plus the
/// caller-facing message; internal detail is logged here only.
fn start_error_response(err: ReadingError, locale: Locale) -> Response {
    if err.is_auth_rejection() {
        return Redirect::to("/logout").into_response();
    }
    tracing::error!("start reading failed: {err}");
    let status = match &err {
        ReadingError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ReadingError::InvalidSelection | ReadingError::EmptyFollowUp => StatusCode::BAD_REQUEST,
        ReadingError::InvalidQuestion => StatusCode::UNPROCESSABLE_ENTITY,
        ReadingError::NotFoundOrUnauthorized => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    };
    (
        status,
        Json(ErrorReply {
            error: err.user_message(locale).to_string(),
        }),
    )
        .into_response()
}

fn followup_error_response(err: ReadingError) -> Response {
    if err.is_auth_rejection() {
        return Redirect::to("/logout").into_response();
    }
    tracing::error!("continue reading failed: {err}");
    let status = match &err {
        ReadingError::EmptyFollowUp => StatusCode::BAD_REQUEST,
        ReadingError::NotFoundOrUnauthorized => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    };
    (
        status,
        Json(ErrorReply {
            error: err.followup_message().to_string(),
        }),
    )
        .into_response()
}

async fn start_reading(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<StartReadingBody>,
) -> Response {
    let credential = bearer_token(&headers);
    let locale = body.locale;
    let request = StartReadingRequest {
        cards: body.cards,
        question: body.question,
        locale,
        generate_audio: body.generate_audio,
        voice_gender: body.voice_gender,
    };
    match state.pipeline.start_reading(&credential, request).await {
        Ok(started) => Json(StartReadingReply {
            reading: started.reading,
            conversation_id: started.conversation_id,
            audio: started.audio,
        })
        .into_response(),
        Err(err) => start_error_response(err, locale),
    }
}

async fn continue_reading(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<ContinueBody>,
) -> Response {
    let credential = bearer_token(&headers);
    match state
        .pipeline
        .continue_reading(&credential, &id, &body.question)
        .await
    {
        Ok(continued) => Json(ContinueReply {
            response: continued.response,
            updated_history: continued.updated_history,
        })
        .into_response(),
        Err(err) => followup_error_response(err),
    }
}

async fn list_readings(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let credential = bearer_token(&headers);
    match state.pipeline.list_readings(&credential).await {
        Ok(listed) => Json(
            listed
                .into_iter()
                .map(|summary| ReadingSummary {
                    id: summary.id,
                    initial_question: summary.initial_question,
                    created_at: summary.created_at,
                    updated_at: summary.updated_at,
                })
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(err) => followup_error_response(err),
    }
}
