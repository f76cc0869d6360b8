//! Code-snippet echo. Nothing submitted here is executed.

use actix_web::{HttpResponse, web};

use folio_core::DomainError;
use folio_core::snippet;
use folio_shared::dto::{SnippetRequest, SnippetResponse};

use crate::middleware::error::AppResult;

/// POST /api/execute-code
pub async fn execute_code(body: web::Json<SnippetRequest>) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let output = snippet::echo(&req.code, &req.language, &req.user_inputs)
        .map_err(DomainError::from)?;

    Ok(HttpResponse::Ok().json(SnippetResponse { output }))
}
