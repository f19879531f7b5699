//! Phone call handlers
//!
//! Provider-compatible call resource routes under
//! `/2010-04-01/Accounts/{account_sid}`. Request authentication and account
//! scoping live in front of this service; the path `account_sid` is taken at
//! face value.

use crate::dto::{CallListResponse, CreateCallRequest, PageParams, PhoneCallResponse};
use actix_web::{web, HttpResponse};
use telapi_core::{models::PhoneCall, traits::PhoneCallRepository, AppError};
use telapi_db::PgPhoneCallRepository;
use tracing::{debug, info, instrument};
use validator::Validate;

/// Create a call resource in `initiating` state
///
/// POST /2010-04-01/Accounts/{account_sid}/Calls.json
#[instrument(skip(repo, form))]
pub async fn create_call(
    repo: web::Data<PgPhoneCallRepository>,
    path: web::Path<String>,
    form: web::Form<CreateCallRequest>,
) -> Result<HttpResponse, AppError> {
    let account_sid = path.into_inner();
    form.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let call = PhoneCall::new(account_sid, form.to.clone(), form.from.clone());
    let created = repo.create(&call).await?;

    info!("Created call {} for account {}", created.sid, created.account_sid);

    Ok(HttpResponse::Created().json(PhoneCallResponse::from(&created)))
}

/// Fetch one call resource
///
/// GET /2010-04-01/Accounts/{account_sid}/Calls/{sid}.json
#[instrument(skip(repo))]
pub async fn get_call(
    repo: web::Data<PgPhoneCallRepository>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (account_sid, sid) = path.into_inner();
    debug!("Fetching call {} for account {}", sid, account_sid);

    let call = repo
        .find_by_sid(&sid)
        .await?
        .filter(|c| c.account_sid == account_sid)
        .ok_or_else(|| AppError::CallNotFound(sid))?;

    Ok(HttpResponse::Ok().json(PhoneCallResponse::from(&call)))
}

/// List an account's call resources, newest first
///
/// GET /2010-04-01/Accounts/{account_sid}/Calls.json
#[instrument(skip(repo))]
pub async fn list_calls(
    repo: web::Data<PgPhoneCallRepository>,
    path: web::Path<String>,
    query: web::Query<PageParams>,
) -> Result<HttpResponse, AppError> {
    let account_sid = path.into_inner();
    debug!("Listing calls for account {}", account_sid);

    let calls = repo
        .list_by_account(&account_sid, query.limit(), query.offset())
        .await?;

    Ok(HttpResponse::Ok().json(CallListResponse {
        page: query.page.max(0),
        page_size: query.limit(),
        calls: calls.iter().map(PhoneCallResponse::from).collect(),
    }))
}

/// Configure call resource routes
pub fn configure_calls(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/2010-04-01/Accounts/{account_sid}")
            .route("/Calls.json", web::post().to(create_call))
            .route("/Calls.json", web::get().to(list_calls))
            .route("/Calls/{sid}.json", web::get().to(get_call)),
    );
}
