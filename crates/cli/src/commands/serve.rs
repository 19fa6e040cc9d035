// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wave serve`: an optional read-only HTTP query surface
//! over the event log and runs. Reads the same on-disk state directory a
//! concurrent `wave run` writes to; it does not execute pipelines itself.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use axum::extract::{Path as AxumPath, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use clap::Args;
use serde::Serialize;
use wave_core::RunId;
use wave_storage::StateStore;

use crate::config;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// TCP port to listen on.
    #[arg(long, default_value_t = 7420)]
    pub port: u16,

    /// Address to bind. Anything other than a loopback address requires
    /// `--token`.
    #[arg(long, default_value = "127.0.0.1")]
    pub bind: IpAddr,

    /// Bearer token required in the `Authorization` header for every
    /// request. Mandatory unless `--bind` is a loopback address.
    #[arg(long)]
    pub token: Option<String>,
}

struct AppState {
    state: StateStore,
    token: Option<String>,
}

pub async fn handle(args: ServeArgs, repo_root: &std::path::Path) -> Result<()> {
    if !args.bind.is_loopback() && args.token.is_none() {
        bail!("--token is required when --bind is not a loopback address");
    }

    let state = StateStore::open(&config::state_dir(repo_root))?;
    let app_state = Arc::new(AppState {
        state,
        token: args.token,
    });

    let router = Router::new()
        .route("/runs", get(list_runs))
        .route("/runs/{run_id}", get(get_run))
        .route("/runs/{run_id}/events", get(get_events))
        .route("/runs/{run_id}/progress", get(get_progress))
        .route("/runs/{run_id}/artifacts", get(get_artifacts))
        .with_state(app_state);

    let addr = SocketAddr::new(args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "wave serve listening");
    axum::serve(listener, router)
        .await
        .context("serving HTTP")?;
    Ok(())
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), StatusCode> {
    let Some(expected) = &state.token else {
        return Ok(());
    };
    let supplied = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if supplied == Some(expected.as_str()) {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn not_found(run_id: &RunId) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: format!("run {run_id} not found"),
        }),
    )
}

async fn list_runs(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Err(code) = authorize(&state, &headers) {
        return code.into_response();
    }
    Json(state.state.reader().all_runs()).into_response()
}

async fn get_run(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    AxumPath(run_id): AxumPath<String>,
) -> impl IntoResponse {
    if let Err(code) = authorize(&state, &headers) {
        return code.into_response();
    }
    let run_id = RunId::new(run_id);
    match state.state.reader().run(&run_id) {
        Some(run) => Json(run).into_response(),
        None => not_found(&run_id).into_response(),
    }
}

async fn get_events(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    AxumPath(run_id): AxumPath<String>,
) -> impl IntoResponse {
    if let Err(code) = authorize(&state, &headers) {
        return code.into_response();
    }
    let run_id = RunId::new(run_id);
    let reader = state.state.reader();
    if reader.run(&run_id).is_none() {
        return not_found(&run_id).into_response();
    }
    Json(reader.events_for_run(&run_id)).into_response()
}

async fn get_progress(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    AxumPath(run_id): AxumPath<String>,
) -> impl IntoResponse {
    if let Err(code) = authorize(&state, &headers) {
        return code.into_response();
    }
    let run_id = RunId::new(run_id);
    let reader = state.state.reader();
    if reader.run(&run_id).is_none() {
        return not_found(&run_id).into_response();
    }
    match reader.pipeline_progress(&run_id) {
        Some(progress) => Json(progress).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn get_artifacts(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    AxumPath(run_id): AxumPath<String>,
) -> impl IntoResponse {
    if let Err(code) = authorize(&state, &headers) {
        return code.into_response();
    }
    let run_id = RunId::new(run_id);
    let reader = state.state.reader();
    if reader.run(&run_id).is_none() {
        return not_found(&run_id).into_response();
    }
    Json(reader.artifacts_for_run(&run_id)).into_response()
}
