use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use pallet_layout::config::LayoutConfig;
use pallet_layout::render::{self, AxisLabels, StyledPlacement};
use pallet_layout::types::{Counts, Dimensions, Layout, LayoutKind, StackPolicy};
use pallet_layout::{LayoutError, plan_stack_layout, plan_unit_layout};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct PalletRequest {
    pallet: Option<Dimensions>,
    item: Option<Dimensions>,
    height_margin: Option<f64>,
}

#[derive(Deserialize, Serialize)]
struct LocationRequest {
    pallet: Option<Dimensions>,
    location: Option<Dimensions>,
    max_stack: Option<u32>,
    aisle_gap: Option<f64>,
    /// Validated like the pallet margin; stack views are framed by the location.
    height_margin: Option<f64>,
}

#[derive(Serialize)]
struct LayoutResponse {
    kind: LayoutKind,
    counts: Counts,
    bounding_box: Dimensions,
    base_offset: f64,
    layers_used: usize,
    view_bounds: [f64; 3],
    axis_labels: AxisLabels,
    placements: Vec<StyledPlacement>,
}

impl LayoutResponse {
    fn new(layout: &Layout, height_margin: f64) -> Self {
        let (vx, vy, vz) = render::view_bounds(layout, height_margin);
        Self {
            kind: layout.kind,
            counts: layout.counts,
            bounding_box: layout.bounding_box,
            base_offset: layout.base_offset,
            layers_used: layout.layers_used,
            view_bounds: [vx, vy, vz],
            axis_labels: render::axis_labels(layout),
            placements: render::style(layout),
        }
    }
}

fn bad_request(err: LayoutError) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, err.to_string())
}

fn resolve_margin(requested: Option<f64>, config: &LayoutConfig) -> Result<f64, LayoutError> {
    let margin = requested.unwrap_or(config.height_margin);
    if margin >= 1.0 && margin.is_finite() {
        Ok(margin)
    } else {
        Err(LayoutError::InvalidMargin(margin))
    }
}

async fn plan_pallet(
    State(config): State<LayoutConfig>,
    Json(req): Json<PalletRequest>,
) -> Result<Json<LayoutResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /layout/pallet"
    );

    let height_margin = resolve_margin(req.height_margin, &config).map_err(bad_request)?;
    let layout = plan_unit_layout(
        req.pallet.unwrap_or(config.pallet),
        req.item.unwrap_or(config.item),
    )
    .map_err(bad_request)?;
    Ok(Json(LayoutResponse::new(&layout, height_margin)))
}

async fn plan_location(
    State(config): State<LayoutConfig>,
    Json(req): Json<LocationRequest>,
) -> Result<Json<LayoutResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /layout/location"
    );

    let height_margin = resolve_margin(req.height_margin, &config).map_err(bad_request)?;
    let policy = StackPolicy::new(
        req.max_stack.unwrap_or(config.max_stack),
        req.aisle_gap.unwrap_or(config.aisle_gap),
    )
    .map_err(bad_request)?;

    let layout = plan_stack_layout(
        req.pallet.unwrap_or(config.pallet),
        policy,
        req.location.unwrap_or(config.location),
    )
    .map_err(bad_request)?;
    Ok(Json(LayoutResponse::new(&layout, height_margin)))
}

fn app(config: LayoutConfig) -> Router {
    Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/layout/pallet", post(plan_pallet))
        .route("/layout/location", post(plan_location))
        .with_state(config)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

#[tokio::main]
async fn main() {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let config = match std::env::var("LAYOUT_CONFIG") {
        Ok(path) => LayoutConfig::from_path(&path).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }),
        Err(_) => LayoutConfig::default(),
    };

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app(config)).await.unwrap();
}
