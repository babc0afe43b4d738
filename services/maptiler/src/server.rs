//! Dynamic mode: an HTTP server rendering XYZ tiles on demand.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use ingestion::PointSet;
use pyramid::{encode_png, render_tile, PointPipeline, TileFormat};
use renderer::{Colormap, ShadeHow};
use serde::Serialize;
use tiler_common::{Extent, TileCoord, TileGrid, TilerError, MAX_ZOOM, TILE_SIZE};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::config::DynamicArgs;
use crate::load_points;

/// Shared state for request handlers.
pub struct AppState {
    pipeline: Arc<PointPipeline>,
    bounds: BoundsResponse,
    colormap: Colormap,
}

impl AppState {
    pub fn new(points: Arc<PointSet>, colormap: Colormap, how: ShadeHow) -> Result<Self> {
        let extent = points.extent().ok_or(TilerError::EmptyDataset)?;
        let pipeline = PointPipeline::new(points)
            .with_bounds(*TileGrid::web_mercator(0).root())
            .with_colormap(colormap)
            .with_shade_how(how);
        Ok(Self {
            pipeline: Arc::new(pipeline),
            bounds: BoundsResponse::from_extent(extent),
            colormap,
        })
    }
}

/// Data extent in Web Mercator metres and in degrees.
#[derive(Debug, Clone, Serialize)]
pub struct BoundsResponse {
    pub extent: Extent,
    /// [west, south, east, north]
    pub lonlat: [f64; 4],
}

impl BoundsResponse {
    fn from_extent(extent: Extent) -> Self {
        let (west, south) = projection::meters_to_lnglat(extent.min_x, extent.min_y);
        let (east, north) = projection::meters_to_lnglat(extent.max_x, extent.max_y);
        Self {
            extent,
            lonlat: [west, south, east, north],
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub points: usize,
}

/// Build the router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/tiles/:z/:x/:y", get(tile_handler))
        .route("/bounds", get(bounds_handler))
        .route("/health", get(health_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}

pub async fn serve(args: DynamicArgs) -> Result<()> {
    let addr = args.listen_addr()?;
    let settings = args.dataset.resolve()?;
    let points = load_points(settings.load).await?;
    let state = Arc::new(AppState::new(points, settings.colormap, settings.how)?);

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(addr = %addr, "Map tiler listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}

/// GET /tiles/:z/:x/:y - one Web Mercator XYZ tile, `:y` may end in `.png`
pub async fn tile_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((z, x, y)): Path<(u32, u32, String)>,
) -> Response {
    let y_str = y.strip_suffix(".png").unwrap_or(&y);
    let Ok(y) = y_str.parse::<u32>() else {
        return (StatusCode::BAD_REQUEST, format!("invalid tile row '{}'", y)).into_response();
    };
    if z > MAX_ZOOM {
        return (
            StatusCode::BAD_REQUEST,
            format!("zoom {} exceeds maximum {}", z, MAX_ZOOM),
        )
            .into_response();
    }

    let coord = TileCoord::new(z, x, y);
    if !coord.is_valid() {
        return (StatusCode::NOT_FOUND, format!("tile {} does not exist", coord)).into_response();
    }

    let pipeline = state.pipeline.clone();
    let rendered = tokio::task::spawn_blocking(move || {
        let image = render_tile(&pipeline, &TileGrid::web_mercator(z), coord, TILE_SIZE)?;
        encode_png(&image)
    })
    .await;

    match rendered {
        Ok(Ok(bytes)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, TileFormat::Png.content_type()),
                (header::CACHE_CONTROL, "max-age=3600"),
            ],
            bytes,
        )
            .into_response(),
        Ok(Err(e)) => {
            error!(tile = %coord, error = %e, "Tile rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(e) => {
            error!(tile = %coord, error = %e, "Tile task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// GET /bounds - data extent
pub async fn bounds_handler(Extension(state): Extension<Arc<AppState>>) -> Json<BoundsResponse> {
    Json(state.bounds.clone())
}

/// GET /health - Basic health check
pub async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        points: state.pipeline.points().len(),
    })
}

/// GET / - map page with a dark basemap under the data layer
pub async fn index_handler(Extension(state): Extension<Arc<AppState>>) -> Html<String> {
    let [west, south, east, north] = state.bounds.lonlat;
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Datashader MapTiler</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <style>html, body, #map {{ height: 100%; margin: 0; background: #000; }}</style>
</head>
<body>
  <div id="map"></div>
  <script>
    const map = L.map('map');
    L.tileLayer('https://{{s}}.basemaps.cartocdn.com/dark_all/{{z}}/{{x}}/{{y}}.png', {{
      attribution: '&copy; OpenStreetMap contributors &copy; CARTO',
      maxZoom: {max_zoom}
    }}).addTo(map);
    L.tileLayer('/tiles/{{z}}/{{x}}/{{y}}.png', {{
      maxZoom: {max_zoom},
      attribution: 'colormap: {colormap}'
    }}).addTo(map);
    map.fitBounds([[{south}, {west}], [{north}, {east}]]);
  </script>
</body>
</html>
"#,
        max_zoom = MAX_ZOOM,
        colormap = state.colormap,
        south = south,
        west = west,
        north = north,
        east = east,
    ))
}
