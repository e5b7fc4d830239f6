use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use transport_booking::config::environment::EnvironmentConfig;
use transport_booking::database::{create_pool, mask_database_url};
use transport_booking::middleware::cors::{cors_middleware, cors_middleware_with_origins};
use transport_booking::routes;
use transport_booking::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚛 Transport Booking - Núcleo del ciclo de vida de reservas");
    info!("===========================================================");

    let config = EnvironmentConfig::default();

    // Inicializar base de datos
    info!("🗄️ Conectando a {}", mask_database_url(&config.database_url));
    let pool = match create_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    // Crear router de la API
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    // Sin CORS_ORIGINS se permite cualquier origen (solo desarrollo)
    let cors = if config.cors_origins.is_empty() {
        cors_middleware()
    } else {
        cors_middleware_with_origins(config.cors_origins.clone())
    };

    let app_state = AppState::new(pool, config);

    let app = Router::new()
        .route("/health", get(health_endpoint))
        .nest("/api/booking", routes::booking_routes::create_booking_router())
        .layer(cors)
        .with_state(app_state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("📦 Endpoints - Booking:");
    info!("   POST /api/booking - Crear reserva (intake, estado pending)");
    info!("   GET  /api/booking/:id - Obtener reserva");
    info!("   GET  /api/booking/:id/actions - Transiciones disponibles para un actor");
    info!("   POST /api/booking/:id/confirm - Confirmar reserva (admin)");
    info!("   POST /api/booking/:id/assign-driver - Asignar conductor (admin)");
    info!("   POST /api/booking/:id/accept - Aceptar orden (admin)");
    info!("   POST /api/booking/:id/delivery-status - Avanzar entrega (conductor)");
    info!("   POST /api/booking/:id/complete - Completar reserva (admin o conductor)");
    info!("   POST /api/booking/:id/cancellation/request - Solicitar cancelación (cliente)");
    info!("   POST /api/booking/:id/cancellation/review - Aprobar/denegar cancelación");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            anyhow::anyhow!(e)
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Health check simple
async fn health_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "service": "transport-booking",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
