use crate::router::{
    create_app,
    AppState,
};
use axum::extract::Request;
use eyre::{
    Context as _,
    Result,
};
use std::future::Future;
use tokio::net::TcpListener;

/// Serves the dashboard on `listener` until `shutdown` resolves, then drains in-flight requests.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr().wrap_err("Listener has no local address")?;
    let app = axum::ServiceExt::<Request>::into_make_service(create_app(state));

    info!("listening on http://{local_addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .wrap_err("HTTP server failed")?;
    info!("HTTP server stopped");

    Ok(())
}
