mod api;
mod app;
mod auth;
mod dto;
mod error;
mod models;
mod repositories;
mod telemetry;
mod usecases;

#[tokio::main]
async fn main() {
    if let Err(err) = app::run().await {
        eprintln!("design-review failed: {err}");
        std::process::exit(1);
    }
}
