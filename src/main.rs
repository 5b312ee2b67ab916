mod app;
mod assessment;
mod athlete;
mod capture;
mod commands;
mod config;
mod counter;
mod data;
mod exercise;
mod flow;
mod logging;
mod setup;
mod ui;
mod upload;

#[tokio::main]
async fn main() {
    if let Err(e) = app::run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
