use astra::Server;
use ecofinder::config::Config;
use ecofinder::db::connection::{init_db, Database};
use ecofinder::responses::error_to_response;
use ecofinder::router::handle;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();

    // Create the database handle and apply the schema.
    let db = Database::new(config.database_path.as_str());
    if let Err(e) = init_db(&db, &config.schema_path) {
        error!(error = %e, "database initialization failed");
        std::process::exit(1);
    }

    info!(addr = %config.bind_addr, "starting server");
    let server = Server::bind(&config.bind_addr).max_workers(8);

    let bounds = config.page_bounds;
    let result = server.serve(move |req, _info| match handle(req, &db, bounds) {
        Ok(resp) => resp,
        Err(err) => error_to_response(err),
    });

    if let Err(e) = result {
        error!(error = %e, "server ended with error");
    }
}
