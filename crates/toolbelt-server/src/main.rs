use toolbelt_core::config::Settings;
use toolbelt_core::logging;
use toolbelt_server::ApiServer;

fn main() {
    let (settings, path) = match Settings::resolve() {
        Ok(resolved) => resolved,
        Err(err) => {
            eprintln!("Failed to load config: {}", err);
            std::process::exit(1);
        }
    };
    logging::init(settings.log_format, "toolbelt_server=info,toolbelt_core=info");
    match &path {
        Some(path) => tracing::info!(config = %path.display(), "loaded config"),
        None => tracing::info!("no config file; using defaults"),
    }

    let server = match ApiServer::bind(&settings) {
        Ok(server) => server,
        Err(err) => {
            tracing::error!(error = %err, "startup failed");
            std::process::exit(1);
        }
    };
    match server.spawn() {
        Ok(running) => running.join(),
        Err(err) => {
            tracing::error!(error = %err, "startup failed");
            std::process::exit(1);
        }
    }
}
