use revenue_lag_report::config;
use revenue_lag_report::logging::{self, Stage};
use revenue_lag_report::report;

fn main() {
    let config = match config::load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    logging::init_logger(
        config.logging.level,
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );
    logging::info(
        Stage::System,
        None,
        &format!("Revenue lag report for {}", config.input_path.display()),
    );

    if let Err(e) = report::run(&config) {
        logging::log_stage_failure(Stage::System, "Report", &e);
        std::process::exit(1);
    }
}
