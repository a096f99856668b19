use simplelog::*;
use std::fs::File;

/// Terminal plus file logging at Info, stamped with local time when available.
pub fn init_logging(log_file: &str) {
    let mut builder = ConfigBuilder::new();
    // Falls back to UTC when the local offset cannot be determined.
    let _ = builder.set_time_offset_to_local();
    let log_config = builder.build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Info,
        log_config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];

    match File::create(log_file) {
        Ok(file) => loggers.push(WriteLogger::new(LevelFilter::Info, log_config, file)),
        Err(e) => eprintln!("Failed to create log file {}: {}", log_file, e),
    }

    let _ = CombinedLogger::init(loggers);
}
