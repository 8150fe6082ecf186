use std::io::Write;

/// Sets up `env_logger`.
///
/// `RUST_LOG` wins when it is set; otherwise `--debug` selects `debug` and the
/// default is `warn` so log lines don't mix with the assistant's output.
pub fn init_logging(debug: bool) {
    let filter = if debug { "debug" } else { "warn" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
