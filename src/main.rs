use mqpost::app::startup;
use mqpost::core::error_handling::log_error_with_context;

fn main() {
    if let Err(error) = startup::run() {
        log_error_with_context(&error, "mqpost");
        // Logging may not be configured when startup fails early; make sure
        // the failure reaches the terminal either way.
        eprintln!("mqpost: {error}");
        std::process::exit(1);
    }
}
