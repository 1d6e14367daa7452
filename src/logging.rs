/// Installs the platform logger: `env_logger` natively (configured through
/// `RUST_LOG`), the browser console on wasm.
///
/// Calling it more than once is harmless; only the first call installs a logger.
pub fn init() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Could not initialize logger: {}", e).into());
        }
    }
}
