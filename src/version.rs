// Crate identity baked in at build time, for the startup log line

/// Version string taken from the package manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Binary name taken from the package manifest.
pub const NAME: &str = env!("CARGO_PKG_NAME");
