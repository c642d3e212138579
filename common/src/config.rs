use std::path::PathBuf;
use std::time::Duration;

/// Directory exported when the operator does not pass `--share-path`.
pub const DEFAULT_SHARE_PATH: &str = "/srv/shared";

/// Share name exported when the operator does not pass `--share-name`.
pub const DEFAULT_SHARE_NAME: &str = "shared";

/// How long each interactive choice waits before falling back to option 0.
pub const DEFAULT_PROMPT_TIMEOUT: Duration = Duration::from_secs(60);

/// How long the verifier waits for the daemon to open its primary port after start.
pub const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Global configuration options for a provisioning run.
///
/// This struct controls the runtime behavior of the application, including
/// UI verbosity, interactivity, and the failure policy for missing firewalls.
/// It is constructed from CLI arguments.
#[derive(Debug, Clone)]
pub struct Config {
    /// Toggles the display of the startup banner.
    pub no_banner: bool,

    /// Controls the visual density of the terminal output.
    ///
    /// # Levels
    /// * **0** (Default): Full UI, including colors, spinners, and trees.
    /// * **1**: Reduced styling.
    /// * **2**: Raw mode, only log lines.
    pub quiet: u8,

    /// Skips every interactive prompt and takes option 0.
    ///
    /// # Use Cases
    /// * Running in a CI/CD pipeline or from configuration management.
    /// * Piping the tool without a terminal attached.
    pub unattended: bool,

    /// Writes the daemon configuration with verbose logging enabled.
    pub debug: bool,

    /// Directory exported by the share.
    pub share_path: PathBuf,

    /// Name of the exported share.
    pub share_name: String,

    /// Upper bound for each timed selection prompt.
    pub prompt_timeout: Duration,

    /// Treat a host without any detected firewall backend as a failed run.
    ///
    /// By default a host without a firewall is considered permissive rather than broken.
    pub require_firewall: bool,

    /// Upper bound for waiting on the daemon to start listening before verification.
    pub settle_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            no_banner: false,
            quiet: 0,
            unattended: false,
            debug: false,
            share_path: PathBuf::from(DEFAULT_SHARE_PATH),
            share_name: DEFAULT_SHARE_NAME.to_string(),
            prompt_timeout: DEFAULT_PROMPT_TIMEOUT,
            require_firewall: false,
            settle_timeout: DEFAULT_SETTLE_TIMEOUT,
        }
    }
}
