//! Injected configuration for the engine session.

use std::path::PathBuf;

use crate::engine::RecordMode;

/// Configuration for spawning an [`super::RSession`].
///
/// Everything the bridge needs from the outside world comes through here:
/// the engine binary, its arguments, the initial recording mode, and the
/// prefix used for generated symbol names. Nothing is hard-coded in the
/// session itself.
///
/// The binary resolves, in order: an explicit path given to
/// [`EngineConfig::new`], the `STATCHAIN_ENGINE` environment variable
/// (`.env` files are honored via dotenvy), then plain `"R"` on `PATH`.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Engine executable to spawn.
    pub binary: PathBuf,
    /// Arguments passed to the executable.
    pub args: Vec<String>,
    /// Recording mode the session starts in.
    pub record: RecordMode,
    /// Prefix for generated unique symbol names.
    pub symbol_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: resolve_binary(),
            args: vec!["--slave".to_string(), "--no-readline".to_string()],
            record: RecordMode::Disabled,
            symbol_prefix: "sc".to_string(),
        }
    }
}

impl EngineConfig {
    /// Configuration for an explicit engine binary path.
    ///
    /// An explicit path is taken at face value: spawn failure is reported
    /// directly instead of probing the conventional install locations.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_record(mut self, record: RecordMode) -> Self {
        self.record = record;
        self
    }

    #[must_use]
    pub fn with_symbol_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.symbol_prefix = prefix.into();
        self
    }

    /// True if the binary was left at its unqualified default, in which
    /// case spawn failure falls back to probing [`Self::fallback_locations`].
    pub(crate) fn uses_default_binary(&self) -> bool {
        self.binary == PathBuf::from("R")
    }

    /// Conventional install locations probed when `"R"` is not on `PATH`.
    pub fn fallback_locations() -> Vec<PathBuf> {
        [
            "R/bin/R",
            "/usr/lib/R/bin/R",
            "/usr/local/bin/R",
            "/opt/homebrew/bin/R",
            "/Library/Frameworks/R.framework/Resources/R",
            "C:\\Program Files\\R\\bin\\x64\\R.exe",
            "C:\\Program Files\\R\\bin\\R.exe",
        ]
        .into_iter()
        .map(PathBuf::from)
        .collect()
    }
}

fn resolve_binary() -> PathBuf {
    dotenvy::dotenv().ok();
    std::env::var_os("STATCHAIN_ENGINE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("R"))
}
