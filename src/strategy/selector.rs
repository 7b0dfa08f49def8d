//! Strategy selection from a capability probe.
//!
//! A process picks the direct strategy when its host runtime predates engine
//! isolation, or when it was itself launched with every capability grant the
//! engine needs. Otherwise formatting runs in worker processes that are started
//! with those grants.

use serde::Serialize;

/// Flag carrying one capability grant.
pub const GRANT_FLAG: &str = "--grant";

/// Grant target appended to each capability.
pub const GRANT_TARGET: &str = "all";

/// Capabilities the engine's formatting call requires.
pub const REQUIRED_GRANTS: &[&str] = &["engine.parse", "engine.layout", "engine.diagnostics"];

/// First host runtime version that isolates the engine behind grants.
pub const ISOLATION_MIN_VERSION: u32 = 2;

/// Host runtime version assumed when the environment does not say otherwise.
pub const HOST_RUNTIME_VERSION: u32 = 2;

/// Environment variable overriding the probed runtime version.
pub const RUNTIME_VERSION_ENV: &str = "GENFMT_RUNTIME_VERSION";

/// The two interchangeable execution paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Direct,
    Worker,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Worker => write!(f, "worker"),
        }
    }
}

/// What the probe sees of the running process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeInfo {
    pub version: u32,
    pub launch_args: Vec<String>,
}

impl RuntimeInfo {
    /// Probe the current process.
    pub fn current() -> Self {
        let version = std::env::var(RUNTIME_VERSION_ENV)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(HOST_RUNTIME_VERSION);
        Self {
            version,
            launch_args: std::env::args().skip(1).collect(),
        }
    }
}

/// Apply the decision rule.
pub fn select_kind(runtime: &RuntimeInfo) -> StrategyKind {
    if runtime.version < ISOLATION_MIN_VERSION || has_required_grants(&runtime.launch_args) {
        StrategyKind::Direct
    } else {
        StrategyKind::Worker
    }
}

/// Whether `args` carry every grant in [`REQUIRED_GRANTS`].
pub fn has_required_grants<S: AsRef<str>>(args: &[S]) -> bool {
    REQUIRED_GRANTS.iter().all(|grant| has_grant(args, grant))
}

/// Whether `args` grant `capability`, either as `--grant=<cap>=all` or as the
/// pair `--grant` `<cap>=all`. A value is only accepted right after the flag.
pub fn has_grant<S: AsRef<str>>(args: &[S], capability: &str) -> bool {
    let value = format!("{}={}", capability, GRANT_TARGET);
    let compound = format!("{}={}", GRANT_FLAG, value);

    args.iter().enumerate().any(|(i, arg)| {
        let arg = arg.as_ref();
        arg == compound || (arg == value && i > 0 && args[i - 1].as_ref() == GRANT_FLAG)
    })
}

/// The grant arguments a worker is launched with, one compound argument each.
pub fn grant_args() -> Vec<String> {
    REQUIRED_GRANTS
        .iter()
        .map(|grant| format!("{}={}={}", GRANT_FLAG, grant, GRANT_TARGET))
        .collect()
}
