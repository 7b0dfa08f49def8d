//! Formatting strategies and the process-wide choice between them.
//!
//! The strategy is decided once per process, on first use, and every caller
//! after that shares it.

pub mod direct;
pub mod selector;

pub use direct::DirectFormatter;
pub use selector::{RuntimeInfo, StrategyKind, select_kind};

use crate::config::{FormatterConfig, StrategyPreference};
use crate::error::Result;
use crate::worker::{Launcher, TicketPool};
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

static GLOBAL: OnceLock<Strategy> = OnceLock::new();

/// A ready-to-use formatting strategy.
#[derive(Debug, Clone)]
pub enum Strategy {
    Direct(DirectFormatter),
    Worker(Launcher),
}

impl Strategy {
    /// Build the strategy `config` asks for, probing `runtime` when it says auto.
    pub fn from_config(config: &FormatterConfig, runtime: &RuntimeInfo) -> Result<Self> {
        config.validate()?;

        let kind = match config.strategy {
            StrategyPreference::Auto => select_kind(runtime),
            StrategyPreference::Direct => StrategyKind::Direct,
            StrategyPreference::Worker => StrategyKind::Worker,
        };

        let strategy = match kind {
            StrategyKind::Direct => Self::Direct(DirectFormatter::new(config.engine)),
            StrategyKind::Worker => {
                let tickets = match config.max_workers {
                    Some(max) => TicketPool::new(max),
                    None => TicketPool::for_available_parallelism(config.ticket_multiplier),
                };
                Self::Worker(Launcher::new(config.launch_config(), Arc::new(tickets)))
            }
        };
        debug!(
            preference = %config.strategy,
            runtime_version = runtime.version,
            strategy = %strategy.kind(),
            "Selected formatting strategy"
        );
        Ok(strategy)
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Direct(_) => StrategyKind::Direct,
            Self::Worker(_) => StrategyKind::Worker,
        }
    }

    /// Format `source`, labelling failures with `identifier`.
    pub fn format(&self, identifier: &str, source: &str) -> Result<String> {
        match self {
            Self::Direct(formatter) => formatter.format(identifier, source),
            Self::Worker(launcher) => launcher.format(identifier, source),
        }
    }

    /// Worker ceiling, if this is the worker strategy.
    pub fn capacity(&self) -> Option<usize> {
        match self {
            Self::Direct(_) => None,
            Self::Worker(launcher) => Some(launcher.tickets().capacity()),
        }
    }
}

/// Install `strategy` as the process-wide strategy.
///
/// Returns the strategy back if one was already chosen.
pub fn install(strategy: Strategy) -> std::result::Result<(), Strategy> {
    GLOBAL.set(strategy)
}

/// The process-wide strategy, choosing it from the environment on first use.
pub fn global() -> &'static Strategy {
    GLOBAL.get_or_init(|| {
        let config = FormatterConfig::from_env();
        let runtime = RuntimeInfo::current();
        Strategy::from_config(&config, &runtime).unwrap_or_else(|e| {
            warn!("Invalid formatter configuration ({}), using defaults", e);
            Strategy::Direct(DirectFormatter::default())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::selector::grant_args;

    fn runtime(version: u32, launch_args: Vec<String>) -> RuntimeInfo {
        RuntimeInfo {
            version,
            launch_args,
        }
    }

    #[test]
    fn test_auto_follows_probe() {
        let config = FormatterConfig::default();

        let old = Strategy::from_config(&config, &runtime(1, vec![])).unwrap();
        assert_eq!(old.kind(), StrategyKind::Direct);
        assert_eq!(old.capacity(), None);

        let isolated = Strategy::from_config(&config, &runtime(2, vec![])).unwrap();
        assert_eq!(isolated.kind(), StrategyKind::Worker);

        let granted = Strategy::from_config(&config, &runtime(2, grant_args())).unwrap();
        assert_eq!(granted.kind(), StrategyKind::Direct);
    }

    #[test]
    fn test_preference_overrides_probe() {
        let direct = FormatterConfig::new().with_strategy(StrategyPreference::Direct);
        let strategy = Strategy::from_config(&direct, &runtime(9, vec![])).unwrap();
        assert_eq!(strategy.kind(), StrategyKind::Direct);

        let worker = FormatterConfig::new().with_strategy(StrategyPreference::Worker);
        let strategy = Strategy::from_config(&worker, &runtime(1, grant_args())).unwrap();
        assert_eq!(strategy.kind(), StrategyKind::Worker);
    }

    #[test]
    fn test_worker_capacity() {
        let config = FormatterConfig::new()
            .with_strategy(StrategyPreference::Worker)
            .with_max_workers(3);
        let strategy = Strategy::from_config(&config, &runtime(2, vec![])).unwrap();
        assert_eq!(strategy.capacity(), Some(3));

        let config = FormatterConfig::new().with_strategy(StrategyPreference::Worker);
        let strategy = Strategy::from_config(&config, &runtime(2, vec![])).unwrap();
        let parallelism = std::thread::available_parallelism().map_or(1, |n| n.get());
        assert_eq!(strategy.capacity(), Some(parallelism * 2));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = FormatterConfig::new().with_indent(0);
        assert!(Strategy::from_config(&config, &runtime(2, vec![])).is_err());
    }

    #[test]
    fn test_direct_strategy_formats() {
        let config = FormatterConfig::new().with_strategy(StrategyPreference::Direct);
        let strategy = Strategy::from_config(&config, &runtime(2, vec![])).unwrap();
        assert_eq!(strategy.format("t.A", "[1,2]").unwrap(), "[1, 2]\n");
    }

    #[test]
    fn test_global_is_memoized() {
        let first: *const Strategy = global();
        let second: *const Strategy = global();
        assert_eq!(first, second);
        assert!(install(Strategy::Direct(DirectFormatter::default())).is_err());
    }
}
