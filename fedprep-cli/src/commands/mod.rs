pub mod config;
pub mod encrypt;
pub mod inspect;
pub mod validate;

use std::path::PathBuf;

use anyhow::Result;
use fedprep_core::BackendId;
use tracing::warn;

use crate::config::Config;

/// Global context passed to all commands
pub struct Context {
    pub json_output: bool,
    pub backend_override: Option<String>,
    pub threads_override: Option<usize>,
    pub config_path: Option<PathBuf>,
    pub verbose: bool,
}

impl Context {
    pub fn config(&self) -> Result<Config> {
        Config::load(self.config_path.as_deref())
    }

    /// Resolve which backend to use, with priority:
    /// 1. --backend CLI flag
    /// 2. Config file / FEDPREP_* environment
    pub fn resolve_backend_id(&self, config: &Config) -> Result<BackendId> {
        let name = self.backend_override.as_deref().unwrap_or(&config.backend);
        let id: BackendId = name.parse().map_err(|e| anyhow::anyhow!("{e}"))?;

        if id == BackendId::Mock {
            warn!("Mock backend selected: output is NOT encrypted securely");
        }
        Ok(id)
    }

    pub fn threads(&self, config: &Config) -> Option<usize> {
        self.threads_override.or(config.threads)
    }
}

/// Run `f` on a dedicated rayon pool when a thread count is configured
pub fn with_thread_pool<R, F>(threads: Option<usize>, f: F) -> Result<R>
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    match threads {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| anyhow::anyhow!("Failed to build thread pool: {e}"))?;
            Ok(pool.install(f))
        }
        None => Ok(f()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(backend: Option<&str>, threads: Option<usize>) -> Context {
        Context {
            json_output: false,
            backend_override: backend.map(Into::into),
            threads_override: threads,
            config_path: None,
            verbose: false,
        }
    }

    #[test]
    fn flag_overrides_config() {
        let config = Config {
            backend: "mock".into(),
            threads: Some(4),
            ..Config::default()
        };

        assert_eq!(
            ctx(Some("tfhe"), None).resolve_backend_id(&config).unwrap(),
            BackendId::Tfhe
        );
        assert_eq!(
            ctx(None, None).resolve_backend_id(&config).unwrap(),
            BackendId::Mock
        );
        assert_eq!(ctx(None, Some(1)).threads(&config), Some(1));
        assert_eq!(ctx(None, None).threads(&config), Some(4));
    }

    #[test]
    fn unknown_backend_is_an_error() {
        assert!(
            ctx(Some("lattice"), None)
                .resolve_backend_id(&Config::default())
                .is_err()
        );
    }

    #[test]
    fn pool_runs_closure() {
        let threads = with_thread_pool(Some(2), rayon::current_num_threads).unwrap();
        assert_eq!(threads, 2);
        assert_eq!(with_thread_pool(None, || 7).unwrap(), 7);
    }
}
