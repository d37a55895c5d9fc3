//! Backend creation and persistence for the CLI.

use std::{path::PathBuf, sync::Arc};

use dramatis::{
    auth::AuthService,
    backend::{memory::InMemory, remote::{Remote, RemoteConfig}},
    directory::ProfileDirectory,
    store::CharacterStore,
};

use crate::cli::{Backend, Cli};

const DATA_FILE: &str = "dramatis.json";

/// The three collaborator services, plus the handle needed to persist the
/// local backend on exit.
pub struct Services {
    pub auth: Arc<dyn AuthService>,
    pub directory: Arc<dyn ProfileDirectory>,
    pub store: Arc<dyn CharacterStore>,
    memory: Option<(Arc<InMemory>, PathBuf)>,
}

impl Services {
    /// Save the local backend state, if the local backend is in use.
    pub fn persist(&self) -> dramatis::Result<()> {
        if let Some((backend, path)) = &self.memory {
            backend.save_to_file(path)?;
            tracing::debug!(path = %path.display(), "saved local state");
        }
        Ok(())
    }
}

/// Create the appropriate backend based on configuration
pub fn create_services(cli: &Cli) -> Result<Services, Box<dyn std::error::Error>> {
    match cli.backend {
        Backend::Memory => {
            let data_dir = cli.data_dir.clone().unwrap_or_else(|| PathBuf::from("."));
            std::fs::create_dir_all(&data_dir)?;
            let path = data_dir.join(DATA_FILE);
            tracing::info!("Using local backend with persistence at {}", path.display());
            let backend = Arc::new(InMemory::load_from_file(&path)?);
            Ok(Services {
                auth: backend.clone(),
                directory: backend.clone(),
                store: backend.clone(),
                memory: Some((backend, path)),
            })
        }
        Backend::Remote => {
            let url = cli
                .url
                .as_ref()
                .ok_or("Remote backend requires --url or DRAMATIS_URL")?;
            let api_key = cli
                .api_key
                .as_ref()
                .ok_or("Remote backend requires --api-key or DRAMATIS_API_KEY")?;
            tracing::info!("Using remote backend at {url}");
            let remote = Arc::new(Remote::new(RemoteConfig {
                base_url: url.parse()?,
                api_key: api_key.clone(),
            }));
            Ok(Services {
                auth: remote.clone(),
                directory: remote.clone(),
                store: remote,
                memory: None,
            })
        }
    }
}
