pub mod core;

use tracing_subscriber::EnvFilter;

#[allow(unused_imports)]
pub use crate::core::api::{ModrinthClient, Project, ProjectVersion, SearchParams, ServerJarInfo};
#[allow(unused_imports)]
pub use crate::core::bundle::{
    build_file_name, BuildArtifact, BuildPipeline, BuildProgress, BuildState, McJarsResolver,
};
#[allow(unused_imports)]
pub use crate::core::cancel::CancelToken;
#[allow(unused_imports)]
pub use crate::core::compat::{resolve_loaders, resolve_versions, Compatibility};
#[allow(unused_imports)]
pub use crate::core::error::{BuilderError, BuilderResult};
#[allow(unused_imports)]
pub use crate::core::state::{GameruleEntry, Selection, ServerConfig, StateStore};

/// Initialize structured logging for embedding applications.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,minecraft_server_builder=debug")),
        )
        .init();
}
