pub mod mcjars;
pub mod modrinth;

#[allow(unused_imports)]
pub use mcjars::{fetch_server_jar, ServerJarInfo};
#[allow(unused_imports)]
pub use modrinth::{
    Category, GameVersionTag, LoaderTag, ModrinthClient, Project, ProjectVersion, SearchParams,
    SearchResults, VersionDependency, VersionFile,
};
