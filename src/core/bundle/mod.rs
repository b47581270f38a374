// ─── Bundle Assembly ───
// Everything between "the user clicked build" and "a zip landed on disk":
// asset collection, mrpack expansion, the gamerule datapack, the in-memory
// archive and the pipeline driving them.

pub mod archive;
pub mod collect;
pub mod datapack;
pub mod mrpack;
pub mod pipeline;

#[allow(unused_imports)]
pub use archive::BundleArchive;
#[allow(unused_imports)]
pub use collect::{collect_downloads, CollectedAssets};
#[allow(unused_imports)]
pub use datapack::gamerule_datapack;
#[allow(unused_imports)]
pub use mrpack::{read_pack_index, PackFile, PackIndex};
#[allow(unused_imports)]
pub use pipeline::{
    build_file_name, BuildArtifact, BuildPipeline, BuildProgress, BuildState, JarResolver,
    McJarsResolver,
};
