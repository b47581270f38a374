// ─── Server Builder Core ───
// Modular backend for assembling ready-to-run Minecraft server bundles.
//
// Architecture:
//   core/
//     api/        — Modrinth content API + mcjars build-index clients
//     version/    — total ordering over dotted game versions
//     compat/     — game-version + loader compatibility resolvers
//     config/     — server.properties synthesis, gamerules, startup script
//     state/      — persisted selection + server configuration
//     downloader/ — cached, hash-validated asset downloads
//     bundle/     — asset collection, archive, datapack, build pipeline

pub mod api;
pub mod bundle;
pub mod cancel;
pub mod compat;
pub mod config;
pub mod downloader;
pub mod error;
pub mod http;
pub mod state;
pub mod version;
