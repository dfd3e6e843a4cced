//! Scope-aware plugin state engine.
//!
//! Keeps three things in sync for each plugin:
//!
//! - whether it is **installed** (`~/.claude/plugins/installed_plugins.json`)
//! - whether it is **enabled** per scope (`enabledPlugins` in the user,
//!   project or local `settings.json`)
//! - what marketplaces **offer** (`~/.claude/plugins/marketplaces/*`)
//!
//! # Architecture
//!
//! ```text
//! PluginOrchestrator ── toggle / update / bulk / update-all
//!   ├── PluginCommandExecutor   (CliCommandExecutor | LocalExecutor)
//!   ├── MarketplaceScanner      (FsMarketplaceScanner | StaticCatalog)
//!   └── ConfigStore             (settings + registry read-modify-write)
//!         └── DocumentStore     (FsDocumentStore | MemoryDocumentStore)
//! ```
//!
//! [`merge_plugins`] joins install records with catalog entries into the
//! [`MergedPlugin`] view; [`find_conflicts`] reports resources declared by
//! more than one plugin.

pub mod catalog;
pub mod conflicts;
pub mod document;
pub mod executor;
pub mod guard;
pub mod installed_registry;
pub mod marketplace_types;
pub mod merge;
pub mod orchestrator;
pub mod paths;
pub mod plugin_settings;
pub mod progress;
pub mod protocol;
pub mod scope;
pub mod store;

mod error;

// Re-export primary types
pub use catalog::CatalogEntry;
pub use catalog::FsMarketplaceScanner;
pub use catalog::MarketplaceScanner;
pub use catalog::PluginContents;
pub use catalog::StaticCatalog;
pub use conflicts::ResourceConflict;
pub use conflicts::ResourceType;
pub use conflicts::find_conflicts;
pub use document::DocumentStore;
pub use document::FsDocumentStore;
pub use document::MemoryDocumentStore;
pub use error::PluginError;
pub use error::Result;
pub use executor::CliCommandExecutor;
pub use executor::LocalExecutor;
pub use executor::PluginAction;
pub use executor::PluginCommandExecutor;
pub use installed_registry::InstallRecord;
pub use installed_registry::InstalledPluginsRegistry;
pub use merge::MergedPlugin;
pub use merge::has_update;
pub use merge::merge_plugins;
pub use orchestrator::EnableStep;
pub use orchestrator::PluginOrchestrator;
pub use orchestrator::ToggleKey;
pub use orchestrator::ToggleOutcome;
pub use paths::ClaudePaths;
pub use paths::resolve_settings_path;
pub use plugin_settings::PluginSettings;
pub use progress::BulkAction;
pub use progress::BulkError;
pub use progress::BulkItem;
pub use progress::BulkReport;
pub use progress::OperationProgress;
pub use progress::ProgressEvent;
pub use progress::ProgressKey;
pub use protocol::PluginRequest;
pub use protocol::PluginResponse;
pub use protocol::ResponsePayload;
pub use scope::PluginScope;
pub use store::ConfigStore;
