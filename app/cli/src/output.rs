//! Human-readable rendering of engine results.

use std::fmt::Write as _;

use plugsync_plugin::BulkReport;
use plugsync_plugin::MergedPlugin;
use plugsync_plugin::PluginScope;
use plugsync_plugin::ResourceConflict;
use plugsync_plugin::ToggleOutcome;

/// One line per plugin: id, version, installed scopes, update marker.
pub fn render_plugins(plugins: &[MergedPlugin]) -> String {
    if plugins.is_empty() {
        return "No plugins found.\n".to_string();
    }

    let width = plugins.iter().map(|p| p.id.len()).max().unwrap_or(0);
    let mut out = String::new();
    for plugin in plugins {
        let scopes: Vec<&str> = plugin
            .installed_scopes()
            .into_iter()
            .map(PluginScope::as_str)
            .collect();
        let scopes = if scopes.is_empty() {
            "-".to_string()
        } else {
            scopes.join(",")
        };
        let version = plugin.version.as_deref().unwrap_or("-");
        let marker = if plugin.has_update() { "  (update available)" } else { "" };
        let _ = writeln!(out, "{:<width$}  {version:<10}  {scopes}{marker}", plugin.id);
        if let Some(description) = &plugin.description {
            let _ = writeln!(out, "{:<width$}  {description}", "");
        }
    }
    out
}

pub fn render_outcome(plugin_id: &str, outcome: ToggleOutcome) -> String {
    match outcome {
        ToggleOutcome::Installed => format!("Installed {plugin_id}\n"),
        ToggleOutcome::Enabled => format!("Enabled {plugin_id}\n"),
        ToggleOutcome::Disabled => format!("Disabled {plugin_id}\n"),
        ToggleOutcome::Updated => format!("Updated {plugin_id}\n"),
        ToggleOutcome::Skipped => format!("Skipped {plugin_id}: already in progress\n"),
    }
}

pub fn render_report(report: Option<&BulkReport>) -> String {
    let Some(report) = report else {
        return "Skipped: the same operation is already in progress\n".to_string();
    };

    let mut out = format!(
        "{} succeeded, {} failed ({}/{})\n",
        report.succeeded.len(),
        report.failed.len(),
        report.progress.current,
        report.progress.total
    );
    for error in &report.failed {
        let _ = writeln!(
            out,
            "  {} ({}): {}",
            error.plugin_id, error.scope, error.message
        );
    }
    out
}

pub fn render_conflicts(conflicts: &[ResourceConflict]) -> String {
    if conflicts.is_empty() {
        return "No conflicts.\n".to_string();
    }
    let mut out = String::new();
    for conflict in conflicts {
        let _ = writeln!(
            out,
            "{} {}: {}",
            conflict.resource_type,
            conflict.name,
            conflict.plugin_ids.join(", ")
        );
    }
    out
}

#[cfg(test)]
#[path = "output.test.rs"]
mod tests;
