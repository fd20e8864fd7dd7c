//! Non-interactive commands

use crate::output;
use crate::workspace::Workspace;
use accessmap_foundation::AccessConfig;
use accessmap_tree::PermissionTreeStore;
use anyhow::{bail, Context};
use std::io::Write;

/// Options for `accessmap tree`
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    pub role: Option<String>,
    pub query: Option<String>,
    pub collapsed: bool,
}

/// Scan sources and fold the result into the access document
pub fn scan(ws: &Workspace, json: bool, out: &mut dyn Write) -> anyhow::Result<()> {
    let source = ws.source();
    let report = ws
        .reconciler()
        .sync(&source)
        .with_context(|| format!("scan of {} failed", source.root().display()))?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &report.scan)?;
        writeln!(out)?;
    } else {
        output::sync_summary(out, &report, &ws.config_path().display().to_string())?;
    }
    Ok(())
}

pub fn roles(ws: &Workspace, query: Option<&str>, out: &mut dyn Write) -> anyhow::Result<()> {
    let mut store = PermissionTreeStore::from_config(&ws.load_config());
    if let Some(query) = query {
        store.set_role_query(query);
    }
    output::roles(out, &store)?;
    Ok(())
}

pub fn tree(ws: &Workspace, opts: &TreeOptions, out: &mut dyn Write) -> anyhow::Result<()> {
    let config = ws.load_config();
    let mut store = PermissionTreeStore::from_config(&config);

    if let Some(role) = &opts.role {
        require_role(&config, role)?;
        store.select_role(role);
    }
    if !opts.collapsed {
        store.expand_all();
    }
    if let Some(query) = &opts.query {
        store.set_tree_query(query.as_str());
    }

    output::tree_rows(out, &store.visible_rows(), opts.role.is_some())?;
    if opts.role.is_some() {
        output::counters(out, &store)?;
    }
    Ok(())
}

/// Toggle markers (with their descendants) for a role and save
pub fn grant(
    ws: &Workspace,
    role: &str,
    markers: &[String],
    on: bool,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let mut config = ws.load_config();
    require_role(&config, role)?;

    let unknown: Vec<&str> = markers
        .iter()
        .map(String::as_str)
        .filter(|id| !config.markers.contains(id))
        .collect();
    if !unknown.is_empty() {
        bail!("unknown marker(s): {}", unknown.join(", "));
    }

    let mut store = PermissionTreeStore::from_config(&config);
    store.select_role(role);
    for marker in markers {
        store.toggle_node(marker, on);
    }

    apply(ws, &mut config, &store, role)?;
    output::counters(out, &store)?;
    Ok(())
}

/// Select or clear every marker for a role and save
pub fn preset(ws: &Workspace, role: &str, all: bool, out: &mut dyn Write) -> anyhow::Result<()> {
    let mut config = ws.load_config();
    require_role(&config, role)?;

    let mut store = PermissionTreeStore::from_config(&config);
    store.select_role(role);
    if all {
        store.select_all();
    } else {
        store.clear_all();
    }

    apply(ws, &mut config, &store, role)?;
    output::counters(out, &store)?;
    Ok(())
}

pub fn role_add(ws: &Workspace, role: &str, out: &mut dyn Write) -> anyhow::Result<()> {
    let mut config = ws.load_config();
    if ws.reconciler().add_role(&mut config, role)? {
        writeln!(out, "Added role '{}'", role)?;
    } else {
        writeln!(out, "Role '{}' already exists", role)?;
    }
    Ok(())
}

pub fn role_list(ws: &Workspace, out: &mut dyn Write) -> anyhow::Result<()> {
    output::role_list(out, &ws.load_config())?;
    Ok(())
}

pub fn stale(ws: &Workspace, out: &mut dyn Write) -> anyhow::Result<()> {
    output::stale(out, &ws.load_config().stale_grants())?;
    Ok(())
}

/// Write the store's working copy for `role` back through the reconciler
pub fn apply(
    ws: &Workspace,
    config: &mut AccessConfig,
    store: &PermissionTreeStore,
    role: &str,
) -> anyhow::Result<()> {
    let Some(state) = store.role(role) else {
        bail!("unknown role '{}'", role);
    };
    ws.reconciler()
        .apply_grants(config, role, state.grants())
        .with_context(|| format!("could not save grants to {}", ws.config_path().display()))?;
    Ok(())
}

fn require_role(config: &AccessConfig, role: &str) -> anyhow::Result<()> {
    if !config.has_role(role) {
        bail!(
            "unknown role '{}' (known: {})",
            role,
            config.roles.join(", ")
        );
    }
    Ok(())
}
