//! Plain-text printers for non-interactive commands

use accessmap_core::SyncReport;
use accessmap_foundation::{role_label, AccessConfig};
use accessmap_tree::{PermissionTreeStore, VisibleRow};
use std::collections::BTreeMap;
use std::io::{self, Write};

pub fn sync_summary(out: &mut dyn Write, report: &SyncReport, config_path: &str) -> io::Result<()> {
    writeln!(out, "Access config: {}", report.load_outcome.describe())?;
    writeln!(
        out,
        "Scanned {} files ({} skipped), {} declarations, {} markers",
        report.scan.files_scanned,
        report.scan.skipped.len(),
        report.scan.records.len(),
        report.config.markers.len()
    )?;

    for skipped in &report.scan.skipped {
        writeln!(out, "  skipped {}: {}", skipped.path.display(), skipped.reason)?;
    }
    for unresolved in &report.hierarchy.unresolved {
        writeln!(
            out,
            "  unresolved parent '{}' for '{}'",
            unresolved.parent_ref, unresolved.id
        )?;
    }
    for id in &report.hierarchy.promoted_roots {
        writeln!(out, "  cycle broken at '{}'", id)?;
    }

    let change = if report.markers_changed { "changed" } else { "unchanged" };
    writeln!(out, "Hierarchy {}; saved {}", change, config_path)?;
    Ok(())
}

pub fn roles(out: &mut dyn Write, store: &PermissionTreeStore) -> io::Result<()> {
    let total = store.total_rows();
    writeln!(out, "{:<20} {:<22} {:>7} {:>7}", "ROLE", "LABEL", "ACTIVE", "DENIED")?;
    writeln!(out, "{}", "-".repeat(59))?;
    for role in store.filtered_roles() {
        let c = store.counters_for(&role.role_id);
        writeln!(
            out,
            "{:<20} {:<22} {:>7} {:>7}",
            role.role_id,
            role_label(&role.role_id),
            c.active,
            c.denied
        )?;
    }
    writeln!(out, "\n{} markers", total)?;
    Ok(())
}

pub fn tree_rows(out: &mut dyn Write, rows: &[VisibleRow], with_checks: bool) -> io::Result<()> {
    if rows.is_empty() {
        writeln!(out, "(no markers)")?;
        return Ok(());
    }
    for row in rows {
        let branch = match (row.has_children, row.expanded) {
            (true, true) => "▾ ",
            (true, false) => "▸ ",
            (false, _) => "  ",
        };
        let check = if !with_checks {
            ""
        } else if row.checked {
            "[x] "
        } else {
            "[ ] "
        };
        writeln!(
            out,
            "{}{}{}{}  {}",
            "  ".repeat(row.depth),
            branch,
            check,
            row.id,
            row.name
        )?;
    }
    Ok(())
}

pub fn counters(out: &mut dyn Write, store: &PermissionTreeStore) -> io::Result<()> {
    let role = store.active_role().unwrap_or("-");
    let c = store.counters();
    writeln!(out, "{}: {} active, {} denied", role, c.active, c.denied)
}

pub fn stale(out: &mut dyn Write, stale: &BTreeMap<String, Vec<String>>) -> io::Result<()> {
    if stale.is_empty() {
        writeln!(out, "No stale grants.")?;
        return Ok(());
    }
    for (role, ids) in stale {
        writeln!(out, "{} ({})", role, ids.len())?;
        for id in ids {
            writeln!(out, "  {}", id)?;
        }
    }
    Ok(())
}

pub fn role_list(out: &mut dyn Write, config: &AccessConfig) -> io::Result<()> {
    for role in &config.roles {
        writeln!(out, "{}", role)?;
    }
    Ok(())
}
