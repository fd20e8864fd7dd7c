//! Config Reconciler
//!
//! 새로 빌드한 포레스트를 기존 문서에 접는다.
//!
//! - roles: 빠진 기본 역할만 뒤에 추가, 삭제하지 않음 (중복은 첫 번째만 유지)
//! - markers: 통째로 교체
//! - access: 없는 역할의 항목 제거, 빠진 역할에 빈 목록 추가,
//!   남아 있는 역할의 목록은 건드리지 않음 (사라진 마커 id도 유지)

use super::store::{ConfigStore, LoadOutcome};
use crate::hierarchy::{Hierarchy, HierarchyBuilder};
use crate::scan::{ScanReport, Scanner};
use accessmap_foundation::{AccessConfig, MarkerForest, Result, SourceProvider, BASELINE_ROLES};
use std::collections::HashSet;
use tracing::{debug, info};

/// 순수 병합 함수
pub fn reconcile(previous: AccessConfig, forest: MarkerForest) -> AccessConfig {
    let AccessConfig {
        roles: previous_roles,
        mut access,
        generated_at,
        ..
    } = previous;

    let mut seen = HashSet::new();
    let mut roles: Vec<String> = previous_roles
        .into_iter()
        .filter(|r| seen.insert(r.clone()))
        .collect();
    for baseline in BASELINE_ROLES {
        if !roles.iter().any(|r| r == baseline) {
            debug!("Adding baseline role '{}'", baseline);
            roles.push(baseline.to_string());
        }
    }

    access.retain(|role, _| {
        let keep = roles.iter().any(|r| r == role);
        if !keep {
            debug!("Dropping access entry for removed role '{}'", role);
        }
        keep
    });
    for role in &roles {
        access.entry(role.clone()).or_default();
    }

    AccessConfig {
        roles,
        markers: forest,
        access,
        generated_at,
    }
}

/// 동기화 한 번의 결과
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub scan: ScanReport,
    pub hierarchy: Hierarchy,
    pub load_outcome: LoadOutcome,
    /// 이전 문서와 비교해 마커 계층이 바뀌었는지
    pub markers_changed: bool,
    pub config: AccessConfig,
}

/// 스캔 → 빌드 → 병합 → 저장
#[derive(Debug, Clone)]
pub struct Reconciler {
    store: ConfigStore,
    scanner: Scanner,
    builder: HierarchyBuilder,
}

impl Reconciler {
    pub fn new(store: ConfigStore) -> Self {
        Self {
            store,
            scanner: Scanner::new(),
            builder: HierarchyBuilder::new(),
        }
    }

    pub fn scanner(mut self, scanner: Scanner) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// 현재 문서 로드 (없거나 깨졌으면 기본 문서)
    pub fn load(&self) -> (AccessConfig, LoadOutcome) {
        let loaded = self.store.load();
        (loaded.config, loaded.outcome)
    }

    /// 전체 동기화
    ///
    /// 소스 목록을 얻지 못하면 아무것도 저장하지 않고 에러를 돌려준다.
    pub fn sync(&self, source: &dyn SourceProvider) -> Result<SyncReport> {
        let (previous, load_outcome) = self.load();
        info!("Access config {}", load_outcome.describe());

        let scan = self.scanner.scan(source)?;
        let hierarchy = self.builder.build(&scan.records);

        let markers_changed = previous.markers != hierarchy.forest;
        let mut config = reconcile(previous, hierarchy.forest.clone());
        self.store.save(&mut config)?;

        info!(
            "Reconciled {} markers across {} roles{}",
            config.markers.len(),
            config.roles.len(),
            if markers_changed { " (hierarchy changed)" } else { "" }
        );

        Ok(SyncReport {
            scan,
            hierarchy,
            load_outcome,
            markers_changed,
            config,
        })
    }

    /// 역할의 허용 목록을 반영하고 저장 (명시적 apply)
    pub fn apply_grants<I, S>(&self, config: &mut AccessConfig, role: &str, grants: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        config.apply_grants(role, grants)?;
        self.store.save(config)?;
        info!(
            "Applied {} grants for role '{}'",
            config.grants(role).map(|g| g.len()).unwrap_or(0),
            role
        );
        Ok(())
    }

    /// 역할 추가 후 저장 (이미 있으면 저장하지 않음)
    pub fn add_role(&self, config: &mut AccessConfig, role: &str) -> Result<bool> {
        let added = config.add_role(role)?;
        if added {
            self.store.save(config)?;
            info!("Added role '{}'", role);
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::build_forest;
    use crate::scan::MemorySource;
    use accessmap_foundation::{MarkerNode, MarkerRecord, ADMIN, SUPER_ADMIN, USER};
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn forest() -> MarkerForest {
        build_forest(&[
            MarkerRecord::new("dashboard"),
            MarkerRecord::new("reports").description("Reports"),
            MarkerRecord::new("reports.sales").parent("reports"),
        ])
    }

    #[test]
    fn test_missing_access_entry_added_others_untouched() {
        let mut previous = AccessConfig::baseline();
        previous.roles.push("viewer".to_string());
        previous
            .access
            .insert(ADMIN.to_string(), vec!["dashboard".to_string(), "gone".to_string()]);

        let config = reconcile(previous, forest());

        assert_eq!(config.grants("viewer"), Some(&[][..]));
        assert_eq!(
            config.grants(ADMIN).unwrap(),
            &["dashboard".to_string(), "gone".to_string()]
        );
        assert!(config.invariant_violations().is_empty());
    }

    #[test]
    fn test_baseline_roles_appended_and_orphans_dropped() {
        let previous = AccessConfig {
            roles: vec!["viewer".to_string(), "viewer".to_string(), ADMIN.to_string()],
            markers: MarkerForest::default(),
            access: BTreeMap::from([
                ("viewer".to_string(), vec!["dashboard".to_string()]),
                ("retired".to_string(), vec!["reports".to_string()]),
            ]),
            generated_at: None,
        };

        let config = reconcile(previous, forest());

        assert_eq!(config.roles, vec!["viewer", ADMIN, SUPER_ADMIN, USER]);
        assert!(!config.access.contains_key("retired"));
        assert_eq!(config.grants("viewer").unwrap(), &["dashboard".to_string()]);
        assert!(config.invariant_violations().is_empty());
    }

    #[test]
    fn test_markers_replaced_wholesale() {
        let mut previous = AccessConfig::baseline();
        previous.markers = MarkerForest::new(vec![MarkerNode::new("legacy", Some("Old"))]);

        let config = reconcile(previous, forest());
        assert!(!config.markers.contains("legacy"));
        assert_eq!(config.markers, forest());
    }

    #[test]
    fn test_reconcile_twice_is_byte_identical() {
        let once = reconcile(AccessConfig::baseline(), forest());
        let twice = reconcile(once.clone(), forest());
        assert_eq!(
            serde_json::to_string(&once.markers).unwrap(),
            serde_json::to_string(&twice.markers).unwrap()
        );
        assert_eq!(once.access, twice.access);
    }

    #[test]
    fn test_sync_preserves_grants_across_rescans() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("access.json"));
        let reconciler = Reconciler::new(store);

        let first = MemorySource::new().file(
            "index.html",
            "<a access-marker=\"dashboard\">\n<a access-marker=\"orders\" access-description=\"Orders\">",
        );
        let mut report = reconciler.sync(&first).unwrap();
        assert_eq!(report.load_outcome, LoadOutcome::Missing);
        assert!(report.markers_changed);

        reconciler
            .apply_grants(&mut report.config, USER, ["dashboard", "orders"])
            .unwrap();

        // orders 마커가 소스에서 사라져도 허용 목록은 유지된다
        let second = MemorySource::new().file("index.html", "<a access-marker=\"dashboard\">");
        let report = reconciler.sync(&second).unwrap();
        assert_eq!(report.load_outcome, LoadOutcome::Loaded);
        assert!(!report.config.markers.contains("orders"));
        assert_eq!(
            report.config.grants(USER).unwrap(),
            &["dashboard".to_string(), "orders".to_string()]
        );
        assert_eq!(
            report.config.stale_grants().get(USER),
            Some(&vec!["orders".to_string()])
        );

        let third = reconciler.sync(&second).unwrap();
        assert!(!third.markers_changed);
    }

    #[test]
    fn test_sync_backs_up_non_utf8_document_before_overwriting() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("access.json");
        let mut original =
            br#"{ "roles": ["admin"], "markers": [], "access": { "admin": ["dashboard"] } }"#.to_vec();
        original.extend_from_slice(b"\xff\xfe");
        std::fs::write(&path, &original).unwrap();

        let reconciler = Reconciler::new(ConfigStore::new(&path));
        let source = MemorySource::new().file("index.html", "<a access-marker=\"dashboard\">");
        let report = reconciler.sync(&source).unwrap();

        let backup = match &report.load_outcome {
            LoadOutcome::Corrupt {
                backup: Some(backup),
                ..
            } => backup.clone(),
            other => panic!("unexpected outcome: {:?}", other),
        };
        assert_eq!(std::fs::read(backup).unwrap(), original);
        assert_eq!(report.config.grants(ADMIN), Some(&[][..]));
    }

    #[test]
    fn test_sync_refuses_to_replace_unreadable_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("access.json");
        std::fs::create_dir(&path).unwrap();

        let reconciler = Reconciler::new(ConfigStore::new(&path));
        let source = MemorySource::new().file("index.html", "<a access-marker=\"dashboard\">");

        assert!(matches!(
            reconciler.sync(&source),
            Err(accessmap_foundation::Error::ConfigWrite { .. })
        ));
        assert!(path.is_dir());
    }

    #[test]
    fn test_add_role_persists() {
        let dir = tempdir().unwrap();
        let reconciler = Reconciler::new(ConfigStore::new(dir.path().join("access.json")));
        let (mut config, _) = reconciler.load();

        assert!(reconciler.add_role(&mut config, "auditor").unwrap());
        assert!(!reconciler.add_role(&mut config, "auditor").unwrap());

        let (reloaded, outcome) = reconciler.load();
        assert_eq!(outcome, LoadOutcome::Loaded);
        assert!(reloaded.has_role("auditor"));
    }
}
