//! accessmap-tree: Permission tree store
//!
//! Layer2 - 역할별 권한 체크 상태를 다루는 헤드리스 상태 계층
//!
//! 렌더링은 하지 않는다. 렌더러는 `visible_rows()`와 카운터를 읽고,
//! `subscribe()`로 등록한 리스너를 통해 변경을 통지받는다.
//!
//! # 사용 예시
//!
//! ```ignore
//! use accessmap_tree::PermissionTreeStore;
//!
//! let mut store = PermissionTreeStore::from_config(&config);
//! store.select_role("admin");
//! store.toggle_node("reports", true);
//! config.apply_grants("admin", store.role("admin").unwrap().grants())?;
//! ```

pub mod event;
pub mod filter;
pub mod node;
pub mod role;
pub mod store;

pub use event::{ListenerId, TreeEvent, TreeListener};
pub use filter::{filter_tree, name_matches};
pub use node::{flatten, tree_ids, FlatNode, TreeNode};
pub use role::RoleState;
pub use store::{Counters, PermissionTreeStore, VisibleRow};
