//! Hierarchy Builder - 평면 레코드 → 마커 포레스트

mod builder;

pub use builder::{build_forest, Hierarchy, HierarchyBuilder, UnresolvedParent};
