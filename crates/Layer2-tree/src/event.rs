//! 트리 스토어 변경 알림
//!
//! 렌더러는 리스너를 등록해 상태 변경 후 다시 그린다. 스토어는 단일 스레드
//! 동기 방식이라 변경 직후 같은 호출 안에서 통지된다.

use std::fmt;
use std::sync::Arc;

/// 리스너 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tree-listener-{}", self.0)
    }
}

/// 스토어 변경 이벤트
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    /// 활성 역할 변경 (펼침 상태 초기화 포함)
    RoleSelected { role: String },
    /// 체크 상태 변경
    CheckedChanged {
        role: String,
        on: bool,
        changed: usize,
    },
    /// 펼침 상태 변경
    ExpansionChanged { expanded: usize },
    /// 역할 검색어 변경
    RoleQueryChanged { query: String },
    /// 트리 검색어 변경
    TreeQueryChanged { query: String },
}

impl TreeEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            TreeEvent::RoleSelected { .. } => "role_selected",
            TreeEvent::CheckedChanged { .. } => "checked_changed",
            TreeEvent::ExpansionChanged { .. } => "expansion_changed",
            TreeEvent::RoleQueryChanged { .. } => "role_query_changed",
            TreeEvent::TreeQueryChanged { .. } => "tree_query_changed",
        }
    }
}

/// 트리 이벤트 리스너
pub trait TreeListener: Send + Sync {
    /// 리스너 이름 (디버깅용)
    fn name(&self) -> &str {
        "anonymous"
    }

    fn on_event(&self, event: &TreeEvent);
}

impl<F> TreeListener for F
where
    F: Fn(&TreeEvent) + Send + Sync,
{
    fn on_event(&self, event: &TreeEvent) {
        self(event)
    }
}

pub(crate) struct Listeners {
    entries: Vec<(ListenerId, Arc<dyn TreeListener>)>,
    counter: u64,
}

impl Listeners {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            counter: 0,
        }
    }

    pub(crate) fn add(&mut self, listener: Arc<dyn TreeListener>) -> ListenerId {
        let id = ListenerId::new(self.counter);
        self.counter += 1;
        tracing::debug!(listener_name = listener.name(), listener_id = %id, "Registering tree listener");
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        before != self.entries.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn emit(&self, event: &TreeEvent) {
        tracing::trace!(event = event.kind(), listeners = self.entries.len(), "Tree event");
        for (_, listener) in &self.entries {
            listener.on_event(event);
        }
    }
}
