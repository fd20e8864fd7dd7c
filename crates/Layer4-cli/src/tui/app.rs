//! Browser application state
//!
//! Key handling only drives the headless tree store. Redraws are requested by
//! a store listener, and grants reach disk only on an explicit apply.

use crate::commands;
use crate::workspace::Workspace;
use accessmap_foundation::AccessConfig;
use accessmap_tree::{PermissionTreeStore, TreeEvent};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::ListState;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Which pane receives navigation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Roles,
    Tree,
}

/// Active text input, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTarget {
    Roles,
    Tree,
}

/// What the main loop should do after a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Apply,
    Quit,
}

/// Status line message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

pub struct BrowseApp {
    pub store: PermissionTreeStore,
    pub config: AccessConfig,
    pub focus: Focus,
    pub search: Option<SearchTarget>,
    pub role_list: ListState,
    pub tree_list: ListState,
    pub status: Option<Status>,
    redraw: Arc<AtomicBool>,
}

impl BrowseApp {
    pub fn new(config: AccessConfig) -> Self {
        let mut store = PermissionTreeStore::from_config(&config);

        let redraw = Arc::new(AtomicBool::new(true));
        let redraw_flag = redraw.clone();
        store.subscribe(Arc::new(move |_: &TreeEvent| {
            redraw_flag.store(true, Ordering::Relaxed);
        }));

        let mut role_list = ListState::default();
        role_list.select(Some(0));
        let mut tree_list = ListState::default();
        tree_list.select(Some(0));

        Self {
            store,
            config,
            focus: Focus::Tree,
            search: None,
            role_list,
            tree_list,
            status: None,
            redraw,
        }
    }

    /// Consume the pending redraw request
    pub fn take_redraw(&self) -> bool {
        self.redraw.swap(false, Ordering::Relaxed)
    }

    pub fn request_redraw(&self) {
        self.redraw.store(true, Ordering::Relaxed);
    }

    /// Roles whose working copy differs from the loaded document
    pub fn unsaved_roles(&self) -> Vec<String> {
        self.store
            .roles()
            .iter()
            .filter(|state| {
                let saved: BTreeSet<&str> = self
                    .config
                    .grants(&state.role_id)
                    .unwrap_or_default()
                    .iter()
                    .map(String::as_str)
                    .collect();
                !saved.iter().copied().eq(state.checked.iter().map(String::as_str))
            })
            .map(|state| state.role_id.clone())
            .collect()
    }

    pub fn has_unsaved(&self) -> bool {
        !self.unsaved_roles().is_empty()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        self.request_redraw();
        if let Some(target) = self.search {
            self.handle_search_key(target, key);
            return Action::None;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Roles => Focus::Tree,
                    Focus::Tree => Focus::Roles,
                };
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Enter => match self.focus {
                Focus::Roles => self.select_highlighted_role(),
                Focus::Tree => {
                    if let Some(id) = self.highlighted_row_id() {
                        self.store.toggle_expand(&id);
                    }
                }
            },
            KeyCode::Char(' ') if self.focus == Focus::Tree => self.toggle_highlighted(),
            KeyCode::Char('e') => self.store.expand_all(),
            KeyCode::Char('c') => {
                self.store.collapse_all();
                self.tree_list.select(Some(0));
            }
            KeyCode::Char('a') => self.store.select_all(),
            KeyCode::Char('n') => self.store.clear_all(),
            KeyCode::Char('/') => {
                self.search = Some(match self.focus {
                    Focus::Roles => SearchTarget::Roles,
                    Focus::Tree => SearchTarget::Tree,
                });
            }
            KeyCode::Char('s') => return Action::Apply,
            _ => {}
        }
        Action::None
    }

    fn handle_search_key(&mut self, target: SearchTarget, key: KeyEvent) {
        let mut query = match target {
            SearchTarget::Roles => self.store.role_query().to_string(),
            SearchTarget::Tree => self.store.tree_query().to_string(),
        };
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.search = None;
                return;
            }
            KeyCode::Backspace => {
                query.pop();
            }
            KeyCode::Char(c) => query.push(c),
            _ => return,
        }
        match target {
            SearchTarget::Roles => {
                self.store.set_role_query(query);
                self.role_list.select(Some(0));
            }
            SearchTarget::Tree => {
                self.store.set_tree_query(query);
                self.tree_list.select(Some(0));
            }
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let (state, len) = match self.focus {
            Focus::Roles => (&mut self.role_list, self.store.filtered_roles().len()),
            Focus::Tree => (&mut self.tree_list, self.store.visible_rows().len()),
        };
        if len == 0 {
            state.select(None);
            return;
        }
        let current = state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        state.select(Some(next as usize));
    }

    fn select_highlighted_role(&mut self) {
        let index = self.role_list.selected().unwrap_or(0);
        let Some(role) = self
            .store
            .filtered_roles()
            .get(index)
            .map(|r| r.role_id.clone())
        else {
            return;
        };
        self.store.select_role(&role);
        self.tree_list.select(Some(0));
        self.focus = Focus::Tree;
    }

    fn highlighted_row_id(&self) -> Option<String> {
        let index = self.tree_list.selected()?;
        self.store.visible_rows().into_iter().nth(index).map(|r| r.id)
    }

    fn toggle_highlighted(&mut self) {
        let Some(index) = self.tree_list.selected() else {
            return;
        };
        if let Some(row) = self.store.visible_rows().into_iter().nth(index) {
            self.store.toggle_node(&row.id, !row.checked);
        }
    }

    /// Persist every role with pending edits
    pub fn apply(&mut self, ws: &Workspace) {
        let roles = self.unsaved_roles();
        if roles.is_empty() {
            self.status = Some(Status::Info("Nothing to save".to_string()));
            self.request_redraw();
            return;
        }
        let mut saved = Vec::with_capacity(roles.len());
        for role in &roles {
            if let Err(e) = commands::apply(ws, &mut self.config, &self.store, role) {
                tracing::warn!("Apply failed for '{}': {:#}", role, e);
                self.status = Some(Status::Error(format!("{:#}", e)));
                self.request_redraw();
                return;
            }
            saved.push(role.as_str());
        }
        self.status = Some(Status::Info(format!("Saved grants for {}", saved.join(", "))));
        self.request_redraw();
    }
}
