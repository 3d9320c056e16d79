use std::collections::VecDeque;
use std::path::PathBuf;

use chrono::Local;

use crate::dashboard::{Section, Selection, build_sections};
use crate::export::ExportReport;
use crate::tables::Tables;

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug)]
pub struct AppState {
    pub load: LoadState,
    pub tables: Option<Tables>,
    pub player_names: Vec<String>,
    pub first_idx: usize,
    pub second_idx: usize,
    pub sections: Vec<Section>,
    pub selected: usize,
    pub scroll: u16,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub loaded_at: Option<String>,
    pub export_in_progress: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            load: LoadState::Loading,
            tables: None,
            player_names: Vec::new(),
            first_idx: 0,
            second_idx: 1,
            sections: Vec::new(),
            selected: 0,
            scroll: 0,
            logs: VecDeque::new(),
            help_overlay: false,
            loaded_at: None,
            export_in_progress: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn selection(&self) -> Selection {
        let name = |idx: usize| self.player_names.get(idx).cloned().unwrap_or_default();
        Selection {
            first: name(self.first_idx),
            second: name(self.second_idx),
        }
    }

    /// Re-run every query against the loaded tables (e.g. after a selector change).
    pub fn recompute_sections(&mut self) {
        let selection = self.selection();
        self.sections = match &self.tables {
            Some(tables) => build_sections(tables, &selection),
            None => Vec::new(),
        };
    }

    pub fn selected_section(&self) -> Option<&Section> {
        self.sections.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.sections.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.sections.len() - 1);
        self.scroll = 0;
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.scroll = 0;
    }

    pub fn scroll_down(&mut self) {
        let rows = self
            .selected_section()
            .and_then(Section::table)
            .map(|t| t.len())
            .unwrap_or(0);
        if (self.scroll as usize) + 1 < rows {
            self.scroll = self.scroll.saturating_add(1);
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn cycle_first(&mut self, step: isize) {
        self.first_idx = wrap_index(self.first_idx, step, self.player_names.len());
        self.recompute_sections();
    }

    pub fn cycle_second(&mut self, step: isize) {
        self.second_idx = wrap_index(self.second_idx, step, self.player_names.len());
        self.recompute_sections();
    }
}

fn wrap_index(current: usize, step: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as isize;
    (current as isize + step).rem_euclid(len) as usize
}

#[derive(Debug)]
pub enum Delta {
    DataLoaded { tables: Tables, from_cache: bool },
    LoadFailed(String),
    Log(String),
    ExportFinished {
        path: PathBuf,
        result: Result<ExportReport, String>,
    },
}

#[derive(Debug)]
pub enum ProviderCommand {
    Load,
    Export { path: PathBuf, sections: Vec<Section> },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::DataLoaded { tables, from_cache } => {
            let previous = state.selection();
            state.player_names = tables.players.player_names();
            let defaults = Selection::default_for(&state.player_names);
            state.first_idx = name_index(&state.player_names, &previous.first)
                .or_else(|| name_index(&state.player_names, &defaults.first))
                .unwrap_or(0);
            state.second_idx = name_index(&state.player_names, &previous.second)
                .or_else(|| name_index(&state.player_names, &defaults.second))
                .unwrap_or(0);
            let summary = format!(
                "[INFO] {} players, {} teams, {} fixtures{}",
                tables.players.len(),
                tables.teams.len(),
                tables.fixtures.len(),
                if from_cache { " (session cache)" } else { "" }
            );
            state.tables = Some(tables);
            state.load = LoadState::Ready;
            state.loaded_at = Some(Local::now().format("%H:%M:%S").to_string());
            state.selected = state.selected.min(crate::dashboard::SectionKind::ALL.len() - 1);
            state.scroll = 0;
            state.recompute_sections();
            state.push_log(summary);
        }
        Delta::LoadFailed(msg) => {
            state.tables = None;
            state.sections.clear();
            state.push_log(format!("[WARN] Load failed: {msg}"));
            state.load = LoadState::Failed(msg);
        }
        Delta::Log(msg) => state.push_log(msg),
        Delta::ExportFinished { path, result } => {
            state.export_in_progress = false;
            match result {
                Ok(report) => {
                    state.push_log(format!(
                        "[INFO] Exported {} sheets ({} rows) to {}",
                        report.sheets,
                        report.rows,
                        path.display()
                    ));
                    for title in report.skipped {
                        state.push_log(format!("[WARN] Export skipped failed section: {title}"));
                    }
                }
                Err(err) => state.push_log(format!("[WARN] Export failed: {err}")),
            }
        }
    }
}

fn name_index(names: &[String], name: &str) -> Option<usize> {
    if name.is_empty() {
        return None;
    }
    names.iter().position(|n| n == name)
}
