//! Selection cycle of one team for one day
//!
//! Members are picked one at a time without repetition. The member picked
//! last stays active until the next pick completes it. History is the
//! completed list followed by the active member, and every operation keeps
//! that shape so undo and rollback are exact.

use std::collections::HashSet;

use randomizer_core::{pick, DomainError, MemberView, RandomSource, RandomizerDayData};

/// Copy of the mutable part of the cycle, used for rollback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSnapshot {
    completed: Vec<String>,
    active: Option<String>,
    history: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RandomizeOutcome {
    /// A new member became active
    Selected(String),
    /// The pending member was completed and nobody is left
    CycleComplete,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    members: Vec<MemberView>,
    completed: Vec<String>,
    active: Option<String>,
    history: Vec<String>,
}

impl SelectionState {
    /// Restore a team's cycle from its stored day record.
    ///
    /// Ids that are no longer on the roster are dropped.
    pub fn load(members: Vec<MemberView>, day: Option<&RandomizerDayData>, team_id: &str) -> Self {
        let roster: HashSet<&str> = members.iter().map(|m| m.id.as_str()).collect();

        let mut completed: Vec<String> = Vec::new();
        for id in day.map(|d| d.completed_for(team_id)).unwrap_or_default() {
            if roster.contains(id.as_str()) && !completed.contains(&id) {
                completed.push(id);
            }
        }

        let active = day
            .and_then(|d| d.active_for(team_id))
            .filter(|id| roster.contains(id.as_str()) && !completed.contains(id));

        let mut history = completed.clone();
        history.extend(active.clone());

        Self {
            members,
            completed,
            active,
            history,
        }
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            completed: self.completed.clone(),
            active: self.active.clone(),
            history: self.history.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: SelectionSnapshot) {
        self.completed = snapshot.completed;
        self.active = snapshot.active;
        self.history = snapshot.history;
    }

    /// Complete the pending member and pick the next one uniformly
    pub fn randomize(&mut self, random: &mut dyn RandomSource) -> Result<RandomizeOutcome, DomainError> {
        if !self.has_active_pending() && self.eligible().is_empty() {
            return Err(DomainError::NoCandidates);
        }

        if let Some(active) = self.active.take() {
            if !self.completed.contains(&active) {
                self.completed.push(active);
            }
        }

        let pool: Vec<&MemberView> = self
            .members
            .iter()
            .filter(|m| !self.completed.contains(&m.id))
            .collect();

        let Some(chosen) = pick(&pool, random).map(|m| m.id.clone()) else {
            return Ok(RandomizeOutcome::CycleComplete);
        };

        self.active = Some(chosen.clone());
        self.history.push(chosen.clone());
        Ok(RandomizeOutcome::Selected(chosen))
    }

    /// Step back to the previously picked member
    pub fn select_previous(&mut self) -> Result<Option<String>, DomainError> {
        if self.history.is_empty() {
            return Err(DomainError::NothingToUndo);
        }

        if self.has_active_pending() {
            self.history.pop();
            self.active = self.history.last().cloned();
        } else {
            // Cycle complete: the last completed member becomes pending again
            self.active = self.history.last().cloned();
        }

        if let Some(active) = &self.active {
            self.completed.retain(|id| id != active);
        }
        Ok(self.active.clone())
    }

    /// Clear the cycle; `false` when there was nothing to clear
    pub fn reset(&mut self) -> bool {
        if !self.has_progress() {
            return false;
        }
        self.completed.clear();
        self.active = None;
        self.history.clear();
        true
    }

    // === Derived ===

    pub fn members(&self) -> &[MemberView] {
        &self.members
    }

    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn has_active_pending(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|id| !self.completed.contains(id))
    }

    pub fn has_progress(&self) -> bool {
        !self.completed.is_empty() || self.has_active_pending()
    }

    /// Members neither completed nor active
    pub fn eligible(&self) -> Vec<&MemberView> {
        self.members
            .iter()
            .filter(|m| !self.completed.contains(&m.id) && self.active.as_ref() != Some(&m.id))
            .collect()
    }

    pub fn remaining_count(&self) -> usize {
        self.eligible().len() + usize::from(self.has_active_pending())
    }

    pub fn is_cycle_complete(&self) -> bool {
        !self.members.is_empty() && !self.has_active_pending() && self.eligible().is_empty()
    }

    pub fn current_member(&self) -> Option<&MemberView> {
        let active = self.active.as_ref()?;
        self.members.iter().find(|m| &m.id == active)
    }

    pub fn can_randomize(&self) -> bool {
        self.has_active_pending() || !self.eligible().is_empty()
    }

    pub fn can_select_previous(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn can_reset(&self) -> bool {
        self.has_progress()
    }
}
