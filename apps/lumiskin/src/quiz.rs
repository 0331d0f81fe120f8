//! Preference Collector — the three-step quiz.
//!
//! Step 1 picks a skin type, step 2 toggles a non-empty concern set,
//! step 3 picks a budget tier (pre-filled with the default). Advancing past
//! step 3 produces the immutable [`UserPreferences`] exactly once. There is
//! no backward navigation.

use std::collections::BTreeSet;

use crate::models::{BudgetTier, Concern, SkinType, UserPreferences};

pub const TOTAL_STEPS: u8 = 3;

/// Which sub-step is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizStep {
    SkinType,
    Concerns,
    Budget,
}

impl QuizStep {
    /// 1-based position for the "Шаг N из 3" progress line.
    pub fn number(&self) -> u8 {
        match self {
            QuizStep::SkinType => 1,
            QuizStep::Concerns => 2,
            QuizStep::Budget => 3,
        }
    }
}

/// Result of an advance attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The current step's requirement is unmet; the step did not change.
    Blocked,
    /// Moved to the next step.
    Advanced,
    /// All three steps done; carries the accumulated preferences.
    Completed(UserPreferences),
}

/// Accumulates selections across the three steps.
#[derive(Debug, Clone)]
pub struct Quiz {
    step: QuizStep,
    skin_type: Option<SkinType>,
    concerns: BTreeSet<Concern>,
    budget: BudgetTier,
}

impl Default for Quiz {
    fn default() -> Self {
        Self::new()
    }
}

impl Quiz {
    pub fn new() -> Self {
        Self {
            step: QuizStep::SkinType,
            skin_type: None,
            concerns: BTreeSet::new(),
            budget: BudgetTier::default(),
        }
    }

    pub fn step(&self) -> QuizStep {
        self.step
    }

    pub fn skin_type(&self) -> Option<SkinType> {
        self.skin_type
    }

    pub fn concerns(&self) -> &BTreeSet<Concern> {
        &self.concerns
    }

    pub fn budget(&self) -> BudgetTier {
        self.budget
    }

    /// Replaces any prior skin-type selection.
    pub fn select_skin_type(&mut self, skin_type: SkinType) {
        self.skin_type = Some(skin_type);
    }

    /// Set-membership toggle: selecting an already-selected concern removes
    /// it, so a double toggle is a no-op.
    pub fn toggle_concern(&mut self, concern: Concern) {
        if !self.concerns.insert(concern) {
            self.concerns.remove(&concern);
        }
    }

    pub fn select_budget(&mut self, budget: BudgetTier) {
        self.budget = budget;
    }

    /// Whether the active step's requirement is satisfied.
    pub fn can_advance(&self) -> bool {
        match self.step {
            QuizStep::SkinType => self.skin_type.is_some(),
            QuizStep::Concerns => !self.concerns.is_empty(),
            QuizStep::Budget => true,
        }
    }

    /// Moves to the next step, or completes from step 3. Completion hands
    /// out the accumulated preferences; the quiz itself is spent afterwards
    /// (a new run builds a fresh `Quiz`).
    pub fn advance(&mut self) -> StepOutcome {
        if !self.can_advance() {
            return StepOutcome::Blocked;
        }
        match self.step {
            QuizStep::SkinType => {
                self.step = QuizStep::Concerns;
                StepOutcome::Advanced
            }
            QuizStep::Concerns => {
                self.step = QuizStep::Budget;
                StepOutcome::Advanced
            }
            QuizStep::Budget => StepOutcome::Completed(UserPreferences {
                // can_advance on steps 1–2 guarantees these are set.
                skin_type: self.skin_type.expect("skin type chosen in step 1"),
                concerns: self.concerns.clone(),
                budget: self.budget,
            }),
        }
    }
}
