//! Domain data model for the consultation flow.
//!
//! Everything the user sees is Russian; the enum variants carry their
//! display labels. The analysis types mirror the Gemini response schema
//! field-for-field (camelCase on the wire).

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Self-reported skin type, chosen once in quiz step 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkinType {
    Oily,
    Dry,
    Combination,
    Normal,
    Sensitive,
}

impl SkinType {
    pub const ALL: [SkinType; 5] = [
        SkinType::Oily,
        SkinType::Dry,
        SkinType::Combination,
        SkinType::Normal,
        SkinType::Sensitive,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SkinType::Oily => "Жирная",
            SkinType::Dry => "Сухая",
            SkinType::Combination => "Комбинированная",
            SkinType::Normal => "Нормальная",
            SkinType::Sensitive => "Чувствительная",
        }
    }
}

impl fmt::Display for SkinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A skin condition the user wants addressed. Quiz step 2 collects a
/// non-empty set of these with toggle semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Concern {
    Acne,
    Aging,
    DarkSpots,
    Dullness,
    Redness,
    Texture,
}

impl Concern {
    pub const ALL: [Concern; 6] = [
        Concern::Acne,
        Concern::Aging,
        Concern::DarkSpots,
        Concern::Dullness,
        Concern::Redness,
        Concern::Texture,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Concern::Acne => "Акне и воспаления",
            Concern::Aging => "Возрастные изменения",
            Concern::DarkSpots => "Пигментация",
            Concern::Dullness => "Тусклый цвет",
            Concern::Redness => "Покраснения",
            Concern::Texture => "Неровная текстура",
        }
    }
}

impl fmt::Display for Concern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Price-sensitivity bucket. Defaults to the mid tier until the user
/// overrides it in quiz step 3.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BudgetTier {
    Economy,
    #[default]
    Mid,
    Luxury,
}

impl BudgetTier {
    pub const ALL: [BudgetTier; 3] = [BudgetTier::Economy, BudgetTier::Mid, BudgetTier::Luxury];

    pub fn label(&self) -> &'static str {
        match self {
            BudgetTier::Economy => "Эконом",
            BudgetTier::Mid => "Средний",
            BudgetTier::Luxury => "Люкс",
        }
    }

    /// One-line description shown under the tier name in quiz step 3.
    pub fn description(&self) -> &'static str {
        match self {
            BudgetTier::Economy => "Доступные средства масс-маркета",
            BudgetTier::Mid => "Качественные бренды мидл-сегмента",
            BudgetTier::Luxury => "Премиальная косметика известных брендов",
        }
    }
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Complete quiz output. Constructed only by [`crate::quiz::Quiz`] when all
/// three steps are done, so a value of this type always has a skin type and
/// a non-empty concern set. Immutable once handed to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPreferences {
    pub skin_type: SkinType,
    pub concerns: BTreeSet<Concern>,
    pub budget: BudgetTier,
}

impl UserPreferences {
    /// Concern labels joined for embedding in the analysis prompt.
    pub fn concerns_joined(&self) -> String {
        self.concerns
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A selected selfie: raw bytes plus the MIME type declared to the API.
/// Held by the Image Acquirer until submission; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// One product card. Produced only by the gateway — never constructed
/// locally. All fields are required on deserialize; a response missing any
/// of them fails the whole analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecommendation {
    pub name: String,
    pub brand: String,
    pub category: String,
    /// Currency-formatted string, e.g. "1 490 ₽".
    pub price: String,
    pub reason: String,
    /// 0–5, may be fractional.
    pub rating: f64,
}

/// Structured output of one analysis call. Lifecycle: one request, one
/// display, then dropped on retake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub skin_tone: String,
    pub undertone: String,
    pub detected_features: Vec<String>,
    pub analysis_text: String,
    pub recommendations: Vec<ProductRecommendation>,
}
