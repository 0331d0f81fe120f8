//! Terminal presentation — drives the orchestrator from stdin events.
//!
//! This is the only module that awaits the gateway. While the analysis is
//! in flight the loop is suspended on that await, so no other input is read
//! and every earlier step is inert. Entering `q` at any prompt exits.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use crate::flow::{Flow, WizardState};
use crate::gemini::SkinAnalyzer;
use crate::models::{
    AnalysisResult, BudgetTier, Concern, ImageFile, ProductRecommendation, SkinType,
};
use crate::photo::PhotoUpload;
use crate::quiz::{Quiz, QuizStep, StepOutcome, TOTAL_STEPS};

/// Runs the wizard until the user quits. The machine is cyclic, so the only
/// exits are explicit.
pub async fn run<A: SkinAnalyzer>(analyzer: &A) -> Result<()> {
    let mut flow = Flow::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        // The loop owns rendering; transitions go through the orchestrator.
        match flow.state().clone() {
            WizardState::Landing => {
                render_landing();
                match read_input(&mut lines, "Нажмите Enter, чтобы начать (q — выход): ")? {
                    Some(_) => flow.begin_quiz()?,
                    None => return Ok(()),
                }
            }
            WizardState::Quiz => match run_quiz(&mut lines)? {
                Some(preferences) => flow.complete_quiz(preferences)?,
                None => return Ok(()),
            },
            WizardState::Upload { error, .. } => {
                if let Some(message) = &error {
                    println!("\n{}", message.red());
                }
                match run_upload(&mut lines)? {
                    Some(image) => {
                        let job = flow.begin_analysis(image)?;
                        render_analyzing_heading();
                        let spinner = analyzing_spinner();
                        let outcome = analyzer.analyze(&job.image, &job.preferences).await;
                        spinner.finish_and_clear();
                        flow.finish_analysis(outcome)?;
                    }
                    None => return Ok(()),
                }
            }
            WizardState::Analyzing { .. } => {
                // Entered and left inside the Upload arm; the loop never
                // observes it between iterations.
                unreachable!("analyzing is handled inline in the upload arm")
            }
            WizardState::Results { result } => {
                render_results(&result);
                match read_input(
                    &mut lines,
                    "Нажмите Enter, чтобы начать новый анализ (q — выход): ",
                )? {
                    Some(_) => flow.retake()?,
                    None => return Ok(()),
                }
            }
        }
    }
}

// ── Landing ─────────────────────────────────────────────────────────────────

fn render_landing() {
    println!();
    println!("{}", "✦ ИИ-технологии в дерматологии".magenta());
    println!("{}", "Идеальный уход, подобранный наукой.".bold());
    println!(
        "Загрузите селфи, и наш ИИ проанализирует профиль вашей кожи,\n\
         чтобы подобрать средства, которые действительно работают."
    );
    println!();
    println!("{}", "Начать консультацию".green().bold());
}

// ── Quiz ────────────────────────────────────────────────────────────────────

/// Runs the three-step quiz. Returns `None` if the user quits.
fn run_quiz(
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<Option<crate::models::UserPreferences>> {
    let mut quiz = Quiz::new();

    loop {
        render_quiz_step(&quiz);
        let Some(input) = read_input(lines, "> ")? else {
            return Ok(None);
        };

        if input.is_empty() {
            // Empty line = "Далее".
            match quiz.advance() {
                StepOutcome::Completed(preferences) => return Ok(Some(preferences)),
                StepOutcome::Advanced => continue,
                StepOutcome::Blocked => {
                    println!("{}", blocked_hint(quiz.step()).yellow());
                    continue;
                }
            }
        }

        match (quiz.step(), input.parse::<usize>()) {
            (QuizStep::SkinType, Ok(n)) if (1..=SkinType::ALL.len()).contains(&n) => {
                quiz.select_skin_type(SkinType::ALL[n - 1]);
            }
            (QuizStep::Concerns, Ok(n)) if (1..=Concern::ALL.len()).contains(&n) => {
                quiz.toggle_concern(Concern::ALL[n - 1]);
            }
            (QuizStep::Budget, Ok(n)) if (1..=BudgetTier::ALL.len()).contains(&n) => {
                quiz.select_budget(BudgetTier::ALL[n - 1]);
            }
            _ => println!("{}", "Введите номер варианта из списка.".yellow()),
        }
    }
}

fn render_quiz_step(quiz: &Quiz) {
    let step = quiz.step();
    println!();
    println!(
        "{}",
        format!("Шаг {} из {}", step.number(), TOTAL_STEPS).magenta()
    );

    match step {
        QuizStep::SkinType => {
            println!("{}", "Какой у вас тип кожи?".bold());
            for (i, skin_type) in SkinType::ALL.iter().enumerate() {
                let marker = if quiz.skin_type() == Some(*skin_type) {
                    "✓".green().to_string()
                } else {
                    " ".to_string()
                };
                println!("  {} {}. {}", marker, i + 1, skin_type.label());
            }
        }
        QuizStep::Concerns => {
            println!("{}", "Что вас беспокоит?".bold());
            println!("Выберите всё подходящее (повторный выбор снимает отметку)");
            for (i, concern) in Concern::ALL.iter().enumerate() {
                let marker = if quiz.concerns().contains(concern) {
                    "✓".green().to_string()
                } else {
                    " ".to_string()
                };
                println!("  {} {}. {}", marker, i + 1, concern.label());
            }
        }
        QuizStep::Budget => {
            println!("{}", "Ваш бюджет?".bold());
            for (i, tier) in BudgetTier::ALL.iter().enumerate() {
                let marker = if quiz.budget() == *tier {
                    "✓".green().to_string()
                } else {
                    " ".to_string()
                };
                println!("  {} {}. {} — {}", marker, i + 1, tier.label(), tier.description());
            }
        }
    }

    let next_label = if step == QuizStep::Budget {
        "Перейти к фото"
    } else {
        "Далее"
    };
    println!("Номер — выбрать, Enter — {next_label}, q — выход");
}

fn blocked_hint(step: QuizStep) -> &'static str {
    match step {
        QuizStep::SkinType => "Сначала выберите тип кожи.",
        QuizStep::Concerns => "Выберите хотя бы один пункт.",
        QuizStep::Budget => "",
    }
}

// ── Upload ──────────────────────────────────────────────────────────────────

/// Collects a photo until the user submits one. Returns `None` on quit.
fn run_upload(
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<Option<ImageFile>> {
    let mut upload = PhotoUpload::new();

    println!();
    println!("{}", "Давайте посмотрим на вашу кожу".bold());
    println!("Загрузите четкое селфи при естественном освещении для лучшего анализа.");
    println!("{}", "Поддерживаются JPG, PNG (Макс. 5МБ)".dimmed());

    loop {
        if let Some(preview) = upload.preview() {
            println!(
                "\nВыбрано: {} ({}, {})",
                preview.file_name.bold(),
                preview.mime_type,
                format_byte_len(preview.byte_len)
            );
            println!("Enter — анализировать кожу, c — убрать фото, или путь к другому файлу");
        } else {
            println!("\nВведите путь к файлу с фото:");
        }

        let Some(input) = read_input(lines, "> ")? else {
            return Ok(None);
        };

        match input.as_str() {
            "" if upload.has_selection() => {
                // Submit is only reachable with a file present.
                return Ok(upload.submit());
            }
            "" => println!("{}", "Сначала выберите файл.".yellow()),
            "c" | "C" => upload.clear(),
            path => match upload.select(Path::new(path)) {
                Ok(_) => {}
                Err(e) => {
                    warn!("Photo selection rejected: {e}");
                    println!("{}", format!("Не удалось выбрать файл: {e}").red());
                }
            },
        }
    }
}

pub fn format_byte_len(len: usize) -> String {
    if len >= 1024 * 1024 {
        format!("{:.1} МБ", len as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} КБ", len as f64 / 1024.0)
    }
}

// ── Analyzing ───────────────────────────────────────────────────────────────

fn render_analyzing_heading() {
    println!();
    println!("{}", "Анализируем ваш профиль...".bold());
    println!(
        "{}",
        "Наш ИИ сканирует текстуру кожи, подтон и подбирает ингредиенты под ваши потребности."
            .dimmed()
    );
}

fn analyzing_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("static spinner template"),
    );
    spinner.set_message("Анализируем...");
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

// ── Results ─────────────────────────────────────────────────────────────────

fn render_results(result: &AnalysisResult) {
    println!();
    println!("{}", "Анализ вашей кожи".bold());
    println!("{}", result.analysis_text);
    println!();
    println!("  Тон кожи:    {}", result.skin_tone.bold());
    println!("  Подтон:      {}", result.undertone.bold());
    println!(
        "  Особенности: {}",
        result.detected_features.join(", ").bold()
    );
    println!();
    println!("{}", "Подобрано для вас".bold());

    for (i, product) in result.recommendations.iter().enumerate() {
        println!("{}", format_recommendation_card(i + 1, product));
    }

    println!();
    println!("{}", "Начать новый анализ".green());
}

/// One product card. Pure formatting so it stays testable.
pub fn format_recommendation_card(position: usize, product: &ProductRecommendation) -> String {
    format!(
        "\n{position}. {brand} — {name}\n   {category} · {stars}\n   {reason}\n   {price}",
        brand = product.brand.to_uppercase(),
        name = product.name,
        category = product.category,
        stars = format_stars(product.rating),
        reason = product.reason,
        price = product.price,
    )
}

/// Five-slot star strip: one filled star per whole point of the rating.
pub fn format_stars(rating: f64) -> String {
    let filled = (rating.floor().clamp(0.0, 5.0)) as usize;
    format!("{}{} ({rating})", "★".repeat(filled), "☆".repeat(5 - filled))
}

// ── Input ───────────────────────────────────────────────────────────────────

/// Reads one trimmed line. Returns `None` on EOF or an explicit `q`.
fn read_input(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    prompt: &str,
) -> Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => {
            let line = line?.trim().to_string();
            if line.eq_ignore_ascii_case("q") {
                Ok(None)
            } else {
                Ok(Some(line))
            }
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_stars_fills_whole_points_only() {
        assert_eq!(format_stars(4.5), "★★★★☆ (4.5)");
        assert_eq!(format_stars(5.0), "★★★★★ (5)");
        assert_eq!(format_stars(0.0), "☆☆☆☆☆ (0)");
    }

    #[test]
    fn test_format_stars_clamps_out_of_range_ratings() {
        assert!(format_stars(9.0).starts_with("★★★★★"));
        assert!(format_stars(-1.0).starts_with("☆☆☆☆☆"));
    }

    #[test]
    fn test_recommendation_card_shows_every_field() {
        let product = ProductRecommendation {
            name: "Сыворотка с ниацинамидом".to_string(),
            brand: "The Ordinary".to_string(),
            category: "Сыворотка".to_string(),
            price: "1 200 ₽".to_string(),
            reason: "Сужает поры.".to_string(),
            rating: 4.0,
        };
        let card = format_recommendation_card(2, &product);
        assert!(card.contains("2. THE ORDINARY — Сыворотка с ниацинамидом"));
        assert!(card.contains("Сыворотка · ★★★★☆ (4)"));
        assert!(card.contains("Сужает поры."));
        assert!(card.contains("1 200 ₽"));
    }

    #[test]
    fn test_format_byte_len_picks_sensible_unit() {
        assert_eq!(format_byte_len(512), "0.5 КБ");
        assert_eq!(format_byte_len(2 * 1024 * 1024), "2.0 МБ");
    }
}
