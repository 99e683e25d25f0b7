//! Daily content rotation - question of the day and holiday of the day

use randomizer_core::{
    parse_holiday_dataset, parse_question_dataset, pick, AskedHistory, ContentSource, DomainError,
    HolidayDatasetEntry, QuestionOfDay, RandomSource,
};
use tokio::sync::OnceCell;
use tracing::{debug, error};

use super::error::{ServiceError, ServiceResult};

/// Pick the next question of the day.
///
/// Questions never asked on any stored day are preferred; once all of them
/// were asked the whole set is eligible again. The current question is
/// avoided whenever something else is available.
pub fn select_next_question(
    all: &[QuestionOfDay],
    history: &AskedHistory,
    current: Option<&QuestionOfDay>,
    random: &mut dyn RandomSource,
) -> Result<QuestionOfDay, DomainError> {
    let sanitized: Vec<&QuestionOfDay> = all.iter().filter(|q| !q.is_blank()).collect();
    if sanitized.is_empty() {
        return Err(DomainError::NoQuestionsAvailable);
    }

    let unused: Vec<&QuestionOfDay> = sanitized
        .iter()
        .copied()
        .filter(|q| !history.has_asked(q))
        .collect();
    let mut pool = if unused.is_empty() { sanitized } else { unused };

    let current_text = current.map(QuestionOfDay::trimmed_text).unwrap_or("");
    if pool.len() > 1 && !current_text.is_empty() {
        let others: Vec<&QuestionOfDay> = pool
            .iter()
            .copied()
            .filter(|q| q.trimmed_text() != current_text)
            .collect();
        if !others.is_empty() {
            pool = others;
        }
    }

    pick(&pool, random)
        .map(|q| (*q).clone())
        .ok_or(DomainError::NoQuestionsAvailable)
}

/// Pick the next holiday, avoiding the current one unless it is the only option
pub fn select_next_holiday(
    options: &[String],
    current: Option<&str>,
    random: &mut dyn RandomSource,
) -> Result<String, DomainError> {
    if options.is_empty() {
        return Err(DomainError::NoHolidaysAvailable);
    }

    let current = current.map(str::trim).unwrap_or("");
    let others: Vec<&String> = options.iter().filter(|o| o.trim() != current).collect();
    let pool: Vec<&String> = if others.is_empty() {
        options.iter().collect()
    } else {
        others
    };

    pick(&pool, random)
        .map(|o| (*o).clone())
        .ok_or(DomainError::NoHolidaysAvailable)
}

/// Datasets fetched at most once per session.
///
/// An empty question dataset is not cached so the next refresh tries again.
#[derive(Debug, Default)]
pub struct DailyContentCache {
    questions: OnceCell<Vec<QuestionOfDay>>,
    holidays: OnceCell<Vec<HolidayDatasetEntry>>,
}

impl DailyContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn questions(&self, source: &dyn ContentSource) -> ServiceResult<&[QuestionOfDay]> {
        let questions = self
            .questions
            .get_or_try_init(|| async {
                let payload = source.fetch_questions().await.map_err(|e| {
                    error!(error = %e, "Failed to fetch questions");
                    ServiceError::content_load(e.to_string())
                })?;
                let questions = parse_question_dataset(&payload);
                if questions.is_empty() {
                    return Err(ServiceError::Domain(DomainError::NoQuestionsAvailable));
                }
                debug!(count = questions.len(), "Cached question dataset");
                Ok::<_, ServiceError>(questions)
            })
            .await?;
        Ok(questions.as_slice())
    }

    pub async fn holidays(
        &self,
        source: &dyn ContentSource,
    ) -> ServiceResult<&[HolidayDatasetEntry]> {
        let holidays = self
            .holidays
            .get_or_try_init(|| async {
                let payload = source.fetch_holidays().await.map_err(|e| {
                    error!(error = %e, "Failed to fetch holidays");
                    ServiceError::content_load(e.to_string())
                })?;
                let holidays = parse_holiday_dataset(&payload);
                debug!(count = holidays.len(), "Cached holiday dataset");
                Ok::<_, ServiceError>(holidays)
            })
            .await?;
        Ok(holidays.as_slice())
    }
}
