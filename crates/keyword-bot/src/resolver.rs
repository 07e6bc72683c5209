//! Keyword-metrics resolver: the pure core of the bot.
//!
//! Given the provider's idea list and a target keyword, either surface the
//! exact match with a canonicalized monthly breakdown or fall back to a
//! short suggestion list. No I/O, no state.

use ads_common::ads::{CompetitionLevel, KeywordIdea};
use indexmap::IndexMap;

use crate::error::AppError;

/// Search volume per month label, in sample order (insertion order matters
/// downstream; the formatter renders entries exactly as inserted).
pub type MonthlyBreakdown = IndexMap<String, i64>;

const MAX_SUGGESTIONS: usize = 5;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedResult {
    ExactMatch {
        /// Idea text as returned by the provider (original casing).
        keyword: String,
        avg_monthly_searches: i64,
        competition: CompetitionLevel,
        monthly_breakdown: MonthlyBreakdown,
    },
    Suggestions {
        /// The target keyword as requested.
        keyword: String,
        suggestions: Vec<Suggestion>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub text: String,
    pub avg_monthly_searches: i64,
}

/// Map a provider month number to its display label.
///
/// The provider encodes a 13th rollover bucket that observed traffic shows
/// is January; months 1..12 are the standard calendar months. Anything else
/// gets a sentinel label carrying the raw number so bad data stays visible
/// instead of being dropped.
pub fn month_label(month: i32) -> String {
    match month {
        13 => "Jan".to_string(),
        1..=12 => MONTH_NAMES[(month - 1) as usize].to_string(),
        other => format!("Unknown({other})"),
    }
}

/// Resolve a target keyword against the provider's idea list.
///
/// The first idea whose text equals `target_keyword` case-insensitively
/// wins; duplicates are not deduplicated. Without a match, the first 5 ideas
/// are returned verbatim as suggestions, preserving input order. An idea
/// that is read but lacks its metrics bundle fails with
/// [`AppError::MalformedIdea`].
pub fn resolve(target_keyword: &str, ideas: &[KeywordIdea]) -> Result<ResolvedResult, AppError> {
    let target_lower = target_keyword.to_lowercase();

    for idea in ideas {
        if idea.text.to_lowercase() != target_lower {
            continue;
        }

        let metrics = idea
            .keyword_idea_metrics
            .as_ref()
            .ok_or_else(|| AppError::MalformedIdea {
                text: idea.text.clone(),
            })?;

        let mut monthly_breakdown = MonthlyBreakdown::new();
        for sample in &metrics.monthly_search_volumes {
            // Last write wins when two samples share a label (month 13 and
            // month 1 both land on "Jan").
            monthly_breakdown.insert(month_label(sample.month), sample.monthly_searches);
        }

        return Ok(ResolvedResult::ExactMatch {
            keyword: idea.text.clone(),
            avg_monthly_searches: metrics.avg_monthly_searches,
            competition: metrics.competition,
            monthly_breakdown,
        });
    }

    let suggestions = ideas
        .iter()
        .take(MAX_SUGGESTIONS)
        .map(|idea| {
            let metrics = idea
                .keyword_idea_metrics
                .as_ref()
                .ok_or_else(|| AppError::MalformedIdea {
                    text: idea.text.clone(),
                })?;
            Ok(Suggestion {
                text: idea.text.clone(),
                avg_monthly_searches: metrics.avg_monthly_searches,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    Ok(ResolvedResult::Suggestions {
        keyword: target_keyword.to_string(),
        suggestions,
    })
}
