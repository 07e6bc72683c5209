//! One-way text renderings of a [`ResolvedResult`] for chat and stdout.

use crate::resolver::ResolvedResult;

/// Render a result as a chat (mrkdwn) message.
///
/// Breakdown bullets follow the map's insertion order, not calendar order.
/// That is the observed upstream behavior and is preserved on purpose.
pub fn slack_message(result: &ResolvedResult) -> String {
    match result {
        ResolvedResult::ExactMatch {
            keyword,
            avg_monthly_searches,
            competition,
            monthly_breakdown,
        } => {
            let mut message = format!("🔍 *Keyword Research Results for: {keyword}*\n\n");
            message.push_str(&format!(
                "📊 *Average Monthly Searches:* {}\n",
                group_thousands(*avg_monthly_searches)
            ));
            message.push_str(&format!("🏆 *Competition Level:* {competition}\n\n"));

            if !monthly_breakdown.is_empty() {
                message.push_str("*📅 Monthly Search Volume Breakdown:*\n");
                for (month, searches) in monthly_breakdown {
                    message.push_str(&format!("• {month}: {}\n", group_thousands(*searches)));
                }
            }

            message
        }
        ResolvedResult::Suggestions {
            keyword,
            suggestions,
        } => {
            let mut message = format!(
                "🔍 Exact keyword *{keyword}* not found. Here are some close ideas:\n"
            );
            if suggestions.is_empty() {
                message.push_str("_No suggestions available._\n");
            }
            for suggestion in suggestions {
                message.push_str(&format!(
                    "• {}: {}\n",
                    suggestion.text,
                    group_thousands(suggestion.avg_monthly_searches)
                ));
            }
            message
        }
    }
}

/// Render a result as plain text for the CLI.
pub fn plain_report(result: &ResolvedResult) -> String {
    match result {
        ResolvedResult::ExactMatch {
            keyword,
            avg_monthly_searches,
            competition,
            monthly_breakdown,
        } => {
            let mut out = format!("Keyword: {keyword}\n");
            out.push_str(&format!("Avg monthly searches: {avg_monthly_searches}\n"));
            out.push_str(&format!("Competition: {competition}\n"));

            if !monthly_breakdown.is_empty() {
                out.push_str("\nMonthly breakdown:\n");
                for (month, searches) in monthly_breakdown {
                    out.push_str(&format!("{month}: {searches}\n"));
                }
            }

            out
        }
        ResolvedResult::Suggestions {
            keyword,
            suggestions,
        } => {
            let mut out = format!(
                "Exact keyword '{keyword}' not returned. Here are some close ideas:\n"
            );
            for suggestion in suggestions {
                out.push_str(&format!(
                    "{}: {}\n",
                    suggestion.text, suggestion.avg_monthly_searches
                ));
            }
            out
        }
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if n < 0 {
        out.insert(0, '-');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{MonthlyBreakdown, Suggestion};
    use ads_common::ads::CompetitionLevel;

    fn exact_match() -> ResolvedResult {
        let mut breakdown = MonthlyBreakdown::new();
        breakdown.insert("Nov".to_string(), 700);
        breakdown.insert("Mar".to_string(), 1900);
        breakdown.insert("Jul".to_string(), 800);

        ResolvedResult::ExactMatch {
            keyword: "digital marketing".to_string(),
            avg_monthly_searches: 12100,
            competition: CompetitionLevel::High,
            monthly_breakdown: breakdown,
        }
    }

    #[test]
    fn exact_match_message_layout() {
        let message = slack_message(&exact_match());

        assert!(message.starts_with("🔍 *Keyword Research Results for: digital marketing*"));
        assert!(message.contains("📊 *Average Monthly Searches:* 12,100"));
        assert!(message.contains("🏆 *Competition Level:* HIGH"));
        assert!(message.contains("*📅 Monthly Search Volume Breakdown:*"));
    }

    #[test]
    fn bullets_follow_insertion_order() {
        let message = slack_message(&exact_match());
        let nov = message.find("• Nov: 700").unwrap();
        let mar = message.find("• Mar: 1,900").unwrap();
        let jul = message.find("• Jul: 800").unwrap();
        assert!(nov < mar && mar < jul);
    }

    #[test]
    fn suggestions_message() {
        let result = ResolvedResult::Suggestions {
            keyword: "made up term".to_string(),
            suggestions: vec![
                Suggestion {
                    text: "made up".to_string(),
                    avg_monthly_searches: 90,
                },
                Suggestion {
                    text: "term".to_string(),
                    avg_monthly_searches: 5400,
                },
            ],
        };

        let message = slack_message(&result);
        assert!(message.contains("Exact keyword *made up term* not found"));
        assert!(message.contains("• made up: 90"));
        assert!(message.contains("• term: 5,400"));
    }

    #[test]
    fn empty_suggestions_message() {
        let result = ResolvedResult::Suggestions {
            keyword: "anything".to_string(),
            suggestions: vec![],
        };
        let message = slack_message(&result);
        assert!(message.contains("_No suggestions available._"));
    }

    #[test]
    fn plain_report_layout() {
        let report = plain_report(&exact_match());
        assert!(report.starts_with("Keyword: digital marketing\n"));
        assert!(report.contains("Avg monthly searches: 12100\n"));
        assert!(report.contains("Competition: HIGH\n"));
        assert!(report.contains("\nMonthly breakdown:\nNov: 700\nMar: 1900\nJul: 800\n"));
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
        assert_eq!(group_thousands(-54321), "-54,321");
    }
}
