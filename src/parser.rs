//! Chat command parser
//!
//! Classifies user inputs as either:
//! - Forecast command: `forecast <TICKER> for <DAYS> days in <CURRENCY>`
//! - General question: everything else, forwarded verbatim to the assistant

use crate::error::{DashboardError, Result};
use crate::models::ForecastCommand;

/// Keyword that opens a forecast command (matched case-insensitively).
const FORECAST_KEYWORD: &str = "forecast";

// Token positions in the fixed command template. Filler words between them
// are not validated; only the count and the days integer matter.
const TICKER_POS: usize = 1;
const DAYS_POS: usize = 3;
const CURRENCY_POS: usize = 6;
const MIN_TOKENS: usize = 7;

/// Classified intent of one incoming chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatIntent {
    /// Well-formed forecast command.
    Forecast(ForecastCommand),
    /// Starts with the forecast keyword but violates the template.
    Malformed { reason: String },
    /// Anything else, routed to the question-answering collaborator.
    General(String),
}

/// Classify a raw chat message. Pure; no side effects.
pub fn classify(message: &str) -> ChatIntent {
    let trimmed = message.trim();

    if !trimmed.to_lowercase().starts_with(FORECAST_KEYWORD) {
        return ChatIntent::General(trimmed.to_string());
    }

    match parse_forecast_command(trimmed) {
        Ok(command) => ChatIntent::Forecast(command),
        Err(e) => ChatIntent::Malformed {
            reason: e.to_string(),
        },
    }
}

/// Extract a [`ForecastCommand`] from the positional template. The whole
/// command is invalid if any of the three fields is missing or malformed.
pub fn parse_forecast_command(message: &str) -> Result<ForecastCommand> {
    let tokens: Vec<&str> = message.split_whitespace().collect();

    if tokens.len() < MIN_TOKENS {
        return Err(DashboardError::InvalidCommand(format!(
            "expected at least {} tokens, got {}",
            MIN_TOKENS,
            tokens.len()
        )));
    }

    let days: u32 = tokens[DAYS_POS].parse().map_err(|_| {
        DashboardError::InvalidCommand(format!(
            "days token '{}' is not an integer",
            tokens[DAYS_POS]
        ))
    })?;

    if days == 0 {
        return Err(DashboardError::InvalidCommand(
            "horizon must be at least one day".to_string(),
        ));
    }

    Ok(ForecastCommand {
        symbol: tokens[TICKER_POS].to_uppercase(),
        horizon_days: days,
        currency: tokens[CURRENCY_POS].to_uppercase(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_command() {
        let intent = classify("forecast AAPL for 30 days in USD");
        assert_eq!(
            intent,
            ChatIntent::Forecast(ForecastCommand {
                symbol: "AAPL".to_string(),
                horizon_days: 30,
                currency: "USD".to_string(),
            })
        );
    }

    #[test]
    fn test_ticker_and_currency_are_uppercased() {
        let intent = classify("FORECAST tsla for 7 days in eur");
        let ChatIntent::Forecast(cmd) = intent else {
            panic!("expected forecast intent");
        };
        assert_eq!(cmd.symbol, "TSLA");
        assert_eq!(cmd.currency, "EUR");
        assert_eq!(cmd.horizon_days, 7);
    }

    #[test]
    fn test_missing_days_token() {
        // Six tokens only; the numeric field is gone entirely.
        let intent = classify("forecast AAPL for days in USD");
        assert!(matches!(intent, ChatIntent::Malformed { .. }));
    }

    #[test]
    fn test_non_numeric_days() {
        let intent = classify("forecast AAPL for thirty days in USD");
        assert!(matches!(intent, ChatIntent::Malformed { .. }));
    }

    #[test]
    fn test_zero_days_rejected() {
        let intent = classify("forecast AAPL for 0 days in USD");
        assert!(matches!(intent, ChatIntent::Malformed { .. }));
    }

    #[test]
    fn test_bare_keyword() {
        let intent = classify("forecast");
        assert!(matches!(intent, ChatIntent::Malformed { .. }));
    }

    #[test]
    fn test_general_questions() {
        let cases = vec![
            "what is RSI?",
            "how is AAPL performing?",
            "explain moving averages",
        ];

        for c in cases {
            assert_eq!(classify(c), ChatIntent::General(c.to_string()));
        }
    }

    #[test]
    fn test_general_text_is_trimmed_verbatim() {
        let intent = classify("  should I rebalance?  ");
        assert_eq!(intent, ChatIntent::General("should I rebalance?".to_string()));
    }

    #[test]
    fn test_extra_trailing_tokens_ignored() {
        let intent = classify("forecast MSFT for 14 days in USD please and thanks");
        let ChatIntent::Forecast(cmd) = intent else {
            panic!("expected forecast intent");
        };
        assert_eq!(cmd.symbol, "MSFT");
        assert_eq!(cmd.horizon_days, 14);
    }
}
