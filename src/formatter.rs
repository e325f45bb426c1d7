// src/formatter.rs
use crate::config::Verdicts;
use crate::errors::Result;
use crate::models::{HomeworkRecord, HomeworkStatus};

/// Builds the notification text for a homework record.
pub fn parse_status(homework: &HomeworkRecord, verdicts: &Verdicts) -> Result<String> {
    let (name, status) = homework.name_and_status()?;
    Ok(format_message(name, status, verdicts))
}

pub fn format_message(name: &str, status: HomeworkStatus, verdicts: &Verdicts) -> String {
    format!(
        "Homework status changed for \"{}\". {}",
        name,
        verdicts.verdict(status)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BotError;

    #[test]
    fn test_message_for_each_status() {
        let verdicts = Verdicts::default();

        let msg = parse_status(&HomeworkRecord::new("hw_bot", "approved"), &verdicts).unwrap();
        assert_eq!(
            msg,
            "Homework status changed for \"hw_bot\". Reviewed: the reviewer liked everything. Hooray!"
        );

        let msg = parse_status(&HomeworkRecord::new("hw_bot", "reviewing"), &verdicts).unwrap();
        assert!(msg.ends_with(&verdicts.reviewing));

        let msg = parse_status(&HomeworkRecord::new("hw_bot", "rejected"), &verdicts).unwrap();
        assert!(msg.ends_with(&verdicts.rejected));
    }

    #[test]
    fn test_custom_verdicts() {
        let verdicts = Verdicts {
            approved: "Принято".to_string(),
            ..Verdicts::default()
        };
        let msg = parse_status(&HomeworkRecord::new("hw", "approved"), &verdicts).unwrap();
        assert_eq!(msg, "Homework status changed for \"hw\". Принято");
    }

    #[test]
    fn test_unknown_status() {
        let err = parse_status(&HomeworkRecord::new("hw_bot", "lost"), &Verdicts::default()).unwrap_err();
        assert!(matches!(err, BotError::UnknownStatus(ref s) if s == "lost"));

        let record = HomeworkRecord {
            homework_name: Some("hw_bot".to_string()),
            status: None,
        };
        let err = parse_status(&record, &Verdicts::default()).unwrap_err();
        assert!(matches!(err, BotError::UnknownStatus(_)));
    }

    #[test]
    fn test_missing_name() {
        let record = HomeworkRecord {
            homework_name: None,
            status: Some("approved".to_string()),
        };
        let err = parse_status(&record, &Verdicts::default()).unwrap_err();
        assert!(matches!(err, BotError::MissingName));
    }
}
