use amsdb::metadata::MetadataError;
use amsdb::metadata::prompt::Prompter;
use colored::Colorize;
use inquire::{InquireError, Text};

/// Asks the metadata questions on the terminal.
///
/// Every question is asked once. A blank answer comes back as `None`, so a
/// blank mandatory description aborts the update of that key.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

fn question_text(label: &str, mandatory: bool) -> String {
    if mandatory {
        format!("{} (required):", label)
    } else {
        format!("{}:", label)
    }
}

fn non_blank(answer: &str) -> Option<String> {
    let answer = answer.trim();
    (!answer.is_empty()).then(|| answer.to_string())
}

impl Prompter for TerminalPrompter {
    fn ask(&mut self, label: &str, mandatory: bool) -> Result<Option<String>, MetadataError> {
        match Text::new(&question_text(label, mandatory)).prompt() {
            Ok(answer) => Ok(non_blank(&answer)),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                Err(MetadataError::Prompt("cancelled by the user".to_string()))
            }
            Err(e) => Err(MetadataError::Prompt(e.to_string())),
        }
    }

    fn message(&mut self, text: &str) {
        if text.starts_with("==") || text.starts_with("--") {
            println!("{}", text.cyan());
        } else if !text.is_empty() {
            println!("{}", text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_questions_are_marked() {
        assert_eq!(
            question_text("Description of `bulk`", true),
            "Description of `bulk` (required):"
        );
        assert_eq!(question_text("`ada` email [None]", false), "`ada` email [None]:");
    }

    #[test]
    fn blank_answers_are_none() {
        assert_eq!(non_blank("   "), None);
        assert_eq!(non_blank(""), None);
        assert_eq!(non_blank("  bulk cells \n").as_deref(), Some("bulk cells"));
    }
}
