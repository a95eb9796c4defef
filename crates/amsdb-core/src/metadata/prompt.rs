use super::MetadataError;
use std::collections::VecDeque;

/// Source of answers for the metadata questions.
///
/// `ask` returns `None` for a blank answer. Whether a blank answer is
/// acceptable is decided by the caller; `mandatory` only lets the prompter
/// tell the user.
pub trait Prompter {
    fn ask(&mut self, label: &str, mandatory: bool) -> Result<Option<String>, MetadataError>;

    /// Free text shown between questions.
    fn message(&mut self, _text: &str) {}
}

/// Answers from a fixed list, one per question, for batch runs and tests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// One answer per line; empty lines are blank answers.
    pub fn from_lines(text: &str) -> Self {
        Self::new(text.lines())
    }

    /// Labels of the questions asked so far.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, label: &str, _mandatory: bool) -> Result<Option<String>, MetadataError> {
        self.asked.push(label.to_string());
        let answer = self
            .answers
            .pop_front()
            .ok_or_else(|| MetadataError::Prompt(format!("no answer left for {}", label)))?;
        let answer = answer.trim();
        Ok((!answer.is_empty()).then(|| answer.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_answers_are_consumed_in_order() {
        let mut p = ScriptedPrompter::from_lines("first\n\n  third  \n");
        assert_eq!(p.ask("a", true).unwrap().as_deref(), Some("first"));
        assert_eq!(p.ask("b", false).unwrap(), None);
        assert_eq!(p.ask("c", false).unwrap().as_deref(), Some("third"));
        assert_eq!(p.asked(), ["a", "b", "c"]);
        assert!(matches!(p.ask("d", false), Err(MetadataError::Prompt(_))));
    }
}
