use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    survey::{Question, QuestionOption},
    user::VoterId,
};

/// A question as submitted by a client, before it is placed on the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSpec {
    /// Question text.
    pub text: String,
    /// Possible answers, in display order.
    pub options: Vec<OptionSpec>,
}

/// An option as submitted by a client. Voters are never taken from clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionSpec {
    pub label: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl OptionSpec {
    fn into_option(self, voters: Vec<String>) -> QuestionOption {
        QuestionOption {
            label: self.label.trim().to_string(),
            details: trimmed(self.details),
            link: trimmed(self.link),
            image: trimmed(self.image),
            voters,
        }
    }
}

fn trimmed(cell: Option<String>) -> Option<String> {
    cell.map(|c| c.trim().to_string()).filter(|c| !c.is_empty())
}

impl QuestionSpec {
    /// Reject questions that could not be read back off the sheet.
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(Error::bad_request("question text is empty"));
        }
        if self.options.is_empty() {
            return Err(Error::bad_request("question has no options"));
        }
        if let Some(i) = self
            .options
            .iter()
            .position(|option| option.label.trim().is_empty())
        {
            return Err(Error::bad_request(format!("option {i} has no label")));
        }
        Ok(())
    }

    /// A brand-new question asked by `creator`, with no votes.
    pub fn into_question(self, creator: &VoterId) -> Question {
        Question {
            text: self.text.trim().to_string(),
            creator: Some(creator.to_string()),
            options: self
                .options
                .into_iter()
                .map(|option| option.into_option(Vec::new()))
                .collect(),
        }
    }

    /// An edit of `existing`. The creator is kept, and each option keeps the
    /// voters of the option that was at the same position.
    pub fn apply_to(self, existing: &Question) -> Question {
        let options = self
            .options
            .into_iter()
            .enumerate()
            .map(|(i, option)| {
                let voters = existing
                    .options
                    .get(i)
                    .map(|old| old.voters.clone())
                    .unwrap_or_default();
                option.into_option(voters)
            })
            .collect();
        Question {
            text: self.text.trim().to_string(),
            creator: existing.creator.clone(),
            options,
        }
    }
}

/// A question as shown to one particular user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionView {
    /// Position on the board; this is what votes and edits refer to.
    pub index: usize,
    pub text: String,
    pub creator: Option<String>,
    pub options: Vec<OptionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionView {
    pub index: usize,
    pub label: String,
    pub details: Option<String>,
    pub link: Option<String>,
    pub image: Option<String>,
    pub voters: Vec<String>,
    pub votes: usize,
    /// Whether the viewer is among the voters.
    pub voted: bool,
}

impl QuestionView {
    pub fn new(index: usize, question: Question, viewer: &VoterId) -> Self {
        let options = question
            .options
            .into_iter()
            .enumerate()
            .map(|(index, option)| OptionView {
                index,
                votes: option.voters.len(),
                voted: option.voters.iter().any(|name| viewer == name),
                label: option.label,
                details: option.details,
                link: option.link,
                image: option.image,
                voters: option.voters,
            })
            .collect();
        Self {
            index,
            text: question.text,
            creator: question.creator,
            options,
        }
    }

    /// The whole board from `viewer`'s point of view.
    pub fn board(questions: Vec<Question>, viewer: &VoterId) -> Vec<Self> {
        questions
            .into_iter()
            .enumerate()
            .map(|(index, question)| Self::new(index, question, viewer))
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use rocket::http::Status;

    use super::*;

    fn alice() -> VoterId {
        "Alice".parse().unwrap()
    }

    #[test]
    fn validation() {
        assert!(QuestionSpec::example().validate().is_ok());

        let mut spec = QuestionSpec::example();
        spec.text = "  ".to_string();
        assert_eq!(spec.validate().unwrap_err().status(), Status::BadRequest);

        let mut spec = QuestionSpec::example();
        spec.options.clear();
        assert!(spec.validate().is_err());

        let mut spec = QuestionSpec::example();
        spec.options.push(OptionSpec::labelled(""));
        assert!(spec.validate().is_err());
    }

    #[test]
    fn new_question_has_creator_and_no_votes() {
        let mut spec = QuestionSpec::example();
        spec.options[0].details = Some("  ".to_string());
        spec.options[1].link = Some(" https://example.com/hotel ".to_string());

        let question = spec.into_question(&alice());
        assert_eq!(question.creator.as_deref(), Some("Alice"));
        assert_eq!(question.options[0].details, None);
        assert_eq!(
            question.options[1].link.as_deref(),
            Some("https://example.com/hotel")
        );
        assert!(question.options.iter().all(|o| o.voters.is_empty()));
    }

    #[test]
    fn edit_keeps_creator_and_positional_votes() {
        let existing = Question::example();
        let spec = QuestionSpec {
            text: "Where should we stay?".to_string(),
            options: vec![
                OptionSpec::labelled("Log cabin"),
                OptionSpec::labelled("Hotel"),
                OptionSpec::labelled("Tent"),
            ],
        };

        let edited = spec.apply_to(&existing);
        assert_eq!(edited.text, "Where should we stay?");
        assert_eq!(edited.creator, existing.creator);
        assert!(edited.options[0].voters.is_empty());
        assert_eq!(edited.options[1].voters, vec!["Alice"]);
        assert!(edited.options[2].voters.is_empty());
    }

    #[test]
    fn view_for_voter() {
        let views = QuestionView::board(vec![Question::example(), Question::example2()], &alice());
        assert_eq!(views[1].index, 1);
        assert_eq!(views[0].options[1].votes, 1);
        assert!(views[0].options[1].voted);
        assert!(!views[0].options[0].voted);
        assert_eq!(views[1].options[0].votes, 2);
        assert!(!views[1].options[2].voted);
        assert_eq!(views[1].options[2].index, 2);
    }
}
