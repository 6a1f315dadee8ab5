use serde::{Deserialize, Serialize};

use super::row::{decode_voters, encode_voters, Row};

/// A topic on a trip's idea board, with the options people vote on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question text. Never empty for a question that came out of [`decode`].
    pub text: String,
    /// Display name of whoever asked.
    pub creator: Option<String>,
    /// Possible answers, in row order.
    pub options: Vec<QuestionOption>,
}

/// One possible answer to a [`Question`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub label: String,
    pub details: Option<String>,
    pub link: Option<String>,
    pub image: Option<String>,
    /// Display names of the voters, order-preserving but without duplicates.
    pub voters: Vec<String>,
}

impl QuestionOption {
    fn from_row(row: &Row) -> Self {
        Self {
            label: row.label.clone(),
            details: non_empty(&row.details),
            link: non_empty(&row.link),
            image: non_empty(&row.image),
            voters: decode_voters(&row.voters),
        }
    }

    fn fill_row(&self, row: &mut Row) {
        row.label = self.label.clone();
        row.details = self.details.clone().unwrap_or_default();
        row.link = self.link.clone().unwrap_or_default();
        row.image = self.image.clone().unwrap_or_default();
        row.voters = encode_voters(&self.voters);
    }
}

impl Question {
    /// Encode this question as a contiguous run of rows.
    ///
    /// Only the first row carries the question text and creator. A question
    /// without options still produces a single row so that the run keeps its
    /// start marker.
    pub fn to_rows(&self) -> Vec<Row> {
        let mut first = Row {
            question: self.text.clone(),
            creator: self.creator.clone().unwrap_or_default(),
            ..Default::default()
        };
        let mut options = self.options.iter();
        if let Some(option) = options.next() {
            option.fill_row(&mut first);
        }

        let mut rows = vec![first];
        rows.extend(options.map(|option| {
            let mut row = Row::default();
            option.fill_row(&mut row);
            row
        }));
        rows
    }
}

/// Encode a sequence of questions back to back.
pub fn encode(questions: &[Question]) -> Vec<Row> {
    questions.iter().flat_map(Question::to_rows).collect()
}

/// Decode a table of rows into questions.
///
/// Never fails: rows before the first question and blank rows are skipped.
pub fn decode(rows: &[Row]) -> Vec<Question> {
    let (mut questions, current) = rows.iter().fold(
        (Vec::new(), None::<Question>),
        |(mut questions, current), row| {
            if row.is_question_start() {
                questions.extend(current);
                let question = Question {
                    text: row.question.clone(),
                    creator: non_empty(&row.creator),
                    options: vec![QuestionOption::from_row(row)],
                };
                (questions, Some(question))
            } else if row.label.is_empty() {
                (questions, current)
            } else {
                let current = current.map(|mut question| {
                    question.options.push(QuestionOption::from_row(row));
                    question
                });
                (questions, current)
            }
        },
    );
    questions.extend(current);
    questions
}

fn non_empty(cell: &str) -> Option<String> {
    (!cell.is_empty()).then(|| cell.to_string())
}

/// Example data for tests.
#[cfg(test)]
pub(crate) mod examples {
    use super::*;

    impl Question {
        /// Two options, one vote.
        pub fn example() -> Self {
            Self {
                text: "Where to stay?".to_string(),
                creator: Some("Bob".to_string()),
                options: vec![
                    QuestionOption::labelled("Cabin"),
                    QuestionOption {
                        voters: vec!["Alice".to_string()],
                        ..QuestionOption::labelled("Hotel")
                    },
                ],
            }
        }

        /// Three options with every optional field filled in somewhere.
        pub fn example2() -> Self {
            Self {
                text: "What should we do on Saturday?".to_string(),
                creator: Some("Alice".to_string()),
                options: vec![
                    QuestionOption {
                        details: Some("Four hours, moderate climb".to_string()),
                        link: Some("https://example.com/ridge-trail".to_string()),
                        image: Some("https://example.com/ridge.jpg".to_string()),
                        voters: vec!["Alice".to_string(), "Carol".to_string()],
                        ..QuestionOption::labelled("Ridge hike")
                    },
                    QuestionOption {
                        details: Some("Bring towels".to_string()),
                        ..QuestionOption::labelled("Lake day")
                    },
                    QuestionOption {
                        voters: vec!["Bob".to_string()],
                        ..QuestionOption::labelled("Museum")
                    },
                ],
            }
        }

        /// Single option and no recorded creator.
        pub fn example3() -> Self {
            Self {
                text: "Rental car?".to_string(),
                creator: None,
                options: vec![QuestionOption::labelled("Yes")],
            }
        }
    }

    impl QuestionOption {
        pub fn labelled(label: &str) -> Self {
            Self {
                label: label.to_string(),
                ..Default::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: [&str; 7]) -> Row {
        Row::from_cells(cells.iter().map(|c| c.to_string()).collect()).unwrap()
    }

    #[test]
    fn encode_where_to_stay() {
        let rows = Question::example().to_rows();
        assert_eq!(
            rows,
            vec![
                row(["Where to stay?", "Cabin", "", "", "", "", "Bob"]),
                row(["", "Hotel", "", "", "", "Alice", ""]),
            ]
        );

        let decoded = decode(&rows);
        assert_eq!(decoded, vec![Question::example()]);
        assert_eq!(decoded[0].options[0].voters, Vec::<String>::new());
        assert_eq!(decoded[0].options[1].voters, vec!["Alice"]);
    }

    #[test]
    fn round_trip() {
        for question in [
            Question::example(),
            Question::example2(),
            Question::example3(),
        ] {
            assert_eq!(decode(&question.to_rows()), vec![question]);
        }
    }

    #[test]
    fn empty_optionals_normalise_to_none() {
        let mut question = Question::example3();
        question.creator = Some(String::new());
        question.options[0].details = Some(String::new());

        let decoded = decode(&question.to_rows());
        assert_eq!(decoded[0].creator, None);
        assert_eq!(decoded[0].options[0].details, None);
    }

    #[test]
    fn run_boundaries() {
        let questions = vec![
            Question::example(),
            Question::example2(),
            Question::example3(),
            Question::example(),
        ];
        let rows = encode(&questions);
        assert_eq!(rows.len(), 2 + 3 + 1 + 2);
        assert_eq!(decode(&rows), questions);
    }

    #[test]
    fn only_first_row_of_run_carries_question_and_creator() {
        let rows = Question::example2().to_rows();
        assert_eq!(rows[0].question, "What should we do on Saturday?");
        assert_eq!(rows[0].creator, "Alice");
        for row in &rows[1..] {
            assert!(row.question.is_empty());
            assert!(row.creator.is_empty());
        }
    }

    #[test]
    fn no_options_still_emits_start_row() {
        let question = Question {
            text: "Anything else?".to_string(),
            creator: Some("Bob".to_string()),
            options: vec![],
        };
        let rows = question.to_rows();
        assert_eq!(rows, vec![row(["Anything else?", "", "", "", "", "", "Bob"])]);

        // Decodes to a single empty option rather than failing.
        let decoded = decode(&rows);
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].options, vec![QuestionOption::default()]);
    }

    #[test]
    fn decode_skips_padding_and_orphans() {
        let rows = vec![
            row(["", "Orphan", "", "", "", "Zed", ""]),
            row(["Where to stay?", "Cabin", "", "", "", "", "Bob"]),
            row(["", "", "", "", "", "", ""]),
            row(["", "Hotel", "", "", "", "Alice", ""]),
            row(["", "", "", "", "", "", ""]),
        ];
        assert_eq!(decode(&rows), vec![Question::example()]);
        assert!(decode(&[]).is_empty());
    }
}
