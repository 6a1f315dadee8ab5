//! A simple CLI tool for inspecting a trip's idea board offline.
//! This uses the server's own row codec, and so reads exactly what the server
//! would read from the same cells.

use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::BufReader;

use clap::{Arg, ArgAction, ArgMatches, Command};
use rocket::serde::json::serde_json;
use serde::Deserialize;

use trip_planner::model::survey::{decode, row::HEADER, rows_from_cells, Question, ROW_WIDTH};
use trip_planner::sheets::pad_row;

const PROGRAM_NAME: &str = "inspect-survey";

const ABOUT_TEXT: &str = "Summarise the questions and votes in a trip's survey sheet.

EXIT CODES:
     0: Survey read successfully.
     1: Error.";

const DUMP_PATH: &str = "DUMP_PATH";
const VOTER: &str = "voter";

const DUMP_PATH_HELP: &str = "The path to a JSON dump of the survey sheet: either the\n\
response of `GET .../values/Survey!A2:G`, or a bare array of rows";

const VOTER_HELP: &str = "Mark the options this voter picked";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    clap::command!(PROGRAM_NAME)
        .about(ABOUT_TEXT)
        .arg(
            Arg::new(DUMP_PATH)
                .help(DUMP_PATH_HELP)
                .action(ArgAction::Set)
                .required(true),
        )
        .arg(
            Arg::new(VOTER)
                .long(VOTER)
                .short('v')
                .value_name("NAME")
                .help(VOTER_HELP)
                .action(ArgAction::Set),
        )
}

/// Errors that this program may produce.
#[derive(Debug, Eq, PartialEq)]
enum Error {
    /// IO error described by the inner message.
    IO(String),
    /// Failed to decode the JSON dump, or it held malformed rows.
    Format(String),
}

/// The two shapes of dump we accept.
#[derive(Deserialize)]
#[serde(untagged)]
enum Dump {
    ValueRange {
        #[serde(default)]
        values: Vec<Vec<String>>,
    },
    Rows(Vec<Vec<String>>),
}

impl Dump {
    fn into_table(self) -> Vec<Vec<String>> {
        match self {
            Dump::ValueRange { values } => values,
            Dump::Rows(rows) => rows,
        }
    }
}

/// A friendly summary of one option.
#[derive(Debug, Eq, PartialEq)]
struct OptionTally {
    pub label: String,
    pub votes: usize,
    /// Whether the voter given on the command line picked this option.
    pub picked: bool,
}

/// A friendly summary of one question.
#[derive(Debug, Eq, PartialEq)]
struct QuestionSummary {
    pub text: String,
    pub creator: Option<String>,
    pub options: Vec<OptionTally>,
}

impl QuestionSummary {
    fn new(question: Question, voter: Option<&str>) -> Self {
        let options = question
            .options
            .into_iter()
            .map(|option| OptionTally {
                votes: option.voters.len(),
                picked: voter.map_or(false, |voter| option.voters.iter().any(|v| v == voter)),
                label: option.label,
            })
            .collect();
        Self {
            text: question.text,
            creator: question.creator,
            options,
        }
    }
}

impl Display for QuestionSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)?;
        if let Some(creator) = &self.creator {
            write!(f, " (asked by {creator})")?;
        }
        for option in &self.options {
            write!(
                f,
                "\n  {} {}: {} vote{}",
                if option.picked { "*" } else { "-" },
                option.label,
                option.votes,
                if option.votes != 1 { "s" } else { "" }
            )?;
        }
        Ok(())
    }
}

/// Load and decode a dump.
fn inspect(path: &str, voter: Option<&str>) -> Result<Vec<QuestionSummary>, Error> {
    // Load the file.
    let file = BufReader::new(File::open(path).map_err(|e| Error::IO(e.to_string()))?);
    let dump: Dump = serde_json::from_reader(file).map_err(|e| Error::Format(e.to_string()))?;

    // A dump taken from A1 includes the header; it isn't a question.
    let mut table = dump.into_table();
    if table.first().map_or(false, |row| row.iter().eq(HEADER.iter())) {
        table.remove(0);
    }

    // The API trims trailing empty cells, so pad before decoding.
    let table = table.into_iter().map(|row| pad_row(row, ROW_WIDTH)).collect();
    let rows = rows_from_cells(table).map_err(|e| Error::Format(e.to_string()))?;

    Ok(decode(&rows)
        .into_iter()
        .map(|question| QuestionSummary::new(question, voter))
        .collect())
}

/// Run the inspection, report the result, and return the exit code.
fn run(args: &ArgMatches) -> u8 {
    let path: &String = args.get_one(DUMP_PATH).unwrap(); // Required argument is guaranteed to be present.
    let voter = args.get_one::<String>(VOTER).map(String::as_str);
    match inspect(path, voter) {
        Ok(questions) if questions.is_empty() => {
            println!("No questions yet.");
            0
        }
        Ok(questions) => {
            for (i, question) in questions.iter().enumerate() {
                println!("{}. {}", i + 1, question);
            }
            0
        }
        Err(Error::IO(msg)) => {
            println!("IO error: {}", msg);
            1
        }
        Err(Error::Format(msg)) => {
            println!("Invalid survey dump: {}", msg);
            1
        }
    }
}

fn main() {
    let args = cli().get_matches();
    let exit_code = run(&args);
    std::process::exit(exit_code.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(label: &str, votes: usize, picked: bool) -> OptionTally {
        OptionTally {
            label: label.to_string(),
            votes,
            picked,
        }
    }

    #[test]
    fn inspection() {
        // This test actually enters library code, so enable logging.
        log4rs_test_utils::test_logging::init_logging_once_for(["trip_planner"], None, None);

        let expected = vec![
            QuestionSummary {
                text: "Where to stay?".to_string(),
                creator: Some("Bob".to_string()),
                options: vec![tally("Cabin", 1, false), tally("Hotel", 2, true)],
            },
            QuestionSummary {
                text: "What should we do on Saturday?".to_string(),
                creator: Some("Alice".to_string()),
                options: vec![
                    tally("Ridge hike", 2, true),
                    tally("Lake day", 0, false),
                    tally("Museum", 1, false),
                ],
            },
        ];
        assert_eq!(inspect("example_dumps/survey.json", Some("Carol")), Ok(expected));

        let expected = vec![QuestionSummary {
            text: "Rental car?".to_string(),
            creator: None,
            options: vec![tally("Yes", 1, false), tally("No", 0, false)],
        }];
        assert_eq!(inspect("example_dumps/survey_rows.json", None), Ok(expected));

        assert_eq!(inspect("example_dumps/survey_empty.json", None), Ok(vec![]));

        assert!(matches!(
            inspect("example_dumps/survey_too_wide.json", None),
            Err(Error::Format(_))
        ));
        assert!(matches!(
            inspect("example_dumps/survey_malformed.json", None),
            Err(Error::Format(_))
        ));
        assert!(matches!(inspect("not a real file", None), Err(Error::IO(_))));
    }

    #[test]
    fn display() {
        let summary = QuestionSummary {
            text: "Where to stay?".to_string(),
            creator: Some("Bob".to_string()),
            options: vec![tally("Cabin", 1, true), tally("Hotel", 0, false)],
        };
        assert_eq!(
            summary.to_string(),
            "Where to stay? (asked by Bob)\n  * Cabin: 1 vote\n  - Hotel: 0 votes"
        );
    }

    #[test]
    fn correct_cli_usage() {
        let command_line = [PROGRAM_NAME, "example_dumps/survey.json"];
        let args = cli().try_get_matches_from(command_line).unwrap();
        assert_eq!(run(&args), 0);

        let command_line = [PROGRAM_NAME, "example_dumps/survey.json", "--voter", "Alice"];
        let args = cli().try_get_matches_from(command_line).unwrap();
        assert_eq!(run(&args), 0);

        let command_line = [PROGRAM_NAME, "example_dumps/survey_malformed.json"];
        let args = cli().try_get_matches_from(command_line).unwrap();
        assert_eq!(run(&args), 1);

        let command_line = [PROGRAM_NAME, "not a real file"];
        let args = cli().try_get_matches_from(command_line).unwrap();
        assert_eq!(run(&args), 1);
    }

    #[test]
    fn bad_cli_usage() {
        // Something very wrong.
        let command_line = [PROGRAM_NAME, "this", "invocation", "is", "incorrect"];
        cli().try_get_matches_from(command_line).unwrap_err();

        // No options at all.
        let command_line = [PROGRAM_NAME];
        cli().try_get_matches_from(command_line).unwrap_err();
    }
}
