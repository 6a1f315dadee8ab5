use rocket::{serde::json::Json, Route, State};

use crate::{
    board::SurveyBoard,
    error::{Error, Result},
    model::api::{
        auth::AuthToken,
        question::{QuestionSpec, QuestionView},
    },
    sheets::Sheets,
    Config,
};

pub fn routes() -> Vec<Route> {
    routes![list_questions, add_question, update_question, vote]
}

#[get("/trips/<id>/questions")]
async fn list_questions(
    token: AuthToken,
    id: &str,
    sheets: Sheets,
) -> Result<Json<Vec<QuestionView>>> {
    let auth = token.credentials();
    let board = SurveyBoard::new(&sheets, &auth, id);
    let questions = board.questions().await?;
    Ok(Json(QuestionView::board(questions, &token.profile.name)))
}

#[post("/trips/<id>/questions", data = "<spec>", format = "json")]
async fn add_question(
    token: AuthToken,
    id: &str,
    spec: Json<QuestionSpec>,
    sheets: Sheets,
) -> Result<Json<Vec<QuestionView>>> {
    spec.validate()?;
    let auth = token.credentials();
    let board = SurveyBoard::new(&sheets, &auth, id);

    board
        .add_question(&spec.0.into_question(&token.profile.name))
        .await?;

    let questions = board.questions().await?;
    Ok(Json(QuestionView::board(questions, &token.profile.name)))
}

#[put("/trips/<id>/questions/<index>", data = "<spec>", format = "json")]
async fn update_question(
    token: AuthToken,
    id: &str,
    index: usize,
    spec: Json<QuestionSpec>,
    sheets: Sheets,
) -> Result<Json<Vec<QuestionView>>> {
    spec.validate()?;
    let auth = token.credentials();
    let board = SurveyBoard::new(&sheets, &auth, id);

    let questions = board.questions().await?;
    let existing = questions
        .get(index)
        .ok_or_else(|| Error::not_found(format!("question {index}")))?;
    board
        .replace_question(index, &spec.0.apply_to(existing))
        .await?;

    let questions = board.questions().await?;
    Ok(Json(QuestionView::board(questions, &token.profile.name)))
}

#[post("/trips/<id>/questions/<question>/options/<option>/vote")]
async fn vote(
    token: AuthToken,
    id: &str,
    question: usize,
    option: usize,
    sheets: Sheets,
    config: &State<Config>,
) -> Result<Json<Vec<QuestionView>>> {
    let auth = token.credentials();
    let board = SurveyBoard::new(&sheets, &auth, id);

    board
        .vote(question, option, &token.profile.name, config.vote_policy())
        .await?;

    let questions = board.questions().await?;
    Ok(Json(QuestionView::board(questions, &token.profile.name)))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json::json,
    };

    use crate::model::{
        api::{
            auth::SignInRequest,
            question::OptionSpec,
            trip::{TripSpec, TripSummary},
        },
        trip::SURVEY_SHEET,
    };
    use crate::sheets::InMemorySheets;

    use super::*;

    /// Create a trip and ask `QuestionSpec::example()` on it.
    async fn trip_with_question(client: &Client) -> String {
        let response = client
            .post("/trips")
            .header(ContentType::JSON)
            .body(json!(TripSpec::example()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let trip: TripSummary = response.into_json().await.unwrap();

        let response = client
            .post(uri!(add_question(trip.id.as_str())))
            .header(ContentType::JSON)
            .body(json!(QuestionSpec::example()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        trip.id
    }

    async fn cast_vote(client: &Client, id: &str, question: usize, option: usize) -> Status {
        client
            .post(uri!(vote(id, question, option)))
            .dispatch()
            .await
            .status()
    }

    async fn board(client: &Client, id: &str) -> Vec<QuestionView> {
        let response = client.get(uri!(list_questions(id))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        response.into_json().await.unwrap()
    }

    #[backend_test(signed_in)]
    async fn add_and_list(client: Client, sheets: InMemorySheets) {
        let id = trip_with_question(&client).await;

        let questions = board(&client, &id).await;
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].text, "Where to stay?");
        assert_eq!(questions[0].creator.as_deref(), Some("Alice"));
        assert_eq!(questions[0].options.len(), 2);
        assert_eq!(questions[0].options[1].label, "Hotel");

        let survey = sheets.sheet(&id, SURVEY_SHEET).await.unwrap();
        assert_eq!(
            survey[1],
            vec!["Where to stay?", "Cabin", "", "", "", "", "Alice"]
        );
        assert_eq!(survey[2], vec!["", "Hotel", "", "", "", "", ""]);
    }

    #[backend_test(signed_in)]
    async fn add_invalid(client: Client) {
        let id = trip_with_question(&client).await;
        let spec = QuestionSpec {
            text: "Dinner?".to_string(),
            options: vec![],
        };
        let response = client
            .post(uri!(add_question(id.as_str())))
            .header(ContentType::JSON)
            .body(json!(spec).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());
        assert_eq!(board(&client, &id).await.len(), 1);
    }

    #[backend_test(signed_in)]
    async fn vote_toggles(client: Client) {
        let id = trip_with_question(&client).await;

        assert_eq!(cast_vote(&client, &id, 0, 1).await, Status::Ok);
        let questions = board(&client, &id).await;
        assert_eq!(questions[0].options[1].voters, vec!["Alice"]);
        assert!(questions[0].options[1].voted);
        assert_eq!(questions[0].options[1].votes, 1);

        // Multi-select by default: a second option doesn't clear the first.
        assert_eq!(cast_vote(&client, &id, 0, 0).await, Status::Ok);
        let questions = board(&client, &id).await;
        assert!(questions[0].options[0].voted);
        assert!(questions[0].options[1].voted);

        assert_eq!(cast_vote(&client, &id, 0, 1).await, Status::Ok);
        let questions = board(&client, &id).await;
        assert!(questions[0].options[1].voters.is_empty());
        assert!(!questions[0].options[1].voted);
    }

    #[backend_test(signed_in)]
    async fn votes_from_two_people(client: Client) {
        let id = trip_with_question(&client).await;
        cast_vote(&client, &id, 0, 0).await;

        let response = client
            .post(format!("/trips/{id}/collaborators"))
            .header(ContentType::JSON)
            .body(json!({ "email": "bob@example.com" }).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        client
            .post(uri!(crate::api::auth::sign_in))
            .header(ContentType::JSON)
            .body(json!(SignInRequest::example2()).to_string())
            .dispatch()
            .await;

        assert_eq!(cast_vote(&client, &id, 0, 0).await, Status::Ok);
        let questions = board(&client, &id).await;
        assert_eq!(questions[0].options[0].voters, vec!["Alice", "Bob"]);
        assert!(questions[0].options[0].voted);
    }

    #[backend_test(signed_in)]
    async fn vote_out_of_range(client: Client) {
        let id = trip_with_question(&client).await;
        assert_eq!(cast_vote(&client, &id, 0, 2).await, Status::NotFound);
        assert_eq!(cast_vote(&client, &id, 1, 0).await, Status::NotFound);
        assert!(board(&client, &id)
            .await
            .iter()
            .flat_map(|q| &q.options)
            .all(|o| o.voters.is_empty()));
    }

    #[backend_test(signed_in)]
    async fn update_keeps_votes_by_position(client: Client) {
        let id = trip_with_question(&client).await;
        cast_vote(&client, &id, 0, 1).await;

        let spec = QuestionSpec {
            text: "Where should we stay?".to_string(),
            options: vec![OptionSpec::labelled("Cabin"), OptionSpec::labelled("Hotel")],
        };
        let response = client
            .put(uri!(update_question(id.as_str(), 0)))
            .header(ContentType::JSON)
            .body(json!(spec).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let questions: Vec<QuestionView> = response.into_json().await.unwrap();
        assert_eq!(questions[0].text, "Where should we stay?");
        assert_eq!(questions[0].creator.as_deref(), Some("Alice"));
        assert_eq!(questions[0].options[1].voters, vec!["Alice"]);
    }

    #[backend_test(signed_in)]
    async fn update_shrinks_cleanly(client: Client, sheets: InMemorySheets) {
        let id = trip_with_question(&client).await;
        let spec = QuestionSpec {
            text: "Campsite?".to_string(),
            options: vec![OptionSpec::labelled("Yes")],
        };
        client
            .post(uri!(add_question(id.as_str())))
            .header(ContentType::JSON)
            .body(json!(spec).to_string())
            .dispatch()
            .await;

        let spec = QuestionSpec {
            text: "Where to stay?".to_string(),
            options: vec![OptionSpec::labelled("Cabin")],
        };
        let response = client
            .put(uri!(update_question(id.as_str(), 0)))
            .header(ContentType::JSON)
            .body(json!(spec).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());

        let questions = board(&client, &id).await;
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].options.len(), 1);
        assert_eq!(questions[1].text, "Campsite?");

        // The stale last row was blanked rather than left behind.
        let survey = sheets.sheet(&id, SURVEY_SHEET).await.unwrap();
        assert_eq!(survey.len(), 4);
        assert!(survey[3].iter().all(String::is_empty));
    }

    #[backend_test(signed_in)]
    async fn update_missing_question(client: Client) {
        let id = trip_with_question(&client).await;
        let response = client
            .put(uri!(update_question(id.as_str(), 5)))
            .header(ContentType::JSON)
            .body(json!(QuestionSpec::example()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test]
    async fn board_needs_sign_in(client: Client) {
        let response = client
            .get(uri!(list_questions("memory-sheet-1")))
            .dispatch()
            .await;
        assert_eq!(Status::Unauthorized, response.status());
        assert_eq!(
            cast_vote(&client, "memory-sheet-1", 0, 0).await,
            Status::Unauthorized
        );
    }
}
