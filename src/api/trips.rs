use rocket::{serde::json::Json, Route};

use crate::{
    board::SurveyBoard,
    error::{Error, Result},
    model::{
        api::{
            auth::AuthToken,
            question::QuestionView,
            trip::{ShareRequest, TripDetails, TripSpec, TripSummary},
        },
        trip::{sheet_templates, Trip, DETAILS_SHEET, DETAILS_WIDTH, TITLE_PREFIX},
    },
    sheets::{SheetRange, Sheets},
};

/// The single trip row below the `Details` header.
const DETAILS_RANGE: SheetRange = SheetRange::rows(DETAILS_SHEET, 2, DETAILS_WIDTH, 1);

pub fn routes() -> Vec<Route> {
    routes![list_trips, create_trip, get_trip, share_trip]
}

#[get("/trips")]
async fn list_trips(token: AuthToken, sheets: Sheets) -> Result<Json<Vec<TripSummary>>> {
    let files = sheets
        .list_spreadsheets(&token.credentials(), TITLE_PREFIX)
        .await?;
    let trips = files.into_iter().filter_map(TripSummary::from_file).collect();
    Ok(Json(trips))
}

#[post("/trips", data = "<spec>", format = "json")]
async fn create_trip(
    token: AuthToken,
    spec: Json<TripSpec>,
    sheets: Sheets,
) -> Result<Json<TripSummary>> {
    spec.validate()?;
    let auth = token.credentials();
    let trip = spec.0.into_trip(&token.profile.email);

    let id = sheets
        .create_spreadsheet(&auth, &trip.title(), sheet_templates())
        .await?;
    sheets
        .write_rows(&auth, &id, DETAILS_RANGE, vec![trip.to_cells()])
        .await?;
    info!("{} created trip '{}' ({id})", auth.email, trip.name);

    Ok(Json(TripSummary {
        id,
        name: trip.name,
        is_owner: true,
    }))
}

#[get("/trips/<id>")]
async fn get_trip(token: AuthToken, id: String, sheets: Sheets) -> Result<Json<TripDetails>> {
    let auth = token.credentials();
    let trip = sheets
        .read_rows(&auth, &id, DETAILS_RANGE)
        .await?
        .first()
        .map(|cells| Trip::from_cells(cells))
        .ok_or_else(|| Error::not_found(format!("details of trip {id}")))?;

    let questions = SurveyBoard::new(&sheets, &auth, &id).questions().await?;
    Ok(Json(TripDetails {
        questions: QuestionView::board(questions, &token.profile.name),
        id,
        trip,
    }))
}

#[post("/trips/<id>/collaborators", data = "<share>", format = "json")]
async fn share_trip(
    token: AuthToken,
    id: String,
    share: Json<ShareRequest>,
    sheets: Sheets,
) -> Result<()> {
    share.validate()?;
    let email = share.email.trim();
    sheets.share(&token.credentials(), &id, email).await?;
    info!("{} shared trip {id} with {email}", token.profile.email);
    Ok(())
}
