use rocket::{serde::json::Json, Route, State};

use crate::{
    error::Result,
    model::{
        api::auth::AuthToken,
        metadata::{MetadataRequest, PageFetcher, PageMetadata},
    },
};

pub fn routes() -> Vec<Route> {
    routes![link_metadata]
}

/// Preview a link so a new option can be pre-filled from it.
#[post("/metadata", data = "<request>", format = "json")]
async fn link_metadata(
    _token: AuthToken,
    request: Json<MetadataRequest>,
    fetcher: &State<PageFetcher>,
) -> Result<Json<PageMetadata>> {
    Ok(Json(fetcher.fetch(&request).await?))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json::json,
    };

    use super::*;

    #[backend_test(signed_in)]
    async fn refuses_non_web_links(client: Client) {
        let response = client
            .post(uri!(link_metadata))
            .header(ContentType::JSON)
            .body(json!({ "url": "file:///etc/passwd" }).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());
    }

    #[backend_test]
    async fn needs_sign_in(client: Client) {
        let response = client
            .post(uri!(link_metadata))
            .header(ContentType::JSON)
            .body(json!({ "url": "https://example.com" }).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Unauthorized, response.status());
    }
}
