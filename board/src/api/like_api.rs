use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::api::types::Response;
use crate::app::App;
use crate::services::like_service::request_like;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub post_id: Uuid,
    pub liker_id: String,
}

#[post("")]
pub async fn create_like(app: web::Data<App>, like: web::Json<LikeRequest>) -> Response {
    let mut txn = app.like_pipeline.begin();
    let event = request_like(&mut txn, like.post_id, &like.liker_id);
    txn.commit();

    Ok(HttpResponse::Accepted().json(json!({
        "postId": event.post_id,
        "eventId": event.id,
        "status": "queued",
    })))
}

#[get("/{postId}/count")]
pub async fn get_like_count(app: web::Data<App>, post_id: web::Path<Uuid>) -> Response {
    let post_id = post_id.into_inner();
    let like_count = app.like_counter.count_like(post_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "postId": post_id,
        "likeCount": like_count,
    })))
}

#[post("/{postId}/reconcile")]
pub async fn reconcile_like_count(app: web::Data<App>, post_id: web::Path<Uuid>) -> Response {
    let post_id = post_id.into_inner();
    let like_count = app.like_counter.reconcile(post_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "postId": post_id,
        "likeCount": like_count,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::count_cache::{like_count_key, CountCache};
    use crate::testing::Fixture;
    use actix_web::http::StatusCode;
    use actix_web::{test, App as ActixWebApp};
    use serde_json::Value as Json;
    use toml::Value;

    fn app(fixture: &Fixture) -> App {
        let config = "port = 3000".parse::<Value>().unwrap();

        App::with_stores(config, fixture.posts.clone(), fixture.likes.clone(), fixture.cache.clone())
    }

    #[actix_web::test]
    async fn like_is_accepted_then_counted() {
        let fixture = Fixture::new();
        let post_id = fixture.posts.with_post();
        let app = app(&fixture);
        let service = test::init_service(
            ActixWebApp::new().app_data(web::Data::new(app.clone())).service(
                web::scope("/likes")
                    .service(create_like)
                    .service(get_like_count)
                    .service(reconcile_like_count),
            ),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/likes")
            .set_json(json!({ "postId": post_id, "likerId": "alice" }))
            .to_request();
        let res = test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::ACCEPTED);

        app.like_pipeline.shutdown().await.unwrap();

        let req = test::TestRequest::get()
            .uri(&format!("/likes/{}/count", post_id))
            .to_request();
        let body: Json = test::call_and_read_body_json(&service, req).await;

        assert_eq!(body["likeCount"], 1);
        assert_eq!(fixture.likes.likes_of(post_id)[0].liker_id, "alice");
    }

    #[actix_web::test]
    async fn reconcile_endpoint_rewrites_cache() {
        let fixture = Fixture::new();
        let post_id = fixture.posts.with_post();
        fixture.cache.set_integer(&like_count_key(post_id), 9).await.unwrap();
        let app = app(&fixture);
        let service = test::init_service(
            ActixWebApp::new()
                .app_data(web::Data::new(app))
                .service(web::scope("/likes").service(reconcile_like_count)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri(&format!("/likes/{}/reconcile", post_id))
            .to_request();
        let body: Json = test::call_and_read_body_json(&service, req).await;

        assert_eq!(body["likeCount"], 0);
        assert_eq!(fixture.cache.peek(&like_count_key(post_id)), Some(0));
    }

    #[actix_web::test]
    async fn malformed_like_is_rejected() {
        let fixture = Fixture::new();
        let service = test::init_service(
            ActixWebApp::new()
                .app_data(web::Data::new(app(&fixture)))
                .service(web::scope("/likes").service(create_like)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/likes")
            .set_json(json!({ "postId": "not-a-uuid" }))
            .to_request();
        let res = test::call_service(&service, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
