use actix_web::{HttpResponse, get, post, web};
use uuid::Uuid;

use crate::{
    api::error,
    middlewares::BearerClaims,
    modules::editor::{model::SaveCallback, service::EditorService},
};

/// Served unwrapped: the browser passes this object straight to the editor.
#[get("/files/{file_id}/editor/config")]
pub async fn editor_config(
    editor: web::Data<EditorService>,
    file_id: web::Path<Uuid>,
    bearer: BearerClaims,
) -> Result<HttpResponse, error::Error> {
    let config = editor.issue_session(&file_id, &bearer.claims, &bearer.token).await?;

    Ok(HttpResponse::Ok().json(config))
}

#[post("/editor/callback/{file_id}")]
pub async fn editor_callback(
    editor: web::Data<EditorService>,
    file_id: web::Path<Uuid>,
    body: web::Json<SaveCallback>,
) -> HttpResponse {
    let reply = editor.handle_callback(&file_id, body.into_inner()).await;

    HttpResponse::Ok().json(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::json;

    use crate::{
        configs::AuthConfig,
        modules::{editor::model::CallbackReply, user::schema::UserRole},
        test::TestEnv,
        utils::Claims,
    };

    #[actix_web::test]
    async fn callback_endpoint_saves_and_replies_in_editor_format() {
        let env = TestEnv::new();
        let owner = Uuid::new_v4();
        let file = env.upload(owner, "Report.docx", &[0; 100]).await;
        env.fetcher.respond_with(vec![1; 250]);
        let key = crate::modules::editor::service::document_key(&file, &owner);

        let app = test::init_service(
            App::new().app_data(web::Data::new(env.editor.clone())).service(editor_callback),
        )
        .await;

        let req = test::TestRequest::post()
            .uri(&format!("/editor/callback/{}", file.id))
            .set_json(json!({ "key": key, "status": 2, "url": "http://ds/cache/1", "users": ["u"] }))
            .to_request();
        let reply: CallbackReply = test::call_and_read_body_json(&app, req).await;
        assert_eq!(reply, CallbackReply::ack());
        assert_eq!(env.storage.resolve(&file.id).await.unwrap().file_size, 250);

        env.fetcher.fail();
        let req = test::TestRequest::post()
            .uri(&format!("/editor/callback/{}", file.id))
            .set_json(json!({ "key": key, "status": 2, "url": "http://ds/cache/2" }))
            .to_request();
        let reply: CallbackReply = test::call_and_read_body_json(&app, req).await;
        assert_eq!(reply, CallbackReply::failed());

        let req = test::TestRequest::post()
            .uri(&format!("/editor/callback/{}", file.id))
            .set_json(json!({ "key": key, "status": 1 }))
            .to_request();
        let reply: CallbackReply = test::call_and_read_body_json(&app, req).await;
        assert_eq!(reply, CallbackReply::ack());
        assert_eq!(env.fetcher.calls().len(), 2);

        let req = test::TestRequest::post()
            .uri(&format!("/editor/callback/{}", file.id))
            .set_json(json!({ "key": "file_0_0_v1", "status": 2, "url": "http://ds/cache/3" }))
            .to_request();
        let reply: CallbackReply = test::call_and_read_body_json(&app, req).await;
        assert_eq!(reply, CallbackReply::failed());
        assert_eq!(env.fetcher.calls().len(), 2);
    }

    #[actix_web::test]
    async fn config_requires_a_token() {
        let env = TestEnv::new();
        let owner = Uuid::new_v4();
        let file = env.upload(owner, "Report.docx", b"v1").await;
        let token = Claims::new(&owner, "alice", &UserRole::User, 60).encode(b"secret").unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AuthConfig { jwt_secret: "secret".into() }))
                .app_data(web::Data::new(env.editor.clone()))
                .service(editor_config),
        )
        .await;

        let req = test::TestRequest::get().uri(&format!("/files/{}/editor/config", file.id)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri(&format!("/files/{}/editor/config?token={}", file.id, token))
            .to_request();
        let config: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(config["document"]["fileType"], "docx");
        assert_eq!(config["editorConfig"]["user"]["name"], "alice");
        assert_eq!(config["editorConfig"]["mode"], "edit");
    }
}
