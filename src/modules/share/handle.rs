use actix_web::{HttpRequest, HttpResponse, delete, get, post, web};
use uuid::Uuid;

use crate::{
    api::{
        error,
        success::{self, Disposition},
    },
    middlewares::get_claims,
    modules::{
        file::service::StorageService,
        share::{
            model::{
                CreatePublicShareBody, GrantSummary, PublicShareResponse, ShareToFriendBody,
                SharedWithMeRow,
            },
            schema::ShareEntity,
            service::ShareService,
        },
    },
    utils::ValidatedJson,
};

#[post("/friend")]
pub async fn share_with_friend(
    share_service: web::Data<ShareService>,
    ValidatedJson(body): ValidatedJson<ShareToFriendBody>,
    req: HttpRequest,
) -> Result<success::Success<ShareEntity>, error::Error> {
    let owner_id = get_claims(&req)?.sub;
    let share = share_service.grant_to_friend(owner_id, body.file_id, body.friend_id).await?;

    Ok(success::Success::created(Some(share)).message("File shared successfully"))
}

#[post("/public")]
pub async fn create_public_share(
    share_service: web::Data<ShareService>,
    ValidatedJson(body): ValidatedJson<CreatePublicShareBody>,
    req: HttpRequest,
) -> Result<success::Success<PublicShareResponse>, error::Error> {
    let owner_id = get_claims(&req)?.sub;
    let share = share_service.create_public_grant(owner_id, body.file_id, body.expires_in).await?;

    let share_token = share.share_token.ok_or(error::Error::InternalServer)?;
    let response = PublicShareResponse {
        id: share.id,
        file_id: share.file_id,
        url: format!("/api/share/{}", share_token),
        share_token,
        expires_at: share.expires_at,
        created_at: share.created_at,
    };

    Ok(success::Success::created(Some(response)).message("Public link created successfully"))
}

#[get("/with-me")]
pub async fn list_shared_with_me(
    share_service: web::Data<ShareService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<SharedWithMeRow>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let rows = share_service.list_granted_to_me(user_id).await?;

    Ok(success::Success::ok(Some(rows)))
}

#[get("/mine")]
pub async fn list_my_shares(
    share_service: web::Data<ShareService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<GrantSummary>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let grants = share_service.list_my_grants(user_id).await?;

    Ok(success::Success::ok(Some(grants)))
}

#[delete("/{share_id}")]
pub async fn revoke_share(
    share_service: web::Data<ShareService>,
    share_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    share_service.revoke(*share_id, user_id).await?;

    Ok(success::Success::ok(None).message("Share removed successfully"))
}

#[get("/share/{token}")]
pub async fn download_shared(
    share_service: web::Data<ShareService>,
    storage: web::Data<StorageService>,
    token: web::Path<String>,
) -> Result<HttpResponse, error::Error> {
    let file = share_service.resolve_by_token(&token).await?;
    let bytes = storage.read_content(&file).await?;

    Ok(success::artifact(bytes, &file.original_filename, &file.mime_type, Disposition::Attachment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test};

    use crate::test::TestEnv;

    #[actix_web::test]
    async fn public_link_serves_until_revoked() {
        let env = TestEnv::new();
        let owner = Uuid::new_v4();
        let file = env.upload(owner, "slides.pptx", b"deck").await;
        let share = env.shares.create_public_grant(owner, file.id, Some(1)).await.unwrap();
        let token = share.share_token.clone().unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(env.shares.clone()))
                .app_data(web::Data::new(env.storage.clone()))
                .service(download_shared),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri(&format!("/share/{token}")).to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers().get("X-Filename").unwrap(), "slides.pptx");
        assert_eq!(test::read_body(res).await, &b"deck"[..]);

        env.clock.advance(chrono::Duration::hours(2));
        let res = test::call_service(&app, test::TestRequest::get().uri(&format!("/share/{token}")).to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = test::call_service(&app, test::TestRequest::get().uri("/share/unknown").to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
