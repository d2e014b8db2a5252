use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use futures_util::TryStreamExt;
use uuid::Uuid;

use crate::{
    api::{
        error::{self, QuotaScope},
        success::{self, Disposition},
    },
    middlewares::{OptionalClaims, get_claims},
    modules::{
        access::service::AccessResolver,
        file::{
            model::{DownloadQuery, FileResponse, RenameFileBody, UsageResponse},
            service::StorageService,
        },
    },
    utils::ValidatedJson,
};

#[post("/upload")]
pub async fn upload_file(
    storage: web::Data<StorageService>,
    mut payload: Multipart,
    req: HttpRequest,
) -> Result<success::Success<FileResponse>, error::Error> {
    let owner_id = get_claims(&req)?.sub;
    let max_file_size = storage.policy().max_file_size;

    while let Some(mut field) = payload.try_next().await.map_err(|e| error::Error::bad_request(e.to_string()))? {
        let filename = match field.content_disposition().and_then(|cd| cd.get_filename()) {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            // Plain form fields are skipped.
            _ => continue,
        };

        let mime_type = field
            .content_type()
            .map(|m| m.to_string())
            .filter(|m| m != "application/octet-stream")
            .unwrap_or_else(|| mime_guess::from_path(&filename).first_or_octet_stream().to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(|e| error::Error::bad_request(e.to_string()))? {
            // Stop buffering as soon as the per-file ceiling is crossed.
            if (bytes.len() + chunk.len()) as i64 > max_file_size {
                return Err(error::SystemError::QuotaExceeded(QuotaScope::File { limit: max_file_size }).into());
            }
            bytes.extend_from_slice(&chunk);
        }

        let file = storage.store(owner_id, bytes, filename, mime_type).await?;

        return Ok(success::Success::created(Some(FileResponse::from(file)))
            .message("File uploaded successfully"));
    }

    Err(error::Error::bad_request("No file found in request"))
}

#[get("")]
pub async fn list_files(
    storage: web::Data<StorageService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<FileResponse>>, error::Error> {
    let owner_id = get_claims(&req)?.sub;
    let files = storage.list_owned(&owner_id).await?;

    Ok(success::Success::ok(Some(files.into_iter().map(FileResponse::from).collect())))
}

#[get("/{file_id}")]
pub async fn get_file(
    access: web::Data<AccessResolver>,
    file_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<FileResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let authorized = access.authorize(&file_id, Some(user_id), None).await?;

    Ok(success::Success::ok(Some(FileResponse::from(authorized.file))))
}

#[put("/{file_id}/rename")]
pub async fn rename_file(
    storage: web::Data<StorageService>,
    file_id: web::Path<Uuid>,
    ValidatedJson(body): ValidatedJson<RenameFileBody>,
    req: HttpRequest,
) -> Result<success::Success<FileResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    if body.name.trim().is_empty() {
        return Err(error::Error::bad_request("Name must not be blank"));
    }

    let file = storage.rename(&file_id, user_id, body.name).await?;

    Ok(success::Success::ok(Some(FileResponse::from(file))).message("File renamed successfully"))
}

#[delete("/{file_id}")]
pub async fn delete_file(
    storage: web::Data<StorageService>,
    file_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    storage.delete(&file_id, user_id).await?;

    Ok(success::Success::ok(None).message("File deleted successfully"))
}

#[get("/usage")]
pub async fn storage_usage(
    storage: web::Data<StorageService>,
    req: HttpRequest,
) -> Result<success::Success<UsageResponse>, error::Error> {
    let owner_id = get_claims(&req)?.sub;
    let used = storage.usage_of(&owner_id).await?;

    Ok(success::Success::ok(Some(UsageResponse::new(used, storage.policy().account_quota))))
}

#[get("/files")]
pub async fn list_all_files(
    storage: web::Data<StorageService>,
) -> Result<success::Success<Vec<FileResponse>>, error::Error> {
    let files = storage.list_all().await?;

    Ok(success::Success::ok(Some(files.into_iter().map(FileResponse::from).collect())))
}

async fn serve(
    storage: &StorageService,
    access: &AccessResolver,
    file_id: &Uuid,
    claims: OptionalClaims,
    query: DownloadQuery,
    disposition: Disposition,
) -> Result<HttpResponse, error::Error> {
    let requester = claims.0.map(|c| c.sub);
    let authorized = access.authorize(file_id, requester, query.share_token.as_deref()).await?;

    let file = authorized.file;
    let bytes = storage.read_content(&file).await?;

    Ok(success::artifact(bytes, &file.original_filename, &file.mime_type, disposition))
}

#[get("/files/{file_id}/download")]
pub async fn download_file(
    storage: web::Data<StorageService>,
    access: web::Data<AccessResolver>,
    file_id: web::Path<Uuid>,
    claims: OptionalClaims,
    query: web::Query<DownloadQuery>,
) -> Result<HttpResponse, error::Error> {
    serve(&storage, &access, &file_id, claims, query.into_inner(), Disposition::Attachment).await
}

#[get("/files/{file_id}/preview")]
pub async fn preview_file(
    storage: web::Data<StorageService>,
    access: web::Data<AccessResolver>,
    file_id: web::Path<Uuid>,
    claims: OptionalClaims,
    query: web::Query<DownloadQuery>,
) -> Result<HttpResponse, error::Error> {
    serve(&storage, &access, &file_id, claims, query.into_inner(), Disposition::Inline).await
}
