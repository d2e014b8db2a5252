use crate::modules::file::handle::*;
use actix_web::web::{ServiceConfig, scope};

/// Content routes reachable without a session; access is decided per request.
pub fn public_api_configure(cfg: &mut ServiceConfig) {
    cfg.service(download_file).service(preview_file);
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/files")
            .service(upload_file)
            .service(list_files)
            .service(get_file)
            .service(rename_file)
            .service(delete_file),
    )
    .service(scope("/storage").service(storage_usage));
}

pub fn admin_configure(cfg: &mut ServiceConfig) {
    cfg.service(list_all_files);
}
