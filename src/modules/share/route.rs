use crate::modules::share::handle::*;
use actix_web::web::{ServiceConfig, scope};

pub fn public_api_configure(cfg: &mut ServiceConfig) {
    cfg.service(download_shared);
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/shares")
            .service(share_with_friend)
            .service(create_public_share)
            .service(list_shared_with_me)
            .service(list_my_shares)
            .service(revoke_share),
    );
}
