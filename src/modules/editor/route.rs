use crate::modules::editor::handle::*;
use actix_web::web::ServiceConfig;

/// The config route authenticates from the header or `?token=`; the callback
/// is only reachable from the document server's network.
pub fn public_api_configure(cfg: &mut ServiceConfig) {
    cfg.service(editor_config).service(editor_callback);
}
