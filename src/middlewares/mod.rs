use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest,
    body::MessageBody,
    dev::{Payload, ServiceRequest, ServiceResponse},
    middleware::Next,
    web,
};
use futures_util::{
    FutureExt,
    future::{LocalBoxFuture, Ready, ready},
};
use std::rc::Rc;

use crate::{api::error, configs::AuthConfig, modules::user::schema::UserRole, utils::Claims};

/// Bearer token from the `Authorization` header, or from `?token=` for
/// clients that cannot set headers (iframes, the document server).
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    let from_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string);

    from_header.or_else(|| {
        web::Query::<TokenQuery>::from_query(req.query_string())
            .ok()
            .and_then(|q| q.into_inner().token)
            .filter(|t| !t.is_empty())
    })
}

#[derive(serde::Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn decode_claims(req: &HttpRequest, token: &str) -> Result<Claims, error::Error> {
    let auth = req
        .app_data::<web::Data<AuthConfig>>()
        .ok_or(error::Error::InternalServer)?;

    Claims::decode(token, auth.jwt_secret.as_bytes())
        .map_err(|_| error::Error::unauthorized("Token Invalid or Expired"))
}

pub async fn authentication<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<B>, Error>
where
    B: MessageBody + 'static,
{
    let token = match bearer_token(req.request()) {
        Some(t) => t,
        None => {
            return Err(error::Error::unauthorized("Token Invalid or Expired").into());
        }
    };

    let claims = decode_claims(req.request(), &token)?;

    req.extensions_mut().insert(claims);

    next.call(req).await
}

pub fn get_claims(req: &HttpRequest) -> Result<Claims, error::Error> {
    let extensions = req.extensions();

    let claims = extensions
        .get::<Claims>()
        .ok_or_else(|| error::Error::unauthorized("Unauthorized"))?
        .clone();

    Ok(claims)
}

pub fn authorization<B>(
    allowed_roles: Vec<UserRole>,
) -> impl Fn(
    ServiceRequest,
    Next<B>,
) -> LocalBoxFuture<'static, Result<ServiceResponse<B>, actix_web::Error>>
where
    B: MessageBody + 'static,
{
    let allowed_roles = Rc::new(allowed_roles);
    move |req: ServiceRequest, next: Next<B>| {
        let roles = allowed_roles.clone();
        async move {
            let role = get_claims(req.request())?.role;

            if !roles.contains(&role) {
                return Err(error::Error::forbidden("No permission").into());
            }
            next.call(req).await
        }
        .boxed_local()
    }
}

/// Identity on routes that also serve anonymous share-link holders. A missing
/// or invalid token yields no identity rather than an error.
pub struct OptionalClaims(pub Option<Claims>);

impl FromRequest for OptionalClaims {
    type Error = error::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = bearer_token(req).and_then(|token| match decode_claims(req, &token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                log::debug!("Ignoring unusable bearer token: {}", e);
                None
            }
        });

        ready(Ok(OptionalClaims(claims)))
    }
}

/// Identity that must be present, taken from the header or `?token=`, along
/// with the raw token so it can be handed on to the document server.
pub struct BearerClaims {
    pub claims: Claims,
    pub token: String,
}

impl FromRequest for BearerClaims {
    type Error = error::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = bearer_token(req)
            .ok_or_else(|| error::Error::unauthorized("Authentication token required"))
            .and_then(|token| {
                let claims = decode_claims(req, &token)?;
                Ok(BearerClaims { claims, token })
            });

        ready(result)
    }
}
