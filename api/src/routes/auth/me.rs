use actix_web::HttpResponse;

use crate::dto::SubjectResponse;
use crate::middleware::AuthContext;

/// Handler for GET /api/v1/auth/me
pub async fn me(auth: AuthContext) -> HttpResponse {
    HttpResponse::Ok().json(SubjectResponse {
        subject: auth.subject,
        key_id: auth.key_id,
    })
}
