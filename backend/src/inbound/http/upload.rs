//! Avatar uploads.
//!
//! ```text
//! GET /upload
//! POST /upload  multipart/form-data; field "img" (image/png or image/jpeg)
//! ```

use actix_multipart::{Multipart, MultipartError};
use actix_web::{HttpResponse, web};
use futures_util::TryStreamExt;
use tracing::info;

use crate::domain::{AvatarUpload, AvatarValidationError, Error, ImageKind};

use super::auth::CurrentUser;
use super::error::PageResult;
use super::locale::RequestLocale;
use super::session::SessionContext;
use super::state::HttpState;
use super::views::{Layout, UploadPage, render};

/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "img";

fn rejected(err: AvatarValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

fn malformed(err: MultipartError) -> Error {
    Error::invalid_request(format!("malformed upload: {err}"))
}

/// Render the upload form.
pub async fn upload_form(
    session: SessionContext,
    locale: RequestLocale,
    current: CurrentUser,
) -> PageResult<HttpResponse> {
    render(&UploadPage {
        layout: Layout::for_request("Upload", &session, locale, Some(current.user()))?,
    })
}

/// Store the uploaded image as the signed-in user's avatar and answer with
/// its public path.
pub async fn upload(
    state: web::Data<HttpState>,
    current: CurrentUser,
    mut payload: Multipart,
) -> PageResult<HttpResponse> {
    let limit = state.max_upload_bytes;
    let mut image = None;
    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let content_type = field
            .content_type()
            .map(|mime| mime.essence_str().to_owned())
            .unwrap_or_default();
        ImageKind::from_content_type(&content_type).map_err(rejected)?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(malformed)? {
            if bytes.len() + chunk.len() > limit {
                return Err(rejected(AvatarValidationError::TooLarge { max: limit }));
            }
            bytes.extend_from_slice(&chunk);
        }
        image = Some((content_type, bytes));
        break;
    }

    let (content_type, bytes) = image.ok_or_else(|| rejected(AvatarValidationError::Missing))?;
    let upload = AvatarUpload::new(&content_type, bytes, limit).map_err(rejected)?;
    let me = current.user();
    let path = state.accounts.update_avatar(me.id(), &upload).await?;
    info!(user_id = %me.id(), %path, bytes = upload.bytes().len(), "avatar stored");
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(path.to_string()))
}
