/// Multipart post forms
///
/// Fields: `title`, `content` and `image`. `image` is either a file part
/// (a new upload) or a plain text part carrying an existing reference.
/// File parts with an unaccepted content type are dropped, unknown parts
/// are drained.
use actix_multipart::{Field, Multipart};
use futures_util::StreamExt;

use crate::error::{AppError, Result};
use crate::models::PostInput;
use crate::services::ImageSource;
use crate::storage::{self, ImageUpload};

/// Upper bound for a single text part
const MAX_TEXT_BYTES: usize = 64 * 1024;

#[derive(Debug, Default)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    pub image: Option<ImageUpload>,
    pub image_ref: Option<String>,
}

impl PostForm {
    pub fn input(&self) -> PostInput {
        PostInput {
            title: self.title.clone(),
            content: self.content.clone(),
        }
    }

    /// A new upload wins over a text reference
    pub fn image_source(self) -> Option<ImageSource> {
        match (self.image, self.image_ref) {
            (Some(upload), _) => Some(ImageSource::Upload(upload)),
            (None, Some(reference)) if !reference.trim().is_empty() => {
                Some(ImageSource::Existing(reference.trim().to_string()))
            }
            _ => None,
        }
    }
}

pub async fn read_post_form(mut payload: Multipart, max_image_bytes: usize) -> Result<PostForm> {
    let mut form = PostForm::default();

    while let Some(field) = payload.next().await {
        let mut field =
            field.map_err(|e| AppError::validation(format!("malformed multipart body: {}", e)))?;

        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        match (name.as_str(), file_name) {
            ("image", Some(file_name)) => {
                let accepted = field
                    .content_type()
                    .map(storage::is_accepted_type)
                    .unwrap_or(false);
                if !accepted {
                    tracing::debug!(%file_name, "ignoring upload with unaccepted content type");
                    drain(&mut field).await?;
                    continue;
                }

                let bytes = read_limited(&mut field, max_image_bytes, "image").await?;
                if !bytes.is_empty() {
                    form.image = Some(ImageUpload { file_name, bytes });
                }
            }
            ("image", None) => form.image_ref = Some(read_text(&mut field, "image").await?),
            ("title", _) => form.title = read_text(&mut field, "title").await?,
            ("content", _) => form.content = read_text(&mut field, "content").await?,
            _ => drain(&mut field).await?,
        }
    }

    Ok(form)
}

async fn read_limited(field: &mut Field, limit: usize, name: &str) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk =
            chunk.map_err(|e| AppError::validation(format!("failed to read {}: {}", name, e)))?;
        if data.len() + chunk.len() > limit {
            return Err(AppError::validation(format!(
                "{} exceeds the {} byte limit",
                name, limit
            )));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

async fn read_text(field: &mut Field, name: &str) -> Result<String> {
    let bytes = read_limited(field, MAX_TEXT_BYTES, name).await?;
    String::from_utf8(bytes)
        .map_err(|_| AppError::validation(format!("{} is not valid UTF-8", name)))
}

async fn drain(field: &mut Field) -> Result<()> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|e| AppError::validation(format!("malformed multipart body: {}", e)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_takes_precedence_over_reference() {
        let form = PostForm {
            image: Some(ImageUpload {
                file_name: "a.png".into(),
                bytes: vec![1],
            }),
            image_ref: Some("images/old.png".into()),
            ..Default::default()
        };
        assert!(matches!(form.image_source(), Some(ImageSource::Upload(_))));
    }

    #[test]
    fn blank_reference_means_no_image() {
        let form = PostForm {
            image_ref: Some("  ".into()),
            ..Default::default()
        };
        assert!(form.image_source().is_none());

        let form = PostForm {
            image_ref: Some("images/old.png".into()),
            ..Default::default()
        };
        match form.image_source() {
            Some(ImageSource::Existing(reference)) => assert_eq!(reference, "images/old.png"),
            other => panic!("unexpected image source: {:?}", other),
        }
    }
}
