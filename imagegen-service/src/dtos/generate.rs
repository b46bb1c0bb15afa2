use axum::{
    body::Body,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use serde::Serialize;
use thiserror::Error;

/// Largest urlencoded body accepted on the generate route.
const MAX_FORM_BYTES: usize = 2 * 1024 * 1024;

/// Form fields of a generate call. Absent fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub style: String,
    pub aspect: String,
    pub quality: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub image_url: String,
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Invalid multipart body: {0}")]
    Multipart(String),

    #[error("Invalid form body: {0}")]
    UrlEncoded(String),
}

impl From<axum::extract::multipart::MultipartError> for FormError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        FormError::Multipart(err.body_text())
    }
}

impl GenerationRequest {
    /// Decode a `multipart/form-data` or `application/x-www-form-urlencoded` body.
    pub async fn from_request(request: Request<Body>) -> Result<Self, FormError> {
        let content_type = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(request, &())
                .await
                .map_err(|e| FormError::Multipart(e.body_text()))?;
            Self::from_multipart(multipart).await
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let bytes = axum::body::to_bytes(request.into_body(), MAX_FORM_BYTES)
                .await
                .map_err(|e| FormError::UrlEncoded(e.to_string()))?;
            Self::from_urlencoded(&bytes)
        } else {
            Err(FormError::UnsupportedContentType(content_type))
        }
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, FormError> {
        let mut fields = FormFields::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            if !fields.wants(&name) {
                continue;
            }
            let value = field.text().await?;
            fields.set(&name, value);
        }
        Ok(fields.into())
    }

    fn from_urlencoded(bytes: &[u8]) -> Result<Self, FormError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(bytes)
            .map_err(|e| FormError::UrlEncoded(e.to_string()))?;

        let mut fields = FormFields::default();
        for (name, value) in pairs {
            fields.set(&name, value);
        }
        Ok(fields.into())
    }
}

/// First value seen for each known field; later duplicates are ignored.
#[derive(Default)]
struct FormFields {
    prompt: Option<String>,
    style: Option<String>,
    aspect: Option<String>,
    quality: Option<String>,
}

impl FormFields {
    fn slot(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            "prompt" => Some(&mut self.prompt),
            "style" => Some(&mut self.style),
            "aspect" => Some(&mut self.aspect),
            "quality" => Some(&mut self.quality),
            _ => None,
        }
    }

    fn wants(&mut self, name: &str) -> bool {
        self.slot(name).is_some_and(|slot| slot.is_none())
    }

    fn set(&mut self, name: &str, value: String) {
        if let Some(slot) = self.slot(name) {
            slot.get_or_insert(value);
        }
    }
}

impl From<FormFields> for GenerationRequest {
    fn from(fields: FormFields) -> Self {
        Self {
            prompt: fields.prompt.unwrap_or_default(),
            style: fields.style.unwrap_or_default(),
            aspect: fields.aspect.unwrap_or_default(),
            quality: fields.quality.unwrap_or_default(),
        }
    }
}
