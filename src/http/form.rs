//! Request form decoding.
//!
//! # Responsibilities
//! - Decode the URL query string
//! - Decode `application/x-www-form-urlencoded` bodies (POST, PUT, PATCH)
//! - Split `multipart/form-data` bodies into text fields and file parts
//!
//! # Design Decisions
//! - Parsed once per request, before any handler runs, so handlers stay sync
//! - Lookup order for values: urlencoded body, query string, multipart fields
//! - A broken multipart body only affects file lookups; values still resolve
//!   from the query string
//! - Same for a body that could not be buffered: the request is still routed

use std::convert::Infallible;
use std::io::Cursor;

use axum::body::Bytes;
use axum::http::{header, request::Parts, HeaderMap};
use thiserror::Error;

use crate::routing::Method;

const URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART: &str = "multipart/form-data";

/// Why a form file could not be handed out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormFileError {
    /// The request body is not `multipart/form-data`.
    #[error("request Content-Type isn't multipart/form-data")]
    NotMultipart,

    /// No file part carries the requested field name.
    #[error("no such file")]
    MissingFile,

    /// The multipart body could not be decoded.
    #[error("malformed multipart body: {0}")]
    Malformed(String),

    /// The body was larger than the buffering limit.
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// The body could not be read from the connection.
    #[error("failed to read request body: {0}")]
    Unreadable(String),
}

/// Metadata of an uploaded file part.
#[derive(Debug, Clone)]
pub struct FileHeader {
    /// Form field name the part was sent under.
    pub field_name: String,
    /// Client-supplied file name.
    pub file_name: String,
    pub content_type: Option<String>,
    /// Raw part headers.
    pub headers: HeaderMap,
    /// Size of the contents in bytes.
    pub size: usize,
}

/// Readable handle over an uploaded file's contents.
pub type FileReader = Cursor<Bytes>;

#[derive(Debug, Clone)]
struct FormFile {
    header: FileHeader,
    data: Bytes,
}

/// Decoded form of one request.
#[derive(Debug, Clone)]
pub struct Form {
    body_values: Vec<(String, String)>,
    query_values: Vec<(String, String)>,
    multipart_values: Vec<(String, String)>,
    files: Result<Vec<FormFile>, FormFileError>,
}

impl Form {
    /// Form made of the query string only.
    pub fn from_query(parts: &Parts) -> Self {
        let query_values = parts
            .uri
            .query()
            .map(|q| decode_urlencoded(q.as_bytes()))
            .unwrap_or_default();

        Self {
            body_values: Vec::new(),
            query_values,
            multipart_values: Vec::new(),
            files: Err(FormFileError::NotMultipart),
        }
    }

    /// Form for a request whose body could not be buffered: query values
    /// only, and every file lookup fails with `error`.
    pub fn without_body(parts: &Parts, error: FormFileError) -> Self {
        Self {
            files: Err(error),
            ..Self::from_query(parts)
        }
    }

    /// Decode the query string and, depending on content type, the body.
    pub async fn parse(parts: &Parts, body: &Bytes) -> Self {
        let mut form = Self::from_query(parts);

        let Some(content_type) = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        else {
            return form;
        };

        match media_type(content_type).as_str() {
            URLENCODED => {
                let carries_body = Method::from_http(&parts.method)
                    .map(|m| m.carries_form_body())
                    .unwrap_or(false);
                if carries_body {
                    form.body_values = decode_urlencoded(body);
                }
            }
            MULTIPART => match decode_multipart(content_type, body.clone()).await {
                Ok((values, files)) => {
                    form.multipart_values = values;
                    form.files = Ok(files);
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Failed to decode multipart body");
                    form.files = Err(FormFileError::Malformed(e.to_string()));
                }
            },
            _ => {}
        }

        form
    }

    /// First value for `key`, if any.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.body_values
            .iter()
            .chain(&self.query_values)
            .chain(&self.multipart_values)
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First file part sent under `key`.
    pub fn file(&self, key: &str) -> Result<(FileReader, FileHeader), FormFileError> {
        let files = self.files.as_ref().map_err(|e| e.clone())?;
        files
            .iter()
            .find(|f| f.header.field_name == key)
            .map(|f| (Cursor::new(f.data.clone()), f.header.clone()))
            .ok_or(FormFileError::MissingFile)
    }
}

/// Media type without parameters, lowercased.
fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn decode_urlencoded(input: &[u8]) -> Vec<(String, String)> {
    form_urlencoded::parse(input).into_owned().collect()
}

async fn decode_multipart(
    content_type: &str,
    body: Bytes,
) -> Result<(Vec<(String, String)>, Vec<FormFile>), multer::Error> {
    let boundary = multer::parse_boundary(content_type)?;
    let stream = futures_util::stream::once(async move { Ok::<Bytes, Infallible>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut values = Vec::new();
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let file_name = field.file_name().unwrap_or_default().to_owned();
        let content_type = field.content_type().map(|m| m.to_string());
        let headers = field.headers().clone();
        let data = field.bytes().await?;

        if file_name.is_empty() {
            values.push((name, String::from_utf8_lossy(&data).into_owned()));
        } else {
            files.push(FormFile {
                header: FileHeader {
                    field_name: name,
                    file_name,
                    content_type,
                    headers,
                    size: data.len(),
                },
                data,
            });
        }
    }

    Ok((values, files))
}
