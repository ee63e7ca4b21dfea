//! Upload intake
//!
//! Multipart bodies carry one file part plus text fields. The file is
//! type-checked before anything touches the disk, then streamed into the
//! uploads folder with a running size check. Stored files are served
//! statically under `/uploads`.

use axum::extract::multipart::{Field, Multipart};
use podium_common::time::unix_millis;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// URL prefix the uploads folder is served under
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

const VIDEO_MIME_TYPES: &[&str] = &[
    "video/mp4",
    "video/mpeg",
    "video/quicktime",
    "video/x-msvideo",
    "video/webm",
    "video/x-quicktime",
];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mpeg", "mov", "avi", "webm"];

const AUDIO_MIME_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/mp3",
    "audio/wav",
    "audio/x-wav",
    "audio/webm",
    "audio/ogg",
    "audio/mp4",
    "audio/x-m4a",
    "audio/aac",
];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "webm", "ogg", "m4a", "aac"];

const IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/jpg", "image/webp"];

/// Kind of media an endpoint accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Video,
    Audio,
    Image,
}

impl UploadKind {
    /// Lowercase name, also the stored file name prefix
    pub fn name(&self) -> &'static str {
        match self {
            UploadKind::Video => "video",
            UploadKind::Audio => "audio",
            UploadKind::Image => "image",
        }
    }

    fn mime_types(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Video => VIDEO_MIME_TYPES,
            UploadKind::Audio => AUDIO_MIME_TYPES,
            UploadKind::Image => IMAGE_MIME_TYPES,
        }
    }

    /// Extensions accepted when the client sent an unhelpful MIME type
    fn extensions(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Video => VIDEO_EXTENSIONS,
            UploadKind::Audio => AUDIO_EXTENSIONS,
            UploadKind::Image => &[],
        }
    }

    /// Settings key holding the size limit
    pub fn size_setting(&self) -> &'static str {
        match self {
            UploadKind::Video => "max_video_upload_bytes",
            UploadKind::Audio => "max_audio_upload_bytes",
            UploadKind::Image => "max_image_upload_bytes",
        }
    }

    pub fn default_max_bytes(&self) -> u64 {
        match self {
            UploadKind::Video => 100 * 1024 * 1024,
            UploadKind::Audio => 25 * 1024 * 1024,
            UploadKind::Image => 5 * 1024 * 1024,
        }
    }

    /// Whether a part with this content type and file name is acceptable
    pub fn accepts(&self, mime: Option<&str>, file_name: Option<&str>) -> bool {
        if let Some(mime) = mime {
            if self.mime_types().contains(&mime.to_ascii_lowercase().as_str()) {
                return true;
            }
        }
        file_name
            .and_then(extension_of)
            .map(|ext| self.extensions().contains(&ext.as_str()))
            .unwrap_or(false)
    }

    /// MIME type to record for an accepted part
    fn effective_mime(&self, mime: Option<&str>, file_name: Option<&str>) -> String {
        match mime.map(str::to_ascii_lowercase) {
            Some(m) if self.mime_types().contains(&m.as_str()) => m,
            _ => file_name
                .and_then(|name| mime_guess::from_path(name).first_raw())
                .unwrap_or("application/octet-stream")
                .to_string(),
        }
    }

    /// Extension for the stored file
    fn stored_extension(&self, mime: &str, file_name: Option<&str>) -> String {
        if let Some(ext) = file_name.and_then(extension_of) {
            let known = self.extensions().contains(&ext.as_str())
                || mime_guess::from_ext(&ext)
                    .iter_raw()
                    .any(|guess| guess == mime || self.mime_types().contains(&guess));
            if known {
                return ext;
            }
        }
        mime_guess::get_mime_extensions_str(mime)
            .and_then(|exts| exts.first())
            .map(|ext| ext.to_string())
            .unwrap_or_else(|| "bin".to_string())
    }

    pub fn invalid_type_message(&self, mime: Option<&str>) -> String {
        format!(
            "Invalid file type: {}. Only {} files are allowed.",
            mime.unwrap_or("unknown"),
            self.name()
        )
    }

    pub fn missing_message(&self) -> String {
        let name = self.name();
        let mut chars = name.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        };
        format!("{} file is required", capitalized)
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Public URL of a stored file
pub fn public_url(stored_path: &str) -> String {
    let file_name = Path::new(stored_path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(stored_path);
    format!("{}/{}", UPLOADS_URL_PREFIX, file_name)
}

/// Size limit for a kind, from settings
pub async fn upload_limit(db: &SqlitePool, kind: UploadKind) -> u64 {
    match podium_common::db::get_setting::<u64>(db, kind.size_setting()).await {
        Ok(Some(limit)) => limit,
        Ok(None) => kind.default_max_bytes(),
        Err(e) => {
            warn!(setting = kind.size_setting(), error = %e, "Using default upload limit");
            kind.default_max_bytes()
        }
    }
}

/// A file written to the uploads folder
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

impl StoredUpload {
    /// Path as stored in the database
    pub fn path_string(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    pub fn url(&self) -> String {
        format!("{}/{}", UPLOADS_URL_PREFIX, self.file_name)
    }
}

/// Parsed multipart body
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<StoredUpload>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Local folder holding uploaded media
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read a multipart body, storing its first file part
    ///
    /// Text parts are collected into `fields`; additional file parts are
    /// ignored. On any error the stored file is removed again.
    pub async fn read_form(
        &self,
        mut multipart: Multipart,
        kind: UploadKind,
        max_bytes: u64,
    ) -> ApiResult<UploadForm> {
        let mut form = UploadForm::default();

        let result: ApiResult<()> = async {
            while let Some(field) = multipart.next_field().await? {
                if field.file_name().is_some() {
                    if form.file.is_some() {
                        debug!("Ignoring extra file part {:?}", field.name());
                        continue;
                    }
                    form.file = Some(self.save_field(field, kind, max_bytes).await?);
                } else if let Some(name) = field.name().map(str::to_string) {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
            Ok(())
        }
        .await;

        if let Err(e) = result {
            if let Some(stored) = form.file.take() {
                self.remove(&stored.path).await;
            }
            return Err(e);
        }

        Ok(form)
    }

    async fn save_field(
        &self,
        mut field: Field<'_>,
        kind: UploadKind,
        max_bytes: u64,
    ) -> ApiResult<StoredUpload> {
        let content_type = field.content_type().map(str::to_string);
        let original_name = field.file_name().map(str::to_string);

        if !kind.accepts(content_type.as_deref(), original_name.as_deref()) {
            return Err(ApiError::BadRequest(
                kind.invalid_type_message(content_type.as_deref()),
            ));
        }

        let mime_type = kind.effective_mime(content_type.as_deref(), original_name.as_deref());
        let extension = kind.stored_extension(&mime_type, original_name.as_deref());
        let file_name = format!("{}-{}-{}.{}", kind.name(), unix_millis(), Uuid::new_v4(), extension);
        let path = self.root.join(&file_name);

        let mut file = tokio::fs::File::create(&path).await?;
        let mut size_bytes: u64 = 0;

        let written: ApiResult<()> = async {
            while let Some(chunk) = field.chunk().await? {
                size_bytes += chunk.len() as u64;
                if size_bytes > max_bytes {
                    return Err(ApiError::BadRequest("File too large".to_string()));
                }
                file.write_all(&chunk).await?;
            }
            file.flush().await?;
            Ok(())
        }
        .await;

        drop(file);
        if let Err(e) = written {
            self.remove(&path).await;
            return Err(e);
        }

        info!(
            file = %file_name,
            mime_type = %mime_type,
            size_bytes,
            "Stored {} upload",
            kind.name()
        );

        Ok(StoredUpload {
            path,
            file_name,
            mime_type,
            size_bytes,
        })
    }

    /// Delete a stored file; a file that is already gone is not an error
    pub async fn remove(&self, path: &Path) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => debug!("Removed media file {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Media file already gone: {}", path.display())
            }
            Err(e) => warn!("Failed to remove media file {}: {}", path.display(), e),
        }
    }

    /// `remove` for a path stored in the database
    pub async fn remove_stored(&self, stored_path: &str) {
        self.remove(Path::new(stored_path)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_accepts_listed_mime() {
        assert!(UploadKind::Video.accepts(Some("video/mp4"), Some("talk.mp4")));
        assert!(UploadKind::Video.accepts(Some("video/quicktime"), None));
        assert!(!UploadKind::Video.accepts(Some("image/png"), Some("talk.png")));
    }

    #[test]
    fn test_extension_fallback_for_generic_mime() {
        assert!(UploadKind::Video.accepts(Some("application/octet-stream"), Some("talk.MOV")));
        assert!(UploadKind::Audio.accepts(None, Some("answer.m4a")));
        assert!(!UploadKind::Image.accepts(Some("application/octet-stream"), Some("face.png")));
    }

    #[test]
    fn test_effective_mime_guessed_from_name() {
        let mime = UploadKind::Video.effective_mime(Some("application/octet-stream"), Some("talk.mp4"));
        assert_eq!(mime, "video/mp4");
        assert_eq!(UploadKind::Audio.effective_mime(Some("AUDIO/WAV"), None), "audio/wav");
    }

    #[test]
    fn test_stored_extension() {
        assert_eq!(UploadKind::Video.stored_extension("video/mp4", Some("talk.MP4")), "mp4");
        assert_eq!(UploadKind::Image.stored_extension("image/png", Some("face.png")), "png");
        assert_eq!(UploadKind::Image.stored_extension("image/png", None), "png");
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            UploadKind::Audio.invalid_type_message(Some("text/plain")),
            "Invalid file type: text/plain. Only audio files are allowed."
        );
        assert_eq!(UploadKind::Video.missing_message(), "Video file is required");
        assert_eq!(UploadKind::Image.missing_message(), "Image file is required");
    }

    #[test]
    fn test_public_url_uses_file_name() {
        assert_eq!(
            public_url("/var/lib/podium/uploads/video-1-abc.mp4"),
            "/uploads/video-1-abc.mp4"
        );
    }

    #[tokio::test]
    async fn test_remove_missing_file_is_quiet() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path().to_path_buf());
        let path = dir.path().join("gone.mp4");

        store.remove(&path).await;

        tokio::fs::write(&path, b"data").await.unwrap();
        store.remove(&path).await;
        assert!(!path.exists());
    }
}
