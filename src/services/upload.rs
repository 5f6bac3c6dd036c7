use crate::config::parse_env_or;
use crate::error::{AppError, AppResult};
use anyhow::Context;
use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024; // 50 MB

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub upload_dir: PathBuf,
    pub max_bytes: usize,
    /// Prefix for returned URLs, e.g. a CDN origin. Empty means site-relative.
    pub public_base_url: String,
}

impl UploadConfig {
    pub fn from_env() -> Self {
        Self {
            upload_dir: PathBuf::from(
                env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string()),
            ),
            max_bytes: parse_env_or("UPLOAD_MAX_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            public_base_url: env::var("UPLOAD_PUBLIC_BASE_URL")
                .map(|u| u.trim().trim_end_matches('/').to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    fn directory(self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Video => "videos",
        }
    }
}

/// content type, extension, kind
const ALLOWED_TYPES: &[(&str, &str, MediaKind)] = &[
    ("image/jpeg", "jpg", MediaKind::Image),
    ("image/png", "png", MediaKind::Image),
    ("image/gif", "gif", MediaKind::Image),
    ("image/webp", "webp", MediaKind::Image),
    ("video/mp4", "mp4", MediaKind::Video),
    ("video/webm", "webm", MediaKind::Video),
    ("video/quicktime", "mov", MediaKind::Video),
];

/// QuickTime atoms that may open a .mov file.
const QUICKTIME_ATOMS: &[&[u8; 4]] = &[b"ftyp", b"moov", b"wide", b"mdat", b"free", b"skip"];

/// Validate file magic bytes match the declared content type.
fn validate_magic_bytes(data: &[u8], content_type: &str) -> bool {
    match content_type {
        "image/jpeg" => data.len() >= 3 && data[..3] == [0xFF, 0xD8, 0xFF],
        "image/png" => data.len() >= 4 && data[..4] == [0x89, 0x50, 0x4E, 0x47],
        "image/gif" => data.len() >= 4 && data[..4] == [0x47, 0x49, 0x46, 0x38],
        "image/webp" => {
            data.len() >= 12
                && data[..4] == [0x52, 0x49, 0x46, 0x46]
                && data[8..12] == [0x57, 0x45, 0x42, 0x50]
        }
        "video/mp4" => data.len() >= 8 && &data[4..8] == b"ftyp",
        "video/webm" => data.len() >= 4 && data[..4] == [0x1A, 0x45, 0xDF, 0xA3],
        "video/quicktime" => {
            data.len() >= 8 && QUICKTIME_ATOMS.iter().any(|atom| &data[4..8] == *atom)
        }
        _ => false,
    }
}

pub struct UploadService;

impl UploadService {
    /// Save an uploaded image or video under `images/` or `videos/`.
    /// Returns the public URL (e.g., `/uploads/images/uuid.jpg`).
    pub async fn save_file(
        config: &UploadConfig,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<String> {
        if data.len() > config.max_bytes {
            return Err(AppError::PayloadTooLarge);
        }
        if data.is_empty() {
            return Err(AppError::Validation("No file provided".to_string()));
        }

        let content_type = content_type.trim().to_ascii_lowercase();
        let Some(&(_, ext, kind)) = ALLOWED_TYPES
            .iter()
            .find(|(allowed, _, _)| *allowed == content_type)
        else {
            return Err(AppError::Validation(format!(
                "Unsupported file type: {}. Allowed: jpeg, png, gif, webp, mp4, webm, mov",
                content_type
            )));
        };

        if !validate_magic_bytes(data, &content_type) {
            return Err(AppError::Validation(
                "File content does not match declared content type".to_string(),
            ));
        }

        let filename = format!("{}.{}", Uuid::new_v4(), ext);
        let dir = Path::new(&config.upload_dir).join(kind.directory());

        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create upload directory {}", dir.display()))?;

        let file_path = dir.join(&filename);
        fs::write(&file_path, data)
            .await
            .with_context(|| format!("Failed to write {}", file_path.display()))?;

        tracing::info!(
            file = %file_path.display(),
            bytes = data.len(),
            "Stored upload"
        );

        Ok(format!(
            "{}/uploads/{}/{}",
            config.public_base_url,
            kind.directory(),
            filename
        ))
    }
}
