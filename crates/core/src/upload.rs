//! File upload constraints.
//!
//! Payment receipts accept images and PDF up to 10MB; catalog assets accept
//! images only up to 5MB. The checks are pure so both binaries validate a
//! multipart part before any byte reaches the object store.

/// Maximum size of a payment receipt upload.
pub const MAX_RECEIPT_BYTES: usize = 10 * 1024 * 1024;

/// Maximum size of a catalog image upload.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const IMAGE_MIME: &[&str] = &["image/jpeg", "image/png", "image/webp"];
const RECEIPT_MIME: &[&str] = &["image/jpeg", "image/png", "image/webp", "application/pdf"];

/// Why an upload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("file is too large: {size} bytes (maximum {max})")]
    TooLarge { size: usize, max: usize },
    #[error("file type {mime} is not accepted")]
    UnsupportedType { mime: String },
    #[error("file is empty")]
    Empty,
}

/// Validate a payment receipt part (≤10MB, images and PDF).
///
/// # Errors
///
/// Returns [`UploadError`] when the part is empty, oversized, or of an
/// unaccepted MIME type.
pub fn check_receipt(size: usize, mime: &str) -> Result<(), UploadError> {
    check(size, mime, MAX_RECEIPT_BYTES, RECEIPT_MIME)
}

/// Validate a catalog image part (≤5MB, images only).
///
/// # Errors
///
/// Returns [`UploadError`] when the part is empty, oversized, or of an
/// unaccepted MIME type.
pub fn check_image(size: usize, mime: &str) -> Result<(), UploadError> {
    check(size, mime, MAX_IMAGE_BYTES, IMAGE_MIME)
}

fn check(size: usize, mime: &str, max: usize, allowed: &[&str]) -> Result<(), UploadError> {
    if size == 0 {
        return Err(UploadError::Empty);
    }
    if size > max {
        return Err(UploadError::TooLarge { size, max });
    }
    if !allowed.contains(&mime) {
        return Err(UploadError::UnsupportedType {
            mime: mime.to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_accepts_pdf_and_images() {
        assert!(check_receipt(1024, "application/pdf").is_ok());
        assert!(check_receipt(1024, "image/png").is_ok());
        assert!(check_receipt(MAX_RECEIPT_BYTES, "image/jpeg").is_ok());
    }

    #[test]
    fn test_receipt_rejects_oversize() {
        let err = check_receipt(MAX_RECEIPT_BYTES + 1, "application/pdf")
            .expect_err("oversized");
        assert!(matches!(err, UploadError::TooLarge { .. }));
    }

    #[test]
    fn test_image_rejects_pdf() {
        assert!(check_image(1024, "image/webp").is_ok());
        let err = check_image(1024, "application/pdf").expect_err("pdf is not an image");
        assert_eq!(
            err,
            UploadError::UnsupportedType {
                mime: "application/pdf".to_owned()
            }
        );
    }

    #[test]
    fn test_empty_upload_rejected() {
        assert_eq!(check_receipt(0, "image/png"), Err(UploadError::Empty));
    }
}
