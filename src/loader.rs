use image::codecs::jpeg::JpegEncoder;
use image::error::ImageFormatHint;
use image::{DynamicImage, ImageError, ImageFormat, ImageReader, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

// extensions offered by the open dialog's image filter
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "png", "jpeg"];
pub const JPEG_QUALITY: u8 = 95;

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|x| x.eq_ignore_ascii_case(e)))
}

/// Decodes the file, trusting its content over its extension.
pub fn open(path: &Path) -> Result<DynamicImage, image::ImageError> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    log::debug!("decoded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img)
}

/// Save dialogs may hand back a bare name; those get written as JPEG.
pub fn output_path(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension("jpg")
    }
}

pub fn encode(image: &RgbImage, format: ImageFormat) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Cursor::new(Vec::new());
    match format {
        ImageFormat::Jpeg => {
            JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY).encode_image(image)?
        }
        other => image.write_to(&mut buf, other)?,
    }
    Ok(buf.into_inner())
}

/// Writes `image` as JPEG or PNG, picked by the path's extension. Any other
/// extension is refused even when `image` could encode it.
pub fn save(image: &RgbImage, path: &Path) -> Result<(), ImageError> {
    if !is_supported(path) {
        let ext = path.extension().map(PathBuf::from).unwrap_or_default();
        return Err(ImageError::Unsupported(ImageFormatHint::PathExtension(ext).into()));
    }
    let format = ImageFormat::from_path(path)?;
    let bytes = encode(image, format)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_is_case_insensitive() {
        assert!(is_supported(Path::new("a/b/para.JPG")));
        assert!(is_supported(Path::new("para.jpeg")));
        assert!(is_supported(Path::new("para.png")));
        assert!(!is_supported(Path::new("para.bmp")));
        assert!(!is_supported(Path::new("para")));
    }

    #[test]
    fn open_guesses_format_from_content() {
        let dir = tempfile::tempdir().unwrap();
        // png bytes behind a .jpg name
        let path = dir.path().join("mislabeled.jpg");
        let img = RgbImage::from_pixel(7, 3, image::Rgb([10, 20, 30]));
        img.save_with_format(&path, ImageFormat::Png).unwrap();

        let decoded = open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (7, 3));
    }

    #[test]
    fn open_missing_file_fails() {
        assert!(open(Path::new("/definitely/not/here.png")).is_err());
    }

    #[test]
    fn bare_names_default_to_jpeg() {
        assert_eq!(output_path(Path::new("/tmp/sonuc")), PathBuf::from("/tmp/sonuc.jpg"));
        assert_eq!(output_path(Path::new("/tmp/sonuc.png")), PathBuf::from("/tmp/sonuc.png"));
    }

    #[test]
    fn png_save_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let img = RgbImage::from_fn(5, 4, |x, y| image::Rgb([x as u8 * 40, y as u8 * 60, 7]));
        save(&img, &path).unwrap();
        assert_eq!(open(&path).unwrap().to_rgb8(), img);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let img = RgbImage::new(2, 2);
        assert!(save(&img, &dir.path().join("out.xyz")).is_err());
    }

    #[test]
    fn encodable_but_unoffered_formats_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let img = RgbImage::new(2, 2);
        for name in ["out.bmp", "out.tif", "out.gif", "out.webp"] {
            let path = dir.path().join(name);
            let err = save(&img, &path).unwrap_err();
            assert!(matches!(err, ImageError::Unsupported(_)), "{name}: {err}");
            assert!(!path.exists(), "{name} was written");
        }
    }

    #[test]
    fn jpeg_extension_variants_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let img = RgbImage::new(2, 2);
        for name in ["out.jpeg", "out.JPG"] {
            save(&img, &dir.path().join(name)).unwrap();
        }
    }
}
