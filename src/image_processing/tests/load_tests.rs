use crate::image_processing::{ImageError, ImageLoader};
use image::{ImageBuffer, Rgb};
use tempfile::TempDir;

fn create_test_loader() -> (ImageLoader, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let loader = ImageLoader::new(temp_dir.path().to_path_buf());
    (loader, temp_dir)
}

#[test]
fn test_resolve_joins_onto_static_root() {
    let (loader, temp_dir) = create_test_loader();

    let resolved = loader.resolve("photos/cat.jpg").unwrap();
    assert!(resolved.is_absolute());
    assert_eq!(resolved, temp_dir.path().join("photos/cat.jpg"));
}

#[test]
fn test_resolve_relative_root_becomes_absolute() {
    let loader = ImageLoader::new("static".into());

    let resolved = loader.resolve("photo.jpg").unwrap();
    assert!(resolved.is_absolute());
    assert!(resolved.ends_with("static/photo.jpg"));
}

#[test]
fn test_resolve_strips_leading_slash() {
    let (loader, temp_dir) = create_test_loader();

    let resolved = loader.resolve("/photo.jpg").unwrap();
    assert_eq!(resolved, temp_dir.path().join("photo.jpg"));
}

#[test]
fn test_resolve_rejects_escaping_paths() {
    let (loader, _temp_dir) = create_test_loader();

    for path in ["", "/", "../secret.jpg", "photos/../../secret.jpg", ".."] {
        let err = loader.resolve(path).unwrap_err();
        assert!(
            matches!(err, ImageError::InvalidPath(_)),
            "{:?} should be rejected",
            path
        );
    }
}

#[test]
fn test_load_decodes_by_content_not_extension() {
    let (loader, temp_dir) = create_test_loader();

    let img = ImageBuffer::from_pixel(40, 30, Rgb([10u8, 20, 30]));
    let png_path = temp_dir.path().join("really_a_png.png");
    img.save(&png_path).unwrap();

    // Same bytes under a misleading name
    let disguised = temp_dir.path().join("disguised.jpg");
    std::fs::copy(&png_path, &disguised).unwrap();

    let decoded = loader.load(&disguised).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (40, 30));
}

#[test]
fn test_load_missing_file_is_not_found() {
    let (loader, temp_dir) = create_test_loader();

    let err = loader.load(&temp_dir.path().join("missing.jpg")).unwrap_err();
    assert!(matches!(err, ImageError::NotFound(_)));
}

#[test]
fn test_load_directory_is_not_found() {
    let (loader, temp_dir) = create_test_loader();
    std::fs::create_dir(temp_dir.path().join("albums")).unwrap();

    let err = loader.load(&temp_dir.path().join("albums")).unwrap_err();
    assert!(matches!(err, ImageError::NotFound(_)));
}

#[test]
fn test_load_corrupt_file_is_decode_error() {
    let (loader, temp_dir) = create_test_loader();

    // JPEG signature followed by garbage
    let path = temp_dir.path().join("corrupt.jpg");
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
    data.extend_from_slice(&[0x13; 64]);
    std::fs::write(&path, data).unwrap();

    let err = loader.load(&path).unwrap_err();
    assert!(matches!(err, ImageError::DecodeError(_)));
}

#[test]
fn test_load_unknown_content_is_decode_error() {
    let (loader, temp_dir) = create_test_loader();

    let path = temp_dir.path().join("notes.txt");
    std::fs::write(&path, "not an image").unwrap();

    let err = loader.load(&path).unwrap_err();
    assert!(matches!(err, ImageError::DecodeError(_)));
}
