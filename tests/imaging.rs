use std::io::Cursor;

use emporium::imaging::{
    ImageError, ImageUpload, MAX_IMAGE_SIZE, NORMALIZED_RESOLUTION, ResolutionError,
    check_resolution, normalize,
};
use image::{DynamicImage, ImageFormat, RgbImage};

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode png");
    bytes
}

fn upload(name: &str, bytes: Vec<u8>) -> ImageUpload {
    ImageUpload {
        file_name: name.to_string(),
        bytes,
    }
}

#[test]
fn resolution_bounds_are_inclusive() {
    assert!(check_resolution(10, 10).is_ok());
    assert!(check_resolution(800, 800).is_ok());
    assert!(matches!(
        check_resolution(9, 400),
        Err(ResolutionError::TooSmall { width: 9, .. })
    ));
    assert!(matches!(
        check_resolution(400, 801),
        Err(ResolutionError::TooLarge { height: 801, .. })
    ));
}

#[test]
fn rejects_image_below_minimum_resolution() {
    let err = normalize(upload("tiny.png", png(5, 5))).unwrap_err();
    assert!(matches!(
        err,
        ImageError::Resolution(ResolutionError::TooSmall { width: 5, height: 5, .. })
    ));
}

#[test]
fn rejects_image_above_maximum_resolution() {
    let err = normalize(upload("wide.png", png(801, 20))).unwrap_err();
    assert!(matches!(
        err,
        ImageError::Resolution(ResolutionError::TooLarge { width: 801, .. })
    ));
}

#[test]
fn rejects_oversized_upload_before_decoding() {
    let err = normalize(upload("huge.png", vec![0; MAX_IMAGE_SIZE + 1])).unwrap_err();
    assert!(matches!(err, ImageError::TooBig { .. }));
}

#[test]
fn rejects_bytes_that_are_not_an_image() {
    let err = normalize(upload("notes.png", b"definitely not an image".to_vec())).unwrap_err();
    assert!(matches!(err, ImageError::Decode(_)));
}

#[test]
fn accepted_image_becomes_square_jpeg() {
    let normalized = normalize(upload("uploads/2024/laptop.png", png(600, 300))).expect("normalize");

    assert_eq!(normalized.file_name, "laptop.png");
    assert_eq!(
        image::guess_format(&normalized.bytes).expect("format"),
        ImageFormat::Jpeg
    );
    let decoded = image::load_from_memory(&normalized.bytes).expect("decode jpeg");
    assert_eq!((decoded.width(), decoded.height()), NORMALIZED_RESOLUTION);
}

#[test]
fn minimum_sized_image_is_upscaled() {
    let normalized = normalize(upload("", png(10, 10))).expect("normalize");
    assert_eq!(normalized.file_name, "image.jpg");
    let decoded = image::load_from_memory(&normalized.bytes).expect("decode jpeg");
    assert_eq!((decoded.width(), decoded.height()), NORMALIZED_RESOLUTION);
}
