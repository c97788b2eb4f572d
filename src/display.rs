use egui::{Color32, ColorImage};
use image::DynamicImage;
use image::imageops::FilterType;

/// Largest size with the source's aspect ratio that fits inside `panel`.
/// Scales up as well as down; each side is at least one pixel.
pub fn fit_size(source: [usize; 2], panel: [usize; 2]) -> [usize; 2] {
    let [sw, sh] = source;
    let [pw, ph] = panel;
    if sw == 0 || sh == 0 || pw == 0 || ph == 0 {
        return [0, 0];
    }
    let scale = (pw as f64 / sw as f64).min(ph as f64 / sh as f64);
    let w = ((sw as f64 * scale).round() as usize).clamp(1, pw);
    let h = ((sh as f64 * scale).round() as usize).clamp(1, ph);
    [w, h]
}

/// Smoothly rescale `image` into the panel footprint and hand it over in egui's format.
pub fn render(image: &DynamicImage, panel: [usize; 2]) -> ColorImage {
    let [w, h] = fit_size([image.width() as usize, image.height() as usize], panel);
    if w == 0 || h == 0 {
        return ColorImage::new([0, 0], Color32::TRANSPARENT);
    }
    let scaled = image.resize_exact(w as u32, h as u32, FilterType::Triangle);
    let rgba = scaled.to_rgba8();
    ColorImage::from_rgba_unmultiplied([w, h], rgba.as_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn landscape_is_width_bound() {
        assert_eq!(fit_size([1100, 500], [550, 500]), [550, 250]);
    }

    #[test]
    fn portrait_is_height_bound() {
        assert_eq!(fit_size([1000, 2000], [550, 500]), [250, 500]);
    }

    #[test]
    fn small_images_are_scaled_up() {
        assert_eq!(fit_size([55, 25], [550, 500]), [550, 250]);
    }

    #[test]
    fn degenerate_sizes() {
        assert_eq!(fit_size([0, 10], [550, 500]), [0, 0]);
        // extreme aspect ratios still keep one pixel
        assert_eq!(fit_size([100_000, 1], [550, 500]), [550, 1]);
    }

    #[test]
    fn render_fits_panel_and_keeps_color() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(200, 100, Rgb([200, 40, 10])));
        let out = render(&img, [550, 500]);
        assert_eq!(out.size, [550, 275]);
        assert_eq!(out.pixels[0], Color32::from_rgb(200, 40, 10));
    }
}
