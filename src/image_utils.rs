use image::{GrayImage, Luma, Rgb};
use imageproc::contrast::otsu_level;
use imageproc::filter::gaussian_blur_f32;
use logging_timer::time;

pub const WHITE: Luma<u8> = Luma([u8::MAX]);
pub const BLACK: Luma<u8> = Luma([u8::MIN]);

pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const DARK_BLUE: Rgb<u8> = Rgb([0, 0, 128]);
pub const DARK_GREEN: Rgb<u8> = Rgb([0, 127, 0]);
pub const WHITE_RGB: Rgb<u8> = Rgb([255, 255, 255]);

/// Sigma of the smoothing pass applied before thresholding. Scanned sheets
/// carry speckle noise that otherwise shows up as spurious small contours.
pub const NOISE_BLUR_SIGMA: f32 = 1.1;

/// Binarizes a grayscale sheet image so that ink is white and paper is black.
///
/// The threshold is chosen per image with Otsu's method rather than a fixed
/// constant, since photographed sheets vary widely in exposure.
#[time]
pub fn binarize_sheet_image(img: &GrayImage) -> GrayImage {
    let blurred = gaussian_blur_f32(img, NOISE_BLUR_SIGMA);
    let level = otsu_level(&blurred);
    threshold_inverted(&blurred, level)
}

/// Maps pixels at or below `level` to white and all others to black.
pub fn threshold_inverted(img: &GrayImage, level: u8) -> GrayImage {
    let mut out = GrayImage::new(img.width(), img.height());
    for (x, y, pixel) in img.enumerate_pixels() {
        out.put_pixel(x, y, if pixel.0[0] <= level { WHITE } else { BLACK });
    }
    out
}

/// Determines the number of pixels in an image that match the given luma.
pub fn count_pixels(img: &GrayImage, luma: &Luma<u8>) -> u32 {
    img.pixels().filter(|p| *p == luma).count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_inverted_maps_dark_to_white() {
        let mut img = GrayImage::new(2, 2);
        img.put_pixel(0, 0, Luma([0]));
        img.put_pixel(1, 0, Luma([100]));
        img.put_pixel(0, 1, Luma([101]));
        img.put_pixel(1, 1, Luma([255]));

        let out = threshold_inverted(&img, 100);
        assert_eq!(*out.get_pixel(0, 0), WHITE);
        assert_eq!(*out.get_pixel(1, 0), WHITE);
        assert_eq!(*out.get_pixel(0, 1), BLACK);
        assert_eq!(*out.get_pixel(1, 1), BLACK);
    }

    #[test]
    fn binarize_marks_ink_as_foreground() {
        // Left half ink, right half paper; sample away from the blurred seam.
        let img = GrayImage::from_fn(40, 40, |x, _| if x < 20 { Luma([0]) } else { Luma([255]) });
        let mask = binarize_sheet_image(&img);
        assert_eq!(*mask.get_pixel(5, 20), WHITE);
        assert_eq!(*mask.get_pixel(35, 20), BLACK);
    }

    #[test]
    fn count_pixels_counts_exact_matches() {
        let mut img = GrayImage::new(3, 1);
        img.put_pixel(0, 0, Luma([255]));
        img.put_pixel(1, 0, Luma([254]));
        img.put_pixel(2, 0, Luma([255]));
        assert_eq!(count_pixels(&img, &WHITE), 2);
    }
}
