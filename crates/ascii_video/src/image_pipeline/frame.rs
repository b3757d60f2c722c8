use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer, Rgb, RgbImage};

/// Decoded picture with 3-channel pixels stored blue, green, red.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    /// Wraps packed BGR bytes. Returns `None` if the length does not match.
    pub fn from_bgr(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if width as usize * height as usize * 3 != data.len() {
            return None;
        }
        Some(Self { width, height, data })
    }

    pub fn filled(width: u32, height: u32, bgr: [u8; 3]) -> Self {
        let data = bgr.repeat(width as usize * height as usize);
        Self { width, height, data }
    }

    pub fn from_rgb_image(image: &RgbImage) -> Self {
        let mut data = image.as_raw().clone();
        swap_red_blue(&mut data);
        Self { width: image.width(), height: image.height(), data }
    }

    pub fn from_image(image: &DynamicImage) -> Self {
        Self::from_rgb_image(&image.to_rgb8())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_bgr(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// Resamples to exactly `width` x `height`, keeping BGR order.
    pub fn resample(&self, width: u32, height: u32) -> Frame {
        if (width, height) == (self.width, self.height) {
            return self.clone();
        }

        // The buffer type says RGB but resampling never looks at channel meaning.
        let Some(view) = ImageBuffer::<Rgb<u8>, &[u8]>::from_raw(
            self.width,
            self.height,
            self.data.as_slice(),
        ) else {
            return Frame::filled(width, height, [0; 3]);
        };
        let resized = imageops::resize(&view, width, height, FilterType::Triangle);
        Self { width, height, data: resized.into_raw() }
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        let mut data = self.data.clone();
        swap_red_blue(&mut data);
        RgbImage::from_raw(self.width, self.height, data)
            .unwrap_or_else(|| RgbImage::new(self.width, self.height))
    }
}

fn swap_red_blue(data: &mut [u8]) {
    for pixel in data.chunks_exact_mut(3) {
        pixel.swap(0, 2);
    }
}
