use crate::{errors::SlimeError, field::FieldView, settings::ColorMode};
use log::debug;
use rayon::prelude::*;
use std::path::Path;

/// Turns a trail field into RGBA8 pixels, one per cell, row-major with the
/// top row of the image being the top (+y) row of the field.
pub struct FieldRenderer {
    // viridis sampled at 256 evenly spaced intensities
    palette: Vec<[u8; 4]>,
    color_mode: ColorMode,
}

impl FieldRenderer {
    pub fn new(color_mode: ColorMode) -> Self {
        let gradient = colorgrad::viridis();
        let palette = (0..=255u8)
            .map(|i| {
                let (r, g, b, _) = gradient.at(i as f64 / 255.0).rgba_u8();
                [r, g, b, 0xff]
            })
            .collect();

        Self {
            palette,
            color_mode,
        }
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn set_color_mode(&mut self, color_mode: ColorMode) {
        self.color_mode = color_mode
    }

    /// `full_value` is the intensity drawn at full brightness, normally the
    /// deposit value.
    pub fn draw(&self, field: &FieldView<'_>, full_value: f32, trail_color: [f32; 3]) -> Vec<u8> {
        let (width, height) = (field.width(), field.height());
        let mut frame_data = vec![0u8; width * height * 4]; // RGBA8
        let scale = if full_value > 0.0 { 1.0 / full_value } else { 0.0 };
        let values = field.values();

        frame_data
            .par_chunks_exact_mut(width * 4)
            .enumerate()
            .for_each(|(image_row, pixel_row)| {
                // field row 0 is the bottom of the image
                let field_row = &values[(height - 1 - image_row) * width..][..width];

                pixel_row
                    .chunks_exact_mut(4)
                    .zip(field_row.iter())
                    .for_each(|(pixel, value)| {
                        // clamp to renderable range
                        let intensity = (value * scale).clamp(0.0, 1.0);
                        pixel.copy_from_slice(&self.shade(intensity, trail_color));
                    });
            });

        frame_data
    }

    fn shade(&self, intensity: f32, trail_color: [f32; 3]) -> [u8; 4] {
        match self.color_mode {
            ColorMode::Grayscale => {
                let v = to_u8(intensity);
                [v, v, v, 0xff]
            }
            ColorMode::Tinted => {
                let [r, g, b] = trail_color;
                [
                    to_u8(r * intensity),
                    to_u8(g * intensity),
                    to_u8(b * intensity),
                    0xff,
                ]
            }
            ColorMode::Gradient => self.palette[to_u8(intensity) as usize],
        }
    }
}

fn to_u8(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Encode an RGBA8 frame as a PNG at `path`.
pub fn save_png(path: &Path, rgba: &[u8], width: u32, height: u32) -> Result<(), SlimeError> {
    image::save_buffer(path, rgba, width, height, image::ColorType::Rgba8)?;
    debug!("saved frame to {}", path.display());
    Ok(())
}
