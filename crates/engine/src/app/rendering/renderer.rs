use std::collections::HashSet;
use std::sync::Arc;

use image::RgbaImage;
use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use crate::content::ImageStore;
use crate::world::{DrawCommand, DrawList, ImageId, ImageRef, Rect, Vec2};

/// Presents draw lists through a fixed-size pixel buffer scaled to the window.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    buffer_width: u32,
    buffer_height: u32,
    warned_missing_images: HashSet<ImageId>,
}

impl Renderer {
    pub fn new(window: Arc<Window>, buffer_width: u32, buffer_height: u32) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(
            Arc::clone(&window),
            buffer_width,
            buffer_height,
            size.width,
            size.height,
        )?;
        Ok(Self {
            window,
            pixels,
            buffer_width,
            buffer_height,
            warned_missing_images: HashSet::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(
            Arc::clone(&self.window),
            self.buffer_width,
            self.buffer_height,
            width,
            height,
        )?;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        buffer_width: u32,
        buffer_height: u32,
        surface_width: u32,
        surface_height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(surface_width.max(1), surface_height.max(1), window);
        Pixels::new(buffer_width.max(1), buffer_height.max(1), surface)
    }

    pub fn render(&mut self, draw_list: &DrawList, images: &ImageStore) -> Result<(), Error> {
        let mut canvas = Canvas {
            frame: self.pixels.frame_mut(),
            width: self.buffer_width,
            height: self.buffer_height,
        };
        paint_draw_list(
            &mut canvas,
            draw_list,
            images,
            &mut self.warned_missing_images,
        );
        self.pixels.render()
    }
}

/// An RGBA8 frame buffer, row-major.
struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

fn paint_draw_list(
    canvas: &mut Canvas<'_>,
    draw_list: &DrawList,
    images: &ImageStore,
    warned_missing_images: &mut HashSet<ImageId>,
) {
    let clear_color = draw_list.clear_color();
    for chunk in canvas.frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&clear_color);
    }

    for command in draw_list.commands() {
        match *command {
            DrawCommand::Image { image, top_left } => match images.get(image.id) {
                Some(decoded) => draw_image(canvas, decoded, image, top_left),
                None => warn_missing_image_once(warned_missing_images, image.id),
            },
            DrawCommand::Outline { rect, color } => draw_rect_outline(canvas, rect, color),
        }
    }
}

fn warn_missing_image_once(warned: &mut HashSet<ImageId>, id: ImageId) {
    if !warned.insert(id) {
        return;
    }
    warn!(image_id = id.0, "draw_skipped_unknown_image");
}

fn write_pixel_rgba_clipped(canvas: &mut Canvas<'_>, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x >= canvas.width as i32 || y >= canvas.height as i32 {
        return;
    }
    let offset = (y as usize * canvas.width as usize + x as usize) * 4;
    let Some(pixel) = canvas.frame.get_mut(offset..offset + 4) else {
        return;
    };
    pixel.copy_from_slice(&color);
}

/// Blits at the snapped position, skipping fully transparent texels.
fn draw_image(canvas: &mut Canvas<'_>, decoded: &RgbaImage, image: ImageRef, top_left: Vec2) {
    let (image_width, image_height) = decoded.dimensions();
    if image_width == 0 || image_height == 0 {
        return;
    }
    let left = top_left.x.round() as i32;
    let top = top_left.y.round() as i32;
    let draw_left = left.max(0);
    let draw_top = top.max(0);
    let draw_right = (left + image_width as i32).min(canvas.width as i32);
    let draw_bottom = (top + image_height as i32).min(canvas.height as i32);
    if draw_left >= draw_right || draw_top >= draw_bottom {
        return;
    }

    for out_y in draw_top..draw_bottom {
        let src_y = (out_y - top) as u32;
        for out_x in draw_left..draw_right {
            let dx = (out_x - left) as u32;
            let src_x = if image.flip_x {
                image_width - 1 - dx
            } else {
                dx
            };
            let texel = decoded.get_pixel(src_x, src_y).0;
            if texel[3] == 0 {
                continue;
            }
            write_pixel_rgba_clipped(canvas, out_x, out_y, texel);
        }
    }
}

fn draw_rect_outline(canvas: &mut Canvas<'_>, rect: Rect, color: [u8; 4]) {
    let left = rect.left().round() as i32;
    let top = rect.top().round() as i32;
    let right = rect.right().round() as i32 - 1;
    let bottom = rect.bottom().round() as i32 - 1;
    if right < left || bottom < top {
        return;
    }

    for x in left..=right {
        write_pixel_rgba_clipped(canvas, x, top, color);
        write_pixel_rgba_clipped(canvas, x, bottom, color);
    }
    for y in top..=bottom {
        write_pixel_rgba_clipped(canvas, left, y, color);
        write_pixel_rgba_clipped(canvas, right, y, color);
    }
}
