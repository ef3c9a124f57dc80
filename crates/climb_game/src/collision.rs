//! Collision map: a read-only classifier over the level raster.
//!
//! Terrain is authored as a single tall RGBA image. Colour *is* the gameplay
//! data: near-black opaque pixels are solid, two reserved exact colours are
//! boost pads, everything else is air. The image is classified once at load
//! into a compact per-pixel surface array, so the tick loop never touches RGBA.
//!
//! World Y grows upward while image rows grow downward, so world row `y`
//! lives at image row `height - y - 1`. Anything outside the raster is air:
//! never solid, never special. Map edges therefore rely on the controller's
//! position clamp, not on collision.
//!
//! Box queries scan every integer pixel in
//! `[floor(x), ceil(x + w)) x [floor(y), ceil(y + h))`. A 16x16 tile summary
//! lets the scan skip tiles that hold no relevant pixel; results are identical
//! to the exhaustive scan.

use image::RgbaImage;
use std::path::Path;

pub const TILE_SIZE: u32 = 16;

const TILE_SOLID: u8 = 0b01;
const TILE_SPECIAL: u8 = 0b10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Surface {
    #[default]
    Empty,
    Solid,
    BoostA,
    BoostB,
}

/// The two boost pad tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boost {
    /// Pure blue `(0, 0, 255)`.
    A,
    /// Pure green `(0, 255, 0)`.
    B,
}

impl Surface {
    pub fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        if r < 10 && g < 10 && b < 10 && a > 0 {
            Surface::Solid
        } else if (r, g, b) == (0, 0, 255) {
            Surface::BoostA
        } else if (r, g, b) == (0, 255, 0) {
            Surface::BoostB
        } else {
            Surface::Empty
        }
    }

    pub fn is_solid(self) -> bool {
        self == Surface::Solid
    }

    pub fn boost(self) -> Option<Boost> {
        match self {
            Surface::BoostA => Some(Boost::A),
            Surface::BoostB => Some(Boost::B),
            _ => None,
        }
    }
}

/// Half-open pixel range of a box after intersecting with the map.
#[derive(Debug, Clone, Copy)]
struct PixelSpan {
    x0: u32,
    x1: u32,
    y0: u32,
    y1: u32,
}

#[derive(Debug, Clone)]
pub struct CollisionMap {
    width: u32,
    height: u32,
    // Indexed by world coordinates: `y * width + x`, row 0 at the bottom.
    surfaces: Vec<Surface>,
    tiles_w: u32,
    tiles_h: u32,
    tile_flags: Vec<u8>,
}

impl CollisionMap {
    /// Build a map from a per-pixel classifier in world coordinates
    /// (`y = 0` is the bottom row).
    pub fn from_fn(width: u32, height: u32, mut classify: impl FnMut(u32, u32) -> Surface) -> Self {
        let mut surfaces = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                surfaces.push(classify(x, y));
            }
        }
        Self::from_surfaces(width, height, surfaces)
    }

    /// Classify a raw RGBA8 buffer laid out top row first, as image files are.
    pub fn from_rgba(width: u32, height: u32, pixels: &[u8]) -> Result<Self, String> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(format!(
                "Collision map validation failed: expected {expected} bytes for {width}x{height}, got {}",
                pixels.len()
            ));
        }
        Ok(Self::from_fn(width, height, |x, y| {
            let row = (height - y - 1) as usize;
            let offset = (row * width as usize + x as usize) * 4;
            Surface::from_rgba(
                pixels[offset],
                pixels[offset + 1],
                pixels[offset + 2],
                pixels[offset + 3],
            )
        }))
    }

    pub fn from_image(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::from_fn(width, height, |x, y| {
            let [r, g, b, a] = image.get_pixel(x, height - y - 1).0;
            Surface::from_rgba(r, g, b, a)
        })
    }

    fn from_surfaces(width: u32, height: u32, surfaces: Vec<Surface>) -> Self {
        let tiles_w = width.div_ceil(TILE_SIZE);
        let tiles_h = height.div_ceil(TILE_SIZE);
        let mut tile_flags = vec![0u8; tiles_w as usize * tiles_h as usize];
        for y in 0..height {
            for x in 0..width {
                let flag = match surfaces[(y * width + x) as usize] {
                    Surface::Empty => 0,
                    Surface::Solid => TILE_SOLID,
                    Surface::BoostA | Surface::BoostB => TILE_SPECIAL,
                };
                let tile = (y / TILE_SIZE) * tiles_w + x / TILE_SIZE;
                tile_flags[tile as usize] |= flag;
            }
        }
        Self {
            width,
            height,
            surfaces,
            tiles_w,
            tiles_h,
            tile_flags,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_count(&self) -> usize {
        (self.tiles_w * self.tiles_h) as usize
    }

    /// Surface of a single integer pixel; out of bounds is `Empty`.
    pub fn surface_at(&self, x: i64, y: i64) -> Surface {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return Surface::Empty;
        }
        self.surfaces[(y as usize) * self.width as usize + x as usize]
    }

    /// Surface under a world-space point.
    pub fn classify(&self, x: f32, y: f32) -> Surface {
        self.surface_at(x.floor() as i64, y.floor() as i64)
    }

    pub fn is_solid(&self, x: f32, y: f32) -> bool {
        self.classify(x, y).is_solid()
    }

    /// True if any pixel touched by the box `(x, y, w, h)` is solid.
    pub fn any_solid_in_box(&self, x: f32, y: f32, w: f32, h: f32) -> bool {
        let Some(span) = self.span(x, y, w, h) else {
            return false;
        };
        for ty in span.y0 / TILE_SIZE..=(span.y1 - 1) / TILE_SIZE {
            for tx in span.x0 / TILE_SIZE..=(span.x1 - 1) / TILE_SIZE {
                if self.tile_flags[(ty * self.tiles_w + tx) as usize] & TILE_SOLID == 0 {
                    continue;
                }
                let px0 = span.x0.max(tx * TILE_SIZE);
                let px1 = span.x1.min((tx + 1) * TILE_SIZE);
                let py0 = span.y0.max(ty * TILE_SIZE);
                let py1 = span.y1.min((ty + 1) * TILE_SIZE);
                for py in py0..py1 {
                    let row = (py * self.width) as usize;
                    if self.surfaces[row + px0 as usize..row + px1 as usize]
                        .iter()
                        .any(|s| s.is_solid())
                    {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// First boost pad touched by the box, scanning columns left to right and
    /// each column bottom to top.
    pub fn special_in_box(&self, x: f32, y: f32, w: f32, h: f32) -> Option<Boost> {
        let span = self.span(x, y, w, h)?;
        if !self.span_has_tile_flag(span, TILE_SPECIAL) {
            return None;
        }
        // Column-major order decides which tier wins when a box touches both.
        for px in span.x0..span.x1 {
            for py in span.y0..span.y1 {
                if let Some(boost) = self.surfaces[(py * self.width + px) as usize].boost() {
                    return Some(boost);
                }
            }
        }
        None
    }

    fn span_has_tile_flag(&self, span: PixelSpan, flag: u8) -> bool {
        (span.y0 / TILE_SIZE..=(span.y1 - 1) / TILE_SIZE).any(|ty| {
            (span.x0 / TILE_SIZE..=(span.x1 - 1) / TILE_SIZE)
                .any(|tx| self.tile_flags[(ty * self.tiles_w + tx) as usize] & flag != 0)
        })
    }

    fn span(&self, x: f32, y: f32, w: f32, h: f32) -> Option<PixelSpan> {
        let x0 = (x.floor() as i64).max(0);
        let x1 = ((x + w).ceil() as i64).min(self.width as i64);
        let y0 = (y.floor() as i64).max(0);
        let y1 = ((y + h).ceil() as i64).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some(PixelSpan {
            x0: x0 as u32,
            x1: x1 as u32,
            y0: y0 as u32,
            y1: y1 as u32,
        })
    }
}

pub fn load_collision_map_from_path(path: &Path) -> Result<CollisionMap, String> {
    let image = image::open(path)
        .map_err(|e| format!("Failed to read map image {}: {e}", path.display()))?
        .to_rgba8();
    validate_map_image(&image)
        .map_err(|e| format!("Map {} rejected: {e}", path.display()))?;
    let map = CollisionMap::from_image(&image);
    log::info!(
        "Collision map loaded: {} ({}x{}, {} tiles)",
        path.display(),
        map.width(),
        map.height(),
        map.tile_count()
    );
    Ok(map)
}

fn validate_map_image(image: &RgbaImage) -> Result<(), String> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err("Collision map validation failed: image is empty".to_string());
    }
    Ok(())
}
