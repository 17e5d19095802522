//! CPU mip chain generation.
//!
//! wgpu has no `generate_mipmap`, so textures flagged `GENERATE_MIPMAPS` get their
//! chain built here with a 2×2 box filter before upload.

/// One level of a mip chain.
#[derive(Debug, Clone, PartialEq)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Number of levels in a full chain down to 1×1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    32 - largest.leading_zeros()
}

/// Levels 1.. of the chain for a tightly packed `base` image (level 0 is not included).
pub fn mip_chain(base: &[u8], width: u32, height: u32, bytes_per_pixel: usize) -> Vec<MipLevel> {
    let levels = mip_level_count(width, height);
    let mut chain: Vec<MipLevel> = Vec::with_capacity(levels.saturating_sub(1) as usize);

    let (mut w, mut h) = (width, height);
    for _ in 1..levels {
        let src = chain.last().map_or(base, |l| l.pixels.as_slice());
        let next = downsample(src, w, h, bytes_per_pixel);
        w = next.width;
        h = next.height;
        chain.push(next);
    }
    chain
}

/// Halves each dimension (never below 1), averaging up to four source texels.
fn downsample(src: &[u8], width: u32, height: u32, bpp: usize) -> MipLevel {
    let nw = (width / 2).max(1);
    let nh = (height / 2).max(1);
    let mut pixels = vec![0u8; nw as usize * nh as usize * bpp];

    let texel = |x: u32, y: u32, c: usize| -> u32 {
        let x = x.min(width - 1) as usize;
        let y = y.min(height - 1) as usize;
        src[(y * width as usize + x) * bpp + c] as u32
    };

    for y in 0..nh {
        for x in 0..nw {
            let (sx, sy) = (x * 2, y * 2);
            for c in 0..bpp {
                let sum = texel(sx, sy, c)
                    + texel(sx + 1, sy, c)
                    + texel(sx, sy + 1, c)
                    + texel(sx + 1, sy + 1, c);
                pixels[(y as usize * nw as usize + x as usize) * bpp + c] = ((sum + 2) / 4) as u8;
            }
        }
    }

    MipLevel { width: nw, height: nh, pixels }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_count_reaches_one_by_one() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 2), 2);
        assert_eq!(mip_level_count(256, 16), 9);
        assert_eq!(mip_level_count(5, 3), 3);
    }

    #[test]
    fn chain_of_non_square_image_ends_at_one_by_one() {
        let base = vec![200u8; 8 * 2];
        let chain = mip_chain(&base, 8, 2, 1);
        let sizes: Vec<(u32, u32)> = chain.iter().map(|l| (l.width, l.height)).collect();
        assert_eq!(sizes, vec![(4, 1), (2, 1), (1, 1)]);
        assert!(chain.iter().all(|l| l.pixels.iter().all(|&p| p == 200)));
    }

    #[test]
    fn box_filter_averages_rgba_channels() {
        #[rustfmt::skip]
        let base = [
            0, 0, 0, 255,     255, 0, 0, 255,
            0, 255, 0, 255,   0, 0, 255, 255,
        ];
        let chain = mip_chain(&base, 2, 2, 4);
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].pixels, vec![64, 64, 64, 255]);
    }

    #[test]
    fn single_texel_has_no_extra_levels() {
        assert!(mip_chain(&[1, 2, 3, 4], 1, 1, 4).is_empty());
    }
}
