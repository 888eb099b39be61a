use image::imageops::{self, FilterType};
use image::RgbaImage;
use rgb::{FromSlice, RGBA8};

/// 宽度不变，高度缩放到 `height`，高度为 0 时按 1 处理
pub fn resize_height(image: &RgbaImage, height: u32) -> RgbaImage {
    imageops::resize(image, image.width(), height.max(1), FilterType::CatmullRom)
}

/// 绕中心逆时针旋转 `degrees` 度。
///
/// 画布扩大到能完整容纳旋转后的图像，露出的角落用 `fill` 填充，采样为双线性插值。
pub fn rotate(image: &RgbaImage, degrees: f64, fill: RGBA8) -> RgbaImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let (sin, cos) = degrees.to_radians().sin_cos();
    let (w, h) = (width as f64, height as f64);
    let out_width = fit(w * cos.abs() + h * sin.abs());
    let out_height = fit(w * sin.abs() + h * cos.abs());

    let source = FromSlice::as_rgba(&image.as_raw()[..]);
    let (cx, cy) = (w / 2.0, h / 2.0);
    let (ox, oy) = (out_width as f64 / 2.0, out_height as f64 / 2.0);

    let mut rotated = RgbaImage::new(out_width, out_height);
    let target = FromSlice::as_rgba_mut(&mut *rotated);
    for (index, pixel) in target.iter_mut().enumerate() {
        let x = index % out_width as usize;
        let y = index / out_width as usize;
        let dx = x as f64 + 0.5 - ox;
        let dy = y as f64 + 0.5 - oy;
        // 反向映射回原图的像素坐标
        let sx = dx * cos - dy * sin + cx - 0.5;
        let sy = dx * sin + dy * cos + cy - 0.5;
        *pixel = sample(source, width, height, sx, sy).unwrap_or(fill);
    }
    rotated
}

fn fit(extent: f64) -> u32 {
    (extent - 1e-9).ceil().max(1.0) as u32
}

fn sample(source: &[RGBA8], width: u32, height: u32, sx: f64, sy: f64) -> Option<RGBA8> {
    let (w, h) = (width as f64, height as f64);
    if sx < -0.5 || sy < -0.5 || sx > w - 0.5 || sy > h - 0.5 {
        return None;
    }

    let sx = sx.clamp(0.0, w - 1.0);
    let sy = sy.clamp(0.0, h - 1.0);
    let (x0, y0) = (sx.floor() as usize, sy.floor() as usize);
    let x1 = (x0 + 1).min(width as usize - 1);
    let y1 = (y0 + 1).min(height as usize - 1);
    let (fx, fy) = (sx - x0 as f64, sy - y0 as f64);

    let at = |x: usize, y: usize| source[y * width as usize + x];
    let (p00, p10, p01, p11) = (at(x0, y0), at(x1, y0), at(x0, y1), at(x1, y1));
    let mix = |a: u8, b: u8, c: u8, d: u8| {
        let top = a as f64 * (1.0 - fx) + b as f64 * fx;
        let bottom = c as f64 * (1.0 - fx) + d as f64 * fx;
        (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8
    };

    Some(RGBA8::new(
        mix(p00.r, p10.r, p01.r, p11.r),
        mix(p00.g, p10.g, p01.g, p11.g),
        mix(p00.b, p10.b, p01.b, p11.b),
        mix(p00.a, p10.a, p01.a, p11.a),
    ))
}
