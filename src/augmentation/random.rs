use rand::Rng;

/// `[from, to]` 区间内的均匀随机数
pub fn random<R: Rng>(rng: &mut R, from: f64, to: f64) -> f64 {
    if from >= to {
        return from;
    }
    rng.random_range(from..=to)
}

/// 随机缩放尺寸。
///
/// 在 `[from, to]` 中取一个倍率，一半概率取倒数，返回 `what` 乘倍率后向下取整。
/// 不做下限保护，结果可能为 0。
pub fn random_scale<R: Rng>(rng: &mut R, what: u32, from: f64, to: f64) -> u32 {
    let (ratio, _) = scale_ratio(rng, from, to);
    (what as f64 * ratio).floor() as u32
}

/// 返回最终倍率以及是否取了倒数
fn scale_ratio<R: Rng>(rng: &mut R, from: f64, to: f64) -> (f64, bool) {
    let ratio = random(rng, from, to);
    if rng.random_bool(0.5) {
        (1.0 / ratio, true)
    } else {
        (ratio, false)
    }
}
