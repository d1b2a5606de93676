use ndarray::{s, Array2, ArrayView2, Axis};

/// Grey dilation with a `size x size` square element anchored at its
/// centre. Pixels outside the image are ignored, so borders never grow
/// from phantom foreground.
///
/// The square element is separable: a horizontal max pass followed by a
/// vertical one.
pub fn dilate(input: ArrayView2<'_, u8>, size: usize) -> Array2<u8> {
    let radius = size / 2;
    if radius == 0 || input.is_empty() {
        return input.to_owned();
    }
    let horizontal = max_filter(input, Axis(1), radius);
    max_filter(horizontal.view(), Axis(0), radius)
}

fn max_filter(input: ArrayView2<'_, u8>, axis: Axis, radius: usize) -> Array2<u8> {
    let mut out = Array2::<u8>::zeros(input.raw_dim());
    for (src, mut dst) in input.lanes(axis).into_iter().zip(out.lanes_mut(axis)) {
        let len = src.len();
        for i in 0..len {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius + 1).min(len);
            dst[i] = src.slice(s![lo..hi]).iter().copied().max().unwrap_or(0);
        }
    }
    out
}
