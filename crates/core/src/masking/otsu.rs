//! Global threshold maximising between-class variance of an 8-bit histogram.

use crate::shared::mask::{MASK_OFF, MASK_ON};

/// Threshold `t` splitting `gray` into `<= t` and `> t` with the largest
/// between-class variance. Uniform inputs yield 0.
pub fn otsu_threshold(gray: &[u8]) -> u8 {
    if gray.is_empty() {
        return 0;
    }

    let mut histogram = [0u64; 256];
    for &v in gray {
        histogram[v as usize] += 1;
    }

    let scale = 1.0 / gray.len() as f64;
    let mu: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum::<f64>()
        * scale;

    let eps = f32::EPSILON as f64;
    let (mut q1, mut mu1) = (0.0f64, 0.0f64);
    let (mut max_sigma, mut max_val) = (0.0f64, 0u8);

    for (i, &count) in histogram.iter().enumerate() {
        let p_i = count as f64 * scale;
        mu1 *= q1;
        q1 += p_i;
        let q2 = 1.0 - q1;

        if q1.min(q2) < eps || q1.max(q2) > 1.0 - eps {
            continue;
        }

        mu1 = (mu1 + i as f64 * p_i) / q1;
        let mu2 = (mu - q1 * mu1) / q2;
        let sigma = q1 * q2 * (mu1 - mu2) * (mu1 - mu2);
        if sigma > max_sigma {
            max_sigma = sigma;
            max_val = i as u8;
        }
    }
    max_val
}

/// Binarizes `gray` at its Otsu threshold: above becomes [`MASK_ON`].
pub fn binarize(gray: &[u8]) -> Vec<u8> {
    let t = otsu_threshold(gray);
    gray.iter()
        .map(|&v| if v > t { MASK_ON } else { MASK_OFF })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bimodal_split_lands_between_modes() {
        let mut gray = vec![30u8; 60];
        gray.extend(vec![200u8; 40]);
        let t = otsu_threshold(&gray);
        assert!((30..200).contains(&t), "threshold {t}");
    }

    #[test]
    fn test_two_clusters_with_spread() {
        let mut gray = Vec::new();
        for v in [10u8, 12, 14, 16, 18] {
            gray.extend(vec![v; 10]);
        }
        for v in [180u8, 185, 190] {
            gray.extend(vec![v; 10]);
        }
        let t = otsu_threshold(&gray);
        assert!((18..180).contains(&t), "threshold {t}");
    }

    #[test]
    fn test_uniform_input_threshold_zero() {
        assert_eq!(otsu_threshold(&[77; 50]), 0);
        assert_eq!(otsu_threshold(&[]), 0);
    }

    #[test]
    fn test_binarize_marks_bright_pixels() {
        let gray = [20, 20, 220, 20, 220, 220];
        assert_eq!(binarize(&gray), vec![0, 0, 255, 0, 255, 255]);
    }

    #[test]
    fn test_binarize_uniform_nonzero_is_all_on() {
        assert_eq!(binarize(&[90; 4]), vec![255; 4]);
        assert_eq!(binarize(&[0; 4]), vec![0; 4]);
    }
}
