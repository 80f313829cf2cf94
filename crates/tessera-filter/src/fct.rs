//! Fast cosine transform
//!
//! Orthonormal DCT-II (forward) and DCT-III (inverse) of power-of-two
//! length, computed with Lee's recursive decomposition in `O(n log n)`.
//!
//! ```text
//! X[k] = s(k) * sum x[n] cos(pi / N * (n + 1/2) * k)
//! s(0) = sqrt(1/N), s(k) = sqrt(2/N) for k > 0
//! ```

use std::f64::consts::PI;

use crate::{FilterError, FilterResult};

/// Cosine transform of a fixed power-of-two length
#[derive(Debug, Clone, Copy)]
pub struct Fct {
    len: usize,
    dc_scale: f64,
    ac_scale: f64,
}

impl Fct {
    /// Create a transform of length `len`
    ///
    /// # Errors
    ///
    /// Returns an error unless `len` is a power of two.
    pub fn new(len: usize) -> FilterResult<Self> {
        if !len.is_power_of_two() {
            return Err(FilterError::InvalidParameters(format!(
                "transform length must be a power of two, got {}",
                len
            )));
        }
        let n = len as f64;
        Ok(Self {
            len,
            dc_scale: (1.0 / n).sqrt(),
            ac_scale: (2.0 / n).sqrt(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Smallest power of two not below `n` (1 for 0)
    pub fn next_power_of_two(n: usize) -> usize {
        n.max(1).next_power_of_two()
    }

    /// Forward transform in place
    pub fn forward(&self, data: &mut [f64]) -> FilterResult<()> {
        self.forward_with(data, &mut vec![0.0; self.len])
    }

    /// Inverse transform in place
    pub fn inverse(&self, data: &mut [f64]) -> FilterResult<()> {
        self.inverse_with(data, &mut vec![0.0; self.len])
    }

    /// Forward transform in place using caller-provided scratch of the same length
    pub fn forward_with(&self, data: &mut [f64], scratch: &mut [f64]) -> FilterResult<()> {
        self.check(data, scratch)?;
        forward_rec(data, scratch);
        data[0] *= self.dc_scale;
        data[1..].iter_mut().for_each(|v| *v *= self.ac_scale);
        Ok(())
    }

    /// Inverse transform in place using caller-provided scratch of the same length
    pub fn inverse_with(&self, data: &mut [f64], scratch: &mut [f64]) -> FilterResult<()> {
        self.check(data, scratch)?;
        data[0] *= self.dc_scale;
        data[1..].iter_mut().for_each(|v| *v *= self.ac_scale);
        inverse_rec(data, scratch);
        Ok(())
    }

    fn check(&self, data: &[f64], scratch: &[f64]) -> FilterResult<()> {
        if data.len() != self.len || scratch.len() != self.len {
            return Err(FilterError::InvalidParameters(format!(
                "transform of length {} applied to {} samples with {} scratch",
                self.len,
                data.len(),
                scratch.len()
            )));
        }
        Ok(())
    }
}

#[inline]
fn twiddle(i: usize, n: usize) -> f64 {
    ((i as f64 + 0.5) * PI / n as f64).cos() * 2.0
}

/// Unscaled DCT-II; `temp` is scratch of the same length
fn forward_rec(v: &mut [f64], temp: &mut [f64]) {
    let n = v.len();
    if n == 1 {
        return;
    }
    let half = n / 2;
    for i in 0..half {
        let (x, y) = (v[i], v[n - 1 - i]);
        temp[i] = x + y;
        temp[i + half] = (x - y) / twiddle(i, n);
    }
    {
        let (t_lo, t_hi) = temp.split_at_mut(half);
        let (v_lo, v_hi) = v.split_at_mut(half);
        forward_rec(t_lo, v_lo);
        forward_rec(t_hi, v_hi);
    }
    for i in 0..half - 1 {
        v[2 * i] = temp[i];
        v[2 * i + 1] = temp[i + half] + temp[i + half + 1];
    }
    v[n - 2] = temp[half - 1];
    v[n - 1] = temp[n - 1];
}

/// Unscaled DCT-III with unit weight on the DC term
fn inverse_rec(v: &mut [f64], temp: &mut [f64]) {
    let n = v.len();
    if n == 1 {
        return;
    }
    let half = n / 2;
    temp[0] = v[0];
    temp[half] = v[1];
    for i in 1..half {
        temp[i] = v[2 * i];
        temp[i + half] = v[2 * i - 1] + v[2 * i + 1];
    }
    {
        let (t_lo, t_hi) = temp.split_at_mut(half);
        let (v_lo, v_hi) = v.split_at_mut(half);
        inverse_rec(t_lo, v_lo);
        inverse_rec(t_hi, v_hi);
    }
    for i in 0..half {
        let x = temp[i];
        let y = temp[i + half] / twiddle(i, n);
        v[i] = x + y;
        v[n - 1 - i] = x - y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(x: &[f64]) -> Vec<f64> {
        let n = x.len() as f64;
        (0..x.len())
            .map(|k| {
                let s = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
                s * x
                    .iter()
                    .enumerate()
                    .map(|(i, v)| v * (PI / n * (i as f64 + 0.5) * k as f64).cos())
                    .sum::<f64>()
            })
            .collect()
    }

    #[test]
    fn test_matches_direct_sum() {
        for len in [1, 2, 4, 8, 32] {
            let x: Vec<f64> = (0..len).map(|i| ((i * 7 + 3) % 11) as f64 - 4.0).collect();
            let mut fast = x.clone();
            Fct::new(len).unwrap().forward(&mut fast).unwrap();
            for (a, b) in fast.iter().zip(naive(&x)) {
                assert!((a - b).abs() < 1e-9, "len {}: {} vs {}", len, a, b);
            }
        }
    }

    #[test]
    fn test_round_trip_and_energy() {
        let fct = Fct::new(16).unwrap();
        let x: Vec<f64> = (0..16).map(|i| (i as f64 * 0.7).sin() * 50.0).collect();
        let mut y = x.clone();
        fct.forward(&mut y).unwrap();
        let ex: f64 = x.iter().map(|v| v * v).sum();
        let ey: f64 = y.iter().map(|v| v * v).sum();
        assert!((ex - ey).abs() < 1e-6 * ex);
        fct.inverse(&mut y).unwrap();
        for (a, b) in x.iter().zip(&y) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_rejects_bad_lengths() {
        assert!(Fct::new(12).is_err());
        assert!(Fct::new(0).is_err());
        assert!(Fct::new(8).unwrap().forward(&mut [0.0; 4]).is_err());
        assert!(Fct::new(8).unwrap().forward_with(&mut [0.0; 8], &mut [0.0; 4]).is_err());
        assert_eq!(Fct::next_power_of_two(0), 1);
        assert_eq!(Fct::next_power_of_two(5), 8);
        assert_eq!(Fct::next_power_of_two(8), 8);
    }
}
