//! Convolution kernels
//!
//! A kernel is a `width` x `height` grid of `f32` weights with a key
//! (anchor) element. Kernels built from a horizontal and a vertical vector
//! remember both factors so that convolution can run as two 1-D passes.

use tessera_core::AreaExtent;

use crate::{FilterError, FilterResult};

/// A 2D convolution kernel
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    /// Width of the kernel
    width: u32,
    /// Height of the kernel
    height: u32,
    /// X coordinate of the key element
    key_x: u32,
    /// Y coordinate of the key element
    key_y: u32,
    /// Kernel data (row-major order)
    data: Vec<f32>,
    /// Horizontal and vertical factors, if the kernel is their outer product
    separable: Option<(Vec<f32>, Vec<f32>)>,
}

impl Kernel {
    /// Create a kernel from row-major weights
    ///
    /// # Errors
    ///
    /// Returns an error if the size is zero, the weight count is wrong or
    /// the key element lies outside the kernel.
    pub fn new(width: u32, height: u32, key_x: u32, key_y: u32, data: Vec<f32>) -> FilterResult<Self> {
        check_shape(width, height, key_x, key_y)?;
        if data.len() != (width * height) as usize {
            return Err(FilterError::InvalidKernel(format!(
                "{}x{} kernel needs {} weights, got {}",
                width,
                height,
                width * height,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            key_x,
            key_y,
            data,
            separable: None,
        })
    }

    /// Create a separable kernel from its horizontal and vertical factors
    ///
    /// The 2D weights are the outer product `v[y] * h[x]`.
    pub fn separable(h_data: Vec<f32>, v_data: Vec<f32>, key_x: u32, key_y: u32) -> FilterResult<Self> {
        let width = h_data.len() as u32;
        let height = v_data.len() as u32;
        check_shape(width, height, key_x, key_y)?;
        let data = v_data
            .iter()
            .flat_map(|&v| h_data.iter().map(move |&h| v * h))
            .collect();
        Ok(Self {
            width,
            height,
            key_x,
            key_y,
            data,
            separable: Some((h_data, v_data)),
        })
    }

    /// Create a box (averaging) kernel
    ///
    /// All values are `1/(size*size)`.
    pub fn box_filter(size: u32) -> FilterResult<Self> {
        if size == 0 {
            return Err(FilterError::InvalidKernel("box size must be positive".into()));
        }
        let line = vec![1.0 / size as f32; size as usize];
        Self::separable(line.clone(), line, size / 2, size / 2)
    }

    /// Create a normalized Gaussian kernel of size `2 * half_width + 1`
    pub fn gaussian(half_width: u32, sigma: f32) -> FilterResult<Self> {
        if sigma <= 0.0 || !sigma.is_finite() {
            return Err(FilterError::InvalidParameters(format!(
                "sigma must be positive, got {}",
                sigma
            )));
        }
        let c = half_width as f32;
        let mut line: Vec<f32> = (0..=2 * half_width)
            .map(|i| {
                let d = i as f32 - c;
                (-(d * d) / (2.0 * sigma * sigma)).exp()
            })
            .collect();
        let sum: f32 = line.iter().sum();
        line.iter_mut().for_each(|v| *v /= sum);
        Self::separable(line.clone(), line, half_width, half_width)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn key_x(&self) -> u32 {
        self.key_x
    }

    #[inline]
    pub fn key_y(&self) -> u32 {
        self.key_y
    }

    /// Get the kernel data
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Horizontal and vertical factors of a separable kernel
    pub fn factors(&self) -> Option<(&[f32], &[f32])> {
        self.separable
            .as_ref()
            .map(|(h, v)| (h.as_slice(), v.as_slice()))
    }

    #[inline]
    pub fn is_separable(&self) -> bool {
        self.separable.is_some()
    }

    /// Get a value at (x, y)
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.data[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Get the sum of all kernel values
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// Copy of the kernel scaled so that its values sum to 1
    ///
    /// # Errors
    ///
    /// Returns an error if the weights sum to zero.
    pub fn normalized(&self) -> FilterResult<Self> {
        let sum = self.sum();
        if sum.abs() < f32::EPSILON {
            return Err(FilterError::InvalidKernel(
                "cannot normalize a kernel with zero sum".into(),
            ));
        }
        match &self.separable {
            Some((h, v)) => {
                let hs: f32 = h.iter().sum();
                let vs: f32 = v.iter().sum();
                Self::separable(
                    h.iter().map(|x| x / hs).collect(),
                    v.iter().map(|x| x / vs).collect(),
                    self.key_x,
                    self.key_y,
                )
            }
            None => Self::new(
                self.width,
                self.height,
                self.key_x,
                self.key_y,
                self.data.iter().map(|x| x / sum).collect(),
            ),
        }
    }

    /// Paddings the kernel needs around a destination rectangle
    pub fn extent(&self) -> FilterResult<AreaExtent> {
        Ok(AreaExtent::from_kernel(
            self.width as i32,
            self.height as i32,
            self.key_x as i32,
            self.key_y as i32,
        )?)
    }
}

fn check_shape(width: u32, height: u32, key_x: u32, key_y: u32) -> FilterResult<()> {
    if width == 0 || height == 0 {
        return Err(FilterError::InvalidKernel(format!(
            "kernel dimensions must be positive: {}x{}",
            width, height
        )));
    }
    if key_x >= width || key_y >= height {
        return Err(FilterError::InvalidKernel(format!(
            "key ({}, {}) outside {}x{} kernel",
            key_x, key_y, width, height
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separable_outer_product() {
        let k = Kernel::separable(vec![1.0, 2.0, 3.0], vec![1.0, -1.0], 1, 0).unwrap();
        assert_eq!(k.width(), 3);
        assert_eq!(k.height(), 2);
        assert_eq!(k.get(2, 0), Some(3.0));
        assert_eq!(k.get(1, 1), Some(-2.0));
        assert!(k.is_separable());
        assert_eq!(k.sum(), 0.0);
    }

    #[test]
    fn test_box_and_gaussian_are_normalized() {
        let b = Kernel::box_filter(3).unwrap();
        assert!((b.sum() - 1.0).abs() < 1e-6);
        assert_eq!((b.key_x(), b.key_y()), (1, 1));

        let g = Kernel::gaussian(2, 1.0).unwrap();
        assert_eq!(g.width(), 5);
        assert!((g.sum() - 1.0).abs() < 1e-5);
        // symmetric and peaked at the center
        assert_eq!(g.get(0, 2), g.get(4, 2));
        assert!(g.get(2, 2).unwrap() > g.get(1, 2).unwrap());
        assert!(Kernel::gaussian(2, 0.0).is_err());
    }

    #[test]
    fn test_key_checks() {
        assert!(Kernel::new(2, 2, 2, 0, vec![0.0; 4]).is_err());
        assert!(Kernel::new(2, 2, 0, 0, vec![0.0; 3]).is_err());
        assert!(Kernel::new(0, 2, 0, 0, vec![]).is_err());
    }

    #[test]
    fn test_normalized() {
        let k = Kernel::new(2, 1, 0, 0, vec![1.0, 3.0]).unwrap().normalized().unwrap();
        assert_eq!(k.data(), &[0.25, 0.75]);
        assert!(Kernel::new(2, 1, 0, 0, vec![1.0, -1.0]).unwrap().normalized().is_err());

        let s = Kernel::separable(vec![2.0, 2.0], vec![1.0], 0, 0).unwrap().normalized().unwrap();
        assert!(s.is_separable());
        assert!((s.sum() - 1.0).abs() < 1e-6);
    }
}
