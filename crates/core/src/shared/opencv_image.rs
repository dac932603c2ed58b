//! Packed 8-bit buffers to and from OpenCV `Mat`s, plus the two image
//! operations the detectors need to match OpenCV's own preprocessing.
use opencv::core::{Mat, Scalar, Size, StsBadArg, CV_8UC1, CV_8UC3};
use opencv::imgproc;
use opencv::prelude::*;

/// Copies a packed row-major buffer into a freshly allocated `Mat`.
pub fn packed_to_mat(data: &[u8], width: u32, height: u32, channels: u32) -> opencv::Result<Mat> {
    let typ = match channels {
        1 => CV_8UC1,
        3 => CV_8UC3,
        n => {
            return Err(opencv::Error::new(
                StsBadArg,
                format!("unsupported channel count {n}"),
            ))
        }
    };
    let mut mat =
        Mat::new_rows_cols_with_default(height as i32, width as i32, typ, Scalar::all(0.0))?;
    mat.data_bytes_mut()?.copy_from_slice(data);
    Ok(mat)
}

/// Bilinear (`INTER_LINEAR`) resize to `width × height`, packed bytes out.
pub fn resize_linear(src: &Mat, width: u32, height: u32) -> opencv::Result<Vec<u8>> {
    let mut dst = Mat::default();
    imgproc::resize(
        src,
        &mut dst,
        Size::new(width as i32, height as i32),
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )?;
    Ok(dst.data_bytes()?.to_vec())
}

/// BT.601 luma in OpenCV's fixed-point arithmetic.
pub fn rgb_to_gray(src: &Mat) -> opencv::Result<Vec<u8>> {
    let mut dst = Mat::default();
    imgproc::cvt_color_def(src, &mut dst, imgproc::COLOR_RGB2GRAY)?;
    Ok(dst.data_bytes()?.to_vec())
}
