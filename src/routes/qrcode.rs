// routes/qrcode.rs
// PNG QR codes of otpauth URLs for authenticator enrollment.

use std::io::Cursor;

use anyhow::Context;
use axum::{
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;

use crate::error::AppResult;

pub(crate) fn qr_png(url: &str) -> AppResult<Vec<u8>> {
    let code = QrCode::new(url.as_bytes()).context("failed to build qr")?;
    let img = code.render::<Luma<u8>>().min_dimensions(200, 200).build();

    // image 0.25: write_to requires Write + Seek -> Cursor<Vec<u8>>
    let mut cursor = Cursor::new(Vec::<u8>::new());
    DynamicImage::ImageLuma8(img)
        .write_to(&mut cursor, ImageFormat::Png)
        .context("failed to encode qr png")?;
    Ok(cursor.into_inner())
}

pub(crate) fn png_response(url: &str) -> AppResult<Response> {
    let png = qr_png(url)?;
    Ok(([(CONTENT_TYPE, "image/png")], png).into_response())
}
