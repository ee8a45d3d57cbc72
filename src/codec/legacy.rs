//! Decode-only support for the deprecated floating-point matrix cipher.
//!
//! The old scheme keyed a 2x2 matrix from `MD5(password)` and multiplied
//! it with consecutive pairs of UTF-16 code units:
//!
//! ```text
//! d = MD5(password)
//! M = [[d0 + 1, d1 + 1],
//!      [d2 + 1, d3 + 1]]
//! v0m:<y1>,<y2>,<y3>,...   where (y1, y2) = M * (x1, x2)
//! ```
//!
//! An odd-length input was padded with a single 0 code unit. There is no
//! integrity check and no salt. The format offers no real confidentiality
//! and exists only so stored data can be read once and re-encoded in a
//! current format. Nothing in this crate encodes it.

use md5::{Digest, Md5};
use tracing::warn;

use super::format::{FieldInfo, FieldUnit, Format};
use super::into_text;
use crate::errors::{CodecError, Result};
use crate::password::Password;

/// Largest distance from an integer tolerated after inversion.
const ROUNDING_TOLERANCE: f64 = 0.25;

/// Decoder for `v0m:` blobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyMatrixCodec;

impl LegacyMatrixCodec {
    pub fn decode(&self, blob: &str, password: &Password) -> Result<String> {
        let values = parse_values(Format::LegacyMatrix.strip(blob)?)?;
        let inverse = key_matrix(password).inverse()?;

        let mut units = Vec::with_capacity(values.len());
        for pair in values.chunks_exact(2) {
            let (x1, x2) = inverse.apply(pair[0], pair[1]);
            units.push(to_code_unit(x1)?);
            units.push(to_code_unit(x2)?);
        }
        if units.last() == Some(&0) {
            units.pop();
        }

        let text = String::from_utf16(&units).map_err(|_| CodecError::DecryptionFailure)?;
        warn!(
            chars = units.len(),
            "decoded a legacy matrix blob; re-encode it in a current format"
        );
        into_text(text.into_bytes())
    }
}

#[derive(Debug, Clone, Copy)]
struct Matrix2 {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

impl Matrix2 {
    fn apply(&self, x1: f64, x2: f64) -> (f64, f64) {
        (self.a * x1 + self.b * x2, self.c * x1 + self.d * x2)
    }

    fn inverse(&self) -> Result<Matrix2> {
        let det = self.a * self.d - self.b * self.c;
        if det == 0.0 {
            return Err(CodecError::DecryptionFailure);
        }
        Ok(Matrix2 {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
        })
    }
}

fn key_matrix(password: &Password) -> Matrix2 {
    let digest = Md5::digest(password.as_bytes());
    let entry = |i: usize| f64::from(digest[i]) + 1.0;
    Matrix2 {
        a: entry(0),
        b: entry(1),
        c: entry(2),
        d: entry(3),
    }
}

fn parse_values(payload: &str) -> Result<Vec<f64>> {
    let values = payload
        .split(',')
        .map(|raw| {
            raw.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    CodecError::MalformedBlob("legacy payload contains a non-numeric value".into())
                })
        })
        .collect::<Result<Vec<f64>>>()?;

    if values.len() % 2 != 0 {
        return Err(CodecError::MalformedBlob(format!(
            "legacy payload must contain an even number of values, got {}",
            values.len()
        )));
    }
    Ok(values)
}

fn to_code_unit(value: f64) -> Result<u16> {
    let rounded = value.round();
    if (value - rounded).abs() > ROUNDING_TOLERANCE || !(0.0..=f64::from(u16::MAX)).contains(&rounded)
    {
        return Err(CodecError::DecryptionFailure);
    }
    Ok(rounded as u16)
}

/// Describe a legacy payload without a password.
pub(crate) fn inspect(payload: &str) -> Result<Vec<FieldInfo>> {
    let count = payload.split(',').count();
    let valid = parse_values(payload).is_ok();
    Ok(vec![FieldInfo::new("values", count, FieldUnit::Values, valid)])
}
