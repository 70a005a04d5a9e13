use super::{calibration::Calibration, DecodeSink};
use crate::{
    constants::{
        BASE_FACTOR, DISPLAY_MULTIPLIER, DISPLAY_SCALE, HIGH_LEVEL_COMMON_ADJUSTMENT,
        MAX_SIGNIFICANT_DIGITS, ZERO_ADDRESS, ZERO_WORD,
    },
    error::DecodeError,
    models::ResourceCategory,
};
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use rust_decimal::Decimal;

/// Numeric Decoder - converts on-chain fixed-point balances into display quantities
#[derive(Debug, Clone, Default)]
pub struct NumericDecoder {
    calibration: Calibration,
}

impl NumericDecoder {
    pub fn new(calibration: Calibration) -> Self {
        Self { calibration }
    }

    /// Decode a resource field, applying name-specific multiplier overrides.
    /// Problems are reported to `sink` under `field`.
    pub fn decode_resource(
        &self,
        field: &str,
        resource: &str,
        hex_value: &str,
        category: ResourceCategory,
        level: u32,
        sink: &mut dyn DecodeSink,
    ) -> Decimal {
        self.try_decode_resource(resource, hex_value, category, level)
            .unwrap_or_else(|err| fail_closed(field, &err, sink))
    }

    pub fn try_decode_resource(
        &self,
        resource: &str,
        hex_value: &str,
        category: ResourceCategory,
        level: u32,
    ) -> std::result::Result<Decimal, DecodeError> {
        let profile = self.calibration.profile_for(resource, category);
        scale_hex(hex_value, category, level, profile.multiplier, profile.divisor)
    }

    /// Storehouse capacity: raw integer over the capacity divisor.
    pub fn try_decode_capacity(&self, hex_value: &str) -> std::result::Result<Decimal, DecodeError> {
        match parse_hex_integer(hex_value)? {
            None => Ok(Decimal::ZERO),
            Some(raw) => ratio_to_decimal(&raw, &BigUint::from(self.calibration.capacity_divisor)),
        }
    }
}

fn fail_closed(field: &str, err: &DecodeError, sink: &mut dyn DecodeSink) -> Decimal {
    sink.report(field, err);
    err.fallback_value()
}

/// Parse a possibly `0x`-prefixed hex integer of any width.
///
/// Returns `Ok(None)` for absent input and for the zero sentinels, which must
/// decode to zero without any arithmetic.
pub fn parse_hex_integer(input: &str) -> std::result::Result<Option<BigUint>, DecodeError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed == ZERO_ADDRESS || trimmed.eq_ignore_ascii_case(ZERO_WORD) {
        return Ok(None);
    }

    let digits = strip_hex_prefix(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(DecodeError::MalformedHex {
            input: input.to_string(),
        });
    }

    let value = BigUint::parse_bytes(digits.as_bytes(), 16).ok_or_else(|| DecodeError::MalformedHex {
        input: input.to_string(),
    })?;
    Ok(Some(value))
}

pub fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

fn level_adjustment(category: ResourceCategory, level: u32) -> u64 {
    if level > 1 && category.is_level_compressed() {
        HIGH_LEVEL_COMMON_ADJUSTMENT
    } else {
        1
    }
}

/// `(D × 1e6 × multiplier) / (4e12 × levelAdjustment × divisor)`, all products
/// taken before the single division.
fn scale_hex(
    hex_value: &str,
    category: ResourceCategory,
    level: u32,
    multiplier: u64,
    divisor: u64,
) -> std::result::Result<Decimal, DecodeError> {
    let Some(raw) = parse_hex_integer(hex_value)? else {
        return Ok(Decimal::ZERO);
    };
    if raw.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let numerator = raw * BigUint::from(DISPLAY_MULTIPLIER) * BigUint::from(multiplier);
    let denominator = BigUint::from(BASE_FACTOR)
        * BigUint::from(level_adjustment(category, level))
        * BigUint::from(divisor);
    ratio_to_decimal(&numerator, &denominator)
}

/// Truncating division materialised as a `Decimal`.
///
/// Keeps `DISPLAY_SCALE` fractional digits while the result has room within
/// `MAX_SIGNIFICANT_DIGITS`, and fewer fractional digits beyond that. The
/// scale only depends on the digit count of the integer part, so the mapping
/// stays monotone.
pub fn ratio_to_decimal(
    numerator: &BigUint,
    denominator: &BigUint,
) -> std::result::Result<Decimal, DecodeError> {
    if denominator.is_zero() {
        return Err(DecodeError::InvalidCalibration(
            "zero denominator".to_string(),
        ));
    }

    let whole = numerator / denominator;
    let whole_digits = if whole.is_zero() {
        0
    } else {
        whole.to_str_radix(10).len() as u32
    };
    if whole_digits > MAX_SIGNIFICANT_DIGITS {
        return Err(DecodeError::OutOfRange);
    }

    let scale = DISPLAY_SCALE.min(MAX_SIGNIFICANT_DIGITS - whole_digits);
    let scaled = numerator * BigUint::from(10u32).pow(scale) / denominator;
    let mantissa = scaled.to_i128().ok_or(DecodeError::OutOfRange)?;

    Decimal::try_from_i128_with_scale(mantissa, scale)
        .map(|value| value.normalize())
        .map_err(|_| DecodeError::OutOfRange)
}
