use cosmwasm_std::Uint128;

use crate::error::{Error, Result};

/// Converts an XRPL decimal value string (possibly in scientific notation, as
/// rippled emits it) into the integer representation with `decimals` decimal
/// places. Digits beyond `decimals` are truncated.
pub fn xrpl_value_to_amount(value: &str, decimals: u32) -> Result<Uint128> {
    let value = value.trim();
    if value.starts_with('-') {
        return Err(Error::Codec(format!("negative XRPL value: {value}")));
    }

    let (base, exponent) = match value.split_once(['e', 'E']) {
        Some((base, exp)) => {
            let exponent: i32 = exp
                .parse()
                .map_err(|_| Error::Codec(format!("malformed XRPL value: {value}")))?;
            (base, exponent)
        }
        None => (value, 0),
    };

    let (int_part, frac_part) = match base.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (base, ""),
    };

    let digits = format!("{int_part}{frac_part}");
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::Codec(format!("malformed XRPL value: {value}")));
    }
    let mantissa: u128 = digits
        .parse()
        .map_err(|_| Error::Codec(format!("XRPL value out of range: {value}")))?;
    if mantissa == 0 {
        return Ok(Uint128::zero());
    }

    // Position of the mantissa relative to the target fixed point
    let effective_exponent = exponent - frac_part.len() as i32 + decimals as i32;

    let amount = if effective_exponent >= 0 {
        if effective_exponent > 38 {
            return Err(Error::Codec(format!("XRPL value out of range: {value}")));
        }
        mantissa
            .checked_mul(10u128.pow(effective_exponent as u32))
            .ok_or_else(|| Error::Codec(format!("XRPL value out of range: {value}")))?
    } else {
        let shift = effective_exponent.unsigned_abs();
        if shift > 38 {
            return Ok(Uint128::zero());
        }
        mantissa / 10u128.pow(shift)
    };

    Ok(Uint128::new(amount))
}

/// Formats an integer amount with `decimals` decimal places as the decimal
/// string XRPL expects for issued currency values.
pub fn amount_to_xrpl_value(amount: Uint128, decimals: u32) -> String {
    let factor = 10u128.pow(decimals);
    let integer = amount.u128() / factor;
    let fraction = amount.u128() % factor;

    if fraction == 0 {
        return integer.to_string();
    }

    let fraction = format!("{:0width$}", fraction, width = decimals as usize);
    format!("{}.{}", integer, fraction.trim_end_matches('0'))
}

/// Encodes the Coreum recipient address as MemoData for an XRPL Payment.
pub fn encode_recipient_memo(address: &str) -> String {
    hex::encode_upper(address.as_bytes())
}

/// Decodes the Coreum recipient from a Payment's MemoData. Anything that does
/// not look like a bech32 account address is discarded, which drops the
/// transfer with no balance effect.
pub fn decode_recipient_memo(memo_data: &str) -> Option<String> {
    let bytes = hex::decode(memo_data).ok()?;
    let address = String::from_utf8(bytes).ok()?;

    if address.len() < 8 || address.len() > 90 {
        return None;
    }
    if !address.contains('1') {
        return None;
    }
    if !address
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        return None;
    }

    Some(address)
}
