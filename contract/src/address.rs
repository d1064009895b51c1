use bs58::Alphabet;
use sha2::{Digest, Sha256};

use crate::error::ContractError;

const ACCOUNT_ID_PAYLOAD_LEN: usize = 25;
const ACCOUNT_ID_VERSION: u8 = 0;

/// Validates an XRPL classic address: ripple base58 alphabet, account id
/// version byte and a double sha256 checksum over the payload.
pub fn validate_xrpl_address(address: &str) -> Result<(), ContractError> {
    let data = bs58::decode(address)
        .with_alphabet(Alphabet::RIPPLE)
        .into_vec()
        .map_err(|_| ContractError::InvalidXRPLAddress {
            address: address.to_owned(),
        })?;

    if data.len() != ACCOUNT_ID_PAYLOAD_LEN || data[0] != ACCOUNT_ID_VERSION {
        return Err(ContractError::InvalidXRPLAddress {
            address: address.to_owned(),
        });
    }

    let expected_checksum = &checksum(&data[..21])[..4];
    let provided_checksum = &data[21..];

    if *expected_checksum != *provided_checksum {
        return Err(ContractError::InvalidXRPLAddress {
            address: address.to_owned(),
        });
    }

    Ok(())
}

pub fn checksum(data: &[u8]) -> Vec<u8> {
    Sha256::digest(Sha256::digest(data)).to_vec()
}
