use ark_bn254::Fr;
use ark_ff::{BigInt, PrimeField};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::CircuitError;

/// Longest passphrase, in bytes, that always stays below the field order.
pub const MAX_PASSPHRASE_BYTES: usize = 31;

const LIMBS: usize = 4;

/// An element of the BN254 scalar field.
///
/// On the wire it is always a decimal string, which is how public signals
/// travel between the prover, the ledger and any external client.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FieldElement(pub Fr);

impl FieldElement {
    pub fn new(value: Fr) -> Self {
        Self(value)
    }

    pub fn inner(&self) -> Fr {
        self.0
    }

    /// Strict decimal parsing. Values at or above the field order are
    /// rejected rather than reduced.
    pub fn from_decimal(input: &str) -> Result<Self, CircuitError> {
        parse_decimal::<Fr>(input)
            .map(Self)
            .ok_or_else(|| CircuitError::MalformedInput(format!("not a field element: {input:?}")))
    }

    /// Parses a secret supplied by a voter.
    ///
    /// Accepted forms, tried in order:
    /// - `0x`-prefixed big-endian hex, as produced by wallet libraries;
    /// - a plain decimal integer;
    /// - a UTF-8 passphrase of at most [`MAX_PASSPHRASE_BYTES`] bytes, read
    ///   as a big-endian integer.
    pub fn from_user_input(input: &str) -> Result<Self, CircuitError> {
        if input.is_empty() {
            return Err(CircuitError::MalformedInput("empty field element".to_string()));
        }

        if let Some(body) = input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
            return Self::from_hex(body);
        }

        if input.bytes().all(|b| b.is_ascii_digit()) {
            return Self::from_decimal(input);
        }

        let bytes = input.as_bytes();
        if bytes.len() > MAX_PASSPHRASE_BYTES {
            return Err(CircuitError::MalformedInput(format!(
                "passphrase longer than {MAX_PASSPHRASE_BYTES} bytes"
            )));
        }
        from_be_bytes::<Fr>(bytes)
            .map(Self)
            .ok_or_else(|| CircuitError::MalformedInput("passphrase out of range".to_string()))
    }

    fn from_hex(body: &str) -> Result<Self, CircuitError> {
        if body.is_empty() {
            return Err(CircuitError::MalformedInput("empty hex string".to_string()));
        }
        let padded = if body.len() % 2 == 1 {
            format!("0{body}")
        } else {
            body.to_string()
        };
        let bytes = hex::decode(padded)
            .map_err(|e| CircuitError::MalformedInput(format!("invalid hex: {e}")))?;
        from_be_bytes::<Fr>(&bytes)
            .map(Self)
            .ok_or_else(|| CircuitError::MalformedInput(format!("0x{body} exceeds the field order")))
    }

    pub fn to_decimal(&self) -> String {
        to_decimal(&self.0)
    }
}

impl From<Fr> for FieldElement {
    fn from(value: Fr) -> Self {
        Self(value)
    }
}

impl From<u64> for FieldElement {
    fn from(value: u64) -> Self {
        Self(Fr::from(value))
    }
}

impl From<FieldElement> for Fr {
    fn from(value: FieldElement) -> Self {
        value.0
    }
}

impl FromStr for FieldElement {
    type Err = CircuitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal(s)
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({})", self.to_decimal())
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_decimal(&s).map_err(de::Error::custom)
    }
}

/// Parses a canonical decimal string into a field element, returning
/// `None` for non-digits, overflow past 256 bits, or values at or above
/// the modulus.
pub fn parse_decimal<F: PrimeField<BigInt = BigInt<LIMBS>>>(input: &str) -> Option<F> {
    if input.is_empty() {
        return None;
    }

    let mut limbs = [0u64; LIMBS];
    for b in input.bytes() {
        if !b.is_ascii_digit() {
            return None;
        }
        let mut carry = (b - b'0') as u128;
        for limb in limbs.iter_mut() {
            let wide = (*limb as u128) * 10 + carry;
            *limb = wide as u64;
            carry = wide >> 64;
        }
        if carry != 0 {
            return None;
        }
    }

    F::from_bigint(BigInt::new(limbs))
}

/// Big-endian bytes to a field element; `None` if the value does not fit.
pub fn from_be_bytes<F: PrimeField<BigInt = BigInt<LIMBS>>>(bytes: &[u8]) -> Option<F> {
    let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    let bytes = &bytes[first_nonzero..];
    if bytes.len() > LIMBS * 8 {
        return None;
    }

    let mut buf = [0u8; LIMBS * 8];
    buf[LIMBS * 8 - bytes.len()..].copy_from_slice(bytes);

    let mut limbs = [0u64; LIMBS];
    for (i, limb) in limbs.iter_mut().enumerate() {
        let end = LIMBS * 8 - i * 8;
        let mut word = [0u8; 8];
        word.copy_from_slice(&buf[end - 8..end]);
        *limb = u64::from_be_bytes(word);
    }

    F::from_bigint(BigInt::new(limbs))
}

pub fn to_decimal<F: PrimeField>(value: &F) -> String {
    value.into_bigint().to_string()
}
