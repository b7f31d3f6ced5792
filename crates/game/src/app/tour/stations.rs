use std::fmt::Write as _;

use sha2::{Digest, Sha256};
use thiserror::Error;
use tour_engine::OverlayContent;
use tracing::warn;

use super::session::StationKey;

const SAMPLE_INPUT: &str = "bindings";
const RANDOM_ID_SEED: &str = "bindings-tour-session";
const ADLER_MODULUS: u32 = 65_521;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ComputeError {
    #[error("{what} input must not be empty")]
    EmptyInput { what: &'static str },
}

/// What a station shows under its code sample.
#[derive(Debug, Clone, Copy)]
pub(crate) enum StationOutput {
    Static(&'static str),
    Computed(fn() -> Result<String, ComputeError>),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct StationDef {
    pub(crate) key: StationKey,
    pub(crate) title: &'static str,
    pub(crate) body: &'static str,
    pub(crate) code: &'static str,
    pub(crate) output: StationOutput,
}

pub(crate) fn station_def(key: StationKey) -> StationDef {
    match key {
        StationKey::Sha256 => StationDef {
            key,
            title: "SHA-256",
            body: "Hash a byte string through the native digest routine. The binding hands the bytes over without copying.",
            code: "let digest = native::sha256(b\"bindings\");\nprintln!(\"{}\", hex(&digest));",
            output: StationOutput::Computed(sample_sha256),
        },
        StationKey::HexEncode => StationDef {
            key,
            title: "Hex encode",
            body: "Turn raw bytes into printable hex. Small helpers like this are where per-call overhead shows first.",
            code: "let text = native::hex_encode(b\"bindings\");",
            output: StationOutput::Static("62696e64696e6773"),
        },
        StationKey::RandomId => StationDef {
            key,
            title: "Random id",
            body: "Produce a UUID-shaped identifier. This stand-in derives it from a hash of a fixed seed, so it is stable and not secure.",
            code: "let id = native::random_id();",
            output: StationOutput::Computed(sample_random_id),
        },
        StationKey::Checksum => StationDef {
            key,
            title: "Checksum",
            body: "Compute an Adler-32 checksum. Cheap integrity checks are a common first use of a native library.",
            code: "let sum = native::adler32(b\"bindings\");\nprintln!(\"{sum:#010x}\");",
            output: StationOutput::Computed(sample_checksum),
        },
    }
}

/// Failures become an output line so the stage keeps running.
pub(crate) fn resolve_output(key: StationKey, output: StationOutput) -> String {
    match output {
        StationOutput::Static(text) => text.to_string(),
        StationOutput::Computed(compute) => match compute() {
            Ok(text) => text,
            Err(error) => {
                warn!(station = key.as_str(), error = %error, "station_compute_failed");
                format!("computation failed: {error}")
            }
        },
    }
}

pub(crate) fn station_overlay(key: StationKey) -> OverlayContent {
    let def = station_def(key);
    OverlayContent::new(def.title, def.body)
        .with_code(def.code)
        .with_output(resolve_output(def.key, def.output))
}

pub(crate) fn sha256_hex(input: &[u8]) -> String {
    hex_encode(&Sha256::digest(input))
}

pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// A version-4 shaped id taken from the SHA-256 of `seed`.
pub(crate) fn uuid_from_seed(seed: &str) -> Result<String, ComputeError> {
    if seed.is_empty() {
        return Err(ComputeError::EmptyInput { what: "random id seed" });
    }
    let digest = Sha256::digest(seed.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    let hex = hex_encode(&bytes);
    Ok(format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    ))
}

pub(crate) fn adler32(input: &[u8]) -> u32 {
    let mut a = 1u32;
    let mut b = 0u32;
    for byte in input {
        a = (a + u32::from(*byte)) % ADLER_MODULUS;
        b = (b + a) % ADLER_MODULUS;
    }
    (b << 16) | a
}

fn sample_sha256() -> Result<String, ComputeError> {
    Ok(sha256_hex(SAMPLE_INPUT.as_bytes()))
}

fn sample_random_id() -> Result<String, ComputeError> {
    uuid_from_seed(RANDOM_ID_SEED)
}

fn sample_checksum() -> Result<String, ComputeError> {
    Ok(format!("{:#010x}", adler32(SAMPLE_INPUT.as_bytes())))
}
