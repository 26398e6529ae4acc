//! Random security parameters for an authorization attempt: nonce, state, and the PKCE pair.

// std
use std::ops::RangeInclusive;
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, error::ConfigError, store::AttemptVault};

/// Verifier length used when callers do not pick one.
pub const DEFAULT_VERIFIER_LEN: usize = 64;
/// Verifier lengths RFC 7636 allows.
pub const VERIFIER_LEN_RANGE: RangeInclusive<usize> = 43..=128;

// 256 bits per nonce/state value.
const TOKEN_BYTES: usize = 32;
const UNRESERVED: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

/// Supported PKCE challenge methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PkceCodeChallengeMethod {
	/// SHA-256 based PKCE (RFC 7636 S256).
	S256,
}
impl PkceCodeChallengeMethod {
	/// Returns the RFC 7636 identifier for the challenge method.
	pub fn as_str(self) -> &'static str {
		match self {
			PkceCodeChallengeMethod::S256 => "S256",
		}
	}
}

/// PKCE verifier with its derived challenge.
#[derive(Clone)]
pub struct PkcePair {
	verifier: String,
	/// Base64URL (unpadded) SHA-256 digest of the verifier.
	pub challenge: String,
	/// Challenge method sent with the request.
	pub method: PkceCodeChallengeMethod,
}
impl PkcePair {
	/// Generates a verifier of `len` characters and derives its challenge.
	pub fn generate(len: usize) -> Result<Self, ConfigError> {
		Ok(Self::from_verifier(generate_code_verifier(len)?))
	}

	/// Derives the challenge for an existing verifier.
	pub fn from_verifier(verifier: String) -> Self {
		let challenge = generate_code_challenge(&verifier);

		Self { verifier, challenge, method: PkceCodeChallengeMethod::S256 }
	}

	/// Secret verifier; only the token exchange may send it.
	pub fn verifier(&self) -> &str {
		&self.verifier
	}
}
impl Debug for PkcePair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PkcePair")
			.field("verifier", &"<redacted>")
			.field("challenge", &self.challenge)
			.field("method", &self.method)
			.finish()
	}
}

/// Unpredictable Base64URL token drawn from the thread-local CSPRNG.
pub fn random_token() -> String {
	let mut bytes = [0_u8; TOKEN_BYTES];

	rand::rng().fill(&mut bytes);

	URL_SAFE_NO_PAD.encode(bytes)
}

/// Generates a nonce and saves it to the attempt.
pub async fn generate_nonce(attempt: &AttemptVault) -> Result<String> {
	let nonce = random_token();

	attempt.set_nonce(&nonce).await?;

	Ok(nonce)
}

/// Generates a CSRF state value and saves it to the attempt.
pub async fn generate_state(attempt: &AttemptVault) -> Result<String> {
	let state = random_token();

	attempt.set_state(&state).await?;

	Ok(state)
}

/// Draws `len` characters from the RFC 3986 unreserved set. Nothing is persisted.
pub fn generate_code_verifier(len: usize) -> Result<String, ConfigError> {
	if !VERIFIER_LEN_RANGE.contains(&len) {
		return Err(ConfigError::VerifierLength { len });
	}

	let mut rng = rand::rng();

	Ok((0..len).map(|_| char::from(UNRESERVED[rng.random_range(0..UNRESERVED.len())])).collect())
}

/// Base64URL (unpadded) SHA-256 digest of the verifier's UTF-8 bytes.
pub fn generate_code_challenge(verifier: &str) -> String {
	URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}
