//! Identity-token claims and payload decoding.
//!
//! The payload is decoded without verifying the token signature. The identity token only ever
//! arrives from the provider's own token endpoint over TLS, so the claims are trusted on that
//! channel alone; anything that needs a stronger guarantee must verify the signature against the
//! issuer's JWKS before relying on these values.

// crates.io
use base64::{
	Engine as _,
	alphabet::URL_SAFE,
	engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde_json::{Map, Value};
// self
use crate::_prelude::*;

/// Base64URL engine that accepts payload segments with or without trailing padding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
	&URL_SAFE,
	GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Claim carrying the provider-side username.
pub const PROVIDER_USERNAME_CLAIM: &str = "cognito:username";

/// Errors raised while decoding an identity-token payload.
#[derive(Debug, ThisError)]
pub enum ClaimsDecodeError {
	/// Token has no second (payload) segment.
	#[error("Identity token has no payload segment.")]
	MissingPayload,
	/// Payload segment is not valid Base64URL.
	#[error("Identity token payload is not valid Base64URL.")]
	Base64(#[from] base64::DecodeError),
	/// Payload bytes are not UTF-8.
	#[error("Identity token payload is not valid UTF-8.")]
	Utf8(#[from] std::string::FromUtf8Error),
	/// Payload is not JSON.
	#[error("Identity token payload is not valid JSON.")]
	Json(#[from] serde_json::Error),
	/// Payload is JSON but not an object.
	#[error("Identity token payload is not a JSON object.")]
	NotAnObject,
}

/// Claims carried by an identity token.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);
impl Claims {
	/// Wraps a raw claims object.
	pub fn new(claims: Map<String, Value>) -> Self {
		Self(claims)
	}

	/// Returns true when no claims are present.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Raw claim lookup.
	pub fn get(&self, claim: &str) -> Option<&Value> {
		self.0.get(claim)
	}

	/// String claim lookup; empty strings and non-string values read as absent.
	pub fn get_str(&self, claim: &str) -> Option<&str> {
		self.0.get(claim).and_then(Value::as_str).filter(|value| !value.is_empty())
	}

	/// `email` claim.
	pub fn email(&self) -> Option<&str> {
		self.get_str("email")
	}

	/// `name` claim.
	pub fn name(&self) -> Option<&str> {
		self.get_str("name")
	}

	/// Provider username claim.
	pub fn provider_username(&self) -> Option<&str> {
		self.get_str(PROVIDER_USERNAME_CLAIM)
	}

	/// `sub` claim.
	pub fn subject(&self) -> Option<&str> {
		self.get_str("sub")
	}

	/// `nonce` claim echoed from the authorization request.
	pub fn nonce(&self) -> Option<&str> {
		self.get_str("nonce")
	}

	/// `iss` claim.
	pub fn issuer(&self) -> Option<&str> {
		self.get_str("iss")
	}

	/// `exp` claim as an instant.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		let seconds = self.0.get("exp").and_then(Value::as_i64)?;

		OffsetDateTime::from_unix_timestamp(seconds).ok()
	}

	/// Borrows the underlying JSON object.
	pub fn as_map(&self) -> &Map<String, Value> {
		&self.0
	}
}

/// Decodes the payload segment of a compact identity token into [`Claims`].
///
/// Only the middle segment is inspected; header and signature are ignored.
pub fn decode_payload(token: &str) -> Result<Claims, ClaimsDecodeError> {
	let segment = token.split('.').nth(1).ok_or(ClaimsDecodeError::MissingPayload)?;
	let bytes = PAYLOAD_ENGINE.decode(segment)?;
	let text = String::from_utf8(bytes)?;

	match serde_json::from_str::<Value>(&text)? {
		Value::Object(map) => Ok(Claims(map)),
		_ => Err(ClaimsDecodeError::NotAnObject),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use base64::engine::general_purpose::{URL_SAFE as URL_SAFE_PAD, URL_SAFE_NO_PAD};
	use serde_json::json;
	// self
	use super::*;

	fn token_with_payload(payload: &str) -> String {
		format!(
			"{}.{}.signature",
			URL_SAFE_NO_PAD.encode("{\"alg\":\"RS256\"}"),
			URL_SAFE_NO_PAD.encode(payload)
		)
	}

	#[test]
	fn payload_round_trips_claims() {
		let claims = json!({
			"sub": "3b1c",
			"email": "x@y.com",
			"name": "Zoë",
			"cognito:username": "zoe",
			"exp": 1_900_000_000,
		});
		let token = token_with_payload(&claims.to_string());
		let decoded = decode_payload(&token).expect("Payload fixture should decode.");

		assert_eq!(Value::Object(decoded.as_map().clone()), claims);
		assert_eq!(decoded.name(), Some("Zoë"));
		assert_eq!(decoded.provider_username(), Some("zoe"));
		assert_eq!(decoded.expires_at().map(|at| at.unix_timestamp()), Some(1_900_000_000));
	}

	#[test]
	fn padded_payload_segments_decode() {
		let payload = URL_SAFE_PAD.encode("{\"email\":\"a@b.c\"}");
		let token = format!("h.{payload}.s");
		let decoded = decode_payload(&token).expect("Padded payload should decode.");

		assert_eq!(decoded.email(), Some("a@b.c"));
	}

	#[test]
	fn malformed_tokens_report_the_failing_stage() {
		assert!(matches!(decode_payload("opaque"), Err(ClaimsDecodeError::MissingPayload)));
		assert!(matches!(decode_payload("h.!!!.s"), Err(ClaimsDecodeError::Base64(_))));
		assert!(matches!(
			decode_payload(&format!("h.{}.s", URL_SAFE_NO_PAD.encode([0xff, 0xfe]))),
			Err(ClaimsDecodeError::Utf8(_))
		));
		assert!(matches!(
			decode_payload(&token_with_payload("{not json")),
			Err(ClaimsDecodeError::Json(_))
		));
		assert!(matches!(
			decode_payload(&token_with_payload("[1,2]")),
			Err(ClaimsDecodeError::NotAnObject)
		));
	}

	#[test]
	fn string_lookups_skip_empty_and_non_string_values() {
		let token = token_with_payload("{\"name\":\"\",\"email\":42}");
		let claims = decode_payload(&token).expect("Payload fixture should decode.");

		assert_eq!(claims.name(), None);
		assert_eq!(claims.email(), None);
		assert!(claims.get("email").is_some());
	}
}
