#[derive(Debug, thiserror::Error, thiserror_ext::Construct)]
#[non_exhaustive]
pub enum Error {
	#[error("invalid configuration: {0}")]
	Configuration(String),

	#[error("random source failure: {0}")]
	RandomSource(String),

	#[error("failed to decrypt envelope: {0}")]
	Decryption(String),

	#[error("error parsing payload during decrypt of {record_id}: {cause}")]
	Serialization {
		record_id: String,
		cause: serde_json::Error,
	},

	#[error("failed to encode payload: {0}")]
	Encoding(serde_json::Error),
}
