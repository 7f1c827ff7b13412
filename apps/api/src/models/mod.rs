pub mod account;
pub mod applicant;
pub mod application;
pub mod job;

/// Serializes an optional inline blob column as base64 text.
pub(crate) fn serialize_blob<S>(data: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use base64::Engine;

    match data {
        Some(bytes) => {
            serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
        }
        None => serializer.serialize_none(),
    }
}
