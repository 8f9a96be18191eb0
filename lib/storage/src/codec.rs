//! Artifact decoding. The format is chosen from the blob name: an optional
//! trailing `.gz`, then `.json` or `.bin` / `.bincode`.

use anyhow::{anyhow, Context, Result};
use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::io::Read;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Bincode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactEncoding {
    pub format: ArtifactFormat,
    pub gzip: bool,
}

impl ArtifactEncoding {
    pub fn from_name(name: &str) -> Result<Self> {
        let (stem, gzip) = match name.strip_suffix(".gz") {
            Some(stem) => (stem, true),
            None => (name, false),
        };

        let format = match stem.rsplit_once('.').map(|(_, ext)| ext) {
            Some("json") => ArtifactFormat::Json,
            Some("bin") | Some("bincode") => ArtifactFormat::Bincode,
            _ => return Err(anyhow!("unsupported artifact format: {}", name)),
        };

        Ok(Self { format, gzip })
    }
}

/// Decode `data` into `T` using the encoding implied by `name`
pub fn decode<T: DeserializeOwned>(name: &str, data: &[u8]) -> Result<T> {
    let encoding = ArtifactEncoding::from_name(name)?;

    let inflated;
    let raw: &[u8] = if encoding.gzip {
        let mut buf = Vec::new();
        GzDecoder::new(data)
            .read_to_end(&mut buf)
            .with_context(|| format!("failed to decompress {}", name))?;
        inflated = buf;
        &inflated
    } else {
        data
    };

    match encoding.format {
        ArtifactFormat::Json => {
            serde_json::from_slice(raw).with_context(|| format!("invalid JSON in {}", name))
        }
        ArtifactFormat::Bincode => bincode::deserialize(raw)
            .map_err(|e| anyhow!("invalid bincode in {}: {}", name, e)),
    }
}

/// Hex SHA-256 of the raw blob
pub fn checksum(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use hybridrec_core::Interaction;
    use std::io::Write;

    #[test]
    fn test_encoding_from_name() {
        let json = ArtifactEncoding::from_name("clicks.json").unwrap();
        assert_eq!(json.format, ArtifactFormat::Json);
        assert!(!json.gzip);

        let gz = ArtifactEncoding::from_name("embeddings.bin.gz").unwrap();
        assert_eq!(gz.format, ArtifactFormat::Bincode);
        assert!(gz.gzip);

        assert!(ArtifactEncoding::from_name("model.pickle").is_err());
        assert!(ArtifactEncoding::from_name("noext").is_err());
    }

    #[test]
    fn test_decode_json_and_gzip() {
        let json = br#"[{"user_id": 1, "item_id": 10}, {"user_id": 2, "item_id": 11}]"#;
        let plain: Vec<Interaction> = decode("clicks.json", json).unwrap();
        assert_eq!(plain, vec![Interaction::new(1, 10), Interaction::new(2, 11)]);

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(json).unwrap();
        let compressed = encoder.finish().unwrap();
        let inflated: Vec<Interaction> = decode("clicks.json.gz", &compressed).unwrap();
        assert_eq!(inflated, plain);
    }

    #[test]
    fn test_decode_bincode() {
        let rows = vec![Interaction::new(3, 30)];
        let data = bincode::serialize(&rows).unwrap();
        let decoded: Vec<Interaction> = decode("clicks.bin", &data).unwrap();
        assert_eq!(decoded, rows);
    }

    #[test]
    fn test_decode_errors_name_the_artifact() {
        let err = decode::<Vec<Interaction>>("clicks.json", b"not json").unwrap_err();
        assert!(err.to_string().contains("clicks.json"));

        let err = decode::<Vec<Interaction>>("clicks.json.gz", b"not gzip").unwrap_err();
        assert!(err.to_string().contains("decompress"));
    }

    #[test]
    fn test_checksum() {
        assert_eq!(
            checksum(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
