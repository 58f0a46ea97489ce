// file: src/storage/signing.rs
// description: AWS signature v4 presigned urls for path-style S3-compatible endpoints
// reference: https://docs.aws.amazon.com/AmazonS3/latest/API/sigv4-query-string-auth.html

use crate::config::ObjectStoreConfig;
use crate::error::{RepositoryError, Result};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

pub const MAX_EXPIRATION: Duration = Duration::from_secs(7 * 24 * 60 * 60);
pub const MIN_EXPIRATION: Duration = Duration::from_secs(1);

const SERVICE: &str = "s3";

#[derive(Debug, Clone)]
pub struct PresignedUrlGenerator {
    access_key_id: String,
    secret_key: String,
    region: String,
    endpoint: String,
    bucket: String,
}

impl PresignedUrlGenerator {
    pub fn new(config: &ObjectStoreConfig) -> Self {
        Self {
            access_key_id: config.access_key_id.clone(),
            secret_key: config.secret_access_key.clone(),
            region: config.region.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn presign_get(&self, key: &str, expiration: Duration) -> Result<String> {
        self.presign_at("GET", key, expiration, Utc::now())
    }

    pub fn presign_put(&self, key: &str, expiration: Duration) -> Result<String> {
        self.presign_at("PUT", key, expiration, Utc::now())
    }

    pub fn presign_delete(&self, key: &str, expiration: Duration) -> Result<String> {
        self.presign_at("DELETE", key, expiration, Utc::now())
    }

    /// Signs `method` on `key` as of `now`.
    pub fn presign_at(
        &self,
        method: &str,
        key: &str,
        expiration: Duration,
        now: DateTime<Utc>,
    ) -> Result<String> {
        if !(MIN_EXPIRATION..=MAX_EXPIRATION).contains(&expiration) {
            return Err(RepositoryError::Config(format!(
                "Presigned url expiry must be between {} and {} seconds",
                MIN_EXPIRATION.as_secs(),
                MAX_EXPIRATION.as_secs()
            )));
        }

        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date_stamp = &amz_date[..8];
        let credential_scope = format!(
            "{}/{}/{}/aws4_request",
            date_stamp, self.region, SERVICE
        );

        let path = uri_encode(&format!("/{}/{}", self.bucket, key), false);

        let mut query_params: BTreeMap<&str, String> = BTreeMap::new();
        query_params.insert("X-Amz-Algorithm", "AWS4-HMAC-SHA256".to_string());
        query_params.insert(
            "X-Amz-Credential",
            uri_encode(&format!("{}/{}", self.access_key_id, credential_scope), true),
        );
        query_params.insert("X-Amz-Date", amz_date.clone());
        query_params.insert("X-Amz-Expires", expiration.as_secs().to_string());
        query_params.insert("X-Amz-SignedHeaders", "host".to_string());

        let canonical_query = query_params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let host = self
            .endpoint
            .trim_start_matches("http://")
            .trim_start_matches("https://")
            .split('/')
            .next()
            .unwrap_or(&self.endpoint);

        let canonical_request = format!(
            "{}\n{}\n{}\nhost:{}\n\nhost\nUNSIGNED-PAYLOAD",
            method, path, canonical_query, host
        );

        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{}\n{}",
            amz_date,
            credential_scope,
            hex_encode(&Sha256::digest(canonical_request.as_bytes()))
        );

        let signing_key = self.derive_signing_key(date_stamp);
        let signature = hex_encode(&hmac_sha256(&signing_key, &string_to_sign));

        Ok(format!(
            "{}{}?{}&X-Amz-Signature={}",
            self.endpoint, path, canonical_query, signature
        ))
    }

    fn derive_signing_key(&self, date_stamp: &str) -> Vec<u8> {
        let k_secret = format!("AWS4{}", self.secret_key);
        let k_date = hmac_sha256(k_secret.as_bytes(), date_stamp);
        let k_region = hmac_sha256(&k_date, &self.region);
        let k_service = hmac_sha256(&k_region, SERVICE);
        hmac_sha256(&k_service, "aws4_request")
    }
}

fn hmac_sha256(key: &[u8], data: &str) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Percent-encodes everything except unreserved characters (and `/` when
/// `encode_slash` is false).
pub fn uri_encode(input: &str, encode_slash: bool) -> String {
    let mut result = String::with_capacity(input.len() * 3);
    for c in input.chars() {
        match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '_' | '-' | '~' | '.' => result.push(c),
            '/' if !encode_slash => result.push(c),
            _ => {
                let mut buffer = [0u8; 4];
                for b in c.encode_utf8(&mut buffer).as_bytes() {
                    result.push_str(&format!("%{:02X}", b));
                }
            }
        }
    }
    result
}
