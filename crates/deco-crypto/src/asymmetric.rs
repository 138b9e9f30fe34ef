//! RSA 公開鍵の再構築と PKCS#1 v1.5 暗号化
//!
//! ルーターは公開鍵を `[modulus_hex, exponent_hex]` の組で返す。
//! これを DER エンコードされた PKCS#1 `RSAPublicKey` に組み立て直し、
//! そこから鍵オブジェクトを構築する。
//!
//! ```text
//! RSAPublicKey ::= SEQUENCE {
//!     modulus         INTEGER,  -- n
//!     publicExponent  INTEGER   -- e
//! }
//! ```

use rsa::pkcs1::{DecodeRsaPublicKey, EncodeRsaPublicKey, RsaPublicKey as Pkcs1PublicKey, UintRef};
use rsa::pkcs1::der::Encode;
use rsa::rand_core::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Pkcs1v15Encrypt, RsaPublicKey};

use crate::error::{CryptoError, Result};

/// PKCS#1 v1.5 暗号化のパディングオーバーヘッド（バイト）
pub const PKCS1_V15_OVERHEAD: usize = 11;

/// サーバーから受け取った RSA 公開鍵
///
/// 構築後は暗号化にのみ使う。秘密情報は含まないが、
/// 呼び出し側に生の modulus を書き換える手段は与えない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    inner: RsaPublicKey,
}

impl PublicKey {
    /// `(modulus_hex, exponent_hex)` から公開鍵を構築する
    ///
    /// modulus は任意精度整数、exponent は通常の整数として 16 進数で解析する。
    ///
    /// # エラー
    /// - `CryptoError::KeyParse`: 16 進数として解析できない、または鍵として不正
    pub fn from_hex(modulus_hex: &str, exponent_hex: &str) -> Result<Self> {
        let modulus = BigUint::parse_bytes(modulus_hex.trim().as_bytes(), 16)
            .ok_or_else(|| CryptoError::KeyParse("modulus is not valid hex".into()))?;
        let exponent = u64::from_str_radix(exponent_hex.trim(), 16)
            .map_err(|e| CryptoError::KeyParse(format!("exponent: {}", e)))?;

        let der = encode_pkcs1_der(&modulus.to_bytes_be(), &exponent.to_be_bytes())?;
        Self::from_pkcs1_der(&der)
    }

    /// DER エンコードされた PKCS#1 `RSAPublicKey` から構築する
    pub fn from_pkcs1_der(der: &[u8]) -> Result<Self> {
        let inner = RsaPublicKey::from_pkcs1_der(der)
            .map_err(|e| CryptoError::KeyParse(e.to_string()))?;
        Ok(PublicKey { inner })
    }

    /// PKCS#1 DER 形式で書き出す
    pub fn to_pkcs1_der(&self) -> Result<Vec<u8>> {
        let doc = self
            .inner
            .to_pkcs1_der()
            .map_err(|e| CryptoError::KeyParse(e.to_string()))?;
        Ok(doc.as_bytes().to_vec())
    }

    /// modulus のバイト長（512bit 鍵なら 64）
    pub fn size(&self) -> usize {
        self.inner.size()
    }

    /// 1 ブロックで暗号化できる平文の最大長
    pub fn max_plaintext_len(&self) -> usize {
        self.size().saturating_sub(PKCS1_V15_OVERHEAD)
    }

    /// modulus（小文字 16 進数、先頭ゼロなし）
    pub fn modulus_hex(&self) -> String {
        self.inner.n().to_str_radix(16)
    }

    /// exponent（小文字 16 進数、先頭ゼロなし）
    pub fn exponent_hex(&self) -> String {
        self.inner.e().to_str_radix(16)
    }

    /// 文字列の UTF-8 バイト列を PKCS#1 v1.5 で暗号化し、小文字 16 進数で返す
    ///
    /// 長い文字列の分割は呼び出し側の責任（上限は [`PublicKey::max_plaintext_len`]）。
    ///
    /// # エラー
    /// - `CryptoError::EncryptionFailed`: 鍵長が不明、または平文が長すぎる
    pub fn encrypt_hex(&self, message: &str) -> Result<String> {
        if self.size() == 0 {
            return Err(CryptoError::EncryptionFailed(
                "failed to determine RSA key size".into(),
            ));
        }

        let ciphertext = self
            .inner
            .encrypt(&mut OsRng, Pkcs1v15Encrypt, message.as_bytes())
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
        Ok(hex::encode(ciphertext))
    }
}

/// `(n, e)` を PKCS#1 `RSAPublicKey` の DER に組み立てる
fn encode_pkcs1_der(modulus: &[u8], exponent: &[u8]) -> Result<Vec<u8>> {
    let modulus =
        UintRef::new(modulus).map_err(|e| CryptoError::KeyParse(format!("modulus: {}", e)))?;
    let public_exponent =
        UintRef::new(exponent).map_err(|e| CryptoError::KeyParse(format!("exponent: {}", e)))?;

    Pkcs1PublicKey {
        modulus,
        public_exponent,
    }
    .to_der()
    .map_err(|e| CryptoError::KeyParse(e.to_string()))
}
