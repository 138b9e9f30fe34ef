//! AES-128-CBC 対称暗号
//!
//! 暗号文はすべて Base64（標準アルファベット、パディングあり）でやり取りする。
//!
//! ```text
//! encrypt: plaintext → PKCS7(16) → AES-128-CBC(key, iv) → Base64
//! decrypt: Base64 → AES-128-CBC(key, iv) → PKCS7 除去 → plaintext
//! ```

use core::fmt;

use aes::Aes128;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use cbc::cipher::block_padding::{NoPadding, Pkcs7};
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::error::{CryptoError, Result};

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// AES のブロックサイズ（バイト）
pub const AES_BLOCK_SIZE: usize = 16;

/// 鍵・IV の長さ（バイト）
pub const SESSION_KEY_LEN: usize = 16;

/// 鍵文字に使うアルファベット（62 文字）
const KEY_ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// 62 の倍数のうち 256 未満で最大の値。これ以上の乱数バイトは捨てる
const REJECTION_LIMIT: u8 = 248;

/// セッション用 AES-128 鍵と IV
///
/// ログイン時の sign に `k=<key>&i=<iv>` としてそのまま埋め込まれるため、
/// [`SymmetricSessionKey::generate`] は各バイトを英数字から一様に選ぶ。
#[derive(Clone, PartialEq, Eq)]
pub struct SymmetricSessionKey {
    key: [u8; SESSION_KEY_LEN],
    iv: [u8; SESSION_KEY_LEN],
}

impl SymmetricSessionKey {
    /// OS の CSPRNG から新しい鍵と IV を生成する
    ///
    /// # エラー
    /// - `CryptoError::RandomUnavailable`: 乱数源の読み出しに失敗
    pub fn generate() -> Result<Self> {
        let mut key = [0u8; SESSION_KEY_LEN];
        let mut iv = [0u8; SESSION_KEY_LEN];
        fill_alphanumeric(&mut key)?;
        fill_alphanumeric(&mut iv)?;
        Ok(SymmetricSessionKey { key, iv })
    }

    /// 既知の鍵と IV から構築する（応答側・テスト用）
    pub fn from_parts(key: [u8; SESSION_KEY_LEN], iv: [u8; SESSION_KEY_LEN]) -> Self {
        SymmetricSessionKey { key, iv }
    }

    /// 鍵のバイト列
    pub fn key(&self) -> &[u8; SESSION_KEY_LEN] {
        &self.key
    }

    /// IV のバイト列
    pub fn iv(&self) -> &[u8; SESSION_KEY_LEN] {
        &self.iv
    }

    /// sign に埋め込む鍵文字列
    pub fn key_text(&self) -> Result<&str> {
        printable(&self.key)
    }

    /// sign に埋め込む IV 文字列
    pub fn iv_text(&self) -> Result<&str> {
        printable(&self.iv)
    }

    /// 平文を PKCS7 パディング → AES-128-CBC 暗号化し、Base64 文字列を返す
    ///
    /// # エラー
    /// - `CryptoError::EmptyPlaintext`: 平文が空
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String> {
        let padded = pkcs7_pad(plaintext, AES_BLOCK_SIZE)?;
        let ciphertext = Aes128CbcEnc::new(&self.key.into(), &self.iv.into())
            .encrypt_padded_vec_mut::<NoPadding>(&padded);
        Ok(STANDARD.encode(ciphertext))
    }

    /// Base64 暗号文を復号し、PKCS7 パディングを取り除いた平文を返す
    ///
    /// # エラー
    /// - `CryptoError::InvalidBase64`: Base64 デコード失敗
    /// - `CryptoError::DecryptionFailed`: ブロック長またはパディングが不正
    pub fn decrypt(&self, ciphertext_b64: &str) -> Result<Vec<u8>> {
        let ciphertext = STANDARD
            .decode(ciphertext_b64.trim())
            .map_err(|_| CryptoError::InvalidBase64)?;

        if ciphertext.is_empty() || ciphertext.len() % AES_BLOCK_SIZE != 0 {
            return Err(CryptoError::DecryptionFailed);
        }

        Aes128CbcDec::new(&self.key.into(), &self.iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| CryptoError::DecryptionFailed)
    }
}

impl fmt::Debug for SymmetricSessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricSessionKey")
            .field("key", &"<redacted>")
            .field("iv", &"<redacted>")
            .finish()
    }
}

/// PKCS7 パディングを付加する
///
/// 常に `block_size - (len % block_size)` バイトを追加する。
/// 長さがブロックサイズの倍数なら、値 `block_size` のブロックが丸ごと 1 つ付く。
///
/// # エラー
/// - `CryptoError::InvalidBlockSize`: `block_size` が 0 または 255 超
/// - `CryptoError::EmptyPlaintext`: 入力が空
pub fn pkcs7_pad(data: &[u8], block_size: usize) -> Result<Vec<u8>> {
    if block_size == 0 || block_size > u8::MAX as usize {
        return Err(CryptoError::InvalidBlockSize(block_size));
    }
    if data.is_empty() {
        return Err(CryptoError::EmptyPlaintext);
    }

    let pad_len = block_size - (data.len() % block_size);
    let mut padded = Vec::with_capacity(data.len() + pad_len);
    padded.extend_from_slice(data);
    padded.resize(data.len() + pad_len, pad_len as u8);
    Ok(padded)
}

fn fill_alphanumeric(out: &mut [u8; SESSION_KEY_LEN]) -> Result<()> {
    let mut filled = 0;
    let mut pool = [0u8; 32];

    while filled < out.len() {
        getrandom::getrandom(&mut pool).map_err(|_| CryptoError::RandomUnavailable)?;
        for &byte in pool.iter().filter(|&&b| b < REJECTION_LIMIT) {
            out[filled] = KEY_ALPHABET[(byte % 62) as usize];
            filled += 1;
            if filled == out.len() {
                break;
            }
        }
    }

    Ok(())
}

fn printable(bytes: &[u8]) -> Result<&str> {
    if !bytes.iter().all(|b| b.is_ascii_graphic()) {
        return Err(CryptoError::KeyNotPrintable);
    }
    core::str::from_utf8(bytes).map_err(|_| CryptoError::KeyNotPrintable)
}
