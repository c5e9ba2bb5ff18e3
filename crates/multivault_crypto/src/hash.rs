use core::{fmt, hash, marker::PhantomData};

use blake2::{
    digest::{Update, VariableOutput},
    Blake2bVar,
};
use derive_more::{Deref, Display};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Hash of vault entities. Currently supports only blake2b-32.
/// The least significant bit of a computed hash is always set,
/// so a computed hash is never equal to [`Hash::ZERO`].
#[derive(
    Clone,
    Copy,
    Display,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Decode,
    Encode,
    Deserialize,
    Serialize,
)]
#[display(fmt = "{}", "hex::encode(_0)")]
pub struct Hash([u8; Hash::LENGTH]);

impl Hash {
    /// Length of hash
    pub const LENGTH: usize = 32;

    /// Zeroed hash. Never produced by [`Hash::new`].
    pub const ZERO: Self = Self([0; Self::LENGTH]);

    /// Wrap the given bytes; they must be prehashed with `Blake2bVar`
    pub fn prehashed(mut hash: [u8; Self::LENGTH]) -> Self {
        hash[Self::LENGTH - 1] |= 1;
        Self(hash)
    }

    /// Hash the given bytes.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        let mut hasher = Blake2bVar::new(Self::LENGTH)
            .expect("INTERNAL BUG: 32 is a valid blake2b output length");
        hasher.update(bytes.as_ref());
        let mut output = [0; Self::LENGTH];
        hasher
            .finalize_variable(&mut output)
            .expect("INTERNAL BUG: output buffer has the requested length");
        Self::prehashed(output)
    }

    /// Whether this is the zeroed hash.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Adds type information to the hash. Be careful about using this function
    /// since it is not possible to validate the correctness of the conversion.
    /// Prefer creating new hashes with [`HashOf::new`] whenever possible
    #[must_use]
    pub const fn typed<T>(self) -> HashOf<T> {
        HashOf(self, PhantomData)
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ Hash({}) }}", hex::encode(self.0))
    }
}

impl From<Hash> for [u8; Hash::LENGTH] {
    #[inline]
    fn from(Hash(bytes): Hash) -> Self {
        bytes
    }
}

impl AsRef<[u8; Hash::LENGTH]> for Hash {
    #[inline]
    fn as_ref(&self) -> &[u8; Hash::LENGTH] {
        &self.0
    }
}

impl<T> From<HashOf<T>> for Hash {
    fn from(HashOf(hash, _): HashOf<T>) -> Self {
        hash
    }
}

/// Represents hash of a SCALE-encodable vault entity such as a deal key.
#[derive(Deref, Display, Decode, Encode, Deserialize, Serialize)]
#[display(fmt = "{}", _0)]
#[serde(transparent)]
pub struct HashOf<T>(
    #[deref] Hash,
    #[codec(skip)]
    #[serde(skip)]
    PhantomData<T>,
);

impl<T> fmt::Debug for HashOf<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ {} {} }}", core::any::type_name::<Self>(), self.0)
    }
}

impl<T> Clone for HashOf<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for HashOf<T> {}

impl<T> PartialEq for HashOf<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}
impl<T> Eq for HashOf<T> {}

impl<T> PartialOrd for HashOf<T> {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<T> Ord for HashOf<T> {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> hash::Hash for HashOf<T> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> AsRef<[u8; Hash::LENGTH]> for HashOf<T> {
    fn as_ref(&self) -> &[u8; Hash::LENGTH] {
        self.0.as_ref()
    }
}

impl<T> HashOf<T> {
    /// Transmutes hash to some specific type.
    /// Don't use this method if not required.
    #[inline]
    #[must_use]
    pub const fn transmute<F>(self) -> HashOf<F> {
        HashOf(self.0, PhantomData)
    }
}

impl<T: Encode> HashOf<T> {
    /// Construct typed hash
    #[must_use]
    pub fn new(value: &T) -> Self {
        Self(Hash::new(value.encode()), PhantomData)
    }
}
