// SPDX-License-Identifier: GPL-3.0-only

//! Serde helpers for status flag sets.

/// (De)serializes a `BitFlags<T>` as a list of flag names.
///
/// Use with `#[serde(with = "flag_list")]`.
pub mod flag_list {
    use enumflags2::{BitFlag, BitFlags};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T>(flags: &BitFlags<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: BitFlag + Serialize,
    {
        serializer.collect_seq(flags.iter())
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<BitFlags<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: BitFlag + Deserialize<'de>,
    {
        let names = Vec::<T>::deserialize(deserializer)?;
        Ok(names.into_iter().collect())
    }
}
