//! Protocol configuration.
//!
//! Every dynamic parameter the validation engine consults is enumerated
//! here and passed in at construction. Nothing is looked up ambiently.

/// Consensus-relevant protocol parameters.
#[derive(Clone, Debug)]
pub struct ChainConfig {
    /// Maximum accepted signature length in bytes.
    pub sign_max_size: usize,
    /// Protocol version every SpendTx must carry.
    pub spend_tx_version: u8,
    /// Absolute floor on transaction fees, in tokens.
    pub minimum_fee: u64,
    /// Mempool admission: one token of fee buys this many serialized bytes.
    pub pool_fee_bytes_per_token: u64,
    /// Miner inclusion: one token of fee buys this many serialized bytes.
    pub miner_fee_bytes_per_token: u64,
    /// Exact byte length of a name-claim salt.
    pub name_salt_size: usize,
    /// Blocks a minted Coinbase reward stays in the miner's locked
    /// schedule before maturing into spendable balance. Zero credits the
    /// reward immediately.
    pub coinbase_maturity: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            sign_max_size: 64,
            spend_tx_version: 1,
            minimum_fee: 1,
            pool_fee_bytes_per_token: 300,
            miner_fee_bytes_per_token: 150,
            name_salt_size: 32,
            coinbase_maturity: 0,
        }
    }
}
