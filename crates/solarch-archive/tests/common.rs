//! Common fixtures for archive integration tests.

#![allow(dead_code)]

use serde_json::json;
use solarch_archive::{ArchiveConfig, Archiver, MemoryObjectStore};
use solarch_codec::*;
use solarch_compress::{CompressionFormat, CompressorConfig};
use std::path::Path;

pub const SYSTEM_PROGRAM: &str = "11111111111111111111111111111111";
pub const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
pub const COMPUTE_BUDGET: &str = "ComputeBudget111111111111111111111111111111";
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

/// Deterministic 32-byte address; small `n` values repeat across blocks.
pub fn address(n: u64) -> String {
    let mut bytes = [7u8; 32];
    bytes[..8].copy_from_slice(&n.to_le_bytes());
    bs58::encode(bytes).into_string()
}

fn hash(seed: u64) -> String {
    let mut bytes = [0x5au8; 32];
    bytes[24..].copy_from_slice(&seed.to_be_bytes());
    bs58::encode(bytes).into_string()
}

fn signature(height: u64, tx: u32) -> String {
    let mut bytes = [0x11u8; 64];
    bytes[..8].copy_from_slice(&height.to_le_bytes());
    bytes[8..12].copy_from_slice(&tx.to_le_bytes());
    bs58::encode(bytes).into_string()
}

/// A block with `tx_count` transactions drawing accounts from a pool of 64
/// addresses. Every third transaction fails; even ones are v0.
pub fn block(height: u64, tx_count: u32) -> Block {
    let mut transactions = Vec::new();
    let mut instructions = Vec::new();
    let mut logs = Vec::new();
    let mut balances = Vec::new();
    let mut token_balances = Vec::new();

    for i in 0..tx_count {
        let payer = address(u64::from(i) % 64);
        let dest = address((u64::from(i) * 7 + 3) % 64);
        let token_account = address(100 + u64::from(i) % 16);
        let failed = i % 3 == 2;

        transactions.push(Transaction {
            transaction_index: i,
            version: if i % 2 == 0 {
                TransactionVersion::Versioned(0)
            } else {
                TransactionVersion::Legacy
            },
            account_keys: vec![
                payer.clone(),
                dest.clone(),
                SYSTEM_PROGRAM.to_string(),
                COMPUTE_BUDGET.to_string(),
            ],
            address_table_lookups: if i % 2 == 0 {
                vec![AddressTableLookup {
                    account_key: address(200),
                    readonly_indexes: vec![0, 1],
                    writable_indexes: vec![2],
                }]
            } else {
                vec![]
            },
            num_readonly_signed_accounts: 0,
            num_readonly_unsigned_accounts: 2,
            num_required_signatures: 1,
            recent_blockhash: hash(height - 1),
            signatures: vec![signature(height, i)],
            err: failed.then(|| json!({"InstructionError": [1, {"Custom": 6001}]})),
            compute_units_consumed: 150 + u64::from(i),
            fee: 5000,
            loaded_addresses: LoadedAddresses {
                readonly: if i % 2 == 0 {
                    vec![USDC_MINT.to_string(), TOKEN_PROGRAM.to_string()]
                } else {
                    vec![]
                },
                writable: if i % 2 == 0 {
                    vec![token_account.clone()]
                } else {
                    vec![]
                },
            },
            has_dropped_log_messages: false,
        });

        instructions.push(Instruction {
            transaction_index: i,
            instruction_address: vec![0],
            program_id: COMPUTE_BUDGET.to_string(),
            accounts: vec![],
            data: "3DTZbgwsozUF".to_string(),
            compute_units_consumed: Some(150),
            error: None,
            is_committed: !failed,
            has_dropped_log_messages: false,
        });
        instructions.push(Instruction {
            transaction_index: i,
            instruction_address: vec![1],
            program_id: SYSTEM_PROGRAM.to_string(),
            accounts: vec![payer.clone(), dest.clone()],
            data: "3Bxs4h24hBtQy9rw".to_string(),
            compute_units_consumed: None,
            error: failed.then(|| "custom program error: 0x1771".to_string()),
            is_committed: !failed,
            has_dropped_log_messages: false,
        });
        for (log_index, (kind, message)) in [
            (LogKind::Other, format!("Program {SYSTEM_PROGRAM} invoke [1]")),
            (LogKind::Log, "Instruction: Transfer".to_string()),
            (LogKind::Data, "AQIDBA==".to_string()),
        ]
        .into_iter()
        .enumerate()
        {
            logs.push(LogMessage {
                transaction_index: i,
                log_index: log_index as u32,
                instruction_address: vec![1],
                program_id: SYSTEM_PROGRAM.to_string(),
                kind,
                message,
            });
        }
        balances.push(Balance {
            transaction_index: i,
            account: payer.clone(),
            pre: 10_000_000_000,
            post: 10_000_000_000 - 5000,
        });
        if i % 2 == 0 {
            token_balances.push(TokenBalance {
                transaction_index: i,
                account: token_account,
                pre: Some(TokenAmount {
                    program_id: Some(TOKEN_PROGRAM.to_string()),
                    mint: USDC_MINT.to_string(),
                    decimals: 6,
                    owner: Some(payer),
                    amount: 1_000_000,
                }),
                post: (i % 4 == 0).then(|| TokenAmount {
                    program_id: Some(TOKEN_PROGRAM.to_string()),
                    mint: USDC_MINT.to_string(),
                    decimals: 6,
                    owner: None,
                    amount: u64::MAX,
                }),
            });
        }
    }

    Block {
        header: BlockHeader {
            hash: hash(height),
            height,
            slot: height + 1_000,
            parent_slot: height + 999,
            parent_hash: hash(height - 1),
            timestamp: 1_720_000_000 + height as i64,
        },
        transactions,
        instructions,
        logs,
        balances,
        token_balances,
        rewards: vec![Reward {
            pubkey: address(1),
            lamports: -(1i64 << 40),
            post_balance: (1u64 << 53) + 1,
            reward_type: Some("Fee".to_string()),
            commission: Some(5),
        }],
    }
}

/// Consecutive blocks starting at `first_height`.
pub fn blocks(first_height: u64, count: u64, tx_count: u32) -> Vec<Block> {
    (first_height..first_height + count)
        .map(|h| block(h, tx_count))
        .collect()
}

/// Configuration piping batches through `cat`, so no compressor needs to be
/// installed.
pub fn passthrough_config(dir: &Path) -> ArchiveConfig {
    ArchiveConfig {
        compressor: CompressorConfig {
            format: CompressionFormat::External {
                program: "cat".into(),
                compress_args: vec![],
                decompress_args: vec![],
                extension: ".bin".into(),
            },
            temp_dir: dir.join("packed"),
        },
        ..ArchiveConfig::default()
    }
}

pub fn passthrough_archiver(dir: &Path) -> Archiver<MemoryObjectStore> {
    Archiver::new(MemoryObjectStore::new(), passthrough_config(dir)).expect("archiver")
}

pub fn xz_available() -> bool {
    std::process::Command::new("xz")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
