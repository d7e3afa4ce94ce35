use std::io;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("playfield {width}x{height} leaves no room for {block_size}px blocks")]
    InvalidWorld {
        width: i32,
        height: i32,
        block_size: i32,
    },
    #[error("step size must be positive, got {0}")]
    InvalidStepSize(i32),
    #[error("fuse range {min}s..{max}s is empty")]
    InvalidFuseRange { min: u64, max: u64 },
    #[error("server must allow at least one player")]
    NoPlayerSlots,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind UDP socket on {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },
    #[error("invalid game configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
}
